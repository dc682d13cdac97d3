use crate::voxels::block::TextureId;

/// A merged rectangle of coplanar, same-textured faces, packed into two 32-bit words.
///
/// # Memory Layout
/// * `word1`: texture id in bits 0..16, local x in 16..20, local y in 20..24,
///   local z in 24..28 and `width - 1` in 28..32
/// * `word2`: `height - 1`
///
/// The layout is fixed so quads can be copied into vertex buffers as-is via `bytemuck`.
/// Width and height therefore both lie in `1..=16`.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Quad {
    word1: u32,
    word2: u32,
}

impl Quad {
    /// Packs a quad.
    ///
    /// # Arguments
    /// * `texture` - Texture shown on the quad
    /// * `x`, `y`, `z` - Local coordinate of the origin voxel, each in `0..16`
    /// * `width`, `height` - Extent along the plane's u and v axes, each in `1..=16`
    ///
    /// # Panics
    /// Panics when a coordinate or extent does not fit its bit field.
    pub fn new(texture: TextureId, x: u32, y: u32, z: u32, width: u32, height: u32) -> Self {
        assert!(x < 16 && y < 16 && z < 16, "quad origin ({x}, {y}, {z}) outside chunk");
        assert!(
            (1..=16).contains(&width) && (1..=16).contains(&height),
            "quad extent {width}x{height} out of range"
        );
        Quad {
            word1: texture as u32 | x << 16 | y << 20 | z << 24 | (width - 1) << 28,
            word2: height - 1,
        }
    }

    /// Raw packed words.
    pub fn words(&self) -> [u32; 2] {
        [self.word1, self.word2]
    }

    /// Texture shown on the quad.
    pub fn texture(&self) -> TextureId {
        (self.word1 & 0xFFFF) as TextureId
    }

    /// Local x of the origin voxel.
    pub fn x(&self) -> u32 {
        (self.word1 >> 16) & 0xF
    }

    /// Local y of the origin voxel.
    pub fn y(&self) -> u32 {
        (self.word1 >> 20) & 0xF
    }

    /// Local z of the origin voxel.
    pub fn z(&self) -> u32 {
        (self.word1 >> 24) & 0xF
    }

    /// Extent along the plane's u axis.
    pub fn width(&self) -> u32 {
        (self.word1 >> 28) + 1
    }

    /// Extent along the plane's v axis.
    pub fn height(&self) -> u32 {
        self.word2 + 1
    }

    /// Number of voxel faces this quad covers.
    pub fn area(&self) -> u32 {
        self.width() * self.height()
    }
}

impl std::fmt::Debug for Quad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Quad")
            .field("texture", &self.texture())
            .field("origin", &(self.x(), self.y(), self.z()))
            .field("size", &(self.width(), self.height()))
            .finish()
    }
}
