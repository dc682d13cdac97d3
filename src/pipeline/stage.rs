//! Generation stages and the keys that identify their outputs.

use std::fmt;

use cgmath::Point3;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// A chunk's position in the chunk grid.
pub type SpatialPos = Point3<i32>;

/// One step of chunk generation.
///
/// Stages are totally ordered. A stage may only depend on strictly earlier stages, at
/// its own position or at a neighbouring one.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, FromPrimitive)]
pub enum Stage {
    /// Raw stone/air shape of the terrain.
    StoneMap = 0,
    /// Stone under open air becomes soil.
    Topsoil = 1,
    /// Exposed soil becomes grass.
    Surface = 2,
    /// Greedy mesh of the finished terrain.
    Mesh = 3,
}

impl Stage {
    /// The first stage, which has no prerequisites.
    pub const BEGIN: Stage = Stage::StoneMap;
    /// The terminal stage. Loading a chunk means driving it up to this stage.
    pub const END: Stage = Stage::Mesh;
    /// Number of stages.
    pub const COUNT: usize = Stage::END as usize + 1;

    /// Every stage in order.
    pub const fn all() -> [Stage; Stage::COUNT] {
        [Stage::StoneMap, Stage::Topsoil, Stage::Surface, Stage::Mesh]
    }

    /// Stable index used for table lookup.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The stage with the given index.
    ///
    /// # Panics
    /// Panics when `index` is not below [`Stage::COUNT`].
    pub fn from_index(index: usize) -> Stage {
        Stage::from_usize(index)
            .unwrap_or_else(|| panic!("stage index {index} out of range 0..{}", Stage::COUNT))
    }

    /// The stage immediately before this one, if any.
    pub fn previous(self) -> Option<Stage> {
        self.index().checked_sub(1).map(Stage::from_index)
    }

    /// Whether this is the terminal stage.
    #[inline]
    pub fn is_terminal(self) -> bool {
        self == Stage::END
    }

    /// Whether this is the last stage producing block data, whose output is published as
    /// a generated chunk.
    #[inline]
    pub fn completes_terrain(self) -> bool {
        self == Stage::Surface
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::StoneMap => "StoneMap",
            Stage::Topsoil => "Topsoil",
            Stage::Surface => "Surface",
            Stage::Mesh => "Mesh",
        };
        write!(f, "{}({})", name, self.index())
    }
}

/// Identifies one stage output: `(position, stage)`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct StageKey {
    /// Chunk position.
    pub position: SpatialPos,
    /// Stage of the output.
    pub stage: Stage,
}

impl StageKey {
    /// Creates a key.
    pub const fn new(position: SpatialPos, stage: Stage) -> Self {
        StageKey { position, stage }
    }
}

impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})@{}",
            self.position.x, self.position.y, self.position.z, self.stage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_and_bounds() {
        assert_eq!(Stage::COUNT, 4);
        assert_eq!(Stage::all()[0], Stage::BEGIN);
        assert_eq!(Stage::all()[Stage::COUNT - 1], Stage::END);
        assert!(Stage::StoneMap < Stage::Topsoil && Stage::Surface < Stage::Mesh);
        for (index, stage) in Stage::all().into_iter().enumerate() {
            assert_eq!(stage.index(), index);
            assert_eq!(Stage::from_index(index), stage);
        }
    }

    #[test]
    fn test_previous() {
        assert_eq!(Stage::BEGIN.previous(), None);
        assert_eq!(Stage::Mesh.previous(), Some(Stage::Surface));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_from_index_out_of_range() {
        Stage::from_index(Stage::COUNT);
    }

    #[test]
    fn test_display() {
        let key = StageKey::new(Point3::new(1, -2, 3), Stage::Topsoil);
        assert_eq!(key.to_string(), "(1, -2, 3)@Topsoil(1)");
    }
}
