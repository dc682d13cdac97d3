//! # Stage Prerequisite Table
//!
//! The single definition of the generation dependency graph. For every stage, the table
//! lists which stage outputs (at which relative chunk offsets) must or may exist before the
//! stage can run at a given position.
//!
//! A **mandatory** prerequisite blocks scheduling until its output is cached. An
//! **optional** one is leased if it happens to be cached when the work item is resolved and
//! is otherwise handed to the stage as absent. The mesher, for example, treats an absent
//! neighbour as solid.
//!
//! Every requirement must name a stage strictly earlier than the stage requiring it, which
//! keeps the graph acyclic. [`PrerequisiteTable::validate`] checks this when the pipeline is
//! constructed.

use cgmath::Vector3;

use crate::voxels::block::block_side::BlockSide;

use super::stage::{SpatialPos, Stage, StageKey};

/// One dependency of a stage.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Requirement {
    /// Chunk offset relative to the position being generated.
    pub offset: Vector3<i32>,
    /// Stage whose output is needed.
    pub stage: Stage,
    /// Whether the stage must wait for it.
    pub mandatory: bool,
}

impl Requirement {
    /// A requirement the stage waits for.
    pub const fn mandatory(offset: Vector3<i32>, stage: Stage) -> Self {
        Requirement {
            offset,
            stage,
            mandatory: true,
        }
    }

    /// A requirement used when available.
    pub const fn optional(offset: Vector3<i32>, stage: Stage) -> Self {
        Requirement {
            offset,
            stage,
            mandatory: false,
        }
    }

    /// Key of this requirement for a stage running at `position`.
    #[inline]
    pub fn key_for(&self, position: SpatialPos) -> StageKey {
        StageKey::new(position + self.offset, self.stage)
    }
}

/// Per-stage dependency rows, indexed by [`Stage::index`].
#[derive(Clone, Debug)]
pub struct PrerequisiteTable {
    rows: Vec<Vec<Requirement>>,
}

impl PrerequisiteTable {
    /// Builds a table from explicit rows and validates it.
    ///
    /// # Panics
    /// Panics if the rows do not form a valid table; see [`validate`](Self::validate).
    pub fn from_rows(rows: Vec<Vec<Requirement>>) -> Self {
        let table = PrerequisiteTable { rows };
        table.validate();
        table
    }

    /// The terrain pipeline's dependency graph.
    ///
    /// * `StoneMap`: nothing
    /// * `Topsoil`: own `StoneMap`, and the `StoneMap` above, since soil depends on the
    ///   four voxels above each stone voxel
    /// * `Surface`: own `Topsoil`, and the `StoneMap` above for the air check on the top layer
    /// * `Mesh`: own `Surface`, and each axis neighbour's `Surface` when available
    pub fn standard() -> Self {
        let here = Vector3::new(0, 0, 0);
        let above = BlockSide::TOP.normal();

        let mut mesh_row = vec![Requirement::mandatory(here, Stage::Surface)];
        mesh_row.extend(
            BlockSide::all()
                .into_iter()
                .map(|side| Requirement::optional(side.normal(), Stage::Surface)),
        );

        Self::from_rows(vec![
            vec![],
            vec![
                Requirement::mandatory(here, Stage::StoneMap),
                Requirement::mandatory(above, Stage::StoneMap),
            ],
            vec![
                Requirement::mandatory(here, Stage::Topsoil),
                Requirement::mandatory(above, Stage::StoneMap),
            ],
            mesh_row,
        ])
    }

    /// Checks the structural rules of the table.
    ///
    /// # Panics
    /// Panics when:
    /// - the table does not have exactly [`Stage::COUNT`] rows
    /// - the first stage has prerequisites
    /// - any requirement names a stage that is not strictly earlier than its own
    pub fn validate(&self) {
        assert_eq!(
            self.rows.len(),
            Stage::COUNT,
            "prerequisite table has {} rows, expected one per stage",
            self.rows.len()
        );
        assert!(
            self.rows[Stage::BEGIN.index()].is_empty(),
            "first stage {} cannot have prerequisites",
            Stage::BEGIN
        );
        for (index, row) in self.rows.iter().enumerate() {
            let stage = Stage::from_index(index);
            for requirement in row {
                assert!(
                    requirement.stage < stage,
                    "stage {} requires {} which is not an earlier stage",
                    stage,
                    requirement.stage
                );
            }
        }
    }

    /// Requirements of `stage`.
    #[inline]
    pub fn requirements(&self, stage: Stage) -> &[Requirement] {
        &self.rows[stage.index()]
    }

    /// Every distinct non-zero offset named by any requirement.
    pub fn offsets(&self) -> Vec<Vector3<i32>> {
        let mut offsets: Vec<Vector3<i32>> = Vec::new();
        for requirement in self.rows.iter().flatten() {
            if requirement.offset != Vector3::new(0, 0, 0) && !offsets.contains(&requirement.offset)
            {
                offsets.push(requirement.offset);
            }
        }
        offsets
    }

    /// Keys of the mandatory requirements of `key`.
    pub fn mandatory_keys(&self, key: StageKey) -> impl Iterator<Item = StageKey> + '_ {
        self.requirements(key.stage)
            .iter()
            .filter(|requirement| requirement.mandatory)
            .map(move |requirement| requirement.key_for(key.position))
    }
}

impl Default for PrerequisiteTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
#[path = "prerequisites_test.rs"]
mod prerequisites_test;
