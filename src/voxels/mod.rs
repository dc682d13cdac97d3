//! # Voxel Data
//!
//! This module contains the voxel data the generation pipeline produces and consumes.
//!
//! ## Architecture
//!
//! * **Block**: block identifiers, face directions, render models and the read-only
//!   registry the mesher queries
//! * **Chunk**: fixed-size 16x16x16 tables of block states, with an occupancy bit vector
//!   kept alongside so empty space can be skipped cheaply
//!
//! ## Thread Safety
//!
//! Chunk tables are plain owned values. Once a stage has produced one it is moved into the
//! stage cache and only ever read afterwards, so workers share them behind `Arc` without
//! further locking.

pub mod block;
pub mod chunk;
