//! # Core Module
//!
//! Concurrency primitives shared by the rest of the crate.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking. The
//!   stage cache store and both output queues are built on it.

pub mod mt_resource;

pub use mt_resource::MtResource;
