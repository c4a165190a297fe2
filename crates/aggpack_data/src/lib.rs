//! Core data structures for aggregate packing runs.
//!
//! Everything here is plain data: the algorithms that build and reduce these
//! values live in `aggpack_core`.

pub mod data;

pub use data::mesh::{Aabb, TriMesh};
pub use data::particle::{Aggregate, Particle};
pub use data::record::{FrameRecord, ParameterSet};
pub use data::scene::{BodyId, BodyTransform, SceneSnapshot};
pub use glam::{DQuat, DVec3};
