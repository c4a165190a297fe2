//! Data types shared by the geometry core, the I/O layer and the tools.

pub mod mesh;
pub mod particle;
pub mod record;
pub mod scene;
