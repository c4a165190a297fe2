//! Error types for the geometry core.
//!
//! Every variant is a local, deterministic condition. None of them is
//! swallowed here; the sweep driver decides whether a failing combination is
//! skipped, retried or aborts the sweep.

use thiserror::Error;

/// Failures raised by construction and per-frame reduction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A bounding sphere was requested for zero points.
    #[error("Empty geometry: no points to bound")]
    EmptyGeometry,

    /// The bounding radius is zero or not finite, so no packing fraction exists.
    #[error("Degenerate bounding sphere: radius {radius}")]
    DegenerateBoundingSphere { radius: f64 },

    /// Aggregate growth ran out of retries while seeking a free position.
    #[error("Placement exhausted: placed {placed} of {target} particles after {attempts} attempts")]
    PlacementExhausted {
        placed: usize,
        target: usize,
        attempts: usize,
    },

    /// An argument outside its documented domain.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for geometry operations.
pub type Result<T> = std::result::Result<T, GeometryError>;

impl GeometryError {
    /// Creates a new invalid-parameter error.
    #[must_use]
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Short machine-friendly name, used in logs and the run manifest.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyGeometry => "empty_geometry",
            Self::DegenerateBoundingSphere { .. } => "degenerate_bounding_sphere",
            Self::PlacementExhausted { .. } => "placement_exhausted",
            Self::InvalidParameter(_) => "invalid_parameter",
        }
    }
}
