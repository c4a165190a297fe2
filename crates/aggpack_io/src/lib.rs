//! # Aggpack IO
//!
//! Output formats for aggregate packing sweeps.
//!
//! This crate provides:
//! - Structured error handling with a custom error type
//! - Time-series CSV writing and reading
//! - Wavefront OBJ export of final surfaces
//! - The JSON sweep manifest
//! - A file-backed sink for the sweep runner

/// Error types and result aliases for I/O operations
pub mod error;
/// Wavefront OBJ export
pub mod geometry;
/// Sweep manifest
pub mod manifest;
/// JSON helpers
pub mod serialization;
/// File-backed run sink
pub mod sink;
/// Packing-fraction time series as CSV
pub mod timeseries;

pub use error::{IoError, Result};
pub use manifest::RunManifest;
pub use sink::FileSink;
pub use timeseries::{read_csv_file, write_csv_file};
