// Error types for the generator.
//
// Two independent kinds. `GenerationError` rejects a generation request before
// any grid work begins (constraints that fail validation, bad dimensions,
// zero noise extents, bad water level) or reports that the background worker
// died. `ConstraintsError` covers
// reading and validating configuration and never touches generation state.
//
// Everything else (no path, unplaceable tiles, disqualified candidates) is a
// data outcome and is not represented here.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    InvalidConstraints(#[from] ConstraintsError),
    #[error("invalid map dimensions {width}x{height}: both must be positive")]
    InvalidDimensions { width: i64, height: i64 },
    #[error("noise sample extent must be non-zero (got {width}x{height})")]
    ZeroNoiseExtent { width: f64, height: f64 },
    #[error("invalid water level {0}: must be a finite value >= 0")]
    InvalidWaterLevel(f64),
    #[error("generation worker exited without producing a result")]
    WorkerLost,
}

#[derive(Debug, Error)]
pub enum ConstraintsError {
    #[error("failed to parse constraints: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read constraints from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid constraints: {0}")]
    Invalid(String),
}
