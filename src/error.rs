//! Error types for the track store.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    /// A shard file does not carry the expected `positions` table layout.
    #[error("Schema mismatch in {path}: found columns [{found}]")]
    SchemaMismatch { path: PathBuf, found: String },

    /// A track query gave neither a bounding box nor a center position.
    #[error("Track query needs a bounding box or a center position")]
    MissingQueryBounds,

    #[error("Radius must be a positive number of meters, got {0}")]
    InvalidRadius(f64),

    #[error("Invalid cell id: {0}")]
    InvalidCellId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Track database is closed")]
    DatabaseClosed,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrackError>;
