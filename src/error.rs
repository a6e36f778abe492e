/// Error types for stage construction and configuration loading.
///
/// Per-tick stepping never fails: blocked moves, digging open cells and
/// off-grid reads are ordinary outcomes. Only building a stage or reading
/// a file can go wrong.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("stage size must be positive, got {width}x{height}")]
    InvalidSize { width: i32, height: i32 },

    #[error("stage '{name}' has no player spawn")]
    MissingPlayer { name: String },

    #[error("stage file has no map rows")]
    NoRows,

    #[error("no stages to play")]
    NoStages,

    #[error("cannot read stage {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
