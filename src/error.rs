use std::path::PathBuf;

/// Errors at the fallible edges of the crate: configuration and export.
/// The grid engine itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum GraticuleError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("export failed: {0}")]
    Export(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraticuleError>;
