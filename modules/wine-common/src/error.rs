use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to read source file {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Source file {path} is not a JSON array of objects: {source}")]
    SourceParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] mongodb::bson::de::Error),

    #[error("Encode error: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audit failed with {} violation(s): {}", .0.len(), .0.join("; "))]
    AuditFailed(Vec<String>),
}

pub type Result<T> = std::result::Result<T, SeedError>;
