use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Query engine error: {0}")]
    Engine(#[from] datafusion::error::DataFusionError),

    #[error("Object storage error: {0}")]
    Storage(#[from] object_store::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid location URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Destination not empty: {0} (rerun with --mode overwrite or --mode append)")]
    DestinationNotEmpty(String),
}

pub type Result<T> = std::result::Result<T, EtlError>;
