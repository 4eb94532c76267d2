use thiserror::Error;

#[derive(Debug, Error)]
pub enum GantryError {
    #[error("malformed trace: {0}")]
    MalformedTrace(String),

    #[error("duplicate span id: {0}")]
    DuplicateSpanId(String),

    #[error("trace contains no root span")]
    NoRoot,

    #[error("trace contains multiple root spans: {}", .0.join(", "))]
    MultipleRoots(Vec<String>),

    #[error("invalid viewport: {0}")]
    InvalidViewport(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, GantryError>;
