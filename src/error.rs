use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a tick was refused at the buffer boundary. Never fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TickRejection {
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' is not numeric: {value:?}")]
    NotNumeric { field: &'static str, value: String },

    #[error("price must be positive and finite, got {0}")]
    NonPositivePrice(f64),

    #[error("size must be non-negative and finite, got {0}")]
    NegativeSize(f64),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("empty symbol")]
    EmptySymbol,

    #[error("unknown side {0:?}")]
    UnknownSide(String),
}
