use thiserror::Error;

/// Unified error type for the meshpong node.
#[derive(Error, Debug)]
pub enum MeshpongError {
    // ── Value store errors ─────────────────────────────────────
    #[error("value store error: handle {handle}: {reason}")]
    Store { handle: u8, reason: String },

    #[error("value store closed")]
    StoreClosed,

    #[error("handle {handle} is outside 1..={max}")]
    InvalidHandle { handle: u8, max: u8 },

    #[error("value too long: {len} bytes, max {max}")]
    ValueTooLong { len: usize, max: usize },

    // ── Node errors ────────────────────────────────────────────
    #[error("command source error: {0}")]
    CommandSource(String),

    #[error("invalid device address '{0}'")]
    InvalidAddress(String),

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MeshpongError>;
