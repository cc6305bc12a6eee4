/// Crate-wide result alias.
pub type ReelResult<T> = Result<T, ReelError>;

/// Error type shared by synthesis, replay, encoding and the studio.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Bad parameters or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Rasterization, text shaping or still-image codec failure.
    #[error("render error: {0}")]
    Render(String),

    /// Capture session / video encoder failure.
    #[error("encode error: {0}")]
    Encode(String),

    /// The studio is not in a state that allows the operation.
    #[error("state error: {0}")]
    State(String),

    /// A frame or resource handle does not exist (or was revoked).
    #[error("not found: {0}")]
    NotFound(String),

    /// Config or payload (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
