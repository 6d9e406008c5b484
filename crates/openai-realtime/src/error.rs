/// Failures of the session connection.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The channel could not be opened, or credentials are missing.
    #[error("failed to connect: {0}")]
    Connection(String),

    /// `send` was called before `connect` or after `close`.
    #[error("not connected")]
    NotConnected,

    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// An incoming message could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),
}
