use openai_realtime::ClientError;

/// Failures that end a conversation.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The server sent events in an order the conversation cannot follow.
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("audio device error: {0:#}")]
    Audio(anyhow::Error),
}

impl AgentError {
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            AgentError::Protocol(_) | AgentError::Client(ClientError::Protocol(_))
        )
    }

    /// True when the session ended because the connection went away,
    /// which is also how a local shutdown surfaces.
    pub fn is_connection_lost(&self) -> bool {
        matches!(
            self,
            AgentError::Client(ClientError::ConnectionLost(_) | ClientError::NotConnected)
        )
    }
}
