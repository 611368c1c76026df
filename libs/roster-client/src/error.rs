#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),

    #[error("timeout of {0}ms exceeded")]
    Timeout(u64),

    /// The server answered with a non-success status.
    #[error("Request failed with status code {status}")]
    Api {
        status: u16,
        /// `message` from the error envelope, when the body carried one.
        message: Option<String>,
    },

    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ClientError {
    /// The server's own explanation, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message: Some(m), .. } if !m.is_empty() => Some(m.as_str()),
            _ => None,
        }
    }
}
