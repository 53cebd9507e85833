use thiserror::Error;

/*----- */
// Feed socket errors
/*----- */
#[derive(Debug, Error)]
pub enum SocketError {
    #[error("WebSocket error: {0}")]
    WebSocketError(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Deserialising JSON error: {error} for payload: {payload}")]
    Deserialise {
        error: serde_json::Error,
        payload: String,
    },

    #[error("Serialising JSON error: {0}")]
    Serialise(serde_json::Error),

    #[error("malformed tick, {reason}, for payload: {payload}")]
    MalformedTick {
        reason: &'static str,
        payload: String,
    },

    #[error("feed stream terminated with closing frame: {0}")]
    Terminated(String),

    #[error("error subscribing to resources over the socket: {0}")]
    Subscribe(String),
}

impl SocketError {
    // Terminal errors kill the current connection and trigger the reconnect
    // path; everything else is a single bad message
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SocketError::WebSocketError(_) | SocketError::Terminated(_) | SocketError::Subscribe(_)
        )
    }
}
