use serde::de::DeserializeOwned;
use tracing::debug;

use super::{WsError, WsMessage};
use crate::error::SocketError;

/*----- */
// Stream parser
/*----- */
pub trait StreamParser {
    fn parse<Output>(input: Result<WsMessage, WsError>) -> Option<Result<Output, SocketError>>
    where
        Output: DeserializeOwned;
}

pub struct WebSocketParser;

impl StreamParser for WebSocketParser {
    fn parse<Output>(input: Result<WsMessage, WsError>) -> Option<Result<Output, SocketError>>
    where
        Output: DeserializeOwned,
    {
        match input {
            Ok(ws_message) => match ws_message {
                WsMessage::Text(text) => process_text(text),
                WsMessage::Binary(binary) => process_binary(binary),
                WsMessage::Close(close_frame) => Some(Err(SocketError::Terminated(
                    close_frame
                        .map(|frame| format!("{:?}", frame))
                        .unwrap_or_else(|| "no close frame provided".to_owned()),
                ))),
                // Tungstenite answers pings internally
                WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => None,
            },
            Err(ws_error) => Some(Err(SocketError::WebSocketError(ws_error))),
        }
    }
}

pub fn process_text<FeedMessage>(payload: String) -> Option<Result<FeedMessage, SocketError>>
where
    FeedMessage: DeserializeOwned,
{
    Some(
        serde_json::from_str::<FeedMessage>(&payload).map_err(|error| {
            debug!(
                ?error,
                %payload,
                action = "returning Some(Err(err))",
                "failed to deserialise WebSocket text message"
            );
            SocketError::Deserialise { error, payload }
        }),
    )
}

pub fn process_binary<FeedMessage>(payload: Vec<u8>) -> Option<Result<FeedMessage, SocketError>>
where
    FeedMessage: DeserializeOwned,
{
    Some(
        serde_json::from_slice::<FeedMessage>(&payload).map_err(|error| {
            debug!(
                ?error,
                ?payload,
                action = "returning Some(Err(err))",
                "failed to deserialise WebSocket binary message"
            );
            SocketError::Deserialise {
                error,
                payload: String::from_utf8_lossy(&payload).into_owned(),
            }
        }),
    )
}
