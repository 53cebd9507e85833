pub mod ws_parser;

use std::fmt::Debug;

use futures::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use serde_json::Value;
use tokio::{net::TcpStream, time::sleep, time::Duration};
use tokio_tungstenite::{
    connect_async, tungstenite::client::IntoClientRequest, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info};

use crate::{
    error::SocketError,
    exchange::FeedConnector,
    shared::subscription_models::Symbol,
    streams::validator::{SubscriptionValidator, WebSocketValidator},
};

/*----- */
// Convenient types
/*----- */
pub type WsMessage = tokio_tungstenite::tungstenite::Message;
pub type WsError = tokio_tungstenite::tungstenite::Error;
pub type WebSocket = tokio_tungstenite::WebSocketStream<MaybeTlsStream<TcpStream>>;
pub type WsRead = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;
pub type WsWrite = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;
pub type JoinHandle = tokio::task::JoinHandle<()>;

/*----- */
// Create websocket
/*----- */
pub struct WebSocketClient;

impl WebSocketClient {
    pub async fn init<Feed>(symbols: &[Symbol]) -> Result<(WsRead, Vec<JoinHandle>), SocketError>
    where
        Feed: FeedConnector + Send + Sync,
    {
        // Make stream connection
        let mut tasks = Vec::new();
        let ws = connect(Feed::url()).await?;

        // Split WS and make into read and write
        let (mut ws_write, ws_read) = ws.split();

        // Handle subscription
        if let Some(subscription) = Feed::requests(symbols) {
            ws_write
                .send(subscription)
                .await
                .map_err(SocketError::WebSocketError)?;
        }

        // Validate subscription
        let validated_stream = WebSocketValidator::validate::<Feed>(symbols, ws_read).await?;

        // Spawn custom ping handle (application level ping)
        if let Some(ping_interval) = Feed::ping_interval() {
            let ping_handler = tokio::spawn(schedule_pings_to_feed(ws_write, ping_interval));
            tasks.push(ping_handler);
        }

        // Log connection success message
        info!(
            feed = %Feed::ID,
            message = "Subscribed to WebSocket",
            symbols = ?symbols
        );

        Ok((validated_stream, tasks))
    }
}

pub async fn schedule_pings_to_feed(mut ws_write: WsWrite, ping_interval: PingInterval) {
    loop {
        sleep(Duration::from_secs(ping_interval.time)).await;
        let _ = ws_write
            .send(WsMessage::Text(ping_interval.message.to_string()))
            .await;
    }
}

pub async fn connect<R>(request: R) -> Result<WebSocket, SocketError>
where
    R: IntoClientRequest + Unpin + Debug,
{
    debug!(?request, "attempting to establish WebSocket connection");
    connect_async(request)
        .await
        .map(|(websocket, _)| websocket)
        .map_err(SocketError::WebSocketError)
}

/*----- */
// Models
/*----- */
#[derive(Clone, Debug)]
pub struct PingInterval {
    pub time: u64,
    pub message: Value,
}
