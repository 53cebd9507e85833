use futures::StreamExt;
use tokio::{time::sleep, time::Duration};
use tracing::{debug, error, info, warn};

use crate::error::SocketError;
use crate::exchange::FeedConnector;
use crate::model::trade_event::TradeEvent;
use crate::protocols::ws::ws_parser::{StreamParser, WebSocketParser};
use crate::protocols::ws::WebSocketClient;
use crate::shared::subscription_models::Symbol;

pub const START_RECONNECTION_BACKOFF_MS: u64 = 125;
pub const MAX_RECONNECTION_BACKOFF_MS: u64 = 60_000;

/// Connect, subscribe and deliver normalized events to `handler` until the
/// task is aborted. Transport failures reconnect with exponential backoff; a
/// single malformed tick is dropped and logged, the subscription stays up.
pub async fn consume<Feed, Handler>(symbols: Vec<Symbol>, mut handler: Handler)
where
    Feed: FeedConnector + Send + Sync,
    Handler: FnMut(TradeEvent) + Send,
{
    let feed_id = Feed::ID;
    let mut connection_attempt: u32 = 0;
    let mut backoff_ms: u64 = START_RECONNECTION_BACKOFF_MS;

    info!(
        feed = %feed_id,
        symbols = ?symbols,
        action = "Attempting to subscribe to websocket"
    );

    loop {
        connection_attempt += 1;
        backoff_ms = (backoff_ms * 2).min(MAX_RECONNECTION_BACKOFF_MS);

        // Attempt to connect to the stream
        /*---------- Before Stream Initialises ---------- */
        let (mut ws_read, ping_tasks) = match WebSocketClient::init::<Feed>(&symbols).await {
            Ok(parts) => parts,
            Err(error) => {
                warn!(
                    feed = %feed_id,
                    error = %error,
                    action = "Logging error then waiting for given backoff period before reconnection attempt",
                    message = "Encountered error while attempting to initialise websocket",
                    backoff_ms = backoff_ms,
                    connection_attempts = connection_attempt
                );

                sleep(Duration::from_millis(backoff_ms)).await;
                continue;
            }
        };

        // Connection is live again, restart the backoff schedule
        connection_attempt = 0;
        backoff_ms = START_RECONNECTION_BACKOFF_MS;

        /*---------- After Stream Initialises ---------- */
        // Read from stream and deliver to handler, but if error occurs, attempt reconnection
        while let Some(message) = ws_read.next().await {
            match WebSocketParser::parse::<Feed::Tick>(message) {
                Some(Ok(tick)) => match tick.try_into() {
                    Ok(event) => handler(event),
                    Err(error) => {
                        // One bad tick must not terminate the stream
                        warn!(
                            feed = %feed_id,
                            error = %error,
                            action = "Dropping tick and continuing",
                            message = "Failed to normalise feed tick",
                        );
                        continue;
                    }
                },

                // If error is terminal e.g. websocket disconnect, then break and reconnect
                Some(Err(error)) if error.is_terminal() => {
                    error!(
                        feed = %feed_id,
                        error = %error,
                        action = "Reconnecting web socket",
                        message = "Encountered a terminal error"
                    );
                    break;
                }

                // Some de errors are harmless so we dont want to log loudly e.g. subscription acks
                Some(Err(SocketError::Deserialise { error, payload })) => {
                    debug!(
                        feed = %feed_id,
                        error = %error,
                        payload = %payload,
                        action = "Continuing...",
                        message = "Encountered a non-terminal error",
                    );
                    continue;
                }

                // However other errors need logging
                Some(Err(error)) => {
                    warn!(
                        feed = %feed_id,
                        error = %error,
                        action = "Continuing...",
                        message = "Encountered a non-terminal error",
                    );
                    continue;
                }

                // Pings, pongs and frames
                None => continue,
            }
        }

        for task in ping_tasks {
            task.abort();
        }

        // Wait a certain ms before trying to reconnect
        warn!(
            feed = %feed_id,
            action = "attempting re-connection after backoff",
            backoff_ms = backoff_ms,
        );

        sleep(Duration::from_millis(backoff_ms)).await;
    }
}

#[cfg(test)]
mod test {
    use std::sync::OnceLock;

    use futures::SinkExt;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    use super::*;
    use crate::exchange::binance::model::{BinanceSubscriptionResponse, BinanceTrade};
    use crate::protocols::ws::WsMessage;
    use crate::shared::subscription_models::FeedId;

    static LOOPBACK_URL: OnceLock<String> = OnceLock::new();

    struct LoopbackFeed;

    impl FeedConnector for LoopbackFeed {
        const ID: FeedId = FeedId::BinanceSpot;

        type SubscriptionResponse = BinanceSubscriptionResponse;
        type Tick = BinanceTrade;

        fn url() -> &'static str {
            LOOPBACK_URL
                .get()
                .expect("loopback url is set before subscribing")
        }

        fn requests(_symbols: &[Symbol]) -> Option<WsMessage> {
            Some(WsMessage::Text("{\"method\":\"SUBSCRIBE\"}".to_owned()))
        }

        fn expected_responses(_symbols: &[Symbol]) -> usize {
            1
        }
    }

    fn tick_payload(price: &str) -> String {
        format!(
            "{{\"s\":\"BTCUSDT\",\"T\":1672515782136,\"t\":1,\"p\":\"{price}\",\"q\":\"0.001\",\"m\":true}}"
        )
    }

    #[tokio::test]
    async fn reconnects_and_resumes_delivery_after_connection_drop() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        LOOPBACK_URL.set(format!("ws://{}", address)).unwrap();

        // Serve two sessions, dropping the connection after one tick each;
        // the consumer has to reconnect on its own to see the second tick
        tokio::spawn(async move {
            for price in ["1.5", "2.5"] {
                let (stream, _) = listener.accept().await.unwrap();
                let mut websocket = tokio_tungstenite::accept_async(stream).await.unwrap();

                let _subscribe_frame = websocket.next().await;
                websocket
                    .send(WsMessage::Text("{\"result\":null,\"id\":1}".to_owned()))
                    .await
                    .unwrap();
                websocket
                    .send(WsMessage::Text(tick_payload(price)))
                    .await
                    .unwrap();
            }
        });

        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let consumer = tokio::spawn(consume::<LoopbackFeed, _>(
            vec![Symbol::new("btcusdt")],
            move |event| {
                let _ = event_tx.send(event);
            },
        ));

        let events = tokio::time::timeout(Duration::from_secs(10), async {
            let first = event_rx.recv().await.unwrap();
            let second = event_rx.recv().await.unwrap();
            (first, second)
        })
        .await
        .expect("delivery did not resume after the connection drop");

        assert_eq!(events.0.price, "1.5");
        assert_eq!(events.1.price, "2.5");

        consumer.abort();
    }
}
