pub mod model;

use model::{BinanceSubscriptionResponse, BinanceTrade};
use serde_json::json;

use crate::{
    exchange::FeedConnector,
    protocols::ws::WsMessage,
    shared::subscription_models::{FeedId, Symbol},
};

const BINANCE_SPOT_WS_URL: &str = "wss://stream.binance.com:9443/ws";

/*----- */
// BinanceSpot feed connector
/*----- */
#[derive(Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Clone)]
pub struct BinanceFeed;

impl FeedConnector for BinanceFeed {
    const ID: FeedId = FeedId::BinanceSpot;

    type SubscriptionResponse = BinanceSubscriptionResponse;
    type Tick = BinanceTrade;

    fn url() -> &'static str {
        BINANCE_SPOT_WS_URL
    }

    fn requests(symbols: &[Symbol]) -> Option<WsMessage> {
        let binance_subs = symbols
            .iter()
            .map(|symbol| format!("{}@trade", symbol.as_str().to_lowercase()))
            .collect::<Vec<_>>();

        let binance_request = json!({
            "method": "SUBSCRIBE",
            "params": binance_subs,
            "id": 1
        });

        Some(WsMessage::Text(binance_request.to_string()))
    }

    // Binance acks the whole SUBSCRIBE frame with a single response
    fn expected_responses(_symbols: &[Symbol]) -> usize {
        1
    }
}
