pub mod binance;

use std::{fmt::Debug, time::Duration};

use serde::de::DeserializeOwned;

use crate::{
    error::SocketError,
    model::trade_event::TradeEvent,
    protocols::ws::{PingInterval, WsMessage},
    shared::subscription_models::{FeedId, Symbol},
    streams::validator::Validator,
};

pub const DEFAULT_SUBSCRIPTION_TIMEOUT: Duration = Duration::from_secs(10);

/*----- */
// Feed connector trait
/*----- */
pub trait FeedConnector {
    type SubscriptionResponse: DeserializeOwned + Validator + Send + Debug;
    type Tick: DeserializeOwned + TryInto<TradeEvent, Error = SocketError> + Send + Debug;

    const ID: FeedId;

    fn url() -> &'static str;

    fn ping_interval() -> Option<PingInterval> {
        None
    }

    fn requests(symbols: &[Symbol]) -> Option<WsMessage>;

    fn expected_responses(symbols: &[Symbol]) -> usize {
        symbols.len()
    }

    fn subscription_validation_timeout() -> Duration {
        DEFAULT_SUBSCRIPTION_TIMEOUT
    }
}
