use chrono::{DateTime, Utc};

use crate::shared::subscription_models::{FeedId, Symbol};

/*----- */
// Trade event
/*----- */
// One normalized feed tick. Price and quantity are kept as the decimal strings
// the feed sent: the downstream fixed-point scaler truncates digit-wise, and a
// detour through f64 would corrupt values like 0.0031 before it gets to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeEvent {
    pub feed: FeedId,
    pub symbol: Symbol,
    pub price: String,
    pub quantity: String,
    pub is_maker: bool,
    pub exchange_time: DateTime<Utc>,
    pub observed_at: DateTime<Utc>,
}
