use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    error::SocketError,
    model::trade_event::TradeEvent,
    shared::{
        de::de_u64_epoch_ms_as_datetime_utc,
        subscription_models::{FeedId, Symbol},
    },
    streams::validator::Validator,
};

/*----- */
// Trade tick
/*----- */
// Price and quantity stay as the strings Binance sent. See TradeEvent.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
pub struct BinanceTrade {
    #[serde(alias = "s")]
    pub symbol: String,
    #[serde(alias = "T", deserialize_with = "de_u64_epoch_ms_as_datetime_utc")]
    pub timestamp: DateTime<Utc>,
    #[serde(alias = "t")]
    pub id: u64,
    #[serde(alias = "p")]
    pub price: String,
    #[serde(alias = "q")]
    pub quantity: String,
    #[serde(alias = "m")]
    pub is_maker: bool,
}

impl TryFrom<BinanceTrade> for TradeEvent {
    type Error = SocketError;

    fn try_from(tick: BinanceTrade) -> Result<Self, Self::Error> {
        if !is_positive_decimal(&tick.price) {
            return Err(SocketError::MalformedTick {
                reason: "price must be a positive decimal",
                payload: format!("{:?}", tick),
            });
        }

        if !is_positive_decimal(&tick.quantity) {
            return Err(SocketError::MalformedTick {
                reason: "quantity must be a positive decimal",
                payload: format!("{:?}", tick),
            });
        }

        Ok(TradeEvent {
            feed: FeedId::BinanceSpot,
            symbol: Symbol::new(tick.symbol),
            price: tick.price,
            quantity: tick.quantity,
            is_maker: tick.is_maker,
            exchange_time: tick.timestamp,
            observed_at: Utc::now(),
        })
    }
}

// Digits with at most one decimal point, and at least one digit that is not
// zero. No sign allowed, the chain has no negative balances.
fn is_positive_decimal(value: &str) -> bool {
    let mut seen_point = false;
    let mut seen_nonzero_digit = false;

    for c in value.chars() {
        match c {
            '.' if !seen_point => seen_point = true,
            '.' => return false,
            '1'..='9' => seen_nonzero_digit = true,
            '0' => {}
            _ => return false,
        }
    }

    seen_nonzero_digit
}

/*----- */
// Subscription response
/*----- */
#[derive(Debug, Deserialize, PartialEq)]
pub struct BinanceSubscriptionResponse {
    pub result: Option<String>,
    pub id: u32,
}

impl Validator for BinanceSubscriptionResponse {
    fn validate(self) -> Result<Self, SocketError>
    where
        Self: Sized,
    {
        if self.result.is_none() {
            Ok(self)
        } else {
            Err(SocketError::Subscribe(
                "received failure subscription response BinanceSpot".to_owned(),
            ))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn trade_de() {
        let payload = "{\"e\":\"trade\",\"E\":1672515782136,\"s\":\"BTCUSDT\",\"t\":12345,\"p\":\"50000.5\",\"q\":\"0.001\",\"T\":1672515782136,\"m\":true,\"M\":true}";
        let trade = serde_json::from_str::<BinanceTrade>(payload).unwrap();

        assert_eq!(trade.symbol, "BTCUSDT");
        assert_eq!(trade.id, 12345);
        assert_eq!(trade.price, "50000.5");
        assert_eq!(trade.quantity, "0.001");
        assert!(trade.is_maker);
    }

    #[test]
    fn trade_to_event_keeps_decimal_strings() {
        let payload = "{\"e\":\"trade\",\"E\":1672515782136,\"s\":\"BTCUSDT\",\"t\":12345,\"p\":\"0.0031\",\"q\":\"0.001\",\"T\":1672515782136,\"m\":false,\"M\":true}";
        let trade = serde_json::from_str::<BinanceTrade>(payload).unwrap();
        let event = TradeEvent::try_from(trade).unwrap();

        assert_eq!(event.feed, FeedId::BinanceSpot);
        assert_eq!(event.symbol, Symbol::new("BTCUSDT"));
        assert_eq!(event.price, "0.0031");
        assert_eq!(event.quantity, "0.001");
        assert!(!event.is_maker);
    }

    #[test]
    fn zero_price_tick_is_malformed() {
        let payload = "{\"e\":\"trade\",\"E\":1672515782136,\"s\":\"BTCUSDT\",\"t\":12345,\"p\":\"0.000\",\"q\":\"0.001\",\"T\":1672515782136,\"m\":true,\"M\":true}";
        let trade = serde_json::from_str::<BinanceTrade>(payload).unwrap();

        assert!(matches!(
            TradeEvent::try_from(trade),
            Err(SocketError::MalformedTick { .. })
        ));
    }

    #[test]
    fn negative_quantity_tick_is_malformed() {
        let payload = "{\"e\":\"trade\",\"E\":1672515782136,\"s\":\"BTCUSDT\",\"t\":12345,\"p\":\"50000.5\",\"q\":\"-0.001\",\"T\":1672515782136,\"m\":true,\"M\":true}";
        let trade = serde_json::from_str::<BinanceTrade>(payload).unwrap();

        assert!(matches!(
            TradeEvent::try_from(trade),
            Err(SocketError::MalformedTick { .. })
        ));
    }

    #[test]
    fn subscription_response_validation() {
        let ack = "{\"result\":null,\"id\":1}";
        let response = serde_json::from_str::<BinanceSubscriptionResponse>(ack).unwrap();
        assert!(response.validate().is_ok());

        let failure = BinanceSubscriptionResponse {
            result: Some("error".to_owned()),
            id: 1,
        };
        assert!(failure.validate().is_err());
    }
}
