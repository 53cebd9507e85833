use serde::{Deserialize, Serialize};
use std::fmt::Display;

/*----- */
// Symbol model
/*----- */
// Canonical uppercase form, e.g. "BTCUSDT". Feed connectors lowercase it
// where their wire format requires.
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub struct Symbol(String);

impl Symbol {
    pub fn new<S>(symbol: S) -> Self
    where
        S: Into<String>,
    {
        Self(symbol.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

/*----- */
// Feed IDs
/*----- */
#[derive(Debug, PartialEq, Hash, Eq, Clone, Copy, Ord, PartialOrd, Deserialize, Serialize)]
pub enum FeedId {
    BinanceSpot,
}

impl FeedId {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedId::BinanceSpot => "binancespot",
        }
    }
}

impl Display for FeedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
