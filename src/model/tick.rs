use std::fmt;
use std::str::FromStr;

use crate::error::TickRejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl FromStr for Side {
    type Err = TickRejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            _ => Err(TickRejection::UnknownSide(s.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// 9999-12-31T23:59:59.999Z, the last instant RFC 3339 can express.
pub const MAX_TIMESTAMP_MS: u64 = 253_402_300_799_999;

/// A single observed trade. Immutable once admitted to a buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub symbol: String,
    pub price: f64,
    pub size: f64,
    /// UTC milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    pub side: Side,
    pub trade_id: Option<u64>,
}

impl Tick {
    pub fn new(symbol: &str, price: f64, size: f64, timestamp_ms: u64, side: Side) -> Self {
        Self {
            symbol: symbol.to_string(),
            price,
            size,
            timestamp_ms,
            side,
            trade_id: None,
        }
    }

    /// Numeric admission check applied by `TickBuffer::append`.
    pub fn validate(&self) -> Result<(), TickRejection> {
        if self.symbol.trim().is_empty() {
            return Err(TickRejection::EmptySymbol);
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(TickRejection::NonPositivePrice(self.price));
        }
        if !self.size.is_finite() || self.size < 0.0 {
            return Err(TickRejection::NegativeSize(self.size));
        }
        if self.timestamp_ms > MAX_TIMESTAMP_MS {
            return Err(TickRejection::InvalidTimestamp(format!(
                "{}ms is past {}ms",
                self.timestamp_ms, MAX_TIMESTAMP_MS
            )));
        }
        Ok(())
    }
}
