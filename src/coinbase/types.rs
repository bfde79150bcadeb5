use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TickRejection;
use crate::model::tick::{Side, Tick};

/// Inbound feed message, tagged by `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedMessage {
    Ticker(TickerEvent),
    Subscriptions {
        #[serde(default)]
        channels: Vec<ChannelSubscription>,
    },
    Heartbeat,
    Error {
        #[serde(default)]
        message: String,
        #[serde(default)]
        reason: Option<String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ChannelSubscription {
    pub name: String,
    #[serde(default)]
    pub product_ids: Vec<String>,
}

/// `ticker` channel event. Numeric fields arrive as strings and may be
/// absent; they are checked when converting into a `Tick`.
#[derive(Debug, Clone, Deserialize)]
pub struct TickerEvent {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub last_size: Option<Value>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub trade_id: Option<u64>,
}

impl TickerEvent {
    pub fn into_tick(self) -> Result<Tick, TickRejection> {
        let symbol = self
            .product_id
            .filter(|s| !s.trim().is_empty())
            .ok_or(TickRejection::MissingField("product_id"))?;
        let price = numeric_field("price", self.price.as_ref())?;
        let size = numeric_field("last_size", self.last_size.as_ref())?;
        let side: Side = self
            .side
            .as_deref()
            .ok_or(TickRejection::MissingField("side"))?
            .parse()?;
        let time = self.time.ok_or(TickRejection::MissingField("time"))?;
        let timestamp_ms = parse_timestamp_ms(&time)?;

        Ok(Tick {
            symbol,
            price,
            size,
            timestamp_ms,
            side,
            trade_id: self.trade_id,
        })
    }
}

/// Accept a JSON string or number; treat null and "" as missing.
fn numeric_field(field: &'static str, value: Option<&Value>) -> Result<f64, TickRejection> {
    match value {
        None | Some(Value::Null) => Err(TickRejection::MissingField(field)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(TickRejection::MissingField(field)),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| TickRejection::NotNumeric {
            field,
            value: s.clone(),
        }),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| TickRejection::NotNumeric {
            field,
            value: n.to_string(),
        }),
        Some(other) => Err(TickRejection::NotNumeric {
            field,
            value: other.to_string(),
        }),
    }
}

/// RFC 3339 timestamp to epoch milliseconds.
pub fn parse_timestamp_ms(s: &str) -> Result<u64, TickRejection> {
    let dt = DateTime::parse_from_rfc3339(s.trim())
        .map_err(|e| TickRejection::InvalidTimestamp(format!("{}: {}", s, e)))?;
    u64::try_from(dt.timestamp_millis())
        .map_err(|_| TickRejection::InvalidTimestamp(format!("{} is before the epoch", s)))
}

#[derive(Debug, Serialize)]
pub struct SubscribeRequest {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub channels: Vec<ChannelSubscription>,
}

impl SubscribeRequest {
    pub fn new(channel: &str, product_ids: &[String]) -> Self {
        Self {
            kind: "subscribe",
            channels: vec![ChannelSubscription {
                name: channel.to_string(),
                product_ids: product_ids.to_vec(),
            }],
        }
    }
}
