pub mod types;
pub mod ws;

use crate::engine::MarketRegistry;
use crate::error::TickRejection;

use types::FeedMessage;

/// What became of one inbound feed message.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Appended { symbol: String },
    Rejected { symbol: Option<String>, reason: TickRejection },
    Subscribed { product_ids: Vec<String> },
    /// Heartbeats, other channels, symbols nobody subscribed to.
    Ignored,
    FeedError(String),
}

/// Parse one text frame and route an accepted tick into its symbol's buffer.
///
/// Malformed ticks are counted against the symbol's buffer when the symbol is
/// known; undecodable frames are reported as feed errors.
pub fn handle_message(text: &str, registry: &MarketRegistry) -> IngestOutcome {
    let msg = match serde_json::from_str::<FeedMessage>(text) {
        Ok(msg) => msg,
        Err(e) => return IngestOutcome::FeedError(format!("undecodable message: {}", e)),
    };

    match msg {
        FeedMessage::Ticker(event) => {
            let symbol = event.product_id.clone();
            let core = match symbol.as_deref().and_then(|s| registry.get(s)) {
                Some(core) => core,
                None if symbol.is_some() => return IngestOutcome::Ignored,
                None => {
                    return IngestOutcome::Rejected {
                        symbol: None,
                        reason: TickRejection::MissingField("product_id"),
                    }
                }
            };
            let result = match event.into_tick() {
                Ok(tick) => core.append(tick),
                Err(reason) => {
                    core.buffer().record_rejection();
                    Err(reason)
                }
            };
            match result {
                Ok(()) => IngestOutcome::Appended {
                    symbol: core.symbol().to_string(),
                },
                Err(reason) => IngestOutcome::Rejected { symbol, reason },
            }
        }
        FeedMessage::Subscriptions { channels } => IngestOutcome::Subscribed {
            product_ids: channels
                .into_iter()
                .flat_map(|c| c.product_ids)
                .collect(),
        },
        FeedMessage::Error { message, reason } => IngestOutcome::FeedError(match reason {
            Some(reason) => format!("{}: {}", message, reason),
            None => message,
        }),
        FeedMessage::Heartbeat | FeedMessage::Other => IngestOutcome::Ignored,
    }
}
