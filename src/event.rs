use crate::error::TickRejection;

#[derive(Debug, Clone, PartialEq)]
pub enum WsConnectionStatus {
    Connected,
    Disconnected,
    Reconnecting { attempt: u32, delay_ms: u64 },
}

/// Messages from the ingestion task to the presenter.
#[derive(Debug, Clone)]
pub enum AppEvent {
    WsStatus(WsConnectionStatus),
    Subscribed { product_ids: Vec<String> },
    TickRejected { symbol: Option<String>, reason: TickRejection },
    LogMessage(String),
    Error(String),
}
