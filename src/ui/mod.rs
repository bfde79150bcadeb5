pub mod chart;
pub mod dashboard;
pub mod feed_health;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::engine::MarketSnapshot;
use crate::event::{AppEvent, WsConnectionStatus};

use chart::CandleChart;
use dashboard::{KeybindBar, LevelsPanel, LogPanel, StatusBar};
use feed_health::{classify_stats, FeedHealth};

const MAX_LOG_MESSAGES: usize = 200;

/// Presenter state: which symbol is shown, the last pulled snapshot, and
/// feed status from the ingestion task.
pub struct AppState {
    pub symbols: Vec<String>,
    pub selected: usize,
    pub bucket_ms: u64,
    pub timeframe: String,
    pub visible_candles: usize,
    pub snapshot: Option<MarketSnapshot>,
    pub ws_connected: bool,
    pub paused: bool,
    pub rejected_ticks: u64,
    pub log_messages: Vec<String>,
}

impl AppState {
    pub fn new(symbols: Vec<String>, bucket_ms: u64, timeframe: &str, visible_candles: usize) -> Self {
        Self {
            symbols,
            selected: 0,
            bucket_ms,
            timeframe: timeframe.to_string(),
            visible_candles,
            snapshot: None,
            ws_connected: false,
            paused: false,
            rejected_ticks: 0,
            log_messages: Vec::new(),
        }
    }

    pub fn selected_symbol(&self) -> Option<&str> {
        self.symbols.get(self.selected).map(String::as_str)
    }

    pub fn select_next(&mut self) {
        if !self.symbols.is_empty() {
            self.selected = (self.selected + 1) % self.symbols.len();
            self.snapshot = None;
        }
    }

    pub fn select_prev(&mut self) {
        if !self.symbols.is_empty() {
            self.selected = (self.selected + self.symbols.len() - 1) % self.symbols.len();
            self.snapshot = None;
        }
    }

    pub fn set_bucket(&mut self, bucket_ms: u64, timeframe: &str) {
        self.bucket_ms = bucket_ms;
        self.timeframe = timeframe.to_string();
        self.push_log(format!("Switched to {} candles", timeframe));
    }

    /// Keep the latest pull; older candles beyond the visible window are dropped.
    pub fn set_snapshot(&mut self, mut snapshot: MarketSnapshot) {
        if snapshot.candles.len() > self.visible_candles {
            let excess = snapshot.candles.len() - self.visible_candles;
            snapshot.candles.drain(..excess);
            snapshot.vwap_series.drain(..excess.min(snapshot.vwap_series.len()));
        }
        self.snapshot = Some(snapshot);
    }

    pub fn health(&self, now_ms: u64) -> FeedHealth {
        let stats = self.snapshot.as_ref().map(|s| s.stats).unwrap_or_default();
        classify_stats(self.ws_connected, &stats, now_ms)
    }

    pub fn push_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_MESSAGES {
            self.log_messages.remove(0);
        }
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::WsStatus(ref status) => match status {
                WsConnectionStatus::Connected => {
                    self.ws_connected = true;
                    self.push_log("WebSocket Connected".to_string());
                }
                WsConnectionStatus::Disconnected => {
                    self.ws_connected = false;
                    self.push_log("[WARN] WebSocket Disconnected".to_string());
                }
                WsConnectionStatus::Reconnecting { attempt, delay_ms } => {
                    self.ws_connected = false;
                    self.push_log(format!(
                        "[WARN] Reconnecting (attempt {}, wait {}ms)",
                        attempt, delay_ms
                    ));
                }
            },
            AppEvent::Subscribed { product_ids } => {
                self.push_log(format!("Subscribed: {}", product_ids.join(", ")));
            }
            AppEvent::TickRejected { symbol, reason } => {
                self.rejected_ticks += 1;
                self.push_log(format!(
                    "[WARN] Rejected tick ({}): {}",
                    symbol.as_deref().unwrap_or("?"),
                    reason
                ));
            }
            AppEvent::LogMessage(msg) => {
                self.push_log(msg);
            }
            AppEvent::Error(msg) => {
                self.push_log(format!("[ERR] {}", msg));
            }
        }
    }
}

pub fn render(frame: &mut Frame, state: &AppState, now_ms: u64) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(8),    // chart + levels
            Constraint::Length(6), // log
            Constraint::Length(1), // keybinds
        ])
        .split(frame.area());

    let symbol = state.selected_symbol().unwrap_or("-");
    let stats = state.snapshot.as_ref().map(|s| s.stats).unwrap_or_default();

    frame.render_widget(
        StatusBar {
            symbol,
            ws_connected: state.ws_connected,
            paused: state.paused,
            health: state.health(now_ms),
            stats: &stats,
            timeframe: &state.timeframe,
        },
        outer[0],
    );

    let main_area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(24)])
        .split(outer[1]);

    let (candles, vwap, indicators) = match &state.snapshot {
        Some(s) => (&s.candles[..], &s.vwap_series[..], s.indicators.as_ref()),
        None => (&[][..], &[][..], None),
    };

    frame.render_widget(
        CandleChart::new(candles, symbol, &state.timeframe)
            .vwap(vwap)
            .levels(indicators),
        main_area[0],
    );
    frame.render_widget(LevelsPanel::new(indicators, candles.len()), main_area[1]);
    frame.render_widget(LogPanel::new(&state.log_messages), outer[2]);
    frame.render_widget(KeybindBar, outer[3]);
}
