use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite;

use super::types::SubscribeRequest;
use super::{handle_message, IngestOutcome};
use crate::engine::MarketRegistry;
use crate::error::AppError;
use crate::event::{AppEvent, WsConnectionStatus};

/// Exponential backoff for reconnection.
struct ExponentialBackoff {
    current: Duration,
    initial: Duration,
    max: Duration,
    factor: f64,
}

impl ExponentialBackoff {
    fn new(initial: Duration, max: Duration, factor: f64) -> Self {
        Self {
            current: initial,
            initial,
            max,
            factor,
        }
    }

    fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = Duration::from_secs_f64(
            (self.current.as_secs_f64() * self.factor).min(self.max.as_secs_f64()),
        );
        delay
    }

    fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Streams ticker events into the per-symbol buffers until shutdown.
#[derive(Debug, Clone)]
pub struct CoinbaseWsClient {
    url: String,
    channel: String,
    product_ids: Vec<String>,
    initial_backoff: Duration,
}

impl CoinbaseWsClient {
    pub fn new(ws_url: &str, channel: &str, product_ids: Vec<String>) -> Self {
        Self {
            url: ws_url.to_string(),
            channel: channel.to_string(),
            product_ids,
            initial_backoff: Duration::from_secs(1),
        }
    }

    pub fn with_initial_backoff(mut self, initial: Duration) -> Self {
        self.initial_backoff = initial;
        self
    }

    /// Connect and run the WebSocket loop with automatic reconnection.
    /// Returns once `shutdown` flips (or its sender is dropped).
    ///
    /// Events are sent with `try_send`: a full or abandoned channel drops
    /// them and never holds up ingestion or shutdown.
    pub async fn connect_and_run(
        &self,
        registry: Arc<MarketRegistry>,
        status_tx: mpsc::Sender<AppEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let mut backoff =
            ExponentialBackoff::new(self.initial_backoff, Duration::from_secs(60), 2.0);
        let mut attempt: u32 = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }
            attempt += 1;
            match self
                .connect_once(&registry, &status_tx, &mut shutdown, &mut backoff)
                .await
            {
                Ok(()) => {
                    // Clean shutdown requested
                    let _ =
                        status_tx.try_send(AppEvent::WsStatus(WsConnectionStatus::Disconnected));
                    break;
                }
                Err(e) => {
                    tracing::warn!(url = %self.url, error = %e, attempt, "WS connection lost");
                    let _ =
                        status_tx.try_send(AppEvent::WsStatus(WsConnectionStatus::Disconnected));
                    let _ = status_tx.try_send(AppEvent::LogMessage(format!("WS error: {:#}", e)));

                    let delay = backoff.next_delay();
                    let _ = status_tx.try_send(AppEvent::WsStatus(WsConnectionStatus::Reconnecting {
                        attempt,
                        delay_ms: delay.as_millis() as u64,
                    }));

                    tokio::select! {
                        _ = tokio::time::sleep(delay) => continue,
                        _ = shutdown.changed() => {
                            let _ = status_tx.try_send(AppEvent::LogMessage(
                                "Shutdown during reconnect".to_string(),
                            ));
                            break;
                        }
                    }
                }
            }
        }
        tracing::info!(url = %self.url, "WS ingestion stopped");
        Ok(())
    }

    async fn connect_once(
        &self,
        registry: &MarketRegistry,
        status_tx: &mpsc::Sender<AppEvent>,
        shutdown: &mut watch::Receiver<bool>,
        backoff: &mut ExponentialBackoff,
    ) -> Result<()> {
        let _ = status_tx.try_send(AppEvent::LogMessage(format!("Connecting to {}", self.url)));

        let (ws_stream, _resp) = tokio::select! {
            res = tokio_tungstenite::connect_async(self.url.as_str()) => {
                res.map_err(|e| AppError::WebSocket(format!("connect failed: {}", e)))?
            }
            _ = shutdown.changed() => return Ok(()),
        };

        let (mut write, mut read) = ws_stream.split();

        let subscribe = SubscribeRequest::new(&self.channel, &self.product_ids);
        let payload = serde_json::to_string(&subscribe).map_err(AppError::from)?;
        write
            .send(tungstenite::Message::Text(payload))
            .await
            .context("send subscribe request")?;

        backoff.reset();
        tracing::info!(url = %self.url, products = ?self.product_ids, "WebSocket connected");
        let _ = status_tx.try_send(AppEvent::WsStatus(WsConnectionStatus::Connected));

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(tungstenite::Message::Text(text))) => {
                            self.dispatch(handle_message(&text, registry), status_tx);
                        }
                        Some(Ok(tungstenite::Message::Close(frame))) => {
                            return Err(AppError::WebSocket(format!("closed by server: {:?}", frame)).into());
                        }
                        Some(Ok(_)) => {
                            // tokio-tungstenite answers pings itself
                        }
                        Some(Err(e)) => {
                            return Err(AppError::WebSocket(format!("read error: {}", e)).into());
                        }
                        None => {
                            return Err(AppError::WebSocket("stream ended".to_string()).into());
                        }
                    }
                }
                _ = shutdown.changed() => {
                    let close = write.send(tungstenite::Message::Close(None));
                    if tokio::time::timeout(Duration::from_secs(1), close).await.is_err() {
                        tracing::warn!(url = %self.url, "Close frame not flushed before timeout");
                    }
                    return Ok(());
                }
            }
        }
    }

    fn dispatch(&self, outcome: IngestOutcome, status_tx: &mpsc::Sender<AppEvent>) {
        match outcome {
            IngestOutcome::Appended { .. } | IngestOutcome::Ignored => {}
            IngestOutcome::Rejected { symbol, reason } => {
                tracing::debug!(symbol = ?symbol, reason = %reason, "Tick rejected");
                let _ = status_tx.try_send(AppEvent::TickRejected { symbol, reason });
            }
            IngestOutcome::Subscribed { product_ids } => {
                tracing::info!(products = ?product_ids, "Subscription confirmed");
                let _ = status_tx.try_send(AppEvent::Subscribed { product_ids });
            }
            IngestOutcome::FeedError(msg) => {
                tracing::warn!(error = %msg, "Feed error message");
                let _ = status_tx.try_send(AppEvent::Error(msg));
            }
        }
    }
}
