use std::collections::BTreeMap;
use std::sync::Arc;

use crate::aggregator::resample;
use crate::config::AggregationConfig;
use crate::error::TickRejection;
use crate::indicator::{IndicatorEngine, IndicatorMode, IndicatorSnapshot};
use crate::model::candle::Candle;
use crate::model::tick::Tick;
use crate::tick_buffer::{BufferStats, TickBuffer};

/// Everything the presenter needs for one refresh.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub bucket_ms: u64,
    pub candles: Vec<Candle>,
    /// Cumulative VWAP per candle, same length as `candles`.
    pub vwap_series: Vec<Option<f64>>,
    pub indicators: Option<IndicatorSnapshot>,
    pub stats: BufferStats,
}

impl MarketSnapshot {
    pub fn last_price(&self) -> Option<f64> {
        self.indicators
            .as_ref()
            .map(|i| i.last_price)
            .or_else(|| self.candles.last().map(|c| c.close))
    }
}

/// Tick history, candle aggregation and indicators for one symbol.
///
/// `append` and `pull_snapshot` may be called from different tasks at the
/// same time; a pull only holds the buffer lock while copying.
#[derive(Debug)]
pub struct MarketCore {
    symbol: String,
    bucket_ms: u64,
    buffer: TickBuffer,
    indicators: IndicatorEngine,
}

impl MarketCore {
    pub fn new(
        symbol: &str,
        capacity: usize,
        bucket_ms: u64,
        indicator_window: usize,
        mode: IndicatorMode,
    ) -> Self {
        assert!(bucket_ms > 0, "bucket width must be > 0");
        Self {
            symbol: symbol.to_string(),
            bucket_ms,
            buffer: TickBuffer::new(capacity),
            // The buffer never holds more than `capacity` ticks to scan.
            indicators: IndicatorEngine::new(indicator_window.min(capacity), mode),
        }
    }

    pub fn from_config(symbol: &str, cfg: &AggregationConfig) -> anyhow::Result<Self> {
        Ok(Self::new(
            symbol,
            cfg.capacity,
            cfg.bucket_width_ms()?,
            cfg.indicator_window,
            cfg.indicator_mode,
        ))
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bucket_ms(&self) -> u64 {
        self.bucket_ms
    }

    pub fn buffer(&self) -> &TickBuffer {
        &self.buffer
    }

    pub fn append(&self, tick: Tick) -> Result<(), TickRejection> {
        self.buffer.append(tick)
    }

    pub fn pull_snapshot(&self) -> MarketSnapshot {
        self.pull_snapshot_with(self.bucket_ms)
    }

    /// Pull cycle at an explicit candle width.
    pub fn pull_snapshot_with(&self, bucket_ms: u64) -> MarketSnapshot {
        let (ticks, stats) = self.buffer.snapshot_with_stats();
        let candles = resample(ticks.ticks(), bucket_ms);
        let output = self.indicators.compute(&ticks, &candles);

        MarketSnapshot {
            symbol: self.symbol.clone(),
            bucket_ms,
            candles,
            vwap_series: output.vwap_series,
            indicators: output.snapshot,
            stats,
        }
    }
}

/// One `MarketCore` per subscribed symbol.
#[derive(Debug, Clone, Default)]
pub struct MarketRegistry {
    cores: BTreeMap<String, Arc<MarketCore>>,
    order: Vec<String>,
}

impl MarketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(symbols: &[String], cfg: &AggregationConfig) -> anyhow::Result<Self> {
        let mut registry = Self::new();
        for symbol in symbols {
            registry.insert(MarketCore::from_config(symbol, cfg)?);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, core: MarketCore) {
        let symbol = core.symbol().to_string();
        if !self.cores.contains_key(&symbol) {
            self.order.push(symbol.clone());
        }
        self.cores.insert(symbol, Arc::new(core));
    }

    pub fn get(&self, symbol: &str) -> Option<&Arc<MarketCore>> {
        self.cores.get(symbol)
    }

    /// Symbols in subscription order.
    pub fn symbols(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
