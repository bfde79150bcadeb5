use crate::model::candle::{Candle, CandleBuilder};
use crate::model::tick::Tick;

/// Resamples an irregular tick stream into fixed-width OHLCV candles.
///
/// Buckets are anchored to the Unix epoch, so two cycles over overlapping
/// data agree on bucket boundaries. Empty buckets produce no candle.
#[derive(Debug, Clone, Copy)]
pub struct CandleAggregator {
    bucket_ms: u64,
}

impl CandleAggregator {
    pub fn new(bucket_ms: u64) -> Self {
        assert!(bucket_ms > 0, "bucket width must be > 0");
        Self { bucket_ms }
    }

    pub fn bucket_ms(&self) -> u64 {
        self.bucket_ms
    }

    pub fn resample(&self, ticks: &[Tick]) -> Vec<Candle> {
        resample(ticks, self.bucket_ms)
    }
}

/// Partition `ticks` into `[start, start + bucket_ms)` buckets and build one
/// candle per non-empty bucket, ordered by bucket start.
///
/// Ticks are ordered by timestamp with a stable sort, so equal timestamps keep
/// arrival order and decide `open`/`close`.
pub fn resample(ticks: &[Tick], bucket_ms: u64) -> Vec<Candle> {
    assert!(bucket_ms > 0, "bucket width must be > 0");
    if ticks.is_empty() {
        return Vec::new();
    }

    let in_order = ticks
        .windows(2)
        .all(|w| w[0].timestamp_ms <= w[1].timestamp_ms);
    let mut ordered: Vec<&Tick> = ticks.iter().collect();
    if !in_order {
        ordered.sort_by_key(|t| t.timestamp_ms);
    }

    let mut candles = Vec::new();
    let mut current: Option<CandleBuilder> = None;
    for tick in ordered {
        match current.as_mut() {
            Some(cb) if cb.contains(tick.timestamp_ms) => cb.update(tick.price, tick.size),
            _ => {
                if let Some(cb) = current.take() {
                    candles.push(cb.finish());
                }
                current = Some(CandleBuilder::new(
                    tick.price,
                    tick.size,
                    tick.timestamp_ms,
                    bucket_ms,
                ));
            }
        }
    }
    if let Some(cb) = current {
        candles.push(cb.finish());
    }
    candles
}
