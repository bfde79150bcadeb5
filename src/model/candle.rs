#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Bucket start, inclusive.
    pub open_time: u64,
    /// Bucket end, exclusive.
    pub close_time: u64,
    pub trade_count: u32,
}

impl Candle {
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// Aggregates trade ticks into a single candle over a time bucket.
#[derive(Debug, Clone)]
pub struct CandleBuilder {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub open_time: u64,
    /// Saturates at `u64::MAX` for the last bucket before overflow.
    pub close_time: u64,
    pub interval_ms: u64,
    pub trade_count: u32,
}

impl CandleBuilder {
    /// Start a new candle. The bucket is aligned to the interval (epoch anchored).
    pub fn new(price: f64, size: f64, timestamp_ms: u64, interval_ms: u64) -> Self {
        assert!(interval_ms > 0, "interval_ms must be > 0");
        let open_time = bucket_start(timestamp_ms, interval_ms);
        Self {
            open: price,
            high: price,
            low: price,
            close: price,
            volume: size,
            open_time,
            close_time: open_time.saturating_add(interval_ms),
            interval_ms,
            trade_count: 1,
        }
    }

    /// Update the candle with a new trade.
    pub fn update(&mut self, price: f64, size: f64) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.volume += size;
        self.trade_count = self.trade_count.saturating_add(1);
    }

    /// Check if a timestamp belongs to this candle's time bucket.
    pub fn contains(&self, timestamp_ms: u64) -> bool {
        timestamp_ms >= self.open_time && timestamp_ms - self.open_time < self.interval_ms
    }

    /// Finalize into an immutable Candle.
    pub fn finish(&self) -> Candle {
        Candle {
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            open_time: self.open_time,
            close_time: self.close_time,
            trade_count: self.trade_count,
        }
    }
}

pub fn bucket_start(timestamp_ms: u64, interval_ms: u64) -> u64 {
    timestamp_ms - (timestamp_ms % interval_ms)
}
