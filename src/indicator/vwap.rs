use crate::model::candle::Candle;

/// Running VWAP over candle closes: sum(close * volume) / sum(volume).
#[derive(Debug, Clone, Default)]
pub struct VwapAccumulator {
    price_volume: f64,
    volume: f64,
}

impl VwapAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a candle, return the VWAP including it.
    pub fn push(&mut self, candle: &Candle) -> Option<f64> {
        self.push_parts(candle.close, candle.volume)
    }

    pub fn push_parts(&mut self, price: f64, volume: f64) -> Option<f64> {
        self.price_volume += price * volume;
        self.volume += volume;
        self.value()
    }

    /// `None` while cumulative volume is zero.
    pub fn value(&self) -> Option<f64> {
        if self.volume > 0.0 {
            Some(self.price_volume / self.volume)
        } else {
            None
        }
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// VWAP over the whole candle sequence, computed in one pass.
pub fn vwap(candles: &[Candle]) -> Option<f64> {
    let price_volume: f64 = candles.iter().map(|c| c.close * c.volume).sum();
    let volume: f64 = candles.iter().map(|c| c.volume).sum();
    if volume > 0.0 {
        Some(price_volume / volume)
    } else {
        None
    }
}

/// Cumulative VWAP as of each candle, aligned index for index with `candles`.
pub fn vwap_series(candles: &[Candle]) -> Vec<Option<f64>> {
    let mut acc = VwapAccumulator::new();
    candles.iter().map(|c| acc.push(c)).collect()
}
