pub mod pivot;
pub mod vwap;

use parking_lot::Mutex;
use serde::Deserialize;

use crate::model::candle::Candle;
use crate::tick_buffer::BufferSnapshot;

use pivot::{price_range, PivotLevels, PriceRange, RollingRange};
use vwap::VwapAccumulator;

/// How the pivot window is evaluated each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorMode {
    /// Scan the trailing window from scratch.
    #[default]
    Rescan,
    /// Feed only ticks that arrived since the previous cycle into a rolling range.
    Incremental,
}

/// Latest indicator values. Only produced for a non-empty window.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub pivot: f64,
    pub resistance1: f64,
    pub resistance2: f64,
    pub support1: f64,
    pub support2: f64,
    /// VWAP as of the latest candle; `None` while cumulative volume is zero.
    pub vwap: Option<f64>,
    pub window_high: f64,
    pub window_low: f64,
    pub last_price: f64,
    pub window_len: usize,
}

impl IndicatorSnapshot {
    fn new(range: &PriceRange, vwap: Option<f64>) -> Self {
        let levels = PivotLevels::from_range(range);
        Self {
            pivot: levels.pivot,
            resistance1: levels.resistance1,
            resistance2: levels.resistance2,
            support1: levels.support1,
            support2: levels.support2,
            vwap,
            window_high: range.high,
            window_low: range.low,
            last_price: range.last,
            window_len: range.count,
        }
    }

    pub fn levels(&self) -> PivotLevels {
        PivotLevels {
            pivot: self.pivot,
            resistance1: self.resistance1,
            resistance2: self.resistance2,
            support1: self.support1,
            support2: self.support2,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorOutput {
    pub snapshot: Option<IndicatorSnapshot>,
    pub vwap_series: Vec<Option<f64>>,
}

#[derive(Debug)]
struct RollingState {
    range: RollingRange,
    next_seq: u64,
}

/// Pivot levels over the trailing `window` ticks plus cumulative VWAP over
/// every candle of the cycle.
#[derive(Debug)]
pub struct IndicatorEngine {
    window: usize,
    mode: IndicatorMode,
    rolling: Mutex<RollingState>,
}

impl IndicatorEngine {
    pub fn new(window: usize, mode: IndicatorMode) -> Self {
        assert!(window > 0, "indicator window must be > 0");
        Self {
            window,
            mode,
            rolling: Mutex::new(RollingState {
                range: RollingRange::new(window),
                next_seq: 0,
            }),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn mode(&self) -> IndicatorMode {
        self.mode
    }

    pub fn compute(&self, ticks: &BufferSnapshot, candles: &[Candle]) -> IndicatorOutput {
        let mut acc = VwapAccumulator::new();
        let vwap_series: Vec<Option<f64>> = candles.iter().map(|c| acc.push(c)).collect();

        let range = match self.mode {
            IndicatorMode::Rescan => price_range(ticks.tail(self.window)),
            IndicatorMode::Incremental => self.advance_rolling(ticks),
        };

        IndicatorOutput {
            snapshot: range.map(|r| IndicatorSnapshot::new(&r, acc.value())),
            vwap_series,
        }
    }

    fn advance_rolling(&self, ticks: &BufferSnapshot) -> Option<PriceRange> {
        let mut state = self.rolling.lock();

        // An older snapshot than the one already consumed (concurrent pulls).
        if state.next_seq > ticks.end_seq() {
            return price_range(ticks.tail(self.window));
        }

        if state.next_seq < ticks.first_seq() {
            // Ticks were evicted before this engine saw them; refill.
            state.range.reset();
            for t in ticks.tail(self.window) {
                state.range.push(t.price);
            }
        } else {
            let from = (state.next_seq - ticks.first_seq()) as usize;
            for t in &ticks.ticks()[from..] {
                state.range.push(t.price);
            }
        }
        state.next_seq = ticks.end_seq();
        state.range.range()
    }
}
