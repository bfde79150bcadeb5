use std::collections::VecDeque;

use crate::model::tick::Tick;

/// High/low/last over a trailing tick window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub high: f64,
    pub low: f64,
    pub last: f64,
    pub count: usize,
}

impl PriceRange {
    pub fn spread(&self) -> f64 {
        self.high - self.low
    }
}

/// Classic floor-trader pivot with two support and two resistance levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotLevels {
    pub pivot: f64,
    pub resistance1: f64,
    pub resistance2: f64,
    pub support1: f64,
    pub support2: f64,
}

impl PivotLevels {
    pub fn from_range(range: &PriceRange) -> Self {
        let pivot = (range.high + range.low + range.last) / 3.0;
        let spread = range.spread();
        Self {
            pivot,
            resistance1: 2.0 * pivot - range.low,
            resistance2: pivot + spread,
            support1: 2.0 * pivot - range.high,
            support2: pivot - spread,
        }
    }
}

/// Scan a window of ticks. `None` for an empty window.
pub fn price_range(ticks: &[Tick]) -> Option<PriceRange> {
    let last = ticks.last()?.price;
    let (high, low) = ticks
        .iter()
        .fold((f64::NEG_INFINITY, f64::INFINITY), |(hi, lo), t| {
            (hi.max(t.price), lo.min(t.price))
        });
    Some(PriceRange {
        high,
        low,
        last,
        count: ticks.len(),
    })
}

pub fn pivot_levels(ticks: &[Tick]) -> Option<PivotLevels> {
    price_range(ticks).map(|r| PivotLevels::from_range(&r))
}

/// Sliding max/min over the last `window` prices with amortized O(1) push.
///
/// Each deque holds (push index, price) and stays monotonic: `maxs` is
/// non-increasing front to back, `mins` non-decreasing, so the front is the
/// extreme of the live window.
#[derive(Debug, Clone)]
pub struct RollingRange {
    window: usize,
    pushed: u64,
    maxs: VecDeque<(u64, f64)>,
    mins: VecDeque<(u64, f64)>,
    last: Option<f64>,
}

impl RollingRange {
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "rolling window must be > 0");
        Self {
            window,
            pushed: 0,
            maxs: VecDeque::new(),
            mins: VecDeque::new(),
            last: None,
        }
    }

    pub fn push(&mut self, price: f64) {
        let idx = self.pushed;
        self.pushed += 1;

        while self.maxs.back().is_some_and(|&(_, v)| v <= price) {
            self.maxs.pop_back();
        }
        self.maxs.push_back((idx, price));
        while self.mins.back().is_some_and(|&(_, v)| v >= price) {
            self.mins.pop_back();
        }
        self.mins.push_back((idx, price));

        let lower = self.pushed.saturating_sub(self.window as u64);
        while self.maxs.front().is_some_and(|&(i, _)| i < lower) {
            self.maxs.pop_front();
        }
        while self.mins.front().is_some_and(|&(i, _)| i < lower) {
            self.mins.pop_front();
        }
        self.last = Some(price);
    }

    pub fn range(&self) -> Option<PriceRange> {
        let last = self.last?;
        let high = self.maxs.front()?.1;
        let low = self.mins.front()?.1;
        Some(PriceRange {
            high,
            low,
            last,
            count: self.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.pushed.min(self.window as u64) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.pushed == 0
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn reset(&mut self) {
        self.pushed = 0;
        self.maxs.clear();
        self.mins.clear();
        self.last = None;
    }
}
