use ticker_chart::aggregator::{resample, CandleAggregator};
use ticker_chart::model::tick::{Side, Tick};

fn tick(price: f64, size: f64, ts: u64) -> Tick {
    Tick::new("ETH-USD", price, size, ts, Side::Sell)
}

#[test]
fn empty_input_yields_no_candles() {
    assert!(resample(&[], 15_000).is_empty());
}

#[test]
fn buckets_are_anchored_to_epoch_not_first_tick() {
    let ticks = vec![tick(10.0, 1.0, 7_000), tick(11.0, 1.0, 16_000)];
    let candles = resample(&ticks, 15_000);
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].open_time, 0);
    assert_eq!(candles[0].close_time, 15_000);
    assert_eq!(candles[1].open_time, 15_000);
}

#[test]
fn ohlcv_per_bucket() {
    let ticks = vec![
        tick(100.0, 1.0, 30_000),
        tick(104.0, 0.5, 31_000),
        tick(98.0, 2.0, 40_000),
        tick(101.0, 0.25, 44_999),
        tick(99.0, 3.0, 45_000),
    ];
    let candles = CandleAggregator::new(15_000).resample(&ticks);
    assert_eq!(candles.len(), 2);

    let c = &candles[0];
    assert_eq!(c.open_time, 30_000);
    assert!((c.open - 100.0).abs() < f64::EPSILON);
    assert!((c.high - 104.0).abs() < f64::EPSILON);
    assert!((c.low - 98.0).abs() < f64::EPSILON);
    assert!((c.close - 101.0).abs() < f64::EPSILON);
    assert!((c.volume - 3.75).abs() < 1e-12);
    assert_eq!(c.trade_count, 4);

    let c = &candles[1];
    assert_eq!(c.open_time, 45_000);
    assert!((c.open - 99.0).abs() < f64::EPSILON);
    assert!((c.close - 99.0).abs() < f64::EPSILON);
    assert!((c.volume - 3.0).abs() < f64::EPSILON);
}

#[test]
fn empty_buckets_are_skipped_not_zero_filled() {
    let ticks = vec![tick(10.0, 1.0, 1_000), tick(12.0, 1.0, 61_000)];
    let candles = resample(&ticks, 15_000);
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].open_time, 0);
    assert_eq!(candles[1].open_time, 60_000);
}

#[test]
fn equal_timestamps_keep_arrival_order_for_open_and_close() {
    let ticks = vec![
        tick(5.0, 1.0, 2_000),
        tick(1.0, 1.0, 1_000),
        tick(2.0, 1.0, 1_000),
        tick(3.0, 1.0, 2_000),
    ];
    let candles = resample(&ticks, 15_000);
    assert_eq!(candles.len(), 1);
    // sorted: 1.0@1000, 2.0@1000, 5.0@2000, 3.0@2000
    assert!((candles[0].open - 1.0).abs() < f64::EPSILON);
    assert!((candles[0].close - 3.0).abs() < f64::EPSILON);
    assert!((candles[0].high - 5.0).abs() < f64::EPSILON);
}

#[test]
fn out_of_order_ticks_land_in_their_own_bucket() {
    let ticks = vec![
        tick(10.0, 1.0, 20_000),
        tick(20.0, 1.0, 5_000),
        tick(30.0, 1.0, 21_000),
    ];
    let candles = resample(&ticks, 15_000);
    assert_eq!(candles.len(), 2);
    assert!((candles[0].open - 20.0).abs() < f64::EPSILON);
    assert!((candles[1].open - 10.0).abs() < f64::EPSILON);
    assert!((candles[1].close - 30.0).abs() < f64::EPSILON);
}

/// Deterministic pseudo-random walk so failures are reproducible.
fn walk(n: usize, seed: u64) -> Vec<Tick> {
    let mut state = seed;
    let mut price = 1_500.0;
    let mut ts = 1_700_000_000_000u64;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let r = (state >> 33) as f64 / (1u64 << 31) as f64;
            price = (price + (r - 0.5) * 4.0).max(1.0);
            ts += state % 4_000;
            tick(price, r * 3.0, ts)
        })
        .collect()
}

#[test]
fn every_candle_is_ohlc_consistent() {
    for seed in 1..6u64 {
        let ticks = walk(2_000, seed);
        for c in resample(&ticks, 15_000) {
            assert!(c.high >= c.open && c.high >= c.close, "{:?}", c);
            assert!(c.low <= c.open && c.low <= c.close, "{:?}", c);
            assert!(c.volume >= 0.0);
            assert!(c.close_time - c.open_time == 15_000);
        }
    }
}

#[test]
fn resampling_is_deterministic_and_volume_order_independent() {
    let ticks = walk(3_000, 42);
    let a = resample(&ticks, 15_000);
    let b = resample(&ticks, 15_000);
    assert_eq!(a, b);

    // Reverse arrival order; distinct timestamps make open/close well defined.
    let mut reversed = ticks.clone();
    reversed.reverse();
    let mut dedup = reversed.clone();
    dedup.dedup_by_key(|t| t.timestamp_ms);
    let forward: Vec<Tick> = dedup.iter().rev().cloned().collect();
    let c = resample(&dedup, 15_000);
    let d = resample(&forward, 15_000);
    assert_eq!(c.len(), d.len());
    for (x, y) in c.iter().zip(d.iter()) {
        assert_eq!(x.open_time, y.open_time);
        assert!((x.open - y.open).abs() < f64::EPSILON);
        assert!((x.close - y.close).abs() < f64::EPSILON);
        assert!((x.high - y.high).abs() < f64::EPSILON);
        assert!((x.low - y.low).abs() < f64::EPSILON);
        let tol = 1e-8 * x.volume.abs().max(1.0);
        assert!((x.volume - y.volume).abs() < tol);
    }
}

#[test]
#[should_panic(expected = "bucket width must be > 0")]
fn zero_bucket_width_panics() {
    CandleAggregator::new(0);
}

#[test]
fn timestamps_near_the_top_of_the_range_do_not_overflow() {
    let ticks = vec![
        tick(1.0, 1.0, u64::MAX - 10),
        tick(3.0, 2.0, u64::MAX),
    ];
    let candles = resample(&ticks, 15_000);
    assert_eq!(candles.len(), 1);
    assert_eq!(candles[0].close_time, u64::MAX);
    assert!(candles[0].close_time >= candles[0].open_time);
    assert!((candles[0].close - 3.0).abs() < f64::EPSILON);
    assert_eq!(candles[0].trade_count, 2);
}
