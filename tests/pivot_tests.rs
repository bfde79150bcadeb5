use ticker_chart::indicator::pivot::{pivot_levels, price_range, PivotLevels, RollingRange};
use ticker_chart::model::tick::{Side, Tick};

fn ticks(prices: &[f64]) -> Vec<Tick> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| Tick::new("ETH-USD", p, 1.0, i as u64 * 100, Side::Buy))
        .collect()
}

#[test]
fn classic_levels_for_10_20_30() {
    let levels = pivot_levels(&ticks(&[10.0, 20.0, 30.0])).unwrap();
    assert!((levels.pivot - 23.33).abs() < 1e-2);
    assert!((levels.resistance1 - 36.67).abs() < 1e-2);
    assert!((levels.support1 - 16.67).abs() < 1e-2);
    assert!((levels.resistance2 - 43.33).abs() < 1e-2);
    assert!((levels.support2 - 3.33).abs() < 1e-2);
}

#[test]
fn single_price_window_collapses_outer_levels_to_pivot() {
    let levels = pivot_levels(&ticks(&[42.0, 42.0, 42.0])).unwrap();
    assert!((levels.pivot - 42.0).abs() < 1e-12);
    assert!((levels.resistance2 - levels.pivot).abs() < 1e-12);
    assert!((levels.support2 - levels.pivot).abs() < 1e-12);
    assert!((levels.resistance1 - 42.0).abs() < 1e-12);
    assert!((levels.support1 - 42.0).abs() < 1e-12);
}

#[test]
fn empty_window_has_no_levels() {
    assert_eq!(pivot_levels(&[]), None);
    assert_eq!(price_range(&[]), None);
}

#[test]
fn last_price_is_the_latest_arrival_not_the_extreme() {
    let range = price_range(&ticks(&[30.0, 10.0, 20.0])).unwrap();
    assert!((range.last - 20.0).abs() < f64::EPSILON);
    let levels = PivotLevels::from_range(&range);
    assert!((levels.pivot - 20.0).abs() < 1e-12);
}

#[test]
fn rolling_range_matches_rescan_at_every_step() {
    let window = 50;
    let mut rolling = RollingRange::new(window);
    let mut state = 7u64;
    let mut prices = Vec::new();
    for _ in 0..5_000 {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let p = 100.0 + ((state >> 40) % 1_000) as f64 / 10.0;
        prices.push(p);
        rolling.push(p);

        let start = prices.len().saturating_sub(window);
        let expected = price_range(&ticks(&prices[start..])).unwrap();
        let got = rolling.range().unwrap();
        assert_eq!(got, expected);
    }
}
