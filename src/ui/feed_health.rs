use crate::tick_buffer::BufferStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedHealth {
    Ok,
    Warn,
    Crit,
}

impl FeedHealth {
    pub fn label(&self) -> &'static str {
        match self {
            FeedHealth::Ok => "OK",
            FeedHealth::Warn => "WARN",
            FeedHealth::Crit => "CRIT",
        }
    }
}

pub fn ratio_pct(numer: u64, denom: u64) -> f64 {
    if denom == 0 {
        return 0.0;
    }
    (numer as f64) * 100.0 / (denom as f64)
}

/// Milliseconds since the newest tick, `None` before the first one.
pub fn tick_age_ms(last_timestamp_ms: Option<u64>, now_ms: u64) -> Option<u64> {
    last_timestamp_ms.map(|ts| now_ms.saturating_sub(ts))
}

pub fn classify_health(
    ws_connected: bool,
    reject_ratio_pct: f64,
    last_tick_age_ms: Option<u64>,
) -> FeedHealth {
    if !ws_connected {
        return FeedHealth::Crit;
    }
    let mut severity = FeedHealth::Ok;

    if reject_ratio_pct >= 5.0 {
        return FeedHealth::Crit;
    } else if reject_ratio_pct >= 1.0 {
        severity = FeedHealth::Warn;
    }

    match last_tick_age_ms {
        Some(age) if age >= 60_000 => return FeedHealth::Crit,
        Some(age) if age >= 10_000 => severity = FeedHealth::Warn,
        Some(_) => {}
        None => severity = FeedHealth::Warn,
    }

    severity
}

pub fn classify_stats(ws_connected: bool, stats: &BufferStats, now_ms: u64) -> FeedHealth {
    let seen = stats.accepted + stats.rejected;
    classify_health(
        ws_connected,
        ratio_pct(stats.rejected, seen),
        tick_age_ms(stats.last_timestamp_ms, now_ms),
    )
}
