use std::sync::Arc;
use std::thread;

use ticker_chart::error::TickRejection;
use ticker_chart::model::tick::{Side, Tick};
use ticker_chart::tick_buffer::TickBuffer;

fn tick(price: f64, size: f64, ts: u64) -> Tick {
    Tick::new("ETH-USD", price, size, ts, Side::Buy)
}

#[test]
fn length_never_exceeds_capacity_and_drops_oldest_first() {
    let buf = TickBuffer::new(5);
    for i in 0..12u64 {
        buf.append(tick(100.0 + i as f64, 1.0, i)).unwrap();
        assert!(buf.len() <= 5);
        if i >= 5 {
            // Earliest survivor is exactly the one after the last evicted tick.
            let snap = buf.snapshot();
            assert_eq!(snap.ticks()[0].timestamp_ms, i - 4);
        }
    }
    assert_eq!(buf.stats().evicted, 7);
}

#[test]
fn append_20000_with_capacity_15000_keeps_last_15000_in_order() {
    let buf = TickBuffer::new(15_000);
    for i in 0..20_000u64 {
        buf.append(tick(1.0 + i as f64, 0.5, i)).unwrap();
    }
    let snap = buf.snapshot();
    assert_eq!(snap.len(), 15_000);
    for (offset, t) in snap.ticks().iter().enumerate() {
        assert_eq!(t.timestamp_ms, 5_000 + offset as u64);
    }
    assert_eq!(snap.first_seq(), 5_000);
}

#[test]
fn malformed_ticks_are_rejected_and_not_stored() {
    let buf = TickBuffer::new(10);
    assert_eq!(
        buf.append(tick(0.0, 1.0, 1)),
        Err(TickRejection::NonPositivePrice(0.0))
    );
    assert_eq!(
        buf.append(tick(10.0, -0.1, 2)),
        Err(TickRejection::NegativeSize(-0.1))
    );
    assert!(matches!(
        buf.append(tick(f64::NAN, 1.0, 3)),
        Err(TickRejection::NonPositivePrice(_))
    ));
    assert!(matches!(
        buf.append(tick(10.0, f64::INFINITY, 4)),
        Err(TickRejection::NegativeSize(_))
    ));
    assert!(buf.is_empty());

    // Zero size is a valid trade print.
    buf.append(tick(10.0, 0.0, 5)).unwrap();
    let stats = buf.stats();
    assert_eq!(stats.len, 1);
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.rejected, 4);
}

#[test]
fn tail_returns_everything_when_short() {
    let buf = TickBuffer::new(100);
    for i in 0..3u64 {
        buf.append(tick(10.0 + i as f64, 1.0, i)).unwrap();
    }
    let tail = buf.tail(10);
    assert_eq!(tail.len(), 3);
    assert!((tail[0].price - 10.0).abs() < f64::EPSILON);

    let tail = buf.tail(2);
    assert_eq!(tail.len(), 2);
    assert!((tail[0].price - 11.0).abs() < f64::EPSILON);
    assert!((tail[1].price - 12.0).abs() < f64::EPSILON);

    assert!(TickBuffer::new(4).tail(4).is_empty());
}

#[test]
fn snapshot_is_unaffected_by_later_appends() {
    let buf = TickBuffer::new(3);
    buf.append(tick(1.0, 1.0, 1)).unwrap();
    let snap = buf.snapshot();
    for i in 2..10u64 {
        buf.append(tick(i as f64, 1.0, i)).unwrap();
    }
    assert_eq!(snap.len(), 1);
    assert!((snap.ticks()[0].price - 1.0).abs() < f64::EPSILON);
}

#[test]
fn concurrent_readers_always_see_whole_ordered_ticks() {
    let buf = Arc::new(TickBuffer::new(1_000));

    let writer = {
        let buf = Arc::clone(&buf);
        thread::spawn(move || {
            for i in 0..20_000u64 {
                // price encodes the timestamp so torn reads would show up
                buf.append(tick(1.0 + i as f64, 1.0, i)).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let buf = Arc::clone(&buf);
            thread::spawn(move || {
                for _ in 0..200 {
                    let snap = buf.snapshot();
                    assert!(snap.len() <= 1_000);
                    for (i, t) in snap.ticks().iter().enumerate() {
                        assert!((t.price - (1.0 + t.timestamp_ms as f64)).abs() < f64::EPSILON);
                        assert_eq!(t.timestamp_ms, snap.first_seq() + i as u64);
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(buf.len(), 1_000);
    assert_eq!(buf.stats().accepted, 20_000);
}

#[test]
fn timestamps_past_year_9999_are_rejected() {
    let buf = TickBuffer::new(4);
    assert!(matches!(
        buf.append(tick(1.0, 1.0, u64::MAX)),
        Err(TickRejection::InvalidTimestamp(_))
    ));
    assert!(buf.is_empty());
    assert_eq!(buf.stats().rejected, 1);
}
