use crate::models::{AlignedDay, ChartPoint, DailySeries};
use chrono::{DateTime, Utc};
use log::warn;

/// Key chart samples by UTC calendar day. Later samples for the same day
/// replace earlier ones; unrepresentable timestamps and non-finite values
/// are dropped.
pub fn daily_series(points: &[ChartPoint]) -> DailySeries {
    let mut series = DailySeries::new();
    let mut dropped = 0usize;

    for point in points {
        match DateTime::<Utc>::from_timestamp(point.x, 0) {
            Some(timestamp) if point.y.is_finite() => {
                series.insert(timestamp.date_naive(), point.y);
            }
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!("Dropped {} chart samples with invalid timestamps or values", dropped);
    }
    series
}

/// Days present in both series, ascending.
pub fn align(hashrate: &DailySeries, price: &DailySeries) -> Vec<AlignedDay> {
    hashrate
        .iter()
        .filter_map(|(date, hashrate)| {
            price.get(date).map(|price| AlignedDay {
                date: *date,
                hashrate: *hashrate,
                price: *price,
            })
        })
        .collect()
}

/// Copy days missing from `primary` over from `supplement`. Existing values
/// in `primary` always win. Returns how many days were filled.
pub fn fill_gaps(primary: &mut DailySeries, supplement: &DailySeries) -> usize {
    let mut filled = 0;
    for (date, value) in supplement {
        if !primary.contains_key(date) {
            primary.insert(*date, *value);
            filled += 1;
        }
    }
    filled
}
