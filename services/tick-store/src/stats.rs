//! Aggregations over tick sequences
//!
//! Pure functions over `&[TickRecord]`. Callers guarantee a non-empty
//! input; every aggregate here returns `None` for an empty slice instead of
//! inventing a value.

use std::collections::BTreeSet;

use serde::Serialize;
use types::tick::TickRecord;

/// Inclusive `[start, end]` span of trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateSpan {
    pub start: u32,
    pub end: u32,
}

impl DateSpan {
    pub fn of(ticks: &[TickRecord]) -> Option<Self> {
        let start = ticks.iter().map(|t| t.date).min()?;
        let end = ticks.iter().map(|t| t.date).max()?;
        Some(Self { start, end })
    }

    /// `"{start} to {end}"`, or `"N/A"` for an empty page.
    pub fn label(ticks: &[TickRecord]) -> String {
        Self::of(ticks)
            .map(|span| format!("{} to {}", span.start, span.end))
            .unwrap_or_else(|| "N/A".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceStats {
    /// Close of the first row in load order.
    pub open: f64,
    /// Close of the last row in load order.
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub mean: f64,
    /// Sample standard deviation (n − 1); `None` for a single tick.
    pub std: Option<f64>,
    pub median: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeStats {
    pub total: i64,
    pub mean: f64,
    pub max: i64,
    pub min: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BidAskStats {
    pub avg_bid: f64,
    pub avg_ask: f64,
    pub avg_spread: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickStatistics {
    pub price: PriceStats,
    pub volume: VolumeStats,
    pub bid_ask: BidAskStats,
    pub tick_count: usize,
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation with Bessel's correction.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn max_f64(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

fn min_f64(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn closes(ticks: &[TickRecord]) -> Vec<f64> {
    ticks.iter().map(|t| t.close).collect()
}

pub fn price_range(ticks: &[TickRecord]) -> Option<PriceRange> {
    let closes = closes(ticks);
    Some(PriceRange {
        min: min_f64(&closes)?,
        max: max_f64(&closes)?,
        avg: mean(&closes)?,
    })
}

pub fn total_volume(ticks: &[TickRecord]) -> i64 {
    ticks.iter().map(|t| t.volume).sum()
}

/// Distinct trading days, ascending.
pub fn distinct_dates(ticks: &[TickRecord]) -> Vec<u32> {
    ticks
        .iter()
        .map(|t| t.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The tick with maximal (Date, Time); ties keep the earliest-loaded row.
pub fn latest(ticks: &[TickRecord]) -> Option<&TickRecord> {
    ticks.iter().fold(None, |best, tick| match best {
        Some(current) if tick.cmp_chronological(current).is_le() => Some(current),
        _ => Some(tick),
    })
}

/// Full statistics block over `ticks` in the order given.
pub fn compute(ticks: &[TickRecord]) -> Option<TickStatistics> {
    let first = ticks.first()?;
    let last = ticks.last()?;
    let closes = closes(ticks);

    let price = PriceStats {
        open: first.close,
        close: last.close,
        high: max_f64(&closes)?,
        low: min_f64(&closes)?,
        mean: mean(&closes)?,
        std: sample_std(&closes),
        median: median(&closes)?,
    };

    let volumes: Vec<f64> = ticks.iter().map(|t| t.volume as f64).collect();
    let volume = VolumeStats {
        total: total_volume(ticks),
        mean: mean(&volumes)?,
        max: ticks.iter().map(|t| t.volume).max()?,
        min: ticks.iter().map(|t| t.volume).min()?,
    };

    let bids: Vec<f64> = ticks.iter().map(|t| t.bid).collect();
    let asks: Vec<f64> = ticks.iter().map(|t| t.ask).collect();
    let spreads: Vec<f64> = ticks.iter().map(TickRecord::spread).collect();
    let bid_ask = BidAskStats {
        avg_bid: mean(&bids)?,
        avg_ask: mean(&asks)?,
        avg_spread: mean(&spreads)?,
    };

    Some(TickStatistics {
        price,
        volume,
        bid_ask,
        tick_count: ticks.len(),
    })
}
