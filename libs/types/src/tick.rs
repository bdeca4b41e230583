//! Tick records
//!
//! A [`TickRecord`] is one row of a partition file. Serialized field names
//! and their order match the partition header
//! (`Ticker,Date,Time,Close,Volume,OI,Bid,BidQty,Ask,AskQty`) and are
//! returned verbatim by the data endpoints.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A single timestamped quote/trade snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    /// Trading day as `YYYYMMDD`.
    #[serde(rename = "Date")]
    pub date: u32,
    /// Zero-padded `HH:MM:SS`; compared as a string.
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: i64,
    #[serde(rename = "OI")]
    pub oi: i64,
    #[serde(rename = "Bid")]
    pub bid: f64,
    #[serde(rename = "BidQty")]
    pub bid_qty: i64,
    #[serde(rename = "Ask")]
    pub ask: f64,
    #[serde(rename = "AskQty")]
    pub ask_qty: i64,
}

impl TickRecord {
    /// The (Date, Time) key that defines chronological order.
    pub fn sort_key(&self) -> (u32, &str) {
        (self.date, self.time.as_str())
    }

    /// Compare two ticks by (Date, Time) ascending.
    pub fn cmp_chronological(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }

    /// Quoted spread (ask − bid).
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tick(date: u32, time: &str) -> TickRecord {
        TickRecord {
            ticker: "SBIN".to_string(),
            date,
            time: time.to_string(),
            close: 812.5,
            volume: 100,
            oi: 0,
            bid: 812.4,
            bid_qty: 50,
            ask: 812.6,
            ask_qty: 75,
        }
    }

    #[test]
    fn test_wire_field_names_and_order() {
        let json = serde_json::to_string(&tick(20250102, "09:15:00")).unwrap();
        let expected_order = [
            "\"Ticker\"", "\"Date\"", "\"Time\"", "\"Close\"", "\"Volume\"",
            "\"OI\"", "\"Bid\"", "\"BidQty\"", "\"Ask\"", "\"AskQty\"",
        ];
        let positions: Vec<usize> = expected_order
            .iter()
            .map(|name| json.find(name).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
    }

    #[test]
    fn test_chronological_date_dominates_time() {
        let early_day = tick(20250102, "15:29:59");
        let next_day = tick(20250103, "09:15:00");
        assert_eq!(early_day.cmp_chronological(&next_day), Ordering::Less);
    }

    #[test]
    fn test_chronological_time_as_string() {
        let a = tick(20250102, "09:14:59");
        let b = tick(20250102, "09:15:00");
        assert_eq!(a.cmp_chronological(&b), Ordering::Less);
        assert_eq!(b.cmp_chronological(&b.clone()), Ordering::Equal);
    }

    #[test]
    fn test_spread() {
        let t = tick(20250102, "09:15:00");
        assert!((t.spread() - 0.2).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_zero_padded_time_orders_like_seconds(
            a in 0u32..86_400,
            b in 0u32..86_400,
        ) {
            let fmt = |s: u32| format!("{:02}:{:02}:{:02}", s / 3600, (s / 60) % 60, s % 60);
            let ta = tick(20250102, &fmt(a));
            let tb = tick(20250102, &fmt(b));
            prop_assert_eq!(ta.cmp_chronological(&tb), a.cmp(&b));
        }
    }
}
