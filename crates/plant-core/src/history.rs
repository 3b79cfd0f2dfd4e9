//! Fixed-capacity rolling average store
//!
//! One store exists per metric and plant. The buffer is circular: appends
//! write at `cursor`, and once the buffer is full each append overwrites the
//! oldest reading while `count` stays at capacity.
//!
//! On the card a store is a JSON document:
//!
//! ```text
//! {"startIndex":17,"numReadings":200,"readings":[512.0,498.5,...]}
//! ```
//!
//! `readings` always has exactly `N` entries once written by this crate. A
//! freshly cleared document has an empty array, which loads as all zeros.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::config::HISTORY_CAPACITY;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Cursor {0} outside capacity")]
    Cursor(usize),
    #[error("Count {0} exceeds capacity")]
    Count(usize),
    #[error("{0} values stored, more than capacity")]
    TooManyValues(usize),
    #[error("Count {count} exceeds the {stored} stored values")]
    MissingValues { count: usize, stored: usize },
}

/// Circular buffer of the most recent `N` readings of one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredHistory", into = "StoredHistory")]
pub struct RollingAverage<const N: usize = HISTORY_CAPACITY> {
    cursor: usize,
    count: usize,
    values: [f32; N],
}

impl<const N: usize> RollingAverage<N> {
    pub const fn new() -> Self {
        Self {
            cursor: 0,
            count: 0,
            values: [0.0; N],
        }
    }

    /// Append a reading, evicting the oldest one when full
    pub fn push(&mut self, value: f32) {
        self.values[self.cursor] = value;
        self.cursor = (self.cursor + 1) % N;
        if self.count < N {
            self.count += 1;
        }
    }

    /// Mean of the valid finite readings, 0 when there are none.
    ///
    /// A non-finite reading (a failed sensor read) is kept in its slot but
    /// left out of the mean.
    pub fn average(&self) -> f32 {
        // Before the buffer fills the valid slots are [0, count); once full every slot is valid
        let (sum, finite) = self.values[..self.count]
            .iter()
            .filter(|v| v.is_finite())
            .fold((0.0f64, 0usize), |(sum, n), &v| (sum + f64::from(v), n + 1));
        if finite == 0 {
            return 0.0;
        }
        let mean = (sum / finite as f64) as f32;
        if mean.is_finite() { mean } else { 0.0 }
    }

    pub const fn len(&self) -> usize {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub const fn is_full(&self) -> bool {
        self.count == N
    }

    /// Slot the next reading is written to
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Iterate readings oldest → newest
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        let start = if self.count < N { 0 } else { self.cursor };
        (0..self.count).map(move |i| self.values[(start + i) % N])
    }

    /// Most recently appended reading
    pub fn latest(&self) -> Option<f32> {
        if self.count == 0 {
            None
        } else {
            Some(self.values[(self.cursor + N - 1) % N])
        }
    }
}

impl<const N: usize> Default for RollingAverage<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// On-card layout of a store. Non-finite readings are written as `null` and
/// load back as NaN.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredHistory {
    #[serde(rename = "startIndex")]
    cursor: usize,
    #[serde(rename = "numReadings")]
    count: usize,
    #[serde(rename = "readings", default)]
    values: Vec<Option<f32>>,
}

impl<const N: usize> TryFrom<StoredHistory> for RollingAverage<N> {
    type Error = HistoryError;

    fn try_from(stored: StoredHistory) -> Result<Self, Self::Error> {
        if stored.cursor >= N {
            return Err(HistoryError::Cursor(stored.cursor));
        }
        if stored.count > N {
            return Err(HistoryError::Count(stored.count));
        }
        if stored.values.len() > N {
            return Err(HistoryError::TooManyValues(stored.values.len()));
        }
        if stored.count > stored.values.len() {
            return Err(HistoryError::MissingValues {
                count: stored.count,
                stored: stored.values.len(),
            });
        }

        let mut values = [0.0; N];
        for (slot, value) in values.iter_mut().zip(stored.values) {
            *slot = value.unwrap_or(f32::NAN);
        }

        Ok(Self {
            cursor: stored.cursor,
            count: stored.count,
            values,
        })
    }
}

impl<const N: usize> From<RollingAverage<N>> for StoredHistory {
    fn from(history: RollingAverage<N>) -> Self {
        Self {
            cursor: history.cursor,
            count: history.count,
            values: history
                .values
                .iter()
                .map(|&v| v.is_finite().then_some(v))
                .collect(),
        }
    }
}

/// Document contents of an empty store
pub fn empty_document() -> Vec<u8> {
    // Matches what the appliance writes when a slot is cleared
    br#"{"startIndex":0,"numReadings":0,"readings":[]}"#.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mean(values: &[f32]) -> f32 {
        let sum: f64 = values.iter().map(|&v| f64::from(v)).sum();
        (sum / values.len() as f64) as f32
    }

    fn assert_close(actual: f32, expected: f32) {
        let tolerance = 1e-3 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_empty_average_is_zero() {
        let history = RollingAverage::<200>::new();
        assert_eq!(history.average(), 0.0);
        assert!(history.is_empty());
        assert_eq!(history.latest(), None);
    }

    #[test]
    fn test_wraps_and_keeps_count() {
        let mut history = RollingAverage::<3>::new();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            history.push(v);
        }
        assert!(history.is_full());
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.iter().collect::<Vec<_>>(), [3.0, 4.0, 5.0]);
        assert_eq!(history.latest(), Some(5.0));
        assert_close(history.average(), 4.0);
    }

    #[test]
    fn test_document_layout() {
        let mut history = RollingAverage::<4>::new();
        history.push(1.5);
        history.push(f32::NAN);
        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(
            json,
            r#"{"startIndex":2,"numReadings":2,"readings":[1.5,null,0.0,0.0]}"#
        );

        let loaded: RollingAverage<4> = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.latest().unwrap().is_nan());
        assert_eq!(serde_json::to_string(&loaded).unwrap(), json);
    }

    #[test]
    fn test_failed_readings_are_left_out_of_average() {
        let mut history = RollingAverage::<4>::new();
        history.push(f32::NAN);
        assert_eq!(history.average(), 0.0);

        history.push(40.0);
        history.push(f32::INFINITY);
        history.push(50.0);
        assert_eq!(history.len(), 4);
        assert_close(history.average(), 45.0);

        let reloaded: RollingAverage<4> =
            serde_json::from_str(&serde_json::to_string(&history).unwrap()).unwrap();
        assert_close(reloaded.average(), 45.0);
    }

    #[test]
    fn test_cleared_document_loads_empty() {
        let loaded: RollingAverage = serde_json::from_slice(&empty_document()).unwrap();
        assert_eq!(loaded, RollingAverage::new());
        assert_eq!(loaded.capacity(), HISTORY_CAPACITY);
    }

    #[test]
    fn test_short_document_is_padded() {
        let loaded: RollingAverage<4> =
            serde_json::from_str(r#"{"startIndex":2,"numReadings":2,"readings":[3.0,5.0]}"#)
                .unwrap();
        assert_close(loaded.average(), 4.0);

        let mut grown = loaded.clone();
        grown.push(7.0);
        assert_close(grown.average(), 5.0);
    }

    #[test]
    fn test_rejects_inconsistent_documents() {
        let cases = [
            r#"{"startIndex":4,"numReadings":0,"readings":[]}"#,
            r#"{"startIndex":0,"numReadings":5,"readings":[1,2,3,4,5]}"#,
            r#"{"startIndex":0,"numReadings":1,"readings":[1,2,3,4,5]}"#,
            r#"{"startIndex":3,"numReadings":3,"readings":[1,2]}"#,
            r#"{"numReadings":1,"readings":[1]}"#,
        ];
        for case in cases {
            assert!(
                serde_json::from_str::<RollingAverage<4>>(case).is_err(),
                "accepted {case}"
            );
        }
    }

    proptest! {
        #[test]
        fn prop_partial_fill_averages_everything(
            values in proptest::collection::vec(0.0f32..5000.0, 1..=200)
        ) {
            let mut history = RollingAverage::<200>::new();
            for &v in &values {
                history.push(v);
            }
            prop_assert_eq!(history.len(), values.len());
            let expected = mean(&values);
            prop_assert!((history.average() - expected).abs() <= 1e-3 * expected.max(1.0));
        }

        #[test]
        fn prop_overflow_keeps_most_recent(
            values in proptest::collection::vec(-100.0f32..100.0, 9..64)
        ) {
            let mut history = RollingAverage::<8>::new();
            for &v in &values {
                history.push(v);
            }
            let recent = &values[values.len() - 8..];
            prop_assert_eq!(history.len(), 8);
            prop_assert_eq!(history.iter().collect::<Vec<_>>(), recent.to_vec());
            let expected = mean(recent);
            prop_assert!((history.average() - expected).abs() <= 1e-3);
        }
    }
}
