//! Date-indexed time series, used for index fixings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use meridian_core::Date;

/// Identifies a time series, usually the fixings of an index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSeriesId(String);

impl TimeSeriesId {
    /// Creates a time series id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimeSeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A sorted series of dated values.
///
/// The points are immutable and shared, so cloning a series hands out
/// another reference to the same storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Date, f64>", into = "BTreeMap<Date, f64>")]
pub struct LocalDateDoubleTimeSeries {
    points: Arc<BTreeMap<Date, f64>>,
}

impl LocalDateDoubleTimeSeries {
    /// Creates an empty series.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a series from (date, value) points; later duplicates win.
    #[must_use]
    pub fn of(points: impl IntoIterator<Item = (Date, f64)>) -> Self {
        Self {
            points: Arc::new(points.into_iter().collect()),
        }
    }

    /// Returns a copy with one point added or replaced.
    #[must_use]
    pub fn with_point(&self, date: Date, value: f64) -> Self {
        let mut points = BTreeMap::clone(&self.points);
        points.insert(date, value);
        Self {
            points: Arc::new(points),
        }
    }

    /// Checks if two series share the same storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.points, &other.points)
    }

    /// Returns the value on a date.
    #[must_use]
    pub fn get(&self, date: Date) -> Option<f64> {
        self.points.get(&date).copied()
    }

    /// Returns the latest point.
    #[must_use]
    pub fn latest(&self) -> Option<(Date, f64)> {
        self.points.iter().next_back().map(|(d, v)| (*d, *v))
    }

    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Checks if the series has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over the points in date order.
    pub fn iter(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }
}

impl From<BTreeMap<Date, f64>> for LocalDateDoubleTimeSeries {
    fn from(points: BTreeMap<Date, f64>) -> Self {
        Self {
            points: Arc::new(points),
        }
    }
}

impl From<LocalDateDoubleTimeSeries> for BTreeMap<Date, f64> {
    fn from(series: LocalDateDoubleTimeSeries) -> Self {
        Arc::try_unwrap(series.points).unwrap_or_else(|shared| BTreeMap::clone(&shared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> Date {
        Date::from_ymd(2024, 6, d).unwrap()
    }

    #[test]
    fn test_sorted_lookup() {
        let series = LocalDateDoubleTimeSeries::of([(date(12), 0.052), (date(10), 0.051)]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(date(10)), Some(0.051));
        assert_eq!(series.get(date(11)), None);
        assert_eq!(series.latest(), Some((date(12), 0.052)));
        let dates: Vec<Date> = series.iter().map(|(d, _)| d).collect();
        assert_eq!(dates, vec![date(10), date(12)]);
    }

    #[test]
    fn test_with_point_leaves_original() {
        let series = LocalDateDoubleTimeSeries::empty();
        let added = series.with_point(date(3), 0.01);
        assert!(series.is_empty());
        assert_eq!(added.get(date(3)), Some(0.01));
        assert!(!added.ptr_eq(&series));
    }

    #[test]
    fn test_clones_share_points() {
        let series = LocalDateDoubleTimeSeries::of([(date(10), 0.051)]);
        let copy = series.clone();
        assert!(copy.ptr_eq(&series));
        assert_eq!(copy, series);
        assert!(!LocalDateDoubleTimeSeries::of(series.iter()).ptr_eq(&series));
    }
}
