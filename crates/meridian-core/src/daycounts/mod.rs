//! Day count conventions.
//!
//! Curves measure time with a day count of their own, independently of
//! the accrual convention of the products priced off them.
//!
//! # Usage
//!
//! ```rust
//! use meridian_core::daycounts::DayCount;
//! use meridian_core::types::Date;
//!
//! let start = Date::from_ymd(2025, 1, 15).unwrap();
//! let end = Date::from_ymd(2025, 7, 15).unwrap();
//!
//! let yf = DayCount::Act360.year_fraction(start, end);
//! assert!((yf - 181.0 / 360.0).abs() < 1e-15);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Date;

/// Supported day count conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum DayCount {
    /// Actual/360 - Money market instruments, Ibor indices
    Act360,
    /// Actual/365 Fixed - curve time measure
    #[default]
    Act365Fixed,
}

impl DayCount {
    /// Returns the market name of the convention.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DayCount::Act360 => "ACT/360",
            DayCount::Act365Fixed => "ACT/365F",
        }
    }

    /// Calculates the year fraction between two dates.
    ///
    /// Negative when `end` is before `start`.
    #[must_use]
    pub fn year_fraction(&self, start: Date, end: Date) -> f64 {
        let days = start.days_between(&end) as f64;
        match self {
            DayCount::Act360 => days / 360.0,
            DayCount::Act365Fixed => days / 365.0,
        }
    }
}

impl fmt::Display for DayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
