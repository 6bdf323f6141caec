//! Ibor indices and their observations.

use serde::{Deserialize, Serialize};
use std::fmt;

use meridian_core::daycounts::DayCount;
use meridian_core::{Currency, Date};
use meridian_market::TimeSeriesId;

use crate::error::CurveResult;

/// A term rate index, such as USD-LIBOR-3M.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IborIndex {
    name: String,
    currency: Currency,
    tenor_months: i32,
    day_count: DayCount,
    fixing_offset_days: i32,
}

impl IborIndex {
    /// Creates an index.
    ///
    /// `fixing_offset_days` is the number of business days between the
    /// fixing date and the effective date.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        currency: Currency,
        tenor_months: i32,
        day_count: DayCount,
        fixing_offset_days: i32,
    ) -> Self {
        Self {
            name: name.into(),
            currency,
            tenor_months,
            day_count,
            fixing_offset_days,
        }
    }

    /// USD-LIBOR-3M.
    #[must_use]
    pub fn usd_libor_3m() -> Self {
        Self::new("USD-LIBOR-3M", Currency::USD, 3, DayCount::Act360, 2)
    }

    /// USD-LIBOR-6M.
    #[must_use]
    pub fn usd_libor_6m() -> Self {
        Self::new("USD-LIBOR-6M", Currency::USD, 6, DayCount::Act360, 2)
    }

    /// EUR-EURIBOR-3M.
    #[must_use]
    pub fn eur_euribor_3m() -> Self {
        Self::new("EUR-EURIBOR-3M", Currency::EUR, 3, DayCount::Act360, 2)
    }

    /// Returns the index name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the currency.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the tenor in months.
    #[must_use]
    pub fn tenor_months(&self) -> i32 {
        self.tenor_months
    }

    /// Returns the accrual day count.
    #[must_use]
    pub fn day_count(&self) -> DayCount {
        self.day_count
    }

    /// Returns the business days from fixing to effective date.
    #[must_use]
    pub fn fixing_offset_days(&self) -> i32 {
        self.fixing_offset_days
    }

    /// Returns the id of the fixing time series.
    #[must_use]
    pub fn time_series_id(&self) -> TimeSeriesId {
        TimeSeriesId::new(self.name.clone())
    }

    /// Returns the fixing date for an effective date.
    #[must_use]
    pub fn fixing_date(&self, effective_date: Date) -> Date {
        effective_date.add_business_days(-self.fixing_offset_days)
    }
}

impl fmt::Display for IborIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A single observation of an index: the fixing and the period it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IborIndexObservation {
    index: IborIndex,
    fixing_date: Date,
    effective_date: Date,
    maturity_date: Date,
    year_fraction: f64,
}

impl IborIndexObservation {
    /// Creates the observation fixing on a date, using the index conventions.
    pub fn of(index: &IborIndex, fixing_date: Date) -> CurveResult<Self> {
        let effective_date = fixing_date.add_business_days(index.fixing_offset_days());
        let maturity_date = effective_date.add_months(index.tenor_months())?;
        Ok(Self::new(index, fixing_date, effective_date, maturity_date))
    }

    /// Creates an observation with explicit dates.
    #[must_use]
    pub fn new(
        index: &IborIndex,
        fixing_date: Date,
        effective_date: Date,
        maturity_date: Date,
    ) -> Self {
        Self {
            index: index.clone(),
            fixing_date,
            effective_date,
            maturity_date,
            year_fraction: index.day_count().year_fraction(effective_date, maturity_date),
        }
    }

    /// Returns the index.
    #[must_use]
    pub fn index(&self) -> &IborIndex {
        &self.index
    }

    /// Returns the currency of the index.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.index.currency()
    }

    /// Returns the fixing date.
    #[must_use]
    pub fn fixing_date(&self) -> Date {
        self.fixing_date
    }

    /// Returns the start of the underlying deposit.
    #[must_use]
    pub fn effective_date(&self) -> Date {
        self.effective_date
    }

    /// Returns the end of the underlying deposit.
    #[must_use]
    pub fn maturity_date(&self) -> Date {
        self.maturity_date
    }

    /// Returns the accrual year fraction of the deposit.
    #[must_use]
    pub fn year_fraction(&self) -> f64 {
        self.year_fraction
    }
}
