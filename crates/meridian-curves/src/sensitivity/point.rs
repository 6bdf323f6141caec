//! Point sensitivities: sensitivities to individual rates before they are
//! mapped onto curve parameters.

use meridian_core::Currency;

use crate::index::IborIndexObservation;

/// Sensitivity to the zero rate of a discount curve at a year fraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroRateSensitivity {
    curve_currency: Currency,
    year_fraction: f64,
    currency: Currency,
    sensitivity: f64,
}

impl ZeroRateSensitivity {
    /// Creates a sensitivity expressed in the curve currency.
    #[must_use]
    pub fn new(curve_currency: Currency, year_fraction: f64, sensitivity: f64) -> Self {
        Self::with_currency(curve_currency, year_fraction, curve_currency, sensitivity)
    }

    /// Creates a sensitivity expressed in another currency.
    #[must_use]
    pub fn with_currency(
        curve_currency: Currency,
        year_fraction: f64,
        currency: Currency,
        sensitivity: f64,
    ) -> Self {
        Self {
            curve_currency,
            year_fraction,
            currency,
            sensitivity,
        }
    }

    /// Returns the currency of the discount curve.
    #[must_use]
    pub fn curve_currency(&self) -> Currency {
        self.curve_currency
    }

    /// Returns the year fraction of the point.
    #[must_use]
    pub fn year_fraction(&self) -> f64 {
        self.year_fraction
    }

    /// Returns the currency of the sensitivity value.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the sensitivity value.
    #[must_use]
    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Returns a copy with the sensitivity scaled.
    #[must_use]
    pub fn multiplied_by(&self, factor: f64) -> Self {
        Self {
            sensitivity: self.sensitivity * factor,
            ..self.clone()
        }
    }
}

/// Sensitivity to the rate of an Ibor index observation.
#[derive(Debug, Clone, PartialEq)]
pub struct IborRateSensitivity {
    observation: IborIndexObservation,
    currency: Currency,
    sensitivity: f64,
}

impl IborRateSensitivity {
    /// Creates a sensitivity expressed in the index currency.
    #[must_use]
    pub fn new(observation: IborIndexObservation, sensitivity: f64) -> Self {
        let currency = observation.currency();
        Self {
            observation,
            currency,
            sensitivity,
        }
    }

    /// Returns the observation.
    #[must_use]
    pub fn observation(&self) -> &IborIndexObservation {
        &self.observation
    }

    /// Returns the currency of the sensitivity value.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the sensitivity value.
    #[must_use]
    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Returns a copy with the sensitivity scaled.
    #[must_use]
    pub fn multiplied_by(&self, factor: f64) -> Self {
        Self {
            sensitivity: self.sensitivity * factor,
            ..self.clone()
        }
    }
}

/// A sensitivity to a single market rate.
#[derive(Debug, Clone, PartialEq)]
pub enum PointSensitivity {
    /// Sensitivity to a discount curve zero rate.
    ZeroRate(ZeroRateSensitivity),
    /// Sensitivity to an Ibor index rate.
    IborRate(IborRateSensitivity),
}

impl PointSensitivity {
    /// Returns the currency of the sensitivity value.
    #[must_use]
    pub fn currency(&self) -> Currency {
        match self {
            PointSensitivity::ZeroRate(s) => s.currency(),
            PointSensitivity::IborRate(s) => s.currency(),
        }
    }

    /// Returns the sensitivity value.
    #[must_use]
    pub fn sensitivity(&self) -> f64 {
        match self {
            PointSensitivity::ZeroRate(s) => s.sensitivity(),
            PointSensitivity::IborRate(s) => s.sensitivity(),
        }
    }

    /// Returns a copy with the sensitivity scaled.
    #[must_use]
    pub fn multiplied_by(&self, factor: f64) -> Self {
        match self {
            PointSensitivity::ZeroRate(s) => PointSensitivity::ZeroRate(s.multiplied_by(factor)),
            PointSensitivity::IborRate(s) => PointSensitivity::IborRate(s.multiplied_by(factor)),
        }
    }

    fn with_sensitivity(&self, sensitivity: f64) -> Self {
        match self {
            PointSensitivity::ZeroRate(s) => PointSensitivity::ZeroRate(ZeroRateSensitivity {
                sensitivity,
                ..s.clone()
            }),
            PointSensitivity::IborRate(s) => PointSensitivity::IborRate(IborRateSensitivity {
                sensitivity,
                ..s.clone()
            }),
        }
    }

    /// Checks if two sensitivities refer to the same rate and currency.
    fn same_point(&self, other: &PointSensitivity) -> bool {
        match (self, other) {
            (PointSensitivity::ZeroRate(a), PointSensitivity::ZeroRate(b)) => {
                a.curve_currency == b.curve_currency
                    && a.year_fraction.to_bits() == b.year_fraction.to_bits()
                    && a.currency == b.currency
            }
            (PointSensitivity::IborRate(a), PointSensitivity::IborRate(b)) => {
                a.observation.index() == b.observation.index()
                    && a.observation.fixing_date() == b.observation.fixing_date()
                    && a.currency == b.currency
            }
            _ => false,
        }
    }
}

impl From<ZeroRateSensitivity> for PointSensitivity {
    fn from(s: ZeroRateSensitivity) -> Self {
        PointSensitivity::ZeroRate(s)
    }
}

impl From<IborRateSensitivity> for PointSensitivity {
    fn from(s: IborRateSensitivity) -> Self {
        PointSensitivity::IborRate(s)
    }
}

/// A collection of point sensitivities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSensitivities {
    sensitivities: Vec<PointSensitivity>,
}

impl PointSensitivities {
    /// Creates an empty collection.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a collection from sensitivities.
    #[must_use]
    pub fn of(sensitivities: impl IntoIterator<Item = PointSensitivity>) -> Self {
        Self {
            sensitivities: sensitivities.into_iter().collect(),
        }
    }

    /// Returns the sensitivities.
    #[must_use]
    pub fn sensitivities(&self) -> &[PointSensitivity] {
        &self.sensitivities
    }

    /// Returns the number of sensitivities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sensitivities.len()
    }

    /// Checks if the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sensitivities.is_empty()
    }

    /// Concatenates two collections.
    #[must_use]
    pub fn combined_with(&self, other: &PointSensitivities) -> Self {
        Self {
            sensitivities: self
                .sensitivities
                .iter()
                .chain(other.sensitivities.iter())
                .cloned()
                .collect(),
        }
    }

    /// Scales every sensitivity.
    #[must_use]
    pub fn multiplied_by(&self, factor: f64) -> Self {
        Self {
            sensitivities: self
                .sensitivities
                .iter()
                .map(|s| s.multiplied_by(factor))
                .collect(),
        }
    }

    /// Merges sensitivities to the same point, keeping first-seen order.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut merged: Vec<PointSensitivity> = Vec::with_capacity(self.sensitivities.len());
        for s in &self.sensitivities {
            match merged.iter_mut().find(|m| m.same_point(s)) {
                Some(existing) => {
                    *existing = existing.with_sensitivity(existing.sensitivity() + s.sensitivity());
                }
                None => merged.push(s.clone()),
            }
        }
        Self {
            sensitivities: merged,
        }
    }
}

impl From<PointSensitivity> for PointSensitivities {
    fn from(s: PointSensitivity) -> Self {
        Self {
            sensitivities: vec![s],
        }
    }
}
