//! Sensitivities to curve parameters.

use meridian_core::error::{MeridianError, MeridianResult};
use meridian_core::types::{CurrencyAmount, FxConvertible, FxRateProvider};
use meridian_core::{Currency, MultiCurrencyAmount};

use crate::curve::{CurveName, ParameterMetadata};
use crate::error::{CurveError, CurveResult};

/// Sensitivity to the parameters of one curve, in one currency.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyParameterSensitivity {
    market_data_name: CurveName,
    parameter_metadata: Vec<ParameterMetadata>,
    currency: Currency,
    sensitivity: Vec<f64>,
}

impl CurrencyParameterSensitivity {
    /// Creates a sensitivity.
    #[must_use]
    pub fn new(
        market_data_name: CurveName,
        parameter_metadata: Vec<ParameterMetadata>,
        currency: Currency,
        sensitivity: Vec<f64>,
    ) -> Self {
        Self {
            market_data_name,
            parameter_metadata,
            currency,
            sensitivity,
        }
    }

    /// Returns the name of the curve.
    #[must_use]
    pub fn market_data_name(&self) -> &CurveName {
        &self.market_data_name
    }

    /// Returns the parameter metadata.
    #[must_use]
    pub fn parameter_metadata(&self) -> &[ParameterMetadata] {
        &self.parameter_metadata
    }

    /// Returns the currency of the values.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the value per parameter.
    #[must_use]
    pub fn sensitivity(&self) -> &[f64] {
        &self.sensitivity
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.sensitivity.len()
    }

    /// Returns the sum over parameters.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.sensitivity.iter().sum()
    }

    /// Returns a copy with every value scaled.
    #[must_use]
    pub fn multiplied_by(&self, factor: f64) -> Self {
        self.map_sensitivity(|v| v * factor)
    }

    /// Returns a copy with a function applied to every value.
    #[must_use]
    pub fn map_sensitivity(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            sensitivity: self.sensitivity.iter().map(|v| f(*v)).collect(),
            ..self.clone()
        }
    }

    /// Adds another sensitivity to the same curve and currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve, currency or parameter count differ.
    pub fn plus(&self, other: &CurrencyParameterSensitivity) -> CurveResult<Self> {
        if !self.same_key(other) || self.sensitivity.len() != other.sensitivity.len() {
            return Err(CurveError::invalid_value(format!(
                "Cannot add sensitivity to {} ({}, {} params) and {} ({}, {} params)",
                self.market_data_name,
                self.currency,
                self.sensitivity.len(),
                other.market_data_name,
                other.currency,
                other.sensitivity.len()
            )));
        }
        Ok(Self {
            sensitivity: self
                .sensitivity
                .iter()
                .zip(&other.sensitivity)
                .map(|(a, b)| a + b)
                .collect(),
            ..self.clone()
        })
    }

    fn same_key(&self, other: &CurrencyParameterSensitivity) -> bool {
        self.market_data_name == other.market_data_name && self.currency == other.currency
    }
}

impl FxConvertible for CurrencyParameterSensitivity {
    fn convert_to(
        &self,
        result_currency: Currency,
        rates: &dyn FxRateProvider,
    ) -> MeridianResult<Self> {
        let rate = rates.convert(1.0, self.currency, result_currency)?;
        Ok(Self {
            currency: result_currency,
            ..self.multiplied_by(rate)
        })
    }
}

/// Sensitivities to the parameters of several curves.
///
/// At most one entry exists per (curve name, currency); entries are kept
/// sorted by that key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrencyParameterSensitivities {
    entries: Vec<CurrencyParameterSensitivity>,
}

impl CurrencyParameterSensitivities {
    /// Creates an empty collection.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a collection, summing entries with the same key.
    pub fn of(
        entries: impl IntoIterator<Item = CurrencyParameterSensitivity>,
    ) -> CurveResult<Self> {
        entries
            .into_iter()
            .try_fold(Self::empty(), |acc, entry| acc.combined_with_entry(entry))
    }

    /// Returns the entries.
    #[must_use]
    pub fn entries(&self) -> &[CurrencyParameterSensitivity] {
        &self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the entry for a curve and currency.
    #[must_use]
    pub fn find(
        &self,
        name: &CurveName,
        currency: Currency,
    ) -> Option<&CurrencyParameterSensitivity> {
        self.entries
            .iter()
            .find(|e| e.market_data_name() == name && e.currency() == currency)
    }

    /// Adds one entry, summing with an existing entry of the same key.
    pub fn combined_with_entry(&self, entry: CurrencyParameterSensitivity) -> CurveResult<Self> {
        let mut entries = self.entries.clone();
        match entries.iter_mut().find(|e| e.same_key(&entry)) {
            Some(existing) => *existing = existing.plus(&entry)?,
            None => {
                entries.push(entry);
                entries.sort_by(|a, b| {
                    (a.market_data_name(), a.currency()).cmp(&(b.market_data_name(), b.currency()))
                });
            }
        }
        Ok(Self { entries })
    }

    /// Adds all entries of another collection.
    pub fn combined_with(&self, other: &CurrencyParameterSensitivities) -> CurveResult<Self> {
        other
            .entries
            .iter()
            .try_fold(self.clone(), |acc, entry| acc.combined_with_entry(entry.clone()))
    }

    /// Scales every value.
    #[must_use]
    pub fn multiplied_by(&self, factor: f64) -> Self {
        self.map_sensitivities(|v| v * factor)
    }

    /// Applies a function to every value.
    #[must_use]
    pub fn map_sensitivities(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            entries: self.entries.iter().map(|e| e.map_sensitivity(&f)).collect(),
        }
    }

    /// Sums every value per currency.
    #[must_use]
    pub fn total(&self) -> MultiCurrencyAmount {
        MultiCurrencyAmount::of(
            self.entries
                .iter()
                .map(|e| CurrencyAmount::new(e.currency(), e.total())),
        )
    }

    /// Checks if two collections match entry by entry within a tolerance.
    #[must_use]
    pub fn equal_with_tolerance(
        &self,
        other: &CurrencyParameterSensitivities,
        tolerance: f64,
    ) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().zip(&other.entries).all(|(a, b)| {
                a.same_key(b)
                    && a.sensitivity.len() == b.sensitivity.len()
                    && a.sensitivity
                        .iter()
                        .zip(&b.sensitivity)
                        .all(|(x, y)| (x - y).abs() <= tolerance)
            })
    }
}

impl FxConvertible for CurrencyParameterSensitivities {
    fn convert_to(
        &self,
        result_currency: Currency,
        rates: &dyn FxRateProvider,
    ) -> MeridianResult<Self> {
        let converted = self
            .entries
            .iter()
            .map(|e| e.convert_to(result_currency, rates))
            .collect::<MeridianResult<Vec<_>>>()?;
        Self::of(converted).map_err(|e| MeridianError::invalid_argument(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use meridian_core::types::{CurrencyPair, FxRate};

    fn entry(name: &str, currency: Currency, values: Vec<f64>) -> CurrencyParameterSensitivity {
        let metadata = (0..values.len()).map(ParameterMetadata::indexed).collect();
        CurrencyParameterSensitivity::new(CurveName::new(name), metadata, currency, values)
    }

    #[test]
    fn test_combine_sums_same_key() {
        let sens = CurrencyParameterSensitivities::of([
            entry("USD-Disc", Currency::USD, vec![1.0, 2.0]),
            entry("EUR-Disc", Currency::EUR, vec![5.0]),
            entry("USD-Disc", Currency::USD, vec![0.5, 0.5]),
        ])
        .unwrap();

        assert_eq!(sens.len(), 2);
        assert_eq!(sens.entries()[0].market_data_name().as_str(), "EUR-Disc");
        let usd = sens.find(&CurveName::new("USD-Disc"), Currency::USD).unwrap();
        assert_eq!(usd.sensitivity(), &[1.5, 2.5]);
    }

    #[test]
    fn test_combine_rejects_shape_mismatch() {
        let result = CurrencyParameterSensitivities::of([
            entry("USD-Disc", Currency::USD, vec![1.0, 2.0]),
            entry("USD-Disc", Currency::USD, vec![1.0]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_total_per_currency() {
        let sens = CurrencyParameterSensitivities::of([
            entry("A", Currency::USD, vec![1.0, 2.0]),
            entry("B", Currency::USD, vec![3.0]),
            entry("C", Currency::GBP, vec![-1.0]),
        ])
        .unwrap();
        let total = sens.total();
        assert_relative_eq!(total.amount(Currency::USD), 6.0);
        assert_relative_eq!(total.amount(Currency::GBP), -1.0);
    }

    #[test]
    fn test_convert_merges_currencies() {
        let sens = CurrencyParameterSensitivities::of([
            entry("A", Currency::USD, vec![1.0, 2.0]),
            entry("A", Currency::EUR, vec![10.0, 0.0]),
        ])
        .unwrap();
        let fx = FxRate::new(CurrencyPair::new(Currency::EUR, Currency::USD), 1.1).unwrap();
        let converted = sens.convert_to(Currency::USD, &fx).unwrap();
        assert_eq!(converted.len(), 1);
        let values = converted.entries()[0].sensitivity();
        assert_relative_eq!(values[0], 12.0, epsilon = 1e-12);
        assert_relative_eq!(values[1], 2.0, epsilon = 1e-12);
    }
}
