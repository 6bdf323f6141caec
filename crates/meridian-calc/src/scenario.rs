//! Calculation values holding one result per scenario.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use meridian_core::error::{MeridianError, MeridianResult};
use meridian_core::types::FxConvertible;
use meridian_core::{Currency, CurrencyAmount, MultiCurrencyAmount};
use meridian_market::{ScenarioFxRateProvider, ScenarioFxRates};

/// The value of a measure across every scenario of a run.
pub trait ScenarioValue: Any + fmt::Debug + Send + Sync {
    /// Returns the number of scenarios.
    fn scenario_count(&self) -> usize;

    /// Checks if the value can be converted into a reporting currency.
    fn is_fx_convertible(&self) -> bool {
        false
    }

    /// Converts the value into `currency`, scenario by scenario.
    ///
    /// # Errors
    ///
    /// Returns an error if a rate is missing or the value is not convertible.
    fn converted_to(
        &self,
        currency: Currency,
        _rates: &dyn ScenarioFxRateProvider,
    ) -> MeridianResult<Arc<dyn ScenarioValue>> {
        Err(MeridianError::invalid_argument(format!(
            "value cannot be converted into {currency}"
        )))
    }

    /// Returns the value as `Any`, for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl dyn ScenarioValue {
    /// Downcasts to a concrete value type.
    #[must_use]
    pub fn downcast_ref<T: ScenarioValue>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Values per scenario that are never currency converted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioArray<T> {
    values: Vec<T>,
}

impl<T> ScenarioArray<T> {
    /// Creates an array with one value per scenario.
    #[must_use]
    pub fn of(values: Vec<T>) -> Self {
        Self { values }
    }

    /// Returns the value of a scenario.
    #[must_use]
    pub fn get(&self, scenario: usize) -> Option<&T> {
        self.values.get(scenario)
    }

    /// Returns all values.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T: fmt::Debug + Send + Sync + 'static> ScenarioValue for ScenarioArray<T> {
    fn scenario_count(&self) -> usize {
        self.values.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Values per scenario that convert into a reporting currency.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertibleScenarioArray<T> {
    values: Vec<T>,
}

/// Currency amounts per scenario.
pub type CurrencyScenarioArray = ConvertibleScenarioArray<CurrencyAmount>;

/// Multi-currency amounts per scenario.
pub type MultiCurrencyScenarioArray = ConvertibleScenarioArray<MultiCurrencyAmount>;

impl<T> ConvertibleScenarioArray<T> {
    /// Creates an array with one value per scenario.
    #[must_use]
    pub fn of(values: Vec<T>) -> Self {
        Self { values }
    }

    /// Returns the value of a scenario.
    #[must_use]
    pub fn get(&self, scenario: usize) -> Option<&T> {
        self.values.get(scenario)
    }

    /// Returns all values.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T> ScenarioValue for ConvertibleScenarioArray<T>
where
    T: FxConvertible + fmt::Debug + Send + Sync + 'static,
{
    fn scenario_count(&self) -> usize {
        self.values.len()
    }

    fn is_fx_convertible(&self) -> bool {
        true
    }

    fn converted_to(
        &self,
        currency: Currency,
        rates: &dyn ScenarioFxRateProvider,
    ) -> MeridianResult<Arc<dyn ScenarioValue>> {
        let values = self
            .values
            .iter()
            .enumerate()
            .map(|(scenario, value)| {
                value.convert_to(currency, &ScenarioFxRates::new(rates, scenario))
            })
            .collect::<MeridianResult<Vec<_>>>()?;
        Ok(Arc::new(Self { values }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use meridian_core::types::{CurrencyPair, FxRate};
    use meridian_core::Date;
    use meridian_market::fx::ScenarioMarketDataFxRateProvider;
    use meridian_market::{FxRateId, ScenarioMarketData};

    fn eur_usd(rates: Vec<f64>) -> ScenarioMarketData {
        let pair = CurrencyPair::new(Currency::EUR, Currency::USD);
        let values = rates.into_iter().map(|r| FxRate::new(pair, r).unwrap()).collect::<Vec<_>>();
        ScenarioMarketData::builder(values.len(), Date::from_ymd(2024, 6, 14).unwrap())
            .add_scenario_values(&FxRateId::new(pair), values)
            .build()
            .unwrap()
    }

    #[test]
    fn test_convert_per_scenario() {
        let data = eur_usd(vec![1.1, 1.2]);
        let rates = ScenarioMarketDataFxRateProvider::new(&data);
        let array = CurrencyScenarioArray::of(vec![
            CurrencyAmount::new(Currency::EUR, 100.0),
            CurrencyAmount::new(Currency::EUR, 100.0),
        ]);
        let converted = array.converted_to(Currency::USD, &rates).unwrap();
        let converted = converted.downcast_ref::<CurrencyScenarioArray>().unwrap();
        assert_relative_eq!(converted.values()[0].amount(), 110.0, epsilon = 1e-12);
        assert_relative_eq!(converted.values()[1].amount(), 120.0, epsilon = 1e-12);
        assert_eq!(converted.values()[1].currency(), Currency::USD);
    }

    #[test]
    fn test_plain_array_is_not_convertible() {
        let data = eur_usd(vec![1.1]);
        let rates = ScenarioMarketDataFxRateProvider::new(&data);
        let array = ScenarioArray::of(vec![0.05]);
        assert!(!array.is_fx_convertible());
        assert!(array.converted_to(Currency::USD, &rates).is_err());
        assert_eq!(array.scenario_count(), 1);
    }
}
