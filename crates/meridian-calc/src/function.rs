//! The calculation function interface implemented by pricing code.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use meridian_core::Currency;
use meridian_market::ScenarioMarketData;

use crate::measure::Measure;
use crate::parameters::CalculationParameters;
use crate::requirements::FunctionRequirements;
use crate::result::{Failure, FailureReason};
use crate::scenario::ScenarioValue;
use crate::target::{CalculationTarget, TargetType};

/// The results of one function call, keyed by measure.
pub type MeasureResults = BTreeMap<Measure, Result<Arc<dyn ScenarioValue>, Failure>>;

/// Calculates measures for targets of one type.
///
/// A function is invoked once per target with every measure it was selected
/// for. It declares its market data up front through
/// [`requirements`](Self::requirements), then computes all scenarios in
/// [`calculate`](Self::calculate).
///
/// Returning `Err` from `calculate` fails every requested measure; a
/// per-measure failure goes in the returned map instead.
pub trait CalculationFunction: fmt::Debug + Send + Sync {
    /// Returns the type of target handled.
    fn target_type(&self) -> TargetType;

    /// Returns the measures the function can calculate.
    fn supported_measures(&self) -> BTreeSet<Measure>;

    /// Returns the currency results are naturally reported in, if any.
    fn natural_currency(&self, _target: &dyn CalculationTarget) -> Option<Currency> {
        None
    }

    /// Returns the market data needed to calculate `measures` for `target`.
    fn requirements(
        &self,
        target: &dyn CalculationTarget,
        measures: &BTreeSet<Measure>,
        parameters: &CalculationParameters,
    ) -> anyhow::Result<FunctionRequirements>;

    /// Calculates `measures` for `target` in every scenario.
    fn calculate(
        &self,
        target: &dyn CalculationTarget,
        measures: &BTreeSet<Measure>,
        parameters: &CalculationParameters,
        market_data: &ScenarioMarketData,
    ) -> anyhow::Result<MeasureResults>;
}

/// The failure reported for a measure a function does not support.
#[must_use]
pub fn unsupported_measure(measure: &Measure) -> Failure {
    Failure::of(
        FailureReason::InvalidInput,
        format!("Unsupported measure: {measure}"),
    )
}

/// Splits requested measures into those a function supports and failures
/// for the rest.
#[must_use]
pub fn partition_measures(
    supported: &BTreeSet<Measure>,
    requested: &BTreeSet<Measure>,
) -> (BTreeSet<Measure>, MeasureResults) {
    let mut failures = MeasureResults::new();
    let mut calculable = BTreeSet::new();
    for measure in requested {
        if supported.contains(measure) {
            calculable.insert(measure.clone());
        } else {
            failures.insert(measure.clone(), Err(unsupported_measure(measure)));
        }
    }
    (calculable, failures)
}
