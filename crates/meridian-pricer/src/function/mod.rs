//! Calculation functions pricing trades through the calculation engine.
//!
//! Each function reads a [`RatesMarketDataLookup`] from the calculation
//! parameters, builds one rates provider per scenario and evaluates every
//! requested measure against them. A failure in one measure is reported
//! in that measure's cell only.
//!
//! The PV01 measures are scaled by the `pv01.shift` argument, one basis
//! point unless configured otherwise.

mod fra;
mod fx_single;
mod term_deposit;

pub use fra::FraTradeCalculationFunction;
pub use fx_single::FxSingleTradeCalculationFunction;
pub use term_deposit::TermDepositTradeCalculationFunction;

use std::sync::Arc;

use meridian_calc::function::MeasureResults;
use meridian_calc::measure::Measure;
use meridian_calc::parameters::{CalculationParameters, FunctionArguments};
use meridian_calc::result::{Failure, FailureReason};
use meridian_calc::rules::{FunctionGroup, PricingRule, PricingRules};
use meridian_calc::scenario::{
    ConvertibleScenarioArray, CurrencyScenarioArray, MultiCurrencyScenarioArray, ScenarioArray,
    ScenarioValue,
};
use meridian_core::{CurrencyAmount, MultiCurrencyAmount};
use meridian_curves::curve::{Curve, CurveName};
use meridian_curves::provider::{ImmutableRatesProvider, RatesProvider};
use meridian_curves::sensitivity::{
    CurrencyParameterSensitivities, CurveGammaCalculator, MarketQuoteSensitivityCalculator,
    PointSensitivities,
};
use meridian_curves::CurveError;
use meridian_market::ScenarioMarketData;
use tracing::debug;

use crate::error::{PricerError, PricerResult};
use crate::lookup::RatesMarketDataLookup;
use crate::pricer::Pricers;
use crate::product::{FraTrade, FxSingleTrade, TermDepositTrade};

/// Function argument holding the shift the PV01 measures are scaled by.
pub const PV01_SHIFT_ARGUMENT: &str = "pv01.shift";

/// One basis point.
pub const DEFAULT_PV01_SHIFT: f64 = 1.0e-4;

/// The measures computed from the present value sensitivity of a trade.
const SENSITIVITY_MEASURES: [Measure; 5] = [
    Measure::PV01_CALIBRATED_SUM,
    Measure::PV01_CALIBRATED_BUCKETED,
    Measure::PV01_MARKET_QUOTE_SUM,
    Measure::PV01_MARKET_QUOTE_BUCKETED,
    Measure::PV01_SEMI_PARALLEL_GAMMA_BUCKETED,
];

/// Builds pricing rules sending FRA, term deposit and FX trades to the
/// standard functions.
#[must_use]
pub fn standard_pricing_rules(pricers: Pricers) -> PricingRules {
    let fra = FunctionGroup::builder::<FraTrade>("FraTrade")
        .add_function_all(Arc::new(FraTradeCalculationFunction::new(pricers.fra)))
        .build();
    let term_deposit = FunctionGroup::builder::<TermDepositTrade>("TermDepositTrade")
        .add_function_all(Arc::new(TermDepositTradeCalculationFunction::new(pricers.term_deposit)))
        .build();
    let fx_single = FunctionGroup::builder::<FxSingleTrade>("FxSingleTrade")
        .add_function_all(Arc::new(FxSingleTradeCalculationFunction::new(pricers.fx_single)))
        .build();
    PricingRules::of([
        PricingRule::of(Arc::new(fra)),
        PricingRule::of(Arc::new(term_deposit)),
        PricingRule::of(Arc::new(fx_single)),
    ])
}

/// Returns the lookup from the calculation parameters.
fn rates_lookup(parameters: &CalculationParameters) -> PricerResult<&RatesMarketDataLookup> {
    parameters
        .find::<RatesMarketDataLookup>()
        .ok_or_else(|| PricerError::missing_parameter("RatesMarketDataLookup"))
}

/// Records the outcome of one measure.
fn insert_result(
    results: &mut MeasureResults,
    measure: Measure,
    result: PricerResult<Arc<dyn ScenarioValue>>,
) {
    let result = result.map_err(|err| {
        debug!(measure = %measure, error = %err, "measure failed");
        Failure::of(failure_reason(&err), err.to_string())
    });
    results.insert(measure, result);
}

fn failure_reason(err: &PricerError) -> FailureReason {
    match err {
        PricerError::MarketData(_)
        | PricerError::LookupNotConfigured { .. }
        | PricerError::Curve(
            CurveError::DiscountCurveNotFound { .. }
            | CurveError::IndexCurveNotFound { .. }
            | CurveError::CurveNotFound { .. }
            | CurveError::MissingFixing { .. },
        ) => FailureReason::MissingData,
        PricerError::InvalidProduct { .. }
        | PricerError::InvalidArgument { .. }
        | PricerError::MissingParameter { .. } => FailureReason::InvalidInput,
        _ => FailureReason::Error,
    }
}

/// The rates providers of every scenario of a run.
#[derive(Debug)]
pub(crate) struct RatesScenarios {
    providers: Vec<ImmutableRatesProvider>,
    shift: f64,
}

impl RatesScenarios {
    /// Builds a provider per scenario using the lookup in `parameters`.
    pub(crate) fn of(
        parameters: &CalculationParameters,
        market_data: &ScenarioMarketData,
    ) -> anyhow::Result<Self> {
        let lookup = rates_lookup(parameters)?;
        let shift = match parameters.find::<FunctionArguments>() {
            Some(arguments) => arguments.get_f64(PV01_SHIFT_ARGUMENT, DEFAULT_PV01_SHIFT)?,
            None => DEFAULT_PV01_SHIFT,
        };
        if !(shift.is_finite() && shift > 0.0) {
            anyhow::bail!("{PV01_SHIFT_ARGUMENT} must be positive, got {shift}");
        }
        let providers = market_data
            .scenarios()
            .map(|scenario| lookup.rates_provider(&scenario))
            .collect();
        Ok(Self { providers, shift })
    }

    fn values<T>(
        &self,
        f: impl Fn(&ImmutableRatesProvider) -> PricerResult<T>,
    ) -> PricerResult<Vec<T>> {
        self.providers.iter().map(f).collect()
    }

    pub(crate) fn amounts(
        &self,
        f: impl Fn(&ImmutableRatesProvider) -> PricerResult<CurrencyAmount>,
    ) -> PricerResult<Arc<dyn ScenarioValue>> {
        Ok(Arc::new(CurrencyScenarioArray::of(self.values(f)?)))
    }

    pub(crate) fn multi_currency_amounts(
        &self,
        f: impl Fn(&ImmutableRatesProvider) -> PricerResult<MultiCurrencyAmount>,
    ) -> PricerResult<Arc<dyn ScenarioValue>> {
        Ok(Arc::new(MultiCurrencyScenarioArray::of(self.values(f)?)))
    }

    pub(crate) fn array<T>(
        &self,
        f: impl Fn(&ImmutableRatesProvider) -> PricerResult<T>,
    ) -> PricerResult<Arc<dyn ScenarioValue>>
    where
        T: std::fmt::Debug + Send + Sync + 'static,
    {
        Ok(Arc::new(ScenarioArray::of(self.values(f)?)))
    }

    /// Computes one of the PV01 measures from the point sensitivity of the
    /// present value; `None` if `measure` is not one of them.
    pub(crate) fn sensitivity_measure(
        &self,
        measure: &Measure,
        sensitivity: impl Fn(&ImmutableRatesProvider) -> PricerResult<PointSensitivities>,
    ) -> Option<PricerResult<Arc<dyn ScenarioValue>>> {
        let shift = self.shift;
        let calibrated =
            |provider: &ImmutableRatesProvider| -> PricerResult<CurrencyParameterSensitivities> {
                Ok(provider.parameter_sensitivity(&sensitivity(provider)?)?)
            };
        let market_quote =
            |provider: &ImmutableRatesProvider| -> PricerResult<CurrencyParameterSensitivities> {
                let calibrated = calibrated(provider)?;
                Ok(MarketQuoteSensitivityCalculator::new().sensitivity(&calibrated, provider)?)
            };

        let result = if *measure == Measure::PV01_CALIBRATED_SUM {
            self.multi_currency_amounts(|p| Ok(calibrated(p)?.multiplied_by(shift).total()))
        } else if *measure == Measure::PV01_CALIBRATED_BUCKETED {
            self.bucketed(|p| Ok(calibrated(p)?.multiplied_by(shift)))
        } else if *measure == Measure::PV01_MARKET_QUOTE_SUM {
            self.multi_currency_amounts(|p| Ok(market_quote(p)?.multiplied_by(shift).total()))
        } else if *measure == Measure::PV01_MARKET_QUOTE_BUCKETED {
            self.bucketed(|p| Ok(market_quote(p)?.multiplied_by(shift)))
        } else if *measure == Measure::PV01_SEMI_PARALLEL_GAMMA_BUCKETED {
            self.bucketed(|p| {
                Ok(semi_parallel_gamma(p, shift, &calibrated)?.multiplied_by(shift * shift))
            })
        } else {
            return None;
        };
        Some(result)
    }

    fn bucketed(
        &self,
        f: impl Fn(&ImmutableRatesProvider) -> PricerResult<CurrencyParameterSensitivities>,
    ) -> PricerResult<Arc<dyn ScenarioValue>> {
        Ok(Arc::new(ConvertibleScenarioArray::of(self.values(f)?)))
    }
}

/// Bucketed gamma of every curve the trade is sensitive to.
///
/// Each curve is bumped wherever the provider uses it, so a curve serving
/// both discounting and forecasting moves as one.
fn semi_parallel_gamma(
    provider: &ImmutableRatesProvider,
    shift: f64,
    calibrated: &impl Fn(&ImmutableRatesProvider) -> PricerResult<CurrencyParameterSensitivities>,
) -> PricerResult<CurrencyParameterSensitivities> {
    let calculator = CurveGammaCalculator::with_shift(shift)?;
    let base = calibrated(provider)?;
    let mut gammas = Vec::with_capacity(base.len());
    for entry in base.entries() {
        let name = entry.market_data_name();
        let currency = entry.currency();
        let curve = provider
            .find_curve(name)
            .ok_or_else(|| CurveError::curve_not_found(name.as_str()))?;
        let gamma = calculator.calculate_semi_parallel_gamma(&curve, currency, |bumped| {
            let bumped_provider = with_curve(provider, name, bumped);
            let sensitivities = calibrated(&bumped_provider).map_err(|err| match err {
                PricerError::Curve(curve_err) => curve_err,
                other => CurveError::invalid_value(other.to_string()),
            })?;
            Ok(match sensitivities.find(name, currency) {
                Some(found) => found.clone(),
                None => bumped
                    .create_parameter_sensitivity(currency, vec![0.0; bumped.parameter_count()]),
            })
        })?;
        gammas.push(gamma);
    }
    Ok(CurrencyParameterSensitivities::of(gammas)?)
}

/// Replaces every use of the named curve.
fn with_curve(
    provider: &ImmutableRatesProvider,
    name: &CurveName,
    curve: &Arc<dyn Curve>,
) -> ImmutableRatesProvider {
    let mut builder = provider.to_builder();
    for (currency, existing) in provider.discount_curves() {
        if existing.name() == name {
            builder = builder.discount_curve(*currency, curve.clone());
        }
    }
    for (index, existing) in provider.index_curves() {
        if existing.name() == name {
            builder = builder.ibor_index_curve(index.clone(), curve.clone());
        }
    }
    builder.build()
}
