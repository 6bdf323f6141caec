use std::collections::BTreeSet;
use std::sync::Arc;

use meridian_calc::function::{partition_measures, CalculationFunction, MeasureResults};
use meridian_calc::measure::Measure;
use meridian_calc::parameters::CalculationParameters;
use meridian_calc::requirements::FunctionRequirements;
use meridian_calc::scenario::ScenarioValue;
use meridian_calc::target::{downcast_target, CalculationTarget, TargetType};
use meridian_core::Currency;
use meridian_curves::index::IborIndex;
use meridian_market::{FxRateId, ScenarioMarketData};

use super::{insert_result, rates_lookup, RatesScenarios, SENSITIVITY_MEASURES};
use crate::error::PricerResult;
use crate::pricer::DiscountingFxSingleProductPricer;
use crate::product::{FxSingleTrade, ResolvedFxSingle};

/// Calculates measures for [`FxSingleTrade`] targets.
///
/// Results are reported in the counter currency of the exchange unless a
/// reporting currency is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct FxSingleTradeCalculationFunction {
    pricer: DiscountingFxSingleProductPricer,
}

impl FxSingleTradeCalculationFunction {
    /// Creates a function using `pricer`.
    #[must_use]
    pub fn new(pricer: DiscountingFxSingleProductPricer) -> Self {
        Self { pricer }
    }

    fn measure(
        &self,
        measure: &Measure,
        fx: &ResolvedFxSingle,
        scenarios: &RatesScenarios,
    ) -> PricerResult<Arc<dyn ScenarioValue>> {
        let pricer = &self.pricer;
        if let Some(result) =
            scenarios.sensitivity_measure(measure, |p| pricer.present_value_sensitivity(fx, p))
        {
            return result;
        }
        if *measure == Measure::PRESENT_VALUE {
            scenarios.multi_currency_amounts(|p| pricer.present_value(fx, p))
        } else if *measure == Measure::CURRENCY_EXPOSURE {
            scenarios.multi_currency_amounts(|p| pricer.currency_exposure(fx, p))
        } else if *measure == Measure::CURRENT_CASH {
            scenarios.multi_currency_amounts(|p| pricer.current_cash(fx, p))
        } else if *measure == Measure::FORWARD_FX_RATE {
            scenarios.array(|p| pricer.forward_fx_rate(fx, p))
        } else {
            scenarios.array(|p| pricer.par_spread(fx, p))
        }
    }
}

impl CalculationFunction for FxSingleTradeCalculationFunction {
    fn target_type(&self) -> TargetType {
        TargetType::of::<FxSingleTrade>()
    }

    fn supported_measures(&self) -> BTreeSet<Measure> {
        [
            Measure::PRESENT_VALUE,
            Measure::PAR_SPREAD,
            Measure::CURRENCY_EXPOSURE,
            Measure::CURRENT_CASH,
            Measure::FORWARD_FX_RATE,
        ]
        .into_iter()
        .chain(SENSITIVITY_MEASURES)
        .collect()
    }

    fn natural_currency(&self, target: &dyn CalculationTarget) -> Option<Currency> {
        downcast_target::<FxSingleTrade>(target)
            .ok()
            .map(|trade| trade.product().currency_pair().counter())
    }

    fn requirements(
        &self,
        target: &dyn CalculationTarget,
        _measures: &BTreeSet<Measure>,
        parameters: &CalculationParameters,
    ) -> anyhow::Result<FunctionRequirements> {
        let pair = downcast_target::<FxSingleTrade>(target)?.product().currency_pair();
        let curves = rates_lookup(parameters)?
            .requirements([pair.base(), pair.counter()], std::iter::empty::<&IborIndex>())?;
        let fx = FunctionRequirements::builder().value(&FxRateId::new(pair)).build();
        Ok(curves.combined_with(&fx))
    }

    fn calculate(
        &self,
        target: &dyn CalculationTarget,
        measures: &BTreeSet<Measure>,
        parameters: &CalculationParameters,
        market_data: &ScenarioMarketData,
    ) -> anyhow::Result<MeasureResults> {
        let fx = downcast_target::<FxSingleTrade>(target)?.resolve();
        let (calculable, mut results) = partition_measures(&self.supported_measures(), measures);
        let scenarios = RatesScenarios::of(parameters, market_data)?;
        for measure in calculable {
            let result = self.measure(&measure, &fx, &scenarios);
            insert_result(&mut results, measure, result);
        }
        Ok(results)
    }
}
