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
use meridian_market::ScenarioMarketData;

use super::{insert_result, rates_lookup, RatesScenarios, SENSITIVITY_MEASURES};
use crate::error::PricerResult;
use crate::pricer::DiscountingTermDepositProductPricer;
use crate::product::{ResolvedTermDeposit, TermDepositTrade};

/// Calculates measures for [`TermDepositTrade`] targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermDepositTradeCalculationFunction {
    pricer: DiscountingTermDepositProductPricer,
}

impl TermDepositTradeCalculationFunction {
    /// Creates a function using `pricer`.
    #[must_use]
    pub fn new(pricer: DiscountingTermDepositProductPricer) -> Self {
        Self { pricer }
    }

    fn measure(
        &self,
        measure: &Measure,
        deposit: &ResolvedTermDeposit,
        scenarios: &RatesScenarios,
    ) -> PricerResult<Arc<dyn ScenarioValue>> {
        let pricer = &self.pricer;
        if let Some(result) =
            scenarios.sensitivity_measure(measure, |p| pricer.present_value_sensitivity(deposit, p))
        {
            return result;
        }
        if *measure == Measure::PRESENT_VALUE {
            scenarios.amounts(|p| pricer.present_value(deposit, p))
        } else if *measure == Measure::PAR_RATE {
            scenarios.array(|p| pricer.par_rate(deposit, p))
        } else if *measure == Measure::PAR_SPREAD {
            scenarios.array(|p| pricer.par_spread(deposit, p))
        } else {
            scenarios.amounts(|p| pricer.current_cash(deposit, p))
        }
    }
}

impl CalculationFunction for TermDepositTradeCalculationFunction {
    fn target_type(&self) -> TargetType {
        TargetType::of::<TermDepositTrade>()
    }

    fn supported_measures(&self) -> BTreeSet<Measure> {
        [Measure::PRESENT_VALUE, Measure::PAR_RATE, Measure::PAR_SPREAD, Measure::CURRENT_CASH]
            .into_iter()
            .chain(SENSITIVITY_MEASURES)
            .collect()
    }

    fn natural_currency(&self, target: &dyn CalculationTarget) -> Option<Currency> {
        downcast_target::<TermDepositTrade>(target)
            .ok()
            .map(|trade| trade.product().currency())
    }

    fn requirements(
        &self,
        target: &dyn CalculationTarget,
        _measures: &BTreeSet<Measure>,
        parameters: &CalculationParameters,
    ) -> anyhow::Result<FunctionRequirements> {
        let deposit = downcast_target::<TermDepositTrade>(target)?.product();
        let no_indices = std::iter::empty::<&IborIndex>();
        Ok(rates_lookup(parameters)?.requirements([deposit.currency()], no_indices)?)
    }

    fn calculate(
        &self,
        target: &dyn CalculationTarget,
        measures: &BTreeSet<Measure>,
        parameters: &CalculationParameters,
        market_data: &ScenarioMarketData,
    ) -> anyhow::Result<MeasureResults> {
        let deposit = downcast_target::<TermDepositTrade>(target)?.resolve();
        let (calculable, mut results) = partition_measures(&self.supported_measures(), measures);
        let scenarios = RatesScenarios::of(parameters, market_data)?;
        for measure in calculable {
            let result = self.measure(&measure, &deposit, &scenarios);
            insert_result(&mut results, measure, result);
        }
        Ok(results)
    }
}
