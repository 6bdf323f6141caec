use std::collections::BTreeSet;
use std::sync::Arc;

use meridian_calc::function::{partition_measures, CalculationFunction, MeasureResults};
use meridian_calc::measure::Measure;
use meridian_calc::parameters::CalculationParameters;
use meridian_calc::requirements::FunctionRequirements;
use meridian_calc::scenario::ScenarioValue;
use meridian_calc::target::{downcast_target, CalculationTarget, TargetType};
use meridian_core::Currency;
use meridian_market::ScenarioMarketData;

use super::{insert_result, rates_lookup, RatesScenarios, SENSITIVITY_MEASURES};
use crate::error::PricerResult;
use crate::pricer::DiscountingFraProductPricer;
use crate::product::{FraTrade, ResolvedFra};

/// Calculates measures for [`FraTrade`] targets.
///
/// Supports present value, par rate, par spread, current cash and the PV01
/// measures.
#[derive(Debug, Clone, Copy, Default)]
pub struct FraTradeCalculationFunction {
    pricer: DiscountingFraProductPricer,
}

impl FraTradeCalculationFunction {
    /// Creates a function using `pricer`.
    #[must_use]
    pub fn new(pricer: DiscountingFraProductPricer) -> Self {
        Self { pricer }
    }

    fn measure(
        &self,
        measure: &Measure,
        fra: &ResolvedFra,
        scenarios: &RatesScenarios,
    ) -> PricerResult<Arc<dyn ScenarioValue>> {
        let pricer = &self.pricer;
        if let Some(result) =
            scenarios.sensitivity_measure(measure, |p| pricer.present_value_sensitivity(fra, p))
        {
            return result;
        }
        if *measure == Measure::PRESENT_VALUE {
            scenarios.amounts(|p| pricer.present_value(fra, p))
        } else if *measure == Measure::PAR_RATE {
            scenarios.array(|p| pricer.par_rate(fra, p))
        } else if *measure == Measure::PAR_SPREAD {
            scenarios.array(|p| pricer.par_spread(fra, p))
        } else {
            scenarios.amounts(|p| pricer.current_cash(fra, p))
        }
    }
}

impl CalculationFunction for FraTradeCalculationFunction {
    fn target_type(&self) -> TargetType {
        TargetType::of::<FraTrade>()
    }

    fn supported_measures(&self) -> BTreeSet<Measure> {
        [Measure::PRESENT_VALUE, Measure::PAR_RATE, Measure::PAR_SPREAD, Measure::CURRENT_CASH]
            .into_iter()
            .chain(SENSITIVITY_MEASURES)
            .collect()
    }

    fn natural_currency(&self, target: &dyn CalculationTarget) -> Option<Currency> {
        downcast_target::<FraTrade>(target)
            .ok()
            .map(|trade| trade.product().currency())
    }

    fn requirements(
        &self,
        target: &dyn CalculationTarget,
        _measures: &BTreeSet<Measure>,
        parameters: &CalculationParameters,
    ) -> anyhow::Result<FunctionRequirements> {
        let fra = downcast_target::<FraTrade>(target)?.product();
        Ok(rates_lookup(parameters)?.requirements([fra.currency()], [fra.index()])?)
    }

    fn calculate(
        &self,
        target: &dyn CalculationTarget,
        measures: &BTreeSet<Measure>,
        parameters: &CalculationParameters,
        market_data: &ScenarioMarketData,
    ) -> anyhow::Result<MeasureResults> {
        let fra = downcast_target::<FraTrade>(target)?.resolve()?;
        let (calculable, mut results) = partition_measures(&self.supported_measures(), measures);
        let scenarios = RatesScenarios::of(parameters, market_data)?;
        for measure in calculable {
            let result = self.measure(&measure, &fra, &scenarios);
            insert_result(&mut results, measure, result);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::RatesMarketDataLookup;
    use crate::product::{BuySell, Fra, TradeInfo};
    use crate::test_support::{date, flat_curve, valuation};
    use approx::assert_relative_eq;
    use meridian_calc::parameters::FunctionArguments;
    use meridian_calc::result::FailureReason;
    use meridian_calc::scenario::{CurrencyScenarioArray, MultiCurrencyScenarioArray, ScenarioArray};
    use meridian_curves::curve::{CurveId, CurveName};
    use meridian_curves::index::IborIndex;
    use meridian_curves::provider::ImmutableRatesProvider;
    use meridian_market::ImmutableMarketData;

    fn trade() -> FraTrade {
        let fra = Fra::new(
            BuySell::Buy,
            1_000_000.0,
            date(2024, 9, 18),
            date(2024, 12, 18),
            0.04,
            IborIndex::usd_libor_3m(),
        )
        .unwrap();
        FraTrade::new(TradeInfo::empty().with_id("FRA-1"), fra)
    }

    fn lookup() -> RatesMarketDataLookup {
        RatesMarketDataLookup::of(
            [(Currency::USD, CurveId::new("Default", CurveName::new("USD-Disc")))],
            [(IborIndex::usd_libor_3m(), CurveId::new("Default", CurveName::new("USD-3M")))],
        )
    }

    fn market_data(discount_rates: &[f64]) -> ScenarioMarketData {
        let lookup = lookup();
        let disc = lookup.discount_curve_id(Currency::USD).unwrap().clone();
        let fwd = lookup.forward_curve_id(&IborIndex::usd_libor_3m()).unwrap().clone();
        ScenarioMarketData::builder(discount_rates.len(), valuation())
            .add_scenario_values(
                &disc,
                discount_rates.iter().map(|r| flat_curve("USD-Disc", *r)).collect(),
            )
            .add_value(&fwd, flat_curve("USD-3M", 0.045))
            .build()
            .unwrap()
    }

    fn measures() -> BTreeSet<Measure> {
        BTreeSet::from([
            Measure::PRESENT_VALUE,
            Measure::PAR_RATE,
            Measure::PV01_CALIBRATED_SUM,
            Measure::PV01_MARKET_QUOTE_SUM,
            Measure::FORWARD_FX_RATE,
        ])
    }

    #[test]
    fn test_measures_match_pricer() {
        let function = FraTradeCalculationFunction::default();
        let parameters = CalculationParameters::empty().with(lookup());
        let trade = trade();
        let results = function
            .calculate(&trade, &measures(), &parameters, &market_data(&[0.03, 0.05]))
            .unwrap();

        let pv = results[&Measure::PRESENT_VALUE].as_ref().unwrap();
        let pv = pv.downcast_ref::<CurrencyScenarioArray>().unwrap();
        assert_eq!(pv.scenario_count(), 2);
        let pricer = DiscountingFraProductPricer::new();
        for (i, rate) in [0.03, 0.05].into_iter().enumerate() {
            let provider = ImmutableRatesProvider::builder(valuation())
                .discount_curve(Currency::USD, flat_curve("USD-Disc", rate))
                .ibor_index_curve(IborIndex::usd_libor_3m(), flat_curve("USD-3M", 0.045))
                .build();
            let expected = pricer.present_value(&trade.resolve().unwrap(), &provider).unwrap();
            assert_relative_eq!(pv.get(i).unwrap().amount(), expected.amount(), epsilon = 1e-8);
        }

        let par = results[&Measure::PAR_RATE].as_ref().unwrap();
        let par = par.downcast_ref::<ScenarioArray<f64>>().unwrap();
        assert_relative_eq!(par.values()[0], par.values()[1], epsilon = 1e-15);

        // flat curves carry no calibration Jacobian
        let market_quote = results[&Measure::PV01_MARKET_QUOTE_SUM].as_ref().unwrap_err();
        assert_eq!(market_quote.reason(), FailureReason::Error);
        assert!(results[&Measure::PV01_CALIBRATED_SUM].is_ok());

        let unsupported = results[&Measure::FORWARD_FX_RATE].as_ref().unwrap_err();
        assert_eq!(unsupported.reason(), FailureReason::InvalidInput);
    }

    #[test]
    fn test_pv01_scales_with_shift() {
        let function = FraTradeCalculationFunction::default();
        let measures = BTreeSet::from([Measure::PV01_CALIBRATED_SUM]);
        let market_data = market_data(&[0.03]);
        let pv01 = |parameters: &CalculationParameters| {
            let results =
                function.calculate(&trade(), &measures, parameters, &market_data).unwrap();
            let value = results[&Measure::PV01_CALIBRATED_SUM].as_ref().unwrap().clone();
            value
                .downcast_ref::<MultiCurrencyScenarioArray>()
                .unwrap()
                .get(0)
                .unwrap()
                .amount(Currency::USD)
        };
        let default = pv01(&CalculationParameters::empty().with(lookup()));
        let doubled = pv01(
            &CalculationParameters::empty()
                .with(lookup())
                .with(FunctionArguments::of([("pv01.shift", "2e-4")])),
        );
        assert!(default > 0.0);
        assert_relative_eq!(doubled, 2.0 * default, max_relative = 1e-12);
    }

    #[test]
    fn test_requirements_and_natural_currency() {
        let function = FraTradeCalculationFunction::default();
        let trade = trade();
        assert_eq!(function.natural_currency(&trade), Some(Currency::USD));
        let requirements = function
            .requirements(&trade, &measures(), &CalculationParameters::empty().with(lookup()))
            .unwrap();
        assert_eq!(requirements.value_requirements().len(), 2);
        assert_eq!(requirements.time_series_requirements().len(), 1);

        assert!(function
            .requirements(&trade, &measures(), &CalculationParameters::empty())
            .is_err());
    }

    #[test]
    fn test_missing_curve_is_missing_data() {
        let function = FraTradeCalculationFunction::default();
        let empty = ImmutableMarketData::builder(valuation()).build();
        let market_data = ScenarioMarketData::of_market_data(empty, 1).unwrap();
        let results = function
            .calculate(
                &trade(),
                &BTreeSet::from([Measure::PRESENT_VALUE]),
                &CalculationParameters::empty().with(lookup()),
                &market_data,
            )
            .unwrap();
        let failure = results[&Measure::PRESENT_VALUE].as_ref().unwrap_err();
        assert_eq!(failure.reason(), FailureReason::MissingData);
    }
}
