//! Trades priced through the calculation runner match the pricers.

use std::sync::Arc;

use approx::assert_relative_eq;

use meridian_calc::prelude::*;
use meridian_core::daycounts::DayCount;
use meridian_core::types::FxRate;
use meridian_core::{Currency, CurrencyAmount, CurrencyPair, Date};
use meridian_curves::prelude::*;
use meridian_market::{FxRateId, ScenarioMarketData};
use meridian_pricer::prelude::*;

fn valuation() -> Date {
    Date::from_ymd(2024, 6, 14).unwrap()
}

fn date(year: i32, month: u32, day: u32) -> Date {
    Date::from_ymd(year, month, day).unwrap()
}

fn flat_discount_factor_curve(name: &str, df: f64) -> Arc<dyn Curve> {
    let metadata =
        CurveMetadata::new(CurveName::new(name), ValueType::DiscountFactor, DayCount::Act365Fixed);
    Arc::new(ConstantCurve::new(metadata, df))
}

fn fra_trade() -> FraTrade {
    let fra = Fra::new(
        BuySell::Buy,
        1_000_000.0,
        date(2024, 9, 18),
        date(2024, 12, 18),
        0.025,
        IborIndex::usd_libor_3m(),
    )
    .unwrap();
    FraTrade::new(TradeInfo::empty().with_id("FRA-1"), fra)
}

/// USD discounting and USD-LIBOR-3M forecasting both read one curve with a
/// discount factor of 0.99 everywhere.
fn flat_setup() -> (CalculationRules, ScenarioMarketData, ImmutableRatesProvider) {
    let id = CurveId::new("Default", CurveName::new("USD-Flat"));
    let curve = flat_discount_factor_curve("USD-Flat", 0.99);
    let lookup = RatesMarketDataLookup::of(
        [(Currency::USD, id.clone())],
        [(IborIndex::usd_libor_3m(), id.clone())],
    );
    let market_data = ScenarioMarketData::builder(1, valuation())
        .add_value(&id, curve.clone())
        .build()
        .unwrap();
    let provider = ImmutableRatesProvider::builder(valuation())
        .discount_curve(Currency::USD, curve.clone())
        .ibor_index_curve(IborIndex::usd_libor_3m(), curve)
        .build();
    let rules = CalculationRules::of(standard_pricing_rules(Pricers::default()))
        .with_parameters(CalculationParameters::empty().with(lookup));
    (rules, market_data, provider)
}

#[test]
fn fra_on_flat_curve_matches_pricer() {
    let (rules, market_data, provider) = flat_setup();
    let trade = fra_trade();
    let targets: Vec<Arc<dyn CalculationTarget>> = vec![Arc::new(trade.clone())];
    let columns = [
        Column::of(Measure::PRESENT_VALUE),
        Column::of(Measure::PAR_RATE),
        Column::of(Measure::PAR_SPREAD),
    ];
    let results = CalculationRunner::single_threaded()
        .calculate(&rules, &targets, &columns, &market_data)
        .unwrap();

    let pricer = DiscountingFraProductPricer::new();
    let resolved = trade.resolve().unwrap();
    let expected_pv = pricer.present_value(&resolved, &provider).unwrap();
    let expected_par = pricer.par_rate(&resolved, &provider).unwrap();

    let pv = results.value::<CurrencyScenarioArray>(0, 0).unwrap();
    assert_eq!(pv.get(0).unwrap().currency(), Currency::USD);
    assert_relative_eq!(pv.get(0).unwrap().amount(), expected_pv.amount(), epsilon = 1e-9);
    // a flat discount factor curve has zero forward rates
    assert_relative_eq!(
        expected_pv.amount(),
        -1_000_000.0 * 0.99 * resolved.year_fraction() * 0.025,
        epsilon = 1e-8
    );

    let par = results.value::<ScenarioArray<f64>>(0, 1).unwrap();
    assert_relative_eq!(par.values()[0], expected_par, epsilon = 1e-15);
    let spread = results.value::<ScenarioArray<f64>>(0, 2).unwrap();
    assert_relative_eq!(spread.values()[0], expected_par - 0.025, epsilon = 1e-15);
}

#[test]
fn every_cell_has_one_value_per_scenario() {
    let disc = CurveId::new("Default", CurveName::new("USD-Disc"));
    let eur = CurveId::new("Default", CurveName::new("EUR-Disc"));
    let fwd = CurveId::new("Default", CurveName::new("USD-3M"));
    let flat_zero = |name: &str, rate: f64| -> Arc<dyn Curve> {
        let metadata =
            CurveMetadata::new(CurveName::new(name), ValueType::ZeroRate, DayCount::Act365Fixed);
        Arc::new(ConstantCurve::new(metadata, rate))
    };
    let eur_usd = CurrencyPair::new(Currency::EUR, Currency::USD);
    let scenarios = 3;
    let market_data = ScenarioMarketData::builder(scenarios, valuation())
        .add_scenario_values(
            &disc,
            [0.03, 0.04, 0.05].iter().map(|r| flat_zero("USD-Disc", *r)).collect(),
        )
        .add_value(&eur, flat_zero("EUR-Disc", 0.02))
        .add_value(&fwd, flat_zero("USD-3M", 0.045))
        .add_value(&FxRateId::new(eur_usd), FxRate::new(eur_usd, 1.1).unwrap())
        .build()
        .unwrap();
    let lookup = RatesMarketDataLookup::of(
        [(Currency::USD, disc), (Currency::EUR, eur)],
        [(IborIndex::usd_libor_3m(), fwd)],
    );
    let rules = CalculationRules::of(standard_pricing_rules(Pricers::default()))
        .with_parameters(CalculationParameters::empty().with(lookup));

    let deposit = TermDeposit::new(
        BuySell::Sell,
        Currency::USD,
        2_000_000.0,
        date(2024, 6, 18),
        date(2025, 6, 18),
        DayCount::Act360,
        0.045,
    )
    .unwrap();
    let fx = FxSingle::of(
        CurrencyAmount::new(Currency::EUR, 1_000_000.0),
        &FxRate::new(eur_usd, 1.12).unwrap(),
        date(2025, 6, 16),
    )
    .unwrap();
    let targets: Vec<Arc<dyn CalculationTarget>> = vec![
        Arc::new(fra_trade()),
        Arc::new(TermDepositTrade::new(TradeInfo::empty(), deposit)),
        Arc::new(FxSingleTrade::new(TradeInfo::empty(), fx)),
    ];
    let columns = [Column::of(Measure::PRESENT_VALUE), Column::of(Measure::PV01_CALIBRATED_SUM)];

    let results = CalculationRunner::single_threaded()
        .calculate(&rules, &targets, &columns, &market_data)
        .unwrap();
    assert_eq!(results.failures().count(), 0);
    for row in 0..2 {
        let pv = results.value::<CurrencyScenarioArray>(row, 0).unwrap();
        assert_eq!(pv.scenario_count(), scenarios);
        assert_eq!(pv.get(0).unwrap().currency(), Currency::USD);
    }
    // both legs of the FX trade are converted into the reporting currency
    let fx_pv = results.value::<MultiCurrencyScenarioArray>(2, 0).unwrap();
    assert_eq!(fx_pv.scenario_count(), scenarios);
    assert_eq!(fx_pv.get(0).unwrap().amount(Currency::EUR), 0.0);
    assert!(fx_pv.get(0).unwrap().amount(Currency::USD).abs() > 0.0);
    // a higher discount rate lowers the value of the deposit the trade receives
    let deposit_pv = results.value::<CurrencyScenarioArray>(1, 0).unwrap();
    assert!(deposit_pv.get(0).unwrap().amount() < deposit_pv.get(2).unwrap().amount());
}

#[test]
fn missing_lookup_fails_each_cell() {
    let (_, market_data, _) = flat_setup();
    let rules = CalculationRules::of(standard_pricing_rules(Pricers::default()));
    let targets: Vec<Arc<dyn CalculationTarget>> = vec![Arc::new(fra_trade())];
    let columns = [Column::of(Measure::PRESENT_VALUE), Column::of(Measure::PAR_RATE)];
    let results = CalculationRunner::single_threaded()
        .calculate(&rules, &targets, &columns, &market_data)
        .unwrap();
    let failures: Vec<_> = results.failures().collect();
    assert_eq!(failures.len(), 2);
    assert!(failures
        .iter()
        .all(|(_, _, failure)| failure.message().contains("RatesMarketDataLookup")));
}

#[test]
fn unsupported_measure_is_not_applicable() {
    let (rules, market_data, _) = flat_setup();
    let targets: Vec<Arc<dyn CalculationTarget>> = vec![Arc::new(fra_trade())];
    let columns = [Column::of(Measure::FORWARD_FX_RATE)];
    let results = CalculationRunner::single_threaded()
        .calculate(&rules, &targets, &columns, &market_data)
        .unwrap();
    let (_, _, failure) = results.failures().next().unwrap();
    assert_eq!(failure.reason(), FailureReason::NotApplicable);
    assert!(failure.message().contains(Measure::FORWARD_FX_RATE.name()));
}
