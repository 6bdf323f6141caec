//! End-to-end dispatch through the runner with stub functions.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use approx::assert_relative_eq;
use proptest::prelude::*;

use meridian_calc::prelude::*;
use meridian_core::types::{CurrencyPair, FxRate};
use meridian_core::{Currency, CurrencyAmount, Date};
use meridian_market::{FxRateId, QuoteId, ScenarioMarketData};

#[derive(Debug)]
struct Deposit {
    currency: Currency,
    amount: f64,
}

#[derive(Debug)]
struct Unpriced;

/// Present value and par rate of a deposit; par rate is read from a quote.
#[derive(Debug)]
struct DepositFunction {
    natural: bool,
}

impl CalculationFunction for DepositFunction {
    fn target_type(&self) -> TargetType {
        TargetType::of::<Deposit>()
    }

    fn supported_measures(&self) -> BTreeSet<Measure> {
        BTreeSet::from([Measure::PRESENT_VALUE, Measure::PAR_RATE])
    }

    fn natural_currency(&self, target: &dyn CalculationTarget) -> Option<Currency> {
        if !self.natural {
            return None;
        }
        downcast_target::<Deposit>(target).ok().map(|d| d.currency)
    }

    fn requirements(
        &self,
        target: &dyn CalculationTarget,
        _measures: &BTreeSet<Measure>,
        _parameters: &CalculationParameters,
    ) -> anyhow::Result<FunctionRequirements> {
        let deposit = downcast_target::<Deposit>(target)?;
        Ok(FunctionRequirements::builder()
            .value(&QuoteId::new("DEP-RATE"))
            .output_currency(deposit.currency)
            .build())
    }

    fn calculate(
        &self,
        target: &dyn CalculationTarget,
        measures: &BTreeSet<Measure>,
        _parameters: &CalculationParameters,
        market_data: &ScenarioMarketData,
    ) -> anyhow::Result<MeasureResults> {
        let deposit = downcast_target::<Deposit>(target)?;
        let (calculable, mut results) = partition_measures(&self.supported_measures(), measures);
        let rates = market_data.get_box(&QuoteId::new("DEP-RATE"))?;
        let count = market_data.scenario_count();
        for measure in calculable {
            let value: Arc<dyn ScenarioValue> = if measure == Measure::PRESENT_VALUE {
                Arc::new(CurrencyScenarioArray::of(
                    (0..count)
                        .map(|i| {
                            let rate = rates.value(i).copied().unwrap_or_default();
                            CurrencyAmount::new(deposit.currency, deposit.amount * (1.0 + rate))
                        })
                        .collect(),
                ))
            } else {
                Arc::new(ScenarioArray::of(
                    (0..count).map(|i| rates.value(i).copied().unwrap_or_default()).collect(),
                ))
            };
            results.insert(measure, Ok(value));
        }
        Ok(results)
    }
}

/// Misbehaving functions, one per failure mode.
#[derive(Debug)]
enum Broken {
    Errors,
    Panics,
    WrongScenarioCount,
    OmitsMeasure,
}

impl CalculationFunction for Broken {
    fn target_type(&self) -> TargetType {
        TargetType::of::<Deposit>()
    }

    fn supported_measures(&self) -> BTreeSet<Measure> {
        BTreeSet::from([Measure::PRESENT_VALUE])
    }

    fn requirements(
        &self,
        _target: &dyn CalculationTarget,
        _measures: &BTreeSet<Measure>,
        _parameters: &CalculationParameters,
    ) -> anyhow::Result<FunctionRequirements> {
        Ok(FunctionRequirements::empty())
    }

    fn calculate(
        &self,
        _target: &dyn CalculationTarget,
        _measures: &BTreeSet<Measure>,
        _parameters: &CalculationParameters,
        _market_data: &ScenarioMarketData,
    ) -> anyhow::Result<MeasureResults> {
        match self {
            Broken::Errors => anyhow::bail!("curve not found"),
            Broken::Panics => panic!("index out of range"),
            Broken::WrongScenarioCount => {
                let value: Arc<dyn ScenarioValue> = Arc::new(ScenarioArray::of(vec![1.0]));
                Ok(MeasureResults::from([(Measure::PRESENT_VALUE, Ok(value))]))
            }
            Broken::OmitsMeasure => Ok(MeasureResults::new()),
        }
    }
}

fn valuation_date() -> Date {
    Date::from_ymd(2024, 6, 14).unwrap()
}

fn market_data(rates: &[f64], eur_usd: &[f64]) -> ScenarioMarketData {
    let pair = CurrencyPair::new(Currency::EUR, Currency::USD);
    let mut builder = ScenarioMarketData::builder(rates.len(), valuation_date())
        .add_scenario_values(&QuoteId::new("DEP-RATE"), rates.to_vec());
    if !eur_usd.is_empty() {
        builder = builder.add_scenario_values(
            &FxRateId::new(pair),
            eur_usd.iter().map(|r| FxRate::new(pair, *r).unwrap()).collect(),
        );
    }
    builder.build().unwrap()
}

fn deposit_rules(natural: bool, reporting: ReportingCurrency) -> CalculationRules {
    let group = FunctionGroup::builder::<Deposit>("deposit")
        .add_function_all(Arc::new(DepositFunction { natural }))
        .build();
    CalculationRules::of(PricingRules::of([PricingRule::of(Arc::new(group))]))
        .with_reporting_currency(reporting)
}

fn broken_rules(broken: Broken) -> CalculationRules {
    let group = FunctionGroup::builder::<Deposit>("broken")
        .add_function_all(Arc::new(broken))
        .build();
    CalculationRules::of(PricingRules::of([PricingRule::of(Arc::new(group))]))
}

fn eur_deposit() -> Arc<dyn CalculationTarget> {
    Arc::new(Deposit {
        currency: Currency::EUR,
        amount: 1_000.0,
    })
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn run(
    rules: &CalculationRules,
    targets: &[Arc<dyn CalculationTarget>],
    columns: &[Column],
    data: &ScenarioMarketData,
) -> Results {
    init_tracing();
    CalculationRunner::single_threaded()
        .calculate(rules, targets, columns, data)
        .unwrap()
}

fn failure(results: &Results, row: usize, column: usize) -> Failure {
    results.get(row, column).unwrap().as_ref().unwrap_err().clone()
}

#[test]
fn test_natural_currency_values_per_scenario() {
    let data = market_data(&[0.01, 0.02, 0.03], &[]);
    let results = run(
        &deposit_rules(true, ReportingCurrency::Natural),
        &[eur_deposit()],
        &[Column::of(Measure::PRESENT_VALUE), Column::of(Measure::PAR_RATE)],
        &data,
    );
    let pv = results.value::<CurrencyScenarioArray>(0, 0).unwrap();
    assert_eq!(pv.values().len(), 3);
    assert_eq!(pv.values()[2].currency(), Currency::EUR);
    assert_relative_eq!(pv.values()[2].amount(), 1_030.0, epsilon = 1e-9);
    let par = results.value::<ScenarioArray<f64>>(0, 1).unwrap();
    assert_eq!(par.values(), &[0.01, 0.02, 0.03]);
}

#[test]
fn test_explicit_reporting_currency_converts_per_scenario() {
    let data = market_data(&[0.0, 0.0], &[1.10, 1.20]);
    let results = run(
        &deposit_rules(true, ReportingCurrency::Specific(Currency::USD)),
        &[eur_deposit()],
        &[Column::of(Measure::PRESENT_VALUE)],
        &data,
    );
    let pv = results.value::<CurrencyScenarioArray>(0, 0).unwrap();
    assert_eq!(pv.values()[0].currency(), Currency::USD);
    assert_relative_eq!(pv.values()[0].amount(), 1_100.0, epsilon = 1e-9);
    assert_relative_eq!(pv.values()[1].amount(), 1_200.0, epsilon = 1e-9);
}

#[test]
fn test_column_override_beats_rules() {
    let data = market_data(&[0.0], &[1.25]);
    let columns = [
        Column::of(Measure::PRESENT_VALUE),
        Column::of(Measure::PRESENT_VALUE)
            .with_header("PV USD")
            .with_reporting_currency(ReportingCurrency::Specific(Currency::USD)),
    ];
    let rules = deposit_rules(true, ReportingCurrency::Natural);
    let results = run(&rules, &[eur_deposit()], &columns, &data);
    let natural = results.value::<CurrencyScenarioArray>(0, 0).unwrap();
    assert_eq!(natural.values()[0].currency(), Currency::EUR);
    let usd = results.value::<CurrencyScenarioArray>(0, 1).unwrap();
    assert_relative_eq!(usd.values()[0].amount(), 1_250.0, epsilon = 1e-9);
}

#[test]
fn test_no_reporting_currency_fails_convertible_only() {
    let data = market_data(&[0.01], &[]);
    let results = run(
        &deposit_rules(false, ReportingCurrency::Natural),
        &[eur_deposit()],
        &[Column::of(Measure::PRESENT_VALUE), Column::of(Measure::PAR_RATE)],
        &data,
    );
    let pv = failure(&results, 0, 0);
    assert_eq!(pv.reason(), FailureReason::InvalidInput);
    assert!(pv.message().starts_with("No reporting currency available"));
    assert!(results.value::<ScenarioArray<f64>>(0, 1).is_some());
}

#[test]
fn test_missing_fx_rate_is_conversion_failure() {
    let data = market_data(&[0.01], &[]);
    let results = run(
        &deposit_rules(true, ReportingCurrency::Specific(Currency::JPY)),
        &[eur_deposit()],
        &[Column::of(Measure::PRESENT_VALUE)],
        &data,
    );
    let pv = failure(&results, 0, 0);
    assert_eq!(pv.reason(), FailureReason::CurrencyConversion);
    assert!(pv.message().contains("into JPY"));
}

#[test]
fn test_unsupported_measure() {
    let group = FunctionGroup::builder::<Deposit>("deposit")
        .add_function(Measure::CURRENT_CASH, Arc::new(DepositFunction { natural: true }))
        .build();
    let rules = CalculationRules::of(PricingRules::of([PricingRule::of(Arc::new(group))]));
    let columns = [Column::of(Measure::CURRENT_CASH)];
    let results = run(&rules, &[eur_deposit()], &columns, &market_data(&[0.01], &[]));
    let cash = failure(&results, 0, 0);
    assert_eq!(cash.reason(), FailureReason::InvalidInput);
    assert_eq!(cash.message(), "Unsupported measure: CurrentCash");
}

#[test]
fn test_unconfigured_target_is_not_applicable() {
    let targets: Vec<Arc<dyn CalculationTarget>> = vec![eur_deposit(), Arc::new(Unpriced)];
    let results = run(
        &deposit_rules(true, ReportingCurrency::Natural),
        &targets,
        &[Column::of(Measure::PRESENT_VALUE)],
        &market_data(&[0.01], &[]),
    );
    assert!(results.value::<CurrencyScenarioArray>(0, 0).is_some());
    assert_eq!(failure(&results, 1, 0).reason(), FailureReason::NotApplicable);
    let rules = deposit_rules(true, ReportingCurrency::Natural);
    assert!(rules.pricing_rules().configured_measures(&Unpriced).is_empty());
}

#[test]
fn test_function_error_fails_every_cell() {
    let results = run(
        &broken_rules(Broken::Errors),
        &[eur_deposit()],
        &[Column::of(Measure::PRESENT_VALUE)],
        &market_data(&[0.01], &[]),
    );
    let err = failure(&results, 0, 0);
    assert_eq!(err.reason(), FailureReason::Error);
    assert!(err.message().contains("curve not found"));
}

#[test]
fn test_function_panic_is_contained() {
    let results = run(
        &broken_rules(Broken::Panics),
        &[eur_deposit()],
        &[Column::of(Measure::PRESENT_VALUE)],
        &market_data(&[0.01], &[]),
    );
    let err = failure(&results, 0, 0);
    assert_eq!(err.reason(), FailureReason::Error);
    assert!(err.message().contains("index out of range"));
}

#[test]
fn test_malformed_results_fail() {
    let data = market_data(&[0.01, 0.02], &[]);
    let columns = [Column::of(Measure::PRESENT_VALUE)];
    let wrong = run(&broken_rules(Broken::WrongScenarioCount), &[eur_deposit()], &columns, &data);
    assert_eq!(failure(&wrong, 0, 0).reason(), FailureReason::CalculationFailed);
    let omitted = run(&broken_rules(Broken::OmitsMeasure), &[eur_deposit()], &columns, &data);
    assert_eq!(failure(&omitted, 0, 0).reason(), FailureReason::CalculationFailed);
}

#[derive(Default)]
struct CountingListener {
    received: AtomicUsize,
    finished: AtomicUsize,
}

impl CalculationListener for CountingListener {
    fn result_received(&self, results: CalculationResults) {
        self.received.fetch_add(results.cells().len(), Ordering::SeqCst);
    }

    fn calculation_finished(&self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_listener_receives_every_cell() {
    let targets: Vec<Arc<dyn CalculationTarget>> =
        vec![eur_deposit(), Arc::new(Unpriced), eur_deposit()];
    let columns = [Column::of(Measure::PRESENT_VALUE), Column::of(Measure::PAR_RATE)];
    let listener = CountingListener::default();
    CalculationRunner::of(Executor::Parallel { threads: 2 }).unwrap().calculate_with_listener(
        &deposit_rules(true, ReportingCurrency::Natural),
        &targets,
        &columns,
        &market_data(&[0.01], &[]),
        &listener,
    );
    assert_eq!(listener.received.load(Ordering::SeqCst), 6);
    assert_eq!(listener.finished.load(Ordering::SeqCst), 1);
}

proptest! {
    #[test]
    fn parallel_matches_single_threaded(
        amounts in prop::collection::vec(1.0f64..1e6, 1..20),
        rates in prop::collection::vec(-0.01f64..0.1, 1..4),
    ) {
        let targets: Vec<Arc<dyn CalculationTarget>> = amounts
            .iter()
            .map(|a| {
                let deposit = Deposit {
                    currency: Currency::EUR,
                    amount: *a,
                };
                Arc::new(deposit) as Arc<dyn CalculationTarget>
            })
            .collect();
        let columns = [Column::of(Measure::PRESENT_VALUE), Column::of(Measure::PAR_RATE)];
        let data = market_data(&rates, &[]);
        let rules = deposit_rules(true, ReportingCurrency::Natural);
        let single = run(&rules, &targets, &columns, &data);
        let parallel = CalculationRunner::of(Executor::Parallel { threads: 3 })
            .unwrap()
            .calculate(&rules, &targets, &columns, &data)
            .unwrap();
        for row in 0..targets.len() {
            let a = single.value::<CurrencyScenarioArray>(row, 0).unwrap();
            let b = parallel.value::<CurrencyScenarioArray>(row, 0).unwrap();
            prop_assert_eq!(a.values().len(), rates.len());
            prop_assert_eq!(a, b);
        }
    }
}
