//! Benchmarks for running trades through the calculation engine.
//!
//! Run with: cargo bench -p meridian-pricer

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use meridian_calc::prelude::*;
use meridian_core::daycounts::DayCount;
use meridian_core::{Currency, Date};
use meridian_curves::prelude::*;
use meridian_market::ScenarioMarketData;
use meridian_math::interpolation::InterpolatorKind;
use meridian_pricer::prelude::*;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

fn valuation() -> Date {
    Date::from_ymd(2024, 6, 14).unwrap()
}

fn discount_id() -> CurveId {
    CurveId::new("Bench", CurveName::new("USD-Disc"))
}

fn forward_id() -> CurveId {
    CurveId::new("Bench", CurveName::new("USD-3M"))
}

fn zero_curve(name: &str, shift: f64) -> Arc<dyn Curve> {
    let metadata =
        CurveMetadata::new(CurveName::new(name), ValueType::ZeroRate, DayCount::Act365Fixed);
    let times = vec![0.25, 0.5, 1.0, 2.0, 5.0, 10.0];
    let rates = vec![0.050, 0.049, 0.047, 0.044, 0.041, 0.040]
        .into_iter()
        .map(|r| r + shift)
        .collect();
    Arc::new(InterpolatedNodalCurve::new(metadata, times, rates, InterpolatorKind::Linear).unwrap())
}

fn create_market_data(scenarios: usize) -> ScenarioMarketData {
    let shifts: Vec<f64> = (0..scenarios).map(|i| i as f64 * 1e-4).collect();
    ScenarioMarketData::builder(scenarios, valuation())
        .add_scenario_values(
            &discount_id(),
            shifts.iter().map(|s| zero_curve("USD-Disc", *s)).collect(),
        )
        .add_scenario_values(
            &forward_id(),
            shifts.iter().map(|s| zero_curve("USD-3M", s + 0.002)).collect(),
        )
        .build()
        .unwrap()
}

fn create_fra_batch(count: usize) -> Vec<Arc<dyn CalculationTarget>> {
    let spot = Date::from_ymd(2024, 6, 18).unwrap();
    (0..count)
        .map(|i| {
            let start = (i % 24) as i32;
            let fra = Fra::new(
                if i % 2 == 0 { BuySell::Buy } else { BuySell::Sell },
                1_000_000.0 * (1 + i % 10) as f64,
                spot.add_months(start).unwrap(),
                spot.add_months(start + 3).unwrap(),
                0.04 + (i % 7) as f64 * 0.001,
                IborIndex::usd_libor_3m(),
            )
            .unwrap();
            let info = TradeInfo::empty().with_id(format!("FRA_{i:05}"));
            Arc::new(FraTrade::new(info, fra)) as Arc<dyn CalculationTarget>
        })
        .collect()
}

fn create_rules() -> CalculationRules {
    let lookup = RatesMarketDataLookup::of(
        [(Currency::USD, discount_id())],
        [(IborIndex::usd_libor_3m(), forward_id())],
    );
    CalculationRules::of(standard_pricing_rules(Pricers::default()))
        .with_parameters(CalculationParameters::empty().with(lookup))
}

fn value_columns() -> Vec<Column> {
    vec![
        Column::of(Measure::PRESENT_VALUE),
        Column::of(Measure::PAR_RATE),
        Column::of(Measure::PAR_SPREAD),
    ]
}

// =============================================================================
// RUNNER BENCHMARKS
// =============================================================================

fn bench_runner_trades(c: &mut Criterion) {
    let rules = create_rules();
    let market_data = create_market_data(1);
    let columns = value_columns();
    let runner = CalculationRunner::single_threaded();

    let mut group = c.benchmark_group("runner_trades");
    group.sample_size(30);

    for size in [10, 100, 500].iter() {
        let targets = create_fra_batch(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &targets, |b, targets| {
            b.iter(|| {
                runner.calculate(black_box(&rules), black_box(targets), &columns, &market_data)
            })
        });
    }

    group.finish();
}

fn bench_runner_scenarios(c: &mut Criterion) {
    let rules = create_rules();
    let columns = value_columns();
    let targets = create_fra_batch(50);
    let runner = CalculationRunner::single_threaded();

    let mut group = c.benchmark_group("runner_scenarios");
    group.sample_size(30);

    for scenarios in [1, 10, 50].iter() {
        let market_data = create_market_data(*scenarios);
        group.throughput(Throughput::Elements((*scenarios * targets.len()) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(scenarios),
            &market_data,
            |b, market_data| {
                b.iter(|| {
                    runner.calculate(&rules, black_box(&targets), &columns, black_box(market_data))
                })
            },
        );
    }

    group.finish();
}

// =============================================================================
// EXECUTOR COMPARISON
// =============================================================================

fn bench_executor_comparison(c: &mut Criterion) {
    let rules = create_rules();
    let market_data = create_market_data(10);
    let columns = value_columns();
    let targets = create_fra_batch(200);
    let single = CalculationRunner::single_threaded();
    let parallel = CalculationRunner::of(Executor::Parallel { threads: 4 }).unwrap();

    let mut group = c.benchmark_group("executor_comparison_200");
    group.sample_size(20);
    group.throughput(Throughput::Elements(200));

    group.bench_function("single_threaded", |b| {
        b.iter(|| single.calculate(&rules, black_box(&targets), &columns, &market_data))
    });
    group.bench_function("parallel_4", |b| {
        b.iter(|| parallel.calculate(&rules, black_box(&targets), &columns, &market_data))
    });

    group.finish();
}

// =============================================================================
// SENSITIVITY BENCHMARKS
// =============================================================================

fn bench_pv01_bucketed(c: &mut Criterion) {
    let rules = create_rules();
    let market_data = create_market_data(1);
    let targets = create_fra_batch(50);
    let runner = CalculationRunner::single_threaded();

    let mut group = c.benchmark_group("pv01_50_trades");
    group.sample_size(20);

    for measure in [
        Measure::PV01_CALIBRATED_SUM,
        Measure::PV01_CALIBRATED_BUCKETED,
        Measure::PV01_SEMI_PARALLEL_GAMMA_BUCKETED,
    ] {
        let columns = [Column::of(measure.clone())];
        group.bench_with_input(BenchmarkId::from_parameter(measure.name()), &columns, |b, columns| {
            b.iter(|| runner.calculate(&rules, black_box(&targets), columns, &market_data))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_runner_trades,
    bench_runner_scenarios,
    bench_executor_comparison,
    bench_pv01_bucketed,
);

criterion_main!(benches);
