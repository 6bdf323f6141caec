//! # Meridian Calc
//!
//! Dispatches measures to calculation functions over a grid of targets and
//! columns, for one or many market data scenarios.
//!
//! - **Measures and targets**: a [`Measure`](measure::Measure) names an
//!   output; any `Debug + Send + Sync` value can be a
//!   [`CalculationTarget`](target::CalculationTarget)
//! - **Functions**: pricing code implements
//!   [`CalculationFunction`](function::CalculationFunction), declaring its
//!   market data requirements before calculating
//! - **Rules**: [`PricingRules`](rules::PricingRules) select the function for
//!   each target type and measure; [`CalculationRules`](rules::CalculationRules)
//!   add the reporting currency and parameters
//! - **Execution**: [`CalculationRunner`](runner::CalculationRunner) plans
//!   [`CalculationTasks`](task::CalculationTasks), runs them on the calling
//!   thread or a rayon pool, converts results into the reporting currency and
//!   turns every error into a cell [`Failure`](result::Failure)
//! - **Configuration**: [`CalculationConfig`](config::CalculationConfig)
//!   loaded from TOML
//!
//! ## Example
//!
//! ```rust
//! use std::collections::BTreeSet;
//! use std::sync::Arc;
//! use meridian_core::Date;
//! use meridian_calc::prelude::*;
//! use meridian_market::ScenarioMarketData;
//!
//! #[derive(Debug)]
//! struct Loan;
//!
//! #[derive(Debug)]
//! struct LoanRate;
//!
//! impl CalculationFunction for LoanRate {
//!     fn target_type(&self) -> TargetType {
//!         TargetType::of::<Loan>()
//!     }
//!
//!     fn supported_measures(&self) -> BTreeSet<Measure> {
//!         BTreeSet::from([Measure::PAR_RATE])
//!     }
//!
//!     fn requirements(
//!         &self,
//!         _target: &dyn CalculationTarget,
//!         _measures: &BTreeSet<Measure>,
//!         _parameters: &CalculationParameters,
//!     ) -> anyhow::Result<FunctionRequirements> {
//!         Ok(FunctionRequirements::empty())
//!     }
//!
//!     fn calculate(
//!         &self,
//!         _target: &dyn CalculationTarget,
//!         _measures: &BTreeSet<Measure>,
//!         _parameters: &CalculationParameters,
//!         market_data: &ScenarioMarketData,
//!     ) -> anyhow::Result<MeasureResults> {
//!         let value: Arc<dyn ScenarioValue> =
//!             Arc::new(ScenarioArray::of(vec![0.05; market_data.scenario_count()]));
//!         Ok(MeasureResults::from([(Measure::PAR_RATE, Ok(value))]))
//!     }
//! }
//!
//! let group = FunctionGroup::builder::<Loan>("loan").add_function_all(Arc::new(LoanRate)).build();
//! let rules = CalculationRules::of(PricingRules::of([PricingRule::of(Arc::new(group))]));
//! let targets: Vec<Arc<dyn CalculationTarget>> = vec![Arc::new(Loan)];
//! let columns = [Column::of(Measure::PAR_RATE)];
//! let market_data = ScenarioMarketData::builder(1, Date::from_ymd(2024, 6, 14).unwrap())
//!     .build()
//!     .unwrap();
//!
//! let results = CalculationRunner::single_threaded()
//!     .calculate(&rules, &targets, &columns, &market_data)
//!     .unwrap();
//! assert_eq!(results.value::<ScenarioArray<f64>>(0, 0).unwrap().values(), &[0.05]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod error;
pub mod function;
pub mod measure;
pub mod parameters;
pub mod requirements;
pub mod result;
pub mod rules;
pub mod runner;
pub mod scenario;
pub mod target;
pub mod task;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{CalculationConfig, ConfigError, Validate};
    pub use crate::error::{CalcError, CalcResult};
    pub use crate::function::{
        partition_measures, unsupported_measure, CalculationFunction, MeasureResults,
    };
    pub use crate::measure::Measure;
    pub use crate::parameters::{CalculationParameter, CalculationParameters, FunctionArguments};
    pub use crate::requirements::{FunctionRequirements, MarketDataRequirements};
    pub use crate::result::{
        CalculationResult, CalculationResults, CellResult, Failure, FailureReason, Results,
    };
    pub use crate::rules::{
        CalculationRules, Column, ConfiguredFunction, FunctionGroup, PricingRule, PricingRules,
        ReportingCurrency,
    };
    pub use crate::runner::{CalculationListener, CalculationRunner, Executor, ResultsListener};
    pub use crate::scenario::{
        ConvertibleScenarioArray, CurrencyScenarioArray, MultiCurrencyScenarioArray, ScenarioArray,
        ScenarioValue,
    };
    pub use crate::target::{downcast_target, CalculationTarget, TargetType};
    pub use crate::task::{CalculationTask, CalculationTaskCell, CalculationTasks};
}

pub use error::{CalcError, CalcResult};
