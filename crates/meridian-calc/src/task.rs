//! Calculation tasks: one target, one function, the cells it fills.

use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};

use meridian_core::{Currency, CurrencyPair};
use meridian_market::fx::ScenarioMarketDataFxRateProvider;
use meridian_market::{FxRateId, ScenarioFxRateProvider, ScenarioMarketData};

use crate::function::MeasureResults;
use crate::measure::Measure;
use crate::parameters::{CalculationParameters, FunctionArguments};
use crate::requirements::{FunctionRequirements, MarketDataRequirements};
use crate::result::{CalculationResult, CalculationResults, CellResult, Failure, FailureReason};
use crate::rules::{CalculationRules, Column, ConfiguredFunction, ReportingCurrency};
use crate::target::CalculationTarget;

/// A cell of the results grid filled by a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationTaskCell {
    row: usize,
    column: usize,
    measure: Measure,
    reporting_currency: ReportingCurrency,
}

impl CalculationTaskCell {
    /// Creates a cell.
    #[must_use]
    pub fn of(
        row: usize,
        column: usize,
        measure: Measure,
        reporting_currency: ReportingCurrency,
    ) -> Self {
        Self {
            row,
            column,
            measure,
            reporting_currency,
        }
    }

    /// Returns the row.
    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Returns the column.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns the measure.
    #[must_use]
    pub fn measure(&self) -> &Measure {
        &self.measure
    }

    /// Returns how the cell is reported.
    #[must_use]
    pub fn reporting_currency(&self) -> ReportingCurrency {
        self.reporting_currency
    }
}

/// Calculates every cell of one target that shares a function.
///
/// The function is invoked once for all the measures of the task. Its
/// results are checked, converted into the reporting currency and
/// distributed to the cells.
#[derive(Debug, Clone)]
pub struct CalculationTask {
    target_row: usize,
    target: Arc<dyn CalculationTarget>,
    function: ConfiguredFunction,
    parameters: CalculationParameters,
    cells: Vec<CalculationTaskCell>,
}

impl CalculationTask {
    /// Creates a task.
    ///
    /// The parameters passed to the function are `parameters` plus the
    /// arguments of the function's group; arguments already present in
    /// `parameters` take precedence.
    #[must_use]
    pub fn of(
        target_row: usize,
        target: Arc<dyn CalculationTarget>,
        function: ConfiguredFunction,
        parameters: &CalculationParameters,
        cells: Vec<CalculationTaskCell>,
    ) -> Self {
        let arguments = match parameters.find::<FunctionArguments>() {
            Some(overrides) => overrides
                .arguments()
                .iter()
                .fold(function.arguments().clone(), |args, (k, v)| {
                    args.with(k.as_str(), v.as_str())
                }),
            None => function.arguments().clone(),
        };
        Self {
            target_row,
            target,
            parameters: parameters.with(arguments),
            function,
            cells,
        }
    }

    /// Returns the row of the target.
    #[must_use]
    pub fn target_row(&self) -> usize {
        self.target_row
    }

    /// Returns the target.
    #[must_use]
    pub fn target(&self) -> &Arc<dyn CalculationTarget> {
        &self.target
    }

    /// Returns the function.
    #[must_use]
    pub fn function(&self) -> &ConfiguredFunction {
        &self.function
    }

    /// Returns the parameters passed to the function.
    #[must_use]
    pub fn parameters(&self) -> &CalculationParameters {
        &self.parameters
    }

    /// Returns the cells.
    #[must_use]
    pub fn cells(&self) -> &[CalculationTaskCell] {
        &self.cells
    }

    /// Returns the distinct measures of the cells.
    #[must_use]
    pub fn measures(&self) -> BTreeSet<Measure> {
        self.cells.iter().map(|cell| cell.measure.clone()).collect()
    }

    fn natural_currency(&self) -> Option<Currency> {
        self.function.function().natural_currency(&*self.target)
    }

    /// Returns the market data needed by the task.
    ///
    /// Adds to the function's requirements the FX rate converting each
    /// output currency into the reporting currency of each cell.
    ///
    /// # Errors
    ///
    /// Returns the function's error if it cannot state its requirements.
    pub fn requirements(&self) -> anyhow::Result<FunctionRequirements> {
        let function_requirements = self.function.function().requirements(
            &*self.target,
            &self.measures(),
            &self.parameters,
        )?;
        let natural = self.natural_currency();
        let reporting: BTreeSet<Currency> = self
            .cells
            .iter()
            .filter_map(|cell| cell.reporting_currency.resolve(natural))
            .collect();
        let mut builder = FunctionRequirements::builder();
        for &output in function_requirements.output_currencies() {
            for &report in &reporting {
                if output != report {
                    builder = builder.value(&FxRateId::new(CurrencyPair::new(output, report)));
                }
            }
        }
        Ok(function_requirements.combined_with(&builder.build()))
    }

    /// Executes the task against market data.
    ///
    /// Never fails: errors and panics of the function become failures of
    /// every cell.
    #[must_use]
    pub fn execute(&self, market_data: &ScenarioMarketData) -> CalculationResults {
        let measures = self.measures();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.function
                .function()
                .calculate(&*self.target, &measures, &self.parameters, market_data)
        }));
        let results = match outcome {
            Ok(Ok(results)) => results,
            Ok(Err(err)) => {
                return self.fail_all(&Failure::of(
                    FailureReason::Error,
                    format!(
                        "Error invoking function '{}' for target {}: {err:#}",
                        self.function.group_name(),
                        self.target.as_ref().target_type()
                    ),
                ));
            }
            Err(payload) => {
                return self.fail_all(&Failure::of(
                    FailureReason::Error,
                    format!(
                        "Function '{}' panicked for target {}: {}",
                        self.function.group_name(),
                        self.target.as_ref().target_type(),
                        panic_message(payload.as_ref())
                    ),
                ));
            }
        };
        let fx_rates = ScenarioMarketDataFxRateProvider::new(market_data);
        let natural = self.natural_currency();
        let scenario_count = market_data.scenario_count();
        let cells = self
            .cells
            .iter()
            .map(|cell| {
                let result = self.cell_result(cell, &results, scenario_count, natural, &fx_rates);
                CalculationResult::of(cell.row, cell.column, result)
            })
            .collect();
        CalculationResults::of(self.target_row, cells)
    }

    fn fail_all(&self, failure: &Failure) -> CalculationResults {
        warn!(target_row = self.target_row, %failure, "calculation function failed");
        let cells = self
            .cells
            .iter()
            .map(|cell| CalculationResult::of(cell.row, cell.column, Err(failure.clone())))
            .collect();
        CalculationResults::of(self.target_row, cells)
    }

    fn cell_result(
        &self,
        cell: &CalculationTaskCell,
        results: &MeasureResults,
        scenario_count: usize,
        natural: Option<Currency>,
        fx_rates: &dyn ScenarioFxRateProvider,
    ) -> CellResult {
        let value = match results.get(&cell.measure) {
            None => {
                return Err(Failure::of(
                    FailureReason::CalculationFailed,
                    format!(
                        "Function '{}' did not return a result for measure {}",
                        self.function.group_name(),
                        cell.measure
                    ),
                ));
            }
            Some(Err(failure)) => return Err(failure.clone()),
            Some(Ok(value)) => value,
        };
        if value.scenario_count() != scenario_count {
            let message = format!(
                "Measure {} returned {} scenario values but the market data has {scenario_count}",
                cell.measure,
                value.scenario_count()
            );
            return Err(Failure::of(FailureReason::CalculationFailed, message));
        }
        if !value.is_fx_convertible() {
            return Ok(value.clone());
        }
        let Some(currency) = cell.reporting_currency.resolve(natural) else {
            return Err(Failure::of(
                FailureReason::InvalidInput,
                format!(
                    "No reporting currency available for measure {} on target {}",
                    cell.measure,
                    self.target.as_ref().target_type()
                ),
            ));
        };
        value.converted_to(currency, fx_rates).map_err(|err| {
            debug!(measure = %cell.measure, %currency, "currency conversion failed");
            Failure::of(
                FailureReason::CurrencyConversion,
                format!("Failed to convert measure {} into {currency}: {err}", cell.measure),
            )
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// The tasks of a run, and the results of cells no function handles.
#[derive(Debug, Clone)]
pub struct CalculationTasks {
    column_headers: Vec<String>,
    row_count: usize,
    tasks: Vec<CalculationTask>,
    unconfigured: Vec<CalculationResult>,
}

impl CalculationTasks {
    /// Plans the tasks calculating `columns` for every target.
    ///
    /// Cells of one target that resolve to the same function share a task.
    /// Cells with no configured function fail with
    /// [`FailureReason::NotApplicable`].
    #[must_use]
    pub fn of(
        rules: &CalculationRules,
        targets: &[Arc<dyn CalculationTarget>],
        columns: &[Column],
    ) -> Self {
        let mut tasks = Vec::new();
        let mut unconfigured = Vec::new();
        for (row, target) in targets.iter().enumerate() {
            let mut grouped: Vec<(ConfiguredFunction, Vec<CalculationTaskCell>)> = Vec::new();
            for (column_index, column) in columns.iter().enumerate() {
                let measure = column.measure();
                let reporting = column
                    .reporting_currency()
                    .unwrap_or_else(|| rules.reporting_currency());
                let Some(function) = rules.pricing_rules().function_for(&**target, measure) else {
                    unconfigured.push(CalculationResult::of(
                        row,
                        column_index,
                        Err(Failure::of(
                            FailureReason::NotApplicable,
                            format!(
                                "No function configured for measure {measure} on target {}",
                                target.as_ref().target_type()
                            ),
                        )),
                    ));
                    continue;
                };
                let cell = CalculationTaskCell::of(row, column_index, measure.clone(), reporting);
                match grouped.iter_mut().find(|(f, _)| f.same_function(&function)) {
                    Some((_, cells)) => cells.push(cell),
                    None => grouped.push((function, vec![cell])),
                }
            }
            tasks.extend(grouped.into_iter().map(|(function, cells)| {
                CalculationTask::of(row, target.clone(), function, rules.parameters(), cells)
            }));
        }
        Self {
            column_headers: columns.iter().map(|c| c.header().to_string()).collect(),
            row_count: targets.len(),
            tasks,
            unconfigured,
        }
    }

    /// Returns the column headers.
    #[must_use]
    pub fn column_headers(&self) -> &[String] {
        &self.column_headers
    }

    /// Returns the number of targets.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the tasks.
    #[must_use]
    pub fn tasks(&self) -> &[CalculationTask] {
        &self.tasks
    }

    /// Returns the failures of cells no function handles.
    #[must_use]
    pub fn unconfigured(&self) -> &[CalculationResult] {
        &self.unconfigured
    }

    /// Returns the market data needed by every task.
    ///
    /// Tasks unable to state their requirements are logged and skipped;
    /// they fail again when executed.
    #[must_use]
    pub fn requirements(&self) -> MarketDataRequirements {
        let requirements: Vec<FunctionRequirements> = self
            .tasks
            .iter()
            .filter_map(|task| match task.requirements() {
                Ok(req) => Some(req),
                Err(err) => {
                    warn!(
                        target_row = task.target_row,
                        error = %err,
                        "failed to collect requirements"
                    );
                    None
                }
            })
            .collect();
        MarketDataRequirements::of(&requirements)
    }
}
