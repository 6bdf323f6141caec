//! Runs calculations over targets and columns, single-threaded or on a
//! rayon pool.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use meridian_market::ScenarioMarketData;

use crate::error::{CalcError, CalcResult};
use crate::result::{
    CalculationResult, CalculationResults, CellResult, Failure, FailureReason, Results,
};
use crate::rules::{CalculationRules, Column};
use crate::target::CalculationTarget;
use crate::task::CalculationTasks;

/// How tasks are executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Executor {
    /// Every task on the calling thread, in order.
    #[default]
    SingleThreaded,
    /// Tasks spread over a dedicated pool; zero threads means one per CPU.
    Parallel {
        /// Number of worker threads.
        threads: usize,
    },
}

/// Receives results as tasks complete.
///
/// Results of a parallel run arrive in no particular order and possibly
/// from several threads at once.
pub trait CalculationListener: Send + Sync {
    /// Called with the results of one task, or with the failures of cells
    /// no function handles.
    fn result_received(&self, results: CalculationResults);

    /// Called once after every result has been delivered.
    fn calculation_finished(&self) {}
}

/// A listener assembling the results grid.
#[derive(Debug)]
pub struct ResultsListener {
    column_headers: Vec<String>,
    row_count: usize,
    cells: Mutex<Vec<Option<CellResult>>>,
}

impl ResultsListener {
    /// Creates a listener for a grid of the given shape.
    #[must_use]
    pub fn new(column_headers: Vec<String>, row_count: usize) -> Self {
        let size = row_count * column_headers.len();
        Self {
            column_headers,
            row_count,
            cells: Mutex::new(vec![None; size]),
        }
    }

    /// Returns the grid; cells that received nothing fail.
    pub fn into_results(self) -> CalcResult<Results> {
        let cells = self
            .cells
            .into_inner()
            .into_iter()
            .map(|cell| {
                cell.unwrap_or_else(|| {
                    Err(Failure::of(
                        FailureReason::CalculationFailed,
                        "No result was received for the cell",
                    ))
                })
            })
            .collect();
        Results::of(self.column_headers, self.row_count, cells)
    }
}

impl CalculationListener for ResultsListener {
    fn result_received(&self, results: CalculationResults) {
        let columns = self.column_headers.len();
        let mut cells = self.cells.lock();
        for cell in results.into_cells() {
            let index = cell.row() * columns + cell.column();
            if let Some(slot) = cells.get_mut(index) {
                *slot = Some(cell.into_result());
            }
        }
    }
}

/// Runs calculations.
///
/// A runner owns its thread pool; create one and reuse it across runs.
#[derive(Debug, Clone)]
pub struct CalculationRunner {
    executor: Executor,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl Default for CalculationRunner {
    fn default() -> Self {
        Self::single_threaded()
    }
}

impl CalculationRunner {
    /// Creates a runner executing tasks on the calling thread.
    #[must_use]
    pub fn single_threaded() -> Self {
        Self {
            executor: Executor::SingleThreaded,
            pool: None,
        }
    }

    /// Creates a runner for an executor.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread pool cannot be built.
    pub fn of(executor: Executor) -> CalcResult<Self> {
        let pool = match executor {
            Executor::SingleThreaded => None,
            Executor::Parallel { threads } => Some(Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("meridian-calc-{i}"))
                    .build()
                    .map_err(|e| CalcError::executor(e.to_string()))?,
            )),
        };
        Ok(Self { executor, pool })
    }

    /// Returns the executor.
    #[must_use]
    pub fn executor(&self) -> Executor {
        self.executor
    }

    /// Calculates every column for every target.
    ///
    /// Cell failures are reported in the grid and never fail the run.
    pub fn calculate(
        &self,
        rules: &CalculationRules,
        targets: &[Arc<dyn CalculationTarget>],
        columns: &[Column],
        market_data: &ScenarioMarketData,
    ) -> CalcResult<Results> {
        let listener = ResultsListener::new(
            columns.iter().map(|c| c.header().to_string()).collect(),
            targets.len(),
        );
        self.calculate_with_listener(rules, targets, columns, market_data, &listener);
        listener.into_results()
    }

    /// Calculates every column for every target, streaming results to a
    /// listener.
    pub fn calculate_with_listener(
        &self,
        rules: &CalculationRules,
        targets: &[Arc<dyn CalculationTarget>],
        columns: &[Column],
        market_data: &ScenarioMarketData,
        listener: &dyn CalculationListener,
    ) {
        let tasks = CalculationTasks::of(rules, targets, columns);
        info!(
            targets = targets.len(),
            columns = columns.len(),
            tasks = tasks.tasks().len(),
            scenarios = market_data.scenario_count(),
            executor = ?self.executor,
            "starting calculation run"
        );

        let missing = tasks.requirements().missing_from(market_data);
        if !missing.is_empty() {
            warn!(
                values = ?missing.values(),
                time_series = ?missing.time_series(),
                "market data is missing for some calculations"
            );
        }

        let mut unconfigured: BTreeMap<usize, Vec<CalculationResult>> = BTreeMap::new();
        for result in tasks.unconfigured() {
            unconfigured.entry(result.row()).or_default().push(result.clone());
        }
        if !unconfigured.is_empty() {
            debug!(rows = unconfigured.len(), "cells without a configured function");
        }
        for (row, cells) in unconfigured {
            listener.result_received(CalculationResults::of(row, cells));
        }

        match &self.pool {
            Some(pool) => pool.install(|| {
                tasks
                    .tasks()
                    .par_iter()
                    .for_each(|task| listener.result_received(task.execute(market_data)));
            }),
            None => {
                for task in tasks.tasks() {
                    listener.result_received(task.execute(market_data));
                }
            }
        }

        listener.calculation_finished();
        info!(tasks = tasks.tasks().len(), "calculation run finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_listener_fills_grid() {
        let listener = ResultsListener::new(vec!["A".into(), "B".into()], 1);
        listener.result_received(CalculationResults::of(
            0,
            vec![CalculationResult::of(
                0,
                1,
                Err(Failure::of(FailureReason::NotApplicable, "n/a")),
            )],
        ));
        let results = listener.into_results().unwrap();
        let a = results.get(0, 0).unwrap().as_ref().unwrap_err();
        assert_eq!(a.reason(), FailureReason::CalculationFailed);
        let b = results.get(0, 1).unwrap().as_ref().unwrap_err();
        assert_eq!(b.reason(), FailureReason::NotApplicable);
    }

    #[test]
    fn test_parallel_runner_builds_pool() {
        let runner = CalculationRunner::of(Executor::Parallel { threads: 2 }).unwrap();
        assert_eq!(runner.executor(), Executor::Parallel { threads: 2 });
        assert_eq!(CalculationRunner::default().executor(), Executor::SingleThreaded);
    }
}
