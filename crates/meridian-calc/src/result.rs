//! Calculation results and failures.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{CalcError, CalcResult};
use crate::scenario::ScenarioValue;

/// Why a cell could not be calculated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// The inputs were invalid, e.g. an unsupported measure.
    InvalidInput,
    /// The calculation function failed.
    Error,
    /// No function is configured for the target and measure.
    NotApplicable,
    /// Required market data was missing.
    MissingData,
    /// The result could not be converted into the reporting currency.
    CurrencyConversion,
    /// The operation is not supported.
    Unsupported,
    /// The function returned a malformed result.
    CalculationFailed,
    /// Any other reason.
    Other,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureReason::InvalidInput => "INVALID_INPUT",
            FailureReason::Error => "ERROR",
            FailureReason::NotApplicable => "NOT_APPLICABLE",
            FailureReason::MissingData => "MISSING_DATA",
            FailureReason::CurrencyConversion => "CURRENCY_CONVERSION",
            FailureReason::Unsupported => "UNSUPPORTED",
            FailureReason::CalculationFailed => "CALCULATION_FAILED",
            FailureReason::Other => "OTHER",
        };
        write!(f, "{name}")
    }
}

/// The failure of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{reason}: {message}")]
pub struct Failure {
    reason: FailureReason,
    message: String,
}

impl Failure {
    /// Creates a failure.
    #[must_use]
    pub fn of(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    /// Returns the reason.
    #[must_use]
    pub fn reason(&self) -> FailureReason {
        self.reason
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The value of a cell, or why there is none.
pub type CellResult = Result<Arc<dyn ScenarioValue>, Failure>;

/// The result of one cell of the grid.
#[derive(Debug, Clone)]
pub struct CalculationResult {
    row: usize,
    column: usize,
    result: CellResult,
}

impl CalculationResult {
    /// Creates a result.
    #[must_use]
    pub fn of(row: usize, column: usize, result: CellResult) -> Self {
        Self { row, column, result }
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

    /// Returns the value or failure.
    #[must_use]
    pub fn result(&self) -> &CellResult {
        &self.result
    }

    /// Consumes the result, returning the value or failure.
    #[must_use]
    pub fn into_result(self) -> CellResult {
        self.result
    }
}

/// The results of one task: every cell of one target computed by one
/// function.
#[derive(Debug, Clone)]
pub struct CalculationResults {
    target_row: usize,
    cells: Vec<CalculationResult>,
}

impl CalculationResults {
    /// Creates task results.
    #[must_use]
    pub fn of(target_row: usize, cells: Vec<CalculationResult>) -> Self {
        Self { target_row, cells }
    }

    /// Returns the row of the target.
    #[must_use]
    pub fn target_row(&self) -> usize {
        self.target_row
    }

    /// Returns the cell results.
    #[must_use]
    pub fn cells(&self) -> &[CalculationResult] {
        &self.cells
    }

    /// Consumes the results, returning the cells.
    #[must_use]
    pub fn into_cells(self) -> Vec<CalculationResult> {
        self.cells
    }
}

/// The grid of results of a run: one row per target, one column per
/// requested column.
#[derive(Debug, Clone)]
pub struct Results {
    column_headers: Vec<String>,
    row_count: usize,
    cells: Vec<CellResult>,
}

impl Results {
    /// Creates a grid; `cells` is row-major.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell count does not match the dimensions.
    pub fn of(
        column_headers: Vec<String>,
        row_count: usize,
        cells: Vec<CellResult>,
    ) -> CalcResult<Self> {
        if cells.len() != row_count * column_headers.len() {
            return Err(CalcError::invalid_argument(format!(
                "Expected {} cells for {row_count} rows and {} columns, got {}",
                row_count * column_headers.len(),
                column_headers.len(),
                cells.len()
            )));
        }
        Ok(Self {
            column_headers,
            row_count,
            cells,
        })
    }

    /// Returns the column headers.
    #[must_use]
    pub fn column_headers(&self) -> &[String] {
        &self.column_headers
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_headers.len()
    }

    /// Returns the cell at a row and column.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<&CellResult> {
        if row >= self.row_count || column >= self.column_count() {
            return None;
        }
        self.cells.get(row * self.column_count() + column)
    }

    /// Returns the index of the column with a header.
    #[must_use]
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.column_headers.iter().position(|h| h == header)
    }

    /// Returns the value of a cell as a concrete type.
    #[must_use]
    pub fn value<T: ScenarioValue>(&self, row: usize, column: usize) -> Option<&T> {
        self.get(row, column)?.as_ref().ok()?.downcast_ref::<T>()
    }

    /// Returns the failures with their coordinates.
    pub fn failures(&self) -> impl Iterator<Item = (usize, usize, &Failure)> + '_ {
        let columns = self.column_count().max(1);
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, cell)| cell.as_ref().err().map(|f| (i / columns, i % columns, f)))
    }
}
