//! Run configuration loaded from TOML.
//!
//! ```toml
//! reporting_currency = "USD"
//!
//! [executor]
//! threads = 4
//!
//! [[columns]]
//! measure = "PresentValue"
//!
//! [[columns]]
//! header = "Par"
//! measure = "ParRate"
//! reporting_currency = "none"
//!
//! [arguments]
//! "pv01.shift" = "0.0001"
//! ```

mod error;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use meridian_core::Currency;

pub use error::{ConfigError, ConfigResult, Validate, ValidationError};

use crate::error::CalcResult;
use crate::measure::Measure;
use crate::parameters::FunctionArguments;
use crate::rules::{CalculationRules, Column, PricingRules, ReportingCurrency};
use crate::runner::{CalculationRunner, Executor};

const MAX_THREADS: usize = 1024;

/// Executor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Worker threads: 1 runs on the calling thread, 0 uses one per CPU.
    pub threads: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { threads: 1 }
    }
}

/// One column of the results grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Header; defaults to the measure name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,

    /// Measure name, such as `PresentValue`.
    pub measure: String,

    /// Reporting currency override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_currency: Option<String>,
}

/// Configuration of a calculation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationConfig {
    /// `natural`, `none` or an ISO currency code.
    pub reporting_currency: String,

    /// Executor settings.
    pub executor: ExecutorConfig,

    /// Columns in display order.
    pub columns: Vec<ColumnConfig>,

    /// Arguments passed to every calculation function.
    pub arguments: BTreeMap<String, String>,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            reporting_currency: "natural".to_string(),
            executor: ExecutorConfig::default(),
            columns: Vec::new(),
            arguments: BTreeMap::new(),
        }
    }
}

/// Parses `natural`, `none` or an ISO currency code, ignoring case and
/// surrounding whitespace.
fn parse_reporting_currency(
    field: &str,
    value: &str,
) -> Result<ReportingCurrency, ValidationError> {
    let normalized = value.trim().to_ascii_uppercase();
    match normalized.as_str() {
        "NATURAL" => Ok(ReportingCurrency::Natural),
        "NONE" => Ok(ReportingCurrency::None),
        code => code
            .parse::<Currency>()
            .map(ReportingCurrency::Specific)
            .map_err(|e| ValidationError::with_rule(field, e.to_string(), "reporting_currency")),
    }
}

impl CalculationConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate_or_error()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "loading calculation config");
        Self::from_toml_str(&content)
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Adds a column.
    pub fn with_column(mut self, measure: &Measure) -> Self {
        self.columns.push(ColumnConfig {
            header: None,
            measure: measure.name().to_string(),
            reporting_currency: None,
        });
        self
    }

    /// Adds a function argument.
    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Returns the default reporting currency.
    pub fn reporting_currency(&self) -> ConfigResult<ReportingCurrency> {
        parse_reporting_currency("reporting_currency", &self.reporting_currency).map_err(|e| {
            ConfigError::Validation {
                field: e.field,
                message: e.message,
            }
        })
    }

    /// Returns the columns.
    pub fn columns(&self) -> ConfigResult<Vec<Column>> {
        self.validate_or_error()?;
        self.columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let invalid = |e: String| ConfigError::Validation {
                    field: format!("columns[{i}]"),
                    message: e,
                };
                let measure: Measure = c.measure.parse().map_err(invalid)?;
                let mut column = Column::of(measure);
                if let Some(header) = &c.header {
                    column = column.with_header(header.clone());
                }
                if let Some(reporting) = &c.reporting_currency {
                    let reporting = parse_reporting_currency("reporting_currency", reporting)
                        .map_err(|e| invalid(e.message))?;
                    column = column.with_reporting_currency(reporting);
                }
                Ok(column)
            })
            .collect()
    }

    /// Returns the executor.
    #[must_use]
    pub fn executor(&self) -> Executor {
        match self.executor.threads {
            1 => Executor::SingleThreaded,
            threads => Executor::Parallel { threads },
        }
    }

    /// Creates a runner for the configured executor.
    pub fn runner(&self) -> CalcResult<CalculationRunner> {
        CalculationRunner::of(self.executor())
    }

    /// Returns the configured function arguments.
    #[must_use]
    pub fn function_arguments(&self) -> FunctionArguments {
        FunctionArguments::of(self.arguments.clone())
    }

    /// Combines pricing rules with the configured reporting currency and
    /// arguments.
    pub fn rules(&self, pricing_rules: PricingRules) -> ConfigResult<CalculationRules> {
        let rules =
            CalculationRules::of(pricing_rules).with_reporting_currency(self.reporting_currency()?);
        if self.arguments.is_empty() {
            return Ok(rules);
        }
        let parameters = rules.parameters().with(self.function_arguments());
        Ok(rules.with_parameters(parameters))
    }
}

impl Validate for CalculationConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if let Err(e) = parse_reporting_currency("reporting_currency", &self.reporting_currency) {
            errors.push(e);
        }

        if self.executor.threads > MAX_THREADS {
            errors.push(ValidationError::with_rule(
                "executor.threads",
                format!("Thread count {} exceeds maximum of {MAX_THREADS}", self.executor.threads),
                "max_threads",
            ));
        }

        if self.columns.is_empty() {
            errors.push(ValidationError::new("columns", "At least one column is required"));
        }

        let mut headers = BTreeSet::new();
        for (i, column) in self.columns.iter().enumerate() {
            let field = format!("columns[{i}]");
            if let Err(e) = column.measure.parse::<Measure>() {
                errors.push(ValidationError::new(field.clone(), e));
            }
            if let Some(reporting) = &column.reporting_currency {
                if let Err(e) = parse_reporting_currency(&field, reporting) {
                    errors.push(e);
                }
            }
            let header = column.header.as_deref().unwrap_or(&column.measure);
            if !headers.insert(header.to_string()) {
                errors.push(ValidationError::with_rule(
                    field,
                    format!("Duplicate column header '{header}'"),
                    "unique_headers",
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
reporting_currency = "USD"

[executor]
threads = 4

[[columns]]
measure = "PresentValue"

[[columns]]
header = "Par"
measure = "ParRate"
reporting_currency = "none"

[arguments]
"pv01.shift" = "0.0001"
"#;

    #[test]
    fn test_parse_sample() {
        let config = CalculationConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(
            config.reporting_currency().unwrap(),
            ReportingCurrency::Specific(Currency::USD)
        );
        assert_eq!(config.executor(), Executor::Parallel { threads: 4 });
        let columns = config.columns().unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].header(), "PresentValue");
        assert_eq!(columns[1].header(), "Par");
        assert_eq!(columns[1].measure(), &Measure::PAR_RATE);
        assert_eq!(columns[1].reporting_currency(), Some(ReportingCurrency::None));
        assert_eq!(config.function_arguments().get("pv01.shift"), Some("0.0001"));
    }

    #[test]
    fn test_defaults() {
        let config = CalculationConfig::default().with_column(&Measure::PRESENT_VALUE);
        assert!(config.is_valid());
        assert_eq!(config.reporting_currency().unwrap(), ReportingCurrency::Natural);
        assert_eq!(config.executor(), Executor::SingleThreaded);
        let rules = config.rules(PricingRules::empty()).unwrap();
        assert!(rules.parameters().is_empty());
    }

    #[test]
    fn test_arguments_become_parameters() {
        let config = CalculationConfig::default()
            .with_column(&Measure::PRESENT_VALUE)
            .with_argument("pv01.shift", "0.0002");
        let rules = config.rules(PricingRules::empty()).unwrap();
        let args = rules.parameters().find::<FunctionArguments>().unwrap();
        assert_eq!(args.get("pv01.shift"), Some("0.0002"));
    }

    #[test]
    fn test_reporting_currency_ignores_case_and_whitespace() {
        let parse = |value: &str| parse_reporting_currency("reporting_currency", value).unwrap();
        assert_eq!(parse("usd"), ReportingCurrency::Specific(Currency::USD));
        assert_eq!(parse(" Eur "), ReportingCurrency::Specific(Currency::EUR));
        assert_eq!(parse(" Natural "), ReportingCurrency::Natural);
        assert_eq!(parse("NONE"), ReportingCurrency::None);
        assert!(parse_reporting_currency("reporting_currency", "nat").is_err());

        let config = CalculationConfig {
            reporting_currency: "gbp".into(),
            ..CalculationConfig::default()
        };
        assert_eq!(
            config.reporting_currency().unwrap(),
            ReportingCurrency::Specific(Currency::GBP)
        );
    }

    #[test]
    fn test_invalid_currency() {
        let toml = "reporting_currency = \"XXX\"\n[[columns]]\nmeasure = \"PresentValue\"\n";
        let err = CalculationConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation { ref field, .. } if field == "reporting_currency"
        ));
    }

    #[test]
    fn test_multiple_errors() {
        let config = CalculationConfig {
            reporting_currency: "natural".into(),
            executor: ExecutorConfig { threads: 5000 },
            columns: vec![
                ColumnConfig {
                    header: None,
                    measure: "PresentValue".into(),
                    reporting_currency: None,
                },
                ColumnConfig {
                    header: None,
                    measure: "PresentValue".into(),
                    reporting_currency: Some("ABC".into()),
                },
            ],
            arguments: BTreeMap::new(),
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 3);
        assert!(matches!(
            config.validate_or_error(),
            Err(ConfigError::MultipleValidationErrors(ref e)) if e.len() == 3
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let err = CalculationConfig::from_toml_str("columns = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Deserialization(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CalculationConfig::from_toml_str(SAMPLE).unwrap();
        let text = config.to_toml_string().unwrap();
        assert_eq!(CalculationConfig::from_toml_str(&text).unwrap(), config);
    }
}
