//! Dispatch rules: which function calculates which measure for which
//! target, and how results are reported.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use meridian_core::Currency;

use crate::function::CalculationFunction;
use crate::measure::Measure;
use crate::parameters::{CalculationParameters, FunctionArguments};
use crate::target::{CalculationTarget, TargetType};

/// A named set of functions for one target type, keyed by measure, with
/// default arguments passed to those functions.
#[derive(Debug, Clone)]
pub struct FunctionGroup {
    name: String,
    target_type: TargetType,
    functions: BTreeMap<Measure, Arc<dyn CalculationFunction>>,
    arguments: FunctionArguments,
}

impl FunctionGroup {
    /// Creates a builder for a group handling targets of type `T`.
    #[must_use]
    pub fn builder<T: Any>(name: impl Into<String>) -> FunctionGroupBuilder {
        FunctionGroupBuilder {
            group: Self {
                name: name.into(),
                target_type: TargetType::of::<T>(),
                functions: BTreeMap::new(),
                arguments: FunctionArguments::empty(),
            },
        }
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the target type.
    #[must_use]
    pub fn target_type(&self) -> TargetType {
        self.target_type
    }

    /// Returns the default arguments.
    #[must_use]
    pub fn arguments(&self) -> &FunctionArguments {
        &self.arguments
    }

    /// Returns the measures the group can calculate.
    #[must_use]
    pub fn configured_measures(&self) -> BTreeSet<Measure> {
        self.functions.keys().cloned().collect()
    }

    /// Returns the function for a measure.
    #[must_use]
    pub fn function(&self, measure: &Measure) -> Option<&Arc<dyn CalculationFunction>> {
        self.functions.get(measure)
    }
}

/// Builder for [`FunctionGroup`].
#[derive(Debug, Clone)]
pub struct FunctionGroupBuilder {
    group: FunctionGroup,
}

impl FunctionGroupBuilder {
    /// Registers a function for one measure.
    pub fn add_function(
        mut self,
        measure: Measure,
        function: Arc<dyn CalculationFunction>,
    ) -> Self {
        self.group.functions.insert(measure, function);
        self
    }

    /// Registers a function for every measure it supports.
    pub fn add_function_all(mut self, function: Arc<dyn CalculationFunction>) -> Self {
        for measure in function.supported_measures() {
            self.group.functions.insert(measure, function.clone());
        }
        self
    }

    /// Sets a default argument.
    pub fn argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.group.arguments = self.group.arguments.with(key, value);
        self
    }

    /// Builds the group.
    pub fn build(self) -> FunctionGroup {
        self.group
    }
}

/// Routes a target type to a function group, optionally for a subset of
/// measures.
#[derive(Debug, Clone)]
pub struct PricingRule {
    target_type: TargetType,
    measures: BTreeSet<Measure>,
    group: Arc<FunctionGroup>,
}

impl PricingRule {
    /// Creates a rule covering every measure of the group.
    #[must_use]
    pub fn of(group: Arc<FunctionGroup>) -> Self {
        Self {
            target_type: FunctionGroup::target_type(&group),
            measures: BTreeSet::new(),
            group,
        }
    }

    /// Creates a rule covering only the listed measures.
    #[must_use]
    pub fn for_measures(
        group: Arc<FunctionGroup>,
        measures: impl IntoIterator<Item = Measure>,
    ) -> Self {
        Self {
            target_type: FunctionGroup::target_type(&group),
            measures: measures.into_iter().collect(),
            group,
        }
    }

    /// Returns the target type matched.
    #[must_use]
    pub fn target_type(&self) -> TargetType {
        self.target_type
    }

    /// Returns the explicit measures; empty means every measure of the group.
    #[must_use]
    pub fn measures(&self) -> &BTreeSet<Measure> {
        &self.measures
    }

    /// Returns the group.
    #[must_use]
    pub fn group(&self) -> &Arc<FunctionGroup> {
        &self.group
    }

    fn claims(&self, measure: &Measure) -> bool {
        if self.measures.is_empty() {
            self.group.function(measure).is_some()
        } else {
            self.measures.contains(measure)
        }
    }

    fn configured_measures(&self) -> BTreeSet<Measure> {
        let group_measures = self.group.configured_measures();
        if self.measures.is_empty() {
            group_measures
        } else {
            group_measures.intersection(&self.measures).cloned().collect()
        }
    }
}

/// A function selected for a target and measure, with the arguments of the
/// group it came from.
#[derive(Debug, Clone)]
pub struct ConfiguredFunction {
    function: Arc<dyn CalculationFunction>,
    group_name: String,
    arguments: FunctionArguments,
}

impl ConfiguredFunction {
    /// Returns the function.
    #[must_use]
    pub fn function(&self) -> &Arc<dyn CalculationFunction> {
        &self.function
    }

    /// Returns the name of the group the function came from.
    #[must_use]
    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    /// Returns the group's default arguments.
    #[must_use]
    pub fn arguments(&self) -> &FunctionArguments {
        &self.arguments
    }

    /// Checks if two configurations share the same function instance.
    #[must_use]
    pub fn same_function(&self, other: &ConfiguredFunction) -> bool {
        Arc::ptr_eq(&self.function, &other.function) && self.group_name == other.group_name
    }
}

/// Ordered pricing rules; the first rule claiming a measure wins.
#[derive(Debug, Clone, Default)]
pub struct PricingRules {
    rules: Vec<PricingRule>,
}

impl PricingRules {
    /// Creates an empty set of rules.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates rules in priority order.
    #[must_use]
    pub fn of(rules: impl IntoIterator<Item = PricingRule>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// Returns a copy with a rule appended at the lowest priority.
    #[must_use]
    pub fn with_rule(&self, rule: PricingRule) -> Self {
        let mut rules = self.rules.clone();
        rules.push(rule);
        Self { rules }
    }

    /// Returns the rules in priority order.
    #[must_use]
    pub fn rules(&self) -> &[PricingRule] {
        &self.rules
    }

    /// Returns the function calculating `measure` for `target`.
    ///
    /// The first rule matching the target type and claiming the measure
    /// decides; if its group has no function for the measure the result is
    /// `None`.
    #[must_use]
    pub fn function_for(
        &self,
        target: &dyn CalculationTarget,
        measure: &Measure,
    ) -> Option<ConfiguredFunction> {
        let target_type = target.target_type();
        let rule = self
            .rules
            .iter()
            .find(|rule| rule.target_type == target_type && rule.claims(measure))?;
        rule.group.function(measure).map(|function| ConfiguredFunction {
            function: function.clone(),
            group_name: rule.group.name().to_string(),
            arguments: rule.group.arguments().clone(),
        })
    }

    /// Returns every measure configured for the type of `target`; empty if
    /// no rule matches.
    #[must_use]
    pub fn configured_measures(&self, target: &dyn CalculationTarget) -> BTreeSet<Measure> {
        let target_type = target.target_type();
        self.rules
            .iter()
            .filter(|rule| rule.target_type == target_type)
            .flat_map(PricingRule::configured_measures)
            .collect()
    }
}

/// Which currency results are reported in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportingCurrency {
    /// The natural currency of the target, as chosen by its function.
    #[default]
    Natural,
    /// A specific currency.
    Specific(Currency),
    /// No conversion; convertible results fail to report.
    None,
}

impl ReportingCurrency {
    /// Resolves the currency given the function's natural currency.
    #[must_use]
    pub fn resolve(self, natural: Option<Currency>) -> Option<Currency> {
        match self {
            ReportingCurrency::Specific(currency) => Some(currency),
            ReportingCurrency::Natural => natural,
            ReportingCurrency::None => None,
        }
    }
}

impl fmt::Display for ReportingCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportingCurrency::Natural => write!(f, "Natural"),
            ReportingCurrency::Specific(currency) => write!(f, "{currency}"),
            ReportingCurrency::None => write!(f, "None"),
        }
    }
}

/// A column of the results grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    header: String,
    measure: Measure,
    reporting_currency: Option<ReportingCurrency>,
}

impl Column {
    /// Creates a column headed by the measure name.
    #[must_use]
    pub fn of(measure: Measure) -> Self {
        Self {
            header: measure.name().to_string(),
            measure,
            reporting_currency: None,
        }
    }

    /// Returns a copy with a different header.
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Returns a copy reporting in a specific way, overriding the rules.
    #[must_use]
    pub fn with_reporting_currency(mut self, reporting_currency: ReportingCurrency) -> Self {
        self.reporting_currency = Some(reporting_currency);
        self
    }

    /// Returns the header.
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Returns the measure.
    #[must_use]
    pub fn measure(&self) -> &Measure {
        &self.measure
    }

    /// Returns the reporting currency override.
    #[must_use]
    pub fn reporting_currency(&self) -> Option<ReportingCurrency> {
        self.reporting_currency
    }
}

/// Everything that shapes a run besides targets, columns and market data.
#[derive(Debug, Clone, Default)]
pub struct CalculationRules {
    pricing_rules: PricingRules,
    reporting_currency: ReportingCurrency,
    parameters: CalculationParameters,
}

impl CalculationRules {
    /// Creates rules reporting in each target's natural currency.
    #[must_use]
    pub fn of(pricing_rules: PricingRules) -> Self {
        Self {
            pricing_rules,
            reporting_currency: ReportingCurrency::Natural,
            parameters: CalculationParameters::empty(),
        }
    }

    /// Returns a copy with a different reporting currency.
    #[must_use]
    pub fn with_reporting_currency(mut self, reporting_currency: ReportingCurrency) -> Self {
        self.reporting_currency = reporting_currency;
        self
    }

    /// Returns a copy with different parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: CalculationParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Returns the pricing rules.
    #[must_use]
    pub fn pricing_rules(&self) -> &PricingRules {
        &self.pricing_rules
    }

    /// Returns the default reporting currency.
    #[must_use]
    pub fn reporting_currency(&self) -> ReportingCurrency {
        self.reporting_currency
    }

    /// Returns the parameters passed to every function.
    #[must_use]
    pub fn parameters(&self) -> &CalculationParameters {
        &self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::MeasureResults;
    use crate::requirements::FunctionRequirements;
    use meridian_market::ScenarioMarketData;

    #[derive(Debug)]
    struct Fra;

    #[derive(Debug)]
    struct Swap;

    #[derive(Debug)]
    struct Stub(&'static [Measure]);

    impl CalculationFunction for Stub {
        fn target_type(&self) -> TargetType {
            TargetType::of::<Fra>()
        }

        fn supported_measures(&self) -> BTreeSet<Measure> {
            self.0.iter().cloned().collect()
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
            Ok(MeasureResults::new())
        }
    }

    const PV_ONLY: &[Measure] = &[Measure::PRESENT_VALUE];
    const PV_AND_PAR: &[Measure] = &[Measure::PRESENT_VALUE, Measure::PAR_RATE];

    fn group(name: &str, measures: &'static [Measure]) -> Arc<FunctionGroup> {
        Arc::new(
            FunctionGroup::builder::<Fra>(name)
                .add_function_all(Arc::new(Stub(measures)))
                .argument("pv01.shift", "0.0001")
                .build(),
        )
    }

    #[test]
    fn test_no_matching_rule() {
        let rules = PricingRules::of([PricingRule::of(group("fra", PV_AND_PAR))]);
        assert!(rules.configured_measures(&Swap).is_empty());
        assert!(rules.function_for(&Swap, &Measure::PRESENT_VALUE).is_none());
    }

    #[test]
    fn test_first_rule_wins() {
        let rules = PricingRules::of([
            PricingRule::for_measures(group("first", PV_AND_PAR), [Measure::PAR_RATE]),
            PricingRule::of(group("second", PV_AND_PAR)),
        ]);
        let par = rules.function_for(&Fra, &Measure::PAR_RATE).unwrap();
        assert_eq!(par.group_name(), "first");
        assert_eq!(par.arguments().get("pv01.shift"), Some("0.0001"));
        let pv = rules.function_for(&Fra, &Measure::PRESENT_VALUE).unwrap();
        assert_eq!(pv.group_name(), "second");
        assert_eq!(rules.configured_measures(&Fra).len(), 2);
    }

    #[test]
    fn test_claiming_rule_without_function_yields_none() {
        let rules = PricingRules::of([
            PricingRule::for_measures(group("narrow", PV_ONLY), [Measure::PAR_RATE]),
            PricingRule::of(group("wide", PV_AND_PAR)),
        ]);
        assert!(rules.function_for(&Fra, &Measure::PAR_RATE).is_none());
    }

    #[test]
    fn test_empty_rule_skips_unsupported_measure() {
        let rules = PricingRules::of([
            PricingRule::of(group("narrow", PV_ONLY)),
            PricingRule::of(group("wide", PV_AND_PAR)),
        ]);
        assert_eq!(rules.function_for(&Fra, &Measure::PAR_RATE).unwrap().group_name(), "wide");
        assert!(rules.function_for(&Fra, &Measure::CURRENT_CASH).is_none());
    }

    #[test]
    fn test_reporting_currency_precedence() {
        assert_eq!(
            ReportingCurrency::Specific(Currency::EUR).resolve(Some(Currency::USD)),
            Some(Currency::EUR)
        );
        assert_eq!(ReportingCurrency::Natural.resolve(Some(Currency::USD)), Some(Currency::USD));
        assert_eq!(ReportingCurrency::Natural.resolve(None), None);
        assert_eq!(ReportingCurrency::None.resolve(Some(Currency::USD)), None);
    }
}
