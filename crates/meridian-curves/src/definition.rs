//! Curve definitions: the nodes a curve is calibrated to and the group of
//! curves calibrated together.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use meridian_core::daycounts::DayCount;
use meridian_core::{Currency, Date};
use meridian_market::{MarketData, MarketDataExt, QuoteId};
use meridian_math::interpolation::InterpolatorKind;

use crate::curve::{
    Curve, CurveId, CurveMetadata, CurveName, InterpolatedNodalCurve, ParameterMetadata, ValueType,
};
use crate::error::{CurveError, CurveResult};
use crate::index::{IborIndex, IborIndexObservation};

/// The instrument behind a curve node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CurveNodeKind {
    /// A deposit starting at spot and running for a number of months.
    TermDeposit {
        /// Deposit currency.
        currency: Currency,
        /// Tenor in months.
        tenor_months: i32,
        /// Accrual day count.
        day_count: DayCount,
        /// Business days from valuation to start.
        spot_days: i32,
    },
    /// A forward rate agreement on an Ibor index, e.g. 3x6.
    Fra {
        /// The index fixed at the start date.
        index: IborIndex,
        /// Months from spot to the start date.
        start_months: i32,
        /// Months from spot to the end date.
        end_months: i32,
    },
}

/// A node of a calibrated curve: one market quote and the instrument it
/// prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveNode {
    label: String,
    quote_id: QuoteId,
    kind: CurveNodeKind,
}

impl CurveNode {
    /// Creates a node.
    #[must_use]
    pub fn new(label: impl Into<String>, quote_id: QuoteId, kind: CurveNodeKind) -> Self {
        Self {
            label: label.into(),
            quote_id,
            kind,
        }
    }

    /// Creates a term deposit node with two spot days.
    #[must_use]
    pub fn term_deposit(
        label: impl Into<String>,
        quote_id: QuoteId,
        currency: Currency,
        tenor_months: i32,
        day_count: DayCount,
    ) -> Self {
        Self::new(
            label,
            quote_id,
            CurveNodeKind::TermDeposit {
                currency,
                tenor_months,
                day_count,
                spot_days: 2,
            },
        )
    }

    /// Creates a FRA node.
    #[must_use]
    pub fn fra(
        label: impl Into<String>,
        quote_id: QuoteId,
        index: IborIndex,
        start_months: i32,
        end_months: i32,
    ) -> Self {
        Self::new(
            label,
            quote_id,
            CurveNodeKind::Fra {
                index,
                start_months,
                end_months,
            },
        )
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the quote the node is calibrated to.
    #[must_use]
    pub fn quote_id(&self) -> &QuoteId {
        &self.quote_id
    }

    /// Returns the instrument kind.
    #[must_use]
    pub fn kind(&self) -> &CurveNodeKind {
        &self.kind
    }

    fn spot_date(&self, valuation_date: Date) -> Date {
        match &self.kind {
            CurveNodeKind::TermDeposit { spot_days, .. } => {
                valuation_date.add_business_days(*spot_days)
            }
            CurveNodeKind::Fra { index, .. } => {
                valuation_date.add_business_days(index.fixing_offset_days())
            }
        }
    }

    /// Returns the start date of the instrument.
    pub fn start_date(&self, valuation_date: Date) -> CurveResult<Date> {
        let spot = self.spot_date(valuation_date);
        Ok(match &self.kind {
            CurveNodeKind::TermDeposit { .. } => spot,
            CurveNodeKind::Fra { start_months, .. } => spot.add_months(*start_months)?,
        })
    }

    /// Returns the end date of the instrument.
    pub fn end_date(&self, valuation_date: Date) -> CurveResult<Date> {
        let spot = self.spot_date(valuation_date);
        Ok(match &self.kind {
            CurveNodeKind::TermDeposit { tenor_months, .. } => spot.add_months(*tenor_months)?,
            CurveNodeKind::Fra { end_months, .. } => spot.add_months(*end_months)?,
        })
    }

    /// Returns the date the node is placed at on the curve: the end date.
    pub fn node_date(&self, valuation_date: Date) -> CurveResult<Date> {
        self.end_date(valuation_date)
    }

    /// Returns the index observation of a FRA node.
    pub fn observation(&self, valuation_date: Date) -> CurveResult<Option<IborIndexObservation>> {
        match &self.kind {
            CurveNodeKind::Fra { index, .. } => {
                let start = self.start_date(valuation_date)?;
                let end = self.end_date(valuation_date)?;
                Ok(Some(IborIndexObservation::new(index, index.fixing_date(start), start, end)))
            }
            CurveNodeKind::TermDeposit { .. } => Ok(None),
        }
    }
}

/// Definition of an interpolated nodal curve calibrated to a set of nodes.
///
/// The curve has one parameter per node, placed at the node date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodalCurveDefinition {
    name: CurveName,
    y_value_type: ValueType,
    day_count: DayCount,
    interpolator: InterpolatorKind,
    nodes: Vec<CurveNode>,
}

impl NodalCurveDefinition {
    /// Creates a definition.
    ///
    /// # Errors
    ///
    /// Returns `CurveError::InvalidDefinition` if there are no nodes or the
    /// y values are neither zero rates nor discount factors.
    pub fn new(
        name: CurveName,
        y_value_type: ValueType,
        day_count: DayCount,
        interpolator: InterpolatorKind,
        nodes: Vec<CurveNode>,
    ) -> CurveResult<Self> {
        if nodes.is_empty() {
            return Err(CurveError::invalid_definition(format!("curve '{name}' has no nodes")));
        }
        if y_value_type == ValueType::YearFraction {
            return Err(CurveError::invalid_definition(format!(
                "curve '{name}' must have zero rate or discount factor y values"
            )));
        }
        Ok(Self {
            name,
            y_value_type,
            day_count,
            interpolator,
            nodes,
        })
    }

    /// Returns the curve name.
    #[must_use]
    pub fn name(&self) -> &CurveName {
        &self.name
    }

    /// Returns the y value type.
    #[must_use]
    pub fn y_value_type(&self) -> ValueType {
        self.y_value_type
    }

    /// Returns the day count of the curve x values.
    #[must_use]
    pub fn day_count(&self) -> DayCount {
        self.day_count
    }

    /// Returns the interpolator.
    #[must_use]
    pub fn interpolator(&self) -> InterpolatorKind {
        self.interpolator
    }

    /// Returns the nodes.
    #[must_use]
    pub fn nodes(&self) -> &[CurveNode] {
        &self.nodes
    }

    /// Returns the number of parameters, one per node.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.nodes.len()
    }

    /// Builds the curve metadata at a valuation date.
    ///
    /// # Errors
    ///
    /// Returns `CurveError::InvalidDefinition` unless node times are
    /// strictly increasing.
    pub fn metadata(&self, valuation_date: Date) -> CurveResult<CurveMetadata> {
        let mut parameter_metadata = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let date = node.node_date(valuation_date)?;
            let x = self.day_count.year_fraction(valuation_date, date);
            if let Some(previous) = parameter_metadata.last().map(|m: &ParameterMetadata| m.x) {
                if x <= previous {
                    return Err(CurveError::invalid_definition(format!(
                        "nodes of curve '{}' are not in increasing date order at '{}'",
                        self.name,
                        node.label()
                    )));
                }
            }
            parameter_metadata.push(ParameterMetadata::dated(node.label(), date, x));
        }
        Ok(
            CurveMetadata::new(self.name.clone(), self.y_value_type, self.day_count)
                .with_parameter_metadata(parameter_metadata),
        )
    }

    /// Builds the curve from metadata and parameters.
    pub fn curve(
        &self,
        metadata: CurveMetadata,
        parameters: Vec<f64>,
    ) -> CurveResult<Arc<dyn Curve>> {
        if parameters.len() != self.parameter_count() {
            return Err(CurveError::ParameterCountMismatch {
                expected: self.parameter_count(),
                actual: parameters.len(),
            });
        }
        let x_values = metadata.parameter_metadata().iter().map(|m| m.x).collect();
        Ok(Arc::new(InterpolatedNodalCurve::new(
            metadata,
            x_values,
            parameters,
            self.interpolator,
        )?))
    }

    /// Returns a starting point for calibration from the node quotes.
    ///
    /// Zero rate curves start at the quoted rates; discount factor curves at
    /// the discount factors those rates imply. Missing quotes start at zero.
    pub fn initial_guess(&self, market_data: &dyn MarketData) -> CurveResult<Vec<f64>> {
        let metadata = self.metadata(market_data.valuation_date())?;
        Ok(self
            .nodes
            .iter()
            .zip(metadata.parameter_metadata())
            .map(|(node, param)| {
                let rate = market_data.find_value(node.quote_id()).unwrap_or(0.0);
                match self.y_value_type {
                    ValueType::DiscountFactor => (-rate * param.x).exp(),
                    _ => rate,
                }
            })
            .collect())
    }
}

/// What a curve of a group is used for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveGroupEntry {
    curve_name: CurveName,
    discount_currencies: BTreeSet<Currency>,
    indices: BTreeSet<IborIndex>,
}

impl CurveGroupEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(
        curve_name: CurveName,
        discount_currencies: impl IntoIterator<Item = Currency>,
        indices: impl IntoIterator<Item = IborIndex>,
    ) -> Self {
        Self {
            curve_name,
            discount_currencies: discount_currencies.into_iter().collect(),
            indices: indices.into_iter().collect(),
        }
    }

    /// Returns the curve name.
    #[must_use]
    pub fn curve_name(&self) -> &CurveName {
        &self.curve_name
    }

    /// Returns the currencies discounted with the curve.
    #[must_use]
    pub fn discount_currencies(&self) -> &BTreeSet<Currency> {
        &self.discount_currencies
    }

    /// Returns the indices forecast with the curve.
    #[must_use]
    pub fn indices(&self) -> &BTreeSet<IborIndex> {
        &self.indices
    }
}

/// A group of curves calibrated together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveGroupDefinition {
    name: String,
    entries: Vec<CurveGroupEntry>,
    curve_definitions: Vec<NodalCurveDefinition>,
    compute_jacobian: bool,
}

impl CurveGroupDefinition {
    /// Creates a group.
    ///
    /// # Errors
    ///
    /// Returns `CurveError::InvalidDefinition` if an entry has no matching
    /// definition, a definition has no entry, or names repeat.
    pub fn new(
        name: impl Into<String>,
        entries: Vec<CurveGroupEntry>,
        curve_definitions: Vec<NodalCurveDefinition>,
        compute_jacobian: bool,
    ) -> CurveResult<Self> {
        let name = name.into();
        let mut seen = BTreeSet::new();
        for definition in &curve_definitions {
            if !seen.insert(definition.name()) {
                return Err(CurveError::invalid_definition(format!(
                    "curve '{}' is defined twice in group '{name}'",
                    definition.name()
                )));
            }
            if !entries.iter().any(|e| e.curve_name() == definition.name()) {
                return Err(CurveError::invalid_definition(format!(
                    "curve '{}' has no entry in group '{name}'",
                    definition.name()
                )));
            }
        }
        for entry in &entries {
            if !seen.contains(entry.curve_name()) {
                return Err(CurveError::invalid_definition(format!(
                    "entry '{}' has no curve definition in group '{name}'",
                    entry.curve_name()
                )));
            }
        }
        Ok(Self {
            name,
            entries,
            curve_definitions,
            compute_jacobian,
        })
    }

    /// Creates a builder.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> CurveGroupDefinitionBuilder {
        CurveGroupDefinitionBuilder {
            name: name.into(),
            entries: Vec::new(),
            curve_definitions: Vec::new(),
            compute_jacobian: true,
        }
    }

    /// Returns the group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the entries.
    #[must_use]
    pub fn entries(&self) -> &[CurveGroupEntry] {
        &self.entries
    }

    /// Returns the curve definitions in calibration order.
    #[must_use]
    pub fn curve_definitions(&self) -> &[NodalCurveDefinition] {
        &self.curve_definitions
    }

    /// Whether calibration attaches Jacobians to the curves.
    #[must_use]
    pub fn compute_jacobian(&self) -> bool {
        self.compute_jacobian
    }

    /// Finds the entry of a curve.
    #[must_use]
    pub fn find_entry(&self, name: &CurveName) -> Option<&CurveGroupEntry> {
        self.entries.iter().find(|e| e.curve_name() == name)
    }

    /// Finds the definition of a curve.
    #[must_use]
    pub fn find_definition(&self, name: &CurveName) -> Option<&NodalCurveDefinition> {
        self.curve_definitions.iter().find(|d| d.name() == name)
    }

    /// Returns the number of parameters over all curves.
    #[must_use]
    pub fn total_parameter_count(&self) -> usize {
        self.curve_definitions.iter().map(NodalCurveDefinition::parameter_count).sum()
    }

    /// Returns the node quotes in calibration order.
    #[must_use]
    pub fn quote_ids(&self) -> Vec<QuoteId> {
        self.curve_definitions
            .iter()
            .flat_map(|d| d.nodes().iter().map(|n| n.quote_id().clone()))
            .collect()
    }

    /// Returns the market data ids of the calibrated curves.
    #[must_use]
    pub fn curve_ids(&self) -> Vec<CurveId> {
        self.curve_definitions
            .iter()
            .map(|d| CurveId::new(self.name.clone(), d.name().clone()))
            .collect()
    }
}

/// Builder for [`CurveGroupDefinition`].
#[derive(Debug, Clone)]
pub struct CurveGroupDefinitionBuilder {
    name: String,
    entries: Vec<CurveGroupEntry>,
    curve_definitions: Vec<NodalCurveDefinition>,
    compute_jacobian: bool,
}

impl CurveGroupDefinitionBuilder {
    /// Adds a curve used for discounting and forecasting.
    pub fn add_curve(
        mut self,
        definition: NodalCurveDefinition,
        discount_currencies: impl IntoIterator<Item = Currency>,
        indices: impl IntoIterator<Item = IborIndex>,
    ) -> Self {
        self.entries.push(CurveGroupEntry::new(
            definition.name().clone(),
            discount_currencies,
            indices,
        ));
        self.curve_definitions.push(definition);
        self
    }

    /// Adds a discount curve.
    pub fn add_discount_curve(self, definition: NodalCurveDefinition, currency: Currency) -> Self {
        self.add_curve(definition, [currency], [])
    }

    /// Adds a forward curve of an index.
    pub fn add_forward_curve(self, definition: NodalCurveDefinition, index: IborIndex) -> Self {
        self.add_curve(definition, [], [index])
    }

    /// Sets whether calibration attaches Jacobians; on by default.
    pub fn compute_jacobian(mut self, compute_jacobian: bool) -> Self {
        self.compute_jacobian = compute_jacobian;
        self
    }

    /// Builds the group.
    pub fn build(self) -> CurveResult<CurveGroupDefinition> {
        CurveGroupDefinition::new(
            self.name,
            self.entries,
            self.curve_definitions,
            self.compute_jacobian,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use meridian_market::ImmutableMarketData;

    fn valuation() -> Date {
        // Friday
        Date::from_ymd(2024, 6, 14).unwrap()
    }

    fn usd_deposit(tenor: &str, months: i32) -> CurveNode {
        let quote_id = QuoteId::new(format!("USD-DEP-{tenor}"));
        CurveNode::term_deposit(tenor, quote_id, Currency::USD, months, DayCount::Act360)
    }

    fn usd_disc() -> NodalCurveDefinition {
        NodalCurveDefinition::new(
            CurveName::new("USD-Disc"),
            ValueType::ZeroRate,
            DayCount::Act365Fixed,
            InterpolatorKind::Linear,
            vec![usd_deposit("1M", 1), usd_deposit("6M", 6)],
        )
        .unwrap()
    }

    #[test]
    fn test_node_dates() {
        let dep = usd_deposit("3M", 3);
        assert_eq!(dep.start_date(valuation()).unwrap(), Date::from_ymd(2024, 6, 18).unwrap());
        assert_eq!(dep.end_date(valuation()).unwrap(), Date::from_ymd(2024, 9, 18).unwrap());
        assert!(dep.observation(valuation()).unwrap().is_none());

        let fra = CurveNode::fra("3x6", QuoteId::new("F"), IborIndex::usd_libor_3m(), 3, 6);
        assert_eq!(fra.start_date(valuation()).unwrap(), Date::from_ymd(2024, 9, 18).unwrap());
        assert_eq!(fra.node_date(valuation()).unwrap(), Date::from_ymd(2024, 12, 18).unwrap());
        let obs = fra.observation(valuation()).unwrap().unwrap();
        assert_eq!(obs.effective_date(), Date::from_ymd(2024, 9, 18).unwrap());
        assert_eq!(obs.fixing_date(), Date::from_ymd(2024, 9, 16).unwrap());
    }

    #[test]
    fn test_metadata_and_curve() {
        let def = usd_disc();
        let metadata = def.metadata(valuation()).unwrap();
        assert_eq!(metadata.parameter_metadata().len(), 2);
        assert_eq!(metadata.parameter_metadata()[0].label, "1M");
        let curve = def.curve(metadata, vec![0.05, 0.051]).unwrap();
        assert_eq!(curve.parameter_count(), 2);
        assert!(matches!(
            def.curve(def.metadata(valuation()).unwrap(), vec![0.05]),
            Err(CurveError::ParameterCountMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_metadata_rejects_unordered_nodes() {
        let def = NodalCurveDefinition::new(
            CurveName::new("Bad"),
            ValueType::ZeroRate,
            DayCount::Act365Fixed,
            InterpolatorKind::Linear,
            vec![usd_deposit("6M", 6), usd_deposit("1M", 1)],
        )
        .unwrap();
        assert!(matches!(def.metadata(valuation()), Err(CurveError::InvalidDefinition { .. })));
    }

    #[test]
    fn test_initial_guess() {
        let data = ImmutableMarketData::builder(valuation())
            .add_value(&QuoteId::new("USD-DEP-1M"), 0.053)
            .build();
        let guess = usd_disc().initial_guess(&data).unwrap();
        assert_relative_eq!(guess[0], 0.053);
        assert_relative_eq!(guess[1], 0.0);
    }

    #[test]
    fn test_group_validation() {
        let group = CurveGroupDefinition::builder("Default")
            .add_discount_curve(usd_disc(), Currency::USD)
            .build()
            .unwrap();
        assert!(group.compute_jacobian());
        assert_eq!(group.total_parameter_count(), 2);
        assert_eq!(group.quote_ids()[1].as_str(), "USD-DEP-6M");
        assert_eq!(group.curve_ids()[0].to_string(), "Default/USD-Disc");

        let duplicate = CurveGroupDefinition::builder("Default")
            .add_discount_curve(usd_disc(), Currency::USD)
            .add_discount_curve(usd_disc(), Currency::EUR)
            .build();
        assert!(matches!(duplicate, Err(CurveError::InvalidDefinition { .. })));

        let orphan = CurveGroupDefinition::new(
            "Default",
            vec![CurveGroupEntry::new(CurveName::new("Missing"), [Currency::USD], [])],
            vec![],
            false,
        );
        assert!(matches!(orphan, Err(CurveError::InvalidDefinition { .. })));
    }
}
