//! Building rates providers from a flat parameter vector.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use meridian_core::Currency;
use tracing::trace;

use super::ImmutableRatesProvider;
use crate::curve::{CurveMetadata, CurveName, JacobianCalibrationMatrix};
use crate::definition::{CurveGroupDefinition, NodalCurveDefinition};
use crate::error::{CurveError, CurveResult};
use crate::index::IborIndex;
use crate::provider::RatesProvider;

/// Generates rates providers from the parameters of a curve group.
///
/// The parameter vector is laid out curve by curve in definition order.
/// Each generated provider starts from the known provider and installs
/// every curve under each currency it discounts and each index it
/// forecasts. The known provider itself is never modified.
#[derive(Debug, Clone)]
pub struct ImmutableRatesProviderGenerator {
    known: ImmutableRatesProvider,
    curve_definitions: Vec<NodalCurveDefinition>,
    curve_metadata: Vec<CurveMetadata>,
    discount_currencies: BTreeMap<CurveName, BTreeSet<Currency>>,
    forward_indices: BTreeMap<CurveName, BTreeSet<IborIndex>>,
}

impl ImmutableRatesProviderGenerator {
    /// Creates a generator for a curve group at the known provider's
    /// valuation date.
    pub fn of(known: ImmutableRatesProvider, group: &CurveGroupDefinition) -> CurveResult<Self> {
        let valuation_date = known.valuation_date();
        let curve_metadata = group
            .curve_definitions()
            .iter()
            .map(|definition| definition.metadata(valuation_date))
            .collect::<CurveResult<Vec<_>>>()?;
        let discount_currencies = group
            .entries()
            .iter()
            .map(|e| (e.curve_name().clone(), e.discount_currencies().clone()))
            .collect();
        let forward_indices = group
            .entries()
            .iter()
            .map(|e| (e.curve_name().clone(), e.indices().clone()))
            .collect();
        Self::new(
            known,
            group.curve_definitions().to_vec(),
            curve_metadata,
            discount_currencies,
            forward_indices,
        )
    }

    /// Creates a generator from its parts.
    ///
    /// # Errors
    ///
    /// Returns `CurveError::InvalidDefinition` if definitions and metadata
    /// differ in length.
    pub fn new(
        known: ImmutableRatesProvider,
        curve_definitions: Vec<NodalCurveDefinition>,
        curve_metadata: Vec<CurveMetadata>,
        discount_currencies: BTreeMap<CurveName, BTreeSet<Currency>>,
        forward_indices: BTreeMap<CurveName, BTreeSet<IborIndex>>,
    ) -> CurveResult<Self> {
        if curve_definitions.len() != curve_metadata.len() {
            return Err(CurveError::invalid_definition(format!(
                "{} curve definitions but {} curve metadata",
                curve_definitions.len(),
                curve_metadata.len()
            )));
        }
        Ok(Self {
            known,
            curve_definitions,
            curve_metadata,
            discount_currencies,
            forward_indices,
        })
    }

    /// Returns the known provider.
    #[must_use]
    pub fn known(&self) -> &ImmutableRatesProvider {
        &self.known
    }

    /// Returns the curve definitions in parameter order.
    #[must_use]
    pub fn curve_definitions(&self) -> &[NodalCurveDefinition] {
        &self.curve_definitions
    }

    /// Returns the total number of parameters.
    #[must_use]
    pub fn total_parameter_count(&self) -> usize {
        self.curve_definitions
            .iter()
            .map(NodalCurveDefinition::parameter_count)
            .sum()
    }

    /// Generates a provider from parameters, without Jacobians.
    pub fn generate(&self, parameters: &[f64]) -> CurveResult<ImmutableRatesProvider> {
        self.generate_with_jacobians(parameters, &HashMap::new())
    }

    /// Generates a provider from parameters, attaching the Jacobian of each
    /// curve found in `jacobians`.
    ///
    /// # Errors
    ///
    /// Returns `CurveError::ParameterCountMismatch` if `parameters` does not
    /// have exactly [`Self::total_parameter_count`] values.
    pub fn generate_with_jacobians(
        &self,
        parameters: &[f64],
        jacobians: &HashMap<CurveName, JacobianCalibrationMatrix>,
    ) -> CurveResult<ImmutableRatesProvider> {
        let expected = self.total_parameter_count();
        if parameters.len() != expected {
            return Err(CurveError::ParameterCountMismatch {
                expected,
                actual: parameters.len(),
            });
        }

        let mut builder = self.known.to_builder();
        let mut offset = 0;
        for (definition, metadata) in self.curve_definitions.iter().zip(&self.curve_metadata) {
            let count = definition.parameter_count();
            let slice = parameters[offset..offset + count].to_vec();
            offset += count;

            let name = definition.name();
            let metadata = match jacobians.get(name) {
                Some(jacobian) => metadata.clone().with_jacobian(jacobian.clone()),
                None => metadata.clone(),
            };
            let curve = definition.curve(metadata, slice)?;
            trace!(curve = %name, parameters = count, "generated curve");

            for currency in self.discount_currencies.get(name).into_iter().flatten() {
                builder = builder.discount_curve(*currency, curve.clone());
            }
            for index in self.forward_indices.get(name).into_iter().flatten() {
                builder = builder.ibor_index_curve(index.clone(), curve.clone());
            }
        }
        Ok(builder.build())
    }
}
