//! Parameter sensitivity to market quote sensitivity.

use std::collections::HashMap;

use meridian_math::linear_algebra::{row_times_matrix, split_by_sizes};
use tracing::debug;

use super::{CurrencyParameterSensitivities, CurrencyParameterSensitivity};
use crate::curve::{CurveName, JacobianCalibrationMatrix, ParameterMetadata};
use crate::error::{CurveError, CurveResult};
use crate::provider::RatesProvider;

/// Maps sensitivities to curve parameters onto sensitivities to the market
/// quotes the curves were calibrated to.
///
/// Each entry is multiplied, as a row vector, by the Jacobian of its curve.
/// The product covers every quote of the curve's calibration block; it is
/// split by the Jacobian order and each slice is attributed to the curve
/// owning those quotes. Slices landing on the same curve and currency are
/// summed. The transform is linear in its input.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketQuoteSensitivityCalculator;

impl MarketQuoteSensitivityCalculator {
    /// Creates a calculator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Computes market quote sensitivities using the Jacobians attached to
    /// the curves of a rates provider.
    ///
    /// # Errors
    ///
    /// Returns `CurveError::CurveNotFound` if an entry names a curve the
    /// provider does not hold, and `CurveError::MissingJacobian` if that
    /// curve carries no calibration Jacobian.
    pub fn sensitivity(
        &self,
        parameter_sensitivities: &CurrencyParameterSensitivities,
        provider: &dyn RatesProvider,
    ) -> CurveResult<CurrencyParameterSensitivities> {
        let mut jacobians = HashMap::new();
        let mut metadata = HashMap::new();
        for entry in parameter_sensitivities.entries() {
            let name = entry.market_data_name();
            let curve = provider
                .find_curve(name)
                .ok_or_else(|| CurveError::curve_not_found(name.as_str()))?;
            let jacobian = curve
                .metadata()
                .jacobian()
                .ok_or_else(|| CurveError::missing_jacobian(name.as_str()))?;
            for size in jacobian.order() {
                if let Some(target) = provider.find_curve(&size.name) {
                    metadata.insert(
                        size.name.clone(),
                        target.metadata().parameter_metadata_or_default(size.count),
                    );
                }
            }
            jacobians.insert(name.clone(), jacobian.clone());
        }
        compute(parameter_sensitivities, &jacobians, &metadata)
    }

    /// Computes market quote sensitivities from an explicit map of Jacobians
    /// keyed by curve name.
    ///
    /// # Errors
    ///
    /// Returns `CurveError::MissingJacobian` if an entry names a curve that
    /// has no Jacobian in the map.
    pub fn sensitivity_from_jacobians(
        &self,
        parameter_sensitivities: &CurrencyParameterSensitivities,
        jacobians: &HashMap<CurveName, JacobianCalibrationMatrix>,
    ) -> CurveResult<CurrencyParameterSensitivities> {
        compute(parameter_sensitivities, jacobians, &HashMap::new())
    }
}

fn compute(
    parameter_sensitivities: &CurrencyParameterSensitivities,
    jacobians: &HashMap<CurveName, JacobianCalibrationMatrix>,
    metadata: &HashMap<CurveName, Vec<ParameterMetadata>>,
) -> CurveResult<CurrencyParameterSensitivities> {
    let mut result = CurrencyParameterSensitivities::empty();
    for entry in parameter_sensitivities.entries() {
        let name = entry.market_data_name();
        let jacobian = jacobians
            .get(name)
            .ok_or_else(|| CurveError::missing_jacobian(name.as_str()))?;
        if jacobian.matrix().nrows() != entry.parameter_count() {
            return Err(CurveError::ParameterCountMismatch {
                expected: jacobian.matrix().nrows(),
                actual: entry.parameter_count(),
            });
        }

        let quote_sensitivity = row_times_matrix(entry.sensitivity(), jacobian.matrix())?;
        let slices = split_by_sizes(&quote_sensitivity, &jacobian.sizes())?;
        debug!(
            curve = %name,
            currency = %entry.currency(),
            blocks = slices.len(),
            "mapped parameter sensitivity to market quotes"
        );

        for (size, values) in jacobian.order().iter().zip(slices) {
            let quote_metadata = metadata
                .get(&size.name)
                .cloned()
                .unwrap_or_else(|| (0..size.count).map(ParameterMetadata::indexed).collect());
            result = result.combined_with_entry(CurrencyParameterSensitivity::new(
                size.name.clone(),
                quote_metadata,
                entry.currency(),
                values,
            ))?;
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CurveParameterSize;
    use approx::assert_relative_eq;
    use meridian_core::Currency;
    use nalgebra::DMatrix;

    fn entry(name: &str, values: Vec<f64>) -> CurrencyParameterSensitivity {
        let metadata = (0..values.len()).map(ParameterMetadata::indexed).collect();
        CurrencyParameterSensitivity::new(CurveName::new(name), metadata, Currency::USD, values)
    }

    fn two_curve_jacobians() -> HashMap<CurveName, JacobianCalibrationMatrix> {
        let order = vec![
            CurveParameterSize::new(CurveName::new("Disc"), 1),
            CurveParameterSize::new(CurveName::new("Fwd"), 2),
        ];
        let disc = DMatrix::from_row_slice(1, 3, &[2.0, 0.0, 0.0]);
        let fwd = DMatrix::from_row_slice(2, 3, &[0.5, 1.0, 0.0, 0.25, 0.0, 3.0]);
        HashMap::from([
            (CurveName::new("Disc"), JacobianCalibrationMatrix::new(order.clone(), disc).unwrap()),
            (CurveName::new("Fwd"), JacobianCalibrationMatrix::new(order, fwd).unwrap()),
        ])
    }

    #[test]
    fn test_split_and_accumulate() {
        let entries = [entry("Disc", vec![10.0]), entry("Fwd", vec![4.0, 2.0])];
        let sens = CurrencyParameterSensitivities::of(entries).unwrap();
        let mq = MarketQuoteSensitivityCalculator::new()
            .sensitivity_from_jacobians(&sens, &two_curve_jacobians())
            .unwrap();

        // Disc: 10·2 from Disc, 4·0.5 + 2·0.25 from Fwd
        let disc = mq.find(&CurveName::new("Disc"), Currency::USD).unwrap();
        assert_relative_eq!(disc.sensitivity()[0], 22.5);
        let fwd = mq.find(&CurveName::new("Fwd"), Currency::USD).unwrap();
        assert_relative_eq!(fwd.sensitivity()[0], 4.0);
        assert_relative_eq!(fwd.sensitivity()[1], 6.0);
    }

    #[test]
    fn test_missing_jacobian() {
        let sens = CurrencyParameterSensitivities::of([entry("Other", vec![1.0])]).unwrap();
        let err = MarketQuoteSensitivityCalculator::new()
            .sensitivity_from_jacobians(&sens, &two_curve_jacobians())
            .unwrap_err();
        assert!(matches!(err, CurveError::MissingJacobian { .. }));
    }

    #[test]
    fn test_row_length_mismatch() {
        let sens = CurrencyParameterSensitivities::of([entry("Fwd", vec![1.0])]).unwrap();
        let err = MarketQuoteSensitivityCalculator::new()
            .sensitivity_from_jacobians(&sens, &two_curve_jacobians())
            .unwrap_err();
        assert!(matches!(err, CurveError::ParameterCountMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_empty_input() {
        let mq = MarketQuoteSensitivityCalculator::new()
            .sensitivity_from_jacobians(&CurrencyParameterSensitivities::empty(), &HashMap::new())
            .unwrap();
        assert!(mq.is_empty());
    }
}
