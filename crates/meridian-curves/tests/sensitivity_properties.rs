//! Property-based tests for the sensitivity chain.
//!
//! - Market quote sensitivity is linear in the parameter sensitivity
//! - Generating a provider reproduces the parameter vector exactly
//! - Missing Jacobians fail rather than produce zero sensitivity

use std::collections::HashMap;

use meridian_core::daycounts::DayCount;
use meridian_core::{Currency, Date};
use meridian_curves::prelude::*;
use meridian_market::QuoteId;
use meridian_math::interpolation::InterpolatorKind;
use nalgebra::DMatrix;
use proptest::prelude::*;

// =============================================================================
// FIXTURES
// =============================================================================

fn valuation() -> Date {
    Date::from_ymd(2024, 6, 14).unwrap()
}

fn jacobians() -> HashMap<CurveName, JacobianCalibrationMatrix> {
    let order = vec![
        CurveParameterSize::new(CurveName::new("Disc"), 2),
        CurveParameterSize::new(CurveName::new("Fwd"), 1),
    ];
    let disc = DMatrix::from_row_slice(2, 3, &[1.2, -0.1, 0.0, 0.3, 0.9, 0.05]);
    let fwd = DMatrix::from_row_slice(1, 3, &[0.0, 0.4, 1.1]);
    HashMap::from([
        (CurveName::new("Disc"), JacobianCalibrationMatrix::new(order.clone(), disc).unwrap()),
        (CurveName::new("Fwd"), JacobianCalibrationMatrix::new(order, fwd).unwrap()),
    ])
}

fn sensitivities(disc: [f64; 2], fwd: f64) -> CurrencyParameterSensitivities {
    CurrencyParameterSensitivities::of([
        CurrencyParameterSensitivity::new(
            CurveName::new("Disc"),
            vec![ParameterMetadata::indexed(0), ParameterMetadata::indexed(1)],
            Currency::USD,
            disc.to_vec(),
        ),
        CurrencyParameterSensitivity::new(
            CurveName::new("Fwd"),
            vec![ParameterMetadata::indexed(0)],
            Currency::USD,
            vec![fwd],
        ),
    ])
    .unwrap()
}

fn deposit(tenor: &str, months: i32) -> CurveNode {
    let quote_id = QuoteId::new(format!("DEP-{tenor}"));
    CurveNode::term_deposit(tenor, quote_id, Currency::USD, months, DayCount::Act360)
}

fn group() -> CurveGroupDefinition {
    let disc = NodalCurveDefinition::new(
        CurveName::new("USD-Disc"),
        ValueType::ZeroRate,
        DayCount::Act365Fixed,
        InterpolatorKind::Linear,
        vec![deposit("3M", 3), deposit("6M", 6), deposit("1Y", 12)],
    )
    .unwrap();
    let fwd = NodalCurveDefinition::new(
        CurveName::new("USD-3M"),
        ValueType::DiscountFactor,
        DayCount::Act365Fixed,
        InterpolatorKind::LogLinear,
        vec![
            CurveNode::fra("3x6", QuoteId::new("FRA-3x6"), IborIndex::usd_libor_3m(), 3, 6),
            CurveNode::fra("6x9", QuoteId::new("FRA-6x9"), IborIndex::usd_libor_3m(), 6, 9),
        ],
    )
    .unwrap();
    CurveGroupDefinition::builder("Default")
        .add_discount_curve(disc, Currency::USD)
        .add_forward_curve(fwd, IborIndex::usd_libor_3m())
        .build()
        .unwrap()
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn market_quote_sensitivity_is_linear(
        a in prop::array::uniform3(-1.0e4..1.0e4f64),
        b in prop::array::uniform3(-1.0e4..1.0e4f64),
        k in -10.0..10.0f64,
    ) {
        let calc = MarketQuoteSensitivityCalculator::new();
        let jac = jacobians();
        let sa = sensitivities([a[0], a[1]], a[2]);
        let sb = sensitivities([b[0], b[1]], b[2]);

        let combined = sa.multiplied_by(k).combined_with(&sb).unwrap();
        let lhs = calc.sensitivity_from_jacobians(&combined, &jac).unwrap();
        let rhs = calc
            .sensitivity_from_jacobians(&sa, &jac)
            .unwrap()
            .multiplied_by(k)
            .combined_with(&calc.sensitivity_from_jacobians(&sb, &jac).unwrap())
            .unwrap();

        prop_assert!(lhs.equal_with_tolerance(&rhs, 1e-6));
    }

    #[test]
    fn generator_round_trip(
        zeros in prop::array::uniform3(0.0..0.1f64),
        dfs in prop::array::uniform2(0.9..1.0f64),
    ) {
        let known = ImmutableRatesProvider::builder(valuation()).build();
        let generator = ImmutableRatesProviderGenerator::of(known, &group()).unwrap();
        let params: Vec<f64> = zeros.iter().chain(dfs.iter()).copied().collect();

        let provider = generator.generate(&params).unwrap();
        let disc = provider.find_curve(&CurveName::new("USD-Disc")).unwrap();
        let fwd = provider.find_curve(&CurveName::new("USD-3M")).unwrap();
        let regenerated: Vec<f64> = (0..disc.parameter_count())
            .map(|i| disc.parameter(i).unwrap())
            .chain((0..fwd.parameter_count()).map(|i| fwd.parameter(i).unwrap()))
            .collect();

        prop_assert_eq!(regenerated, params);
    }
}

#[test]
fn missing_jacobian_fails_fast() {
    let known = ImmutableRatesProvider::builder(valuation()).build();
    let provider = ImmutableRatesProviderGenerator::of(known, &group())
        .unwrap()
        .generate(&[0.01, 0.02, 0.03, 0.99, 0.98])
        .unwrap();
    let sens = provider
        .parameter_sensitivity(&PointSensitivities::of([
            ZeroRateSensitivity::new(Currency::USD, 0.5, -1000.0).into(),
        ]))
        .unwrap();

    let err = MarketQuoteSensitivityCalculator::new()
        .sensitivity(&sens, &provider)
        .unwrap_err();
    assert!(matches!(err, CurveError::MissingJacobian { .. }));
}

#[test]
fn unknown_curve_is_reported() {
    let provider = ImmutableRatesProvider::builder(valuation()).build();
    let sens = sensitivities([1.0, 2.0], 3.0);
    let err = MarketQuoteSensitivityCalculator::new()
        .sensitivity(&sens, &provider)
        .unwrap_err();
    assert!(matches!(err, CurveError::CurveNotFound { .. }));
}
