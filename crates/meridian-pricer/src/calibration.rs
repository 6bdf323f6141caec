//! Joint calibration of a curve group to market quotes.
//!
//! Every node of every curve in a group is priced at once; Newton's method
//! drives each node's par rate onto its quote. The Jacobian of the system is
//! analytic: the parameter sensitivity of each node's par rate. Inverting
//! it at the solution gives the sensitivity of the curve parameters to the
//! quotes, which is what market quote sensitivity needs.

use std::collections::{BTreeMap, HashMap};

use nalgebra::{DMatrix, DVector};
use tracing::{debug, info};

use meridian_core::Date;
use meridian_curves::curve::{CurveName, CurveParameterSize, JacobianCalibrationMatrix};
use meridian_curves::definition::{CurveGroupDefinition, CurveNode, CurveNodeKind};
use meridian_curves::provider::{
    ImmutableRatesProvider, ImmutableRatesProviderGenerator, RatesProvider,
};
use meridian_curves::CurveError;
use meridian_market::{MarketData, MarketDataExt};
use meridian_math::linear_algebra::invert;
use meridian_math::solvers::{newton_system, SolverConfig};
use meridian_math::MathError;

use crate::error::{PricerError, PricerResult};
use crate::pricer::{DiscountingFraProductPricer, DiscountingTermDepositProductPricer};
use crate::product::{BuySell, Fra, ResolvedFra, ResolvedTermDeposit, TermDeposit};

/// The instrument priced at a curve node.
#[derive(Debug, Clone, PartialEq)]
enum NodeInstrument {
    TermDeposit(ResolvedTermDeposit),
    Fra(ResolvedFra),
}

impl NodeInstrument {
    /// Builds the unit-notional instrument of a node struck at its quote.
    fn of(node: &CurveNode, valuation_date: Date, quote: f64) -> PricerResult<Self> {
        let start = node.start_date(valuation_date)?;
        let end = node.end_date(valuation_date)?;
        Ok(match node.kind() {
            CurveNodeKind::TermDeposit {
                currency, day_count, ..
            } => {
                let deposit =
                    TermDeposit::new(BuySell::Buy, *currency, 1.0, start, end, *day_count, quote)?;
                Self::TermDeposit(deposit.resolve())
            }
            CurveNodeKind::Fra { index, .. } => {
                let fra = Fra::new(BuySell::Buy, 1.0, start, end, quote, index.clone())?;
                Self::Fra(fra.resolve()?)
            }
        })
    }
}

/// Calibrates curve groups.
#[derive(Debug, Clone, Default)]
pub struct CurveCalibrator {
    solver: SolverConfig,
    fra_pricer: DiscountingFraProductPricer,
    term_deposit_pricer: DiscountingTermDepositProductPricer,
}

impl CurveCalibrator {
    /// Creates a calibrator with the default solver settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the solver settings.
    #[must_use]
    pub fn with_solver_config(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Returns the solver settings.
    #[must_use]
    pub fn solver_config(&self) -> &SolverConfig {
        &self.solver
    }

    /// Calibrates the curves of a group on top of the curves already known.
    ///
    /// The returned provider holds the known curves plus every calibrated
    /// curve. When the group asks for it, each calibrated curve carries its
    /// [`JacobianCalibrationMatrix`].
    ///
    /// # Errors
    ///
    /// Returns `PricerError::MarketData` if a node quote is missing,
    /// `PricerError::InvalidArgument` if the known provider and the market
    /// data disagree on the valuation date, and
    /// `CurveError::CalibrationFailure` if the solver does not converge.
    pub fn calibrate(
        &self,
        group: &CurveGroupDefinition,
        market_data: &dyn MarketData,
        known: &ImmutableRatesProvider,
    ) -> PricerResult<ImmutableRatesProvider> {
        let valuation_date = market_data.valuation_date();
        if known.valuation_date() != valuation_date {
            return Err(PricerError::invalid_argument(format!(
                "known curves are valued on {} but market data on {valuation_date}",
                known.valuation_date()
            )));
        }

        let generator = ImmutableRatesProviderGenerator::of(known.clone(), group)?;
        let layout = ParameterLayout::of(group);

        let mut quotes = Vec::with_capacity(layout.total);
        let mut instruments = Vec::with_capacity(layout.total);
        for definition in group.curve_definitions() {
            for node in definition.nodes() {
                let quote = market_data.get_value(node.quote_id())?;
                instruments.push(NodeInstrument::of(node, valuation_date, quote)?);
                quotes.push(quote);
            }
        }

        let initial_guess = group
            .curve_definitions()
            .iter()
            .map(|definition| definition.initial_guess(market_data))
            .collect::<Result<Vec<_>, _>>()?
            .concat();

        let system = |parameters: &[f64]| -> PricerResult<(DVector<f64>, DMatrix<f64>)> {
            let provider = generator.generate(parameters)?;
            let mut residuals = DVector::zeros(layout.total);
            for (i, (instrument, quote)) in instruments.iter().zip(&quotes).enumerate() {
                residuals[i] = self.par_rate(instrument, &provider)? - quote;
            }
            let jacobian = self.par_rate_jacobian(&instruments, &provider, &layout)?;
            Ok((residuals, jacobian))
        };

        let solved = newton_system(system, initial_guess, &self.solver).map_err(|e| match e {
            PricerError::Math(math) => calibration_failure(group, &math),
            other => other,
        })?;
        info!(
            group = group.name(),
            parameters = layout.total,
            iterations = solved.iterations,
            residual = solved.residual,
            "calibrated curve group"
        );

        if !group.compute_jacobian() {
            return Ok(generator.generate(&solved.solution)?);
        }
        let provider = generator.generate(&solved.solution)?;
        let jacobians = self.calibration_jacobians(&instruments, &provider, &layout)?;
        debug!(group = group.name(), curves = jacobians.len(), "attached calibration Jacobians");
        Ok(generator.generate_with_jacobians(&solved.solution, &jacobians)?)
    }

    fn par_rate(
        &self,
        instrument: &NodeInstrument,
        provider: &dyn RatesProvider,
    ) -> PricerResult<f64> {
        match instrument {
            NodeInstrument::TermDeposit(deposit) => {
                self.term_deposit_pricer.par_rate(deposit, provider)
            }
            NodeInstrument::Fra(fra) => self.fra_pricer.par_rate(fra, provider),
        }
    }

    /// Returns `∂(par rate)_i / ∂p_j` over the parameters of the group.
    fn par_rate_jacobian(
        &self,
        instruments: &[NodeInstrument],
        provider: &ImmutableRatesProvider,
        layout: &ParameterLayout,
    ) -> PricerResult<DMatrix<f64>> {
        let mut jacobian = DMatrix::zeros(instruments.len(), layout.total);
        for (row, instrument) in instruments.iter().enumerate() {
            let points = match instrument {
                NodeInstrument::TermDeposit(deposit) => {
                    self.term_deposit_pricer.par_rate_sensitivity(deposit, provider)?
                }
                NodeInstrument::Fra(fra) => self.fra_pricer.par_rate_sensitivity(fra, provider)?,
            };
            let sensitivities = provider.parameter_sensitivity(&points)?;
            for entry in sensitivities.entries() {
                // Curves outside the group are fixed.
                let Some(&offset) = layout.offsets.get(entry.market_data_name()) else {
                    continue;
                };
                for (j, value) in entry.sensitivity().iter().enumerate() {
                    jacobian[(row, offset + j)] += value;
                }
            }
        }
        Ok(jacobian)
    }

    /// Splits the inverse of the par rate Jacobian into one matrix per
    /// curve, rows being the curve parameters and columns every quote.
    fn calibration_jacobians(
        &self,
        instruments: &[NodeInstrument],
        provider: &ImmutableRatesProvider,
        layout: &ParameterLayout,
    ) -> PricerResult<HashMap<CurveName, JacobianCalibrationMatrix>> {
        let inverse = invert(&self.par_rate_jacobian(instruments, provider, layout)?)?;
        layout
            .order
            .iter()
            .map(|size| {
                let offset = layout.offsets[&size.name];
                let rows = inverse.rows(offset, size.count).into_owned();
                let matrix = JacobianCalibrationMatrix::new(layout.order.clone(), rows)?;
                Ok((size.name.clone(), matrix))
            })
            .collect()
    }
}

/// Where each curve's parameters sit in the group's flat parameter vector.
#[derive(Debug)]
struct ParameterLayout {
    order: Vec<CurveParameterSize>,
    offsets: BTreeMap<CurveName, usize>,
    total: usize,
}

impl ParameterLayout {
    fn of(group: &CurveGroupDefinition) -> Self {
        let mut offsets = BTreeMap::new();
        let mut order = Vec::new();
        let mut total = 0;
        for definition in group.curve_definitions() {
            offsets.insert(definition.name().clone(), total);
            order.push(CurveParameterSize::new(
                definition.name().clone(),
                definition.parameter_count(),
            ));
            total += definition.parameter_count();
        }
        Self { order, offsets, total }
    }
}

fn calibration_failure(group: &CurveGroupDefinition, error: &MathError) -> PricerError {
    let (iterations, residual) = match error {
        MathError::ConvergenceFailed { iterations, residual } => (*iterations, *residual),
        _ => (0, f64::NAN),
    };
    CurveError::calibration_failed(
        iterations,
        residual,
        format!("curve group '{}': {error}", group.name()),
    )
    .into()
}
