//! Discounting pricer for FRAs.

use meridian_core::CurrencyAmount;
use meridian_curves::provider::RatesProvider;
use meridian_curves::sensitivity::{PointSensitivities, PointSensitivity};

use crate::error::PricerResult;
use crate::product::{FraDiscounting, ResolvedFra};

/// Prices FRAs by discounting the settlement amount.
///
/// # Pricing Formula
///
/// ```text
/// PV = N × DF(payment) × τ(F - K) / (1 + τF)     (ISDA)
/// PV = N × DF(payment) × τ(F - K)                (no discounting)
/// ```
///
/// where `F` is the index rate of the FRA observation, a fixing once the
/// fixing date has passed. A FRA paid before the valuation date is worth
/// zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscountingFraProductPricer;

impl DiscountingFraProductPricer {
    /// Creates a pricer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the present value.
    pub fn present_value(
        &self,
        fra: &ResolvedFra,
        provider: &dyn RatesProvider,
    ) -> PricerResult<CurrencyAmount> {
        if fra.payment_date() < provider.valuation_date() {
            return Ok(CurrencyAmount::zero(fra.currency()));
        }
        let df = provider
            .discount_factors(fra.currency())?
            .discount_factor(fra.payment_date());
        let pv = fra.notional() * df * unit_amount(fra, self.forward_rate(fra, provider)?);
        Ok(CurrencyAmount::new(fra.currency(), pv))
    }

    /// Returns the undiscounted settlement amount if the FRA pays on the
    /// valuation date, zero otherwise.
    pub fn current_cash(
        &self,
        fra: &ResolvedFra,
        provider: &dyn RatesProvider,
    ) -> PricerResult<CurrencyAmount> {
        if fra.payment_date() != provider.valuation_date() {
            return Ok(CurrencyAmount::zero(fra.currency()));
        }
        let cash = fra.notional() * unit_amount(fra, self.forward_rate(fra, provider)?);
        Ok(CurrencyAmount::new(fra.currency(), cash))
    }

    /// Returns the index rate of the FRA period.
    pub fn forward_rate(
        &self,
        fra: &ResolvedFra,
        provider: &dyn RatesProvider,
    ) -> PricerResult<f64> {
        Ok(provider
            .ibor_index_rates(fra.observation().index())?
            .rate(fra.observation())?)
    }

    /// Returns the fixed rate giving a present value of zero, the forward
    /// rate.
    pub fn par_rate(&self, fra: &ResolvedFra, provider: &dyn RatesProvider) -> PricerResult<f64> {
        self.forward_rate(fra, provider)
    }

    /// Returns the par rate less the fixed rate.
    pub fn par_spread(&self, fra: &ResolvedFra, provider: &dyn RatesProvider) -> PricerResult<f64> {
        Ok(self.par_rate(fra, provider)? - fra.fixed_rate())
    }

    /// Returns the sensitivity of the present value to the discount and
    /// index rates.
    pub fn present_value_sensitivity(
        &self,
        fra: &ResolvedFra,
        provider: &dyn RatesProvider,
    ) -> PricerResult<PointSensitivities> {
        if fra.payment_date() < provider.valuation_date() {
            return Ok(PointSensitivities::empty());
        }
        let discount_factors = provider.discount_factors(fra.currency())?;
        let rates = provider.ibor_index_rates(fra.observation().index())?;
        let forward = rates.rate(fra.observation())?;
        let df = discount_factors.discount_factor(fra.payment_date());
        let notional = fra.notional();

        let forward_sensitivity = rates
            .rate_point_sensitivity(fra.observation())?
            .multiplied_by(notional * df * unit_amount_derivative(fra, forward));
        let discount_sensitivity = PointSensitivities::from(PointSensitivity::from(
            discount_factors
                .zero_rate_point_sensitivity(fra.payment_date(), fra.currency())
                .multiplied_by(notional * unit_amount(fra, forward)),
        ));
        Ok(forward_sensitivity.combined_with(&discount_sensitivity))
    }

    /// Returns the sensitivity of the par rate to the index rate.
    pub fn par_rate_sensitivity(
        &self,
        fra: &ResolvedFra,
        provider: &dyn RatesProvider,
    ) -> PricerResult<PointSensitivities> {
        Ok(provider
            .ibor_index_rates(fra.observation().index())?
            .rate_point_sensitivity(fra.observation())?)
    }
}

fn unit_amount(fra: &ResolvedFra, forward: f64) -> f64 {
    let tau = fra.year_fraction();
    match fra.discounting() {
        FraDiscounting::Isda => tau * (forward - fra.fixed_rate()) / (1.0 + tau * forward),
        FraDiscounting::None => tau * (forward - fra.fixed_rate()),
    }
}

fn unit_amount_derivative(fra: &ResolvedFra, forward: f64) -> f64 {
    let tau = fra.year_fraction();
    match fra.discounting() {
        FraDiscounting::Isda => {
            let denominator = 1.0 + tau * forward;
            tau * (1.0 + tau * fra.fixed_rate()) / (denominator * denominator)
        }
        FraDiscounting::None => tau,
    }
}
