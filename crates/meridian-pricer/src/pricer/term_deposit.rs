//! Discounting pricer for term deposits.

use meridian_core::{CurrencyAmount, Date};
use meridian_curves::provider::RatesProvider;
use meridian_curves::rates::DiscountFactors;
use meridian_curves::sensitivity::{PointSensitivities, PointSensitivity};

use crate::error::PricerResult;
use crate::product::ResolvedTermDeposit;

/// Prices term deposits by discounting both payments.
///
/// The initial payment is ignored once the start date has passed, and a
/// deposit that has matured is worth zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscountingTermDepositProductPricer;

impl DiscountingTermDepositProductPricer {
    /// Creates a pricer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the present value.
    pub fn present_value(
        &self,
        deposit: &ResolvedTermDeposit,
        provider: &dyn RatesProvider,
    ) -> PricerResult<CurrencyAmount> {
        let currency = deposit.currency();
        let valuation_date = provider.valuation_date();
        if valuation_date > deposit.end_date() {
            return Ok(CurrencyAmount::zero(currency));
        }
        let dfs = provider.discount_factors(currency)?;
        let pv_end = end_amount(deposit) * dfs.discount_factor(deposit.end_date());
        let pv_start =
            initial_amount(deposit, valuation_date) * dfs.discount_factor(deposit.start_date());
        Ok(CurrencyAmount::new(currency, pv_end - pv_start))
    }

    /// Returns the payment made or received on the valuation date.
    pub fn current_cash(
        &self,
        deposit: &ResolvedTermDeposit,
        provider: &dyn RatesProvider,
    ) -> PricerResult<CurrencyAmount> {
        let valuation_date = provider.valuation_date();
        let mut cash = 0.0;
        if deposit.start_date() == valuation_date {
            cash -= deposit.notional();
        }
        if deposit.end_date() == valuation_date {
            cash += end_amount(deposit);
        }
        Ok(CurrencyAmount::new(deposit.currency(), cash))
    }

    /// Returns the deposit rate giving a present value of zero.
    pub fn par_rate(
        &self,
        deposit: &ResolvedTermDeposit,
        provider: &dyn RatesProvider,
    ) -> PricerResult<f64> {
        let dfs = provider.discount_factors(deposit.currency())?;
        let df_start = dfs.discount_factor(deposit.start_date());
        let df_end = dfs.discount_factor(deposit.end_date());
        Ok((df_start / df_end - 1.0) / deposit.year_fraction())
    }

    /// Returns the par rate less the deposit rate.
    pub fn par_spread(
        &self,
        deposit: &ResolvedTermDeposit,
        provider: &dyn RatesProvider,
    ) -> PricerResult<f64> {
        Ok(self.par_rate(deposit, provider)? - deposit.rate())
    }

    /// Returns the sensitivity of the present value to the discount rates.
    pub fn present_value_sensitivity(
        &self,
        deposit: &ResolvedTermDeposit,
        provider: &dyn RatesProvider,
    ) -> PricerResult<PointSensitivities> {
        let valuation_date = provider.valuation_date();
        if valuation_date > deposit.end_date() {
            return Ok(PointSensitivities::empty());
        }
        let dfs = provider.discount_factors(deposit.currency())?;
        Ok(point_sensitivities(
            &dfs,
            deposit,
            -initial_amount(deposit, valuation_date),
            end_amount(deposit),
        ))
    }

    /// Returns the sensitivity of the par rate to the discount rates.
    pub fn par_rate_sensitivity(
        &self,
        deposit: &ResolvedTermDeposit,
        provider: &dyn RatesProvider,
    ) -> PricerResult<PointSensitivities> {
        let dfs = provider.discount_factors(deposit.currency())?;
        let df_start = dfs.discount_factor(deposit.start_date());
        let df_end = dfs.discount_factor(deposit.end_date());
        let tau = deposit.year_fraction();
        Ok(point_sensitivities(
            &dfs,
            deposit,
            1.0 / (tau * df_end),
            -df_start / (tau * df_end * df_end),
        ))
    }
}

fn initial_amount(deposit: &ResolvedTermDeposit, valuation_date: Date) -> f64 {
    if valuation_date > deposit.start_date() {
        0.0
    } else {
        deposit.notional()
    }
}

fn end_amount(deposit: &ResolvedTermDeposit) -> f64 {
    deposit.notional() + deposit.interest()
}

/// Zero rate sensitivities of `a × DF(start) + b × DF(end)`.
fn point_sensitivities(
    dfs: &DiscountFactors,
    deposit: &ResolvedTermDeposit,
    start_factor: f64,
    end_factor: f64,
) -> PointSensitivities {
    let currency = deposit.currency();
    let start = dfs
        .zero_rate_point_sensitivity(deposit.start_date(), currency)
        .multiplied_by(start_factor);
    let end = dfs
        .zero_rate_point_sensitivity(deposit.end_date(), currency)
        .multiplied_by(end_factor);
    PointSensitivities::of([PointSensitivity::from(start), PointSensitivity::from(end)])
}
