//! Discounting pricer for FX exchanges.

use meridian_core::types::{FxRate, FxRateProvider};
use meridian_core::{CurrencyAmount, MultiCurrencyAmount};
use meridian_curves::provider::RatesProvider;
use meridian_curves::sensitivity::{PointSensitivities, PointSensitivity};

use crate::error::{PricerError, PricerResult};
use crate::product::ResolvedFxSingle;

/// Prices FX exchanges by discounting each payment in its own currency.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscountingFxSingleProductPricer;

impl DiscountingFxSingleProductPricer {
    /// Creates a pricer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the present value of both payments, each in its currency.
    pub fn present_value(
        &self,
        fx: &ResolvedFxSingle,
        provider: &dyn RatesProvider,
    ) -> PricerResult<MultiCurrencyAmount> {
        if fx.payment_date() < provider.valuation_date() {
            return Ok(MultiCurrencyAmount::empty());
        }
        Ok(MultiCurrencyAmount::of([
            self.payment_present_value(fx.base_payment(), fx, provider)?,
            self.payment_present_value(fx.counter_payment(), fx, provider)?,
        ]))
    }

    fn payment_present_value(
        &self,
        payment: CurrencyAmount,
        fx: &ResolvedFxSingle,
        provider: &dyn RatesProvider,
    ) -> PricerResult<CurrencyAmount> {
        let df = provider
            .discount_factors(payment.currency())?
            .discount_factor(fx.payment_date());
        Ok(payment.multiplied_by(df))
    }

    /// Returns the currency exposure, equal to the present value for a
    /// discounted exchange.
    pub fn currency_exposure(
        &self,
        fx: &ResolvedFxSingle,
        provider: &dyn RatesProvider,
    ) -> PricerResult<MultiCurrencyAmount> {
        self.present_value(fx, provider)
    }

    /// Returns both payments if they are made on the valuation date.
    pub fn current_cash(
        &self,
        fx: &ResolvedFxSingle,
        provider: &dyn RatesProvider,
    ) -> PricerResult<MultiCurrencyAmount> {
        if fx.payment_date() != provider.valuation_date() {
            return Ok(MultiCurrencyAmount::empty());
        }
        Ok(MultiCurrencyAmount::of([fx.base_payment(), fx.counter_payment()]))
    }

    /// Returns the forward rate of the currency pair for the payment date.
    ///
    /// ```text
    /// forward = spot × DF_base(payment) / DF_counter(payment)
    /// ```
    pub fn forward_fx_rate(
        &self,
        fx: &ResolvedFxSingle,
        provider: &dyn RatesProvider,
    ) -> PricerResult<FxRate> {
        let pair = fx.currency_pair();
        let spot = provider.fx_rate(pair.base(), pair.counter())?;
        let df_base = provider
            .discount_factors(pair.base())?
            .discount_factor(fx.payment_date());
        let df_counter = provider
            .discount_factors(pair.counter())?
            .discount_factor(fx.payment_date());
        Ok(FxRate::new(pair, spot * df_base / df_counter)?)
    }

    /// Returns the forward rate less the contracted rate.
    ///
    /// # Errors
    ///
    /// Returns `PricerError::InvalidProduct` if the base amount is zero.
    pub fn par_spread(
        &self,
        fx: &ResolvedFxSingle,
        provider: &dyn RatesProvider,
    ) -> PricerResult<f64> {
        let base = fx.base_payment().amount();
        if base == 0.0 {
            return Err(PricerError::invalid_product("FX exchange has a zero base amount"));
        }
        let contract_rate = -fx.counter_payment().amount() / base;
        Ok(self.forward_fx_rate(fx, provider)?.rate() - contract_rate)
    }

    /// Returns the sensitivity of the present value to the discount rates
    /// of both currencies.
    pub fn present_value_sensitivity(
        &self,
        fx: &ResolvedFxSingle,
        provider: &dyn RatesProvider,
    ) -> PricerResult<PointSensitivities> {
        if fx.payment_date() < provider.valuation_date() {
            return Ok(PointSensitivities::empty());
        }
        [fx.base_payment(), fx.counter_payment()]
            .into_iter()
            .map(|payment| {
                let sensitivity = provider
                    .discount_factors(payment.currency())?
                    .zero_rate_point_sensitivity(fx.payment_date(), payment.currency())
                    .multiplied_by(payment.amount());
                Ok(PointSensitivity::from(sensitivity))
            })
            .collect::<PricerResult<Vec<_>>>()
            .map(PointSensitivities::of)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::FxSingle;
    use crate::test_support::{date, flat_curve, valuation};
    use approx::assert_relative_eq;
    use meridian_core::{Currency, CurrencyPair};
    use meridian_curves::provider::ImmutableRatesProvider;

    fn provider() -> ImmutableRatesProvider {
        ImmutableRatesProvider::builder(valuation())
            .discount_curve(Currency::EUR, flat_curve("EUR-Disc", 0.02))
            .discount_curve(Currency::USD, flat_curve("USD-Disc", 0.04))
            .fx_rate(FxRate::new(CurrencyPair::new(Currency::EUR, Currency::USD), 1.10).unwrap())
            .build()
    }

    fn fx(rate: f64) -> ResolvedFxSingle {
        let rate = FxRate::new(CurrencyPair::new(Currency::EUR, Currency::USD), rate).unwrap();
        FxSingle::of(CurrencyAmount::new(Currency::EUR, 1_000_000.0), &rate, date(2025, 6, 16))
            .unwrap()
            .resolve()
    }

    #[test]
    fn test_forward_rate_has_zero_value() {
        let provider = provider();
        let pricer = DiscountingFxSingleProductPricer::new();
        let forward = pricer.forward_fx_rate(&fx(1.0), &provider).unwrap();
        assert!(forward.rate() > 1.10);

        let at_forward = fx(forward.rate());
        let pv = pricer.present_value(&at_forward, &provider).unwrap();
        let total = pv.total(Currency::USD, &provider).unwrap();
        assert_relative_eq!(total.amount(), 0.0, epsilon = 1e-6);
        let spread = pricer.par_spread(&at_forward, &provider).unwrap();
        assert_relative_eq!(spread, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_present_value_per_currency() {
        let provider = provider();
        let pricer = DiscountingFxSingleProductPricer::new();
        let fx = fx(1.12);
        let pv = pricer.present_value(&fx, &provider).unwrap();
        let df_eur = provider
            .discount_factors(Currency::EUR)
            .unwrap()
            .discount_factor(fx.payment_date());
        assert_relative_eq!(pv.amount(Currency::EUR), 1_000_000.0 * df_eur, epsilon = 1e-8);
        assert!(pv.amount(Currency::USD) < 0.0);
        assert_eq!(pricer.currency_exposure(&fx, &provider).unwrap(), pv);
        assert!(pricer.current_cash(&fx, &provider).unwrap().is_empty());
    }

    #[test]
    fn test_sensitivity_per_curve() {
        let provider = provider();
        let pricer = DiscountingFxSingleProductPricer::new();
        let points = pricer.present_value_sensitivity(&fx(1.12), &provider).unwrap();
        let sensitivities = provider.parameter_sensitivity(&points).unwrap();
        assert_eq!(sensitivities.len(), 2);
        let eur = sensitivities
            .entries()
            .iter()
            .find(|e| e.currency() == Currency::EUR)
            .unwrap();
        assert!(eur.total() < 0.0);
    }
}
