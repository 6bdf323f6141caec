//! Locating curves and fixings in market data.

use std::any::Any;
use std::collections::BTreeMap;

use tracing::trace;

use meridian_calc::parameters::CalculationParameter;
use meridian_calc::requirements::FunctionRequirements;
use meridian_core::{Currency, CurrencyPair};
use meridian_curves::curve::CurveId;
use meridian_curves::definition::CurveGroupDefinition;
use meridian_curves::index::IborIndex;
use meridian_curves::provider::ImmutableRatesProvider;
use meridian_market::{FxRateId, MarketData, MarketDataExt, MarketDataFxRateProvider, TimeSeriesId};

use crate::error::{PricerError, PricerResult};

/// Tells rates functions which market data holds the curves they need.
///
/// Discount curves are keyed by currency and forward curves by index. Each
/// index also names the time series holding its fixings, by default the
/// index's own [`IborIndex::time_series_id`].
///
/// # Example
///
/// ```rust
/// use meridian_core::Currency;
/// use meridian_curves::curve::{CurveId, CurveName};
/// use meridian_curves::index::IborIndex;
/// use meridian_pricer::lookup::RatesMarketDataLookup;
///
/// let lookup = RatesMarketDataLookup::of(
///     [(Currency::USD, CurveId::new("Default", CurveName::new("USD-Disc")))],
///     [(IborIndex::usd_libor_3m(), CurveId::new("Default", CurveName::new("USD-3M")))],
/// );
/// let requirements = lookup
///     .requirements([Currency::USD], [&IborIndex::usd_libor_3m()])
///     .unwrap();
/// assert_eq!(requirements.value_requirements().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatesMarketDataLookup {
    discount_curves: BTreeMap<Currency, CurveId>,
    forward_curves: BTreeMap<IborIndex, CurveId>,
    fixings: BTreeMap<IborIndex, TimeSeriesId>,
}

impl CalculationParameter for RatesMarketDataLookup {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RatesMarketDataLookup {
    /// Creates a lookup from discount and forward curve identifiers.
    #[must_use]
    pub fn of(
        discount_curves: impl IntoIterator<Item = (Currency, CurveId)>,
        forward_curves: impl IntoIterator<Item = (IborIndex, CurveId)>,
    ) -> Self {
        let forward_curves: BTreeMap<_, _> = forward_curves.into_iter().collect();
        let fixings = forward_curves
            .keys()
            .map(|index| (index.clone(), index.time_series_id()))
            .collect();
        Self {
            discount_curves: discount_curves.into_iter().collect(),
            forward_curves,
            fixings,
        }
    }

    /// Creates a lookup for the curves a group calibrates.
    #[must_use]
    pub fn of_group(group: &CurveGroupDefinition) -> Self {
        let mut discount_curves = Vec::new();
        let mut forward_curves = Vec::new();
        for entry in group.entries() {
            let id = CurveId::new(group.name(), entry.curve_name().clone());
            discount_curves
                .extend(entry.discount_currencies().iter().map(|ccy| (*ccy, id.clone())));
            forward_curves
                .extend(entry.indices().iter().map(|index| (index.clone(), id.clone())));
        }
        Self::of(discount_curves, forward_curves)
    }

    /// Reads the fixings of an index from a different time series.
    #[must_use]
    pub fn with_fixings(mut self, index: IborIndex, id: TimeSeriesId) -> Self {
        self.fixings.insert(index, id);
        self
    }

    /// Returns the discount curve identifiers.
    #[must_use]
    pub fn discount_curves(&self) -> &BTreeMap<Currency, CurveId> {
        &self.discount_curves
    }

    /// Returns the forward curve identifiers.
    #[must_use]
    pub fn forward_curves(&self) -> &BTreeMap<IborIndex, CurveId> {
        &self.forward_curves
    }

    /// Returns the discount curve of a currency.
    pub fn discount_curve_id(&self, currency: Currency) -> PricerResult<&CurveId> {
        self.discount_curves
            .get(&currency)
            .ok_or_else(|| PricerError::lookup_not_configured(currency))
    }

    /// Returns the forward curve of an index.
    pub fn forward_curve_id(&self, index: &IborIndex) -> PricerResult<&CurveId> {
        self.forward_curves
            .get(index)
            .ok_or_else(|| PricerError::lookup_not_configured(index))
    }

    /// Returns the market data needed to price in the given currencies and
    /// indices.
    ///
    /// # Errors
    ///
    /// Returns `PricerError::LookupNotConfigured` for a currency or index
    /// without a curve.
    pub fn requirements<'a>(
        &self,
        currencies: impl IntoIterator<Item = Currency>,
        indices: impl IntoIterator<Item = &'a IborIndex>,
    ) -> PricerResult<FunctionRequirements> {
        let mut builder = FunctionRequirements::builder();
        for currency in currencies {
            builder = builder
                .value(self.discount_curve_id(currency)?)
                .output_currency(currency);
        }
        for index in indices {
            builder = builder.value(self.forward_curve_id(index)?);
            if let Some(fixings) = self.fixings.get(index) {
                builder = builder.time_series(fixings.clone());
            }
        }
        Ok(builder.build())
    }

    /// Builds a rates provider from the curves of one scenario.
    ///
    /// Curves absent from the market data are left out, so pricing fails
    /// only for the products that need them. FX rates between the discount
    /// currencies are included when present, quoted either way round. Fixing
    /// series share their storage with the market data.
    #[must_use]
    pub fn rates_provider(&self, market_data: &dyn MarketData) -> ImmutableRatesProvider {
        let mut builder = ImmutableRatesProvider::builder(market_data.valuation_date());
        for (currency, id) in &self.discount_curves {
            if let Some(curve) = market_data.find_value(id) {
                builder = builder.discount_curve(*currency, curve);
            }
        }
        for (index, id) in &self.forward_curves {
            if let Some(curve) = market_data.find_value(id) {
                builder = builder.ibor_index_curve(index.clone(), curve);
            }
        }
        for (index, id) in &self.fixings {
            if let Some(series) = market_data.find_time_series(id) {
                builder = builder.time_series(index.clone(), series.clone());
            }
        }
        let currencies: Vec<Currency> = self.discount_curves.keys().copied().collect();
        for (i, base) in currencies.iter().enumerate() {
            for counter in &currencies[i + 1..] {
                let pair = CurrencyPair::new(*base, *counter);
                let rate = market_data
                    .find_value(&FxRateId::new(pair))
                    .or_else(|| market_data.find_value(&FxRateId::new(pair.inverse())));
                if let Some(rate) = rate {
                    trace!(pair = %pair, "adding FX rate to rates provider");
                    builder = builder.fx_rate(rate);
                }
            }
        }
        builder.build()
    }

    /// Returns an FX rate provider over one scenario.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn fx_rate_provider<'a>(
        &self,
        market_data: &'a dyn MarketData,
    ) -> MarketDataFxRateProvider<'a, dyn MarketData + 'a> {
        MarketDataFxRateProvider::new(market_data)
    }
}
