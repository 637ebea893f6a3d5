//! Fee Fixtures

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{fees::FeeSchedule, fixtures::FixtureError, fixtures::baskets::parse_price};

/// Store fee schedule in YAML, every amount written as `AMOUNT CURRENCY`
#[derive(Debug, Deserialize)]
pub struct FeesFixture {
    /// Flat delivery fee
    pub delivery_fee: String,

    /// Subtotal at or above which delivery is free
    pub free_delivery_limit: String,

    /// Flat service fee
    pub service_fee: String,

    /// Minimum subtotal for delivery orders
    pub min_order: String,
}

impl FeesFixture {
    /// Convert to a fee schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount is malformed or the amounts use different currencies.
    pub fn into_schedule(self) -> Result<FeeSchedule<'static>, FixtureError> {
        let (delivery_fee, currency) = parse_price(&self.delivery_fee)?;
        let free_delivery_limit = amount_in(&self.free_delivery_limit, currency)?;
        let service_fee = amount_in(&self.service_fee, currency)?;
        let min_order = amount_in(&self.min_order, currency)?;

        Ok(FeeSchedule::new(
            currency,
            Decimal::new(delivery_fee, 2),
            free_delivery_limit,
            service_fee,
            min_order,
        ))
    }
}

fn amount_in(s: &str, currency: &'static Currency) -> Result<Decimal, FixtureError> {
    let (minor_units, found) = parse_price(s)?;

    if found != currency {
        return Err(FixtureError::CurrencyMismatch(
            currency.iso_alpha_code.to_string(),
            found.iso_alpha_code.to_string(),
        ));
    }

    Ok(Decimal::new(minor_units, 2))
}
