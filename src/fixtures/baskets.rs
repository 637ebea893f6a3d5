//! Basket Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;

use crate::{basket::OrderLine, fixtures::FixtureError};

/// Wrapper for basket lines in YAML
#[derive(Debug, Deserialize)]
pub struct BasketFixture {
    /// Basket lines in order
    pub lines: Vec<LineFixture>,
}

/// A basket line from YAML
#[derive(Debug, Deserialize)]
pub struct LineFixture {
    /// Product name
    pub name: String,

    /// Number of units, defaults to one
    #[serde(default = "one")]
    pub quantity: u32,

    /// Line total (e.g., "12.00 EUR")
    pub price: String,
}

fn one() -> u32 {
    1
}

impl BasketFixture {
    /// Convert to order lines and the currency they share.
    ///
    /// An empty basket is priced in euros.
    ///
    /// # Errors
    ///
    /// Returns an error if a price is malformed or lines are priced in different currencies.
    pub fn into_lines(self) -> Result<(Vec<OrderLine<'static>>, &'static Currency), FixtureError> {
        let mut currency: Option<&'static Currency> = None;
        let mut lines = Vec::with_capacity(self.lines.len());

        for line in self.lines {
            let (minor_units, line_currency) = parse_price(&line.price)?;

            match currency {
                Some(existing) if existing != line_currency => {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        line_currency.iso_alpha_code.to_string(),
                    ));
                }
                Some(_) => {}
                None => currency = Some(line_currency),
            }

            lines.push(OrderLine::new(
                line.name,
                line.quantity,
                Money::from_minor(minor_units, line_currency),
            ));
        }

        Ok((lines, currency.unwrap_or(iso::EUR)))
    }
}

/// Parse price string (e.g., "4.50 EUR") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not `AMOUNT CURRENCY` or the currency is not supported.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let minor_units = amount
        .parse::<Decimal>()
        .ok()
        .and_then(|value| value.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match code {
        "EUR" => iso::EUR,
        "GBP" => iso::GBP,
        "USD" => iso::USD,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}
