//! Basket

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors related to basket construction or totals.
#[derive(Debug, Error)]
pub enum BasketError {
    /// A line's currency differs from the basket currency (index, line currency, basket currency).
    #[error("Line {0} has currency {1}, but basket has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A single order line, already priced with its size and extras.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine<'a> {
    name: String,
    quantity: u32,
    total_price: Money<'a, Currency>,
}

impl<'a> OrderLine<'a> {
    /// Create a new order line.
    pub fn new(name: impl Into<String>, quantity: u32, total_price: Money<'a, Currency>) -> Self {
        Self {
            name: name.into(),
            quantity,
            total_price,
        }
    }

    /// Display name of the line
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of units on the line
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Line total, quantity and extras included
    pub fn total_price(&self) -> &Money<'a, Currency> {
        &self.total_price
    }
}

/// Basket
///
/// The subtotal is always derived from the lines; it is never stored on its own.
#[derive(Debug, Clone)]
pub struct Basket<'a> {
    lines: Vec<OrderLine<'a>>,
    currency: &'a Currency,
}

impl<'a> Basket<'a> {
    /// Create a new, empty basket.
    pub fn new(currency: &'a Currency) -> Self {
        Basket {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a new basket with the given lines.
    ///
    /// # Errors
    ///
    /// Returns a `BasketError` if there was a currency mismatch error.
    pub fn with_lines(
        lines: impl Into<Vec<OrderLine<'a>>>,
        currency: &'a Currency,
    ) -> Result<Self, BasketError> {
        let lines = lines.into();

        lines
            .iter()
            .enumerate()
            .try_for_each(|(i, line)| ensure_currency(i, line, currency))?;

        Ok(Basket { lines, currency })
    }

    /// Add a line to the basket.
    ///
    /// # Errors
    ///
    /// Returns a `BasketError` if the line is priced in another currency.
    pub fn push(&mut self, line: OrderLine<'a>) -> Result<(), BasketError> {
        ensure_currency(self.lines.len(), &line, self.currency)?;

        self.lines.push(line);

        Ok(())
    }

    /// Calculate the subtotal of the basket.
    ///
    /// # Errors
    ///
    /// Returns a `BasketError` if there was a money arithmetic error.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, BasketError> {
        let subtotal = self.lines.iter().try_fold(
            Money::from_minor(0, self.currency),
            |acc, line| acc.add(line.total_price),
        )?;

        Ok(subtotal)
    }

    /// Lines in the order they were added.
    pub fn lines(&self) -> &[OrderLine<'a>] {
        &self.lines
    }

    /// Get the number of lines in the basket.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the basket is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the basket.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }
}

fn ensure_currency(
    index: usize,
    line: &OrderLine<'_>,
    currency: &Currency,
) -> Result<(), BasketError> {
    let line_currency = line.total_price.currency();

    if line_currency == currency {
        Ok(())
    } else {
        Err(BasketError::CurrencyMismatch(
            index,
            line_currency.iso_alpha_code,
            currency.iso_alpha_code,
        ))
    }
}
