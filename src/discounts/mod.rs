//! Discounts
//!
//! Day- and spend-conditioned discount rules as configured by the store, and the two queries
//! run over them: picking the discount that applies to a basket, and listing every discount on
//! offer today with how far the basket is from unlocking it.

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::amounts::{format_money, min_money};

pub mod availability;
pub mod banner;
pub mod selection;

pub use availability::{DiscountAvailability, list_discount_availability};
pub use banner::featured_discount;
pub use selection::{AppliedDiscount, select_applicable_discount};

/// Errors specific to discount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// A rule amount and the subtotal are in different currencies (rule currency, subtotal currency).
    #[error("discount is priced in {0}, but the subtotal is in {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// How a discount reduces the subtotal.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DiscountKind<'a> {
    /// Take a percentage off the subtotal (e.g., "10% off")
    Percentage(Percentage),

    /// Take a fixed amount off the subtotal, never more than the subtotal (e.g., "€5 off")
    Fixed(Money<'a, Currency>),
}

/// Lower-cased weekday name a rule is restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayName(String);

impl DayName {
    /// Create a day name; matching ignores case and surrounding whitespace.
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    /// Whether this is the given day.
    pub fn matches(&self, day: &str) -> bool {
        self.0 == day.trim().to_lowercase()
    }

    /// The day with its first letter capitalised, e.g. `Monday`.
    pub fn capitalised(&self) -> String {
        let mut chars = self.0.chars();

        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }
}

impl fmt::Display for DayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A store discount rule.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountRule<'a> {
    id: u64,
    name: String,
    kind: DiscountKind<'a>,
    minimum_purchase: Option<Money<'a, Currency>>,
    days: SmallVec<[DayName; 7]>,
}

impl<'a> DiscountRule<'a> {
    /// Create a rule with no minimum spend that applies every day.
    pub fn new(id: u64, name: impl Into<String>, kind: DiscountKind<'a>) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            minimum_purchase: None,
            days: SmallVec::new(),
        }
    }

    /// Require the subtotal to reach `minimum` before the rule applies.
    #[must_use]
    pub fn with_minimum_purchase(mut self, minimum: Money<'a, Currency>) -> Self {
        self.minimum_purchase = Some(minimum);
        self
    }

    /// Restrict the rule to the given weekdays. An empty list means every day.
    #[must_use]
    pub fn with_days<I, S>(mut self, days: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.days = days
            .into_iter()
            .map(|day| DayName::new(day.as_ref()))
            .collect();
        self
    }

    /// Rule identifier
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Rule name shown to customers
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Discount kind and value
    pub fn kind(&self) -> &DiscountKind<'a> {
        &self.kind
    }

    /// Minimum subtotal, if one was set
    pub fn minimum_purchase(&self) -> Option<&Money<'a, Currency>> {
        self.minimum_purchase.as_ref()
    }

    /// Weekdays the rule is restricted to; empty means every day
    pub fn days(&self) -> &[DayName] {
        &self.days
    }

    /// Whether the rule applies on the given weekday name (case-insensitive).
    pub fn applies_on(&self, day: &str) -> bool {
        self.days.is_empty() || self.days.iter().any(|d| d.matches(day))
    }

    /// Minimum spend in minor units, zero when there is none.
    pub(crate) fn minimum_minor(&self) -> i64 {
        self.minimum_purchase
            .as_ref()
            .map_or(0, Money::to_minor_units)
    }

    /// Minimum spend as money in the subtotal's currency, zero when there is none.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::CurrencyMismatch`] if the minimum is in another currency.
    pub fn minimum_for(
        &self,
        subtotal: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, DiscountError> {
        match &self.minimum_purchase {
            Some(minimum) => {
                ensure_currency(minimum, subtotal)?;
                Ok(*minimum)
            }
            None => Ok(Money::from_minor(0, subtotal.currency())),
        }
    }

    /// Whether `subtotal` reaches the minimum spend.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::CurrencyMismatch`] if the minimum is in another currency.
    pub fn meets_minimum(&self, subtotal: &Money<'a, Currency>) -> Result<bool, DiscountError> {
        let minimum = self.minimum_for(subtotal)?;

        Ok(subtotal.to_minor_units() >= minimum.to_minor_units())
    }

    /// Amount this rule takes off `subtotal`.
    ///
    /// Percentages are rounded to whole minor units; fixed amounts are capped at the subtotal.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the percentage calculation cannot be represented (`DiscountError::PercentConversion`).
    /// - a fixed amount is in another currency (`DiscountError::CurrencyMismatch`).
    pub fn discount_on(
        &self,
        subtotal: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, DiscountError> {
        match &self.kind {
            DiscountKind::Percentage(percent) => {
                let minor = percent_of_minor(percent, subtotal.to_minor_units())?;

                Ok(Money::from_minor(minor, subtotal.currency()))
            }
            DiscountKind::Fixed(amount) => {
                ensure_currency(amount, subtotal)?;

                Ok(min_money(*amount, *subtotal))
            }
        }
    }

    /// Short headline, e.g. `10% OFF` or `€5.00 OFF`.
    pub fn headline(&self) -> String {
        match &self.kind {
            DiscountKind::Percentage(percent) => {
                format!("{}% OFF", percent_points(percent))
            }
            DiscountKind::Fixed(amount) => format!("{} OFF", format_money(amount)),
        }
    }
}

/// Rules that apply on `day`, in their original order.
pub fn day_eligible<'r, 'a>(
    rules: &'r [DiscountRule<'a>],
    day: &str,
) -> impl Iterator<Item = &'r DiscountRule<'a>> {
    rules.iter().filter(move |rule| rule.applies_on(day))
}

/// Percentage expressed in points, e.g. `10` for 10%.
pub fn percent_points(percent: &Percentage) -> Decimal {
    ((*percent) * Decimal::ONE_HUNDRED).round_dp(4).normalize()
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns an error if:
/// - The percentage calculation overflows or cannot be safely represented (`DiscountError::PercentConversion`).
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE)
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

fn ensure_currency(
    amount: &Money<'_, Currency>,
    subtotal: &Money<'_, Currency>,
) -> Result<(), DiscountError> {
    if amount.currency() == subtotal.currency() {
        Ok(())
    } else {
        Err(DiscountError::CurrencyMismatch(
            amount.currency().iso_alpha_code,
            subtotal.currency().iso_alpha_code,
        ))
    }
}
