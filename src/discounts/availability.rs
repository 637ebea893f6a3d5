//! Discount availability
//!
//! Read-only report behind "spend €X more to unlock Y% off". It never feeds back into
//! [`select_applicable_discount`](super::select_applicable_discount).

use rusty_money::{Money, iso::Currency};

use crate::amounts::shortfall;

use super::{DiscountError, DiscountRule, day_eligible};

/// A discount on offer today and how far the subtotal is from it.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountAvailability<'r, 'a> {
    /// The rule on offer
    pub rule: &'r DiscountRule<'a>,

    /// Whether the subtotal reaches the rule's minimum spend
    pub meets_requirement: bool,

    /// How much more to spend, zero when the requirement is met
    pub amount_needed: Money<'a, Currency>,
}

/// List every rule that applies on `day`, in list order, with its eligibility.
///
/// Rules restricted to other days are left out entirely, even as upsells.
///
/// # Errors
///
/// Returns a [`DiscountError`] if a minimum spend is in another currency than the subtotal.
pub fn list_discount_availability<'r, 'a>(
    rules: &'r [DiscountRule<'a>],
    subtotal: &Money<'a, Currency>,
    day: &str,
) -> Result<Vec<DiscountAvailability<'r, 'a>>, DiscountError> {
    day_eligible(rules, day)
        .map(|rule| {
            let minimum = rule.minimum_for(subtotal)?;

            Ok(DiscountAvailability {
                rule,
                meets_requirement: subtotal.to_minor_units() >= minimum.to_minor_units(),
                amount_needed: shortfall(&minimum, subtotal),
            })
        })
        .collect()
}

/// Only the discounts the subtotal does not reach yet.
pub fn upsells<'x, 'r, 'a>(
    availability: &'x [DiscountAvailability<'r, 'a>],
) -> impl Iterator<Item = &'x DiscountAvailability<'r, 'a>> {
    availability.iter().filter(|entry| !entry.meets_requirement)
}
