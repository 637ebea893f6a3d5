//! Applicable discount selection

use rusty_money::{Money, iso::Currency};
use tracing::trace;

use super::{DiscountError, DiscountRule, day_eligible};

/// The discount applied to a subtotal, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedDiscount<'r, 'a> {
    /// The winning rule, `None` when nothing applies
    pub rule: Option<&'r DiscountRule<'a>>,

    /// Amount taken off the subtotal, zero when nothing applies
    pub amount: Money<'a, Currency>,
}

impl<'a> AppliedDiscount<'_, 'a> {
    /// No discount in the subtotal's currency.
    pub fn none(subtotal: &Money<'a, Currency>) -> Self {
        Self {
            rule: None,
            amount: Money::from_minor(0, subtotal.currency()),
        }
    }
}

/// Pick the discount that applies to `subtotal` on `day`.
///
/// A rule qualifies when it applies on `day` and the subtotal reaches its minimum spend. The
/// first qualifying rule in list order wins, even when a later one would take off more: the
/// order the store returns its discounts in is their priority.
///
/// # Errors
///
/// Returns a [`DiscountError`] if a rule amount is in another currency than the subtotal, or if
/// a percentage cannot be represented in minor units.
pub fn select_applicable_discount<'r, 'a>(
    rules: &'r [DiscountRule<'a>],
    subtotal: &Money<'a, Currency>,
    day: &str,
) -> Result<AppliedDiscount<'r, 'a>, DiscountError> {
    for rule in day_eligible(rules, day) {
        if !rule.meets_minimum(subtotal)? {
            trace!(rule_id = rule.id(), "minimum spend not met");
            continue;
        }

        let amount = rule.discount_on(subtotal)?;

        trace!(rule_id = rule.id(), amount = amount.to_minor_units(), "discount applies");

        return Ok(AppliedDiscount {
            rule: Some(rule),
            amount,
        });
    }

    Ok(AppliedDiscount::none(subtotal))
}
