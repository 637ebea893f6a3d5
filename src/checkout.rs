//! Checkout
//!
//! [`Quote::build`] is the one place a basket is priced. The basket sidebar, the mobile drawer,
//! the checkout summary and checkout submission all build a quote from the same inputs and read
//! the figures off it.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::warn;

use crate::{
    amounts::to_decimal,
    basket::{Basket, BasketError},
    discounts::{
        AppliedDiscount, DiscountAvailability, DiscountError, DiscountRule,
        availability::upsells, list_discount_availability, select_applicable_discount,
    },
    fees::{
        DeliveryMode, FeeSchedule, FeeSource, FreeDeliveryProgress, MinimumOrderGate,
        PricingError, PricingResult, compute_fees, free_delivery_progress, minimum_order_gate,
    },
};

/// Errors raised while quoting or submitting an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Basket subtotal could not be calculated.
    #[error(transparent)]
    Basket(#[from] BasketError),

    /// Fee calculation failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Discount calculation failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Delivery order below the minimum order value.
    #[error(
        "Minimum order value for delivery is {symbol}{minimum:.2}. Your order total is \
         {symbol}{subtotal:.2}. Please add {symbol}{shortfall:.2} more to proceed."
    )]
    BelowMinimumOrder {
        /// Currency symbol used in the message
        symbol: &'static str,
        /// Minimum order value
        minimum: Decimal,
        /// Current subtotal
        subtotal: Decimal,
        /// Amount still to add
        shortfall: Decimal,
    },

    /// There is nothing in the basket.
    #[error("Order must contain at least one item")]
    EmptyBasket,

    /// The order total is zero or less.
    #[error("Invalid total price")]
    NonPositiveTotal,

    /// Delivery was requested without an address.
    #[error("Delivery address is required")]
    MissingAddress,
}

/// Everything needed to price a basket.
#[derive(Debug, Clone, Copy)]
pub struct QuoteInputs<'r, 'a> {
    /// Store fee schedule, `None` while it is not loaded
    pub schedule: Option<&'r FeeSchedule<'a>>,

    /// Active discounts in API order, empty while not loaded
    pub rules: &'r [DiscountRule<'a>],

    /// The live basket
    pub basket: &'r Basket<'a>,

    /// Delivery or collection
    pub mode: DeliveryMode,

    /// Weekday the order is fulfilled on, e.g. `Friday`
    pub day: &'r str,
}

/// A priced basket.
#[derive(Debug, Clone)]
pub struct Quote<'r, 'a> {
    /// Fulfilment mode the quote was built for
    pub mode: DeliveryMode,

    /// Sum of the basket lines
    pub subtotal: Money<'a, Currency>,

    /// Number of basket lines
    pub line_count: usize,

    /// The discount taken off the subtotal
    pub discount: AppliedDiscount<'r, 'a>,

    /// Fees and total
    pub pricing: PricingResult<'a>,

    /// Discounts on offer for the day, with their shortfall
    pub availability: Vec<DiscountAvailability<'r, 'a>>,

    /// Progress towards free delivery
    pub free_delivery: FreeDeliveryProgress<'a>,

    /// Minimum-order admission
    pub minimum_order: MinimumOrderGate<'a>,
}

impl<'r, 'a> Quote<'r, 'a> {
    /// Price a basket.
    ///
    /// An empty basket gets no discount and no upsells; a missing fee schedule falls back to the
    /// built-in fees and is logged as such.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if the basket, schedule and rules are priced in different
    /// currencies.
    #[tracing::instrument(
        name = "checkout.quote",
        skip_all,
        fields(
            mode = ?inputs.mode,
            day = inputs.day,
            lines = inputs.basket.len(),
            rules = inputs.rules.len(),
        )
    )]
    pub fn build(inputs: &QuoteInputs<'r, 'a>) -> Result<Self, CheckoutError> {
        let subtotal = inputs.basket.subtotal()?;
        let priced = subtotal.to_minor_units() > 0;

        let discount = if priced {
            select_applicable_discount(inputs.rules, &subtotal, inputs.day)?
        } else {
            AppliedDiscount::none(&subtotal)
        };

        let pricing = compute_fees(inputs.schedule, subtotal, inputs.mode, discount.amount)?;

        if pricing.fee_source == FeeSource::Fallback {
            warn!(
                fee_source = pricing.fee_source.as_str(),
                "fee schedule unavailable; quoting with fallback fees"
            );
        }

        let availability = if priced {
            list_discount_availability(inputs.rules, &subtotal, inputs.day)?
        } else {
            Vec::new()
        };

        let free_delivery = free_delivery_progress(inputs.schedule, subtotal, inputs.mode)?;
        let minimum_order = minimum_order_gate(inputs.schedule, subtotal, inputs.mode)?;

        Ok(Self {
            mode: inputs.mode,
            subtotal,
            line_count: inputs.basket.len(),
            discount,
            pricing,
            availability,
            free_delivery,
            minimum_order,
        })
    }

    /// Final amount to pay
    pub fn total(&self) -> Money<'a, Currency> {
        self.pricing.total
    }

    /// Whether the checkout button is enabled.
    pub fn can_proceed(&self) -> bool {
        self.minimum_order.can_proceed
    }

    /// Discounts on offer that the basket does not reach yet.
    pub fn upsells(&self) -> impl Iterator<Item = &DiscountAvailability<'r, 'a>> {
        upsells(&self.availability)
    }

    /// Whether the fees shown are the fallback fees.
    pub fn uses_fallback_fees(&self) -> bool {
        self.pricing.fee_source == FeeSource::Fallback
    }
}

/// Customer details checked on submission.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionDetails<'s> {
    /// Delivery address, required for delivery
    pub address: Option<&'s str>,
}

/// Admit or reject an order at submission.
///
/// Runs the same minimum-order gate the basket's checkout button uses, then the order sanity
/// checks.
///
/// # Errors
///
/// Returns, in order of precedence:
/// - [`CheckoutError::BelowMinimumOrder`] when a delivery order is below the minimum.
/// - [`CheckoutError::EmptyBasket`] when there are no lines.
/// - [`CheckoutError::NonPositiveTotal`] when the total is not positive.
/// - [`CheckoutError::MissingAddress`] when delivering without an address.
pub fn validate_submission(
    quote: &Quote<'_, '_>,
    details: &SubmissionDetails<'_>,
) -> Result<(), CheckoutError> {
    if !quote.can_proceed() {
        return Err(CheckoutError::BelowMinimumOrder {
            symbol: quote.subtotal.currency().symbol,
            minimum: to_decimal(&quote.minimum_order.minimum),
            subtotal: to_decimal(&quote.subtotal),
            shortfall: to_decimal(&quote.minimum_order.shortfall),
        });
    }

    if quote.line_count == 0 {
        return Err(CheckoutError::EmptyBasket);
    }

    if quote.total().to_minor_units() <= 0 {
        return Err(CheckoutError::NonPositiveTotal);
    }

    let has_address = details.address.is_some_and(|address| !address.trim().is_empty());

    if quote.mode == DeliveryMode::Delivery && !has_address {
        return Err(CheckoutError::MissingAddress);
    }

    Ok(())
}
