//! Fees
//!
//! Delivery and service fees, the free-delivery threshold and the minimum-order gate. Every
//! surface that shows a total (basket sidebar, mobile drawer, checkout summary and checkout
//! submission) goes through [`compute_fees`] so they can never disagree.

use std::borrow::Cow;

use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::amounts::{shortfall, to_non_negative_money, zero};

/// Service fee used while the fee schedule is unavailable.
pub const FALLBACK_SERVICE_FEE: Decimal = Decimal::from_parts(99, 0, 0, false, 2);

/// Delivery fee used while the fee schedule is unavailable.
pub const FALLBACK_DELIVERY_FEE: Decimal = Decimal::from_parts(300, 0, 0, false, 2);

/// Free-delivery threshold used while the fee schedule is unavailable.
pub const FALLBACK_FREE_DELIVERY_LIMIT: Decimal = Decimal::from_parts(1200, 0, 0, false, 2);

/// Minimum delivery order used while the fee schedule is unavailable.
pub const FALLBACK_MINIMUM_ORDER: Decimal = Decimal::from_parts(1000, 0, 0, false, 2);

/// Errors raised by fee calculations.
///
/// These only signal caller misuse; missing schedules fall back instead of failing.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Amounts in different currencies were combined (schedule currency, amount currency).
    #[error("fee schedule is priced in {0}, but the amount is in {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// How the order is fulfilled.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Delivered to the customer's address.
    #[default]
    Delivery,

    /// Picked up by the customer.
    Collection,
}

impl DeliveryMode {
    /// Whether this is collection mode
    pub fn is_collection(self) -> bool {
        matches!(self, DeliveryMode::Collection)
    }
}

/// Where the fees in a [`PricingResult`] came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FeeSource {
    /// The fee schedule configured by the store.
    Schedule,

    /// Built-in fallback fees, used while the schedule is not loaded.
    Fallback,
}

impl FeeSource {
    /// Name used in log fields
    pub fn as_str(self) -> &'static str {
        match self {
            FeeSource::Schedule => "schedule",
            FeeSource::Fallback => "fallback",
        }
    }
}

/// Store-configured fees and thresholds.
///
/// The free-delivery limit and the minimum order are independent thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeSchedule<'a> {
    delivery_fee: Money<'a, Currency>,
    free_delivery_limit: Money<'a, Currency>,
    service_fee: Money<'a, Currency>,
    minimum_order: Money<'a, Currency>,
}

impl<'a> FeeSchedule<'a> {
    /// Create a fee schedule. Negative amounts are clamped to zero.
    pub fn new(
        currency: &'a Currency,
        delivery_fee: Decimal,
        free_delivery_limit: Decimal,
        service_fee: Decimal,
        minimum_order: Decimal,
    ) -> Self {
        Self {
            delivery_fee: to_non_negative_money(delivery_fee, currency),
            free_delivery_limit: to_non_negative_money(free_delivery_limit, currency),
            service_fee: to_non_negative_money(service_fee, currency),
            minimum_order: to_non_negative_money(minimum_order, currency),
        }
    }

    /// The fees applied while the real schedule is in flight or failed to load.
    pub fn fallback(currency: &'a Currency) -> Self {
        Self::new(
            currency,
            FALLBACK_DELIVERY_FEE,
            FALLBACK_FREE_DELIVERY_LIMIT,
            FALLBACK_SERVICE_FEE,
            FALLBACK_MINIMUM_ORDER,
        )
    }

    /// Flat fee charged in delivery mode
    pub fn delivery_fee(&self) -> Money<'a, Currency> {
        self.delivery_fee
    }

    /// Subtotal at or above which delivery is free
    pub fn free_delivery_limit(&self) -> Money<'a, Currency> {
        self.free_delivery_limit
    }

    /// Flat fee charged on every order
    pub fn service_fee(&self) -> Money<'a, Currency> {
        self.service_fee
    }

    /// Minimum subtotal for delivery orders
    pub fn minimum_order(&self) -> Money<'a, Currency> {
        self.minimum_order
    }

    /// Currency the schedule is priced in
    pub fn currency(&self) -> &'a Currency {
        self.delivery_fee.currency()
    }
}

/// Fees and total for a subtotal.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingResult<'a> {
    /// Delivery fee, zero for collection or above the free-delivery limit
    pub delivery_fee: Money<'a, Currency>,

    /// Service fee, never waived
    pub service_fee: Money<'a, Currency>,

    /// Discount taken off the subtotal
    pub discount: Money<'a, Currency>,

    /// `max(subtotal - discount, 0) + delivery_fee + service_fee`
    pub total: Money<'a, Currency>,

    /// Whether the fees came from the store schedule or the fallback
    pub fee_source: FeeSource,
}

/// Calculate fees and the final total.
///
/// A missing schedule is not an error: the fallback fees apply and the result is tagged with
/// [`FeeSource::Fallback`]. The discount is trusted as given; only the discounted subtotal is
/// clamped at zero, so the fees still apply on a fully discounted order.
///
/// # Errors
///
/// Returns a [`PricingError`] if the schedule, subtotal and discount are not all in the same
/// currency.
pub fn compute_fees<'a>(
    schedule: Option<&FeeSchedule<'a>>,
    subtotal: Money<'a, Currency>,
    mode: DeliveryMode,
    discount: Money<'a, Currency>,
) -> Result<PricingResult<'a>, PricingError> {
    let (schedule, fee_source) = resolve(schedule, subtotal.currency());

    ensure_currency(&schedule, &subtotal)?;
    ensure_currency(&schedule, &discount)?;

    let delivery_fee = if mode.is_collection()
        || subtotal.to_minor_units() >= schedule.free_delivery_limit.to_minor_units()
    {
        zero(subtotal.currency())
    } else {
        schedule.delivery_fee
    };

    let service_fee = schedule.service_fee;

    let discounted = subtotal.sub(discount)?;
    let discounted = if discounted.to_minor_units() < 0 {
        zero(subtotal.currency())
    } else {
        discounted
    };

    let total = discounted.add(delivery_fee)?.add(service_fee)?;

    debug!(
        fee_source = fee_source.as_str(),
        subtotal = subtotal.to_minor_units(),
        discount = discount.to_minor_units(),
        delivery_fee = delivery_fee.to_minor_units(),
        service_fee = service_fee.to_minor_units(),
        total = total.to_minor_units(),
        "computed fees"
    );

    Ok(PricingResult {
        delivery_fee,
        service_fee,
        discount,
        total,
        fee_source,
    })
}

/// Progress towards free delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeDeliveryProgress<'a> {
    /// Whether the order is delivered for free
    pub qualifies: bool,

    /// How much more to spend for free delivery
    pub amount_needed: Money<'a, Currency>,

    /// The threshold being measured against
    pub limit: Money<'a, Currency>,
}

/// How far the subtotal is from free delivery.
///
/// Collection orders never pay for delivery, so they always qualify.
///
/// # Errors
///
/// Returns a [`PricingError`] if the schedule and subtotal are in different currencies.
pub fn free_delivery_progress<'a>(
    schedule: Option<&FeeSchedule<'a>>,
    subtotal: Money<'a, Currency>,
    mode: DeliveryMode,
) -> Result<FreeDeliveryProgress<'a>, PricingError> {
    let (schedule, _) = resolve(schedule, subtotal.currency());

    ensure_currency(&schedule, &subtotal)?;

    let limit = schedule.free_delivery_limit;

    if mode.is_collection() {
        return Ok(FreeDeliveryProgress {
            qualifies: true,
            amount_needed: zero(subtotal.currency()),
            limit,
        });
    }

    Ok(FreeDeliveryProgress {
        qualifies: subtotal.to_minor_units() >= limit.to_minor_units(),
        amount_needed: shortfall(&limit, &subtotal),
        limit,
    })
}

/// Checkout admission for the minimum delivery order.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimumOrderGate<'a> {
    /// Whether checkout may go ahead
    pub can_proceed: bool,

    /// The minimum order value that applies
    pub minimum: Money<'a, Currency>,

    /// Amount to add before checkout opens, zero when it already is
    pub shortfall: Money<'a, Currency>,
}

/// Apply the minimum-order rule: collection is exempt, delivery needs `subtotal >= minimum`.
///
/// # Errors
///
/// Returns a [`PricingError`] if the schedule and subtotal are in different currencies.
pub fn minimum_order_gate<'a>(
    schedule: Option<&FeeSchedule<'a>>,
    subtotal: Money<'a, Currency>,
    mode: DeliveryMode,
) -> Result<MinimumOrderGate<'a>, PricingError> {
    let (schedule, _) = resolve(schedule, subtotal.currency());

    ensure_currency(&schedule, &subtotal)?;

    let minimum = schedule.minimum_order;

    if mode.is_collection() {
        return Ok(MinimumOrderGate {
            can_proceed: true,
            minimum,
            shortfall: zero(subtotal.currency()),
        });
    }

    Ok(MinimumOrderGate {
        can_proceed: subtotal.to_minor_units() >= minimum.to_minor_units(),
        minimum,
        shortfall: shortfall(&minimum, &subtotal),
    })
}

/// Use the given schedule, or the fallback fees in `currency`.
fn resolve<'s, 'a>(
    schedule: Option<&'s FeeSchedule<'a>>,
    currency: &'a Currency,
) -> (Cow<'s, FeeSchedule<'a>>, FeeSource) {
    match schedule {
        Some(schedule) => (Cow::Borrowed(schedule), FeeSource::Schedule),
        None => (
            Cow::Owned(FeeSchedule::fallback(currency)),
            FeeSource::Fallback,
        ),
    }
}

fn ensure_currency(
    schedule: &FeeSchedule<'_>,
    amount: &Money<'_, Currency>,
) -> Result<(), PricingError> {
    let currency = amount.currency();

    if schedule.currency() == currency {
        Ok(())
    } else {
        Err(PricingError::CurrencyMismatch(
            schedule.currency().iso_alpha_code,
            currency.iso_alpha_code,
        ))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{EUR, GBP};
    use testresult::TestResult;

    use super::*;

    fn eur(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, EUR)
    }

    fn schedule() -> FeeSchedule<'static> {
        FeeSchedule::new(
            EUR,
            Decimal::new(250, 2),
            Decimal::new(1500, 2),
            Decimal::new(50, 2),
            Decimal::new(800, 2),
        )
    }

    #[test]
    fn fallback_uses_documented_constants() {
        let fallback = FeeSchedule::fallback(EUR);

        assert_eq!(fallback.service_fee(), eur(99));
        assert_eq!(fallback.delivery_fee(), eur(300));
        assert_eq!(fallback.free_delivery_limit(), eur(1200));
        assert_eq!(fallback.minimum_order(), eur(1000));
    }

    #[test]
    fn new_clamps_negative_amounts() {
        let schedule = FeeSchedule::new(
            EUR,
            Decimal::new(-1, 0),
            Decimal::ZERO,
            Decimal::new(-99, 2),
            Decimal::ZERO,
        );

        assert_eq!(schedule.delivery_fee(), eur(0));
        assert_eq!(schedule.service_fee(), eur(0));
    }

    #[test]
    fn delivery_fee_charged_below_limit() -> TestResult {
        let result = compute_fees(Some(&schedule()), eur(1499), DeliveryMode::Delivery, eur(0))?;

        assert_eq!(result.delivery_fee, eur(250));
        assert_eq!(result.service_fee, eur(50));
        assert_eq!(result.total, eur(1499 + 250 + 50));
        assert_eq!(result.fee_source, FeeSource::Schedule);

        Ok(())
    }

    #[test]
    fn delivery_fee_waived_at_limit() -> TestResult {
        let result = compute_fees(Some(&schedule()), eur(1500), DeliveryMode::Delivery, eur(0))?;

        assert_eq!(result.delivery_fee, eur(0));
        assert_eq!(result.total, eur(1550));

        Ok(())
    }

    #[test]
    fn collection_never_pays_delivery() -> TestResult {
        let result = compute_fees(Some(&schedule()), eur(100), DeliveryMode::Collection, eur(0))?;

        assert_eq!(result.delivery_fee, eur(0));
        assert_eq!(result.total, eur(150));

        Ok(())
    }

    #[test]
    fn missing_schedule_uses_fallback() -> TestResult {
        let result = compute_fees(None, eur(1000), DeliveryMode::Delivery, eur(0))?;

        assert_eq!(result.fee_source, FeeSource::Fallback);
        assert_eq!(result.delivery_fee, eur(300));
        assert_eq!(result.service_fee, eur(99));
        assert_eq!(result.total, eur(1399));

        Ok(())
    }

    #[test]
    fn service_fee_charged_on_empty_subtotal() -> TestResult {
        let result = compute_fees(Some(&schedule()), eur(0), DeliveryMode::Collection, eur(0))?;

        assert_eq!(result.total, eur(50));

        Ok(())
    }

    #[test]
    fn oversized_discount_only_clamps_the_subtotal() -> TestResult {
        let result = compute_fees(Some(&schedule()), eur(1000), DeliveryMode::Delivery, eur(5000))?;

        assert_eq!(result.discount, eur(5000));
        assert_eq!(result.total, eur(250 + 50));
        assert!(result.total.to_minor_units() >= 0);

        Ok(())
    }

    #[test]
    fn currency_mismatch_is_reported() {
        let result = compute_fees(
            Some(&schedule()),
            Money::from_minor(1000, GBP),
            DeliveryMode::Delivery,
            Money::from_minor(0, GBP),
        );

        assert!(matches!(
            result,
            Err(PricingError::CurrencyMismatch("EUR", "GBP"))
        ));
    }

    #[test]
    fn free_delivery_progress_reports_amount_needed() -> TestResult {
        let progress = free_delivery_progress(Some(&schedule()), eur(1100), DeliveryMode::Delivery)?;

        assert!(!progress.qualifies);
        assert_eq!(progress.amount_needed, eur(400));
        assert_eq!(progress.limit, eur(1500));

        let progress = free_delivery_progress(Some(&schedule()), eur(1500), DeliveryMode::Delivery)?;

        assert!(progress.qualifies);
        assert_eq!(progress.amount_needed, eur(0));

        Ok(())
    }

    #[test]
    fn free_delivery_progress_for_collection() -> TestResult {
        let progress = free_delivery_progress(None, eur(100), DeliveryMode::Collection)?;

        assert!(progress.qualifies);
        assert_eq!(progress.amount_needed, eur(0));

        Ok(())
    }

    #[test]
    fn minimum_order_gate_blocks_small_delivery() -> TestResult {
        let gate = minimum_order_gate(Some(&schedule()), eur(650), DeliveryMode::Delivery)?;

        assert!(!gate.can_proceed);
        assert_eq!(gate.minimum, eur(800));
        assert_eq!(gate.shortfall, eur(150));

        Ok(())
    }

    #[test]
    fn minimum_order_gate_is_inclusive() -> TestResult {
        let gate = minimum_order_gate(Some(&schedule()), eur(800), DeliveryMode::Delivery)?;

        assert!(gate.can_proceed);
        assert_eq!(gate.shortfall, eur(0));

        Ok(())
    }

    #[test]
    fn minimum_order_gate_exempts_collection() -> TestResult {
        let gate = minimum_order_gate(Some(&schedule()), eur(100), DeliveryMode::Collection)?;

        assert!(gate.can_proceed);
        assert_eq!(gate.shortfall, eur(0));

        Ok(())
    }

    #[test]
    fn delivery_mode_deserializes_snake_case() -> TestResult {
        let mode: DeliveryMode = serde_json::from_str(r#""collection""#)?;

        assert_eq!(mode, DeliveryMode::Collection);
        assert_eq!(DeliveryMode::default(), DeliveryMode::Delivery);

        Ok(())
    }
}
