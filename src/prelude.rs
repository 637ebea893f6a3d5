//! Tally prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    amounts::{format_money, parse_amount, to_money},
    basket::{Basket, BasketError, OrderLine},
    checkout::{CheckoutError, Quote, QuoteInputs, SubmissionDetails, validate_submission},
    discounts::{
        AppliedDiscount, DayName, DiscountAvailability, DiscountError, DiscountKind, DiscountRule,
        featured_discount, list_discount_availability, select_applicable_discount,
    },
    fees::{
        DeliveryMode, FeeSchedule, FeeSource, FreeDeliveryProgress, MinimumOrderGate,
        PricingError, PricingResult, compute_fees, free_delivery_progress, minimum_order_gate,
    },
    fixtures::{Fixture, FixtureError},
    fulfilment::{DateOption, date_options, resolve_weekday},
    receipt::{Receipt, ReceiptError},
    wire::{
        DiscountPayload, FeeSchedulePayload, WireError, parse_discounts, parse_fee_schedule,
        rules_from_payloads,
    },
};
