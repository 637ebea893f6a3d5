//! Integration tests for checkout pricing rules

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{Currency, EUR},
};
use testresult::TestResult;

use tally::{
    basket::{Basket, OrderLine},
    checkout::{Quote, QuoteInputs},
    discounts::{
        DiscountKind, DiscountRule, list_discount_availability, select_applicable_discount,
    },
    fees::{DeliveryMode, FeeSchedule, compute_fees, minimum_order_gate},
    wire::{parse_discounts, rules_from_payloads},
};

const WEEK: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn eur(minor: i64) -> Money<'static, Currency> {
    Money::from_minor(minor, EUR)
}

fn store_schedule() -> FeeSchedule<'static> {
    FeeSchedule::new(
        EUR,
        Decimal::new(300, 2),
        Decimal::new(1200, 2),
        Decimal::new(99, 2),
        Decimal::new(1000, 2),
    )
}

#[test]
fn free_delivery_threshold_is_inclusive() -> TestResult {
    let schedule = store_schedule();

    let at_limit = compute_fees(Some(&schedule), eur(1200), DeliveryMode::Delivery, eur(0))?;
    let below_limit = compute_fees(Some(&schedule), eur(1199), DeliveryMode::Delivery, eur(0))?;

    assert_eq!(at_limit.delivery_fee, eur(0));
    assert_eq!(below_limit.delivery_fee, eur(300));

    Ok(())
}

#[test]
fn collection_never_charges_delivery() -> TestResult {
    let schedule = store_schedule();

    for subtotal in [0, 1, 999, 1000, 1199, 1200, 50_000] {
        let with_schedule =
            compute_fees(Some(&schedule), eur(subtotal), DeliveryMode::Collection, eur(0))?;
        let with_fallback = compute_fees(None, eur(subtotal), DeliveryMode::Collection, eur(0))?;

        assert_eq!(with_schedule.delivery_fee, eur(0));
        assert_eq!(with_fallback.delivery_fee, eur(0));
    }

    Ok(())
}

#[test]
fn fixed_discount_is_capped_at_subtotal() -> TestResult {
    let rules = [DiscountRule::new(1, "Hundred off", DiscountKind::Fixed(eur(10_000)))];

    let applied = select_applicable_discount(&rules, &eur(2000), "Monday")?;

    assert_eq!(applied.amount, eur(2000));

    Ok(())
}

#[test]
fn percentage_discount_is_linear() -> TestResult {
    let rules = [DiscountRule::new(
        1,
        "Tenth off",
        DiscountKind::Percentage(Percentage::from(0.10)),
    )];

    let applied = select_applicable_discount(&rules, &eur(5000), "Monday")?;

    assert_eq!(applied.amount, eur(500));

    Ok(())
}

#[test]
fn day_filter_excludes_rules_everywhere() -> TestResult {
    let rules = [DiscountRule::new(1, "Monday deal", DiscountKind::Fixed(eur(100)))
        .with_days(["Monday"])];

    let applied = select_applicable_discount(&rules, &eur(2000), "Tuesday")?;
    let availability = list_discount_availability(&rules, &eur(2000), "Tuesday")?;

    assert!(applied.rule.is_none());
    assert!(availability.is_empty());

    let availability = list_discount_availability(&rules, &eur(2000), "Monday")?;

    assert_eq!(availability.len(), 1);

    Ok(())
}

#[test]
fn first_eligible_rule_wins() -> TestResult {
    let rules = [
        DiscountRule::new(1, "Small", DiscountKind::Fixed(eur(100))),
        DiscountRule::new(2, "Big", DiscountKind::Percentage(Percentage::from(0.50))),
    ];

    for day in WEEK {
        let applied = select_applicable_discount(&rules, &eur(2000), day)?;

        assert_eq!(applied.rule.map(DiscountRule::id), Some(1));
        assert_eq!(applied.amount, eur(100));
    }

    Ok(())
}

#[test]
fn total_is_sum_of_parts() -> TestResult {
    for delivery_fee in [0, 250, 300] {
        for service_fee in [0, 49, 99] {
            let schedule = FeeSchedule::new(
                EUR,
                Decimal::new(delivery_fee, 2),
                Decimal::new(1200, 2),
                Decimal::new(service_fee, 2),
                Decimal::new(1000, 2),
            );

            for subtotal in [0, 1, 333, 1199, 1200, 9_999] {
                let discounts = [0, 1, subtotal / 3, subtotal];

                for discount in discounts.into_iter().filter(|discount| *discount <= subtotal) {
                    let result = compute_fees(
                        Some(&schedule),
                        eur(subtotal),
                        DeliveryMode::Delivery,
                        eur(discount),
                    )?;

                    let expected = eur(subtotal)
                        .sub(eur(discount))?
                        .add(result.delivery_fee)?
                        .add(result.service_fee)?;

                    assert_eq!(result.total, expected);
                    assert!(result.total.to_minor_units() >= 0);
                }
            }
        }
    }

    Ok(())
}

#[test]
fn oversized_discount_leaves_fees_payable() -> TestResult {
    let schedule = store_schedule();

    let result = compute_fees(Some(&schedule), eur(500), DeliveryMode::Delivery, eur(900))?;

    assert_eq!(result.total, eur(300 + 99));

    Ok(())
}

#[test]
fn minimum_order_gate_blocks_small_delivery_orders() -> TestResult {
    let schedule = store_schedule();

    let delivery = minimum_order_gate(Some(&schedule), eur(850), DeliveryMode::Delivery)?;
    let collection = minimum_order_gate(Some(&schedule), eur(850), DeliveryMode::Collection)?;

    assert!(!delivery.can_proceed);
    assert_eq!(delivery.shortfall, eur(150));
    assert!(collection.can_proceed);
    assert_eq!(collection.shortfall, eur(0));

    Ok(())
}

#[test]
fn lunch_order_totals_18_99() -> TestResult {
    let schedule = store_schedule();
    let payloads = parse_discounts(
        r#"[{"id": 1, "name": "Tenth off", "discount_type": "percentage", "discount_value": "10",
             "minimum_purchase_amount": "0", "days_of_week": null}]"#,
    )?;
    let rules = rules_from_payloads(payloads, EUR);
    let basket = Basket::with_lines([OrderLine::new("Lunch", 1, eur(2000))], EUR)?;

    for day in WEEK {
        let quote = Quote::build(&QuoteInputs {
            schedule: Some(&schedule),
            rules: &rules,
            basket: &basket,
            mode: DeliveryMode::Delivery,
            day,
        })?;

        assert_eq!(quote.discount.amount, eur(200));
        assert_eq!(quote.pricing.delivery_fee, eur(0));
        assert_eq!(quote.pricing.service_fee, eur(99));
        assert_eq!(quote.total(), eur(1899));
    }

    Ok(())
}
