//! Amounts
//!
//! Upstream fee and discount payloads carry prices as numbers, numeric strings, or nothing at
//! all. Everything in here degrades to zero instead of failing so a backend data quirk can never
//! block a checkout.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Deserializer};

/// Parse a decimal amount the way the storefront reads prices.
///
/// Surrounding whitespace is ignored and the longest leading numeric prefix
/// (`[+-]?digits[.digits][e[+-]digits]`) is used, so `"12.50 EUR"` reads as `12.50` and `"1e1"`
/// as `10`. Anything without a numeric prefix, or out of range, yields zero.
pub fn parse_amount(raw: &str) -> Decimal {
    let trimmed = raw.trim();

    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let (whole, tail) = rest.split_at(ascii_digits(rest));

    let (fraction, tail) = match tail.strip_prefix('.') {
        Some(tail) => tail.split_at(ascii_digits(tail)),
        None => ("", tail),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Decimal::ZERO;
    }

    let normalised = format!(
        "{sign}{whole}.{fraction}",
        sign = if negative { "-" } else { "" },
        whole = if whole.is_empty() { "0" } else { whole },
        fraction = if fraction.is_empty() { "0" } else { fraction },
    );

    let parsed = match exponent(tail) {
        Some(exponent) => Decimal::from_scientific(&format!("{normalised}e{exponent}")),
        None => normalised.parse::<Decimal>(),
    };

    parsed.unwrap_or(Decimal::ZERO)
}

/// Exponent suffix such as `e3` or `E-2` at the start of `s`, if complete.
fn exponent(s: &str) -> Option<i64> {
    let rest = s.strip_prefix(['e', 'E'])?;

    let (negative, rest) = match rest.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, rest.strip_prefix('+').unwrap_or(rest)),
    };

    let digits = rest.split_at(ascii_digits(rest)).0;
    let value = digits.parse::<i64>().ok()?;

    Some(if negative { -value } else { value })
}

/// Length of the ASCII digit run at the start of `s`.
fn ascii_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// Convert a decimal amount into money, rounded to whole minor units.
///
/// Values that cannot be represented in minor units degrade to zero.
pub fn to_money(amount: Decimal, currency: &Currency) -> Money<'_, Currency> {
    let minor = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|value| value.to_i64())
        .unwrap_or(0);

    Money::from_minor(minor, currency)
}

/// Same as [`to_money`], but negative amounts are clamped to zero.
pub fn to_non_negative_money(amount: Decimal, currency: &Currency) -> Money<'_, Currency> {
    to_money(amount.max(Decimal::ZERO), currency)
}

/// Zero in the given currency.
pub fn zero(currency: &Currency) -> Money<'_, Currency> {
    Money::from_minor(0, currency)
}

/// The decimal value of an amount of money.
pub fn to_decimal(money: &Money<'_, Currency>) -> Decimal {
    Decimal::new(money.to_minor_units(), 2)
}

/// Format money as the storefront shows it, e.g. `€18.99`.
pub fn format_money(money: &Money<'_, Currency>) -> String {
    format!("{}{:.2}", money.currency().symbol, to_decimal(money))
}

/// Lowest of two amounts, compared in minor units.
pub(crate) fn min_money<'a>(
    a: Money<'a, Currency>,
    b: Money<'a, Currency>,
) -> Money<'a, Currency> {
    if b.to_minor_units() < a.to_minor_units() {
        b
    } else {
        a
    }
}

/// Amount still missing to reach `target`, floored at zero.
pub(crate) fn shortfall<'a>(
    target: &Money<'a, Currency>,
    current: &Money<'a, Currency>,
) -> Money<'a, Currency> {
    let missing = target.to_minor_units().saturating_sub(current.to_minor_units());

    Money::from_minor(missing.max(0), target.currency())
}

/// Raw amount as it appears in an upstream payload.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawAmount {
    fn into_decimal(self) -> Decimal {
        match self {
            RawAmount::Integer(value) => Decimal::from(value),
            RawAmount::Float(value) if value.is_finite() => parse_amount(&value.to_string()),
            RawAmount::Float(_) => Decimal::ZERO,
            RawAmount::Text(text) => parse_amount(&text),
        }
    }
}

/// Deserialize a lenient amount: a number, a numeric string, or null.
///
/// # Errors
///
/// Only fails if the deserializer itself fails; unparsable values read as zero.
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawAmount>::deserialize(deserializer)?;

    Ok(raw.map_or(Decimal::ZERO, RawAmount::into_decimal))
}

/// Deserialize an optional lenient amount, keeping null as `None`.
///
/// # Errors
///
/// Only fails if the deserializer itself fails; unparsable values read as zero.
pub fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawAmount>::deserialize(deserializer)?;

    Ok(raw.map(RawAmount::into_decimal))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::EUR;
    use serde::Deserialize;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_amount_reads_plain_numbers() {
        assert_eq!(parse_amount("3.00"), Decimal::new(300, 2));
        assert_eq!(parse_amount(" 12 "), Decimal::new(12, 0));
        assert_eq!(parse_amount("-1.5"), Decimal::new(-15, 1));
        assert_eq!(parse_amount("+0.99"), Decimal::new(99, 2));
    }

    #[test]
    fn parse_amount_uses_leading_numeric_prefix() {
        assert_eq!(parse_amount("12.50 EUR"), Decimal::new(1250, 2));
        assert_eq!(parse_amount(".5"), Decimal::new(5, 1));
        assert_eq!(parse_amount("7."), Decimal::new(7, 0));
    }

    #[test]
    fn parse_amount_reads_exponents() {
        assert_eq!(parse_amount("1e1"), Decimal::new(10, 0));
        assert_eq!(parse_amount("2.5E-1"), Decimal::new(25, 2));
        assert_eq!(parse_amount("-3e+2"), Decimal::new(-300, 0));
        assert_eq!(parse_amount("4e"), Decimal::new(4, 0));
        assert_eq!(parse_amount("5eggs"), Decimal::new(5, 0));
        assert_eq!(parse_amount("1e400"), Decimal::ZERO);
    }

    #[test]
    fn parse_amount_degrades_to_zero() {
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount("NaN"), Decimal::ZERO);
        assert_eq!(parse_amount("-"), Decimal::ZERO);
        assert_eq!(parse_amount("99999999999999999999999999999999999"), Decimal::ZERO);
    }

    #[test]
    fn to_money_rounds_half_away_from_zero() {
        assert_eq!(to_money(Decimal::new(12345, 3), EUR).to_minor_units(), 1235);
        assert_eq!(to_money(Decimal::new(99, 2), EUR).to_minor_units(), 99);
    }

    #[test]
    fn to_non_negative_money_clamps() {
        assert_eq!(
            to_non_negative_money(Decimal::new(-300, 2), EUR).to_minor_units(),
            0
        );
    }

    #[test]
    fn format_money_uses_symbol_and_two_places() {
        assert_eq!(format_money(&Money::from_minor(1899, EUR)), "€18.99");
        assert_eq!(format_money(&Money::from_minor(300, EUR)), "€3.00");
    }

    #[test]
    fn shortfall_is_floored_at_zero() {
        let target = Money::from_minor(1000, EUR);

        assert_eq!(shortfall(&target, &Money::from_minor(850, EUR)).to_minor_units(), 150);
        assert_eq!(shortfall(&target, &Money::from_minor(1200, EUR)).to_minor_units(), 0);
    }

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default, deserialize_with = "deserialize_amount")]
        amount: Decimal,

        #[serde(default, deserialize_with = "deserialize_optional_amount")]
        minimum: Option<Decimal>,
    }

    #[test]
    fn deserialize_amount_accepts_numbers_strings_and_null() -> TestResult {
        let number: Payload = serde_json::from_str(r#"{"amount": 0.99}"#)?;
        let text: Payload = serde_json::from_str(r#"{"amount": "3.00"}"#)?;
        let junk: Payload = serde_json::from_str(r#"{"amount": "free"}"#)?;
        let null: Payload = serde_json::from_str(r#"{"amount": null}"#)?;
        let absent: Payload = serde_json::from_str("{}")?;

        assert_eq!(number.amount, Decimal::new(99, 2));
        assert_eq!(text.amount, Decimal::new(300, 2));
        assert_eq!(junk.amount, Decimal::ZERO);
        assert_eq!(null.amount, Decimal::ZERO);
        assert_eq!(absent.amount, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn deserialize_optional_amount_keeps_null() -> TestResult {
        let null: Payload = serde_json::from_str(r#"{"minimum": null}"#)?;
        let set: Payload = serde_json::from_str(r#"{"minimum": "15"}"#)?;

        assert_eq!(null.minimum, None);
        assert_eq!(set.minimum, Some(Decimal::new(15, 0)));

        Ok(())
    }
}
