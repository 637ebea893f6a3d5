//! Wire payloads
//!
//! Shapes returned by the store's fee and discount endpoints. Responses may be bare or wrapped
//! in the usual `{ "status", "message", "data" }` envelope.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::{
    amounts::{deserialize_amount, deserialize_optional_amount, to_non_negative_money},
    discounts::{DiscountKind, DiscountRule},
    fees::FeeSchedule,
};

/// Keys of which a fee schedule carries at least one.
const FEE_KEYS: [&str; 4] = ["delivery_fee", "free_delivery_limit", "service_fee", "min_order"];

/// Name shown for discounts the store left unnamed.
const UNNAMED_DISCOUNT: &str = "Discount Applied";

/// Errors reading wire payloads.
#[derive(Debug, Error)]
pub enum WireError {
    /// The body was not valid JSON for the expected shape.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The store answered with `"status": false`.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The envelope carried no data.
    #[error("Response envelope has no data")]
    MissingData,

    /// The body parsed, but is not the expected payload.
    #[error("Response is not {0}")]
    UnexpectedShape(&'static str),

    /// A discount used a kind other than `percentage` or `fixed`.
    #[error("Unknown discount type: {0}")]
    UnknownDiscountKind(String),
}

/// Fee schedule as returned by the fees endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeeSchedulePayload {
    /// Flat delivery fee
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub delivery_fee: Decimal,

    /// Subtotal at or above which delivery is free
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub free_delivery_limit: Decimal,

    /// Flat service fee
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub service_fee: Decimal,

    /// Minimum subtotal for delivery orders
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub min_order: Decimal,
}

impl FeeSchedulePayload {
    /// Convert to a fee schedule priced in `currency`.
    pub fn into_schedule(self, currency: &Currency) -> FeeSchedule<'_> {
        FeeSchedule::new(
            currency,
            self.delivery_fee,
            self.free_delivery_limit,
            self.service_fee,
            self.min_order,
        )
    }
}

/// Discount as returned by the active discounts endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DiscountPayload {
    /// Discount identifier; numeric strings are accepted
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: u64,

    /// Name shown to customers; null reads as empty
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,

    /// `percentage` or `fixed`; null reads as empty
    #[serde(default, deserialize_with = "deserialize_text")]
    pub discount_type: String,

    /// Percent points for percentage discounts, an amount for fixed ones
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub discount_value: Decimal,

    /// Minimum subtotal; null or zero means none
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub minimum_purchase_amount: Option<Decimal>,

    /// Weekday names the discount is limited to; null or empty means every day.
    /// A single comma-separated string is accepted too.
    #[serde(default, deserialize_with = "deserialize_days")]
    pub days_of_week: Option<Vec<String>>,
}

impl DiscountPayload {
    /// Convert to a discount rule priced in `currency`.
    ///
    /// Percentages are clamped to 0–100 and amounts to zero or more. Unnamed discounts are
    /// called `Discount Applied`.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnknownDiscountKind`] if the discount type is not recognised.
    pub fn into_rule(self, currency: &Currency) -> Result<DiscountRule<'_>, WireError> {
        let kind = match self.discount_type.trim().to_lowercase().as_str() {
            "percentage" => {
                let points = self.discount_value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);

                DiscountKind::Percentage(Percentage::from(points / Decimal::ONE_HUNDRED))
            }
            "fixed" => DiscountKind::Fixed(to_non_negative_money(self.discount_value, currency)),
            _ => return Err(WireError::UnknownDiscountKind(self.discount_type)),
        };

        let name = if self.name.trim().is_empty() {
            UNNAMED_DISCOUNT.to_string()
        } else {
            self.name
        };

        let mut rule = DiscountRule::new(self.id, name, kind);

        if let Some(minimum) = self.minimum_purchase_amount {
            rule = rule.with_minimum_purchase(to_non_negative_money(minimum, currency));
        }

        if let Some(days) = self.days_of_week {
            rule = rule.with_days(days);
        }

        Ok(rule)
    }
}

/// Convert discounts to rules, keeping API order.
///
/// Discounts of an unknown type are skipped with a warning rather than read as zero.
pub fn rules_from_payloads(
    payloads: Vec<DiscountPayload>,
    currency: &Currency,
) -> Vec<DiscountRule<'_>> {
    payloads
        .into_iter()
        .filter_map(|payload| {
            let id = payload.id;

            match payload.into_rule(currency) {
                Ok(rule) => Some(rule),
                Err(err) => {
                    warn!(discount_id = id, error = %err, "skipping discount");
                    None
                }
            }
        })
        .collect()
}

/// Parse a fees response body.
///
/// The body may be bare or wrapped in the API envelope, and must carry at least one fee field.
/// A failed fetch therefore never reads as an all-zero schedule; callers price with the
/// fallback fees instead.
///
/// # Errors
///
/// Returns a [`WireError`] if the body is not JSON, is a rejected or empty envelope, or is not a
/// fee schedule.
pub fn parse_fee_schedule(body: &str) -> Result<FeeSchedulePayload, WireError> {
    let payload = unwrap_envelope(body)?;

    let is_schedule = payload
        .as_object()
        .is_some_and(|object| FEE_KEYS.iter().any(|key| object.contains_key(*key)));

    if !is_schedule {
        return Err(WireError::UnexpectedShape("a fee schedule"));
    }

    Ok(serde_json::from_value(payload)?)
}

/// Parse an active discounts response body. An empty list is a valid answer.
///
/// Entries are read one at a time; a malformed entry is skipped with a warning and the rest of
/// the list survives.
///
/// # Errors
///
/// Returns a [`WireError`] if the body is not JSON, is a rejected or empty envelope, or is not a
/// list.
pub fn parse_discounts(body: &str) -> Result<Vec<DiscountPayload>, WireError> {
    let Value::Array(entries) = unwrap_envelope(body)? else {
        return Err(WireError::UnexpectedShape("a list of discounts"));
    };

    let payloads = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(payload) => Some(payload),
            Err(err) => {
                warn!(index, error = %err, "skipping malformed discount");
                None
            }
        })
        .collect();

    Ok(payloads)
}

/// Strip the `{ "status", "message", "data" }` envelope, if there is one.
fn unwrap_envelope(body: &str) -> Result<Value, WireError> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(mut object) => {
            if object.get("status").and_then(Value::as_bool) == Some(false) {
                let message = object
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("no message")
                    .to_string();

                return Err(WireError::Rejected(message));
            }

            match object.remove("data") {
                Some(Value::Null) => Err(WireError::MissingData),
                Some(data) => Ok(data),
                None => Ok(Value::Object(object)),
            }
        }
        other => Ok(other),
    }
}

/// Identifier as a number or a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let id = match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Number(id)) => id,
        Some(RawId::Text(text)) => text.trim().parse().unwrap_or(0),
        None => 0,
    };

    Ok(id)
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Day list as a list or a single, possibly comma-separated, name.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDays {
    Many(Vec<String>),
    One(String),
}

fn deserialize_days<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let days = Option::<RawDays>::deserialize(deserializer)?.map(|raw| match raw {
        RawDays::Many(days) => days,
        RawDays::One(days) => days
            .split(',')
            .map(str::trim)
            .filter(|day| !day.is_empty())
            .map(str::to_string)
            .collect(),
    });

    Ok(days)
}
