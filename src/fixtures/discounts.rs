//! Discount Fixtures

use serde::Deserialize;

use crate::wire::DiscountPayload;

/// Wrapper for discounts in YAML, written in the same shape the discounts endpoint returns
#[derive(Debug, Default, Deserialize)]
pub struct DiscountsFixture {
    /// Discounts in priority order
    #[serde(default)]
    pub discounts: Vec<DiscountPayload>,
}
