//! Tally
//!
//! Tally prices a food-ordering basket at checkout: the subtotal, the store's day- and
//! spend-conditioned discounts, delivery and service fees, free-delivery progress and the
//! minimum delivery order. Every surface that shows a price builds the same [`checkout::Quote`].

pub mod amounts;
pub mod basket;
pub mod checkout;
pub mod discounts;
pub mod fees;
pub mod fixtures;
pub mod fulfilment;
pub mod prelude;
pub mod receipt;
pub mod utils;
pub mod wire;
