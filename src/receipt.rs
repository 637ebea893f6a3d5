//! Receipt
//!
//! Plain-text rendering of a [`Quote`]: the basket lines as a table, the price breakdown under
//! it, then any nudges the customer should see (free delivery, discounts to unlock, the minimum
//! order).

use std::io;

use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{amounts::format_money, basket::Basket, checkout::Quote, fees::DeliveryMode};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Output could not be written
    #[error("failed to write receipt: {0}")]
    Io(#[from] io::Error),
}

/// A quote ready to print, with the basket it was built from.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'q, 'r, 'a> {
    quote: &'q Quote<'r, 'a>,
    basket: &'q Basket<'a>,
}

impl<'q, 'r, 'a> Receipt<'q, 'r, 'a> {
    /// Create a receipt for `quote`, listing the lines of `basket`.
    pub fn new(quote: &'q Quote<'r, 'a>, basket: &'q Basket<'a>) -> Self {
        Self { quote, basket }
    }

    /// Write the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        self.write_lines(&mut out)?;
        self.write_summary(&mut out)?;
        self.write_notices(&mut out)?;

        Ok(())
    }

    fn write_lines(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Qty", "Price"]);

        for (idx, line) in self.basket.lines().iter().enumerate() {
            builder.push_record([
                format!("#{}", idx + 1),
                line.name().to_string(),
                line.quantity().to_string(),
                format_money(line.total_price()),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(2..4), Alignment::right());
        table.modify(Rows::first(), Alignment::center());

        writeln!(out, "\n{table}")?;

        Ok(())
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let quote = self.quote;
        let pricing = &quote.pricing;

        let mut rows: Vec<(String, String)> = vec![(
            "Subtotal:".to_string(),
            format_money(&quote.subtotal),
        )];

        if let Some(rule) = quote.discount.rule {
            rows.push((
                format!("{} ({}):", rule.name(), rule.headline()),
                format!("-{}", format_money(&pricing.discount)),
            ));
        }

        let delivery = match quote.mode {
            DeliveryMode::Collection => "Collection".to_string(),
            DeliveryMode::Delivery if pricing.delivery_fee.to_minor_units() == 0 => {
                "Free".to_string()
            }
            DeliveryMode::Delivery => format_money(&pricing.delivery_fee),
        };

        rows.push(("Delivery:".to_string(), delivery));
        rows.push(("Service fee:".to_string(), format_money(&pricing.service_fee)));
        rows.push(("Total:".to_string(), format_money(&pricing.total)));

        let label_width = rows.iter().map(|(label, _)| label.chars().count()).max();
        let value_width = rows.iter().map(|(_, value)| value.chars().count()).max();

        let (label_width, value_width) = (label_width.unwrap_or(0), value_width.unwrap_or(0));

        for (label, value) in &rows {
            writeln!(out, " {label:>label_width$}  {value:>value_width$}")?;
        }

        writeln!(out)?;

        Ok(())
    }

    fn write_notices(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let quote = self.quote;

        if quote.uses_fallback_fees() {
            writeln!(out, " Fees are estimated; the store fee schedule is unavailable.")?;
        }

        if quote.mode == DeliveryMode::Delivery && !quote.free_delivery.qualifies {
            writeln!(
                out,
                " Add {} more for free delivery (free from {}).",
                format_money(&quote.free_delivery.amount_needed),
                format_money(&quote.free_delivery.limit),
            )?;
        }

        for upsell in quote.upsells() {
            writeln!(
                out,
                " Spend {} more to unlock {}: {} ({}).",
                format_money(&upsell.amount_needed),
                upsell.rule.headline(),
                upsell.rule.name(),
                upsell.rule.describe(),
            )?;
        }

        if !quote.can_proceed() {
            writeln!(
                out,
                " Minimum order for delivery is {}. Add {} more to check out.",
                format_money(&quote.minimum_order.minimum),
                format_money(&quote.minimum_order.shortfall),
            )?;
        }

        Ok(())
    }
}
