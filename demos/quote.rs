//! Quote Example
//!
//! Prices a fixture basket the way the checkout page does and prints the receipt.
//!
//! Use `-f` to load a fixture set by name
//! Use `-m collection` to quote for collection instead of delivery
//! Use `-d "23/10 - Friday"` to pick the fulfilment date
//! Use `--no-fees` to quote as if the store fee schedule failed to load

use std::{
    io::{self, Write},
    time::Instant,
};

use anyhow::Result;
use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};
use jiff::Zoned;
use tracing::info;

use tally::{
    checkout::{Quote, QuoteInputs, SubmissionDetails, validate_submission},
    discounts::featured_discount,
    fixtures::Fixture,
    fulfilment::{date_options, resolve_weekday},
    receipt::Receipt,
    utils::{QuoteArgs, init_logging},
};

/// Checkout Quote Example
pub fn main() -> Result<()> {
    let args = QuoteArgs::parse();

    init_logging(args.log_format, &args.log_level)?;

    let fixture = Fixture::from_set_in(&args.fixtures_dir, &args.fixture)?;
    let basket = fixture.basket()?;
    let schedule = if args.no_fees {
        None
    } else {
        fixture.schedule()
    };

    let today = Zoned::now().date();
    let day = resolve_weekday(args.date.as_deref(), today);

    info!(fixture = %args.fixture, day, "quoting basket");

    let start = Instant::now();

    let quote = Quote::build(&QuoteInputs {
        schedule,
        rules: fixture.rules(),
        basket,
        mode: args.mode,
        day,
    })?;

    let elapsed = start.elapsed();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let offered: Vec<String> = date_options(today)
        .into_iter()
        .map(|option| option.label)
        .collect();

    writeln!(handle, "\n Fulfilment: {day} (offered: {})", offered.join(", "))?;

    if let Some(rule) = featured_discount(fixture.rules(), day) {
        writeln!(
            handle,
            " Today's deal: {} {} ({})",
            rule.headline(),
            rule.name(),
            rule.describe()
        )?;
    }

    Receipt::new(&quote, basket).write_to(&mut handle)?;

    let details = SubmissionDetails {
        address: args.address.as_deref(),
    };

    match validate_submission(&quote, &details) {
        Ok(()) => writeln!(handle, "\n Order can be placed.")?,
        Err(err) => writeln!(handle, "\n Order rejected: {err}")?,
    }

    writeln!(
        handle,
        " {} ({}s)",
        elapsed.human(Truncate::Nano),
        elapsed.as_secs_f32()
    )?;

    Ok(())
}
