//! Fulfilment dates
//!
//! Discounts are evaluated for the day the order is fulfilled, not the day it is placed. The
//! checkout offers a short list of dates labelled like `24/10 - Friday`; this module produces
//! that list and turns a selected label back into a weekday name.

use jiff::civil::{Date, Weekday};
use tracing::debug;

/// Number of fulfilment dates offered, today included.
pub const DATE_OPTION_COUNT: usize = 8;

/// A selectable fulfilment date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateOption {
    /// The calendar date
    pub date: Date,

    /// Label submitted with the order, e.g. `25/10 - Tomorrow`
    pub label: String,
}

/// English weekday name, e.g. `Monday`.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Monday",
        Weekday::Tuesday => "Tuesday",
        Weekday::Wednesday => "Wednesday",
        Weekday::Thursday => "Thursday",
        Weekday::Friday => "Friday",
        Weekday::Saturday => "Saturday",
        Weekday::Sunday => "Sunday",
    }
}

/// The fulfilment dates on offer, starting with `today`.
pub fn date_options(today: Date) -> Vec<DateOption> {
    let mut options = Vec::with_capacity(DATE_OPTION_COUNT);
    let mut date = today;

    for offset in 0..DATE_OPTION_COUNT {
        let suffix = match offset {
            0 => "Today",
            1 => "Tomorrow",
            _ => weekday_name(date.weekday()),
        };

        options.push(DateOption {
            date,
            label: format!("{:02}/{:02} - {suffix}", date.day(), date.month()),
        });

        let Ok(next) = date.tomorrow() else {
            break;
        };

        date = next;
    }

    options
}

/// Weekday name for the selected fulfilment date, or for `today` when none is usable.
///
/// Accepts `DD/MM` or `DD.MM`, optionally followed by ` - <label>`. The date is placed in
/// `today`'s year, or the next one when that would put it in the past, so options spanning
/// New Year resolve correctly.
pub fn resolve_weekday(selected: Option<&str>, today: Date) -> &'static str {
    let Some(selected) = selected.filter(|s| !s.trim().is_empty()) else {
        return weekday_name(today.weekday());
    };

    if let Some(date) = parse_selected(selected, today) {
        weekday_name(date.weekday())
    } else {
        debug!(selected, "could not read fulfilment date; using today");

        weekday_name(today.weekday())
    }
}

/// Parse a selected date label relative to `today`.
pub fn parse_selected(selected: &str, today: Date) -> Option<Date> {
    let date_part = selected.split(" - ").next()?.trim().replace('.', "/");

    let mut parts = date_part.split('/');
    let day = parts.next()?.trim().parse::<i8>().ok()?;
    let month = parts.next()?.trim().parse::<i8>().ok()?;

    if parts.next().is_some() {
        return None;
    }

    let date = Date::new(today.year(), month, day).ok()?;

    if date >= today {
        return Some(date);
    }

    Date::new(today.year().checked_add(1)?, month, day).ok()
}
