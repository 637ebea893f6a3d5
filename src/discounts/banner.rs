//! Promotional banner

use crate::amounts::format_money;

use super::{DiscountRule, day_eligible};

/// The discount to advertise on `day`: the first rule that applies that day, whatever the spend.
pub fn featured_discount<'r, 'a>(
    rules: &'r [DiscountRule<'a>],
    day: &str,
) -> Option<&'r DiscountRule<'a>> {
    day_eligible(rules, day).next()
}

impl DiscountRule<'_> {
    /// Banner description, e.g. `Monday, Tuesday • Min. purchase: €15.00`.
    ///
    /// Rules without a day restriction, or listing all seven days, read `Every day`.
    pub fn describe(&self) -> String {
        let mut description = if self.days().is_empty() || self.days().len() == 7 {
            String::from("Every day")
        } else {
            self.days()
                .iter()
                .map(super::DayName::capitalised)
                .collect::<Vec<_>>()
                .join(", ")
        };

        if self.minimum_minor() > 0
            && let Some(minimum) = self.minimum_purchase()
        {
            description.push_str(" • Min. purchase: ");
            description.push_str(&format_money(minimum));
        }

        description
    }
}
