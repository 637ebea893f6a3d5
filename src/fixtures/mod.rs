//! Fixtures
//!
//! YAML fixture sets for demos and tests. A set named `lunch` is read from
//! `<base>/baskets/lunch.yml`, `<base>/fees/lunch.yml` and `<base>/discounts/lunch.yml`.

use std::{fs, path::PathBuf};

use rusty_money::iso::Currency;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    basket::{Basket, BasketError},
    discounts::DiscountRule,
    fees::FeeSchedule,
    fixtures::{baskets::BasketFixture, discounts::DiscountsFixture, fees::FeesFixture},
    wire::rules_from_payloads,
};

pub mod baskets;
pub mod discounts;
pub mod fees;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between fixture files
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Nothing priced loaded yet
    #[error("No basket or fees loaded yet; currency unknown")]
    NoCurrency,

    /// No basket loaded
    #[error("No basket loaded")]
    NoBasket,

    /// Basket creation error
    #[error("Failed to create basket: {0}")]
    Basket(#[from] BasketError),
}

/// A basket with the store's fees and discounts, loaded from YAML.
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    basket: Option<Basket<'a>>,
    schedule: Option<FeeSchedule<'a>>,
    rules: Vec<DiscountRule<'a>>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            basket: None,
            schedule: None,
            rules: Vec::new(),
            currency: None,
        }
    }

    /// Load basket lines from `baskets/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a price is in another currency
    /// than what is already loaded.
    pub fn load_basket(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: BasketFixture = self.read("baskets", name)?;
        let (lines, currency) = fixture.into_lines()?;

        let currency = self.settle_currency(currency)?;

        self.basket = Some(Basket::with_lines(lines, currency)?);

        Ok(self)
    }

    /// Load the fee schedule from `fees/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a fee is in another currency
    /// than what is already loaded.
    pub fn load_fees(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: FeesFixture = self.read("fees", name)?;
        let schedule = fixture.into_schedule()?;

        self.settle_currency(schedule.currency())?;
        self.schedule = Some(schedule);

        Ok(self)
    }

    /// Load discounts from `discounts/<name>.yml`, priced in the currency already loaded.
    ///
    /// Discounts of an unknown type are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if neither a basket nor fees
    /// have been loaded yet.
    pub fn load_discounts(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let currency = self.currency.ok_or(FixtureError::NoCurrency)?;
        let fixture: DiscountsFixture = self.read("discounts", name)?;

        self.rules = rules_from_payloads(fixture.discounts, currency);

        Ok(self)
    }

    /// Load a complete fixture set (basket, fees and discounts with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in("./fixtures", name)
    }

    /// Load a complete fixture set from a custom base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set_in(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path);

        fixture
            .load_basket(name)?
            .load_fees(name)?
            .load_discounts(name)?;

        Ok(fixture)
    }

    /// Get the basket
    ///
    /// # Errors
    ///
    /// Returns an error if no basket has been loaded.
    pub fn basket(&self) -> Result<&Basket<'a>, FixtureError> {
        self.basket.as_ref().ok_or(FixtureError::NoBasket)
    }

    /// Get the fee schedule, if loaded
    pub fn schedule(&self) -> Option<&FeeSchedule<'a>> {
        self.schedule.as_ref()
    }

    /// Get the discount rules in file order
    pub fn rules(&self) -> &[DiscountRule<'a>] {
        &self.rules
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if nothing priced has been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    fn read<T: DeserializeOwned>(&self, kind: &str, name: &str) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }

    fn settle_currency(
        &mut self,
        currency: &'static Currency,
    ) -> Result<&'static Currency, FixtureError> {
        match self.currency {
            Some(existing) if existing != currency => Err(FixtureError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            )),
            Some(existing) => Ok(existing),
            None => {
                self.currency = Some(currency);
                Ok(currency)
            }
        }
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use rusty_money::{
        Money,
        iso::{EUR, GBP},
    };
    use testresult::TestResult;

    use super::*;

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    fn write_set(base: &Path) -> TestResult {
        write_fixture(
            base,
            "baskets",
            "set",
            "lines:\n  - name: Wrap\n    quantity: 2\n    price: 12.00 EUR\n  - name: Soup\n    price: 8.00 EUR\n",
        )?;
        write_fixture(
            base,
            "fees",
            "set",
            "delivery_fee: 3.00 EUR\nfree_delivery_limit: 12.00 EUR\nservice_fee: 0.99 EUR\nmin_order: 10.00 EUR\n",
        )?;
        write_fixture(
            base,
            "discounts",
            "set",
            "discounts:\n  - id: 1\n    name: Tenth off\n    discount_type: percentage\n    discount_value: 10\n  - id: 2\n    name: Mystery\n    discount_type: bogof\n    discount_value: 1\n",
        )?;

        Ok(())
    }

    #[test]
    fn loads_a_complete_set() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_set(dir.path())?;

        let fixture = Fixture::from_set_in(dir.path(), "set")?;
        let basket = fixture.basket()?;

        assert_eq!(basket.len(), 2);
        assert_eq!(basket.subtotal()?, Money::from_minor(2000, EUR));
        assert_eq!(fixture.currency()?, EUR);

        let schedule = fixture.schedule().ok_or("missing schedule")?;

        assert_eq!(schedule.service_fee(), Money::from_minor(99, EUR));

        let ids: Vec<u64> = fixture.rules().iter().map(DiscountRule::id).collect();

        assert_eq!(ids, [1]);

        Ok(())
    }

    #[test]
    fn discounts_need_a_currency() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_set(dir.path())?;

        let mut fixture = Fixture::with_base_path(dir.path());

        assert!(matches!(
            fixture.load_discounts("set"),
            Err(FixtureError::NoCurrency)
        ));

        Ok(())
    }

    #[test]
    fn mixed_currencies_are_rejected() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_set(dir.path())?;
        write_fixture(
            dir.path(),
            "fees",
            "pounds",
            "delivery_fee: 3.00 GBP\nfree_delivery_limit: 12.00 GBP\nservice_fee: 0.99 GBP\nmin_order: 10.00 GBP\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_basket("set")?;

        let result = fixture.load_fees("pounds");

        assert!(matches!(
            result,
            Err(FixtureError::CurrencyMismatch(expected, found))
                if expected == EUR.iso_alpha_code && found == GBP.iso_alpha_code
        ));

        Ok(())
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut fixture = Fixture::with_base_path("./does-not-exist");

        assert!(matches!(
            fixture.load_basket("nope"),
            Err(FixtureError::Io(_))
        ));
    }

    #[test]
    fn basket_is_required() {
        let fixture = Fixture::new();

        assert!(matches!(fixture.basket(), Err(FixtureError::NoBasket)));
        assert!(fixture.schedule().is_none());
        assert!(fixture.rules().is_empty());
    }
}
