//! Checkout form fields and per-step validation.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{CheckoutError, CheckoutStep};

/// A named input on the checkout form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckoutField {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    City,
    State,
    ZipCode,
    Country,
    CardNumber,
    ExpiryDate,
    Cvv,
    CardName,
}

impl CheckoutField {
    /// Every field, in form order.
    pub const ALL: [Self; 13] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Phone,
        Self::Address,
        Self::City,
        Self::State,
        Self::ZipCode,
        Self::Country,
        Self::CardNumber,
        Self::ExpiryDate,
        Self::Cvv,
        Self::CardName,
    ];

    /// Form input name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::ZipCode => "zipCode",
            Self::Country => "country",
            Self::CardNumber => "cardNumber",
            Self::ExpiryDate => "expiryDate",
            Self::Cvv => "cvv",
            Self::CardName => "cardName",
        }
    }

    /// The step this field is collected on.
    #[must_use]
    pub const fn step(self) -> CheckoutStep {
        match self {
            Self::FirstName | Self::LastName | Self::Email | Self::Phone => CheckoutStep::Personal,
            Self::Address | Self::City | Self::State | Self::ZipCode | Self::Country => {
                CheckoutStep::Shipping
            }
            Self::CardNumber | Self::ExpiryDate | Self::Cvv | Self::CardName => {
                CheckoutStep::Payment
            }
        }
    }

    /// Error shown when the field is left empty, or `None` if it is optional.
    #[must_use]
    pub const fn required_message(self) -> Option<&'static str> {
        match self {
            Self::FirstName => Some("First name is required"),
            Self::LastName => Some("Last name is required"),
            Self::Email => Some("Email is required"),
            Self::Phone => Some("Phone is required"),
            Self::Address => Some("Address is required"),
            Self::City => Some("City is required"),
            Self::State => Some("State is required"),
            Self::ZipCode => Some("ZIP code is required"),
            Self::Country => None,
            Self::CardNumber => Some("Card number is required"),
            Self::ExpiryDate => Some("Expiry date is required"),
            Self::Cvv => Some("CVV is required"),
            Self::CardName => Some("Cardholder name is required"),
        }
    }
}

impl fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CheckoutField {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| CheckoutError::UnknownField(s.to_string()))
    }
}

/// Shipping destination country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Country {
    #[default]
    #[serde(rename = "United States")]
    UnitedStates,
    Canada,
    #[serde(rename = "United Kingdom")]
    UnitedKingdom,
    Other,
}

impl Country {
    /// Selector entries in display order.
    pub const ALL: [Self; 4] = [
        Self::UnitedStates,
        Self::Canada,
        Self::UnitedKingdom,
        Self::Other,
    ];

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::UnitedStates => "United States",
            Self::Canada => "Canada",
            Self::UnitedKingdom => "United Kingdom",
            Self::Other => "Other",
        }
    }
}

impl FromStr for Country {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|country| country.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CheckoutError::InvalidCountry(s.to_string()))
    }
}

/// Values entered on the checkout form.
///
/// Card fields are kept verbatim; no format or checksum checks are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: Country,
    #[serde(skip_serializing)]
    pub card_number: String,
    #[serde(skip_serializing)]
    pub expiry_date: String,
    #[serde(skip_serializing)]
    pub cvv: String,
    pub card_name: String,
}

impl CheckoutForm {
    /// Current text of a field. Country yields its label.
    #[must_use]
    pub fn value(&self, field: CheckoutField) -> &str {
        match field {
            CheckoutField::FirstName => &self.first_name,
            CheckoutField::LastName => &self.last_name,
            CheckoutField::Email => &self.email,
            CheckoutField::Phone => &self.phone,
            CheckoutField::Address => &self.address,
            CheckoutField::City => &self.city,
            CheckoutField::State => &self.state,
            CheckoutField::ZipCode => &self.zip_code,
            CheckoutField::Country => self.country.label(),
            CheckoutField::CardNumber => &self.card_number,
            CheckoutField::ExpiryDate => &self.expiry_date,
            CheckoutField::Cvv => &self.cvv,
            CheckoutField::CardName => &self.card_name,
        }
    }

    /// Replace a field's value.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidCountry`] if `field` is the country and
    /// `value` names none of the selectable countries.
    pub fn set(&mut self, field: CheckoutField, value: impl Into<String>) -> Result<(), CheckoutError> {
        let value = value.into();
        let slot = match field {
            CheckoutField::Country => {
                self.country = value.parse()?;
                return Ok(());
            }
            CheckoutField::FirstName => &mut self.first_name,
            CheckoutField::LastName => &mut self.last_name,
            CheckoutField::Email => &mut self.email,
            CheckoutField::Phone => &mut self.phone,
            CheckoutField::Address => &mut self.address,
            CheckoutField::City => &mut self.city,
            CheckoutField::State => &mut self.state,
            CheckoutField::ZipCode => &mut self.zip_code,
            CheckoutField::CardNumber => &mut self.card_number,
            CheckoutField::ExpiryDate => &mut self.expiry_date,
            CheckoutField::Cvv => &mut self.cvv,
            CheckoutField::CardName => &mut self.card_name,
        };
        *slot = value;
        Ok(())
    }

    /// Validate the fields collected on `step`.
    ///
    /// Every required field of the step that is empty gets its "required"
    /// message. The completion step has no fields and always validates.
    #[must_use]
    pub fn validate(&self, step: CheckoutStep) -> FieldErrors {
        let mut errors = FieldErrors::default();
        for &field in step.fields() {
            if let Some(message) = field.required_message() {
                if self.value(field).is_empty() {
                    errors.insert(field, message);
                }
            }
        }
        errors
    }

    /// "First Last" as entered.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Validation messages keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<CheckoutField, String>);

impl FieldErrors {
    /// Record an error for `field`, replacing any previous one.
    pub fn insert(&mut self, field: CheckoutField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// Clear the error for `field`, returning whether one was present.
    pub fn clear(&mut self, field: CheckoutField) -> bool {
        self.0.remove(&field).is_some()
    }

    /// The error for `field`, if any.
    #[must_use]
    pub fn get(&self, field: CheckoutField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fields with errors, in form order.
    pub fn fields(&self) -> impl Iterator<Item = CheckoutField> + '_ {
        self.0.keys().copied()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_round_trip_through_from_str() {
        for field in CheckoutField::ALL {
            assert_eq!(field.name().parse::<CheckoutField>().unwrap(), field);
        }
        assert!(matches!(
            "nickname".parse::<CheckoutField>(),
            Err(CheckoutError::UnknownField(_))
        ));
    }

    #[test]
    fn test_serde_names_match_form_names() {
        let json = serde_json::to_string(&CheckoutField::ZipCode).unwrap();
        assert_eq!(json, "\"zipCode\"");
    }

    #[test]
    fn test_validate_personal_reports_each_empty_field() {
        let mut form = CheckoutForm::default();
        form.set(CheckoutField::FirstName, "Ada").unwrap();
        let errors = form.validate(CheckoutStep::Personal);
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(CheckoutField::LastName), Some("Last name is required"));
        assert_eq!(errors.get(CheckoutField::Email), Some("Email is required"));
        assert_eq!(errors.get(CheckoutField::Phone), Some("Phone is required"));
        assert!(errors.get(CheckoutField::FirstName).is_none());
    }

    #[test]
    fn test_validate_shipping_never_flags_country() {
        let errors = CheckoutForm::default().validate(CheckoutStep::Shipping);
        assert_eq!(errors.len(), 4);
        assert!(errors.get(CheckoutField::Country).is_none());
        assert_eq!(errors.get(CheckoutField::ZipCode), Some("ZIP code is required"));
    }

    #[test]
    fn test_validate_payment_has_no_format_checks() {
        let mut form = CheckoutForm::default();
        form.set(CheckoutField::CardNumber, "not a card").unwrap();
        form.set(CheckoutField::ExpiryDate, "13/99").unwrap();
        form.set(CheckoutField::Cvv, "x").unwrap();
        form.set(CheckoutField::CardName, "A").unwrap();
        assert!(form.validate(CheckoutStep::Payment).is_empty());
    }

    #[test]
    fn test_whitespace_counts_as_filled() {
        let mut form = CheckoutForm::default();
        form.set(CheckoutField::City, " ").unwrap();
        assert!(form.validate(CheckoutStep::Shipping).get(CheckoutField::City).is_none());
    }

    #[test]
    fn test_country_defaults_and_parses() {
        let mut form = CheckoutForm::default();
        assert_eq!(form.country, Country::UnitedStates);
        form.set(CheckoutField::Country, "united kingdom").unwrap();
        assert_eq!(form.country, Country::UnitedKingdom);
        assert!(matches!(
            form.set(CheckoutField::Country, "Atlantis"),
            Err(CheckoutError::InvalidCountry(_))
        ));
        assert_eq!(form.value(CheckoutField::Country), "United Kingdom");
    }

    #[test]
    fn test_serialized_form_omits_card_secrets() {
        let mut form = CheckoutForm::default();
        form.set(CheckoutField::CardNumber, "4242424242424242").unwrap();
        form.set(CheckoutField::Cvv, "123").unwrap();
        let json = serde_json::to_string(&form).unwrap();
        assert!(!json.contains("4242"));
        assert!(!json.contains("cvv"));
        assert!(json.contains("\"country\":\"United States\""));
    }

    #[test]
    fn test_clear_single_error() {
        let mut errors = CheckoutForm::default().validate(CheckoutStep::Personal);
        assert!(errors.clear(CheckoutField::Email));
        assert!(!errors.clear(CheckoutField::Email));
        assert_eq!(errors.len(), 3);
    }
}
