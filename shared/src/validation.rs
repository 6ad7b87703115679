//! Validation utilities for dashboard forms
//!
//! Form inputs arrive loosely typed (numbers may be sent as text, optional
//! fields as blank strings). This module coerces them and provides the custom
//! checks used by the `validator` derives in [`crate::forms`].

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::costs::coerce_number;

// ============================================================================
// Numeric coercion
// ============================================================================

/// A numeric form input
///
/// Accepts a JSON number or a numeric string. Blank input is zero. Input that
/// cannot be read as a number is kept as NaN so that validation can report it
/// against the field instead of rejecting the whole form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NumberInput(pub f64);

impl NumberInput {
    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_number(&self) -> bool {
        self.0.is_finite()
    }
}

impl From<f64> for NumberInput {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for NumberInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(NumberInput(coerce_number(&raw).unwrap_or(f64::NAN)))
    }
}

/// Deserialize an optional numeric input; blank or `null` means absent
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<NumberInput>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(other) => Some(NumberInput(coerce_number(&other).unwrap_or(f64::NAN))),
    })
}

/// Blank text is absent
pub fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

// ============================================================================
// Custom field validators
// ============================================================================

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Non-negative amount
pub fn validate_amount(value: &NumberInput) -> Result<(), ValidationError> {
    if value.is_number() && value.0 >= 0.0 {
        Ok(())
    } else {
        Err(field_error("amount", "Montant invalide"))
    }
}

/// Any readable number
pub fn validate_number(value: &NumberInput) -> Result<(), ValidationError> {
    if value.is_number() {
        Ok(())
    } else {
        Err(field_error("number", "Nombre invalide"))
    }
}

/// Lot quantity, at least one unit
pub fn validate_quantity(value: &NumberInput) -> Result<(), ValidationError> {
    if value.is_number() && value.0 >= 1.0 {
        Ok(())
    } else {
        Err(field_error("quantity", "Quantité requise"))
    }
}

/// Percentage rate between 0 and 100
pub fn validate_rate(value: &NumberInput) -> Result<(), ValidationError> {
    if value.is_number() && (0.0..=100.0).contains(&value.0) {
        Ok(())
    } else {
        Err(field_error("rate", "Taux invalide"))
    }
}

/// ISO date; blank input is left to the presence checks
pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || parse_date(value).is_some() {
        Ok(())
    } else {
        Err(field_error("date", "Date invalide"))
    }
}

// ============================================================================
// Field-level error reporting
// ============================================================================

/// First validation message per field, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            if let Some(first) = errs.first() {
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| first.code.to_string());
                fields.insert(field, message);
            }
        }
        fields
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        f.write_str(&parts.join(", "))
    }
}

/// Run the derived schema checks of a form
pub fn check_form<T: Validate>(form: &T) -> Result<(), FieldErrors> {
    form.validate().map_err(|errors| FieldErrors::from(&errors))
}
