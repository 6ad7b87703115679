//! Cost aggregation for landed-cost breakdowns
//!
//! Totals are plain sums over a fixed, ordered list of named components.
//! Missing or non-numeric values count as zero so that a total can be shown
//! while a form is still being filled in.

use serde_json::Value;

/// Product cost components, in display order
pub const PRODUCT_COST_FIELDS: [&str; 6] = [
    "achat_fournisseur",
    "transport",
    "assurance",
    "douane_taxes",
    "stockage",
    "autres_indirects",
];

/// Shipment cost components, in display order
pub const SHIPMENT_COST_FIELDS: [&str; 4] = [
    "cout_total_douane",
    "cout_total_transport",
    "cout_total_assurance",
    "cout_total_manutention",
];

/// Sum cost components, treating non-finite values as zero
pub fn sum_components<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(0.0, |total, v| total + v)
}

/// Sum optional cost components, treating absent values as zero
pub fn sum_optional_components<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    sum_components(values.into_iter().map(|v| v.unwrap_or(0.0)))
}

/// Coerce a loosely typed form value into a number
///
/// Follows the usual form-input rules: numbers pass through, numeric strings
/// are parsed, blank strings and `null` are zero, booleans are 0/1. Anything
/// else yields `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
            }
        }
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Total of the named fields of a JSON object of in-progress form values
pub fn total_of_fields(values: &Value, fields: &[&str]) -> f64 {
    sum_optional_components(
        fields
            .iter()
            .map(|field| values.get(*field).and_then(coerce_number)),
    )
}

/// Live product cost total (six components)
pub fn product_cost_total(values: &Value) -> f64 {
    total_of_fields(values, &PRODUCT_COST_FIELDS)
}

/// Live shipment cost total (four components)
pub fn shipment_cost_total(values: &Value) -> f64 {
    total_of_fields(values, &SHIPMENT_COST_FIELDS)
}
