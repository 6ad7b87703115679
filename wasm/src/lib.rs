//! WebAssembly module for the Landed Cost Dashboard
//!
//! Provides client-side computation for:
//! - Live cost totals while a dialog is edited
//! - Form validation with the same messages as the server
//! - List filtering and money formatting

use serde::de::DeserializeOwned;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use shared::costs;
use shared::forms::{parse_form, CostTypeForm, FormError, LotForm, ProductForm, RecordForm, ShipmentForm};
use shared::models::{CostType, LotListing, Product, Role, SessionUser, Shipment};
use shared::search::{filter_records, Searchable};
use shared::session::Session;
use shared::types;
use shared::validation::FieldErrors;
use shared::view::navigation_for;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("landed-cost-wasm ready"));
}

fn js_error(message: String) -> JsValue {
    js_sys::Error::new(&message).into()
}

fn parse_json(json: &str) -> Result<Value, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid JSON: {}", e))
}

/// Live landed cost of in-progress product values
#[wasm_bindgen]
pub fn product_cost_total(values_json: &str) -> Result<f64, JsValue> {
    parse_json(values_json)
        .map(|values| costs::product_cost_total(&values))
        .map_err(js_error)
}

/// Live total of in-progress shipment values
#[wasm_bindgen]
pub fn shipment_cost_total(values_json: &str) -> Result<f64, JsValue> {
    parse_json(values_json)
        .map(|values| costs::shipment_cost_total(&values))
        .map_err(js_error)
}

/// "100.00 €"
#[wasm_bindgen]
pub fn format_money(amount: f64, currency: &str) -> String {
    types::format_money(amount, currency)
}

/// Validate dialog values; returns a JSON object of field messages, empty when valid
#[wasm_bindgen]
pub fn validate_form(resource: &str, values_json: &str) -> Result<String, JsValue> {
    field_errors(resource, values_json)
        .and_then(|errors| serde_json::to_string(&errors).map_err(|e| e.to_string()))
        .map_err(js_error)
}

/// Filter a JSON array of records by a search term; returns the matching records
#[wasm_bindgen]
pub fn filter(resource: &str, records_json: &str, term: &str) -> Result<String, JsValue> {
    filter_json(resource, records_json, term).map_err(js_error)
}

/// Sidebar entries for a role, as JSON
#[wasm_bindgen]
pub fn navigation(role: &str) -> Result<String, JsValue> {
    navigation_json(role).map_err(js_error)
}

fn field_errors(resource: &str, values_json: &str) -> Result<FieldErrors, String> {
    let values = parse_json(values_json)?;
    match resource {
        "products" => check::<ProductForm>(values),
        "shipments" => check::<ShipmentForm>(values),
        "lots" => check::<LotForm>(values),
        "cost-types" => check::<CostTypeForm>(values),
        other => Err(format!("Unknown resource: {}", other)),
    }
}

fn check<F: RecordForm>(values: Value) -> Result<FieldErrors, String> {
    match parse_form::<F>(values) {
        Ok(_) => Ok(FieldErrors::new()),
        Err(FormError::Invalid(fields)) => Ok(fields),
        Err(FormError::Malformed(message)) => Err(message),
    }
}

fn filter_json(resource: &str, records_json: &str, term: &str) -> Result<String, String> {
    match resource {
        "products" => filter_as::<Product>(records_json, term),
        "shipments" => filter_as::<Shipment>(records_json, term),
        "lots" => filter_as::<LotListing>(records_json, term),
        "cost-types" => filter_as::<CostType>(records_json, term),
        other => Err(format!("Unknown resource: {}", other)),
    }
}

fn filter_as<T>(records_json: &str, term: &str) -> Result<String, String>
where
    T: Searchable + DeserializeOwned + serde::Serialize,
{
    let records: Vec<T> =
        serde_json::from_str(records_json).map_err(|e| format!("Invalid records JSON: {}", e))?;
    serde_json::to_string(&filter_records(&records, term)).map_err(|e| e.to_string())
}

fn navigation_json(role: &str) -> Result<String, String> {
    let role: Role = serde_json::from_value(Value::String(role.to_string()))
        .map_err(|_| format!("Unknown role: {}", role))?;
    let session = Session::signed_in(SessionUser {
        id: String::new(),
        email: String::new(),
        name: String::new(),
        role,
    });
    serde_json::to_string(&navigation_for(&session)).map_err(|e| e.to_string())
}
