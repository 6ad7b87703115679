//! Mutation dialog form schemas
//!
//! Each editable entity has a form (the loosely typed values being edited)
//! and a payload (what is written to the store). Forms are validated with
//! `validator` derives before any remote call is made.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use validator::Validate;

use crate::costs::sum_components;
use crate::models::{
    CostCategory, CostType, Lot, LotStatus, Product, ProductCosts, ProductStatus, Shipment,
    ShipmentStatus,
};
use crate::validation::{
    check_form, non_empty, optional_number, validate_amount, validate_date, validate_number,
    validate_quantity, validate_rate, FieldErrors, NumberInput,
};

pub const DEFAULT_CURRENCY: &str = "EUR";
pub const DEFAULT_UNIT: &str = "pièce";

/// Form parsing errors
#[derive(Debug, Error)]
pub enum FormError {
    #[error("form data is not an object of the expected shape: {0}")]
    Malformed(String),

    #[error("form validation failed: {0}")]
    Invalid(FieldErrors),
}

impl FormError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            FormError::Invalid(fields) => Some(fields),
            FormError::Malformed(_) => None,
        }
    }
}

/// Schema of a mutation dialog for one entity type
pub trait RecordForm:
    Validate + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Stored record the form edits
    type Record;
    /// Row written to the store on submit
    type Payload: Serialize;

    /// Values shown in create mode
    fn defaults() -> Self;

    /// Values shown in edit mode
    fn from_record(record: &Self::Record) -> Self;

    /// Build the payload; optional blank values become `None`
    fn to_payload(&self) -> Self::Payload;

    /// Derived total recomputed from the in-progress values
    fn live_total(&self) -> Option<f64> {
        None
    }

    fn check(&self) -> Result<(), FieldErrors> {
        check_form(self)
    }
}

/// Deserialize in-progress form values without validating them
pub fn read_form<F: RecordForm>(values: Value) -> Result<F, FormError> {
    // serde fills structs from arrays by position; only objects are forms
    if !values.is_object() {
        return Err(FormError::Malformed(format!(
            "expected an object, got {}",
            kind_of(&values)
        )));
    }
    serde_json::from_value(values).map_err(|e| FormError::Malformed(e.to_string()))
}

/// Deserialize and validate submitted form values
pub fn parse_form<F: RecordForm>(values: Value) -> Result<F, FormError> {
    let form: F = read_form(values)?;
    form.check().map_err(FormError::Invalid)?;
    Ok(form)
}

/// One entry of a dialog choice list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// Choice lists of a dialog, keyed by the form field they fill
pub type FormChoices = BTreeMap<&'static str, Vec<Choice>>;

/// Products offered by the lot dialog, labelled "nom (sku)"
pub fn product_choices(products: &[Product]) -> Vec<Choice> {
    products
        .iter()
        .map(|p| Choice {
            value: p.id.clone(),
            label: format!("{} ({})", p.nom, p.sku),
        })
        .collect()
}

/// Shipments offered by the lot dialog, labelled "fournisseur - reference"
pub fn shipment_choices(shipments: &[Shipment]) -> Vec<Choice> {
    shipments
        .iter()
        .map(|s| Choice {
            value: s.id_expedition.clone(),
            label: format!("{} - {}", s.fournisseur, s.reference),
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn optional_value(value: Option<NumberInput>) -> Option<f64> {
    value.map(|v| v.value())
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_true() -> bool {
    true
}

fn default_quantity() -> NumberInput {
    NumberInput(1.0)
}

// ============================================================================
// Products
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "SKU requis"))]
    pub sku: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Code-barres requis"))]
    pub barcode: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Nom requis"))]
    pub nom: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categorie: String,
    #[serde(default)]
    pub marque: String,
    #[serde(default)]
    pub origine: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Unité de mesure requise"))]
    pub unite_mesure: String,
    #[serde(default, deserialize_with = "optional_number")]
    #[validate(custom = "validate_number")]
    pub quantite_par_unite: Option<NumberInput>,
    #[serde(default)]
    pub couleur: String,
    #[serde(default)]
    pub taille: String,
    #[serde(default)]
    pub modele: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub statut: ProductStatus,
    #[serde(default)]
    #[validate(length(min = 1, message = "Devise requise"))]
    pub devise: String,
    #[serde(default)]
    #[validate(custom = "validate_amount")]
    pub achat_fournisseur: NumberInput,
    #[serde(default)]
    #[validate(custom = "validate_amount")]
    pub transport: NumberInput,
    #[serde(default)]
    #[validate(custom = "validate_amount")]
    pub assurance: NumberInput,
    #[serde(default)]
    #[validate(custom = "validate_amount")]
    pub douane_taxes: NumberInput,
    #[serde(default)]
    #[validate(custom = "validate_amount")]
    pub stockage: NumberInput,
    #[serde(default)]
    #[validate(custom = "validate_amount")]
    pub autres_indirects: NumberInput,
}

/// Product row as written to the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPayload {
    pub sku: String,
    pub barcode: String,
    pub nom: String,
    pub description: Option<String>,
    pub categorie: Option<String>,
    pub marque: Option<String>,
    pub origine: Option<String>,
    pub unite_mesure: String,
    pub quantite_par_unite: Option<f64>,
    pub couleur: Option<String>,
    pub taille: Option<String>,
    pub modele: Option<String>,
    pub version: Option<String>,
    pub statut: ProductStatus,
    pub devise: String,
    pub couts: ProductCosts,
}

impl ProductForm {
    pub fn costs(&self) -> ProductCosts {
        ProductCosts {
            achat_fournisseur: self.achat_fournisseur.value(),
            transport: self.transport.value(),
            assurance: self.assurance.value(),
            douane_taxes: self.douane_taxes.value(),
            stockage: self.stockage.value(),
            autres_indirects: self.autres_indirects.value(),
            total_revient: 0.0,
        }
        .with_computed_total()
    }
}

impl RecordForm for ProductForm {
    type Record = Product;
    type Payload = ProductPayload;

    fn defaults() -> Self {
        Self {
            sku: String::new(),
            barcode: String::new(),
            nom: String::new(),
            description: String::new(),
            categorie: String::new(),
            marque: String::new(),
            origine: String::new(),
            unite_mesure: DEFAULT_UNIT.to_string(),
            quantite_par_unite: None,
            couleur: String::new(),
            taille: String::new(),
            modele: String::new(),
            version: String::new(),
            statut: ProductStatus::default(),
            devise: default_currency(),
            achat_fournisseur: NumberInput::default(),
            transport: NumberInput::default(),
            assurance: NumberInput::default(),
            douane_taxes: NumberInput::default(),
            stockage: NumberInput::default(),
            autres_indirects: NumberInput::default(),
        }
    }

    fn from_record(product: &Product) -> Self {
        let couts = &product.couts;
        Self {
            sku: product.sku.clone(),
            barcode: product.barcode.clone(),
            nom: product.nom.clone(),
            description: text(&product.description),
            categorie: text(&product.categorie),
            marque: text(&product.marque),
            origine: text(&product.origine),
            unite_mesure: product.unite_mesure.clone(),
            quantite_par_unite: product.quantite_par_unite.map(NumberInput),
            couleur: text(&product.couleur),
            taille: text(&product.taille),
            modele: text(&product.modele),
            version: text(&product.version),
            statut: product.statut,
            devise: product.devise.clone(),
            achat_fournisseur: NumberInput(couts.achat_fournisseur),
            transport: NumberInput(couts.transport),
            assurance: NumberInput(couts.assurance),
            douane_taxes: NumberInput(couts.douane_taxes),
            stockage: NumberInput(couts.stockage),
            autres_indirects: NumberInput(couts.autres_indirects),
        }
    }

    fn to_payload(&self) -> ProductPayload {
        ProductPayload {
            sku: self.sku.clone(),
            barcode: self.barcode.clone(),
            nom: self.nom.clone(),
            description: non_empty(self.description.clone()),
            categorie: non_empty(self.categorie.clone()),
            marque: non_empty(self.marque.clone()),
            origine: non_empty(self.origine.clone()),
            unite_mesure: self.unite_mesure.clone(),
            quantite_par_unite: optional_value(self.quantite_par_unite),
            couleur: non_empty(self.couleur.clone()),
            taille: non_empty(self.taille.clone()),
            modele: non_empty(self.modele.clone()),
            version: non_empty(self.version.clone()),
            statut: self.statut,
            devise: self.devise.clone(),
            couts: self.costs(),
        }
    }

    fn live_total(&self) -> Option<f64> {
        Some(self.costs().total_revient)
    }
}

// ============================================================================
// Shipments
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ShipmentForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "ID expédition requis"))]
    pub id_expedition: String,
    #[serde(default, alias = "ref_conteneur")]
    #[validate(length(min = 1, message = "Référence conteneur requise"))]
    pub reference: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Fournisseur requis"))]
    pub fournisseur: String,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Date de départ requise"),
        custom = "validate_date"
    )]
    pub date_depart: String,
    #[serde(default)]
    #[validate(custom = "validate_date")]
    pub date_reception: String,
    #[serde(default)]
    pub statut: ShipmentStatus,
    #[serde(default)]
    #[validate(length(min = 1, message = "Devise requise"))]
    pub devise: String,
    #[serde(default)]
    #[validate(custom = "validate_amount")]
    pub cout_total_douane: NumberInput,
    #[serde(default)]
    #[validate(custom = "validate_amount")]
    pub cout_total_transport: NumberInput,
    #[serde(default)]
    #[validate(custom = "validate_amount")]
    pub cout_total_assurance: NumberInput,
    #[serde(default)]
    #[validate(custom = "validate_amount")]
    pub cout_total_manutention: NumberInput,
}

/// Shipment row as written to the store; `cout_total` is left to the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentPayload {
    pub id_expedition: String,
    pub reference: String,
    pub fournisseur: String,
    pub date_depart: String,
    pub date_reception: Option<String>,
    pub statut: ShipmentStatus,
    pub devise: String,
    pub cout_total_douane: f64,
    pub cout_total_transport: f64,
    pub cout_total_assurance: f64,
    pub cout_total_manutention: f64,
}

impl RecordForm for ShipmentForm {
    type Record = Shipment;
    type Payload = ShipmentPayload;

    fn defaults() -> Self {
        Self {
            id_expedition: String::new(),
            reference: String::new(),
            fournisseur: String::new(),
            date_depart: String::new(),
            date_reception: String::new(),
            statut: ShipmentStatus::default(),
            devise: default_currency(),
            cout_total_douane: NumberInput::default(),
            cout_total_transport: NumberInput::default(),
            cout_total_assurance: NumberInput::default(),
            cout_total_manutention: NumberInput::default(),
        }
    }

    fn from_record(shipment: &Shipment) -> Self {
        Self {
            id_expedition: shipment.id_expedition.clone(),
            reference: shipment.reference.clone(),
            fournisseur: shipment.fournisseur.clone(),
            date_depart: shipment.date_depart.format("%Y-%m-%d").to_string(),
            date_reception: shipment
                .date_reception
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            statut: shipment.statut,
            devise: shipment.devise.clone(),
            cout_total_douane: NumberInput(shipment.cout_total_douane),
            cout_total_transport: NumberInput(shipment.cout_total_transport),
            cout_total_assurance: NumberInput(shipment.cout_total_assurance),
            cout_total_manutention: NumberInput(shipment.cout_total_manutention),
        }
    }

    fn to_payload(&self) -> ShipmentPayload {
        ShipmentPayload {
            id_expedition: self.id_expedition.clone(),
            reference: self.reference.clone(),
            fournisseur: self.fournisseur.clone(),
            date_depart: self.date_depart.clone(),
            date_reception: non_empty(self.date_reception.clone()),
            statut: self.statut,
            devise: self.devise.clone(),
            cout_total_douane: self.cout_total_douane.value(),
            cout_total_transport: self.cout_total_transport.value(),
            cout_total_assurance: self.cout_total_assurance.value(),
            cout_total_manutention: self.cout_total_manutention.value(),
        }
    }

    fn live_total(&self) -> Option<f64> {
        Some(sum_components([
            self.cout_total_douane.value(),
            self.cout_total_transport.value(),
            self.cout_total_assurance.value(),
            self.cout_total_manutention.value(),
        ]))
    }
}

// ============================================================================
// Lots
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LotForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "ID lot requis"))]
    pub id_lot: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Produit requis"))]
    pub id_produit: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Expédition requise"))]
    pub id_expedition: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "SKU physique requis"))]
    pub sku_physique: String,
    #[serde(default)]
    #[validate(custom = "validate_amount")]
    pub cout_achat_unitaire: NumberInput,
    #[serde(default = "default_quantity")]
    #[validate(custom = "validate_quantity")]
    pub quantite_totale: NumberInput,
    #[serde(default, deserialize_with = "optional_number")]
    #[validate(custom = "validate_amount")]
    pub poids_total_kg: Option<NumberInput>,
    #[serde(default, deserialize_with = "optional_number")]
    #[validate(custom = "validate_amount")]
    pub volume_total_m3: Option<NumberInput>,
    #[serde(default)]
    #[validate(custom = "validate_date")]
    pub date_peremption: String,
    #[serde(default)]
    pub statut: LotStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotPayload {
    pub id_lot: String,
    pub id_produit: String,
    pub id_expedition: String,
    pub sku_physique: String,
    pub cout_achat_unitaire: f64,
    pub quantite_totale: f64,
    pub poids_total_kg: Option<f64>,
    pub volume_total_m3: Option<f64>,
    pub date_peremption: Option<String>,
    pub statut: LotStatus,
}

impl RecordForm for LotForm {
    type Record = Lot;
    type Payload = LotPayload;

    fn defaults() -> Self {
        Self {
            id_lot: String::new(),
            id_produit: String::new(),
            id_expedition: String::new(),
            sku_physique: String::new(),
            cout_achat_unitaire: NumberInput::default(),
            quantite_totale: default_quantity(),
            poids_total_kg: None,
            volume_total_m3: None,
            date_peremption: String::new(),
            statut: LotStatus::default(),
        }
    }

    fn from_record(lot: &Lot) -> Self {
        Self {
            id_lot: lot.id_lot.clone(),
            id_produit: lot.id_produit.clone(),
            id_expedition: lot.id_expedition.clone(),
            sku_physique: lot.sku_physique.clone(),
            cout_achat_unitaire: NumberInput(lot.cout_achat_unitaire),
            quantite_totale: NumberInput(lot.quantite_totale),
            poids_total_kg: lot.poids_total_kg.map(NumberInput),
            volume_total_m3: lot.volume_total_m3.map(NumberInput),
            date_peremption: lot
                .date_peremption
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            statut: lot.statut,
        }
    }

    fn to_payload(&self) -> LotPayload {
        LotPayload {
            id_lot: self.id_lot.clone(),
            id_produit: self.id_produit.clone(),
            id_expedition: self.id_expedition.clone(),
            sku_physique: self.sku_physique.clone(),
            cout_achat_unitaire: self.cout_achat_unitaire.value(),
            quantite_totale: self.quantite_totale.value(),
            poids_total_kg: optional_value(self.poids_total_kg),
            volume_total_m3: optional_value(self.volume_total_m3),
            date_peremption: non_empty(self.date_peremption.clone()),
            statut: self.statut,
        }
    }
}

// ============================================================================
// Cost types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CostTypeForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Code requis"))]
    pub code: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Nom requis"))]
    pub nom: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categorie: CostCategory,
    #[serde(default)]
    pub unite_calcul: String,
    #[serde(default, deserialize_with = "optional_number")]
    #[validate(custom = "validate_rate")]
    pub taux_defaut: Option<NumberInput>,
    #[serde(default = "default_true")]
    pub actif: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostTypePayload {
    pub code: String,
    pub nom: String,
    pub description: Option<String>,
    pub categorie: CostCategory,
    pub unite_calcul: Option<String>,
    pub taux_defaut: Option<f64>,
    pub actif: bool,
}

impl RecordForm for CostTypeForm {
    type Record = CostType;
    type Payload = CostTypePayload;

    fn defaults() -> Self {
        Self {
            code: String::new(),
            nom: String::new(),
            description: String::new(),
            categorie: CostCategory::default(),
            unite_calcul: String::new(),
            taux_defaut: None,
            actif: true,
        }
    }

    fn from_record(cost_type: &CostType) -> Self {
        Self {
            code: cost_type.code.clone(),
            nom: cost_type.nom.clone(),
            description: text(&cost_type.description),
            categorie: cost_type.categorie,
            unite_calcul: text(&cost_type.unite_calcul),
            taux_defaut: cost_type.taux_defaut.map(NumberInput),
            actif: cost_type.actif,
        }
    }

    fn to_payload(&self) -> CostTypePayload {
        CostTypePayload {
            code: self.code.clone(),
            nom: self.nom.clone(),
            description: non_empty(self.description.clone()),
            categorie: self.categorie,
            unite_calcul: non_empty(self.unite_calcul.clone()),
            taux_defaut: optional_value(self.taux_defaut),
            actif: self.actif,
        }
    }
}
