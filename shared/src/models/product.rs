//! Product catalog models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::costs::sum_components;

/// Lifecycle status of a catalog product
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductStatus {
    #[default]
    #[serde(rename = "Actif")]
    Active,
    #[serde(rename = "Inactif")]
    Inactive,
    #[serde(rename = "Archivé")]
    Archived,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 3] = [
        ProductStatus::Active,
        ProductStatus::Inactive,
        ProductStatus::Archived,
    ];

    /// Label as stored and displayed
    pub fn label(&self) -> &'static str {
        match self {
            ProductStatus::Active => "Actif",
            ProductStatus::Inactive => "Inactif",
            ProductStatus::Archived => "Archivé",
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Cost breakdown embedded in a product
///
/// `total_revient` is derived: it is always the sum of the six components
/// and is only ever written through [`ProductCosts::with_computed_total`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductCosts {
    #[serde(default)]
    pub achat_fournisseur: f64,
    #[serde(default)]
    pub transport: f64,
    #[serde(default)]
    pub assurance: f64,
    #[serde(default)]
    pub douane_taxes: f64,
    #[serde(default)]
    pub stockage: f64,
    #[serde(default)]
    pub autres_indirects: f64,
    #[serde(default)]
    pub total_revient: f64,
}

impl ProductCosts {
    /// Components in the order of [`crate::costs::PRODUCT_COST_FIELDS`]
    pub fn components(&self) -> [f64; 6] {
        [
            self.achat_fournisseur,
            self.transport,
            self.assurance,
            self.douane_taxes,
            self.stockage,
            self.autres_indirects,
        ]
    }

    pub fn computed_total(&self) -> f64 {
        sum_components(self.components())
    }

    pub fn with_computed_total(mut self) -> Self {
        self.total_revient = self.computed_total();
        self
    }
}

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub barcode: String,
    pub nom: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categorie: Option<String>,
    #[serde(default)]
    pub marque: Option<String>,
    #[serde(default)]
    pub origine: Option<String>,
    pub unite_mesure: String,
    #[serde(default)]
    pub quantite_par_unite: Option<f64>,
    #[serde(default)]
    pub couleur: Option<String>,
    #[serde(default)]
    pub taille: Option<String>,
    #[serde(default)]
    pub modele: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    pub statut: ProductStatus,
    pub devise: String,
    #[serde(default)]
    pub couts: ProductCosts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn is_active(&self) -> bool {
        self.statut == ProductStatus::Active
    }
}
