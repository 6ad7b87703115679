//! Physical lot models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Product, Shipment};

/// Stock status of a physical lot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LotStatus {
    #[default]
    #[serde(rename = "En stock")]
    InStock,
    #[serde(rename = "Épuisé")]
    Depleted,
    #[serde(rename = "Supprimé")]
    Deleted,
}

impl LotStatus {
    pub const ALL: [LotStatus; 3] = [LotStatus::InStock, LotStatus::Depleted, LotStatus::Deleted];

    pub fn label(&self) -> &'static str {
        match self {
            LotStatus::InStock => "En stock",
            LotStatus::Depleted => "Épuisé",
            LotStatus::Deleted => "Supprimé",
        }
    }
}

impl std::fmt::Display for LotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A physical batch of a product received in a shipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub id_lot: String,
    pub id_produit: String,
    pub id_expedition: String,
    pub sku_physique: String,
    pub cout_achat_unitaire: f64,
    pub quantite_totale: f64,
    #[serde(default)]
    pub poids_total_kg: Option<f64>,
    #[serde(default)]
    pub volume_total_m3: Option<f64>,
    #[serde(default)]
    pub date_peremption: Option<NaiveDate>,
    pub statut: LotStatus,
}

impl Lot {
    pub fn is_in_stock(&self) -> bool {
        self.statut == LotStatus::InStock
    }

    /// Purchase value of the lot (unit price × quantity)
    pub fn stock_value(&self) -> f64 {
        self.cout_achat_unitaire * self.quantite_totale
    }
}

/// Product fields shown next to a lot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: String,
    pub sku: String,
    pub nom: String,
}

impl From<&Product> for ProductRef {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            sku: product.sku.clone(),
            nom: product.nom.clone(),
        }
    }
}

/// Shipment fields shown next to a lot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRef {
    pub id_expedition: String,
    pub reference: String,
    pub cout_total: f64,
}

impl From<&Shipment> for ShipmentRef {
    fn from(shipment: &Shipment) -> Self {
        Self {
            id_expedition: shipment.id_expedition.clone(),
            reference: shipment.reference.clone(),
            cout_total: shipment.cout_total,
        }
    }
}

/// A lot with its product and shipment resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotListing {
    #[serde(flatten)]
    pub lot: Lot,
    #[serde(default)]
    pub product: Option<ProductRef>,
    #[serde(default)]
    pub shipment: Option<ShipmentRef>,
}

/// Resolve each lot's product and shipment by scanning the related collections
///
/// Unmatched references are left empty. Collections are expected to be small.
pub fn join_lots(lots: Vec<Lot>, products: &[Product], shipments: &[Shipment]) -> Vec<LotListing> {
    lots.into_iter()
        .map(|lot| {
            let product = products
                .iter()
                .find(|p| p.id == lot.id_produit)
                .map(ProductRef::from);
            let shipment = shipments
                .iter()
                .find(|s| s.id_expedition == lot.id_expedition)
                .map(ShipmentRef::from);
            LotListing {
                lot,
                product,
                shipment,
            }
        })
        .collect()
}
