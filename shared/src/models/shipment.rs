//! Shipment models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::costs::sum_components;

/// Shipment lifecycle stage
///
/// Stages are ordered for display only; any stage may be chosen at any time.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ShipmentStatus {
    #[default]
    #[serde(rename = "Préparation")]
    Preparation,
    #[serde(rename = "En transit")]
    InTransit,
    #[serde(rename = "Réceptionnée")]
    Received,
    #[serde(rename = "Clôturée")]
    Closed,
}

impl ShipmentStatus {
    pub const ALL: [ShipmentStatus; 4] = [
        ShipmentStatus::Preparation,
        ShipmentStatus::InTransit,
        ShipmentStatus::Received,
        ShipmentStatus::Closed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ShipmentStatus::Preparation => "Préparation",
            ShipmentStatus::InTransit => "En transit",
            ShipmentStatus::Received => "Réceptionnée",
            ShipmentStatus::Closed => "Clôturée",
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A supplier shipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub id_expedition: String,
    #[serde(alias = "ref_conteneur")]
    pub reference: String,
    pub fournisseur: String,
    pub date_depart: NaiveDate,
    #[serde(default)]
    pub date_reception: Option<NaiveDate>,
    pub statut: ShipmentStatus,
    pub devise: String,
    #[serde(default)]
    pub cout_total_douane: f64,
    #[serde(default)]
    pub cout_total_transport: f64,
    #[serde(default)]
    pub cout_total_assurance: f64,
    #[serde(default)]
    pub cout_total_manutention: f64,
    /// Total maintained by the store
    #[serde(default)]
    pub cout_total: f64,
}

impl Shipment {
    /// Components in the order of [`crate::costs::SHIPMENT_COST_FIELDS`]
    pub fn cost_components(&self) -> [f64; 4] {
        [
            self.cout_total_douane,
            self.cout_total_transport,
            self.cout_total_assurance,
            self.cout_total_manutention,
        ]
    }

    /// Sum of the four named costs, as shown while editing
    pub fn computed_total(&self) -> f64 {
        sum_components(self.cost_components())
    }
}
