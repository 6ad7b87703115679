//! Dashboard overview: statistics, alerts and top-cost products
//!
//! Everything here is computed from collections that were already loaded;
//! the caller decides how the collections are fetched.

use std::cmp::Ordering;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Lot, LotStatus, Product, ProductStatus, Shipment, ShipmentStatus};

/// Tunable alert and ranking limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardThresholds {
    /// Lots in stock below this quantity raise a low-stock alert
    pub low_stock_threshold: f64,
    pub expiry_window_days: i64,
    pub alert_limit: usize,
    pub recent_shipments: usize,
    pub top_products: usize,
}

impl Default for DashboardThresholds {
    fn default() -> Self {
        Self {
            low_stock_threshold: 10.0,
            expiry_window_days: 30,
            alert_limit: 3,
            recent_shipments: 5,
            top_products: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_products: usize,
    pub active_products: usize,
    pub total_shipments: usize,
    pub shipments_in_transit: usize,
    pub total_lots: usize,
    pub lots_in_stock: usize,
    pub total_stock_value: f64,
    pub average_cost: f64,
}

impl DashboardStats {
    pub fn compute(products: &[Product], shipments: &[Shipment], lots: &[Lot]) -> Self {
        let active: Vec<&Product> = products.iter().filter(|p| p.is_active()).collect();
        let average_cost = if active.is_empty() {
            0.0
        } else {
            active.iter().map(|p| p.couts.total_revient).sum::<f64>() / active.len() as f64
        };

        Self {
            total_products: products.len(),
            active_products: active.len(),
            total_shipments: shipments.len(),
            shipments_in_transit: shipments
                .iter()
                .filter(|s| s.statut == ShipmentStatus::InTransit)
                .count(),
            total_lots: lots.len(),
            lots_in_stock: lots.iter().filter(|l| l.is_in_stock()).count(),
            total_stock_value: stock_value(lots),
            average_cost,
        }
    }
}

/// Purchase value of the lots currently in stock
pub fn stock_value(lots: &[Lot]) -> f64 {
    lots.iter()
        .filter(|l| l.statut == LotStatus::InStock)
        .map(Lot::stock_value)
        .sum()
}

/// Quantity and value of the lots in stock, shown above the lot list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotSummary {
    pub total_quantity: f64,
    pub total_value: f64,
}

impl LotSummary {
    pub fn compute(lots: &[Lot]) -> Self {
        Self {
            total_quantity: lots
                .iter()
                .filter(|l| l.is_in_stock())
                .map(|l| l.quantite_totale)
                .sum(),
            total_value: stock_value(lots),
        }
    }
}

/// Counts and summed costs shown above the shipment list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentSummary {
    pub total: usize,
    pub in_transit: usize,
    pub received: usize,
    /// Sum of the stored `cout_total` of every shipment
    pub total_cost: f64,
}

impl ShipmentSummary {
    pub fn compute(shipments: &[Shipment]) -> Self {
        let with_status =
            |statut: ShipmentStatus| shipments.iter().filter(|s| s.statut == statut).count();
        Self {
            total: shipments.len(),
            in_transit: with_status(ShipmentStatus::InTransit),
            received: with_status(ShipmentStatus::Received),
            total_cost: shipments.iter().map(|s| s.cout_total).sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Warning,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub id: String,
    pub kind: AlertKind,
    pub title: String,
    pub description: String,
}

fn plural(n: usize, singular: &str, plural: &str) -> String {
    if n > 1 {
        plural.to_string()
    } else {
        singular.to_string()
    }
}

/// Build the dashboard alerts, in priority order and truncated to the limit
pub fn build_alerts(
    products: &[Product],
    shipments: &[Shipment],
    lots: &[Lot],
    today: NaiveDate,
    thresholds: &DashboardThresholds,
) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let in_stock: Vec<&Lot> = lots.iter().filter(|l| l.is_in_stock()).collect();

    let low_stock = in_stock
        .iter()
        .filter(|l| l.quantite_totale < thresholds.low_stock_threshold)
        .count();
    if low_stock > 0 {
        alerts.push(Alert {
            id: "low-stock".into(),
            kind: AlertKind::Warning,
            title: "Stock faible".into(),
            description: format!(
                "{} {} avec quantité faible",
                low_stock,
                plural(low_stock, "lot", "lots")
            ),
        });
    }

    let horizon = today + Duration::days(thresholds.expiry_window_days);
    let expiring = in_stock
        .iter()
        .filter_map(|l| l.date_peremption)
        .filter(|date| *date > today && *date <= horizon)
        .count();
    if expiring > 0 {
        alerts.push(Alert {
            id: "expiring".into(),
            kind: AlertKind::Error,
            title: "Péremption proche".into(),
            description: format!(
                "{} {} {} dans {} jours",
                expiring,
                plural(expiring, "lot", "lots"),
                plural(expiring, "expire", "expirent"),
                thresholds.expiry_window_days
            ),
        });
    }

    let mut received: Vec<&Shipment> = shipments
        .iter()
        .filter(|s| s.statut == ShipmentStatus::Received)
        .collect();
    // Most recent reception first; shipments without a date come before all dated ones
    received.sort_by(|a, b| match (a.date_reception, b.date_reception) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => b.cmp(&a),
    });
    for shipment in received.into_iter().take(thresholds.recent_shipments) {
        alerts.push(Alert {
            id: format!("recent-shipment-{}", shipment.id_expedition),
            kind: AlertKind::Info,
            title: "Expédition reçue".into(),
            description: format!("{} réceptionnée", shipment.reference),
        });
    }

    let inactive = products
        .iter()
        .filter(|p| p.statut == ProductStatus::Inactive)
        .count();
    if inactive > 0 {
        alerts.push(Alert {
            id: "inactive-products".into(),
            kind: AlertKind::Info,
            title: "Produits inactifs".into(),
            description: format!(
                "{} {} {}",
                inactive,
                plural(inactive, "produit", "produits"),
                plural(inactive, "inactif", "inactifs")
            ),
        });
    }

    alerts.truncate(thresholds.alert_limit);
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductCosts;

    fn product(id: &str, statut: ProductStatus, total: f64) -> Product {
        Product {
            id: id.into(),
            sku: format!("SKU-{}", id),
            barcode: "0".into(),
            nom: format!("Produit {}", id),
            description: None,
            categorie: None,
            marque: None,
            origine: None,
            unite_mesure: "pièce".into(),
            quantite_par_unite: None,
            couleur: None,
            taille: None,
            modele: None,
            version: None,
            statut,
            devise: "EUR".into(),
            couts: ProductCosts {
                achat_fournisseur: total,
                ..Default::default()
            }
            .with_computed_total(),
            created_at: None,
        }
    }

    fn lot(id: &str, quantity: f64, unit: f64, expiry: Option<NaiveDate>) -> Lot {
        Lot {
            id_lot: id.into(),
            id_produit: "p".into(),
            id_expedition: "e".into(),
            sku_physique: id.into(),
            cout_achat_unitaire: unit,
            quantite_totale: quantity,
            poids_total_kg: None,
            volume_total_m3: None,
            date_peremption: expiry,
            statut: LotStatus::InStock,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_stats() {
        let products = vec![
            product("a", ProductStatus::Active, 10.0),
            product("b", ProductStatus::Active, 20.0),
            product("c", ProductStatus::Archived, 99.0),
        ];
        let mut depleted = lot("L3", 5.0, 100.0, None);
        depleted.statut = LotStatus::Depleted;
        let lots = vec![lot("L1", 50.0, 2.0, None), lot("L2", 4.0, 2.5, None), depleted];
        let stats = DashboardStats::compute(&products, &[], &lots);
        assert_eq!(stats.active_products, 2);
        assert_eq!(stats.average_cost, 15.0);
        assert_eq!(stats.lots_in_stock, 2);
        assert_eq!(stats.total_stock_value, 110.0);

        let summary = LotSummary::compute(&lots);
        assert_eq!(summary.total_quantity, 54.0);
        assert_eq!(summary.total_value, 110.0);
    }

    fn shipment(id: &str, statut: ShipmentStatus, received: Option<NaiveDate>, total: f64) -> Shipment {
        Shipment {
            id_expedition: id.into(),
            reference: format!("REF-{}", id),
            fournisseur: "Fournisseur SA".into(),
            date_depart: date(2025, 1, 1),
            date_reception: received,
            statut,
            devise: "EUR".into(),
            cout_total_douane: total,
            cout_total_transport: 0.0,
            cout_total_assurance: 0.0,
            cout_total_manutention: 0.0,
            cout_total: total,
        }
    }

    #[test]
    fn test_shipment_summary() {
        let shipments = vec![
            shipment("S1", ShipmentStatus::InTransit, None, 100.0),
            shipment("S2", ShipmentStatus::InTransit, None, 20.5),
            shipment("S3", ShipmentStatus::Received, Some(date(2025, 3, 1)), 9.5),
            shipment("S4", ShipmentStatus::Closed, Some(date(2025, 2, 1)), 0.0),
        ];
        let summary = ShipmentSummary::compute(&shipments);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.in_transit, 2);
        assert_eq!(summary.received, 1);
        assert_eq!(summary.total_cost, 130.0);

        assert_eq!(ShipmentSummary::compute(&[]).total_cost, 0.0);
    }

    #[test]
    fn test_undated_receptions_listed_first() {
        let shipments = vec![
            shipment("old", ShipmentStatus::Received, Some(date(2025, 1, 5)), 0.0),
            shipment("undated", ShipmentStatus::Received, None, 0.0),
            shipment("new", ShipmentStatus::Received, Some(date(2025, 4, 5)), 0.0),
        ];
        let thresholds = DashboardThresholds {
            alert_limit: 10,
            ..Default::default()
        };
        let alerts = build_alerts(&[], &shipments, &[], date(2025, 6, 1), &thresholds);
        let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "recent-shipment-undated",
                "recent-shipment-new",
                "recent-shipment-old"
            ]
        );
    }

    #[test]
    fn test_average_cost_without_active_products() {
        let stats = DashboardStats::compute(&[], &[], &[]);
        assert_eq!(stats.average_cost, 0.0);
    }

    #[test]
    fn test_alerts_order_and_limit() {
        let today = date(2025, 6, 1);
        let lots = vec![
            lot("L1", 3.0, 1.0, Some(date(2025, 6, 15))),
            lot("L2", 40.0, 1.0, Some(date(2025, 6, 1))),
            lot("L3", 40.0, 1.0, Some(date(2025, 8, 1))),
        ];
        let products = vec![product("x", ProductStatus::Inactive, 1.0)];
        let alerts = build_alerts(
            &products,
            &[],
            &lots,
            today,
            &DashboardThresholds::default(),
        );
        let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["low-stock", "expiring", "inactive-products"]);
        assert_eq!(alerts[0].description, "1 lot avec quantité faible");
        assert_eq!(alerts[1].description, "1 lot expire dans 30 jours");
        assert_eq!(alerts[2].description, "1 produit inactif");
    }
}
