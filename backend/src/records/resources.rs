//! The four record kinds of the dashboard

use async_trait::async_trait;

use shared::costs::SHIPMENT_COST_FIELDS;
use shared::forms::{
    product_choices, shipment_choices, CostTypeForm, FormChoices, LotForm, ProductForm,
    ShipmentForm,
};
use shared::models::{join_lots, CostType, Lot, LotListing, Product, Role, Shipment};
use shared::types::Noun;
use shared::view::{ResourceLabels, COST_TYPE_LABELS, LOT_LABELS, PRODUCT_LABELS, SHIPMENT_LABELS};

use super::{decode_rows, Dependents, Resource};
use crate::store::{Order, Query, RecordStore, StoreError, TableSpec};

pub const PRODUCTS_TABLE: &str = "products";
pub const SHIPMENTS_TABLE: &str = "shipments";
pub const LOTS_TABLE: &str = "physical_lots";
pub const COST_TYPES_TABLE: &str = "cost_types";

const LOT_NOUN: Noun = Noun::masculine("lot", "lots");

pub struct Products;

#[async_trait]
impl Resource for Products {
    type Stored = Product;
    type Listed = Product;
    type Form = ProductForm;

    const NAME: &'static str = "products";
    const TABLE: &'static str = PRODUCTS_TABLE;
    const KEY: &'static str = "id";
    const LABELS: ResourceLabels = PRODUCT_LABELS;
    const DEPENDENTS: &'static [Dependents] = &[Dependents {
        table: LOTS_TABLE,
        column: "id_produit",
        noun: LOT_NOUN,
    }];

    fn order() -> Order {
        Order::desc("created_at")
    }

    fn key_of(record: &Product) -> &str {
        &record.id
    }
}

pub struct Shipments;

#[async_trait]
impl Resource for Shipments {
    type Stored = Shipment;
    type Listed = Shipment;
    type Form = ShipmentForm;

    const NAME: &'static str = "shipments";
    const TABLE: &'static str = SHIPMENTS_TABLE;
    const KEY: &'static str = "id_expedition";
    const LABELS: ResourceLabels = SHIPMENT_LABELS;
    const DEPENDENTS: &'static [Dependents] = &[Dependents {
        table: LOTS_TABLE,
        column: "id_expedition",
        noun: LOT_NOUN,
    }];

    fn order() -> Order {
        Order::desc("date_depart")
    }

    fn key_of(record: &Shipment) -> &str {
        &record.id_expedition
    }
}

pub struct Lots;

#[async_trait]
impl Resource for Lots {
    type Stored = Lot;
    type Listed = LotListing;
    type Form = LotForm;

    const NAME: &'static str = "lots";
    const TABLE: &'static str = LOTS_TABLE;
    const KEY: &'static str = "id_lot";
    const LABELS: ResourceLabels = LOT_LABELS;

    fn order() -> Order {
        Order::desc("id_lot")
    }

    fn key_of(record: &Lot) -> &str {
        &record.id_lot
    }

    /// Products by name and shipments most recent first, as in the lot dialog
    async fn form_choices(store: &dyn RecordStore) -> Result<FormChoices, StoreError> {
        let products_query = Query::new().order(Order::asc("nom"));
        let shipments_query = Query::new().order(Order::desc("date_depart"));
        let (products, shipments) = tokio::try_join!(
            store.select(PRODUCTS_TABLE, &products_query),
            store.select(SHIPMENTS_TABLE, &shipments_query),
        )?;
        let products: Vec<Product> = decode_rows(products)?;
        let shipments: Vec<Shipment> = decode_rows(shipments)?;

        let mut choices = FormChoices::new();
        choices.insert("id_produit", product_choices(&products));
        choices.insert("id_expedition", shipment_choices(&shipments));
        Ok(choices)
    }

    /// Lots are listed with their product and shipment resolved
    async fn load(store: &dyn RecordStore) -> Result<Vec<LotListing>, StoreError> {
        let lots_query = Query::new().order(Self::order());
        let related = Query::new();
        let (lots, products, shipments) = tokio::try_join!(
            store.select(LOTS_TABLE, &lots_query),
            store.select(PRODUCTS_TABLE, &related),
            store.select(SHIPMENTS_TABLE, &related),
        )?;

        let lots: Vec<Lot> = decode_rows(lots)?;
        let products: Vec<Product> = decode_rows(products)?;
        let shipments: Vec<Shipment> = decode_rows(shipments)?;
        Ok(join_lots(lots, &products, &shipments))
    }
}

pub struct CostTypes;

#[async_trait]
impl Resource for CostTypes {
    type Stored = CostType;
    type Listed = CostType;
    type Form = CostTypeForm;

    const NAME: &'static str = "cost-types";
    const TABLE: &'static str = COST_TYPES_TABLE;
    const KEY: &'static str = "id";
    const LABELS: ResourceLabels = COST_TYPE_LABELS;
    const REQUIRED_ROLE: Option<Role> = Some(Role::Admin);

    fn order() -> Order {
        Order::desc("created_at")
    }

    fn key_of(record: &CostType) -> &str {
        &record.id
    }
}

/// Generated columns of each table, for the in-memory store
pub fn table_specs() -> Vec<(&'static str, TableSpec)> {
    vec![
        (
            PRODUCTS_TABLE,
            TableSpec {
                key: Some("id"),
                generated_id: true,
                timestamps: true,
                total: None,
            },
        ),
        (
            SHIPMENTS_TABLE,
            TableSpec {
                key: Some("id_expedition"),
                generated_id: false,
                timestamps: false,
                total: Some(("cout_total", &SHIPMENT_COST_FIELDS)),
            },
        ),
        (
            LOTS_TABLE,
            TableSpec {
                key: Some("id_lot"),
                ..TableSpec::default()
            },
        ),
        (
            COST_TYPES_TABLE,
            TableSpec {
                key: Some("id"),
                generated_id: true,
                timestamps: true,
                total: None,
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_lots_load_joins_related_records() {
        let store = MemoryStore::for_dashboard();
        store
            .seed(
                PRODUCTS_TABLE,
                vec![json!({
                    "id": "p1", "sku": "SKU-1", "barcode": "123", "nom": "Café moulu",
                    "unite_mesure": "pièce", "statut": "Actif", "devise": "EUR"
                })],
            )
            .await;
        store
            .seed(
                LOTS_TABLE,
                vec![
                    json!({
                        "id_lot": "L-001", "id_produit": "p1", "id_expedition": "missing",
                        "sku_physique": "PHY-1", "cout_achat_unitaire": 2.5,
                        "quantite_totale": 4.0, "statut": "En stock"
                    }),
                    json!({
                        "id_lot": "L-002", "id_produit": "p1", "id_expedition": "missing",
                        "sku_physique": "PHY-2", "cout_achat_unitaire": 1.0,
                        "quantite_totale": 1.0, "statut": "Épuisé"
                    }),
                ],
            )
            .await;

        let listings = Lots::load(&store).await.unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].lot.id_lot, "L-002");
        assert_eq!(listings[0].product.as_ref().unwrap().nom, "Café moulu");
        assert!(listings[0].shipment.is_none());
    }

    #[test]
    fn test_cost_types_admin_only() {
        assert_eq!(CostTypes::REQUIRED_ROLE, Some(Role::Admin));
        assert_eq!(Products::REQUIRED_ROLE, None);
    }
}
