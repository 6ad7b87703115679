//! PostgREST record store tests
//!
//! Runs the REST adapter against a mock HTTP server:
//! - Query parameters and authentication headers
//! - Writes by key with minimal returns
//! - Remote failures surfaced as store errors and French notifications

use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use landed_cost_backend::records::{DeletionDialog, Lots, RecordList, Shipments};
use landed_cost_backend::store::{Order, Query, RecordStore, RestStore, StoreError};
use shared::effects::Effect;

const API_KEY: &str = "anon-key";

fn store(server: &MockServer) -> RestStore {
    RestStore::with_client(Client::new(), &server.uri(), API_KEY)
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn test_select_sends_filter_order_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(query_param("select", "*"))
        .and(query_param("statut", "eq.Actif"))
        .and(query_param("order", "couts->total_revient.desc"))
        .and(query_param("limit", "5"))
        .and(header("apikey", API_KEY))
        .and(header("Authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "p-1"}])))
        .expect(1)
        .mount(&server)
        .await;

    let query = Query::new()
        .eq("statut", "Actif")
        .order(Order::desc("couts->total_revient"))
        .limit(5);
    let rows = store(&server).select("products", &query).await.unwrap();
    assert_eq!(rows, vec![json!({"id": "p-1"})]);
}

#[tokio::test]
async fn test_lot_listing_joins_three_tables() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/physical_lots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id_lot": "L-001", "id_produit": "p-1", "id_expedition": "S-1",
            "sku_physique": "PHY-001", "cout_achat_unitaire": 2.0,
            "quantite_totale": 3.0, "statut": "En stock"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "p-1", "sku": "CAF", "barcode": "1", "nom": "Café moulu",
            "unite_mesure": "pièce", "statut": "Actif", "devise": "EUR"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/shipments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut list = RecordList::<Lots>::new();
    list.load(&store(&server)).await.unwrap();
    let listing = &list.records()[0];
    assert_eq!(listing.product.as_ref().unwrap().nom, "Café moulu");
    assert!(listing.shipment.is_none());
}

#[tokio::test]
async fn test_remote_failure_keeps_list_and_notifies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/shipments"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let mut list = RecordList::<Shipments>::new();
    let err = list.load(&store(&server)).await.unwrap_err();
    assert_eq!(
        err.effects(),
        vec![Effect::error("Impossible de charger les expéditions")]
    );
    assert!(list.records().is_empty());
}

// ============================================================================
// Writes
// ============================================================================

#[tokio::test]
async fn test_insert_posts_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/cost_types"))
        .and(header("Prefer", "return=minimal"))
        .and(body_json(json!({"code": "TR", "nom": "Transport"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    store(&server)
        .insert("cost_types", json!({"code": "TR", "nom": "Transport"}))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_patches_by_key() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/shipments"))
        .and(query_param("id_expedition", "eq.S-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    store(&server)
        .update("shipments", "id_expedition", "S-1", json!({"statut": "Clôturée"}))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_conflict_status_maps_to_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/shipments"))
        .respond_with(ResponseTemplate::new(409).set_body_string("duplicate key"))
        .mount(&server)
        .await;

    let err = store(&server)
        .insert("shipments", json!({"id_expedition": "S-1"}))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(body) if body == "duplicate key"));
}

#[tokio::test]
async fn test_delete_checks_dependents_then_deletes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/physical_lots"))
        .and(query_param("id_expedition", "eq.S-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/shipments"))
        .and(query_param("id_expedition", "eq.S-9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut dialog = DeletionDialog::<Shipments>::new("S-9");
    let effects = dialog.confirm(&store(&server)).await.unwrap();
    assert_eq!(effects[0], Effect::success("L'expédition a été supprimée avec succès"));
}

#[tokio::test]
async fn test_ping_probes_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let store = store(&server);
    assert!(store.ping().await.is_ok());
    assert_eq!(store.backend(), "rest");
}

#[tokio::test]
async fn test_unsafe_table_name_never_sent() {
    let server = MockServer::start().await;
    let err = store(&server)
        .select("products; drop table x", &Query::new())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidIdentifier(_)));
}
