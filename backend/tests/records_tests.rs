//! Record list and dialog tests
//!
//! Exercises the generic list loader, mutation dialog and deletion dialog
//! against the in-memory store and a store whose every call fails:
//! - Create then load returns the submitted values
//! - Validation failures never reach the store
//! - Remote failures keep the previous state and notify in French
//! - Deletions are idempotent and restricted while lots depend on a record

use async_trait::async_trait;
use proptest::prelude::*;
use serde_json::{json, Value};

use landed_cost_backend::records::resources::{LOTS_TABLE, PRODUCTS_TABLE, SHIPMENTS_TABLE};
use landed_cost_backend::records::{
    CostTypes, DeletionDialog, Lots, MutationDialog, Products, RecordError, RecordList, Resource,
    Shipments,
};
use landed_cost_backend::store::{MemoryStore, Query, RecordStore, StoreError};
use shared::effects::Effect;
use shared::models::ProductStatus;

// ============================================================================
// Fixtures
// ============================================================================

/// A store whose every call fails as an unreachable service would
struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn select(&self, _table: &str, _query: &Query) -> Result<Vec<Value>, StoreError> {
        Err(unavailable())
    }

    async fn insert(&self, _table: &str, _row: Value) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn update(
        &self,
        _table: &str,
        _key_column: &str,
        _key: &str,
        _row: Value,
    ) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn delete(&self, _table: &str, _key_column: &str, _key: &str) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(unavailable())
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

fn unavailable() -> StoreError {
    StoreError::Remote {
        status: 503,
        body: "service unavailable".into(),
    }
}

fn product_values() -> Value {
    json!({
        "sku": "CAF-250",
        "barcode": "3760000000017",
        "nom": "Café moulu 250g",
        "unite_mesure": "pièce",
        "statut": "Actif",
        "devise": "EUR",
        "achat_fournisseur": 10,
        "transport": "2",
        "assurance": 1,
        "douane_taxes": 0.5,
        "stockage": "",
        "autres_indirects": null
    })
}

fn shipment_values(id: &str) -> Value {
    json!({
        "id_expedition": id,
        "reference": "EXP-2025-001",
        "fournisseur": "Fournisseur SA",
        "date_depart": "2025-01-15",
        "statut": "En transit",
        "devise": "EUR",
        "cout_total_douane": 40,
        "cout_total_transport": 30,
        "cout_total_assurance": 20,
        "cout_total_manutention": 10
    })
}

async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::for_dashboard();
    store
        .seed(
            PRODUCTS_TABLE,
            vec![json!({
                "id": "p-1", "sku": "CAF-250", "barcode": "1", "nom": "Café moulu",
                "unite_mesure": "pièce", "statut": "Actif", "devise": "EUR",
                "couts": {"total_revient": 12.0}
            })],
        )
        .await;
    store
        .seed(
            SHIPMENTS_TABLE,
            vec![json!({
                "id_expedition": "S-1", "reference": "EXP-2025-001", "fournisseur": "Fournisseur SA",
                "date_depart": "2025-01-15", "statut": "Réceptionnée", "devise": "EUR",
                "cout_total": 100.0
            })],
        )
        .await;
    store
        .seed(
            LOTS_TABLE,
            vec![json!({
                "id_lot": "L-001", "id_produit": "p-1", "id_expedition": "S-1",
                "sku_physique": "PHY-001", "cout_achat_unitaire": 2.0,
                "quantite_totale": 20.0, "statut": "En stock"
            })],
        )
        .await;
    store
}

// ============================================================================
// Mutation dialog
// ============================================================================

#[tokio::test]
async fn test_create_product_then_load() {
    let store = MemoryStore::for_dashboard();

    let mut dialog = MutationDialog::<Products>::create();
    dialog.fill(product_values()).unwrap();
    assert_eq!(dialog.live_total(), Some(13.5));

    let effects = dialog.submit(&store).await.unwrap();
    assert_eq!(
        effects,
        vec![
            Effect::success("Le produit a été ajouté avec succès"),
            Effect::reload("products"),
            Effect::CloseDialog,
        ]
    );

    let mut list = RecordList::<Products>::new();
    list.load(&store).await.unwrap();
    let product = &list.records()[0];
    assert_eq!(product.sku, "CAF-250");
    assert_eq!(product.statut, ProductStatus::Active);
    assert_eq!(product.couts.total_revient, 13.5);
    assert_eq!(product.couts.stockage, 0.0);
    assert_eq!(product.description, None);
    assert_eq!(product.quantite_par_unite, None);
    assert!(!product.id.is_empty());
    assert!(product.created_at.is_some());
}

#[tokio::test]
async fn test_store_recomputes_shipment_total() {
    let store = MemoryStore::for_dashboard();

    let mut dialog = MutationDialog::<Shipments>::create();
    dialog.fill(shipment_values("S-100")).unwrap();
    assert_eq!(dialog.live_total(), Some(100.0));
    dialog.submit(&store).await.unwrap();

    let mut list = RecordList::<Shipments>::new();
    list.load(&store).await.unwrap();
    assert_eq!(list.records()[0].cout_total, 100.0);
    assert_eq!(list.view().rows[0].cells[5], "100.00 €");
}

#[tokio::test]
async fn test_invalid_form_never_reaches_the_store() {
    let mut dialog = MutationDialog::<Products>::create();
    let err = dialog.fill(json!({"sku": "", "achat_fournisseur": -1})).unwrap_err();
    let RecordError::Invalid(fields) = err else {
        panic!("expected field errors");
    };
    assert_eq!(fields.get("sku"), Some("SKU requis"));
    assert_eq!(fields.get("achat_fournisseur"), Some("Montant invalide"));

    // Submitting the defaults directly fails validation before any call
    let mut dialog = MutationDialog::<Products>::create();
    let err = dialog.submit(&FailingStore).await.unwrap_err();
    assert!(matches!(err, RecordError::Invalid(_)));
}

#[tokio::test]
async fn test_failed_save_keeps_dialog_open() {
    let mut dialog = MutationDialog::<Products>::create();
    dialog.fill(product_values()).unwrap();

    let err = dialog.submit(&FailingStore).await.unwrap_err();
    assert_eq!(
        err.effects(),
        vec![Effect::error("Impossible de sauvegarder le produit")]
    );
    assert!(!dialog.is_submitting());
    assert_eq!(dialog.values().sku, "CAF-250");
}

#[tokio::test]
async fn test_unchanged_edit_is_acknowledged() {
    let store = seeded_store().await;
    let mut list = RecordList::<Shipments>::new();
    list.load(&store).await.unwrap();
    let before = list.records()[0].clone();

    let mut dialog = MutationDialog::<Shipments>::edit(&before);
    assert!(dialog.is_edit());
    assert_eq!(dialog.title(), "Modifier l'expédition");
    let effects = dialog.submit(&store).await.unwrap();
    assert_eq!(effects[0], Effect::success("L'expédition a été modifiée avec succès"));

    list.load(&store).await.unwrap();
    assert_eq!(list.records()[0].reference, before.reference);
    assert_eq!(list.records()[0].statut, before.statut);
}

#[tokio::test]
async fn test_duplicate_key_reported_as_save_failure() {
    let store = seeded_store().await;
    let mut dialog = MutationDialog::<Shipments>::create();
    dialog.fill(shipment_values("S-1")).unwrap();

    let err = dialog.submit(&store).await.unwrap_err();
    assert!(matches!(
        err,
        RecordError::Store {
            source: StoreError::Conflict(_),
            ..
        }
    ));
}

// ============================================================================
// List loader
// ============================================================================

#[tokio::test]
async fn test_failed_load_keeps_previous_records() {
    let store = seeded_store().await;
    let mut list = RecordList::<Products>::new();
    list.load(&store).await.unwrap();
    assert_eq!(list.records().len(), 1);

    let err = list.load(&FailingStore).await.unwrap_err();
    assert_eq!(
        err.effects(),
        vec![Effect::error("Impossible de charger les produits")]
    );
    assert_eq!(list.records().len(), 1);
    assert!(!list.is_loading());
}

#[tokio::test]
async fn test_empty_shipments_show_call_to_action() {
    let store = MemoryStore::for_dashboard();
    let mut list = RecordList::<Shipments>::new();
    list.load(&store).await.unwrap();

    let view = list.view();
    let empty = view.empty_state.unwrap();
    assert_eq!(empty.title, "Aucune expédition");
    assert_eq!(empty.action.as_deref(), Some("Nouvelle expédition"));
    assert!(view.footer.is_none());
}

#[tokio::test]
async fn test_lot_search_matches_product_name() {
    let store = seeded_store().await;
    let mut list = RecordList::<Lots>::new();
    list.load(&store).await.unwrap();

    list.set_search("moulu");
    let visible = list.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].lot.id_lot, "L-001");
    assert_eq!(visible[0].shipment.as_ref().unwrap().reference, "EXP-2025-001");

    list.set_search("introuvable");
    assert!(list.visible().is_empty());
    let view = list.view();
    assert_eq!(view.empty_state.unwrap().title, "Aucun lot trouvé");
}

#[tokio::test]
async fn test_lot_load_fails_as_a_whole() {
    let mut list = RecordList::<Lots>::new();
    let err = list.load(&FailingStore).await.unwrap_err();
    assert_eq!(err.effects(), vec![Effect::error("Impossible de charger les lots")]);
}

// ============================================================================
// Deletion dialog
// ============================================================================

#[tokio::test]
async fn test_delete_absent_key_is_acknowledged() {
    let store = MemoryStore::for_dashboard();
    let mut dialog = DeletionDialog::<CostTypes>::new("missing");
    let effects = dialog.confirm(&store).await.unwrap();
    assert_eq!(
        effects,
        vec![
            Effect::success("Le type de coût a été supprimé avec succès"),
            Effect::reload("cost-types"),
            Effect::CloseDialog,
        ]
    );
}

#[tokio::test]
async fn test_shipment_with_lots_is_restricted() {
    let store = seeded_store().await;

    let dialog = DeletionDialog::<Shipments>::new("S-1");
    let prompt = dialog.prompt(&store).await.unwrap();
    assert_eq!(
        prompt.message,
        "Êtes-vous sûr de vouloir supprimer l'expédition S-1 (EXP-2025-001) ?"
    );
    assert_eq!(
        prompt.blocked.as_deref(),
        Some("Impossible de supprimer l'expédition : 1 lot rattaché")
    );

    let mut dialog = DeletionDialog::<Shipments>::new("S-1");
    let err = dialog.confirm(&store).await.unwrap_err();
    assert!(matches!(err, RecordError::Restricted(_)));
    assert_eq!(store.select(SHIPMENTS_TABLE, &Query::new()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_lot_then_shipment() {
    let store = seeded_store().await;

    let mut dialog = DeletionDialog::<Lots>::new("L-001");
    dialog.confirm(&store).await.unwrap();
    let mut dialog = DeletionDialog::<Shipments>::new("S-1");
    let effects = dialog.confirm(&store).await.unwrap();
    assert_eq!(effects[1], Effect::reload(Shipments::NAME));
    assert!(store.select(SHIPMENTS_TABLE, &Query::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_prompt_for_missing_record() {
    let store = MemoryStore::for_dashboard();
    let err = DeletionDialog::<Products>::new("nope").prompt(&store).await.unwrap_err();
    assert!(matches!(err, RecordError::NotFound(key) if key == "nope"));
}

#[tokio::test]
async fn test_failed_delete_notifies() {
    let mut dialog = DeletionDialog::<Lots>::new("L-001");
    let err = dialog.confirm(&FailingStore).await.unwrap_err();
    assert_eq!(err.effects(), vec![Effect::error("Impossible de supprimer le lot")]);
    assert!(dialog.can_confirm());
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// The stored product total is the sum of the submitted components
    #[test]
    fn prop_created_product_total_is_component_sum(
        parts in proptest::collection::vec(0u32..100_000, 6)
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let total = runtime.block_on(async {
            let store = MemoryStore::for_dashboard();
            let mut values = product_values();
            let names = [
                "achat_fournisseur", "transport", "assurance",
                "douane_taxes", "stockage", "autres_indirects",
            ];
            for (name, cents) in names.iter().zip(&parts) {
                values[*name] = json!(*cents as f64 / 100.0);
            }
            let mut dialog = MutationDialog::<Products>::create();
            dialog.fill(values).unwrap();
            dialog.submit(&store).await.unwrap();

            let mut list = RecordList::<Products>::new();
            list.load(&store).await.unwrap();
            list.records()[0].couts.total_revient
        });

        let expected: f64 = parts.iter().map(|c| *c as f64 / 100.0).sum();
        prop_assert!((total - expected).abs() < 1e-9);
    }
}
