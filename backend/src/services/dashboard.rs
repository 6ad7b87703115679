//! Dashboard overview service
//!
//! Loads the collections the overview is computed from and delegates the
//! arithmetic to `shared::dashboard`.

use chrono::{NaiveDate, Utc};

use shared::dashboard::{
    build_alerts, Alert, DashboardStats, DashboardThresholds, LotSummary, ShipmentSummary,
};
use shared::models::{Lot, Product, ProductStatus, Shipment};

use crate::error::{AppError, AppResult};
use crate::records::decode_rows;
use crate::records::resources::{LOTS_TABLE, PRODUCTS_TABLE, SHIPMENTS_TABLE};
use crate::store::{Order, Query, RecordStore, StoreError};

const LOAD_FAILED: &str = "Impossible de charger le tableau de bord";

/// Overview of the dashboard home page
#[derive(Debug, serde::Serialize)]
pub struct Overview {
    pub stats: DashboardStats,
    pub alerts: Vec<Alert>,
    pub top_cost_products: Vec<Product>,
}

pub struct DashboardService<'a> {
    store: &'a dyn RecordStore,
    thresholds: DashboardThresholds,
}

impl<'a> DashboardService<'a> {
    pub fn new(store: &'a dyn RecordStore, thresholds: DashboardThresholds) -> Self {
        Self { store, thresholds }
    }

    /// Statistics, alerts and top products in one round of queries
    pub async fn overview(&self) -> AppResult<Overview> {
        self.overview_at(Utc::now().date_naive()).await
    }

    pub async fn overview_at(&self, today: NaiveDate) -> AppResult<Overview> {
        let (products, shipments, lots) = self.collections().await?;
        let top_cost_products = self.top_cost_products().await?;
        Ok(Overview {
            stats: DashboardStats::compute(&products, &shipments, &lots),
            alerts: build_alerts(&products, &shipments, &lots, today, &self.thresholds),
            top_cost_products,
        })
    }

    pub async fn alerts_at(&self, today: NaiveDate) -> AppResult<Vec<Alert>> {
        let (products, shipments, lots) = self.collections().await?;
        Ok(build_alerts(&products, &shipments, &lots, today, &self.thresholds))
    }

    /// Active products ranked by landed cost, ordered by the store
    pub async fn top_cost_products(&self) -> AppResult<Vec<Product>> {
        let query = Query::new()
            .eq("statut", ProductStatus::Active.label())
            .order(Order::desc("couts->total_revient"))
            .limit(self.thresholds.top_products);
        let rows = self
            .store
            .select(PRODUCTS_TABLE, &query)
            .await
            .map_err(failed)?;
        decode_rows(rows).map_err(failed)
    }

    pub async fn lot_summary(&self) -> AppResult<LotSummary> {
        let rows = self
            .store
            .select(LOTS_TABLE, &Query::new())
            .await
            .map_err(failed)?;
        let lots: Vec<Lot> = decode_rows(rows).map_err(failed)?;
        Ok(LotSummary::compute(&lots))
    }

    pub async fn shipment_summary(&self) -> AppResult<ShipmentSummary> {
        let rows = self
            .store
            .select(SHIPMENTS_TABLE, &Query::new())
            .await
            .map_err(failed)?;
        let shipments: Vec<Shipment> = decode_rows(rows).map_err(failed)?;
        Ok(ShipmentSummary::compute(&shipments))
    }

    async fn collections(&self) -> AppResult<(Vec<Product>, Vec<Shipment>, Vec<Lot>)> {
        let all = Query::new();
        let (products, shipments, lots) = tokio::try_join!(
            self.store.select(PRODUCTS_TABLE, &all),
            self.store.select(SHIPMENTS_TABLE, &all),
            self.store.select(LOTS_TABLE, &all),
        )
        .map_err(failed)?;

        let products: Vec<Product> = decode_rows(products).map_err(failed)?;
        let shipments: Vec<Shipment> = decode_rows(shipments).map_err(failed)?;
        let lots: Vec<Lot> = decode_rows(lots).map_err(failed)?;
        tracing::debug!(
            products = products.len(),
            shipments = shipments.len(),
            lots = lots.len(),
            "Loaded dashboard collections"
        );
        Ok((products, shipments, lots))
    }
}

fn failed(source: StoreError) -> AppError {
    tracing::error!(error = %source, "Failed to load dashboard data");
    AppError::Store {
        message_fr: LOAD_FAILED,
        source,
    }
}
