//! Generic record list, mutation dialog and deletion dialog
//!
//! Every entity of the dashboard follows the same lifecycle: load all rows,
//! derive a filtered view, write one record through a dialog, then reload
//! from scratch. A [`Resource`] describes one entity; the list and dialogs
//! are written once against it.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use shared::effects::Effect;
use shared::forms::{FormChoices, FormError, RecordForm};
use shared::models::Role;
use shared::search::Searchable;
use shared::types::Noun;
use shared::validation::FieldErrors;
use shared::view::{Identified, ResourceLabels, TableRow};

use crate::store::{Order, Query, RecordStore, StoreError};

pub mod dialog;
pub mod list;
pub mod resources;

pub use dialog::{DeletionDialog, MutationDialog};
pub use list::RecordList;
pub use resources::{CostTypes, Lots, Products, Shipments};

/// Rows of another table that reference a record and block its deletion
#[derive(Debug, Clone, Copy)]
pub struct Dependents {
    pub table: &'static str,
    pub column: &'static str,
    pub noun: Noun,
}

/// Description of one record kind
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Row as stored
    type Stored: DeserializeOwned + Serialize + Identified + Clone + Send + Sync;
    /// Row as listed, possibly enriched with related records
    type Listed: DeserializeOwned + Serialize + Searchable + TableRow + Clone + Send + Sync;
    /// Mutation dialog schema
    type Form: RecordForm<Record = Self::Stored>;

    /// Name used in API paths and reload commands
    const NAME: &'static str;
    const TABLE: &'static str;
    const KEY: &'static str;
    const LABELS: ResourceLabels;
    const REQUIRED_ROLE: Option<Role> = None;
    const DEPENDENTS: &'static [Dependents] = &[];

    /// List ordering
    fn order() -> Order;

    fn key_of(record: &Self::Stored) -> &str;

    /// Choice lists the mutation dialog offers, keyed by form field
    async fn form_choices(_store: &dyn RecordStore) -> Result<FormChoices, StoreError> {
        Ok(FormChoices::new())
    }

    /// Fetch every row, ordered for display
    async fn load(store: &dyn RecordStore) -> Result<Vec<Self::Listed>, StoreError> {
        let rows = store
            .select(Self::TABLE, &Query::new().order(Self::order()))
            .await?;
        decode_rows(rows)
    }
}

/// Decode JSON rows into records
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(StoreError::from))
        .collect()
}

/// Fetch one stored record by primary key
pub async fn fetch_one<R: Resource>(
    store: &dyn RecordStore,
    key: &str,
) -> Result<Option<R::Stored>, StoreError> {
    let rows = store
        .select(R::TABLE, &Query::new().eq(R::KEY, key).limit(1))
        .await?;
    Ok(decode_rows::<R::Stored>(rows)?.into_iter().next())
}

/// Failures of the list loader and dialogs
#[derive(Debug, Error)]
pub enum RecordError {
    /// A remote call failed; `message` is the notification shown to the user
    #[error("{message}")]
    Store {
        message: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("form validation failed: {0}")]
    Invalid(FieldErrors),

    #[error("malformed form data: {0}")]
    Malformed(String),

    /// Deletion refused because other records depend on this one
    #[error("{0}")]
    Restricted(String),

    #[error("{0} not found")]
    NotFound(String),
}

impl RecordError {
    /// Notifications the presentation layer should show
    pub fn effects(&self) -> Vec<Effect> {
        match self {
            RecordError::Store { message, .. } => vec![Effect::error(*message)],
            RecordError::Restricted(message) => vec![Effect::warning(message.clone())],
            RecordError::Invalid(_) | RecordError::Malformed(_) | RecordError::NotFound(_) => {
                Vec::new()
            }
        }
    }
}

impl From<FormError> for RecordError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Invalid(fields) => RecordError::Invalid(fields),
            FormError::Malformed(message) => RecordError::Malformed(message),
        }
    }
}
