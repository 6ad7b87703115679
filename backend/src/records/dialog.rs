//! Mutation and deletion dialogs
//!
//! A dialog performs exactly one remote write. On success it returns the
//! commands to notify, reload the list and close; on failure it stays open
//! and the store is left as it was.

use std::marker::PhantomData;

use shared::effects::Effect;
use shared::forms::{parse_form, RecordForm};
use shared::view::{delete_prompt, DeletePrompt};

use super::{fetch_one, Dependents, RecordError, Resource};
use crate::store::{Query, RecordStore, StoreError};

/// Create or edit one record
pub struct MutationDialog<R: Resource> {
    /// Primary key of the record being edited; `None` in create mode
    selected: Option<String>,
    values: R::Form,
    submitting: bool,
}

impl<R: Resource> MutationDialog<R> {
    /// Create mode, starting from the form defaults
    pub fn create() -> Self {
        Self {
            selected: None,
            values: R::Form::defaults(),
            submitting: false,
        }
    }

    /// Edit mode, pre-filled from the selected record
    pub fn edit(record: &R::Stored) -> Self {
        Self {
            selected: Some(R::key_of(record).to_string()),
            values: R::Form::from_record(record),
            submitting: false,
        }
    }

    /// Edit mode for a record known only by key
    pub fn edit_key(key: impl Into<String>) -> Self {
        Self {
            selected: Some(key.into()),
            values: R::Form::defaults(),
            submitting: false,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.selected.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn title(&self) -> &'static str {
        if self.is_edit() {
            R::LABELS.edit_title
        } else {
            R::LABELS.create_title
        }
    }

    pub fn values(&self) -> &R::Form {
        &self.values
    }

    pub fn set_values(&mut self, values: R::Form) {
        self.values = values;
    }

    /// Replace the in-progress values from submitted JSON and validate them
    pub fn fill(&mut self, raw: serde_json::Value) -> Result<(), RecordError> {
        self.values = parse_form::<R::Form>(raw)?;
        Ok(())
    }

    /// Derived total of the in-progress values
    pub fn live_total(&self) -> Option<f64> {
        self.values.live_total()
    }

    /// Validate, then insert or update depending on the mode
    pub async fn submit(&mut self, store: &dyn RecordStore) -> Result<Vec<Effect>, RecordError> {
        self.values.check().map_err(RecordError::Invalid)?;
        let payload = serde_json::to_value(self.values.to_payload()).map_err(|e| {
            RecordError::Store {
                message: R::LABELS.save_failed,
                source: StoreError::from(e),
            }
        })?;

        self.submitting = true;
        let result = match &self.selected {
            Some(key) => store.update(R::TABLE, R::KEY, key, payload).await,
            None => store.insert(R::TABLE, payload).await,
        };
        self.submitting = false;

        match result {
            Ok(()) => {
                let message = match &self.selected {
                    Some(key) => {
                        tracing::info!(resource = R::NAME, key = %key, "Record updated");
                        R::LABELS.updated
                    }
                    None => {
                        tracing::info!(resource = R::NAME, "Record created");
                        R::LABELS.created
                    }
                };
                Ok(vec![
                    Effect::success(message),
                    Effect::reload(R::NAME),
                    Effect::CloseDialog,
                ])
            }
            Err(source) => {
                tracing::error!(resource = R::NAME, error = %source, "Failed to save record");
                Err(RecordError::Store {
                    message: R::LABELS.save_failed,
                    source,
                })
            }
        }
    }
}

/// Confirm and delete one record by primary key
pub struct DeletionDialog<R: Resource> {
    key: String,
    deleting: bool,
    _resource: PhantomData<R>,
}

impl<R: Resource> DeletionDialog<R> {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            deleting: false,
            _resource: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The confirm trigger is disabled while a deletion is in flight
    pub fn can_confirm(&self) -> bool {
        !self.deleting
    }

    /// Identity fields and warnings of the selected record
    pub async fn prompt(&self, store: &dyn RecordStore) -> Result<DeletePrompt, RecordError> {
        let record = fetch_one::<R>(store, &self.key)
            .await
            .map_err(|source| self.failed(source))?
            .ok_or_else(|| RecordError::NotFound(self.key.clone()))?;

        let mut prompt = delete_prompt(&record, &R::LABELS);
        prompt.blocked = self.blocking_reason(store).await?;
        Ok(prompt)
    }

    /// Delete the record; an absent key is acknowledged as deleted
    pub async fn confirm(&mut self, store: &dyn RecordStore) -> Result<Vec<Effect>, RecordError> {
        if !self.can_confirm() {
            return Ok(Vec::new());
        }
        if let Some(reason) = self.blocking_reason(store).await? {
            tracing::warn!(resource = R::NAME, key = %self.key, "Deletion refused: {}", reason);
            return Err(RecordError::Restricted(reason));
        }

        self.deleting = true;
        let result = store.delete(R::TABLE, R::KEY, &self.key).await;
        self.deleting = false;

        match result {
            Ok(()) => {
                tracing::info!(resource = R::NAME, key = %self.key, "Record deleted");
                Ok(vec![
                    Effect::success(R::LABELS.deleted),
                    Effect::reload(R::NAME),
                    Effect::CloseDialog,
                ])
            }
            Err(source) => {
                tracing::error!(resource = R::NAME, key = %self.key, error = %source, "Failed to delete record");
                Err(self.failed(source))
            }
        }
    }

    fn failed(&self, source: StoreError) -> RecordError {
        RecordError::Store {
            message: R::LABELS.delete_failed,
            source,
        }
    }

    /// Records still referencing this one, described for the user
    async fn blocking_reason(&self, store: &dyn RecordStore) -> Result<Option<String>, RecordError> {
        for dependents in R::DEPENDENTS {
            let count = count_dependents(store, dependents, &self.key)
                .await
                .map_err(|source| self.failed(source))?;
            if count > 0 {
                return Ok(Some(format!(
                    "Impossible de supprimer {} : {} {}",
                    R::LABELS.subject,
                    dependents.noun.count(count),
                    dependents.noun.agree("rattaché", count)
                )));
            }
        }
        Ok(None)
    }
}

async fn count_dependents(
    store: &dyn RecordStore,
    dependents: &Dependents,
    key: &str,
) -> Result<usize, StoreError> {
    let rows = store
        .select(dependents.table, &Query::new().eq(dependents.column, key))
        .await?;
    Ok(rows.len())
}
