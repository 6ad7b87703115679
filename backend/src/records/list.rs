//! Record list loader with a local filter view

use std::marker::PhantomData;

use shared::search::filter_records;
use shared::view::{render_list, ListView};

use super::{RecordError, Resource};
use crate::store::RecordStore;

/// Cached collection of one resource plus the current search term
pub struct RecordList<R: Resource> {
    records: Vec<R::Listed>,
    search: String,
    loading: bool,
    _resource: PhantomData<R>,
}

impl<R: Resource> Default for RecordList<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            search: String::new(),
            loading: false,
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> RecordList<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached collection with a fresh load
    ///
    /// On failure the previous collection is kept.
    pub async fn load(&mut self, store: &dyn RecordStore) -> Result<(), RecordError> {
        self.loading = true;
        let result = R::load(store).await;
        self.loading = false;

        match result {
            Ok(records) => {
                tracing::debug!(resource = R::NAME, count = records.len(), "Loaded records");
                self.records = records;
                Ok(())
            }
            Err(source) => {
                tracing::error!(resource = R::NAME, error = %source, "Failed to load records");
                Err(RecordError::Store {
                    message: R::LABELS.load_failed,
                    source,
                })
            }
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The whole cached collection
    pub fn records(&self) -> &[R::Listed] {
        &self.records
    }

    /// Records matching the current search term, in collection order
    pub fn visible(&self) -> Vec<&R::Listed> {
        filter_records(&self.records, &self.search)
    }

    pub fn view(&self) -> ListView {
        let mut view = render_list(&self.records, &self.search, &R::LABELS);
        view.loading = self.loading;
        view
    }
}
