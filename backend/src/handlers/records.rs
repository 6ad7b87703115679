//! Record list, form and mutation HTTP handlers
//!
//! One set of handlers serves every [`Resource`]; routes instantiate them
//! per record kind.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shared::effects::Effect;
use shared::forms::{read_form, FormChoices};
use shared::session::Session;
use shared::view::{DeletePrompt, ListView};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentSession;
use crate::records::{fetch_one, DeletionDialog, MutationDialog, RecordList, Resource};
use crate::AppState;

const CHOICES_FAILED: &str = "Impossible de charger les données";

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct ListResponse<T> {
    pub view: ListView,
    /// Records matching the search term
    pub records: Vec<T>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct FormResponse<F> {
    pub mode: &'static str,
    pub title: &'static str,
    pub values: F,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_total: Option<f64>,
    /// Choice lists for fields that reference other records
    #[serde(skip_serializing_if = "FormChoices::is_empty")]
    pub choices: FormChoices,
}

#[derive(Debug, Serialize)]
pub struct EffectsResponse {
    pub effects: Vec<Effect>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub total: Option<f64>,
}

/// Reject sessions that may not see this record kind
pub fn authorize<R: Resource>(session: &Session) -> AppResult<()> {
    session.require_user()?;
    if let Some(role) = R::REQUIRED_ROLE {
        session.require_role(role)?;
    }
    Ok(())
}

/// List records, filtered by the optional search term
pub async fn list<R: Resource>(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ListResponse<R::Listed>>> {
    authorize::<R>(&session)?;

    let mut list = RecordList::<R>::new();
    list.set_search(params.search.unwrap_or_default());
    list.load(state.store.as_ref()).await?;

    Ok(Json(ListResponse {
        view: list.view(),
        records: list.visible().into_iter().cloned().collect(),
        total: list.records().len(),
    }))
}

/// Create-mode form values
pub async fn create_form<R: Resource>(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> AppResult<Json<FormResponse<R::Form>>> {
    authorize::<R>(&session)?;
    let choices = load_choices::<R>(&state).await?;
    Ok(Json(form_response(&MutationDialog::<R>::create(), choices)))
}

/// Edit-mode form values, pre-filled from the stored record
pub async fn edit_form<R: Resource>(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(key): Path<String>,
) -> AppResult<Json<FormResponse<R::Form>>> {
    authorize::<R>(&session)?;

    let record = fetch_one::<R>(state.store.as_ref(), &key)
        .await
        .map_err(|source| AppError::Store {
            message_fr: R::LABELS.load_failed,
            source,
        })?
        .ok_or(AppError::NotFound(key))?;
    let choices = load_choices::<R>(&state).await?;
    Ok(Json(form_response(&MutationDialog::<R>::edit(&record), choices)))
}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(values): Json<Value>,
) -> AppResult<(StatusCode, Json<EffectsResponse>)> {
    authorize::<R>(&session)?;

    let mut dialog = MutationDialog::<R>::create();
    dialog.fill(values)?;
    let effects = dialog.submit(state.store.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(EffectsResponse { effects })))
}

pub async fn update<R: Resource>(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(key): Path<String>,
    Json(values): Json<Value>,
) -> AppResult<Json<EffectsResponse>> {
    authorize::<R>(&session)?;

    let mut dialog = MutationDialog::<R>::edit_key(key);
    dialog.fill(values)?;
    let effects = dialog.submit(state.store.as_ref()).await?;
    Ok(Json(EffectsResponse { effects }))
}

pub async fn remove<R: Resource>(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(key): Path<String>,
) -> AppResult<Json<EffectsResponse>> {
    authorize::<R>(&session)?;

    let mut dialog = DeletionDialog::<R>::new(key);
    let effects = dialog.confirm(state.store.as_ref()).await?;
    Ok(Json(EffectsResponse { effects }))
}

/// Identity fields and warnings shown before a deletion
pub async fn delete_prompt<R: Resource>(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(key): Path<String>,
) -> AppResult<Json<DeletePrompt>> {
    authorize::<R>(&session)?;

    let dialog = DeletionDialog::<R>::new(key);
    Ok(Json(dialog.prompt(state.store.as_ref()).await?))
}

/// Derived total of in-progress form values
///
/// Values are not validated: the total tracks the form while it is edited.
pub async fn preview<R: Resource>(
    CurrentSession(session): CurrentSession,
    Json(values): Json<Value>,
) -> AppResult<Json<PreviewResponse>> {
    authorize::<R>(&session)?;

    let mut dialog = MutationDialog::<R>::create();
    let form = read_form::<R::Form>(values).map_err(|e| AppError::BadRequest(e.to_string()))?;
    dialog.set_values(form);
    Ok(Json(PreviewResponse {
        total: dialog.live_total(),
    }))
}

async fn load_choices<R: Resource>(state: &AppState) -> AppResult<FormChoices> {
    R::form_choices(state.store.as_ref()).await.map_err(|source| {
        tracing::error!(resource = R::NAME, error = %source, "Failed to load form choices");
        AppError::Store {
            message_fr: CHOICES_FAILED,
            source,
        }
    })
}

fn form_response<R: Resource>(
    dialog: &MutationDialog<R>,
    choices: FormChoices,
) -> FormResponse<R::Form> {
    FormResponse {
        mode: if dialog.is_edit() { "edit" } else { "create" },
        title: dialog.title(),
        values: dialog.values().clone(),
        live_total: dialog.live_total(),
        choices,
    }
}
