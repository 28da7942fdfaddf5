use axum::extract::{Multipart, Path, State};
use axum::http::HeaderMap;
use axum::Json;
use uuid::Uuid;

use super::read_mutation_form;
use crate::actions::{create_item, delete_item, update_item, ActionResult};
use crate::auth::session_token_from_headers;
use crate::database::content::ListFilter;
use crate::database::templates::{TemplateDraft, TemplateRecord};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /dashboard/templates - full list, unpublished included.
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<TemplateRecord>> {
    let items = state.templates.list(&ListFilter::default()).await?;
    Ok(ApiResponse::success(items))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ActionResult>, ApiError> {
    let form = read_mutation_form::<TemplateDraft>(&mut multipart).await?;
    let token = session_token_from_headers(&headers);
    let deps = state.action_deps();
    Ok(Json(
        create_item(&deps, state.templates.as_ref(), token.as_deref(), form.draft, form.image).await,
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ActionResult>, ApiError> {
    let form = read_mutation_form::<TemplateDraft>(&mut multipart).await?;
    let token = session_token_from_headers(&headers);
    let deps = state.action_deps();
    Ok(Json(
        update_item(
            &deps,
            state.templates.as_ref(),
            token.as_deref(),
            Some(id),
            form.draft,
            form.image,
        )
        .await,
    ))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Json<ActionResult> {
    let token = session_token_from_headers(&headers);
    let deps = state.action_deps();
    Json(delete_item(&deps, state.templates.as_ref(), token.as_deref(), id).await)
}
