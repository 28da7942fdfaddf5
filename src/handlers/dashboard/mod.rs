use axum::extract::{Multipart, State};
use axum::routing::{get, put};
use axum::Router;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::storage::ImageFile;

pub mod portfolio;
pub mod templates;
pub mod tutorials;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(overview))
        .route("/dashboard/portfolio", get(portfolio::list).post(portfolio::create))
        .route("/dashboard/portfolio/:id", put(portfolio::update).delete(portfolio::remove))
        .route("/dashboard/templates", get(templates::list).post(templates::create))
        .route("/dashboard/templates/:id", put(templates::update).delete(templates::remove))
        .route("/dashboard/tutorials", get(tutorials::list).post(tutorials::create))
        .route("/dashboard/tutorials/:id", put(tutorials::update).delete(tutorials::remove))
}

/// GET /dashboard - row counts backing the overview page.
pub async fn overview(State(state): State<AppState>) -> ApiResult<Value> {
    let portfolio = state.portfolio.count().await?;
    let templates = state.templates.count().await?;
    let tutorials = state.tutorials.count().await?;

    Ok(ApiResponse::success(json!({
        "portfolio": portfolio,
        "templates": templates,
        "tutorials": tutorials,
    })))
}

pub(crate) struct MutationForm<D> {
    pub draft: D,
    pub image: Option<ImageFile>,
}

/// Read a mutation form: a `data` part carrying the JSON draft and an
/// optional `image` part carrying the uploaded file.
pub(crate) async fn read_mutation_form<D: DeserializeOwned>(multipart: &mut Multipart) -> Result<MutationForm<D>, ApiError> {
    let mut data: Option<bytes::Bytes> = None;
    let mut image: Option<ImageFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("data") => {
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Invalid data field: {}", e)))?,
                );
            }
            Some("image") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid image field: {}", e)))?;
                // Browsers submit an empty file part when no file was picked
                if !bytes.is_empty() {
                    image = Some(ImageFile {
                        filename,
                        content_type,
                        bytes,
                    });
                }
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| ApiError::bad_request("Missing data field"))?;
    let draft = serde_json::from_slice::<D>(&data)
        .map_err(|e| ApiError::bad_request(format!("Invalid data payload: {}", e)))?;

    Ok(MutationForm { draft, image })
}
