use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::content::ListFilter;
use crate::database::portfolio::PortfolioRecord;
use crate::database::templates::TemplateRecord;
use crate::database::tutorials::BlogPostRecord;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub tag: Option<String>,
}

impl SearchQuery {
    fn filter(&self, published_only: bool) -> ListFilter {
        ListFilter {
            search: self.q.as_ref().filter(|q| !q.trim().is_empty()).cloned(),
            tags: self.tag.iter().cloned().collect(),
            published_only,
        }
    }
}

/// GET /portfolio - the public portfolio grid does not filter on
/// publication state; drafts are visible here.
pub async fn portfolio_list(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<PortfolioRecord>> {
    let items = state.portfolio.list(&query.filter(false)).await?;
    Ok(ApiResponse::success(items))
}

/// GET /portfolio/:slug - detail plus up to three sibling items.
pub async fn portfolio_detail(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<Value> {
    let item = state
        .portfolio
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Portfolio item not found"))?;

    let related = match state.portfolio.related(item.id, 3).await {
        Ok(related) => related,
        Err(e) => {
            tracing::error!("Error fetching related portfolio items: {}", e);
            Vec::new()
        }
    };

    Ok(ApiResponse::success(json!({ "item": item, "related": related })))
}

/// GET /templates - published templates only.
pub async fn templates_list(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<TemplateRecord>> {
    let items = state.templates.list(&query.filter(true)).await?;
    Ok(ApiResponse::success(items))
}

pub async fn template_detail(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<TemplateRecord> {
    let item = state
        .templates
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Template not found"))?;
    Ok(ApiResponse::success(item))
}

/// GET /tutorials - published posts, searchable by title and tag.
pub async fn tutorials_list(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<BlogPostRecord>> {
    let items = state.tutorials.list(&query.filter(true)).await?;
    Ok(ApiResponse::success(items))
}

pub async fn tutorial_detail(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<BlogPostRecord> {
    let item = state
        .tutorials
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    Ok(ApiResponse::success(item))
}
