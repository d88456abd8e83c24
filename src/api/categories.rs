//! Public category endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::error::{ok, ApiError, Envelope};
use crate::db::{self, Category};
use crate::AppState;

/// GET /api/categories
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<Vec<Category>>>, ApiError> {
    Ok(ok(db::list_categories(&state.db).await?))
}

/// GET /api/categories/:id
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<Category>>, ApiError> {
    let category = db::get_category(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("category not found"))?;
    Ok(ok(category))
}
