//! Statistics endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, services::stats::CatalogCounts};

/// Catalog counts for the landing page
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Catalog counts", body = CatalogCounts)
    )
)]
pub async fn get_stats(State(state): State<crate::AppState>) -> AppResult<Json<CatalogCounts>> {
    let counts = state.services.stats.catalog_counts().await?;
    Ok(Json(counts))
}
