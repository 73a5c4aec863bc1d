use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::Movie,
    routes::{movies::TrendingQuery, AppState},
    services::browse::{self, HomeFeed, HomeFilters},
};

/// Home screen; signed-in users only
pub async fn home(
    State(state): State<Arc<AppState>>,
    Query(filters): Query<HomeFilters>,
) -> AppResult<Json<HomeFeed>> {
    state.session.require_user().await?;
    let feed = browse::home_feed(
        state.catalog.as_ref(),
        &filters,
        chrono::Utc::now().date_naive(),
    )
    .await?;
    Ok(Json(feed))
}

pub async fn trending(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrendingQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    Ok(Json(
        browse::trending_feed(state.catalog.as_ref(), query.window).await?,
    ))
}
