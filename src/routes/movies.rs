use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{Genre, Movie, PaginatedResponse, SortOption, TimeWindow},
    routes::AppState,
    services::{
        browse::{self, MovieDetailView, PersonView},
        providers::QueryParams,
        suggestions::Suggestions,
    },
};

/// Paging and region shared by the catalog list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub region: Option<String>,
    pub page: Option<u32>,
}

impl ListQuery {
    fn into_params(self) -> QueryParams {
        let mut params = Vec::new();
        if let Some(region) = self.region.filter(|r| !r.trim().is_empty()) {
            params.push(("region".to_string(), region));
        }
        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        params
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendingQuery {
    #[serde(default)]
    pub window: TimeWindow,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub page: Option<u32>,
    #[serde(default)]
    pub sort: SortOption,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn genres(State(state): State<Arc<AppState>>) -> Json<Vec<Genre>> {
    Json(state.genres.genres().await)
}

pub async fn popular(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<Movie>>> {
    Ok(Json(state.catalog.popular(query.into_params()).await?))
}

pub async fn now_playing(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<Movie>>> {
    Ok(Json(state.catalog.now_playing(query.into_params()).await?))
}

pub async fn upcoming(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<Movie>>> {
    Ok(Json(state.catalog.upcoming(query.into_params()).await?))
}

pub async fn trending(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrendingQuery>,
) -> AppResult<Json<PaginatedResponse<Movie>>> {
    Ok(Json(state.catalog.trending(query.window).await?))
}

/// Forwards every query parameter to TMDB discover
pub async fn discover(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> AppResult<Json<PaginatedResponse<Movie>>> {
    Ok(Json(state.catalog.discover(params).await?))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<PaginatedResponse<Movie>>> {
    tracing::info!(
        request_id = %request_id,
        query = %query.q,
        sort = query.sort.as_tmdb_param(),
        "Processing search request"
    );

    let results = browse::search_results(
        state.catalog.as_ref(),
        &query.q,
        query.page.unwrap_or(1),
        query.sort,
        chrono::Utc::now().date_naive(),
    )
    .await?;
    Ok(Json(results))
}

pub async fn suggestions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SuggestionQuery>,
) -> Json<Suggestions> {
    Json(state.suggestions.suggest(&query.q).await)
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(movie_id): Path<u64>,
) -> AppResult<Json<MovieDetailView>> {
    let partition = state.session.partition().await;
    let status = state.lists.status(&partition, movie_id).await?;

    let view =
        browse::movie_detail_view(state.catalog.as_ref(), &state.genres, movie_id, status).await?;

    tracing::info!(
        request_id = %request_id,
        movie_id,
        trailer = view.trailer.is_some(),
        similar = view.similar.len(),
        "Movie detail assembled"
    );

    Ok(Json(view))
}

pub async fn similar(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<u64>,
) -> AppResult<Json<PaginatedResponse<Movie>>> {
    Ok(Json(state.catalog.similar(movie_id).await?))
}

pub async fn person(
    State(state): State<Arc<AppState>>,
    Path(person_id): Path<u64>,
) -> AppResult<Json<PersonView>> {
    Ok(Json(
        browse::person_view(state.catalog.as_ref(), person_id).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_params() {
        let query = ListQuery {
            region: Some("IN".to_string()),
            page: Some(2),
        };
        assert_eq!(
            query.into_params(),
            vec![
                ("region".to_string(), "IN".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_region_is_dropped() {
        let query = ListQuery {
            region: Some(" ".to_string()),
            page: None,
        };
        assert!(query.into_params().is_empty());
    }
}
