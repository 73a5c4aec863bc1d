use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{
        lists::by_rating_desc, sort::sort_movies, Movie, MovieStatus, Notification, RatedMovie,
        Rating, SortOption,
    },
    routes::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct SortQuery {
    #[serde(default)]
    pub sort: SortOption,
}

#[derive(Debug, Deserialize)]
pub struct MovieRequest {
    pub movie: Movie,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub movie: Movie,
    pub rating: i64,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    /// Whether the movie is in the list after the toggle
    pub active: bool,
    pub notification: Notification,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub rating: Rating,
    pub notification: Notification,
}

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

pub async fn liked(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SortQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let user = state.session.require_user().await?;
    let movies = state.lists.liked(&user.username).await?;
    Ok(Json(sort_movies(movies, query.sort, today())))
}

pub async fn watchlist(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SortQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let user = state.session.require_user().await?;
    let movies = state.lists.watchlist(&user.username).await?;
    Ok(Json(sort_movies(movies, query.sort, today())))
}

/// Rated movies of the active partition, highest rating first
pub async fn rated(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<RatedMovie>>> {
    let partition = state.session.partition().await;
    Ok(Json(by_rating_desc(state.lists.rated(&partition).await?)))
}

pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<MovieRequest>,
) -> AppResult<Json<ToggleResponse>> {
    let partition = state.session.partition().await;
    let title = request.movie.display_title().to_string();
    let active = state.lists.toggle_like(&partition, request.movie).await?;

    tracing::info!(request_id = %request_id, partition = %partition, title = %title, active, "Like toggled");

    let message = if active {
        "Added to liked movies".to_string()
    } else {
        "Removed from liked movies".to_string()
    };
    let notification = state.notifications.success(message).await;
    Ok(Json(ToggleResponse {
        active,
        notification,
    }))
}

pub async fn toggle_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<MovieRequest>,
) -> AppResult<Json<ToggleResponse>> {
    let partition = state.session.partition().await;
    let title = request.movie.display_title().to_string();
    let active = state
        .lists
        .toggle_watchlist(&partition, request.movie)
        .await?;

    tracing::info!(request_id = %request_id, partition = %partition, title = %title, active, "Watchlist toggled");

    let message = if active {
        "Added to watchlist".to_string()
    } else {
        "Removed from watchlist".to_string()
    };
    let notification = state.notifications.success(message).await;
    Ok(Json(ToggleResponse {
        active,
        notification,
    }))
}

pub async fn rate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RateRequest>,
) -> AppResult<Json<RateResponse>> {
    let rating = Rating::new(request.rating)?;
    let partition = state.session.partition().await;
    let title = request.movie.display_title().to_string();
    state
        .lists
        .rate_movie(&partition, request.movie, rating)
        .await?;

    let notification = state
        .notifications
        .success(format!("Rated {} {}/10", title, rating))
        .await;
    Ok(Json(RateResponse {
        rating,
        notification,
    }))
}

pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<u64>,
) -> AppResult<Json<MovieStatus>> {
    let partition = state.session.partition().await;
    Ok(Json(state.lists.status(&partition, movie_id).await?))
}
