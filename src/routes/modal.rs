use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{routes::AppState, services::modal::ModalSnapshot};

#[derive(Debug, Deserialize)]
pub struct OpenModalRequest {
    pub movie_id: u64,
}

pub async fn snapshot(State(state): State<Arc<AppState>>) -> Json<ModalSnapshot> {
    Json(state.modal.snapshot().await)
}

pub async fn open(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OpenModalRequest>,
) -> Json<ModalSnapshot> {
    Json(state.modal.open(request.movie_id).await)
}

pub async fn close(State(state): State<Arc<AppState>>) -> Json<ModalSnapshot> {
    Json(state.modal.close().await)
}
