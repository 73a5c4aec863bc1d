use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Notification, NotificationKind},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct AddNotificationRequest {
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: NotificationKind,
}

pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<Notification>> {
    Json(state.notifications.list().await)
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddNotificationRequest>,
) -> AppResult<(StatusCode, Json<Notification>)> {
    if request.message.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Notification message cannot be empty".to_string(),
        ));
    }
    let notification = state
        .notifications
        .add(request.message, request.kind)
        .await;
    Ok((StatusCode::CREATED, Json(notification)))
}
