use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{error::AppResult, models::User, routes::AppState};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: String,
}

/// The signed-in user, or `null`
pub async fn current(State(state): State<Arc<AppState>>) -> Json<Option<User>> {
    Json(state.session.current_user().await)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<User>> {
    let user = state
        .session
        .login(&request.username, &request.password)
        .await?;
    Ok(Json(user))
}

pub async fn logout(State(state): State<Arc<AppState>>) -> AppResult<StatusCode> {
    state.session.logout().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateProfileRequest>,
) -> AppResult<Json<User>> {
    let user = state.session.update_user(&request.username).await?;
    state
        .notifications
        .success("Profile updated successfully!")
        .await;
    Ok(Json(user))
}
