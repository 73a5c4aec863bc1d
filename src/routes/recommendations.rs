use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult, middleware::RequestId, models::AiRecommendation, routes::AppState,
    services::recommendations,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub prompt: String,
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Vec<AiRecommendation>>> {
    let partition = state.session.partition().await;
    let recommendations = recommendations::recommend(
        state.recommender.as_ref(),
        &state.lists,
        &partition,
        &request.prompt,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        results = recommendations.len(),
        "Recommendations completed"
    );

    Ok(Json(recommendations))
}
