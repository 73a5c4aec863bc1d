use crate::{
    error::{AppError, AppResult},
    models::AiRecommendation,
    services::{lists::MovieListsService, providers::Recommender},
};

/// Generates recommendations for a free-text request
///
/// The liked movies of `partition` personalise the request; an empty liked
/// list yields a generic recommendation prompt.
pub async fn recommend(
    recommender: &dyn Recommender,
    lists: &MovieListsService,
    partition: &str,
    prompt: &str,
) -> AppResult<Vec<AiRecommendation>> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::InvalidInput(
            "Tell us what you are in the mood for".to_string(),
        ));
    }

    let liked_titles = lists.liked_titles(partition).await?;
    tracing::info!(
        partition = %partition,
        liked = liked_titles.len(),
        provider = recommender.name(),
        "Requesting AI recommendations"
    );

    recommender.recommend(prompt, liked_titles).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Movie;
    use crate::services::providers::MockRecommender;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn movie(id: u64, title: &str) -> Movie {
        serde_json::from_value(json!({ "id": id, "title": title })).unwrap()
    }

    #[tokio::test]
    async fn test_blank_prompt_rejected() {
        let recommender = MockRecommender::new();
        let lists = MovieListsService::new(Arc::new(MemoryStore::new()));
        let result = recommend(&recommender, &lists, "guest", "  ").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_liked_titles_are_forwarded() {
        let lists = MovieListsService::new(Arc::new(MemoryStore::new()));
        lists.toggle_like("neo", movie(1, "Inception")).await.unwrap();
        lists.toggle_like("neo", movie(2, "Arrival")).await.unwrap();
        lists.toggle_like("other", movie(3, "Heat")).await.unwrap();

        let mut recommender = MockRecommender::new();
        recommender.expect_name().return_const("mock");
        recommender
            .expect_recommend()
            .withf(|prompt, liked| {
                prompt == "quiet sci-fi"
                    && liked == &vec!["Inception".to_string(), "Arrival".to_string()]
            })
            .times(1)
            .returning(|_, _| {
                Ok(vec![AiRecommendation {
                    title: "Moon".to_string(),
                    year: 2009,
                    reason: "Lonely, cerebral sci-fi.".to_string(),
                }])
            });

        let recs = recommend(&recommender, &lists, "neo", " quiet sci-fi ")
            .await
            .unwrap();
        assert_eq!(recs[0].title, "Moon");
    }

    #[test]
    fn test_guest_without_likes_sends_no_titles() {
        let lists = MovieListsService::new(Arc::new(MemoryStore::new()));
        let mut recommender = MockRecommender::new();
        recommender.expect_name().return_const("mock");
        recommender
            .expect_recommend()
            .withf(|_, liked| liked.is_empty())
            .returning(|_, _| Ok(vec![]));

        let recs = tokio_test::block_on(recommend(&recommender, &lists, "guest", "anything"));
        assert!(recs.unwrap().is_empty());
    }
}
