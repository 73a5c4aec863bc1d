/// TMDB (The Movie Database) catalog provider
///
/// Every request carries the API key and the configured language. Genre
/// lists and movie details are cached through the response cache; list
/// endpoints change too often to be worth caching.
use crate::{
    cached,
    error::{AppError, AppResult},
    models::{
        Genre, GenreList, Movie, MovieDetails, PaginatedResponse, PersonDetails,
        PersonMovieCredits, TimeWindow,
    },
    services::providers::{MovieCatalog, QueryParams},
    store::{CacheKey, ResponseCache},
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

const GENRE_CACHE_TTL: u64 = 86_400; // 1 day
const DETAILS_CACHE_TTL: u64 = 3600; // 1 hour
const DETAILS_APPEND: &str = "videos,watch/providers,credits";

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    language: String,
    cache: ResponseCache,
}

impl TmdbClient {
    /// Creates a client; a trailing slash on `api_url` is ignored
    pub fn new(cache: ResponseCache, api_key: String, api_url: String, language: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            language,
            cache,
        }
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_url, endpoint)
    }

    /// Credentials and language first; caller params may override the language
    fn query_pairs(&self, params: &[(String, String)]) -> Vec<(String, String)> {
        let mut pairs = vec![("api_key".to_string(), self.api_key.clone())];
        if !params.iter().any(|(k, _)| k == "language") {
            pairs.push(("language".to_string(), self.language.clone()));
        }
        pairs.extend(params.iter().cloned());
        pairs
    }

    /// GETs `endpoint` and deserializes the body
    ///
    /// 404 maps to `NotFound`, any other non-2xx status to `ExternalApi`.
    async fn fetch_data<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> AppResult<T> {
        let response = self
            .http_client
            .get(self.endpoint_url(endpoint))
            .query(&self.query_pairs(params))
            .send()
            // The URL holds the API key; the error conversion strips it
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("TMDB resource {}", endpoint)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(endpoint = %endpoint, status = %status, "TMDB request failed");
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, endpoint = %endpoint, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }

    /// `fetch_data` for list endpoints, with a debug line per page
    async fn fetch_page(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> AppResult<PaginatedResponse<Movie>> {
        let page: PaginatedResponse<Movie> = self.fetch_data(endpoint, params).await?;
        tracing::debug!(
            endpoint = %endpoint,
            results = page.results.len(),
            page = page.page,
            "TMDB page fetched"
        );
        Ok(page)
    }
}

#[async_trait::async_trait]
impl MovieCatalog for TmdbClient {
    async fn popular(&self, params: QueryParams) -> AppResult<PaginatedResponse<Movie>> {
        self.fetch_page("movie/popular", &params).await
    }

    async fn trending(&self, window: TimeWindow) -> AppResult<PaginatedResponse<Movie>> {
        self.fetch_page(&format!("trending/movie/{}", window.as_str()), &[])
            .await
    }

    async fn now_playing(&self, params: QueryParams) -> AppResult<PaginatedResponse<Movie>> {
        self.fetch_page("movie/now_playing", &params).await
    }

    async fn upcoming(&self, params: QueryParams) -> AppResult<PaginatedResponse<Movie>> {
        self.fetch_page("movie/upcoming", &params).await
    }

    async fn genres(&self) -> AppResult<Vec<Genre>> {
        cached!(
            self.cache,
            CacheKey::GenreList(self.language.clone()),
            GENRE_CACHE_TTL,
            async move {
                let list: GenreList = self.fetch_data("genre/movie/list", &[]).await?;
                tracing::info!(genres = list.genres.len(), "Genre list fetched");
                Ok::<_, AppError>(list.genres)
            }
        )
    }

    async fn movie_details(&self, movie_id: u64) -> AppResult<MovieDetails> {
        cached!(
            self.cache,
            CacheKey::MovieDetails {
                id: movie_id,
                language: self.language.clone(),
            },
            DETAILS_CACHE_TTL,
            async move {
                let params = [(
                    "append_to_response".to_string(),
                    DETAILS_APPEND.to_string(),
                )];
                self.fetch_data::<MovieDetails>(&format!("movie/{}", movie_id), &params)
                    .await
            }
        )
    }

    async fn discover(&self, params: QueryParams) -> AppResult<PaginatedResponse<Movie>> {
        self.fetch_page("discover/movie", &params).await
    }

    async fn search(&self, query: &str, page: u32) -> AppResult<PaginatedResponse<Movie>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let params = [
            ("query".to_string(), query.to_string()),
            ("page".to_string(), page.max(1).to_string()),
        ];
        let results = self.fetch_page("search/movie", &params).await?;

        tracing::info!(
            query = %query,
            results = results.results.len(),
            provider = "tmdb",
            "Movie search completed"
        );

        Ok(results)
    }

    async fn similar(&self, movie_id: u64) -> AppResult<PaginatedResponse<Movie>> {
        self.fetch_page(&format!("movie/{}/similar", movie_id), &[])
            .await
    }

    async fn person_details(&self, person_id: u64) -> AppResult<PersonDetails> {
        self.fetch_data(&format!("person/{}", person_id), &[]).await
    }

    async fn person_movie_credits(&self, person_id: u64) -> AppResult<PersonMovieCredits> {
        self.fetch_data(&format!("person/{}/movie_credits", person_id), &[])
            .await
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::kv::KeyValueStore;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn create_test_client() -> TmdbClient {
        let (cache, _handle) = ResponseCache::new(Arc::new(MemoryStore::new()));
        TmdbClient::new(
            cache,
            "test_key".to_string(),
            "http://tmdb.test/3/".to_string(),
            "en-US".to_string(),
        )
    }

    #[tokio::test]
    async fn test_endpoint_url_strips_trailing_slash() {
        let client = create_test_client();
        assert_eq!(
            client.endpoint_url("movie/popular"),
            "http://tmdb.test/3/movie/popular"
        );
    }

    #[tokio::test]
    async fn test_query_pairs_include_key_and_language() {
        let client = create_test_client();
        let pairs = client.query_pairs(&[("region".to_string(), "IN".to_string())]);
        assert_eq!(
            pairs,
            vec![
                ("api_key".to_string(), "test_key".to_string()),
                ("language".to_string(), "en-US".to_string()),
                ("region".to_string(), "IN".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_query_pairs_respect_language_override() {
        let client = create_test_client();
        let pairs = client.query_pairs(&[("language".to_string(), "hi-IN".to_string())]);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1], ("language".to_string(), "hi-IN".to_string()));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_api_key() {
        let (cache, _handle) = ResponseCache::new(Arc::new(MemoryStore::new()));
        let client = TmdbClient::new(
            cache,
            "SUPERSECRETKEY".to_string(),
            "http://127.0.0.1:9".to_string(),
            "en-US".to_string(),
        );

        let err = client.popular(vec![]).await.unwrap_err();
        assert!(matches!(err, AppError::HttpClient(_)));
        assert!(!err.to_string().contains("SUPERSECRETKEY"));

        let response = axum::response::IntoResponse::into_response(err);
        assert_eq!(response.status(), axum::http::StatusCode::BAD_GATEWAY);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(!String::from_utf8_lossy(&body).contains("SUPERSECRETKEY"));
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let client = create_test_client();
        let result = client.search("   ", 1).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_genres_served_from_cache() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                "cinesuggest_cache:genres:en-us",
                r#"[{"id":28,"name":"Action"},{"id":35,"name":"Comedy"}]"#,
            )
            .await
            .unwrap();
        let (cache, _handle) = ResponseCache::new(store);
        let client = TmdbClient::new(
            cache,
            "test_key".to_string(),
            // Unroutable: a cache miss would fail the test
            "http://127.0.0.1:9".to_string(),
            "en-US".to_string(),
        );

        let genres = client.genres().await.unwrap();
        assert_eq!(genres.len(), 2);
        assert_eq!(genres[1].name, "Comedy");
    }

    #[test]
    fn test_paginated_response_deserialization() {
        let json = r#"{
            "page": 1,
            "results": [{"id": 603, "title": "The Matrix", "release_date": "1999-03-31", "vote_average": 8.2}],
            "total_pages": 1,
            "total_results": 1
        }"#;

        let page: PaginatedResponse<Movie> = serde_json::from_str(json).unwrap();
        assert_eq!(page.results[0].display_title(), "The Matrix");
        assert_eq!(page.total_results, 1);
    }
}
