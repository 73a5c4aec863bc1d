//! Upstream data providers
//!
//! The movie catalog and the AI recommender are the two external services
//! this API sits on. Both are traits so handlers and feeds can run against
//! fakes in tests.
use crate::{
    error::AppResult,
    models::{
        AiRecommendation, Genre, Movie, MovieDetails, PaginatedResponse, PersonDetails,
        PersonMovieCredits, TimeWindow,
    },
};

pub mod gemini;
pub mod tmdb;

pub use gemini::GeminiClient;
pub use tmdb::TmdbClient;

/// Extra query parameters forwarded to the catalog (`region`, `with_genres`, ...)
pub type QueryParams = Vec<(String, String)>;

/// Movie metadata source
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn popular(&self, params: QueryParams) -> AppResult<PaginatedResponse<Movie>>;

    async fn trending(&self, window: TimeWindow) -> AppResult<PaginatedResponse<Movie>>;

    /// Movies currently in theaters; `region` narrows it to one country
    async fn now_playing(&self, params: QueryParams) -> AppResult<PaginatedResponse<Movie>>;

    async fn upcoming(&self, params: QueryParams) -> AppResult<PaginatedResponse<Movie>>;

    async fn genres(&self) -> AppResult<Vec<Genre>>;

    /// Details with videos, watch providers and credits appended
    async fn movie_details(&self, movie_id: u64) -> AppResult<MovieDetails>;

    /// Filtered listing (`sort_by`, `with_genres`, `primary_release_year`, ...)
    async fn discover(&self, params: QueryParams) -> AppResult<PaginatedResponse<Movie>>;

    async fn search(&self, query: &str, page: u32) -> AppResult<PaginatedResponse<Movie>>;

    async fn similar(&self, movie_id: u64) -> AppResult<PaginatedResponse<Movie>>;

    async fn person_details(&self, person_id: u64) -> AppResult<PersonDetails>;

    async fn person_movie_credits(&self, person_id: u64) -> AppResult<PersonMovieCredits>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Natural-language recommendation source
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Recommender: Send + Sync {
    /// Recommends movies for `prompt`, personalised by `liked_titles` when non-empty
    async fn recommend(
        &self,
        prompt: &str,
        liked_titles: Vec<String>,
    ) -> AppResult<Vec<AiRecommendation>>;

    fn name(&self) -> &'static str;
}
