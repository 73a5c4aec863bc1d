use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::{models::Movie, services::providers::MovieCatalog};

pub const MAX_SUGGESTIONS: usize = 5;

/// Result of a suggestion request
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Suggestions {
    /// A newer keystroke arrived during the debounce window
    pub superseded: bool,
    pub results: Vec<Movie>,
}

impl Suggestions {
    fn empty() -> Self {
        Self {
            superseded: false,
            results: Vec::new(),
        }
    }

    fn superseded() -> Self {
        Self {
            superseded: true,
            results: Vec::new(),
        }
    }
}

/// Debounced search-as-you-type
///
/// Each keystroke is a request. Only a query that stays the latest for the
/// whole debounce window reaches the catalog; earlier ones resolve as
/// superseded.
pub struct SuggestionService {
    catalog: Arc<dyn MovieCatalog>,
    debounce: Duration,
    latest: AtomicU64,
}

impl SuggestionService {
    /// Creates the service; `debounce` is the quiet period before a query is sent
    pub fn new(catalog: Arc<dyn MovieCatalog>, debounce: Duration) -> Self {
        Self {
            catalog,
            debounce,
            latest: AtomicU64::new(0),
        }
    }

    /// Up to five matches for `query`, or `superseded` when a newer query arrived
    ///
    /// Never fails: catalog errors are logged and yield no suggestions.
    pub async fn suggest(&self, query: &str) -> Suggestions {
        // Every call, blank ones included, cancels whatever is pending
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        let query = query.trim();
        if query.is_empty() {
            return Suggestions::empty();
        }

        tokio::time::sleep(self.debounce).await;
        if self.latest.load(Ordering::SeqCst) != ticket {
            tracing::debug!(query = %query, "Suggestion superseded");
            return Suggestions::superseded();
        }

        match self.catalog.search(query, 1).await {
            Ok(page) => Suggestions {
                superseded: false,
                results: page.results.into_iter().take(MAX_SUGGESTIONS).collect(),
            },
            Err(e) => {
                tracing::error!(error = %e, query = %query, "Failed to fetch search suggestions");
                Suggestions::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::PaginatedResponse;
    use crate::services::providers::MockMovieCatalog;
    use serde_json::json;

    fn page(count: u64) -> PaginatedResponse<Movie> {
        let results = (1..=count)
            .map(|id| serde_json::from_value(json!({ "id": id, "title": format!("Movie {}", id) })).unwrap())
            .collect();
        PaginatedResponse {
            page: 1,
            results,
            total_pages: 1,
            total_results: count as u32,
        }
    }

    #[tokio::test]
    async fn test_blank_query_skips_catalog() {
        let catalog = MockMovieCatalog::new();
        let service = SuggestionService::new(Arc::new(catalog), Duration::from_millis(5));
        assert_eq!(service.suggest("   ").await, Suggestions::empty());
    }

    #[tokio::test]
    async fn test_returns_first_five_results() {
        let mut catalog = MockMovieCatalog::new();
        catalog
            .expect_search()
            .withf(|query, page| query == "star" && *page == 1)
            .times(1)
            .returning(|_, _| Ok(page(8)));

        let service = SuggestionService::new(Arc::new(catalog), Duration::from_millis(5));
        let suggestions = service.suggest(" star ").await;
        assert!(!suggestions.superseded);
        assert_eq!(suggestions.results.len(), MAX_SUGGESTIONS);
        assert_eq!(suggestions.results[0].id, 1);
    }

    #[tokio::test]
    async fn test_newer_keystroke_supersedes_older() {
        let mut catalog = MockMovieCatalog::new();
        catalog
            .expect_search()
            .withf(|query, _| query == "star w")
            .times(1)
            .returning(|_, _| Ok(page(2)));

        let service = Arc::new(SuggestionService::new(
            Arc::new(catalog),
            Duration::from_millis(50),
        ));

        let first = {
            let service = service.clone();
            tokio::spawn(async move { service.suggest("star").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = service.suggest("star w").await;

        assert_eq!(first.await.unwrap(), Suggestions::superseded());
        assert_eq!(second.results.len(), 2);
    }

    #[tokio::test]
    async fn test_catalog_failure_yields_empty() {
        let mut catalog = MockMovieCatalog::new();
        catalog
            .expect_search()
            .returning(|_, _| Err(AppError::ExternalApi("down".to_string())));

        let service = SuggestionService::new(Arc::new(catalog), Duration::from_millis(5));
        assert_eq!(service.suggest("star").await, Suggestions::empty());
    }
}
