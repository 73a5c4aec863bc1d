use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{models::Genre, services::providers::MovieCatalog};

/// Genre id to name lookup backed by the catalog's genre list
///
/// The list is loaded on first use. A failed load is logged and reads as an
/// empty list; the next call tries again.
pub struct GenreDirectory {
    catalog: Arc<dyn MovieCatalog>,
    genres: RwLock<Option<Vec<Genre>>>,
}

impl GenreDirectory {
    /// Creates an empty directory; nothing is fetched until first use
    pub fn new(catalog: Arc<dyn MovieCatalog>) -> Self {
        Self {
            catalog,
            genres: RwLock::new(None),
        }
    }

    /// All genres, loading them on first call
    ///
    /// Returns an empty list while the catalog is unreachable.
    pub async fn genres(&self) -> Vec<Genre> {
        if let Some(genres) = self.genres.read().await.as_ref() {
            return genres.clone();
        }

        let mut slot = self.genres.write().await;
        // Another request may have loaded it while we waited for the lock
        if let Some(genres) = slot.as_ref() {
            return genres.clone();
        }

        match self.catalog.genres().await {
            Ok(genres) => {
                tracing::info!(
                    genres = genres.len(),
                    provider = self.catalog.name(),
                    "Genre directory loaded"
                );
                *slot = Some(genres.clone());
                genres
            }
            Err(e) => {
                // Slot stays empty so the next caller retries
                tracing::error!(error = %e, "Failed to fetch genres");
                Vec::new()
            }
        }
    }

    /// Names for `genre_ids`, in order, skipping unknown ids
    pub async fn genre_names(&self, genre_ids: &[u64]) -> Vec<String> {
        if genre_ids.is_empty() {
            return Vec::new();
        }
        names_for(&self.genres().await, genre_ids)
    }
}

fn names_for(genres: &[Genre], genre_ids: &[u64]) -> Vec<String> {
    genre_ids
        .iter()
        .filter_map(|id| genres.iter().find(|g| g.id == *id))
        .map(|g| g.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::providers::MockMovieCatalog;

    fn genre_fixture() -> Vec<Genre> {
        vec![
            Genre {
                id: 28,
                name: "Action".to_string(),
            },
            Genre {
                id: 35,
                name: "Comedy".to_string(),
            },
            Genre {
                id: 878,
                name: "Science Fiction".to_string(),
            },
        ]
    }

    #[test]
    fn test_names_for_keeps_order_and_skips_unknown() {
        let names = names_for(&genre_fixture(), &[878, 1, 28]);
        assert_eq!(names, vec!["Science Fiction", "Action"]);
    }

    #[tokio::test]
    async fn test_genres_loaded_once() {
        let mut catalog = MockMovieCatalog::new();
        catalog
            .expect_genres()
            .times(1)
            .returning(|| Ok(genre_fixture()));
        catalog.expect_name().return_const("mock");

        let directory = GenreDirectory::new(Arc::new(catalog));
        assert_eq!(directory.genre_names(&[35]).await, vec!["Comedy"]);
        assert_eq!(directory.genre_names(&[28, 35]).await, vec!["Action", "Comedy"]);
        assert_eq!(directory.genres().await.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_load_is_empty_and_retried() {
        let mut catalog = MockMovieCatalog::new();
        let mut seq = mockall::Sequence::new();
        catalog
            .expect_genres()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(AppError::ExternalApi("down".to_string())));
        catalog
            .expect_genres()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(genre_fixture()));
        catalog.expect_name().return_const("mock");

        let directory = GenreDirectory::new(Arc::new(catalog));
        assert!(directory.genre_names(&[28]).await.is_empty());
        assert_eq!(directory.genre_names(&[28]).await, vec!["Action"]);
    }

    #[tokio::test]
    async fn test_empty_ids_skip_loading() {
        let catalog = MockMovieCatalog::new();
        let directory = GenreDirectory::new(Arc::new(catalog));
        assert!(directory.genre_names(&[]).await.is_empty());
    }
}
