use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    error::{AppError, AppResult},
    models::{
        lists::{toggle_movie, upsert_rating},
        Movie, MovieStatus, RatedMovie, Rating,
    },
    store::{get_json, set_json, KeyValueStore, StorageKey},
};

/// Liked movies, watchlist and ratings, partitioned by username
///
/// Each list is one JSON array in the store. Reads load it fresh; mutations
/// write it back before returning. Mutations are serialized so concurrent
/// toggles cannot overwrite each other.
pub struct MovieListsService {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl MovieListsService {
    /// Creates the service over the shared store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Loads a list; a missing or unreadable blob is an empty list
    async fn load<T: DeserializeOwned>(&self, key: &StorageKey) -> AppResult<Vec<T>> {
        match get_json::<Vec<T>>(self.store.as_ref(), key).await {
            Ok(list) => Ok(list.unwrap_or_default()),
            Err(AppError::Serialization(e)) => {
                tracing::warn!(error = %e, key = %key, "Unreadable list, starting empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Writes the whole list back under `key`
    async fn save<T: Serialize>(&self, key: &StorageKey, list: &[T]) -> AppResult<()> {
        set_json(self.store.as_ref(), key, list).await
    }

    /// Liked movies of `partition`, in the order they were added
    pub async fn liked(&self, partition: &str) -> AppResult<Vec<Movie>> {
        self.load(&StorageKey::Liked(partition.to_string())).await
    }

    /// Watchlist of `partition`, in the order movies were added
    pub async fn watchlist(&self, partition: &str) -> AppResult<Vec<Movie>> {
        self.load(&StorageKey::Watchlist(partition.to_string()))
            .await
    }

    /// Rated movies of `partition`, unsorted
    pub async fn rated(&self, partition: &str) -> AppResult<Vec<RatedMovie>> {
        self.load(&StorageKey::Rated(partition.to_string())).await
    }

    pub async fn is_liked(&self, partition: &str, movie_id: u64) -> AppResult<bool> {
        Ok(self.liked(partition).await?.iter().any(|m| m.id == movie_id))
    }

    pub async fn is_on_watchlist(&self, partition: &str, movie_id: u64) -> AppResult<bool> {
        Ok(self
            .watchlist(partition)
            .await?
            .iter()
            .any(|m| m.id == movie_id))
    }

    /// Rating given to `movie_id`, if any
    pub async fn get_movie_rating(&self, partition: &str, movie_id: u64) -> AppResult<Option<Rating>> {
        Ok(self
            .rated(partition)
            .await?
            .iter()
            .find(|r| r.movie.id == movie_id)
            .map(|r| r.rating))
    }

    /// Liked, watchlist and rating state of one movie
    ///
    /// Each list is loaded separately; a toggle racing this call may show up
    /// in one field and not yet in another.
    pub async fn status(&self, partition: &str, movie_id: u64) -> AppResult<MovieStatus> {
        Ok(MovieStatus {
            liked: self.is_liked(partition, movie_id).await?,
            on_watchlist: self.is_on_watchlist(partition, movie_id).await?,
            rating: self.get_movie_rating(partition, movie_id).await?,
        })
    }

    /// Titles of liked movies, used to personalise AI recommendations
    pub async fn liked_titles(&self, partition: &str) -> AppResult<Vec<String>> {
        Ok(self
            .liked(partition)
            .await?
            .iter()
            .map(|m| m.display_title().to_string())
            .filter(|t| !t.is_empty())
            .collect())
    }

    /// Returns whether the movie is liked afterwards
    pub async fn toggle_like(&self, partition: &str, movie: Movie) -> AppResult<bool> {
        self.toggle(StorageKey::Liked(partition.to_string()), movie)
            .await
    }

    /// Returns whether the movie is on the watchlist afterwards
    pub async fn toggle_watchlist(&self, partition: &str, movie: Movie) -> AppResult<bool> {
        self.toggle(StorageKey::Watchlist(partition.to_string()), movie)
            .await
    }

    async fn toggle(&self, key: StorageKey, movie: Movie) -> AppResult<bool> {
        // Held across load and save so the read-modify-write is atomic
        let _guard = self.write_lock.lock().await;
        let mut list: Vec<Movie> = self.load(&key).await?;
        let movie_id = movie.id;
        let present = toggle_movie(&mut list, movie);
        self.save(&key, &list).await?;

        tracing::debug!(key = %key, movie_id, present, size = list.len(), "List toggled");
        Ok(present)
    }

    /// Rates a movie, replacing an earlier rating of the same movie
    pub async fn rate_movie(&self, partition: &str, movie: Movie, rating: Rating) -> AppResult<()> {
        let key = StorageKey::Rated(partition.to_string());
        let _guard = self.write_lock.lock().await;
        let mut rated: Vec<RatedMovie> = self.load(&key).await?;
        let movie_id = movie.id;
        upsert_rating(&mut rated, movie, rating);
        self.save(&key, &rated).await?;

        tracing::debug!(key = %key, movie_id, rating = rating.value(), "Movie rated");
        Ok(())
    }
}
