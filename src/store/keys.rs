use std::fmt::Display;

/// Partition used when nobody is signed in
pub const GUEST_PARTITION: &str = "guest";

const KEY_PREFIX: &str = "cinesuggest";

/// Keys of everything persisted in the key-value store
///
/// The layout matches what the web client kept in local storage, so blobs
/// exported from a browser can be loaded as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// The signed-in user
    User,
    /// Liked movies of a partition
    Liked(String),
    /// Watchlist of a partition
    Watchlist(String),
    /// Rated movies of a partition
    Rated(String),
    Cache(CacheKey),
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKey::User => write!(f, "{}_user", KEY_PREFIX),
            StorageKey::Liked(partition) => write!(f, "{}_liked_{}", KEY_PREFIX, partition),
            StorageKey::Watchlist(partition) => {
                write!(f, "{}_watchlist_{}", KEY_PREFIX, partition)
            }
            StorageKey::Rated(partition) => write!(f, "{}_rated_{}", KEY_PREFIX, partition),
            StorageKey::Cache(key) => write!(f, "{}_cache:{}", KEY_PREFIX, key),
        }
    }
}

/// Keys of cached TMDB responses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    GenreList(String),
    MovieDetails { id: u64, language: String },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::GenreList(language) => write!(f, "genres:{}", language.to_lowercase()),
            CacheKey::MovieDetails { id, language } => {
                write!(f, "movie:{}:{}", id, language.to_lowercase())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_key() {
        assert_eq!(StorageKey::User.to_string(), "cinesuggest_user");
    }

    #[test]
    fn test_partition_keys() {
        assert_eq!(
            StorageKey::Liked("neo".into()).to_string(),
            "cinesuggest_liked_neo"
        );
        assert_eq!(
            StorageKey::Watchlist(GUEST_PARTITION.into()).to_string(),
            "cinesuggest_watchlist_guest"
        );
        assert_eq!(
            StorageKey::Rated("trinity".into()).to_string(),
            "cinesuggest_rated_trinity"
        );
    }

    #[test]
    fn test_cache_keys_lowercase_language() {
        let key = StorageKey::Cache(CacheKey::GenreList("en-US".into()));
        assert_eq!(key.to_string(), "cinesuggest_cache:genres:en-us");

        let key = StorageKey::Cache(CacheKey::MovieDetails {
            id: 27205,
            language: "en-US".into(),
        });
        assert_eq!(key.to_string(), "cinesuggest_cache:movie:27205:en-us");
    }
}
