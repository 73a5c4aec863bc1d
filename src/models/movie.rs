use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A TMDB genre
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Response of `genre/movie/list`
#[derive(Debug, Clone, Deserialize)]
pub struct GenreList {
    pub genres: Vec<Genre>,
}

/// Movie snapshot as returned by TMDB list endpoints
///
/// Field names follow TMDB so stored lists stay readable by the web client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    /// TV entries carry `name` instead of `title`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<Genre>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre_ids: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
}

impl Movie {
    /// `title`, or `name` for entries that only have one
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            self.name.as_deref().unwrap_or_default()
        } else {
            &self.title
        }
    }

    /// Release date, when present and well formed
    pub fn release_day(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.release_date, "%Y-%m-%d").ok()
    }

    pub fn has_genre(&self, genre_id: u64) -> bool {
        let in_ids = self
            .genre_ids
            .as_ref()
            .is_some_and(|ids| ids.contains(&genre_id));
        let in_genres = self
            .genres
            .as_ref()
            .is_some_and(|genres| genres.iter().any(|g| g.id == genre_id));
        in_ids || in_genres
    }

    /// Genre ids from either the list (`genre_ids`) or detail (`genres`) shape
    pub fn genre_id_list(&self) -> Vec<u64> {
        match (&self.genre_ids, &self.genres) {
            (Some(ids), _) => ids.clone(),
            (None, Some(genres)) => genres.iter().map(|g| g.id).collect(),
            (None, None) => Vec::new(),
        }
    }
}

/// Page of results from a TMDB list endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginatedResponse<T> {
    pub page: u32,
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VideoResults {
    #[serde(default)]
    pub results: Vec<Video>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchProvider {
    #[serde(default)]
    pub logo_path: Option<String>,
    pub provider_id: u64,
    pub provider_name: String,
    #[serde(default)]
    pub display_priority: i32,
}

/// Where a movie can be watched in one country
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WatchProviderCountryDetails {
    #[serde(default)]
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flatrate: Option<Vec<WatchProvider>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent: Option<Vec<WatchProvider>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy: Option<Vec<WatchProvider>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WatchProviderResults {
    /// Keyed by ISO 3166-1 country code
    #[serde(default)]
    pub results: HashMap<String, WatchProviderCountryDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

/// `movie/{id}` with `videos,watch/providers,credits` appended
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(default)]
    pub videos: VideoResults,
    #[serde(
        rename = "watch/providers",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub watch_providers: Option<WatchProviderResults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<Credits>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonDetails {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub biography: String,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub deathday: Option<String>,
    #[serde(default)]
    pub place_of_birth: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub also_known_as: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersonMovieCredits {
    #[serde(default)]
    pub cast: Vec<Movie>,
    #[serde(default)]
    pub crew: Vec<Movie>,
}

/// Window of the trending endpoint
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    #[default]
    Day,
    Week,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}
