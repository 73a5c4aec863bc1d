use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::Movie;

/// Sort orders offered for movie grids
///
/// The serialized names double as TMDB `sort_by` values.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortOption {
    #[default]
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
    #[serde(rename = "release_date.desc")]
    ReleaseDateDesc,
    #[serde(rename = "release_date.asc")]
    ReleaseDateAsc,
    #[serde(rename = "vote_average.desc")]
    VoteAverageDesc,
}

impl SortOption {
    pub fn as_tmdb_param(&self) -> &'static str {
        match self {
            SortOption::PopularityDesc => "popularity.desc",
            SortOption::ReleaseDateDesc => "release_date.desc",
            SortOption::ReleaseDateAsc => "release_date.asc",
            SortOption::VoteAverageDesc => "vote_average.desc",
        }
    }
}

/// Sorts movies locally
///
/// `ReleaseDateDesc` drops movies without a date or released after `today`;
/// `ReleaseDateAsc` puts undated movies first. The sort is stable.
pub fn sort_movies(movies: Vec<Movie>, option: SortOption, today: NaiveDate) -> Vec<Movie> {
    let mut sorted = movies;
    match option {
        SortOption::PopularityDesc => sorted.sort_by(|a, b| {
            desc_f64(a.popularity.unwrap_or(0.0), b.popularity.unwrap_or(0.0))
        }),
        SortOption::VoteAverageDesc => {
            sorted.sort_by(|a, b| desc_f64(a.vote_average, b.vote_average))
        }
        SortOption::ReleaseDateDesc => {
            sorted.retain(|m| m.release_day().is_some_and(|day| day <= today));
            sorted.sort_by(|a, b| b.release_day().cmp(&a.release_day()));
        }
        // None sorts before Some, matching a zero timestamp for undated movies
        SortOption::ReleaseDateAsc => sorted.sort_by_key(|m| m.release_day()),
    }
    sorted
}

fn desc_f64(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
