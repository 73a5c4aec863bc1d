use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::{AppError, AppResult};

use super::Movie;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;

/// A user rating between 1 and 10
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: i64) -> AppResult<Self> {
        if (i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(AppError::InvalidInput(format!(
                "Rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, value
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A movie together with the rating the user gave it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatedMovie {
    pub movie: Movie,
    pub rating: Rating,
}

/// The active user's relationship to one movie
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieStatus {
    pub liked: bool,
    pub on_watchlist: bool,
    pub rating: Option<Rating>,
}

/// Removes `movie` when present, appends it otherwise
///
/// Returns whether the movie is in the list afterwards.
pub fn toggle_movie(list: &mut Vec<Movie>, movie: Movie) -> bool {
    if let Some(pos) = list.iter().position(|m| m.id == movie.id) {
        list.remove(pos);
        false
    } else {
        list.push(movie);
        true
    }
}

/// Replaces the rating of an already rated movie in place, appends otherwise
pub fn upsert_rating(list: &mut Vec<RatedMovie>, movie: Movie, rating: Rating) {
    match list.iter_mut().find(|r| r.movie.id == movie.id) {
        Some(existing) => existing.rating = rating,
        None => list.push(RatedMovie { movie, rating }),
    }
}

/// Rated movies ordered highest rating first, ties keep their stored order
pub fn by_rating_desc(mut rated: Vec<RatedMovie>) -> Vec<RatedMovie> {
    rated.sort_by(|a, b| b.rating.cmp(&a.rating));
    rated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u64, title: &str) -> Movie {
        serde_json::from_value(serde_json::json!({ "id": id, "title": title })).unwrap()
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(11).is_err());
        assert!(Rating::new(-3).is_err());
        assert_eq!(Rating::new(1).unwrap().value(), 1);
        assert_eq!(Rating::new(10).unwrap().value(), 10);
    }

    #[test]
    fn test_rating_deserialization_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rating>("7").is_ok());
        assert!(serde_json::from_str::<Rating>("12").is_err());
    }

    #[test]
    fn test_toggle_twice_restores_list() {
        let original = vec![movie(1, "Alien"), movie(2, "Aliens")];
        let mut list = original.clone();

        assert!(toggle_movie(&mut list, movie(3, "Alien 3")));
        assert_eq!(list.len(), 3);
        assert!(!toggle_movie(&mut list, movie(3, "Alien 3")));
        assert_eq!(list, original);
    }

    #[test]
    fn test_toggle_removes_existing_entry() {
        let mut list = vec![movie(1, "Alien"), movie(2, "Aliens"), movie(3, "Alien 3")];
        assert!(!toggle_movie(&mut list, movie(2, "Aliens")));
        let ids: Vec<u64> = list.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_upsert_rating_replaces_in_place() {
        let mut rated = Vec::new();
        upsert_rating(&mut rated, movie(1, "Alien"), Rating::new(6).unwrap());
        upsert_rating(&mut rated, movie(2, "Aliens"), Rating::new(9).unwrap());
        upsert_rating(&mut rated, movie(1, "Alien"), Rating::new(8).unwrap());

        assert_eq!(rated.len(), 2);
        assert_eq!(rated[0].movie.id, 1);
        assert_eq!(rated[0].rating.value(), 8);
        assert_eq!(rated[1].rating.value(), 9);
    }

    #[test]
    fn test_by_rating_desc() {
        let rated = vec![
            RatedMovie {
                movie: movie(1, "Alien"),
                rating: Rating::new(6).unwrap(),
            },
            RatedMovie {
                movie: movie(2, "Aliens"),
                rating: Rating::new(9).unwrap(),
            },
            RatedMovie {
                movie: movie(3, "Alien 3"),
                rating: Rating::new(6).unwrap(),
            },
        ];
        let ids: Vec<u64> = by_rating_desc(rated).iter().map(|r| r.movie.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
