//! Page-level compositions over the catalog
//!
//! Each function gathers what one screen of the frontend shows, fetching
//! independent catalog data concurrently.
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        sort::sort_movies, CastMember, CrewMember, Movie, MovieDetails, MovieStatus,
        PaginatedResponse, PersonDetails, PersonMovieCredits, SortOption, TimeWindow,
        WatchProvider, WatchProviderCountryDetails,
    },
    services::{
        genres::GenreDirectory,
        providers::{MovieCatalog, QueryParams},
    },
};

/// Region whose theaters and productions are featured next to global results
pub const FEATURED_REGION: &str = "IN";
/// Watch-provider regions, in order of preference
pub const PROVIDER_REGIONS: [&str; 2] = ["IN", "US"];
/// Country whose certifications the home filter uses
pub const CERTIFICATION_COUNTRY: &str = "US";

pub const HERO_SIZE: usize = 6;
pub const SIMILAR_LIMIT: usize = 5;
pub const CAST_LIMIT: usize = 16;
pub const KEY_CREW_LIMIT: usize = 10;
pub const FEATURED_PROVIDER_LIMIT: usize = 3;
pub const KEY_CREW_JOBS: [&str; 6] = [
    "Director",
    "Screenplay",
    "Writer",
    "Producer",
    "Director of Photography",
    "Original Music Composer",
];

/// Filters of the home screen
///
/// Select boxes left on "all" arrive as empty values (`genre=&year=`) and
/// mean no filter.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct HomeFilters {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub genre: Option<u64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub year: Option<i32>,
    /// US certification upper bound, e.g. `PG-13`
    pub certification: Option<String>,
    #[serde(default)]
    pub sort: SortOption,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HomeFeed {
    /// Banner movies, the head of `movies`
    pub hero: Vec<Movie>,
    pub movies: Vec<Movie>,
    pub now_playing: Vec<Movie>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Trailer {
    pub key: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MovieDetailView {
    pub movie: MovieDetails,
    pub genre_names: Vec<String>,
    pub trailer: Option<Trailer>,
    pub provider_region: Option<String>,
    pub providers: Option<WatchProviderCountryDetails>,
    pub featured_providers: Vec<WatchProvider>,
    pub cast: Vec<CastMember>,
    pub key_crew: Vec<CrewMember>,
    pub similar: Vec<Movie>,
    pub status: MovieStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PersonView {
    pub person: PersonDetails,
    pub credits: PersonMovieCredits,
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn param(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}

/// Discover parameters for the global and the featured-region queries
pub fn discover_params(filters: &HomeFilters, today: NaiveDate) -> (QueryParams, QueryParams) {
    let mut base = vec![param("sort_by", filters.sort.as_tmdb_param())];
    if let Some(genre) = filters.genre {
        base.push(param("with_genres", genre));
    }
    if let Some(year) = filters.year {
        base.push(param("primary_release_year", year));
    }
    if filters.sort == SortOption::ReleaseDateDesc {
        // Newest first must not surface unreleased movies
        base.push(param("primary_release_date.lte", today.format("%Y-%m-%d")));
    }

    let mut regional = base.clone();
    regional.push(param("with_origin_country", FEATURED_REGION));

    let mut global = base;
    if let Some(certification) = filters
        .certification
        .as_deref()
        .filter(|c| !c.trim().is_empty())
    {
        global.push(param("certification_country", CERTIFICATION_COUNTRY));
        global.push(param("certification.lte", certification));
    }

    (global, regional)
}

/// Removes repeated ids; an entry keeps its first position and its last value
pub fn dedupe_by_id(movies: Vec<Movie>) -> Vec<Movie> {
    let mut positions: HashMap<u64, usize> = HashMap::new();
    let mut unique: Vec<Movie> = Vec::with_capacity(movies.len());
    for movie in movies {
        match positions.get(&movie.id) {
            Some(&pos) => unique[pos] = movie,
            None => {
                positions.insert(movie.id, unique.len());
                unique.push(movie);
            }
        }
    }
    unique
}

/// Random order for mixed feeds
pub fn shuffle(mut movies: Vec<Movie>) -> Vec<Movie> {
    movies.sort_by_cached_key(|_| Uuid::new_v4());
    movies
}

pub async fn home_feed(
    catalog: &dyn MovieCatalog,
    filters: &HomeFilters,
    today: NaiveDate,
) -> AppResult<HomeFeed> {
    let (global_params, regional_params) = discover_params(filters, today);

    let (global, regional, now_playing) = tokio::try_join!(
        catalog.discover(global_params),
        catalog.discover(regional_params),
        catalog.now_playing(vec![param("region", FEATURED_REGION)]),
    )?;

    let combined: Vec<Movie> = global
        .results
        .into_iter()
        .chain(regional.results)
        .collect();
    let mut movies = dedupe_by_id(combined);
    // Mix the regions for popularity; any other sort keeps TMDB's order
    if filters.sort == SortOption::PopularityDesc {
        movies = shuffle(movies);
    }

    let now_playing: Vec<Movie> = now_playing
        .results
        .into_iter()
        .filter(|m| filters.genre.map_or(true, |g| m.has_genre(g)))
        .filter(|m| {
            filters
                .year
                .map_or(true, |y| m.release_date.starts_with(&y.to_string()))
        })
        .collect();

    tracing::info!(
        movies = movies.len(),
        now_playing = now_playing.len(),
        sort = filters.sort.as_tmdb_param(),
        "Home feed assembled"
    );

    Ok(HomeFeed {
        hero: movies.iter().take(HERO_SIZE).cloned().collect(),
        movies,
        now_playing,
    })
}

/// Global trending mixed with what plays in the featured region
pub async fn trending_feed(catalog: &dyn MovieCatalog, window: TimeWindow) -> AppResult<Vec<Movie>> {
    let (trending, now_playing) = tokio::try_join!(
        catalog.trending(window),
        catalog.now_playing(vec![param("region", FEATURED_REGION)]),
    )?;

    let combined = trending
        .results
        .into_iter()
        .chain(now_playing.results)
        .collect();
    Ok(shuffle(dedupe_by_id(combined)))
}

pub fn find_trailer(details: &MovieDetails) -> Option<Trailer> {
    details
        .videos
        .results
        .iter()
        .find(|v| v.video_type == "Trailer" && v.site == "YouTube")
        .map(|v| Trailer {
            key: v.key.clone(),
            url: format!("https://www.youtube.com/embed/{}?autoplay=1&rel=0", v.key),
        })
}

/// Providers of the first preferred region TMDB has data for
pub fn regional_providers(details: &MovieDetails) -> Option<(String, WatchProviderCountryDetails)> {
    let results = &details.watch_providers.as_ref()?.results;
    PROVIDER_REGIONS
        .iter()
        .find_map(|region| results.get(*region).map(|p| (region.to_string(), p.clone())))
}

/// Streaming, then rent, then buy providers, unique by id, at most three
pub fn featured_providers(providers: &WatchProviderCountryDetails) -> Vec<WatchProvider> {
    let mut featured: Vec<WatchProvider> = Vec::new();
    let all = [&providers.flatrate, &providers.rent, &providers.buy]
        .into_iter()
        .flatten()
        .flatten();
    for provider in all {
        if featured.len() == FEATURED_PROVIDER_LIMIT {
            break;
        }
        if !featured.iter().any(|p| p.provider_id == provider.provider_id) {
            featured.push(provider.clone());
        }
    }
    featured
}

/// Crew in notable jobs, unique by (person, job)
pub fn key_crew(crew: &[CrewMember]) -> Vec<CrewMember> {
    let mut selected: Vec<CrewMember> = Vec::new();
    for member in crew
        .iter()
        .filter(|m| KEY_CREW_JOBS.contains(&m.job.as_str()))
    {
        if !selected
            .iter()
            .any(|s| s.id == member.id && s.job == member.job)
        {
            selected.push(member.clone());
        }
        if selected.len() == KEY_CREW_LIMIT {
            break;
        }
    }
    selected
}

pub async fn movie_detail_view(
    catalog: &dyn MovieCatalog,
    genres: &GenreDirectory,
    movie_id: u64,
    status: MovieStatus,
) -> AppResult<MovieDetailView> {
    let (details, similar) =
        tokio::try_join!(catalog.movie_details(movie_id), catalog.similar(movie_id))?;

    let genre_names = genres.genre_names(&details.movie.genre_id_list()).await;
    let regional = regional_providers(&details);
    let featured = regional
        .as_ref()
        .map(|(_, p)| featured_providers(p))
        .unwrap_or_default();
    let credits = details.credits.clone().unwrap_or_default();

    Ok(MovieDetailView {
        genre_names,
        trailer: find_trailer(&details),
        provider_region: regional.as_ref().map(|(r, _)| r.clone()),
        providers: regional.map(|(_, p)| p),
        featured_providers: featured,
        cast: credits.cast.into_iter().take(CAST_LIMIT).collect(),
        key_crew: key_crew(&credits.crew),
        similar: similar.results.into_iter().take(SIMILAR_LIMIT).collect(),
        status,
        movie: details,
    })
}

/// Search results sorted locally; TMDB search has no sort parameter
pub async fn search_results(
    catalog: &dyn MovieCatalog,
    query: &str,
    page: u32,
    sort: SortOption,
    today: NaiveDate,
) -> AppResult<PaginatedResponse<Movie>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }

    let mut response = catalog.search(query, page).await?;
    response.results = sort_movies(response.results, sort, today);
    Ok(response)
}

pub async fn person_view(catalog: &dyn MovieCatalog, person_id: u64) -> AppResult<PersonView> {
    let (person, credits) = tokio::try_join!(
        catalog.person_details(person_id),
        catalog.person_movie_credits(person_id)
    )?;
    Ok(PersonView { person, credits })
}
