pub mod lists;
pub mod movie;
pub mod notification;
pub mod recommendation;
pub mod sort;
pub mod user;

pub use lists::{MovieStatus, RatedMovie, Rating};
pub use movie::{
    CastMember, Credits, CrewMember, Genre, GenreList, Movie, MovieDetails, PaginatedResponse,
    PersonDetails, PersonMovieCredits, TimeWindow, Video, VideoResults, WatchProvider,
    WatchProviderCountryDetails, WatchProviderResults,
};
pub use notification::{Notification, NotificationKind};
pub use recommendation::AiRecommendation;
pub use sort::SortOption;
pub use user::User;
