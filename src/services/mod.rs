pub mod browse;
pub mod genres;
pub mod lists;
pub mod modal;
pub mod notifications;
pub mod providers;
pub mod recommendations;
pub mod session;
pub mod suggestions;

pub use genres::GenreDirectory;
pub use lists::MovieListsService;
pub use modal::ModalState;
pub use notifications::NotificationCenter;
pub use session::SessionService;
pub use suggestions::SuggestionService;
