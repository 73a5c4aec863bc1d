use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    error::AppResult,
    services::{
        providers::{MovieCatalog, Recommender},
        GenreDirectory, ModalState, MovieListsService, NotificationCenter, SessionService,
        SuggestionService,
    },
    store::KeyValueStore,
};

/// Timings of the ephemeral state containers
#[derive(Debug, Clone, Copy)]
pub struct StateTimings {
    pub notification_ttl: Duration,
    pub modal_clear_delay: Duration,
    pub suggestion_debounce: Duration,
}

impl Default for StateTimings {
    fn default() -> Self {
        Self {
            notification_ttl: Duration::from_millis(3000),
            modal_clear_delay: Duration::from_millis(300),
            suggestion_debounce: Duration::from_millis(300),
        }
    }
}

impl From<&Config> for StateTimings {
    fn from(config: &Config) -> Self {
        Self {
            notification_ttl: Duration::from_millis(config.notification_ttl_ms),
            modal_clear_delay: Duration::from_millis(config.modal_clear_delay_ms),
            suggestion_debounce: Duration::from_millis(config.suggestion_debounce_ms),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub catalog: Arc<dyn MovieCatalog>,
    pub recommender: Arc<dyn Recommender>,
    pub session: SessionService,
    pub lists: MovieListsService,
    pub notifications: NotificationCenter,
    pub modal: ModalState,
    pub genres: GenreDirectory,
    pub suggestions: SuggestionService,
}

impl AppState {
    /// Wires the state containers and restores the persisted session
    pub async fn new(
        store: Arc<dyn KeyValueStore>,
        catalog: Arc<dyn MovieCatalog>,
        recommender: Arc<dyn Recommender>,
        timings: StateTimings,
    ) -> AppResult<Self> {
        tracing::info!(
            store = store.name(),
            catalog = catalog.name(),
            recommender = recommender.name(),
            "Initializing application state"
        );

        Ok(Self {
            session: SessionService::restore(store.clone()).await?,
            lists: MovieListsService::new(store),
            notifications: NotificationCenter::new(timings.notification_ttl),
            modal: ModalState::new(timings.modal_clear_delay),
            genres: GenreDirectory::new(catalog.clone()),
            suggestions: SuggestionService::new(catalog.clone(), timings.suggestion_debounce),
            catalog,
            recommender,
        })
    }
}
