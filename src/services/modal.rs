use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// What the movie modal currently shows
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ModalSnapshot {
    pub is_open: bool,
    pub selected_movie_id: Option<u64>,
}

#[derive(Default)]
struct ModalInner {
    snapshot: ModalSnapshot,
    /// Bumped by every open so a pending clear can tell it is stale
    generation: u64,
}

/// Selection state of the movie quick-view modal
///
/// Closing keeps the selected movie for a short delay so the frontend can
/// animate the modal out with its content.
#[derive(Clone)]
pub struct ModalState {
    inner: Arc<Mutex<ModalInner>>,
    clear_delay: Duration,
}

impl ModalState {
    /// Creates a closed modal; `clear_delay` is how long a closed modal keeps its movie
    pub fn new(clear_delay: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ModalInner::default())),
            clear_delay,
        }
    }

    /// Opens the modal on `movie_id`
    ///
    /// Any clear still pending from an earlier close becomes stale.
    pub async fn open(&self, movie_id: u64) -> ModalSnapshot {
        let mut inner = self.inner.lock().await;
        inner.generation += 1;
        inner.snapshot = ModalSnapshot {
            is_open: true,
            selected_movie_id: Some(movie_id),
        };
        inner.snapshot
    }

    /// Closes the modal now and forgets the movie after the clear delay
    pub async fn close(&self) -> ModalSnapshot {
        let mut inner = self.inner.lock().await;
        inner.snapshot.is_open = false;
        let generation = inner.generation;
        let snapshot = inner.snapshot;
        // Release before spawning so the clear task can take the lock
        drop(inner);

        let state = self.inner.clone();
        let delay = self.clear_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut inner = state.lock().await;
            // Reopened meanwhile; the new selection stays
            if inner.generation == generation {
                inner.snapshot.selected_movie_id = None;
            }
        });

        snapshot
    }

    /// Current state without changing it
    pub async fn snapshot(&self) -> ModalSnapshot {
        self.inner.lock().await.snapshot
    }
}
