use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::User,
    store::{get_json, set_json, KeyValueStore, StorageKey, GUEST_PARTITION},
};

/// The single active session of this client
///
/// The signed-in user lives in memory and is mirrored to the store so a
/// restart resumes the session.
pub struct SessionService {
    store: Arc<dyn KeyValueStore>,
    current: RwLock<Option<User>>,
}

impl SessionService {
    /// Restores the persisted session
    ///
    /// A stored user that no longer parses is removed and the service starts
    /// signed out.
    pub async fn restore(store: Arc<dyn KeyValueStore>) -> AppResult<Self> {
        let current = match get_json::<User>(store.as_ref(), &StorageKey::User).await {
            Ok(user) => user,
            Err(AppError::Serialization(e)) => {
                tracing::error!(error = %e, "Failed to parse stored user, clearing session");
                store.remove(&StorageKey::User.to_string()).await?;
                None
            }
            Err(e) => return Err(e),
        };

        if let Some(user) = &current {
            tracing::info!(username = %user.username, "Session restored");
        }

        Ok(Self {
            store,
            current: RwLock::new(current),
        })
    }

    /// The signed-in user, `None` for guests
    pub async fn current_user(&self) -> Option<User> {
        self.current.read().await.clone()
    }

    /// Username whose lists are active, or the guest partition
    pub async fn partition(&self) -> String {
        self.current
            .read()
            .await
            .as_ref()
            .map(|u| u.username.clone())
            .unwrap_or_else(|| GUEST_PARTITION.to_string())
    }

    /// The signed-in user, for operations that need one
    pub async fn require_user(&self) -> AppResult<User> {
        self.current_user()
            .await
            .ok_or_else(|| AppError::Unauthorized("Sign in to continue".to_string()))
    }

    /// Signs in; any non-empty username/password pair is accepted
    pub async fn login(&self, username: &str, password: &str) -> AppResult<User> {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Please fill in all fields.".to_string(),
            ));
        }

        check_not_reserved(username)?;

        let user = User::new(username);
        let mut current = self.current.write().await;
        set_json(self.store.as_ref(), &StorageKey::User, &user).await?;
        *current = Some(user.clone());

        tracing::info!(username = %user.username, "User signed in");
        Ok(user)
    }

    /// Signs out and forgets the stored user; lists stay in the store
    pub async fn logout(&self) -> AppResult<()> {
        let mut current = self.current.write().await;
        self.store.remove(&StorageKey::User.to_string()).await?;
        if let Some(user) = current.take() {
            tracing::info!(username = %user.username, "User signed out");
        }
        Ok(())
    }

    /// Renames the signed-in user
    ///
    /// Lists stay under the old name; the new name sees its own partition.
    pub async fn update_user(&self, new_username: &str) -> AppResult<User> {
        let new_username = new_username.trim();
        if new_username.is_empty() {
            return Err(AppError::InvalidInput(
                "Username cannot be empty".to_string(),
            ));
        }
        check_not_reserved(new_username)?;

        let mut current = self.current.write().await;
        let existing = current
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("Sign in to continue".to_string()))?;

        let updated = User {
            username: new_username.to_string(),
            ..existing.clone()
        };
        set_json(self.store.as_ref(), &StorageKey::User, &updated).await?;

        tracing::info!(
            from = %existing.username,
            to = %updated.username,
            "User renamed"
        );
        *current = Some(updated.clone());
        Ok(updated)
    }
}

/// `guest` names the signed-out partition and cannot be a username
fn check_not_reserved(username: &str) -> AppResult<()> {
    if username.eq_ignore_ascii_case(GUEST_PARTITION) {
        return Err(AppError::InvalidInput(format!(
            "The username \"{}\" is reserved",
            username
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    async fn fresh() -> (Arc<MemoryStore>, SessionService) {
        let store = Arc::new(MemoryStore::new());
        let session = SessionService::restore(store.clone()).await.unwrap();
        (store, session)
    }

    #[tokio::test]
    async fn test_starts_as_guest() {
        let (_, session) = fresh().await;
        assert_eq!(session.current_user().await, None);
        assert_eq!(session.partition().await, "guest");
        assert!(matches!(
            session.require_user().await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_login_persists_and_trims() {
        let (store, session) = fresh().await;
        let user = session.login("  neo ", "redpill").await.unwrap();

        assert_eq!(user.username, "neo");
        assert_eq!(session.partition().await, "neo");
        assert_eq!(
            store.get("cinesuggest_user").await.unwrap(),
            Some(r#"{"username":"neo"}"#.to_string())
        );
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let (_, session) = fresh().await;
        assert!(matches!(
            session.login("neo", "").await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            session.login(" ", "pw").await,
            Err(AppError::InvalidInput(_))
        ));
        assert_eq!(session.current_user().await, None);
    }

    #[tokio::test]
    async fn test_guest_username_is_reserved() {
        let (store, session) = fresh().await;
        assert!(matches!(
            session.login("guest", "pw").await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            session.login(" Guest ", "pw").await,
            Err(AppError::InvalidInput(_))
        ));
        assert_eq!(session.current_user().await, None);
        assert_eq!(store.get("cinesuggest_user").await.unwrap(), None);

        session.login("neo", "pw").await.unwrap();
        assert!(matches!(
            session.update_user("guest").await,
            Err(AppError::InvalidInput(_))
        ));
        assert_eq!(session.partition().await, "neo");
    }

    #[tokio::test]
    async fn test_logout_clears_store() {
        let (store, session) = fresh().await;
        session.login("neo", "pw").await.unwrap();
        session.logout().await.unwrap();

        assert_eq!(session.current_user().await, None);
        assert_eq!(store.get("cinesuggest_user").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_resumes_session() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                "cinesuggest_user",
                r#"{"username":"trinity","profilePicture":"/t.png"}"#,
            )
            .await
            .unwrap();

        let session = SessionService::restore(store).await.unwrap();
        let user = session.current_user().await.unwrap();
        assert_eq!(user.username, "trinity");
        assert_eq!(user.profile_picture.as_deref(), Some("/t.png"));
    }

    #[tokio::test]
    async fn test_restore_clears_corrupt_user() {
        let store = Arc::new(MemoryStore::new());
        store.set("cinesuggest_user", "not-json").await.unwrap();

        let session = SessionService::restore(store.clone()).await.unwrap();
        assert_eq!(session.current_user().await, None);
        assert_eq!(store.get("cinesuggest_user").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_user_keeps_profile_picture() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                "cinesuggest_user",
                r#"{"username":"trinity","profilePicture":"/t.png"}"#,
            )
            .await
            .unwrap();
        let session = SessionService::restore(store.clone()).await.unwrap();

        let updated = session.update_user(" morpheus ").await.unwrap();
        assert_eq!(updated.username, "morpheus");
        assert_eq!(updated.profile_picture.as_deref(), Some("/t.png"));
        assert_eq!(session.partition().await, "morpheus");
    }

    #[tokio::test]
    async fn test_update_user_requires_session() {
        let (_, session) = fresh().await;
        assert!(matches!(
            session.update_user("morpheus").await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
