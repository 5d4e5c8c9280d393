//! Sign-in and session hooks.
//!
//! The runtime calls a [`SignInHook`] once the provider has asserted an
//! identity, and a [`SessionHook`] every time a token is turned into a
//! session. The default implementations keep the user directory in sync.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::types::{Claims, Identity, Session};
use crate::directory::UserDirectory;
use crate::error::AuthError;

/// Decides whether an asserted identity may sign in.
#[async_trait]
pub trait SignInHook: Send + Sync {
    async fn sign_in(&self, identity: &Identity) -> bool;
}

/// Shapes the session exposed for a decoded token.
#[async_trait]
pub trait SessionHook: Send + Sync {
    async fn session(&self, session: Session, claims: &Claims) -> Session;
}

/// Admits identities, registering unknown ones in the directory first.
///
/// The lookup and the creation are two separate directory calls. Two
/// concurrent first sign-ins for the same email can both miss the lookup and
/// both try to create; uniqueness is left to the directory.
pub struct SignInGate {
    directory: Arc<dyn UserDirectory>,
}

impl SignInGate {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    async fn ensure_user(&self, email: &str, identity: &Identity) -> Result<(), AuthError> {
        let existing = self
            .directory
            .get_user(email)
            .await
            .map_err(|source| AuthError::DirectoryLookup {
                email: email.to_string(),
                source,
            })?;

        if existing.is_none() {
            tracing::info!("Registering new user: {}", email);
            self.directory
                .create_user(
                    identity.name.as_deref().unwrap_or_default(),
                    email,
                    identity.image.as_deref().unwrap_or_default(),
                )
                .await
                .map_err(|source| AuthError::DirectoryCreate {
                    email: email.to_string(),
                    source,
                })?;
        }

        Ok(())
    }
}

#[async_trait]
impl SignInHook for SignInGate {
    async fn sign_in(&self, identity: &Identity) -> bool {
        let Some(email) = identity.email.as_deref().filter(|e| !e.is_empty()) else {
            tracing::error!("Error during sign-in: identity has no email");
            return false;
        };

        match self.ensure_user(email, identity).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error during sign-in: {}", e);
                false
            }
        }
    }
}

/// Merges the directory's view of the user into the session.
pub struct SessionReconciler {
    directory: Arc<dyn UserDirectory>,
}

impl SessionReconciler {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl SessionHook for SessionReconciler {
    async fn session(&self, session: Session, claims: &Claims) -> Session {
        // Reported only; rejecting expired tokens is the codec's job.
        if claims.is_expired_at(Utc::now()) {
            tracing::error!("Token expired, redirecting to login");
        }

        let Some(email) = session.user.email().map(str::to_owned) else {
            tracing::warn!("Session has no email, skipping directory lookup");
            return session;
        };

        let profile = match self.directory.get_user(&email).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                tracing::debug!("No directory user for {}", email);
                return session;
            }
            Err(source) => {
                let e = AuthError::DirectoryLookup { email, source };
                tracing::error!("Error retrieving user data: {}", e);
                return session;
            }
        };

        let mut enriched = session.clone();
        if let Err(e) = enriched.user.merge_profile(&profile) {
            tracing::error!("Error merging user data for {}: {}", email, e);
            return session;
        }
        enriched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{DirectoryError, InMemoryDirectory};
    use serde_json::{json, Map};
    use shared_types::{SessionUser, UserProfile};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Wraps an in-memory directory and counts create calls.
    #[derive(Default)]
    struct RecordingDirectory {
        inner: InMemoryDirectory,
        creates: AtomicUsize,
    }

    #[async_trait]
    impl UserDirectory for RecordingDirectory {
        async fn get_user(&self, email: &str) -> Result<Option<UserProfile>, DirectoryError> {
            self.inner.get_user(email).await
        }

        async fn create_user(
            &self,
            name: &str,
            email: &str,
            image: &str,
        ) -> Result<(), DirectoryError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            self.inner.create_user(name, email, image).await
        }
    }

    /// Directory whose lookups or creations always fail.
    struct FailingDirectory {
        fail_lookup: bool,
    }

    #[async_trait]
    impl UserDirectory for FailingDirectory {
        async fn get_user(&self, _email: &str) -> Result<Option<UserProfile>, DirectoryError> {
            if self.fail_lookup {
                Err(DirectoryError::InvalidResponse("lookup down".to_string()))
            } else {
                Ok(None)
            }
        }

        async fn create_user(
            &self,
            _name: &str,
            _email: &str,
            _image: &str,
        ) -> Result<(), DirectoryError> {
            Err(DirectoryError::GraphQl(vec!["create refused".to_string()]))
        }
    }

    fn identity(email: &str) -> Identity {
        Identity {
            name: Some("Ada".to_string()),
            email: Some(email.to_string()),
            image: Some("https://img.example.com/ada.png".to_string()),
        }
    }

    fn existing_profile() -> UserProfile {
        UserProfile {
            id: "user_01".to_string(),
            name: "Ada (directory)".to_string(),
            email: "ada@example.com".to_string(),
            description: Some("Mathematician".to_string()),
            avatar_url: None,
            github_url: None,
            linkedin_url: None,
            extra: Map::new(),
        }
    }

    fn base_session() -> Session {
        Session {
            user: SessionUser::new(
                Some("Ada"),
                Some("ada@example.com"),
                Some("https://img.example.com/ada.png"),
            ),
            expires: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_new_user_is_created_once_and_admitted() {
        let directory = Arc::new(RecordingDirectory::default());
        let gate = SignInGate::new(directory.clone());

        assert!(gate.sign_in(&identity("ada@example.com")).await);
        assert_eq!(directory.creates.load(Ordering::SeqCst), 1);

        let user = directory.inner.get_user("ada@example.com").await.unwrap().unwrap();
        assert_eq!(user.name, "Ada");
        assert_eq!(user.avatar_url.as_deref(), Some("https://img.example.com/ada.png"));
    }

    #[tokio::test]
    async fn test_existing_user_is_admitted_without_create() {
        let directory = Arc::new(RecordingDirectory {
            inner: InMemoryDirectory::with_users([existing_profile()]),
            creates: AtomicUsize::new(0),
        });
        let gate = SignInGate::new(directory.clone());

        assert!(gate.sign_in(&identity("ada@example.com")).await);
        assert_eq!(directory.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_denies() {
        let gate = SignInGate::new(Arc::new(FailingDirectory { fail_lookup: true }));
        assert!(!gate.sign_in(&identity("ada@example.com")).await);
    }

    #[tokio::test]
    async fn test_create_failure_denies() {
        let gate = SignInGate::new(Arc::new(FailingDirectory { fail_lookup: false }));
        assert!(!gate.sign_in(&identity("ada@example.com")).await);
    }

    #[tokio::test]
    async fn test_identity_without_email_denied() {
        let directory = Arc::new(RecordingDirectory::default());
        let gate = SignInGate::new(directory.clone());

        let anonymous = Identity {
            email: None,
            ..identity("ignored@example.com")
        };
        assert!(!gate.sign_in(&anonymous).await);
        assert_eq!(directory.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_session_enriched_from_directory() {
        let directory = Arc::new(InMemoryDirectory::with_users([existing_profile()]));
        let reconciler = SessionReconciler::new(directory);

        let session = reconciler.session(base_session(), &Claims::new()).await;
        assert_eq!(session.user.get("name"), Some(&json!("Ada (directory)")));
        assert_eq!(session.user.get("id"), Some(&json!("user_01")));
        assert_eq!(session.user.get("description"), Some(&json!("Mathematician")));
        assert_eq!(
            session.user.get("image"),
            Some(&json!("https://img.example.com/ada.png"))
        );
    }

    #[tokio::test]
    async fn test_lookup_failure_returns_original_session() {
        let reconciler = SessionReconciler::new(Arc::new(FailingDirectory { fail_lookup: true }));

        let original = base_session();
        let session = reconciler.session(original.clone(), &Claims::new()).await;
        assert_eq!(session, original);
    }

    #[tokio::test]
    async fn test_unknown_user_leaves_session_unchanged() {
        let reconciler = SessionReconciler::new(Arc::new(InMemoryDirectory::new()));

        let original = base_session();
        let session = reconciler.session(original.clone(), &Claims::new()).await;
        assert_eq!(session, original);
    }

    #[tokio::test]
    async fn test_expired_claims_still_enriched() {
        let directory = Arc::new(InMemoryDirectory::with_users([existing_profile()]));
        let reconciler = SessionReconciler::new(directory);

        let mut claims = Claims::new();
        claims.insert("exp", Utc::now().timestamp() - 3600);

        let session = reconciler.session(base_session(), &claims).await;
        assert_eq!(session.user.get("id"), Some(&json!("user_01")));
    }
}
