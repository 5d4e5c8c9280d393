//! In-process user directory.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Map;
use shared_types::UserProfile;
use tokio::sync::RwLock;

use super::{DirectoryError, UserDirectory};

/// Directory held in memory, keyed by email.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the directory with existing profiles.
    pub fn with_users(users: impl IntoIterator<Item = UserProfile>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.email.clone(), user))
            .collect();
        Self {
            users: RwLock::new(users),
        }
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn get_user(&self, email: &str) -> Result<Option<UserProfile>, DirectoryError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        image: &str,
    ) -> Result<(), DirectoryError> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(DirectoryError::Duplicate(email.to_string()));
        }

        let profile = UserProfile {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            description: None,
            avatar_url: (!image.is_empty()).then(|| image.to_string()),
            github_url: None,
            linkedin_url: None,
            extra: Map::new(),
        };
        users.insert(email.to_string(), profile);
        Ok(())
    }
}
