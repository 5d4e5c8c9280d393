//! User directory clients.
//!
//! The session layer only needs two operations from the directory: look a
//! user up by email, and create one. `GraphQlDirectory` talks to the Grafbase
//! API; `InMemoryDirectory` backs local development and tests.

mod graphql;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::UserProfile;
use thiserror::Error;

pub use graphql::GraphQlDirectory;
pub use memory::InMemoryDirectory;

/// Transport-level failures talking to the directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("directory returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("directory reported errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("malformed directory response: {0}")]
    InvalidResponse(String),

    #[error("user {0} already exists")]
    Duplicate(String),
}

/// Read/create access to application user profiles.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch the user registered under `email`, if any.
    async fn get_user(&self, email: &str) -> Result<Option<UserProfile>, DirectoryError>;

    /// Register a new user.
    async fn create_user(&self, name: &str, email: &str, image: &str)
        -> Result<(), DirectoryError>;
}

/// Directory connection settings loaded from environment
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub api_url: Option<String>,
    pub api_key: String,
}

impl DirectoryConfig {
    /// Load directory configuration from environment variables.
    ///
    /// - `GRAFBASE_API_URL`: GraphQL endpoint; when unset an in-memory
    ///   directory is used instead
    /// - `GRAFBASE_API_KEY`: API key sent as `x-api-key`
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("GRAFBASE_API_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            api_key: std::env::var("GRAFBASE_API_KEY").unwrap_or_default(),
        }
    }

    /// Build the directory client these settings describe.
    pub fn connect(&self) -> Arc<dyn UserDirectory> {
        match &self.api_url {
            Some(url) => {
                tracing::info!("Using Grafbase user directory at {}", url);
                Arc::new(GraphQlDirectory::new(url.clone(), self.api_key.clone()))
            }
            None => {
                tracing::warn!(
                    "GRAFBASE_API_URL not set, using in-memory user directory (not for production)"
                );
                Arc::new(InMemoryDirectory::new())
            }
        }
    }
}
