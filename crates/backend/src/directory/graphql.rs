//! Grafbase GraphQL user directory.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use shared_types::UserProfile;

use super::{DirectoryError, UserDirectory};

const GET_USER_QUERY: &str = r#"
query GetUser($email: String!) {
  user(by: { email: $email }) {
    id
    name
    email
    avatarUrl
    description
    githubUrl
    linkedinUrl
  }
}
"#;

const CREATE_USER_MUTATION: &str = r#"
mutation CreateUser($input: UserCreateInput!) {
  userCreate(input: $input) {
    user {
      id
      name
      email
      avatarUrl
      description
      githubUrl
      linkedinUrl
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GetUserData {
    user: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserData {
    user_create: CreatedUser,
}

#[derive(Debug, Deserialize)]
struct CreatedUser {
    user: UserProfile,
}

/// Client for the Grafbase GraphQL API.
#[derive(Debug, Clone)]
pub struct GraphQlDirectory {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl GraphQlDirectory {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, DirectoryError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Status { status, body });
        }

        let body: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| DirectoryError::InvalidResponse(e.to_string()))?;

        if !body.errors.is_empty() {
            return Err(DirectoryError::GraphQl(
                body.errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        body.data
            .ok_or_else(|| DirectoryError::InvalidResponse("response has no data".to_string()))
    }
}

#[async_trait]
impl UserDirectory for GraphQlDirectory {
    async fn get_user(&self, email: &str) -> Result<Option<UserProfile>, DirectoryError> {
        let data: GetUserData = self
            .execute(GET_USER_QUERY, json!({ "email": email }))
            .await?;
        Ok(data.user)
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        image: &str,
    ) -> Result<(), DirectoryError> {
        let variables = json!({
            "input": {
                "name": name,
                "email": email,
                "avatarUrl": image,
            }
        });
        let data: CreateUserData = self.execute(CREATE_USER_MUTATION, variables).await?;
        tracing::info!(
            "Created directory user {} with id {}",
            data.user_create.user.email,
            data.user_create.user.id
        );
        Ok(())
    }
}
