use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User record as stored in the user directory.
///
/// Fields the directory adds beyond the known ones are kept in `extra` so that
/// they still reach the session when it is enriched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `user` object of a session.
///
/// Kept as an open JSON object: the base fields come from the token, and
/// whatever the directory knows about the user is layered on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionUser(pub Map<String, Value>);

impl SessionUser {
    pub fn new(name: Option<&str>, email: Option<&str>, image: Option<&str>) -> Self {
        let mut fields = Map::new();
        for (key, value) in [("name", name), ("email", email), ("image", image)] {
            if let Some(value) = value {
                fields.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
        SessionUser(fields)
    }

    pub fn email(&self) -> Option<&str> {
        self.0.get("email").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Overlay the profile's fields onto this user. Profile values win on
    /// key collisions, nulls included.
    pub fn merge_profile(&mut self, profile: &UserProfile) -> Result<(), serde_json::Error> {
        if let Value::Object(fields) = serde_json::to_value(profile)? {
            self.0.extend(fields);
        }
        Ok(())
    }
}

/// Session exposed to the application for the current request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
}

// API response types for the auth endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub signin_url: String,
    pub callback_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Auto,
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeResponse {
    pub color_scheme: ColorScheme,
    pub logo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderResponse>,
    pub theme: ThemeResponse,
}
