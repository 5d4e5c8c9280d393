//! Auth-related types and configuration.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Re-export shared types for convenience
pub use shared_types::{
    ColorScheme, ProviderResponse, ProvidersResponse, Session, SessionUser, ThemeResponse,
};

use super::jwt::DEFAULT_TOKEN_TTL_SECS;
use crate::error::AuthError;

/// JWT claims.
///
/// An open mapping: whatever the caller puts in survives a round trip, and
/// the codec adds `iss`, `iat` and `exp` on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims carried by a token issued for a freshly signed-in identity.
    pub fn from_identity(identity: &Identity) -> Self {
        let mut claims = Self::new();
        for (key, value) in [
            ("name", &identity.name),
            ("email", &identity.email),
            ("picture", &identity.image),
        ] {
            if let Some(value) = value {
                claims.insert(key, value.clone());
            }
        }
        claims
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn email(&self) -> Option<&str> {
        self.get_str("email")
    }

    pub fn issuer(&self) -> Option<&str> {
        self.get_str("iss")
    }

    /// Expiration as epoch seconds. Fractional values are truncated.
    pub fn exp(&self) -> Option<i64> {
        let exp = self.0.get("exp")?;
        exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64))
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp()
            .and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    /// True once `now` is past `exp`. Claims without `exp` never expire here.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp()
            .is_some_and(|exp| now.timestamp_millis() > exp.saturating_mul(1000))
    }

    /// Session as it looks before any directory enrichment.
    pub fn to_session(&self) -> Session {
        Session {
            user: SessionUser::new(
                self.get_str("name"),
                self.email(),
                self.get_str("picture"),
            ),
            expires: self.expires_at().unwrap_or_else(Utc::now),
        }
    }
}

/// Identity asserted by the OAuth provider after a successful login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

/// Result of running a sign-in through the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// Sign-in hook admitted the identity; the token is ready to hand out.
    Admitted { token: String },
    Denied,
}

/// OAuth identity provider registration.
#[derive(Clone)]
pub struct ProviderConfig {
    pub id: String,
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
}

impl ProviderConfig {
    pub fn google(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            id: "google".to_string(),
            name: "Google".to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Public description of the provider. Credentials stay out of it.
    pub fn to_response(&self, base_url: &str) -> ProviderResponse {
        let base_url = base_url.trim_end_matches('/');
        ProviderResponse {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: "oauth".to_string(),
            signin_url: format!("{}/api/auth/signin/{}", base_url, self.id),
            callback_url: format!("{}/api/auth/callback/{}", base_url, self.id),
        }
    }
}

/// Look of the hosted sign-in pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeConfig {
    pub color_scheme: ColorScheme,
    pub logo: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::Light,
            logo: "/logo.svg".to_string(),
        }
    }
}

impl From<&ThemeConfig> for ThemeResponse {
    fn from(theme: &ThemeConfig) -> Self {
        ThemeResponse {
            color_scheme: theme.color_scheme,
            logo: theme.logo.clone(),
        }
    }
}

/// Auth configuration loaded from environment
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub enforce_expiry: bool,
    pub cookie_name: String,
    pub base_url: String,
    pub google_client_id: String,
    pub google_client_secret: String,
}

impl AuthConfig {
    /// Load auth configuration from environment variables.
    ///
    /// Required env vars:
    /// - `JWT_SECRET`: Secret key for signing JWTs
    /// - `GOOGLE_CLIENT_ID`: Google OAuth client ID
    /// - `GOOGLE_CLIENT_SECRET`: Google OAuth client secret
    ///
    /// Optional env vars:
    /// - `TOKEN_TTL_SECS`: token lifetime, defaults to one hour
    /// - `ENFORCE_TOKEN_EXPIRY`: reject expired tokens on decode, defaults to `true`
    /// - `AUTH_COOKIE_NAME`: defaults to `auth_token`
    /// - `AUTH_BASE_URL`: public origin used in provider URLs
    pub fn from_env() -> Result<Self, AuthError> {
        let required = |name: &str| {
            std::env::var(name).map_err(|_| AuthError::Config(format!("{} must be set", name)))
        };

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.is_empty() {
            return Err(AuthError::Config("JWT_SECRET cannot be empty".to_string()));
        }

        let token_ttl_secs = match std::env::var("TOKEN_TTL_SECS") {
            Ok(raw) => raw.parse::<i64>().map_err(|_| {
                AuthError::Config("TOKEN_TTL_SECS must be a number of seconds".to_string())
            })?,
            Err(_) => DEFAULT_TOKEN_TTL_SECS,
        };

        let enforce_expiry = std::env::var("ENFORCE_TOKEN_EXPIRY")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        Ok(Self {
            jwt_secret,
            token_ttl: Duration::seconds(token_ttl_secs),
            enforce_expiry,
            cookie_name: std::env::var("AUTH_COOKIE_NAME")
                .unwrap_or_else(|_| "auth_token".to_string()),
            base_url: std::env::var("AUTH_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            google_client_id: required("GOOGLE_CLIENT_ID")?,
            google_client_secret: required("GOOGLE_CLIENT_SECRET")?,
        })
    }
}
