//! The authentication runtime: configuration, providers and hooks in one
//! place, built once at startup and shared by reference.

use std::sync::Arc;

use axum::http::HeaderMap;

use super::hooks::{SessionHook, SessionReconciler, SignInGate, SignInHook};
use super::jwt;
use super::middleware::extract_token;
use super::types::{
    AuthConfig, Claims, Identity, ProviderConfig, ProviderResponse, Session, SignInOutcome,
    ThemeConfig,
};
use crate::directory::UserDirectory;
use crate::error::AuthError;

pub struct AuthRuntime {
    config: AuthConfig,
    providers: Vec<ProviderConfig>,
    theme: ThemeConfig,
    sign_in_hook: Arc<dyn SignInHook>,
    session_hook: Arc<dyn SessionHook>,
}

impl AuthRuntime {
    /// Runtime with the Google provider, the default theme, and hooks that
    /// keep `directory` in sync.
    pub fn new(config: AuthConfig, directory: Arc<dyn UserDirectory>) -> Self {
        let providers = vec![ProviderConfig::google(
            config.google_client_id.clone(),
            config.google_client_secret.clone(),
        )];

        Self {
            config,
            providers,
            theme: ThemeConfig::default(),
            sign_in_hook: Arc::new(SignInGate::new(directory.clone())),
            session_hook: Arc::new(SessionReconciler::new(directory)),
        }
    }

    pub fn with_sign_in_hook(mut self, hook: impl SignInHook + 'static) -> Self {
        self.sign_in_hook = Arc::new(hook);
        self
    }

    pub fn with_session_hook(mut self, hook: impl SessionHook + 'static) -> Self {
        self.session_hook = Arc::new(hook);
        self
    }

    pub fn with_theme(mut self, theme: ThemeConfig) -> Self {
        self.theme = theme;
        self
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn theme(&self) -> &ThemeConfig {
        &self.theme
    }

    pub fn providers(&self) -> Vec<ProviderResponse> {
        self.providers
            .iter()
            .map(|p| p.to_response(&self.config.base_url))
            .collect()
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        jwt::encode_token_with_ttl(claims, &self.config.jwt_secret, self.config.token_ttl)
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        jwt::decode_token_with(token, &self.config.jwt_secret, self.config.enforce_expiry)
    }

    /// Run the sign-in hook for an asserted identity and, if it is admitted,
    /// issue a token for it.
    pub async fn sign_in(&self, identity: &Identity) -> Result<SignInOutcome, AuthError> {
        if !self.sign_in_hook.sign_in(identity).await {
            tracing::warn!("Sign-in denied for {:?}", identity.email);
            return Ok(SignInOutcome::Denied);
        }

        let token = self.encode(&Claims::from_identity(identity))?;
        tracing::info!("Successful sign-in for {:?}", identity.email);
        Ok(SignInOutcome::Admitted { token })
    }

    /// Turn a token into the session exposed to the application.
    pub async fn session(&self, token: &str) -> Result<Session, AuthError> {
        let claims = self.decode(token)?;
        let session = claims.to_session();
        Ok(self.session_hook.session(session, &claims).await)
    }

    /// Session for the request carrying `headers`.
    pub async fn current_user(&self, headers: &HeaderMap) -> Result<Session, AuthError> {
        let result = match extract_token(headers, &self.config.cookie_name) {
            Some(token) => self.session(&token).await,
            None => Err(AuthError::MissingToken),
        };

        match &result {
            Err(AuthError::MissingToken) => tracing::debug!("No session token on request"),
            Err(e) => tracing::error!("Error getting current user: {}", e),
            Ok(_) => {}
        }
        result
    }
}
