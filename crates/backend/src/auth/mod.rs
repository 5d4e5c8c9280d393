//! Session layer for Google sign-in backed by a user directory.
//!
//! This module provides:
//! - JWT token encoding and decoding (`jwt`)
//! - Sign-in and session hooks that keep the user directory in sync
//! - `AuthRuntime`, which wires configuration, providers and hooks together
//! - HTTP handlers and the `require_session` middleware

pub mod handlers;
pub mod hooks;
pub mod jwt;
mod middleware;
pub mod runtime;
pub mod types;

pub use handlers::{auth_me, auth_providers, auth_session, auth_signout};
pub use hooks::{SessionHook, SessionReconciler, SignInGate, SignInHook};
pub use middleware::{build_auth_cookie, extract_token, require_session};
pub use runtime::AuthRuntime;
pub use types::{AuthConfig, Claims, Identity, SignInOutcome};
