//! Sentry auth token resolution.
//!
//! The token used for upstream requests is resolved with a fallback chain:
//!
//! 1. `auth_token` from the configuration file
//! 2. The `SENTRY_AUTH_TOKEN` environment variable
//! 3. No token (requests are sent unauthenticated and Sentry will usually
//!    answer `401`)

/// Environment variable consulted when the configuration has no token.
pub const TOKEN_ENV_VAR: &str = "SENTRY_AUTH_TOKEN";

/// Resolves the auth token from the configuration or the environment.
///
/// # Examples
///
/// ```
/// use sentry_config::auth::resolve_token;
///
/// let token = resolve_token(Some("sntrys_configured"));
/// assert_eq!(token.as_deref(), Some("sntrys_configured"));
/// ```
#[must_use]
pub fn resolve_token(config_token: Option<&str>) -> Option<String> {
    resolve_token_with(config_token, |name| std::env::var(name).ok())
}

/// Resolves the auth token using `lookup` to read environment variables.
///
/// Blank values are treated as absent at every step.
///
/// # Examples
///
/// ```
/// use sentry_config::auth::resolve_token_with;
///
/// let token = resolve_token_with(None, |_| Some("sntrys_from_env".to_string()));
/// assert_eq!(token.as_deref(), Some("sntrys_from_env"));
/// ```
pub fn resolve_token_with<F>(config_token: Option<&str>, lookup: F) -> Option<String>
where
    F: FnOnce(&str) -> Option<String>,
{
    if let Some(token) = config_token.map(str::trim).filter(|t| !t.is_empty()) {
        return Some(token.to_string());
    }

    lookup(TOKEN_ENV_VAR)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
