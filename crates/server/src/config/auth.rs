use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ServerError;

/// Environment variable consulted when `jwt_secret` is not configured.
pub const JWT_SECRET_ENV: &str = "GUIDES_JWT_SECRET";

/// Session cookie configuration.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens.
    pub jwt_secret: Option<SecretString>,
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Sign-in page unauthenticated requests are sent to.
    #[serde(default = "default_signin_path")]
    pub signin_path: String,
    /// Lifetime of tokens minted by `issue-token`.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            cookie_name: default_cookie_name(),
            signin_path: default_signin_path(),
            token_ttl_seconds: default_token_ttl(),
        }
    }
}

impl AuthConfig {
    /// The signing secret, from the config file or the environment.
    pub fn resolve_secret(&self) -> Result<SecretString, ServerError> {
        if let Some(secret) = &self.jwt_secret {
            return Ok(secret.clone());
        }
        std::env::var(JWT_SECRET_ENV)
            .ok()
            .filter(|s| !s.is_empty())
            .map(SecretString::new)
            .ok_or_else(|| {
                ServerError::Config(format!(
                    "no session secret: set [auth] jwt_secret or {JWT_SECRET_ENV}"
                ))
            })
    }
}

fn default_cookie_name() -> String {
    "session".to_owned()
}

fn default_signin_path() -> String {
    "/signin".to_owned()
}

fn default_token_ttl() -> u64 {
    24 * 60 * 60
}
