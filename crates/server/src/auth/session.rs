use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::ServerError;

/// JWT claims carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id).
    pub sub: String,
    /// Issued at (seconds since epoch).
    pub iat: u64,
    /// Expiry (seconds since epoch).
    pub exp: u64,
}

/// Issues and validates HS256 session tokens.
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: u64,
    cookie_name: String,
    signin_path: String,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl_seconds", &self.ttl_seconds)
            .field("cookie_name", &self.cookie_name)
            .field("signin_path", &self.signin_path)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(secret: &SecretString, config: &AuthConfig) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_seconds: config.token_ttl_seconds,
            cookie_name: config.cookie_name.clone(),
            signin_path: config.signin_path.clone(),
        }
    }

    /// Name of the cookie carrying the session token.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn signin_path(&self) -> &str {
        &self.signin_path
    }

    /// Mint a session token for `user_id`.
    pub fn issue(&self, user_id: &str) -> Result<String, ServerError> {
        let now = jsonwebtoken::get_current_timestamp();
        self.encode(&Claims {
            sub: user_id.to_owned(),
            iat: now,
            exp: now + self.ttl_seconds,
        })
    }

    pub(crate) fn encode(&self, claims: &Claims) -> Result<String, ServerError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| ServerError::Session(format!("JWT encoding failed: {e}")))
    }

    /// The user id of a valid token. Expired or badly signed tokens yield
    /// `None`.
    pub fn verify(&self, token: &str) -> Option<String> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .ok()
            .map(|data| data.claims.sub)
    }
}
