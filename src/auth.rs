use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use base64::engine::general_purpose;
use base64::Engine as _;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Claims carried by an access token. Only the subject is used downstream;
/// `exp` is kept so expiry is enforced during decoding.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Identity extracted from a verified access token.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub subject: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
        }
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingCredentials,
    MalformedHeader,
    InvalidScheme,
    InvalidToken(jsonwebtoken::errors::Error),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredentials => write!(f, "no Authorization header"),
            AuthError::MalformedHeader => write!(f, "malformed Authorization header"),
            AuthError::InvalidScheme => write!(f, "authentication scheme is not Bearer"),
            AuthError::InvalidToken(cause) => write!(f, "token rejected: {}", cause),
        }
    }
}

impl std::error::Error for AuthError {}

#[derive(Debug)]
pub enum KeyError {
    Decode(base64::DecodeError),
    Parse(jsonwebtoken::errors::Error),
}

impl std::fmt::Display for KeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyError::Decode(cause) => write!(f, "public key is not valid base64: {}", cause),
            KeyError::Parse(cause) => write!(f, "public key is not a valid RSA PEM: {}", cause),
        }
    }
}

impl std::error::Error for KeyError {}

/// Verifies bearer credentials against the configured RS256 public key.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Builds a verifier from a base64-encoded PEM public key, the form the
    /// key is delivered in through process configuration.
    pub fn from_base64_pem(encoded: &str) -> Result<Self, KeyError> {
        let pem = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(KeyError::Decode)?;
        let decoding_key = DecodingKey::from_rsa_pem(&pem).map_err(KeyError::Parse)?;

        Ok(Self {
            decoding_key,
            validation: Validation::new(Algorithm::RS256),
        })
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError> {
        let token = bearer_token(headers)?;
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(AuthError::InvalidToken)?;

        Ok(token_data.claims.into())
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    // The scheme token must be exactly `Bearer`.
    let token = value.strip_prefix("Bearer ").ok_or(AuthError::InvalidScheme)?;
    if token.trim().is_empty() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    TokenVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = TokenVerifier::from_ref(state);
        Ok(verifier.authenticate(&parts.headers)?)
    }
}
