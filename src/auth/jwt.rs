use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::types::{AppError, Result};

/// Lifetime applied when `issue` is called without a ttl.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 15;

/// Claims carried by a session (bearer) token.
///
/// `roles` is a snapshot taken when the token was issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub roles: Vec<String>,
    #[serde(default, skip_serializing)]
    pub exp: i64,
}

/// Claims carried by a password-reset token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetClaims {
    pub sub: String,
    #[serde(default, skip_serializing)]
    pub exp: i64,
}

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is invalid")]
    Invalid,
    #[error("token has expired")]
    Expired,
}

/// Issues and verifies HMAC-signed compact JWTs.
///
/// The secret is handed in at construction time; the service never reads
/// the environment itself.
pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    /// Creates a service for one of the HMAC algorithms (HS256, HS384, HS512).
    pub fn new(secret: &str, algorithm: Algorithm) -> Result<Self> {
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AppError::Internal(format!(
                "Unsupported signing algorithm {:?}, expected an HMAC algorithm",
                algorithm
            )));
        }

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Signs `claims` with an `exp` of now + `ttl` (15 minutes when `None`).
    pub fn issue<C: Serialize>(&self, claims: &C, ttl: Option<Duration>) -> Result<String> {
        self.issue_at(claims, ttl, Utc::now())
    }

    /// Like [`issue`](Self::issue) but with an explicit issuance instant.
    pub fn issue_at<C: Serialize>(
        &self,
        claims: &C,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let ttl = ttl.unwrap_or_else(|| Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES));

        let mut payload = match serde_json::to_value(claims) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(_) => {
                return Err(AppError::Internal(
                    "Token claims must serialize to an object".to_string(),
                ))
            }
            Err(e) => {
                return Err(AppError::Internal(format!(
                    "Failed to serialize claims: {}",
                    e
                )))
            }
        };
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Internal("Token lifetime out of range".to_string()))?;
        payload.insert("exp".to_string(), expires_at.timestamp().into());

        encode(&Header::new(self.algorithm), &payload, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Checks signature and expiry and returns the decoded claims.
    pub fn verify<C: DeserializeOwned>(&self, token: &str) -> std::result::Result<C, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        decode::<C>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }

    /// Issues a session token for a user and the role names they hold right now.
    pub fn issue_session(&self, user_id: i64, roles: Vec<String>, ttl: Duration) -> Result<String> {
        let claims = SessionClaims {
            sub: user_id.to_string(),
            roles,
            exp: 0,
        };
        self.issue(&claims, Some(ttl))
    }

    /// Issues a subject-only token for the password-reset link.
    pub fn issue_reset(&self, user_id: i64, ttl: Duration) -> Result<String> {
        let claims = ResetClaims {
            sub: user_id.to_string(),
            exp: 0,
        };
        self.issue(&claims, Some(ttl))
    }
}
