//! Session JWT issue and validation.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use learnhub_domain::user::UserRole;

/// Session JWT lifetime in seconds (1 day).
pub const SESSION_TOKEN_EXP: u64 = 86_400;

/// User identity carried by a validated session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub user_id: Uuid,
    pub name: String,
    pub role: UserRole,
    pub exp: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// JWT claims payload.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user ID (UUID string) |
/// | `name` | custom | display name |
/// | `role` | custom | `"STUDENT"`, `"INSTRUCTOR"` or `"ADMIN"` |
/// | `exp` | `exp` | seconds since epoch |
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub name: String,
    pub role: UserRole,
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Sign a session token for the given user. Returns the token and its expiry.
pub fn issue_session_token(
    user_id: Uuid,
    name: &str,
    role: UserRole,
    secret: &str,
) -> Result<(String, u64), AuthError> {
    let exp = now_secs() + SESSION_TOKEN_EXP;
    let claims = SessionClaims {
        sub: user_id.to_string(),
        name: name.to_owned(),
        role,
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AuthError::Signing)?;
    Ok((token, exp))
}

/// Validate a session cookie value.
///
/// HS256, `exp` checked with the library's default 60 s leeway, `exp` and
/// `sub` required.
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionInfo, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let claims = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?
    .claims;

    let user_id = claims.sub.parse::<Uuid>().map_err(|_| AuthError::Malformed)?;
    Ok(SessionInfo {
        user_id,
        name: claims.name,
        role: claims.role,
        exp: claims.exp,
    })
}
