//! Session cookie extractor.

use axum::Json;
use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use learnhub_domain::user::{UserRole, is_permitted};

use crate::cookie::LEARNHUB_TOKEN;
use crate::token::validate_session_token;

/// HMAC secret used to validate session tokens. Provide it from the router
/// state through `FromRef`.
#[derive(Clone)]
pub struct SessionKey(pub String);

/// Authenticated user resolved from the `learnhub_token` cookie.
///
/// Rejects with 401 when the cookie is absent, malformed, forged or expired.
/// Role enforcement (403) is done by handlers after extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub name: String,
    pub role: UserRole,
}

impl Session {
    /// Whether the session holds one of `required`.
    pub fn has_any(&self, required: &[UserRole]) -> bool {
        is_permitted(&[self.role], required)
    }
}

/// 401 response produced when no valid session is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRejection {
    Missing,
    Invalid,
}

impl SessionRejection {
    fn message(self) -> &'static str {
        match self {
            Self::Missing => "authentication required",
            Self::Invalid => "authentication invalid",
        }
    }
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": "UNAUTHENTICATED",
            "msg": self.message(),
        });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for Session
where
    SessionKey: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    // Values are read synchronously and moved into a 'static future; an
    // `async fn` here would capture `parts` and trip E0195.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let SessionKey(secret) = SessionKey::from_ref(state);
        let token = CookieJar::from_headers(&parts.headers)
            .get(LEARNHUB_TOKEN)
            .map(|c| c.value().to_owned());

        async move {
            let token = token.ok_or(SessionRejection::Missing)?;
            let info = validate_session_token(&token, &secret).map_err(|e| {
                tracing::debug!(error = %e, "rejected session token");
                SessionRejection::Invalid
            })?;
            Ok(Self {
                user_id: info.user_id,
                name: info.name,
                role: info.role,
            })
        }
    }
}
