//! Signed session cookies for router tests.
//!
//! Handlers authenticate through the `learnhub_token` cookie. `MockSession`
//! signs a real token with the test secret so requests pass the `Session`
//! extractor without going through login.

use axum::http::{HeaderMap, HeaderValue, header};
use uuid::Uuid;

use learnhub_auth_types::cookie::LEARNHUB_TOKEN;
use learnhub_auth_types::token::issue_session_token;
use learnhub_domain::user::UserRole;

/// Configurable identity presented by test requests.
pub struct MockSession {
    pub user_id: Uuid,
    pub name: String,
    pub role: UserRole,
}

impl MockSession {
    pub fn new(role: UserRole) -> Self {
        Self {
            user_id: Uuid::now_v7(),
            name: format!("{}-tester", role.as_str().to_lowercase()),
            role,
        }
    }

    pub fn student() -> Self {
        Self::new(UserRole::Student)
    }

    pub fn instructor() -> Self {
        Self::new(UserRole::Instructor)
    }

    pub fn admin() -> Self {
        Self::new(UserRole::Admin)
    }

    /// `Cookie` header value carrying a token signed with `secret`.
    pub fn cookie(&self, secret: &str) -> HeaderValue {
        let (token, _) = issue_session_token(self.user_id, &self.name, self.role, secret)
            .expect("sign test session token");
        HeaderValue::from_str(&format!("{LEARNHUB_TOKEN}={token}"))
            .expect("session cookie is a valid header value")
    }

    /// Headers as a logged-in browser would send them.
    pub fn headers(&self, secret: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::COOKIE, self.cookie(secret));
        map
    }
}
