//! Session cookie builders.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::token::SESSION_TOKEN_EXP;

/// Cookie name for the session token.
pub const LEARNHUB_TOKEN: &str = "learnhub_token";

/// Value written into the cookie on logout.
pub const LOGGED_OUT: &str = "logout";

/// Deployment-dependent cookie attributes.
#[derive(Debug, Clone, Default)]
pub struct CookieSettings {
    pub domain: Option<String>,
    pub secure: bool,
}

fn session_cookie(value: String, max_age: Duration, settings: &CookieSettings) -> Cookie<'static> {
    let mut builder = Cookie::build((LEARNHUB_TOKEN, value))
        .path("/")
        .max_age(max_age)
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax);
    if let Some(domain) = &settings.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build()
}

/// Set the session cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use learnhub_auth_types::cookie::{CookieSettings, LEARNHUB_TOKEN, set_session_cookie};
///
/// let settings = CookieSettings { domain: Some("example.com".into()), secure: true };
/// let jar = set_session_cookie(CookieJar::new(), "token_value".to_string(), &settings);
/// let cookie = jar.get(LEARNHUB_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(86400)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_session_cookie(jar: CookieJar, value: String, settings: &CookieSettings) -> CookieJar {
    jar.add(session_cookie(
        value,
        Duration::seconds(SESSION_TOKEN_EXP as i64),
        settings,
    ))
}

/// Replace the session cookie with an already-expired one.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use learnhub_auth_types::cookie::{
///     CookieSettings, LEARNHUB_TOKEN, LOGGED_OUT, expire_session_cookie, set_session_cookie,
/// };
///
/// let settings = CookieSettings::default();
/// let jar = set_session_cookie(CookieJar::new(), "t".to_string(), &settings);
/// let jar = expire_session_cookie(jar, &settings);
/// let cookie = jar.get(LEARNHUB_TOKEN).unwrap();
/// assert_eq!(cookie.value(), LOGGED_OUT);
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn expire_session_cookie(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    jar.add(session_cookie(LOGGED_OUT.to_owned(), Duration::ZERO, settings))
}
