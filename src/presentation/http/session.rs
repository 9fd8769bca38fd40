//! Session Cookie
//!
//! The signed session token travels only in an HttpOnly cookie. Logging
//! out overwrites it with an already-expired cookie carrying the same
//! attributes, so browsers match and drop it.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::{Duration, OffsetDateTime};

use crate::config::Settings;

/// Session cookie manager
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    max_age_seconds: i64,
    secure: bool,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, max_age_seconds: i64, secure: bool) -> Self {
        Self {
            name: name.into(),
            max_age_seconds,
            secure,
        }
    }

    /// `Secure` only in production, where the site is served over HTTPS.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.session.cookie_name.clone(),
            settings.session.max_age_seconds,
            settings.is_production(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store `token` in the jar.
    pub fn set(&self, jar: CookieJar, token: String) -> CookieJar {
        jar.add(self.cookie(token, Duration::seconds(self.max_age_seconds)))
    }

    /// Replace the session with an expired, empty cookie.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        let mut cookie = self.cookie(String::new(), Duration::ZERO);
        cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
        jar.add(cookie)
    }

    /// The session token, if the request carries a non-empty one.
    pub fn token(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    fn cookie(&self, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build((self.name.clone(), value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(max_age)
            .build()
    }
}
