use axum_extra::extract::cookie::{Cookie, CookieJar};
use time::Duration as TimeDuration;

use crate::config::CookieConfig;

pub const SESSION_COOKIE: &str = "token";

/// Adds the session cookie carrying `token`.
pub fn with_session(
    jar: CookieJar,
    cfg: &CookieConfig,
    token: String,
    max_age: std::time::Duration,
) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(cfg.secure)
        .same_site(cfg.same_site)
        .max_age(TimeDuration::seconds(max_age.as_secs() as i64));
    jar.add(cookie)
}

/// Instructs the client to drop the session cookie.
pub fn without_session(jar: CookieJar, cfg: &CookieConfig) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(cfg.secure)
        .same_site(cfg.same_site);
    jar.remove(cookie)
}

/// The raw session token, if the client sent one.
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}
