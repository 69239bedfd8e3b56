use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration as TimeDuration;

use crate::state::AppState;

pub const REFRESH_COOKIE: &str = "refreshToken";

/// HttpOnly refresh cookie living as long as the refresh token. Cross-site
/// frontends need `SameSite=None`, which browsers only accept with `Secure`.
pub fn refresh_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let secure = state.config.auth_cookie_secure;
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(if secure { SameSite::None } else { SameSite::Lax })
        .path("/")
        .max_age(TimeDuration::seconds(
            state.tokens.refresh_ttl().num_seconds(),
        ))
        .build()
}

pub fn clear_refresh_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(REFRESH_COOKIE).path("/"))
}

pub fn refresh_token_from(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}
