use axum::http::{header::InvalidHeaderValue, HeaderValue};

pub const SESSION_COOKIE_NAME: &str = "token";

const SESSION_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// Build the `HttpOnly` session cookie carrying the signed token.
///
/// Production runs behind HTTPS with a cross-site frontend, so the cookie is
/// `Secure; SameSite=None` there and `SameSite=Strict` everywhere else.
pub fn session_cookie(token: &str, production: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; Max-Age={SESSION_MAX_AGE_SECS}"
    );
    push_site_attributes(&mut cookie, production);
    HeaderValue::from_str(&cookie)
}

pub fn clear_session_cookie(production: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; Max-Age=0");
    push_site_attributes(&mut cookie, production);
    HeaderValue::from_str(&cookie)
}

fn push_site_attributes(cookie: &mut String, production: bool) {
    if production {
        cookie.push_str("; SameSite=None; Secure");
    } else {
        cookie.push_str("; SameSite=Strict");
    }
}
