/// Browser session held in cookies
///
/// The dashboard keeps no server-side state. After a successful login the
/// bearer token and username are written to two HttpOnly cookies and read
/// back on every request. Logging out, or the API rejecting the token,
/// clears both.

use axum::http::{header, HeaderMap, HeaderValue};
use cookie::{Cookie, SameSite};

pub const TOKEN_COOKIE: &str = "taskdesk_token";
pub const USER_COOKIE: &str = "taskdesk_user";

/// Logged-in user as seen by the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
}

impl Session {
    /// Reads the session from the request's `Cookie` headers
    ///
    /// Returns `None` unless both cookies are present and non-empty.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let mut token = None;
        let mut username = None;

        for value in headers.get_all(header::COOKIE) {
            let Ok(raw) = value.to_str() else {
                continue;
            };

            for cookie in Cookie::split_parse_encoded(raw).flatten() {
                match cookie.name() {
                    TOKEN_COOKIE => token = Some(cookie.value().to_string()),
                    USER_COOKIE => username = Some(cookie.value().to_string()),
                    _ => {}
                }
            }
        }

        match (token, username) {
            (Some(token), Some(username)) if !token.is_empty() && !username.is_empty() => {
                Some(Self { token, username })
            }
            _ => None,
        }
    }

    /// `Set-Cookie` values that store this session
    pub fn set_cookie_headers(&self, secure: bool) -> Vec<HeaderValue> {
        [
            session_cookie(TOKEN_COOKIE, self.token.clone(), secure),
            session_cookie(USER_COOKIE, self.username.clone(), secure),
        ]
        .iter()
        .filter_map(|cookie| HeaderValue::from_str(&cookie.encoded().to_string()).ok())
        .collect()
    }
}

/// `Set-Cookie` values that delete the session
pub fn clear_cookie_headers(secure: bool) -> Vec<HeaderValue> {
    [TOKEN_COOKIE, USER_COOKIE]
        .into_iter()
        .map(|name| {
            let mut cookie = session_cookie(name, String::new(), secure);
            cookie.make_removal();
            cookie
        })
        .filter_map(|cookie| HeaderValue::from_str(&cookie.to_string()).ok())
        .collect()
}

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}
