//! Per-browser user identity carried in a cookie

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

/// Cookie holding the browser's user ID
pub const USER_COOKIE: &str = "moxie_user_id";

/// Request-scoped user identity
///
/// Read from the `moxie_user_id` cookie; a fresh ID is minted when the cookie
/// is missing or empty. `is_new` tells the handler to set the cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
    pub is_new: bool,
}

impl UserContext {
    /// Cookie that pins this user ID in the browser
    pub fn cookie(&self) -> Cookie<'static> {
        Cookie::build((USER_COOKIE, self.user_id.clone()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .build()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let context = match jar.get(USER_COOKIE) {
            Some(cookie) if !cookie.value().is_empty() => UserContext {
                user_id: cookie.value().to_string(),
                is_new: false,
            },
            _ => UserContext {
                user_id: Uuid::new_v4().to_string(),
                is_new: true,
            },
        };
        Ok(context)
    }
}
