//! Who is calling.
//!
//! Identity is issued elsewhere. The server only reads it, either from
//! headers set by an authenticating reverse proxy or, in demo mode, from the
//! cookie written by the demo login route.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;

use crate::app::AppState;
use crate::auth::models::AuthenticatedUser;
use crate::config::IdentityConfig;
use crate::error::AppError;

/// Cookie holding the JSON-encoded demo user.
pub const DEMO_COOKIE: &str = "folio_demo_user";

/// Read the user from trusted proxy headers. Requires a non-empty user id.
pub fn user_from_headers(headers: &HeaderMap, config: &IdentityConfig) -> Option<AuthenticatedUser> {
    if !config.trusted_headers {
        return None;
    }

    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let user_id = read(&config.user_id_header)?;
    Some(AuthenticatedUser::new(user_id, read(&config.email_header)))
}

pub fn user_from_cookie(jar: &CookieJar) -> Option<AuthenticatedUser> {
    let cookie = jar.get(DEMO_COOKIE)?;
    match serde_json::from_str(cookie.value()) {
        Ok(user) => Some(user),
        Err(err) => {
            tracing::debug!(error = %err, "Ignoring malformed demo session cookie");
            None
        }
    }
}

/// Proxy headers win over the demo cookie.
pub fn resolve_user(headers: &HeaderMap, state: &AppState) -> Option<AuthenticatedUser> {
    user_from_headers(headers, &state.identity).or_else(|| {
        if state.demo_mode {
            user_from_cookie(&CookieJar::from_headers(headers))
        } else {
            None
        }
    })
}

/// The current user, if any.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_user(&parts.headers, state)))
    }
}

/// An authenticated user on the admin allow-list.
///
/// Rejects with 401 when nobody is signed in and 403 otherwise, before the
/// handler touches any data.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = resolve_user(&parts.headers, state)
            .ok_or_else(|| AppError::Auth("Authentication required".into()))?;

        if !state.admins.is_admin(Some(&user.user_id), user.email.as_deref()) {
            tracing::warn!(user_id = %user.user_id, "Admin route refused for non-admin user");
            return Err(AppError::Forbidden("Admin access required".into()));
        }

        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn identity(trusted_headers: bool) -> IdentityConfig {
        IdentityConfig {
            trusted_headers,
            user_id_header: "x-auth-user-id".to_string(),
            email_header: "x-auth-user-email".to_string(),
        }
    }

    #[test]
    fn test_headers_ignored_unless_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-auth-user-id", HeaderValue::from_static("user_1"));

        assert!(user_from_headers(&headers, &identity(false)).is_none());

        let user = user_from_headers(&headers, &identity(true)).unwrap();
        assert_eq!(user.user_id, "user_1");
        assert_eq!(user.email, None);
    }

    #[test]
    fn test_headers_need_a_user_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-auth-user-email", HeaderValue::from_static("owner@example.com"));
        assert!(user_from_headers(&headers, &identity(true)).is_none());

        headers.insert("x-auth-user-id", HeaderValue::from_static("   "));
        assert!(user_from_headers(&headers, &identity(true)).is_none());

        headers.insert("x-auth-user-id", HeaderValue::from_static("user_2"));
        let user = user_from_headers(&headers, &identity(true)).unwrap();
        assert_eq!(user.email.as_deref(), Some("owner@example.com"));
    }

    #[test]
    fn test_custom_header_names() {
        let config = IdentityConfig {
            trusted_headers: true,
            user_id_header: "x-forwarded-user".to_string(),
            email_header: "x-forwarded-email".to_string(),
        };
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-user", HeaderValue::from_static("u-9"));
        assert_eq!(user_from_headers(&headers, &config).unwrap().user_id, "u-9");
    }

    #[test]
    fn test_cookie_user() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static(r#"folio_demo_user={"userId":"demo-reader","email":"reader@demo.folio.dev"}"#),
        );
        let user = user_from_cookie(&CookieJar::from_headers(&headers)).unwrap();
        assert_eq!(user.user_id, "demo-reader");

        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::COOKIE, HeaderValue::from_static("folio_demo_user=garbage"));
        assert!(user_from_cookie(&CookieJar::from_headers(&headers)).is_none());
    }
}
