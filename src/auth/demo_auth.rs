use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::{CookieJar, WithRejection};
use serde::{Deserialize, Serialize};

use crate::auth::identity::{MaybeUser, DEMO_COOKIE};
use crate::auth::models::AuthenticatedUser;
use crate::error::AppError;

/// Built-in demo user definition.
#[derive(Debug, Clone)]
struct DemoUser {
    username: &'static str,
    password: &'static str,
    email: &'static str,
}

/// Email of the demo administrator. Added to the allow-list in demo mode.
pub const DEMO_ADMIN_EMAIL: &str = "admin@demo.folio.dev";

/// The hard-coded demo users available when `demo_mode` is on.
const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        username: "admin",
        password: "admin",
        email: DEMO_ADMIN_EMAIL,
    },
    DemoUser {
        username: "reader",
        password: "reader",
        email: "reader@demo.folio.dev",
    },
];

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: AuthenticatedUser,
}

/// Validate demo credentials and return the corresponding user.
pub fn authenticate_demo_user(username: &str, password: &str) -> Result<AuthenticatedUser, AppError> {
    DEMO_USERS
        .iter()
        .find(|u| u.username == username && u.password == password)
        .map(|u| AuthenticatedUser::new(format!("demo-{}", u.username), Some(u.email.to_string())))
        .ok_or_else(|| AppError::Auth("Invalid username or password".into()))
}

/// `POST /api/auth/login`
///
/// Sets the `folio_demo_user` cookie on success.
pub async fn login_handler(
    jar: CookieJar,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let user = authenticate_demo_user(&req.username, &req.password)?;

    let user_json = serde_json::to_string(&user)
        .map_err(|e| AppError::Internal(format!("Failed to serialize user: {e}")))?;

    let cookie = Cookie::build((DEMO_COOKIE, user_json))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(7))
        .build();

    tracing::info!(user_id = %user.user_id, "Demo login");

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user,
        }),
    ))
}

/// `GET /api/auth/me`
///
/// Reports whoever the server recognizes, demo session or proxy headers.
pub async fn me_handler(MaybeUser(user): MaybeUser) -> Result<Json<AuthenticatedUser>, AppError> {
    user.map(Json)
        .ok_or_else(|| AppError::Auth("Not logged in".into()))
}

/// `POST /api/auth/logout`
pub async fn logout_handler(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    let cookie = Cookie::build((DEMO_COOKIE, "")).path("/").removal().build();
    (
        jar.remove(cookie),
        Json(serde_json::json!({ "message": "Logged out" })),
    )
}
