#![allow(dead_code)]

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use axum_test::{TestRequest, TestResponse, TestServer};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use folio::app::{router, AppState};
use folio::config::{
    AdminConfig, AppConfig, AuthorConfig, BlogConfig, DatabaseConfig, IdentityConfig, ServerConfig,
};
use folio::db::schema;

pub const ADMIN_ID: &str = "user_admin";
pub const ADMIN_EMAIL: &str = "owner@folio.dev";
pub const READER_ID: &str = "user_reader";

const USER_ID_HEADER: &str = "x-auth-user-id";
const EMAIL_HEADER: &str = "x-auth-user-email";

/// Configuration used by every integration test: trusted proxy headers, one
/// admin by id and one by email, demo routes enabled.
pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        admin: AdminConfig {
            user_ids: vec![ADMIN_ID.to_string()],
            emails: vec![ADMIN_EMAIL.to_string()],
        },
        identity: IdentityConfig {
            trusted_headers: true,
            user_id_header: USER_ID_HEADER.to_string(),
            email_header: EMAIL_HEADER.to_string(),
        },
        author: AuthorConfig {
            name: "Site Owner".to_string(),
            email: "owner@folio.dev".to_string(),
        },
        blog: BlogConfig { page_size: 6 },
        demo_mode: true,
    }
}

/// A router wired to a fresh in-memory database.
///
/// The database lives as long as the pool, i.e. as long as this struct.
pub struct TestEnv {
    pub pool: SqlitePool,
    pub state: AppState,
    pub router: Router,
}

impl TestEnv {
    pub async fn start() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let pool = schema::connect(&config.database.url, config.database.max_connections)
            .await
            .expect("Failed to open in-memory database");
        schema::migrate(&pool)
            .await
            .expect("Failed to apply schema");

        let state = AppState::new(pool.clone(), &config);
        let router = router(state.clone());

        Self {
            pool,
            state,
            router,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> TestServer {
        TestServer::builder()
            .save_cookies()
            .expect_success_by_default()
            .try_build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> TestServer {
        TestServer::builder()
            .save_cookies()
            .try_build(self.router.clone())
            .expect("Failed to build TestServer")
    }
}

fn with_identity(request: TestRequest, user_id: &'static str, email: Option<&'static str>) -> TestRequest {
    let request = request.add_header(
        HeaderName::from_static(USER_ID_HEADER),
        HeaderValue::from_static(user_id),
    );
    match email {
        Some(email) => request.add_header(
            HeaderName::from_static(EMAIL_HEADER),
            HeaderValue::from_static(email),
        ),
        None => request,
    }
}

/// Send the request as the configured administrator.
pub fn as_admin(request: TestRequest) -> TestRequest {
    with_identity(request, ADMIN_ID, None)
}

/// Send the request as a signed-in user who is not an administrator.
pub fn as_reader(request: TestRequest) -> TestRequest {
    with_identity(request, READER_ID, Some("reader@example.com"))
}

/// Create a category through the admin API and return its JSON.
pub async fn create_category(server: &TestServer, name: &str) -> Value {
    as_admin(server.post("/api/admin/categories"))
        .json(&json!({ "name": name, "description": format!("All about {name}") }))
        .expect_success()
        .await
        .json()
}

/// Minimal valid article body; `extra` fields are merged over it.
pub fn article_body(title: &str, extra: Value) -> Value {
    let mut body = json!({
        "title": title,
        "excerpt": format!("Excerpt of {title}"),
        "content": format!("# {title}\n\nSome **markdown** body."),
    });
    if let (Some(base), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        for (key, value) in extra {
            base.insert(key.clone(), value.clone());
        }
    }
    body
}

/// Create an article through the admin API.
pub async fn create_article(server: &TestServer, title: &str, extra: Value) -> TestResponse {
    as_admin(server.post("/api/admin/articles"))
        .json(&article_body(title, extra))
        .await
}
