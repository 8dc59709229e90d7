use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::{Json, Router};
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::{admin_articles, articles, categories};
use crate::articles::service::{ArticleService, CategoryService};
use crate::auth::admin::AdminAllowList;
use crate::auth::demo_auth::{self, DEMO_ADMIN_EMAIL};
use crate::config::{AppConfig, AuthorConfig, IdentityConfig};
use crate::db::category_repository::{CategoryRepository, SqliteCategoryRepository};
use crate::db::repository::{ArticleRepository, SqliteArticleRepository};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub articles: ArticleService,
    pub categories: CategoryService,
    pub admins: Arc<AdminAllowList>,
    pub identity: IdentityConfig,
    /// Recorded as the author of articles created through the admin API.
    pub author: AuthorConfig,
    /// Default page size of the public listing.
    pub page_size: usize,
    pub demo_mode: bool,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &AppConfig) -> Self {
        let article_repo: Arc<dyn ArticleRepository> =
            Arc::new(SqliteArticleRepository::new(pool.clone()));
        let category_repo: Arc<dyn CategoryRepository> =
            Arc::new(SqliteCategoryRepository::new(pool));

        let mut admins = AdminAllowList::from_config(&config.admin);
        if config.demo_mode {
            admins = admins.with_email(DEMO_ADMIN_EMAIL);
        }
        if admins.is_empty() {
            tracing::warn!("Admin allow-list is empty, admin routes will refuse every caller");
        }

        Self {
            articles: ArticleService::new(article_repo, category_repo.clone()),
            categories: CategoryService::new(category_repo),
            admins: Arc::new(admins),
            identity: config.identity.clone(),
            author: config.author.clone(),
            page_size: config.blog.page_size,
            demo_mode: config.demo_mode,
        }
    }
}

/// Build the HTTP router. Demo login routes are only mounted in demo mode.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({ "status": "ok" })) }))
        // Public
        .route("/api/articles", get(articles::list_handler))
        .route("/api/articles/search", get(articles::search_handler))
        .route("/api/articles/{slug}", get(articles::get_handler))
        .route("/api/articles/{slug}/html", get(articles::html_handler))
        .route("/api/categories", get(categories::list_handler))
        .route("/api/categories/{slug}", get(categories::get_handler))
        .route("/api/categories/{slug}/articles", get(categories::articles_handler))
        // Admin
        .route(
            "/api/admin/articles",
            get(admin_articles::list_handler).post(admin_articles::create_handler),
        )
        .route(
            "/api/admin/articles/{id}",
            get(admin_articles::get_handler)
                .put(admin_articles::update_handler)
                .delete(admin_articles::delete_handler),
        )
        .route(
            "/api/admin/articles/{id}/publish",
            patch(admin_articles::publish_handler),
        )
        .route(
            "/api/admin/categories",
            get(categories::admin_list_handler).post(categories::create_handler),
        )
        .route(
            "/api/admin/categories/{id}",
            axum::routing::delete(categories::delete_handler),
        );

    if state.demo_mode {
        app = app
            .route("/api/auth/login", post(demo_auth::login_handler))
            .route("/api/auth/me", get(demo_auth::me_handler))
            .route("/api/auth/logout", post(demo_auth::logout_handler));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
    .with_state(state)
}
