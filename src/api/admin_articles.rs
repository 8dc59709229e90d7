//! Article management. Every handler takes [`AdminUser`], so the caller is
//! checked before any data is read.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::api::articles::ArticleList;
use crate::api::errors::parse_id;
use crate::app::AppState;
use crate::articles::types::{Article, CreateArticleDto, UpdateArticleDto};
use crate::auth::identity::AdminUser;
use crate::error::AppError;

const INVALID_ARTICLE_ID: &str = "Invalid article ID";

fn not_found() -> AppError {
    AppError::NotFound("Article not found".into())
}

/// Body of `POST /api/admin/articles`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    /// Absent or `null` means draft.
    pub published: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub published: bool,
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    #[serde(flatten)]
    pub article: Article,
    pub message: String,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// `GET /api/admin/articles`
pub async fn list_handler(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<ArticleList>, AppError> {
    let articles = state.articles.get_all().await?;
    Ok(Json(ArticleList { articles }))
}

/// `POST /api/admin/articles`
///
/// The author is the site owner from configuration, not the caller.
pub async fn create_handler(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<CreateArticleRequest>, AppError>,
) -> Result<(StatusCode, Json<Article>), AppError> {
    if !(present(&req.title) && present(&req.excerpt) && present(&req.content)) {
        return Err(AppError::BadRequest("Missing required fields".into()));
    }

    let dto = CreateArticleDto {
        title: req.title.unwrap_or_default(),
        slug: req.slug.unwrap_or_default(),
        excerpt: req.excerpt.unwrap_or_default(),
        content: req.content.unwrap_or_default(),
        featured_image: req.featured_image,
        published: req.published.unwrap_or(false),
        category_id: req.category_id,
        tags: req.tags,
        author_name: state.author.name.clone(),
        author_email: state.author.email.clone(),
    };

    let article = state.articles.create(dto).await?;
    tracing::debug!(user_id = %admin.user_id, article_id = article.id, "Article created via admin API");
    Ok((StatusCode::CREATED, Json(article)))
}

/// `GET /api/admin/articles/{id}`
pub async fn get_handler(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Article>, AppError> {
    let id = parse_id(&id, INVALID_ARTICLE_ID)?;
    let article = state.articles.get_by_id(id).await?.ok_or_else(not_found)?;
    Ok(Json(article))
}

/// `PUT /api/admin/articles/{id}`
pub async fn update_handler(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(update), _): WithRejection<Json<UpdateArticleDto>, AppError>,
) -> Result<Json<Article>, AppError> {
    let id = parse_id(&id, INVALID_ARTICLE_ID)?;
    let article = state.articles.update(id, update).await?.ok_or_else(not_found)?;
    Ok(Json(article))
}

/// `DELETE /api/admin/articles/{id}`
pub async fn delete_handler(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id, INVALID_ARTICLE_ID)?;
    if !state.articles.delete(id).await? {
        return Err(not_found());
    }
    Ok(Json(serde_json::json!({ "message": "Article deleted successfully" })))
}

/// `PATCH /api/admin/articles/{id}/publish`
pub async fn publish_handler(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<PublishRequest>, AppError>,
) -> Result<Json<PublishResponse>, AppError> {
    let id = parse_id(&id, INVALID_ARTICLE_ID)?;
    let article = state
        .articles
        .set_published(id, req.published)
        .await?
        .ok_or_else(not_found)?;

    let message = if req.published {
        "Article published"
    } else {
        "Article unpublished"
    };
    Ok(Json(PublishResponse {
        article,
        message: message.to_string(),
    }))
}
