//! Category routes, public and admin.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::api::errors::parse_id;
use crate::app::AppState;
use crate::articles::types::{Article, Category, CategoryWithCount};
use crate::auth::identity::AdminUser;
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct CategoryList {
    pub categories: Vec<CategoryWithCount>,
}

#[derive(Debug, Serialize)]
pub struct CategoryArticles {
    pub category: CategoryWithCount,
    pub articles: Vec<Article>,
}

/// Body of `POST /api/admin/categories`.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
}

async fn find_by_slug(state: &AppState, slug: &str) -> Result<CategoryWithCount, AppError> {
    state
        .categories
        .get_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))
}

/// `GET /api/categories`
pub async fn list_handler(State(state): State<AppState>) -> Result<Json<CategoryList>, AppError> {
    let categories = state.categories.get_all().await?;
    Ok(Json(CategoryList { categories }))
}

/// `GET /api/categories/{slug}`
pub async fn get_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryWithCount>, AppError> {
    Ok(Json(find_by_slug(&state, &slug).await?))
}

/// `GET /api/categories/{slug}/articles`
pub async fn articles_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryArticles>, AppError> {
    let category = find_by_slug(&state, &slug).await?;
    let articles = state.articles.get_by_category_slug(&slug).await?;
    Ok(Json(CategoryArticles { category, articles }))
}

/// `GET /api/admin/categories`
pub async fn admin_list_handler(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<CategoryList>, AppError> {
    list_handler(State(state)).await
}

/// `POST /api/admin/categories`
pub async fn create_handler(
    _admin: AdminUser,
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<CreateCategoryRequest>, AppError>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = state
        .categories
        .create(&req.name, req.description.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `DELETE /api/admin/categories/{id}`
pub async fn delete_handler(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_id(&id, "Invalid category ID")?;
    state.categories.delete(id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
