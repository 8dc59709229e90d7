//! Public, read-only article routes. Drafts are never visible here.

use axum::extract::{Path, Query, State};
use axum::response::Html;
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::articles::pagination::ArticlePage;
use crate::articles::types::Article;
use crate::error::AppError;
use crate::rendering::markdown::render_markdown;

/// Query string of `GET /api/articles`.
///
/// Values are kept as strings so that garbage falls back to the defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, serde::Serialize)]
pub struct ArticleList {
    pub articles: Vec<Article>,
}

fn parse_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

async fn find_published(state: &AppState, slug: &str) -> Result<Article, AppError> {
    state
        .articles
        .get_by_slug(slug)
        .await?
        .filter(|article| article.published)
        .ok_or_else(|| AppError::NotFound("Article not found".into()))
}

/// `GET /api/articles?page=&pageSize=&category=`
pub async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ArticlePage>, AppError> {
    let page = parse_or(query.page.as_deref(), 1);
    let page_size = parse_or(query.page_size.as_deref(), state.page_size);
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|slug| !slug.is_empty());

    let page = state
        .articles
        .get_published_page(page, page_size, category)
        .await?;
    Ok(Json(page))
}

/// `GET /api/articles/search?q=`
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ArticleList>, AppError> {
    let articles = state.articles.search(&query.q).await?;
    Ok(Json(ArticleList { articles }))
}

/// `GET /api/articles/{slug}`
pub async fn get_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Article>, AppError> {
    Ok(Json(find_published(&state, &slug).await?))
}

/// `GET /api/articles/{slug}/html`
pub async fn html_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Html<String>, AppError> {
    let article = find_published(&state, &slug).await?;
    Ok(Html(render_markdown(&article.content)))
}
