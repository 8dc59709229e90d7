//! Business rules for articles and categories.
//!
//! Services sit between the HTTP handlers and the repositories: they validate
//! input, derive computed fields (slug, reading time, publication date) and
//! convert rows into API types. Persistence failures are logged here and
//! replaced with a generic message; validation errors pass through untouched.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::articles::mapper;
use crate::articles::pagination::{paginate, ArticlePage};
use crate::articles::text::{is_valid_slug, normalize_tags, reading_time, slugify};
use crate::articles::types::{Article, Category, CategoryWithCount, CreateArticleDto, UpdateArticleDto};
use crate::db::category_repository::CategoryRepository;
use crate::db::models::{ArticleUpdate, NewArticle, NewCategory};
use crate::db::repository::ArticleRepository;
use crate::error::AppError;

const DUPLICATE_ARTICLE_SLUG: &str = "An article with this slug already exists";
const CATEGORY_NOT_FOUND: &str = "Category not found";
const INVALID_SLUG: &str = "Slug must contain only lowercase letters, digits and hyphens";
const DUPLICATE_CATEGORY: &str = "A category with this name already exists";
const CATEGORY_NAME_REQUIRED: &str = "Category name is required";
const CATEGORY_NAME_UNSLUGGABLE: &str = "Category name must contain letters or digits";
const RESERVED_SLUG: &str = "This slug is reserved";

/// Slugs that collide with fixed routes under `/api/articles/`.
const RESERVED_ARTICLE_SLUGS: &[&str] = &["search"];
const CATEGORY_IN_USE: &str = "Cannot delete a category that still has articles";

/// Keep validation errors, log everything else and hide it behind `message`.
fn user_facing(err: AppError, message: &str) -> AppError {
    if err.is_validation() {
        return err;
    }
    tracing::error!(error = %err, "{message}");
    AppError::Internal(message.to_string())
}

/// A unique violation on the slug column loses the race against a concurrent
/// writer; report it the same way as the up-front check.
fn slug_conflict(err: AppError, message: &str) -> AppError {
    match err {
        AppError::Conflict(_) => AppError::Conflict(DUPLICATE_ARTICLE_SLUG.to_string()),
        other => user_facing(other, message),
    }
}

fn require(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_article_slug(slug: &str) -> Result<(), AppError> {
    if !is_valid_slug(slug) {
        return Err(AppError::BadRequest(INVALID_SLUG.to_string()));
    }
    if RESERVED_ARTICLE_SLUGS.contains(&slug) {
        return Err(AppError::BadRequest(RESERVED_SLUG.to_string()));
    }
    Ok(())
}

/// The publication date is written once, the first time an article is
/// published, and kept through any later unpublish/republish.
pub fn resolve_published_at(
    existing: Option<DateTime<Utc>>,
    published: bool,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match existing {
        Some(at) => Some(at),
        None if published => Some(now),
        None => None,
    }
}

#[derive(Clone)]
pub struct ArticleService {
    articles: Arc<dyn ArticleRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl ArticleService {
    pub fn new(articles: Arc<dyn ArticleRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self {
            articles,
            categories,
        }
    }

    /// Every article, drafts included, newest first.
    pub async fn get_all(&self) -> Result<Vec<Article>, AppError> {
        let rows = self
            .articles
            .find_all()
            .await
            .map_err(|e| user_facing(e, "Failed to fetch articles"))?;
        Ok(mapper::to_articles(rows))
    }

    /// Published articles, newest first.
    pub async fn get_published(&self) -> Result<Vec<Article>, AppError> {
        let rows = self
            .articles
            .find_published()
            .await
            .map_err(|e| user_facing(e, "Failed to fetch published articles"))?;
        Ok(mapper::to_articles(rows))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Article>, AppError> {
        let row = self
            .articles
            .find_by_id(id)
            .await
            .map_err(|e| user_facing(e, "Failed to fetch article"))?;
        Ok(row.map(mapper::to_article))
    }

    /// Lookup by slug regardless of publication state. Public callers must
    /// check `published` themselves.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>, AppError> {
        let row = self
            .articles
            .find_by_slug(slug)
            .await
            .map_err(|e| user_facing(e, "Failed to fetch article"))?;
        Ok(row.map(mapper::to_article))
    }

    pub async fn get_by_category_slug(&self, slug: &str) -> Result<Vec<Article>, AppError> {
        let rows = self
            .articles
            .find_published_by_category_slug(slug)
            .await
            .map_err(|e| user_facing(e, "Failed to fetch articles by category"))?;
        Ok(mapper::to_articles(rows))
    }

    /// Published articles whose title, excerpt, content or one of the tags
    /// contains `query`, ignoring case. A blank query matches nothing.
    pub async fn search(&self, query: &str) -> Result<Vec<Article>, AppError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let matches = |article: &Article| {
            article.title.to_lowercase().contains(&needle)
                || article.excerpt.to_lowercase().contains(&needle)
                || article.content.to_lowercase().contains(&needle)
                || article
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&needle))
        };

        let articles = self.get_published().await?;
        Ok(articles.into_iter().filter(|a| matches(a)).collect())
    }

    pub async fn get_published_page(
        &self,
        page: usize,
        page_size: usize,
        category_slug: Option<&str>,
    ) -> Result<ArticlePage, AppError> {
        let articles = self.get_published().await?;
        Ok(paginate(articles, page, page_size, category_slug))
    }

    /// `false` when the lookup itself fails; the failure is logged.
    pub async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> bool {
        match self.articles.slug_exists(slug, exclude_id).await {
            Ok(exists) => exists,
            Err(err) => {
                tracing::error!(error = %err, slug, "Failed to check article slug");
                false
            }
        }
    }

    async fn ensure_category_exists(&self, category_id: i64) -> Result<(), AppError> {
        let category = self
            .categories
            .find_by_id(category_id)
            .await
            .map_err(|e| user_facing(e, "Failed to fetch category"))?;
        match category {
            Some(_) => Ok(()),
            None => Err(AppError::BadRequest(CATEGORY_NOT_FOUND.to_string())),
        }
    }

    async fn ensure_slug_free(&self, slug: &str, exclude_id: Option<i64>) -> Result<(), AppError> {
        let taken = self
            .articles
            .slug_exists(slug, exclude_id)
            .await
            .map_err(|e| user_facing(e, "Failed to check article slug"))?;
        if taken {
            return Err(AppError::Conflict(DUPLICATE_ARTICLE_SLUG.to_string()));
        }
        Ok(())
    }

    pub async fn create(&self, dto: CreateArticleDto) -> Result<Article, AppError> {
        let title = require(&dto.title, "Title")?;
        let excerpt = require(&dto.excerpt, "Excerpt")?;
        let content = require(&dto.content, "Content")?;

        let slug = match dto.slug.trim() {
            "" => slugify(&title),
            explicit => explicit.to_string(),
        };
        check_article_slug(&slug)?;

        if let Some(category_id) = dto.category_id {
            self.ensure_category_exists(category_id).await?;
        }
        self.ensure_slug_free(&slug, None).await?;

        let now = Utc::now();
        let new_article = NewArticle {
            reading_time: reading_time(&content),
            title,
            slug,
            excerpt,
            content,
            featured_image: blank_to_none(dto.featured_image),
            published: dto.published,
            published_at: resolve_published_at(None, dto.published, now),
            category_id: dto.category_id,
            author_name: dto.author_name,
            author_email: dto.author_email,
            tags: normalize_tags(dto.tags),
            created_at: now,
        };

        let row = self
            .articles
            .create(new_article)
            .await
            .map_err(|e| slug_conflict(e, "Failed to create article"))?;

        tracing::info!(article_id = row.article.id, slug = %row.article.slug, "Article created");
        Ok(mapper::to_article(row))
    }

    /// Apply a partial update. Returns `Ok(None)` when no article has `id`.
    pub async fn update(&self, id: i64, dto: UpdateArticleDto) -> Result<Option<Article>, AppError> {
        let Some(current) = self
            .articles
            .find_by_id(id)
            .await
            .map_err(|e| user_facing(e, "Failed to fetch article"))?
        else {
            return Ok(None);
        };
        let current = current.article;

        let title = match dto.title {
            Some(title) => require(&title, "Title")?,
            None => current.title,
        };
        let excerpt = match dto.excerpt {
            Some(excerpt) => require(&excerpt, "Excerpt")?,
            None => current.excerpt,
        };

        let slug = match dto.slug {
            Some(slug) => {
                let slug = slug.trim().to_string();
                check_article_slug(&slug)?;
                slug
            }
            None => current.slug.clone(),
        };
        if slug != current.slug {
            self.ensure_slug_free(&slug, Some(id)).await?;
        }

        let category_id = match dto.category_id {
            Some(Some(category_id)) => {
                if current.category_id != Some(category_id) {
                    self.ensure_category_exists(category_id).await?;
                }
                Some(category_id)
            }
            Some(None) => None,
            None => current.category_id,
        };

        let (content, minutes) = match dto.content {
            Some(content) => {
                let content = require(&content, "Content")?;
                let minutes = reading_time(&content);
                (content, minutes)
            }
            None => (current.content, current.reading_time),
        };

        let now = Utc::now();
        let published = dto.published.unwrap_or(current.published);
        let changes = ArticleUpdate {
            title,
            slug,
            excerpt,
            content,
            featured_image: match dto.featured_image {
                Some(image) => blank_to_none(image),
                None => current.featured_image,
            },
            published,
            published_at: resolve_published_at(current.published_at, published, now),
            category_id,
            reading_time: minutes,
            updated_at: now,
        };

        let row = self
            .articles
            .update(id, changes, dto.tags.map(normalize_tags))
            .await
            .map_err(|e| slug_conflict(e, "Failed to update article"))?;

        if let Some(row) = &row {
            tracing::info!(article_id = row.article.id, "Article updated");
        }
        Ok(row.map(mapper::to_article))
    }

    /// Publish or unpublish. Returns `Ok(None)` when no article has `id`.
    pub async fn set_published(&self, id: i64, published: bool) -> Result<Option<Article>, AppError> {
        self.update(
            id,
            UpdateArticleDto {
                published: Some(published),
                ..Default::default()
            },
        )
        .await
    }

    /// Returns whether an article was removed.
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let deleted = self
            .articles
            .delete(id)
            .await
            .map_err(|e| user_facing(e, "Failed to delete article"))?;
        if deleted {
            tracing::info!(article_id = id, "Article deleted");
        }
        Ok(deleted)
    }
}

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    pub async fn get_all(&self) -> Result<Vec<CategoryWithCount>, AppError> {
        let rows = self
            .categories
            .find_all()
            .await
            .map_err(|e| user_facing(e, "Failed to fetch categories"))?;
        Ok(rows.iter().map(mapper::to_category_with_count).collect())
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<CategoryWithCount>, AppError> {
        let row = self
            .categories
            .find_by_slug(slug)
            .await
            .map_err(|e| user_facing(e, "Failed to fetch category"))?;
        Ok(row.as_ref().map(mapper::to_category_with_count))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<CategoryWithCount>, AppError> {
        let row = self
            .categories
            .find_by_id(id)
            .await
            .map_err(|e| user_facing(e, "Failed to fetch category"))?;
        Ok(row.as_ref().map(mapper::to_category_with_count))
    }

    /// Create a category whose slug is derived from `name`.
    pub async fn create(&self, name: &str, description: Option<&str>) -> Result<Category, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest(CATEGORY_NAME_REQUIRED.to_string()));
        }
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(AppError::BadRequest(CATEGORY_NAME_UNSLUGGABLE.to_string()));
        }

        let exists = self
            .categories
            .slug_exists(&slug)
            .await
            .map_err(|e| user_facing(e, "Failed to check category slug"))?;
        if exists {
            return Err(AppError::Conflict(DUPLICATE_CATEGORY.to_string()));
        }

        let row = self
            .categories
            .create(NewCategory {
                name: name.to_string(),
                slug,
                description: blank_to_none(description.map(str::to_string)),
                created_at: Utc::now(),
            })
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => AppError::Conflict(DUPLICATE_CATEGORY.to_string()),
                other => user_facing(other, "Failed to create category"),
            })?;

        tracing::info!(category_id = row.id, slug = %row.slug, "Category created");
        Ok(mapper::to_category(&row))
    }

    /// Refused while any article, draft or published, still references it.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let found = self
            .categories
            .find_by_id(id)
            .await
            .map_err(|e| user_facing(e, "Failed to fetch category"))?;
        if found.is_none() {
            return Err(AppError::NotFound(CATEGORY_NOT_FOUND.to_string()));
        }

        let referencing = self
            .categories
            .count_referencing_articles(id)
            .await
            .map_err(|e| user_facing(e, "Failed to delete category"))?;
        if referencing > 0 {
            return Err(AppError::Conflict(CATEGORY_IN_USE.to_string()));
        }

        let deleted = self
            .categories
            .delete(id)
            .await
            .map_err(|e| user_facing(e, "Failed to delete category"))?;
        if !deleted {
            return Err(AppError::NotFound(CATEGORY_NOT_FOUND.to_string()));
        }

        tracing::info!(category_id = id, "Category deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::category_repository::{MockCategoryRepository, SqliteCategoryRepository};
    use crate::db::models::{ArticleRow, ArticleWithCategory, CategoryRow, CategoryWithCount as CategoryCountRow};
    use crate::db::repository::{MockArticleRepository, SqliteArticleRepository};
    use crate::db::schema;
    use chrono::{Duration, TimeZone};

    fn row_from_new(id: i64, new: NewArticle) -> ArticleWithCategory {
        ArticleWithCategory {
            article: ArticleRow {
                id,
                title: new.title,
                slug: new.slug,
                excerpt: new.excerpt,
                content: new.content,
                featured_image: new.featured_image,
                published: new.published,
                published_at: new.published_at,
                category_id: new.category_id,
                author_name: new.author_name,
                author_email: new.author_email,
                reading_time: new.reading_time,
                created_at: new.created_at,
                updated_at: new.created_at,
            },
            category: None,
            tags: new.tags,
        }
    }

    fn stored_article(id: i64, published_at: Option<DateTime<Utc>>) -> ArticleWithCategory {
        let created = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        ArticleWithCategory {
            article: ArticleRow {
                id,
                title: "Stored".to_string(),
                slug: "stored".to_string(),
                excerpt: "Excerpt".to_string(),
                content: "Body".to_string(),
                featured_image: None,
                published: published_at.is_some(),
                published_at,
                category_id: None,
                author_name: "Author".to_string(),
                author_email: "author@example.com".to_string(),
                reading_time: 1,
                created_at: created,
                updated_at: created,
            },
            category: None,
            tags: vec![],
        }
    }

    fn category_row(id: i64) -> CategoryCountRow {
        let now = Utc::now();
        CategoryCountRow {
            category: CategoryRow {
                id,
                name: "DevOps".to_string(),
                slug: "devops".to_string(),
                description: None,
                created_at: now,
                updated_at: now,
            },
            article_count: 0,
        }
    }

    fn create_dto(title: &str) -> CreateArticleDto {
        CreateArticleDto {
            title: title.to_string(),
            excerpt: "Short".to_string(),
            content: "a".repeat(1300),
            author_name: "Author".to_string(),
            author_email: "author@example.com".to_string(),
            ..Default::default()
        }
    }

    fn service(articles: MockArticleRepository, categories: MockCategoryRepository) -> ArticleService {
        ArticleService::new(Arc::new(articles), Arc::new(categories))
    }

    #[test]
    fn test_resolve_published_at() {
        let first = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = first + Duration::days(30);

        assert_eq!(resolve_published_at(None, false, later), None);
        assert_eq!(resolve_published_at(None, true, later), Some(later));
        assert_eq!(resolve_published_at(Some(first), true, later), Some(first));
        assert_eq!(resolve_published_at(Some(first), false, later), Some(first));
    }

    #[tokio::test]
    async fn test_create_derives_fields() {
        let mut articles = MockArticleRepository::new();
        articles
            .expect_slug_exists()
            .withf(|slug, exclude| slug == "deployer-avec-docker" && exclude.is_none())
            .returning(|_, _| Ok(false));
        articles
            .expect_create()
            .withf(|new| {
                new.published
                    && new.published_at.is_some()
                    && new.reading_time == 3
                    && new.tags == vec!["Docker".to_string(), "CI".to_string()]
                    && new.featured_image.is_none()
            })
            .times(1)
            .returning(|new| Ok(row_from_new(1, new)));

        let svc = service(articles, MockCategoryRepository::new());
        let mut dto = create_dto("Déployer avec Docker");
        dto.published = true;
        dto.featured_image = Some("  ".to_string());
        dto.tags = vec!["Docker".into(), "CI".into(), "docker".into(), "".into()];

        let article = svc.create(dto).await.unwrap();
        assert_eq!(article.slug, "deployer-avec-docker");
        assert!(article.published_at.is_some());
        assert_eq!(article.reading_time, 3);
    }

    #[tokio::test]
    async fn test_create_rejects_taken_slug() {
        let mut articles = MockArticleRepository::new();
        articles.expect_slug_exists().returning(|_, _| Ok(true));
        articles.expect_create().never();

        let svc = service(articles, MockCategoryRepository::new());
        let err = svc.create(create_dto("Taken")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg == DUPLICATE_ARTICLE_SLUG));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_category() {
        let mut categories = MockCategoryRepository::new();
        categories.expect_find_by_id().returning(|_| Ok(None));
        let mut articles = MockArticleRepository::new();
        articles.expect_create().never();

        let svc = service(articles, categories);
        let mut dto = create_dto("Orphan");
        dto.category_id = Some(99);
        let err = svc.create(dto).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == CATEGORY_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let svc = service(MockArticleRepository::new(), MockCategoryRepository::new());

        let err = svc.create(create_dto("   ")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let mut dto = create_dto("Fine");
        dto.slug = "Not A Slug".to_string();
        let err = svc.create(dto).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == INVALID_SLUG));
    }

    #[tokio::test]
    async fn test_reserved_slugs_are_refused() {
        let mut articles = MockArticleRepository::new();
        articles
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored_article(id, None))));
        articles.expect_create().never();
        articles.expect_update().never();

        let svc = service(articles, MockCategoryRepository::new());

        let err = svc.create(create_dto("Search")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == RESERVED_SLUG));

        let update = UpdateArticleDto {
            slug: Some("search".to_string()),
            ..Default::default()
        };
        let err = svc.update(1, update).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == RESERVED_SLUG));
    }

    #[tokio::test]
    async fn test_persistence_failure_is_hidden() {
        let mut articles = MockArticleRepository::new();
        articles
            .expect_find_all()
            .returning(|| Err(AppError::Database("disk I/O error at /var/lib".to_string())));

        let svc = service(articles, MockCategoryRepository::new());
        let err = svc.get_all().await.unwrap_err();
        match err {
            AppError::Internal(msg) => {
                assert_eq!(msg, "Failed to fetch articles");
                assert!(!msg.contains("/var/lib"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slug_exists_is_false_on_failure() {
        let mut articles = MockArticleRepository::new();
        articles
            .expect_slug_exists()
            .returning(|_, _| Err(AppError::Database("locked".to_string())));

        let svc = service(articles, MockCategoryRepository::new());
        assert!(!svc.slug_exists("anything", None).await);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let mut articles = MockArticleRepository::new();
        articles.expect_find_by_id().returning(|_| Ok(None));
        articles.expect_update().never();

        let svc = service(articles, MockCategoryRepository::new());
        let result = svc.update(42, UpdateArticleDto::default()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_republish_keeps_original_date() {
        let first = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let mut articles = MockArticleRepository::new();
        articles
            .expect_find_by_id()
            .returning(move |id| Ok(Some(stored_article(id, Some(first)))));
        articles
            .expect_update()
            .withf(move |_, changes, tags| {
                changes.published && changes.published_at == Some(first) && tags.is_none()
            })
            .times(1)
            .returning(move |id, _, _| Ok(Some(stored_article(id, Some(first)))));

        let svc = service(articles, MockCategoryRepository::new());
        let article = svc.set_published(5, true).await.unwrap().unwrap();
        assert_eq!(article.published_at.as_deref(), Some("2024-01-15T10:00:00.000Z"));
    }

    #[tokio::test]
    async fn test_category_delete_rules() {
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_by_id()
            .returning(|id| Ok((id != 404).then(|| category_row(id))));
        categories
            .expect_count_referencing_articles()
            .returning(|id| Ok(if id == 1 { 2 } else { 0 }));
        categories.expect_delete().times(1).returning(|_| Ok(true));

        let svc = CategoryService::new(Arc::new(categories));

        let err = svc.delete(404).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = svc.delete(1).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg == CATEGORY_IN_USE));

        svc.delete(2).await.unwrap();
    }

    #[tokio::test]
    async fn test_category_create_validation() {
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_slug_exists()
            .returning(|slug| Ok(slug == "devops"));
        categories.expect_create().never();

        let svc = CategoryService::new(Arc::new(categories));

        let err = svc.create("  ", None).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == CATEGORY_NAME_REQUIRED));

        let err = svc.create("DevOps", None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg == DUPLICATE_CATEGORY));

        let err = svc.create("!!!", None).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == CATEGORY_NAME_UNSLUGGABLE));
    }

    async fn sqlite_services() -> (ArticleService, CategoryService) {
        let pool = schema::connect("sqlite::memory:", 1).await.unwrap();
        schema::migrate(&pool).await.unwrap();
        let articles: Arc<dyn ArticleRepository> = Arc::new(SqliteArticleRepository::new(pool.clone()));
        let categories: Arc<dyn CategoryRepository> = Arc::new(SqliteCategoryRepository::new(pool));
        (
            ArticleService::new(articles, categories.clone()),
            CategoryService::new(categories),
        )
    }

    #[tokio::test]
    async fn test_publication_lifecycle() {
        let (articles, _) = sqlite_services().await;

        let draft = articles.create(create_dto("Lifecycle")).await.unwrap();
        assert!(!draft.published);
        assert!(draft.published_at.is_none());

        let published = articles.set_published(draft.id, true).await.unwrap().unwrap();
        let first_date = published.published_at.clone();
        assert!(first_date.is_some());

        let hidden = articles.set_published(draft.id, false).await.unwrap().unwrap();
        assert!(!hidden.published);
        assert_eq!(hidden.published_at, first_date);

        let again = articles.set_published(draft.id, true).await.unwrap().unwrap();
        assert_eq!(again.published_at, first_date);
    }

    #[tokio::test]
    async fn test_update_recomputes_reading_time_and_replaces_tags() {
        let (articles, _) = sqlite_services().await;
        let mut dto = create_dto("Tags");
        dto.tags = vec!["Rust".into(), "SQL".into()];
        let created = articles.create(dto).await.unwrap();
        assert_eq!(created.reading_time, 3);

        let updated = articles
            .update(
                created.id,
                UpdateArticleDto {
                    content: Some("short".to_string()),
                    tags: Some(vec!["Axum".into()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.reading_time, 1);
        assert_eq!(updated.tags, vec!["Axum"]);
        assert_eq!(updated.title, "Tags");
    }

    #[tokio::test]
    async fn test_update_slug_uniqueness_excludes_self() {
        let (articles, _) = sqlite_services().await;
        let first = articles.create(create_dto("First")).await.unwrap();
        let second = articles.create(create_dto("Second")).await.unwrap();

        let same = articles
            .update(
                first.id,
                UpdateArticleDto {
                    slug: Some("first".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(same.is_some());

        let err = articles
            .update(
                second.id,
                UpdateArticleDto {
                    slug: Some("first".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(msg) if msg == DUPLICATE_ARTICLE_SLUG));
    }

    #[tokio::test]
    async fn test_category_counts_and_search() {
        let (articles, categories) = sqlite_services().await;
        let dev = categories.create("Développement", Some("Code")).await.unwrap();
        assert_eq!(dev.slug, "developpement");

        let mut dto = create_dto("Architecture hexagonale");
        dto.category_id = Some(dev.id);
        dto.published = true;
        dto.tags = vec!["Clean Code".into()];
        articles.create(dto).await.unwrap();

        let mut draft = create_dto("Brouillon");
        draft.category_id = Some(dev.id);
        articles.create(draft).await.unwrap();

        let with_count = categories.get_by_slug("developpement").await.unwrap().unwrap();
        assert_eq!(with_count.article_count, 1);

        let found = articles.search("clean code").await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(articles.search("brouillon").await.unwrap().is_empty());
        assert!(articles.search("   ").await.unwrap().is_empty());

        let by_category = articles.get_by_category_slug("developpement").await.unwrap();
        assert_eq!(by_category.len(), 1);
    }
}
