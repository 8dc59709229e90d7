use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{FromRow, Row};

use crate::db::models::{CategoryRow, CategoryWithCount, NewCategory};
use crate::error::AppError;

/// Repository trait for category persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by name, with published-article counts.
    async fn find_all(&self) -> Result<Vec<CategoryWithCount>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<CategoryWithCount>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<CategoryWithCount>, AppError>;

    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError>;

    async fn create(&self, category: NewCategory) -> Result<CategoryRow, AppError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Number of articles pointing at the category, drafts included.
    async fn count_referencing_articles(&self, id: i64) -> Result<i64, AppError>;
}

/// Only published articles contribute to `article_count`.
macro_rules! select_category_with_count {
    () => {
        r#"
SELECT c.id, c.name, c.slug, c.description, c.created_at, c.updated_at,
       COUNT(a.id) AS article_count
FROM categories c
LEFT JOIN articles a ON a.category_id = c.id AND a.published = 1
"#
    };
}

const FIND_ALL_SQL: &str = concat!(select_category_with_count!(), "GROUP BY c.id ORDER BY c.name");

const FIND_BY_SLUG_SQL: &str = concat!(
    select_category_with_count!(),
    "WHERE c.slug = ? GROUP BY c.id LIMIT 1"
);

const FIND_BY_ID_SQL: &str = concat!(
    select_category_with_count!(),
    "WHERE c.id = ? GROUP BY c.id LIMIT 1"
);

/// SQLite implementation of the CategoryRepository.
pub struct SqliteCategoryRepository {
    pool: SqlitePool,
}

impl SqliteCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> Result<CategoryWithCount, sqlx::Error> {
        Ok(CategoryWithCount {
            category: CategoryRow::from_row(row)?,
            article_count: row.try_get("article_count")?,
        })
    }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn find_all(&self) -> Result<Vec<CategoryWithCount>, AppError> {
        let rows = sqlx::query(FIND_ALL_SQL).fetch_all(&self.pool).await?;
        Ok(rows
            .iter()
            .map(Self::map_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<CategoryWithCount>, AppError> {
        let row = sqlx::query(FIND_BY_SLUG_SQL)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(Self::map_row).transpose()?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<CategoryWithCount>, AppError> {
        let row = sqlx::query(FIND_BY_ID_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(Self::map_row).transpose()?)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE slug = ? LIMIT 1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn create(&self, category: NewCategory) -> Result<CategoryRow, AppError> {
        let result = sqlx::query(
            "INSERT INTO categories (name, slug, description, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(category.created_at)
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;

        Ok(CategoryRow {
            id: result.last_insert_rowid(),
            name: category.name,
            slug: category.slug,
            description: category.description,
            created_at: category.created_at,
            updated_at: category.created_at,
        })
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_referencing_articles(&self, id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE category_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
