use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqliteRow};
use sqlx::{FromRow, QueryBuilder, Row, Sqlite};

use crate::db::models::{ArticleRow, ArticleUpdate, ArticleWithCategory, CategoryRow, NewArticle};
use crate::error::AppError;

/// Repository trait for article persistence.
///
/// Returns DB-shaped rows; no business rules live here. This trait allows
/// mocking the database layer in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// All articles, newest first, with category and tags.
    async fn find_all(&self) -> Result<Vec<ArticleWithCategory>, AppError>;

    /// Published articles only, newest first.
    async fn find_published(&self) -> Result<Vec<ArticleWithCategory>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ArticleWithCategory>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ArticleWithCategory>, AppError>;

    /// Published articles of one category, most recently published first.
    async fn find_published_by_category_slug(
        &self,
        category_slug: &str,
    ) -> Result<Vec<ArticleWithCategory>, AppError>;

    /// Insert an article and its tags, returning the hydrated row.
    async fn create(&self, article: NewArticle) -> Result<ArticleWithCategory, AppError>;

    /// Overwrite the article's columns. When `tags` is `Some`, the stored tag
    /// set is replaced wholesale. Returns `None` if no article has this id.
    async fn update(
        &self,
        id: i64,
        changes: ArticleUpdate,
        tags: Option<Vec<String>>,
    ) -> Result<Option<ArticleWithCategory>, AppError>;

    /// Hard delete; tag rows go with it. Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Whether another article already uses `slug`, ignoring `exclude_id`.
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, AppError>;
}

/// Article columns joined with the owning category, aliased with a `c_` prefix.
macro_rules! select_article_with_category {
    () => {
        r#"
SELECT a.id, a.title, a.slug, a.excerpt, a.content, a.featured_image, a.published,
       a.published_at, a.category_id, a.author_name, a.author_email, a.reading_time,
       a.created_at, a.updated_at,
       c.id AS c_id, c.name AS c_name, c.slug AS c_slug, c.description AS c_description,
       c.created_at AS c_created_at, c.updated_at AS c_updated_at
FROM articles a
LEFT JOIN categories c ON c.id = a.category_id
"#
    };
}

const FIND_ALL_SQL: &str = concat!(
    select_article_with_category!(),
    "ORDER BY a.created_at DESC, a.id DESC"
);

const FIND_PUBLISHED_SQL: &str = concat!(
    select_article_with_category!(),
    "WHERE a.published = 1 ORDER BY a.created_at DESC, a.id DESC"
);

const FIND_BY_ID_SQL: &str = concat!(select_article_with_category!(), "WHERE a.id = ? LIMIT 1");

const FIND_BY_SLUG_SQL: &str = concat!(select_article_with_category!(), "WHERE a.slug = ? LIMIT 1");

const FIND_BY_CATEGORY_SLUG_SQL: &str = concat!(
    select_article_with_category!(),
    "WHERE c.slug = ? AND a.published = 1 ORDER BY a.published_at DESC, a.id DESC"
);

/// SQLite implementation of the ArticleRepository.
pub struct SqliteArticleRepository {
    pool: SqlitePool,
}

impl SqliteArticleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Split a joined row into the article and its optional category.
    fn map_row(row: &SqliteRow) -> Result<(ArticleRow, Option<CategoryRow>), sqlx::Error> {
        let article = ArticleRow::from_row(row)?;
        let category = match row.try_get::<Option<i64>, _>("c_id")? {
            Some(id) => Some(CategoryRow {
                id,
                name: row.try_get("c_name")?,
                slug: row.try_get("c_slug")?,
                description: row.try_get("c_description")?,
                created_at: row.try_get("c_created_at")?,
                updated_at: row.try_get("c_updated_at")?,
            }),
            None => None,
        };
        Ok((article, category))
    }

    /// Load tag sets for several articles in one query, keyed by article id.
    async fn load_tags(&self, article_ids: &[i64]) -> Result<HashMap<i64, Vec<String>>, AppError> {
        let mut tags: HashMap<i64, Vec<String>> = HashMap::new();
        if article_ids.is_empty() {
            return Ok(tags);
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT article_id, tag FROM article_tags WHERE article_id IN (");
        let mut separated = builder.separated(", ");
        for id in article_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");

        let rows: Vec<(i64, String)> = builder.build_query_as().fetch_all(&self.pool).await?;
        for (article_id, tag) in rows {
            tags.entry(article_id).or_default().push(tag);
        }
        Ok(tags)
    }

    /// Attach tags to a batch of joined rows, preserving row order.
    async fn hydrate(&self, rows: Vec<SqliteRow>) -> Result<Vec<ArticleWithCategory>, AppError> {
        let mapped = rows
            .iter()
            .map(Self::map_row)
            .collect::<Result<Vec<_>, _>>()?;

        let ids: Vec<i64> = mapped.iter().map(|(article, _)| article.id).collect();
        let mut tags = self.load_tags(&ids).await?;

        Ok(mapped
            .into_iter()
            .map(|(article, category)| ArticleWithCategory {
                tags: tags.remove(&article.id).unwrap_or_default(),
                article,
                category,
            })
            .collect())
    }
}

async fn insert_tags(
    conn: &mut SqliteConnection,
    article_id: i64,
    tags: &[String],
) -> Result<(), sqlx::Error> {
    for tag in tags {
        sqlx::query("INSERT INTO article_tags (article_id, tag) VALUES (?, ?)")
            .bind(article_id)
            .bind(tag)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl ArticleRepository for SqliteArticleRepository {
    async fn find_all(&self) -> Result<Vec<ArticleWithCategory>, AppError> {
        let rows = sqlx::query(FIND_ALL_SQL).fetch_all(&self.pool).await?;
        self.hydrate(rows).await
    }

    async fn find_published(&self) -> Result<Vec<ArticleWithCategory>, AppError> {
        let rows = sqlx::query(FIND_PUBLISHED_SQL).fetch_all(&self.pool).await?;
        self.hydrate(rows).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ArticleWithCategory>, AppError> {
        let row = sqlx::query(FIND_BY_ID_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ArticleWithCategory>, AppError> {
        let row = sqlx::query(FIND_BY_SLUG_SQL)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_published_by_category_slug(
        &self,
        category_slug: &str,
    ) -> Result<Vec<ArticleWithCategory>, AppError> {
        let rows = sqlx::query(FIND_BY_CATEGORY_SLUG_SQL)
            .bind(category_slug)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    async fn create(&self, article: NewArticle) -> Result<ArticleWithCategory, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO articles (title, slug, excerpt, content, featured_image, published, \
             published_at, category_id, author_name, author_email, reading_time, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&article.title)
        .bind(&article.slug)
        .bind(&article.excerpt)
        .bind(&article.content)
        .bind(&article.featured_image)
        .bind(article.published)
        .bind(article.published_at)
        .bind(article.category_id)
        .bind(&article.author_name)
        .bind(&article.author_email)
        .bind(article.reading_time)
        .bind(article.created_at)
        .bind(article.created_at)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        insert_tags(&mut *tx, id, &article.tags).await?;
        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database(format!("article {id} missing after insert")))
    }

    async fn update(
        &self,
        id: i64,
        changes: ArticleUpdate,
        tags: Option<Vec<String>>,
    ) -> Result<Option<ArticleWithCategory>, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE articles SET title = ?, slug = ?, excerpt = ?, content = ?, featured_image = ?, \
             published = ?, published_at = ?, category_id = ?, reading_time = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&changes.title)
        .bind(&changes.slug)
        .bind(&changes.excerpt)
        .bind(&changes.content)
        .bind(&changes.featured_image)
        .bind(changes.published)
        .bind(changes.published_at)
        .bind(changes.category_id)
        .bind(changes.reading_time)
        .bind(changes.updated_at)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        if let Some(tags) = tags {
            sqlx::query("DELETE FROM article_tags WHERE article_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_tags(&mut *tx, id, &tags).await?;
        }

        tx.commit().await?;
        self.find_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool, AppError> {
        let found: Option<i64> = match exclude_id {
            Some(exclude_id) => {
                sqlx::query_scalar("SELECT id FROM articles WHERE slug = ? AND id != ? LIMIT 1")
                    .bind(slug)
                    .bind(exclude_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT id FROM articles WHERE slug = ? LIMIT 1")
                    .bind(slug)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };
        Ok(found.is_some())
    }
}
