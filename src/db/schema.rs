use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::AppError;

const CREATE_TABLE_CATEGORIES_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    description TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

const CREATE_TABLE_ARTICLES_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    excerpt TEXT NOT NULL,
    content TEXT NOT NULL,
    featured_image TEXT,
    published BOOLEAN NOT NULL DEFAULT 0,
    published_at TEXT,
    category_id INTEGER REFERENCES categories(id),
    author_name TEXT NOT NULL,
    author_email TEXT NOT NULL,
    reading_time INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

const CREATE_TABLE_ARTICLE_TAGS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS article_tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id INTEGER NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
    tag TEXT NOT NULL
);
"#;

const CREATE_INDEXES_SQL: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_articles_published ON articles(published)",
    "CREATE INDEX IF NOT EXISTS idx_articles_category_id ON articles(category_id)",
    "CREATE INDEX IF NOT EXISTS idx_article_tags_article_id ON article_tags(article_id)",
];

/// Open a connection pool with foreign keys enforced.
///
/// An in-memory database lives as long as its connection, so `:memory:` URLs
/// get a single connection that is never recycled.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let in_memory = url.contains(":memory:");
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(max_connections.max(1))
    };

    Ok(pool_options.connect_with(options).await?)
}

/// Create the tables and indexes if they do not exist yet.
pub async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(CREATE_TABLE_CATEGORIES_SQL).execute(pool).await?;
    sqlx::query(CREATE_TABLE_ARTICLES_SQL).execute(pool).await?;
    sqlx::query(CREATE_TABLE_ARTICLE_TAGS_SQL).execute(pool).await?;
    for statement in CREATE_INDEXES_SQL {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!("database schema is up to date");
    Ok(())
}

/// Remove every row, children first.
pub async fn truncate(pool: &SqlitePool) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM article_tags").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM articles").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM categories").execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(())
}
