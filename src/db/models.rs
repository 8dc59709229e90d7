use chrono::{DateTime, Utc};

/// A row of the `categories` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category together with the number of published articles referencing it.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWithCount {
    pub category: CategoryRow,
    pub article_count: i64,
}

/// A row of the `articles` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ArticleRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub category_id: Option<i64>,
    pub author_name: String,
    pub author_email: String,
    pub reading_time: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An article hydrated with its category and tag set.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleWithCategory {
    pub article: ArticleRow,
    pub category: Option<CategoryRow>,
    pub tags: Vec<String>,
}

/// Values for a new `articles` row plus its tags.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub category_id: Option<i64>,
    pub author_name: String,
    pub author_email: String,
    pub reading_time: i64,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// The full set of mutable columns written by an update.
///
/// The service resolves a partial request against the stored row, so the
/// repository always writes every column.
#[derive(Debug, Clone)]
pub struct ArticleUpdate {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub category_id: Option<i64>,
    pub reading_time: i64,
    pub updated_at: DateTime<Utc>,
}

/// Values for a new `categories` row.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
