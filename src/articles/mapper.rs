//! Pure conversions from database rows to API types.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::articles::types::{Article, Category, CategoryWithCount};
use crate::db::models::{ArticleWithCategory, CategoryRow, CategoryWithCount as DbCategoryWithCount};

/// `2024-01-15T10:00:00.000Z`
pub fn to_iso(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn to_category(row: &CategoryRow) -> Category {
    Category {
        id: row.id,
        name: row.name.clone(),
        slug: row.slug.clone(),
        description: row.description.clone(),
        created_at: to_iso(&row.created_at),
        updated_at: to_iso(&row.updated_at),
    }
}

pub fn to_category_with_count(row: &DbCategoryWithCount) -> CategoryWithCount {
    CategoryWithCount {
        category: to_category(&row.category),
        article_count: row.article_count,
    }
}

pub fn to_article(row: ArticleWithCategory) -> Article {
    let ArticleWithCategory {
        article,
        category,
        tags,
    } = row;

    Article {
        id: article.id,
        title: article.title,
        slug: article.slug,
        content: article.content,
        excerpt: article.excerpt,
        featured_image: article.featured_image,
        published: article.published,
        published_at: article.published_at.as_ref().map(to_iso),
        author_name: article.author_name,
        author_email: article.author_email,
        reading_time: article.reading_time,
        created_at: to_iso(&article.created_at),
        updated_at: to_iso(&article.updated_at),
        category: category.as_ref().map(to_category),
        category_id: article.category_id,
        tags,
    }
}

pub fn to_articles(rows: Vec<ArticleWithCategory>) -> Vec<Article> {
    rows.into_iter().map(to_article).collect()
}
