//! API-stable shapes handed to HTTP consumers.
//!
//! Dates are ISO-8601 strings and absent values are explicit `null`s, so the
//! JSON contract does not depend on how rows are stored.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Category plus the number of published articles in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub article_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: String,
    pub featured_image: Option<String>,
    pub published: bool,
    pub published_at: Option<String>,
    pub author_name: String,
    pub author_email: String,
    /// Minutes.
    pub reading_time: i64,
    pub created_at: String,
    pub updated_at: String,
    pub category: Option<Category>,
    pub category_id: Option<i64>,
    pub tags: Vec<String>,
}

/// Input for [`ArticleService::create`](crate::articles::service::ArticleService::create).
#[derive(Debug, Clone, Default)]
pub struct CreateArticleDto {
    pub title: String,
    /// Derived from the title when blank.
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub published: bool,
    pub category_id: Option<i64>,
    pub tags: Vec<String>,
    pub author_name: String,
    pub author_email: String,
}

/// Partial update. `None` leaves a field unchanged; for the nullable
/// columns `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleDto {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub featured_image: Option<Option<String>>,
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i64>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Distinguishes a missing field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
