use serde::Serialize;

use crate::articles::types::Article;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 6;

/// Upper bound on a requested page size.
pub const MAX_PAGE_SIZE: usize = 50;

/// One window of the public article listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    pub total_pages: usize,
    pub current_page: usize,
    pub total_articles: usize,
    pub page_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_by_category: Option<String>,
}

/// Filter `articles` by exact category slug, then cut out page `page` (1-based).
///
/// `page` is clamped to at least 1 and `page_size` to `1..=MAX_PAGE_SIZE`.
/// Input order is kept.
pub fn paginate(
    articles: Vec<Article>,
    page: usize,
    page_size: usize,
    category_slug: Option<&str>,
) -> ArticlePage {
    let page = page.max(1);
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);

    let filtered: Vec<Article> = match category_slug {
        Some(slug) => articles
            .into_iter()
            .filter(|article| {
                article
                    .category
                    .as_ref()
                    .is_some_and(|category| category.slug == slug)
            })
            .collect(),
        None => articles,
    };

    let total_articles = filtered.len();
    let total_pages = total_articles.div_ceil(page_size);
    let start = (page - 1).saturating_mul(page_size);

    ArticlePage {
        articles: filtered.into_iter().skip(start).take(page_size).collect(),
        total_pages,
        current_page: page,
        total_articles,
        page_size,
        filtered_by_category: category_slug.map(str::to_string),
    }
}
