use std::collections::HashMap;

use serde::Deserialize;
use sqlx::SqlitePool;

use crate::app::AppState;
use crate::articles::text::slugify;
use crate::articles::types::CreateArticleDto;
use crate::db::schema;
use crate::error::AppError;

/// Embedded into the binary so `folio seed` works from any directory.
const SEED_YAML: &str = include_str!("../demo_data/seed.yaml");

#[derive(Debug, Deserialize)]
struct SeedData {
    categories: Vec<SeedCategory>,
    articles: Vec<SeedArticle>,
}

#[derive(Debug, Deserialize)]
struct SeedCategory {
    name: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeedArticle {
    title: String,
    slug: Option<String>,
    excerpt: String,
    content: String,
    /// Category slug.
    category: Option<String>,
    #[serde(default)]
    published: bool,
    featured_image: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub categories_created: usize,
    pub articles_created: usize,
    pub skipped: usize,
}

fn load_fixture() -> Result<SeedData, AppError> {
    serde_yaml::from_str(SEED_YAML)
        .map_err(|e| AppError::Internal(format!("Invalid seed fixture: {e}")))
}

/// Delete all articles, tags and categories.
pub async fn reset(pool: &SqlitePool) -> Result<(), AppError> {
    tracing::warn!("Wiping all articles and categories before seeding");
    schema::truncate(pool).await
}

/// Load the demo categories and articles through the services.
///
/// Entries whose slug already exists are left alone, so running it twice is
/// harmless.
pub async fn seed_demo_data(state: &AppState) -> Result<SeedReport, AppError> {
    tracing::info!("Starting demo data seeding...");

    let data = load_fixture()?;
    let mut report = SeedReport::default();
    let mut category_ids: HashMap<String, i64> = HashMap::new();

    for seed in data.categories {
        let slug = slugify(&seed.name);
        if let Some(existing) = state.categories.get_by_slug(&slug).await? {
            tracing::info!("Category '{}' already exists, skipping.", slug);
            category_ids.insert(slug, existing.category.id);
            report.skipped += 1;
            continue;
        }

        let created = state
            .categories
            .create(&seed.name, seed.description.as_deref())
            .await?;
        category_ids.insert(created.slug, created.id);
        report.categories_created += 1;
    }

    for seed in data.articles {
        let slug = seed.slug.unwrap_or_else(|| slugify(&seed.title));
        if state.articles.get_by_slug(&slug).await?.is_some() {
            tracing::info!("Article '{}' already exists, skipping.", slug);
            report.skipped += 1;
            continue;
        }

        let category_id = match seed.category.as_deref() {
            Some(category) => Some(*category_ids.get(category).ok_or_else(|| {
                AppError::Internal(format!("Seed article '{slug}' references unknown category '{category}'"))
            })?),
            None => None,
        };

        state
            .articles
            .create(CreateArticleDto {
                title: seed.title,
                slug,
                excerpt: seed.excerpt,
                content: seed.content,
                featured_image: seed.featured_image,
                published: seed.published,
                category_id,
                tags: seed.tags,
                author_name: state.author.name.clone(),
                author_email: state.author.email.clone(),
            })
            .await?;
        report.articles_created += 1;
    }

    tracing::info!(
        categories = report.categories_created,
        articles = report.articles_created,
        skipped = report.skipped,
        "Demo data seeding complete"
    );
    Ok(report)
}
