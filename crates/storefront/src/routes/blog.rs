//! Blog API handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::header::CACHE_CONTROL,
    response::IntoResponse,
};
use chrono::NaiveDate;
use maxfood_core::{ContentItem, Locale, SearchQuery};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Number of related posts returned with a post.
const RELATED_POSTS_COUNT: usize = 3;

/// Number of recent posts returned with a post.
const RECENT_POSTS_COUNT: usize = 3;

/// Blog content changes only on deploy.
const BLOG_CACHE_CONTROL: &str = "public, max-age=300";

/// Query parameters for the blog listing.
#[derive(Debug, Default, Deserialize)]
pub struct BlogQuery {
    /// Free-text search over title, excerpt and tags.
    #[serde(default)]
    pub q: Option<String>,
    /// Exact category filter.
    #[serde(default)]
    pub category: Option<String>,
}

/// Post listing entry, without the rendered body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub author: String,
    pub published_at: NaiveDate,
    pub category: String,
    pub tags: Vec<String>,
    pub is_featured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub reading_time_minutes: u32,
}

impl From<&ContentItem> for PostSummary {
    fn from(post: &ContentItem) -> Self {
        Self {
            id: post.id.to_string(),
            slug: post.slug.clone(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            author: post.author.clone(),
            published_at: post.published_at,
            category: post.category.clone(),
            tags: post.tags.iter().cloned().collect(),
            is_featured: post.is_featured,
            image: post.image.clone(),
            reading_time_minutes: post.reading_time_minutes,
        }
    }
}

/// Listing response.
#[derive(Debug, Serialize)]
pub struct PostList {
    pub locale: Locale,
    pub count: usize,
    pub posts: Vec<PostSummary>,
}

/// Full post with rendered HTML and related posts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub body_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDate>,
    pub canonical_url: String,
    pub related: Vec<PostSummary>,
    pub recent: Vec<PostSummary>,
}

/// Categories and tags in use for a locale.
#[derive(Debug, Serialize)]
pub struct CategoryList {
    pub locale: Locale,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

/// List or search posts for a locale.
///
/// # Errors
///
/// Returns 404 for an unsupported locale.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Path(locale): Path<String>,
    Query(query): Query<BlogQuery>,
) -> Result<impl IntoResponse> {
    let locale: Locale = locale.parse()?;

    let mut search = SearchQuery::all(locale).with_text(query.q.unwrap_or_default());
    if let Some(category) = query.category.filter(|c| !c.trim().is_empty()) {
        search = search.with_category(category);
    }

    let posts: Vec<PostSummary> = state
        .catalog()
        .search(&search)
        .into_iter()
        .map(PostSummary::from)
        .collect();

    tracing::debug!(%locale, results = posts.len(), "Blog search");

    Ok((
        [(CACHE_CONTROL, BLOG_CACHE_CONTROL)],
        Json(PostList {
            locale,
            count: posts.len(),
            posts,
        }),
    ))
}

/// Distinct categories and tags used by posts in a locale.
///
/// # Errors
///
/// Returns 404 for an unsupported locale.
#[instrument(skip(state))]
pub async fn categories(
    State(state): State<AppState>,
    Path(locale): Path<String>,
) -> Result<impl IntoResponse> {
    let locale: Locale = locale.parse()?;
    let catalog = state.catalog();

    Ok((
        [(CACHE_CONTROL, BLOG_CACHE_CONTROL)],
        Json(CategoryList {
            locale,
            categories: catalog.categories(locale).into_iter().map(String::from).collect(),
            tags: catalog.tags(locale).into_iter().map(String::from).collect(),
        }),
    ))
}

/// A single post by slug, with related posts.
///
/// # Errors
///
/// Returns 404 if the locale is unsupported or the post doesn't exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path((locale, slug)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let locale: Locale = locale.parse()?;
    let catalog = state.catalog();

    let post = catalog
        .get(locale, &slug)
        .ok_or_else(|| AppError::NotFound(format!("post '{slug}'")))?;

    let related = catalog
        .related(post, RELATED_POSTS_COUNT)
        .into_iter()
        .map(PostSummary::from)
        .collect();

    let recent = catalog
        .recent(locale, RECENT_POSTS_COUNT, Some(&post.slug))
        .into_iter()
        .map(PostSummary::from)
        .collect();

    let canonical_url = state
        .config()
        .page_url(&format!("{locale}/blog/{}", post.slug))
        .map_err(|e| AppError::Internal(format!("canonical url: {e}")))?
        .to_string();

    Ok((
        [(CACHE_CONTROL, BLOG_CACHE_CONTROL)],
        Json(PostDetail {
            summary: PostSummary::from(post),
            body_html: post.body.clone(),
            updated_at: post.updated_at,
            canonical_url,
            related,
            recent,
        }),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use url::Url;

    use crate::routes::test_support::{get_json, test_app, test_config, test_state_with};

    #[tokio::test]
    async fn test_index_lists_featured_first() {
        let (status, json) = get_json(test_app(), "/api/en/blog").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 3);
        assert_eq!(json["posts"][0]["slug"], "food-quality");
        assert_eq!(json["posts"][1]["slug"], "sustainable-production");
    }

    #[tokio::test]
    async fn test_index_filters_by_text_and_category() {
        let (_, json) = get_json(test_app(), "/api/en/blog?q=SUSTAIN").await;
        assert_eq!(json["count"], 1);
        assert_eq!(json["posts"][0]["slug"], "sustainable-production");

        let (_, json) = get_json(test_app(), "/api/en/blog?category=Innovation").await;
        assert_eq!(json["count"], 1);
        assert_eq!(json["posts"][0]["slug"], "innovation");
    }

    #[tokio::test]
    async fn test_index_scoped_to_locale() {
        let (_, json) = get_json(test_app(), "/api/sv/blog").await;
        assert_eq!(json["count"], 1);
        assert_eq!(json["locale"], "sv");
    }

    #[tokio::test]
    async fn test_unknown_locale_is_not_found() {
        let (status, _) = get_json(test_app(), "/api/xx/blog").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_show_includes_related_and_canonical() {
        let (status, json) = get_json(test_app(), "/api/en/blog/food-quality").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["title"], "The Importance of Food Quality");
        assert_eq!(
            json["canonicalUrl"],
            "https://maxfood.test/en/blog/food-quality"
        );
        assert!(json["bodyHtml"].as_str().unwrap().contains("<p>"));
        let related = json["related"].as_array().unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0]["slug"], "innovation");
        assert!(related[0].get("bodyHtml").is_none());
        assert_eq!(json["recent"][0]["slug"], "sustainable-production");
    }

    #[tokio::test]
    async fn test_canonical_url_keeps_base_path() {
        let mut config = test_config();
        config.base_url = Url::parse("https://maxfood.se/shop").unwrap();
        let app = crate::app(test_state_with(config));

        let (status, json) = get_json(app, "/api/en/blog/food-quality").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["canonicalUrl"], "https://maxfood.se/shop/en/blog/food-quality");
    }

    #[tokio::test]
    async fn test_show_missing_post() {
        let (status, json) = get_json(test_app(), "/api/en/blog/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_categories() {
        let (_, json) = get_json(test_app(), "/api/en/blog/categories").await;
        assert_eq!(
            json["categories"],
            serde_json::json!(["Innovation", "Quality", "Sustainability"])
        );
        assert!(json["tags"].as_array().unwrap().contains(&"iso".into()));
    }
}
