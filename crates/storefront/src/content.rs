//! Content loading for markdown blog posts.
//!
//! Posts live under `<content_dir>/blog/<locale>/*.md`, one directory per
//! supported locale. Each file starts with YAML frontmatter:
//!
//! ```markdown
//! ---
//! title: Sustainable Food Production
//! author: Anna Svensson
//! published_at: 2025-10-28
//! category: Sustainability
//! tags: [sustainability, environment]
//! featured: false
//! ---
//!
//! # Sustainable Food Production
//! ...
//! ```
//!
//! Files are parsed once at startup into a read-only [`Catalog`].

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use maxfood_core::catalog::{excerpt_from, reading_time_minutes};
use maxfood_core::{Catalog, CatalogError, ContentItem, Locale, PostId};
use regex::Regex;
use serde::Deserialize;

/// Maximum excerpt length when the frontmatter does not provide one.
const EXCERPT_LENGTH: usize = 160;

/// Matches a leading `YYYY-MM-DD-` date prefix in a filename.
static DATE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}-").expect("Invalid regex"));

/// Frontmatter metadata for blog posts
#[derive(Debug, Clone, Deserialize)]
pub struct PostMeta {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub published_at: NaiveDate,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub draft: bool,
}

/// Content store that holds the loaded catalog in memory
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    catalog: Arc<Catalog>,
}

impl ContentStore {
    /// Wrap an already-built catalog.
    #[must_use]
    pub fn from_catalog(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    /// Load all blog posts from the filesystem.
    ///
    /// Files that cannot be read or parsed are logged and skipped. A missing
    /// directory is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be listed or two posts share a
    /// slug within a locale.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let blog_dir = content_dir.join("blog");
        let mut posts = Vec::new();

        for locale in Locale::ALL {
            posts.extend(Self::load_locale(&blog_dir.join(locale.as_str()), locale)?);
        }

        let catalog = Catalog::new(posts)?;
        tracing::info!(posts = catalog.len(), "Content catalog loaded");
        Ok(Self::from_catalog(catalog))
    }

    /// Load every post for one locale, sorted by filename for a stable order.
    fn load_locale(dir: &Path, locale: Locale) -> Result<Vec<ContentItem>, ContentError> {
        if !dir.exists() {
            tracing::debug!(?dir, %locale, "Blog directory does not exist");
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| ContentError::Io(e.to_string()))?;
        let mut paths: Vec<_> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
            .collect();
        paths.sort();

        let mut posts = Vec::with_capacity(paths.len());
        for path in paths {
            match Self::load_post(&path, locale) {
                Ok(Some(post)) => {
                    tracing::info!(slug = %post.slug, %locale, "Loaded post");
                    posts.push(post);
                }
                Ok(None) => tracing::debug!(?path, "Skipping draft"),
                Err(e) => tracing::error!("Failed to load post {:?}: {}", path, e),
            }
        }

        Ok(posts)
    }

    /// Load a single blog post from a markdown file. Drafts yield `None`.
    fn load_post(path: &Path, locale: Locale) -> Result<Option<ContentItem>, ContentError> {
        let content = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

        let filename = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?;

        parse_post(filename, &content, locale)
    }

    /// The loaded catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

/// Slugs taken by static routes under `/api/{locale}/blog/`.
const RESERVED_SLUGS: [&str; 1] = ["categories"];

/// Parse a post from its filename stem and file contents.
///
/// # Errors
///
/// Returns [`ContentError::Parse`] if the slug is empty or reserved, or the
/// frontmatter is missing or invalid.
pub fn parse_post(
    filename: &str,
    content: &str,
    locale: Locale,
) -> Result<Option<ContentItem>, ContentError> {
    // "2025-01-15-my-post" -> "my-post"
    let slug = DATE_PREFIX_RE.replace(filename, "").into_owned();
    if slug.is_empty() {
        return Err(ContentError::Parse(format!("Empty slug for {filename}")));
    }
    if RESERVED_SLUGS.contains(&slug.as_str()) {
        return Err(ContentError::Parse(format!("Reserved slug '{slug}'")));
    }

    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PostMeta> = matter
        .parse(content)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

    if meta.draft {
        return Ok(None);
    }

    let excerpt = meta
        .excerpt
        .unwrap_or_else(|| excerpt_from(&parsed.content, EXCERPT_LENGTH));
    let id = meta
        .id
        .unwrap_or_else(|| format!("{}/{slug}", locale.as_str()));

    Ok(Some(ContentItem {
        id: PostId::new(id),
        slug,
        title: meta.title,
        excerpt,
        body: render_markdown(&parsed.content),
        author: meta.author.unwrap_or_default(),
        published_at: meta.published_at,
        updated_at: meta.updated_at,
        category: meta.category,
        tags: meta.tags.into_iter().collect::<BTreeSet<_>>(),
        locale,
        is_featured: meta.featured,
        image: meta.image,
        reading_time_minutes: reading_time_minutes(&parsed.content),
    }))
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    // Enable GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.header_ids = Some(String::new());
    options.extension.footnotes = true;

    markdown_to_html(content, &options)
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const POST: &str = "---\n\
title: The Importance of Food Quality\n\
author: Johan Romberg\n\
published_at: 2025-11-01\n\
category: Quality\n\
tags: [quality, iso]\n\
featured: true\n\
---\n\
\n\
# The Importance of Food Quality\n\
\n\
Food quality is **paramount** in modern manufacturing.\n";

    #[test]
    fn test_parse_post_strips_date_prefix() {
        let post = parse_post("2025-11-01-food-quality", POST, Locale::En)
            .unwrap()
            .unwrap();
        assert_eq!(post.slug, "food-quality");
        assert_eq!(post.id.as_str(), "en/food-quality");
        assert_eq!(post.locale, Locale::En);
        assert!(post.is_featured);
        assert!(post.tags.contains("iso"));
    }

    #[test]
    fn test_parse_post_derives_excerpt() {
        let post = parse_post("food-quality", POST, Locale::En).unwrap().unwrap();
        assert!(post.excerpt.starts_with("The Importance of Food Quality"));
        assert!(!post.excerpt.contains('*'));
    }

    #[test]
    fn test_parse_post_renders_markdown() {
        let post = parse_post("food-quality", POST, Locale::En).unwrap().unwrap();
        assert!(post.body.contains("<strong>paramount</strong>"));
    }

    #[test]
    fn test_draft_is_skipped() {
        let draft = POST.replace("featured: true", "featured: true\ndraft: true");
        assert!(parse_post("food-quality", &draft, Locale::En).unwrap().is_none());
    }

    #[test]
    fn test_reserved_slug_is_error() {
        assert!(matches!(
            parse_post("2025-11-01-categories", POST, Locale::En),
            Err(ContentError::Parse(msg)) if msg.contains("categories")
        ));
    }

    #[test]
    fn test_missing_frontmatter_is_error() {
        assert!(matches!(
            parse_post("plain", "# Just markdown", Locale::En),
            Err(ContentError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentStore::load(dir.path()).unwrap();
        assert!(store.catalog().is_empty());
    }

    #[test]
    fn test_load_reads_locale_directories() {
        let dir = tempfile::tempdir().unwrap();
        let en = dir.path().join("blog/en");
        let sv = dir.path().join("blog/sv");
        std::fs::create_dir_all(&en).unwrap();
        std::fs::create_dir_all(&sv).unwrap();
        std::fs::write(en.join("2025-11-01-food-quality.md"), POST).unwrap();
        std::fs::write(sv.join("food-quality.md"), POST).unwrap();
        std::fs::write(en.join("notes.txt"), "ignored").unwrap();
        std::fs::write(en.join("broken.md"), "no frontmatter").unwrap();

        let store = ContentStore::load(dir.path()).unwrap();
        assert_eq!(store.catalog().len(), 2);
        assert!(store.catalog().get(Locale::Sv, "food-quality").is_some());
    }

    #[test]
    fn test_load_duplicate_slug_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let en = dir.path().join("blog/en");
        std::fs::create_dir_all(&en).unwrap();
        std::fs::write(en.join("2025-11-01-food-quality.md"), POST).unwrap();
        std::fs::write(en.join("food-quality.md"), POST).unwrap();

        assert!(matches!(
            ContentStore::load(dir.path()),
            Err(ContentError::Catalog(_))
        ));
    }
}
