//! Read-only catalog of blog posts with search and filtering.
//!
//! Posts come from static content compiled or loaded at startup and are
//! partitioned by [`Locale`]. Nothing here mutates a post once the catalog is
//! built.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Locale, PostId};

/// Words per minute used for reading time estimates.
const WORDS_PER_MINUTE: usize = 200;

/// Catalog construction errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two posts in the same locale share a slug.
    #[error("duplicate slug '{slug}' in locale {locale}")]
    DuplicateSlug { locale: Locale, slug: String },
}

/// A published blog post scoped to one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: PostId,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    /// Rendered post body.
    pub body: String,
    pub author: String,
    pub published_at: NaiveDate,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
    pub category: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub locale: Locale,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub image: Option<String>,
    pub reading_time_minutes: u32,
}

impl ContentItem {
    /// Case-insensitive substring match against title, excerpt, and tags.
    ///
    /// `needle` must already be lowercased.
    fn matches_text(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.excerpt.to_lowercase().contains(needle)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle))
    }
}

/// Parameters for [`Catalog::search`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free text. Empty or whitespace-only matches every post.
    #[serde(default)]
    pub text: String,
    pub locale: Locale,
    /// Exact category name to restrict to.
    #[serde(default)]
    pub category: Option<String>,
}

impl SearchQuery {
    /// Every post in `locale`.
    #[must_use]
    pub const fn all(locale: Locale) -> Self {
        Self {
            text: String::new(),
            locale,
            category: None,
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// The locale-partitioned post collection.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<ContentItem>,
}

impl Catalog {
    /// Build a catalog, keeping the given order as the tie-break order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateSlug`] if two posts in one locale
    /// share a slug.
    pub fn new(items: Vec<ContentItem>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert((item.locale, item.slug.as_str())) {
                return Err(CatalogError::DuplicateSlug {
                    locale: item.locale,
                    slug: item.slug.clone(),
                });
            }
        }
        Ok(Self { items })
    }

    /// Number of posts across all locales.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn in_locale(&self, locale: Locale) -> impl Iterator<Item = &ContentItem> {
        self.items.iter().filter(move |item| item.locale == locale)
    }

    /// Posts matching `query`, featured first, then newest first.
    ///
    /// Posts that tie keep catalog order. No matches is an empty result.
    #[must_use]
    pub fn search(&self, query: &SearchQuery) -> Vec<&ContentItem> {
        let needle = query.text.trim().to_lowercase();
        let category = query.category.as_deref();

        let mut results: Vec<&ContentItem> = self
            .in_locale(query.locale)
            .filter(|item| category.is_none_or(|c| item.category == c))
            .filter(|item| needle.is_empty() || item.matches_text(&needle))
            .collect();

        // sort_by_key is stable
        results.sort_by_key(|item| (Reverse(item.is_featured), Reverse(item.published_at)));
        results
    }

    /// Find a post by locale and slug.
    #[must_use]
    pub fn get(&self, locale: Locale, slug: &str) -> Option<&ContentItem> {
        self.in_locale(locale).find(|item| item.slug == slug)
    }

    /// Distinct categories used in `locale`, sorted.
    #[must_use]
    pub fn categories(&self, locale: Locale) -> Vec<&str> {
        self.in_locale(locale)
            .map(|item| item.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct tags used in `locale`, sorted.
    #[must_use]
    pub fn tags(&self, locale: Locale) -> Vec<&str> {
        self.in_locale(locale)
            .flat_map(|item| item.tags.iter().map(String::as_str))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Other posts in the same locale sharing the category or a tag.
    #[must_use]
    pub fn related(&self, post: &ContentItem, limit: usize) -> Vec<&ContentItem> {
        self.in_locale(post.locale)
            .filter(|other| other.id != post.id)
            .filter(|other| {
                other.category == post.category || !other.tags.is_disjoint(&post.tags)
            })
            .take(limit)
            .collect()
    }

    /// Newest posts in `locale`, optionally excluding one slug.
    #[must_use]
    pub fn recent(
        &self,
        locale: Locale,
        limit: usize,
        exclude_slug: Option<&str>,
    ) -> Vec<&ContentItem> {
        let mut posts: Vec<&ContentItem> = self
            .in_locale(locale)
            .filter(|item| exclude_slug.is_none_or(|slug| item.slug != slug))
            .collect();
        posts.sort_by_key(|item| Reverse(item.published_at));
        posts.truncate(limit);
        posts
    }
}

/// Estimated reading time in whole minutes, never less than one.
#[must_use]
pub fn reading_time_minutes(body: &str) -> u32 {
    let words = body.split_whitespace().count();
    u32::try_from(words.div_ceil(WORDS_PER_MINUTE))
        .unwrap_or(u32::MAX)
        .max(1)
}

/// Plain-text excerpt of a markdown body.
///
/// Markdown markers (`#`, `*`, `` ` ``) are stripped. Longer text is cut at
/// `max_chars` characters and suffixed with `...`.
#[must_use]
pub fn excerpt_from(body: &str, max_chars: usize) -> String {
    let plain: String = body
        .chars()
        .filter(|c| !matches!(c, '#' | '*' | '`'))
        .collect();
    let plain = plain.split_whitespace().collect::<Vec<_>>().join(" ");

    if plain.chars().count() <= max_chars {
        return plain;
    }

    let truncated: String = plain.chars().take(max_chars).collect();
    format!("{}...", truncated.trim_end())
}
