//! Blog catalog queries against a local content directory.

use std::io::Write;
use std::path::Path;

use clap::Subcommand;
use maxfood_core::{Locale, SearchQuery};
use maxfood_storefront::content::ContentStore;

use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum BlogAction {
    /// Search posts in one locale
    Search {
        /// Content root containing `blog/<locale>/`
        #[arg(long, env = "STOREFRONT_CONTENT_DIR", default_value = "crates/storefront/content")]
        content_dir: std::path::PathBuf,

        /// Free-text query over title, excerpt and tags
        #[arg(long)]
        query: Option<String>,

        /// Exact category
        #[arg(long)]
        category: Option<String>,
    },
}

/// Run a blog action for `locale`, writing one line per post to `out`.
///
/// # Errors
///
/// Returns an error if the content cannot be loaded or output fails.
pub fn run(action: BlogAction, locale: Locale, out: &mut impl Write) -> Result<(), CliError> {
    match action {
        BlogAction::Search {
            content_dir,
            query,
            category,
        } => search(&content_dir, locale, query, category, out),
    }
}

fn search(
    content_dir: &Path,
    locale: Locale,
    text: Option<String>,
    category: Option<String>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let store = ContentStore::load(content_dir)?;

    let mut query = SearchQuery::all(locale).with_text(text.unwrap_or_default());
    if let Some(category) = category {
        query = query.with_category(category);
    }

    let results = store.catalog().search(&query);
    if results.is_empty() {
        writeln!(out, "No posts found")?;
        return Ok(());
    }

    for post in results {
        let marker = if post.is_featured { '*' } else { ' ' };
        writeln!(
            out,
            "{} {marker} {:<40} {} ({} min)",
            post.published_at, post.slug, post.title, post.reading_time_minutes
        )?;
    }
    Ok(())
}
