//! Integration tests for MaxFood.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p maxfood-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart store behaviour across persistence backends
//! - `catalog_search` - Search, filtering and content loading
//! - `storefront_api` - HTTP API driven through the router
//!
//! Nothing here needs a network or database: the storefront router is driven
//! in-process and content lives in a temporary directory.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::path::Path;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use maxfood_core::CartItem;
use maxfood_storefront::{config::StorefrontConfig, content::ContentStore, state::AppState};
use rust_decimal::Decimal;
use tempfile::TempDir;
use tower::ServiceExt;
use url::Url;

/// A storefront wired to a temporary content directory.
pub struct TestContext {
    pub content_dir: TempDir,
    pub app: Router,
}

impl TestContext {
    /// Build a storefront serving the standard fixture posts.
    #[must_use]
    pub fn new() -> Self {
        let content_dir = fixture_content();
        let content = ContentStore::load(content_dir.path()).unwrap();
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: Url::parse("https://www.maxfood.se/").unwrap(),
            content_dir: content_dir.path().to_path_buf(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let app = maxfood_storefront::app(AppState::new(config, content));
        Self { content_dir, app }
    }

    /// Send a GET request and decode the JSON body (`Null` if not JSON).
    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    /// Send a JSON POST request and decode the JSON body.
    pub async fn post(
        &self,
        uri: &str,
        body: &serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::post(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Write one markdown post under `<root>/blog/<locale>/<file_name>`.
pub fn write_post(root: &Path, locale: &str, file_name: &str, frontmatter: &str, body: &str) {
    let dir = root.join("blog").join(locale);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(file_name), format!("---\n{frontmatter}\n---\n\n{body}\n")).unwrap();
}

/// Content directory with English, Swedish and Spanish posts, plus a draft
/// and a malformed file that loading must skip.
#[must_use]
pub fn fixture_content() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write_post(
        root,
        "en",
        "2025-11-01-the-importance-of-food-quality.md",
        "title: The Importance of Food Quality in Modern Manufacturing\n\
         excerpt: Why quality standards matter for consumer health.\n\
         author: Johan Romberg\npublished_at: 2025-11-01\ncategory: Quality\n\
         tags: [quality, manufacturing, standards, iso]\nfeatured: true",
        "# The Importance of Food Quality\n\nFood quality is paramount.",
    );
    write_post(
        root,
        "en",
        "2025-10-28-sustainable-food-production.md",
        "title: \"Sustainable Food Production: Our Journey\"\n\
         author: Anna Svensson\npublished_at: 2025-10-28\ncategory: Sustainability\n\
         tags: [sustainability, environment, green]",
        "# Sustainable Food Production\n\n- Renewable energy\n- Waste reduction",
    );
    write_post(
        root,
        "en",
        "2025-10-15-innovation-in-beverage-technology.md",
        "title: Innovation in Beverage Technology\n\
         author: Marcus Bergström\npublished_at: 2025-10-15\ncategory: Innovation\n\
         tags: [innovation, technology, beverages, rd]\nfeatured: true",
        "# Innovation in Beverage Technology\n\nCold brew extraction and more.",
    );
    write_post(
        root,
        "en",
        "2025-12-01-winter-range.md",
        "title: Winter Range\npublished_at: 2025-12-01\ncategory: News\ndraft: true",
        "Coming soon.",
    );
    write_post(
        root,
        "sv",
        "2025-11-01-vikten-av-livsmedelskvalitet.md",
        "title: Vikten av livsmedelskvalitet\nauthor: Johan Romberg\n\
         published_at: 2025-11-01\ncategory: Kvalitet\ntags: [kvalitet, iso]",
        "Livsmedelskvalitet är avgörande.",
    );
    write_post(
        root,
        "es",
        "2025-10-28-produccion-sostenible.md",
        "title: Producción sostenible\nauthor: Anna Svensson\n\
         published_at: 2025-10-28\ncategory: Sostenibilidad\ntags: [sostenibilidad]",
        "La sostenibilidad es un valor central.",
    );
    std::fs::write(root.join("blog/en/broken.md"), "no frontmatter here").unwrap();

    dir
}

/// A cart line with a generated name.
#[must_use]
pub fn item(id: &str, price: &str, quantity: u32) -> CartItem {
    CartItem::new(id, format!("Product {id}"), dec(price), quantity)
}

/// Parse a decimal literal.
#[must_use]
pub fn dec(value: &str) -> Decimal {
    value.parse().unwrap()
}
