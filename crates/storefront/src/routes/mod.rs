//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness check
//! GET  /health/ready                   - Readiness check (catalog loaded)
//!
//! GET  /api/locales                    - Supported locales
//!
//! # Blog
//! GET  /api/{locale}/blog              - List/search posts (?q=&category=)
//! GET  /api/{locale}/blog/categories   - Categories in use
//! GET  /api/{locale}/blog/{slug}       - Post detail with related posts
//!
//! # Pricing
//! GET  /api/shipping                   - Shipping quote (?method=&weight=&locale=)
//! POST /api/cart/quote                 - Price a client-held cart
//! ```

pub mod blog;
pub mod cart;
pub mod locales;
pub mod shipping;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;

/// Create the blog routes router, nested under `/api/{locale}/blog`.
pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(blog::index))
        .route("/categories", get(blog::categories))
        .route("/{slug}", get(blog::show))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/locales", get(locales::index))
        .route("/shipping", get(shipping::quote))
        .route("/cart/quote", post(cart::quote))
        .nest("/{locale}/blog", blog_routes())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness report.
#[derive(Debug, Serialize)]
struct Readiness {
    status: &'static str,
    posts: usize,
}

/// Readiness health check endpoint.
///
/// Content is loaded before the listener binds, so a running server is ready.
/// The body reports how many posts were loaded.
async fn readiness(State(state): State<AppState>) -> Json<Readiness> {
    Json(Readiness {
        status: "ready",
        posts: state.catalog().len(),
    })
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::test_support::{get_json, test_app};

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_reports_post_count() {
        let (status, json) = get_json(test_app(), "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["posts"], 4);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _) = get_json(test_app(), "/api/en/nothing-here/x").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
