//! Catalogue Server - household catalogue API
//!
//! JSON over HTTP under `/v1`. Every resource kind gets the same five
//! routes: list and create on the collection, show, partial update and
//! delete on a single record. Request counters are served at `/debug/vars`.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod patch;
pub mod query;
pub mod resources;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use catalogue_core::{
    AvailableItem, Catalogue, CatalogueError, Ingredient, ItemType, KnownItem, Measurement,
    Recipe, RecipeIngredient, Tag,
};

use crate::auth::AccessTable;
use crate::config::ServerConfig;
use crate::metrics::RequestMetrics;
use crate::resources::{PathKey, RestResource};

/// Shared application state
pub struct AppState {
    pub catalogue: Catalogue,
    pub access: AccessTable,
    pub default_page_size: i64,
    pub cors_trusted_origins: Vec<String>,
    pub metrics: RequestMetrics,
}

impl AppState {
    pub fn new(catalogue: Catalogue, config: &ServerConfig) -> Self {
        Self {
            catalogue,
            access: AccessTable::from_grants(&config.tokens),
            default_page_size: config.default_page_size,
            cors_trusted_origins: config.cors_trusted_origins.clone(),
            metrics: RequestMetrics::new(),
        }
    }

    /// Open the configured database and build state over it
    pub fn open(config: &ServerConfig) -> Result<Self, CatalogueError> {
        let catalogue = Catalogue::open(&config.database)?;
        tracing::info!(path = %config.database.path.display(), "Opened catalogue database");
        Ok(Self::new(catalogue, config))
    }
}

/// The five routes of one resource kind
fn resource_routes<R>() -> Router<Arc<AppState>>
where
    R: RestResource,
    R::Key: PathKey,
{
    let collection = format!("/v1/{}", R::COLLECTION);
    let item = format!("{}{}", collection, <R::Key as PathKey>::ROUTE);

    Router::new()
        .route(&collection, get(http::list::<R>).post(http::create::<R>))
        .route(
            &item,
            get(http::show::<R>)
                .patch(http::update::<R>)
                .delete(http::remove::<R>),
        )
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                HeaderName::from_static("x-expected-version"),
            ]),
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        // Pantry
        .merge(resource_routes::<KnownItem>())
        .merge(resource_routes::<AvailableItem>())
        // Lookups
        .merge(resource_routes::<ItemType>())
        .merge(resource_routes::<Measurement>())
        .merge(resource_routes::<Tag>())
        // Cookbook
        .merge(resource_routes::<Ingredient>())
        .merge(resource_routes::<Recipe>())
        .merge(resource_routes::<RecipeIngredient>())
        // Operations
        .route("/debug/vars", get(http::debug_vars))
        // Middleware
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_permission,
        ))
        .route("/v1/healthcheck", get(http::healthcheck))
        .fallback(http::not_found)
        .method_not_allowed_fallback(http::method_not_allowed)
        .layer(CatchPanicLayer::custom(http::recover_panic))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            metrics::track_requests,
        ))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors_layer(&state.cors_trusted_origins) {
        router = router.layer(cors);
    }

    router.with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Catalogue server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    #[test]
    fn test_cors_disabled_without_origins() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["https://kitchen.example".to_string()]).is_some());
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_json_500() {
        async fn boom() -> &'static str {
            panic!("shelf collapsed")
        }

        let router = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(http::recover_panic));
        let response = router
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({"error": "the server encountered a problem and could not process your request"})
        );
    }
}
