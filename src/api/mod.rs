//! HTTP API
//!
//! Routes:
//! - `GET /v1/product/:code` - look up one product
//! - `GET /v1/product?asin=CODE` - same, with the code as a query parameter
//! - `GET /health` - liveness check
//!
//! Dropping a request (client disconnect) drops its handler future, which
//! cancels the in-flight fetch or storage work for that request only.

use crate::pipeline::{ProductService, ProductSource};
use crate::product::ProductView;
use crate::storage::ProductStore;
use crate::ScraperError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Name reported by the health endpoint
pub const SERVICE_NAME: &str = "dp-scraper";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    asin: Option<String>,
}

/// Error returned by API handlers
#[derive(Debug)]
pub struct ApiError(ScraperError);

impl From<ScraperError> for ApiError {
    fn from(err: ScraperError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            ScraperError::MissingCode => StatusCode::BAD_REQUEST,
            ScraperError::Fetch(_) => StatusCode::BAD_GATEWAY,
            ScraperError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!("Request failed ({}): {}", status, self.0);
        }

        let body = Json(json!({
            "error": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Builds the API router around a shared product service
pub fn build_router<P, S>(service: Arc<ProductService<P, S>>) -> Router
where
    P: ProductSource + 'static,
    S: ProductStore + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/v1/product", get(product_by_query::<P, S>))
        .route("/v1/product/:code", get(product_by_path::<P, S>))
        .with_state(service)
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /v1/product/:code
async fn product_by_path<P, S>(
    State(service): State<Arc<ProductService<P, S>>>,
    Path(code): Path<String>,
) -> Result<Json<ProductView>, ApiError>
where
    P: ProductSource,
    S: ProductStore,
{
    lookup(&service, &code).await
}

/// GET /v1/product?asin=CODE
async fn product_by_query<P, S>(
    State(service): State<Arc<ProductService<P, S>>>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductView>, ApiError>
where
    P: ProductSource,
    S: ProductStore,
{
    let code = query.asin.unwrap_or_default();
    lookup(&service, &code).await
}

async fn lookup<P, S>(
    service: &ProductService<P, S>,
    code: &str,
) -> Result<Json<ProductView>, ApiError>
where
    P: ProductSource,
    S: ProductStore,
{
    tracing::info!("GetProduct {}", code);
    let view = service.get_product(code).await?;
    Ok(Json(view))
}
