pub mod catalog;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use once_cell::sync::OnceCell;
use shelfcheck_http::error::{AppError, ErrorBody};
use shelfcheck_kernel::{InitCtx, Module};
use utoipa::PartialSchema;

use catalog::CatalogClient;
use models::{SearchQuery, SearchResult};

/// Availability lookup module, served under `/api/search`
pub struct AvailabilityModule {
    catalog: OnceCell<Arc<CatalogClient>>,
}

impl AvailabilityModule {
    pub const fn new() -> Self {
        Self {
            catalog: OnceCell::new(),
        }
    }
}

impl Default for AvailabilityModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for AvailabilityModule {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let client = CatalogClient::new(&ctx.settings.catalog)?;
        if self.catalog.set(Arc::new(client)).is_err() {
            tracing::debug!(module = self.name(), "catalog client already configured");
        }

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            selector = %ctx.settings.catalog.availability_selector,
            "availability module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        let Some(catalog) = self.catalog.get() else {
            tracing::warn!(
                module = self.name(),
                "routes requested before init; lookup endpoint not mounted"
            );
            return Router::new().route("/health", get(health_check));
        };

        Router::new()
            .route("/", get(search))
            .route("/health", get(health_check))
            .with_state(catalog.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error_ref = serde_json::json!({
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        });

        Some(serde_json::json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Check whether a book is available at the library",
                        "tags": ["Search"],
                        "parameters": [
                            {
                                "name": "bookTitle",
                                "in": "query",
                                "required": true,
                                "schema": { "type": "string" }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Availability of the top catalog result",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/SearchResult" }
                                    }
                                }
                            },
                            "400": {
                                "description": "Missing bookTitle parameter",
                                "content": error_ref.clone()
                            },
                            "500": {
                                "description": "Catalog unreachable or page could not be parsed",
                                "content": error_ref
                            }
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Search health check",
                        "tags": ["Search"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": {
                                    "text/plain": { "schema": { "type": "string" } }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "SearchResult": serde_json::to_value(SearchResult::schema()).ok()?,
                    "AvailabilityStatus": serde_json::to_value(models::AvailabilityStatus::schema()).ok()?,
                    "ErrorResponse": serde_json::to_value(ErrorBody::schema()).ok()?
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "availability module stopped");
        Ok(())
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "search module is healthy"
}

/// `GET /api/search?bookTitle=<text>`
async fn search(
    State(catalog): State<Arc<CatalogClient>>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<SearchResult>, AppError> {
    let Query(pairs) =
        pairs.map_err(|rejection| AppError::invalid_query(rejection.body_text()))?;
    let query = SearchQuery::from_pairs(&pairs);
    let title = query
        .title()
        .ok_or_else(|| AppError::missing_parameter("bookTitle"))?;

    let result = catalog.lookup(title).await?;

    tracing::info!(title, status = %result.status, "availability lookup complete");
    Ok(Json(result))
}

/// Create a new instance of the availability module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(AvailabilityModule::new())
}
