// 🌐 HTTP API (feature = "server")
// The pantry editor + calculator over JSON, for the web front-end.

use crate::catalog::{Catalog, CatalogEntry};
use crate::error::PricingError;
use crate::pricing::{compute_price, PriceBreakdown, PricingConfig, RecipeSelection, SelectedIngredient};
use crate::report::format_brl;
use crate::store::CatalogStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;

/// Shared application state
///
/// The store sits behind a mutex so one request's save never interleaves
/// with another's load. Pricing defaults are read-only; every request is
/// its own session.
#[derive(Clone)]
pub struct ApiState {
    store: Arc<Mutex<Box<dyn CatalogStore>>>,
    defaults: PricingConfig,
}

impl ApiState {
    pub fn new(store: Box<dyn CatalogStore>, defaults: PricingConfig) -> Self {
        ApiState {
            store: Arc::new(Mutex::new(store)),
            defaults: defaults.sanitized(),
        }
    }

    fn store(&self) -> MutexGuard<'_, Box<dyn CatalogStore>> {
        self.store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ============================================================================
// WIRE TYPES
// ============================================================================

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Catalog row with its derived unit cost
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogRow {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub unit_cost: f64,
}

impl From<CatalogEntry> for CatalogRow {
    fn from(entry: CatalogEntry) -> Self {
        let unit_cost = entry.unit_cost();
        CatalogRow { entry, unit_cost }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
    pub saved: usize,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub ingredients: Vec<SelectedIngredient>,
    #[serde(default)]
    pub prep_minutes: u32,
    #[serde(default)]
    pub oven_minutes: u32,
    /// Omitted ⇒ the server's session defaults
    #[serde(default)]
    pub config: Option<PricingConfig>,
}

impl QuoteRequest {
    /// Repeated names collapse into one selection entry; the last quantity wins.
    fn selection(&self) -> RecipeSelection {
        self.ingredients
            .iter()
            .fold(RecipeSelection::new(), |selection, item| {
                selection.with_ingredient(&item.name, item.quantity_used)
            })
            .with_times(self.prep_minutes, self.oven_minutes)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub breakdown: PriceBreakdown,
    /// Rounded for display, e.g. "R$ 19.93"
    pub suggested_price: String,
}

// ============================================================================
// ERRORS
// ============================================================================

struct ApiError {
    status: StatusCode,
    error: PricingError,
}

impl ApiError {
    fn lookup(error: PricingError) -> Self {
        let status = match error {
            PricingError::UnknownIngredient(_) => StatusCode::NOT_FOUND,
            PricingError::CatalogUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        };
        ApiError { status, error }
    }
}

impl From<PricingError> for ApiError {
    fn from(error: PricingError) -> Self {
        let status = match error {
            PricingError::UnknownIngredient(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PricingError::CatalogUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        };
        ApiError { status, error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(status = %self.status, error = %self.error, "request refused");
        (
            self.status,
            Json(ApiResponse::<()>::failed(self.error.to_string())),
        )
            .into_response()
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/catalog - Every pantry row with its unit cost
async fn get_catalog(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let catalog = state.store().load()?;
    let rows: Vec<CatalogRow> = catalog.into_entries().into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::ok(rows)))
}

/// PUT /api/catalog - Replace the whole pantry (blank rows dropped)
async fn put_catalog(
    State(state): State<ApiState>,
    Json(catalog): Json<Catalog>,
) -> Result<impl IntoResponse, ApiError> {
    let saved = state.store().save(&catalog)?;
    Ok(Json(ApiResponse::ok(SaveResponse {
        saved,
        saved_at: Utc::now(),
    })))
}

/// GET /api/catalog/:name - Single ingredient lookup
async fn get_ingredient(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let catalog = state.store().load().map_err(ApiError::lookup)?;
    let entry = catalog.lookup(&name).map_err(ApiError::lookup)?.clone();
    Ok(Json(ApiResponse::ok(CatalogRow::from(entry))))
}

/// GET /api/config/defaults - What a fresh session starts with
async fn get_defaults(State(state): State<ApiState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.defaults))
}

/// POST /api/quote - Price a recipe against the current pantry
async fn post_quote(
    State(state): State<ApiState>,
    Json(request): Json<QuoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let catalog = state.store().load()?;
    let config = request.config.unwrap_or(state.defaults).sanitized();

    let breakdown = compute_price(&request.selection(), &catalog, &config)?;
    let suggested_price = format_brl(breakdown.sale_price);

    Ok(Json(ApiResponse::ok(QuoteResponse {
        breakdown,
        suggested_price,
    })))
}

/// Build the full router (API nested under /api, permissive CORS).
pub fn router(state: ApiState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/catalog", get(get_catalog).put(put_catalog))
        .route("/catalog/:name", get(get_ingredient))
        .route("/config/defaults", get(get_defaults))
        .route("/quote", post(post_quote))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonFileStore;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app(dir: &tempfile::TempDir) -> Router {
        let store = JsonFileStore::new(dir.path().join("pantry.json"));
        store
            .save(&Catalog::new(vec![
                CatalogEntry::new("Sweetened Condensed Milk", 6.50, 395.0, "g"),
                CatalogEntry::new("Cocoa Powder", 9.80, 200.0, "g"),
            ]))
            .unwrap();
        router(ApiState::new(Box::new(store), PricingConfig::default()))
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let (status, body) = call(test_app(&dir), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_quote_matches_engine() {
        let dir = tempfile::tempdir().unwrap();
        let request = json_request(
            "POST",
            "/api/quote",
            json!({
                "ingredients": [{"name": "Sweetened Condensed Milk", "quantity_used": 395}],
                "prep_minutes": 30,
                "oven_minutes": 20
            }),
        );

        let (status, body) = call(test_app(&dir), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["suggested_price"], "R$ 19.93");
        let labor = body["data"]["labor_cost"].as_f64().unwrap();
        assert!((labor - 8.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_quote_with_unknown_ingredient_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let request = json_request(
            "POST",
            "/api/quote",
            json!({"ingredients": [{"name": "Hazelnut Paste", "quantity_used": 10}]}),
        );

        let (status, body) = call(test_app(&dir), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("Hazelnut Paste"));
    }

    #[tokio::test]
    async fn test_put_catalog_drops_blank_rows() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);

        let request = json_request(
            "PUT",
            "/api/catalog",
            json!([
                {"item": "Eggs", "preco": 18, "qtd_emb": 30, "unidade": "un"},
                {"item": "", "preco": null, "qtd_emb": null, "unidade": ""}
            ]),
        );
        let (status, body) = call(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["saved"], 1);

        let request = Request::builder().uri("/api/catalog").body(Body::empty()).unwrap();
        let (_, body) = call(app, request).await;
        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["item"], "Eggs");
        assert!((rows[0]["unit_cost"].as_f64().unwrap() - 0.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_lookup_by_encoded_name() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);

        let uri = format!(
            "/api/catalog/{}",
            urlencoding::encode("Sweetened Condensed Milk")
        );
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = call(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["qtd_emb"], 395.0);

        let request = Request::builder()
            .uri("/api/catalog/Nutella")
            .body(Body::empty())
            .unwrap();
        let (status, _) = call(app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_broken_store_is_service_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pantry.json");
        std::fs::write(&path, "not json").unwrap();
        let app = router(ApiState::new(
            Box::new(JsonFileStore::new(&path)),
            PricingConfig::default(),
        ));

        let request = Request::builder().uri("/api/catalog").body(Body::empty()).unwrap();
        let (status, body) = call(app, request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("Catalog unavailable"));
    }
}
