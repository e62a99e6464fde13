//! HTTP benchmark analysis server.
//!
//! Serves histogram comparisons, per-backend wd-values and parameter typing
//! over JSON. Benchmark records are held in memory, seeded from a JSON file
//! and extended through `POST /api/v1/benchmarks` as jobs complete.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use qbench_core::{
    BenchmarkAnalysis, BenchmarkRecord, CountsHistogram, HistogramComparison, PairingConfig,
    ParameterDictionary, QbenchError, WdConfig, WdReport,
};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8043;

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Where the initial records came from, reported by the index.
    pub records_path: Option<PathBuf>,
    pub wd: WdConfig,
    pub pairing: PairingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            records_path: None,
            wd: WdConfig::default(),
            pairing: PairingConfig::default(),
        }
    }
}

/// Shared server state.
struct AppState {
    records: RwLock<Vec<BenchmarkRecord>>,
    config: ServerConfig,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error response: `{"error": ..., "statusCode": ...}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(rename = "statusCode")]
    status_code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            Self::NotFound(m) => (StatusCode::NOT_FOUND, m),
            Self::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        let body = ErrorBody {
            error: message,
            status_code: status.as_u16().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<QbenchError> for ApiError {
    fn from(e: QbenchError) -> Self {
        if e.is_input_error() {
            Self::BadRequest(e.to_string())
        } else {
            Self::Internal(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CompareRequest {
    counts_sim: CountsHistogram,
    counts_real: CountsHistogram,
    /// Defaults to the total of `counts_real`.
    shots: Option<u64>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    records: usize,
    complete: usize,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn handle_analysis(State(state): State<Arc<AppState>>) -> Json<Vec<BenchmarkAnalysis>> {
    let records = state.records.read().await;
    Json(qbench_core::analyze_benchmarks(&records, &state.config.pairing))
}

async fn handle_benchmark(
    State(state): State<Arc<AppState>>,
    Path(benchmark_id): Path<String>,
) -> Result<Json<BenchmarkAnalysis>, ApiError> {
    let benchmark_id: u64 = benchmark_id.parse().map_err(|_| {
        ApiError::BadRequest(format!("Invalid benchmark id '{benchmark_id}'"))
    })?;
    let records = state.records.read().await;
    match qbench_core::analyze_benchmark(&records, benchmark_id, &state.config.pairing)? {
        Some(analysis) => Ok(Json(analysis)),
        None => Err(ApiError::NotFound(format!(
            "No complete benchmark pair with id {benchmark_id}"
        ))),
    }
}

/// Insert a record, or replace the stored record with the same id.
async fn handle_ingest(
    State(state): State<Arc<AppState>>,
    Json(mut record): Json<BenchmarkRecord>,
) -> (StatusCode, Json<BenchmarkRecord>) {
    if record.id.is_empty() {
        record.id = uuid::Uuid::new_v4().to_string();
    }
    let mut records = state.records.write().await;
    let status = match records.iter_mut().find(|r| r.id == record.id) {
        Some(existing) => {
            *existing = record.clone();
            StatusCode::OK
        }
        None => {
            records.push(record.clone());
            StatusCode::CREATED
        }
    };
    log::info!(
        "stored benchmark record {} (benchmark {}, backend {}, complete: {})",
        record.id,
        record.benchmark_id,
        record.backend,
        record.complete
    );
    (status, Json(record))
}

async fn handle_calc_wd(
    State(state): State<Arc<AppState>>,
    Path(qpu_name): Path<String>,
) -> Json<WdReport> {
    let records = state.records.read().await;
    Json(qbench_core::compute_wd(&qpu_name, &records, &state.config.wd))
}

async fn handle_compare(
    Json(req): Json<CompareRequest>,
) -> Result<Json<HistogramComparison>, ApiError> {
    let shots = req
        .shots
        .unwrap_or_else(|| qbench_core::total_shots(&req.counts_real));
    let comparison = qbench_core::analyze(&req.counts_sim, &req.counts_real, shots)?;
    Ok(Json(comparison))
}

async fn handle_parameters(Json(raw): Json<Map<String, Value>>) -> Json<ParameterDictionary> {
    Json(qbench_core::type_parameters(&raw))
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let records = state.records.read().await;
    Json(HealthResponse {
        status: "healthy".to_string(),
        records: records.len(),
        complete: records.iter().filter(|r| r.has_result()).count(),
    })
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Json<Value> {
    let records = state.records.read().await.len();
    Json(serde_json::json!({
        "name": "qbench server",
        "version": qbench_core::VERSION,
        "records": records,
        "records_path": state.config.records_path.as_ref().map(|p| p.display().to_string()),
        "simulator_backend": state.config.pairing.simulator_backend,
        "endpoints": {
            "/": "This API index",
            "/health": "Health check with record counts",
            "/api/v1/analysis": "GET: compare every complete simulator/device benchmark pair",
            "/api/v1/benchmarks/{benchmark_id}": "GET: comparison of one benchmark pair",
            "/api/v1/benchmarks": "POST: store or complete a benchmark record",
            "/api/v1/calc-wd/{qpu_name}": "GET: wd-value of a backend from its clifford benchmarks",
            "/api/v1/compare": "POST {counts-sim, counts-real, shots?}: histogram metrics",
            "/api/v1/parameters": "POST {name: {rawValue, type}}: typed parameters",
        },
    }))
}

/// Build the axum router over an initial record set.
pub fn build_router(records: Vec<BenchmarkRecord>, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        records: RwLock::new(records),
        config,
    });

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/api/v1/analysis", get(handle_analysis))
        .route("/api/v1/benchmarks", post(handle_ingest))
        .route("/api/v1/benchmarks/{benchmark_id}", get(handle_benchmark))
        .route("/api/v1/calc-wd/{qpu_name}", get(handle_calc_wd))
        .route("/api/v1/compare", post(handle_compare))
        .route("/api/v1/parameters", post(handle_parameters))
        .with_state(state)
}

/// Run the HTTP server until the listener fails.
pub async fn run_server(records: Vec<BenchmarkRecord>, config: ServerConfig) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    log::info!("serving {} benchmark records on {addr}", records.len());
    let app = build_router(records, config);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await
}
