//! HTTP server for the staffdiff API.
//!
//! Provides REST endpoints for uploading the two snapshots and running a
//! comparison. File reading happens here at the boundary; the engine only
//! ever sees in-memory datasets.
//!
//! # API Endpoints
//!
//! | Method | Path           | Description                              |
//! |--------|----------------|------------------------------------------|
//! | GET    | `/health`      | Health check                             |
//! | POST   | `/api/compare` | Upload OLD + NEW snapshots, get report   |
//! | GET    | `/api/logs`    | SSE stream for real-time logs            |

use axum::{
    extract::Multipart,
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::LOG_BROADCASTER;
use super::types::{error_response, CompareResponse};
use crate::engine::{compare_bytes, CompareOptions};
use crate::error::PipelineError;

/// Start the HTTP server.
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/compare", post(compare))
        .route("/api/logs", get(sse_logs))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("staffdiff server running on http://localhost:{}", port);
    println!("   POST /api/compare - Upload OLD + NEW snapshots");
    println!("   GET  /api/logs    - SSE log stream");
    println!("   GET  /health      - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "staffdiff",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "compare": "POST /api/compare",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming.
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Compare endpoint: multipart upload with fields `old` and `new`.
async fn compare(
    mut multipart: Multipart,
) -> Result<Json<CompareResponse>, (StatusCode, Json<Value>)> {
    let mut old_bytes: Option<Vec<u8>> = None;
    let mut new_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        bad_request(format!("Multipart error: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("Read error: {}", e)))?
            .to_vec();

        match name.as_str() {
            "old" => old_bytes = Some(bytes),
            "new" => new_bytes = Some(bytes),
            _ => {}
        }
    }

    let old = old_bytes.ok_or_else(|| bad_request("Missing 'old' file field".to_string()))?;
    let new = new_bytes.ok_or_else(|| bad_request("Missing 'new' file field".to_string()))?;

    println!("\nNEW COMPARISON ({} + {} bytes)", old.len(), new.len());

    let result = compare_bytes(&old, &new, &CompareOptions::default()).map_err(|e| {
        eprintln!("Compare error: {}", e);
        let status = match &e {
            // Structurally invalid input: no identity column, nothing to report.
            PipelineError::Engine(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::Load(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(error_response(&e.to_string())))
    })?;

    println!(
        "Done: {} differences, {} removed, {} added",
        result.report.rows.len(),
        result.old_only.len(),
        result.new_only.len()
    );

    Ok(Json(CompareResponse::from(result)))
}

fn bad_request(message: String) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(error_response(&message)))
}
