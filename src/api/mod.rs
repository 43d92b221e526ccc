//! HTTP API for frontend integration.
//!
//! - [`server`] - axum HTTP server (upload + compare, SSE logs)
//! - [`types`] - request/response types
//! - [`logs`] - real-time log streaming

pub mod logs;
pub mod server;
pub mod types;
