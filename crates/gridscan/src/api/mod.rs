//! REST API server for Gridscan.
//!
//! This module provides an Axum-based HTTP server in front of an
//! [`OcrPipeline`](crate::OcrPipeline).
//!
//! # Endpoints
//!
//! - `POST /api/ocr` - Recognize one uploaded image (multipart field `image`)
//! - `POST /api/batch-ocr` - Recognize several images (repeated field `images`)
//! - `GET /api/languages` - Supported language profiles
//! - `GET /api/modes` - Supported processing modes
//! - `GET /health` - Health check endpoint
//!
//! Both OCR endpoints accept optional `mode`, `language` and `preprocessing`
//! text fields. Errors are returned as `{"success": false, "message", "error_type"}`
//! with status 400 for rejected input and 500 for engine failures.
//!
//! # Examples
//!
//! ## Embedding the router in your app
//!
//! ```no_run
//! use gridscan::{GridscanConfig, OcrEngine, OcrPipeline, api::create_router};
//! use axum::Router;
//! use std::sync::Arc;
//!
//! # fn example(engine: Arc<dyn OcrEngine>) -> gridscan::Result<()> {
//! let pipeline = OcrPipeline::new(engine, GridscanConfig::default())?;
//! let app = Router::new().nest("/ocr-service", create_router(pipeline));
//! # Ok(())
//! # }
//! ```
//!
//! # cURL Examples
//!
//! ```bash
//! # Single image, table mode
//! curl -F "image=@invoice.png" -F "mode=table" http://localhost:8000/api/ocr
//!
//! # Batch with German profile
//! curl -F "images=@page1.png" -F "images=@page2.png" -F "language=deu" \
//!      http://localhost:8000/api/batch-ocr
//!
//! # Health check
//! curl http://localhost:8000/health
//! ```

mod error;
mod handlers;
mod server;
mod types;

pub use error::ApiError;
pub use server::{create_router, create_router_with_limits, parse_size_limits_from_env, serve, serve_with_limits};
pub use types::{
    ApiSizeLimits, ApiState, BatchOcrResponse, ErrorResponse, HealthResponse, LanguagesResponse,
    MULTIPART_OVERHEAD_BYTES, ModesResponse, OcrResponse,
};
