//! API server setup and configuration.

use std::net::{IpAddr, SocketAddr};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::core::config::{GridscanConfig, ServerConfig};
use crate::core::pipeline::OcrPipeline;
use crate::{GridscanError, Result};

use super::{
    handlers::{batch_ocr_handler, health_handler, languages_handler, modes_handler, ocr_handler},
    types::{ApiSizeLimits, ApiState},
};

/// Parse size limits from `GRIDSCAN_MAX_UPLOAD_SIZE_MB`.
///
/// Falls back to limits sized for a full batch under `config` if not set or invalid.
pub fn parse_size_limits_from_env(config: &GridscanConfig) -> ApiSizeLimits {
    if let Ok(value) = std::env::var("GRIDSCAN_MAX_UPLOAD_SIZE_MB") {
        match value.trim().parse::<usize>() {
            Ok(mb) if mb > 0 => {
                tracing::info!("Upload size limit configured from environment: {} MB", mb);
                return ApiSizeLimits::from_mb(mb, mb);
            }
            Ok(_) => tracing::warn!("Invalid GRIDSCAN_MAX_UPLOAD_SIZE_MB value (must be > 0)"),
            Err(_) => tracing::warn!(
                "Failed to parse GRIDSCAN_MAX_UPLOAD_SIZE_MB='{}', must be a valid usize",
                value
            ),
        }
    }

    let limits = ApiSizeLimits::for_config(config);
    tracing::info!(
        "Upload size limit: {} bytes (from batch limits) - Configure with GRIDSCAN_MAX_UPLOAD_SIZE_MB",
        limits.max_request_body_bytes
    );
    limits
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<_> = origins
        .iter()
        .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
        .collect();

    if parsed.is_empty() {
        if !origins.is_empty() {
            tracing::warn!("CORS origins configured but none are valid header values, allowing any origin");
        }
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        tracing::info!("CORS configured with {} explicit allowed origin(s)", parsed.len());
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Create the API router with all routes configured.
///
/// CORS origins come from the pipeline's `server.cors_origins`; an empty
/// list allows any origin. Body limits admit a full batch under the
/// pipeline's configuration.
///
/// # Examples
///
/// ```no_run
/// use gridscan::{GridscanConfig, OcrEngine, OcrPipeline, api::create_router};
/// use std::sync::Arc;
///
/// # fn example(engine: Arc<dyn OcrEngine>) -> gridscan::Result<()> {
/// let pipeline = OcrPipeline::new(engine, GridscanConfig::default())?;
/// let router = create_router(pipeline);
/// # Ok(())
/// # }
/// ```
pub fn create_router(pipeline: OcrPipeline) -> Router {
    let limits = ApiSizeLimits::for_config(pipeline.config());
    create_router_with_limits(pipeline, limits)
}

/// Create the API router with custom size limits.
pub fn create_router_with_limits(pipeline: OcrPipeline, limits: ApiSizeLimits) -> Router {
    let origins = pipeline.config().server.cors_origins.clone();
    build_router(pipeline, limits, &origins)
}

fn build_router(pipeline: OcrPipeline, limits: ApiSizeLimits, cors_origins: &[String]) -> Router {
    let state = ApiState { pipeline };

    Router::new()
        .route("/api/ocr", post(ocr_handler))
        .route("/api/batch-ocr", post(batch_ocr_handler))
        .route("/api/languages", get(languages_handler))
        .route("/api/modes", get(modes_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(limits.max_multipart_field_bytes))
        .layer(RequestBodyLimitLayer::new(limits.max_request_body_bytes))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server using the pipeline's `server` section.
///
/// `GRIDSCAN_HOST`, `GRIDSCAN_PORT`, `GRIDSCAN_CORS_ORIGINS` and
/// `GRIDSCAN_MAX_UPLOAD_SIZE_MB` override the configuration.
///
/// # Environment Variables
///
/// ```bash
/// export GRIDSCAN_HOST=0.0.0.0
/// export GRIDSCAN_PORT=8000
/// export GRIDSCAN_CORS_ORIGINS="https://app.example.com"
/// export GRIDSCAN_MAX_UPLOAD_SIZE_MB=50
/// ```
pub async fn serve(pipeline: OcrPipeline) -> Result<()> {
    let server = pipeline.config().server.clone().with_env_overrides();
    let limits = parse_size_limits_from_env(pipeline.config());
    serve_with_limits(pipeline, &server, limits).await
}

/// Start the API server on an explicit address.
pub async fn serve_with_limits(pipeline: OcrPipeline, server: &ServerConfig, limits: ApiSizeLimits) -> Result<()> {
    let ip: IpAddr = server
        .host
        .parse()
        .map_err(|e| GridscanError::validation(format!("Invalid host address: {}", e)))?;
    let addr = SocketAddr::new(ip, server.port);

    let app = build_router(pipeline, limits, &server.cors_origins);

    tracing::info!("Starting Gridscan API server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(GridscanError::Io)?;

    axum::serve(listener, app)
        .await
        .map_err(|e| GridscanError::Other(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn test_parse_size_limits_default() {
        unsafe {
            std::env::remove_var("GRIDSCAN_MAX_UPLOAD_SIZE_MB");
        }

        let limits = parse_size_limits_from_env(&GridscanConfig::default());
        assert_eq!(limits, ApiSizeLimits::default());

        let mut config = GridscanConfig::default();
        config.batch.max_images = 2;
        assert_eq!(parse_size_limits_from_env(&config), ApiSizeLimits::for_config(&config));
    }

    #[test]
    #[serial_test::serial]
    fn test_parse_size_limits_from_env() {
        unsafe {
            std::env::set_var("GRIDSCAN_MAX_UPLOAD_SIZE_MB", "25");
        }

        let limits = parse_size_limits_from_env(&GridscanConfig::default());
        assert_eq!(limits.max_request_body_bytes, 25 * 1024 * 1024);
        assert_eq!(limits.max_multipart_field_bytes, 25 * 1024 * 1024);

        unsafe {
            std::env::remove_var("GRIDSCAN_MAX_UPLOAD_SIZE_MB");
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_parse_size_limits_invalid_falls_back() {
        unsafe {
            std::env::set_var("GRIDSCAN_MAX_UPLOAD_SIZE_MB", "lots");
        }

        assert_eq!(parse_size_limits_from_env(&GridscanConfig::default()), ApiSizeLimits::default());

        unsafe {
            std::env::set_var("GRIDSCAN_MAX_UPLOAD_SIZE_MB", "0");
        }

        assert_eq!(parse_size_limits_from_env(&GridscanConfig::default()), ApiSizeLimits::default());

        unsafe {
            std::env::remove_var("GRIDSCAN_MAX_UPLOAD_SIZE_MB");
        }
    }
}
