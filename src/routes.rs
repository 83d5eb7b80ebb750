use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    http::{
        header::{ALLOW, CONTENT_TYPE},
        HeaderValue, Method, StatusCode, Uri,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{error, warn, Level};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::CorsConfig,
    error::AppError,
    handlers::{auth, file, health},
    metrics::{metrics, track_metrics},
    ApiDoc, AppState,
};

/// Builds the full application router: API routes, stored files under
/// `/static`, Swagger UI and the middleware stack.
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.config.upload.max_size_bytes;
    let upload_directory = state.config.upload.directory.clone();
    let cors = build_cors_layer(&state.config.cors);

    let api_routes = Router::new()
        .route("/api/v1/health/", get(health::health))
        .route(
            "/api/v1/files/",
            post(file::upload_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/files/get-by-filter", post(file::get_files_by_filter))
        .route(
            "/api/v1/files/:id",
            get(file::get_file)
                .put(file::update_file)
                .delete(file::delete_file),
        )
        .route("/api/v1/auth/send-otp", post(auth::send_otp))
        .route("/api/v1/auth/login-by-mobile", post(auth::login_by_mobile))
        .route_layer(middleware::from_fn_with_state(state.clone(), track_metrics));

    let static_files = ServeDir::new(upload_directory).not_found_service(not_found.into_service());

    Router::new()
        .merge(api_routes)
        .route("/metrics", get(metrics))
        .nest_service("/static", static_files)
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(middleware::map_response(method_not_allowed))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::RouteNotFound(uri.path().to_string())
}

/// Wraps the bare 405 produced by method routing in the error envelope,
/// keeping its `Allow` header.
async fn method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }
    let allow = response.headers().get(ALLOW).cloned();
    let mut enveloped = AppError::MethodNotAllowed.into_response();
    if let Some(allow) = allow {
        enveloped.headers_mut().insert(ALLOW, allow);
    }
    enveloped
}

/// Renders a handler panic as an internal-error envelope.
pub fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!(panic = detail, "request handler panicked");
    AppError::Internal(format!("handler panicked: {}", detail)).into_response()
}

/// `*` allows any origin; otherwise a comma separated list. Origins that do
/// not parse are skipped.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let raw = config.allow_origins.trim();
    if raw.is_empty() || raw == "*" {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins).allow_credentials(true)
}
