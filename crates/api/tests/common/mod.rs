use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use cargoscreen_api::config::ServerConfig;
use cargoscreen_api::routes;
use cargoscreen_api::state::AppState;
use cargoscreen_core::import_job::ImportJobRegistry;
use cargoscreen_core::morphology::LexiconGate;
use cargoscreen_core::register_import::{ColumnMapping, DelimitedReader, NoopArchiveReader};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        column_mapping_path: None,
        morphology_lexicon_path: None,
        import_error_threshold: 10,
    }
}

/// Build the application router over a lazily-connecting pool.
///
/// The pool never opens a connection unless a handler touches the
/// database, so job-registry and health routes are exercisable without
/// a running PostgreSQL.
///
/// Returns the router together with the job registry so tests can seed
/// jobs directly.
pub fn build_test_app() -> (Router, Arc<ImportJobRegistry>) {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://localhost:5432/cargoscreen_test")
        .expect("lazy pool construction cannot fail");

    let registry = Arc::new(ImportJobRegistry::new());

    let state = AppState {
        pool,
        config: Arc::new(test_config()),
        registry: Arc::clone(&registry),
        morphology: Arc::new(LexiconGate::empty()),
        columns: Arc::new(ColumnMapping::default_mapping()),
        sheet_reader: Arc::new(DelimitedReader),
        archive_reader: Arc::new(NoopArchiveReader),
    };

    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .with_state(state);

    (app, registry)
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request"),
    )
    .await
    .expect("response")
}

/// Send a POST request with an empty body.
pub async fn post(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .expect("request"),
    )
    .await
    .expect("response")
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
    )
    .await
    .expect("response")
}

/// Send a DELETE request.
pub async fn delete(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .expect("request"),
    )
    .await
    .expect("response")
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    use http_body_util::BodyExt;

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}
