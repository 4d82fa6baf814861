//! Backend for the consultation log.
//!
//! Serves the record collection from the local data file and the landing
//! and consultation history pages. The history page gets a server-rendered
//! first paint and then works from one fetch of `/api/consultas`. The table
//! and detail regions are also exposed as standalone HTML fragments. The
//! data file is re-read on every request; handlers share nothing mutable.

pub mod error;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use thiserror::Error;
use tower_http::services::ServeDir;

use crate::loader::{RecordSource, RECORDS_PATH};
use crate::model::ConsultationRecord;
use crate::render::html;
use crate::store;
use crate::view::{ConsultationView, Surface, ViewEvent};

use self::error::ApiError;

#[derive(Clone, Debug)]
pub struct ServerOptions {
    pub listen: SocketAddr,
    pub data_file: PathBuf,
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug)]
struct ServerState {
    data_file: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub q: String,
    pub detail: Option<String>,
}

pub fn router(data_file: PathBuf, static_dir: Option<PathBuf>) -> Router {
    let state = Arc::new(ServerState { data_file });
    let app = Router::new()
        .route(RECORDS_PATH, get(list_records))
        .route("/", get(landing))
        .route("/historial.html", get(history))
        .route("/fragments/consultas", get(table_fragment))
        .route("/fragments/consultas/", get(missing_detail_fragment))
        .route("/fragments/consultas/:id", get(detail_fragment))
        .with_state(state);

    match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    }
}

pub async fn serve(options: ServerOptions) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(options.listen)
        .await
        .map_err(|source| ServerError::Bind {
            addr: options.listen,
            source,
        })?;
    let addr = listener.local_addr().unwrap_or(options.listen);
    tracing::info!(%addr, data_file = %options.data_file.display(), "consultation server listening");

    let app = router(options.data_file, options.static_dir);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await
        .map_err(|source| ServerError::Serve { source })
}

/// `GET /api/consultas`: the data file's records.
async fn list_records(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Vec<ConsultationRecord>>, ApiError> {
    let records = store::read_data_file(&state.data_file).await?;
    Ok(Json(records))
}

async fn landing() -> Html<String> {
    Html(html::landing_page())
}

async fn loaded_view(state: &ServerState, filter: String) -> ConsultationView {
    let mut view = ConsultationView::new(Surface::Html);
    // Failures are rendered into the table region and logged by the view;
    // the error row is kept rather than filtered away.
    let loaded = view
        .load(&RecordSource::DataFile(state.data_file.clone()))
        .await;
    if loaded.is_ok() && !filter.is_empty() {
        view.handle(ViewEvent::FilterChanged(filter));
    }
    view
}

async fn history(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<HistoryQuery>,
) -> Html<String> {
    let mut view = loaded_view(&state, query.q).await;
    if let Some(id) = query.detail {
        view.handle(ViewEvent::DetailRequested(Some(id)));
    }
    Html(view.render_page())
}

async fn table_fragment(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<HistoryQuery>,
) -> Html<String> {
    let view = loaded_view(&state, query.q).await;
    Html(view.table_body().to_string())
}

async fn detail_fragment(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Html<String> {
    let mut view = loaded_view(&state, String::new()).await;
    view.handle(ViewEvent::DetailRequested(Some(id)));
    Html(view.modal_body().to_string())
}

async fn missing_detail_fragment() -> Html<String> {
    Html(html::detail_not_found())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::refresh::sample_records;
    use crate::render::{DETAIL_NOT_FOUND_MESSAGE, LOAD_FAILED_MESSAGE};

    async fn send_get(app: Router, uri: &str) -> (StatusCode, String) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn app_with_sample_data() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        store::write_data_file(&path, &sample_records()).await.unwrap();
        (router(path, None), dir)
    }

    #[tokio::test]
    async fn api_serves_data_file_records() {
        let (app, _dir) = app_with_sample_data().await;
        let (status, body) = send_get(app, "/api/consultas").await;
        assert_eq!(status, StatusCode::OK);
        let records: Vec<ConsultationRecord> = serde_json::from_str(&body).unwrap();
        assert_eq!(records, sample_records());
    }

    #[tokio::test]
    async fn api_missing_data_file_is_404_with_error_body() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(dir.path().join("data.json"), None);
        let (status, body) = send_get(app, "/api/consultas").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            json["error"],
            "Data file not found. Contact the administrator."
        );
    }

    #[tokio::test]
    async fn api_malformed_data_file_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "not json").unwrap();
        let (status, body) = send_get(router(path, None), "/api/consultas").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("failed to decode"));
    }

    #[tokio::test]
    async fn history_page_renders_filtered_table_and_detail() {
        let (app, _dir) = app_with_sample_data().await;
        let (status, body) = send_get(app, "/historial.html?q=pending&detail=C005").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"data-bs-id="C004""#));
        assert!(body.contains(r#"data-bs-id="C005""#));
        assert!(!body.contains(r#"data-bs-id="C001""#));
        assert!(body.contains("Braces fitting."));
        assert!(body.contains(r#"value="pending""#));
    }

    #[tokio::test]
    async fn history_page_without_data_shows_error_row() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(dir.path().join("data.json"), None);
        let (status, body) = send_get(app, "/historial.html").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(LOAD_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn filtered_history_page_without_data_keeps_error_row() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(dir.path().join("data.json"), None);
        let (_, body) = send_get(app, "/historial.html?q=ana").await;
        assert!(body.contains(LOAD_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn fragments_follow_filter_and_lookup() {
        let (app, _dir) = app_with_sample_data().await;
        let (_, table) = send_get(app.clone(), "/fragments/consultas?q=ana").await;
        assert_eq!(table.matches("<tr>").count(), 1);

        let (_, detail) = send_get(app.clone(), "/fragments/consultas/C002").await;
        assert!(detail.contains("Luis Martínez"));

        let (_, missing) = send_get(app.clone(), "/fragments/consultas/C404").await;
        assert!(missing.contains(DETAIL_NOT_FOUND_MESSAGE));

        let (_, empty) = send_get(app, "/fragments/consultas/").await;
        assert!(empty.contains(DETAIL_NOT_FOUND_MESSAGE));
    }

    #[tokio::test]
    async fn landing_links_to_history() {
        let (app, _dir) = app_with_sample_data().await;
        let (status, body) = send_get(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"href="/historial.html""#));
    }

    #[tokio::test]
    async fn static_dir_is_served_as_fallback() {
        let (_, dir) = app_with_sample_data().await;
        let static_dir = dir.path().join("static");
        std::fs::create_dir_all(&static_dir).unwrap();
        std::fs::write(static_dir.join("clinic.css"), "body{}").unwrap();
        let app = router(dir.path().join("data.json"), Some(static_dir));
        let (status, body) = send_get(app, "/clinic.css").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "body{}");
    }
}
