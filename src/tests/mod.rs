use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use crate::loader::{HttpSource, LoadError, RecordSource};
use crate::refresh::{refresh_data_file, sample_records, RefreshOutcome};
use crate::render::{LOAD_FAILED_MESSAGE, NO_RESULTS_MESSAGE};
use crate::view::{ConsultationView, Surface, ViewEvent};

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn backend(addr: SocketAddr) -> RecordSource {
    RecordSource::Http(HttpSource::backend(&format!("http://{addr}")).unwrap())
}

#[tokio::test]
async fn view_loads_from_served_data_file() {
    let dir = tempfile::tempdir().unwrap();
    let data_file = dir.path().join("data.json");
    let outcome = refresh_data_file(&RecordSource::Inline(sample_records()), &data_file)
        .await
        .unwrap();
    assert_eq!(outcome, RefreshOutcome::Updated { count: 4 });

    let addr = spawn(crate::server::router(data_file, None)).await;
    let mut view = ConsultationView::new(Surface::Html);
    view.load(&backend(addr)).await.unwrap();

    assert_eq!(view.records(), sample_records().as_slice());
    assert_eq!(view.table_body().matches("<tr>").count(), 4);

    view.handle(ViewEvent::FilterChanged("in PROGRESS".to_string()));
    assert_eq!(view.table_body().matches("<tr>").count(), 1);
    assert!(view.table_body().contains(r#"data-bs-id="C002""#));

    view.handle(ViewEvent::DetailRequested(Some("C002".to_string())));
    assert!(view.modal_body().contains("Root canal."));
    assert!(view.modal_body().contains("750"));
}

#[tokio::test]
async fn http_500_renders_error_row_and_leaves_cache_empty() {
    let app = Router::new().route(
        "/api/consultas",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let addr = spawn(app).await;

    let mut view = ConsultationView::new(Surface::Html);
    let err = view.load(&backend(addr)).await.unwrap_err();
    assert!(err.contains("status: 500"));
    assert!(view.records().is_empty());
    assert_eq!(view.table_body().matches("<tr>").count(), 1);
    assert!(view.table_body().contains(LOAD_FAILED_MESSAGE));
    assert!(!view.table_body().contains(NO_RESULTS_MESSAGE));
}

#[tokio::test]
async fn missing_data_file_on_backend_is_a_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn(crate::server::router(dir.path().join("data.json"), None)).await;
    let source = HttpSource::backend(&format!("http://{addr}")).unwrap();
    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, LoadError::Status { status: 404, .. }));
}

#[tokio::test]
async fn undecodable_body_is_a_load_failure() {
    let app = Router::new().route(
        "/api/consultas",
        get(|| async { r#"{"error": "not a list"}"# }),
    );
    let addr = spawn(app).await;
    let source = HttpSource::backend(&format!("http://{addr}")).unwrap();
    assert!(matches!(
        source.fetch().await.unwrap_err(),
        LoadError::Decode { .. }
    ));
}

#[tokio::test]
async fn transport_error_renders_error_row() {
    // Bind then drop to get a port with nothing listening on it.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut view = ConsultationView::new(Surface::Html);
    let source = backend(addr);
    assert!(matches!(
        source.fetch().await.unwrap_err(),
        LoadError::Transport { .. }
    ));
    assert!(view.load(&source).await.is_err());
    assert!(view.records().is_empty());
    assert!(view.table_body().contains(LOAD_FAILED_MESSAGE));
}

#[tokio::test]
async fn refresh_from_upstream_endpoint_overwrites_data_file() {
    let upstream_records = sample_records()[..2].to_vec();
    let body = serde_json::to_string(&upstream_records).unwrap();
    let app = Router::new().route("/feed", get(move || async move { body }));
    let addr = spawn(app).await;

    let dir = tempfile::tempdir().unwrap();
    let data_file = dir.path().join("data.json");
    std::fs::write(&data_file, "[]").unwrap();

    let source =
        RecordSource::Http(HttpSource::endpoint(&format!("http://{addr}/feed"), None).unwrap());
    let outcome = refresh_data_file(&source, &data_file).await.unwrap();
    assert_eq!(outcome, RefreshOutcome::Updated { count: 2 });
    assert_eq!(
        crate::store::read_data_file(&data_file).await.unwrap(),
        upstream_records
    );
}
