//! Router-level tests for the product service.

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, DurationRound, TimeZone, Utc};
use tokio::time::Instant;
use tower::ServiceExt;

use product_api::{create_router, AppState, CatalogConfig};
use test_utils::{artifact_tree, write_artifact_series};
use viewer_common::ProductResponse;
use viewer_engine::{AnimationEngine, ViewerConfig};

fn catalog(root: &Path) -> CatalogConfig {
    let yaml = format!(
        r#"
data_root: {}
products:
  - field: CTI_VEL
    title: CTI Radial Velocity
  - field: DBZ_3D
    title: Reflectivity
    directory: "{{zoom}}/dbz/{{height}}"
    key: DBZ
    volumetric: true
"#,
        root.display()
    );
    CatalogConfig::from_yaml_str(&yaml).unwrap()
}

fn router(root: &Path) -> Router {
    create_router(Arc::new(AppState::new(catalog(root))))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn recent() -> chrono::DateTime<Utc> {
    Utc::now().duration_trunc(Duration::seconds(1)).unwrap() - Duration::seconds(60)
}

// ============================================================================
// /product
// ============================================================================

#[tokio::test]
async fn test_realtime_product_lists_frames_oldest_first() {
    let (root, _paths) =
        artifact_tree("REAL_FULL/CTI_VEL", "CTI_VEL", recent(), Duration::minutes(5), 4).unwrap();

    let (status, body) = get(router(root.path()), "/product?fl=CTI_VEL&zm=REAL_FULL&tr=1800&et=now").await;
    assert_eq!(status, StatusCode::OK);

    let product = ProductResponse::from_xml(&body).unwrap();
    assert_eq!(product.frame_count(), 4);
    assert_eq!(product.select, "CTI_VEL");
    assert_eq!(product.zoom, "REAL_FULL");
    assert_eq!(product.target, "anim_div");
    assert!(product.frames.windows(2).all(|w| w[0] < w[1]));
    assert!(product.frames[0].starts_with("/images/REAL_FULL/CTI_VEL/CTI_VEL_"));
    assert!(product.prod_html.contains(product.newest_frame().unwrap()));
}

#[tokio::test]
async fn test_engine_starts_on_newest_frame() {
    let (root, _paths) =
        artifact_tree("REAL_FULL/CTI_VEL", "CTI_VEL", recent(), Duration::minutes(5), 4).unwrap();

    let (_, body) = get(router(root.path()), "/product?fl=CTI_VEL&zm=REAL_FULL&tr=1800&et=now").await;
    let product = ProductResponse::from_xml(&body).unwrap();
    let newest = product.newest_frame().unwrap().to_string();

    let mut engine = AnimationEngine::new(&ViewerConfig::default());
    engine.on_fetch_success(product);
    assert_eq!(engine.playback().frame_count, 4);
    assert_eq!(engine.playback().current_frame, 3);

    let outcome = engine.tick(Instant::now());
    let frame = outcome.render.unwrap();
    assert_eq!(frame.index, 3);
    assert_eq!(frame.url, newest);
}

#[tokio::test]
async fn test_archive_window() {
    let end = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("REAL_FULL/CTI_VEL");
    // 12:00 back to 11:00, every 10 minutes
    write_artifact_series(&dir, "CTI_VEL", end, Duration::minutes(10), 7).unwrap();

    let (status, body) = get(
        router(root.path()),
        "/product?fl=CTI_VEL&zm=REAL_FULL&tr=1800&et=2024-06-01_12:00:00",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let product = ProductResponse::from_xml(&body).unwrap();
    assert_eq!(product.frame_count(), 4);
    assert!(product.frames[0].ends_with("CTI_VEL_20240601_113000.png"));
    assert!(product.frames[3].ends_with("CTI_VEL_20240601_120000.png"));
    assert!(product.status_html.contains("archive"));
}

#[tokio::test]
async fn test_empty_selection_is_well_formed() {
    let root = tempfile::tempdir().unwrap();
    let (status, body) = get(router(root.path()), "/product?fl=CTI_VEL&zm=REAL_FULL&tr=1800&et=now").await;
    assert_eq!(status, StatusCode::OK);

    let product = ProductResponse::from_xml(&body).unwrap();
    assert_eq!(product.frame_count(), 0);
    assert!(product.prod_html.contains("no_data"));
}

#[tokio::test]
async fn test_domain_key_is_echoed() {
    let root = tempfile::tempdir().unwrap();
    write_artifact_series(&root.path().join("CONUS/dbz/2.5"), "DBZ", recent(), Duration::minutes(5), 2).unwrap();

    let (status, body) = get(router(root.path()), "/product?fl=DBZ_3D&dm=CONUS&tr=1800&et=now&ht=2.5").await;
    assert_eq!(status, StatusCode::OK);

    let product = ProductResponse::from_xml(&body).unwrap();
    assert_eq!(product.zoom, "CONUS");
    assert_eq!(product.frame_count(), 2);
}

#[tokio::test]
async fn test_bad_parameters_rejected() {
    let root = tempfile::tempdir().unwrap();

    let (status, body) = get(router(root.path()), "/product?zm=REAL_FULL&tr=1800").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("<code>MissingParameterValue</code>"));

    let (status, body) = get(router(root.path()), "/product?fl=CTI_VEL&zm=REAL_FULL&tr=soon").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("<code>InvalidParameterValue</code>"));

    let (status, _) = get(router(root.path()), "/product?fl=CTI_VEL&zm=REAL_FULL&tr=1800&et=yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(router(root.path()), "/product?fl=DBZ_3D&zm=REAL_FULL&tr=1800").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_query_gets_xml_error() {
    let root = tempfile::tempdir().unwrap();
    let (status, body) = get(
        router(root.path()),
        "/product?fl=CTI_VEL&fl=X&zm=REAL_FULL&tr=1800",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with("<?xml"));
    assert!(body.contains("<code>InvalidParameterValue</code>"));
    assert!(body.contains("duplicate field"));
}

#[tokio::test]
async fn test_unknown_product() {
    let root = tempfile::tempdir().unwrap();
    let (status, body) = get(router(root.path()), "/product?fl=NOPE&zm=REAL_FULL&tr=1800").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("<code>UnknownProduct</code>"));
}

// ============================================================================
// Static files, health, metrics
// ============================================================================

#[tokio::test]
async fn test_frames_are_served() {
    let (root, _paths) =
        artifact_tree("REAL_FULL/CTI_VEL", "CTI_VEL", recent(), Duration::minutes(5), 1).unwrap();

    let (_, body) = get(router(root.path()), "/product?fl=CTI_VEL&zm=REAL_FULL&tr=1800&et=now").await;
    let product = ProductResponse::from_xml(&body).unwrap();

    let response = router(root.path())
        .oneshot(
            Request::builder()
                .uri(product.newest_frame().unwrap())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_and_metrics() {
    let root = tempfile::tempdir().unwrap();
    let (status, body) = get(router(root.path()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    let (status, _) = get(router(root.path()), "/metrics").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(router(root.path()), "/api/metrics").await;
    assert_eq!(status, StatusCode::OK);
    let snapshot: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(snapshot["product_requests"], 0);
}

#[tokio::test]
async fn test_xsection_without_tool_configured() {
    let root = tempfile::tempdir().unwrap();
    let (status, _) = get(router(root.path()), "/xsection?fl=DBZ&route=A-B&alt=1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_xsection_round_trip() {
    let root = tempfile::tempdir().unwrap();
    let xs_dir = root.path().join("xs");
    let yaml = format!(
        r#"
data_root: {}
products: []
xsection:
  queue_file: {}
  image_dir: {}
  main_timeout_secs: 5
  plan_timeout_secs: 1
"#,
        root.path().display(),
        xs_dir.join("commands.txt").display(),
        xs_dir.join("images").display(),
    );
    let app = create_router(Arc::new(AppState::new(CatalogConfig::from_yaml_str(&yaml).unwrap())));

    // Stand-in for the ingester: render every requested image once the
    // command file lands.
    let queue = xs_dir.join("commands.txt");
    let images = xs_dir.join("images");
    tokio::spawn(async move {
        let commands = loop {
            if let Ok(text) = tokio::fs::read_to_string(&queue).await {
                break text;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        };
        tokio::fs::create_dir_all(&images).await.unwrap();
        for line in commands.lines() {
            if let Some((_, name)) = line.split_once("_IMAGE_NAME ") {
                tokio::fs::write(images.join(format!("{}.png", name)), b"png").await.unwrap();
            }
        }
    });

    let (status, body) = get(app, "/xsection?t=1717243200&fl=DBZ&route=DEN-COS&alt=2&hfl=VEL").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body.contains("<status>ok</status>"));
    assert!(body.contains("<v_image>/xsection-images/xsv_1717243200_"));
    assert!(body.contains("<h_image>/xsection-images/xsh_1717243200_"));
}

#[tokio::test]
async fn test_malformed_xsection_query_gets_xml_error() {
    let root = tempfile::tempdir().unwrap();
    let yaml = format!(
        "data_root: {}\nproducts: []\nxsection:\n  queue_file: {}\n  image_dir: {}\n",
        root.path().display(),
        root.path().join("commands.txt").display(),
        root.path().join("images").display(),
    );
    let app = create_router(Arc::new(AppState::new(CatalogConfig::from_yaml_str(&yaml).unwrap())));

    let (status, body) = get(app, "/xsection?fl=DBZ&fl=VEL&route=A-B&alt=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("<code>InvalidParameterValue</code>"));
    assert!(!root.path().join("commands.txt").exists());
}
