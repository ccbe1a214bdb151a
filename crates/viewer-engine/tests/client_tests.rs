//! HTTP client tests against an in-process axum server.

use std::net::SocketAddr;

use axum::{extract::Query, http::header, http::StatusCode, response::IntoResponse, routing::get, Router};
use test_utils::{product_with_frames, product_xml_with_frames, PRODUCT_XML_MISSING_NFRAMES};
use viewer_common::{DomainKey, EndTime, ProductQuery, ProductResponse, QueryParameters, ViewerError};
use viewer_engine::{HttpProductClient, ProductClient};

async fn echo_handler(Query(query): Query<ProductQuery>) -> impl IntoResponse {
    let params = QueryParameters::try_from(query).unwrap();
    let product = ProductResponse {
        select: params.field.clone(),
        zoom: params.domain.key().to_string(),
        title: params.end_time.to_string(),
        ..product_with_frames(params.lookback_secs as usize / 600)
    };
    (
        [(header::CONTENT_TYPE, "application/xml")],
        product.to_xml().unwrap(),
    )
}

async fn serve() -> SocketAddr {
    let app = Router::new()
        .route("/product", get(|| async { product_xml_with_frames(3) }))
        .route("/echo", get(echo_handler))
        .route("/down", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }))
        .route("/partial", get(|| async { PRODUCT_XML_MISSING_NFRAMES }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr, path: &str) -> HttpProductClient {
    HttpProductClient::new(format!("http://{}{}", addr, path)).unwrap()
}

#[tokio::test]
async fn test_fetch_parses_product() {
    let addr = serve().await;
    let product = client(addr, "/product")
        .fetch(&QueryParameters::default())
        .await
        .unwrap();
    assert_eq!(product.frame_count(), 3);
    assert_eq!(product.newest_frame(), Some("/images/frame_2.png"));
}

#[tokio::test]
async fn test_query_parameters_reach_the_service() {
    let addr = serve().await;
    let params = QueryParameters {
        field: "DBZ".into(),
        domain: DomainKey::Domain("CONUS".into()),
        height: Some(1.5),
        lookback_secs: 3000,
        end_time: EndTime::parse("2024-02-29_23:59:59").unwrap(),
    };
    let product = client(addr, "/echo").fetch(&params).await.unwrap();
    assert_eq!(product.select, "DBZ");
    assert_eq!(product.zoom, "CONUS");
    assert_eq!(product.title, "2024-02-29_23:59:59");
    assert_eq!(product.frame_count(), 5);
}

#[tokio::test]
async fn test_non_200_is_http_error() {
    let addr = serve().await;
    let err = client(addr, "/down")
        .fetch(&QueryParameters::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ViewerError::Http { status: 503 }));
}

#[tokio::test]
async fn test_missing_element_is_parse_error() {
    let addr = serve().await;
    let err = client(addr, "/partial")
        .fetch(&QueryParameters::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ViewerError::Parse(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr, "/product")
        .fetch(&QueryParameters::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ViewerError::Transport(_)));
}
