//! HTTP request handlers.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Deserialize;
use tracing::{error, info, warn};
use viewer_common::{ProductQuery, QueryParameters, ViewerError, ViewerResult};
use xsection::{PlanView, XsectionRequest};

use crate::describe::describe_product;
use crate::state::AppState;

static XSECTION_SEQ: AtomicU64 = AtomicU64::new(0);

// ============================================================================
// /product
// ============================================================================

pub async fn product_handler(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<ProductQuery>, QueryRejection>,
) -> Response {
    let started = Instant::now();

    let params = match query.map_err(rejected_query).and_then(|Query(q)| QueryParameters::try_from(q)) {
        Ok(params) => params,
        Err(e) => {
            state.metrics.record_product_error(e.code());
            return error_response(&e);
        }
    };

    let now = Utc::now();
    let task_state = state.clone();
    let task_params = params.clone();
    // Directory scans are blocking
    let described = tokio::task::spawn_blocking(move || {
        describe_product(&task_state.catalog, &task_state.selector, &task_params, now)
    })
    .await
    .unwrap_or_else(|e| {
        Err(ViewerError::Io(io::Error::new(
            io::ErrorKind::Other,
            format!("selection task failed: {}", e),
        )))
    });

    let xml = described.and_then(|product| {
        let frames = product.frame_count();
        product.to_xml().map(|xml| (xml, frames))
    });

    match xml {
        Ok((xml, frames)) => {
            state.metrics.record_product(frames, started.elapsed());
            info!(
                field = %params.field,
                zoom = %params.domain.key(),
                lookback = params.lookback_secs,
                end_time = %params.end_time,
                frames,
                "Product described"
            );
            xml_response(StatusCode::OK, xml)
        }
        Err(e) => {
            state.metrics.record_product_error(e.code());
            warn!(field = %params.field, error = %e, "Product request failed");
            error_response(&e)
        }
    }
}

// ============================================================================
// /xsection
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct XsectionQuery {
    pub t: Option<String>,
    pub fl: Option<String>,
    pub route: Option<String>,
    pub alt: Option<String>,
    pub hfl: Option<String>,
}

impl XsectionQuery {
    /// Build a render request. Image names come from the request time plus a
    /// process-wide sequence number, never from user input.
    pub fn into_request(self, now: DateTime<Utc>) -> ViewerResult<XsectionRequest> {
        let request_time = match self.t.as_deref().filter(|s| !s.is_empty()) {
            Some(t) => t
                .parse::<i64>()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .ok_or_else(|| ViewerError::InvalidParameter {
                    param: "t".into(),
                    message: format!("'{}' is not an epoch timestamp", t),
                })?,
            None => now,
        };

        let field = self.fl.ok_or_else(|| ViewerError::MissingParameter("fl".into()))?;
        let route = self.route.ok_or_else(|| ViewerError::MissingParameter("route".into()))?;
        let alt = self.alt.ok_or_else(|| ViewerError::MissingParameter("alt".into()))?;
        let altitude = alt.trim().parse::<f64>().map_err(|_| ViewerError::InvalidParameter {
            param: "alt".into(),
            message: format!("'{}' is not a number", alt),
        })?;

        let seq = XSECTION_SEQ.fetch_add(1, Ordering::Relaxed);
        let stamp = request_time.timestamp();
        let plan_view = self.hfl.filter(|f| !f.is_empty()).map(|field| PlanView {
            field,
            image_name: format!("xsh_{}_{}", stamp, seq),
        });

        Ok(XsectionRequest {
            request_time,
            field,
            route,
            altitude,
            image_name: format!("xsv_{}_{}", stamp, seq),
            plan_view,
        })
    }
}

pub async fn xsection_handler(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<XsectionQuery>, QueryRejection>,
) -> Response {
    let (Some(client), Some(settings)) = (&state.xsection, &state.catalog.xsection) else {
        return error_response(&ViewerError::UnknownProduct("xsection".into()));
    };

    let request = match query.map_err(rejected_query).and_then(|Query(q)| q.into_request(Utc::now())) {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };

    let started = Instant::now();
    let mut shutdown = state.shutdown.subscribe();
    let prefix = settings.image_url_prefix.trim_end_matches('/');
    let image_url = |path: &std::path::Path| {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        format!("{}/{}", prefix, name)
    };

    match client.render(&request, &mut shutdown).await {
        Ok(images) => {
            state.metrics.record_xsection(false, started.elapsed());
            let v_image = image_url(&images.vertical);
            let h_image = images.horizontal.as_deref().map(image_url);
            let mut fields = vec![("status", "ok".to_string()), ("v_image", v_image)];
            if let Some(h) = h_image {
                fields.push(("h_image", h));
            }
            document_response(StatusCode::OK, "xsection", &fields)
        }
        Err(e @ ViewerError::RenderTimeout { .. }) => {
            state.metrics.record_xsection(true, started.elapsed());
            warn!(error = %e, "Cross-section timed out");
            document_response(
                StatusCode::GATEWAY_TIMEOUT,
                "xsection",
                &[("status", "timeout".to_string()), ("message", e.to_string())],
            )
        }
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// Health and metrics
// ============================================================================

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    match &state.prometheus {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::OK, "# metrics\n".to_string()),
    }
}

/// JSON counters for dashboards
pub async fn api_metrics_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}

// ============================================================================
// Response helpers
// ============================================================================

/// Query strings axum cannot deserialize (repeated keys, bad encoding).
fn rejected_query(rejection: QueryRejection) -> ViewerError {
    ViewerError::InvalidParameter {
        param: "query".into(),
        message: rejection.body_text(),
    }
}

fn xml_response(status: StatusCode, xml: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/xml")], xml).into_response()
}

/// `<error><code/><message/></error>` with the status matching the error kind.
pub fn error_response(e: &ViewerError) -> Response {
    let status = StatusCode::from_u16(e.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    document_response(
        status,
        "error",
        &[("code", e.code().to_string()), ("message", e.to_string())],
    )
}

fn document_response(status: StatusCode, root: &str, fields: &[(&str, String)]) -> Response {
    match write_document(root, fields) {
        Ok(xml) => xml_response(status, xml),
        Err(e) => {
            error!(error = %e, "Failed to write XML response");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}

fn write_document(root: &str, fields: &[(&str, String)]) -> quick_xml::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(root)))?;
    for (name, value) in fields {
        writer.create_element(*name).write_text_content(BytesText::new(value))?;
    }
    writer.write_event(Event::End(BytesEnd::new(root)))?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(fl: &str, route: &str, alt: &str) -> XsectionQuery {
        XsectionQuery {
            t: Some("1717243200".into()),
            fl: Some(fl.into()),
            route: Some(route.into()),
            alt: Some(alt.into()),
            hfl: None,
        }
    }

    #[test]
    fn test_xsection_query_builds_request() {
        let request = query("DBZ", "DEN-COS", "2.5").into_request(Utc::now()).unwrap();
        assert_eq!(request.request_time.timestamp(), 1717243200);
        assert_eq!(request.field, "DBZ");
        assert_eq!(request.altitude, 2.5);
        assert!(request.image_name.starts_with("xsv_1717243200_"));
        assert!(request.plan_view.is_none());
    }

    #[test]
    fn test_xsection_query_plan_view() {
        let q = XsectionQuery {
            hfl: Some("VEL".into()),
            ..query("DBZ", "DEN-COS", "1")
        };
        let request = q.into_request(Utc::now()).unwrap();
        let plan = request.plan_view.unwrap();
        assert_eq!(plan.field, "VEL");
        assert!(plan.image_name.starts_with("xsh_1717243200_"));
    }

    #[test]
    fn test_xsection_query_errors() {
        let missing = XsectionQuery {
            route: None,
            ..query("DBZ", "R", "1")
        };
        assert!(matches!(
            missing.into_request(Utc::now()),
            Err(ViewerError::MissingParameter(p)) if p == "route"
        ));

        assert!(matches!(
            query("DBZ", "R", "high").into_request(Utc::now()),
            Err(ViewerError::InvalidParameter { param, .. }) if param == "alt"
        ));

        let bad_time = XsectionQuery {
            t: Some("yesterday".into()),
            ..query("DBZ", "R", "1")
        };
        assert!(bad_time.into_request(Utc::now()).is_err());
    }

    #[test]
    fn test_join_failure_is_not_a_transport_error() {
        let e = ViewerError::Io(io::Error::new(io::ErrorKind::Other, "selection task failed"));
        assert_eq!(e.code(), "IoError");
        let response = error_response(&e);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_write_document_escapes() {
        let xml = write_document("error", &[("message", "a < b & c".to_string())]).unwrap();
        assert!(xml.contains("<message>a &lt; b &amp; c</message>"));
    }
}
