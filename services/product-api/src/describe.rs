//! Builds product descriptions from the catalog and the file selector.

use chrono::{DateTime, Utc};
use product_selector::ProductSelector;
use quick_xml::escape::escape;
use tracing::debug;
use viewer_common::{ProductResponse, QueryParameters, ViewerError, ViewerResult};

use crate::config::CatalogConfig;

/// Describe the frames matching `params` as of `now`.
///
/// Zero matching frames is a normal, well-formed answer.
pub fn describe_product(
    catalog: &CatalogConfig,
    selector: &ProductSelector,
    params: &QueryParameters,
    now: DateTime<Utc>,
) -> ViewerResult<ProductResponse> {
    let product = catalog
        .product(&params.field)
        .ok_or_else(|| ViewerError::UnknownProduct(params.field.clone()))?;

    let dir = product.search_dir(&catalog.data_root, params)?;
    let artifacts = selector.select(
        product.selection_key(),
        &dir,
        params.lookback_secs,
        &params.end_time,
        now,
    )?;

    let frames: Vec<String> = artifacts
        .iter()
        .filter_map(|a| catalog.frame_url(&a.path))
        .collect();
    debug!(field = %params.field, dir = %dir.display(), frames = frames.len(), "Described product");

    let window = params.end_time.window(params.lookback_secs, now);
    let title = escape(&product.title);

    let prod_html = match frames.last() {
        Some(newest) => format!(
            r#"<img id="anim_image" src="{}" alt="{}"/>"#,
            escape(newest),
            title
        ),
        None => format!(
            r#"<div class="no_data">No {} images between {} and {} UTC</div>"#,
            title,
            window.start.format("%Y-%m-%d %H:%M:%S"),
            window.end.format("%Y-%m-%d %H:%M:%S"),
        ),
    };

    let status_html = format!(
        r#"<span class="status">Updated {} UTC, {} frame(s), {}</span>"#,
        now.format("%Y-%m-%d %H:%M:%S"),
        frames.len(),
        if params.end_time.is_realtime() { "realtime" } else { "archive" },
    );

    Ok(ProductResponse {
        title: product.title.clone(),
        select: params.field.clone(),
        prod_html,
        status_html,
        target: product.target(catalog).to_string(),
        zoom: params.domain.key().to_string(),
        frames,
    })
}
