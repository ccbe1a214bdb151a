//! Canned product documents for viewer tests.

use viewer_common::ProductResponse;

/// A product response carrying `n` frames named `frame_<i>.png`.
pub fn product_with_frames(n: usize) -> ProductResponse {
    ProductResponse {
        title: "CTI velocity".to_string(),
        select: "CTI_VEL".to_string(),
        prod_html: "<img id=\"anim_image\"/>".to_string(),
        status_html: "Updated 2024-06-01 12:00:00 UTC".to_string(),
        target: "anim_div".to_string(),
        zoom: "REAL_FULL".to_string(),
        frames: (0..n).map(|i| format!("/images/frame_{}.png", i)).collect(),
    }
}

/// Serialized form of [`product_with_frames`].
pub fn product_xml_with_frames(n: usize) -> String {
    product_with_frames(n)
        .to_xml()
        .expect("fixture product always serializes")
}

/// A document that is valid XML but lacks `<nframes>`.
pub const PRODUCT_XML_MISSING_NFRAMES: &str = r#"<?xml version="1.0"?>
<product>
  <title>t</title>
  <select>CTI_VEL</select>
  <prod_html></prod_html>
  <status_html></status_html>
  <target>anim_div</target>
  <zm>REAL_FULL</zm>
</product>"#;
