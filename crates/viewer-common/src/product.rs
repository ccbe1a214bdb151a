//! Product description document exchanged between the service and the viewer.
//!
//! ```xml
//! <product>
//!   <title>..</title>
//!   <select>..</select>
//!   <prod_html>..</prod_html>
//!   <status_html>..</status_html>
//!   <target>..</target>
//!   <zm>..</zm>
//!   <nframes>N</nframes>
//!   <frame>..</frame>   (N times, oldest first)
//! </product>
//! ```

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{ViewerError, ViewerResult};

/// One parsed product description.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductResponse {
    pub title: String,
    /// Echoed product field key
    pub select: String,
    pub prod_html: String,
    pub status_html: String,
    /// Mount point the fragments are meant for
    pub target: String,
    /// Echoed zoom/domain key
    pub zoom: String,
    /// Frame references, oldest first
    pub frames: Vec<String>,
}

impl ProductResponse {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn newest_frame(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }

    /// Serialize to the XML document served by `/product`.
    pub fn to_xml(&self) -> ViewerResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        write_product(&mut writer, self).map_err(|e| ViewerError::Parse(format!("XML write failed: {}", e)))?;
        String::from_utf8(writer.into_inner()).map_err(|e| ViewerError::Parse(e.to_string()))
    }

    /// Parse a `/product` document. Every element except `frame` is required,
    /// and the `frame` count must equal `nframes`.
    pub fn from_xml(xml: &str) -> ViewerResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut text = String::new();
        let mut fields = PartialProduct::default();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(_)) => text.clear(),
                Ok(Event::Text(t)) => {
                    let unescaped = t
                        .unescape()
                        .map_err(|e| ViewerError::Parse(format!("bad text content: {}", e)))?;
                    text.push_str(&unescaped);
                }
                Ok(Event::CData(c)) => {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
                Ok(Event::End(e)) => {
                    fields.assign(e.name().as_ref(), std::mem::take(&mut text))?;
                }
                Ok(Event::Empty(e)) => {
                    fields.assign(e.name().as_ref(), String::new())?;
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(ViewerError::Parse(format!(
                        "XML parsing error at position {}: {:?}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        fields.finish()
    }
}

fn write_product(writer: &mut Writer<Vec<u8>>, product: &ProductResponse) -> quick_xml::Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("product")))?;

    let scalars = [
        ("title", product.title.as_str()),
        ("select", product.select.as_str()),
        ("prod_html", product.prod_html.as_str()),
        ("status_html", product.status_html.as_str()),
        ("target", product.target.as_str()),
        ("zm", product.zoom.as_str()),
    ];
    for (name, value) in scalars {
        writer.create_element(name).write_text_content(BytesText::new(value))?;
    }

    let nframes = product.frames.len().to_string();
    writer
        .create_element("nframes")
        .write_text_content(BytesText::new(&nframes))?;
    for frame in &product.frames {
        writer.create_element("frame").write_text_content(BytesText::new(frame))?;
    }

    writer.write_event(Event::End(BytesEnd::new("product")))?;
    Ok(())
}

#[derive(Default)]
struct PartialProduct {
    title: Option<String>,
    select: Option<String>,
    prod_html: Option<String>,
    status_html: Option<String>,
    target: Option<String>,
    zoom: Option<String>,
    nframes: Option<usize>,
    frames: Vec<String>,
}

impl PartialProduct {
    fn assign(&mut self, element: &[u8], value: String) -> ViewerResult<()> {
        match element {
            b"title" => self.title = Some(value),
            b"select" => self.select = Some(value),
            b"prod_html" => self.prod_html = Some(value),
            b"status_html" => self.status_html = Some(value),
            b"target" => self.target = Some(value),
            b"zm" => self.zoom = Some(value),
            b"nframes" => {
                let n = value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ViewerError::Parse(format!("nframes '{}' is not a count", value)))?;
                self.nframes = Some(n);
            }
            b"frame" => self.frames.push(value),
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> ViewerResult<ProductResponse> {
        fn required<T>(value: Option<T>, name: &str) -> ViewerResult<T> {
            value.ok_or_else(|| ViewerError::Parse(format!("missing <{}> element", name)))
        }

        let nframes = required(self.nframes, "nframes")?;
        if nframes != self.frames.len() {
            return Err(ViewerError::Parse(format!(
                "nframes is {} but {} frame elements were found",
                nframes,
                self.frames.len()
            )));
        }

        Ok(ProductResponse {
            title: required(self.title, "title")?,
            select: required(self.select, "select")?,
            prod_html: required(self.prod_html, "prod_html")?,
            status_html: required(self.status_html, "status_html")?,
            target: required(self.target, "target")?,
            zoom: required(self.zoom, "zm")?,
            frames: self.frames,
        })
    }
}
