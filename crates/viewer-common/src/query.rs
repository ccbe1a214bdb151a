//! Product query parameters and their query-string encoding.
//!
//! Wire names:
//! - `fl`: product field key
//! - `zm` / `dm`: zoom or domain key
//! - `tr`: lookback window in seconds
//! - `et`: end time (`now` or `YYYY-MM-DD_hh:mm:ss`)
//! - `ht`: height, only sent for volumetric fields

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::{ViewerError, ViewerResult};
use crate::time::EndTime;

/// Zoom or domain selector. Both pick a spatial view; they differ only
/// in which query parameter carries the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainKey {
    Zoom(String),
    Domain(String),
}

impl DomainKey {
    pub fn param_name(&self) -> &'static str {
        match self {
            DomainKey::Zoom(_) => "zm",
            DomainKey::Domain(_) => "dm",
        }
    }

    pub fn key(&self) -> &str {
        match self {
            DomainKey::Zoom(k) | DomainKey::Domain(k) => k,
        }
    }
}

/// Everything the product service needs to pick a frame list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParameters {
    pub field: String,
    pub domain: DomainKey,
    #[serde(default)]
    pub height: Option<f64>,
    pub lookback_secs: u32,
    #[serde(default)]
    pub end_time: EndTime,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            field: "CTI_VEL".to_string(),
            domain: DomainKey::Zoom("REAL_FULL".to_string()),
            height: None,
            lookback_secs: 1800,
            end_time: EndTime::Now,
        }
    }
}

impl QueryParameters {
    /// Name/value pairs in wire order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("fl", self.field.clone()),
            (self.domain.param_name(), self.domain.key().to_string()),
            ("tr", self.lookback_secs.to_string()),
            ("et", self.end_time.to_string()),
        ];
        if let Some(h) = self.height {
            pairs.push(("ht", h.to_string()));
        }
        pairs
    }

    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in self.query_pairs() {
            serializer.append_pair(name, &value);
        }
        serializer.finish()
    }

    pub fn from_query_string(query: &str) -> ViewerResult<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut raw = ProductQuery::default();
        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = Some(value.into_owned());
            match name.as_ref() {
                "fl" => raw.fl = value,
                "zm" => raw.zm = value,
                "dm" => raw.dm = value,
                "tr" => raw.tr = value,
                "et" => raw.et = value,
                "ht" => raw.ht = value,
                _ => {}
            }
        }
        Self::try_from(raw)
    }
}

/// Raw, unvalidated query as received by the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub fl: Option<String>,
    pub zm: Option<String>,
    pub dm: Option<String>,
    pub tr: Option<String>,
    pub et: Option<String>,
    pub ht: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl TryFrom<ProductQuery> for QueryParameters {
    type Error = ViewerError;

    fn try_from(raw: ProductQuery) -> Result<Self, Self::Error> {
        let field = non_empty(raw.fl).ok_or_else(|| ViewerError::MissingParameter("fl".into()))?;

        // zm wins when a caller sends both
        let domain = match (non_empty(raw.zm), non_empty(raw.dm)) {
            (Some(zm), _) => DomainKey::Zoom(zm),
            (None, Some(dm)) => DomainKey::Domain(dm),
            (None, None) => return Err(ViewerError::MissingParameter("zm".into())),
        };

        let tr = non_empty(raw.tr).ok_or_else(|| ViewerError::MissingParameter("tr".into()))?;
        let lookback_secs = tr
            .parse::<u32>()
            .map_err(|_| ViewerError::invalid("tr", format!("'{}' is not a whole number of seconds", tr)))?;

        let end_time = match non_empty(raw.et) {
            Some(et) => EndTime::parse(&et).map_err(|e| ViewerError::invalid("et", e.to_string()))?,
            None => EndTime::Now,
        };

        let height = match non_empty(raw.ht) {
            Some(ht) => {
                let h = ht
                    .parse::<f64>()
                    .map_err(|_| ViewerError::invalid("ht", format!("'{}' is not numeric", ht)))?;
                if !h.is_finite() {
                    return Err(ViewerError::invalid("ht", "height must be finite"));
                }
                Some(h)
            }
            None => None,
        };

        Ok(Self {
            field,
            domain,
            height,
            lookback_secs,
            end_time,
        })
    }
}
