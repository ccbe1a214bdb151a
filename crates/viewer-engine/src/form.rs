//! Control-change events and their effect on query parameters.

use std::collections::HashSet;

use tracing::debug;
use viewer_common::{DomainKey, EndTime, QueryParameters};

/// One user selection on the product form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    SelectField(String),
    SelectZoom(String),
    SelectDomain(String),
    /// Ignored unless the current field is volumetric
    SetHeight(Option<f64>),
    SetLookback(u32),
    SetEndTime(EndTime),
    ResetToRealtime,
}

/// Applies [`FormEvent`]s to a parameter set.
#[derive(Debug, Clone)]
pub struct FormController {
    volumetric_fields: HashSet<String>,
    defaults: QueryParameters,
}

impl FormController {
    pub fn new(volumetric_fields: impl IntoIterator<Item = String>, defaults: QueryParameters) -> Self {
        Self {
            volumetric_fields: volumetric_fields.into_iter().collect(),
            defaults,
        }
    }

    pub fn is_volumetric(&self, field: &str) -> bool {
        self.volumetric_fields.contains(field)
    }

    /// Apply `event` to `params`. Returns true when anything changed, in
    /// which case the caller owes exactly one fetch.
    pub fn apply(&self, params: &mut QueryParameters, event: FormEvent) -> bool {
        let before = params.clone();

        match event {
            FormEvent::SelectField(field) => {
                if !self.is_volumetric(&field) {
                    params.height = None;
                }
                params.field = field;
            }
            FormEvent::SelectZoom(key) => params.domain = DomainKey::Zoom(key),
            FormEvent::SelectDomain(key) => params.domain = DomainKey::Domain(key),
            FormEvent::SetHeight(height) => {
                if self.is_volumetric(&params.field) {
                    params.height = height;
                } else {
                    debug!(field = %params.field, "Ignoring height for non-volumetric field");
                }
            }
            FormEvent::SetLookback(secs) => params.lookback_secs = secs,
            FormEvent::SetEndTime(end_time) => params.end_time = end_time,
            FormEvent::ResetToRealtime => *params = self.defaults.clone(),
        }

        *params != before
    }
}
