use std::fmt;

use chrono::{DateTime, Utc};
use viewer_common::{ViewerError, ViewerResult};

/// One line of the remote-control command file.
#[derive(Debug, Clone, PartialEq)]
pub enum XsCommand {
    SetRequestTime(i64),
    SelectVPage(String),
    SelectRoute(String),
    SetAltitude(f64),
    SetVImageName(String),
    DumpVImage,
    SelectHPage(String),
    SetHImageName(String),
    DumpHImage,
}

impl fmt::Display for XsCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XsCommand::SetRequestTime(epoch) => write!(f, "SET_REQUEST_TIME {}", epoch),
            XsCommand::SelectVPage(field) => write!(f, "SELECT_V_PAGE {}", field),
            XsCommand::SelectRoute(route) => write!(f, "SELECT_ROUTE {}", route),
            XsCommand::SetAltitude(level) => write!(f, "SET_ALTITUDE {}", level),
            XsCommand::SetVImageName(name) => write!(f, "SET_V_IMAGE_NAME {}", name),
            XsCommand::DumpVImage => f.write_str("DUMP_V_IMAGE"),
            XsCommand::SelectHPage(field) => write!(f, "SELECT_H_PAGE {}", field),
            XsCommand::SetHImageName(name) => write!(f, "SET_H_IMAGE_NAME {}", name),
            XsCommand::DumpHImage => f.write_str("DUMP_H_IMAGE"),
        }
    }
}

/// Optional plan-view image rendered alongside the cross-section.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanView {
    pub field: String,
    pub image_name: String,
}

/// Everything needed to render one vertical cross-section.
#[derive(Debug, Clone, PartialEq)]
pub struct XsectionRequest {
    pub request_time: DateTime<Utc>,
    pub field: String,
    pub route: String,
    pub altitude: f64,
    pub image_name: String,
    pub plan_view: Option<PlanView>,
}

impl XsectionRequest {
    /// Arguments are single tokens on a line; reject anything that would
    /// split or inject a command.
    pub fn validate(&self) -> ViewerResult<()> {
        let mut tokens = vec![
            ("fl", self.field.as_str()),
            ("route", self.route.as_str()),
            ("image_name", self.image_name.as_str()),
        ];
        if let Some(plan) = &self.plan_view {
            tokens.push(("hfl", plan.field.as_str()));
            tokens.push(("h_image_name", plan.image_name.as_str()));
        }

        for (param, value) in tokens {
            if value.is_empty() {
                return Err(ViewerError::MissingParameter(param.to_string()));
            }
            if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
                return Err(ViewerError::InvalidParameter {
                    param: param.to_string(),
                    message: "must be a single token".to_string(),
                });
            }
        }
        if !self.altitude.is_finite() {
            return Err(ViewerError::InvalidParameter {
                param: "alt".to_string(),
                message: "altitude must be finite".to_string(),
            });
        }
        Ok(())
    }

    /// Command sequence for this request, vertical image first.
    pub fn commands(&self) -> Vec<XsCommand> {
        let mut commands = vec![
            XsCommand::SetRequestTime(self.request_time.timestamp()),
            XsCommand::SelectVPage(self.field.clone()),
            XsCommand::SelectRoute(self.route.clone()),
            XsCommand::SetAltitude(self.altitude),
            XsCommand::SetVImageName(self.image_name.clone()),
            XsCommand::DumpVImage,
        ];
        if let Some(plan) = &self.plan_view {
            commands.push(XsCommand::SelectHPage(plan.field.clone()));
            commands.push(XsCommand::SetHImageName(plan.image_name.clone()));
            commands.push(XsCommand::DumpHImage);
        }
        commands
    }
}
