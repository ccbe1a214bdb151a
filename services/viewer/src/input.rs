//! Line-oriented control input.
//!
//! ```text
//! play | stop | first | last | prev | next
//! fl CTI_VEL        select field
//! zm REAL_FULL      select zoom
//! dm CONUS          select domain
//! ht 2.5 | ht none  set or clear height
//! tr 3600           lookback seconds
//! et now | et 2024-06-01_12:00:00
//! reset             back to realtime
//! ```

use viewer_common::EndTime;
use viewer_engine::{FormEvent, PlaybackMode, ViewerCommand};

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ViewerCommand>, String> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(format!("too many arguments in '{}'", line.trim()));
    }

    let required = |name: &str| arg.ok_or_else(|| format!("'{}' needs a value", name));

    let event = match word.to_ascii_lowercase().as_str() {
        "fl" => FormEvent::SelectField(required("fl")?.to_string()),
        "zm" => FormEvent::SelectZoom(required("zm")?.to_string()),
        "dm" => FormEvent::SelectDomain(required("dm")?.to_string()),
        "ht" => match required("ht")? {
            "none" => FormEvent::SetHeight(None),
            value => FormEvent::SetHeight(Some(
                value
                    .parse::<f64>()
                    .ok()
                    .filter(|h| h.is_finite())
                    .ok_or_else(|| format!("'{}' is not a height", value))?,
            )),
        },
        "tr" => {
            let value = required("tr")?;
            FormEvent::SetLookback(
                value
                    .parse::<u32>()
                    .map_err(|_| format!("'{}' is not a number of seconds", value))?,
            )
        }
        "et" => FormEvent::SetEndTime(EndTime::parse(required("et")?).map_err(|e| e.to_string())?),
        "reset" => FormEvent::ResetToRealtime,
        mode => {
            if arg.is_some() {
                return Err(format!("'{}' takes no value", mode));
            }
            return mode.parse::<PlaybackMode>().map(|m| Some(ViewerCommand::SetMode(m)));
        }
    };

    Ok(Some(ViewerCommand::Form(event)))
}
