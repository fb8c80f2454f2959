//! Render request building blocks
//!
//! Report parameters travel as a `name~value` list joined with `|`; the
//! renderer itself is steered through a small device-info XML fragment.

use super::renderer::RenderFault;

/// Render format passed to every render call.
pub const OUTPUT_FORMAT: &str = "IMAGE";

/// Output format named inside the device-info fragment.
pub const STREAM_FORMAT: &str = "emf";

/// Locale fixed for every rendering session.
pub const RENDER_LOCALE: &str = "en-us";

const PARAMETER_DELIMITER: char = '|';
const NAME_VALUE_DELIMITER: char = '~';

/// One report parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportParameter {
    pub name: String,
    pub value: String,
}

/// Parse a raw parameter string into ordered parameters.
///
/// An empty input yields no parameters. An entry without the `~` separator
/// fails the whole call before anything reaches the renderer.
pub fn parse_parameters(raw: &str) -> Result<Vec<ReportParameter>, RenderFault> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    raw.split(PARAMETER_DELIMITER)
        .map(|entry| {
            let (name, value) =
                entry
                    .split_once(NAME_VALUE_DELIMITER)
                    .ok_or_else(|| RenderFault::BadParameter {
                        entry: entry.to_string(),
                    })?;
            Ok(ReportParameter {
                name: name.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

/// Build the device-info fragment for one render call.
///
/// The first call carries only the output format; every later call adds the
/// start-page directive for the page it wants.
#[must_use]
pub fn device_info(start_page: Option<usize>) -> String {
    match start_page {
        None => format!("<DeviceInfo><OutputFormat>{STREAM_FORMAT}</OutputFormat></DeviceInfo>"),
        Some(page) => format!(
            "<DeviceInfo><OutputFormat>{STREAM_FORMAT}</OutputFormat><StartPage>{page}</StartPage></DeviceInfo>"
        ),
    }
}

/// Read the start-page directive back out of a device-info fragment.
///
/// Used by renderer implementations that honor `StartPage` themselves
/// (the directory-backed renderer, the scripted test renderer).
#[must_use]
pub fn parse_start_page(device_info: &str) -> Option<usize> {
    let doc = roxmltree::Document::parse(device_info).ok()?;
    doc.descendants()
        .find(|node| node.has_tag_name("StartPage"))
        .and_then(|node| node.text())
        .and_then(|text| text.trim().parse().ok())
}
