//! Print invocation surface

use log::{info, warn};

use super::device::{
    DeviceFault, JobSettings, Margins, PrintTarget, FORCED_PAPER_SIZE_INDEX,
};
use super::geometry::{Orientation, PlacementPolicy};
use super::paginator::render_report_pages;
use super::renderer::{RenderFault, ReportRenderer};
use super::session::PrintSession;

/// A print call that could not complete.
#[derive(Debug, thiserror::Error)]
pub enum PrintFault {
    #[error(transparent)]
    Render(#[from] RenderFault),

    #[error(transparent)]
    Device(#[from] DeviceFault),
}

/// Print a report: render every page, then run the device's page loop.
///
/// Returns `Ok(false)` — without touching the printer — when the report
/// rendered zero pages, and `Ok(true)` once the page-advance loop has run to
/// completion. Renderer and device-settings faults abort the call.
#[expect(clippy::too_many_arguments, reason = "mirrors the caller-facing print contract")]
pub fn print_report(
    renderer: &mut dyn ReportRenderer,
    printer: &mut dyn PrintTarget,
    printer_name: &str,
    report_path: &str,
    paper_source_index: usize,
    parameters: &str,
    landscape: bool,
    page_size_override: &str,
) -> Result<bool, PrintFault> {
    let policy = PlacementPolicy::from_override(page_size_override);
    let orientation = if landscape {
        Orientation::Landscape
    } else {
        Orientation::Portrait
    };

    let pages = render_report_pages(renderer, report_path, parameters)?;
    if pages.is_empty() {
        info!("Nothing to print for {report_path}");
        return Ok(false);
    }

    let sources = printer.paper_sources()?;
    let paper_source = sources
        .get(paper_source_index)
        .cloned()
        .ok_or(DeviceFault::BadPaperSource {
            index: paper_source_index,
            available: sources.len(),
        })?;

    let forced_paper_size = if policy == PlacementPolicy::ForceHalfLetter {
        let sizes = printer.paper_sizes()?;
        let size = sizes
            .get(FORCED_PAPER_SIZE_INDEX)
            .cloned()
            .ok_or(DeviceFault::BadPaperSize {
                index: FORCED_PAPER_SIZE_INDEX,
                available: sizes.len(),
            })?;
        Some(size)
    } else {
        None
    };

    let settings = JobSettings {
        printer_name: printer_name.to_string(),
        orientation,
        paper_source,
        forced_paper_size,
        margins: Margins::default(),
        origin_at_margins: true,
    };
    info!(
        "Printing {} page(s) of {report_path} to {printer_name} ({}, {:?})",
        pages.len(),
        policy.as_str(),
        orientation
    );

    let mut session = PrintSession::new(pages, policy, orientation);
    printer.run_job(&settings, &mut |canvas| session.advance(canvas))?;

    if !session.is_done() {
        warn!(
            "Job for {report_path} stopped at page {} of {}",
            session.current_page(),
            session.page_count()
        );
    }

    Ok(true)
}
