//! Printer device seam
//!
//! The host print subsystem owns page scheduling: a submitted job calls back
//! once per physical page until the caller answers that no pages remain.

use super::geometry::{Orientation, Placement};

/// Index of the forced paper size among the device's supported sizes.
///
/// Carried over from the original driver coupling; which size lives at this
/// index is printer-driver-dependent, so targets should keep a stable table.
pub const FORCED_PAPER_SIZE_INDEX: usize = 6;

/// Faults from the print target. Settings faults are fatal for the job;
/// there is no retry.
#[derive(Debug, thiserror::Error)]
pub enum DeviceFault {
    #[error("unknown printer `{name}`")]
    UnknownPrinter { name: String },

    #[error("paper source index {index} out of range ({available} available)")]
    BadPaperSource { index: usize, available: usize },

    #[error("paper size index {index} out of range ({available} available)")]
    BadPaperSize { index: usize, available: usize },

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("{detail}")]
    Job { detail: String },
}

impl DeviceFault {
    pub fn job(msg: impl Into<String>) -> Self {
        Self::Job { detail: msg.into() }
    }
}

/// A paper tray exposed by the device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaperSource {
    pub name: String,
}

/// A physical paper size exposed by the device, in hundredths of an inch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaperSize {
    pub name: String,
    pub width: i32,
    pub height: i32,
}

/// Page margins in hundredths of an inch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Margins {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

/// Settings for one job submission. Jobs always cover every page.
#[derive(Clone, Debug)]
pub struct JobSettings {
    pub printer_name: String,
    pub orientation: Orientation,
    pub paper_source: PaperSource,
    /// Forced physical paper size, set only for the half-letter override.
    pub forced_paper_size: Option<PaperSize>,
    pub margins: Margins,
    /// Draw origin starts at the margin corner rather than the paper edge.
    pub origin_at_margins: bool,
}

/// One drawing record handed to the device for playback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayedRecord {
    pub record_type: u32,
    pub flags: u32,
    pub payload: Vec<u8>,
}

/// Whether the host should schedule another page callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageAdvance {
    MorePages,
    Done,
}

/// Drawing surface for one physical page.
pub trait PageCanvas {
    /// Announce where the page lands on the device surface.
    fn place(&mut self, placement: &Placement) -> Result<(), DeviceFault>;

    /// Play one drawing record onto the page.
    fn play_record(&mut self, record: &PlayedRecord) -> Result<(), DeviceFault>;
}

/// A print target: knows its trays and paper sizes, and drives the
/// page-advance loop for a submitted job.
pub trait PrintTarget {
    fn paper_sources(&self) -> Result<Vec<PaperSource>, DeviceFault>;

    fn paper_sizes(&self) -> Result<Vec<PaperSize>, DeviceFault>;

    /// Run one job to completion. The target invokes `next_page` once per
    /// physical page, handing it that page's canvas, until it answers
    /// [`PageAdvance::Done`].
    fn run_job(
        &mut self,
        settings: &JobSettings,
        next_page: &mut dyn FnMut(&mut dyn PageCanvas) -> PageAdvance,
    ) -> Result<(), DeviceFault>;
}
