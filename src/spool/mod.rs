//! Paginated report printing pipeline
//!
//! Pagination first: the remote renderer is driven until exhaustion and every
//! page lands in a [`PageStore`]. Printing second: the device's page-advance
//! loop replays one stored page at a time through a [`PrintSession`].

mod device;
mod geometry;
mod job;
mod metafile;
mod offline;
mod paginator;
mod renderer;
mod request;
mod session;
mod store;

pub use device::{
    DeviceFault, JobSettings, Margins, PageAdvance, PageCanvas, PaperSize, PaperSource,
    PlayedRecord, PrintTarget, FORCED_PAPER_SIZE_INDEX,
};
pub use geometry::{
    destination_geometry, Orientation, Placement, PlacementPolicy, Point,
};
pub use job::{print_report, PrintFault};
pub use metafile::{DecodeFault, Metafile, RecordRef, StreamBuilder, HEADER_RECORD_TYPE};
pub use offline::{DirRenderer, SpoolDir};
pub use paginator::render_report_pages;
pub use renderer::{ExecutionContext, RenderFault, RenderOutput, RenderWarning, ReportRenderer};
pub use request::{
    device_info, parse_parameters, parse_start_page, ReportParameter, OUTPUT_FORMAT,
    RENDER_LOCALE, STREAM_FORMAT,
};
pub use session::PrintSession;
pub use store::PageStore;
