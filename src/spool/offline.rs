//! Offline adapters for the renderer and printer seams
//!
//! `DirRenderer` serves pre-rendered page streams from a directory tree, and
//! `SpoolDir` "prints" by re-emitting each replayed page into a spool
//! directory next to a job log. Together they let the binary exercise the
//! whole pipeline without the live rendering service or an OS spooler.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::device::{
    DeviceFault, JobSettings, PageAdvance, PageCanvas, PaperSize, PaperSource, PlayedRecord,
    PrintTarget,
};
use super::geometry::Placement;
use super::metafile::StreamBuilder;
use super::renderer::{ExecutionContext, RenderFault, RenderOutput, ReportRenderer};
use super::request::{parse_start_page, ReportParameter};

const PAGE_FILE_EXTENSION: &str = "emf";

/// Serves a report's pages from `<root>/<report path>/`, one page stream per
/// file, in file-name order.
pub struct DirRenderer {
    root: PathBuf,
    pages: Vec<PathBuf>,
    sessions: u64,
}

impl DirRenderer {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pages: Vec::new(),
            sessions: 0,
        }
    }
}

impl ReportRenderer for DirRenderer {
    fn load_report(&mut self, report_path: &str) -> Result<ExecutionContext, RenderFault> {
        let dir = self.root.join(report_path.trim_start_matches('/'));
        if !dir.is_dir() {
            return Err(RenderFault::remote(format!(
                "unknown report {report_path} (no directory {})",
                dir.display()
            )));
        }

        let mut pages = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(PAGE_FILE_EXTENSION))
            {
                pages.push(path);
            }
        }
        pages.sort();

        self.sessions += 1;
        self.pages = pages;
        debug!(
            "Loaded {report_path}: {} page file(s) under {}",
            self.pages.len(),
            dir.display()
        );
        Ok(ExecutionContext {
            session_id: format!("dir-{}", self.sessions),
        })
    }

    fn set_execution_parameters(
        &mut self,
        parameters: &[ReportParameter],
        locale: &str,
    ) -> Result<(), RenderFault> {
        // Pre-rendered pages cannot be re-parameterized; the values are only
        // recorded for the log.
        for parameter in parameters {
            debug!("Parameter {}={} ({locale})", parameter.name, parameter.value);
        }
        Ok(())
    }

    fn render(&mut self, _format: &str, device_info: &str) -> Result<RenderOutput, RenderFault> {
        let page = parse_start_page(device_info).unwrap_or(1);

        let Some(path) = self.pages.get(page.saturating_sub(1)) else {
            // Past the last file: exhaustion, not an error.
            return Ok(RenderOutput {
                extension: PAGE_FILE_EXTENSION.to_string(),
                ..RenderOutput::default()
            });
        };

        let stream_ids = if page == 1 {
            self.pages[1..]
                .iter()
                .map(|p| p.file_name().unwrap_or_default().to_string_lossy().into_owned())
                .collect()
        } else {
            Vec::new()
        };

        Ok(RenderOutput {
            bytes: fs::read(path)?,
            extension: PAGE_FILE_EXTENSION.to_string(),
            mime_type: "image/x-emf".to_string(),
            encoding: String::new(),
            warnings: Vec::new(),
            stream_ids,
        })
    }
}

/// Print target that spools every page to disk.
pub struct SpoolDir {
    dir: PathBuf,
}

impl SpoolDir {
    /// Open (creating if needed) a spool directory.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, DeviceFault> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl PrintTarget for SpoolDir {
    fn paper_sources(&self) -> Result<Vec<PaperSource>, DeviceFault> {
        Ok(["Auto Select", "Upper Tray", "Lower Tray", "Manual Feed"]
            .into_iter()
            .map(|name| PaperSource {
                name: name.to_string(),
            })
            .collect())
    }

    fn paper_sizes(&self) -> Result<Vec<PaperSize>, DeviceFault> {
        // Stable driver-style size table; the half-letter override expects
        // the statement size at the fixed forced index.
        let table: [(&str, i32, i32); 8] = [
            ("Letter", 850, 1100),
            ("Legal", 850, 1400),
            ("A4", 827, 1169),
            ("Executive", 725, 1050),
            ("A5", 583, 827),
            ("B5", 693, 984),
            ("Statement", 550, 850),
            ("Folio", 850, 1300),
        ];
        Ok(table
            .into_iter()
            .map(|(name, width, height)| PaperSize {
                name: name.to_string(),
                width,
                height,
            })
            .collect())
    }

    fn run_job(
        &mut self,
        settings: &JobSettings,
        next_page: &mut dyn FnMut(&mut dyn PageCanvas) -> PageAdvance,
    ) -> Result<(), DeviceFault> {
        info!(
            "Spooling job for {} into {}",
            settings.printer_name,
            self.dir.display()
        );

        let mut manifest = String::new();
        let _ = writeln!(manifest, "printer: {}", settings.printer_name);
        let _ = writeln!(manifest, "orientation: {:?}", settings.orientation);
        let _ = writeln!(manifest, "paper source: {}", settings.paper_source.name);
        match &settings.forced_paper_size {
            Some(size) => {
                let _ = writeln!(
                    manifest,
                    "forced paper size: {} ({}x{})",
                    size.name, size.width, size.height
                );
            }
            None => {
                let _ = writeln!(manifest, "forced paper size: none");
            }
        }

        let mut page_number = 0usize;
        loop {
            let mut canvas = SpoolCanvas::default();
            let advance = next_page(&mut canvas);

            if let Some(page) = canvas.into_page() {
                page_number += 1;
                let file_name = format!("page-{page_number:04}.{PAGE_FILE_EXTENSION}");
                fs::write(self.dir.join(&file_name), page.bytes)?;
                let _ = writeln!(manifest, "{file_name}: {} record(s)", page.records);
            }

            if advance == PageAdvance::Done {
                break;
            }
        }

        let _ = writeln!(manifest, "pages: {page_number}");
        fs::write(self.dir.join("job.log"), manifest)?;
        info!("Spooled {page_number} page(s)");
        Ok(())
    }
}

struct SpooledPage {
    bytes: Vec<u8>,
    records: usize,
}

/// Re-encodes one replayed page behind a fresh stream header. The source
/// page's own header record replays through like any other record.
#[derive(Default)]
struct SpoolCanvas {
    builder: Option<StreamBuilder>,
    records: usize,
}

impl SpoolCanvas {
    fn into_page(self) -> Option<SpooledPage> {
        self.builder.map(|builder| SpooledPage {
            bytes: builder.finish(),
            records: self.records,
        })
    }
}

impl PageCanvas for SpoolCanvas {
    fn place(&mut self, placement: &Placement) -> Result<(), DeviceFault> {
        let (width, height) = match placement {
            Placement::Origin(_) => (0, 0),
            Placement::Parallelogram([top_left, top_right, bottom_left]) => (
                top_right.x - top_left.x,
                bottom_left.y - top_left.y,
            ),
        };
        self.builder = Some(StreamBuilder::new(width, height));
        Ok(())
    }

    fn play_record(&mut self, record: &PlayedRecord) -> Result<(), DeviceFault> {
        let Some(builder) = self.builder.as_mut() else {
            return Err(DeviceFault::job("record played before page placement"));
        };
        builder.push_record(record.record_type, record.flags, &record.payload);
        self.records += 1;
        Ok(())
    }
}
