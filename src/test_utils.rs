//! Shared mocks for exercising the print pipeline without a live renderer
//! or printer. Compiled for unit tests and, via the `test-utils` feature,
//! for the integration tests.

pub mod mock {
    use crate::spool::{
        DeviceFault, ExecutionContext, JobSettings, PageAdvance, PageCanvas, PaperSize,
        PaperSource, Placement, PlayedRecord, PrintTarget, RenderFault, RenderOutput,
        ReportParameter, ReportRenderer, StreamBuilder, FORCED_PAPER_SIZE_INDEX,
    };

    /// Build a minimal valid page stream carrying the given records.
    #[must_use]
    pub fn page_stream(records: &[(u32, u32, &[u8])]) -> Vec<u8> {
        let mut builder = StreamBuilder::new(859, 1118);
        for &(record_type, flags, payload) in records {
            builder.push_record(record_type, flags, payload);
        }
        builder.finish()
    }

    /// Renderer scripted with a fixed page sequence. Honors the start-page
    /// directive in the device-info fragment and records how it was driven.
    pub struct ScriptedRenderer {
        pages: Vec<Vec<u8>>,
        pub loaded_report: Option<String>,
        pub parameters: Vec<ReportParameter>,
        pub locale: Option<String>,
        pub render_calls: usize,
        /// When set, the next render call fails with a remote fault.
        pub fail_next_render: bool,
    }

    impl ScriptedRenderer {
        #[must_use]
        pub fn new(pages: Vec<Vec<u8>>) -> Self {
            Self {
                pages,
                loaded_report: None,
                parameters: Vec::new(),
                locale: None,
                render_calls: 0,
                fail_next_render: false,
            }
        }
    }

    impl ReportRenderer for ScriptedRenderer {
        fn load_report(&mut self, report_path: &str) -> Result<ExecutionContext, RenderFault> {
            self.loaded_report = Some(report_path.to_string());
            Ok(ExecutionContext {
                session_id: format!("scripted-{}", self.pages.len()),
            })
        }

        fn set_execution_parameters(
            &mut self,
            parameters: &[ReportParameter],
            locale: &str,
        ) -> Result<(), RenderFault> {
            self.parameters = parameters.to_vec();
            self.locale = Some(locale.to_string());
            Ok(())
        }

        fn render(&mut self, _format: &str, device_info: &str) -> Result<RenderOutput, RenderFault> {
            self.render_calls += 1;
            if self.fail_next_render {
                self.fail_next_render = false;
                return Err(RenderFault::remote("scripted failure"));
            }

            let page = crate::spool::parse_start_page(device_info).unwrap_or(1);
            Ok(RenderOutput {
                bytes: self
                    .pages
                    .get(page.saturating_sub(1))
                    .cloned()
                    .unwrap_or_default(),
                extension: "emf".to_string(),
                mime_type: "image/x-emf".to_string(),
                ..RenderOutput::default()
            })
        }
    }

    /// One physical page as the recording printer saw it.
    #[derive(Debug)]
    pub struct RecordedPage {
        pub placement: Option<Placement>,
        pub records: Vec<PlayedRecord>,
    }

    struct RecordingCanvas {
        placement: Option<Placement>,
        records: Vec<PlayedRecord>,
    }

    impl PageCanvas for RecordingCanvas {
        fn place(&mut self, placement: &Placement) -> Result<(), DeviceFault> {
            self.placement = Some(*placement);
            Ok(())
        }

        fn play_record(&mut self, record: &PlayedRecord) -> Result<(), DeviceFault> {
            self.records.push(record.clone());
            Ok(())
        }
    }

    /// Print target that drives the page-advance loop the way an OS spooler
    /// would and captures everything the job does.
    pub struct RecordingPrinter {
        pub jobs: Vec<JobSettings>,
        pub pages: Vec<RecordedPage>,
        paper_sources: Vec<PaperSource>,
        paper_sizes: Vec<PaperSize>,
    }

    impl RecordingPrinter {
        #[must_use]
        pub fn new() -> Self {
            let paper_sources = ["Auto Select", "Tray 1", "Tray 2"]
                .into_iter()
                .map(|name| PaperSource {
                    name: name.to_string(),
                })
                .collect();
            // Enough sizes for the forced index to resolve.
            let paper_sizes = (0..=FORCED_PAPER_SIZE_INDEX + 1)
                .map(|i| PaperSize {
                    name: format!("Size {i}"),
                    width: 100 * i as i32,
                    height: 200 * i as i32,
                })
                .collect();
            Self {
                jobs: Vec::new(),
                pages: Vec::new(),
                paper_sources,
                paper_sizes,
            }
        }

        /// Shrink the size table so the forced index no longer resolves.
        pub fn without_forced_size(mut self) -> Self {
            self.paper_sizes.truncate(FORCED_PAPER_SIZE_INDEX);
            self
        }

        /// True if the printer was never asked to do anything.
        #[must_use]
        pub fn untouched(&self) -> bool {
            self.jobs.is_empty() && self.pages.is_empty()
        }
    }

    impl Default for RecordingPrinter {
        fn default() -> Self {
            Self::new()
        }
    }

    impl PrintTarget for RecordingPrinter {
        fn paper_sources(&self) -> Result<Vec<PaperSource>, DeviceFault> {
            Ok(self.paper_sources.clone())
        }

        fn paper_sizes(&self) -> Result<Vec<PaperSize>, DeviceFault> {
            Ok(self.paper_sizes.clone())
        }

        fn run_job(
            &mut self,
            settings: &JobSettings,
            next_page: &mut dyn FnMut(&mut dyn PageCanvas) -> PageAdvance,
        ) -> Result<(), DeviceFault> {
            self.jobs.push(settings.clone());

            loop {
                let mut canvas = RecordingCanvas {
                    placement: None,
                    records: Vec::new(),
                };
                let advance = next_page(&mut canvas);
                self.pages.push(RecordedPage {
                    placement: canvas.placement,
                    records: canvas.records,
                });
                if advance == PageAdvance::Done {
                    break;
                }
            }

            Ok(())
        }
    }
}
