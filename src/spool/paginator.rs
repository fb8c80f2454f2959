//! Drives the remote renderer until page exhaustion

use log::{debug, info, warn};

use super::renderer::{RenderFault, RenderOutput, ReportRenderer};
use super::request::{self, OUTPUT_FORMAT, RENDER_LOCALE};
use super::store::PageStore;

/// Render every page of a report, up front, into a page store.
///
/// Establishes one rendering session, renders page 1, then keeps asking for
/// the next start page until the renderer answers with zero bytes. An empty
/// first page is a valid "nothing to print" outcome and yields an empty
/// store; renderer faults abort the whole call.
pub fn render_report_pages(
    renderer: &mut dyn ReportRenderer,
    report_path: &str,
    raw_parameters: &str,
) -> Result<PageStore, RenderFault> {
    let parameters = request::parse_parameters(raw_parameters)?;

    let context = renderer.load_report(report_path)?;
    renderer.set_execution_parameters(&parameters, RENDER_LOCALE)?;
    info!(
        "Rendering {report_path} ({} parameter(s), session {})",
        parameters.len(),
        context.session_id
    );

    let mut store = PageStore::new();

    let first = renderer.render(OUTPUT_FORMAT, &request::device_info(None))?;
    log_output(1, &first);
    if first.bytes.is_empty() {
        info!("{report_path} produced no pages");
        return Ok(store);
    }
    store.push(first.bytes);

    loop {
        let next_page = store.len() + 1;
        let output = renderer.render(OUTPUT_FORMAT, &request::device_info(Some(next_page)))?;
        log_output(next_page, &output);
        if output.bytes.is_empty() {
            break;
        }
        store.push(output.bytes);
    }

    info!("{report_path}: {} page(s) rendered", store.len());
    Ok(store)
}

fn log_output(page: usize, output: &RenderOutput) {
    for warning in &output.warnings {
        warn!(
            "Page {page}: renderer warning {} ({}): {}",
            warning.code, warning.severity, warning.message
        );
    }
    if !output.bytes.is_empty() {
        debug!(
            "Page {page}: {} byte(s), extension {:?}, mime {:?}, encoding {:?}, {} extra stream(s)",
            output.bytes.len(),
            output.extension,
            output.mime_type,
            output.encoding,
            output.stream_ids.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spool::renderer::{ExecutionContext, RenderWarning};
    use crate::spool::request::{parse_start_page, ReportParameter};

    /// Serves a fixed page sequence, recording how it was driven.
    struct SequenceRenderer {
        pages: Vec<Vec<u8>>,
        loaded: Option<String>,
        parameters: Vec<ReportParameter>,
        locale: Option<String>,
        render_calls: Vec<Option<usize>>,
        warn_on_first: bool,
    }

    impl SequenceRenderer {
        fn new(pages: Vec<Vec<u8>>) -> Self {
            Self {
                pages,
                loaded: None,
                parameters: Vec::new(),
                locale: None,
                render_calls: Vec::new(),
                warn_on_first: false,
            }
        }
    }

    impl ReportRenderer for SequenceRenderer {
        fn load_report(&mut self, report_path: &str) -> Result<ExecutionContext, RenderFault> {
            self.loaded = Some(report_path.to_string());
            Ok(ExecutionContext {
                session_id: "seq-1".to_string(),
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

        fn render(&mut self, format: &str, device_info: &str) -> Result<RenderOutput, RenderFault> {
            assert_eq!(format, OUTPUT_FORMAT);
            let start_page = parse_start_page(device_info);
            self.render_calls.push(start_page);

            let page = start_page.unwrap_or(1);
            let bytes = self.pages.get(page - 1).cloned().unwrap_or_default();
            let warnings = if self.warn_on_first && page == 1 {
                vec![RenderWarning {
                    code: "rsMissingImage".to_string(),
                    severity: "Warning".to_string(),
                    message: "image not found".to_string(),
                }]
            } else {
                Vec::new()
            };

            Ok(RenderOutput {
                bytes,
                extension: "emf".to_string(),
                mime_type: "image/x-emf".to_string(),
                encoding: String::new(),
                warnings,
                ..RenderOutput::default()
            })
        }
    }

    #[test]
    fn renders_until_first_empty_response() {
        let mut renderer =
            SequenceRenderer::new(vec![vec![1, 1], vec![2, 2], vec![3, 3]]);

        let store = render_report_pages(&mut renderer, "/reports/invoice", "").unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.page(2), Some(&[2u8, 2][..]));
        // First call has no start page, then 2, 3, and the exhausted 4.
        assert_eq!(renderer.render_calls, vec![None, Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn empty_first_page_is_a_zero_page_outcome() {
        let mut renderer = SequenceRenderer::new(Vec::new());

        let store = render_report_pages(&mut renderer, "/reports/empty", "").unwrap();

        assert!(store.is_empty());
        assert_eq!(renderer.render_calls, vec![None]);
    }

    #[test]
    fn session_is_established_before_rendering() {
        let mut renderer = SequenceRenderer::new(vec![vec![9]]);

        render_report_pages(&mut renderer, "/reports/inventory", "dept~42|year~2026").unwrap();

        assert_eq!(renderer.loaded.as_deref(), Some("/reports/inventory"));
        assert_eq!(renderer.locale.as_deref(), Some(RENDER_LOCALE));
        assert_eq!(renderer.parameters.len(), 2);
        assert_eq!(renderer.parameters[0].name, "dept");
        assert_eq!(renderer.parameters[1].value, "2026");
    }

    #[test]
    fn malformed_parameters_fail_before_any_remote_call() {
        let mut renderer = SequenceRenderer::new(vec![vec![9]]);

        let err = render_report_pages(&mut renderer, "/reports/x", "broken").unwrap_err();

        assert!(matches!(err, RenderFault::BadParameter { .. }));
        assert!(renderer.loaded.is_none());
        assert!(renderer.render_calls.is_empty());
    }

    #[test]
    fn warnings_do_not_disturb_pagination() {
        let mut renderer = SequenceRenderer::new(vec![vec![1], vec![2]]);
        renderer.warn_on_first = true;

        let store = render_report_pages(&mut renderer, "/reports/warned", "").unwrap();

        assert_eq!(store.len(), 2);
    }
}
