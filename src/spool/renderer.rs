//! Remote report renderer seam

use super::request::ReportParameter;

/// Faults crossing the renderer boundary.
///
/// Every renderer call is attempted exactly once; there is no retry policy
/// and no deadline — callers needing responsiveness wrap the pagination call
/// with their own.
#[derive(Debug, thiserror::Error)]
pub enum RenderFault {
    #[error("renderer: {detail}")]
    Remote { detail: String },

    #[error("malformed report parameter `{entry}`: expected name~value")]
    BadParameter { entry: String },

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderFault {
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote { detail: msg.into() }
    }
}

/// Execution context established by loading a report.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    /// Renderer-side session identifier, logged once per job.
    pub session_id: String,
}

/// Non-fatal warning emitted by a render call.
#[derive(Clone, Debug)]
pub struct RenderWarning {
    pub code: String,
    pub severity: String,
    pub message: String,
}

/// One render call's output.
///
/// `bytes` is a single page's record stream; a zero-length `bytes` signals
/// page exhaustion, not an error.
#[derive(Clone, Debug, Default)]
pub struct RenderOutput {
    pub bytes: Vec<u8>,
    pub extension: String,
    pub mime_type: String,
    pub encoding: String,
    pub warnings: Vec<RenderWarning>,
    pub stream_ids: Vec<String>,
}

/// The remote report rendering service.
///
/// One rendering session per print job: load the report, set its parameters,
/// then render page by page. Implementations own transport and credentials.
pub trait ReportRenderer {
    fn load_report(&mut self, report_path: &str) -> Result<ExecutionContext, RenderFault>;

    fn set_execution_parameters(
        &mut self,
        parameters: &[ReportParameter],
        locale: &str,
    ) -> Result<(), RenderFault>;

    fn render(&mut self, format: &str, device_info: &str) -> Result<RenderOutput, RenderFault>;
}
