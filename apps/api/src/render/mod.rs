//! Document Renderer: canonical model → DOCX bytes.
//!
//! Rendering is single-pass. The WordprocessingML body is streamed through a
//! quick-xml writer and the package parts are zipped in memory; any
//! serializer failure aborts the whole document.

pub mod docx;
pub mod emphasis;
pub mod styles;

use thiserror::Error;

pub use docx::render_docx;
pub use emphasis::Emphasis;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("XML serialization failed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Zip packaging failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error while writing document: {0}")]
    Io(#[from] std::io::Error),
}

/// Presentation switches that do not change the model.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Technical skills in a borderless two-column table.
    pub two_column_skills: bool,
    pub emphasis: Emphasis,
}
