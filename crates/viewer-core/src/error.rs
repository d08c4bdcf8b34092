use pdf_clip_engine::PdfEngineError;
use std::path::PathBuf;

/// Failures a session reports back to whoever drives it.
///
/// The `Display` text is meant to be shown to the user as-is.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Please load a PDF file first.")]
    NoDocument,
    #[error("Please draw a rectangle on the PDF.")]
    NoSelection,
    #[error("Invalid page number. Please enter a page number between 1 and {page_count}.")]
    PageOutOfRange { requested: i64, page_count: u32 },
    #[error("'{0}' is not a page number.")]
    InvalidPageEntry(String),
    #[error("No file was selected.")]
    EmptyPath,
    #[error("The file could not be opened: {}: {source}", .path.display())]
    Open { path: PathBuf, source: PdfEngineError },
    #[error(transparent)]
    Engine(#[from] PdfEngineError),
}

impl SessionError {
    /// Whether the error comes from what the user typed or clicked rather
    /// than from the document or the engine.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            SessionError::NoDocument
                | SessionError::NoSelection
                | SessionError::PageOutOfRange { .. }
                | SessionError::InvalidPageEntry(_)
                | SessionError::EmptyPath
        )
    }
}
