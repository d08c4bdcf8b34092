//! System clipboard access for the result panel's Copy button.

use arboard::Clipboard;

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Failed to initialize clipboard: {0}")]
    InitializationFailed(String),
    #[error("Failed to copy to clipboard: {0}")]
    CopyFailed(String),
    #[error("There is no extracted text to copy.")]
    NothingToCopy,
}

/// Copies `text` to the system clipboard. Empty text is refused.
pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    if text.is_empty() {
        return Err(ClipboardError::NothingToCopy);
    }

    let mut clipboard =
        Clipboard::new().map_err(|e| ClipboardError::InitializationFailed(e.to_string()))?;

    clipboard.set_text(text).map_err(|e| ClipboardError::CopyFailed(e.to_string()))?;

    Ok(())
}
