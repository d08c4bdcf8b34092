use pdf_clip_engine::{ClipRect, DocumentHandle, PdfEngine, PdfEngineError};
use std::time::Instant;

/// Clipped text of every page from one extraction pass.
///
/// Slot `n - 1` holds page `n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    pages: Vec<String>,
}

impl ExtractedText {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Text of a 1-based page number.
    pub fn page(&self, page_number: u32) -> Option<&str> {
        let index = page_number.checked_sub(1)? as usize;
        self.pages.get(index).map(String::as_str)
    }

    /// `(page_number, text)` in ascending page order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.pages.iter().enumerate().map(|(index, text)| (index as u32 + 1, text.as_str()))
    }
}

/// Runs `extract_clip` over every page, in order, with the same clip.
pub fn extract_region<E: PdfEngine + ?Sized>(
    engine: &E,
    handle: DocumentHandle,
    clip: ClipRect,
) -> Result<ExtractedText, PdfEngineError> {
    let started = Instant::now();
    let page_count = engine.page_count(handle)?;

    let pages = (0..page_count)
        .map(|page_index| engine.extract_clip(handle, page_index, clip))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "extracted {} pages from clip {:?} in {:?}",
        page_count,
        clip,
        started.elapsed()
    );

    Ok(ExtractedText::new(pages))
}
