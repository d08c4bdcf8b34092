//! In-memory engine for session tests.

use pdf_clip_engine::{
    ClipRect, DocumentHandle, OpenSource, PageSize, PdfEngine, PdfEngineError, RenderRequest,
    RgbaImage,
};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

/// Serves fixed page texts for known paths and ignores the clip.
#[derive(Debug, Default)]
pub(crate) struct FakeEngine {
    files: HashMap<PathBuf, Vec<String>>,
    open: HashMap<u64, Vec<String>>,
    next_handle: u64,
    pub(crate) closed: Vec<u64>,
}

impl FakeEngine {
    pub(crate) fn with_pages(path: &str, pages: &[&str]) -> Self {
        let mut engine = Self::default();
        engine.files.insert(PathBuf::from(path), pages.iter().map(|p| p.to_string()).collect());
        engine
    }

    fn pages(&self, handle: DocumentHandle) -> Result<&Vec<String>, PdfEngineError> {
        self.open.get(&handle.raw()).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }

    fn page(&self, handle: DocumentHandle, page_index: u32) -> Result<&str, PdfEngineError> {
        let pages = self.pages(handle)?;
        pages.get(page_index as usize).map(String::as_str).ok_or(
            PdfEngineError::PageOutOfRange { page: page_index, page_count: pages.len() as u32 },
        )
    }
}

impl PdfEngine for FakeEngine {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError> {
        let pages = match source {
            OpenSource::Path(path) => self
                .files
                .get(&path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))?,
            OpenSource::Bytes(_) => {
                return Err(PdfEngineError::Backend("bytes are not supported".to_owned()))
            }
        };

        let id = self.next_handle;
        self.next_handle += 1;
        self.open.insert(id, pages);
        Ok(DocumentHandle::from_raw(id))
    }

    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError> {
        Ok(self.pages(handle)?.len() as u32)
    }

    fn page_size(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PageSize, PdfEngineError> {
        self.page(handle, page_index)?;
        Ok(PageSize { width_pt: 612.0, height_pt: 792.0 })
    }

    fn render_page(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RgbaImage, PdfEngineError> {
        self.page(handle, request.page_index)?;
        Ok(RgbaImage::new(8, 8))
    }

    fn extract_clip(
        &self,
        handle: DocumentHandle,
        page_index: u32,
        _clip: ClipRect,
    ) -> Result<String, PdfEngineError> {
        Ok(self.page(handle, page_index)?.to_owned())
    }

    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError> {
        self.open.remove(&handle.raw()).ok_or(PdfEngineError::InvalidHandle(handle.raw()))?;
        self.closed.push(handle.raw());
        Ok(())
    }
}
