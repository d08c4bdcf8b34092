//! The application state shared by every controller.

use crate::error::SessionError;
use crate::extraction::{extract_region, ExtractedText};
use crate::navigation::Navigator;
use crate::search::{filter_pages, TextView};
use crate::selection::{CanvasPoint, RegionSelector, SelectionRect};
use pdf_clip_engine::{
    DocumentHandle, OpenSource, PageSize, PdfEngine, RenderRequest, RgbaImage,
};
use std::path::{Path, PathBuf};

/// The document currently open in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub handle: DocumentHandle,
    pub path: PathBuf,
    pub page_count: u32,
}

/// Outcome of a non-empty search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSummary {
    pub pages: usize,
    pub matches: usize,
}

/// One open document plus everything the user did to it.
///
/// Front ends feed user actions in and present the returned errors; the
/// session itself never shows anything.
pub struct Session<E: PdfEngine> {
    engine: E,
    render_scale: f32,
    document: Option<LoadedDocument>,
    navigator: Navigator,
    selector: RegionSelector,
    extracted: ExtractedText,
    view: TextView,
}

impl<E: PdfEngine> Session<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            render_scale: 1.0,
            document: None,
            navigator: Navigator::default(),
            selector: RegionSelector::new(),
            extracted: ExtractedText::default(),
            view: TextView::new(),
        }
    }

    /// Pixels per point of the page canvas; selections are scaled back by it.
    pub fn with_render_scale(mut self, scale: f32) -> Self {
        self.render_scale = if scale > 0.0 { scale } else { 1.0 };
        self
    }

    pub fn render_scale(&self) -> f32 {
        self.render_scale
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn current_index(&self) -> u32 {
        self.navigator.current_index()
    }

    pub fn selector(&self) -> &RegionSelector {
        &self.selector
    }

    pub fn extracted(&self) -> &ExtractedText {
        &self.extracted
    }

    pub fn view(&self) -> &TextView {
        &self.view
    }

    fn loaded(&self) -> Result<&LoadedDocument, SessionError> {
        self.document.as_ref().ok_or(SessionError::NoDocument)
    }

    /// Opens `path`, replacing the current document.
    ///
    /// On failure the previous document stays open. On success the page
    /// resets to the first one and the previous extraction is discarded; the
    /// drawn rectangle is kept.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(SessionError::EmptyPath);
        }

        let open = |engine: &mut E| -> Result<(DocumentHandle, u32), pdf_clip_engine::PdfEngineError> {
            let handle = engine.open(OpenSource::from(path))?;
            match engine.page_count(handle) {
                Ok(count) => Ok((handle, count)),
                Err(err) => {
                    let _ = engine.close(handle);
                    Err(err)
                }
            }
        };
        let (handle, page_count) = open(&mut self.engine)
            .map_err(|source| SessionError::Open { path: path.to_path_buf(), source })?;

        if let Some(previous) = self.document.take() {
            if let Err(err) = self.engine.close(previous.handle) {
                log::warn!("failed to close {}: {err}", previous.path.display());
            }
        }

        log::info!("loaded {} ({page_count} pages)", path.display());
        self.document = Some(LoadedDocument { handle, path: path.to_path_buf(), page_count });
        self.navigator = Navigator::new(page_count);
        self.extracted = ExtractedText::default();
        self.view.clear();

        Ok(())
    }

    pub fn page_count(&self) -> Result<u32, SessionError> {
        Ok(self.loaded()?.page_count)
    }

    pub fn current_page_size(&self) -> Result<PageSize, SessionError> {
        let handle = self.loaded()?.handle;
        Ok(self.engine.page_size(handle, self.navigator.current_index())?)
    }

    /// Rasterizes the current page at the session's render scale.
    pub fn render_current_page(&self) -> Result<RgbaImage, SessionError> {
        let handle = self.loaded()?.handle;
        let request =
            RenderRequest { page_index: self.navigator.current_index(), scale: self.render_scale };
        Ok(self.engine.render_page(handle, request)?)
    }

    pub fn pointer_down(&mut self, point: CanvasPoint) {
        self.selector.pointer_down(point);
    }

    pub fn pointer_move(&mut self, point: CanvasPoint) {
        self.selector.pointer_move(point);
    }

    pub fn pointer_up(&mut self, point: CanvasPoint) {
        self.selector.pointer_up(point);
    }

    /// Sets the rectangle directly, as if dragged from one corner to the other.
    pub fn select(&mut self, rect: SelectionRect) {
        self.selector.pointer_down(CanvasPoint::new(rect.x0, rect.y0));
        self.selector.pointer_up(CanvasPoint::new(rect.x1, rect.y1));
    }

    /// Extracts the selected region from every page and shows the result.
    pub fn extract(&mut self) -> Result<(), SessionError> {
        let handle = self.loaded()?.handle;
        let rect = self.selector.selection().ok_or(SessionError::NoSelection)?;

        let extracted = extract_region(&self.engine, handle, rect.to_clip(self.render_scale))?;
        self.extracted = extracted;
        self.view.render(self.extracted.iter());

        Ok(())
    }

    /// Shows only pages containing `query` and highlights each occurrence.
    ///
    /// An empty query leaves the view untouched and returns `None`.
    pub fn search(&mut self, query: &str) -> Option<SearchSummary> {
        if query.is_empty() {
            return None;
        }

        let matching = filter_pages(&self.extracted, query);
        let pages = matching.len();
        self.view.render(matching);
        self.view.highlight(query);

        let summary = SearchSummary { pages, matches: self.view.highlights().len() };
        log::debug!("search {query:?}: {summary:?}");
        Some(summary)
    }

    /// Drops highlights and shows the latest extraction in full.
    pub fn clear_search(&mut self) {
        self.view.render(self.extracted.iter());
    }

    pub fn go_to(&mut self, page_number: i64) -> Result<(), SessionError> {
        self.loaded()?;
        self.navigator.go_to(page_number)
    }

    pub fn go_to_entry(&mut self, entry: &str) -> Result<(), SessionError> {
        self.loaded()?;
        self.navigator.go_to_entry(entry)
    }

    /// Returns whether the page changed.
    pub fn prev(&mut self) -> bool {
        self.navigator.prev()
    }

    /// Returns whether the page changed.
    pub fn next(&mut self) -> bool {
        self.navigator.next()
    }
}
