//! Document source for pdf-clip.
//!
//! A [`PdfEngine`] opens PDF files and hands out [`DocumentHandle`]s. Through
//! a handle callers can read the page count and size, rasterize a page, and
//! extract the text that falls inside a clip rectangle.
//!
//! Coordinates exposed by this crate use a top-left origin with one unit per
//! PDF point, which is also the pixel grid of a page rendered at scale 1.0.

use image::{ImageBuffer, Rgba};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
#[cfg(feature = "pdfium")]
pub mod pdfium_backend;
mod plumber_backend;

pub use plumber_backend::PlumberEngine;

pub type RgbaImage = ImageBuffer<Rgba<u8>, Vec<u8>>;

/// Upper bound on pixels in one rendered page (8192 x 8192).
pub const MAX_RENDER_PIXELS: u64 = 1 << 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentHandle(u64);

impl DocumentHandle {
    /// Wraps an engine-assigned id. Engines outside this crate mint handles with it.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl PageSize {
    /// Clip rectangle covering the whole page.
    pub fn full_clip(self) -> ClipRect {
        ClipRect { x: 0.0, y: 0.0, width: self.width_pt, height: self.height_pt }
    }
}

/// Axis-aligned rectangle in page space, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ClipRect {
    /// Builds a rectangle from two opposite corners given in any order.
    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x: x0.min(x1), y: y0.min(y1), width: (x1 - x0).abs(), height: (y1 - y0).abs() }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Inclusive on all edges so a page-sized clip keeps glyphs touching the border.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub page_index: u32,
    pub scale: f32,
}

impl RenderRequest {
    pub fn page(page_index: u32) -> Self {
        Self { page_index, ..Self::default() }
    }
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self { page_index: 0, scale: 1.0 }
    }
}

#[derive(Debug, Clone)]
pub enum OpenSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl From<PathBuf> for OpenSource {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&Path> for OpenSource {
    fn from(value: &Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

impl From<Vec<u8>> for OpenSource {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PdfEngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parse error: {0}")]
    Parse(#[from] pdfplumber::PdfError),
    #[error("invalid handle {0}")]
    InvalidHandle(u64),
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("encrypted PDFs are not supported in the default backend")]
    EncryptedUnsupported,
    #[error("document has no pages")]
    NoPages,
    #[error("page of {width_pt} x {height_pt} pt is too large to render at scale {scale}")]
    RenderTooLarge { width_pt: f32, height_pt: f32, scale: f32 },
    #[error("backend error: {0}")]
    Backend(String),
}

pub trait PdfEngine {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError>;
    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError>;
    fn page_size(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PageSize, PdfEngineError>;
    fn render_page(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RgbaImage, PdfEngineError>;
    /// Text of the page restricted to `clip`, surrounding whitespace stripped.
    fn extract_clip(
        &self,
        handle: DocumentHandle,
        page_index: u32,
        clip: ClipRect,
    ) -> Result<String, PdfEngineError>;
    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError>;

    /// Unclipped page text. Same as clipping to the page box.
    fn extract_text(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<String, PdfEngineError> {
        let size = self.page_size(handle, page_index)?;
        self.extract_clip(handle, page_index, size.full_clip())
    }
}

impl<E: PdfEngine + ?Sized> PdfEngine for Box<E> {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError> {
        (**self).open(source)
    }

    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError> {
        (**self).page_count(handle)
    }

    fn page_size(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PageSize, PdfEngineError> {
        (**self).page_size(handle, page_index)
    }

    fn render_page(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RgbaImage, PdfEngineError> {
        (**self).render_page(handle, request)
    }

    fn extract_clip(
        &self,
        handle: DocumentHandle,
        page_index: u32,
        clip: ClipRect,
    ) -> Result<String, PdfEngineError> {
        (**self).extract_clip(handle, page_index, clip)
    }

    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError> {
        (**self).close(handle)
    }

    fn extract_text(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<String, PdfEngineError> {
        (**self).extract_text(handle, page_index)
    }
}

/// Which backend [`engine_for`] should construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineBackend {
    /// Pdfium when it can be bound, pdfplumber otherwise.
    #[default]
    Auto,
    Pdfium,
    Pdfplumber,
}

impl fmt::Display for EngineBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineBackend::Auto => "auto",
            EngineBackend::Pdfium => "pdfium",
            EngineBackend::Pdfplumber => "pdfplumber",
        };
        f.write_str(name)
    }
}

impl FromStr for EngineBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "pdfium" => Ok(Self::Pdfium),
            "pdfplumber" => Ok(Self::Pdfplumber),
            other => Err(format!("unknown engine backend '{other}'")),
        }
    }
}

pub fn default_engine() -> PlumberEngine {
    PlumberEngine::new()
}

/// Pixel dimensions of `size` rendered at `scale`, refused past [`MAX_RENDER_PIXELS`].
pub fn raster_size(size: PageSize, scale: f32) -> Result<(u32, u32), PdfEngineError> {
    let width = (f64::from(size.width_pt) * f64::from(scale)).round().max(1.0);
    let height = (f64::from(size.height_pt) * f64::from(scale)).round().max(1.0);
    if !width.is_finite() || !height.is_finite() || width * height > MAX_RENDER_PIXELS as f64 {
        return Err(PdfEngineError::RenderTooLarge {
            width_pt: size.width_pt,
            height_pt: size.height_pt,
            scale,
        });
    }

    Ok((width as u32, height as u32))
}

/// Builds the engine selected by `backend`.
pub fn engine_for(backend: EngineBackend) -> Result<Box<dyn PdfEngine>, PdfEngineError> {
    match backend {
        EngineBackend::Pdfplumber => Ok(Box::new(PlumberEngine::new())),
        EngineBackend::Pdfium => pdfium_engine(),
        EngineBackend::Auto => match pdfium_engine() {
            Ok(engine) => Ok(engine),
            Err(err) => {
                if cfg!(feature = "pdfium") {
                    log::warn!("pdfium unavailable ({err}); falling back to pdfplumber backend");
                }
                Ok(Box::new(PlumberEngine::new()))
            }
        },
    }
}

#[cfg(feature = "pdfium")]
fn pdfium_engine() -> Result<Box<dyn PdfEngine>, PdfEngineError> {
    Ok(Box::new(pdfium_backend::PdfiumEngine::bind()?))
}

#[cfg(not(feature = "pdfium"))]
fn pdfium_engine() -> Result<Box<dyn PdfEngine>, PdfEngineError> {
    Err(PdfEngineError::Backend("built without pdfium support".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_from_corners_normalizes_order() {
        let clip = ClipRect::from_corners(120.0, 80.0, 20.0, 10.0);

        assert_eq!(clip, ClipRect { x: 20.0, y: 10.0, width: 100.0, height: 70.0 });
        assert_eq!(clip.right(), 120.0);
        assert_eq!(clip.bottom(), 80.0);
    }

    #[test]
    fn clip_contains_is_inclusive_on_edges() {
        let clip = ClipRect::from_corners(0.0, 0.0, 10.0, 10.0);

        assert!(clip.contains(0.0, 0.0));
        assert!(clip.contains(10.0, 10.0));
        assert!(!clip.contains(10.5, 5.0));
    }

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("PDFium".parse::<EngineBackend>(), Ok(EngineBackend::Pdfium));
        assert_eq!(" pdfplumber ".parse::<EngineBackend>(), Ok(EngineBackend::Pdfplumber));
        assert!("mupdf".parse::<EngineBackend>().is_err());
    }

    #[test]
    fn pdfplumber_backend_is_always_available() {
        let engine = engine_for(EngineBackend::Pdfplumber);
        assert!(engine.is_ok());
    }

    #[test]
    fn raster_size_scales_and_rounds() {
        let letter = PageSize { width_pt: 612.0, height_pt: 792.0 };

        assert_eq!(raster_size(letter, 1.0).expect("letter fits"), (612, 792));
        assert_eq!(raster_size(letter, 1.5).expect("letter fits"), (918, 1188));
    }

    #[test]
    fn raster_size_refuses_huge_pages() {
        let huge = PageSize { width_pt: 9_000_000.0, height_pt: 9_000_000.0 };

        let err = raster_size(huge, 1.0).expect_err("huge page should be refused");
        assert!(matches!(err, PdfEngineError::RenderTooLarge { scale, .. } if scale == 1.0));
        assert!(raster_size(PageSize { width_pt: 612.0, height_pt: 792.0 }, 100.0).is_err());
    }

    #[cfg(not(feature = "pdfium"))]
    #[test]
    fn auto_backend_falls_back_without_pdfium() {
        let mut engine = engine_for(EngineBackend::Auto).expect("auto always yields an engine");
        let handle = engine
            .open(OpenSource::Bytes(fixtures::pdf_with_pages(&["Hello"])))
            .expect("open should succeed");

        assert_eq!(engine.page_count(handle).expect("count should succeed"), 1);
        assert!(engine_for(EngineBackend::Pdfium).is_err());
    }
}
