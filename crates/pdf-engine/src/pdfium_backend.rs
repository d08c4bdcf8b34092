//! PDFium-backed engine.
//!
//! Produces real page bitmaps and uses PDFium's own text-in-rectangle
//! extraction. Requires the PDFium shared library at runtime.

use crate::{
    raster_size, ClipRect, DocumentHandle, OpenSource, PageSize, PdfEngine, PdfEngineError,
    RenderRequest, RgbaImage,
};
use pdfium_render::prelude::*;
use std::collections::HashMap;

pub struct PdfiumEngine {
    pdfium: &'static Pdfium,
    next_handle: u64,
    docs: HashMap<DocumentHandle, PdfDocument<'static>>,
}

/// Binds PDFium.
///
/// Search order:
/// 1. Executable's directory (for app bundles: .app/Contents/MacOS/)
/// 2. Current working directory
/// 3. System library paths
fn init_pdfium() -> Result<Pdfium, PdfEngineError> {
    let exe_dir = std::env::current_exe().ok().and_then(|p| p.parent().map(|p| p.to_path_buf()));

    if let Some(ref dir) = exe_dir {
        if let Ok(bindings) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
        {
            return Ok(Pdfium::new(bindings));
        }
    }

    Ok(Pdfium::new(
        Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|err| {
                PdfEngineError::Backend(format!("failed to bind pdfium library: {err}"))
            })?,
    ))
}

fn backend_error(err: PdfiumError) -> PdfEngineError {
    PdfEngineError::Backend(err.to_string())
}

impl PdfiumEngine {
    pub fn bind() -> Result<Self, PdfEngineError> {
        // Documents borrow the bindings for their whole life; one leak per engine.
        let pdfium: &'static Pdfium = Box::leak(Box::new(init_pdfium()?));
        log::info!("pdfium bound");

        Ok(Self { pdfium, next_handle: 0, docs: HashMap::new() })
    }

    fn document(&self, handle: DocumentHandle) -> Result<&PdfDocument<'static>, PdfEngineError> {
        self.docs.get(&handle).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }

    fn page(&self, handle: DocumentHandle, page_index: u32) -> Result<PdfPage<'_>, PdfEngineError> {
        let document = self.document(handle)?;
        let page_count = document.pages().len() as u32;
        if page_index >= page_count {
            return Err(PdfEngineError::PageOutOfRange { page: page_index, page_count });
        }
        document.pages().get(page_index as u16).map_err(backend_error)
    }
}

impl PdfEngine for PdfiumEngine {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError> {
        let document = match source {
            OpenSource::Path(path) => {
                if !path.is_file() {
                    return Err(PdfEngineError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("{} not found", path.display()),
                    )));
                }
                self.pdfium.load_pdf_from_file(&path, None)
            }
            OpenSource::Bytes(bytes) => self.pdfium.load_pdf_from_byte_vec(bytes, None),
        }
        .map_err(backend_error)?;

        if document.pages().len() == 0 {
            return Err(PdfEngineError::NoPages);
        }

        self.next_handle += 1;
        let handle = DocumentHandle(self.next_handle);
        self.docs.insert(handle, document);

        Ok(handle)
    }

    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError> {
        Ok(self.document(handle)?.pages().len() as u32)
    }

    fn page_size(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PageSize, PdfEngineError> {
        let page = self.page(handle, page_index)?;
        Ok(PageSize { width_pt: page.width().value, height_pt: page.height().value })
    }

    fn render_page(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RgbaImage, PdfEngineError> {
        let page = self.page(handle, request.page_index)?;
        let scale = if request.scale <= 0.0 { 1.0 } else { request.scale };
        let size = PageSize { width_pt: page.width().value, height_pt: page.height().value };
        let (width, height) = raster_size(size, scale)?;

        let config =
            PdfRenderConfig::new().set_target_width(width as i32).set_target_height(height as i32);
        let bitmap = page.render_with_config(&config).map_err(backend_error)?;
        let pixels = bitmap.as_rgba_bytes().to_vec();

        RgbaImage::from_raw(bitmap.width() as u32, bitmap.height() as u32, pixels).ok_or_else(|| {
            PdfEngineError::Backend("pdfium bitmap size does not match its pixel data".to_owned())
        })
    }

    fn extract_clip(
        &self,
        handle: DocumentHandle,
        page_index: u32,
        clip: ClipRect,
    ) -> Result<String, PdfEngineError> {
        let page = self.page(handle, page_index)?;
        let page_height = page.height().value;

        // PDFium rectangles use the bottom-left origin of PDF user space.
        let rect = PdfRect::new_from_values(
            page_height - clip.bottom(),
            clip.x,
            page_height - clip.y,
            clip.right(),
        );

        let text = page.text().map_err(backend_error)?.inside_rect(rect);
        Ok(text.trim().to_owned())
    }

    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError> {
        self.docs.remove(&handle).map(|_| ()).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }
}
