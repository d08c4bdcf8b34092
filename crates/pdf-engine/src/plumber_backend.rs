use crate::{
    raster_size, ClipRect, DocumentHandle, OpenSource, PageSize, PdfEngine, PdfEngineError,
    RenderRequest, RgbaImage,
};
use image::Rgba;
use pdfplumber::{BBox, Page, Pdf, PdfError, TextOptions};
use std::collections::HashMap;
use std::fs;

const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BORDER: Rgba<u8> = Rgba([220, 220, 220, 255]);
const GLYPH: Rgba<u8> = Rgba([190, 190, 190, 255]);

/// Pure-Rust engine on top of `pdfplumber`.
///
/// Text extraction is real, fonts and form XObjects included; rasterization
/// is a draft that marks where glyphs sit on a blank page, enough to aim a
/// selection.
#[derive(Default)]
pub struct PlumberEngine {
    next_handle: u64,
    docs: HashMap<DocumentHandle, Pdf>,
}

impl PlumberEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn parse(bytes: &[u8]) -> Result<Pdf, PdfEngineError> {
        if bytes.windows("/Encrypt".len()).any(|window| window == b"/Encrypt") {
            return Err(PdfEngineError::EncryptedUnsupported);
        }

        let pdf = Pdf::open(bytes, None).map_err(from_plumber)?;
        if pdf.page_count() == 0 {
            return Err(PdfEngineError::NoPages);
        }

        Ok(pdf)
    }

    fn document(&self, handle: DocumentHandle) -> Result<&Pdf, PdfEngineError> {
        self.docs.get(&handle).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }

    fn page(&self, handle: DocumentHandle, page_index: u32) -> Result<Page, PdfEngineError> {
        let pdf = self.document(handle)?;
        let page_count = pdf.page_count() as u32;
        if page_index >= page_count {
            return Err(PdfEngineError::PageOutOfRange { page: page_index, page_count });
        }
        pdf.page(page_index as usize).map_err(from_plumber)
    }
}

fn from_plumber(err: PdfError) -> PdfEngineError {
    match err {
        PdfError::PasswordRequired | PdfError::InvalidPassword => {
            PdfEngineError::EncryptedUnsupported
        }
        other => PdfEngineError::Parse(other),
    }
}

impl PdfEngine for PlumberEngine {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError> {
        let bytes = match source {
            OpenSource::Path(path) => fs::read(path)?,
            OpenSource::Bytes(bytes) => bytes,
        };

        let pdf = Self::parse(&bytes)?;
        log::debug!("pdfplumber opened document with {} pages", pdf.page_count());

        self.next_handle += 1;
        let handle = DocumentHandle(self.next_handle);
        self.docs.insert(handle, pdf);

        Ok(handle)
    }

    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError> {
        Ok(self.document(handle)?.page_count() as u32)
    }

    fn page_size(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PageSize, PdfEngineError> {
        let page = self.page(handle, page_index)?;
        Ok(PageSize { width_pt: page.width() as f32, height_pt: page.height() as f32 })
    }

    fn render_page(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RgbaImage, PdfEngineError> {
        let page = self.page(handle, request.page_index)?;
        let size = PageSize { width_pt: page.width() as f32, height_pt: page.height() as f32 };
        let scale = if request.scale <= 0.0 { 1.0 } else { request.scale };
        let (width, height) = raster_size(size, scale)?;

        let mut image = RgbaImage::from_pixel(width, height, PAPER);
        let scale = f64::from(scale);

        for ch in page.chars() {
            if ch.text.trim().is_empty() {
                continue;
            }
            let x0 = (ch.bbox.x0 * scale).max(0.0) as u32;
            let y0 = (ch.bbox.top * scale).max(0.0) as u32;
            let x1 = (ch.bbox.x1 * scale).min(f64::from(width)) as u32;
            let y1 = (ch.bbox.bottom * scale).min(f64::from(height)) as u32;
            for y in y0..y1 {
                for x in x0..x1 {
                    image.put_pixel(x, y, GLYPH);
                }
            }
        }

        if width >= 4 && height >= 4 {
            for x in 0..width {
                image.put_pixel(x, 0, BORDER);
                image.put_pixel(x, height - 1, BORDER);
            }
            for y in 0..height {
                image.put_pixel(0, y, BORDER);
                image.put_pixel(width - 1, y, BORDER);
            }
        }

        Ok(image)
    }

    fn extract_clip(
        &self,
        handle: DocumentHandle,
        page_index: u32,
        clip: ClipRect,
    ) -> Result<String, PdfEngineError> {
        let page = self.page(handle, page_index)?;
        let bbox = BBox::new(
            f64::from(clip.x),
            f64::from(clip.y),
            f64::from(clip.right()),
            f64::from(clip.bottom()),
        );
        let text = page.crop(bbox).extract_text(&TextOptions::default());
        Ok(text.trim().to_owned())
    }

    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError> {
        self.docs.remove(&handle).map(|_| ()).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn open(engine: &mut PlumberEngine, bytes: Vec<u8>) -> DocumentHandle {
        engine.open(OpenSource::Bytes(bytes)).expect("open should succeed")
    }

    #[test]
    fn opens_pdf_and_reads_page_count() {
        let mut engine = PlumberEngine::new();
        let handle = open(&mut engine, fixtures::pdf_with_pages(&["one", "two", "three"]));

        assert_eq!(engine.page_count(handle).expect("count should succeed"), 3);
    }

    #[test]
    fn page_size_comes_from_media_box() {
        let mut engine = PlumberEngine::new();
        let handle = open(&mut engine, fixtures::pdf_with_pages(&["one"]));

        let size = engine.page_size(handle, 0).expect("size should succeed");
        assert_eq!(size, PageSize { width_pt: 612.0, height_pt: 792.0 });
    }

    #[test]
    fn render_page_marks_glyphs_on_blank_paper() {
        let mut engine = PlumberEngine::new();
        let handle = open(&mut engine, fixtures::pdf_with_pages(&["Hello"]));

        let image = engine.render_page(handle, RenderRequest::page(0)).expect("render");
        assert_eq!((image.width(), image.height()), (612, 792));

        // Text baseline sits at y=72 from the top; glyph boxes end there.
        let header_band = (72..90).flat_map(|x| (55..75).map(move |y| (x, y)));
        assert!(header_band.into_iter().any(|(x, y)| *image.get_pixel(x, y) == GLYPH));
        assert_eq!(*image.get_pixel(300, 400), PAPER);
    }

    #[test]
    fn oversized_media_box_is_refused_before_allocating() {
        let mut engine = PlumberEngine::new();
        let handle = open(
            &mut engine,
            fixtures::pdf_with_media_box([0, 0, 9_000_000, 9_000_000], b"BT ET"),
        );

        let err = engine.render_page(handle, RenderRequest::page(0)).expect_err("too large");
        assert!(matches!(err, PdfEngineError::RenderTooLarge { .. }));
    }

    #[test]
    fn extract_clip_returns_text_inside_rectangle() {
        let mut engine = PlumberEngine::new();
        let handle = open(&mut engine, fixtures::pdf_with_pages(&["Hello world"]));

        let inside = ClipRect::from_corners(60.0, 50.0, 300.0, 90.0);
        let outside = ClipRect::from_corners(60.0, 200.0, 300.0, 260.0);

        assert_eq!(engine.extract_clip(handle, 0, inside).expect("extract"), "Hello world");
        assert_eq!(engine.extract_clip(handle, 0, outside).expect("extract"), "");
    }

    #[test]
    fn whole_page_clip_equals_full_text() {
        let mut engine = PlumberEngine::new();
        let handle = open(
            &mut engine,
            fixtures::pdf_with_content(
                b"BT /F1 12 Tf 72 720 Td (Top line) Tj 0 -600 Td (Bottom line) Tj ET",
            ),
        );

        let full = engine.extract_text(handle, 0).expect("full text");
        let clipped = engine
            .extract_clip(handle, 0, ClipRect::from_corners(0.0, 0.0, 612.0, 792.0))
            .expect("clipped text");

        assert_eq!(full, "Top line\nBottom line");
        assert_eq!(clipped, full);
    }

    #[test]
    fn text_drawn_by_form_xobject_is_extracted() {
        let mut engine = PlumberEngine::new();
        let handle = open(&mut engine, fixtures::pdf_with_form_xobject());

        let header = ClipRect::from_corners(60.0, 50.0, 300.0, 90.0);
        assert_eq!(engine.extract_clip(handle, 0, header).expect("extract"), "Hidden in form");
    }

    #[test]
    fn composite_font_is_decoded_through_to_unicode() {
        let mut engine = PlumberEngine::new();
        let handle = open(&mut engine, fixtures::pdf_with_composite_font());

        assert_eq!(engine.extract_text(handle, 0).expect("extract"), "AB");
    }

    #[test]
    fn out_of_range_page_is_reported() {
        let mut engine = PlumberEngine::new();
        let handle = open(&mut engine, fixtures::pdf_with_pages(&["only"]));

        let err = engine.page_size(handle, 4).expect_err("page 4 does not exist");
        assert!(matches!(err, PdfEngineError::PageOutOfRange { page: 4, page_count: 1 }));
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        let mut engine = PlumberEngine::new();
        let err = engine
            .open(OpenSource::Bytes(b"definitely not a pdf".to_vec()))
            .expect_err("garbage should not open");

        assert!(matches!(err, PdfEngineError::Parse(_)));
    }

    #[test]
    fn encrypt_marker_is_refused() {
        let mut engine = PlumberEngine::new();
        let mut bytes = fixtures::pdf_with_pages(&["secret"]);
        bytes.extend_from_slice(b"\n% /Encrypt\n");

        let err = engine.open(OpenSource::Bytes(bytes)).expect_err("encrypted should not open");
        assert!(matches!(err, PdfEngineError::EncryptedUnsupported));
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut engine = PlumberEngine::new();
        let err = engine
            .open(OpenSource::Path("/nonexistent/pdf-clip/missing.pdf".into()))
            .expect_err("missing file should not open");

        assert!(matches!(err, PdfEngineError::Io(_)));
    }

    #[test]
    fn invalid_handle_returns_error() {
        let engine = PlumberEngine::new();
        let err =
            engine.page_count(DocumentHandle(999)).expect_err("should fail for unknown handle");

        assert!(matches!(err, PdfEngineError::InvalidHandle(999)));
    }

    #[test]
    fn close_forgets_handle() {
        let mut engine = PlumberEngine::new();
        let handle = open(&mut engine, fixtures::pdf_with_pages(&["bye"]));

        engine.close(handle).expect("close should succeed");
        assert!(engine.page_count(handle).is_err());
        assert!(engine.close(handle).is_err());
    }
}
