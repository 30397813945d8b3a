//! Paginated document sources.

mod extractor;
mod memory;
mod render;

pub use extractor::PdfDocument;
pub use memory::{MemoryDocument, MemoryPage};
pub use render::PdftoppmRenderer;

use crate::error::PdfError;
use image::DynamicImage;

/// Type of document content, as seen by the acquirer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Every page had a text layer.
    Text,
    /// Every page needed OCR.
    Image,
    /// Some pages had text, some needed OCR.
    Hybrid,
    /// No pages.
    Empty,
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A paginated document whose pages can be read as text or rasterized.
///
/// Page numbers are 1-indexed.
pub trait PageSource {
    /// Get the number of pages in the document.
    fn page_count(&self) -> u32;

    /// Read the page's embedded text layer, if it has one.
    fn native_text(&self, page: u32) -> Result<Option<String>>;

    /// Render a page as an image at the specified DPI.
    fn render_page(&self, page: u32, dpi: u32) -> Result<DynamicImage>;

    /// Whether the page has anything to rasterize. Pages without a raster
    /// keep their text layer as is, blank or not.
    fn has_raster(&self, _page: u32) -> bool {
        true
    }
}

impl<T: PageSource + ?Sized> PageSource for &T {
    fn page_count(&self) -> u32 {
        (**self).page_count()
    }

    fn native_text(&self, page: u32) -> Result<Option<String>> {
        (**self).native_text(page)
    }

    fn render_page(&self, page: u32, dpi: u32) -> Result<DynamicImage> {
        (**self).render_page(page, dpi)
    }

    fn has_raster(&self, page: u32) -> bool {
        (**self).has_raster(page)
    }
}
