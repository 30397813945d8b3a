//! In-memory documents: plain text statements and scanned images.

use image::DynamicImage;

use super::{PageSource, Result};
use crate::error::PdfError;

/// One page of a [`MemoryDocument`].
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    /// Text layer, if the page has one.
    pub text: Option<String>,
    /// Raster image used when the text layer is missing or blank.
    pub image: Option<DynamicImage>,
}

impl MemoryPage {
    /// A page with a text layer.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image: None,
        }
    }

    /// A scanned page.
    pub fn image(image: DynamicImage) -> Self {
        Self {
            text: None,
            image: Some(image),
        }
    }
}

/// A document held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    pages: Vec<MemoryPage>,
}

impl MemoryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from plain text, one page per form-feed separated chunk.
    ///
    /// A trailing form feed ends the last page rather than starting a new
    /// one, and empty text has no pages.
    pub fn from_text(text: &str) -> Self {
        let body = text.strip_suffix('\x0c').unwrap_or(text);
        if body.is_empty() {
            return Self::new();
        }
        Self {
            pages: body.split('\x0c').map(MemoryPage::text).collect(),
        }
    }

    /// Build a single-page document from a scanned image.
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            pages: vec![MemoryPage::image(image)],
        }
    }

    /// Append a page, builder style.
    pub fn with_page(mut self, page: MemoryPage) -> Self {
        self.pages.push(page);
        self
    }

    fn page(&self, page: u32) -> Result<&MemoryPage> {
        page.checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize))
            .ok_or(PdfError::InvalidPage(page))
    }
}

impl PageSource for MemoryDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn native_text(&self, page: u32) -> Result<Option<String>> {
        Ok(self.page(page)?.text.clone())
    }

    fn render_page(&self, page: u32, _dpi: u32) -> Result<DynamicImage> {
        self.page(page)?
            .image
            .clone()
            .ok_or_else(|| PdfError::Render(format!("page {} has no raster image", page)))
    }

    fn has_raster(&self, page: u32) -> bool {
        self.page(page).is_ok_and(|p| p.image.is_some())
    }
}
