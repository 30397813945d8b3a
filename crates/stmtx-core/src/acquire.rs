//! Page text acquisition with OCR fallback.
//!
//! Each page is read through its text layer first. Pages whose layer is
//! missing, unreadable, or whitespace-only are rendered and passed to OCR,
//! and whatever OCR returns (even nothing) becomes the page text. Pages are
//! resolved strictly in order and joined with a blank line. A blank layer on
//! a page with nothing to rasterize is kept as the page text.

use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::error::{PageError, Result, StmtError};
use crate::models::config::{PageFailurePolicy, PdfConfig};
use crate::ocr::OcrBackend;
use crate::pdf::{PageSource, PdfType};

/// Resolution used to rasterize pages for OCR.
pub const DEFAULT_RENDER_DPI: u32 = 300;

/// Separator placed between page texts in the full text.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Where a page's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// The page's embedded text layer.
    Native,
    /// OCR over the rendered page.
    Ocr,
    /// Acquisition failed and empty text was substituted.
    Substituted,
}

/// Text of a single page.
#[derive(Debug, Clone)]
pub struct PageText {
    /// Page number (1-indexed).
    pub number: u32,
    /// Page text.
    pub text: String,
    /// How the text was obtained.
    pub source: TextSource,
}

/// Text acquired from a whole document.
#[derive(Debug, Clone)]
pub struct AcquiredText {
    /// Page texts joined with [`PAGE_SEPARATOR`], in page order.
    pub full_text: String,
    /// Per-page texts, in page order.
    pub pages: Vec<PageText>,
    /// Document classification derived from the page sources.
    pub pdf_type: PdfType,
}

impl AcquiredText {
    /// Page texts in order.
    pub fn page_texts(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.text.as_str()).collect()
    }

    /// Text of the first page, if the document had any pages.
    pub fn first_page(&self) -> Option<&str> {
        self.pages.first().map(|p| p.text.as_str())
    }

    /// Number of pages that went through OCR.
    pub fn ocr_page_count(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| p.source == TextSource::Ocr)
            .count()
    }
}

/// Converts a paginated document into per-page text.
pub struct PageTextAcquirer {
    ocr: Box<dyn OcrBackend>,
    dpi: u32,
    on_failure: PageFailurePolicy,
}

impl PageTextAcquirer {
    /// Create an acquirer with the default DPI and the abort-on-failure policy.
    pub fn new(ocr: Box<dyn OcrBackend>) -> Self {
        Self {
            ocr,
            dpi: DEFAULT_RENDER_DPI,
            on_failure: PageFailurePolicy::Abort,
        }
    }

    /// Create an acquirer using PDF configuration for DPI and failure policy.
    pub fn from_config(ocr: Box<dyn OcrBackend>, config: &PdfConfig) -> Self {
        Self::new(ocr)
            .with_dpi(config.render_dpi)
            .with_failure_policy(config.on_page_failure)
    }

    /// Set the render DPI.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the page failure policy.
    pub fn with_failure_policy(mut self, policy: PageFailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    /// Acquire the text of every page of `document`.
    ///
    /// With [`PageFailurePolicy::Abort`] a page that cannot be rendered or
    /// recognized fails the whole document with [`StmtError::Page`].
    pub fn acquire<D: PageSource + ?Sized>(&self, document: &D) -> Result<AcquiredText> {
        let start = Instant::now();
        let page_count = document.page_count();
        let mut pages = Vec::with_capacity(page_count as usize);

        for number in 1..=page_count {
            pages.push(self.page_text(document, number)?);
        }

        let full_text = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(PAGE_SEPARATOR);
        let pdf_type = classify(&pages);

        info!(
            "Acquired {} pages ({} chars, {:?}) in {}ms",
            page_count,
            full_text.len(),
            pdf_type,
            start.elapsed().as_millis()
        );

        Ok(AcquiredText {
            full_text,
            pages,
            pdf_type,
        })
    }

    fn page_text<D: PageSource + ?Sized>(&self, document: &D, number: u32) -> Result<PageText> {
        let layer = match document.native_text(number) {
            Ok(Some(text)) if has_usable_text(&text) => {
                debug!("Page {}: using text layer ({} chars)", number, text.len());
                return Ok(PageText {
                    number,
                    text,
                    source: TextSource::Native,
                });
            }
            Ok(layer) => layer,
            Err(e) => {
                warn!("Page {}: text layer unreadable ({})", number, e);
                None
            }
        };

        if let Some(text) = layer.filter(|_| !document.has_raster(number)) {
            debug!("Page {}: blank text layer and nothing to render", number);
            return Ok(PageText {
                number,
                text,
                source: TextSource::Native,
            });
        }
        debug!("Page {}: no usable text layer, running OCR", number);

        match self.ocr_page(document, number) {
            Ok(text) => Ok(PageText {
                number,
                text,
                source: TextSource::Ocr,
            }),
            Err(e) => match self.on_failure {
                PageFailurePolicy::Abort => {
                    error!("Page {}: acquisition failed: {}", number, e);
                    Err(StmtError::Page {
                        page: number,
                        source: e,
                    })
                }
                PageFailurePolicy::Substitute => {
                    warn!("Page {}: acquisition failed, using empty text: {}", number, e);
                    Ok(PageText {
                        number,
                        text: String::new(),
                        source: TextSource::Substituted,
                    })
                }
            },
        }
    }

    fn ocr_page<D: PageSource + ?Sized>(
        &self,
        document: &D,
        number: u32,
    ) -> std::result::Result<String, PageError> {
        let image = document.render_page(number, self.dpi)?;
        let text = self.ocr.recognize(&image)?;
        debug!(
            "Page {}: {} recognized {} chars",
            number,
            self.ocr.name(),
            text.len()
        );
        Ok(text)
    }
}

/// A text layer counts only if it has a non-whitespace character.
fn has_usable_text(text: &str) -> bool {
    text.chars().any(|c| !c.is_whitespace())
}

fn classify(pages: &[PageText]) -> PdfType {
    if pages.is_empty() {
        return PdfType::Empty;
    }
    let native = pages
        .iter()
        .filter(|p| p.source == TextSource::Native)
        .count();
    match native {
        0 => PdfType::Image,
        n if n == pages.len() => PdfType::Text,
        _ => PdfType::Hybrid,
    }
}
