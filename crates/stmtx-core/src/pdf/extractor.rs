//! PDF text extraction using lopdf, with page rendering through pdftoppm.

use std::cell::OnceCell;
use std::io::Write;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use lopdf::Document;
use tempfile::NamedTempFile;
use tracing::{debug, trace};

use super::{PageSource, PdftoppmRenderer, Result};
use crate::error::PdfError;

/// A loaded PDF statement.
pub struct PdfDocument {
    document: Document,
    raw_data: Vec<u8>,
    page_count: u32,
    /// File the document was opened from, handed to the renderer as-is.
    path: Option<PathBuf>,
    renderer: PdftoppmRenderer,
    /// Copy of `raw_data` on disk for documents loaded from memory.
    spilled: OnceCell<NamedTempFile>,
}

impl PdfDocument {
    /// Open a PDF file.
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| PdfError::Parse(format!("failed to read {}: {}", path.display(), e)))?;
        let mut doc = Self::load(&data)?;
        doc.path = Some(path.to_path_buf());
        Ok(doc)
    }

    /// Load a PDF from bytes.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = document.get_pages().len() as u32;
        debug!("Loaded PDF with {} pages", page_count);

        Ok(Self {
            document,
            raw_data,
            page_count,
            path: None,
            renderer: PdftoppmRenderer::default(),
            spilled: OnceCell::new(),
        })
    }

    /// Use a specific renderer (e.g. a configured pdftoppm path).
    pub fn with_renderer(mut self, renderer: PdftoppmRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Path of a file holding this document, spilling it to a temp file if needed.
    fn file_path(&self) -> Result<&Path> {
        if let Some(path) = &self.path {
            return Ok(path);
        }
        if let Some(file) = self.spilled.get() {
            return Ok(file.path());
        }

        let mut file = tempfile::Builder::new()
            .prefix("stmtx-")
            .suffix(".pdf")
            .tempfile()
            .map_err(|e| PdfError::Render(format!("failed to create temp file: {}", e)))?;
        file.write_all(&self.raw_data)
            .map_err(|e| PdfError::Render(format!("failed to write temp file: {}", e)))?;
        trace!("Spilled in-memory PDF to {}", file.path().display());

        Ok(self.spilled.get_or_init(|| file).path())
    }

    fn check_page(&self, page: u32) -> Result<()> {
        if page == 0 || page > self.page_count {
            return Err(PdfError::InvalidPage(page));
        }
        Ok(())
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn native_text(&self, page: u32) -> Result<Option<String>> {
        self.check_page(page)?;

        let text = self
            .document
            .extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(format!("page {}: {}", page, e)))?;

        trace!("Page {} text layer: {} chars", page, text.len());
        Ok(Some(text))
    }

    fn render_page(&self, page: u32, dpi: u32) -> Result<DynamicImage> {
        self.check_page(page)?;
        let path = self.file_path()?;
        self.renderer.render(path, page, dpi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Build a PDF whose pages carry the given lines of text.
    fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn test_load_counts_pages() {
        let data = build_pdf(&["New Balance: $10.00", "Page two"]);
        let doc = PdfDocument::load(&data).unwrap();
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn test_native_text_per_page() {
        let data = build_pdf(&["Account ending in 1234", "Payment Due Date: 04/05/2024"]);
        let doc = PdfDocument::load(&data).unwrap();

        let first = doc.native_text(1).unwrap().unwrap();
        let second = doc.native_text(2).unwrap().unwrap();
        assert!(first.contains("ending in 1234"));
        assert!(second.contains("04/05/2024"));
    }

    #[test]
    fn test_invalid_page() {
        let data = build_pdf(&["only page"]);
        let doc = PdfDocument::load(&data).unwrap();

        assert!(matches!(doc.native_text(0), Err(PdfError::InvalidPage(0))));
        assert!(matches!(doc.native_text(2), Err(PdfError::InvalidPage(2))));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let result = PdfDocument::load(b"definitely not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }
}
