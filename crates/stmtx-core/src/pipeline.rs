//! End-to-end statement extraction: document in, record out.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::acquire::{AcquiredText, PageTextAcquirer};
use crate::error::{Result, StmtError};
use crate::models::config::StmtxConfig;
use crate::models::record::ExtractedRecord;
use crate::ocr::create_backend;
use crate::pdf::{MemoryDocument, PageSource, PdfDocument, PdftoppmRenderer};
use crate::statement::FieldRecognizer;

/// Default length of `_sample_text_snippet`.
pub const DEFAULT_SNIPPET_CHARS: usize = 400;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp"];

/// Result of extracting one statement.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The extracted record, provenance included.
    pub record: ExtractedRecord,
    /// Text the record was recognized from.
    pub acquired: AcquiredText,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Acquires a statement's text and recognizes its fields.
pub struct StatementExtractor {
    acquirer: PageTextAcquirer,
    recognizer: FieldRecognizer,
    snippet_chars: usize,
    renderer: PdftoppmRenderer,
}

impl StatementExtractor {
    /// Create an extractor from its two stages.
    pub fn new(acquirer: PageTextAcquirer, recognizer: FieldRecognizer) -> Self {
        Self {
            acquirer,
            recognizer,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
            renderer: PdftoppmRenderer::default(),
        }
    }

    /// Build the whole pipeline from configuration.
    pub fn from_config(config: &StmtxConfig) -> Result<Self> {
        if config.pdf.render_dpi == 0 {
            return Err(StmtError::Config("pdf.render_dpi must be positive".to_string()));
        }

        let ocr = create_backend(&config.ocr)?;
        debug!("Using OCR backend: {}", ocr.name());

        let acquirer = PageTextAcquirer::from_config(ocr, &config.pdf);
        Ok(Self::new(acquirer, FieldRecognizer::new())
            .with_snippet_chars(config.extraction.snippet_chars)
            .with_renderer(PdftoppmRenderer::new(&config.pdf.pdftoppm_path)))
    }

    /// Set how many characters of the first page are kept as the snippet.
    pub fn with_snippet_chars(mut self, chars: usize) -> Self {
        self.snippet_chars = chars;
        self
    }

    /// Set the renderer used for PDFs opened by [`Self::extract_path`].
    pub fn with_renderer(mut self, renderer: PdftoppmRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Extract a record from an already opened document.
    ///
    /// `file_name` is stored as the record's `_file`.
    pub fn extract_document<D: PageSource + ?Sized>(
        &self,
        document: &D,
        file_name: &str,
    ) -> Result<Extraction> {
        let start = Instant::now();
        let acquired = self.acquirer.acquire(document)?;
        Ok(self.finish(acquired, file_name, start))
    }

    /// Open a statement file and extract a record from it.
    ///
    /// PDFs, scanned images and plain text files are accepted; unknown
    /// extensions are read as PDF. The document is released before field
    /// recognition starts.
    pub fn extract_path(&self, path: &Path) -> Result<Extraction> {
        if !path.exists() {
            return Err(StmtError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            )));
        }

        let start = Instant::now();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let acquired = self.acquire_path(path)?;
        Ok(self.finish(acquired, &file_name, start))
    }

    fn acquire_path(&self, path: &Path) -> Result<AcquiredText> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            ext if IMAGE_EXTENSIONS.contains(&ext) => {
                debug!("Reading {} as a scanned image", path.display());
                let document = MemoryDocument::from_image(image::open(path)?);
                self.acquirer.acquire(&document)
            }
            "txt" => {
                debug!("Reading {} as plain text", path.display());
                let document = MemoryDocument::from_text(&std::fs::read_to_string(path)?);
                self.acquirer.acquire(&document)
            }
            _ => {
                let document =
                    PdfDocument::open(path)?.with_renderer(self.renderer.clone());
                self.acquirer.acquire(&document)
            }
        }
    }

    /// Recognize fields in acquired text and attach provenance.
    fn finish(&self, acquired: AcquiredText, file_name: &str, start: Instant) -> Extraction {
        let mut record = self.recognizer.recognize(&acquired.full_text);
        record.file = file_name.to_string();
        record.sample_text_snippet = acquired
            .first_page()
            .map(|text| text.chars().take(self.snippet_chars).collect())
            .unwrap_or_default();

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Extracted {} ({} fields) in {}ms",
            file_name,
            record.found_count(),
            processing_time_ms
        );

        Extraction {
            record,
            acquired,
            processing_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use crate::ocr::OcrBackend;
    use crate::pdf::MemoryPage;
    use crate::statement::rules::DateParser;
    use chrono::NaiveDate;
    use image::{DynamicImage, RgbImage};
    use pretty_assertions::assert_eq;

    struct FixedOcr(&'static str);

    impl OcrBackend for FixedOcr {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn recognize(&self, _image: &DynamicImage) -> std::result::Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    fn extractor(ocr_text: &'static str) -> StatementExtractor {
        let recognizer = FieldRecognizer::with_date_parser(DateParser::with_reference(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        ));
        StatementExtractor::new(PageTextAcquirer::new(Box::new(FixedOcr(ocr_text))), recognizer)
    }

    fn blank_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(4, 4))
    }

    #[test]
    fn test_extract_text_document() {
        let document = MemoryDocument::from_text(
            "Account ending in 4321\nNew Balance: $99.10\x0cPayment Due Date: 07/15/2024",
        );

        let extraction = extractor("").extract_document(&document, "june.pdf").unwrap();
        let record = extraction.record;

        assert_eq!(record.card_last4.as_deref(), Some("4321"));
        assert_eq!(record.total_balance.as_deref(), Some("99.10"));
        assert_eq!(record.payment_due_date.as_deref(), Some("2024-07-15"));
        assert_eq!(record.file, "june.pdf");
        assert_eq!(record.sample_text_snippet, "Account ending in 4321\nNew Balance: $99.10");
        assert_eq!(extraction.acquired.pages.len(), 2);
    }

    #[test]
    fn test_snippet_is_truncated_to_first_page() {
        let document = MemoryDocument::new()
            .with_page(MemoryPage::text("é".repeat(10)))
            .with_page(MemoryPage::text("second page"));

        let extraction = extractor("")
            .with_snippet_chars(4)
            .extract_document(&document, "a.pdf")
            .unwrap();
        assert_eq!(extraction.record.sample_text_snippet, "éééé");
    }

    #[test]
    fn test_empty_document() {
        let extraction = extractor("")
            .extract_document(&MemoryDocument::new(), "empty.pdf")
            .unwrap();

        let expected = ExtractedRecord {
            file: "empty.pdf".to_string(),
            ..Default::default()
        };
        assert_eq!(extraction.record, expected);
    }

    #[test]
    fn test_scanned_page_uses_ocr_text() {
        let document = MemoryDocument::from_image(blank_image());
        let extraction = extractor("Total Due: $12.00")
            .extract_document(&document, "scan.png")
            .unwrap();

        assert_eq!(extraction.record.total_balance.as_deref(), Some("12.00"));
        assert_eq!(extraction.record.sample_text_snippet, "Total Due: $12.00");
    }

    #[test]
    fn test_extract_path_missing_file() {
        let err = extractor("")
            .extract_path(Path::new("/nonexistent/statement.pdf"))
            .unwrap_err();
        assert!(matches!(err, StmtError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_extract_path_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("march.txt");
        std::fs::write(&path, "Card Type: Platinum Card\nAmount Due: 845").unwrap();

        let record = extractor("").extract_path(&path).unwrap().record;
        assert_eq!(record.card_variant.as_deref(), Some("Platinum Card"));
        assert_eq!(record.total_balance.as_deref(), Some("845.00"));
        assert_eq!(record.file, "march.txt");
    }

    #[test]
    fn test_extract_path_text_file_with_trailing_form_feed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("april.txt");
        std::fs::write(&path, "New Balance: $5.00\x0c").unwrap();

        let extraction = extractor("").extract_path(&path).unwrap();
        assert_eq!(extraction.acquired.pages.len(), 1);
        assert_eq!(extraction.record.total_balance.as_deref(), Some("5.00"));
    }

    #[test]
    fn test_extract_path_empty_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();

        let extraction = extractor("").extract_path(&path).unwrap();
        assert!(extraction.acquired.pages.is_empty());
        assert_eq!(
            extraction.record,
            ExtractedRecord {
                file: "empty.txt".to_string(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_from_config_rejects_zero_dpi() {
        let mut config = StmtxConfig::default();
        config.pdf.render_dpi = 0;

        let err = StatementExtractor::from_config(&config).err().unwrap();
        assert!(matches!(err, StmtError::Config(ref msg) if msg.contains("render_dpi")));
    }

    #[test]
    fn test_extract_path_image_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        blank_image().save(&path).unwrap();

        let record = extractor("Acct: 7777").extract_path(&path).unwrap().record;
        assert_eq!(record.card_last4.as_deref(), Some("7777"));
        assert_eq!(record.file, "scan.png");
    }
}
