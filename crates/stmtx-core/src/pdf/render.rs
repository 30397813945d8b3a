//! Page rasterization through poppler's `pdftoppm`.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use tracing::{debug, trace};

use super::Result;
use crate::error::PdfError;

/// Renders single PDF pages to images by shelling out to `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRenderer {
    binary: PathBuf,
}

impl PdftoppmRenderer {
    /// Create a renderer using the given `pdftoppm` executable.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Path of the executable this renderer runs.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Render one page of the PDF at `pdf_path` to an image.
    pub fn render(&self, pdf_path: &Path, page: u32, dpi: u32) -> Result<DynamicImage> {
        let temp_dir = tempfile::tempdir()
            .map_err(|e| PdfError::Render(format!("failed to create temp dir: {}", e)))?;
        let prefix = temp_dir.path().join("page");
        let page_arg = page.to_string();

        trace!(
            "Running {} on {} page {} at {} DPI",
            self.binary.display(),
            pdf_path.display(),
            page,
            dpi
        );

        let output = Command::new(&self.binary)
            .args(["-png", "-singlefile", "-r", &dpi.to_string()])
            .args(["-f", &page_arg, "-l", &page_arg])
            .arg(pdf_path)
            .arg(&prefix)
            .output();

        match output {
            Ok(output) if output.status.success() => {}
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(PdfError::Render(format!(
                    "pdftoppm failed on page {}: {}",
                    page,
                    stderr.trim()
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PdfError::Render(format!(
                    "{} not found (install poppler-utils or set pdf.pdftoppm_path)",
                    self.binary.display()
                )));
            }
            Err(e) => return Err(PdfError::Render(e.to_string())),
        }

        let image_path = prefix.with_extension("png");
        let image = image::open(&image_path).map_err(|e| {
            PdfError::Render(format!("failed to load {}: {}", image_path.display(), e))
        })?;

        debug!(
            "Rendered page {} at {} DPI: {}x{}",
            page,
            dpi,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}

impl Default for PdftoppmRenderer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}
