//! PDF processing module.

mod device;
mod extractor;
pub mod layout;

pub use extractor::PdfExtractor;
pub use layout::{LayoutDocument, LineSegment, PageLayout, TextBox};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A loaded document the extractors can read from.
///
/// Pages are numbered from 1.
pub trait PdfSource {
    /// Get the number of pages in the document.
    fn page_count(&self) -> u32;

    /// Extract text from the entire document, pages separated by newlines.
    fn extract_text(&self) -> Result<String> {
        let mut text = String::new();
        for page in 1..=self.page_count() {
            text.push_str(&self.extract_page_text(page)?);
            text.push('\n');
        }
        Ok(text)
    }

    /// Extract text from a specific page.
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Positioned text chunks and ruling lines of a page.
    fn page_layout(&self, page: u32) -> Result<PageLayout>;
}

impl<T: PdfSource + ?Sized> PdfSource for &T {
    fn page_count(&self) -> u32 {
        (**self).page_count()
    }

    fn extract_text(&self) -> Result<String> {
        (**self).extract_text()
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        (**self).extract_page_text(page)
    }

    fn page_layout(&self, page: u32) -> Result<PageLayout> {
        (**self).page_layout(page)
    }
}
