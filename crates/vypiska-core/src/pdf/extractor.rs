//! PDF text and layout extraction using lopdf and pdf-extract.

use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use lopdf::Document;
use tracing::{debug, warn};

use super::device::{capture_page, load_layout_document};
use super::layout::PageLayout;
use super::{PdfSource, Result};
use crate::error::PdfError;

/// PDF reader backed by lopdf.
///
/// Page layouts are captured through pdf-extract on first use and cached,
/// since several extractors walk the same pages.
pub struct PdfExtractor {
    document: Option<Document>,
    layout_document: Option<pdf_extract::Document>,
    raw_data: Vec<u8>,
    try_empty_password: bool,
    layouts: RefCell<HashMap<u32, PageLayout>>,
}

impl PdfExtractor {
    /// Create an extractor with no document loaded.
    pub fn new() -> Self {
        Self {
            document: None,
            layout_document: None,
            raw_data: Vec::new(),
            try_empty_password: true,
            layouts: RefCell::new(HashMap::new()),
        }
    }

    /// Control whether encrypted documents are retried with an empty password.
    pub fn with_empty_password(mut self, enabled: bool) -> Self {
        self.try_empty_password = enabled;
        self
    }

    /// Load a document from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    /// Load a PDF from bytes, replacing any previously loaded document.
    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if !self.try_empty_password || doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads the bytes itself, so hand it the decrypted copy.
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.layout_document = match load_layout_document(&self.raw_data) {
            Ok(layout_document) => Some(layout_document),
            Err(e) => {
                warn!("Page layouts unavailable: {}", e);
                None
            }
        };
        self.document = Some(doc);
        self.layouts.borrow_mut().clear();
        Ok(())
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    /// Text assembled from captured page layouts.
    fn layout_text(&self) -> Result<String> {
        let mut text = String::new();
        for page in 1..=self.page_count() {
            match self.page_layout(page) {
                Ok(layout) => text.push_str(&layout.text()),
                Err(e) => warn!("Skipping page {} in layout text: {}", page, e),
            }
            text.push('\n');
        }
        Ok(text)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfSource for PdfExtractor {
    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        self.document()?;

        let data = &self.raw_data;
        match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(data))) {
            Ok(Ok(text)) if !text.trim().is_empty() => Ok(text),
            Ok(Ok(_)) => {
                debug!("pdf-extract returned no text, using page layouts");
                self.layout_text()
            }
            Ok(Err(e)) => {
                warn!("pdf-extract failed ({}), using page layouts", e);
                self.layout_text()
            }
            Err(_) => {
                warn!("pdf-extract panicked, using page layouts");
                self.layout_text()
            }
        }
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        Ok(self.page_layout(page)?.text())
    }

    fn page_layout(&self, page: u32) -> Result<PageLayout> {
        if let Some(layout) = self.layouts.borrow().get(&page) {
            return Ok(layout.clone());
        }

        if page == 0 || page > self.document()?.get_pages().len() as u32 {
            return Err(PdfError::InvalidPage(page));
        }
        let layout_document = self.layout_document.as_ref().ok_or_else(|| PdfError::Layout {
            page,
            reason: "document could not be read for layout".to_string(),
        })?;

        let layout = capture_page(layout_document, page)?;
        self.layouts.borrow_mut().insert(page, layout.clone());
        Ok(layout)
    }
}
