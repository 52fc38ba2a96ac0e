//! Error types for the vypiska-core library.

use thiserror::Error;

/// Main error type for the vypiska library.
#[derive(Error, Debug)]
pub enum VypiskaError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Transaction extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to capture the layout of a page.
    #[error("failed to read layout of page {page}: {reason}")]
    Layout { page: u32, reason: String },

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// A failure inside one extraction stage.
///
/// These never abort a parse: the cascade logs them and moves on to the
/// next strategy.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A backend could not read the document it was given.
    #[error("{stage}: {source}")]
    Document {
        stage: String,
        #[source]
        source: PdfError,
    },

    /// A backend produced no usable table structure.
    #[error("{stage}: {reason}")]
    Stage { stage: String, reason: String },
}

impl ExtractionError {
    pub fn document(stage: impl Into<String>, source: PdfError) -> Self {
        Self::Document {
            stage: stage.into(),
            source,
        }
    }

    pub fn stage(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for the vypiska library.
pub type Result<T> = std::result::Result<T, VypiskaError>;
