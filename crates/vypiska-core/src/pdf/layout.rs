//! Positioned page content: text chunks and ruling lines.
//!
//! Coordinates are PDF user space: origin bottom-left, y grows upwards.

use std::cmp::Ordering;

use super::{PdfSource, Result};
use crate::error::PdfError;

/// Baseline tolerance used when rendering a page as plain text.
const TEXT_LINE_TOLERANCE: f32 = 2.0;

/// A run of text on one baseline, without large internal gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    /// Text content, inner gaps rendered as single spaces.
    pub text: String,
    /// Left edge.
    pub x: f32,
    /// Baseline.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Font size.
    pub height: f32,
}

impl TextBox {
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Vertical middle of the glyphs (baseline plus half the font size).
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// A straight line drawn on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl LineSegment {
    /// Create a segment with endpoints ordered left-to-right, bottom-to-top.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    pub fn length(&self) -> f32 {
        ((self.x2 - self.x1).powi(2) + (self.y2 - self.y1).powi(2)).sqrt()
    }

    pub fn is_horizontal(&self) -> bool {
        (self.y2 - self.y1).abs() <= 1.0 && self.x2 - self.x1 > 1.0
    }

    pub fn is_vertical(&self) -> bool {
        (self.x2 - self.x1).abs() <= 1.0 && self.y2 - self.y1 > 1.0
    }

    /// Y position of a horizontal line.
    pub fn y_coord(&self) -> f32 {
        (self.y1 + self.y2) / 2.0
    }

    /// X position of a vertical line.
    pub fn x_coord(&self) -> f32 {
        (self.x1 + self.x2) / 2.0
    }
}

/// Layout of a single page.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    /// Page number (1-indexed).
    pub page_number: u32,
    /// Media box width.
    pub width: f32,
    /// Media box height.
    pub height: f32,
    /// Text chunks in content-stream order.
    pub text_boxes: Vec<TextBox>,
    /// Axis-aligned lines from stroked and filled paths.
    pub lines: Vec<LineSegment>,
}

impl PageLayout {
    pub fn new(page_number: u32, width: f32, height: f32) -> Self {
        Self {
            page_number,
            width,
            height,
            text_boxes: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Add a text chunk.
    pub fn with_text(mut self, text: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.text_boxes.push(TextBox::new(text, x, y, width, height));
        self
    }

    /// Add a line.
    pub fn with_line(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.lines.push(LineSegment::new(x1, y1, x2, y2));
        self
    }

    pub fn horizontal_lines(&self) -> Vec<&LineSegment> {
        self.lines.iter().filter(|l| l.is_horizontal()).collect()
    }

    pub fn vertical_lines(&self) -> Vec<&LineSegment> {
        self.lines.iter().filter(|l| l.is_vertical()).collect()
    }

    /// Text chunks grouped into rows, top to bottom, each row left to right.
    pub fn rows(&self, tolerance: f32) -> Vec<Vec<&TextBox>> {
        group_rows(&self.text_boxes, tolerance)
    }

    /// Plain text in reading order, one output line per baseline.
    pub fn text(&self) -> String {
        self.rows(TEXT_LINE_TOLERANCE)
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| b.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Group text boxes into rows by baseline.
///
/// A box joins the current row when its baseline is within `tolerance` of
/// the baseline of the row's first box.
pub fn group_rows(text_boxes: &[TextBox], tolerance: f32) -> Vec<Vec<&TextBox>> {
    let mut sorted: Vec<&TextBox> = text_boxes.iter().collect();
    sorted.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
    });

    let mut rows: Vec<Vec<&TextBox>> = Vec::new();
    let mut row_y = f32::NAN;

    for tbox in sorted {
        match rows.last_mut() {
            Some(row) if (row_y - tbox.y).abs() <= tolerance => row.push(tbox),
            _ => {
                row_y = tbox.y;
                rows.push(vec![tbox]);
            }
        }
    }

    for row in &mut rows {
        row.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
    }

    rows
}

/// Merge values closer than `tolerance` into their mean, ascending.
pub fn cluster_values(values: &[f32], tolerance: f32) -> Vec<f32> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mut clusters: Vec<Vec<f32>> = Vec::new();
    for value in sorted {
        match clusters.last_mut() {
            Some(cluster) if cluster.last().is_some_and(|last| value - last <= tolerance) => {
                cluster.push(value)
            }
            _ => clusters.push(vec![value]),
        }
    }

    clusters
        .iter()
        .map(|c| c.iter().sum::<f32>() / c.len() as f32)
        .collect()
}

/// A document assembled from already-positioned pages.
///
/// Useful for callers that obtain geometry elsewhere, and for tests.
#[derive(Debug, Clone, Default)]
pub struct LayoutDocument {
    pages: Vec<PageLayout>,
}

impl LayoutDocument {
    pub fn new(pages: Vec<PageLayout>) -> Self {
        Self { pages }
    }

    pub fn pages(&self) -> &[PageLayout] {
        &self.pages
    }
}

impl PdfSource for LayoutDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        Ok(self.page_layout(page)?.text())
    }

    fn page_layout(&self, page: u32) -> Result<PageLayout> {
        page.checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize))
            .cloned()
            .ok_or(PdfError::InvalidPage(page))
    }
}
