//! Page layout capture on top of pdf-extract's content walker.
//!
//! pdf-extract resolves fonts (standard encodings, `Differences`, ToUnicode
//! maps, composite fonts) and descends into form XObjects. [`LayoutDevice`]
//! only records where each decoded glyph lands and which axis-aligned lines
//! are painted.

use std::panic::{catch_unwind, AssertUnwindSafe};

use pdf_extract::{ColorSpace, Document, MediaBox, Object, OutputDev, OutputError, Path, PathOp, Transform};
use tracing::{debug, warn};

use super::layout::{LineSegment, PageLayout, TextBox};
use super::Result;
use crate::error::PdfError;

/// Horizontal gap, in font-size units, that ends a text chunk.
const CHUNK_GAP: f32 = 0.6;
/// Horizontal gap, in font-size units, rendered as a space inside a chunk.
const SPACE_GAP: f32 = 0.15;
/// Lines shorter than this (pt) are dropped.
const MIN_LINE_LENGTH: f32 = 2.0;

/// Map a point through a row-vector transform.
fn apply(m: &Transform, x: f64, y: f64) -> (f32, f32) {
    (
        (x * m.m11 + y * m.m21 + m.m31) as f32,
        (x * m.m12 + y * m.m22 + m.m32) as f32,
    )
}

#[derive(Debug)]
struct PendingChunk {
    text: String,
    x0: f32,
    x1: f32,
    y: f32,
    size: f32,
    space_pending: bool,
}

/// Merges consecutive glyphs into text chunks.
///
/// A glyph continues the current chunk when it sits on the same baseline
/// and starts close enough to the chunk's right edge. Text-object
/// boundaries play no part.
#[derive(Debug, Default)]
struct ChunkBuilder {
    boxes: Vec<TextBox>,
    current: Option<PendingChunk>,
}

impl ChunkBuilder {
    fn push_glyph(&mut self, text: &str, x: f32, y: f32, width: f32, size: f32) {
        let is_space = text.chars().all(char::is_whitespace);

        if let Some(chunk) = self.current.as_mut() {
            let scale = chunk.size.max(size).max(1.0);
            let same_line = (y - chunk.y).abs() <= scale * 0.5;
            let gap = x - chunk.x1;
            let continues = same_line && x >= chunk.x0 - 0.5 && gap <= CHUNK_GAP * scale;

            if continues {
                if is_space {
                    chunk.space_pending = true;
                    chunk.x1 = chunk.x1.max(x + width);
                    return;
                }
                if chunk.space_pending || gap > SPACE_GAP * scale {
                    chunk.text.push(' ');
                }
                chunk.text.push_str(text);
                chunk.x1 = chunk.x1.max(x + width);
                chunk.space_pending = false;
                return;
            }
            self.flush();
        }

        if !is_space {
            self.current = Some(PendingChunk {
                text: text.to_string(),
                x0: x,
                x1: x + width,
                y,
                size,
                space_pending: false,
            });
        }
    }

    fn flush(&mut self) {
        if let Some(chunk) = self.current.take() {
            let text = chunk.text.trim();
            if !text.is_empty() {
                self.boxes.push(TextBox::new(
                    text,
                    chunk.x0,
                    chunk.y,
                    chunk.x1 - chunk.x0,
                    chunk.size,
                ));
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.boxes.is_empty() && self.current.is_none()
    }

    fn finish(mut self) -> Vec<TextBox> {
        self.flush();
        self.boxes
    }
}

/// Collects one page's text chunks and ruling lines.
pub(crate) struct LayoutDevice {
    layout: PageLayout,
    chunks: ChunkBuilder,
}

impl LayoutDevice {
    pub(crate) fn new(page_number: u32) -> Self {
        Self {
            layout: PageLayout::new(page_number, 595.0, 842.0),
            chunks: ChunkBuilder::default(),
        }
    }

    fn is_empty(&self) -> bool {
        self.chunks.is_empty() && self.layout.lines.is_empty()
    }

    pub(crate) fn finish(self) -> PageLayout {
        let mut layout = self.layout;
        layout.text_boxes = self.chunks.finish();
        layout
    }

    fn add_path(&mut self, ctm: &Transform, path: &Path) {
        let mut segments = Vec::new();
        let mut start = None;
        let mut current: Option<(f32, f32)> = None;

        for op in &path.ops {
            match *op {
                PathOp::MoveTo(x, y) => {
                    let p = apply(ctm, x, y);
                    start = Some(p);
                    current = Some(p);
                }
                PathOp::LineTo(x, y) => {
                    let p = apply(ctm, x, y);
                    if let Some(c) = current {
                        segments.push(LineSegment::new(c.0, c.1, p.0, p.1));
                    }
                    current = Some(p);
                }
                PathOp::CurveTo(_, _, _, _, x, y) => current = Some(apply(ctm, x, y)),
                PathOp::Rect(x, y, w, h) => {
                    let corners = [
                        apply(ctm, x, y),
                        apply(ctm, x + w, y),
                        apply(ctm, x + w, y + h),
                        apply(ctm, x, y + h),
                    ];
                    for i in 0..4 {
                        let (p, q) = (corners[i], corners[(i + 1) % 4]);
                        segments.push(LineSegment::new(p.0, p.1, q.0, q.1));
                    }
                    start = Some(corners[0]);
                    current = Some(corners[0]);
                }
                PathOp::Close => {
                    if let (Some(c), Some(s)) = (current, start) {
                        if c != s {
                            segments.push(LineSegment::new(c.0, c.1, s.0, s.1));
                        }
                        current = Some(s);
                    }
                }
            }
        }

        self.layout.lines.extend(segments.into_iter().filter(|seg| {
            (seg.is_horizontal() || seg.is_vertical()) && seg.length() >= MIN_LINE_LENGTH
        }));
    }
}

impl OutputDev for LayoutDevice {
    fn begin_page(
        &mut self,
        _page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.layout.width = (media_box.urx - media_box.llx).abs() as f32;
        self.layout.height = (media_box.ury - media_box.lly).abs() as f32;
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> std::result::Result<(), OutputError> {
        if char.is_empty() {
            return Ok(());
        }
        let (x, y) = apply(trm, 0.0, 0.0);
        let advance = (width * font_size * trm.m11.hypot(trm.m12)) as f32;
        let size = (font_size * trm.m21.hypot(trm.m22)) as f32;
        self.chunks.push_glyph(char, x, y, advance, size);
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn stroke(
        &mut self,
        ctm: &Transform,
        _colorspace: &ColorSpace,
        _color: &[f64],
        path: &Path,
    ) -> std::result::Result<(), OutputError> {
        self.add_path(ctm, path);
        Ok(())
    }

    fn fill(
        &mut self,
        ctm: &Transform,
        _colorspace: &ColorSpace,
        _color: &[f64],
        path: &Path,
    ) -> std::result::Result<(), OutputError> {
        self.add_path(ctm, path);
        Ok(())
    }
}

/// Parse a document for layout capture.
///
/// Image XObjects are emptied and retyped as forms: the walker runs every
/// `Do` target as a content stream and images carry no text.
pub(crate) fn load_layout_document(data: &[u8]) -> std::result::Result<Document, String> {
    let mut doc = Document::load_mem(data).map_err(|e| e.to_string())?;

    let mut blanked = 0;
    for object in doc.objects.values_mut() {
        if let Object::Stream(stream) = object {
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(Object::as_name)
                .is_ok_and(|name| name == b"Image");
            if is_image {
                stream.dict.set("Subtype", Object::Name(b"Form".to_vec()));
                stream.set_plain_content(Vec::new());
                blanked += 1;
            }
        }
    }
    debug!("Blanked {} image XObjects for layout capture", blanked);

    Ok(doc)
}

/// Capture the layout of one page.
///
/// A walker panic keeps whatever was captured before it; a page with nothing
/// captured is an error.
pub(crate) fn capture_page(doc: &Document, page_number: u32) -> Result<PageLayout> {
    let layout_error = |reason: String| PdfError::Layout {
        page: page_number,
        reason,
    };

    let mut device = LayoutDevice::new(page_number);
    let walked = catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::output_doc_page(doc, &mut device, page_number)
    }));

    match walked {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(layout_error(e.to_string())),
        Err(_) if device.is_empty() => {
            return Err(layout_error("content walker panicked".to_string()))
        }
        Err(_) => warn!("Content walker panicked on page {}, keeping partial layout", page_number),
    }

    let layout = device.finish();
    debug!(
        "Page {}: {} text chunks, {} lines",
        page_number,
        layout.text_boxes.len(),
        layout.lines.len()
    );
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64) -> Transform {
        Transform::row_major(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// Feed `text` glyph by glyph with a fixed half-em advance.
    fn draw(device: &mut LayoutDevice, x: f64, y: f64, text: &str) -> f64 {
        let mut x = x;
        for c in text.chars() {
            device
                .output_character(&at(x, y), 0.5, 0.0, 10.0, &c.to_string())
                .unwrap();
            x += 5.0;
        }
        x
    }

    fn texts(layout: &PageLayout) -> Vec<&str> {
        layout.text_boxes.iter().map(|b| b.text.as_str()).collect()
    }

    #[test]
    fn test_glyph_positions() {
        let mut device = LayoutDevice::new(1);
        draw(&mut device, 50.0, 700.0, "Date");
        draw(&mut device, 200.0, 700.0, "Amount");
        let layout = device.finish();

        assert_eq!(texts(&layout), ["Date", "Amount"]);
        assert_eq!(layout.text_boxes[0].x, 50.0);
        assert_eq!(layout.text_boxes[0].y, 700.0);
        assert_eq!(layout.text_boxes[0].width, 20.0);
        assert_eq!(layout.text_boxes[0].height, 10.0);
        assert_eq!(layout.text_boxes[1].x, 200.0);
    }

    #[test]
    fn test_words_merge_by_geometry() {
        let mut device = LayoutDevice::new(1);
        let end = draw(&mut device, 350.0, 700.0, "Coffee");
        let end = draw(&mut device, end + 2.5, 700.0, "shop");
        draw(&mut device, end + 3.0, 700.0, "payment");
        let layout = device.finish();

        assert_eq!(texts(&layout), ["Coffee shop payment"]);
    }

    #[test]
    fn test_spaces_and_scaled_text() {
        let mut device = LayoutDevice::new(1);
        draw(&mut device, 50.0, 700.0, "Card payment");
        let scaled = Transform::row_major(2.0, 0.0, 0.0, 2.0, 50.0, 600.0);
        device.output_character(&scaled, 0.5, 0.0, 10.0, "X").unwrap();
        let layout = device.finish();

        assert_eq!(texts(&layout), ["Card payment", "X"]);
        assert_eq!(layout.text_boxes[1].width, 10.0);
        assert_eq!(layout.text_boxes[1].height, 20.0);
    }

    #[test]
    fn test_ruling_lines() {
        let mut device = LayoutDevice::new(1);
        let rect = Path {
            ops: vec![PathOp::Rect(10.0, 10.0, 100.0, 50.0)],
        };
        let diagonal = Path {
            ops: vec![PathOp::MoveTo(0.0, 0.0), PathOp::LineTo(30.0, 40.0)],
        };
        device.stroke(&at(0.0, 0.0), &ColorSpace::DeviceGray, &[0.0], &rect).unwrap();
        device.fill(&at(0.0, 0.0), &ColorSpace::DeviceGray, &[0.0], &diagonal).unwrap();
        let layout = device.finish();

        assert_eq!(layout.lines.len(), 4);
        assert_eq!(layout.horizontal_lines().len(), 2);
    }

    #[test]
    fn test_path_follows_ctm() {
        let mut device = LayoutDevice::new(1);
        let line = Path {
            ops: vec![PathOp::MoveTo(0.0, 0.0), PathOp::LineTo(50.0, 0.0)],
        };
        device.stroke(&at(100.0, 20.0), &ColorSpace::DeviceGray, &[0.0], &line).unwrap();
        let layout = device.finish();

        assert_eq!(layout.lines[0].x1, 100.0);
        assert_eq!(layout.lines[0].x2, 150.0);
        assert_eq!(layout.lines[0].y1, 20.0);
    }

    #[test]
    fn test_unreadable_layout_document() {
        assert!(load_layout_document(b"not a pdf").is_err());
    }
}
