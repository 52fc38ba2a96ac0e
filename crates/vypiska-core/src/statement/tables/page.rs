//! Secondary table backend: columns anchored on the widest text line.

use tracing::{debug, warn};

use super::mapping::{normalize_header, parse_table_row};
use super::DetectedTable;
use crate::error::ExtractionError;
use crate::models::{ExtractorKind, PageTableConfig, RejectedRow};
use crate::pdf::PageLayout;
use crate::statement::rules::vocabulary::PAGE_HEADER_KEYWORDS;
use crate::statement::{Extraction, ExtractionContext, ExtractionStrategy, Result};

/// Table reader working straight from text line geometry.
#[derive(Debug, Clone)]
pub struct PageTables {
    config: PageTableConfig,
}

impl PageTables {
    pub fn new(config: PageTableConfig) -> Self {
        Self { config }
    }

    /// Read the page's multi-column lines as one table.
    ///
    /// Column anchors are the chunk centres of the line with the most
    /// chunks; every chunk goes to its nearest anchor.
    pub fn detect(&self, layout: &PageLayout) -> Option<DetectedTable> {
        let lines: Vec<_> = layout
            .rows(self.config.row_tol)
            .into_iter()
            .filter(|row| row.len() >= self.config.min_columns.max(1))
            .collect();
        if lines.len() < 2 {
            return None;
        }

        // Earliest line wins a tie so the header usually supplies the anchors.
        let widest = lines
            .iter()
            .fold(&lines[0], |best, line| if line.len() > best.len() { line } else { best });
        let anchors: Vec<f32> = widest.iter().map(|b| b.center_x()).collect();

        let rows = lines
            .iter()
            .map(|line| {
                let mut cells: Vec<Vec<&str>> = vec![Vec::new(); anchors.len()];
                for tbox in line {
                    let cx = tbox.center_x();
                    let nearest = anchors
                        .iter()
                        .enumerate()
                        .min_by(|a, b| {
                            (a.1 - cx)
                                .abs()
                                .partial_cmp(&(b.1 - cx).abs())
                                .unwrap_or(std::cmp::Ordering::Equal)
                        })
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                    cells[nearest].push(tbox.text.as_str());
                }
                cells.into_iter().map(|parts| parts.join(" ")).collect()
            })
            .collect();

        Some(DetectedTable {
            page: layout.page_number,
            rows,
        })
    }
}

/// Index of the first row with a cell containing a generic header keyword.
pub fn find_page_header_row(rows: &[Vec<String>]) -> Option<usize> {
    rows.iter().position(|row| {
        row.iter().any(|cell| {
            let cell = cell.to_lowercase();
            PAGE_HEADER_KEYWORDS.iter().any(|kw| cell.contains(kw))
        })
    })
}

impl ExtractionStrategy for PageTables {
    fn name(&self) -> String {
        "page-tables".to_string()
    }

    fn kind(&self) -> ExtractorKind {
        ExtractorKind::PageTables
    }

    fn attempt(&self, ctx: &ExtractionContext<'_>) -> Result<Extraction> {
        let mut extraction = Extraction::default();
        let mut readable_pages = 0;
        let mut last_error = None;

        for &page in ctx.pages {
            let layout = match ctx.source.page_layout(page) {
                Ok(layout) => layout,
                Err(e) => {
                    warn!("Cannot read layout of page {}: {}", page, e);
                    last_error = Some(e);
                    continue;
                }
            };
            readable_pages += 1;

            let Some(table) = self.detect(&layout) else {
                continue;
            };
            let Some(header_idx) = find_page_header_row(&table.rows) else {
                debug!("No header keywords on page {}", page);
                continue;
            };
            let headers: Vec<String> = table.rows[header_idx]
                .iter()
                .map(|h| normalize_header(h))
                .collect();
            debug!("Headers on page {}: {:?}", page, headers);

            for row in &table.rows[header_idx + 1..] {
                if row.iter().all(|cell| cell.trim().is_empty()) {
                    continue;
                }
                match parse_table_row(&headers, row, ctx.config.description_max_chars) {
                    Ok(tx) => extraction.transactions.push(tx),
                    Err(reason) => extraction.rejected.push(
                        RejectedRow::new(self.kind(), reason)
                            .with_page(page)
                            .with_headers(&headers)
                            .with_row(row),
                    ),
                }
            }
        }

        match last_error {
            Some(e) if readable_pages == 0 => Err(ExtractionError::document(self.name(), e)),
            _ => Ok(extraction),
        }
    }
}
