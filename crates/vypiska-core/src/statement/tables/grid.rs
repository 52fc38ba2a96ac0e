//! Primary table backend: grid detection from text alignment or ruling lines.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{debug, trace, warn};

use super::mapping::{normalize_header, parse_table_row};
use super::DetectedTable;
use crate::error::ExtractionError;
use crate::models::{ExtractorKind, GridVariant, RejectedRow};
use crate::pdf::layout::{cluster_values, group_rows};
use crate::pdf::{PageLayout, TextBox};
use crate::statement::rules::patterns::{BARE_AMOUNT_CHAR_LIMIT, ROW_AMOUNT, ROW_DATE};
use crate::statement::rules::vocabulary::{HEADER_INDICATORS, HEADER_MIN_MATCHES};
use crate::statement::{Extraction, ExtractionContext, ExtractionStrategy, Result};

/// One configuration of the grid backend as a cascade step.
#[derive(Debug, Clone, Copy)]
pub struct GridTables {
    variant: GridVariant,
}

impl GridTables {
    pub fn new(variant: GridVariant) -> Self {
        Self { variant }
    }

    /// Detect tables on one page.
    pub fn detect(&self, layout: &PageLayout) -> Vec<DetectedTable> {
        let tables = match self.variant {
            GridVariant::Stream { row_tol, edge_tol } => stream_tables(layout, row_tol, edge_tol),
            GridVariant::Lattice { line_tol } => lattice_table(layout, line_tol).into_iter().collect(),
        };
        trace!(
            "{} on page {}: {} tables",
            self.variant.label(),
            layout.page_number,
            tables.len()
        );
        tables
    }

    fn extract_table(&self, table: &DetectedTable, max_chars: usize, out: &mut Extraction) {
        let Some(header_idx) = find_header_row(&table.rows) else {
            debug!("No header row in table on page {}, skipping", table.page);
            return;
        };
        let headers: Vec<String> = table.rows[header_idx]
            .iter()
            .map(|h| normalize_header(h))
            .collect();

        for row in &table.rows[header_idx + 1..] {
            if !is_transaction_row(row) {
                continue;
            }
            match parse_table_row(&headers, row, max_chars) {
                Ok(tx) => out.transactions.push(tx),
                Err(reason) => out.rejected.push(
                    RejectedRow::new(self.kind(), reason)
                        .with_page(table.page)
                        .with_headers(&headers)
                        .with_row(row),
                ),
            }
        }
    }
}

impl ExtractionStrategy for GridTables {
    fn name(&self) -> String {
        format!("grid:{}", self.variant.label())
    }

    fn kind(&self) -> ExtractorKind {
        ExtractorKind::GridTables
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

            for table in self.detect(&layout) {
                self.extract_table(&table, ctx.config.description_max_chars, &mut extraction);
            }
        }

        match last_error {
            Some(e) if readable_pages == 0 => Err(ExtractionError::document(self.name(), e)),
            _ => Ok(extraction),
        }
    }
}

/// Index of the first row where at least two cells contain a header word.
pub fn find_header_row(rows: &[Vec<String>]) -> Option<usize> {
    rows.iter().position(|row| {
        row.iter()
            .filter(|cell| {
                let cell = normalize_header(cell);
                HEADER_INDICATORS.iter().any(|word| cell.contains(word))
            })
            .count()
            >= HEADER_MIN_MATCHES
    })
}

/// Whether a data row looks like a transaction: some cell starts with a
/// date and some cell holds a number that either carries a rouble sign or
/// is short enough to be a bare amount.
pub fn is_transaction_row(row: &[String]) -> bool {
    if row.iter().all(|cell| cell.trim().is_empty()) {
        return false;
    }

    let has_date = row.iter().any(|cell| ROW_DATE.is_match(cell.trim()));
    let has_amount = row.iter().any(|cell| {
        let cell = cell.trim();
        ROW_AMOUNT.is_match(cell)
            && (cell.contains('₽') || cell.chars().count() < BARE_AMOUNT_CHAR_LIMIT)
    });

    has_date && has_amount
}

/// Tables inferred from text alignment.
///
/// Rows are text lines; a vertical gap larger than `edge_tol` starts a new
/// table. Columns come from the most common chunk count per row.
fn stream_tables(layout: &PageLayout, row_tol: f32, edge_tol: f32) -> Vec<DetectedTable> {
    let rows = group_rows(&layout.text_boxes, row_tol);

    let mut regions: Vec<Vec<Vec<&TextBox>>> = Vec::new();
    let mut last_y = f32::NAN;
    for row in rows {
        let y = row.first().map(|b| b.y).unwrap_or(0.0);
        match regions.last_mut() {
            Some(region) if (last_y - y).abs() <= edge_tol => region.push(row),
            _ => regions.push(vec![row]),
        }
        last_y = y;
    }

    regions
        .iter()
        .filter_map(|region| stream_region(region, layout.page_number))
        .collect()
}

fn stream_region(rows: &[Vec<&TextBox>], page: u32) -> Option<DetectedTable> {
    let ncols = column_count(rows)?;
    let boundaries = column_boundaries(rows, ncols);

    let table_rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = vec![Vec::new(); ncols];
            for tbox in row {
                let col = boundaries
                    .iter()
                    .position(|b| tbox.center_x() < *b)
                    .unwrap_or(ncols - 1);
                cells[col].push(tbox.text.as_str());
            }
            cells.into_iter().map(|parts| parts.join(" ")).collect()
        })
        .collect();

    Some(DetectedTable {
        page,
        rows: table_rows,
    })
}

/// Most common chunk count among multi-chunk rows; ties go to the wider.
fn column_count(rows: &[Vec<&TextBox>]) -> Option<usize> {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for row in rows.iter().filter(|r| r.len() >= 2) {
        *counts.entry(row.len()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(ncols, _)| ncols)
}

/// X positions separating adjacent columns, ascending.
fn column_boundaries(rows: &[Vec<&TextBox>], ncols: usize) -> Vec<f32> {
    let mut left = vec![f32::MAX; ncols];
    let mut right = vec![f32::MIN; ncols];
    let mut centers = vec![(0.0f32, 0usize); ncols];

    for row in rows.iter().filter(|r| r.len() == ncols) {
        for (i, tbox) in row.iter().enumerate() {
            left[i] = left[i].min(tbox.x);
            right[i] = right[i].max(tbox.right());
            centers[i].0 += tbox.center_x();
            centers[i].1 += 1;
        }
    }

    (0..ncols - 1)
        .map(|i| {
            if right[i] < left[i + 1] {
                (right[i] + left[i + 1]) / 2.0
            } else {
                let a = centers[i].0 / centers[i].1.max(1) as f32;
                let b = centers[i + 1].0 / centers[i + 1].1.max(1) as f32;
                (a + b) / 2.0
            }
        })
        .collect()
}

/// A table bounded by ruling lines.
fn lattice_table(layout: &PageLayout, line_tol: f32) -> Option<DetectedTable> {
    let h_lines: Vec<f32> = layout.horizontal_lines().iter().map(|l| l.y_coord()).collect();
    let v_lines: Vec<f32> = layout.vertical_lines().iter().map(|l| l.x_coord()).collect();

    let mut rows_y = cluster_values(&h_lines, line_tol);
    let cols_x = cluster_values(&v_lines, line_tol);
    if rows_y.len() < 2 || cols_x.len() < 2 {
        return None;
    }
    rows_y.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    let nrows = rows_y.len() - 1;
    let ncols = cols_x.len() - 1;
    let mut cells: Vec<Vec<Vec<&TextBox>>> = vec![vec![Vec::new(); ncols]; nrows];

    for tbox in &layout.text_boxes {
        let (cx, cy) = (tbox.center_x(), tbox.center_y());
        let row = rows_y.windows(2).position(|w| cy <= w[0] && cy >= w[1]);
        let col = cols_x.windows(2).position(|w| cx >= w[0] && cx <= w[1]);
        if let (Some(row), Some(col)) = (row, col) {
            cells[row][col].push(tbox);
        }
    }

    let rows = cells
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|mut parts| {
                    parts.sort_by(|a, b| {
                        b.y.partial_cmp(&a.y)
                            .unwrap_or(Ordering::Equal)
                            .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
                    });
                    parts.iter().map(|b| b.text.as_str()).collect::<Vec<_>>().join(" ")
                })
                .collect()
        })
        .collect();

    Some(DetectedTable {
        page: layout.page_number,
        rows,
    })
}
