//! Configuration structures for the statement parser.

use serde::{Deserialize, Serialize};

/// Main configuration for the vypiska pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VypiskaConfig {
    /// PDF loading configuration.
    pub pdf: PdfConfig,

    /// Transaction extraction configuration.
    pub extraction: ExtractionConfig,
}

/// PDF loading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Try to decrypt documents protected only by an empty user password.
    pub try_empty_password: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            try_empty_password: true,
        }
    }
}

/// Transaction extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Pages scanned when no page looks like a transaction table.
    pub fallback_page_limit: u32,

    /// Primary table backend variants, tried in order.
    pub grid_variants: Vec<GridVariant>,

    /// Secondary table backend settings.
    pub page_tables: PageTableConfig,

    /// Maximum description length in characters.
    pub description_max_chars: usize,

    /// Description prefix length used when collapsing duplicates.
    pub dedup_description_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fallback_page_limit: 99,
            grid_variants: GridVariant::defaults(),
            page_tables: PageTableConfig::default(),
            description_max_chars: 300,
            dedup_description_chars: 50,
        }
    }
}

/// One configuration of the primary table backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flavor", rename_all = "snake_case")]
pub enum GridVariant {
    /// Tables inferred from whitespace alignment of text.
    Stream {
        /// Vertical distance (pt) within which text shares a row.
        row_tol: f32,
        /// Vertical gap (pt) after which a new table region starts.
        edge_tol: f32,
    },
    /// Tables bounded by ruling lines.
    Lattice {
        /// Distance (pt) within which parallel lines are merged.
        line_tol: f32,
    },
}

impl GridVariant {
    /// Variant order used when nothing is configured.
    pub fn defaults() -> Vec<GridVariant> {
        vec![
            GridVariant::Stream {
                row_tol: 15.0,
                edge_tol: 500.0,
            },
            GridVariant::Lattice { line_tol: 2.0 },
            GridVariant::Stream {
                row_tol: 10.0,
                edge_tol: 300.0,
            },
            GridVariant::Stream {
                row_tol: 20.0,
                edge_tol: 200.0,
            },
        ]
    }

    /// Short label used in logs and diagnostics.
    pub fn label(&self) -> String {
        match self {
            GridVariant::Stream { row_tol, edge_tol } => {
                format!("stream(row_tol={}, edge_tol={})", row_tol, edge_tol)
            }
            GridVariant::Lattice { line_tol } => format!("lattice(line_tol={})", line_tol),
        }
    }
}

/// Secondary table backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageTableConfig {
    /// Vertical distance (pt) within which text shares a line.
    pub row_tol: f32,

    /// Minimum number of text chunks for a line to count as a table row.
    pub min_columns: usize,
}

impl Default for PageTableConfig {
    fn default() -> Self {
        Self {
            row_tol: 3.0,
            min_columns: 2,
        }
    }
}

impl VypiskaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
