//! Output formats.
//!
//! Every file format renders to an in-memory buffer first; the destination is
//! written in one go only after rendering succeeded.

mod archive;
mod csv_file;
mod json_file;
mod ods;
mod pdf;
mod row;
mod terminal;
mod xlsx;

pub use terminal::print_table;

use cal_exporter_core::Event;
use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("CSV export failed")]
    Csv(#[from] csv::Error),

    #[error("JSON export failed")]
    Json(#[from] serde_json::Error),

    #[error("Failed to build spreadsheet archive")]
    Zip(#[from] zip::result::ZipError),

    #[error("PDF export failed")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error while rendering")]
    Io(#[from] std::io::Error),

    #[error("Failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Pdf,
    Xlsx,
    Ods,
    Csv,
    Json,
}

impl ExportFormat {
    /// Infer the format from a file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(ExportFormat::Pdf),
            "xlsx" => Some(ExportFormat::Xlsx),
            "ods" => Some(ExportFormat::Ods),
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Ods => "ods",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn render(self, events: &[Event]) -> Result<Vec<u8>, RenderError> {
        let render: fn(&[Event]) -> Result<Vec<u8>, RenderError> = match self {
            ExportFormat::Pdf => pdf::render,
            ExportFormat::Xlsx => xlsx::render,
            ExportFormat::Ods => ods::render,
            ExportFormat::Csv => csv_file::render,
            ExportFormat::Json => json_file::render,
        };
        render(events)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Render `events` and write them to `path`, creating parent directories.
pub fn write_file(path: &Path, format: ExportFormat, events: &[Event]) -> Result<(), RenderError> {
    let bytes = format.render(events)?;

    let write_err = |source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, bytes).map_err(write_err)?;

    Ok(())
}
