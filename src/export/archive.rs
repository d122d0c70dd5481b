//! Zip containers for the spreadsheet formats.

use std::borrow::Cow;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::RenderError;

pub struct Entry<'a> {
    pub name: &'a str,
    pub contents: Cow<'a, str>,
    /// Stored entries are written uncompressed
    pub stored: bool,
}

impl<'a> Entry<'a> {
    pub fn deflated(name: &'a str, contents: impl Into<Cow<'a, str>>) -> Self {
        Entry {
            name,
            contents: contents.into(),
            stored: false,
        }
    }

    pub fn stored(name: &'a str, contents: impl Into<Cow<'a, str>>) -> Self {
        Entry {
            name,
            contents: contents.into(),
            stored: true,
        }
    }
}

/// Write `entries` in order into a zip archive held in memory.
pub fn build(entries: &[Entry<'_>]) -> Result<Vec<u8>, RenderError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for entry in entries {
        let method = if entry.stored {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        };
        let options = SimpleFileOptions::default().compression_method(method);

        zip.start_file(entry.name, options)?;
        zip.write_all(entry.contents.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

/// Escape text for XML content, dropping control characters XML 1.0 forbids.
pub fn xml_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    quick_xml::escape::escape(cleaned.as_str()).into_owned()
}
