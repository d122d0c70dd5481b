//! OpenDocument spreadsheet.

use cal_exporter_core::Event;
use std::fmt::Write as _;

use super::RenderError;
use super::archive::{self, Entry, xml_text};
use super::row::{Cell, HEADERS, rows, totals};

const MIMETYPE: &str = "application/vnd.oasis.opendocument.spreadsheet";

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2">
<manifest:file-entry manifest:full-path="/" manifest:version="1.2" manifest:media-type="application/vnd.oasis.opendocument.spreadsheet"/>
<manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/>
</manifest:manifest>"#;

pub fn render(events: &[Event]) -> Result<Vec<u8>, RenderError> {
    // The mimetype entry must come first and be stored uncompressed
    archive::build(&[
        Entry::stored("mimetype", MIMETYPE),
        Entry::deflated("META-INF/manifest.xml", MANIFEST),
        Entry::deflated("content.xml", content_xml(events)),
    ])
}

fn content_xml(events: &[Event]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" office:version="1.2">
<office:body>
<office:spreadsheet>
<table:table table:name="Calendar Events">
"#,
    );
    let _ = writeln!(
        xml,
        r#"<table:table-column table:number-columns-repeated="{}"/>"#,
        HEADERS.len()
    );

    let header: Vec<Cell> = HEADERS.iter().map(|h| Cell::Text(h.to_string())).collect();
    write_row(&mut xml, &header);
    for row in rows(events) {
        write_row(&mut xml, &row.cells());
    }

    xml.push_str("<table:table-row><table:table-cell/></table:table-row>\n");
    for line in totals(events) {
        write_row(&mut xml, &line);
    }

    xml.push_str("</table:table>\n</office:spreadsheet>\n</office:body>\n</office:document-content>");
    xml
}

fn write_row(xml: &mut String, cells: &[Cell]) {
    xml.push_str("<table:table-row>");
    for cell in cells {
        match cell {
            Cell::Text(text) => {
                xml.push_str(r#"<table:table-cell office:value-type="string">"#);
                // One paragraph per line
                for line in text.split('\n') {
                    let _ = write!(xml, "<text:p>{}</text:p>", xml_text(line));
                }
                xml.push_str("</table:table-cell>");
            }
            Cell::Number(value) => {
                let _ = write!(
                    xml,
                    r#"<table:table-cell office:value-type="float" office:value="{value}"><text:p>{value}</text:p></table:table-cell>"#
                );
            }
        }
    }
    xml.push_str("</table:table-row>\n");
}
