//! Office Open XML workbook with a single sheet.

use cal_exporter_core::Event;
use std::fmt::Write as _;

use super::RenderError;
use super::archive::{self, Entry, xml_text};
use super::row::{COLUMN_WIDTHS, Cell, HEADERS, rows, totals};

const SHEET_NAME: &str = "Calendar Events";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

// Cell formats: 0 default, 1 header, 2 bordered body, 3 bold label, 4 bordered right-aligned number
const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="3">
<font><sz val="11"/><name val="Calibri"/></font>
<font><b/><sz val="11"/><color rgb="FFFFFFFF"/><name val="Calibri"/></font>
<font><b/><sz val="11"/><name val="Calibri"/></font>
</fonts>
<fills count="3">
<fill><patternFill patternType="none"/></fill>
<fill><patternFill patternType="gray125"/></fill>
<fill><patternFill patternType="solid"><fgColor rgb="FF4472C4"/><bgColor rgb="FF4472C4"/></patternFill></fill>
</fills>
<borders count="2">
<border><left/><right/><top/><bottom/><diagonal/></border>
<border><left style="thin"/><right style="thin"/><top style="thin"/><bottom style="thin"/><diagonal/></border>
</borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="5">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
<xf numFmtId="0" fontId="1" fillId="2" borderId="1" xfId="0" applyFont="1" applyFill="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center" vertical="center"/></xf>
<xf numFmtId="0" fontId="0" fillId="0" borderId="1" xfId="0" applyBorder="1"/>
<xf numFmtId="0" fontId="2" fillId="0" borderId="0" xfId="0" applyFont="1"/>
<xf numFmtId="0" fontId="0" fillId="0" borderId="1" xfId="0" applyBorder="1" applyAlignment="1"><alignment horizontal="right"/></xf>
</cellXfs>
<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#;

const STYLE_DEFAULT: u8 = 0;
const STYLE_HEADER: u8 = 1;
const STYLE_BODY: u8 = 2;
const STYLE_LABEL: u8 = 3;
const STYLE_NUMBER: u8 = 4;

pub fn render(events: &[Event]) -> Result<Vec<u8>, RenderError> {
    let workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#,
        xml_text(SHEET_NAME)
    );

    archive::build(&[
        Entry::deflated("[Content_Types].xml", CONTENT_TYPES),
        Entry::deflated("_rels/.rels", ROOT_RELS),
        Entry::deflated("xl/workbook.xml", workbook),
        Entry::deflated("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        Entry::deflated("xl/styles.xml", STYLES),
        Entry::deflated("xl/worksheets/sheet1.xml", sheet_xml(events)),
    ])
}

fn sheet_xml(events: &[Event]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<cols>"#,
    );
    for (i, width) in COLUMN_WIDTHS.iter().enumerate() {
        let col = i + 1;
        let _ = write!(xml, r#"<col min="{col}" max="{col}" width="{width}" customWidth="1"/>"#);
    }
    xml.push_str("</cols>\n<sheetData>\n");

    let header: Vec<Cell> = HEADERS.iter().map(|h| Cell::Text(h.to_string())).collect();
    write_row(&mut xml, 1, &header, |_| STYLE_HEADER);

    let mut row_number = 1;
    for row in rows(events) {
        row_number += 1;
        write_row(&mut xml, row_number, &row.cells(), |cell| match cell {
            Cell::Number(_) => STYLE_NUMBER,
            Cell::Text(_) => STYLE_BODY,
        });
    }

    // Skip one row before the totals
    row_number += 1;
    for line in totals(events) {
        row_number += 1;
        write_row(&mut xml, row_number, &line, |cell| match cell {
            Cell::Text(_) => STYLE_LABEL,
            Cell::Number(_) => STYLE_DEFAULT,
        });
    }

    xml.push_str("</sheetData>\n</worksheet>");
    xml
}

fn write_row(xml: &mut String, number: usize, cells: &[Cell], style: impl Fn(&Cell) -> u8) {
    let _ = write!(xml, r#"<row r="{number}">"#);
    for (i, cell) in cells.iter().enumerate() {
        let reference = format!("{}{}", column_letter(i), number);
        let s = style(cell);
        match cell {
            Cell::Text(text) => {
                let _ = write!(
                    xml,
                    r#"<c r="{reference}" s="{s}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                    xml_text(text)
                );
            }
            Cell::Number(value) => {
                let _ = write!(xml, r#"<c r="{reference}" s="{s}"><v>{value}</v></c>"#);
            }
        }
    }
    xml.push_str("</row>\n");
}

/// Zero-based column index to `A`, `B`, ... `Z`, `AA`, ...
fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}
