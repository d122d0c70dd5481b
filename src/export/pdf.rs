//! Landscape letter PDF report drawn with the base-14 Helvetica fonts.

use cal_exporter_core::Event;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};

use super::RenderError;
use super::row::{rows, total_hours, truncate};

const PAGE_WIDTH: i64 = 792;
const PAGE_HEIGHT: i64 = 612;
const MARGIN: i64 = 36;

const TITLE: &str = "Calendar Events Report";
const TITLE_SIZE: i64 = 18;

const HEADER_HEIGHT: i64 = 22;
const ROW_HEIGHT: i64 = 18;
const HEADER_FONT_SIZE: i64 = 10;
const BODY_FONT_SIZE: i64 = 9;
const TOTALS_FONT_SIZE: i64 = 11;
const TOTALS_LINE: i64 = 16;

const SUMMARY_MAX: usize = 50;
const HASHTAGS_MAX: usize = 30;

const COLUMNS: [(&str, i64); 6] = [
    ("Date", 72),
    ("Start", 50),
    ("End", 50),
    ("Hours", 50),
    ("Summary", 288),
    ("Hashtags", 144),
];

const HEADER_FILL: [f32; 3] = [0.267, 0.447, 0.769];
const STRIPE_FILL: [f32; 3] = [0.949, 0.949, 0.949];
const GRID_GRAY: f32 = 0.5;

/// Accumulates the operations of one page.
struct Page {
    ops: Vec<Operation>,
}

impl Page {
    fn new() -> Self {
        Page { ops: Vec::new() }
    }

    fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, rgb: [f32; 3]) {
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new("rg", rgb.iter().map(|c| Object::Real(*c)).collect()));
        self.ops.push(Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()]));
        self.ops.push(Operation::new("f", vec![]));
        self.ops.push(Operation::new("Q", vec![]));
    }

    fn stroke_rect(&mut self, x: i64, y: i64, w: i64, h: i64) {
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new("G", vec![Object::Real(GRID_GRAY)]));
        self.ops.push(Operation::new("w", vec![Object::Real(0.5)]));
        self.ops.push(Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()]));
        self.ops.push(Operation::new("S", vec![]));
        self.ops.push(Operation::new("Q", vec![]));
    }

    fn text(&mut self, font: &str, size: i64, x: i64, y: i64, white: bool, text: &str) {
        let gray = if white { 1.0 } else { 0.0 };
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new("g", vec![Object::Real(gray)]));
        self.ops.push(Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), size.into()]));
        self.ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        self.ops.push(Operation::new("Tj", vec![Object::String(encode(text), StringFormat::Literal)]));
        self.ops.push(Operation::new("ET", vec![]));
    }

    /// One table row whose top edge is at `top`.
    fn table_row(&mut self, top: i64, height: i64, cells: &[String], header: bool, stripe: bool) {
        let bottom = top - height;
        let table_width: i64 = COLUMNS.iter().map(|(_, w)| w).sum();

        if header {
            self.fill_rect(MARGIN, bottom, table_width, height, HEADER_FILL);
        } else if stripe {
            self.fill_rect(MARGIN, bottom, table_width, height, STRIPE_FILL);
        }

        let (font, size) = if header {
            ("F2", HEADER_FONT_SIZE)
        } else {
            ("F1", BODY_FONT_SIZE)
        };

        let mut x = MARGIN;
        for ((_, width), cell) in COLUMNS.iter().zip(cells) {
            self.stroke_rect(x, bottom, *width, height);
            self.text(font, size, x + 4, bottom + (height - size) / 2 + 2, header, cell);
            x += width;
        }
    }
}

/// Map text to WinAnsi bytes. Characters outside Latin-1 become `?`, as do
/// U+0080..U+009F, whose byte values WinAnsi assigns to other glyphs.
fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u8::try_from(u32::from(c)) {
            Ok(byte) if !(0x80..=0x9f).contains(&byte) => byte,
            _ => b'?',
        })
        .collect()
}

pub fn render(events: &[Event]) -> Result<Vec<u8>, RenderError> {
    let header: Vec<String> = COLUMNS.iter().map(|(name, _)| name.to_string()).collect();
    let body: Vec<Vec<String>> = rows(events)
        .into_iter()
        .map(|row| {
            vec![
                row.date,
                row.start_time,
                row.end_time,
                format!("{:.2}", row.duration_hours),
                truncate(&row.summary, SUMMARY_MAX),
                truncate(&row.hashtags, HASHTAGS_MAX),
            ]
        })
        .collect();

    let mut pages = Vec::new();
    let mut page = Page::new();
    let title_baseline = PAGE_HEIGHT - MARGIN - TITLE_SIZE;
    page.text("F2", TITLE_SIZE, MARGIN, title_baseline, false, TITLE);

    let mut top = title_baseline - 18;
    page.table_row(top, HEADER_HEIGHT, &header, true, false);
    top -= HEADER_HEIGHT;

    for (i, cells) in body.iter().enumerate() {
        if top - ROW_HEIGHT < MARGIN {
            pages.push(page);
            page = Page::new();
            top = PAGE_HEIGHT - MARGIN;
            page.table_row(top, HEADER_HEIGHT, &header, true, false);
            top -= HEADER_HEIGHT;
        }
        page.table_row(top, ROW_HEIGHT, cells, false, i % 2 == 1);
        top -= ROW_HEIGHT;
    }

    let totals_height = 2 * TOTALS_LINE + 18;
    if top - totals_height < MARGIN {
        pages.push(page);
        page = Page::new();
        top = PAGE_HEIGHT - MARGIN;
    }
    top -= 18 + TOTALS_FONT_SIZE;
    page.text("F2", TOTALS_FONT_SIZE, MARGIN, top, false, &format!("Total Events: {}", events.len()));
    top -= TOTALS_LINE;
    page.text(
        "F2",
        TOTALS_FONT_SIZE,
        MARGIN,
        top,
        false,
        &format!("Total Hours: {:.2}", total_hours(events)),
    );
    pages.push(page);

    assemble(pages)
}

fn assemble(pages: Vec<Page>) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font = |base: &str| {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => Object::Name(base.as_bytes().to_vec()),
            "Encoding" => "WinAnsiEncoding",
        }
    };
    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content { operations: page.ops };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}
