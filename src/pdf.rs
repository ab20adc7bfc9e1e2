use std::fs;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

use crate::error::{Error, Result};
use crate::render::{wrap, Block};

// A4 in points
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 40;

const BODY_SIZE: i64 = 10;
const TITLE_SIZE: i64 = 16;
const LEADING: i64 = 14;
const TITLE_LEADING: i64 = 22;
const BLOCK_GAP: i64 = 6;
const SPACER: i64 = 12;
const INDENT: i64 = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// One text object on a page: a baseline position and styled runs.
#[derive(Debug)]
struct Line {
    x: i64,
    y: i64,
    size: i64,
    runs: Vec<(Font, String)>,
}

/// Write laid-out blocks as a PDF, creating parent directories.
pub fn write_pdf(blocks: &[Block], path: &Path) -> Result<()> {
    let pages = paginate(blocks);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font_dict("Helvetica"));
    let bold_id = doc.add_object(font_dict("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Font::Regular.resource_name() => regular_id,
            Font::Bold.resource_name() => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for lines in &pages {
        let content = Content {
            operations: page_operations(lines),
        };
        let stream = Stream::new(dictionary! {}, content.encode().map_err(pdf_err)?);
        let content_id = doc.add_object(stream);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
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
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    doc.save(path).map_err(pdf_err)?;

    debug!(path = %path.display(), pages = count, "Wrote PDF");
    Ok(())
}

/// Plain text of every page in order, one line per text object.
pub fn extract_text(path: &Path) -> Result<String> {
    let doc = Document::load(path).map_err(pdf_err)?;
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    if page_numbers.is_empty() {
        return Ok(String::new());
    }
    doc.extract_text(&page_numbers).map_err(pdf_err)
}

fn pdf_err(e: impl std::fmt::Display) -> Error {
    Error::Pdf(e.to_string())
}

fn font_dict(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn page_operations(lines: &[Line]) -> Vec<Operation> {
    let mut ops = Vec::new();
    for line in lines {
        ops.push(Operation::new("BT", vec![]));
        for (i, (font, text)) in line.runs.iter().enumerate() {
            ops.push(Operation::new(
                "Tf",
                vec![font.resource_name().into(), line.size.into()],
            ));
            if i == 0 {
                ops.push(Operation::new("Td", vec![line.x.into(), line.y.into()]));
            }
            ops.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]));
        }
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

// Advance widths (1/1000 em) of ' '..='~' in the standard Helvetica AFM files.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

// Upper bound for glyphs outside ASCII (Æ, Œ, … and — are a full em).
const WIDE_ADVANCE: u16 = 1000;

fn advance(font: Font, c: char) -> u16 {
    let table = match font {
        Font::Regular => &HELVETICA,
        Font::Bold => &HELVETICA_BOLD,
    };
    match c {
        ' '..='~' => table[c as usize - 32],
        _ => WIDE_ADVANCE,
    }
}

/// Rendered width in points of `text` set in `font` at `size`.
fn text_width(font: Font, size: i64, text: &str) -> f64 {
    let units: u32 = text.chars().map(|c| advance(font, c) as u32).sum();
    units as f64 * size as f64 / 1000.0
}

/// Width of a line that mixes a bold label with regular text; takes the wider glyph of the two.
fn mixed_width(size: i64, text: &str) -> f64 {
    let units: u32 = text
        .chars()
        .map(|c| advance(Font::Regular, c).max(advance(Font::Bold, c)) as u32)
        .sum();
    units as f64 * size as f64 / 1000.0
}

/// Text column width in points at an indent.
fn column_width(indent: i64) -> f64 {
    (PAGE_WIDTH - 2 * MARGIN - indent) as f64
}

struct PageCursor {
    pages: Vec<Vec<Line>>,
    y: i64,
}

impl PageCursor {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn push(&mut self, x: i64, size: i64, leading: i64, runs: Vec<(Font, String)>) {
        if self.y - leading < MARGIN {
            self.pages.push(Vec::new());
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.y -= leading;
        if let Some(page) = self.pages.last_mut() {
            page.push(Line {
                x,
                y: self.y,
                size,
                runs,
            });
        }
    }

    fn gap(&mut self, amount: i64) {
        self.y -= amount;
    }
}

fn paginate(blocks: &[Block]) -> Vec<Vec<Line>> {
    let mut cursor = PageCursor::new();
    let regular = |s: &str| text_width(Font::Regular, BODY_SIZE, s);
    let bold = |s: &str| text_width(Font::Bold, BODY_SIZE, s);

    for block in blocks {
        match block {
            Block::Title(title) => {
                let measure = |s: &str| text_width(Font::Bold, TITLE_SIZE, s);
                for line in wrap(title, column_width(0), measure) {
                    cursor.push(MARGIN, TITLE_SIZE, TITLE_LEADING, vec![(Font::Bold, line)]);
                }
            }
            Block::Field { label, value } => {
                let full = format!("{} {}", label, value.trim());
                let measure = |s: &str| mixed_width(BODY_SIZE, s);
                for (i, line) in wrap(&full, column_width(0), measure).into_iter().enumerate() {
                    let runs = match line.strip_prefix(label.as_str()) {
                        Some("") if i == 0 => vec![(Font::Bold, label.clone())],
                        Some(rest) if i == 0 => {
                            vec![(Font::Bold, label.clone()), (Font::Regular, rest.to_string())]
                        }
                        _ => vec![(Font::Regular, line.clone())],
                    };
                    cursor.push(MARGIN, BODY_SIZE, LEADING, runs);
                }
            }
            Block::Heading(heading) => {
                for line in wrap(heading, column_width(0), bold) {
                    cursor.push(MARGIN, BODY_SIZE, LEADING, vec![(Font::Bold, line)]);
                }
            }
            Block::Bullet(item) => {
                // the marker sits in the indent, so an item's first word never leaves it
                let lines = wrap(item, column_width(INDENT), regular);
                for (i, line) in lines.into_iter().enumerate() {
                    let (x, text) = if i == 0 {
                        (MARGIN, format!("- {}", line))
                    } else {
                        (MARGIN + INDENT, line)
                    };
                    cursor.push(x, BODY_SIZE, LEADING, vec![(Font::Regular, text)]);
                }
            }
            Block::Body(text) => {
                for line in wrap(text, column_width(0), regular) {
                    cursor.push(MARGIN, BODY_SIZE, LEADING, vec![(Font::Regular, line)]);
                }
            }
            Block::Spacer => {
                cursor.gap(SPACER);
                continue;
            }
        }
        cursor.gap(BLOCK_GAP);
    }

    cursor.pages
}

/// Encode for the standard Type1 fonts; unmappable characters become '?'.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{extract_section, YOUTUBE_LINKS};
    use crate::record::CountryRecord;
    use crate::render::layout;

    fn sample() -> CountryRecord {
        CountryRecord {
            country: "Peru".into(),
            continent: "South America".into(),
            languages: vec!["Spanish".into(), "Quechua".into()],
            population: "34,352,720".into(),
            landmarks: vec!["Machu Picchu - Inca citadel above the Urubamba valley".into()],
            head_of_state: "President: Dina Boluarte".into(),
            brief_history: "Home of the Inca Empire until the Spanish conquest. ".repeat(8),
            youtube_links: vec![
                "https://www.youtube.com/watch?v=aaa".into(),
                "https://www.youtube.com/watch?v=bbb".into(),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn rendered_links_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("South America").join("Peru.pdf");

        write_pdf(&layout(&sample()), &path).unwrap();
        assert!(path.exists());

        let text = extract_text(&path).unwrap();
        assert!(text.contains("Peru"));
        assert!(text.contains("Continent: South America"));
        assert_eq!(
            extract_section(Some(&text), YOUTUBE_LINKS),
            vec![
                "https://www.youtube.com/watch?v=aaa",
                "https://www.youtube.com/watch?v=bbb"
            ]
        );
        assert_eq!(
            extract_section(Some(&text), "Main Landmarks"),
            vec!["Machu Picchu - Inca citadel above the Urubamba valley"]
        );
    }

    #[test]
    fn long_documents_span_pages() {
        let mut rec = sample();
        rec.important_people = (0..150).map(|i| format!("Person {}", i)).collect();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.pdf");
        write_pdf(&layout(&rec), &path).unwrap();

        let doc = Document::load(&path).unwrap();
        assert!(doc.get_pages().len() > 1);

        let text = extract_text(&path).unwrap();
        let people = extract_section(Some(&text), "Important People");
        assert_eq!(people.len(), 150);
        assert_eq!(people[149], "Person 149");
        assert_eq!(extract_section(Some(&text), YOUTUBE_LINKS).len(), 2);
    }

    #[test]
    fn unreadable_file_is_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();
        assert!(matches!(extract_text(&path), Err(Error::Pdf(_))));
        assert!(matches!(
            extract_text(&dir.path().join("missing.pdf")),
            Err(Error::Pdf(_))
        ));
    }

    #[test]
    fn paginate_breaks_pages() {
        let blocks: Vec<Block> = (0..120).map(|i| Block::Bullet(i.to_string())).collect();
        let pages = paginate(&blocks);
        assert!(pages.len() > 1);
        assert!(pages.iter().flatten().all(|l| l.y >= MARGIN));
    }

    #[test]
    fn links_wider_than_the_page_stay_whole() {
        let link = format!(
            "https://www.youtube.com/watch?v=abcdefghijk&list=PL{}&index=3",
            "x".repeat(60)
        );
        assert_eq!(link.len(), 119);
        let mut rec = sample();
        rec.youtube_links = vec![link.clone(), "https://youtu.be/short".into()];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long-link.pdf");
        write_pdf(&layout(&rec), &path).unwrap();

        let text = extract_text(&path).unwrap();
        assert_eq!(
            extract_section(Some(&text), YOUTUBE_LINKS),
            vec![link.as_str(), "https://youtu.be/short"]
        );
    }

    #[test]
    fn bullet_marker_shares_the_first_line() {
        let long = "y".repeat(200);
        let pages = paginate(&[Block::Bullet(format!("{} tail", long))]);
        let lines: Vec<&Line> = pages.iter().flatten().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].runs[0].1, format!("- {}", long));
        assert_eq!((lines[1].x, lines[1].runs[0].1.as_str()), (MARGIN + INDENT, "tail"));
    }

    #[test]
    fn wide_glyph_lines_fit_the_column() {
        let caps = "WIDE MEASURED WORDS ".repeat(20);
        let blocks = vec![
            Block::Title(caps.clone()),
            Block::Field {
                label: "Head of State:".into(),
                value: caps.clone(),
            },
            Block::Heading(caps.clone()),
            Block::Bullet(caps.clone()),
            Block::Body(format!("@@@@ {}", caps)),
        ];
        let pages = paginate(&blocks);
        let lines: Vec<&Line> = pages.iter().flatten().collect();
        assert!(lines.len() > 10);
        for line in lines {
            let width: f64 = line
                .runs
                .iter()
                .map(|(font, text)| text_width(*font, line.size, text))
                .sum();
            assert!(
                line.x as f64 + width <= (PAGE_WIDTH - MARGIN) as f64,
                "line overflows the right margin: {:?}",
                line
            );
        }
    }

    #[test]
    fn helvetica_metrics() {
        assert_eq!(advance(Font::Regular, 'W'), 944);
        assert_eq!(advance(Font::Regular, 'i'), 222);
        assert_eq!(advance(Font::Bold, 'i'), 278);
        assert_eq!(advance(Font::Regular, '~'), 584);
        assert_eq!(advance(Font::Regular, 'Æ'), WIDE_ADVANCE);
        assert!((text_width(Font::Regular, 10, "WW") - 18.88).abs() < 1e-9);
    }

    #[test]
    fn win_ansi_mapping() {
        assert_eq!(win_ansi("A é"), vec![b'A', b' ', 0xE9]);
        assert_eq!(win_ansi("•’"), vec![0x95, 0x92]);
        assert_eq!(win_ansi("日"), vec![b'?']);
    }
}
