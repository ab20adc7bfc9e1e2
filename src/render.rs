use std::path::{Path, PathBuf};

use crate::parser::YOUTUBE_LINKS;
use crate::record::CountryRecord;

const FALLBACK_NAME: &str = "unnamed";

/// One layout element of a rendered brief, top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    /// Bold label followed by a value on the same line
    Field { label: String, value: String },
    /// Bold label on its own line
    Heading(String),
    /// "- item"
    Bullet(String),
    Body(String),
    Spacer,
}

/// Lay out a record in the fixed brief order.
pub fn layout(record: &CountryRecord) -> Vec<Block> {
    let mut blocks = vec![Block::Title(record.display_name().to_string()), Block::Spacer];

    field(&mut blocks, "Continent:", &record.continent);
    field(&mut blocks, "Languages Spoken:", &record.languages.join(", "));
    field(&mut blocks, "Population:", &record.population);
    field(&mut blocks, "Currency:", &record.currency);
    field(&mut blocks, "Area:", &record.area);

    bullets(&mut blocks, "Main Landmarks:", &record.landmarks);
    body(&mut blocks, "Head of State / Government:", &record.head_of_state);
    bullets(&mut blocks, "Main Cultural Events:", &record.cultural_events);
    body(&mut blocks, "Food & Cuisine:", &record.food_writeup);
    body(&mut blocks, "Brief History:", &record.brief_history);
    bullets(&mut blocks, "Important People:", &record.important_people);
    body(&mut blocks, "Current Conflicts:", &record.current_conflicts);
    bullets(&mut blocks, &format!("{}:", YOUTUBE_LINKS), &record.youtube_links);

    blocks
}

fn field(blocks: &mut Vec<Block>, label: &str, value: &str) {
    blocks.push(Block::Field {
        label: label.to_string(),
        value: value.to_string(),
    });
}

fn bullets(blocks: &mut Vec<Block>, heading: &str, items: &[String]) {
    blocks.push(Block::Heading(heading.to_string()));
    blocks.extend(items.iter().map(|i| Block::Bullet(i.clone())));
}

fn body(blocks: &mut Vec<Block>, heading: &str, text: &str) {
    blocks.push(Block::Heading(heading.to_string()));
    if !text.trim().is_empty() {
        blocks.push(Block::Body(text.to_string()));
    }
}

/// Keep alphanumerics, space, '-', '_' and '.'; everything else becomes '_'.
pub fn safe_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    match cleaned.trim() {
        "" => FALLBACK_NAME.to_string(),
        s => s.to_string(),
    }
}

/// `<output_dir>/<continent>/<country>.pdf`, both components sanitized.
pub fn document_path(output_dir: &Path, continent: &str, record: &CountryRecord) -> PathBuf {
    output_dir
        .join(safe_filename(continent))
        .join(format!("{}.pdf", safe_filename(record.display_name())))
}

/// Greedy word wrap to `max_width`, with widths summed per word by `measure`.
///
/// Words are never split: one wider than the line sits on a line of its own.
pub fn wrap(text: &str, max_width: f64, measure: impl Fn(&str) -> f64) -> Vec<String> {
    let space = measure(" ");
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in paragraph.split_whitespace() {
            let word_width = measure(word);
            if !current.is_empty() && current_width + space + word_width > max_width {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_width += space;
            }
            current.push_str(word);
            current_width += word_width;
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}
