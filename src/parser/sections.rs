use regex::Regex;

/// Header of the links section in a rendered brief.
pub const YOUTUBE_LINKS: &str = "Youtube Links";

const BULLETS: &[&str] = &["- ", "• ", "* "];

/// Items of every section introduced by a given header line.
///
/// A header is a line that, trimmed, equals the label (case-insensitive) with an
/// optional trailing colon. A section runs until a blank line or a line ending
/// with `:`. Each call to [`SectionList::items`] scans the text from the top.
#[derive(Debug, Clone)]
pub struct SectionList<'t> {
    text: &'t str,
    header: Option<Regex>,
}

impl<'t> SectionList<'t> {
    pub fn new(text: &'t str, label: &str) -> Self {
        Self {
            text,
            header: header_pattern(label),
        }
    }

    pub fn items(&self) -> SectionItems<'_> {
        SectionItems {
            lines: self.text.lines(),
            header: self.header.as_ref(),
            in_section: false,
        }
    }
}

/// Lazy walk over the lines of one text; see [`SectionList`].
#[derive(Debug)]
pub struct SectionItems<'a> {
    lines: std::str::Lines<'a>,
    header: Option<&'a Regex>,
    in_section: bool,
}

impl<'a> Iterator for SectionItems<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let header = self.header?;

        for raw in self.lines.by_ref() {
            let line = raw.trim();

            if !self.in_section {
                self.in_section = header.is_match(line);
                continue;
            }

            if line.is_empty() {
                self.in_section = false;
                continue;
            }

            // A new header closes the section; it may reopen the same one.
            if line.ends_with(':') {
                self.in_section = header.is_match(line);
                continue;
            }

            let item = strip_bullet(line);
            if !item.is_empty() {
                return Some(item);
            }
        }

        None
    }
}

/// Collect a section's items from text that may be absent.
pub fn extract_section(text: Option<&str>, label: &str) -> Vec<String> {
    match text {
        Some(t) if !t.trim().is_empty() => SectionList::new(t, label)
            .items()
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn header_pattern(label: &str) -> Option<Regex> {
    let label = label.trim().trim_end_matches(':').trim_end();
    if label.is_empty() {
        return None;
    }
    Regex::new(&format!(r"(?i)^\s*{}\s*:?\s*$", regex::escape(label))).ok()
}

fn strip_bullet(line: &str) -> &str {
    BULLETS
        .iter()
        .find_map(|b| line.strip_prefix(b))
        .map(str::trim)
        .unwrap_or(line)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn links(text: &str) -> Vec<String> {
        extract_section(Some(text), YOUTUBE_LINKS)
    }

    #[test]
    fn section_until_blank_line() {
        let text = "Youtube Links:\n- https://a\n- https://b\n\nOther:\n- https://c";
        assert_eq!(links(text), vec!["https://a", "https://b"]);
    }

    #[test]
    fn section_until_end_of_input() {
        let text = "Title\nYoutube Links:\nhttps://a\nhttps://b\nhttps://c";
        assert_eq!(links(text), vec!["https://a", "https://b", "https://c"]);
    }

    #[test]
    fn no_header_no_items() {
        assert!(links("Continent: Asia\n- https://a\n").is_empty());
        assert!(links("").is_empty());
        assert!(extract_section(None, YOUTUBE_LINKS).is_empty());
    }

    #[test]
    fn header_case_insensitive() {
        assert_eq!(links("YOUTUBE LINKS:\n- x"), vec!["x"]);
        assert_eq!(links("youtube links:\n- x"), vec!["x"]);
    }

    #[test]
    fn header_must_be_whole_line() {
        assert!(links("Youtube Links are below\n- x").is_empty());
        assert!(links("See Youtube Links:\n- x").is_empty());
        assert!(links("Youtube Links: https://a\n- x").is_empty());
    }

    #[test]
    fn header_whitespace_and_colon() {
        assert_eq!(links("   Youtube Links:   \n- x"), vec!["x"]);
        assert_eq!(links("Youtube Links :\n- x"), vec!["x"]);
        assert_eq!(links("Youtube Links\n- x"), vec!["x"]);
    }

    #[test]
    fn bullet_glyphs_stripped() {
        let text = "Youtube Links:\n- a\n• b\n* c\nd";
        assert_eq!(links(text), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn bare_marker_is_text() {
        let text = "Youtube Links:\n-a\n*b\n•c\n-";
        assert_eq!(links(text), vec!["-a", "*b", "•c", "-"]);
    }

    #[test]
    fn lone_marker_after_trim() {
        let text = "Youtube Links:\n-  \n- a\n*    \n- b";
        // "-  " trims to "-" before any bullet check, so it stays
        assert_eq!(links(text), vec!["-", "a", "*", "b"]);

        let padded = "Youtube Links:\n  •   \n- a";
        assert_eq!(links(padded), vec!["•", "a"]);
    }

    #[test]
    fn new_header_terminates_section() {
        let text = "Youtube Links:\n- a\nOther Section:\n- b";
        assert_eq!(links(text), vec!["a"]);
    }

    #[test]
    fn repeated_sections_accumulate() {
        let text = "Youtube Links:\n- a\n\nMiddle:\n- skip\n\nyoutube links:\n- b\n- c\n";
        assert_eq!(links(text), vec!["a", "b", "c"]);
    }

    #[test]
    fn header_right_after_section_reopens() {
        let text = "Youtube Links:\n- a\nYoutube Links:\n- b";
        assert_eq!(links(text), vec!["a", "b"]);
    }

    #[test]
    fn duplicates_within_section_kept() {
        let text = "Youtube Links:\n- x\n- x";
        assert_eq!(links(text), vec!["x", "x"]);
    }

    #[test]
    fn items_restartable() {
        let text = "Youtube Links:\n- a\n- b";
        let list = SectionList::new(text, YOUTUBE_LINKS);
        let first: Vec<_> = list.items().collect();
        let second: Vec<_> = list.items().collect();
        assert_eq!(first, second);
        assert_eq!(list.items().next(), Some("a"));
    }

    #[test]
    fn other_labels() {
        let text = "Main Landmarks:\n- Machu Picchu\n- Lake Titicaca\nHead of State / Government:\nX";
        assert_eq!(
            extract_section(Some(text), "Main Landmarks:"),
            vec!["Machu Picchu", "Lake Titicaca"]
        );
        assert_eq!(
            extract_section(Some(text), "head of state / government"),
            vec!["X"]
        );
        assert!(extract_section(Some(text), "").is_empty());
    }

    #[test]
    fn crlf_text() {
        let text = "Youtube Links:\r\n- https://a\r\n\r\n- https://b";
        assert_eq!(links(text), vec!["https://a"]);
    }

    #[test]
    fn rendered_brief_fixture() {
        let text = std::fs::read_to_string("tests/fixtures/japan.txt").unwrap();
        let items = links(&text);
        assert_eq!(items.len(), 5);
        assert!(items.iter().all(|l| l.starts_with("https://www.youtube.com/")));
        assert_eq!(items[0], "https://www.youtube.com/watch?v=coYw-eVU0Ks");
    }

    #[test]
    fn loose_formatting_fixture() {
        let text = std::fs::read_to_string("tests/fixtures/loose_formatting.txt").unwrap();
        assert_eq!(
            links(&text),
            vec![
                "https://youtu.be/one",
                "https://youtu.be/two",
                "https://youtu.be/three",
                "https://youtu.be/four",
            ]
        );
    }
}
