//! Slide text parsing.
//!
//! The outline generator hands over one block of plain text per slide:
//! a title line followed by optional bullet lines. Parsing is total; every
//! input yields a [`ParsedSlideContent`].

/// Raw text for one slide, as produced by the outline generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideBlock {
    /// Unparsed slide text
    pub raw_text: String,

    /// Ordinal position in the deck (0-based)
    pub index: usize,
}

impl SlideBlock {
    /// Create a block at the given position
    pub fn new(index: usize, raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            index,
        }
    }

    /// Number an ordered sequence of slide texts
    pub fn sequence<I, S>(texts: I) -> Vec<SlideBlock>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| SlideBlock::new(index, text))
            .collect()
    }

    /// Parse this block's text
    pub fn parse(&self) -> ParsedSlideContent {
        parse(&self.raw_text)
    }
}

/// Title and bullets extracted from a slide block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSlideContent {
    /// First line with heading markers and surrounding whitespace removed
    pub title: String,

    /// Remaining non-empty lines, bullet markers removed, in source order
    pub bullet_points: Vec<String>,
}

impl ParsedSlideContent {
    /// Whether the slide carries any bullets
    pub fn has_bullets(&self) -> bool {
        !self.bullet_points.is_empty()
    }
}

/// Split one slide's raw text into a title and bullet lines
pub fn parse(raw_text: &str) -> ParsedSlideContent {
    let mut lines = raw_text.lines();

    let title = lines.next().map(clean_title).unwrap_or_default();

    let bullet_points = lines
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(strip_bullet_marker)
        .map(str::to_string)
        .collect();

    ParsedSlideContent {
        title,
        bullet_points,
    }
}

fn is_title_noise(c: char) -> bool {
    c == '#' || c.is_whitespace()
}

fn clean_title(line: &str) -> String {
    let stripped = line.trim_start_matches(is_title_noise).trim_end();
    unwrap_emphasis(stripped)
        .trim_start_matches(is_title_noise)
        .trim_end()
        .to_string()
}

/// `**Agenda**` and `__Agenda__` become `Agenda`
///
/// Only a single span covering the whole title is unwrapped.
fn unwrap_emphasis(text: &str) -> &str {
    for marker in ["**", "__"] {
        if let Some(inner) = text
            .strip_prefix(marker)
            .and_then(|rest| rest.strip_suffix(marker))
        {
            if !inner.contains(marker) {
                return inner;
            }
        }
    }
    text
}

/// Remove one leading `-` or `•` and the whitespace after it
fn strip_bullet_marker(line: &str) -> &str {
    match line.strip_prefix('-').or_else(|| line.strip_prefix('•')) {
        Some(rest) => rest.trim_start(),
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_only_block() {
        let parsed = parse("Just a title");

        assert_eq!(parsed.title, "Just a title");
        assert!(parsed.bullet_points.is_empty());
        assert!(!parsed.has_bullets());
    }

    #[test]
    fn test_heading_markers_stripped() {
        assert_eq!(parse("# Welcome\n").title, "Welcome");
        assert_eq!(parse("## Agenda").title, "Agenda");
        assert_eq!(parse("   ###   Spaced out  ").title, "Spaced out");
    }

    #[test]
    fn test_bold_title_unwrapped() {
        assert_eq!(parse("**Introduction**").title, "Introduction");
        assert_eq!(parse("## **Key Figures**\n- 42%").title, "Key Figures");
        assert_eq!(parse("__Summary__").title, "Summary");
        assert_eq!(parse("** # odd**").title, "odd");
    }

    #[test]
    fn test_separate_bold_spans_kept() {
        assert_eq!(
            parse("**Bold** and **more**").title,
            "**Bold** and **more**"
        );
        assert_eq!(parse("## __a__ vs __b__").title, "__a__ vs __b__");
    }

    #[test]
    fn test_bullets_stripped_and_ordered() {
        let parsed = parse("## Agenda\n- Point A\n• Point B\n  -   Point C\nPlain line");

        assert_eq!(
            parsed.bullet_points,
            vec!["Point A", "Point B", "Point C", "Plain line"]
        );
    }

    #[test]
    fn test_empty_lines_dropped() {
        let parsed = parse("Title\n\n- One\n   \n\t\n- Two\n");

        assert_eq!(parsed.bullet_points, vec!["One", "Two"]);
    }

    #[test]
    fn test_crlf_line_breaks() {
        let parsed = parse("# Title\r\n- One\r\n- Two\r\n");

        assert_eq!(parsed.title, "Title");
        assert_eq!(parsed.bullet_points, vec!["One", "Two"]);
    }

    #[test]
    fn test_empty_input() {
        let parsed = parse("");

        assert_eq!(parsed.title, "");
        assert!(parsed.bullet_points.is_empty());
    }

    #[test]
    fn test_only_one_marker_removed() {
        let parsed = parse("Title\n- - nested dash");
        assert_eq!(parsed.bullet_points, vec!["- nested dash"]);
    }

    #[test]
    fn test_title_never_starts_with_hash_or_space() {
        let samples = [
            "#",
            "  # \t#",
            "#Title",
            " \u{a0}# Title",
            "**# Title**",
            "__  __",
            "#\n- a",
        ];

        for sample in samples {
            let title = parse(sample).title;
            assert!(
                !title.starts_with('#') && !title.starts_with(char::is_whitespace),
                "title {:?} from {:?}",
                title,
                sample
            );
        }
    }

    #[test]
    fn test_bullet_count_matches_non_empty_lines() {
        let samples = [
            "T\n- a\n\n- b",
            "T\n-\n•\n   \n",
            "T",
            "",
            "T\r\n\r\n x \r\n",
        ];

        for sample in samples {
            let expected = sample
                .lines()
                .skip(1)
                .filter(|l| !l.trim().is_empty())
                .count();
            assert_eq!(parse(sample).bullet_points.len(), expected, "{:?}", sample);
        }
    }

    #[test]
    fn test_sequence_numbers_blocks() {
        let blocks = SlideBlock::sequence(["# Welcome", "## Agenda\n- A"]);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].index, 0);
        assert_eq!(blocks[1].index, 1);
        assert_eq!(blocks[1].parse().bullet_points, vec!["A"]);
    }
}
