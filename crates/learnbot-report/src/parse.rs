//! Parsing flat report text back into structured sections.
//!
//! The parser is lossy and never fails. It dispatches on fixed line
//! prefixes and extracts the title, star run and score from section headers
//! with bounded scans instead of pattern matching. Advice may span several
//! lines: everything after the advice marker up to the next section header
//! belongs to it.

use serde::{Deserialize, Serialize};

use crate::markers::{
    is_star, is_stat_line, section_marker, AI_ADVICE_MARKER, MOTIVATION_MARKER,
};

/// One rated section of a parsed report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSection {
    /// Ordinal marker (`❶`, `❷` or `❸`), empty if the header had no title.
    pub marker: String,
    /// Section title, e.g. `學習態度`.
    pub title: String,
    /// Run of star glyphs, e.g. `⭐⭐⭐⭐☆`.
    pub stars: String,
    /// Score text found inside the first parenthesis pair, e.g. `85.0分`.
    pub score: String,
    /// Free-text lines in order.
    pub content: Vec<String>,
    /// Stat lines in order.
    pub stats: Vec<String>,
}

impl ParsedSection {
    /// Parses a section header line that starts with `marker`.
    fn from_header(line: &str, marker: &str) -> Self {
        let rest = &line[marker.len()..];
        let title_end = rest.find(is_star).unwrap_or(rest.len());
        let raw_title = &rest[..title_end];

        let (marker, title) = if raw_title.is_empty() {
            (String::new(), line.to_string())
        } else {
            (marker.to_string(), raw_title.trim().to_string())
        };

        Self {
            marker,
            title,
            stars: star_run(line).to_string(),
            score: first_parenthesized(line).unwrap_or_default().to_string(),
            content: Vec::new(),
            stats: Vec::new(),
        }
    }

    /// Returns `true` if the section has content or stat lines.
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.content.is_empty() || !self.stats.is_empty()
    }
}

/// A report parsed from flat text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReport {
    /// Sections in the order they appeared.
    pub sections: Vec<ParsedSection>,
    /// AI advice with its marker stripped, lines joined by `\n`; empty if absent.
    pub ai_advice: String,
    /// Motivational line including its marker; empty if absent.
    pub motivation: String,
    /// Lines seen before any section opened that had no other home.
    pub orphan_lines: Vec<String>,
}

/// Parses report text into a [`ParsedReport`].
///
/// ```
/// use learnbot_report::parse;
///
/// let report = parse("❶學習態度⭐⭐⭐⭐☆ (85.0分)\n🌟 超棒！\n⏰ 總學習時間：30.0分鐘\n🤖 AI建議： 加油 ");
/// assert_eq!(report.sections.len(), 1);
/// assert_eq!(report.sections[0].title, "學習態度");
/// assert_eq!(report.sections[0].stars, "⭐⭐⭐⭐☆");
/// assert_eq!(report.sections[0].score, "85.0分");
/// assert_eq!(report.ai_advice, "加油");
/// ```
#[must_use]
pub fn parse(text: &str) -> ParsedReport {
    let mut report = ParsedReport::default();
    let mut current: Option<ParsedSection> = None;
    // Open while the lines after an advice marker still belong to the advice.
    let mut advice: Option<Vec<&str>> = None;

    for line in text.lines().map(str::trim) {
        if let Some(marker) = section_marker(line) {
            close_advice(&mut report, advice.take());
            if let Some(section) = current.take() {
                report.sections.push(section);
            }
            current = Some(ParsedSection::from_header(line, marker));
        } else if let Some(first) = line.strip_prefix(AI_ADVICE_MARKER) {
            close_advice(&mut report, advice.take());
            advice = Some(vec![first.trim()]);
        } else if let Some(lines) = advice.as_mut() {
            lines.push(line);
        } else if line.is_empty() {
            // Blank lines only matter inside advice.
        } else if line.starts_with(MOTIVATION_MARKER) {
            report.motivation = line.to_string();
        } else if let Some(section) = current.as_mut() {
            if is_stat_line(line) {
                section.stats.push(line.to_string());
            } else {
                section.content.push(line.to_string());
            }
        } else {
            report.orphan_lines.push(line.to_string());
        }
    }

    close_advice(&mut report, advice);
    if let Some(section) = current {
        report.sections.push(section);
    }

    report
}

/// Joins collected advice lines, dropping blank lines at either end.
fn close_advice(report: &mut ParsedReport, lines: Option<Vec<&str>>) {
    if let Some(lines) = lines {
        report.ai_advice = lines.join("\n").trim().to_string();
    }
}

/// Returns the first maximal run of star glyphs in `line`, or `""`.
fn star_run(line: &str) -> &str {
    let Some(start) = line.find(is_star) else {
        return "";
    };
    let tail = &line[start..];
    let len = tail.find(|c: char| !is_star(c)).unwrap_or(tail.len());
    &tail[..len]
}

/// Returns the text inside the first `(...)` pair with non-empty content.
fn first_parenthesized(line: &str) -> Option<&str> {
    line.match_indices('(').find_map(|(open, _)| {
        let inner_start = open + 1;
        let close = line[inner_start..].find(')')? + inner_start;
        (close > inner_start).then(|| &line[inner_start..close])
    })
}
