//! Fixed marker vocabulary shared by the composer and the parser.
//!
//! Report lines carry their meaning in their leading glyph. The composer
//! writes these prefixes and the parser dispatches on them, so both sides
//! must agree on every constant here.

/// Ordinal markers that open the three report sections, in order.
pub const SECTION_MARKERS: [&str; 3] = ["❶", "❷", "❸"];

/// Glyph for a filled star.
pub const STAR_FILLED: char = '⭐';

/// Glyph for an empty star.
pub const STAR_EMPTY: char = '☆';

/// Prefix of the AI advice line. The remainder of the line is the advice.
pub const AI_ADVICE_MARKER: &str = "🤖 AI建議：";

/// Prefix of the motivational closing line.
pub const MOTIVATION_MARKER: &str = "🚀";

/// Stat-line prefixes: total time, correct, wrong, unanswered, average time.
pub const STAT_MARKERS: [&str; 5] = ["⏰", "✅", "❌", "⏸️", "🕐"];

/// Report headline written at the top of every composed report.
pub const REPORT_HEADLINE: &str = "🎓 學習報告出爐啦！";

/// Keywords whose presence marks a message as a learning report.
const REPORT_KEYWORDS: [&str; 4] = ["🎓 學習報告", "學習態度", "學習成效", "學習專心度"];

/// Returns `true` if `ch` is one of the two star glyphs.
#[must_use]
pub const fn is_star(ch: char) -> bool {
    ch == STAR_FILLED || ch == STAR_EMPTY
}

/// Returns the section marker `line` starts with, if any.
#[must_use]
pub fn section_marker(line: &str) -> Option<&'static str> {
    SECTION_MARKERS
        .iter()
        .copied()
        .find(|marker| line.starts_with(marker))
}

/// Returns `true` if `line` starts with a stat marker.
#[must_use]
pub fn is_stat_line(line: &str) -> bool {
    STAT_MARKERS.iter().any(|marker| line.starts_with(marker))
}

/// Returns `true` if the message text looks like a learning report.
///
/// Delivery uses this to choose between a rich card and plain text.
///
/// ```
/// use learnbot_report::looks_like_report;
///
/// assert!(looks_like_report("❶學習態度⭐⭐⭐☆☆ (60.0分)"));
/// assert!(!looks_like_report("遊戲開始啦！"));
/// ```
#[must_use]
pub fn looks_like_report(text: &str) -> bool {
    REPORT_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}
