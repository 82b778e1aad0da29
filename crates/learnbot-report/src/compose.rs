//! Flat text composition of learning reports.
//!
//! [`compose`] turns a [`ScoredSession`] and an already-fetched AI advice
//! string into the multi-line report text that is sent to users and later
//! parsed back into a card by [`crate::parse`].

use std::fmt::Write;

use crate::markers::{AI_ADVICE_MARKER, REPORT_HEADLINE, SECTION_MARKERS};
use crate::rating::{
    remark_at_most, remark_for, star_rating, ANSWER_PACE_TIERS, ATTITUDE_TIERS,
    EFFECTIVENESS_TIERS,
};
use crate::ScoredSession;

/// Heading line above the personalized tip.
const TIP_HEADING: &str = "💭 AI小老師的貼心建議：";

/// Fixed motivational closing line.
pub const MOTIVATION_LINE: &str = "🚀 加油！每一次學習都讓你更接近目標！";

/// Section titles in report order.
pub const SECTION_TITLES: [&str; 3] = ["學習態度", "學習成效", "學習專心度"];

/// A personalized tip and the condition that selects it.
struct TipRule {
    applies: fn(&ScoredSession) -> bool,
    tip: &'static str,
}

/// Personalized tips in priority order; the first matching rule wins.
const TIP_RULES: &[TipRule] = &[
    TipRule {
        applies: |s| f64::from(s.unanswered_count()) > f64::from(s.total_questions()) * 0.3,
        tip: "⏰ 有不少題目還沒完成，建議合理安排時間喔！",
    },
    TipRule {
        applies: |s| s.attitude_score() < 60.0 && s.effectiveness_score() < 70.0,
        tip: "🎯 建議先提升專注力，可以試試番茄鐘學習法！",
    },
    TipRule {
        applies: |s| s.effectiveness_score() < 70.0,
        tip: "📖 多花點時間在PDF閱讀上，基礎打穩很重要！",
    },
    TipRule {
        applies: |s| s.avg_answer_time() > 30.0,
        tip: "⚡ 可以多做練習題來提升答題速度喔！",
    },
];

/// Tip used when no rule applies.
const DEFAULT_TIP: &str = "🌈 你的學習狀態很棒！繼續保持這個節奏！";

/// Selects the personalized tip for a session.
#[must_use]
pub fn personalized_tip(session: &ScoredSession) -> &'static str {
    TIP_RULES
        .iter()
        .find(|rule| (rule.applies)(session))
        .map_or(DEFAULT_TIP, |rule| rule.tip)
}

/// Composes the flat report text for `session`, ending with `advice`.
///
/// ```
/// use learnbot_report::{compose, ScoredSession};
///
/// let session = ScoredSession::builder()
///     .attitude_score(85.0)
///     .effectiveness_score(92.0)
///     .concentration_score(70.0)
///     .correct_count(10)
///     .wrong_count(2)
///     .avg_answer_time(12.0)
///     .total_time(1800.0)
///     .build();
///
/// let text = compose(&session, "保持下去");
/// assert!(text.starts_with("🎓 學習報告出爐啦！"));
/// assert!(text.contains("❶學習態度⭐⭐⭐⭐☆ (85.0分)"));
/// assert!(text.ends_with("🤖 AI建議：保持下去"));
/// ```
#[must_use]
pub fn compose(session: &ScoredSession, advice: &str) -> String {
    let mut out = String::with_capacity(768);

    let _ = writeln!(out, "{REPORT_HEADLINE}\n");

    write_section_header(&mut out, 0, session.attitude_score());
    let _ = writeln!(out, "{}", remark_for(ATTITUDE_TIERS, session.attitude_score()));
    let _ = writeln!(out, "⏰ 總學習時間：{:.1}分鐘\n", session.total_minutes());

    write_section_header(&mut out, 1, session.effectiveness_score());
    let _ = writeln!(
        out,
        "{}",
        remark_for(EFFECTIVENESS_TIERS, session.effectiveness_score())
    );
    let _ = writeln!(out, "✅ 答對：{}題", session.correct_count());
    let _ = writeln!(out, "❌ 答錯：{}題", session.wrong_count());
    if session.unanswered_count() > 0 {
        let _ = writeln!(out, "⏸️ 未作答：{}題", session.unanswered_count());
    }
    out.push('\n');

    // The concentration narrative follows answer pace, not the score.
    write_section_header(&mut out, 2, session.concentration_score());
    let _ = writeln!(
        out,
        "{}",
        remark_at_most(ANSWER_PACE_TIERS, session.avg_answer_time())
    );
    let _ = writeln!(out, "🕐 平均答題時間：{:.1}秒\n", session.avg_answer_time());

    let _ = writeln!(out, "{TIP_HEADING}");
    let _ = writeln!(out, "{}", personalized_tip(session));

    let _ = write!(out, "\n{MOTIVATION_LINE}");
    let _ = write!(out, "\n\n{AI_ADVICE_MARKER}{advice}");

    out
}

/// Writes `❶學習態度⭐⭐⭐⭐☆ (85.0分)` style section headers.
fn write_section_header(out: &mut String, index: usize, score: f64) {
    let _ = writeln!(
        out,
        "{}{}{} ({:.1}分)",
        SECTION_MARKERS[index],
        SECTION_TITLES[index],
        star_rating(score),
        score
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn scenario_session() -> ScoredSession {
        ScoredSession::builder()
            .attitude_score(85.0)
            .effectiveness_score(92.0)
            .concentration_score(70.0)
            .correct_count(10)
            .wrong_count(2)
            .unanswered_count(0)
            .avg_answer_time(12.0)
            .total_time(1800.0)
            .build()
    }

    #[test]
    fn test_compose_full_scenario() {
        let text = compose(&scenario_session(), "多做練習題");

        insta::assert_snapshot!(text, @r"
        🎓 學習報告出爐啦！

        ❶學習態度⭐⭐⭐⭐☆ (85.0分)
        🌟 超棒！你的專注力像雷射一樣集中！
        ⏰ 總學習時間：30.0分鐘

        ❷學習成效⭐⭐⭐⭐⭐ (92.0分)
        🏆 太厲害了！你是學霸本霸！
        ✅ 答對：10題
        ❌ 答錯：2題

        ❸學習專心度⭐⭐⭐⭐☆ (70.0分)
        ⏱️ 思考速度剛好，很穩健的學習節奏！
        🕐 平均答題時間：12.0秒

        💭 AI小老師的貼心建議：
        🌈 你的學習狀態很棒！繼續保持這個節奏！

        🚀 加油！每一次學習都讓你更接近目標！

        🤖 AI建議：多做練習題
        ");
    }

    #[test]
    fn test_no_unanswered_line_when_zero() {
        let text = compose(&scenario_session(), "");
        assert!(!text.contains("未作答"));
    }

    #[test]
    fn test_unanswered_line_when_positive() {
        let session = ScoredSession::builder()
            .correct_count(5)
            .unanswered_count(1)
            .build();
        let text = compose(&session, "");
        assert!(text.contains("⏸️ 未作答：1題\n"));
    }

    #[test]
    fn test_time_management_tip_wins_over_everything() {
        // 4 of 10 unanswered, and every other rule would also match.
        let session = ScoredSession::builder()
            .attitude_score(10.0)
            .effectiveness_score(10.0)
            .correct_count(3)
            .wrong_count(3)
            .unanswered_count(4)
            .avg_answer_time(60.0)
            .build();

        assert!(personalized_tip(&session).contains("合理安排時間"));
    }

    #[test]
    fn test_tip_priority_order() {
        let base = ScoredSession::builder().correct_count(10);

        let focus = base
            .clone()
            .attitude_score(50.0)
            .effectiveness_score(60.0)
            .build();
        assert!(personalized_tip(&focus).contains("番茄鐘"));

        let review = base
            .clone()
            .attitude_score(90.0)
            .effectiveness_score(60.0)
            .build();
        assert!(personalized_tip(&review).contains("PDF閱讀"));

        let speed = base
            .clone()
            .attitude_score(90.0)
            .effectiveness_score(90.0)
            .avg_answer_time(31.0)
            .build();
        assert!(personalized_tip(&speed).contains("答題速度"));

        let fine = base
            .attitude_score(90.0)
            .effectiveness_score(90.0)
            .avg_answer_time(30.0)
            .build();
        assert_eq!(personalized_tip(&fine), DEFAULT_TIP);
    }

    #[test]
    fn test_exactly_thirty_percent_unanswered_is_not_time_tip() {
        let session = ScoredSession::builder()
            .attitude_score(90.0)
            .effectiveness_score(90.0)
            .correct_count(7)
            .unanswered_count(3)
            .build();
        assert_eq!(personalized_tip(&session), DEFAULT_TIP);
    }

    #[test]
    fn test_concentration_remark_follows_answer_time() {
        let fast = ScoredSession::builder()
            .concentration_score(10.0)
            .avg_answer_time(5.0)
            .build();
        assert!(compose(&fast, "").contains("⚡ 反應神速！"));

        let slow = ScoredSession::builder()
            .concentration_score(99.0)
            .avg_answer_time(45.0)
            .build();
        assert!(compose(&slow, "").contains("🐌 慢工出細活"));
    }
}
