//! Star ratings and remark tier tables.
//!
//! Remarks are chosen from static ordered tables: the first tier whose
//! threshold the value satisfies wins, and the last tier is the catch-all.
//! Adding a tier means adding a row, not a branch.

use crate::markers::{STAR_EMPTY, STAR_FILLED};

/// Number of glyphs in every star rating.
pub const STAR_COUNT: usize = 5;

/// A remark tier: values at or above `min` get `remark`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tier {
    /// Inclusive lower bound.
    pub min: f64,
    /// Remark line for this tier.
    pub remark: &'static str,
}

/// A remark tier keyed by an upper bound: values at or below `max` get `remark`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CeilingTier {
    /// Inclusive upper bound.
    pub max: f64,
    /// Remark line for this tier.
    pub remark: &'static str,
}

/// Attitude remarks, highest band first.
pub const ATTITUDE_TIERS: &[Tier] = &[
    Tier {
        min: 80.0,
        remark: "🌟 超棒！你的專注力像雷射一樣集中！",
    },
    Tier {
        min: 60.0,
        remark: "👍 不錯喔！保持這個節奏繼續加油！",
    },
    Tier {
        min: f64::NEG_INFINITY,
        remark: "🤔 似乎有點分心呢，試著找個更安靜的環境吧！",
    },
];

/// Effectiveness remarks, highest band first.
pub const EFFECTIVENESS_TIERS: &[Tier] = &[
    Tier {
        min: 90.0,
        remark: "🏆 太厲害了！你是學霸本霸！",
    },
    Tier {
        min: 70.0,
        remark: "✨ 表現很好！再接再厲就能更上一層樓！",
    },
    Tier {
        min: 50.0,
        remark: "💡 還有進步空間，建議重新複習一下重點內容！",
    },
    Tier {
        min: f64::NEG_INFINITY,
        remark: "📚 別灰心！學習是個過程，建議先回去看看PDF內容！",
    },
];

/// Concentration remarks keyed by average answer time, fastest first.
pub const ANSWER_PACE_TIERS: &[CeilingTier] = &[
    CeilingTier {
        max: 10.0,
        remark: "⚡ 反應神速！但記得要仔細思考喔！",
    },
    CeilingTier {
        max: 30.0,
        remark: "⏱️ 思考速度剛好，很穩健的學習節奏！",
    },
    CeilingTier {
        max: f64::INFINITY,
        remark: "🐌 慢工出細活，但可以試著提高一點效率！",
    },
];

/// Picks the remark for `value` from a floor-keyed table.
///
/// Falls back to the last row when nothing matches (e.g. NaN input).
#[must_use]
pub fn remark_for(tiers: &[Tier], value: f64) -> &'static str {
    tiers
        .iter()
        .find(|tier| value >= tier.min)
        .or_else(|| tiers.last())
        .map_or("", |tier| tier.remark)
}

/// Picks the remark for `value` from a ceiling-keyed table.
#[must_use]
pub fn remark_at_most(tiers: &[CeilingTier], value: f64) -> &'static str {
    tiers
        .iter()
        .find(|tier| value <= tier.max)
        .or_else(|| tiers.last())
        .map_or("", |tier| tier.remark)
}

/// Number of filled stars for a 0-100 score: `clamp(round(score / 20), 1, 5)`.
///
/// Halves round to even, so 50 gives 2 stars and 70 gives 4.
///
/// ```
/// use learnbot_report::rating::filled_stars;
///
/// assert_eq!(filled_stars(85.0), 4);
/// assert_eq!(filled_stars(92.0), 5);
/// assert_eq!(filled_stars(3.0), 1);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn filled_stars(score: f64) -> usize {
    let rounded = round_half_even(score / 20.0);
    if rounded.is_nan() {
        return 1;
    }
    // Clamped to 1..=5 before the cast.
    rounded.clamp(1.0, 5.0) as usize
}

/// Number of empty stars; always `5 - filled_stars(score)`.
#[must_use]
pub fn empty_stars(score: f64) -> usize {
    STAR_COUNT - filled_stars(score)
}

/// Renders a 5-glyph star rating such as `⭐⭐⭐⭐☆`.
#[must_use]
pub fn star_rating(score: f64) -> String {
    let filled = filled_stars(score);
    let mut stars = String::with_capacity(STAR_COUNT * 4);
    stars.extend(std::iter::repeat(STAR_FILLED).take(filled));
    stars.extend(std::iter::repeat(STAR_EMPTY).take(STAR_COUNT - filled));
    stars
}

/// Rounds to the nearest integer, sending exact halves to the even neighbour.
#[allow(clippy::float_cmp)]
fn round_half_even(value: f64) -> f64 {
    let rounded = value.round();
    if (value - value.trunc()).abs() == 0.5 {
        2.0 * (value / 2.0).round()
    } else {
        rounded
    }
}
