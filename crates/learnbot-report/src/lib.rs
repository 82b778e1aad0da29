//! Learning report pipeline for learnbot.
//!
//! This crate turns a scored learning session into a rich chat card:
//!
//! 1. [`ScoredSession`] holds the scores, either decoded from the game
//!    client's JSON or produced by [`SessionGenerator`].
//! 2. [`compose`] writes the flat, emoji-marked report text.
//! 3. [`parse`] reads report text back into a [`ParsedReport`].
//! 4. [`CardRenderer`] builds a platform-agnostic [`CardNode`] tree.
//! 5. A [`CardSerializer`] emits the tree: [`FlexSerializer`] for LINE Flex
//!    JSON, [`OutlineSerializer`] for plain text.
//!
//! Every stage is synchronous and pure; nothing is cached between calls.
//!
//! # Example
//!
//! ```rust
//! use learnbot_report::{compose, render_report, FlexSerializer, ScoredSession};
//!
//! let session = ScoredSession::builder()
//!     .attitude_score(85.0)
//!     .effectiveness_score(92.0)
//!     .concentration_score(70.0)
//!     .correct_count(10)
//!     .wrong_count(2)
//!     .avg_answer_time(12.0)
//!     .total_time(1800.0)
//!     .build();
//!
//! let text = compose(&session, "多做練習題");
//! let card = render_report(&text);
//! let json = FlexSerializer::new().generate(&card).unwrap();
//! assert!(json.contains("學習成果報告"));
//! ```

pub mod card;
mod compose;
mod flex;
mod markers;
mod outline;
mod parse;
pub mod rating;
mod render;
mod session;

pub use card::CardNode;
pub use compose::{compose, personalized_tip, MOTIVATION_LINE, SECTION_TITLES};
pub use flex::{CardSerializer, FlexSerializer};
pub use markers::{
    is_stat_line, looks_like_report, section_marker, AI_ADVICE_MARKER, MOTIVATION_MARKER,
    REPORT_HEADLINE, SECTION_MARKERS, STAT_MARKERS,
};
pub use outline::OutlineSerializer;
pub use parse::{parse, ParsedReport, ParsedSection};
pub use render::{section_colors, CardRenderer, SectionColors, PALETTE};
pub use session::{ScoredSession, SessionBuilder, SessionGenerator};

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur in the report pipeline.
///
/// Composing, parsing and rendering never fail; only decoding sessions and
/// serializing cards can.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to serialize a card to JSON.
    #[error("failed to serialize card: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Session payload is missing fields or has fields of the wrong type.
    #[error("invalid session data: {0}")]
    InvalidSession(String),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Parses report text and renders it as a card in one step.
#[must_use]
pub fn render_report(text: &str) -> CardNode {
    CardRenderer::new().render(&parse(text))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_synthetic_pipeline_always_yields_three_sections() {
        let mut rng = StdRng::seed_from_u64(2024);

        for _ in 0..50 {
            let session = SessionGenerator::synthetic(&mut rng);
            let report = parse(&compose(&session, " 每天進步一點點 "));

            assert_eq!(report.sections.len(), 3);
            assert!(report
                .sections
                .iter()
                .all(|s| s.stars.chars().count() == rating::STAR_COUNT));
            assert_eq!(report.ai_advice, "每天進步一點點");

            let card = CardRenderer::new().render(&report);
            assert_eq!(card, render_report(&compose(&session, " 每天進步一點點 ")));
        }
    }

    #[test]
    fn test_error_messages() {
        let err = ReportError::InvalidSession("missing field `totalTime`".to_string());
        assert_eq!(
            err.to_string(),
            "invalid session data: missing field `totalTime`"
        );
    }
}
