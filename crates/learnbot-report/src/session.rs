//! Scored learning sessions and synthetic session generation.
//!
//! A [`ScoredSession`] is the input to the report pipeline. It arrives as JSON
//! from the game client or is produced by [`SessionGenerator`] for test
//! reports. The question total is always derived from the three answer counts
//! at construction time, never read from input.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{ReportError, Result};

// ============================================================================
// ScoredSession
// ============================================================================

/// One scored learning session.
///
/// Scores are on a 0-100 scale. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SessionFields")]
pub struct ScoredSession {
    total_time: f64,
    attitude_score: f64,
    effectiveness_score: f64,
    concentration_score: f64,
    correct_count: u32,
    wrong_count: u32,
    unanswered_count: u32,
    total_questions: u32,
    avg_answer_time: f64,
}

/// Wire shape of a session. Any `totalQuestions` in the payload is ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionFields {
    total_time: f64,
    attitude_score: f64,
    effectiveness_score: f64,
    concentration_score: f64,
    correct_count: u32,
    wrong_count: u32,
    unanswered_count: u32,
    avg_answer_time: f64,
}

impl From<SessionFields> for ScoredSession {
    fn from(fields: SessionFields) -> Self {
        Self::builder()
            .total_time(fields.total_time)
            .attitude_score(fields.attitude_score)
            .effectiveness_score(fields.effectiveness_score)
            .concentration_score(fields.concentration_score)
            .correct_count(fields.correct_count)
            .wrong_count(fields.wrong_count)
            .unanswered_count(fields.unanswered_count)
            .avg_answer_time(fields.avg_answer_time)
            .build()
    }
}

impl ScoredSession {
    /// Creates a new session builder.
    #[must_use]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Decodes a session from a JSON value such as a trigger payload.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidSession`] if a required field is missing
    /// or has the wrong type.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ReportError::InvalidSession(e.to_string()))
    }

    /// Total session time in seconds.
    #[must_use]
    pub const fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Attitude score (0-100).
    #[must_use]
    pub const fn attitude_score(&self) -> f64 {
        self.attitude_score
    }

    /// Effectiveness score (0-100).
    #[must_use]
    pub const fn effectiveness_score(&self) -> f64 {
        self.effectiveness_score
    }

    /// Concentration score (0-100).
    #[must_use]
    pub const fn concentration_score(&self) -> f64 {
        self.concentration_score
    }

    /// Number of correctly answered questions.
    #[must_use]
    pub const fn correct_count(&self) -> u32 {
        self.correct_count
    }

    /// Number of wrongly answered questions.
    #[must_use]
    pub const fn wrong_count(&self) -> u32 {
        self.wrong_count
    }

    /// Number of questions left unanswered.
    #[must_use]
    pub const fn unanswered_count(&self) -> u32 {
        self.unanswered_count
    }

    /// Sum of correct, wrong and unanswered counts.
    #[must_use]
    pub const fn total_questions(&self) -> u32 {
        self.total_questions
    }

    /// Average time spent per answer in seconds.
    #[must_use]
    pub const fn avg_answer_time(&self) -> f64 {
        self.avg_answer_time
    }

    /// Total session time in minutes.
    #[must_use]
    pub fn total_minutes(&self) -> f64 {
        self.total_time / 60.0
    }
}

// ============================================================================
// SessionBuilder
// ============================================================================

/// Builder for [`ScoredSession`]. Unset fields default to zero.
#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    total_time: f64,
    attitude_score: f64,
    effectiveness_score: f64,
    concentration_score: f64,
    correct_count: u32,
    wrong_count: u32,
    unanswered_count: u32,
    avg_answer_time: f64,
}

impl SessionBuilder {
    /// Sets the total session time in seconds.
    #[must_use]
    pub const fn total_time(mut self, seconds: f64) -> Self {
        self.total_time = seconds;
        self
    }

    /// Sets the attitude score.
    #[must_use]
    pub const fn attitude_score(mut self, score: f64) -> Self {
        self.attitude_score = score;
        self
    }

    /// Sets the effectiveness score.
    #[must_use]
    pub const fn effectiveness_score(mut self, score: f64) -> Self {
        self.effectiveness_score = score;
        self
    }

    /// Sets the concentration score.
    #[must_use]
    pub const fn concentration_score(mut self, score: f64) -> Self {
        self.concentration_score = score;
        self
    }

    /// Sets the correct answer count.
    #[must_use]
    pub const fn correct_count(mut self, count: u32) -> Self {
        self.correct_count = count;
        self
    }

    /// Sets the wrong answer count.
    #[must_use]
    pub const fn wrong_count(mut self, count: u32) -> Self {
        self.wrong_count = count;
        self
    }

    /// Sets the unanswered question count.
    #[must_use]
    pub const fn unanswered_count(mut self, count: u32) -> Self {
        self.unanswered_count = count;
        self
    }

    /// Sets the average answer time in seconds.
    #[must_use]
    pub const fn avg_answer_time(mut self, seconds: f64) -> Self {
        self.avg_answer_time = seconds;
        self
    }

    /// Builds the session, deriving the question total.
    #[must_use]
    pub const fn build(self) -> ScoredSession {
        let total_questions = self
            .correct_count
            .saturating_add(self.wrong_count)
            .saturating_add(self.unanswered_count);

        ScoredSession {
            total_time: self.total_time,
            attitude_score: self.attitude_score,
            effectiveness_score: self.effectiveness_score,
            concentration_score: self.concentration_score,
            correct_count: self.correct_count,
            wrong_count: self.wrong_count,
            unanswered_count: self.unanswered_count,
            total_questions,
            avg_answer_time: self.avg_answer_time,
        }
    }
}

// ============================================================================
// SessionGenerator
// ============================================================================

/// Produces plausible random sessions for test reports.
pub struct SessionGenerator;

impl SessionGenerator {
    /// Generates a synthetic session from the thread-local RNG.
    #[must_use]
    pub fn random() -> ScoredSession {
        Self::synthetic(&mut rand::rng())
    }

    /// Generates a synthetic session from the given RNG.
    ///
    /// Sessions last 10 to 60 minutes; scores and average answer times are
    /// rounded to one decimal place.
    #[must_use]
    pub fn synthetic<R: Rng + ?Sized>(rng: &mut R) -> ScoredSession {
        ScoredSession::builder()
            .total_time(round1(rng.random_range(600.0..=3600.0)))
            .attitude_score(round1(rng.random_range(40.0..=95.0)))
            .effectiveness_score(round1(rng.random_range(45.0..=98.0)))
            .concentration_score(round1(rng.random_range(35.0..=90.0)))
            .correct_count(rng.random_range(3..=15))
            .wrong_count(rng.random_range(0..=8))
            .unanswered_count(rng.random_range(0..=5))
            .avg_answer_time(round1(rng.random_range(8.0..=45.0)))
            .build()
    }
}

/// Rounds to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
