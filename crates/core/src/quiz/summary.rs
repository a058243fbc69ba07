use chrono::{DateTime, Utc};
use serde::Serialize;

/// Accuracy threshold (percent) for the celebratory results verdict.
pub const EXCELLENT_ACCURACY: f64 = 80.0;

/// Aggregate result of one run through a deck.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    total_cards: usize,
    correct: usize,
    incorrect: usize,
    accuracy: f64,
    duration_secs: u64,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl SessionSummary {
    /// Build a summary from outcome counts.
    ///
    /// A `completed_at` earlier than `started_at` yields a zero duration.
    #[must_use]
    pub fn new(
        total_cards: usize,
        correct: usize,
        incorrect: usize,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            total_cards,
            correct,
            incorrect,
            accuracy: accuracy(correct, incorrect),
            duration_secs: rounded_secs(started_at, completed_at),
            started_at,
            completed_at,
        }
    }

    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.total_cards
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> usize {
        self.incorrect
    }

    /// Percentage of attempted cards answered correctly, in `[0, 100]`.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Accuracy rounded to a whole percent for display.
    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        // accuracy is clamped to [0, 100] so the cast cannot truncate
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pct = self.accuracy.round() as u32;
        pct
    }

    #[must_use]
    pub fn is_excellent(&self) -> bool {
        self.accuracy >= EXCELLENT_ACCURACY
    }

    #[must_use]
    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    /// Duration as shown on the results screen, e.g. `"2m 5s"`.
    #[must_use]
    pub fn duration_label(&self) -> String {
        format!("{}m {}s", self.duration_secs / 60, self.duration_secs % 60)
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

/// `correct / (correct + incorrect) * 100`, or `0` when nothing was attempted.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn accuracy(correct: usize, incorrect: usize) -> f64 {
    let attempts = correct + incorrect;
    if attempts == 0 {
        return 0.0;
    }
    (correct as f64 / attempts as f64) * 100.0
}

fn rounded_secs(started_at: DateTime<Utc>, completed_at: DateTime<Utc>) -> u64 {
    let millis = (completed_at - started_at).num_milliseconds().max(0);
    u64::try_from((millis + 500) / 1000).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn accuracy_is_zero_without_attempts() {
        let summary = SessionSummary::new(0, 0, 0, fixed_now(), fixed_now());
        assert!(summary.accuracy().abs() < f64::EPSILON);
        assert!(!summary.accuracy().is_nan());
        assert_eq!(summary.accuracy_percent(), 0);
    }

    #[test]
    fn accuracy_two_of_three() {
        let summary = SessionSummary::new(3, 2, 1, fixed_now(), fixed_now());
        assert!((summary.accuracy() - 66.67).abs() < 0.01);
        assert_eq!(summary.accuracy_percent(), 67);
        assert!(!summary.is_excellent());
    }

    #[test]
    fn accuracy_stays_in_bounds() {
        for correct in 0..6 {
            for incorrect in 0..6 {
                let value = accuracy(correct, incorrect);
                assert!((0.0..=100.0).contains(&value));
            }
        }
    }

    #[test]
    fn duration_rounds_to_nearest_second() {
        let start = fixed_now();
        let summary = SessionSummary::new(1, 1, 0, start, start + Duration::milliseconds(125_600));
        assert_eq!(summary.duration_secs(), 126);
        assert_eq!(summary.duration_label(), "2m 6s");
        assert!(summary.is_excellent());
    }

    #[test]
    fn inverted_timestamps_yield_zero_duration() {
        let start = fixed_now();
        let summary = SessionSummary::new(1, 0, 1, start, start - Duration::seconds(10));
        assert_eq!(summary.duration_secs(), 0);
    }
}
