//! Make/miss classification.
//!
//! There is no real make/miss classifier yet.  [`AlternatingClassifier`] is a
//! walking-skeleton stand-in that calls every second shot a make; anything that
//! can actually look at the ball replaces it by implementing
//! [`ShotClassifier`].

use serde::{Deserialize, Serialize};

/// Result of a single shot attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotOutcome {
    /// The ball went in.
    Make,
    /// The ball did not go in.
    Miss,
}

impl ShotOutcome {
    /// Returns `true` for [`ShotOutcome::Make`].
    pub fn is_make(self) -> bool {
        matches!(self, ShotOutcome::Make)
    }
}

/// Decides whether a shot was a make or a miss.
pub trait ShotClassifier {
    /// Classifies the shot with the given 1-based number within the session.
    fn classify(&self, shot_number: u64) -> ShotOutcome;
}

/// Placeholder classifier: even-numbered shots are makes, odd ones misses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlternatingClassifier;

impl ShotClassifier for AlternatingClassifier {
    fn classify(&self, shot_number: u64) -> ShotOutcome {
        if shot_number % 2 == 0 {
            ShotOutcome::Make
        } else {
            ShotOutcome::Miss
        }
    }
}
