//! The shot counter: the whole persistent state of a tracking session.
//!
//! # State machine
//!
//! ```text
//!            on_detection_tick()
//!               ┌────────┐
//!               ▼        │
//!           ┌─────────────┴┐
//!           │   running    │
//!           └──────────────┘
//! ```
//!
//! There is a single state with a self-loop.  Counters start at zero, only
//! ever grow, and are never reset while the session lives.
//!
//! # Invariants
//!
//! - `makes <= shots` at all times.
//! - Under the alternation rule, `makes == shots / 2` (integer division).
//! - `percentage == makes * 100 / shots` truncated, or `0` when `shots == 0`.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::classifier::{AlternatingClassifier, ShotClassifier, ShotOutcome};

/// Running tally of shots and makes for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShotCounter {
    shots: u64,
    makes: u64,
}

impl ShotCounter {
    /// Creates a counter with both tallies at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one simulated detection.
    ///
    /// Increments `shots`; if the new shot number is even, also increments
    /// `makes`.  Total over every reachable state.
    pub fn on_detection_tick(&mut self) {
        self.record_with(&AlternatingClassifier);
    }

    /// Records one shot whose outcome is decided by `classifier`.
    ///
    /// Returns the outcome that was recorded.
    pub fn record_with<C>(&mut self, classifier: &C) -> ShotOutcome
    where
        C: ShotClassifier + ?Sized,
    {
        let shot_number = self.shots.saturating_add(1);
        let outcome = classifier.classify(shot_number);

        self.shots = shot_number;
        if outcome.is_make() {
            self.makes = self.makes.saturating_add(1).min(self.shots);
        }

        trace!(shots = self.shots, makes = self.makes, ?outcome, "shot recorded");
        outcome
    }

    /// Total number of shots recorded.
    pub fn shots(&self) -> u64 {
        self.shots
    }

    /// Number of recorded shots that were makes.
    pub fn makes(&self) -> u64 {
        self.makes
    }

    /// Returns a snapshot of the current tallies and the derived percentage.
    pub fn stats(&self) -> ShotStats {
        ShotStats::from_counts(self.shots, self.makes)
    }
}

/// Read-only snapshot of a [`ShotCounter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotStats {
    pub shots: u64,
    pub makes: u64,
    /// Whole-number shooting percentage, truncated toward zero.
    pub percentage: u8,
}

impl ShotStats {
    /// Builds a snapshot from raw tallies, deriving the percentage.
    pub fn from_counts(shots: u64, makes: u64) -> Self {
        Self {
            shots,
            makes,
            percentage: percentage(shots, makes),
        }
    }
}

/// `makes * 100 / shots` with truncating division; `0` when there are no shots.
fn percentage(shots: u64, makes: u64) -> u8 {
    if shots == 0 {
        return 0;
    }
    // u128 so that `makes * 100` cannot overflow.
    let pct = u128::from(makes.min(shots)) * 100 / u128::from(shots);
    pct as u8
}

// ── Tests ─────────────────────────────────────────────────────────────────────
