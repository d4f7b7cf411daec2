//! CountShotsUseCase: the session's shot counter, observable by the UI.
//!
//! The [`ShotCounter`] itself is a plain value.  This use case owns it inside a
//! `tokio::sync::watch` channel so that every tick mutates the counter in place
//! and every subscriber (the overlay) is woken with the new totals.
//!
//! One instance is created per session and shared (`Arc`) between whatever
//! drives ticks and whatever displays them.  Preview sessions come and go;
//! this object, and therefore the totals, outlives them.

use shot_core::{ShotCounter, ShotStats};
use tokio::sync::watch;
use tracing::debug;

/// Shared, observable shot counter.
pub struct CountShotsUseCase {
    state: watch::Sender<ShotCounter>,
}

impl CountShotsUseCase {
    /// Creates a use case with a fresh counter.
    pub fn new() -> Self {
        Self::with_counter(ShotCounter::new())
    }

    /// Creates a use case around an existing counter.
    pub fn with_counter(counter: ShotCounter) -> Self {
        let (state, _) = watch::channel(counter);
        Self { state }
    }

    /// Records one detection and notifies subscribers.
    ///
    /// Returns the totals after the tick.
    pub fn on_detection_tick(&self) -> ShotStats {
        let mut stats = ShotStats::default();
        self.state.send_modify(|counter| {
            counter.on_detection_tick();
            stats = counter.stats();
        });
        debug!(
            shots = stats.shots,
            makes = stats.makes,
            percentage = stats.percentage,
            "detection tick"
        );
        stats
    }

    /// Current totals and percentage.
    pub fn stats(&self) -> ShotStats {
        self.state.borrow().stats()
    }

    /// Returns a receiver that is notified after every tick.
    pub fn subscribe(&self) -> watch::Receiver<ShotCounter> {
        self.state.subscribe()
    }
}

impl Default for CountShotsUseCase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_use_case_starts_at_zero() {
        let use_case = CountShotsUseCase::new();
        assert_eq!(use_case.stats(), ShotStats::default());
    }

    #[test]
    fn test_on_detection_tick_returns_updated_stats() {
        // Arrange
        let use_case = CountShotsUseCase::new();

        // Act
        use_case.on_detection_tick();
        let stats = use_case.on_detection_tick();

        // Assert
        assert_eq!(stats, ShotStats { shots: 2, makes: 1, percentage: 50 });
        assert_eq!(use_case.stats(), stats);
    }

    #[test]
    fn test_tick_without_subscribers_still_counts() {
        let use_case = CountShotsUseCase::new();
        for _ in 0..5 {
            use_case.on_detection_tick();
        }
        assert_eq!(use_case.stats(), ShotStats { shots: 5, makes: 2, percentage: 40 });
    }

    #[test]
    fn test_with_counter_continues_existing_totals() {
        // Arrange
        let mut counter = ShotCounter::new();
        counter.on_detection_tick();

        // Act
        let use_case = CountShotsUseCase::with_counter(counter);
        use_case.on_detection_tick();

        // Assert
        assert_eq!(use_case.stats().shots, 2);
    }

    #[tokio::test]
    async fn test_subscribers_are_notified_of_each_tick() {
        // Arrange
        let use_case = CountShotsUseCase::new();
        let mut rx = use_case.subscribe();

        // Act
        use_case.on_detection_tick();

        // Assert
        rx.changed().await.expect("sender alive");
        assert_eq!(rx.borrow_and_update().stats().shots, 1);
    }
}
