//! Tick drivers: what makes the shot counter advance.
//!
//! - [`TickSource::Timer`] – the walking-skeleton driver.  A fixed-period
//!   timer fires a simulated detection every interval (3 s by default),
//!   regardless of what the camera sees.
//! - [`TickSource::Frames`] – detections come from frame analysis; see
//!   [`crate::application::analyze_frames`].

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::count_shots::CountShotsUseCase;

/// Default period of the simulated detection timer.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(3000);

/// Selects the driver of the shot counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickSource {
    /// Fixed-period simulated detections.
    #[default]
    Timer,
    /// Detections reported by frame analysis.
    Frames,
}

/// Fires a simulated detection every `interval`, forever.
///
/// The first tick happens one full interval after the call.  The loop has no
/// exit of its own; it ends when the task running it is aborted.
pub async fn run_timer_ticks(counter: Arc<CountShotsUseCase>, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;
        debug!("fake object detected");
        counter.on_detection_tick();
    }
}
