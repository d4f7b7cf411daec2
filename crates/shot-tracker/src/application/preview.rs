//! PreviewSession: the lifetime of the visible camera preview.
//!
//! Opening a preview binds the camera and starts the background work that
//! belongs to it; closing (or dropping) it tears all of that down again:
//!
//! ```text
//! open()
//!  ├─ CameraController::bind(selector, source, on_frame)
//!  │     capture thread ──► on_frame ──► latest-frame slot
//!  ├─ analysis task       latest-frame slot ──► FrameAnalyzer ──► (sink)
//!  └─ timer task          (timer mode only) sleep ► on_detection_tick
//!
//! drop()
//!  ├─ abort timer + analysis tasks
//!  └─ CameraController::unbind(binding)
//! ```
//!
//! The counter is injected, not owned.  Re-opening a preview continues the
//! same totals, and because the previous timer task was aborted the new timer
//! starts a fresh interval; nothing is counted twice.
//!
//! If binding fails the error is logged and swallowed: the session still
//! opens, reports `camera_active == false`, and schedules no ticks.

use std::sync::Arc;
use std::time::Duration;

use shot_core::{Frame, LensFacing};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace};

use super::analyze_frames::{
    run_analysis, CadenceDetector, DetectionSink, DiscardingAnalyzer, FrameAnalyzer,
};
use super::count_shots::CountShotsUseCase;
use super::tick_loop::{run_timer_ticks, TickSource, DEFAULT_TICK_INTERVAL};
use crate::infrastructure::camera::latest::latest_channel;
use crate::infrastructure::camera::{BindingId, CameraController, FrameCallback, FrameSource};

/// Everything a preview needs to know besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSettings {
    pub tick_source: TickSource,
    pub tick_interval: Duration,
    /// Camera selector.
    pub facing: LensFacing,
    /// Cadence of the placeholder detector in `frames` mode.
    pub frames_per_detection: u64,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            tick_source: TickSource::Timer,
            tick_interval: DEFAULT_TICK_INTERVAL,
            facing: LensFacing::Back,
            frames_per_detection: 90,
        }
    }
}

/// A live camera preview and its background tasks.
pub struct PreviewSession {
    camera: Arc<CameraController>,
    binding: Option<BindingId>,
    tasks: Vec<JoinHandle<()>>,
}

impl PreviewSession {
    /// Opens a preview with the analyzer implied by `settings.tick_source`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(
        settings: &PreviewSettings,
        counter: Arc<CountShotsUseCase>,
        camera: Arc<CameraController>,
        source: Arc<dyn FrameSource>,
    ) -> Self {
        let analyzer: Box<dyn FrameAnalyzer> = match settings.tick_source {
            TickSource::Timer => Box::new(DiscardingAnalyzer),
            TickSource::Frames => Box::new(CadenceDetector::new(settings.frames_per_detection)),
        };
        Self::open_with_analyzer(settings, counter, camera, source, analyzer)
    }

    /// Opens a preview with an explicit frame analyzer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open_with_analyzer(
        settings: &PreviewSettings,
        counter: Arc<CountShotsUseCase>,
        camera: Arc<CameraController>,
        source: Arc<dyn FrameSource>,
        analyzer: Box<dyn FrameAnalyzer>,
    ) -> Self {
        let (frame_tx, frame_rx) = latest_channel::<Frame>();
        let on_frame: FrameCallback = Arc::new(move |frame: Frame| {
            if frame_tx.publish(frame) {
                trace!("superseded an unanalysed frame");
            }
        });

        let binding = match camera.bind(settings.facing, source, on_frame) {
            Ok(binding) => binding,
            Err(e) => {
                error!("camera binding failed: {e}");
                return Self {
                    camera,
                    binding: None,
                    tasks: Vec::new(),
                };
            }
        };

        let sink = match settings.tick_source {
            TickSource::Timer => DetectionSink::Ignore,
            TickSource::Frames => DetectionSink::Count(Arc::clone(&counter)),
        };

        let mut tasks = Vec::with_capacity(2);
        tasks.push(tokio::spawn(async move {
            let summary = run_analysis(frame_rx, analyzer, sink).await;
            debug!(?summary, "frame analysis finished");
        }));
        if settings.tick_source == TickSource::Timer {
            tasks.push(tokio::spawn(run_timer_ticks(counter, settings.tick_interval)));
        }

        info!(tick_source = ?settings.tick_source, "preview opened");
        Self {
            camera,
            binding: Some(binding),
            tasks,
        }
    }

    /// `true` when the camera was bound successfully.
    pub fn camera_active(&self) -> bool {
        self.binding.is_some()
    }

    /// Stops the timer and analysis tasks but keeps the camera bound.
    ///
    /// Non-blocking.  Async callers abort first so no tick can land while the
    /// camera release is still running on a blocking thread.
    pub fn abort_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    /// Tears the preview down.  Equivalent to dropping it.
    ///
    /// Releasing the camera joins its capture thread (see
    /// [`FrameSource::stop`]); async callers should run this through
    /// `spawn_blocking`.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for PreviewSession {
    fn drop(&mut self) {
        self.abort_tasks();
        if let Some(binding) = self.binding.take() {
            self.camera.unbind(binding);
        }
        debug!("preview closed");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
