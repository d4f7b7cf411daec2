//! Camera infrastructure: frame sources and the exclusive camera binding.
//!
//! A [`FrameSource`] owns one camera device.  Once started it delivers every
//! captured [`Frame`] to a callback on its own dedicated capture thread, and it
//! keeps doing so until it is stopped.
//!
//! The [`CameraController`] plays the role of the platform camera provider: it
//! guarantees that at most one source is bound at a time, and every bind first
//! unbinds whatever was bound before.
//!
//! # Implementations
//!
//! - [`synthetic::SyntheticFrameSource`] – blank frames at a fixed rate; the
//!   headless default.
//! - `webcam::WebcamFrameSource` – a real device via `nokhwa` (requires the
//!   `webcam` feature).
//! - [`mock::MockFrameSource`] – frames injected by tests.
//!
//! # Testability
//!
//! The `FrameSource` trait allows tests to drive the whole preview pipeline
//! with synthetic frames, without a camera attached.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use shot_core::{Frame, LensFacing};
use tracing::{debug, info};

use crate::infrastructure::storage::config::{CameraConfig, CameraSourceKind};

pub mod latest;
pub mod mock;
pub mod synthetic;

#[cfg(feature = "webcam")]
pub mod webcam;

/// Callback invoked on the capture thread for every captured frame.
pub type FrameCallback = Arc<dyn Fn(Frame) + Send + Sync>;

/// Error type for camera operations.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("no {requested}-facing camera available (source faces {available})")]
    NoMatchingCamera {
        requested: LensFacing,
        available: LensFacing,
    },
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    #[error("camera is already capturing")]
    AlreadyActive,
    #[error("camera source '{0}' is not available in this build")]
    Unsupported(String),
    #[error("failed to spawn capture thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Trait abstracting a camera device that produces frames.
pub trait FrameSource: Send + Sync {
    /// Acquires the device and starts delivering frames to `on_frame`.
    fn start(&self, on_frame: FrameCallback) -> Result<(), CameraError>;
    /// Releases the device.  Calling it on a stopped source does nothing.
    ///
    /// Blocks until the capture thread has exited, which can take up to one
    /// frame interval (or one device read).  Do not call it directly on an
    /// async worker; go through `spawn_blocking`.
    fn stop(&self);
    /// `true` while frames are being delivered.
    fn is_active(&self) -> bool;
    /// Which way the device faces.
    fn facing(&self) -> LensFacing;
    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Identifies one successful [`CameraController::bind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

struct Binding {
    id: BindingId,
    source: Arc<dyn FrameSource>,
}

/// Exclusive owner of the camera.
#[derive(Default)]
pub struct CameraController {
    active: Mutex<Option<Binding>>,
    next_id: AtomicU64,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `source` to the camera, replacing any previous binding.
    ///
    /// Blocking: stops the previous source (see [`FrameSource::stop`]) and
    /// starts the new one.
    ///
    /// # Errors
    ///
    /// Returns [`CameraError::NoMatchingCamera`] when the source does not face
    /// the way `selector` asks for, or whatever the source's `start` returns.
    /// The camera is left unbound on error.
    pub fn bind(
        &self,
        selector: LensFacing,
        source: Arc<dyn FrameSource>,
        on_frame: FrameCallback,
    ) -> Result<BindingId, CameraError> {
        let mut active = self.active();
        if let Some(previous) = active.take() {
            debug!("unbinding {} before rebinding", previous.source.describe());
            previous.source.stop();
        }

        if source.facing() != selector {
            return Err(CameraError::NoMatchingCamera {
                requested: selector,
                available: source.facing(),
            });
        }

        source.start(on_frame)?;

        let id = BindingId(self.next_id.fetch_add(1, Ordering::Relaxed));
        info!("camera started successfully: {}", source.describe());
        *active = Some(Binding { id, source });
        Ok(id)
    }

    /// Releases the binding `id`, if it is still the current one.
    ///
    /// Blocking, like [`FrameSource::stop`].
    pub fn unbind(&self, id: BindingId) {
        let mut active = self.active();
        if active.as_ref().is_some_and(|b| b.id == id) {
            if let Some(binding) = active.take() {
                binding.source.stop();
                info!("camera released: {}", binding.source.describe());
            }
        }
    }

    /// Releases whatever is bound.  Safe to call repeatedly.
    pub fn unbind_all(&self) {
        if let Some(binding) = self.active().take() {
            binding.source.stop();
            info!("camera released: {}", binding.source.describe());
        }
    }

    /// `true` while a source is bound.
    pub fn is_bound(&self) -> bool {
        self.active().is_some()
    }

    fn active(&self) -> MutexGuard<'_, Option<Binding>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builds the frame source selected in the configuration.
///
/// # Errors
///
/// Returns [`CameraError::Unsupported`] for `webcam` when the crate was built
/// without the `webcam` feature.
pub fn build_frame_source(config: &CameraConfig) -> Result<Arc<dyn FrameSource>, CameraError> {
    match config.source {
        CameraSourceKind::Synthetic => Ok(Arc::new(synthetic::SyntheticFrameSource::new(
            config.facing,
            config.width,
            config.height,
            config.fps,
        ))),
        #[cfg(feature = "webcam")]
        CameraSourceKind::Webcam => Ok(Arc::new(webcam::WebcamFrameSource::new(
            config.device_index,
            config.facing,
        ))),
        #[cfg(not(feature = "webcam"))]
        CameraSourceKind::Webcam => Err(CameraError::Unsupported("webcam".to_string())),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
