//! Synthetic frame source: blank frames at a fixed rate.
//!
//! Stands in for a camera on machines that have none (CI, servers) and is the
//! default source.  Frames are produced on a dedicated `camera-frames` thread,
//! the same way a real device delivers them.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use shot_core::{Frame, LensFacing};
use tracing::{debug, info, warn};

use super::{CameraError, FrameCallback, FrameSource};

/// Emits blank grayscale frames of a fixed size at a fixed rate.
pub struct SyntheticFrameSource {
    facing: LensFacing,
    width: u32,
    height: u32,
    frame_interval: Duration,
    running: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SyntheticFrameSource {
    /// Creates a stopped source.  A zero `fps` is treated as one frame per second.
    pub fn new(facing: LensFacing, width: u32, height: u32, fps: u32) -> Self {
        Self {
            facing,
            width,
            height,
            frame_interval: Duration::from_secs(1) / fps.max(1),
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    /// Time between two frames.
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    fn worker(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FrameSource for SyntheticFrameSource {
    fn start(&self, on_frame: FrameCallback) -> Result<(), CameraError> {
        let mut worker = self.worker();
        if worker.is_some() {
            return Err(CameraError::AlreadyActive);
        }

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);
        let (width, height, interval) = (self.width, self.height, self.frame_interval);

        let handle = thread::Builder::new()
            .name("camera-frames".to_string())
            .spawn(move || capture_loop(width, height, interval, running, on_frame))
            .map_err(|e| {
                self.running.store(false, Ordering::Release);
                CameraError::Spawn(e)
            })?;

        info!(
            "synthetic camera capturing {}x{} every {:?}",
            self.width, self.height, self.frame_interval
        );
        *worker = Some(handle);
        Ok(())
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.worker().take() {
            if handle.join().is_err() {
                warn!("synthetic capture thread panicked");
            }
        }
    }

    fn is_active(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn facing(&self) -> LensFacing {
        self.facing
    }

    fn describe(&self) -> String {
        format!(
            "synthetic {} camera {}x{}",
            self.facing, self.width, self.height
        )
    }
}

impl Drop for SyntheticFrameSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Body of the capture thread.  The callback is dropped when the loop exits.
fn capture_loop(
    width: u32,
    height: u32,
    interval: Duration,
    running: Arc<AtomicBool>,
    on_frame: FrameCallback,
) {
    let started = Instant::now();
    let mut sequence = 0u64;

    while running.load(Ordering::Acquire) {
        sequence += 1;
        on_frame(Frame::blank(sequence, started.elapsed(), width, height));
        thread::sleep(interval);
    }

    debug!("synthetic capture stopped after {sequence} frames");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn test_frame_interval_follows_fps() {
        let source = SyntheticFrameSource::new(LensFacing::Back, 4, 4, 50);
        assert_eq!(source.frame_interval(), Duration::from_millis(20));
    }

    #[test]
    fn test_zero_fps_is_clamped_to_one() {
        let source = SyntheticFrameSource::new(LensFacing::Back, 4, 4, 0);
        assert_eq!(source.frame_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_start_delivers_frames_until_stopped() {
        // Arrange
        let source = SyntheticFrameSource::new(LensFacing::Back, 4, 4, 200);
        let count = Arc::new(AtomicU64::new(0));
        let count_clone = Arc::clone(&count);

        // Act
        source
            .start(Arc::new(move |frame: Frame| {
                assert_eq!(frame.dimensions(), (4, 4));
                count_clone.fetch_add(1, Ordering::Relaxed);
            }))
            .expect("start should succeed");
        thread::sleep(Duration::from_millis(100));
        source.stop();
        let after_stop = count.load(Ordering::Relaxed);
        thread::sleep(Duration::from_millis(50));

        // Assert
        assert!(after_stop > 0, "expected frames while running");
        assert_eq!(count.load(Ordering::Relaxed), after_stop, "no frames after stop");
        assert!(!source.is_active());
    }

    #[test]
    fn test_double_start_is_rejected() {
        let source = SyntheticFrameSource::new(LensFacing::Back, 2, 2, 100);
        source.start(Arc::new(|_| {})).expect("first start");
        assert!(matches!(
            source.start(Arc::new(|_| {})),
            Err(CameraError::AlreadyActive)
        ));
        source.stop();
    }

    #[test]
    fn test_stop_without_start_is_a_no_op() {
        let source = SyntheticFrameSource::new(LensFacing::Back, 2, 2, 30);
        source.stop();
        source.stop();
        assert!(!source.is_active());
    }

    #[test]
    fn test_can_restart_after_stop() {
        let source = SyntheticFrameSource::new(LensFacing::Back, 2, 2, 100);
        source.start(Arc::new(|_| {})).expect("first start");
        source.stop();
        source.start(Arc::new(|_| {})).expect("restart");
        assert!(source.is_active());
        source.stop();
    }
}
