//! Mock frame source for unit and integration testing.
//!
//! Allows tests to inject synthetic [`Frame`]s without a camera device or a
//! capture thread.  Injected frames are delivered synchronously, on the
//! caller's thread, to whatever callback the source was started with.

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Mutex, MutexGuard, PoisonError,
};
use std::time::Duration;

use shot_core::{Frame, LensFacing};

use super::{CameraError, FrameCallback, FrameSource};

/// A mock implementation of [`FrameSource`] that lets tests push frames.
pub struct MockFrameSource {
    facing: LensFacing,
    fail_on_start: bool,
    callback: Mutex<Option<FrameCallback>>,
    starts: AtomicU32,
    releases: AtomicU32,
}

impl MockFrameSource {
    /// Creates a back-facing mock source that starts successfully.
    pub fn new() -> Self {
        Self {
            facing: LensFacing::Back,
            fail_on_start: false,
            callback: Mutex::new(None),
            starts: AtomicU32::new(0),
            releases: AtomicU32::new(0),
        }
    }

    /// Creates a mock whose `start` always fails, simulating a binding failure.
    pub fn failing() -> Self {
        Self {
            fail_on_start: true,
            ..Self::new()
        }
    }

    /// Changes which way the mock camera faces.
    pub fn with_facing(mut self, facing: LensFacing) -> Self {
        self.facing = facing;
        self
    }

    /// Delivers a frame, as if captured from hardware.
    ///
    /// Panics if the source has not been started or has been stopped.
    pub fn inject_frame(&self, frame: Frame) {
        let callback = self
            .callback()
            .clone()
            .expect("MockFrameSource::inject_frame called before start()");
        callback(frame);
    }

    /// Delivers a 2x2 blank frame with the given sequence number.
    pub fn inject_blank(&self, sequence: u64) {
        self.inject_frame(Frame::blank(
            sequence,
            Duration::from_millis(sequence * 33),
            2,
            2,
        ));
    }

    fn callback(&self) -> MutexGuard<'_, Option<FrameCallback>> {
        self.callback.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of successful `start` calls.
    pub fn start_count(&self) -> u32 {
        self.starts.load(Ordering::Relaxed)
    }

    /// Number of `stop` calls that actually released a running source.
    pub fn release_count(&self) -> u32 {
        self.releases.load(Ordering::Relaxed)
    }
}

impl Default for MockFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for MockFrameSource {
    fn start(&self, on_frame: FrameCallback) -> Result<(), CameraError> {
        if self.fail_on_start {
            return Err(CameraError::OpenFailed("mock camera failure".to_string()));
        }
        let mut callback = self.callback();
        if callback.is_some() {
            return Err(CameraError::AlreadyActive);
        }
        *callback = Some(on_frame);
        self.starts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn stop(&self) {
        // Dropping the callback closes any channel it feeds.
        if self.callback().take().is_some() {
            self.releases.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn is_active(&self) -> bool {
        self.callback().is_some()
    }

    fn facing(&self) -> LensFacing {
        self.facing
    }

    fn describe(&self) -> String {
        format!("mock {} camera", self.facing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_mock_frame_source_starts_and_delivers_frames() {
        // Arrange
        let source = MockFrameSource::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = Arc::clone(&received);
        source
            .start(Arc::new(move |frame: Frame| {
                received_clone.lock().unwrap().push(frame.sequence());
            }))
            .expect("start should succeed");

        // Act
        source.inject_blank(1);
        source.inject_blank(2);

        // Assert
        assert_eq!(*received.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_mock_frame_source_stop_is_idempotent() {
        // Arrange
        let source = MockFrameSource::new();
        source.start(Arc::new(|_| {})).expect("start");

        // Act
        source.stop();
        source.stop();

        // Assert
        assert!(!source.is_active());
        assert_eq!(source.release_count(), 1);
    }

    #[test]
    fn test_mock_frame_source_rejects_double_start() {
        let source = MockFrameSource::new();
        source.start(Arc::new(|_| {})).expect("first start");
        let second = source.start(Arc::new(|_| {}));
        assert!(matches!(second, Err(CameraError::AlreadyActive)));
    }

    #[test]
    fn test_failing_mock_never_becomes_active() {
        let source = MockFrameSource::failing();
        assert!(source.start(Arc::new(|_| {})).is_err());
        assert!(!source.is_active());
        assert_eq!(source.start_count(), 0);
    }

    #[test]
    #[should_panic(expected = "before start")]
    fn test_inject_before_start_panics() {
        MockFrameSource::new().inject_blank(1);
    }
}
