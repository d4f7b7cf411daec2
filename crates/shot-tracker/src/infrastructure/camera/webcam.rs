//! Webcam frame source using nokhwa.
//!
//! `nokhwa::Camera` is not `Send` on every backend, so the device is opened
//! and read entirely on the capture thread.  `start` waits for that thread to
//! report whether the device opened, so open failures surface as a
//! [`CameraError`] from `start` instead of a silently idle thread.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc, Arc, Mutex, MutexGuard, PoisonError,
};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use shot_core::{Frame, LensFacing, PixelFormat};
use tracing::{debug, info, warn};

use super::{CameraError, FrameCallback, FrameSource};

/// Back-off after a failed frame read so a wedged device does not spin a core.
const READ_ERROR_BACKOFF: Duration = Duration::from_millis(10);

/// Webcam capture source.
pub struct WebcamFrameSource {
    index: u32,
    facing: LensFacing,
    running: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl WebcamFrameSource {
    /// Creates a stopped source for the device at `index`.
    pub fn new(index: u32, facing: LensFacing) -> Self {
        Self {
            index,
            facing,
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    /// List available webcam devices.
    pub fn list_devices() -> Result<Vec<String>, CameraError> {
        let devices = nokhwa::query(ApiBackend::Auto)
            .map_err(|e| CameraError::OpenFailed(e.to_string()))?;

        Ok(devices
            .into_iter()
            .map(|info| format!("{}: {}", info.index(), info.human_name()))
            .collect())
    }

    fn worker(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FrameSource for WebcamFrameSource {
    fn start(&self, on_frame: FrameCallback) -> Result<(), CameraError> {
        let mut worker = self.worker();
        if worker.is_some() {
            return Err(CameraError::AlreadyActive);
        }

        info!("opening webcam {}", self.index);
        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);
        let index = self.index;
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let handle = thread::Builder::new()
            .name("camera-frames".to_string())
            .spawn(move || capture_loop(index, running, on_frame, ready_tx))
            .map_err(|e| {
                self.running.store(false, Ordering::Release);
                CameraError::Spawn(e)
            })?;

        let opened = ready_rx
            .recv()
            .unwrap_or_else(|_| Err(CameraError::OpenFailed("capture thread exited".into())));

        match opened {
            Ok((width, height)) => {
                info!("webcam {} opened: {width}x{height}", self.index);
                *worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                let _ = handle.join();
                Err(e)
            }
        }
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.worker().take() {
            if handle.join().is_err() {
                warn!("webcam capture thread panicked");
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
        format!("webcam {} ({})", self.index, self.facing)
    }
}

impl Drop for WebcamFrameSource {
    fn drop(&mut self) {
        self.stop();
    }
}

fn open_camera(index: u32) -> Result<Camera, CameraError> {
    let requested =
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
    let mut camera = Camera::new(CameraIndex::Index(index), requested)
        .map_err(|e| CameraError::OpenFailed(e.to_string()))?;
    camera
        .open_stream()
        .map_err(|e| CameraError::OpenFailed(e.to_string()))?;
    Ok(camera)
}

fn capture_loop(
    index: u32,
    running: Arc<AtomicBool>,
    on_frame: FrameCallback,
    ready: mpsc::SyncSender<Result<(u32, u32), CameraError>>,
) {
    let mut camera = match open_camera(index) {
        Ok(camera) => camera,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    let resolution = camera.resolution();
    let _ = ready.send(Ok((resolution.width(), resolution.height())));

    let started = Instant::now();
    let mut sequence = 0u64;

    while running.load(Ordering::Acquire) {
        let buffer = match camera.frame() {
            Ok(buffer) => buffer,
            Err(e) => {
                warn!("webcam frame read failed: {e}");
                thread::sleep(READ_ERROR_BACKOFF);
                continue;
            }
        };
        let decoded = match buffer.decode_image::<RgbFormat>() {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("webcam frame decode failed: {e}");
                continue;
            }
        };

        sequence += 1;
        let (width, height) = (decoded.width(), decoded.height());
        match Frame::new(
            sequence,
            started.elapsed(),
            width,
            height,
            PixelFormat::Rgb8,
            decoded.into_raw(),
        ) {
            Ok(frame) => on_frame(frame),
            Err(e) => warn!("discarding malformed webcam frame: {e}"),
        }
    }

    if let Err(e) = camera.stop_stream() {
        warn!("failed to stop webcam stream: {e}");
    }
    debug!("webcam capture stopped after {sequence} frames");
}
