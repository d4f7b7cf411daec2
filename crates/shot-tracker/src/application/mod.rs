//! Application layer use cases for the shot tracker.
//!
//! Use cases in this layer orchestrate domain objects from `shot_core` and
//! depend on infrastructure only through traits (`FrameSource`,
//! `CameraPermission`, `FrameAnalyzer`), so tests can drive them with mocks.
//!
//! # Sub-modules
//!
//! - **`count_shots`**    – The shared, observable shot counter.
//! - **`tick_loop`**      – The simulated-detection timer and tick source
//!   selection.
//! - **`analyze_frames`** – Per-frame analysis and the detection sink.
//! - **`preview`**        – Binds the camera and owns the background tasks for
//!   as long as the preview is visible.
//! - **`permission`**     – Remembers whether camera access was granted.

pub mod analyze_frames;
pub mod count_shots;
pub mod permission;
pub mod preview;
pub mod tick_loop;
