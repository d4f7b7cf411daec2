//! # shot-core
//!
//! Shared library for Shot Tracker containing the shot counter state machine,
//! the derived shooting statistics, and the camera frame types exchanged
//! between frame sources and frame analysis.
//!
//! It has zero dependencies on camera APIs, async runtimes, or UI frameworks.
//!
//! # Architecture overview
//!
//! Shot Tracker previews a camera feed and keeps a running tally of basketball
//! shots and makes.  The tally is the core domain concept and lives here:
//!
//! - **`domain`** – The [`ShotCounter`] and its read-only [`ShotStats`]
//!   snapshot, plus the [`ShotClassifier`] seam that decides whether a shot
//!   was a make or a miss.  The only classifier today is the placeholder
//!   [`AlternatingClassifier`] (every second shot is a make).
//!
//! - **`frame`** – How a captured camera image is represented: pixel payload
//!   plus metadata, the lens-facing selector, and the [`FrameInfo`] left over
//!   once the payload has been discarded.

pub mod domain;
pub mod frame;

// Re-export the most-used types at the crate root so callers can write
// `shot_core::ShotCounter` instead of `shot_core::domain::counter::ShotCounter`.
pub use domain::classifier::{AlternatingClassifier, ShotClassifier, ShotOutcome};
pub use domain::counter::{ShotCounter, ShotStats};
pub use domain::SessionId;
pub use frame::{Frame, FrameError, FrameInfo, LensFacing, PixelFormat};
