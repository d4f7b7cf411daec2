//! Infrastructure layer for the shot tracker.
//!
//! Contains OS-facing adapters: camera frame sources, the permission prompt,
//! file-system storage, and the command bridge the UI talks to.
//!
//! **Dependency rule**: the `application` layer only reaches in here for the
//! traits it depends on and for test doubles.

pub mod camera;
pub mod permission;
pub mod storage;
pub mod ui_bridge;
