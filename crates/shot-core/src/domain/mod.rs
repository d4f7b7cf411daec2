//! Domain entities for Shot Tracker.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies.  Everything here can be compiled and tested on any platform
//! without a camera, a runtime, or a display.
//!
//! The counter is a plain value type: it is constructed once per
//! session and handed to whoever drives it (a timer, or frame analysis).  It
//! never reaches out to a clock or a UI toolkit itself.

/// Make/miss classification of a recorded shot.
pub mod classifier;

/// The shot counter state machine and its statistics snapshot.
pub mod counter;

/// Unique identifier of one tracking session (one process run).
pub type SessionId = uuid::Uuid;
