//! Command bridge between the application layer and the UI.
//!
//! The UI (the terminal front end in `main.rs`, or tests) never touches the
//! use cases directly.  It calls the async command functions below, each of
//! which takes the shared [`AppState`] and returns a serializable snapshot:
//!
//! ```text
//! UI                       bridge                      application
//! ───────────────────────────────────────────────────────────────────
//! request_permission() ──► PermissionGate::request ──► CameraPermission
//!                          └─ granted? open_preview ──► PreviewSession::open
//! get_screen()         ◄── ScreenDto
//! ```
//!
//! # `CommandResult<T>`
//!
//! All commands return `CommandResult<T>`, a unified envelope:
//! ```json
//! { "success": true,  "data": {...}, "error": null  }
//! { "success": false, "data": null,  "error": "..."  }
//! ```
//!
//! # Async Mutex vs std Mutex
//!
//! `AppState` uses `tokio::sync::Mutex` for the permission gate because the
//! gate is held across the provider's `.await`.  The preview slot uses the
//! same kind of lock for consistency; it is never held across an await.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shot_core::{SessionId, ShotStats};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::application::count_shots::CountShotsUseCase;
use crate::application::permission::{CameraPermission, PermissionGate, PermissionStatus};
use crate::application::preview::{PreviewSession, PreviewSettings};
use crate::infrastructure::camera::{CameraController, FrameSource};

pub mod overlay;

/// Text shown while camera access has not been granted.
pub const PERMISSION_REQUIRED_MESSAGE: &str = "Camera permission required";
/// Label of the retry action on the permission screen.
pub const GRANT_PERMISSION_LABEL: &str = "Grant Permission";

// ── Shared application state ──────────────────────────────────────────────────

/// Runtime state shared between commands.
pub struct AppState {
    /// Identifies this run in logs.
    pub session_id: SessionId,
    /// Totals for the session; outlives every preview.
    pub counter: Arc<CountShotsUseCase>,
    pub settings: PreviewSettings,
    pub permission: Mutex<PermissionGate>,
    pub camera: Arc<CameraController>,
    pub frame_source: Arc<dyn FrameSource>,
    /// The visible preview, if any.
    pub preview: Mutex<Option<PreviewSession>>,
}

impl AppState {
    /// Creates the state for a new session with a fresh counter.
    pub fn new(
        settings: PreviewSettings,
        permission: Box<dyn CameraPermission>,
        frame_source: Arc<dyn FrameSource>,
    ) -> Arc<Self> {
        Self::with_counter(
            settings,
            permission,
            frame_source,
            Arc::new(CountShotsUseCase::new()),
        )
    }

    /// Creates the state around an existing counter.
    pub fn with_counter(
        settings: PreviewSettings,
        permission: Box<dyn CameraPermission>,
        frame_source: Arc<dyn FrameSource>,
        counter: Arc<CountShotsUseCase>,
    ) -> Arc<Self> {
        let session_id = SessionId::new_v4();
        info!(%session_id, "session created");
        Arc::new(Self {
            session_id,
            counter,
            settings,
            permission: Mutex::new(PermissionGate::new(permission)),
            camera: Arc::new(CameraController::new()),
            frame_source,
            preview: Mutex::new(None),
        })
    }
}

// ── DTOs ──────────────────────────────────────────────────────────────────────

/// Counter snapshot shown by the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsDto {
    pub shots: u64,
    pub makes: u64,
    /// Whole percent, `0..=100`.
    pub percentage: u8,
}

impl From<ShotStats> for StatsDto {
    fn from(stats: ShotStats) -> Self {
        Self {
            shots: stats.shots,
            makes: stats.makes,
            percentage: stats.percentage,
        }
    }
}

/// What the UI should be showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum ScreenDto {
    /// Camera access not granted yet; offer the retry action.
    PermissionRequired {
        message: String,
        action_label: String,
    },
    /// Full-screen preview with the stats overlay.
    Preview { camera_active: bool, stats: StatsDto },
}

impl ScreenDto {
    fn permission_required() -> Self {
        Self::PermissionRequired {
            message: PERMISSION_REQUIRED_MESSAGE.to_string(),
            action_label: GRANT_PERMISSION_LABEL.to_string(),
        }
    }
}

/// Unified response wrapper for commands.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    /// `true` if the command completed successfully; `false` on error.
    pub success: bool,
    /// The command's return value, present only when `success` is `true`.
    pub data: Option<T>,
    /// A human-readable error message, present only when `success` is `false`.
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(msg.into()) }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Returns the current totals.
pub async fn get_stats(state: Arc<AppState>) -> CommandResult<StatsDto> {
    CommandResult::ok(state.counter.stats().into())
}

/// Returns the screen the UI should display right now.
pub async fn get_screen(state: Arc<AppState>) -> CommandResult<ScreenDto> {
    CommandResult::ok(current_screen(&state).await)
}

/// Asks for camera permission and, once granted, opens the preview.
///
/// This is also the retry action of the permission screen.  When access is
/// already granted the provider is not asked again and an open preview is
/// left untouched.
pub async fn request_permission(state: Arc<AppState>) -> CommandResult<ScreenDto> {
    let status = state.permission.lock().await.request().await;

    if status == PermissionStatus::Granted {
        let mut preview = state.preview.lock().await;
        if preview.is_none() {
            *preview = Some(open_session(&state));
        }
    }

    CommandResult::ok(current_screen(&state).await)
}

/// Opens (or re-opens) the camera preview.
///
/// Any preview already open is torn down first.  A camera binding failure is
/// not an error here: the preview opens with `camera_active == false`.
pub async fn open_preview(state: Arc<AppState>) -> CommandResult<ScreenDto> {
    if !state.permission.lock().await.is_granted() {
        return CommandResult::err("camera permission has not been granted");
    }

    {
        let mut preview = state.preview.lock().await;
        if let Some(previous) = preview.take() {
            release_preview(previous).await;
        }
        *preview = Some(open_session(&state));
    }

    CommandResult::ok(current_screen(&state).await)
}

/// Tears down the preview, if one is open.  The totals are kept.
pub async fn close_preview(state: Arc<AppState>) -> CommandResult<()> {
    let preview = state.preview.lock().await.take();
    if let Some(preview) = preview {
        release_preview(preview).await;
        info!(session_id = %state.session_id, "preview closed by user");
    }
    CommandResult::ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn open_session(state: &AppState) -> PreviewSession {
    PreviewSession::open(
        &state.settings,
        Arc::clone(&state.counter),
        Arc::clone(&state.camera),
        Arc::clone(&state.frame_source),
    )
}

/// Closes `preview` without blocking the async worker.
///
/// Tasks are aborted right away; the camera release, which joins the capture
/// thread, runs on the blocking pool.
async fn release_preview(mut preview: PreviewSession) {
    preview.abort_tasks();
    if let Err(e) = tokio::task::spawn_blocking(move || preview.close()).await {
        warn!("preview teardown failed: {e}");
    }
}

async fn current_screen(state: &AppState) -> ScreenDto {
    if !state.permission.lock().await.is_granted() {
        return ScreenDto::permission_required();
    }
    let camera_active = state
        .preview
        .lock()
        .await
        .as_ref()
        .is_some_and(PreviewSession::camera_active);
    ScreenDto::Preview {
        camera_active,
        stats: state.counter.stats().into(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
