//! Integration tests for the counting pipeline.
//!
//! These tests drive the UI bridge commands the same way the binary does and
//! check the totals the overlay would show.  Time is paused so the 3 s
//! simulated-detection timer can be stepped deterministically.

use std::sync::Arc;
use std::time::Duration;

use shot_tracker::application::permission::PermissionStatus;
use shot_tracker::application::preview::PreviewSettings;
use shot_tracker::infrastructure::camera::mock::MockFrameSource;
use shot_tracker::infrastructure::permission::mock::ScriptedPermission;
use shot_tracker::infrastructure::permission::FixedPermission;
use shot_tracker::infrastructure::ui_bridge::{
    close_preview, get_screen, get_stats, open_preview, request_permission, AppState, ScreenDto,
    StatsDto,
};

fn granted_state() -> Arc<AppState> {
    AppState::new(
        PreviewSettings::default(),
        Box::new(FixedPermission::granted()),
        Arc::new(MockFrameSource::new()),
    )
}

async fn stats(state: &Arc<AppState>) -> StatsDto {
    get_stats(Arc::clone(state)).await.data.expect("get_stats always succeeds")
}

// ── Tick scenarios ────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_overlay_shows_zeros_before_first_tick() {
    // Arrange
    let state = granted_state();
    request_permission(Arc::clone(&state)).await;

    // Act
    tokio::time::sleep(Duration::from_millis(2_900)).await;

    // Assert
    assert_eq!(stats(&state).await, StatsDto { shots: 0, makes: 0, percentage: 0 });
}

#[tokio::test(start_paused = true)]
async fn test_tick_scenarios_one_two_and_five() {
    // Arrange
    let state = granted_state();
    request_permission(Arc::clone(&state)).await;

    // Act + Assert – one tick
    tokio::time::sleep(Duration::from_millis(3_100)).await;
    assert_eq!(stats(&state).await, StatsDto { shots: 1, makes: 0, percentage: 0 });

    // two ticks
    tokio::time::sleep(Duration::from_millis(3_000)).await;
    assert_eq!(stats(&state).await, StatsDto { shots: 2, makes: 1, percentage: 50 });

    // five ticks
    tokio::time::sleep(Duration::from_millis(9_000)).await;
    assert_eq!(stats(&state).await, StatsDto { shots: 5, makes: 2, percentage: 40 });
}

#[tokio::test(start_paused = true)]
async fn test_custom_interval_is_honoured() {
    // Arrange
    let settings = PreviewSettings {
        tick_interval: Duration::from_millis(500),
        ..PreviewSettings::default()
    };
    let state = AppState::new(
        settings,
        Box::new(FixedPermission::granted()),
        Arc::new(MockFrameSource::new()),
    );
    request_permission(Arc::clone(&state)).await;

    // Act
    tokio::time::sleep(Duration::from_millis(2_100)).await;

    // Assert
    assert_eq!(stats(&state).await.shots, 4);
}

// ── Preview lifecycle ─────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_reopening_preview_does_not_double_count() {
    // Arrange – two ticks in the first preview
    let state = granted_state();
    request_permission(Arc::clone(&state)).await;
    tokio::time::sleep(Duration::from_millis(7_000)).await;

    // Act – tear down and re-create, then wait 3.5 s
    close_preview(Arc::clone(&state)).await;
    open_preview(Arc::clone(&state)).await;
    tokio::time::sleep(Duration::from_millis(3_500)).await;

    // Assert – one more tick from the new timer only
    assert_eq!(stats(&state).await.shots, 3);
}

#[tokio::test(start_paused = true)]
async fn test_open_preview_twice_replaces_the_previous_timer() {
    // Arrange
    let state = granted_state();
    request_permission(Arc::clone(&state)).await;

    // Act
    open_preview(Arc::clone(&state)).await;
    open_preview(Arc::clone(&state)).await;
    tokio::time::sleep(Duration::from_millis(9_100)).await;

    // Assert
    assert_eq!(stats(&state).await.shots, 3);
}

#[tokio::test(start_paused = true)]
async fn test_closed_preview_stops_counting() {
    // Arrange
    let state = granted_state();
    request_permission(Arc::clone(&state)).await;
    tokio::time::sleep(Duration::from_millis(3_100)).await;

    // Act
    close_preview(Arc::clone(&state)).await;
    tokio::time::sleep(Duration::from_secs(60)).await;

    // Assert
    assert_eq!(stats(&state).await.shots, 1);
}

// ── Permission flow ───────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_deny_then_grant_transitions_to_preview() {
    // Arrange
    let state = AppState::new(
        PreviewSettings::default(),
        Box::new(ScriptedPermission::new([
            PermissionStatus::Denied,
            PermissionStatus::Granted,
        ])),
        Arc::new(MockFrameSource::new()),
    );

    // Act – first request is denied
    let denied = request_permission(Arc::clone(&state)).await.data;
    tokio::time::sleep(Duration::from_secs(10)).await;
    let counted_while_denied = stats(&state).await.shots;

    // Act – retry is granted
    let granted = request_permission(Arc::clone(&state)).await.data;
    tokio::time::sleep(Duration::from_millis(3_100)).await;

    // Assert
    assert!(matches!(denied, Some(ScreenDto::PermissionRequired { .. })));
    assert_eq!(counted_while_denied, 0);
    assert!(matches!(
        granted,
        Some(ScreenDto::Preview { camera_active: true, .. })
    ));
    assert_eq!(stats(&state).await.shots, 1);
}

#[tokio::test(start_paused = true)]
async fn test_repeat_grant_keeps_counters_and_preview() {
    // Arrange
    let provider = ScriptedPermission::new([PermissionStatus::Granted]);
    let state = AppState::new(
        PreviewSettings::default(),
        Box::new(provider.clone()),
        Arc::new(MockFrameSource::new()),
    );
    request_permission(Arc::clone(&state)).await;
    tokio::time::sleep(Duration::from_millis(6_100)).await;

    // Act
    request_permission(Arc::clone(&state)).await;
    tokio::time::sleep(Duration::from_millis(3_000)).await;

    // Assert – provider asked once, counting carried on undisturbed
    assert_eq!(provider.requests(), 1);
    assert_eq!(stats(&state).await.shots, 3);
    assert!(matches!(
        get_screen(state).await.data,
        Some(ScreenDto::Preview { .. })
    ));
}
