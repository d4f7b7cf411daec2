//! Shot Tracker entry point.
//!
//! Loads the configuration, asks for camera permission, and then shows the
//! live stats overlay on the terminal until Ctrl-C.
//!
//! # Usage
//!
//! ```text
//! shot-tracker [OPTIONS]
//!
//! Options:
//!   --config <PATH>             Config file [default: platform config dir]
//!   --tick-source <timer|frames> What drives the counter
//!   --camera <synthetic|webcam>  Frame source
//!   --interval-ms <MS>          Simulated detection period
//!   --permission <prompt|grant|deny>
//! ```
//!
//! Every flag can also be set through the environment variable listed in
//! `--help`; flags override the config file.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ AppState::new()           -- counter, permission gate, camera
//!  └─ permission loop           -- request_permission until granted
//!  └─ overlay pump (task)       -- re-renders on every counter change
//!  └─ Ctrl-C                    -- close_preview, exit
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use shot_tracker::application::permission::CameraPermission;
use shot_tracker::application::tick_loop::TickSource;
use shot_tracker::infrastructure::camera::build_frame_source;
use shot_tracker::infrastructure::permission::{FixedPermission, StdinPermission};
use shot_tracker::infrastructure::storage::config::{self, AppConfig, CameraSourceKind};
use shot_tracker::infrastructure::ui_bridge::overlay::{render_overlay, render_screen};
use shot_tracker::infrastructure::ui_bridge::{
    close_preview, request_permission, AppState, ScreenDto,
};

/// Pause between two permission prompts after a denial.
const PERMISSION_RETRY_DELAY: Duration = Duration::from_secs(1);

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Basketball shot counter with a live camera preview.
#[derive(Debug, Parser)]
#[command(name = "shot-tracker", version)]
struct Cli {
    /// Path of the TOML config file.
    ///
    /// Defaults to `config.toml` in the platform config directory.  A missing
    /// file means "all defaults".
    #[arg(long, env = "SHOT_TRACKER_CONFIG")]
    config: Option<PathBuf>,

    /// What drives the shot counter.
    #[arg(long, value_enum, env = "SHOT_TRACKER_TICK_SOURCE")]
    tick_source: Option<TickSourceArg>,

    /// Which frame source backs the camera.
    #[arg(long, value_enum, env = "SHOT_TRACKER_CAMERA")]
    camera: Option<CameraArg>,

    /// Period of the simulated detection timer, in milliseconds.
    #[arg(long, env = "SHOT_TRACKER_INTERVAL_MS")]
    interval_ms: Option<u64>,

    /// How camera permission is answered.
    #[arg(long, value_enum, default_value_t = PermissionMode::Prompt, env = "SHOT_TRACKER_PERMISSION")]
    permission: PermissionMode,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TickSourceArg {
    Timer,
    Frames,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CameraArg {
    Synthetic,
    Webcam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PermissionMode {
    /// Ask on the terminal.
    Prompt,
    /// Always grant.
    Grant,
    /// Always deny.
    Deny,
}

impl Cli {
    /// Applies the command-line overrides on top of the file configuration.
    fn apply(&self, cfg: &mut AppConfig) {
        if let Some(tick_source) = self.tick_source {
            cfg.tracker.tick_source = match tick_source {
                TickSourceArg::Timer => TickSource::Timer,
                TickSourceArg::Frames => TickSource::Frames,
            };
        }
        if let Some(camera) = self.camera {
            cfg.camera.source = match camera {
                CameraArg::Synthetic => CameraSourceKind::Synthetic,
                CameraArg::Webcam => CameraSourceKind::Webcam,
            };
        }
        if let Some(interval_ms) = self.interval_ms {
            cfg.timer.interval_ms = interval_ms;
        }
    }

    /// Applies the overrides and re-validates the result.
    fn resolve(&self, mut cfg: AppConfig) -> anyhow::Result<AppConfig> {
        self.apply(&mut cfg);
        cfg.validate().context("invalid command-line override")?;
        Ok(cfg)
    }

    fn permission_provider(&self) -> Box<dyn CameraPermission> {
        match self.permission {
            PermissionMode::Prompt => Box::new(StdinPermission::new()),
            PermissionMode::Grant => Box::new(FixedPermission::granted()),
            PermissionMode::Deny => Box::new(FixedPermission::denied()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_cfg = match &cli.config {
        Some(path) => config::load_config_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => config::load_config().context("failed to load config")?,
    };
    let cfg = cli.resolve(file_cfg)?;

    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cfg.tracker.log_level)),
        )
        .init();

    info!("Shot Tracker v{} starting", cfg.tracker.version);

    let frame_source = build_frame_source(&cfg.camera).context("failed to set up camera")?;
    info!("frame source: {}", frame_source.describe());

    let state = AppState::new(cfg.preview_settings(), cli.permission_provider(), frame_source);

    // ── Permission ────────────────────────────────────────────────────────────
    if !acquire_permission(&state, cli.permission).await {
        info!("Shot Tracker stopped");
        return Ok(());
    }

    // ── Overlay pump ──────────────────────────────────────────────────────────
    let mut updates = state.counter.subscribe();
    let overlay = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let stats = updates.borrow_and_update().stats();
            println!("{}\n", render_overlay(&stats));
        }
    });

    info!("Shot Tracker ready.  Press Ctrl-C to exit.");
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl-C: {e}");
    }
    info!("shutdown signal received");

    close_preview(Arc::clone(&state)).await;
    overlay.abort();

    let stats = state.counter.stats();
    info!(
        shots = stats.shots,
        makes = stats.makes,
        percentage = stats.percentage,
        "Shot Tracker stopped"
    );
    Ok(())
}

/// Requests permission until it is granted.
///
/// Returns `false` if the user quit with Ctrl-C first.  A fixed denial never
/// changes, so in `deny` mode this only waits for Ctrl-C.
async fn acquire_permission(state: &Arc<AppState>, mode: PermissionMode) -> bool {
    loop {
        let screen = tokio::select! {
            result = request_permission(Arc::clone(state)) => result.data,
            _ = tokio::signal::ctrl_c() => return false,
        };

        match screen {
            Some(screen @ ScreenDto::Preview { .. }) => {
                println!("{}\n", render_screen(&screen));
                return true;
            }
            Some(screen) => println!("{}", render_screen(&screen)),
            None => {}
        }

        if mode == PermissionMode::Deny {
            warn!("camera permission denied; press Ctrl-C to exit");
            let _ = tokio::signal::ctrl_c().await;
            return false;
        }

        tokio::select! {
            _ = tokio::time::sleep(PERMISSION_RETRY_DELAY) => {}
            _ = tokio::signal::ctrl_c() => return false,
        }
    }
}
