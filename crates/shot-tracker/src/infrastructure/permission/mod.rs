//! Camera permission providers.
//!
//! A desktop terminal has no OS-level camera permission dialog, so the binary
//! asks on stdin.  Headless runs use a [`FixedPermission`] chosen on the
//! command line; tests use [`mock::ScriptedPermission`].

use std::io::{self, BufRead, Write};
use std::thread;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::warn;

use crate::application::permission::{CameraPermission, PermissionStatus};

pub mod mock;

/// Asks the user on the terminal: `Allow camera access? [y/N]`.
///
/// Anything other than `y`/`yes` (case-insensitive), including EOF and read
/// errors, is a denial.
///
/// The answer is read on a detached `permission-prompt` thread, not on the
/// runtime's blocking pool: a read that is still pending when the request is
/// cancelled must not hold up runtime shutdown.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPermission;

impl StdinPermission {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CameraPermission for StdinPermission {
    async fn request(&self) -> PermissionStatus {
        if let Err(e) = show_prompt() {
            warn!("could not show permission prompt: {e}");
        }

        read_answer_detached(|| io::stdin().lock()).await
    }
}

fn show_prompt() -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "Allow camera access? [y/N] ")?;
    stdout.flush()
}

/// Reads one answer line from the reader `open` returns, on its own thread.
///
/// Dropping the returned future abandons the thread; it exits on its own once
/// the read completes, or with the process.
async fn read_answer_detached<R, F>(open: F) -> PermissionStatus
where
    F: FnOnce() -> R + Send + 'static,
    R: BufRead,
{
    let (tx, rx) = oneshot::channel();
    let spawned = thread::Builder::new()
        .name("permission-prompt".to_string())
        .spawn(move || {
            let mut line = String::new();
            let answer = open().read_line(&mut line).map(|_| line);
            let _ = tx.send(answer);
        });
    if let Err(e) = spawned {
        warn!("failed to spawn permission prompt thread: {e}");
        return PermissionStatus::Denied;
    }

    match rx.await {
        Ok(Ok(line)) => parse_answer(&line),
        Ok(Err(e)) => {
            warn!("could not read permission answer: {e}");
            PermissionStatus::Denied
        }
        Err(_) => {
            warn!("permission prompt thread exited without an answer");
            PermissionStatus::Denied
        }
    }
}

fn parse_answer(line: &str) -> PermissionStatus {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => PermissionStatus::Granted,
        _ => PermissionStatus::Denied,
    }
}

/// Always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedPermission {
    status: PermissionStatus,
}

impl FixedPermission {
    pub fn new(status: PermissionStatus) -> Self {
        Self { status }
    }

    pub fn granted() -> Self {
        Self::new(PermissionStatus::Granted)
    }

    pub fn denied() -> Self {
        Self::new(PermissionStatus::Denied)
    }
}

#[async_trait]
impl CameraPermission for FixedPermission {
    async fn request(&self) -> PermissionStatus {
        self.status
    }
}
