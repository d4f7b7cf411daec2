//! Scripted permission provider for tests.

use std::collections::VecDeque;
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Mutex, PoisonError,
};

use async_trait::async_trait;

use crate::application::permission::{CameraPermission, PermissionStatus};

/// Answers requests from a script, then keeps repeating the last answer.
///
/// An empty script denies every request.  Clones share the same script and
/// request counter, so a test can keep a handle after boxing one into a gate.
#[derive(Debug, Clone)]
pub struct ScriptedPermission {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    script: Mutex<VecDeque<PermissionStatus>>,
    last: Mutex<PermissionStatus>,
    requests: AtomicU32,
}

impl ScriptedPermission {
    pub fn new(script: impl IntoIterator<Item = PermissionStatus>) -> Self {
        Self {
            inner: Arc::new(Inner {
                script: Mutex::new(script.into_iter().collect()),
                last: Mutex::new(PermissionStatus::Denied),
                requests: AtomicU32::new(0),
            }),
        }
    }

    /// Number of requests answered so far.
    pub fn requests(&self) -> u32 {
        self.inner.requests.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CameraPermission for ScriptedPermission {
    async fn request(&self) -> PermissionStatus {
        self.inner.requests.fetch_add(1, Ordering::Relaxed);
        let next = self
            .inner
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let mut last = self.inner.last.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(status) = next {
            *last = status;
        }
        *last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_permission_follows_script_then_repeats_last() {
        // Arrange
        let provider = ScriptedPermission::new([PermissionStatus::Denied, PermissionStatus::Granted]);

        // Act
        let answers = [
            provider.request().await,
            provider.request().await,
            provider.request().await,
        ];

        // Assert
        assert_eq!(
            answers,
            [PermissionStatus::Denied, PermissionStatus::Granted, PermissionStatus::Granted]
        );
        assert_eq!(provider.requests(), 3);
    }

    #[tokio::test]
    async fn test_empty_script_denies() {
        let provider = ScriptedPermission::new([]);
        assert_eq!(provider.request().await, PermissionStatus::Denied);
    }

    #[tokio::test]
    async fn test_clones_share_request_count() {
        let provider = ScriptedPermission::new([PermissionStatus::Granted]);
        let handle = provider.clone();
        provider.request().await;
        assert_eq!(handle.requests(), 1);
    }
}
