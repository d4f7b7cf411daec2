//! Camera permission gate.
//!
//! The preview may only be shown once the user has granted camera access.
//! Asking is delegated to a [`CameraPermission`] provider (an interactive
//! prompt in the binary, a fixed or scripted answer in tests); the
//! [`PermissionGate`] remembers the outcome and does not ask again once access
//! has been granted.

use async_trait::async_trait;
use tracing::{info, warn};

/// Answer to a single permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Something that can ask the user for camera access.
#[async_trait]
pub trait CameraPermission: Send + Sync {
    /// Asks once and returns the user's answer.
    async fn request(&self) -> PermissionStatus;
}

/// What the gate knows about camera access so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PermissionState {
    #[default]
    NotRequested,
    Granted,
    Denied,
}

/// Remembers whether camera access has been granted.
pub struct PermissionGate {
    provider: Box<dyn CameraPermission>,
    state: PermissionState,
    requests: u32,
}

impl PermissionGate {
    pub fn new(provider: Box<dyn CameraPermission>) -> Self {
        Self {
            provider,
            state: PermissionState::NotRequested,
            requests: 0,
        }
    }

    pub fn state(&self) -> PermissionState {
        self.state
    }

    pub fn is_granted(&self) -> bool {
        self.state == PermissionState::Granted
    }

    /// How many times the provider has been asked.
    pub fn requests(&self) -> u32 {
        self.requests
    }

    /// Requests access unless it is already granted.
    ///
    /// A denial can be retried any number of times; a grant is final.
    pub async fn request(&mut self) -> PermissionStatus {
        if self.is_granted() {
            return PermissionStatus::Granted;
        }

        self.requests += 1;
        let status = self.provider.request().await;
        self.state = match status {
            PermissionStatus::Granted => {
                info!("camera permission granted");
                PermissionState::Granted
            }
            PermissionStatus::Denied => {
                warn!(attempt = self.requests, "camera permission denied");
                PermissionState::Denied
            }
        };
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::permission::mock::ScriptedPermission;
    use crate::infrastructure::permission::FixedPermission;

    #[test]
    fn test_new_gate_has_not_asked() {
        let gate = PermissionGate::new(Box::new(FixedPermission::granted()));
        assert_eq!(gate.state(), PermissionState::NotRequested);
        assert_eq!(gate.requests(), 0);
        assert!(!gate.is_granted());
    }

    #[tokio::test]
    async fn test_grant_is_remembered() {
        // Arrange
        let mut gate = PermissionGate::new(Box::new(ScriptedPermission::new([
            PermissionStatus::Granted,
        ])));

        // Act
        gate.request().await;
        let second = gate.request().await;

        // Assert – the provider was asked only once
        assert_eq!(second, PermissionStatus::Granted);
        assert_eq!(gate.requests(), 1);
        assert!(gate.is_granted());
    }

    #[tokio::test]
    async fn test_denial_can_be_retried() {
        // Arrange
        let mut gate = PermissionGate::new(Box::new(ScriptedPermission::new([
            PermissionStatus::Denied,
            PermissionStatus::Denied,
            PermissionStatus::Granted,
        ])));

        // Act
        let first = gate.request().await;
        let state_after_first = gate.state();
        gate.request().await;
        let third = gate.request().await;

        // Assert
        assert_eq!(first, PermissionStatus::Denied);
        assert_eq!(state_after_first, PermissionState::Denied);
        assert_eq!(third, PermissionStatus::Granted);
        assert_eq!(gate.requests(), 3);
    }

    #[tokio::test]
    async fn test_fixed_denial_stays_denied() {
        let mut gate = PermissionGate::new(Box::new(FixedPermission::denied()));
        for _ in 0..3 {
            assert_eq!(gate.request().await, PermissionStatus::Denied);
        }
        assert_eq!(gate.state(), PermissionState::Denied);
    }
}
