//! VPN connection control
//!
//! The tunnel itself runs in a separate service process. This module only
//! reads the status that service publishes and writes enable/disable
//! requests back to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Connection status as reported by the tunnel service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// No tunnel configuration, or the service could not be reached
    #[default]
    Invalid,
    Disconnected,
    Connecting,
    Connected,
    Reasserting,
    Disconnecting,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Invalid => "Not Configured",
            ConnectionStatus::Disconnected => "Disconnected",
            ConnectionStatus::Connecting => "Connecting",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Reasserting => "Reconnecting",
            ConnectionStatus::Disconnecting => "Disconnecting",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Handle to the VPN tunnel, as seen by the menu panel
pub trait VpnController {
    /// Current tunnel status
    fn current_status(&self) -> ConnectionStatus;

    /// Ask the tunnel to come up or go down. Does not wait for the result.
    fn set_enabled(&self, enabled: bool);
}

/// Errors talking to the tunnel service
#[derive(Debug, thiserror::Error)]
pub enum TunnelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not determine data directory")]
    PathNotAvailable,
}

#[derive(Debug, Serialize, Deserialize)]
struct TunnelStatusFile {
    status: ConnectionStatus,
}

/// Request written for the tunnel service to pick up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TunnelControlRequest {
    pub enabled: bool,
    pub requested_at: DateTime<Utc>,
}

/// Controller backed by the status/control files shared with the tunnel service
pub struct TunnelServiceController {
    status_path: PathBuf,
    control_path: PathBuf,
}

impl TunnelServiceController {
    const STATUS_FILE: &'static str = "tunnel-status.json";
    const CONTROL_FILE: &'static str = "tunnel-control.json";

    /// Controller using the default data directory
    pub fn new() -> Result<Self, TunnelError> {
        let dir = dirs::data_dir()
            .map(|p| p.join("Lockdown"))
            .ok_or(TunnelError::PathNotAvailable)?;
        Ok(Self::with_dir(dir))
    }

    /// Controller using a custom directory
    pub fn with_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            status_path: dir.join(Self::STATUS_FILE),
            control_path: dir.join(Self::CONTROL_FILE),
        }
    }

    /// Read the published status
    pub fn read_status(&self) -> Result<ConnectionStatus, TunnelError> {
        let data = fs::read_to_string(&self.status_path)?;
        let file: TunnelStatusFile = serde_json::from_str(&data)?;
        Ok(file.status)
    }

    /// Write an enable/disable request
    pub fn write_request(&self, enabled: bool) -> Result<(), TunnelError> {
        if let Some(parent) = self.control_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let request = TunnelControlRequest {
            enabled,
            requested_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&request)?;
        fs::write(&self.control_path, json)?;
        Ok(())
    }

    /// Last request written, if any
    #[cfg(test)]
    pub fn last_request(&self) -> Option<TunnelControlRequest> {
        let data = fs::read_to_string(&self.control_path).ok()?;
        serde_json::from_str(&data).ok()
    }
}

impl VpnController for TunnelServiceController {
    fn current_status(&self) -> ConnectionStatus {
        match self.read_status() {
            Ok(status) => status,
            Err(TunnelError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                ConnectionStatus::Invalid
            }
            Err(e) => {
                tracing::debug!("Failed to read tunnel status: {}", e);
                ConnectionStatus::Invalid
            }
        }
    }

    fn set_enabled(&self, enabled: bool) {
        tracing::info!("Requesting tunnel enabled={}", enabled);
        if let Err(e) = self.write_request(enabled) {
            tracing::warn!("Failed to write tunnel request: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_status_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let controller = TunnelServiceController::with_dir(dir.path());
        assert_eq!(controller.current_status(), ConnectionStatus::Invalid);
    }

    #[test]
    fn test_reads_published_status() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("tunnel-status.json"),
            r#"{ "status": "connected" }"#,
        )
        .unwrap();

        let controller = TunnelServiceController::with_dir(dir.path());
        assert_eq!(controller.current_status(), ConnectionStatus::Connected);
    }

    #[test]
    fn test_garbage_status_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tunnel-status.json"), "not json").unwrap();

        let controller = TunnelServiceController::with_dir(dir.path());
        assert_eq!(controller.current_status(), ConnectionStatus::Invalid);
    }

    #[test]
    fn test_set_enabled_writes_request() {
        let dir = tempfile::tempdir().unwrap();
        let controller = TunnelServiceController::with_dir(dir.path().join("nested"));

        assert!(controller.last_request().is_none());
        controller.set_enabled(false);

        let request = controller.last_request().unwrap();
        assert!(!request.enabled);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(ConnectionStatus::Connected.to_string(), "Connected");
        assert_eq!(ConnectionStatus::Reasserting.label(), "Reconnecting");
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::Invalid);
    }
}
