//! Support email with attached logs

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::logging::LogSource;

pub const SUPPORT_ADDRESS: &str = "team@lockdownhq.com";
pub const LOG_FILE_NAME: &str = "LockdownLogs.log";
pub const SUPPORT_BODY: &str = "Hey Lockdown Team, \nI have a question, issue, or suggestion - \n\n\n\n\n";

/// Subject line, tagged with the platform the feedback comes from
pub fn support_subject() -> String {
    let platform = match std::env::consts::OS {
        "macos" => "macOS",
        "windows" => "Windows",
        "linux" => "Linux",
        other => other,
    };
    format!("Lockdown Feedback ({})", platform)
}

/// An email ready to be handed to the user's mail client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDraft {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<PathBuf>,
}

/// Concatenate all buffers, in order, into `<root>/<uuid>/LockdownLogs.log`
pub fn write_log_bundle(root: &Path, entries: &[Vec<u8>]) -> io::Result<PathBuf> {
    let dir = root.join(uuid::Uuid::new_v4().to_string());
    fs::create_dir_all(&dir)?;

    let path = dir.join(LOG_FILE_NAME);
    fs::write(&path, entries.concat())?;
    Ok(path)
}

/// Build the support draft, attaching the log bundle when it can be written
///
/// An empty log buffer produces a draft with no attachment.
pub fn support_draft(logs: &dyn LogSource, temp_root: &Path) -> EmailDraft {
    let entries = logs.all_entries();

    let attachments = if entries.is_empty() {
        Vec::new()
    } else {
        match write_log_bundle(temp_root, &entries) {
            Ok(path) => vec![path],
            Err(e) => {
                tracing::warn!("Failed to write log bundle: {}", e);
                Vec::new()
            }
        }
    };

    EmailDraft {
        recipients: vec![SUPPORT_ADDRESS.to_string()],
        subject: support_subject(),
        body: SUPPORT_BODY.to_string(),
        attachments,
    }
}
