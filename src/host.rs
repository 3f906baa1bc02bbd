//! Host environment affordances: browser, mail client, app lifecycle

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use url::form_urlencoded;
use url::Url;

use crate::support::EmailDraft;

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Operations the panel asks of the desktop it runs on
pub trait Host {
    /// Open a URL with the default handler. Returns false if that failed.
    fn open_url(&self, url: &str) -> bool;
    fn compose_email(&self, draft: &EmailDraft);
    fn terminate_application(&self);
    fn app_version(&self) -> String;
}

fn encode_component(value: &str) -> String {
    // mailto wants %20, not the form-encoding '+'
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Build a `mailto:` URL for a draft
///
/// mailto cannot carry files, so attachment paths are listed at the end of
/// the body instead.
pub fn mailto_url(draft: &EmailDraft) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&format!("mailto:{}", draft.recipients.join(",")))?;

    let mut body = draft.body.clone();
    for attachment in &draft.attachments {
        body.push_str(&format!("\nPlease attach: {}\n", attachment.display()));
    }

    url.set_query(Some(&format!(
        "subject={}&body={}",
        encode_component(&draft.subject),
        encode_component(&body)
    )));
    Ok(url)
}

/// Real desktop host
pub struct DesktopHost {
    quit_requested: Arc<AtomicBool>,
}

impl DesktopHost {
    pub fn new() -> Self {
        Self {
            quit_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag raised by [`Host::terminate_application`]; the UI loop watches it
    pub fn quit_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.quit_requested)
    }
}

impl Default for DesktopHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for DesktopHost {
    fn open_url(&self, url: &str) -> bool {
        match open::that(url) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to open {}: {}", url, e);
                false
            }
        }
    }

    fn compose_email(&self, draft: &EmailDraft) {
        match mailto_url(draft) {
            Ok(url) => {
                if let Err(e) = open::that(url.as_str()) {
                    tracing::warn!("Failed to open mail client: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to build mailto URL: {}", e),
        }

        // Show the log bundle so it can be dragged into the message
        for attachment in &draft.attachments {
            if let Some(dir) = attachment.parent() {
                if let Err(e) = open::that(dir) {
                    tracing::debug!("Failed to reveal {}: {}", dir.display(), e);
                }
            }
        }
    }

    fn terminate_application(&self) {
        tracing::info!("Quit requested");
        self.quit_requested.store(true, Ordering::SeqCst);
    }

    fn app_version(&self) -> String {
        APP_VERSION.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn draft(attachments: Vec<PathBuf>) -> EmailDraft {
        EmailDraft {
            recipients: vec!["team@lockdownhq.com".to_string()],
            subject: "Lockdown Feedback (Linux)".to_string(),
            body: "Hey Lockdown Team, \nhi".to_string(),
            attachments,
        }
    }

    #[test]
    fn test_mailto_encodes_subject_and_body() {
        let url = mailto_url(&draft(Vec::new())).unwrap();
        assert_eq!(url.scheme(), "mailto");
        assert_eq!(url.path(), "team@lockdownhq.com");

        let query = url.query().unwrap();
        assert!(query.contains("subject=Lockdown%20Feedback%20%28Linux%29"));
        assert!(query.contains("body=Hey%20Lockdown%20Team%2C%20%0Ahi"));
        assert!(!query.contains('+'));
    }

    #[test]
    fn test_mailto_lists_attachments() {
        let url = mailto_url(&draft(vec![PathBuf::from("/tmp/abc/LockdownLogs.log")])).unwrap();
        assert!(url.query().unwrap().contains("LockdownLogs.log"));
    }

    #[test]
    fn test_terminate_raises_quit_flag() {
        let host = DesktopHost::new();
        let flag = host.quit_flag();
        assert!(!flag.load(Ordering::SeqCst));
        host.terminate_application();
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_app_version_matches_package() {
        assert_eq!(DesktopHost::new().app_version(), env!("CARGO_PKG_VERSION"));
    }
}
