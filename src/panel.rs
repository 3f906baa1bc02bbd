//! Menu panel state machine
//!
//! Holds the popup's transient state and dispatches button presses to the
//! injected collaborators. Rendering is a pure function of the session, the
//! launch-on-login preference and the transient state; the rendered
//! [`PanelView`] is rebuilt after every transient state write.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::credentials::CredentialStore;
use crate::host::Host;
use crate::logging::LogSource;
use crate::settings::SettingsStore;
use crate::support;
use crate::vpn::{ConnectionStatus, VpnController};

pub const NOT_SIGNED_IN_PROMPT: &str = "Not Signed In\nSign Up With Lockdown iOS";

/// Delay before the identity row picks up a sign-out
pub const SIGN_OUT_REFRESH_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    LoggedOutIdle,
    LoggedInIdle,
    LoginPopoverOpen,
}

/// Static pages linked from the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkButton {
    PrivacyPolicy,
    Website,
    Faq,
}

impl LinkButton {
    pub fn url(&self) -> &'static str {
        match self {
            LinkButton::PrivacyPolicy => "https://lockdownhq.com/privacy",
            LinkButton::Website => "https://lockdownhq.com",
            LinkButton::Faq => "https://lockdownhq.com/faq",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LinkButton::PrivacyPolicy => "Privacy Policy",
            LinkButton::Website => "Website",
            LinkButton::Faq => "FAQs",
        }
    }

    fn log_name(&self) -> &'static str {
        match self {
            LinkButton::PrivacyPolicy => "privacy",
            LinkButton::Website => "website",
            LinkButton::Faq => "faq",
        }
    }
}

/// Services the panel talks to
#[derive(Clone)]
pub struct Collaborators {
    pub credentials: Rc<dyn CredentialStore>,
    pub vpn: Rc<dyn VpnController>,
    pub settings: Rc<dyn SettingsStore>,
    pub logs: Rc<dyn LogSource>,
    pub host: Rc<dyn Host>,
}

/// Everything the popup draws
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub identity: String,
    pub signed_in: bool,
    pub open_on_startup: bool,
    pub show_email_login: bool,
    pub version: String,
}

impl PanelView {
    pub fn account_button_label(&self) -> &'static str {
        if self.signed_in {
            "Sign Out"
        } else {
            "Sign In"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    RefreshIdentity,
}

/// Single-shot callbacks run from the UI loop in arrival order
#[derive(Debug, Default)]
struct DeferredQueue {
    pending: VecDeque<(Instant, Deferred)>,
}

impl DeferredQueue {
    fn schedule(&mut self, due: Instant, action: Deferred) {
        self.pending.push_back((due, action));
    }

    fn take_due(&mut self, now: Instant) -> Vec<Deferred> {
        let mut due = Vec::new();
        self.pending.retain(|&(at, action)| {
            if at <= now {
                due.push(action);
                false
            } else {
                true
            }
        });
        due
    }

    fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|&(at, _)| at).min()
    }
}

/// Disconnect the tunnel if it is up, then drop the stored session
pub fn sign_out(credentials: &dyn CredentialStore, vpn: &dyn VpnController) {
    if vpn.current_status() == ConnectionStatus::Connected {
        vpn.set_enabled(false);
    }
    credentials.clear_session();
    tracing::info!("Signed out");
}

pub struct MenuPanel {
    collaborators: Collaborators,
    show_email_login: bool,
    refresh_counter: u64,
    deferred: DeferredQueue,
    temp_root: PathBuf,
    view: PanelView,
}

impl MenuPanel {
    pub fn new(collaborators: Collaborators) -> Self {
        let view = Self::render(&collaborators, false);
        Self {
            collaborators,
            show_email_login: false,
            refresh_counter: 0,
            deferred: DeferredQueue::default(),
            temp_root: std::env::temp_dir(),
            view,
        }
    }

    /// Write support bundles somewhere other than the system temp directory
    pub fn with_temp_root(mut self, root: PathBuf) -> Self {
        self.temp_root = root;
        self
    }

    fn render(collaborators: &Collaborators, show_email_login: bool) -> PanelView {
        let session = collaborators.credentials.current_session();
        PanelView {
            identity: session
                .as_ref()
                .map(|s| s.email.clone())
                .unwrap_or_else(|| NOT_SIGNED_IN_PROMPT.to_string()),
            signed_in: session.is_some(),
            open_on_startup: collaborators.settings.open_on_startup(),
            show_email_login,
            version: format!("v{}", collaborators.host.app_version()),
        }
    }

    fn rerender(&mut self) {
        self.view = Self::render(&self.collaborators, self.show_email_login);
    }

    pub fn view(&self) -> &PanelView {
        &self.view
    }

    pub fn state(&self) -> PanelState {
        if self.show_email_login {
            PanelState::LoginPopoverOpen
        } else if self.view.signed_in {
            PanelState::LoggedInIdle
        } else {
            PanelState::LoggedOutIdle
        }
    }

    #[cfg(test)]
    pub fn refresh_counter(&self) -> u64 {
        self.refresh_counter
    }

    fn bump_refresh(&mut self) {
        self.refresh_counter += 1;
        self.rerender();
    }

    /// Sign In / Sign Out
    pub fn press_account_button(&mut self) {
        if self.collaborators.credentials.current_session().is_some() {
            sign_out(
                self.collaborators.credentials.as_ref(),
                self.collaborators.vpn.as_ref(),
            );
            self.deferred
                .schedule(Instant::now() + SIGN_OUT_REFRESH_DELAY, Deferred::RefreshIdentity);
        } else {
            self.show_email_login = true;
            self.rerender();
        }
    }

    /// Called by the login popover once a session exists
    pub fn login_succeeded(&mut self) {
        tracing::info!("success callback");
        self.show_email_login = false;
        self.bump_refresh();
    }

    /// Popover closed without signing in
    pub fn dismiss_login_popover(&mut self) {
        if self.show_email_login {
            self.show_email_login = false;
            self.rerender();
        }
    }

    pub fn toggle_open_on_startup(&mut self) {
        let settings = &self.collaborators.settings;
        settings.set_open_on_startup(!settings.open_on_startup());
        self.rerender();
    }

    pub fn open_link(&self, link: LinkButton) {
        if self.collaborators.host.open_url(link.url()) {
            tracing::info!("{} opened", link.log_name());
        } else {
            tracing::warn!("Failed to open {}", link.url());
        }
    }

    pub fn contact_support(&self) {
        let draft = support::support_draft(self.collaborators.logs.as_ref(), &self.temp_root);
        tracing::info!("Composing support email with {} attachment(s)", draft.attachments.len());
        self.collaborators.host.compose_email(&draft);
    }

    pub fn quit(&self) {
        self.collaborators.host.terminate_application();
    }

    /// Run deferred callbacks that are due at `now`
    pub fn run_due(&mut self, now: Instant) {
        for action in self.deferred.take_due(now) {
            match action {
                Deferred::RefreshIdentity => self.bump_refresh(),
            }
        }
    }

    /// When the UI loop should wake up next for a deferred callback
    pub fn next_due(&self) -> Option<Instant> {
        self.deferred.next_due()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Session;
    use crate::support::EmailDraft;
    use std::cell::{Cell, RefCell};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        SetEnabled(bool),
        ClearSession,
        SetOpenOnStartup(bool),
        OpenUrl(String),
        Compose(EmailDraft),
        Terminate,
    }

    type CallLog = Rc<RefCell<Vec<Call>>>;

    struct FakeCredentials {
        session: RefCell<Option<Session>>,
        calls: CallLog,
    }

    impl CredentialStore for FakeCredentials {
        fn current_session(&self) -> Option<Session> {
            self.session.borrow().clone()
        }

        fn clear_session(&self) {
            self.calls.borrow_mut().push(Call::ClearSession);
            *self.session.borrow_mut() = None;
        }
    }

    struct FakeVpn {
        status: Cell<ConnectionStatus>,
        calls: CallLog,
    }

    impl VpnController for FakeVpn {
        fn current_status(&self) -> ConnectionStatus {
            self.status.get()
        }

        fn set_enabled(&self, enabled: bool) {
            self.calls.borrow_mut().push(Call::SetEnabled(enabled));
            if !enabled {
                self.status.set(ConnectionStatus::Disconnected);
            }
        }
    }

    struct FakeSettings {
        open_on_startup: Cell<bool>,
        calls: CallLog,
    }

    impl SettingsStore for FakeSettings {
        fn open_on_startup(&self) -> bool {
            self.open_on_startup.get()
        }

        fn set_open_on_startup(&self, enabled: bool) {
            self.calls.borrow_mut().push(Call::SetOpenOnStartup(enabled));
            self.open_on_startup.set(enabled);
        }
    }

    struct FakeLogs(Vec<Vec<u8>>);

    impl LogSource for FakeLogs {
        fn all_entries(&self) -> Vec<Vec<u8>> {
            self.0.clone()
        }
    }

    struct FakeHost {
        open_succeeds: bool,
        calls: CallLog,
    }

    impl Host for FakeHost {
        fn open_url(&self, url: &str) -> bool {
            self.calls.borrow_mut().push(Call::OpenUrl(url.to_string()));
            self.open_succeeds
        }

        fn compose_email(&self, draft: &EmailDraft) {
            self.calls.borrow_mut().push(Call::Compose(draft.clone()));
        }

        fn terminate_application(&self) {
            self.calls.borrow_mut().push(Call::Terminate);
        }

        fn app_version(&self) -> String {
            "1.2.3".to_string()
        }
    }

    struct Harness {
        panel: MenuPanel,
        calls: CallLog,
        credentials: Rc<FakeCredentials>,
        _temp: tempfile::TempDir,
    }

    fn harness(session: Option<&str>, status: ConnectionStatus, logs: Vec<Vec<u8>>) -> Harness {
        let calls: CallLog = Rc::new(RefCell::new(Vec::new()));
        let credentials = Rc::new(FakeCredentials {
            session: RefCell::new(session.map(Session::new)),
            calls: Rc::clone(&calls),
        });
        let collaborators = Collaborators {
            credentials: credentials.clone(),
            vpn: Rc::new(FakeVpn {
                status: Cell::new(status),
                calls: Rc::clone(&calls),
            }),
            settings: Rc::new(FakeSettings {
                open_on_startup: Cell::new(false),
                calls: Rc::clone(&calls),
            }),
            logs: Rc::new(FakeLogs(logs)),
            host: Rc::new(FakeHost {
                open_succeeds: true,
                calls: Rc::clone(&calls),
            }),
        };
        let temp = tempfile::tempdir().unwrap();
        let panel = MenuPanel::new(collaborators).with_temp_root(temp.path().to_path_buf());
        Harness {
            panel,
            calls,
            credentials,
            _temp: temp,
        }
    }

    fn after_delay() -> Instant {
        Instant::now() + SIGN_OUT_REFRESH_DELAY
    }

    #[test]
    fn test_identity_label_follows_session() {
        let h = harness(Some("user@example.com"), ConnectionStatus::Disconnected, Vec::new());
        assert_eq!(h.panel.view().identity, "user@example.com");
        assert_eq!(h.panel.view().account_button_label(), "Sign Out");
        assert_eq!(h.panel.state(), PanelState::LoggedInIdle);

        let h = harness(None, ConnectionStatus::Disconnected, Vec::new());
        assert_eq!(h.panel.view().identity, NOT_SIGNED_IN_PROMPT);
        assert_eq!(h.panel.view().account_button_label(), "Sign In");
        assert_eq!(h.panel.state(), PanelState::LoggedOutIdle);
    }

    #[test]
    fn test_version_footer() {
        let h = harness(None, ConnectionStatus::Disconnected, Vec::new());
        assert_eq!(h.panel.view().version, "v1.2.3");
    }

    #[test]
    fn test_sign_out_while_connected_disables_vpn_first() {
        let mut h = harness(Some("user@example.com"), ConnectionStatus::Connected, Vec::new());

        h.panel.press_account_button();

        assert_eq!(
            *h.calls.borrow(),
            vec![Call::SetEnabled(false), Call::ClearSession]
        );
        assert!(h.credentials.current_session().is_none());
    }

    #[test]
    fn test_sign_out_while_disconnected_leaves_vpn_alone() {
        let mut h = harness(Some("user@example.com"), ConnectionStatus::Disconnected, Vec::new());

        h.panel.press_account_button();

        assert_eq!(*h.calls.borrow(), vec![Call::ClearSession]);
    }

    #[test]
    fn test_sign_out_label_updates_after_delay() {
        let mut h = harness(Some("user@example.com"), ConnectionStatus::Connected, Vec::new());

        h.panel.press_account_button();
        assert_eq!(h.panel.refresh_counter(), 0);
        assert_eq!(h.panel.view().identity, "user@example.com");
        assert!(h.panel.next_due().is_some());

        h.panel.run_due(after_delay());

        assert_eq!(h.panel.refresh_counter(), 1);
        assert_eq!(h.panel.view().identity, NOT_SIGNED_IN_PROMPT);
        assert_eq!(h.panel.state(), PanelState::LoggedOutIdle);
        assert!(h.panel.next_due().is_none());

        // Nothing left to fire
        h.panel.run_due(after_delay());
        assert_eq!(h.panel.refresh_counter(), 1);
    }

    #[test]
    fn test_refresh_does_not_fire_early() {
        let mut h = harness(Some("user@example.com"), ConnectionStatus::Disconnected, Vec::new());
        let pressed_at = Instant::now();

        h.panel.press_account_button();
        h.panel.run_due(pressed_at);

        assert_eq!(h.panel.refresh_counter(), 0);
        assert!(h.panel.next_due().is_some());
    }

    #[test]
    fn test_sign_in_opens_popover_without_calls() {
        let mut h = harness(None, ConnectionStatus::Connected, Vec::new());

        h.panel.press_account_button();

        assert!(h.calls.borrow().is_empty());
        assert_eq!(h.panel.state(), PanelState::LoginPopoverOpen);
        assert!(h.panel.view().show_email_login);
        assert!(h.panel.next_due().is_none());
    }

    #[test]
    fn test_login_success_closes_popover_and_refreshes() {
        let mut h = harness(None, ConnectionStatus::Disconnected, Vec::new());
        h.panel.press_account_button();

        *h.credentials.session.borrow_mut() = Some(Session::new("new@example.com"));
        h.panel.login_succeeded();

        assert_eq!(h.panel.refresh_counter(), 1);
        assert_eq!(h.panel.state(), PanelState::LoggedInIdle);
        assert_eq!(h.panel.view().identity, "new@example.com");
    }

    #[test]
    fn test_dismiss_popover_returns_to_logged_out() {
        let mut h = harness(None, ConnectionStatus::Disconnected, Vec::new());
        h.panel.press_account_button();
        h.panel.dismiss_login_popover();

        assert_eq!(h.panel.state(), PanelState::LoggedOutIdle);
        assert_eq!(h.panel.refresh_counter(), 0);
    }

    #[test]
    fn test_toggle_twice_restores_preference() {
        let mut h = harness(None, ConnectionStatus::Disconnected, Vec::new());
        let state_before = h.panel.state();

        h.panel.toggle_open_on_startup();
        assert!(h.panel.view().open_on_startup);
        h.panel.toggle_open_on_startup();
        assert!(!h.panel.view().open_on_startup);

        assert_eq!(
            *h.calls.borrow(),
            vec![Call::SetOpenOnStartup(true), Call::SetOpenOnStartup(false)]
        );
        assert_eq!(h.panel.state(), state_before);
    }

    #[test]
    fn test_links_open_fixed_urls() {
        let h = harness(None, ConnectionStatus::Disconnected, Vec::new());

        h.panel.open_link(LinkButton::PrivacyPolicy);
        h.panel.open_link(LinkButton::Website);
        h.panel.open_link(LinkButton::Faq);

        assert_eq!(
            *h.calls.borrow(),
            vec![
                Call::OpenUrl("https://lockdownhq.com/privacy".to_string()),
                Call::OpenUrl("https://lockdownhq.com".to_string()),
                Call::OpenUrl("https://lockdownhq.com/faq".to_string()),
            ]
        );
        assert_eq!(h.panel.state(), PanelState::LoggedOutIdle);
    }

    #[test]
    fn test_failed_link_is_ignored() {
        let calls: CallLog = Rc::new(RefCell::new(Vec::new()));
        let h = harness(None, ConnectionStatus::Disconnected, Vec::new());
        let mut collaborators = h.panel.collaborators.clone();
        collaborators.host = Rc::new(FakeHost {
            open_succeeds: false,
            calls: Rc::clone(&calls),
        });
        let panel = MenuPanel::new(collaborators);

        panel.open_link(LinkButton::Faq);

        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(panel.state(), PanelState::LoggedOutIdle);
    }

    #[test]
    fn test_support_with_logs_attaches_bundle() {
        let h = harness(
            Some("user@example.com"),
            ConnectionStatus::Disconnected,
            vec![b"first\n".to_vec(), b"second\n".to_vec()],
        );

        h.panel.contact_support();

        let calls = h.calls.borrow();
        assert_eq!(calls.len(), 1);
        let Call::Compose(draft) = &calls[0] else {
            panic!("expected compose call, got {:?}", calls[0]);
        };
        assert_eq!(draft.recipients, vec![support::SUPPORT_ADDRESS.to_string()]);
        assert_eq!(draft.attachments.len(), 1);
        assert_eq!(std::fs::read(&draft.attachments[0]).unwrap(), b"first\nsecond\n");
    }

    #[test]
    fn test_support_with_empty_logs_still_composes() {
        let h = harness(None, ConnectionStatus::Disconnected, Vec::new());

        h.panel.contact_support();

        let calls = h.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!(matches!(&calls[0], Call::Compose(draft) if draft.attachments.is_empty()));
    }

    #[test]
    fn test_quit_terminates_host() {
        let h = harness(None, ConnectionStatus::Disconnected, Vec::new());
        h.panel.quit();
        assert_eq!(*h.calls.borrow(), vec![Call::Terminate]);
    }

    #[test]
    fn test_example_scenario() {
        let mut h = harness(Some("user@example.com"), ConnectionStatus::Connected, Vec::new());

        h.panel.press_account_button();
        h.panel.run_due(after_delay());

        let calls = h.calls.borrow();
        assert_eq!(calls.iter().filter(|c| **c == Call::SetEnabled(false)).count(), 1);
        assert_eq!(calls.iter().filter(|c| **c == Call::ClearSession).count(), 1);
        assert_eq!(h.panel.view().identity, NOT_SIGNED_IN_PROMPT);
    }

    #[test]
    fn test_overlapping_sign_outs_each_refresh_once() {
        let mut h = harness(Some("user@example.com"), ConnectionStatus::Disconnected, Vec::new());

        h.panel.press_account_button();
        *h.credentials.session.borrow_mut() = Some(Session::new("again@example.com"));
        h.panel.press_account_button();

        h.panel.run_due(after_delay());
        assert_eq!(h.panel.refresh_counter(), 2);
    }
}
