//! Main egui application - the menu popup

use eframe::egui::{self, Align, Layout, RichText, Rounding, Stroke};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::theme::{FontSize, Theme, CORNER_RADIUS, PANEL_SIZE};
use super::widgets::{button_pair, filled_button, toggle_switch};
use crate::credentials::KeyringCredentialStore;
use crate::host::DesktopHost;
use crate::logging::LogBuffer;
use crate::login::{KeyringLogin, LoginFlow, LoginForm};
use crate::panel::{Collaborators, LinkButton, MenuPanel, PanelView};
use crate::settings::FileSettingsStore;
use crate::tray::{TrayManager, TrayMenuAction};
use crate::vpn::{ConnectionStatus, TunnelServiceController, VpnController};

/// How often the tunnel status file is re-read
const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Button presses collected while drawing, applied afterwards
#[derive(Debug, Clone, Copy, PartialEq)]
enum PanelAction {
    Account,
    ToggleOpenOnStartup,
    Link(LinkButton),
    Support,
    Quit,
    SubmitLogin,
    DismissLogin,
}

pub struct LockdownApp {
    panel: MenuPanel,
    login_flow: Box<dyn LoginFlow>,
    login_form: LoginForm,
    vpn: Rc<dyn VpnController>,
    tray_manager: Option<TrayManager>,
    quit_requested: Arc<AtomicBool>,
    status: ConnectionStatus,
    last_status_poll: Instant,
}

impl LockdownApp {
    fn new(log_buffer: LogBuffer) -> anyhow::Result<Self> {
        let credentials = Rc::new(KeyringCredentialStore::new()?);
        let vpn: Rc<dyn VpnController> = Rc::new(TunnelServiceController::new()?);
        let host = DesktopHost::new();
        let quit_requested = host.quit_flag();

        let collaborators = Collaborators {
            credentials: credentials.clone(),
            vpn: Rc::clone(&vpn),
            settings: Rc::new(FileSettingsStore::new()?),
            logs: Rc::new(log_buffer),
            host: Rc::new(host),
        };

        // Initialize system tray
        let tray_manager = match TrayManager::new() {
            Ok(tm) => Some(tm),
            Err(e) => {
                tracing::warn!("Failed to create tray manager: {}", e);
                None
            }
        };

        let status = vpn.current_status();
        tracing::info!("Menu opened, tunnel status: {}", status);

        Ok(Self {
            panel: MenuPanel::new(collaborators),
            login_flow: Box::new(KeyringLogin::new(credentials)),
            login_form: LoginForm::default(),
            vpn,
            tray_manager,
            quit_requested,
            status,
            last_status_poll: Instant::now(),
        })
    }

    fn poll_status(&mut self, now: Instant) {
        if now.duration_since(self.last_status_poll) < STATUS_POLL_INTERVAL {
            return;
        }
        self.last_status_poll = now;

        let status = self.vpn.current_status();
        if status != self.status {
            tracing::debug!("Tunnel status changed: {} -> {}", self.status, status);
            self.status = status;
        }
        if let Some(ref mut tray) = self.tray_manager {
            tray.update_status(status);
        }
    }

    fn apply(&mut self, action: PanelAction) {
        match action {
            PanelAction::Account => self.panel.press_account_button(),
            PanelAction::ToggleOpenOnStartup => self.panel.toggle_open_on_startup(),
            PanelAction::Link(link) => self.panel.open_link(link),
            PanelAction::Support => self.panel.contact_support(),
            PanelAction::Quit => self.panel.quit(),
            PanelAction::SubmitLogin => {
                if self.login_form.submit(self.login_flow.as_ref()).is_some() {
                    self.panel.login_succeeded();
                }
            }
            PanelAction::DismissLogin => {
                self.login_form.reset();
                self.panel.dismiss_login_popover();
            }
        }
        tracing::debug!("{:?} -> {:?}", action, self.panel.state());
    }
}

fn draw_identity_row(ui: &mut egui::Ui, view: &PanelView, actions: &mut Vec<PanelAction>) {
    egui::Frame::none()
        .fill(Theme::MAIN_BACKGROUND)
        .rounding(Rounding::same(CORNER_RADIUS))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                let label_width = ui.available_width() - 82.0;
                ui.allocate_ui_with_layout(
                    egui::Vec2::new(label_width, 28.0),
                    Layout::top_down(Align::Center),
                    |ui| {
                        ui.label(
                            RichText::new(&view.identity)
                                .size(FontSize::SUBTITLE2)
                                .color(Theme::TEXT_PRIMARY),
                        );
                    },
                );

                ui.add_space(6.0);
                ui.allocate_ui(egui::Vec2::new(70.0, 46.0), |ui| {
                    ui.add_space(8.0);
                    let clicked = ui
                        .add(
                            egui::Button::new(
                                RichText::new(view.account_button_label())
                                    .size(FontSize::SUBTITLE)
                                    .color(Theme::BUTTON_TEXT),
                            )
                            .fill(Theme::CONFIRMED_BLUE)
                            .stroke(Stroke::NONE)
                            .rounding(Rounding::same(CORNER_RADIUS))
                            .min_size(egui::Vec2::new(70.0, 30.0)),
                        )
                        .clicked();
                    if clicked {
                        actions.push(PanelAction::Account);
                    }
                });
            });
        });
}

fn draw_toggle_row(ui: &mut egui::Ui, view: &PanelView, actions: &mut Vec<PanelAction>) {
    egui::Frame::none()
        .fill(Theme::MAIN_BACKGROUND)
        .rounding(Rounding::same(CORNER_RADIUS))
        .inner_margin(egui::Margin::symmetric(16.0, 5.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new("Launch On Login").size(FontSize::SUBTITLE2));
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if toggle_switch(ui, view.open_on_startup) {
                        actions.push(PanelAction::ToggleOpenOnStartup);
                    }
                });
            });
        });
}

fn draw_login_popover(ctx: &egui::Context, form: &mut LoginForm, actions: &mut Vec<PanelAction>) {
    let mut open = true;
    egui::Window::new("Sign In")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            ui.label(RichText::new("Email").size(FontSize::SUBTITLE2));
            ui.add(egui::TextEdit::singleline(&mut form.email).hint_text("you@example.com"));
            ui.label(RichText::new("Password").size(FontSize::SUBTITLE2));
            let password = ui.add(egui::TextEdit::singleline(&mut form.password).password(true));

            if let Some(ref error) = form.error {
                ui.label(RichText::new(error).size(FontSize::SMALL).color(Theme::ERROR));
            }

            ui.add_space(6.0);
            let enter = password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            ui.add_enabled_ui(form.can_submit(), |ui| {
                if filled_button(ui, "Sign In", Theme::CONFIRMED_BLUE, 30.0) || (enter && form.can_submit()) {
                    actions.push(PanelAction::SubmitLogin);
                }
            });
        });

    if !open {
        actions.push(PanelAction::DismissLogin);
    }
}

impl eframe::App for LockdownApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.panel.run_due(now);
        self.poll_status(now);

        if let Some(ref tray) = self.tray_manager {
            if let Some(action) = tray.check_events() {
                match action {
                    TrayMenuAction::Quit => self.panel.quit(),
                    TrayMenuAction::Open => {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Visible(true));
                        ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
                    }
                }
            }
        }

        if self.quit_requested.load(Ordering::SeqCst) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        // Wake up for the next deferred refresh, otherwise poll at a relaxed rate
        let wake = self
            .panel
            .next_due()
            .map(|due| due.saturating_duration_since(now))
            .unwrap_or(STATUS_POLL_INTERVAL)
            .min(STATUS_POLL_INTERVAL);
        ctx.request_repaint_after(wake);

        let view = self.panel.view().clone();
        let mut actions = Vec::new();

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Theme::BG_PRIMARY).inner_margin(10.0))
            .show(ctx, |ui| {
                ui.spacing_mut().item_spacing = egui::Vec2::new(8.0, 8.0);

                draw_identity_row(ui, &view, &mut actions);
                ui.visuals_mut().widgets.noninteractive.bg_stroke = Stroke::new(1.0, Theme::SEPARATOR);
                ui.separator();
                draw_toggle_row(ui, &view, &mut actions);

                let (privacy, website) = button_pair(
                    ui,
                    LinkButton::PrivacyPolicy.label(),
                    LinkButton::Website.label(),
                );
                if privacy {
                    actions.push(PanelAction::Link(LinkButton::PrivacyPolicy));
                }
                if website {
                    actions.push(PanelAction::Link(LinkButton::Website));
                }

                let (faq, support) = button_pair(ui, LinkButton::Faq.label(), "Support");
                if faq {
                    actions.push(PanelAction::Link(LinkButton::Faq));
                }
                if support {
                    actions.push(PanelAction::Support);
                }

                if filled_button(ui, "Quit", Theme::GRAY_BUTTON, 40.0) {
                    actions.push(PanelAction::Quit);
                }

                ui.with_layout(Layout::right_to_left(Align::Min), |ui| {
                    ui.label(
                        RichText::new(&view.version)
                            .size(FontSize::SMALL)
                            .color(Theme::TEXT_MUTED),
                    );
                });
            });

        if view.show_email_login {
            draw_login_popover(ctx, &mut self.login_form, &mut actions);
        }

        for action in actions {
            self.apply(action);
        }
    }
}

/// Run the application
pub fn run(log_buffer: LogBuffer) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(PANEL_SIZE)
            .with_resizable(false)
            .with_decorations(true)
            .with_always_on_top()
            .with_title("Lockdown"),
        persist_window: false,
        ..Default::default()
    };

    eframe::run_native(
        "Lockdown",
        options,
        Box::new(move |_cc| Ok(Box::new(LockdownApp::new(log_buffer)?))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {}", e))?;

    Ok(())
}
