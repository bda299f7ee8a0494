//! Main GUI application module
//!
//! Contains the GuiApp struct, background job plumbing and the frame loop.

use crate::{
    address_history::{AddressHistory, JsonFileStore},
    balance::{self, BalanceReading},
    config::{self, Config},
    contract::TokenClient,
    notifications::Severity,
    session::Session,
    user_settings::UserSettings,
    wallet::{self, ConnectOutcome},
};
use anyhow::{anyhow, Result};
use eframe::{egui, egui::RichText, App, Frame, NativeOptions};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;
use tokio::runtime::Builder;

use super::async_job::AsyncJob;
use super::helpers::{load_icon, repaint_delay, severity_tag, truncate_chars};
use super::theme::{configure_style, AppTheme};

/// GUI section enum for navigation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuiSection {
    Wallet,
    History,
    Settings,
}

/// Editable copy of the settings shown on the Settings page
pub(crate) struct SettingsForm {
    pub(crate) pending: UserSettings,
    pub(crate) rpc_input: String,
    pub(crate) cli_path_input: String,
}

impl SettingsForm {
    pub(crate) fn from_settings(settings: &UserSettings) -> Self {
        Self {
            pending: settings.clone(),
            rpc_input: settings
                .get_custom_rpc(&settings.selected_network)
                .cloned()
                .unwrap_or_default(),
            cli_path_input: settings.cli_path.clone().unwrap_or_default(),
        }
    }
}

pub struct GuiApp {
    pub(crate) config: Config,
    pub(crate) user_settings: UserSettings,
    pub(crate) theme: AppTheme,
    pub(crate) section: GuiSection,
    pub(crate) session: Session,
    pub(crate) connect_job: Option<AsyncJob<ConnectOutcome>>,
    pub(crate) balance_job: Option<AsyncJob<BalanceReading>>,
    pub(crate) show_notifications_popup: bool,
    pub(crate) settings_form: SettingsForm,
}

impl GuiApp {
    fn new(config: Config, user_settings: UserSettings, ctx: &egui::Context) -> Self {
        let theme = AppTheme::default();
        configure_style(ctx, &theme);

        let store = JsonFileStore::in_app_dir();
        tracing::info!("Address history at {:?}", store.path());
        let history = AddressHistory::load_or_empty(Box::new(store));

        let backup = history.backup().map(|p| p.display().to_string());
        let mut session = Session::new(history, user_settings.notification_ttl());
        if let Some(backup) = backup {
            session.notifications.push(
                Severity::Warning,
                "Address history unreadable",
                format!("Starting with an empty list. The old file was kept at {}", backup),
            );
        }
        session.set_install_hint(user_settings.wallet_backend.install_hint());

        if let Err(e) = config.validate() {
            tracing::warn!("Configuration incomplete: {:#}", e);
        }

        let settings_form = SettingsForm::from_settings(&user_settings);

        Self {
            config,
            user_settings,
            theme,
            section: GuiSection::Wallet,
            session,
            connect_job: None,
            balance_job: None,
            show_notifications_popup: false,
            settings_form,
        }
    }

    pub(crate) fn spawn_job<T, FutBuilder, Fut>(&self, builder: FutBuilder) -> AsyncJob<T>
    where
        T: Send + 'static,
        FutBuilder: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<T>> + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = match Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime.block_on(builder()),
                Err(e) => Err(anyhow::anyhow!("Failed to create async runtime: {}", e)),
            };
            let _ = tx.send(result);
        });
        AsyncJob::new(rx)
    }

    /// Ask the configured wallet for an identity in the background
    pub(crate) fn start_connect(&mut self) {
        if self.connect_job.is_some() {
            return;
        }
        if !self.session.begin_connect() {
            return;
        }
        self.session
            .set_install_hint(self.user_settings.wallet_backend.install_hint());

        let connector = wallet::connector_from_settings(&self.user_settings);
        tracing::info!("Requesting wallet access via {}", connector.name());
        self.connect_job = Some(self.spawn_job(move || async move {
            wallet::request_identity(connector.as_ref()).await
        }));
    }

    /// Query the balance of the connected account in the background.
    /// The busy flag is held by the job and clears when it ends.
    pub(crate) fn start_balance(&mut self) {
        let Some(ticket) = self.session.begin_balance() else {
            return;
        };

        let client = match self
            .config
            .validate()
            .and_then(|_| TokenClient::new(self.config.client_options()).map_err(anyhow::Error::from))
        {
            Ok(client) => client,
            Err(e) => {
                self.session.abort_balance(ticket, e);
                return;
            }
        };

        self.balance_job = Some(self.spawn_job(move || async move {
            let reading = balance::query_balance(&client, ticket.account()).await;
            drop(ticket);
            reading
        }));
    }

    fn poll_jobs(&mut self) {
        let connect_result = self.connect_job.as_mut().and_then(|job| job.poll());
        if let Some(result) = connect_result {
            self.connect_job = None;
            self.session.apply_connect(result);
        }

        let balance_result = self.balance_job.as_mut().and_then(|job| job.poll());
        if let Some(result) = balance_result {
            self.balance_job = None;
            self.session.apply_balance(result);
        }

        self.session.notifications.prune_expired(Instant::now());
    }

    /// Persist the settings form and rebuild the config from it
    pub(crate) fn save_settings(&mut self) {
        let mut pending = self.settings_form.pending.clone();
        let network = pending.selected_network.clone();
        pending.set_custom_rpc(&network, self.settings_form.rpc_input.clone());
        let cli_path = self.settings_form.cli_path_input.trim();
        pending.cli_path = if cli_path.is_empty() {
            None
        } else {
            Some(cli_path.to_string())
        };
        pending.contract_id = pending.contract_id.trim().to_string();
        pending.watch_address = pending.watch_address.trim().to_string();

        self.user_settings = pending;
        self.settings_form = SettingsForm::from_settings(&self.user_settings);
        self.apply_settings();

        match self.user_settings.save() {
            Ok(()) => {
                self.session
                    .notifications
                    .push(Severity::Success, "Settings saved", "Your settings were saved.");
            }
            Err(e) => {
                tracing::error!("Failed to save settings: {:#}", e);
                self.session.notifications.push(
                    Severity::Error,
                    "Settings not saved",
                    format!("Failed to save settings: {}", e),
                );
            }
        }
    }

    /// Rebuild the config and session options from the current settings
    pub(crate) fn apply_settings(&mut self) {
        self.config = Config::from_settings(&self.user_settings);
        self.session.set_notification_ttl(self.user_settings.notification_ttl());
        self.session
            .set_install_hint(self.user_settings.wallet_backend.install_hint());
        tracing::info!(
            "Using {} at {} (contract '{}')",
            self.config.network_label(),
            self.config.rpc_url,
            self.config.contract_id
        );
    }

    pub(crate) fn copy_to_clipboard(&mut self, ui: &mut egui::Ui, text: &str) {
        ui.output_mut(|o| o.copied_text = text.to_string());
        self.session.notifications.push(
            Severity::Info,
            "Copied",
            format!("{} copied to clipboard", crate::utils::short_address(text)),
        );
    }

    pub(crate) fn open_explorer(&mut self, address: &str) {
        let Some(url) = config::account_explorer_url(&self.config.network_passphrase, address) else {
            self.session.notifications.push(
                Severity::Warning,
                "No explorer",
                "There is no block explorer for this network.",
            );
            return;
        };
        if let Err(e) = open::that(&url) {
            self.session.notifications.push(
                Severity::Error,
                "Failed to open URL",
                format!("{}: {}", url, e),
            );
        }
    }

    /// Render a consistent section header
    pub(crate) fn render_section_header(&self, ui: &mut egui::Ui, icon: &str, title: &str) {
        let header_text = self.theme.section_header_text(icon, title);
        let separator = "=".repeat(40);

        ui.label(RichText::new(&separator).size(14.0).color(self.theme.primary));
        ui.label(RichText::new(&header_text).size(24.0).strong().color(self.theme.text_primary));
        ui.label(RichText::new(&separator).size(14.0).color(self.theme.primary));
    }

    fn render_toasts(&mut self, ctx: &egui::Context) {
        let mut dismissed: Vec<u64> = Vec::new();

        egui::Area::new(egui::Id::new("notification_overlay"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -10.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                ui.set_max_width(360.0);
                for notification in self.session.notifications.iter() {
                    let color = self.theme.severity_color(notification.severity);
                    egui::Frame::none()
                        .fill(self.theme.surface)
                        .rounding(6.0)
                        .stroke(egui::Stroke::new(1.5, color))
                        .inner_margin(egui::Margin::symmetric(10.0, 8.0))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label(
                                    RichText::new(severity_tag(notification.severity))
                                        .strong()
                                        .color(color),
                                );
                                ui.vertical(|ui| {
                                    ui.label(RichText::new(&notification.title).strong().color(color));
                                    ui.label(
                                        RichText::new(truncate_chars(&notification.message, 80))
                                            .size(12.0)
                                            .color(self.theme.text_primary),
                                    );
                                });
                                ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                                    if ui
                                        .add(egui::Button::new("x").small().fill(egui::Color32::TRANSPARENT))
                                        .on_hover_text("Dismiss")
                                        .clicked()
                                    {
                                        dismissed.push(notification.id);
                                    }
                                });
                            });
                        });
                    ui.add_space(4.0);
                }

                // History toggle
                let history_count = self.session.notifications.history().len();
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let icon_color = if history_count > 0 {
                        self.theme.accent_blue
                    } else {
                        self.theme.text_secondary
                    };
                    if ui
                        .add(
                            egui::Button::new(RichText::new("[!]").size(14.0).color(icon_color).strong())
                                .fill(self.theme.surface)
                                .stroke(egui::Stroke::new(1.0, self.theme.primary)),
                        )
                        .on_hover_text("Click to view notification history")
                        .clicked()
                    {
                        self.show_notifications_popup = !self.show_notifications_popup;
                    }
                    if history_count > 0 {
                        ui.label(
                            RichText::new(format!("{}", history_count))
                                .size(10.0)
                                .color(self.theme.accent_orange),
                        );
                    }
                });
            });

        for id in dismissed {
            self.session.notifications.remove(id);
        }
    }

    fn render_notification_history(&mut self, ctx: &egui::Context) {
        if !self.show_notifications_popup {
            return;
        }
        egui::Window::new("[#] Notification History")
            .collapsible(false)
            .resizable(true)
            .default_width(450.0)
            .default_height(350.0)
            .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -60.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(format!("{} notifications", self.session.notifications.history().len()))
                            .color(self.theme.text_secondary),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add(self.theme.button_small("[X] Close")).clicked() {
                            self.show_notifications_popup = false;
                        }
                        if ui.add(self.theme.button_small("[C] Clear")).clicked() {
                            self.session.notifications.clear_history();
                        }
                    });
                });
                ui.add_space(self.theme.spacing_xs);
                ui.label(RichText::new("-".repeat(50)).size(10.0).color(self.theme.primary));
                ui.add_space(self.theme.spacing_xs);

                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .max_height(280.0)
                    .show(ui, |ui| {
                        let history = self.session.notifications.history();
                        if history.is_empty() {
                            ui.label(RichText::new("No notifications yet.").color(self.theme.text_secondary));
                        } else {
                            for entry in history.iter().rev() {
                                ui.horizontal(|ui| {
                                    ui.label(
                                        RichText::new(format!("[{}]", entry.time_ago()))
                                            .size(11.0)
                                            .color(self.theme.text_secondary),
                                    );
                                    ui.label(
                                        RichText::new(severity_tag(entry.severity))
                                            .size(11.0)
                                            .color(self.theme.severity_color(entry.severity)),
                                    );
                                    ui.label(RichText::new(&entry.message).size(12.0).color(self.theme.text_primary));
                                });
                                ui.add_space(3.0);
                            }
                        }
                    });
            });
    }

    /// Blocking alert: a backdrop swallows input until the dialog is dismissed
    fn render_alert(&mut self, ctx: &egui::Context) {
        let Some(alert) = self.session.alert().cloned() else {
            return;
        };

        let screen = ctx.screen_rect();
        egui::Area::new(egui::Id::new("alert_backdrop"))
            .order(egui::Order::Foreground)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                ui.allocate_rect(screen, egui::Sense::click_and_drag());
                ui.painter()
                    .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(170));
            });

        let mut dismissed = ctx.input(|i| i.key_pressed(egui::Key::Enter) || i.key_pressed(egui::Key::Escape));

        egui::Area::new(egui::Id::new("alert_dialog"))
            .order(egui::Order::Tooltip)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                self.theme.frame_panel().fill(self.theme.surface).show(ui, |ui| {
                    ui.set_min_width(360.0);
                    ui.set_max_width(480.0);
                    ui.label(RichText::new(&alert.title).size(18.0).strong().color(self.theme.warning));
                    ui.add_space(self.theme.spacing_sm);
                    ui.label(RichText::new(&alert.message).color(self.theme.text_primary));
                    ui.add_space(self.theme.spacing_md);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add(self.theme.button_primary("OK")).clicked() {
                            dismissed = true;
                        }
                    });
                });
            });

        if dismissed {
            self.session.dismiss_alert();
        }
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_jobs();
        let blocked = self.session.alert().is_some();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(10.0);
            ui.horizontal_wrapped(|ui| {
                ui.heading(
                    RichText::new(format!("My {} Token", self.config.token_symbol))
                        .size(26.0)
                        .color(self.theme.primary),
                );
                ui.label(
                    RichText::new(format!("v{}", env!("CARGO_PKG_VERSION")))
                        .size(12.0)
                        .color(self.theme.text_secondary),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let (status_color, status_text) = match self.session.address() {
                        Some(address) => (self.theme.success, crate::utils::short_address(address)),
                        None => (self.theme.text_secondary, "Not connected".to_string()),
                    };
                    ui.label(RichText::new(status_text).size(12.0).color(status_color));
                    ui.label(RichText::new("●").size(14.0).color(status_color));
                    ui.separator();
                    ui.label(
                        RichText::new(self.config.network_label())
                            .size(12.0)
                            .color(self.theme.accent_blue),
                    )
                    .on_hover_text(&self.config.rpc_url);
                });
            });
            ui.add_space(6.0);
        });

        egui::SidePanel::left("nav")
            .resizable(false)
            .default_width(180.0)
            .frame(
                egui::Frame::none()
                    .fill(self.theme.surface)
                    .stroke(egui::Stroke::new(1.0, self.theme.primary)),
            )
            .show(ctx, |ui| {
                ui.add_enabled_ui(!blocked, |ui| {
                    ui.add_space(self.theme.spacing_md);
                    let nav_items = [
                        (GuiSection::Wallet, "[W] Wallet"),
                        (GuiSection::History, "[H] Address History"),
                        (GuiSection::Settings, "[*] Settings"),
                    ];

                    for (section, label) in nav_items {
                        let selected = self.section == section;
                        ui.horizontal(|ui| {
                            if selected {
                                ui.add_space(2.0);
                                let (rect, _) = ui.allocate_exact_size(egui::vec2(3.0, 20.0), egui::Sense::hover());
                                ui.painter().rect_filled(rect, 0.0, self.theme.primary);
                                ui.add_space(4.0);
                            } else {
                                ui.add_space(9.0);
                            }

                            let text_color = if selected {
                                self.theme.text_primary
                            } else {
                                self.theme.text_secondary
                            };
                            if ui
                                .add(
                                    egui::Button::new(RichText::new(label).size(13.0).color(text_color))
                                        .fill(egui::Color32::TRANSPARENT)
                                        .stroke(egui::Stroke::NONE),
                                )
                                .clicked()
                            {
                                self.section = section;
                            }
                        });
                        ui.add_space(self.theme.spacing_xs);
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                ui.add_space(self.theme.spacing_md);
                egui::ScrollArea::vertical().show(ui, |ui| match self.section {
                    GuiSection::Wallet => self.view_wallet(ui),
                    GuiSection::History => self.view_history(ui),
                    GuiSection::Settings => self.view_settings(ui),
                });
            });
        });

        self.render_toasts(ctx);
        self.render_notification_history(ctx);
        self.render_alert(ctx);

        let jobs_running = self.connect_job.is_some() || self.balance_job.is_some();
        let next_expiry = self.session.notifications.next_expiry(Instant::now());
        if let Some(delay) = repaint_delay(next_expiry, jobs_running) {
            ctx.request_repaint_after(delay);
        }
    }
}

pub fn launch(mut config: Config) -> Result<()> {
    let user_settings = UserSettings::load();

    // Saved network wins over the defaults the caller built
    if config::find_network_by_label(&user_settings.selected_network).is_some() {
        config = Config::from_settings(&user_settings);
    } else {
        tracing::warn!(
            "Unknown network '{}' in settings, using {}",
            user_settings.selected_network,
            config.network_label()
        );
    }

    let app_creator = move |cc: &eframe::CreationContext<'_>| {
        Box::new(GuiApp::new(config.clone(), user_settings.clone(), &cc.egui_ctx)) as Box<dyn App>
    };

    let mut viewport = egui::ViewportBuilder::default().with_inner_size([960.0, 640.0]);
    if let Some(icon) = load_icon() {
        viewport = viewport.with_icon(std::sync::Arc::new(icon));
    }

    let native_options = NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native("BDB Wallet", native_options, Box::new(app_creator))
        .map_err(|e| anyhow!("Failed to start GUI: {}", e))
}
