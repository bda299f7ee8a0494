//! Settings view implementation
//!
//! Contains the settings panel rendering including:
//! - Network, RPC and contract configuration
//! - Wallet backend selection
//! - Notification duration

use crate::config::{self, ENV_CONTRACT_ID, ENV_NETWORK_PASSPHRASE, ENV_RPC_URL, NETWORKS};
use crate::gui::app::{GuiApp, SettingsForm};
use crate::notifications::Severity;
use crate::user_settings::UserSettings;
use crate::wallet::WalletBackend;
use eframe::egui::{self, RichText};

impl GuiApp {
    /// Render the settings view
    pub(crate) fn view_settings(&mut self, ui: &mut egui::Ui) {
        self.render_section_header(ui, "[*]", "SETTINGS");
        ui.add_space(self.theme.spacing_md);

        self.render_network_settings(ui);
        ui.add_space(self.theme.spacing_lg);
        self.render_wallet_settings(ui);
        ui.add_space(self.theme.spacing_lg);
        self.render_notification_settings(ui);
        ui.add_space(self.theme.spacing_lg);

        let dirty = self.settings_form.pending != self.user_settings
            || self.settings_form.rpc_input.trim()
                != self
                    .user_settings
                    .get_custom_rpc(&self.settings_form.pending.selected_network)
                    .map(|s| s.as_str())
                    .unwrap_or("")
            || self.settings_form.cli_path_input.trim() != self.user_settings.cli_path.as_deref().unwrap_or("");

        ui.horizontal(|ui| {
            if ui.add_enabled(dirty, self.theme.button_primary("Save Settings")).clicked() {
                self.save_settings();
            }
            if ui.add_enabled(dirty, self.theme.button_secondary("Discard")).clicked() {
                self.settings_form = SettingsForm::from_settings(&self.user_settings);
            }
            if ui.add(self.theme.button_secondary("Reset to Defaults")).clicked() {
                self.settings_form = SettingsForm::from_settings(&UserSettings::default());
                self.session.notifications.push(
                    Severity::Info,
                    "Defaults loaded",
                    "Press Save to keep the default settings.",
                );
            }
            if dirty {
                ui.label(RichText::new("(unsaved changes)").small().color(self.theme.warning));
            }
        });

        ui.add_space(self.theme.spacing_md);
        let settings_path = UserSettings::settings_path_display();
        let mut copy_path = false;
        ui.horizontal(|ui| {
            ui.label(RichText::new("Settings file:").small().color(self.theme.text_secondary));
            ui.label(RichText::new(&settings_path).small().color(self.theme.text_secondary));
            if ui.add(egui::Button::new("[#]").small()).on_hover_text("Copy path").clicked() {
                copy_path = true;
            }
        });
        if copy_path {
            ui.output_mut(|o| o.copied_text = settings_path.clone());
        }
    }

    fn render_network_settings(&mut self, ui: &mut egui::Ui) {
        self.theme.frame_panel().show(ui, |ui| {
            ui.label(RichText::new("Network & Contract").size(18.0).strong().color(self.theme.text_primary));
            ui.add_space(self.theme.spacing_sm);

            // --- Network ---
            ui.group(|ui| {
                ui.label(RichText::new("[~] Network").strong().color(self.theme.accent_blue));
                ui.add_space(self.theme.spacing_xs);

                let mut switched = false;
                egui::ComboBox::from_id_source("settings_network")
                    .selected_text(self.settings_form.pending.selected_network.clone())
                    .show_ui(ui, |ui| {
                        for network in NETWORKS.iter() {
                            let is_selected = network
                                .label
                                .eq_ignore_ascii_case(&self.settings_form.pending.selected_network);
                            if ui.selectable_label(is_selected, network.label).clicked() && !is_selected {
                                self.settings_form.pending.selected_network = network.label.to_string();
                                switched = true;
                            }
                        }
                    });
                if switched {
                    // RPC override is stored per network
                    self.settings_form.rpc_input = self
                        .settings_form
                        .pending
                        .get_custom_rpc(&self.settings_form.pending.selected_network)
                        .cloned()
                        .unwrap_or_default();
                }

                if let Some(network) = config::find_network_by_label(&self.settings_form.pending.selected_network) {
                    ui.label(
                        RichText::new(format!("Passphrase: {}", network.passphrase))
                            .small()
                            .color(self.theme.text_secondary),
                    );
                }
            });

            ui.add_space(self.theme.spacing_md);

            // --- RPC ---
            ui.group(|ui| {
                ui.label(RichText::new("[@] Custom RPC Override").strong().color(self.theme.accent_blue));
                ui.add_space(self.theme.spacing_xs);
                let default_rpc = config::find_network_by_label(&self.settings_form.pending.selected_network)
                    .map(|n| n.default_rpc)
                    .unwrap_or("");
                ui.add(
                    egui::TextEdit::singleline(&mut self.settings_form.rpc_input)
                        .hint_text(default_rpc)
                        .desired_width(420.0),
                );
                ui.label(
                    RichText::new("Leave empty to use the network's default Soroban RPC endpoint.")
                        .small()
                        .color(self.theme.text_secondary),
                );
            });

            ui.add_space(self.theme.spacing_md);

            // --- Contract ---
            ui.group(|ui| {
                ui.label(RichText::new("[$] Token Contract").strong().color(self.theme.accent_blue));
                ui.add_space(self.theme.spacing_xs);
                ui.add(
                    egui::TextEdit::singleline(&mut self.settings_form.pending.contract_id)
                        .hint_text("C...")
                        .desired_width(520.0)
                        .font(egui::TextStyle::Monospace),
                );
                let contract_id = self.settings_form.pending.contract_id.trim();
                if !contract_id.is_empty() && stellar_strkey::Contract::from_string(contract_id).is_err() {
                    ui.label(RichText::new("[!!] Not a valid contract id").small().color(self.theme.warning));
                }
            });

            // Environment always wins; say so when it is in effect
            let overridden: Vec<&str> = [ENV_CONTRACT_ID, ENV_RPC_URL, ENV_NETWORK_PASSPHRASE]
                .into_iter()
                .filter(|key| std::env::var(key).map(|v| !v.trim().is_empty()).unwrap_or(false))
                .collect();
            if !overridden.is_empty() {
                ui.add_space(self.theme.spacing_xs);
                ui.label(
                    RichText::new(format!("Overridden by environment: {}", overridden.join(", ")))
                        .small()
                        .color(self.theme.warning),
                );
            }

            ui.add_space(self.theme.spacing_xs);
            ui.label(
                RichText::new(format!(
                    "Active: {} | {} | {}",
                    self.config.network_label(),
                    self.config.rpc_url,
                    if self.config.contract_id.is_empty() { "no contract" } else { self.config.contract_id.as_str() }
                ))
                .small()
                .color(self.theme.text_secondary),
            );
        });
    }

    fn render_wallet_settings(&mut self, ui: &mut egui::Ui) {
        self.theme.frame_panel().show(ui, |ui| {
            ui.label(RichText::new("Wallet").size(18.0).strong().color(self.theme.text_primary));
            ui.add_space(self.theme.spacing_sm);

            for backend in WalletBackend::ALL {
                ui.radio_value(&mut self.settings_form.pending.wallet_backend, backend, backend.display_name());
                ui.label(RichText::new(backend.description()).small().color(self.theme.text_secondary));
                ui.add_space(self.theme.spacing_xs);
            }

            ui.add_space(self.theme.spacing_sm);
            match self.settings_form.pending.wallet_backend {
                WalletBackend::StellarCli => {
                    egui::Grid::new("cli_wallet_grid")
                        .num_columns(2)
                        .spacing([self.theme.spacing_sm, self.theme.spacing_xs])
                        .show(ui, |ui| {
                            ui.label("Identity:");
                            ui.add(
                                egui::TextEdit::singleline(&mut self.settings_form.pending.cli_identity)
                                    .desired_width(240.0),
                            );
                            ui.end_row();

                            ui.label("stellar path:");
                            ui.add(
                                egui::TextEdit::singleline(&mut self.settings_form.cli_path_input)
                                    .hint_text("stellar (PATH or ~/.cargo/bin)")
                                    .desired_width(360.0),
                            );
                            ui.end_row();
                        });
                }
                WalletBackend::WatchOnly => {
                    ui.label("Watch address:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.settings_form.pending.watch_address)
                            .hint_text("G...")
                            .desired_width(520.0)
                            .font(egui::TextStyle::Monospace),
                    );
                    let address = self.settings_form.pending.watch_address.trim();
                    if !address.is_empty() && !crate::utils::is_valid_account(address) {
                        ui.label(RichText::new("[!!] Not a valid account address").small().color(self.theme.warning));
                    }
                }
            }

            if self.session.is_connected() {
                ui.add_space(self.theme.spacing_xs);
                ui.label(
                    RichText::new("The connected identity stays in use until the app restarts.")
                        .small()
                        .color(self.theme.text_secondary),
                );
            }
        });
    }

    fn render_notification_settings(&mut self, ui: &mut egui::Ui) {
        self.theme.frame_panel().show(ui, |ui| {
            ui.label(RichText::new("Notifications").size(18.0).strong().color(self.theme.text_primary));
            ui.add_space(self.theme.spacing_sm);
            ui.add(
                egui::Slider::new(&mut self.settings_form.pending.notification_ttl_secs, 1..=30)
                    .text("seconds on screen"),
            );
        });
    }
}
