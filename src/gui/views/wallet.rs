//! Wallet view implementation
//!
//! Connect panel before an identity exists; afterwards the connected
//! account, the balance button and the balance card.

use crate::gui::app::GuiApp;
use eframe::egui::{self, RichText};

impl GuiApp {
    pub(crate) fn view_wallet(&mut self, ui: &mut egui::Ui) {
        self.render_section_header(ui, "[W]", "WALLET");
        ui.add_space(self.theme.spacing_md);

        self.render_config_warning(ui);

        match self.session.address().map(str::to_string) {
            None => self.render_connect_panel(ui),
            Some(address) => {
                self.render_account_panel(ui, &address);
                ui.add_space(self.theme.spacing_lg);
                self.render_balance_panel(ui);
            }
        }
    }

    /// Shown while the contract accessor cannot be built from the config
    fn render_config_warning(&self, ui: &mut egui::Ui) {
        if let Err(e) = self.config.validate() {
            egui::Frame::none()
                .fill(egui::Color32::from_rgb(60, 45, 10))
                .rounding(4.0)
                .inner_margin(self.theme.spacing_sm)
                .stroke(egui::Stroke::new(1.0, self.theme.warning))
                .show(ui, |ui| {
                    ui.label(RichText::new(format!("[!!] {}", e)).color(self.theme.warning));
                });
            ui.add_space(self.theme.spacing_md);
        }
    }

    fn render_connect_panel(&mut self, ui: &mut egui::Ui) {
        self.theme.frame_panel().show(ui, |ui| {
            ui.label(
                RichText::new(format!(
                    "Connect your wallet to interact with the {} token",
                    self.config.token_symbol
                ))
                .size(16.0)
                .color(self.theme.text_primary),
            );
            ui.add_space(self.theme.spacing_sm);
            ui.label(
                RichText::new(format!(
                    "Wallet: {}",
                    self.user_settings.wallet_backend.display_name()
                ))
                .small()
                .color(self.theme.text_secondary),
            );
            ui.add_space(self.theme.spacing_md);

            let connecting = self.connect_job.is_some();
            let label = if connecting { "Connecting..." } else { "Connect Wallet" };
            if ui
                .add_enabled(!connecting, self.theme.button_primary(label))
                .clicked()
            {
                self.start_connect();
            }
        });
    }

    fn render_account_panel(&mut self, ui: &mut egui::Ui, address: &str) {
        let mut copy_clicked = false;
        let mut explorer_clicked = false;

        self.theme.frame_surface().show(ui, |ui| {
            ui.label(RichText::new("Connected as").color(self.theme.text_secondary));
            ui.add_space(self.theme.spacing_xs);
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(crate::session::short_address(address))
                        .monospace()
                        .size(16.0)
                        .strong()
                        .color(self.theme.accent_green),
                )
                .on_hover_text(address);
                if ui
                    .add(egui::Button::new("[#]").small())
                    .on_hover_text("Copy address")
                    .clicked()
                {
                    copy_clicked = true;
                }
                if ui
                    .link(RichText::new("View on explorer").color(self.theme.accent_blue))
                    .clicked()
                {
                    explorer_clicked = true;
                }
            });
        });

        if copy_clicked {
            self.copy_to_clipboard(ui, address);
        }
        if explorer_clicked {
            self.open_explorer(address);
        }
    }

    fn render_balance_panel(&mut self, ui: &mut egui::Ui) {
        let busy = self.session.is_busy();
        let label = if busy { "Loading..." } else { "Get Balance" };
        if ui.add_enabled(!busy, self.theme.button_success(label)).clicked() {
            self.start_balance();
        }

        ui.add_space(self.theme.spacing_md);

        self.theme.frame_panel().show(ui, |ui| {
            ui.set_min_width(320.0);
            ui.label(RichText::new("Current balance:").color(self.theme.text_secondary));
            ui.add_space(self.theme.spacing_xs);
            ui.label(
                RichText::new(format!("{} {}", self.session.balance(), self.config.token_symbol))
                    .size(32.0)
                    .strong()
                    .color(self.theme.primary),
            );
        });
    }
}
