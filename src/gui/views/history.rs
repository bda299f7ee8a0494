//! Address history view
//!
//! Table of every address that has connected, with copy and export.

use crate::gui::app::GuiApp;
use crate::notifications::Severity;
use eframe::egui::{self, RichText};
use egui_extras::{Column, TableBuilder};

impl GuiApp {
    pub(crate) fn view_history(&mut self, ui: &mut egui::Ui) {
        self.render_section_header(ui, "[H]", "ADDRESS HISTORY");
        ui.add_space(self.theme.spacing_md);

        let addresses: Vec<String> = self.session.history.iter().cloned().collect();
        let selected = self.session.selected_wallet().map(str::to_string);

        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!("{} known addresses", addresses.len()))
                    .color(self.theme.text_secondary),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(!addresses.is_empty(), self.theme.button_secondary("Export JSON"))
                    .clicked()
                {
                    self.export_history();
                }
            });
        });
        ui.add_space(self.theme.spacing_sm);

        if addresses.is_empty() {
            self.theme.frame_surface().show(ui, |ui| {
                ui.label(
                    RichText::new("No wallets yet. Connect one from the Wallet page.")
                        .color(self.theme.text_secondary),
                );
            });
            return;
        }

        let mut copied: Option<String> = None;
        let mut explore: Option<String> = None;

        TableBuilder::new(ui)
            .striped(true)
            .resizable(false)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::exact(40.0))
            .column(Column::remainder().at_least(300.0))
            .column(Column::exact(140.0))
            .header(22.0, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                header.col(|ui| {
                    ui.strong("Address");
                });
                header.col(|ui| {
                    ui.strong("Actions");
                });
            })
            .body(|mut body| {
                for (index, address) in addresses.iter().enumerate() {
                    let is_selected = selected.as_deref() == Some(address.as_str());
                    body.row(26.0, |mut row| {
                        row.col(|ui| {
                            ui.label(format!("{}", index + 1));
                        });
                        row.col(|ui| {
                            let color = if is_selected {
                                self.theme.accent_green
                            } else {
                                self.theme.text_primary
                            };
                            let mut text = RichText::new(address).monospace().color(color);
                            if is_selected {
                                text = text.strong();
                            }
                            ui.label(text);
                            if is_selected {
                                ui.label(RichText::new("(active)").small().color(self.theme.accent_green));
                            }
                        });
                        row.col(|ui| {
                            if ui
                                .add(egui::Button::new("[#]").small())
                                .on_hover_text("Copy address")
                                .clicked()
                            {
                                copied = Some(address.clone());
                            }
                            if ui
                                .add(egui::Button::new("[>]").small())
                                .on_hover_text("View on explorer")
                                .clicked()
                            {
                                explore = Some(address.clone());
                            }
                        });
                    });
                }
            });

        if let Some(address) = copied {
            self.copy_to_clipboard(ui, &address);
        }
        if let Some(address) = explore {
            self.open_explorer(&address);
        }
    }

    fn export_history(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON files", &["json"])
            .set_file_name("wallets.json")
            .save_file()
        else {
            return;
        };

        match self.session.history.export_to(&path) {
            Ok(()) => {
                self.session.notifications.push(
                    Severity::Success,
                    "History exported",
                    format!("Saved {} addresses to {}", self.session.history.len(), path.display()),
                );
            }
            Err(e) => {
                tracing::error!("History export failed: {:#}", e);
                self.session.notifications.push(
                    Severity::Error,
                    "Export failed",
                    format!("{}", e),
                );
            }
        }
    }
}
