//! Control Panel Widget
//! Left side panel with the data source, chart list and run status.

use crate::charts::SkippedChart;
use crate::data::{CleaningMode, CleaningReport};
use egui::{Color32, RichText, ScrollArea};
use std::path::PathBuf;

/// Left side control panel with file selection, chart list and progress.
pub struct ControlPanel {
    pub csv_path: Option<PathBuf>,
    pub cleaning: CleaningMode,
    pub titles: Vec<String>,
    pub skipped: Vec<SkippedChart>,
    pub report: Option<CleaningReport>,
    pub selected: usize,
    pub progress: f32,
    pub status: String,
    pub busy: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            csv_path: None,
            cleaning: CleaningMode::default(),
            titles: Vec::new(),
            skipped: Vec::new(),
            report: None,
            selected: 0,
            progress: 0.0,
            status: "Ready".to_string(),
            busy: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the chart list after a run
    pub fn update_results(
        &mut self,
        titles: Vec<String>,
        skipped: Vec<SkippedChart>,
        report: CleaningReport,
    ) {
        self.titles = titles;
        self.skipped = skipped;
        self.report = Some(report);
        self.selected = 0;
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📱 Chartify Phones")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(RichText::new("Listing Charts").size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.add_enabled_ui(!self.busy, |ui| {
                            if ui.button("📂 Open CSV…").clicked() {
                                action = ControlPanelAction::BrowseCsv;
                            }
                        });
                    });
                });
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Cleaning:");
            ui.radio_value(&mut self.cleaning, CleaningMode::Lenient, "Lenient");
            ui.radio_value(&mut self.cleaning, CleaningMode::Strict, "Strict");
        });
        ui.add_space(5.0);
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!self.busy && self.csv_path.is_some(), |ui| {
                let button = egui::Button::new(RichText::new("▶ Re-run").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Rerun;
                }
            });
        });

        if let Some(report) = &self.report {
            ui.add_space(8.0);
            egui::Grid::new("cleaning_report")
                .num_columns(2)
                .spacing([12.0, 2.0])
                .show(ui, |ui| {
                    let rows = [
                        ("Rows read", report.rows_read),
                        ("Dropped (missing)", report.rows_dropped_missing),
                        ("Cells coerced", report.total_coerced()),
                        ("Dropped (strict)", report.rows_dropped_after_coercion),
                        ("Rows kept", report.rows_kept),
                    ];
                    for (label, value) in rows {
                        ui.label(RichText::new(label).size(11.0).color(Color32::GRAY));
                        ui.label(RichText::new(value.to_string()).size(11.0));
                        ui.end_row();
                    }
                });
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Chart List =====
        ui.label(RichText::new("📊 Charts").size(14.0).strong());
        ui.add_space(5.0);

        ScrollArea::vertical()
            .id_salt("chart_list")
            .max_height(360.0)
            .show(ui, |ui| {
                for (i, title) in self.titles.iter().enumerate() {
                    if ui.selectable_label(self.selected == i, title).clicked() {
                        self.selected = i;
                        action = ControlPanelAction::Select(i);
                    }
                }
                for skipped in &self.skipped {
                    ui.label(RichText::new(&skipped.title).color(Color32::DARK_GRAY))
                        .on_hover_text(&skipped.reason);
                    ui.label(
                        RichText::new(format!("  skipped: {}", skipped.reason))
                            .size(10.0)
                            .italics()
                            .color(Color32::DARK_GRAY),
                    );
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.busy),
        );

        ui.add_space(5.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Complete") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    Rerun,
    Select(usize),
}
