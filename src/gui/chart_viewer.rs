//! Chart Viewer Widget
//! Central panel showing the selected rendered chart scaled to fit.

use crate::charts::RenderedChart;
use egui::{ColorImage, RichText, TextureHandle, TextureOptions};

/// Displays one chart at a time; textures are uploaded on first view.
#[derive(Default)]
pub struct ChartViewer {
    charts: Vec<RenderedChart>,
    textures: Vec<Option<TextureHandle>>,
    selected: usize,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all charts
    pub fn clear(&mut self) {
        self.charts.clear();
        self.textures.clear();
        self.selected = 0;
    }

    pub fn set_charts(&mut self, charts: Vec<RenderedChart>) {
        self.textures = vec![None; charts.len()];
        self.charts = charts;
        self.selected = 0;
    }

    pub fn select(&mut self, index: usize) {
        if index < self.charts.len() {
            self.selected = index;
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn show(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let Some(chart) = self.charts.get(self.selected) else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Charts").size(20.0));
            });
            return;
        };

        ui.horizontal(|ui| {
            ui.label(RichText::new(&chart.title).size(18.0).strong());
            ui.label(
                RichText::new(format!(
                    "{} · {}×{}",
                    chart.file_name(),
                    chart.image.width(),
                    chart.image.height()
                ))
                .size(11.0)
                .color(egui::Color32::GRAY),
            );
        });
        ui.add_space(8.0);

        let texture = self.textures[self.selected].get_or_insert_with(|| {
            let size = [chart.image.width() as usize, chart.image.height() as usize];
            let image = ColorImage::from_rgb(size, chart.image.as_raw());
            ctx.load_texture(chart.file_stem.clone(), image, TextureOptions::LINEAR)
        });

        ui.centered_and_justified(|ui| {
            ui.add(egui::Image::new(&*texture).shrink_to_fit());
        });
    }
}
