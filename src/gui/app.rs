//! Chartify Phones Gallery Application
//! Main window with control panel and chart viewer.

use crate::charts::{ChartSink, GallerySink, RenderedChart};
use crate::config::VizConfig;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::pipeline::{Pipeline, RunSummary};
use egui::SidePanel;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use tracing::error;

/// Pipeline result from background thread
enum RunResult {
    Progress(f32, String),
    Complete {
        charts: Vec<RenderedChart>,
        summary: RunSummary,
    },
    Error(String),
}

/// Main application window.
pub struct ChartGalleryApp {
    config: VizConfig,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async pipeline re-run
    run_rx: Option<Receiver<RunResult>>,
    is_running: bool,
}

impl ChartGalleryApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: VizConfig,
        charts: Vec<RenderedChart>,
        summary: RunSummary,
    ) -> Self {
        let mut app = Self {
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            run_rx: None,
            is_running: false,
            config,
        };
        app.control_panel.csv_path = Some(app.config.input.clone());
        app.control_panel.cleaning = app.config.cleaning;
        app.apply_results(charts, summary);
        app
    }

    fn apply_results(&mut self, charts: Vec<RenderedChart>, summary: RunSummary) {
        let count = charts.len();
        self.control_panel
            .update_results(summary.rendered, summary.skipped, summary.report);
        self.chart_viewer.set_charts(charts);
        self.control_panel
            .set_progress(100.0, &format!("Complete! {} charts ready", count));
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if self.is_running {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.control_panel.csv_path = Some(path);
            self.start_run();
        }
    }

    /// Re-run the pipeline in a background thread
    fn start_run(&mut self) {
        let Some(path) = self.control_panel.csv_path.clone() else {
            self.control_panel.set_progress(0.0, "No file selected");
            return;
        };

        self.config.input = path;
        self.config.cleaning = self.control_panel.cleaning;
        let config = self.config.clone();

        let (tx, rx) = channel();
        self.run_rx = Some(rx);
        self.is_running = true;
        self.control_panel.busy = true;
        self.chart_viewer.clear();
        self.control_panel.set_progress(0.0, "Loading CSV file...");

        thread::spawn(move || Self::run_pipeline(tx, config));
    }

    /// Run the pipeline (called from background thread)
    fn run_pipeline(tx: Sender<RunResult>, config: VizConfig) {
        let pipeline = Pipeline::new(config);
        let mut gallery = GallerySink::new();
        let mut sinks: [&mut dyn ChartSink; 1] = [&mut gallery];

        let result = pipeline.run_with_progress(&mut sinks, |fraction, stage| {
            let _ = tx.send(RunResult::Progress(fraction * 100.0, stage.to_string()));
        });

        let message = match result {
            Ok(summary) => RunResult::Complete {
                charts: gallery.into_charts(),
                summary,
            },
            Err(e) => {
                error!("pipeline run failed: {:#}", e);
                RunResult::Error(format!("{:#}", e))
            }
        };
        let _ = tx.send(message);
    }

    /// Check for pipeline results
    fn check_run_results(&mut self) {
        let rx = self.run_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    RunResult::Progress(progress, status) => {
                        self.control_panel.set_progress(progress, &status);
                    }
                    RunResult::Complete { charts, summary } => {
                        self.apply_results(charts, summary);
                        self.finish_run();
                        should_keep_receiver = false;
                    }
                    RunResult::Error(error) => {
                        self.control_panel
                            .set_progress(0.0, &format!("Error: {}", error));
                        self.finish_run();
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.run_rx = Some(rx);
            }
        }
    }

    fn finish_run(&mut self) {
        self.is_running = false;
        self.control_panel.busy = false;
    }

    /// Arrow keys step through the chart list
    fn handle_keys(&mut self, ctx: &egui::Context) {
        if self.chart_viewer.is_empty() {
            return;
        }
        let (up, down) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::ArrowUp),
                i.key_pressed(egui::Key::ArrowDown),
            )
        });
        let current = self.chart_viewer.selected();
        let next = if down {
            (current + 1).min(self.chart_viewer.len() - 1)
        } else if up {
            current.saturating_sub(1)
        } else {
            return;
        };
        self.chart_viewer.select(next);
        self.control_panel.selected = next;
    }
}

impl eframe::App for ChartGalleryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_run_results();

        if self.is_running {
            ctx.request_repaint();
        }
        self.handle_keys(ctx);

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::Rerun => self.start_run(),
                        ControlPanelAction::Select(index) => self.chart_viewer.select(index),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ctx, ui);
        });
    }
}

/// Open the gallery window on the results of a finished run.
pub fn run_viewer(
    config: VizConfig,
    charts: Vec<RenderedChart>,
    summary: RunSummary,
) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Chartify Phones"),
        ..Default::default()
    };

    eframe::run_native(
        "Chartify Phones",
        options,
        Box::new(|cc| Ok(Box::new(ChartGalleryApp::new(cc, config, charts, summary)))),
    )
    .map_err(|e| anyhow::anyhow!("Chart viewer failed: {e}"))
}
