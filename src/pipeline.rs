//! Load, derive, render and hand off every chart.

use crate::charts::{
    build_charts, ChartSet, ChartSink, PngSink, RenderError, RenderedChart, SkippedChart,
    StaticChartRenderer,
};
use crate::config::VizConfig;
use crate::data::{CleanedTable, CleaningReport, DataLoader};
use anyhow::Context;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

pub const SUMMARY_FILE: &str = "run_summary.json";

/// What one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub report: CleaningReport,
    /// Titles of rendered charts, in catalog order.
    pub rendered: Vec<String>,
    pub skipped: Vec<SkippedChart>,
    pub written: Vec<PathBuf>,
}

pub struct Pipeline {
    config: VizConfig,
}

impl Pipeline {
    pub fn new(config: VizConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VizConfig {
        &self.config
    }

    pub fn load(&self) -> anyhow::Result<(CleanedTable, CleaningReport)> {
        let loader = DataLoader::new(self.config.cleaning);
        loader
            .load(&self.config.input)
            .with_context(|| format!("Failed to load {}", self.config.input.display()))
    }

    /// Render every derived chart; order follows the catalog.
    pub fn render_all(&self, set: &ChartSet) -> Result<Vec<RenderedChart>, RenderError> {
        let dpi = self.config.dpi;
        set.charts
            .par_iter()
            .map(|chart| -> Result<RenderedChart, RenderError> {
                let image = StaticChartRenderer::render(chart, dpi)?;
                Ok(RenderedChart {
                    kind: chart.kind,
                    title: chart.title.clone(),
                    file_stem: chart.file_stem.clone(),
                    image,
                })
            })
            .collect()
    }

    pub fn run(&self, sinks: &mut [&mut dyn ChartSink]) -> anyhow::Result<RunSummary> {
        self.run_with_progress(sinks, |_, _| {})
    }

    /// Full run. `progress` receives a completed fraction and a stage message.
    ///
    /// When persisting, charts are also written as PNGs to the output
    /// directory together with the run summary.
    pub fn run_with_progress<P>(
        &self,
        sinks: &mut [&mut dyn ChartSink],
        mut progress: P,
    ) -> anyhow::Result<RunSummary>
    where
        P: FnMut(f32, &str),
    {
        let config = &self.config;

        progress(0.0, "Loading CSV file...");
        let (table, report) = self.load()?;

        progress(0.25, "Deriving chart inputs...");
        let set = build_charts(&table, config);

        progress(0.4, "Rendering charts...");
        let rendered = self.render_all(&set).context("Failed to render charts")?;
        info!(rendered = rendered.len(), skipped = set.skipped.len(), "charts rendered");

        progress(0.8, "Saving charts...");
        let mut png = if config.persist_output {
            Some(PngSink::new(&config.output_dir).context("Failed to prepare output directory")?)
        } else {
            None
        };
        for chart in &rendered {
            if let Some(png) = png.as_mut() {
                png.accept(chart)?;
            }
            for sink in sinks.iter_mut() {
                sink.accept(chart)?;
            }
        }

        let summary = RunSummary {
            input: config.input.clone(),
            report,
            rendered: rendered.iter().map(|c| c.title.clone()).collect(),
            skipped: set.skipped,
            written: png.as_ref().map(|p| p.written().to_vec()).unwrap_or_default(),
        };

        if let Some(png) = &png {
            let path = png.dir().join(SUMMARY_FILE);
            let json = serde_json::to_string_pretty(&summary)?;
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("All visualizations generated and saved successfully!");
        } else {
            info!("All visualizations generated successfully!");
        }
        progress(1.0, "Done");

        Ok(summary)
    }
}
