//! Destinations for rendered charts.

use crate::charts::catalog::ChartKind;
use crate::charts::renderer::RenderError;
use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::info;

/// One chart after rendering.
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub kind: ChartKind,
    pub title: String,
    pub file_stem: String,
    pub image: RgbImage,
}

impl RenderedChart {
    pub fn file_name(&self) -> String {
        format!("{}.png", self.file_stem)
    }
}

/// Receives charts in catalog order.
pub trait ChartSink {
    fn accept(&mut self, chart: &RenderedChart) -> Result<(), RenderError>;
}

/// Writes each chart as `<dir>/<file_stem>.png`, replacing older files.
#[derive(Debug)]
pub struct PngSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl PngSink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, RenderError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| RenderError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            written: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ChartSink for PngSink {
    fn accept(&mut self, chart: &RenderedChart) -> Result<(), RenderError> {
        let path = self.dir.join(chart.file_name());
        chart.image.save(&path).map_err(|source| RenderError::Save {
            path: path.clone(),
            source,
        })?;
        info!(chart = chart.title.as_str(), path = %path.display(), "chart saved");
        self.written.push(path);
        Ok(())
    }
}

/// Keeps rendered charts in memory for the viewer.
#[derive(Debug, Default)]
pub struct GallerySink {
    charts: Vec<RenderedChart>,
}

impl GallerySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn charts(&self) -> &[RenderedChart] {
        &self.charts
    }

    pub fn into_charts(self) -> Vec<RenderedChart> {
        self.charts
    }
}

impl ChartSink for GallerySink {
    fn accept(&mut self, chart: &RenderedChart) -> Result<(), RenderError> {
        self.charts.push(chart.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(kind: ChartKind) -> RenderedChart {
        RenderedChart {
            kind,
            title: kind.title().to_string(),
            file_stem: kind.file_stem().to_string(),
            image: RgbImage::new(4, 3),
        }
    }

    #[test]
    fn png_sink_writes_named_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = PngSink::new(dir.path().join("out")).unwrap();
        sink.accept(&blank(ChartKind::Bar)).unwrap();
        sink.accept(&blank(ChartKind::Venn)).unwrap();

        let bar = dir.path().join("out").join("brand_distribution.png");
        assert!(bar.is_file());
        assert_eq!(sink.written().len(), 2);

        let reread = image::open(&bar).unwrap();
        assert_eq!((reread.width(), reread.height()), (4, 3));
    }

    #[test]
    fn png_sink_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = PngSink::new(dir.path()).unwrap();
        sink.accept(&blank(ChartKind::Pie)).unwrap();
        sink.accept(&blank(ChartKind::Pie)).unwrap();
        assert!(dir.path().join("top_10_brands_pie_chart.png").is_file());
    }

    #[test]
    fn gallery_keeps_order() {
        let mut gallery = GallerySink::new();
        for kind in [ChartKind::Line, ChartKind::Heatmap] {
            gallery.accept(&blank(kind)).unwrap();
        }
        let kinds: Vec<ChartKind> = gallery.charts().iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ChartKind::Line, ChartKind::Heatmap]);
    }
}
