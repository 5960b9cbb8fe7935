//! Static Chart Renderer
//! Draws each catalog chart into an in-memory RGB image with plotters.
//!
//! Figure sizes are in inches and fonts in points, scaled by the requested
//! dpi, so a chart rendered at 300 dpi matches its saved PNG exactly.

use crate::charts::catalog::{Bubble, Chart, ChartData, ChartKind, ViolinGroup};
use crate::charts::layout::{self, CloudSettings, LayoutRect};
use crate::charts::palette::{self, *};
use crate::stats::{BoxSummary, BrandCounts, CorrelationMatrix, PieSlice, TriSetOverlap};
use image::RgbImage;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use std::path::PathBuf;
use thiserror::Error;

// Font sizes in points
const TITLE_PT: f64 = 12.0;
const LABEL_PT: f64 = 10.0;
const TICK_PT: f64 = 8.0;
const ANNOTATION_PT: f64 = 9.0;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type Plane<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;
type DrawError = Box<dyn std::error::Error + Send + Sync>;
type DrawResult<T = ()> = Result<T, DrawError>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw '{chart}': {message}")]
    Draw { chart: String, message: String },
    #[error("Pixel buffer for '{0}' does not match its dimensions")]
    Buffer(String),
    #[error("Failed to save {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Failed to prepare {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Point-to-pixel conversion for one render.
#[derive(Debug, Clone, Copy)]
struct Scale {
    dpi: f64,
}

impl Scale {
    fn px(self, pt: f64) -> f64 {
        pt * self.dpi / 72.0
    }

    fn pxu(self, pt: f64) -> u32 {
        self.px(pt).round().max(1.0) as u32
    }

    fn pxi(self, pt: f64) -> i32 {
        self.px(pt).round().max(1.0) as i32
    }

    fn font(self, pt: f64) -> FontDesc<'static> {
        FontDesc::new(FontFamily::SansSerif, self.px(pt), FontStyle::Normal)
    }

    fn text(self, pt: f64) -> TextStyle<'static> {
        self.font(pt).color(&BLACK)
    }

    fn centered(self, pt: f64, color: &RGBColor) -> TextStyle<'static> {
        self.font(pt)
            .color(color)
            .pos(Pos::new(HPos::Center, VPos::Center))
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Image size in pixels for a chart kind at `dpi`.
    pub fn pixel_size(kind: ChartKind, dpi: u32) -> (u32, u32) {
        let (w, h) = kind.figure_size();
        let dpi = dpi as f64;
        ((w * dpi).round() as u32, (h * dpi).round() as u32)
    }

    /// Render one chart to an RGB image.
    pub fn render(chart: &Chart, dpi: u32) -> Result<RgbImage, RenderError> {
        let (width, height) = Self::pixel_size(chart.kind, dpi);
        let scale = Scale { dpi: dpi as f64 };
        let mut buffer = vec![255u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            Self::paint(&root, scale, chart).map_err(|e| RenderError::Draw {
                chart: chart.title.clone(),
                message: e.to_string(),
            })?;
        }
        RgbImage::from_raw(width, height, buffer).ok_or_else(|| RenderError::Buffer(chart.title.clone()))
    }

    fn paint(root: &Area<'_>, s: Scale, chart: &Chart) -> DrawResult {
        root.fill(&WHITE)?;
        let title = chart.title.as_str();

        match &chart.data {
            ChartData::Line {
                x_label,
                y_label,
                points,
            } => Self::draw_line(root, s, title, x_label, y_label, points)?,
            ChartData::Bar {
                x_label,
                y_label,
                counts,
            } => Self::draw_bar(root, s, title, x_label, y_label, counts)?,
            ChartData::Histogram {
                x_label,
                histogram,
                kde,
            } => Self::draw_histogram(root, s, title, x_label, histogram, kde)?,
            ChartData::Scatter {
                x_label,
                y_label,
                points,
            } => Self::draw_scatter(root, s, title, x_label, y_label, points)?,
            ChartData::Scatter3d { labels, points } => {
                Self::draw_scatter3d(root, s, title, labels, points)?
            }
            ChartData::Box { y_label, groups } => Self::draw_box(root, s, title, y_label, groups)?,
            ChartData::Violin { y_label, groups } => {
                Self::draw_violin(root, s, title, y_label, groups)?
            }
            ChartData::Heatmap(matrix) => Self::draw_heatmap(root, s, title, matrix)?,
            ChartData::WordCloud { text } => Self::draw_word_cloud(root, s, title, text)?,
            ChartData::Pie(slices) => Self::draw_pie(root, s, title, slices)?,
            ChartData::Bubble {
                x_label,
                y_label,
                bubbles,
            } => Self::draw_bubble(root, s, title, x_label, y_label, bubbles)?,
            ChartData::Treemap(counts) => Self::draw_treemap(root, s, title, counts)?,
            ChartData::Venn(overlap) => Self::draw_venn(root, s, title, overlap)?,
        }

        root.present()?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cartesian charts
    // ------------------------------------------------------------------

    fn plane<'a, 'b>(
        area: &'a Area<'b>,
        s: Scale,
        title: &str,
        x: Range<f64>,
        y: Range<f64>,
        x_label_area: u32,
    ) -> DrawResult<Plane<'a, 'b>> {
        let chart = ChartBuilder::on(area)
            .caption(title, s.text(TITLE_PT))
            .margin(s.pxu(8.0))
            .x_label_area_size(x_label_area)
            .y_label_area_size(s.pxu(52.0))
            .build_cartesian_2d(x, y)?;
        Ok(chart)
    }

    /// Plain numeric axes with descriptions.
    fn numeric_mesh(chart: &mut Plane<'_, '_>, s: Scale, x_desc: &str, y_desc: &str) -> DrawResult {
        chart
            .configure_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .x_label_style(s.text(TICK_PT))
            .y_label_style(s.text(TICK_PT))
            .axis_desc_style(s.text(LABEL_PT))
            .draw()?;
        Ok(())
    }

    /// One rotated tick label per category at integer x positions.
    fn category_mesh(
        chart: &mut Plane<'_, '_>,
        s: Scale,
        labels: &[&str],
        x_desc: &str,
        y_desc: &str,
    ) -> DrawResult {
        let formatter = |v: &f64| category_label(labels, *v);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len().max(1))
            .x_label_formatter(&formatter)
            .x_label_style(
                s.font(TICK_PT)
                    .transform(FontTransform::Rotate90)
                    .color(&BLACK),
            )
            .y_label_style(s.text(TICK_PT))
            .x_desc(x_desc)
            .y_desc(y_desc)
            .axis_desc_style(s.text(LABEL_PT))
            .draw()?;
        Ok(())
    }

    /// Label area tall enough for rotated category names.
    fn category_label_area(s: Scale, labels: &[&str]) -> u32 {
        let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(1);
        (s.px(TICK_PT) * 0.65 * longest as f64 + s.px(LABEL_PT) * 2.5).round() as u32
    }

    fn draw_line(
        area: &Area<'_>,
        s: Scale,
        title: &str,
        x_label: &str,
        y_label: &str,
        points: &[(usize, Option<f64>)],
    ) -> DrawResult {
        let x = padded_range(points.iter().map(|(i, _)| *i as f64), 0.02);
        let y = padded_range(points.iter().filter_map(|(_, v)| *v), 0.05);
        let mut chart = Self::plane(area, s, title, x, y, s.pxu(30.0))?;
        Self::numeric_mesh(&mut chart, s, x_label, y_label)?;

        let stroke = LINE_BLUE.stroke_width(s.pxu(1.0));
        // Missing values break the line
        for run in points.split(|(_, v)| v.is_none()) {
            let run: Vec<(f64, f64)> = run
                .iter()
                .filter_map(|(i, v)| Some((*i as f64, (*v)?)))
                .collect();
            chart.draw_series(LineSeries::new(run.iter().copied(), stroke))?;
            chart.draw_series(
                run.iter()
                    .map(|p| Circle::new(*p, s.pxi(2.0), LINE_BLUE.filled())),
            )?;
        }
        Ok(())
    }

    fn draw_bar(
        area: &Area<'_>,
        s: Scale,
        title: &str,
        x_label: &str,
        y_label: &str,
        counts: &BrandCounts,
    ) -> DrawResult {
        let labels = counts.labels();
        let max = counts.iter().map(|(_, c)| c).max().unwrap_or(0).max(1) as f64;
        let mut chart = Self::plane(
            area,
            s,
            title,
            category_range(labels.len()),
            0.0..max * 1.05,
            Self::category_label_area(s, &labels),
        )?;
        Self::category_mesh(&mut chart, s, &labels, x_label, y_label)?;

        chart.draw_series(counts.iter().enumerate().map(|(i, (_, count))| {
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, count as f64)], BAR_GREEN.filled())
        }))?;
        Ok(())
    }

    fn draw_histogram(
        area: &Area<'_>,
        s: Scale,
        title: &str,
        x_label: &str,
        histogram: &crate::stats::Histogram,
        kde: &[(f64, f64)],
    ) -> DrawResult {
        let x = padded_range(histogram.edges.iter().copied(), 0.03);
        let peak = kde
            .iter()
            .map(|(_, d)| *d)
            .fold(histogram.max_count() as f64, f64::max)
            .max(1.0);
        let mut chart = Self::plane(area, s, title, x, 0.0..peak * 1.05, s.pxu(30.0))?;
        Self::numeric_mesh(&mut chart, s, x_label, "Count")?;

        let bins = histogram.edges.windows(2).zip(&histogram.counts);
        chart.draw_series(bins.clone().map(|(edge, count)| {
            Rectangle::new(
                [(edge[0], 0.0), (edge[1], *count as f64)],
                over_white(HIST_ORANGE, 0.75).filled(),
            )
        }))?;
        chart.draw_series(bins.map(|(edge, count)| {
            Rectangle::new(
                [(edge[0], 0.0), (edge[1], *count as f64)],
                BLACK.mix(0.6).stroke_width(1),
            )
        }))?;
        chart.draw_series(LineSeries::new(
            kde.iter().copied(),
            KDE_ORANGE.stroke_width(s.pxu(1.5)),
        ))?;
        Ok(())
    }

    fn draw_scatter(
        area: &Area<'_>,
        s: Scale,
        title: &str,
        x_label: &str,
        y_label: &str,
        points: &[(f64, f64)],
    ) -> DrawResult {
        let x = padded_range(points.iter().map(|p| p.0), 0.05);
        let y = padded_range(points.iter().map(|p| p.1), 0.05);
        let mut chart = Self::plane(area, s, title, x, y, s.pxu(30.0))?;
        Self::numeric_mesh(&mut chart, s, x_label, y_label)?;

        let radius = s.pxi(2.5);
        chart.draw_series(
            points
                .iter()
                .map(|p| Circle::new(*p, radius, SCATTER_RED.mix(0.5).filled())),
        )?;
        Ok(())
    }

    fn draw_scatter3d(
        area: &Area<'_>,
        s: Scale,
        title: &str,
        labels: &[&str; 3],
        points: &[(f64, f64, f64)],
    ) -> DrawResult {
        // Rating is the vertical axis
        let x = padded_range(points.iter().map(|p| p.0), 0.05);
        let y = padded_range(points.iter().map(|p| p.2), 0.05);
        let z = padded_range(points.iter().map(|p| p.1), 0.05);

        let mut chart = ChartBuilder::on(area)
            .caption(title, s.text(TITLE_PT))
            .margin(s.pxu(16.0))
            .build_cartesian_3d(x, y, z)?;
        chart.with_projection(|mut pb| {
            pb.yaw = 0.6;
            pb.pitch = 0.35;
            pb.scale = 0.8;
            pb.into_matrix()
        });
        chart
            .configure_axes()
            .label_style(s.text(TICK_PT))
            .draw()?;

        let radius = s.pxi(2.5);
        chart.draw_series(points.iter().map(|&(selling, original, rating)| {
            Circle::new(
                (selling, rating, original),
                radius,
                SCATTER_PURPLE.mix(0.6).filled(),
            )
        }))?;

        let legend = [
            format!("x: {}", labels[0]),
            format!("z: {}", labels[1]),
            format!("y: {}", labels[2]),
        ];
        let line = s.px(LABEL_PT) * 1.4;
        for (i, text) in legend.into_iter().enumerate() {
            let y = s.px(TITLE_PT) * 2.5 + line * i as f64;
            area.draw(&Text::new(
                text,
                (s.pxi(12.0), y.round() as i32),
                s.text(LABEL_PT),
            ))?;
        }
        Ok(())
    }

    fn draw_box(
        area: &Area<'_>,
        s: Scale,
        title: &str,
        y_label: &str,
        groups: &[(String, Option<BoxSummary>)],
    ) -> DrawResult {
        let labels: Vec<&str> = groups.iter().map(|(l, _)| l.as_str()).collect();
        let y = padded_range(
            groups.iter().filter_map(|(_, b)| b.as_ref()).flat_map(|b| {
                [b.whisker_low, b.whisker_high]
                    .into_iter()
                    .chain(b.outliers.iter().copied())
            }),
            0.05,
        );
        let mut chart = Self::plane(
            area,
            s,
            title,
            category_range(labels.len()),
            y,
            Self::category_label_area(s, &labels),
        )?;
        Self::category_mesh(&mut chart, s, &labels, "Brand", y_label)?;

        let line = BLACK.stroke_width(s.pxu(1.0));
        for (i, (_, summary)) in groups.iter().enumerate() {
            let Some(b) = summary else { continue };
            let x = i as f64;
            let (half, cap) = (0.3, 0.15);

            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - half, b.q1), (x + half, b.q3)],
                over_white(categorical(i), 0.85).filled(),
            )))?;
            chart.draw_series(std::iter::once(Rectangle::new(
                [(x - half, b.q1), (x + half, b.q3)],
                line,
            )))?;
            chart.draw_series([
                PathElement::new(vec![(x - half, b.median), (x + half, b.median)], line),
                PathElement::new(vec![(x, b.q1), (x, b.whisker_low)], line),
                PathElement::new(vec![(x, b.q3), (x, b.whisker_high)], line),
                PathElement::new(vec![(x - cap, b.whisker_low), (x + cap, b.whisker_low)], line),
                PathElement::new(vec![(x - cap, b.whisker_high), (x + cap, b.whisker_high)], line),
            ])?;
            chart.draw_series(
                b.outliers
                    .iter()
                    .map(|v| Circle::new((x, *v), s.pxi(2.0), line)),
            )?;
        }
        Ok(())
    }

    fn draw_violin(
        area: &Area<'_>,
        s: Scale,
        title: &str,
        y_label: &str,
        groups: &[ViolinGroup],
    ) -> DrawResult {
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        let y = padded_range(
            groups.iter().flat_map(|g| {
                g.curve.iter().map(|(v, _)| *v).chain(
                    g.summary
                        .iter()
                        .flat_map(|b| [b.whisker_low, b.whisker_high]),
                )
            }),
            0.05,
        );
        let mut chart = Self::plane(
            area,
            s,
            title,
            category_range(labels.len()),
            y,
            Self::category_label_area(s, &labels),
        )?;
        Self::category_mesh(&mut chart, s, &labels, "Brand", y_label)?;

        let outline = BLACK.stroke_width(s.pxu(0.8));
        for (i, group) in groups.iter().enumerate() {
            let x = i as f64;
            let peak = group.curve.iter().map(|(_, d)| *d).fold(0.0, f64::max);

            if peak > 0.0 {
                let width = |d: f64| 0.4 * d / peak;
                let mut shape: Vec<(f64, f64)> = group
                    .curve
                    .iter()
                    .map(|(v, d)| (x - width(*d), *v))
                    .collect();
                shape.extend(group.curve.iter().rev().map(|(v, d)| (x + width(*d), *v)));

                chart.draw_series(std::iter::once(Polygon::new(
                    shape.clone(),
                    categorical(i).filled(),
                )))?;
                if let Some(first) = shape.first().copied() {
                    shape.push(first);
                }
                chart.draw_series(std::iter::once(PathElement::new(shape, outline)))?;
            }

            // Inner box
            if let Some(b) = &group.summary {
                let dark = RGBColor(60, 60, 60);
                chart.draw_series(std::iter::once(PathElement::new(
                    vec![(x, b.whisker_low), (x, b.whisker_high)],
                    dark.stroke_width(s.pxu(1.0)),
                )))?;
                chart.draw_series(std::iter::once(Rectangle::new(
                    [(x - 0.03, b.q1), (x + 0.03, b.q3)],
                    dark.filled(),
                )))?;
                chart.draw_series(std::iter::once(Circle::new(
                    (x, b.median),
                    s.pxi(2.0),
                    WHITE.filled(),
                )))?;
            }
        }
        Ok(())
    }

    fn draw_heatmap(
        area: &Area<'_>,
        s: Scale,
        title: &str,
        matrix: &CorrelationMatrix,
    ) -> DrawResult {
        let n = matrix.size();
        let (width, _) = area.dim_in_pixel();
        let (main, bar) = area.split_horizontally((width as f64 * 0.86).round() as u32);

        let columns: Vec<&str> = matrix.columns.iter().map(String::as_str).collect();
        let rows: Vec<&str> = columns.iter().rev().copied().collect();
        let longest = columns.iter().map(|c| c.chars().count()).max().unwrap_or(1);

        let mut chart = ChartBuilder::on(&main)
            .caption(title, s.text(TITLE_PT))
            .margin(s.pxu(8.0))
            .x_label_area_size(s.pxu(TICK_PT * 2.5))
            .y_label_area_size((s.px(TICK_PT) * 0.65 * longest as f64 + s.px(8.0)).round() as u32)
            .build_cartesian_2d(category_range(n), category_range(n))?;

        let x_fmt = |v: &f64| category_label(&columns, *v);
        let y_fmt = |v: &f64| category_label(&rows, *v);
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(n.max(1))
            .y_labels(n.max(1))
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .x_label_style(s.text(TICK_PT))
            .y_label_style(s.text(TICK_PT))
            .draw()?;

        // Row 0 at the top
        for (i, row) in matrix.values.iter().enumerate() {
            let y = (n - 1 - i) as f64;
            for (j, value) in row.iter().enumerate() {
                let x = j as f64;
                let fill = value.map(palette::coolwarm).unwrap_or(MISSING_GREY);
                chart.draw_series(std::iter::once(Rectangle::new(
                    [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                    fill.filled(),
                )))?;
                let ink = if is_dark(fill) { WHITE } else { BLACK };
                let annotation = value.map_or_else(|| "nan".to_string(), |v| format!("{v:.2}"));
                chart.draw_series(std::iter::once(Text::new(
                    annotation,
                    (x, y),
                    s.centered(ANNOTATION_PT, &ink),
                )))?;
            }
        }

        Self::draw_colorbar(&bar, s)
    }

    fn draw_colorbar(area: &Area<'_>, s: Scale) -> DrawResult {
        const STEPS: usize = 100;

        let mut bar = ChartBuilder::on(area)
            .margin_top(s.pxu(TITLE_PT * 2.5))
            .margin_bottom(s.pxu(TICK_PT * 2.5 + 8.0))
            .margin_left(s.pxu(4.0))
            .margin_right(s.pxu(4.0))
            .set_label_area_size(LabelAreaPosition::Right, s.pxu(28.0))
            .build_cartesian_2d(0.0..1.0, -1.0..1.0)?;
        bar.configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_labels(5)
            .y_label_style(s.text(TICK_PT))
            .draw()?;

        let step = 2.0 / STEPS as f64;
        bar.draw_series((0..STEPS).map(|k| {
            let lo = -1.0 + k as f64 * step;
            Rectangle::new(
                [(0.0, lo), (1.0, lo + step)],
                palette::coolwarm(lo + step / 2.0).filled(),
            )
        }))?;
        Ok(())
    }

    fn draw_bubble(
        area: &Area<'_>,
        s: Scale,
        title: &str,
        x_label: &str,
        y_label: &str,
        bubbles: &[Bubble],
    ) -> DrawResult {
        let x = padded_range(bubbles.iter().map(|b| b.x), 0.08);
        let y = padded_range(bubbles.iter().map(|b| b.y), 0.08);
        let mut chart = Self::plane(area, s, title, x, y, s.pxu(30.0))?;
        Self::numeric_mesh(&mut chart, s, x_label, y_label)?;

        // Marker size is an area in points squared
        let radius = |b: &Bubble| (s.px(b.size.max(0.0).sqrt()) / 2.0).round().max(1.0) as i32;
        chart.draw_series(
            bubbles
                .iter()
                .map(|b| Circle::new((b.x, b.y), radius(b), BUBBLE_CYAN.mix(0.5).filled())),
        )?;
        chart.draw_series(bubbles.iter().map(|b| {
            Circle::new(
                (b.x, b.y),
                radius(b),
                BLACK.mix(0.5).stroke_width(s.pxu(0.5)),
            )
        }))?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Charts without axes
    // ------------------------------------------------------------------

    fn draw_word_cloud(area: &Area<'_>, s: Scale, title: &str, text: &str) -> DrawResult {
        let inner = area.titled(title, s.text(TITLE_PT))?;
        let (w, h) = inner.dim_in_pixel();
        let words = layout::word_frequencies(text);

        let settings = CloudSettings {
            width: w as f64,
            height: h as f64,
            max_font: (w.min(h) as f64) / 4.0,
            min_font: (w.min(h) as f64) / 40.0,
            padding: s.px(1.0),
            max_words: 200,
        };
        let placed = layout::layout_word_cloud(&words, settings, |word, size| {
            let font = FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal);
            font.box_size(word)
                .map(|(bw, bh)| (bw as f64, bh as f64))
                .unwrap_or((0.6 * size * word.chars().count() as f64, size))
        });

        for word in placed {
            let font = FontDesc::new(FontFamily::SansSerif, word.font_size, FontStyle::Normal);
            let color = palette::viridis(1.0 - word.weight);
            inner.draw(&Text::new(
                word.text,
                (word.rect.x.round() as i32, word.rect.y.round() as i32),
                font.color(&color),
            ))?;
        }
        Ok(())
    }

    fn draw_pie(area: &Area<'_>, s: Scale, title: &str, slices: &[PieSlice]) -> DrawResult {
        let inner = area.titled(title, s.text(TITLE_PT))?;
        let (w, h) = inner.dim_in_pixel();
        let (cx, cy) = (w as f64 / 2.0, h as f64 / 2.0);
        let r = w.min(h) as f64 * 0.38;

        for (i, slice) in slices.iter().enumerate() {
            let wedge = layout::pie_wedge(cx, cy, r, slice.start_deg, slice.end_deg);
            inner.draw(&Polygon::new(wedge, categorical(i).filled()))?;
        }

        for (i, slice) in slices.iter().enumerate() {
            let mid = ((slice.start_deg + slice.end_deg) / 2.0).to_radians();
            let fill = categorical(i);
            let ink = if is_dark(fill) { WHITE } else { BLACK };
            inner.draw(&Text::new(
                slice.percent_label.clone(),
                layout::polar(cx, cy, r * 0.6, mid),
                s.centered(ANNOTATION_PT, &ink),
            ))?;

            let h_pos = if mid.cos() >= 0.0 { HPos::Left } else { HPos::Right };
            inner.draw(&Text::new(
                slice.label.clone(),
                layout::polar(cx, cy, r * 1.08, mid),
                s.font(LABEL_PT)
                    .color(&BLACK)
                    .pos(Pos::new(h_pos, VPos::Center)),
            ))?;
        }
        Ok(())
    }

    fn draw_treemap(area: &Area<'_>, s: Scale, title: &str, counts: &BrandCounts) -> DrawResult {
        let inner = area.titled(title, s.text(TITLE_PT))?;
        let (w, h) = inner.dim_in_pixel();
        let values: Vec<f64> = counts.iter().map(|(_, c)| c as f64).collect();
        let rects = layout::squarify(&values, LayoutRect::new(0.0, 0.0, w as f64, h as f64));

        let border = WHITE.stroke_width(s.pxu(1.0));
        for (i, ((label, _), rect)) in counts.iter().zip(&rects).enumerate() {
            let corners = [
                (rect.x.round() as i32, rect.y.round() as i32),
                ((rect.x + rect.dx).round() as i32, (rect.y + rect.dy).round() as i32),
            ];
            inner.draw(&Rectangle::new(corners, over_white(categorical(i), 0.7).filled()))?;
            inner.draw(&Rectangle::new(corners, border))?;

            // Label only when it fits
            let size = s.px(LABEL_PT).min(rect.dy * 0.5);
            let needed = 0.6 * size * label.chars().count() as f64;
            if size >= s.px(4.0) && needed < rect.dx * 0.95 {
                let (x, y) = rect.center();
                inner.draw(&Text::new(
                    label.to_string(),
                    (x.round() as i32, y.round() as i32),
                    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
                        .color(&BLACK)
                        .pos(Pos::new(HPos::Center, VPos::Center)),
                ))?;
            }
        }
        Ok(())
    }

    fn draw_venn(area: &Area<'_>, s: Scale, title: &str, overlap: &TriSetOverlap) -> DrawResult {
        let inner = area.titled(title, s.text(TITLE_PT))?;
        let (w, h) = inner.dim_in_pixel();
        let band = s.px(LABEL_PT) * 2.0;
        let sizes = overlap.sets.each_ref().map(|set| set.indices.len());
        let disjoint = overlap.regions.is_disjoint();

        let mut circles = layout::venn_layout(sizes, disjoint, w as f64, h as f64 - 2.0 * band);
        for c in circles.iter_mut() {
            c.cy += band;
        }

        for (i, c) in circles.iter().enumerate() {
            let center = (c.cx.round() as i32, c.cy.round() as i32);
            let radius = c.r.round() as i32;
            inner.draw(&Circle::new(center, radius, categorical(i).mix(0.4).filled()))?;
            inner.draw(&Circle::new(center, radius, BLACK.mix(0.5).stroke_width(1)))?;
        }

        let anchors = layout::venn_label_positions(&circles);
        for (region, (count, (x, y))) in overlap
            .regions
            .as_array()
            .into_iter()
            .zip(anchors)
            .enumerate()
        {
            // Exclusive regions are 0, 1 and 3; the rest only exist when overlapping
            let exclusive = matches!(region, 0 | 1 | 3);
            if !exclusive && (disjoint || count == 0) {
                continue;
            }
            inner.draw(&Text::new(
                count.to_string(),
                (x.round() as i32, y.round() as i32),
                s.centered(ANNOTATION_PT, &BLACK),
            ))?;
        }

        // Set names above the top pair and below the third circle
        for (i, (set, c)) in overlap.sets.iter().zip(&circles).enumerate() {
            let y = if i < 2 {
                c.cy - c.r - band / 2.0
            } else {
                c.cy + c.r + band / 2.0
            };
            inner.draw(&Text::new(
                set.label.clone(),
                (c.cx.round() as i32, y.round() as i32),
                s.centered(LABEL_PT, &BLACK),
            ))?;
        }
        Ok(())
    }
}

/// Axis range with `pad` of the span added on each side.
///
/// Empty input gives `0..1`; a single value gets a unit-wide window.
fn padded_range(values: impl IntoIterator<Item = f64>, pad: f64) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return 0.0..1.0;
    }
    if lo == hi {
        return lo - 0.5..hi + 0.5;
    }
    let margin = (hi - lo) * pad;
    lo - margin..hi + margin
}

/// Category `i` sits at x = i.
fn category_range(n: usize) -> Range<f64> {
    -0.5..(n.max(1) as f64 - 0.5)
}

fn category_label(labels: &[&str], v: f64) -> String {
    let nearest = v.round();
    if (v - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    labels
        .get(nearest as usize)
        .map(|l| l.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_size_follows_figure_and_dpi() {
        assert_eq!(
            StaticChartRenderer::pixel_size(ChartKind::Line, 300),
            (3000, 1500)
        );
        assert_eq!(
            StaticChartRenderer::pixel_size(ChartKind::Venn, 100),
            (500, 500)
        );
    }

    #[test]
    fn padded_range_handles_degenerate_input() {
        assert_eq!(padded_range(Vec::<f64>::new(), 0.1), 0.0..1.0);
        assert_eq!(padded_range([3.0, 3.0], 0.1), 2.5..3.5);
        assert_eq!(padded_range([f64::NAN, 0.0, 10.0], 0.1), -1.0..11.0);
    }

    #[test]
    fn category_labels_only_on_integers() {
        let labels = ["Apple", "Samsung"];
        assert_eq!(category_label(&labels, 0.0), "Apple");
        assert_eq!(category_label(&labels, 1.0), "Samsung");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -1.0), "");
        assert_eq!(category_range(2), -0.5..1.5);
    }
}
