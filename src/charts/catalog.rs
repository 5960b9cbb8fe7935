//! Chart Catalog Module
//! The fixed sequence of charts and the inputs each one is drawn from.

use crate::config::VizConfig;
use crate::data::{CleanedTable, NumericField};
use crate::stats::{
    BoxSummary, BrandCounts, ChartInputs, CorrelationMatrix, DeriveError, Histogram, PieSlice,
    StatsCalculator, TriSetOverlap,
};
use serde::Serialize;
use tracing::{debug, warn};

/// Points sampled along each KDE curve.
const KDE_POINTS: usize = 200;
/// Violin tails extend this many bandwidths past the data.
const VIOLIN_CUT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChartKind {
    Line,
    Bar,
    Histogram,
    Scatter,
    Scatter3d,
    Box,
    Violin,
    Heatmap,
    WordCloud,
    Pie,
    Bubble,
    Treemap,
    Venn,
}

impl ChartKind {
    pub const ALL: [ChartKind; 13] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Histogram,
        ChartKind::Scatter,
        ChartKind::Scatter3d,
        ChartKind::Box,
        ChartKind::Violin,
        ChartKind::Heatmap,
        ChartKind::WordCloud,
        ChartKind::Pie,
        ChartKind::Bubble,
        ChartKind::Treemap,
        ChartKind::Venn,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Line => "Selling Price Trend",
            ChartKind::Bar => "Brand Distribution",
            ChartKind::Histogram => "Selling Price Distribution",
            ChartKind::Scatter => "Rating vs Selling Price",
            ChartKind::Scatter3d => "3D Scatter Plot",
            ChartKind::Box => "Selling Price Distribution by Brand",
            ChartKind::Violin => "Selling Price Violin Plot by Brand",
            ChartKind::Heatmap => "Correlation Heatmap",
            ChartKind::WordCloud => "Brand Word Cloud",
            ChartKind::Pie => "Top 10 Brands Distribution",
            ChartKind::Bubble => "Bubble Plot - Selling Price vs Ratings",
            ChartKind::Treemap => "Brand Distribution Treemap",
            ChartKind::Venn => "Venn Diagram of Top 3 Brands",
        }
    }

    pub fn file_stem(self) -> &'static str {
        match self {
            ChartKind::Line => "selling_price_trend",
            ChartKind::Bar => "brand_distribution",
            ChartKind::Histogram => "selling_price_distribution",
            ChartKind::Scatter => "scatter_plot_rating_vs_price",
            ChartKind::Scatter3d => "3d_scatter_plot",
            ChartKind::Box => "box_plot_brand_vs_price",
            ChartKind::Violin => "violin_plot_brand_vs_price",
            ChartKind::Heatmap => "correlation_heatmap",
            ChartKind::WordCloud => "brand_wordcloud",
            ChartKind::Pie => "top_10_brands_pie_chart",
            ChartKind::Bubble => "bubble_plot",
            ChartKind::Treemap => "brand_treemap",
            ChartKind::Venn => "top_3_brands_venn",
        }
    }

    /// Figure size in inches (width, height).
    pub fn figure_size(self) -> (f64, f64) {
        match self {
            ChartKind::Line | ChartKind::WordCloud => (10.0, 5.0),
            ChartKind::Bar | ChartKind::Box | ChartKind::Violin => (12.0, 6.0),
            ChartKind::Histogram | ChartKind::Scatter => (8.0, 5.0),
            ChartKind::Scatter3d
            | ChartKind::Heatmap
            | ChartKind::Bubble
            | ChartKind::Treemap => (10.0, 6.0),
            ChartKind::Pie => (8.0, 8.0),
            ChartKind::Venn => (5.0, 5.0),
        }
    }
}

/// One violin: density curve along the value axis plus its box summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolinGroup {
    pub label: String,
    /// `(value, density)` pairs.
    pub curve: Vec<(f64, f64)>,
    pub summary: Option<BoxSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bubble {
    pub x: f64,
    pub y: f64,
    /// Marker area in points squared.
    pub size: f64,
}

/// Derived payload handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartData {
    Line {
        x_label: &'static str,
        y_label: &'static str,
        points: Vec<(usize, Option<f64>)>,
    },
    Bar {
        x_label: &'static str,
        y_label: &'static str,
        counts: BrandCounts,
    },
    Histogram {
        x_label: &'static str,
        histogram: Histogram,
        /// KDE scaled to bin counts.
        kde: Vec<(f64, f64)>,
    },
    Scatter {
        x_label: &'static str,
        y_label: &'static str,
        points: Vec<(f64, f64)>,
    },
    Scatter3d {
        labels: [&'static str; 3],
        points: Vec<(f64, f64, f64)>,
    },
    Box {
        y_label: &'static str,
        groups: Vec<(String, Option<BoxSummary>)>,
    },
    Violin {
        y_label: &'static str,
        groups: Vec<ViolinGroup>,
    },
    Heatmap(CorrelationMatrix),
    WordCloud {
        text: String,
    },
    Pie(Vec<PieSlice>),
    Bubble {
        x_label: &'static str,
        y_label: &'static str,
        bubbles: Vec<Bubble>,
    },
    Treemap(BrandCounts),
    Venn(TriSetOverlap),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub file_stem: String,
    pub data: ChartData,
}

impl Chart {
    fn new(kind: ChartKind, data: ChartData) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            file_stem: kind.file_stem().to_string(),
            data,
        }
    }
}

/// A chart that could not be produced, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedChart {
    pub kind: ChartKind,
    pub title: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSet {
    pub charts: Vec<Chart>,
    pub skipped: Vec<SkippedChart>,
}

/// Derive every chart's input from the cleaned table.
///
/// A chart whose derivation fails is listed in `skipped`; the rest proceed.
pub fn build_charts(table: &CleanedTable, config: &VizConfig) -> ChartSet {
    let inputs = ChartInputs::new(table);
    let mut set = ChartSet::default();

    for kind in ChartKind::ALL {
        match derive_chart(&inputs, kind, config) {
            Ok(chart) => {
                debug!(chart = chart.title.as_str(), "chart input derived");
                set.charts.push(chart);
            }
            Err(err) => {
                warn!(chart = kind.title(), "skipping chart: {}", err);
                set.skipped.push(SkippedChart {
                    kind,
                    title: kind.title().to_string(),
                    reason: err.to_string(),
                });
            }
        }
    }

    set
}

fn derive_chart(
    inputs: &ChartInputs<'_>,
    kind: ChartKind,
    config: &VizConfig,
) -> Result<Chart, DeriveError> {
    use NumericField::{OriginalPrice, Rating, SellingPrice};

    let data = match kind {
        ChartKind::Line => ChartData::Line {
            x_label: "Index",
            y_label: SellingPrice.column_name(),
            points: inputs.indexed_series(SellingPrice),
        },
        ChartKind::Bar => ChartData::Bar {
            x_label: "Brand",
            y_label: "Count",
            counts: inputs.brand_counts(),
        },
        ChartKind::Histogram => {
            let histogram = inputs.histogram(SellingPrice, config.histogram_bins)?;
            let values = inputs.values(SellingPrice);
            let scale = values.len() as f64 * histogram.bin_width();
            let (lo, hi) = match (histogram.edges.first(), histogram.edges.last()) {
                (Some(lo), Some(hi)) => (*lo, *hi),
                _ => (0.0, 0.0),
            };
            let kde = StatsCalculator::gaussian_kde(&values, lo, hi, KDE_POINTS)
                .into_iter()
                .map(|(x, d)| (x, d * scale))
                .collect();
            ChartData::Histogram {
                x_label: SellingPrice.column_name(),
                histogram,
                kde,
            }
        }
        ChartKind::Scatter => ChartData::Scatter {
            x_label: Rating.column_name(),
            y_label: SellingPrice.column_name(),
            points: inputs.paired(Rating, SellingPrice),
        },
        ChartKind::Scatter3d => ChartData::Scatter3d {
            labels: [
                SellingPrice.column_name(),
                OriginalPrice.column_name(),
                Rating.column_name(),
            ],
            points: inputs.tripled(SellingPrice, OriginalPrice, Rating),
        },
        ChartKind::Box => ChartData::Box {
            y_label: SellingPrice.column_name(),
            groups: inputs
                .grouped_by_brand(SellingPrice)
                .into_iter()
                .map(|(label, values)| (label, StatsCalculator::box_summary(&values)))
                .collect(),
        },
        ChartKind::Violin => ChartData::Violin {
            y_label: SellingPrice.column_name(),
            groups: inputs
                .grouped_by_brand(SellingPrice)
                .into_iter()
                .map(|(label, values)| violin_group(label, &values))
                .collect(),
        },
        ChartKind::Heatmap => ChartData::Heatmap(inputs.numeric_correlation()),
        ChartKind::WordCloud => ChartData::WordCloud {
            text: inputs.brand_text_blob(),
        },
        ChartKind::Pie => ChartData::Pie(inputs.pie_slices(config.pie_top_n)?),
        ChartKind::Bubble => {
            let sizes = inputs.bubble_sizes(config.bubble_scale)?;
            let bubbles = inputs
                .table()
                .records()
                .zip(sizes)
                .filter_map(|(r, size)| {
                    Some(Bubble {
                        x: r.rating?,
                        y: r.selling_price?,
                        size: size?,
                    })
                })
                .collect();
            ChartData::Bubble {
                x_label: Rating.column_name(),
                y_label: SellingPrice.column_name(),
                bubbles,
            }
        }
        ChartKind::Treemap => ChartData::Treemap(inputs.brand_counts()),
        ChartKind::Venn => ChartData::Venn(inputs.tri_set_overlap()?),
    };

    let mut chart = Chart::new(kind, data);
    if kind == ChartKind::Pie && config.pie_top_n != 10 {
        chart.title = format!("Top {} Brands Distribution", config.pie_top_n);
        chart.file_stem = format!("top_{}_brands_pie_chart", config.pie_top_n);
    }
    Ok(chart)
}

fn violin_group(label: String, values: &[f64]) -> ViolinGroup {
    let summary = StatsCalculator::box_summary(values);
    let curve = match (StatsCalculator::scott_bandwidth(values), &summary) {
        (Some(bw), Some(_)) => {
            let sorted = StatsCalculator::sorted(values);
            let lo = sorted[0] - VIOLIN_CUT * bw;
            let hi = sorted[sorted.len() - 1] + VIOLIN_CUT * bw;
            StatsCalculator::gaussian_kde(values, lo, hi, KDE_POINTS)
        }
        _ => Vec::new(),
    };
    ViolinGroup {
        label,
        curve,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_distinct_file_stem() {
        let mut stems: Vec<&str> = ChartKind::ALL.iter().map(|k| k.file_stem()).collect();
        stems.sort();
        stems.dedup();
        assert_eq!(stems.len(), 13);
    }

    #[test]
    fn violin_of_constant_group_has_no_curve() {
        let group = violin_group("X".into(), &[5.0, 5.0, 5.0]);
        assert!(group.curve.is_empty());
        assert_eq!(group.summary.map(|s| s.median), Some(5.0));
    }

    #[test]
    fn violin_curve_extends_past_data() {
        let group = violin_group("X".into(), &[1.0, 2.0, 3.0, 4.0]);
        let first = group.curve.first().unwrap().0;
        let last = group.curve.last().unwrap().0;
        assert!(first < 1.0 && last > 4.0);
    }
}
