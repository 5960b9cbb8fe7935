//! Charts module - Chart catalog, layout and static rendering

mod catalog;
pub mod layout;
pub mod palette;
mod renderer;
mod sink;

pub use catalog::{
    build_charts, Bubble, Chart, ChartData, ChartKind, ChartSet, SkippedChart, ViolinGroup,
};
pub use renderer::{RenderError, StaticChartRenderer};
pub use sink::{ChartSink, GallerySink, PngSink, RenderedChart};
