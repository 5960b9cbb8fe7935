//! Stats module - Chart input derivation and descriptive statistics

mod calculator;
mod deriver;

pub use calculator::{BoxSummary, Histogram, StatsCalculator, WHISKER_IQR};
pub use deriver::{
    BrandCounts, BrandIndexSet, ChartInputs, CorrelationMatrix, DeriveError, PieSlice,
    TriSetOverlap, VennRegions, PIE_START_ANGLE, TRI_SET_SIZE,
};
