//! Data module - CSV loading and cleaning

mod loader;
mod processor;
mod table;

pub use loader::{is_numeric_dtype, DataLoader, LoaderError, NA_TOKENS};
pub use processor::{CleaningMode, CleaningReport, DataProcessor};
pub use table::{
    CleanedTable, ColumnValues, ExtraColumn, NumericField, Record, BRAND, ORIGINAL_PRICE, RATING,
    REQUIRED_COLUMNS, SELLING_PRICE,
};
