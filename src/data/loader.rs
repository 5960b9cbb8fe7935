//! CSV Data Loader Module
//! Handles CSV file loading with Polars and hands the frame to the cleaner.

use super::processor::{CleaningMode, CleaningReport, DataProcessor};
use super::table::CleanedTable;
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Tokens read as missing, matching the usual data-frame defaults.
pub const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Reads listing files and produces cleaned tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataLoader {
    mode: CleaningMode,
}

impl DataLoader {
    pub fn new(mode: CleaningMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> CleaningMode {
        self.mode
    }

    fn read_options() -> CsvReadOptions {
        let parse_options = CsvParseOptions::default()
            .with_quote_char(Some(b'"'))
            .with_null_values(Some(NullValues::AllColumns(
                NA_TOKENS.iter().map(|token| (*token).into()).collect(),
            )));

        // Full-file inference so a single stray token turns the column into text
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_ignore_errors(true)
            .with_parse_options(parse_options)
    }

    /// Read a CSV file into a raw DataFrame without cleaning it.
    pub fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let df = Self::read_options()
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        debug!(rows = df.height(), columns = df.width(), "read {}", path.display());
        Ok(df)
    }

    /// Read CSV content already held in memory.
    pub fn read_csv_bytes(bytes: Vec<u8>) -> Result<DataFrame, LoaderError> {
        let df = Self::read_options()
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;
        Ok(df)
    }

    /// Load and clean the listing file at `path`.
    pub fn load(&self, path: &Path) -> Result<(CleanedTable, CleaningReport), LoaderError> {
        info!("Loading dataset from: {}", path.display());
        let df = Self::read_csv(path)?;
        DataProcessor::clean(&df, self.mode)
    }

    /// Load and clean CSV content held in memory.
    pub fn load_bytes(
        &self,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<(CleanedTable, CleaningReport), LoaderError> {
        let df = Self::read_csv_bytes(bytes.into())?;
        DataProcessor::clean(&df, self.mode)
    }
}

/// Whether a column dtype counts as numeric for correlation purposes.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}
