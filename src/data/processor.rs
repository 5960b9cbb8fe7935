//! Data Processor Module
//! Handles data cleaning: whole-row missing-value removal followed by
//! per-cell numeric coercion of the listing price and rating fields.

use super::loader::{is_numeric_dtype, LoaderError};
use super::table::{
    CleanedTable, ColumnValues, ExtraColumn, NumericField, BRAND, REQUIRED_COLUMNS,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// What to do with rows whose numeric coercion failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleaningMode {
    /// Keep the row; the failed cell stays missing.
    #[default]
    Lenient,
    /// Drop the row after coercion.
    Strict,
}

/// Counts of what the cleaner removed or rewrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub mode: CleaningMode,
    pub rows_read: usize,
    /// Rows discarded because some column was missing in the source.
    pub rows_dropped_missing: usize,
    /// Per-field count of cells that failed to parse as a number.
    pub coerced_to_missing: BTreeMap<String, usize>,
    /// Rows discarded by the strict re-filter.
    pub rows_dropped_after_coercion: usize,
    pub rows_kept: usize,
}

impl CleaningReport {
    pub fn total_coerced(&self) -> usize {
        self.coerced_to_missing.values().sum()
    }
}

/// Handles data cleaning and transformation operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Check that every required column is present.
    pub fn validate_schema(df: &DataFrame) -> Result<(), LoaderError> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !names.iter().any(|n| n == *required))
            .map(|s| s.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(LoaderError::MissingColumns(missing))
        }
    }

    /// Clean a raw frame into a `CleanedTable`.
    pub fn clean(
        df: &DataFrame,
        mode: CleaningMode,
    ) -> Result<(CleanedTable, CleaningReport), LoaderError> {
        Self::validate_schema(df)?;

        let height = df.height();
        let keep = Self::complete_rows(df)?;
        let index: Vec<usize> = (0..height).filter(|&i| keep[i]).collect();

        let mut report = CleaningReport {
            mode,
            rows_read: height,
            rows_dropped_missing: height - index.len(),
            ..Default::default()
        };

        let mut brands = Vec::new();
        let mut numeric: [Vec<Option<f64>>; 3] = Default::default();
        let mut extra = Vec::new();
        let mut column_order = Vec::new();

        for column in df.get_columns() {
            let name = column.name().to_string();
            column_order.push(name.clone());

            if name == BRAND {
                brands = Self::text_values(column, &index)?;
            } else if let Some(field) = NumericField::from_column_name(&name) {
                let values = Self::coerce_numeric(column, &index)?;
                let failed = values.iter().filter(|v| v.is_none()).count();
                if failed > 0 {
                    warn!(column = %name, cells = failed, "cells could not be parsed as numbers");
                }
                report.coerced_to_missing.insert(name, failed);
                numeric[field as usize] = values;
            } else if is_numeric_dtype(column.dtype()) {
                extra.push(ExtraColumn {
                    name,
                    values: ColumnValues::Numeric(Self::coerce_numeric(column, &index)?),
                });
            } else {
                extra.push(ExtraColumn {
                    name,
                    values: ColumnValues::Text(Self::text_values(column, &index)?),
                });
            }
        }

        let mut table = CleanedTable::new(index, brands, numeric, extra, column_order);

        if mode == CleaningMode::Strict {
            let keep: Vec<bool> = table
                .records()
                .map(|r| NumericField::ALL.iter().all(|f| r.get(*f).is_some()))
                .collect();
            let before = table.len();
            table.retain(&keep);
            report.rows_dropped_after_coercion = before - table.len();
        }

        report.rows_kept = table.len();

        if report.rows_dropped_missing > 0 {
            warn!(
                rows = report.rows_dropped_missing,
                "dropped rows with missing values"
            );
        }
        if report.rows_dropped_after_coercion > 0 {
            warn!(
                rows = report.rows_dropped_after_coercion,
                "dropped rows whose numeric fields failed to parse"
            );
        }
        info!(
            rows_read = report.rows_read,
            rows_kept = report.rows_kept,
            coerced = report.total_coerced(),
            "dataset cleaned"
        );

        Ok((table, report))
    }

    /// Mask of rows with no missing value in any column.
    fn complete_rows(df: &DataFrame) -> Result<Vec<bool>, LoaderError> {
        let mut keep = vec![true; df.height()];
        for column in df.get_columns() {
            for (i, flag) in keep.iter_mut().enumerate() {
                if *flag && is_missing(&column.get(i)?) {
                    *flag = false;
                }
            }
        }
        Ok(keep)
    }

    /// Parse cells as numbers; anything unparsable becomes `None`.
    fn coerce_numeric(column: &Column, rows: &[usize]) -> Result<Vec<Option<f64>>, LoaderError> {
        let value_f64 = column.cast(&DataType::Float64)?;
        let value_ca = value_f64.f64()?;
        Ok(rows
            .iter()
            .map(|&i| value_ca.get(i).filter(|v| !v.is_nan()))
            .collect())
    }

    fn text_values(column: &Column, rows: &[usize]) -> Result<Vec<String>, LoaderError> {
        rows.iter()
            .map(|&i| -> Result<String, LoaderError> { Ok(cell_text(&column.get(i)?)) })
            .collect()
    }
}

fn is_missing(value: &AnyValue) -> bool {
    match value {
        AnyValue::Float64(v) => v.is_nan(),
        AnyValue::Float32(v) => v.is_nan(),
        other => other.is_null(),
    }
}

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::String(s) => s.to_string(),
        other => other.to_string().trim_matches('"').to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("Brand".into(), vec![Some("A"), Some("B"), None, Some("C")]),
            Column::new(
                "Selling Price".into(),
                vec![Some("100"), Some("oops"), Some("300"), Some("400")],
            ),
            Column::new("Original Price".into(), vec![Some(1.0), Some(2.0), Some(3.0), Some(f64::NAN)]),
            Column::new("Rating".into(), vec![Some(4.0), Some(4.1), Some(4.2), Some(4.3)]),
        ])
        .unwrap()
    }

    #[test]
    fn missing_rows_dropped_before_coercion() {
        let (table, report) = DataProcessor::clean(&frame(), CleaningMode::Lenient).unwrap();
        assert_eq!(table.index(), &[0, 1]);
        assert_eq!(report.rows_dropped_missing, 2);
        assert_eq!(report.coerced_to_missing.get("Selling Price"), Some(&1));
        assert_eq!(
            table.numeric(NumericField::SellingPrice),
            &[Some(100.0), None]
        );
    }

    #[test]
    fn strict_mode_refilters() {
        let (table, report) = DataProcessor::clean(&frame(), CleaningMode::Strict).unwrap();
        assert_eq!(table.index(), &[0]);
        assert_eq!(report.rows_dropped_after_coercion, 1);
        assert_eq!(report.rows_kept, 1);
    }

    #[test]
    fn schema_errors_list_absent_columns() {
        let df = DataFrame::new(vec![Column::new("Brand".into(), vec!["A"])]).unwrap();
        match DataProcessor::clean(&df, CleaningMode::Lenient) {
            Err(LoaderError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["Selling Price", "Original Price", "Rating"])
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn mode_parses_lowercase() {
        let mode: CleaningMode = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(mode, CleaningMode::Strict);
    }
}
