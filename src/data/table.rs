//! Cleaned Table Module
//! Column store holding the listings that survived cleaning.

use polars::prelude::*;

pub const BRAND: &str = "Brand";
pub const SELLING_PRICE: &str = "Selling Price";
pub const ORIGINAL_PRICE: &str = "Original Price";
pub const RATING: &str = "Rating";

/// Columns that must be present in every input file.
pub const REQUIRED_COLUMNS: [&str; 4] = [BRAND, SELLING_PRICE, ORIGINAL_PRICE, RATING];

/// The three listing fields that are coerced to numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    SellingPrice,
    OriginalPrice,
    Rating,
}

impl NumericField {
    pub const ALL: [NumericField; 3] = [
        NumericField::SellingPrice,
        NumericField::OriginalPrice,
        NumericField::Rating,
    ];

    pub fn column_name(self) -> &'static str {
        match self {
            NumericField::SellingPrice => SELLING_PRICE,
            NumericField::OriginalPrice => ORIGINAL_PRICE,
            NumericField::Rating => RATING,
        }
    }

    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column_name() == name)
    }
}

/// Values of a column that is not one of the required listing fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Text(Vec<String>),
    Numeric(Vec<Option<f64>>),
}

impl ColumnValues {
    fn len(&self) -> usize {
        match self {
            ColumnValues::Text(v) => v.len(),
            ColumnValues::Numeric(v) => v.len(),
        }
    }

    fn retain(&mut self, keep: &[bool]) {
        match self {
            ColumnValues::Text(v) => retain_by_mask(v, keep),
            ColumnValues::Numeric(v) => retain_by_mask(v, keep),
        }
    }
}

/// Any additional column carried through from the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraColumn {
    pub name: String,
    pub values: ColumnValues,
}

/// One phone listing, borrowed from the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record<'a> {
    /// Position of the row in the loaded file.
    pub index: usize,
    pub brand: &'a str,
    pub selling_price: Option<f64>,
    pub original_price: Option<f64>,
    pub rating: Option<f64>,
}

impl Record<'_> {
    pub fn get(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::SellingPrice => self.selling_price,
            NumericField::OriginalPrice => self.original_price,
            NumericField::Rating => self.rating,
        }
    }
}

/// Ordered listings after missing-row removal and numeric coercion.
///
/// Row order follows the source file; `index()` keeps each row's original
/// position so derived charts can label points the way the file numbers them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleanedTable {
    index: Vec<usize>,
    brands: Vec<String>,
    selling_price: Vec<Option<f64>>,
    original_price: Vec<Option<f64>>,
    rating: Vec<Option<f64>>,
    extra: Vec<ExtraColumn>,
    column_order: Vec<String>,
}

impl CleanedTable {
    pub(crate) fn new(
        index: Vec<usize>,
        brands: Vec<String>,
        numeric: [Vec<Option<f64>>; 3],
        extra: Vec<ExtraColumn>,
        column_order: Vec<String>,
    ) -> Self {
        let [selling_price, original_price, rating] = numeric;
        debug_assert!(brands.len() == index.len());
        debug_assert!(extra.iter().all(|c| c.values.len() == index.len()));
        Self {
            index,
            brands,
            selling_price,
            original_price,
            rating,
            extra,
            column_order,
        }
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Original file positions of the kept rows.
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn brands(&self) -> &[String] {
        &self.brands
    }

    pub fn numeric(&self, field: NumericField) -> &[Option<f64>] {
        match field {
            NumericField::SellingPrice => &self.selling_price,
            NumericField::OriginalPrice => &self.original_price,
            NumericField::Rating => &self.rating,
        }
    }

    /// All column names in source order.
    pub fn column_names(&self) -> &[String] {
        &self.column_order
    }

    pub fn extra_columns(&self) -> &[ExtraColumn] {
        &self.extra
    }

    /// Every numeric-typed column (coerced fields included) in source order.
    pub fn numeric_columns(&self) -> Vec<(&str, &[Option<f64>])> {
        self.column_order
            .iter()
            .filter_map(|name| {
                if let Some(field) = NumericField::from_column_name(name) {
                    return Some((name.as_str(), self.numeric(field)));
                }
                self.extra
                    .iter()
                    .find(|c| &c.name == name)
                    .and_then(|c| match &c.values {
                        ColumnValues::Numeric(values) => Some((name.as_str(), values.as_slice())),
                        ColumnValues::Text(_) => None,
                    })
            })
            .collect()
    }

    pub fn record(&self, row: usize) -> Option<Record<'_>> {
        Some(Record {
            index: *self.index.get(row)?,
            brand: self.brands.get(row)?.as_str(),
            selling_price: self.selling_price.get(row).copied().flatten(),
            original_price: self.original_price.get(row).copied().flatten(),
            rating: self.rating.get(row).copied().flatten(),
        })
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> + '_ {
        (0..self.len()).filter_map(move |row| self.record(row))
    }

    /// Number of rows holding a coercion-missing value in any listing field.
    pub fn rows_with_missing_numeric(&self) -> usize {
        self.records()
            .filter(|r| NumericField::ALL.iter().any(|f| r.get(*f).is_none()))
            .count()
    }

    /// Drop every row whose mask entry is false.
    pub(crate) fn retain(&mut self, keep: &[bool]) {
        retain_by_mask(&mut self.index, keep);
        retain_by_mask(&mut self.brands, keep);
        retain_by_mask(&mut self.selling_price, keep);
        retain_by_mask(&mut self.original_price, keep);
        retain_by_mask(&mut self.rating, keep);
        for column in &mut self.extra {
            column.values.retain(keep);
        }
    }

    /// Rebuild a DataFrame with the source column order.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns: Vec<Column> = self
            .column_order
            .iter()
            .filter_map(|name| {
                if name == BRAND {
                    return Some(Column::new(name.as_str().into(), self.brands.clone()));
                }
                if let Some(field) = NumericField::from_column_name(name) {
                    return Some(Column::new(name.as_str().into(), self.numeric(field).to_vec()));
                }
                self.extra
                    .iter()
                    .find(|c| &c.name == name)
                    .map(|c| match &c.values {
                        ColumnValues::Text(v) => Column::new(name.as_str().into(), v.clone()),
                        ColumnValues::Numeric(v) => Column::new(name.as_str().into(), v.clone()),
                    })
            })
            .collect();

        DataFrame::new(columns)
    }
}

fn retain_by_mask<T>(values: &mut Vec<T>, keep: &[bool]) {
    let mut flags = keep.iter();
    values.retain(|_| flags.next().copied().unwrap_or(false));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CleanedTable {
        CleanedTable::new(
            vec![0, 2, 5],
            vec!["A".into(), "B".into(), "A".into()],
            [
                vec![Some(1.0), Some(2.0), None],
                vec![Some(3.0), Some(4.0), Some(5.0)],
                vec![Some(4.0), Some(3.5), Some(5.0)],
            ],
            vec![ExtraColumn {
                name: "Model".into(),
                values: ColumnValues::Text(vec!["m1".into(), "m2".into(), "m3".into()]),
            }],
            vec![
                "Brand".into(),
                "Model".into(),
                "Rating".into(),
                "Selling Price".into(),
                "Original Price".into(),
            ],
        )
    }

    #[test]
    fn records_keep_file_positions() {
        let table = sample();
        let indices: Vec<usize> = table.records().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 2, 5]);
        assert_eq!(table.record(2).map(|r| r.selling_price), Some(None));
        assert_eq!(table.rows_with_missing_numeric(), 1);
    }

    #[test]
    fn numeric_columns_follow_source_order() {
        let table = sample();
        let names: Vec<&str> = table.numeric_columns().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["Rating", "Selling Price", "Original Price"]);
    }

    #[test]
    fn retain_drops_rows_in_every_column() {
        let mut table = sample();
        table.retain(&[true, false, true]);
        assert_eq!(table.index(), &[0, 5]);
        assert_eq!(table.brands(), &["A".to_string(), "A".to_string()]);
        match &table.extra_columns()[0].values {
            ColumnValues::Text(v) => assert_eq!(v, &vec!["m1".to_string(), "m3".to_string()]),
            ColumnValues::Numeric(_) => panic!("expected text column"),
        }
    }

    #[test]
    fn dataframe_round_trip_keeps_shape() {
        let df = sample().to_dataframe().unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 5);
    }
}
