//! Chart-Input Deriver Module
//! Pure summaries computed from a cleaned table, one per chart need.

use super::calculator::{Histogram, StatsCalculator};
use crate::data::{CleanedTable, NumericField};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Number of categories the overlap diagram compares.
pub const TRI_SET_SIZE: usize = 3;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeriveError {
    #[error("Insufficient categories: {required} required, {available} available")]
    InsufficientCategories { required: usize, available: usize },
    #[error("No values available for {0}")]
    EmptyInput(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Brand label → count, ordered by descending count.
///
/// Ties keep the order in which the brands first appear in the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BrandCounts {
    entries: Vec<(String, usize)>,
}

impl BrandCounts {
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.entries.iter().map(|(label, count)| (label.as_str(), *count))
    }

    /// Number of distinct brands.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| *c)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(l, _)| l.as_str()).collect()
    }

    /// The first `n` entries (or all of them).
    pub fn top(&self, n: usize) -> &[(String, usize)] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn as_slice(&self) -> &[(String, usize)] {
        &self.entries
    }
}

/// Square Pearson matrix over the numeric-typed columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major; `None` where the coefficient is undefined.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == col)?;
        self.values[i][j]
    }
}

/// Rows (by file index) carrying one brand label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandIndexSet {
    pub label: String,
    pub indices: BTreeSet<usize>,
}

/// Venn region sizes for three sets, in the usual `100, 010, 110, 001,
/// 101, 011, 111` order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VennRegions {
    pub only_a: usize,
    pub only_b: usize,
    pub a_b: usize,
    pub only_c: usize,
    pub a_c: usize,
    pub b_c: usize,
    pub a_b_c: usize,
}

impl VennRegions {
    pub fn as_array(&self) -> [usize; 7] {
        [
            self.only_a,
            self.only_b,
            self.a_b,
            self.only_c,
            self.a_c,
            self.b_c,
            self.a_b_c,
        ]
    }

    /// True when no two sets share an element.
    pub fn is_disjoint(&self) -> bool {
        self.a_b + self.a_c + self.b_c + self.a_b_c == 0
    }
}

/// The three most frequent brands and how their row sets overlap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriSetOverlap {
    pub sets: [BrandIndexSet; TRI_SET_SIZE],
    pub regions: VennRegions,
}

/// One wedge of the top-brands pie, angles in degrees counter-clockwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    pub fraction: f64,
    /// Percentage text, one decimal.
    pub percent_label: String,
    pub start_deg: f64,
    pub end_deg: f64,
}

/// Angle of the first wedge's leading edge.
pub const PIE_START_ANGLE: f64 = 90.0;

/// Borrowing view that computes chart inputs on demand.
#[derive(Debug, Clone, Copy)]
pub struct ChartInputs<'a> {
    table: &'a CleanedTable,
}

impl<'a> ChartInputs<'a> {
    pub fn new(table: &'a CleanedTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a CleanedTable {
        self.table
    }

    /// Brand frequencies, most frequent first.
    pub fn brand_counts(&self) -> BrandCounts {
        let mut position: HashMap<&str, usize> = HashMap::new();
        let mut entries: Vec<(String, usize)> = Vec::new();

        for brand in self.table.brands() {
            match position.get(brand.as_str()) {
                Some(&i) => entries[i].1 += 1,
                None => {
                    position.insert(brand.as_str(), entries.len());
                    entries.push((brand.clone(), 1));
                }
            }
        }

        // Stable: equal counts stay in first-seen order
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        BrandCounts { entries }
    }

    /// The `n` most frequent brand labels (fewer if fewer exist).
    pub fn top_brands(&self, n: usize) -> Result<Vec<String>, DeriveError> {
        if n == 0 {
            return Err(DeriveError::InvalidArgument(
                "top_brands requires n >= 1".to_string(),
            ));
        }
        Ok(self
            .brand_counts()
            .top(n)
            .iter()
            .map(|(label, _)| label.clone())
            .collect())
    }

    /// Pearson correlation between every pair of numeric columns.
    pub fn numeric_correlation(&self) -> CorrelationMatrix {
        let columns = self.table.numeric_columns();
        let n = columns.len();

        let values: Vec<Vec<Option<f64>>> = (0..n)
            .into_par_iter()
            .map(|i| {
                (0..n)
                    .map(|j| {
                        let r = StatsCalculator::pearson(columns[i].1, columns[j].1);
                        if i == j {
                            r.map(|_| 1.0)
                        } else {
                            r
                        }
                    })
                    .collect()
            })
            .collect();

        CorrelationMatrix {
            columns: columns.iter().map(|(name, _)| name.to_string()).collect(),
            values,
        }
    }

    /// Every brand label, space-separated, in row order.
    pub fn brand_text_blob(&self) -> String {
        self.table.brands().join(" ")
    }

    /// Original price divided by `scale`, per row.
    pub fn bubble_sizes(&self, scale: f64) -> Result<Vec<Option<f64>>, DeriveError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(DeriveError::InvalidArgument(format!(
                "bubble scale must be positive, got {scale}"
            )));
        }
        Ok(self
            .table
            .numeric(NumericField::OriginalPrice)
            .iter()
            .map(|v| v.map(|price| price / scale))
            .collect())
    }

    /// Row index sets for each distinct requested brand label.
    ///
    /// Repeated labels collapse into their first occurrence. Fails with
    /// `InsufficientCategories` when fewer of the distinct labels occur in
    /// the table than were asked for.
    pub fn brand_index_sets<S: AsRef<str>>(
        &self,
        labels: &[S],
    ) -> Result<Vec<BrandIndexSet>, DeriveError> {
        let mut sets: Vec<BrandIndexSet> = Vec::with_capacity(labels.len());
        for label in labels.iter().map(|l| l.as_ref()) {
            if !sets.iter().any(|s| s.label == label) {
                sets.push(BrandIndexSet {
                    label: label.to_string(),
                    indices: BTreeSet::new(),
                });
            }
        }

        for record in self.table.records() {
            for set in sets.iter_mut().filter(|s| s.label == record.brand) {
                set.indices.insert(record.index);
            }
        }

        let available = sets.iter().filter(|s| !s.indices.is_empty()).count();
        if available < sets.len() {
            return Err(DeriveError::InsufficientCategories {
                required: sets.len(),
                available,
            });
        }

        Ok(sets)
    }

    /// Overlap of the three most frequent brands' row sets.
    pub fn tri_set_overlap(&self) -> Result<TriSetOverlap, DeriveError> {
        let top = self.top_brands(TRI_SET_SIZE)?;
        if top.len() < TRI_SET_SIZE {
            return Err(DeriveError::InsufficientCategories {
                required: TRI_SET_SIZE,
                available: top.len(),
            });
        }

        let sets = self.brand_index_sets(&top)?;
        let [a, b, c]: [BrandIndexSet; TRI_SET_SIZE] =
            sets.try_into().map_err(|_: Vec<BrandIndexSet>| {
                DeriveError::InsufficientCategories {
                    required: TRI_SET_SIZE,
                    available: top.len(),
                }
            })?;

        let mut regions = VennRegions::default();
        let all: BTreeSet<usize> = a
            .indices
            .iter()
            .chain(&b.indices)
            .chain(&c.indices)
            .copied()
            .collect();
        for i in all {
            match (a.indices.contains(&i), b.indices.contains(&i), c.indices.contains(&i)) {
                (true, false, false) => regions.only_a += 1,
                (false, true, false) => regions.only_b += 1,
                (true, true, false) => regions.a_b += 1,
                (false, false, true) => regions.only_c += 1,
                (true, false, true) => regions.a_c += 1,
                (false, true, true) => regions.b_c += 1,
                (true, true, true) => regions.a_b_c += 1,
                (false, false, false) => {}
            }
        }

        Ok(TriSetOverlap {
            sets: [a, b, c],
            regions,
        })
    }

    /// `(file index, value)` per row; missing values stay `None`.
    pub fn indexed_series(&self, field: NumericField) -> Vec<(usize, Option<f64>)> {
        self.table
            .index()
            .iter()
            .copied()
            .zip(self.table.numeric(field).iter().copied())
            .collect()
    }

    /// The present values of one field.
    pub fn values(&self, field: NumericField) -> Vec<f64> {
        self.table.numeric(field).iter().flatten().copied().collect()
    }

    /// Equal-width histogram of one field.
    pub fn histogram(&self, field: NumericField, bins: usize) -> Result<Histogram, DeriveError> {
        if bins == 0 {
            return Err(DeriveError::InvalidArgument(
                "histogram requires at least one bin".to_string(),
            ));
        }
        StatsCalculator::histogram(&self.values(field), bins)
            .ok_or_else(|| DeriveError::EmptyInput(field.column_name().to_string()))
    }

    /// Points for rows where both fields are present.
    pub fn paired(&self, x: NumericField, y: NumericField) -> Vec<(f64, f64)> {
        self.table
            .records()
            .filter_map(|r| Some((r.get(x)?, r.get(y)?)))
            .collect()
    }

    /// Points for rows where all three fields are present.
    pub fn tripled(
        &self,
        x: NumericField,
        y: NumericField,
        z: NumericField,
    ) -> Vec<(f64, f64, f64)> {
        self.table
            .records()
            .filter_map(|r| Some((r.get(x)?, r.get(y)?, r.get(z)?)))
            .collect()
    }

    /// Present values of `field` grouped by brand, brands in first-seen order.
    pub fn grouped_by_brand(&self, field: NumericField) -> Vec<(String, Vec<f64>)> {
        let mut position: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(String, Vec<f64>)> = Vec::new();

        for record in self.table.records() {
            let slot = *position.entry(record.brand).or_insert_with(|| {
                groups.push((record.brand.to_string(), Vec::new()));
                groups.len() - 1
            });
            if let Some(v) = record.get(field) {
                groups[slot].1.push(v);
            }
        }

        groups
    }

    /// Wedges for the `n` most frequent brands.
    pub fn pie_slices(&self, n: usize) -> Result<Vec<PieSlice>, DeriveError> {
        if n == 0 {
            return Err(DeriveError::InvalidArgument(
                "pie requires n >= 1".to_string(),
            ));
        }

        let counts = self.brand_counts();
        let top = counts.top(n);
        let total: usize = top.iter().map(|(_, c)| c).sum();
        if total == 0 {
            return Ok(Vec::new());
        }

        let mut angle = PIE_START_ANGLE;
        Ok(top
            .iter()
            .map(|(label, count)| {
                let fraction = *count as f64 / total as f64;
                let start_deg = angle;
                angle += fraction * 360.0;
                PieSlice {
                    label: label.clone(),
                    count: *count,
                    fraction,
                    percent_label: format!("{:.1}%", fraction * 100.0),
                    start_deg,
                    end_deg: angle,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CleaningMode, DataLoader};

    fn table(csv: &str) -> CleanedTable {
        DataLoader::new(CleaningMode::Lenient)
            .load_bytes(csv.as_bytes().to_vec())
            .unwrap()
            .0
    }

    const LISTINGS: &str = "\
Brand,Selling Price,Original Price,Rating
B,10,12,4.0
A,20,22,4.1
B,30,33,4.2
C,40,44,4.3
A,50,55,4.4
D,60,66,4.5
";

    #[test]
    fn counts_rank_with_first_seen_ties() {
        let t = table(LISTINGS);
        let counts = ChartInputs::new(&t).brand_counts();
        assert_eq!(counts.labels(), vec!["B", "A", "C", "D"]);
        assert_eq!(counts.total(), t.len());
        assert_eq!(counts.get("A"), Some(2));
        assert_eq!(counts.get("Z"), None);
    }

    #[test]
    fn top_brands_truncates_and_rejects_zero() {
        let t = table(LISTINGS);
        let inputs = ChartInputs::new(&t);
        assert_eq!(inputs.top_brands(2).unwrap(), vec!["B", "A"]);
        assert_eq!(inputs.top_brands(10).unwrap().len(), 4);
        assert!(matches!(
            inputs.top_brands(0),
            Err(DeriveError::InvalidArgument(_))
        ));
    }

    #[test]
    fn blob_joins_in_row_order() {
        let t = table(LISTINGS);
        assert_eq!(ChartInputs::new(&t).brand_text_blob(), "B A B C A D");
    }

    #[test]
    fn bubble_sizes_scale_original_price() {
        let t = table(LISTINGS);
        let inputs = ChartInputs::new(&t);
        let sizes = inputs.bubble_sizes(100.0).unwrap();
        assert_eq!(sizes[0], Some(0.12));
        assert!(inputs.bubble_sizes(0.0).is_err());
        assert!(inputs.bubble_sizes(f64::NAN).is_err());
    }

    #[test]
    fn tri_set_overlap_is_disjoint() {
        let t = table(LISTINGS);
        let overlap = ChartInputs::new(&t).tri_set_overlap().unwrap();
        assert_eq!(overlap.sets[0].label, "B");
        assert_eq!(overlap.sets[2].label, "C");
        assert!(overlap.regions.is_disjoint());
        assert_eq!(overlap.regions.as_array(), [2, 2, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn grouped_values_follow_first_appearance() {
        let t = table(LISTINGS);
        let groups = ChartInputs::new(&t).grouped_by_brand(NumericField::SellingPrice);
        let labels: Vec<&str> = groups.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["B", "A", "C", "D"]);
        assert_eq!(groups[0].1, vec![10.0, 30.0]);
    }

    #[test]
    fn pie_slices_cover_full_circle() {
        let t = table(LISTINGS);
        let slices = ChartInputs::new(&t).pie_slices(10).unwrap();
        assert_eq!(slices.len(), 4);
        assert_eq!(slices[0].start_deg, PIE_START_ANGLE);
        let last = slices.last().unwrap();
        assert!((last.end_deg - (PIE_START_ANGLE + 360.0)).abs() < 1e-9);
        assert_eq!(slices[0].percent_label, "33.3%");
    }

    #[test]
    fn repeated_labels_collapse_into_one_set() {
        let t = table(LISTINGS);
        let inputs = ChartInputs::new(&t);

        let sets = inputs.brand_index_sets(&["A", "A", "B"]).unwrap();
        let labels: Vec<&str> = sets.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B"]);
        assert_eq!(sets[0].indices, BTreeSet::from([1, 4]));

        assert_eq!(
            inputs.brand_index_sets(&["A", "Z", "Z"]).unwrap_err(),
            DeriveError::InsufficientCategories {
                required: 2,
                available: 1
            }
        );
    }

    #[test]
    fn histogram_rejects_zero_bins() {
        let t = table(LISTINGS);
        let inputs = ChartInputs::new(&t);
        assert!(matches!(
            inputs.histogram(NumericField::SellingPrice, 0),
            Err(DeriveError::InvalidArgument(_))
        ));
        let hist = inputs.histogram(NumericField::SellingPrice, 5).unwrap();
        assert_eq!(hist.total(), 6);
    }
}
