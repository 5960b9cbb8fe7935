use chartify_phones::data::{CleaningMode, DataLoader, DataProcessor, LoaderError, NumericField};
use chartify_phones::stats::ChartInputs;
use chartify_phones::{Pipeline, VizConfig};
use std::io::Write;

const LISTINGS: &str = "\
Brand,Model,Selling Price,Original Price,Rating
Apple,iPhone 12,55000,60000,4.6
Samsung,Galaxy M31,15000,,4.2
Xiaomi,Redmi 9,9000,10000,4.1
Apple,iPhone SE,32000,35000,NA
Samsung,Galaxy A51,21000,24000,4.3
";

fn load(csv: &str, mode: CleaningMode) -> chartify_phones::data::CleanedTable {
    DataLoader::new(mode).load_bytes(csv.as_bytes().to_vec()).unwrap().0
}

#[test]
fn rows_with_missing_cells_are_dropped() {
    let (table, report) = DataLoader::new(CleaningMode::Lenient)
        .load_bytes(LISTINGS.as_bytes().to_vec())
        .unwrap();

    assert_eq!(report.rows_read, 5);
    assert_eq!(report.rows_dropped_missing, 2);
    assert_eq!(table.len(), 3);
    assert_eq!(table.index(), &[0, 2, 4]);
    assert_eq!(table.brands(), &["Apple", "Xiaomi", "Samsung"]);
    assert_eq!(table.rows_with_missing_numeric(), 0);
}

#[test]
fn cleaning_a_clean_table_changes_nothing() {
    let table = load(LISTINGS, CleaningMode::Lenient);
    let df = table.to_dataframe().unwrap();
    let (again, report) = DataProcessor::clean(&df, CleaningMode::Lenient).unwrap();

    assert_eq!(report.rows_dropped_missing, 0);
    assert_eq!(report.total_coerced(), 0);
    assert_eq!(again.brands(), table.brands());
    for field in NumericField::ALL {
        assert_eq!(again.numeric(field), table.numeric(field));
    }
    assert_eq!(again.column_names(), table.column_names());
}

#[test]
fn numeric_fields_hold_numbers_or_missing() {
    let csv = "\
Brand,Selling Price,Original Price,Rating
Nokia,4999,5999,4.0
Nokia,about 5k,5999,four
Realme,8999,call us,3.9
";
    let (table, report) = DataLoader::new(CleaningMode::Lenient)
        .load_bytes(csv.as_bytes().to_vec())
        .unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(table.numeric(NumericField::SellingPrice), &[Some(4999.0), None, Some(8999.0)]);
    assert_eq!(table.numeric(NumericField::OriginalPrice), &[Some(5999.0), Some(5999.0), None]);
    assert_eq!(table.numeric(NumericField::Rating), &[Some(4.0), None, Some(3.9)]);
    assert_eq!(report.total_coerced(), 3);
    assert_eq!(report.coerced_to_missing.get("Rating"), Some(&1));
}

#[test]
fn strict_mode_drops_rows_that_failed_coercion() {
    let csv = "\
Brand,Selling Price,Original Price,Rating
Nokia,4999,5999,4.0
Nokia,about 5k,5999,4.1
Realme,8999,9999,3.9
";
    let (table, report) = DataLoader::new(CleaningMode::Strict)
        .load_bytes(csv.as_bytes().to_vec())
        .unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.index(), &[0, 2]);
    assert_eq!(report.rows_dropped_after_coercion, 1);
    assert_eq!(report.rows_kept, 2);
}

#[test]
fn scenario_with_unparsable_original_price() {
    let csv = "\
Brand,Selling Price,Original Price,Rating
X,100,120,4.0
X,200,220,4.5
Y,150,bad,3.0
";
    let table = load(csv, CleaningMode::Lenient);
    assert_eq!(table.len(), 3);
    assert_eq!(table.numeric(NumericField::OriginalPrice)[2], None);

    let inputs = ChartInputs::new(&table);
    let counts = inputs.brand_counts();
    assert_eq!(counts.as_slice(), &[("X".to_string(), 2), ("Y".to_string(), 1)]);

    // Pairwise-complete: rows 0 and 1 only for any pair with Original Price
    let corr = inputs.numeric_correlation();
    let r = corr.get("Selling Price", "Original Price").unwrap();
    assert!((r - 1.0).abs() < 1e-12);
    let r = corr.get("Original Price", "Rating").unwrap();
    assert!((r - 1.0).abs() < 1e-12);
    // All three rows for Selling Price vs Rating
    let r = corr.get("Selling Price", "Rating").unwrap();
    assert!(r > 0.0 && r < 1.0);
}

#[test]
fn missing_required_columns_are_listed() {
    let csv = "Brand,Price\nApple,100\n";
    let err = DataLoader::new(CleaningMode::Lenient)
        .load_bytes(csv.as_bytes().to_vec())
        .unwrap_err();

    match err {
        LoaderError::MissingColumns(columns) => {
            assert_eq!(columns, vec!["Selling Price", "Original Price", "Rating"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn absent_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.csv");
    let err = DataLoader::new(CleaningMode::Lenient).load(&path).unwrap_err();
    assert!(matches!(err, LoaderError::NotFound(p) if p == path));
}

#[test]
fn pipeline_loads_from_configured_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(LISTINGS.as_bytes()).unwrap();

    let config = VizConfig {
        input: file.path().to_path_buf(),
        persist_output: false,
        show_window: false,
        ..VizConfig::default()
    };
    let (table, report) = Pipeline::new(config).load().unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(report.rows_kept, 3);
}
