use chartify_phones::charts::{ChartKind, ChartSink, GallerySink, StaticChartRenderer};
use chartify_phones::pipeline::SUMMARY_FILE;
use chartify_phones::{Pipeline, VizConfig};
use std::path::Path;

const DPI: u32 = 40;

const LISTINGS: &str = "\
Brand,Selling Price,Original Price,Rating
Samsung,15000,17000,4.2
Apple,55000,60000,4.6
Realme,9000,11000,4.0
Samsung,21000,24000,4.3
Apple,32000,35000,4.5
Xiaomi,9500,call,4.1
Realme,12000,on request,4.2
Samsung,11000,12500,4.0
";

/// Every row has a missing cell somewhere.
const ALL_INCOMPLETE: &str = "\
Brand,Selling Price,Original Price,Rating
Samsung,15000,,4.2
Apple,,60000,4.6
,9000,11000,4.0
";

fn config(dir: &Path, csv: &str, persist: bool) -> VizConfig {
    let input = dir.join("listings.csv");
    std::fs::write(&input, csv).unwrap();
    VizConfig {
        input,
        output_dir: dir.join("charts"),
        persist_output: persist,
        show_window: false,
        dpi: DPI,
        ..VizConfig::default()
    }
}

#[test]
fn persisting_run_writes_every_chart_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), LISTINGS, true);
    let out = config.output_dir.clone();

    let summary = Pipeline::new(config).run(&mut []).unwrap();

    assert_eq!(summary.rendered.len(), ChartKind::ALL.len());
    assert!(summary.skipped.is_empty());
    assert_eq!(summary.written.len(), summary.rendered.len());
    for kind in ChartKind::ALL {
        let path = out.join(format!("{}.png", kind.file_stem()));
        assert!(path.is_file(), "missing {}", path.display());
    }

    let text = std::fs::read_to_string(out.join(SUMMARY_FILE)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["rendered"].as_array().unwrap().len(), ChartKind::ALL.len());
    assert_eq!(json["report"]["rows_kept"], 8);
}

#[test]
fn saved_image_matches_figure_size() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), LISTINGS, true);
    let out = config.output_dir.clone();
    Pipeline::new(config).run(&mut []).unwrap();

    let image = image::open(out.join("brand_distribution.png")).unwrap();
    assert_eq!(
        (image.width(), image.height()),
        StaticChartRenderer::pixel_size(ChartKind::Bar, DPI)
    );
}

#[test]
fn run_without_persistence_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), LISTINGS, false);
    let out = config.output_dir.clone();

    let mut gallery = GallerySink::new();
    let mut sinks: [&mut dyn ChartSink; 1] = [&mut gallery];
    let summary = Pipeline::new(config).run(&mut sinks).unwrap();

    assert!(summary.written.is_empty());
    assert!(!out.exists());
    assert_eq!(gallery.charts().len(), summary.rendered.len());
    for chart in gallery.charts() {
        let expected = StaticChartRenderer::pixel_size(chart.kind, DPI);
        assert_eq!((chart.image.width(), chart.image.height()), expected);
    }
}

#[test]
fn fully_dropped_input_still_renders_remaining_charts() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), ALL_INCOMPLETE, true);

    let summary = Pipeline::new(config).run(&mut []).unwrap();

    assert_eq!(summary.report.rows_read, 3);
    assert_eq!(summary.report.rows_kept, 0);
    let skipped: Vec<ChartKind> = summary.skipped.iter().map(|s| s.kind).collect();
    assert_eq!(skipped, vec![ChartKind::Histogram, ChartKind::Venn]);
    assert_eq!(summary.rendered.len(), ChartKind::ALL.len() - 2);
    assert_eq!(summary.written.len(), summary.rendered.len());
}

#[test]
fn two_brands_skip_only_the_venn_chart() {
    let csv = "\
Brand,Selling Price,Original Price,Rating
X,100,120,4.0
X,200,220,4.5
Y,150,bad,3.0
";
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), csv, false);

    let summary = Pipeline::new(config).run(&mut []).unwrap();

    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].kind, ChartKind::Venn);
    assert_eq!(summary.rendered.len(), ChartKind::ALL.len() - 1);
}

#[test]
fn missing_input_fails_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let config = VizConfig {
        input: dir.path().join("absent.csv"),
        output_dir: dir.path().join("charts"),
        show_window: false,
        dpi: DPI,
        ..VizConfig::default()
    };
    let out = config.output_dir.clone();

    let err = Pipeline::new(config).run(&mut []).unwrap_err();
    assert!(format!("{err:#}").contains("not found"));
    assert!(!out.exists());
}
