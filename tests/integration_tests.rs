use accident_heatmap::bucket::bucket_by_month;
use accident_heatmap::error::HeatmapError;
use accident_heatmap::loader::{CsvSettings, SyntheticSettings, generate_synthetic, load_csv};
use accident_heatmap::render::{
    ChartStyle, PlotlyJs, RenderTarget, build_figure, render_heatmap, write_html,
};
use std::env;
use std::fs;
use std::path::Path;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/accidents_sample.csv");

fn labels(frames: &[accident_heatmap::bucket::FrameLabel]) -> Vec<String> {
    frames.iter().map(|f| f.to_string()).collect()
}

#[test]
fn test_full_pipeline() {
    let records = load_csv(FIXTURE, &CsvSettings::default()).expect("Failed to load fixture");
    assert_eq!(records.len(), 8);

    let table = bucket_by_month(records);
    assert_eq!(labels(&table.frames), vec!["2016-01", "2016-02", "2016-03"]);

    let counts: Vec<usize> = table.frame_counts().iter().map(|c| c.rows).collect();
    assert_eq!(counts, vec![3, 3, 2]);

    let plot = build_figure(&table, &ChartStyle::default()).unwrap();
    assert_eq!(plot.frame_count(), 3);
    let v = serde_json::to_value(&plot).unwrap();
    assert_eq!(v["layout"]["sliders"][0]["steps"].as_array().unwrap().len(), 3);

    let path = format!("{}/accident_heatmap_pipeline.html", env::temp_dir().display());
    let _ = fs::remove_file(&path);
    write_html(&path, plot, PlotlyJs::default()).unwrap();

    let html = fs::read_to_string(&path).unwrap();
    assert!(html.contains("Monthly Trend (Jan 2016 - Mar 2016)"));
    assert!(!html.contains("<script src="));
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_fixture_row_order_is_stable() {
    let first = bucket_by_month(load_csv(FIXTURE, &CsvSettings::default()).unwrap());
    let second = bucket_by_month(load_csv(FIXTURE, &CsvSettings::default()).unwrap());
    assert_eq!(first.rows, second.rows);

    // January rows keep file order: A-3, A-5, A-10
    let january: Vec<f64> = first.rows[..3].iter().map(|r| r.record.latitude).collect();
    assert_eq!(january, vec![39.063148, 39.627781, 37.774929]);
}

#[test]
fn test_synthetic_pipeline_covers_sixty_months() {
    let settings = SyntheticSettings {
        seed: Some(2016),
        ..Default::default()
    };
    let table = bucket_by_month(generate_synthetic(&settings).unwrap());

    assert_eq!(table.frames.len(), 60);
    assert_eq!(table.frames.first().unwrap().to_string(), "2016-01");
    assert_eq!(table.frames.last().unwrap().to_string(), "2020-12");
    assert!(table.rows.windows(2).all(|w| w[0].frame <= w[1].frame));
}

#[test]
fn test_no_rows_in_range_fails_at_render() {
    let settings = CsvSettings {
        start_year: 2030,
        end_year: 2031,
        ..Default::default()
    };
    let table = bucket_by_month(load_csv(FIXTURE, &settings).unwrap());
    assert!(table.frames.is_empty());

    let result = build_figure(&table, &ChartStyle::default());
    assert!(matches!(result, Err(HeatmapError::EmptyFrames)));
}

#[test]
fn test_failed_render_writes_no_files() {
    let settings = CsvSettings {
        start_year: 2030,
        end_year: 2031,
        ..Default::default()
    };
    let table = bucket_by_month(load_csv(FIXTURE, &settings).unwrap());

    let dir = env::temp_dir();
    let target = RenderTarget {
        output: format!("{}/accident_heatmap_empty.html", dir.display()),
        plotly_js: PlotlyJs::Embedded,
        frame_counts: Some(format!("{}/accident_heatmap_empty_counts.csv", dir.display())),
    };
    let counts_path = target.frame_counts.clone().unwrap();
    let _ = fs::remove_file(&target.output);
    let _ = fs::remove_file(&counts_path);

    let result = render_heatmap(&table, &ChartStyle::default(), &target);
    assert!(matches!(result, Err(HeatmapError::EmptyFrames)));
    assert!(!Path::new(&target.output).exists());
    assert!(!Path::new(&counts_path).exists());
}

#[test]
fn test_render_writes_page_and_counts() {
    let table = bucket_by_month(load_csv(FIXTURE, &CsvSettings::default()).unwrap());

    let dir = env::temp_dir();
    let target = RenderTarget {
        output: format!("{}/accident_heatmap_rendered.html", dir.display()),
        plotly_js: PlotlyJs::Cdn,
        frame_counts: Some(format!("{}/accident_heatmap_rendered_counts.csv", dir.display())),
    };
    let counts_path = target.frame_counts.clone().unwrap();

    render_heatmap(&table, &ChartStyle::default(), &target).unwrap();

    let counts = fs::read_to_string(&counts_path).unwrap();
    assert_eq!(
        counts.lines().collect::<Vec<_>>(),
        vec!["frame,rows", "2016-01,3", "2016-02,3", "2016-03,2"]
    );
    let html = fs::read_to_string(&target.output).unwrap();
    assert!(html.contains("<script src=\"https://cdn.plot.ly/"));

    fs::remove_file(&target.output).unwrap();
    fs::remove_file(&counts_path).unwrap();
}

#[test]
fn test_wrong_column_names_abort_load() {
    let settings = CsvSettings {
        lat_column: "Start_Lat".to_string(),
        lng_column: "Start_Lng".to_string(),
        ..Default::default()
    };
    let err = load_csv(FIXTURE, &settings).unwrap_err();
    assert!(matches!(err, HeatmapError::MissingColumn(_)));
}
