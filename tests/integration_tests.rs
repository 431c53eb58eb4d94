use pageview_trends::{CliConfig, LocalStorage, TrendEngine, TrendError, TrendPipeline};
use tempfile::TempDir;

/// Daily rows for three articles from 2012-01-01 to 2014-12-31.
fn write_sample_csv(dir: &std::path::Path) -> String {
    let mut csv = String::from(",article,lang,date,views\n");
    let mut idx = 0;
    let mut date = chrono::NaiveDate::from_ymd_opt(2012, 1, 1).unwrap();
    let end = chrono::NaiveDate::from_ymd_opt(2014, 12, 31).unwrap();

    while date <= end {
        for (n, article) in ["Al-Qaeda", "Terrorism", "Dirty bomb"].iter().enumerate() {
            let views = if *article == "Dirty bomb" && date.format("%d").to_string() == "01" {
                0
            } else {
                40 + n as u64 * 10
            };
            csv.push_str(&format!("{},{},en,{},{}\n", idx, article, date, views));
            idx += 1;
        }
        date = date.succ_opt().unwrap();
    }

    let path = dir.join("terrorism_data.csv");
    std::fs::write(&path, csv).unwrap();
    path.to_str().unwrap().to_string()
}

fn config(input: String, output: String) -> CliConfig {
    CliConfig {
        input,
        output_path: output,
        date_column: "date".to_string(),
        views_column: "views".to_string(),
        article_column: "article".to_string(),
        split_date: chrono::NaiveDate::from_ymd_opt(2013, 6, 6).unwrap(),
        no_split: false,
        split_label: "Prism Disclosure, 6/6/2013".to_string(),
        exclude_after: chrono::NaiveDate::from_ymd_opt(2014, 6, 30).unwrap(),
        keep_outliers: false,
        format: pageview_trends::core::ChartFormat::Svg,
        title: "Pre and Post June 2013 Article View Trends".to_string(),
        verbose: false,
        monitor: false,
    }
}

#[tokio::test]
async fn test_end_to_end_writes_all_charts() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_sample_csv(temp_dir.path());
    let output = temp_dir.path().join("output").to_str().unwrap().to_string();

    let pipeline = TrendPipeline::new(LocalStorage::current_dir(), config(input, output.clone()));
    let engine = TrendEngine::new(pipeline);

    let result = engine.run().await.unwrap();
    assert_eq!(result, output);

    let out = std::path::Path::new(&output);
    for file in ["trend_all.svg", "zero_views.svg", "trend_excluding_outliers.svg"] {
        let content = std::fs::read_to_string(out.join(file)).unwrap();
        assert!(content.contains("<svg"), "{} is not an svg", file);
    }

    let trend = std::fs::read_to_string(out.join("trend_excluding_outliers.svg")).unwrap();
    assert!(trend.contains("Pre and Post June 2013 Article View Trends, Outliers Excluded"));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["monthly"].as_array().unwrap().len(), 36);
    assert_eq!(report["summary"]["articles"], 3);
    // 每個月的 1 號 Dirty bomb 沒有瀏覽
    assert!(report["zero_view_days"]
        .as_array()
        .unwrap()
        .iter()
        .all(|z| z["zero_days"] == 1));
    // January 2012: 31 days of 40 + 50 views and 30 days of 60 views
    assert_eq!(report["monthly"][0]["views"], 31 * 90 + 30 * 60);
}

#[tokio::test]
async fn test_png_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_sample_csv(temp_dir.path());
    let output = temp_dir.path().join("png").to_str().unwrap().to_string();

    let mut config = config(input, output.clone());
    config.format = pageview_trends::core::ChartFormat::Png;
    config.keep_outliers = true;

    let engine = TrendEngine::new_with_monitoring(
        TrendPipeline::new(LocalStorage::current_dir(), config),
        true,
    );
    engine.run().await.unwrap();

    let out = std::path::Path::new(&output);
    let png = std::fs::read(out.join("trend_all.png")).unwrap();
    assert_eq!(&png[..4], b"\x89PNG");
    assert!(out.join("zero_views.png").exists());
    assert!(!out.join("trend_excluding_outliers.png").exists());
}

#[tokio::test]
async fn test_malformed_input_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("broken.csv");
    std::fs::write(&input, "date,views\n2013-01-01,ten\n").unwrap();
    let output = temp_dir.path().join("out").to_str().unwrap().to_string();

    let engine = TrendEngine::new(TrendPipeline::new(
        LocalStorage::current_dir(),
        config(input.to_str().unwrap().to_string(), output.clone()),
    ));

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, TrendError::ParseError { line: 2, .. }));
    assert_eq!(err.exit_code(), 1);
    assert!(!std::path::Path::new(&output).exists());
}
