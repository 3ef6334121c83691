use fx_forecast::{
    CsvSeriesProvider, ForecastConfig, ForecastEngine, ForecastError, ForecastMethod,
    HistoricalSeriesProvider,
};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn write_csv(dir: &Path, currency: &str, days: u32) {
    let mut file = File::create(dir.join(format!("{}.csv", currency))).unwrap();
    writeln!(file, "date,buyAvg,buyMin,buyMax,sellAvg,sellMin,sellMax").unwrap();
    for i in 0..days {
        let buy = 39.5 + f64::from(i) * 0.01;
        // mix of ISO and dotted dates, min/max sometimes blank
        let date = if i % 2 == 0 {
            format!("2024-04-{:02}", i + 1)
        } else {
            format!("{:02}.04.2024", i + 1)
        };
        if i % 3 == 0 {
            writeln!(file, "{},{},,,{},,", date, buy, buy + 0.4).unwrap();
        } else {
            writeln!(
                file,
                "{},{},{},{},{},{},{}",
                date,
                buy,
                buy - 0.05,
                buy + 0.05,
                buy + 0.4,
                buy + 0.35,
                buy + 0.45
            )
            .unwrap();
        }
    }
}

#[tokio::test]
async fn test_csv_provider_applies_window() {
    let dir = TempDir::new().unwrap();
    write_csv(dir.path(), "USD", 30);
    let provider = CsvSeriesProvider::new(dir.path());

    let points = provider.fetch("USD", 7).await.unwrap();
    assert_eq!(points.len(), 7);
    assert_eq!(points[0].date.to_string(), "24.04.2024");
    assert_eq!(points[6].date.to_string(), "30.04.2024");
}

#[tokio::test]
async fn test_csv_provider_through_engine() {
    let dir = TempDir::new().unwrap();
    write_csv(dir.path(), "USD", 30);
    let provider = Arc::new(CsvSeriesProvider::new(dir.path()));
    let engine = ForecastEngine::new(provider, ForecastConfig::default()).unwrap();

    let points = engine.forecast("usd", ForecastMethod::Ml).await.unwrap();
    assert_eq!(points.len(), 30);
    assert_eq!(points[0].date.to_string(), "2024-05-01");
    assert!(points.iter().all(|p| p.buy >= 0.01));
}

#[tokio::test]
async fn test_missing_file_is_upstream_error() {
    let dir = TempDir::new().unwrap();
    let provider = CsvSeriesProvider::new(dir.path());

    let err = provider.fetch("JPY", 60).await.unwrap_err();
    assert!(matches!(err, ForecastError::UpstreamUnavailable(_)));
}

#[tokio::test]
async fn test_malformed_file_is_upstream_error() {
    let dir = TempDir::new().unwrap();
    let mut file = File::create(dir.path().join("CAD.csv")).unwrap();
    writeln!(file, "date,buyAvg,sellAvg").unwrap();
    writeln!(file, "2024-01-01,30.1,30.5").unwrap();
    writeln!(file, "2024-01-02,30.2").unwrap();
    drop(file);

    let provider = CsvSeriesProvider::new(dir.path());
    let err = provider.fetch("CAD", 60).await.unwrap_err();
    assert!(matches!(err, ForecastError::UpstreamUnavailable(_)));
}
