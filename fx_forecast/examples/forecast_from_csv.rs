use chrono::{Duration, NaiveDate};
use fx_forecast::{
    evaluate_holdout, forecast_to_json, CsvSeriesProvider, DateNormalizer, ForecastConfig,
    ForecastEngine, ForecastMethod, HistoricalSeriesProvider, RateSeries,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Usage: forecast_from_csv [DIR] [CURRENCY]
///
/// DIR holds one `<CURRENCY>.csv` per currency. Without arguments a sample
/// USD file is generated in a temporary directory.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("FX Forecast: CSV Forecasting Example");
    println!("====================================\n");

    let mut args = std::env::args().skip(1);
    let sample_dir;
    let dir = match args.next() {
        Some(dir) => PathBuf::from(dir),
        None => {
            sample_dir = tempfile::tempdir()?;
            write_sample_csv(&sample_dir.path().join("USD.csv"))?;
            println!("Using generated sample data in {}\n", sample_dir.path().display());
            sample_dir.path().to_path_buf()
        }
    };
    let currency = args.next().unwrap_or_else(|| "USD".to_string());

    let provider = Arc::new(CsvSeriesProvider::new(&dir));
    let engine = ForecastEngine::new(provider.clone(), ForecastConfig::default())?;

    for method in ForecastMethod::ALL {
        let points = engine.forecast(&currency, method).await?;
        println!("{} forecast ({} days):", method, points.len());
        for point in points.iter().take(5) {
            println!(
                "  {}  buy {:.4}  sell {:.4}  confidence {:.2}  {:?}",
                point.date, point.buy, point.sell, point.confidence, point.trend
            );
        }
        println!("  ...\n");
    }

    // Backtest each method on the same history
    println!("Holdout accuracy:");
    let raw = provider.fetch(&currency, ForecastMethod::Ml.window_days()).await?;
    let series = RateSeries::from_raw(&raw, &DateNormalizer::new(), Default::default());
    let mut rng = StdRng::seed_from_u64(42);
    for method in ForecastMethod::ALL {
        match evaluate_holdout(&series, method, &mut rng) {
            Ok(eval) => println!("  {:<9} {}", method.as_str(), eval.accuracy),
            Err(e) => println!("  {:<9} skipped: {}", method.as_str(), e),
        }
    }

    let linear = engine.forecast(&currency, ForecastMethod::Linear).await?;
    println!("\nLinear forecast as JSON:\n{}", forecast_to_json(&linear)?);

    Ok(())
}

fn write_sample_csv(path: &std::path::Path) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "date,buyAvg,buyMin,buyMax,sellAvg,sellMin,sellMax")?;

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid start date");
    for i in 0..120 {
        let date = start + Duration::days(i);
        let buy = 37.8 + i as f64 * 0.015 + (i as f64 / 5.0).sin() * 0.2;
        writeln!(
            file,
            "{},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4}",
            date.format("%d.%m.%Y"),
            buy,
            buy - 0.1,
            buy + 0.1,
            buy * 1.012,
            buy * 1.012 - 0.1,
            buy * 1.012 + 0.1
        )?;
    }
    Ok(())
}
