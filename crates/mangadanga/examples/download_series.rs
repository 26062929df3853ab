//! Example downloading a few chapters of a series
//!
//! Run this example with:
//! ```
//! cargo run --example download_series -- https://manganato.com/manga-aa951409 1 3
//! ```

use mangadanga::{
    ConsoleProgressReporter, DownloaderConfig, DriverRegistry, IntoProgressCallback, MangaDownloader,
    RunStatus, SelectionConfig,
};
use tempfile::tempdir;

#[tokio::main]
async fn main() -> mangadanga::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .unwrap_or_else(|| "https://manganato.com/manga-aa951409".to_string());
    let lower = args.next().unwrap_or_else(|| "1".to_string());
    let upper = args.next().unwrap_or_else(|| lower.clone());

    println!("🚀 Starting download example");

    let temp_dir = tempdir().unwrap();
    println!("📁 Download directory: {}", temp_dir.path().display());

    let registry = DriverRegistry::with_default_drivers();
    println!("🌐 Supported domains: {}", registry.supported_domains().join(", "));

    let config = DownloaderConfig::new(url)
        .with_path(temp_dir.path())
        .with_threads(2)
        .with_page_concurrency(4)
        .with_max_retries(2)
        .with_selection(SelectionConfig::range(lower, upper));

    let downloader = MangaDownloader::new(config, &registry, Some(ConsoleProgressReporter::new(true).into_callback()))?;
    println!("🔌 Using driver: {}", downloader.driver_name());

    let report = downloader.download().await;

    match report.status {
        RunStatus::Success => println!("🎉 Downloaded {} chapter(s)!", report.archives.len()),
        RunStatus::Partial => println!("⚠️  Partially downloaded: {}", report.message),
        RunStatus::Error => println!("💥 Download failed: {}", report.message),
    }
    for archive in &report.archives {
        println!("   📦 {}", archive.display());
    }
    println!(
        "📊 {} page(s), {} bytes in {:.2}s",
        report.metrics.pages_downloaded, report.metrics.bytes_downloaded, report.elapsed_secs
    );

    Ok(())
}
