use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser as _;
use mangadanga::{
    ConsoleProgressReporter, DownloaderConfig, DriverRegistry, IntoProgressCallback, MangaDownloader, RunReport,
    RunStatus,
};

mod cli;
mod logging;

#[tokio::main]
async fn main() -> ExitCode {
    match try_main().await {
        Ok(RunStatus::Success) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn try_main() -> anyhow::Result<RunStatus> {
    let cli = cli::Cli::parse();
    logging::init(cli.verbose).context("init logging")?;
    tracing::debug!(?cli, "parsed cli");

    let config = DownloaderConfig::new(cli.url.clone())
        .with_path(cli.path.clone())
        .with_threads(cli.threads)
        .with_page_concurrency(cli.page_concurrency)
        .with_selection(cli.selection())
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_max_retries(cli.retries);

    let registry = DriverRegistry::with_default_drivers();
    let progress = ConsoleProgressReporter::new(cli.verbose).into_callback();
    let downloader = match MangaDownloader::new(config, &registry, Some(progress)) {
        Ok(downloader) => downloader,
        Err(err) => {
            if let Some(suggestion) = err.suggestion() {
                eprintln!("{suggestion}");
            }
            return Err(err).context("configure download");
        }
    };

    let report = downloader.download().await;
    print_report(&report, cli.json)?;
    Ok(report.status)
}

fn print_report(report: &RunReport, json: bool) -> anyhow::Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(report).context("serialize report")?;
        println!("{rendered}");
        return Ok(());
    }

    if let Some(directory) = &report.directory {
        println!("📁 {}", directory.display());
    }
    println!(
        "📊 {}: {} archive(s), {} failure(s), {} page(s) in {:.2}s",
        report.status,
        report.archives.len(),
        report.failures.len(),
        report.metrics.pages_downloaded,
        report.elapsed_secs
    );
    for failure in &report.failures {
        println!("   ❌ chapter {}: {}", failure.index, failure.error);
    }
    Ok(())
}
