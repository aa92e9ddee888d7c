//! Command line front end for bulk image conversion.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixferry_core::{
    load_config, validate_config, BulkDownloader, Config, ConversionPool, FormatCapabilities,
    FsSink, HttpConvertService, ItemStatus, ItemStore, SourceImage,
};

/// Convert images in bulk through a remote conversion service.
#[derive(Debug, Parser)]
#[command(name = "pixferry", version, about)]
struct Cli {
    /// Image files to convert.
    #[arg(required_unless_present = "list_formats")]
    files: Vec<PathBuf>,

    /// Path to the configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format (must be supported by the service).
    #[arg(short, long)]
    format: Option<String>,

    /// Output quality, 0-100.
    #[arg(short, long)]
    quality: Option<u8>,

    /// Target width in pixels (0 keeps the source width).
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Target height in pixels (0 keeps the source height).
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Directory converted files are written to.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Maximum concurrent conversion requests.
    #[arg(long)]
    concurrency: Option<usize>,

    /// List the service's supported formats and exit.
    #[arg(long)]
    list_formats: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = resolve_config(&cli)?;
    apply_overrides(&mut config, &cli);
    validate_config(&config).context("Configuration validation failed")?;

    let service = Arc::new(HttpConvertService::new(&config.service));
    info!(base_url = %config.service.base_url, "Using conversion service");

    // The service decides which output formats exist; reconcile the
    // requested format against its capability list before any upload.
    let capabilities = FormatCapabilities::load(service.as_ref())
        .await
        .context("Failed to load format capabilities")?;

    if cli.list_formats {
        for format in capabilities.formats() {
            println!("{format}");
        }
        return Ok(());
    }

    let format = match capabilities.resolve_selection(&config.defaults.format) {
        Some(format) => format,
        None => bail!("conversion service reports no supported output formats"),
    };
    if format != config.defaults.format {
        warn!(
            requested = %config.defaults.format,
            using = %format,
            "Requested format not supported, falling back"
        );
        config.defaults.format = format;
    }

    let store = Arc::new(ItemStore::new());
    store.add(read_sources(&cli.files).await?);
    info!(items = store.len(), "Loaded source images");

    let pool = ConversionPool::new(config.pool.clone(), Arc::clone(&store), service);
    let settings = config.defaults.to_settings();
    let outcome = pool
        .convert_all(&settings)
        .await
        .context("Bulk conversion failed to start")?;

    for view in store.views() {
        if view.status == ItemStatus::Error {
            warn!(
                file = %view.name,
                error = view.error.as_deref().unwrap_or("unknown"),
                "Conversion failed"
            );
        }
    }
    info!(
        converted = outcome.converted,
        failed = outcome.failed,
        "Conversion finished"
    );

    if outcome.converted == 0 {
        bail!("no files were converted");
    }

    let sink = FsSink::new(config.download.dir.clone());
    let downloader = BulkDownloader::new(Duration::from_millis(config.download.pace_ms));
    let delivered = downloader.download_all(&store, &sink).await;
    info!(
        delivered,
        dir = %config.download.dir.display(),
        "Wrote converted files"
    );

    Ok(())
}

/// Load configuration from the CLI flag, the `PIXFERRY_CONFIG` variable,
/// or `config.toml` in the working directory. A missing default file is
/// not an error; built-in defaults apply.
fn resolve_config(cli: &Cli) -> Result<Config> {
    if let Some(path) = &cli.config {
        return load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path));
    }
    let default_path = std::env::var("PIXFERRY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));
    if default_path.exists() {
        info!("Loading configuration from {:?}", default_path);
        load_config(&default_path)
            .with_context(|| format!("Failed to load config from {:?}", default_path))
    } else {
        Ok(Config::default())
    }
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(format) = &cli.format {
        config.defaults.format = format.clone();
    }
    if let Some(quality) = cli.quality {
        config.defaults.quality = quality;
    }
    if let Some(width) = cli.width {
        config.defaults.width = width;
    }
    if let Some(height) = cli.height {
        config.defaults.height = height;
    }
    if let Some(out) = &cli.out {
        config.download.dir = out.clone();
    }
    if let Some(concurrency) = cli.concurrency {
        config.pool.concurrency = concurrency;
    }
}

async fn read_sources(files: &[PathBuf]) -> Result<Vec<SourceImage>> {
    let mut sources = Vec::with_capacity(files.len());
    for path in files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {:?}", path))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        sources.push(SourceImage { name, bytes });
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("pixferry").chain(args.iter().copied()))
    }

    #[test]
    fn test_overrides_apply() {
        let cli = cli_with(&[
            "a.png",
            "--format",
            "png",
            "--quality",
            "55",
            "--concurrency",
            "2",
            "--out",
            "results",
        ]);
        let mut config = Config::default();
        apply_overrides(&mut config, &cli);

        assert_eq!(config.defaults.format, "png");
        assert_eq!(config.defaults.quality, 55);
        assert_eq!(config.pool.concurrency, 2);
        assert_eq!(config.download.dir, PathBuf::from("results"));
    }

    #[test]
    fn test_dimensions_override() {
        let cli = cli_with(&["a.png", "-W", "800", "-H", "600"]);
        let mut config = Config::default();
        apply_overrides(&mut config, &cli);

        let settings = config.defaults.to_settings();
        assert_eq!(settings.width, Some(800));
        assert_eq!(settings.height, Some(600));
    }

    #[tokio::test]
    async fn test_read_sources_uses_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, b"png bytes").unwrap();

        let sources = read_sources(&[path]).await.unwrap();

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "photo.png");
        assert_eq!(sources[0].bytes, b"png bytes");
    }

    #[tokio::test]
    async fn test_read_sources_missing_file_errors() {
        let result = read_sources(&[PathBuf::from("/nonexistent/x.png")]).await;
        assert!(result.is_err());
    }
}
