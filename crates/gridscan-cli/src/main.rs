#![forbid(unsafe_code)]

//! Gridscan command-line interface.
//!
//! ```bash
//! gridscan extract invoice.png --mode table --format csv
//! gridscan extract page1.png page2.png --language deu --format json
//! gridscan serve --host 0.0.0.0 --port 8000
//! gridscan languages
//! ```

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use gridscan::{
    BatchItem, ExportFormat, GridscanConfig, ImageInput, OcrPipeline, PreprocessingMethod, ProcessingMode,
    RequestOptions, TesseractBackend, export::render_result, supported_languages,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Parser)]
#[command(name = "gridscan", version, about = "OCR with table structure recovery")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recognize one or more images
    Extract {
        /// Image files to process
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Processing mode: text, handwriting, table or auto
        #[arg(short, long, default_value = "text")]
        mode: ProcessingMode,

        /// Language profile, e.g. eng or eng+deu (default: from config)
        #[arg(short, long)]
        language: Option<String>,

        /// Filter for text mode: none, grayscale, binarize or contrast
        #[arg(short, long, default_value = "none")]
        preprocessing: PreprocessingMethod,

        /// Output format: text, json, csv or markdown
        #[arg(short, long, default_value = "text")]
        format: ExportFormat,

        /// Configuration file (default: discover gridscan.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Start the HTTP API server
    Serve {
        /// Address to bind (overrides config and GRIDSCAN_HOST)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind (overrides config and GRIDSCAN_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Configuration file (default: discover gridscan.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List supported language profiles
    Languages {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List processing modes
    Modes {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(error) = run(Cli::parse()).await {
        if tracing::enabled!(tracing::Level::ERROR) {
            tracing::error!(error = %error, "gridscan terminated with error");
        } else {
            eprintln!("Error: {error:#}");
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Extract {
            files,
            mode,
            language,
            preprocessing,
            format,
            config,
        } => {
            let pipeline = build_pipeline(load_config(config.as_deref())?)?;
            let mut options = RequestOptions::new(mode).with_preprocessing(preprocessing);
            if let Some(language) = language {
                options = options.with_language(language);
            }
            extract(&pipeline, &files, &options, format).await
        }
        Command::Serve { host, port, config } => {
            let mut config = load_config(config.as_deref())?;
            config.server = config.server.with_env_overrides();
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let server = config.server.clone();
            let limits = gridscan::api::parse_size_limits_from_env(&config);
            let pipeline = build_pipeline(config)?;
            gridscan::api::serve_with_limits(pipeline, &server, limits)
                .await
                .context("API server failed")
        }
        Command::Languages { json } => {
            let languages = supported_languages();
            if json {
                println!("{}", serde_json::to_string_pretty(&languages)?);
            } else {
                for language in languages {
                    println!("{:<10} {}", language.code, language.name);
                }
            }
            Ok(())
        }
        Command::Modes { json } => {
            let modes: Vec<_> = ProcessingMode::ALL.iter().map(ProcessingMode::describe).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&modes)?);
            } else {
                for mode in modes {
                    println!("{:<12} {:<16} {}", mode.code, mode.name, mode.description);
                }
            }
            Ok(())
        }
    }
}

/// Initializes tracing on stderr so stdout carries only results.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GridscanConfig> {
    if let Some(path) = path {
        return GridscanConfig::from_file(path).with_context(|| format!("failed to load {}", path.display()));
    }

    match GridscanConfig::discover().context("failed to discover configuration")? {
        Some(config) => {
            tracing::info!("Loaded configuration from discovered file");
            Ok(config)
        }
        None => {
            tracing::debug!("No config file found, using default configuration");
            Ok(GridscanConfig::default())
        }
    }
}

fn build_pipeline(config: GridscanConfig) -> anyhow::Result<OcrPipeline> {
    let engine = TesseractBackend::new(config.ocr.tessdata_path.clone());
    OcrPipeline::new(Arc::new(engine), config).context("failed to create OCR pipeline")
}

fn read_input(path: &Path) -> anyhow::Result<ImageInput> {
    let data = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(ImageInput::new(filename, data))
}

async fn extract(
    pipeline: &OcrPipeline,
    files: &[PathBuf],
    options: &RequestOptions,
    format: ExportFormat,
) -> anyhow::Result<()> {
    let inputs = files.iter().map(|path| read_input(path)).collect::<anyhow::Result<Vec<_>>>()?;

    if inputs.len() == 1 {
        let input = inputs.into_iter().next().context("no input")?;
        let result = pipeline.run(input, options).await?;
        println!("{}", render_result(&result, format)?);
        return Ok(());
    }

    let items = pipeline.run_batch(inputs, options).await?;

    if format == ExportFormat::Json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return report_failures(&items);
    }

    for item in &items {
        println!("==> {} <==", item.filename);
        match &item.result {
            Some(result) => println!("{}", render_result(result, format)?),
            None => println!("(failed: {})", item.error.as_deref().unwrap_or("unknown error")),
        }
    }

    report_failures(&items)
}

fn report_failures(items: &[BatchItem]) -> anyhow::Result<()> {
    let failed = items.iter().filter(|item| !item.success).count();
    if failed > 0 {
        bail!("{} of {} images failed", failed, items.len());
    }
    Ok(())
}
