//! `seqconv` -- headless operator client for the conversion backend.
//!
//! Browses the backend's filesystem, scans for image sequences, launches
//! conversions and follows their progress on the status channel.
//!
//! # Environment variables
//!
//! | Variable                       | Required | Default                 | Description                     |
//! |--------------------------------|----------|-------------------------|---------------------------------|
//! | `SEQCONV_API_URL`              | no       | `http://127.0.0.1:8000` | Backend HTTP base URL           |
//! | `SEQCONV_WS_URL`               | no       | derived from API URL    | Status WebSocket endpoint       |
//! | `SEQCONV_RECONNECT_DELAY_SECS` | no       | `3`                     | Delay between reconnect attempts |

mod follow;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seqconv_client::api::{ConverterApi, ConverterBackend};
use seqconv_client::browser::{DirectoryBrowser, Listing};
use seqconv_client::config::ClientConfig;
use seqconv_client::controller::JobController;
use seqconv_client::scanner::SequenceScanner;
use seqconv_core::job_config::AudioOption;

#[derive(Parser)]
#[command(name = "seqconv")]
#[command(about = "Convert image sequences to movies through a conversion backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored settings
    Settings,

    /// Check the backend's external tool dependencies
    Deps,

    /// List a directory on the backend host
    Browse {
        /// Directory to list (defaults to the last input folder)
        path: Option<String>,
    },

    /// Detect the image sequence in a directory
    Scan {
        /// Directory to scan
        path: String,
    },

    /// Launch a conversion and follow it until it ends
    Run(RunArgs),

    /// Ask the backend to cancel the running job
    Cancel,

    /// Print status-channel events until interrupted
    Watch,

    /// Remove the backend's temporary files
    Cleanup,
}

#[derive(Args)]
struct RunArgs {
    /// Folder holding the image sequence
    #[arg(short, long)]
    input: String,

    /// Output folder (defaults to the input's parent)
    #[arg(short, long)]
    output: Option<String>,

    /// Output filename (defaults to the sequence name)
    #[arg(long)]
    filename: Option<String>,

    /// Codec: h264, h265, prores_422, prores_422_lt, prores_444, ...
    #[arg(long)]
    codec: Option<String>,

    /// Output frame rate
    #[arg(long)]
    frame_rate: Option<String>,

    /// Source frame rate
    #[arg(long)]
    source_frame_rate: Option<String>,

    /// Desired duration in seconds
    #[arg(long)]
    duration: Option<String>,

    /// H.264/H.265 bitrate in Mbit/s
    #[arg(long)]
    bitrate: Option<String>,

    /// ProRes quality scale
    #[arg(long)]
    qscale: Option<String>,

    /// Add a blank audio track
    #[arg(long)]
    blank_audio: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seqconv=info,seqconv_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();
    tracing::debug!(api_url = %config.api_url, ws_url = %config.ws_url, "Loaded config");

    let backend: Arc<dyn ConverterBackend> = Arc::new(ConverterApi::new(config.api_url.clone()));

    match cli.command {
        Commands::Settings => {
            let record = backend.load_settings().await.context("loading settings")?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Deps => {
            let status = backend
                .dependency_status()
                .await
                .context("checking dependencies")?;
            for (tool, detail) in &status.details {
                println!("{tool}: {detail}");
            }
            for issue in &status.issues {
                println!("issue: {issue}");
            }
            if !status.ok {
                anyhow::bail!("backend dependencies are missing");
            }
            println!("all dependencies found");
        }
        Commands::Browse { path } => browse(backend, path.as_deref().unwrap_or("")).await?,
        Commands::Scan { path } => {
            let scanner = SequenceScanner::new(backend);
            match scanner.scan(&path).await? {
                Some(sequence) => println!(
                    "{} frames {} ({} files)",
                    sequence.pattern, sequence.range_label, sequence.count
                ),
                None => println!("No image sequences detected."),
            }
        }
        Commands::Run(args) => run(backend, &config, args).await?,
        Commands::Cancel => {
            let ack = backend.cancel_conversion().await.context("cancelling job")?;
            println!("{}", ack.status);
        }
        Commands::Watch => follow::watch(&config).await?,
        Commands::Cleanup => {
            let ack = backend.cleanup().await.context("triggering cleanup")?;
            println!("{}", ack.status);
        }
    }

    Ok(())
}

async fn browse(backend: Arc<dyn ConverterBackend>, path: &str) -> Result<()> {
    let last_known = if path.is_empty() {
        backend
            .load_settings()
            .await
            .map(|s| s.last_input_folder)
            .unwrap_or_default()
    } else {
        String::new()
    };

    let mut browser = DirectoryBrowser::new(backend);
    browser.open(path, &last_known).await;

    println!("{}", browser.select());
    match browser.listing() {
        Listing::Entries(entries) => {
            for entry in entries {
                if entry.is_directory {
                    println!("  {}/", entry.name);
                } else {
                    match entry.size {
                        Some(size) => println!("  {}  ({size} bytes)", entry.name),
                        None => println!("  {}", entry.name),
                    }
                }
            }
            Ok(())
        }
        Listing::Failed(message) => anyhow::bail!("browse failed: {message}"),
        Listing::NotLoaded => Ok(()),
    }
}

async fn run(backend: Arc<dyn ConverterBackend>, config: &ClientConfig, args: RunArgs) -> Result<()> {
    let mut controller = JobController::new(backend);
    controller.load_settings().await;

    // A failed scan is already in the job log; the run can still go ahead
    // if the operator supplied everything else.
    let scan = controller.select_input_folder(&args.input).await;
    follow::print_log(controller.state().log());
    if let Err(e) = scan {
        tracing::warn!(error = %e, "Continuing without a detected sequence");
    }

    if let Some(codec) = &args.codec {
        controller.set_codec(codec);
    }
    let form = controller.form_mut();
    if let Some(output) = args.output {
        form.output_folder = output;
    }
    if let Some(filename) = args.filename {
        form.output_filename = filename;
    }
    if let Some(frame_rate) = args.frame_rate {
        form.frame_rate = frame_rate;
    }
    if let Some(source_frame_rate) = args.source_frame_rate {
        form.source_frame_rate = source_frame_rate;
    }
    if let Some(duration) = args.duration {
        form.desired_duration = duration;
    }
    if let Some(bitrate) = args.bitrate {
        form.mp4_bitrate = bitrate;
    }
    if let Some(qscale) = args.qscale {
        form.prores_qscale = qscale;
    }
    if args.blank_audio {
        form.audio_option = AudioOption::BlankTrack;
    }

    follow::run_and_follow(&mut controller, config).await
}
