mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use panelcam_pipeline::{DxfOptions, GcodeOverrides, PipelineContext, PipelineSettings, SheetSize};
use panelcam_queue::RedisJobQueue;
use panelcam_repo::PostgresJobRepository;
use panelcam_store::S3ArtifactStore;

use config::Config;

#[derive(Parser)]
#[command(name = "panelcam", version, about = "CAM job pipeline: submit jobs, check status, run the worker")]
struct Cli {
    /// Path to a TOML config file (defaults to $PANELCAM_CONFIG if set)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a DXF cut-layout job
    SubmitDxf {
        /// Path to a JSON file holding the panel/CabinetSpec array
        panels_file: PathBuf,
        #[arg(long, default_value_t = 2800.0)]
        sheet_width_mm: f64,
        #[arg(long, default_value_t = 2070.0)]
        sheet_length_mm: f64,
        /// Skip the best-of-three nesting search and use the plain shelf packer
        #[arg(long)]
        no_optimize: bool,
        #[arg(long, default_value_t = 4.0)]
        gap_mm: f64,
        #[arg(long)]
        idempotency_key: Option<String>,
    },
    /// Submit a G-code postprocessing job for a completed DXF job's artifact
    SubmitGcode {
        dxf_artifact_id: Uuid,
        machine_profile: String,
        #[arg(long)]
        spindle_speed: Option<f64>,
        #[arg(long)]
        feed_rate_cutting: Option<f64>,
        #[arg(long)]
        feed_rate_plunge: Option<f64>,
        #[arg(long)]
        cut_depth: Option<f64>,
        #[arg(long)]
        safe_height: Option<f64>,
        #[arg(long)]
        tool_diameter: Option<f64>,
        #[arg(long)]
        idempotency_key: Option<String>,
    },
    /// Submit a per-panel drilling-pattern bundle job for an order
    SubmitDrilling {
        order_id: String,
        machine_profile: String,
        #[arg(long)]
        idempotency_key: Option<String>,
    },
    /// Submit a job bundling previously-completed artifacts into one ZIP
    SubmitZip {
        job_ids: Vec<Uuid>,
        #[arg(long)]
        idempotency_key: Option<String>,
    },
    /// Print a job's current status
    Status { job_id: Uuid },
    /// Print a presigned download URL for a completed job's artifact
    Download {
        job_id: Uuid,
        #[arg(long)]
        ttl_secs: Option<u64>,
    },
    /// Run the consumer loop (blocks until Ctrl-C)
    Worker,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Repo(#[from] panelcam_repo::RepoError),
    #[error(transparent)]
    Pipeline(#[from] panelcam_pipeline::PipelineError),
    #[error("failed to read {0}: {1}")]
    ReadFile(PathBuf, std::io::Error),
    #[error("failed to parse {0} as JSON: {1}")]
    ParseJson(PathBuf, serde_json::Error),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "panelcam command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::SubmitDxf { panels_file, sheet_width_mm, sheet_length_mm, no_optimize, gap_mm, idempotency_key } => {
            let ctx = build_context(&config).await?;
            let panels = read_json_array(&panels_file)?;
            let handle = panelcam_pipeline::submit_dxf(
                &ctx,
                panels,
                SheetSize { width_mm: sheet_width_mm, height_mm: sheet_length_mm },
                DxfOptions { optimize: !no_optimize, gap_mm },
                idempotency_key,
            )
            .await?;
            print_json(&handle);
        }
        Commands::SubmitGcode {
            dxf_artifact_id,
            machine_profile,
            spindle_speed,
            feed_rate_cutting,
            feed_rate_plunge,
            cut_depth,
            safe_height,
            tool_diameter,
            idempotency_key,
        } => {
            let ctx = build_context(&config).await?;
            let handle = panelcam_pipeline::submit_gcode(
                &ctx,
                dxf_artifact_id,
                machine_profile,
                GcodeOverrides { spindle_speed, feed_rate_cutting, feed_rate_plunge, cut_depth, safe_height, tool_diameter },
                idempotency_key,
            )
            .await?;
            print_json(&handle);
        }
        Commands::SubmitDrilling { order_id, machine_profile, idempotency_key } => {
            let ctx = build_context(&config).await?;
            let handle = panelcam_pipeline::submit_drilling(&ctx, order_id, machine_profile, idempotency_key).await?;
            print_json(&handle);
        }
        Commands::SubmitZip { job_ids, idempotency_key } => {
            let ctx = build_context(&config).await?;
            let handle = panelcam_pipeline::submit_zip(&ctx, job_ids, idempotency_key).await?;
            print_json(&handle);
        }
        Commands::Status { job_id } => {
            let ctx = build_context(&config).await?;
            let view = panelcam_pipeline::get_job(&ctx, job_id).await?;
            print_json(&view);
        }
        Commands::Download { job_id, ttl_secs } => {
            let ctx = build_context(&config).await?;
            let ttl = ttl_secs.map(std::time::Duration::from_secs);
            let download = panelcam_pipeline::get_artifact_download(&ctx, job_id, ttl).await?;
            print_json(&download);
        }
        Commands::Worker => {
            let ctx = build_context(&config).await?;
            run_worker(ctx).await;
        }
    }

    Ok(())
}

async fn build_context(config: &Config) -> Result<PipelineContext, CliError> {
    let repo = PostgresJobRepository::connect(config.database_url()?).await?;
    let queue = RedisJobQueue::connect(config.redis_url()?).await.map_err(panelcam_pipeline::PipelineError::from)?;
    let store = S3ArtifactStore::new(config.s3_config()?).await;

    let settings =
        PipelineSettings { default_presign_ttl_secs: config.presigned_ttl_seconds.unwrap_or(900), ..PipelineSettings::default() };

    Ok(PipelineContext::new(Arc::new(repo), Arc::new(queue), Arc::new(store), settings))
}

async fn run_worker(ctx: PipelineContext) {
    let shutdown = tokio_util::sync::CancellationToken::new();
    let worker_shutdown = shutdown.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received shutdown signal, finishing in-flight job before exiting");
            worker_shutdown.cancel();
        }
    });

    tracing::info!("worker loop starting");
    panelcam_worker::run(&ctx, shutdown).await;
    tracing::info!("worker loop exited");
}

fn read_json_array(path: &PathBuf) -> Result<Vec<Value>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError::ReadFile(path.clone(), e))?;
    serde_json::from_str(&text).map_err(|e| CliError::ParseJson(path.clone(), e))
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("failed to serialize response: {e}"),
    }
}
