// Library exports for bikeviz

pub mod chart;
pub mod cli;
pub mod coerce;
pub mod config;
pub mod controller;
pub mod csv_reader;
pub mod data;
pub mod error;
pub mod render;
pub mod source;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use std::env;
use std::sync::{Arc, OnceLock};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::task::JoinSet;

use crate::cli::{Cli, Commands, ParseArgs, RunArgs};
use crate::config::VizConfig;
use crate::controller::{RunOutcome, VisualizationController};
use crate::render::{HtmlPageRenderer, OutputFormat, Renderer, SpecDirRenderer};
use crate::source::{DataSource, StaticSource};

static LOGGER: OnceLock<()> = OnceLock::new();

pub fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("bikeviz", LevelFilter::Info);
        }
        if let Err(e) = builder.format_timestamp_millis().try_init() {
            eprintln!("warning: keeping the existing logger: {}", e);
        }
    });
}

pub async fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => handle_render(&args).await,
        Commands::Watch(args) => handle_watch(&args).await,
        Commands::Parse(args) => handle_parse(&args).await,
    }
}

async fn open_source(location: &str) -> Result<Arc<dyn DataSource>> {
    if location == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read CSV from stdin")?;
        return Ok(Arc::new(StaticSource::new(text)));
    }
    Ok(Arc::from(source::from_location(location)))
}

fn make_renderer(config: &VizConfig) -> Arc<dyn Renderer> {
    match config.format {
        OutputFormat::Html => Arc::new(HtmlPageRenderer::new(
            config.out_dir.join("index.html"),
            config.attribute_options.clone(),
            config.containers.clone(),
        )),
        OutputFormat::Json => Arc::new(SpecDirRenderer::new(config.out_dir.clone())),
    }
}

async fn build_controller(config: &VizConfig) -> Result<VisualizationController> {
    let source = open_source(&config.data).await?;
    Ok(VisualizationController::new(config, source, make_renderer(config)))
}

fn report(outcome: &RunOutcome) -> Result<()> {
    match outcome {
        RunOutcome::Rendered(summary) => {
            info!(
                "{} chart(s) rendered, {} failed, {} skipped",
                summary.rendered.len(),
                summary.failed.len(),
                summary.skipped.len()
            );
            Ok(())
        }
        RunOutcome::Stale { request } => {
            info!("Run {} was superseded", request);
            Ok(())
        }
        RunOutcome::FetchFailed => bail!("No charts rendered: the data could not be loaded"),
    }
}

async fn handle_render(args: &RunArgs) -> Result<()> {
    let config = args.resolve()?;
    let controller = build_controller(&config).await?;
    report(&controller.on_ready().await)
}

async fn handle_watch(args: &RunArgs) -> Result<()> {
    let config = args.resolve()?;
    if config.data == "-" {
        bail!("watch reads attribute names from stdin; pass the data as a path or URL");
    }
    let controller = Arc::new(build_controller(&config).await?);
    report(&controller.on_ready().await)?;

    // Every line is a dropdown change; overlapping rebuilds are not serialized
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut runs = JoinSet::new();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let attribute = line.trim().to_string();
        if attribute.is_empty() {
            continue;
        }
        let controller = Arc::clone(&controller);
        runs.spawn(async move { controller.on_attribute_change(attribute).await });
    }
    while let Some(joined) = runs.join_next().await {
        match joined {
            Ok(outcome) => {
                if let Err(e) = report(&outcome) {
                    log::error!("{:#}", e);
                }
            }
            Err(e) => log::error!("Rebuild task did not complete: {}", e),
        }
    }
    Ok(())
}

async fn handle_parse(args: &ParseArgs) -> Result<()> {
    let config = cli::load_config(args.config.as_ref())?;
    let source = open_source(&args.data).await?;
    let text = source.fetch_text().await?;
    let dataset = csv_reader::parse(&text, &config.coercion_policy());
    let json = serde_json::to_string_pretty(&dataset.values())
        .context("Failed to serialize dataset")?;
    println!("{}", json);
    Ok(())
}
