use crate::config::VizConfig;
use crate::render::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bikeviz")]
#[command(about = "Build Vega-Lite dashboards from bike-share station CSV data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build every chart once and write the output
    Render(RunArgs),
    /// Render, then rebuild for each attribute name read from stdin
    Watch(RunArgs),
    /// Print the parsed dataset as JSON
    Parse(ParseArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// JSON config file; flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// CSV path or http(s) URL ("-" reads stdin)
    #[arg(short, long)]
    pub data: Option<String>,
    /// Attribute plotted by the bar, scatter and line charts
    #[arg(short, long)]
    pub attribute: Option<String>,
    /// Output directory
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
    /// Spec file for the heatmap and scatter chart
    #[arg(long)]
    pub heatmap_scatter_spec: Option<PathBuf>,
    /// Render runs even when a newer run has already started
    #[arg(long)]
    pub keep_stale: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// CSV path or http(s) URL ("-" reads stdin)
    #[arg(short, long, default_value = "aggregated_data.csv")]
    pub data: String,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl RunArgs {
    /// Config file (or defaults) with command-line overrides applied
    pub fn resolve(&self) -> anyhow::Result<VizConfig> {
        let mut config = load_config(self.config.as_ref())?;
        if let Some(data) = &self.data {
            config.data = data.clone();
        }
        if let Some(attribute) = &self.attribute {
            config.attribute = attribute.clone();
        }
        if let Some(out) = &self.out {
            config.out_dir = out.clone();
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(spec) = &self.heatmap_scatter_spec {
            config.heatmap_scatter_spec = Some(spec.clone());
        }
        if self.keep_stale {
            config.discard_stale = false;
        }
        Ok(config)
    }
}

pub fn load_config(path: Option<&PathBuf>) -> anyhow::Result<VizConfig> {
    match path {
        Some(path) => Ok(VizConfig::load(path)?),
        None => Ok(VizConfig::default()),
    }
}
