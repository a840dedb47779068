// Renderer handoff: each container receives one chart slot

pub mod html;
pub mod spec_dir;

use crate::chart::{ChartSet, ChartSlot};
use crate::error::VizError;
use async_trait::async_trait;

pub use html::HtmlPageRenderer;
pub use spec_dir::SpecDirRenderer;

/// Consumer of chart slots. Every `embed` call is independent: the controller
/// issues them concurrently and a failure in one never affects the others.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn embed(&self, container: &str, slot: &ChartSlot) -> Result<(), VizError>;

    /// Called once after every `embed` of a run has settled, with the slots
    /// that embedded successfully. `request` grows with every run, so a
    /// renderer can refuse to let an older run overwrite a newer one.
    async fn finish(&self, _request: u64, _rendered: &ChartSet) -> Result<(), VizError> {
        Ok(())
    }
}

/// Which renderer the CLI writes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
}
