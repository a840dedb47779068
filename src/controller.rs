use crate::chart::{self, external, ChartSet, Containers, ExternalCharts};
use crate::coerce::CoercionPolicy;
use crate::config::VizConfig;
use crate::csv_reader;
use crate::render::Renderer;
use crate::source::DataSource;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinSet;

/// Per-container results of one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSummary {
    pub rendered: Vec<String>,
    pub failed: Vec<String>,
    /// Containers that received nothing this run
    pub skipped: Vec<String>,
}

/// What a trigger ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Data could not be retrieved; nothing was built
    FetchFailed,
    /// A newer run started while this one waited; its data was dropped
    Stale { request: u64 },
    Rendered(RenderSummary),
}

/// Drives fetch, parse, build and render for the dashboard.
///
/// The selected attribute lives here rather than being read from the page,
/// and is captured once at the start of every run.
pub struct VisualizationController {
    source: Arc<dyn DataSource>,
    renderer: Arc<dyn Renderer>,
    policy: CoercionPolicy,
    externals: ExternalCharts,
    containers: Containers,
    heatmap_scatter_spec: Option<PathBuf>,
    current_attribute: RwLock<String>,
    latest_request: AtomicU64,
    discard_stale: bool,
}

impl VisualizationController {
    pub fn new(
        config: &VizConfig,
        source: Arc<dyn DataSource>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            source,
            renderer,
            policy: config.coercion_policy(),
            externals: config.external_resources(),
            containers: config.containers.clone(),
            heatmap_scatter_spec: config.heatmap_scatter_spec.clone(),
            current_attribute: RwLock::new(config.attribute.clone()),
            latest_request: AtomicU64::new(0),
            discard_stale: config.discard_stale,
        }
    }

    pub async fn current_attribute(&self) -> String {
        self.current_attribute.read().await.clone()
    }

    /// Page-ready trigger: render with the current attribute
    pub async fn on_ready(&self) -> RunOutcome {
        let attribute = self.current_attribute().await;
        self.run(attribute).await
    }

    /// Dropdown trigger: switch attribute, then rebuild everything
    pub async fn on_attribute_change(&self, attribute: impl Into<String>) -> RunOutcome {
        let attribute = attribute.into();
        *self.current_attribute.write().await = attribute.clone();
        self.run(attribute).await
    }

    async fn run(&self, attribute: String) -> RunOutcome {
        let request = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Run {}: loading '{}' for '{}'", request, self.source.describe(), attribute);

        let text = match self.source.fetch_text().await {
            Ok(text) => text,
            Err(e) => {
                error!("Error loading the data: {}", e);
                return RunOutcome::FetchFailed;
            }
        };

        let externals = ExternalCharts {
            heatmap_scatter: external::load_optional(self.heatmap_scatter_spec.as_deref()).await,
            ..self.externals.clone()
        };

        if self.superseded(request) {
            return RunOutcome::Stale { request };
        }

        let dataset = csv_reader::parse(&text, &self.policy);
        let charts = chart::build(&dataset, &attribute, &externals, &self.containers);
        let summary = self.render_all(&charts).await;

        // Embeds can take a while; a newer run may have started meanwhile
        if self.superseded(request) {
            return RunOutcome::Stale { request };
        }
        if let Err(e) = self.renderer.finish(request, &charts.subset(&summary.rendered)).await {
            error!("Renderer could not finish: {}", e);
        }
        RunOutcome::Rendered(summary)
    }

    /// True when a newer run has started and this one should be dropped
    fn superseded(&self, request: u64) -> bool {
        let latest = self.latest_request.load(Ordering::SeqCst);
        if latest == request {
            return false;
        }
        if self.discard_stale {
            warn!("Run {} superseded by run {}; dropping its data", request, latest);
            return true;
        }
        warn!("Run {} finished after newer run {}; rendering anyway", request, latest);
        false
    }

    /// Hand every slot to the renderer at once and wait for all of them to
    /// settle. Failures are logged and counted; they never cancel siblings.
    async fn render_all(&self, charts: &ChartSet) -> RenderSummary {
        let mut summary = RenderSummary {
            skipped: self
                .containers
                .all()
                .into_iter()
                .filter(|c| charts.get(c).is_none())
                .map(str::to_string)
                .collect(),
            ..RenderSummary::default()
        };

        let mut tasks = JoinSet::new();
        for (container, slot) in charts.clone() {
            let renderer = Arc::clone(&self.renderer);
            tasks.spawn(async move {
                let result = renderer.embed(&container, &slot).await;
                (container, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((container, Ok(()))) => {
                    info!("{} loaded successfully", container);
                    summary.rendered.push(container);
                }
                Ok((container, Err(e))) => {
                    error!("Error loading {}: {}", container, e);
                    summary.failed.push(container);
                }
                Err(e) => error!("Render task did not complete: {}", e),
            }
        }

        summary.rendered.sort();
        summary.failed.sort();
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartSlot;
    use crate::error::VizError;
    use crate::source::StaticSource;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const CSV: &str = "Station Name,Latitude,Longitude,Timestamp,Available Bikes,Docks in Service\n\
                       A,40.73,-73.99,2024-01-01T08:00,3,10\n";

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, ChartSlot)>>,
        finished: Mutex<Vec<(u64, Vec<String>)>>,
    }

    #[async_trait]
    impl Renderer for Recorder {
        async fn embed(&self, container: &str, slot: &ChartSlot) -> Result<(), VizError> {
            if container == "chart3" {
                return Err(VizError::render(container, "bad spec"));
            }
            self.seen.lock().unwrap().push((container.to_string(), slot.clone()));
            Ok(())
        }

        async fn finish(&self, request: u64, rendered: &ChartSet) -> Result<(), VizError> {
            let containers = rendered.containers().map(str::to_string).collect();
            self.finished.lock().unwrap().push((request, containers));
            Ok(())
        }
    }

    fn controller(renderer: Arc<Recorder>) -> VisualizationController {
        VisualizationController::new(
            &VizConfig::default(),
            Arc::new(StaticSource::new(CSV)),
            renderer,
        )
    }

    #[tokio::test]
    async fn test_ready_renders_built_slots() {
        let recorder = Arc::new(Recorder::default());
        let outcome = controller(recorder.clone()).on_ready().await;

        let summary = match outcome {
            RunOutcome::Rendered(summary) => summary,
            other => panic!("expected a render, got {:?}", other),
        };
        assert_eq!(summary.rendered, vec!["chart1", "chart2", "chart4", "chart6", "chart7"]);
        assert_eq!(summary.failed, vec!["chart3"]);
        assert_eq!(summary.skipped, vec!["chart5"]);
        assert_eq!(recorder.seen.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_finish_gets_only_the_runs_rendered_slots() {
        let recorder = Arc::new(Recorder::default());
        let ctl = controller(recorder.clone());
        ctl.on_ready().await;
        ctl.on_attribute_change("Docks in Service").await;

        let finished = recorder.finished.lock().unwrap();
        let expected: Vec<String> = ["chart1", "chart2", "chart4", "chart6", "chart7"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(*finished, vec![(1, expected.clone()), (2, expected)]);
    }

    #[tokio::test]
    async fn test_attribute_change_updates_state_and_specs() {
        let recorder = Arc::new(Recorder::default());
        let ctl = controller(recorder.clone());
        ctl.on_attribute_change("Docks in Service").await;
        assert_eq!(ctl.current_attribute().await, "Docks in Service");

        let seen = recorder.seen.lock().unwrap();
        let (_, slot) = seen.iter().find(|(c, _)| c == "chart2").unwrap();
        assert_eq!(
            slot.as_spec().and_then(|s| s.encoding_field("y")),
            Some("Docks in Service")
        );
    }
}
