use super::Renderer;
use crate::chart::ChartSlot;
use crate::error::VizError;
use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};

/// Writes each inline spec to `<container>.vl.json` and each resource
/// reference to `<container>.ref` inside one directory
pub struct SpecDirRenderer {
    dir: PathBuf,
}

impl SpecDirRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl Renderer for SpecDirRenderer {
    async fn embed(&self, container: &str, slot: &ChartSlot) -> Result<(), VizError> {
        if container.is_empty() || container.contains(['/', '\\']) {
            return Err(VizError::render(container, "invalid container id"));
        }
        tokio::fs::create_dir_all(&self.dir).await?;

        let (path, contents) = match slot {
            ChartSlot::Inline(spec) => (
                self.dir.join(format!("{}.vl.json", container)),
                serde_json::to_string_pretty(spec).map_err(|e| VizError::render(container, e))?,
            ),
            ChartSlot::Resource(name) => (self.dir.join(format!("{}.ref", container)), name.clone()),
        };
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| VizError::render(container, e))?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartSpec;
    use serde_json::json;

    #[tokio::test]
    async fn test_writes_inline_and_resource_slots() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = SpecDirRenderer::new(dir.path().join("out"));

        let spec = ChartSpec::new(json!({"mark": "bar"}));
        renderer.embed("chart1", &ChartSlot::Inline(spec)).await.unwrap();
        renderer
            .embed("chart6", &ChartSlot::Resource("vis1.json".into()))
            .await
            .unwrap();

        let written = std::fs::read_to_string(dir.path().join("out/chart1.vl.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value, json!({"mark": "bar"}));
        let reference = std::fs::read_to_string(dir.path().join("out/chart6.ref")).unwrap();
        assert_eq!(reference, "vis1.json");
    }

    #[tokio::test]
    async fn test_rejects_path_like_container() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = SpecDirRenderer::new(dir.path());
        let err = renderer
            .embed("../chart1", &ChartSlot::Resource("x.json".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, VizError::Render { .. }));
    }
}
