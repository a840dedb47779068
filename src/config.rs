use crate::chart::{Containers, ExternalCharts};
use crate::coerce::{CoercionPolicy, DEFAULT_DOCK_COLUMNS};
use crate::error::VizError;
use crate::render::OutputFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Dashboard settings, read from a JSON file. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VizConfig {
    /// CSV location: a file path or an http(s) URL
    pub data: String,
    /// Attribute plotted by the bar, scatter and line charts
    pub attribute: String,
    /// Choices offered by the attribute dropdown
    pub attribute_options: Vec<String>,
    /// Columns coerced to numbers while parsing
    pub dock_columns: Vec<String>,
    /// Optional inline spec for chart5
    pub heatmap_scatter_spec: Option<PathBuf>,
    /// Resource reference for chart6
    pub vis_resource: Option<String>,
    /// Resource reference for chart7
    pub heatmap_resource: Option<String>,
    /// Page container ids, `chart1` to `chart7` unless overridden
    pub containers: Containers,
    pub out_dir: PathBuf,
    pub format: OutputFormat,
    /// Drop a run whose data arrives after a newer run has started
    pub discard_stale: bool,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            data: "aggregated_data.csv".to_string(),
            attribute: "Available Bikes".to_string(),
            attribute_options: vec![
                "Available Bikes".to_string(),
                "Docks in Service".to_string(),
                "Docks in Service_start".to_string(),
                "Docks in Service_end".to_string(),
            ],
            dock_columns: DEFAULT_DOCK_COLUMNS.iter().map(|c| c.to_string()).collect(),
            heatmap_scatter_spec: None,
            vis_resource: Some("vis1.json".to_string()),
            heatmap_resource: Some("heatmap_spec.json".to_string()),
            containers: Containers::default(),
            out_dir: PathBuf::from("site"),
            format: OutputFormat::Html,
            discard_stale: true,
        }
    }
}

impl VizConfig {
    pub fn load(path: &Path) -> Result<Self, VizError> {
        let text = std::fs::read_to_string(path).map_err(|e| VizError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_json(&text).map_err(|e| VizError::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        config.containers.validate().map_err(|reason| VizError::Config {
            path: path.display().to_string(),
            reason,
        })?;
        Ok(config)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn coercion_policy(&self) -> CoercionPolicy {
        CoercionPolicy::new(self.dock_columns.clone())
    }

    /// External slots without the chart5 spec, which is loaded per run
    pub fn external_resources(&self) -> ExternalCharts {
        ExternalCharts {
            heatmap_scatter: None,
            vis_resource: self.vis_resource.clone(),
            heatmap_resource: self.heatmap_resource.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = VizConfig::from_json("{}").unwrap();
        assert_eq!(config.data, "aggregated_data.csv");
        assert_eq!(config.attribute, "Available Bikes");
        assert_eq!(config.coercion_policy(), CoercionPolicy::default());
        assert_eq!(config.format, OutputFormat::Html);
        assert!(config.discard_stale);
    }

    #[test]
    fn test_overrides_and_null_resources() {
        let config = VizConfig::from_json(
            r#"{"attribute": "Docks in Service", "format": "json", "vis_resource": null, "discard_stale": false}"#,
        )
        .unwrap();
        assert_eq!(config.attribute, "Docks in Service");
        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.discard_stale);
        let ext = config.external_resources();
        assert!(ext.vis_resource.is_none());
        assert_eq!(ext.heatmap_resource.as_deref(), Some("heatmap_spec.json"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(VizConfig::from_json(r#"{"colour": "red"}"#).is_err());
    }

    #[test]
    fn test_partial_container_override() {
        let config = VizConfig::from_json(r#"{"containers": {"bar": "bars", "heatmap": "heat"}}"#)
            .unwrap();
        assert_eq!(config.containers.bar, "bars");
        assert_eq!(config.containers.scatter, "chart2");
        assert_eq!(config.containers.heatmap, "heat");
        assert!(VizConfig::from_json(r#"{"containers": {"pie": "x"}}"#).is_err());
    }

    #[test]
    fn test_load_rejects_duplicate_containers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bikeviz.json");
        std::fs::write(&path, r#"{"containers": {"scatter": "chart1"}}"#).unwrap();
        let err = VizConfig::load(&path).unwrap_err();
        assert!(matches!(err, VizError::Config { .. }));
        assert!(err.to_string().contains("chart1"));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = VizConfig::load(Path::new("/nonexistent/bikeviz.json")).unwrap_err();
        assert!(matches!(err, VizError::Config { .. }));
    }
}
