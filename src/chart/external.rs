use super::spec::ChartSpec;
use crate::error::VizError;
use log::{info, warn};
use std::path::Path;

/// Read a Vega-Lite spec from a JSON file
pub async fn read_spec(path: &Path) -> Result<ChartSpec, VizError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| VizError::ExternalSpec {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    let value = serde_json::from_str(&text).map_err(|e| VizError::ExternalSpec {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(ChartSpec::new(value))
}

/// Load an optional spec. Not configured, unreadable or invalid all mean "absent".
pub async fn load_optional(path: Option<&Path>) -> Option<ChartSpec> {
    let path = path?;
    match read_spec(path).await {
        Ok(spec) => {
            info!("Loaded external spec {}", path.display());
            Some(spec)
        }
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_optional_reads_valid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"mark": "rect"}}"#).unwrap();
        let spec = load_optional(Some(file.path())).await.unwrap();
        assert_eq!(spec.mark_type(), Some("rect"));
    }

    #[tokio::test]
    async fn test_load_optional_absent_cases() {
        assert!(load_optional(None).await.is_none());
        assert!(load_optional(Some(Path::new("/nonexistent/spec.json"))).await.is_none());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load_optional(Some(file.path())).await.is_none());
    }

    #[tokio::test]
    async fn test_read_spec_reports_path() {
        let err = read_spec(Path::new("/nonexistent/spec.json")).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/spec.json"));
    }
}
