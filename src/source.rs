use crate::error::VizError;
use async_trait::async_trait;
use log::debug;
use std::path::PathBuf;

/// Where the raw CSV text comes from
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Human readable location, used in log lines
    fn describe(&self) -> String;

    async fn fetch_text(&self) -> Result<String, VizError>;
}

/// A CSV file on the local filesystem
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_text(&self) -> Result<String, VizError> {
        debug!("Reading {}", self.path.display());
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| VizError::fetch(&self.describe(), e))
    }
}

/// A CSV resource behind an http(s) URL
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch_text(&self) -> Result<String, VizError> {
        debug!("GET {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| VizError::fetch(&self.url, e))?;
        response
            .text()
            .await
            .map_err(|e| VizError::fetch(&self.url, e))
    }
}

/// A fixed string, mostly for tests and piping data through stdin
pub struct StaticSource {
    text: String,
}

impl StaticSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl DataSource for StaticSource {
    fn describe(&self) -> String {
        "<inline>".to_string()
    }

    async fn fetch_text(&self) -> Result<String, VizError> {
        Ok(self.text.clone())
    }
}

/// Pick a source from a location string: http(s) URLs are fetched, anything else is a path
pub fn from_location(location: &str) -> Box<dyn DataSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpSource::new(location))
    } else {
        Box::new(FileSource::new(location))
    }
}
