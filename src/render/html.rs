//! Static dashboard page built around vega-embed.
//!
//! `embed` only checks that the page has the container; the page itself is
//! written in `finish` from that run's own slots. Each chart is embedded on
//! its own promise in the browser, so one bad spec only logs a console error.

use super::Renderer;
use crate::chart::{ChartSet, ChartSlot, Containers};
use crate::error::VizError;
use async_trait::async_trait;
use log::{debug, info};
use serde_json::Value;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const VEGA_SCRIPTS: [&str; 3] = [
    "https://cdn.jsdelivr.net/npm/vega@5",
    "https://cdn.jsdelivr.net/npm/vega-lite@5",
    "https://cdn.jsdelivr.net/npm/vega-embed@6",
];

pub struct HtmlPageRenderer {
    path: PathBuf,
    attribute_options: Vec<String>,
    containers: Containers,
    /// Request of the run whose page is on disk; guards the write itself
    written: Mutex<u64>,
}

impl HtmlPageRenderer {
    pub fn new(
        path: impl Into<PathBuf>,
        attribute_options: Vec<String>,
        containers: Containers,
    ) -> Self {
        Self {
            path: path.into(),
            attribute_options,
            containers,
            written: Mutex::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Renderer for HtmlPageRenderer {
    async fn embed(&self, container: &str, _slot: &ChartSlot) -> Result<(), VizError> {
        if !self.containers.contains(container) {
            return Err(VizError::render(container, "no such container on the page"));
        }
        Ok(())
    }

    async fn finish(&self, request: u64, rendered: &ChartSet) -> Result<(), VizError> {
        let mut written = self.written.lock().await;
        if request < *written {
            debug!("Run {} is older than the page on disk (run {}); not writing", request, *written);
            return Ok(());
        }

        let page = render_page(rendered, &self.containers, &self.attribute_options);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, page).await?;
        *written = request;
        info!("Wrote {} chart(s) to {}", rendered.len(), self.path.display());
        Ok(())
    }
}

/// JSON that is safe to drop inside a `<script>` element
fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// The attribute the bar chart is plotting, if it was rendered
fn selected_attribute<'a>(slots: &'a ChartSet, containers: &Containers) -> Option<&'a str> {
    slots
        .get(&containers.bar)
        .and_then(ChartSlot::as_spec)
        .and_then(|spec| spec.encoding_field("y"))
}

/// Dropdown choices; the plotted attribute is always one of them
fn dropdown_options<'a>(options: &'a [String], selected: Option<&'a str>) -> Vec<&'a str> {
    let mut all: Vec<&str> = options.iter().map(String::as_str).collect();
    if let Some(selected) = selected {
        if !all.contains(&selected) {
            all.insert(0, selected);
        }
    }
    all
}

pub fn render_page(slots: &ChartSet, containers: &Containers, attribute_options: &[String]) -> String {
    let selected = selected_attribute(slots, containers);
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    out.push_str("<title>Bike Station Dashboard</title>\n");
    for src in VEGA_SCRIPTS {
        let _ = writeln!(out, "<script src=\"{}\"></script>", src);
    }
    out.push_str("</head>\n<body>\n");

    out.push_str("<label for=\"attributeSelect\">Attribute</label>\n<select id=\"attributeSelect\">\n");
    for option in dropdown_options(attribute_options, selected) {
        let marker = if Some(option) == selected { " selected" } else { "" };
        let _ = writeln!(
            out,
            "  <option value=\"{0}\"{1}>{0}</option>",
            escape_html(option),
            marker
        );
    }
    out.push_str("</select>\n");

    for container in containers.all() {
        let _ = writeln!(out, "<div id=\"{}\"></div>", escape_html(container));
    }

    out.push_str("<script>\nconst specs = {\n");
    for container in slots.containers() {
        let literal = match slots.get(container) {
            Some(ChartSlot::Inline(spec)) => script_json(spec.as_value()),
            Some(ChartSlot::Resource(name)) => script_json(&Value::String(name.clone())),
            None => continue,
        };
        let _ = writeln!(
            out,
            "  {}: {},",
            script_json(&Value::String(container.to_string())),
            literal
        );
    }
    out.push_str("};\n");
    let attribute_ids: Vec<Value> = containers
        .attribute_charts()
        .iter()
        .map(|id| Value::String(id.to_string()))
        .collect();
    let _ = writeln!(
        out,
        "const attributeCharts = {};",
        script_json(&Value::Array(attribute_ids))
    );
    out.push_str(EMBED_SCRIPT);
    out.push_str("</script>\n</body>\n</html>\n");
    out
}

// Attribute charts are re-bound in place when the dropdown changes
const EMBED_SCRIPT: &str = r#"function embed(id, spec) {
  vegaEmbed('#' + id, spec)
    .then(() => console.log(id + " loaded successfully"))
    .catch(error => console.error("Error loading " + id + ": ", error));
}
Object.entries(specs).forEach(([id, spec]) => embed(id, spec));
document.getElementById('attributeSelect').addEventListener('change', function() {
  attributeCharts.forEach(id => {
    if (typeof specs[id] !== 'object') return;
    const spec = structuredClone(specs[id]);
    spec.encoding.y.field = this.value;
    embed(id, spec);
  });
});
"#;
