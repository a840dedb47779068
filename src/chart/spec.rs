// Declarative chart specifications handed to the renderer

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Container ids of the page, one per chart slot
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Containers {
    pub bar: String,
    pub scatter: String,
    pub line: String,
    pub combined: String,
    pub heatmap_scatter: String,
    pub vis: String,
    pub heatmap: String,
}

impl Default for Containers {
    fn default() -> Self {
        Self {
            bar: "chart1".to_string(),
            scatter: "chart2".to_string(),
            line: "chart3".to_string(),
            combined: "chart4".to_string(),
            heatmap_scatter: "chart5".to_string(),
            vis: "chart6".to_string(),
            heatmap: "chart7".to_string(),
        }
    }
}

impl Containers {
    /// Every id, in embed order
    pub fn all(&self) -> [&str; 7] {
        [
            self.bar.as_str(),
            self.scatter.as_str(),
            self.line.as_str(),
            self.combined.as_str(),
            self.heatmap_scatter.as_str(),
            self.vis.as_str(),
            self.heatmap.as_str(),
        ]
    }

    /// Charts that plot the selected attribute
    pub fn attribute_charts(&self) -> [&str; 3] {
        [self.bar.as_str(), self.scatter.as_str(), self.line.as_str()]
    }

    pub fn contains(&self, container: &str) -> bool {
        self.all().contains(&container)
    }

    /// Ids must be non-empty and distinct
    pub fn validate(&self) -> Result<(), String> {
        let all = self.all();
        for (idx, id) in all.iter().enumerate() {
            if id.is_empty() {
                return Err("container ids cannot be empty".to_string());
            }
            if all[..idx].contains(id) {
                return Err(format!("container id '{}' is used twice", id));
            }
        }
        Ok(())
    }
}

/// An immutable Vega-Lite specification object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChartSpec(Value);

impl ChartSpec {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Field bound to an encoding channel, if the spec has one
    pub fn encoding_field(&self, channel: &str) -> Option<&str> {
        self.0
            .get("encoding")
            .and_then(|e| e.get(channel))
            .and_then(|c| c.get("field"))
            .and_then(Value::as_str)
    }

    /// Mark type, whether written as `"bar"` or `{"type": "bar", ...}`
    pub fn mark_type(&self) -> Option<&str> {
        match self.0.get("mark")? {
            Value::String(s) => Some(s),
            Value::Object(m) => m.get("type").and_then(Value::as_str),
            _ => None,
        }
    }
}

/// What a single container receives
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSlot {
    /// A spec built (or loaded) here and embedded inline
    Inline(ChartSpec),
    /// A spec resource the renderer resolves itself, e.g. `vis1.json`
    Resource(String),
}

impl ChartSlot {
    pub fn as_spec(&self) -> Option<&ChartSpec> {
        match self {
            ChartSlot::Inline(spec) => Some(spec),
            ChartSlot::Resource(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ChartSlot::Inline(_) => "inline",
            ChartSlot::Resource(_) => "resource",
        }
    }
}

/// Everything produced by one rebuild, keyed by container id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSet {
    slots: Vec<(String, ChartSlot)>,
}

impl ChartSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, container: impl Into<String>, slot: ChartSlot) {
        self.slots.push((container.into(), slot));
    }

    pub fn get(&self, container: &str) -> Option<&ChartSlot> {
        self.slots
            .iter()
            .find(|(c, _)| c == container)
            .map(|(_, slot)| slot)
    }

    pub fn containers(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(c, _)| c.as_str())
    }

    /// The slots for `containers` only, in this set's order
    pub fn subset(&self, containers: &[String]) -> ChartSet {
        ChartSet {
            slots: self
                .slots
                .iter()
                .filter(|(c, _)| containers.contains(c))
                .cloned()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl IntoIterator for ChartSet {
    type Item = (String, ChartSlot);
    type IntoIter = std::vec::IntoIter<(String, ChartSlot)>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.into_iter()
    }
}
