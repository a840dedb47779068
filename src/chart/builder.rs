use super::spec::{ChartSet, ChartSlot, ChartSpec, Containers};
use crate::data::Dataset;
use log::{debug, warn};
use serde_json::{json, Value};

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

pub const STATION_FIELD: &str = "Station Name";
pub const LONGITUDE_FIELD: &str = "Longitude";
pub const LATITUDE_FIELD: &str = "Latitude";
pub const TIMESTAMP_FIELD: &str = "Timestamp";
pub const AVAILABLE_BIKES_FIELD: &str = "Available Bikes";

/// Name of the click selection shared by the station map and the time series
pub const STATION_SELECTION: &str = "station_selection";

/// Chart slots supplied from outside rather than built from the dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalCharts {
    /// Inline heatmap + scatter spec for chart5; skipped when absent
    pub heatmap_scatter: Option<ChartSpec>,
    /// Resource reference for chart6
    pub vis_resource: Option<String>,
    /// Resource reference for chart7
    pub heatmap_resource: Option<String>,
}

/// Build every chart slot for one rebuild.
///
/// The bar, scatter and line charts plot `selected_attribute` per station; the
/// combined chart is the linked station map and availability time series; the
/// last three slots come from `externals`. Absent external slots are left out
/// of the returned set.
pub fn build(
    dataset: &Dataset,
    selected_attribute: &str,
    externals: &ExternalCharts,
    containers: &Containers,
) -> ChartSet {
    let mut set = ChartSet::new();

    let marks = ["bar", "circle", "line"];
    for (container, mark) in containers.attribute_charts().into_iter().zip(marks) {
        set.push(
            container,
            ChartSlot::Inline(attribute_chart(dataset, mark, selected_attribute)),
        );
    }
    set.push(containers.combined.as_str(), ChartSlot::Inline(combined_chart(dataset)));

    match &externals.heatmap_scatter {
        Some(spec) => set.push(
            containers.heatmap_scatter.as_str(),
            ChartSlot::Inline(spec.clone()),
        ),
        None => warn!(
            "Skipping {}: no heatmap and scatter spec available",
            containers.heatmap_scatter
        ),
    }
    if let Some(resource) = &externals.vis_resource {
        set.push(containers.vis.as_str(), ChartSlot::Resource(resource.clone()));
    }
    if let Some(resource) = &externals.heatmap_resource {
        set.push(containers.heatmap.as_str(), ChartSlot::Resource(resource.clone()));
    }

    let missing = dataset.missing_field_count(selected_attribute);
    if missing > 0 {
        warn!(
            "{} of {} record(s) have no '{}' value",
            missing,
            dataset.len(),
            selected_attribute
        );
    }
    debug!("Built {} chart slot(s) for '{}'", set.len(), selected_attribute);
    set
}

/// Single-encoding chart: station on x, the selected attribute on y
pub fn attribute_chart(dataset: &Dataset, mark: &str, selected_attribute: &str) -> ChartSpec {
    ChartSpec::new(json!({
        "mark": mark,
        "encoding": {
            "x": {"field": STATION_FIELD, "type": "ordinal"},
            "y": {"field": selected_attribute, "type": "quantitative"}
        },
        "data": {"values": dataset.values()}
    }))
}

fn station_selection() -> Value {
    json!({
        "name": STATION_SELECTION,
        "select": {"type": "point", "fields": [STATION_FIELD], "on": "click"}
    })
}

/// Station locations; clicking a point selects that station
pub fn station_map(dataset: &Dataset) -> ChartSpec {
    ChartSpec::new(json!({
        "width": 400,
        "height": 300,
        "title": "Bike Station Locations",
        "data": {"values": dataset.values()},
        "params": [station_selection()],
        "mark": {"type": "circle", "size": 100},
        "encoding": {
            "x": {"field": LONGITUDE_FIELD, "type": "quantitative"},
            "y": {"field": LATITUDE_FIELD, "type": "quantitative"},
            "tooltip": [{"field": STATION_FIELD, "type": "nominal"}],
            "color": {
                "condition": {"param": STATION_SELECTION, "empty": false, "value": "red"},
                "value": "blue"
            }
        }
    }))
}

/// Available bikes over time for the selected station; empty until one is clicked
pub fn availability_timeseries(dataset: &Dataset) -> ChartSpec {
    ChartSpec::new(json!({
        "width": 600,
        "height": 300,
        "title": "Bike Availability Over Time",
        "data": {"values": dataset.values()},
        "mark": {"type": "line", "point": true},
        "transform": [
            {"filter": {"param": STATION_SELECTION, "empty": false}}
        ],
        "encoding": {
            "x": {"field": TIMESTAMP_FIELD, "type": "temporal", "title": "Time"},
            "y": {
                "field": AVAILABLE_BIKES_FIELD,
                "type": "quantitative",
                "title": "Average Available Bikes"
            },
            "color": {"value": "blue"},
            "tooltip": [
                {"field": TIMESTAMP_FIELD, "type": "temporal"},
                {"field": AVAILABLE_BIKES_FIELD, "type": "quantitative"}
            ]
        }
    }))
}

/// Map and time series side by side, linked through the station selection
pub fn combined_chart(dataset: &Dataset) -> ChartSpec {
    ChartSpec::new(json!({
        "$schema": VEGA_LITE_SCHEMA,
        "hconcat": [
            station_map(dataset).into_value(),
            availability_timeseries(dataset).into_value()
        ]
    }))
}
