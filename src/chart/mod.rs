// Vega-Lite chart specifications for the station dashboard

pub mod builder;
pub mod external;
pub mod spec;

pub use builder::{build, ExternalCharts};
pub use spec::{ChartSet, ChartSlot, ChartSpec, Containers};
