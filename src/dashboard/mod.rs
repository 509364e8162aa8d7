//! Presentation adapter: turns filtered tables into KPI tiles, bar-chart
//! specs and raw previews, without depending on any UI toolkit.

pub mod chart;
pub mod color;
pub mod metric;
pub mod panels;
pub mod preview;
pub mod schema;
pub mod session;

pub use chart::{ChartBar, ChartSpec};
pub use panels::{ChartKind, MetricKind};
pub use session::DashboardSession;
