//! Charts module - chart models and static PNG rendering

mod palette;
mod plotter;
mod renderer;

pub use plotter::{
    Chart, ChartJob, ChartPlotter, Heatmap, LineChart, LineSeries, MetricChart, StackedBarChart,
    CORRELATION_FILE, METRIC_CHARTS, STACKED_ROBOTS_FILE, TOTAL_ROBOTS_FILE,
};
pub use renderer::{RenderError, StaticChartRenderer};

#[cfg(test)]
pub(crate) use renderer::tests::font_available;
