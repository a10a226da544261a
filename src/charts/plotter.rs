//! Chart Plotter Module
//! Builds the chart models for the report from the cleaned record set.

use crate::data::{
    DataProcessor, PivotTable, ProcessorError, YearTotals, COST_SAVINGS, JOBS_DISPLACED,
    PRODUCTIVITY_GAIN, TRAINING_HOURS,
};
use crate::stats::CorrelationMatrix;
use polars::prelude::DataFrame;

pub const TOTAL_ROBOTS_FILE: &str = "total_robots_adopted_by_year.png";
pub const STACKED_ROBOTS_FILE: &str = "robots_adopted_by_industry_over_years.png";
pub const CORRELATION_FILE: &str = "correlation_matrix_of_robotics_metrics.png";

const PRODUCTIVITY_LABEL: &str = "Productivity Gain (%)";

/// A metric plotted over the years with one line per industry.
#[derive(Debug, Clone, Copy)]
pub struct MetricChart {
    pub column: &'static str,
    pub file_name: &'static str,
    pub title: &'static str,
    pub y_desc: &'static str,
}

pub const METRIC_CHARTS: [MetricChart; 4] = [
    MetricChart {
        column: PRODUCTIVITY_GAIN,
        file_name: "productivity_gain_over_years_by_industry.png",
        title: "Productivity Gain Over Years by Industry",
        y_desc: PRODUCTIVITY_LABEL,
    },
    MetricChart {
        column: COST_SAVINGS,
        file_name: "cost_savings_over_years_by_industry.png",
        title: "Cost Savings Over Years by Industry (in Million USD)",
        y_desc: "Cost Savings (M USD)",
    },
    MetricChart {
        column: JOBS_DISPLACED,
        file_name: "job_displacement_trends_by_industry.png",
        title: "Job Displacement Trends by Industry",
        y_desc: "Jobs Displaced",
    },
    MetricChart {
        column: TRAINING_HOURS,
        file_name: "training_hours_by_industry_over_years.png",
        title: "Training Hours for Skill Development by Industry",
        y_desc: "Training Hours",
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub points: Vec<(i64, f64)>,
}

/// Line chart with `Year` on the x axis and a marker at every point.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    /// Legend heading; no legend is drawn when `None`.
    pub legend_title: Option<String>,
    pub series: Vec<LineSeries>,
    pub size: (u32, u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackedBarChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub categories: Vec<i64>,
    /// (label, one value per category), drawn bottom-up in this order.
    pub stacks: Vec<(String, Vec<f64>)>,
    pub size: (u32, u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
    pub size: (u32, u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Line(LineChart),
    StackedBar(StackedBarChart),
    Heatmap(Heatmap),
}

impl Chart {
    pub fn title(&self) -> &str {
        match self {
            Chart::Line(c) => &c.title,
            Chart::StackedBar(c) => &c.title,
            Chart::Heatmap(c) => &c.title,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        match self {
            Chart::Line(c) => c.size,
            Chart::StackedBar(c) => c.size,
            Chart::Heatmap(c) => c.size,
        }
    }
}

/// A chart paired with the file it is written to.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartJob {
    pub file_name: String,
    pub chart: Chart,
}

/// Creates the report's chart models.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Total robots adopted per year, single line.
    pub fn total_by_year(totals: &YearTotals) -> ChartJob {
        ChartJob {
            file_name: TOTAL_ROBOTS_FILE.to_string(),
            chart: Chart::Line(LineChart {
                title: "Total Robots Adopted by Year".to_string(),
                x_desc: "Year".to_string(),
                y_desc: "Total Robots Adopted".to_string(),
                legend_title: None,
                series: vec![LineSeries {
                    label: totals.value_column.clone(),
                    points: totals.totals.clone(),
                }],
                size: (1000, 600),
            }),
        }
    }

    /// One line per industry for a metric.
    pub fn metric_by_industry(
        df: &DataFrame,
        metric: &MetricChart,
    ) -> Result<ChartJob, ProcessorError> {
        let series = DataProcessor::mean_by_year_per_industry(df, metric.column)?
            .into_iter()
            .map(|(label, points)| LineSeries { label, points })
            .collect();

        Ok(ChartJob {
            file_name: metric.file_name.to_string(),
            chart: Chart::Line(LineChart {
                title: metric.title.to_string(),
                x_desc: "Year".to_string(),
                y_desc: metric.y_desc.to_string(),
                legend_title: Some("Industry".to_string()),
                series,
                size: (1200, 600),
            }),
        })
    }

    /// Pivot table as bars per year, stacked by industry.
    pub fn stacked_by_industry(pivot: &PivotTable) -> ChartJob {
        let stacks = pivot
            .industries
            .iter()
            .enumerate()
            .map(|(i, industry)| (industry.clone(), pivot.column_values(i)))
            .collect();

        ChartJob {
            file_name: STACKED_ROBOTS_FILE.to_string(),
            chart: Chart::StackedBar(StackedBarChart {
                title: "Robots Adopted by Industry Over Years".to_string(),
                x_desc: "Year".to_string(),
                y_desc: "Robots Adopted".to_string(),
                categories: pivot.years.clone(),
                stacks,
                size: (1200, 600),
            }),
        }
    }

    pub fn correlation_heatmap(matrix: &CorrelationMatrix) -> ChartJob {
        ChartJob {
            file_name: CORRELATION_FILE.to_string(),
            chart: Chart::Heatmap(Heatmap {
                title: "Correlation Matrix of Robotics Metrics".to_string(),
                labels: matrix.labels.clone(),
                values: matrix.values.clone(),
                size: (1000, 800),
            }),
        }
    }

    /// Productivity gain over the years for a single industry's subset.
    pub fn industry_productivity(
        subset: &DataFrame,
        industry: &str,
    ) -> Result<ChartJob, ProcessorError> {
        let points = DataProcessor::mean_by_year_per_industry(subset, PRODUCTIVITY_GAIN)?
            .into_iter()
            .find(|(name, _)| name == industry)
            .map(|(_, points)| points)
            .unwrap_or_default();

        Ok(ChartJob {
            file_name: Self::industry_file_name(industry),
            chart: Chart::Line(LineChart {
                title: format!("Productivity Gain Over Years in {}", industry),
                x_desc: "Year".to_string(),
                y_desc: PRODUCTIVITY_LABEL.to_string(),
                legend_title: None,
                series: vec![LineSeries {
                    label: industry.to_string(),
                    points,
                }],
                size: (1000, 500),
            }),
        })
    }

    /// `productivity_gain_over_years_{industry}.png`, with path separators
    /// replaced so the file stays inside the output directory.
    pub fn industry_file_name(industry: &str) -> String {
        let safe: String = industry
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        format!("productivity_gain_over_years_{}.png", safe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{test_frame, DataProcessor, ROBOTS_ADOPTED};

    fn full(values: [f64; 5]) -> [Option<f64>; 5] {
        values.map(Some)
    }

    fn sample() -> DataFrame {
        test_frame(&[
            (2019, "Automotive", full([100.0, 5.0, 2.0, 10.0, 40.0])),
            (2019, "Healthcare", full([30.0, 2.0, 0.5, 1.0, 10.0])),
            (2020, "Automotive", full([150.0, 6.0, 3.0, 12.0, 50.0])),
        ])
    }

    #[test]
    fn test_metric_charts_cover_four_metrics() {
        let columns: Vec<&str> = METRIC_CHARTS.iter().map(|m| m.column).collect();
        assert_eq!(
            columns,
            vec![PRODUCTIVITY_GAIN, COST_SAVINGS, JOBS_DISPLACED, TRAINING_HOURS]
        );
    }

    #[test]
    fn test_metric_by_industry_one_line_per_industry() {
        let job = ChartPlotter::metric_by_industry(&sample(), &METRIC_CHARTS[1]).unwrap();

        assert_eq!(job.file_name, "cost_savings_over_years_by_industry.png");
        let Chart::Line(chart) = job.chart else {
            panic!("expected a line chart");
        };
        assert_eq!(chart.legend_title.as_deref(), Some("Industry"));
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].label, "Automotive");
        assert_eq!(chart.series[0].points, vec![(2019, 2.0), (2020, 3.0)]);
        assert_eq!(chart.series[1].points, vec![(2019, 0.5)]);
    }

    #[test]
    fn test_stacked_chart_follows_pivot() {
        let pivot = DataProcessor::pivot_sum(&sample(), ROBOTS_ADOPTED).unwrap();
        let job = ChartPlotter::stacked_by_industry(&pivot);

        assert_eq!(job.file_name, STACKED_ROBOTS_FILE);
        let Chart::StackedBar(chart) = job.chart else {
            panic!("expected a stacked bar chart");
        };
        assert_eq!(chart.categories, vec![2019, 2020]);
        assert_eq!(
            chart.stacks,
            vec![
                ("Automotive".to_string(), vec![100.0, 150.0]),
                ("Healthcare".to_string(), vec![30.0, 0.0]),
            ]
        );
    }

    #[test]
    fn test_industry_productivity_chart() {
        let subset = DataProcessor::filter_by_industry(&sample(), "Automotive").unwrap();
        let job = ChartPlotter::industry_productivity(&subset, "Automotive").unwrap();

        assert_eq!(job.file_name, "productivity_gain_over_years_Automotive.png");
        assert_eq!(job.chart.title(), "Productivity Gain Over Years in Automotive");
        assert_eq!(job.chart.size(), (1000, 500));
    }

    #[test]
    fn test_industry_file_name() {
        assert_eq!(
            ChartPlotter::industry_file_name("Food & Beverage"),
            "productivity_gain_over_years_Food & Beverage.png"
        );
        assert_eq!(
            ChartPlotter::industry_file_name("Oil/Gas"),
            "productivity_gain_over_years_Oil_Gas.png"
        );
    }
}
