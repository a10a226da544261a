//! Stats module - descriptive statistics and correlation

mod calculator;
mod summary;

pub use calculator::{ColumnStats, CorrelationMatrix, DescribeTable, StatsCalculator};
