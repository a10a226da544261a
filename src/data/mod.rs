//! Data module - CSV loading and processing

mod loader;
mod processor;

pub use loader::{DataLoader, LoaderError};
pub use processor::{DataProcessor, PivotTable, ProcessorError, YearTotals};

pub const YEAR: &str = "Year";
pub const INDUSTRY: &str = "Industry";
pub const ROBOTS_ADOPTED: &str = "Robots_Adopted";
pub const PRODUCTIVITY_GAIN: &str = "Productivity_Gain";
pub const COST_SAVINGS: &str = "Cost_Savings";
pub const JOBS_DISPLACED: &str = "Jobs_Displaced";
pub const TRAINING_HOURS: &str = "Training_Hours";

/// The five metric columns. A record is kept only if all of them parsed.
pub const METRIC_COLUMNS: [&str; 5] = [
    ROBOTS_ADOPTED,
    PRODUCTIVITY_GAIN,
    COST_SAVINGS,
    JOBS_DISPLACED,
    TRAINING_HOURS,
];

/// Every numeric column, in file order (Year first).
pub const NUMERIC_COLUMNS: [&str; 6] = [
    YEAR,
    ROBOTS_ADOPTED,
    PRODUCTIVITY_GAIN,
    COST_SAVINGS,
    JOBS_DISPLACED,
    TRAINING_HOURS,
];

pub const REQUIRED_COLUMNS: [&str; 7] = [
    YEAR,
    INDUSTRY,
    ROBOTS_ADOPTED,
    PRODUCTIVITY_GAIN,
    COST_SAVINGS,
    JOBS_DISPLACED,
    TRAINING_HOURS,
];

#[cfg(test)]
pub(crate) use processor::tests::frame as test_frame;
