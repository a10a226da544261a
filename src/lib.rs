//! Robotics EDA - Robotics adoption dataset analysis
//!
//! Loads the robotics adoption CSV, prints descriptive statistics and yearly
//! totals, and writes a fixed set of PNG charts to the output directory.

pub mod charts;
pub mod config;
pub mod data;
pub mod report;
pub mod stats;
