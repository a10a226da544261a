//! Report Generator
//! Runs the analysis end to end: console summaries first, then chart files.

use crate::charts::{ChartJob, ChartPlotter, StaticChartRenderer, METRIC_CHARTS};
use crate::config::ReportConfig;
use crate::data::{
    DataLoader, DataProcessor, PivotTable, YearTotals, NUMERIC_COLUMNS, ROBOTS_ADOPTED,
};
use crate::stats::{CorrelationMatrix, DescribeTable, StatsCalculator};
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use polars::prelude::DataFrame;
use rayon::prelude::*;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// One industry's slice of the cleaned records.
pub struct IndustryReport {
    pub industry: String,
    pub subset: DataFrame,
    pub summary: DescribeTable,
}

/// Everything derived from the loaded records, computed once.
pub struct Analysis {
    pub raw_rows: usize,
    /// Describe table over the coerced records, before cleaning.
    pub summary: DescribeTable,
    pub cleaned: DataFrame,
    pub robots_by_year: YearTotals,
    pub pivot: PivotTable,
    pub correlation: CorrelationMatrix,
    /// In first-occurrence order of the cleaned records.
    pub industries: Vec<IndustryReport>,
}

impl Analysis {
    pub fn from_records(records: &DataFrame) -> Result<Self> {
        let summary = StatsCalculator::describe(records, &NUMERIC_COLUMNS)?;
        let cleaned = DataProcessor::drop_incomplete_rows(records)?;
        let robots_by_year = DataProcessor::robots_by_year(&cleaned)?;
        let pivot = DataProcessor::pivot_sum(&cleaned, ROBOTS_ADOPTED)?;
        let correlation = StatsCalculator::correlation_matrix(&cleaned, &NUMERIC_COLUMNS)?;

        let mut industries = Vec::new();
        for industry in DataProcessor::industries(&cleaned)? {
            let subset = DataProcessor::filter_by_industry(&cleaned, &industry)?;
            let summary = StatsCalculator::describe(&subset, &NUMERIC_COLUMNS)?;
            industries.push(IndustryReport {
                industry,
                subset,
                summary,
            });
        }

        Ok(Self {
            raw_rows: records.height(),
            summary,
            cleaned,
            robots_by_year,
            pivot,
            correlation,
            industries,
        })
    }

    pub fn retained_rows(&self) -> usize {
        self.cleaned.height()
    }

    pub fn dropped_rows(&self) -> usize {
        self.raw_rows - self.retained_rows()
    }

    /// Console text: dataset summary, yearly totals, then one summary per industry.
    pub fn write_console<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Summary of the Dataset:")?;
        write!(out, "{}", self.summary)?;

        writeln!(out, "\nTotal Robots Adopted by Year:")?;
        write!(out, "{}", self.robots_by_year)?;

        for report in &self.industries {
            writeln!(out, "\nSummary Statistics for {}:", report.industry)?;
            write!(out, "{}", report.summary)?;
        }
        Ok(())
    }

    /// All charts of the report, in the order they are listed in the output.
    pub fn chart_jobs(&self) -> Result<Vec<ChartJob>> {
        let mut jobs = vec![ChartPlotter::total_by_year(&self.robots_by_year)];
        for metric in &METRIC_CHARTS {
            jobs.push(ChartPlotter::metric_by_industry(&self.cleaned, metric)?);
        }
        jobs.push(ChartPlotter::stacked_by_industry(&self.pivot));
        jobs.push(ChartPlotter::correlation_heatmap(&self.correlation));
        for report in &self.industries {
            jobs.push(ChartPlotter::industry_productivity(
                &report.subset,
                &report.industry,
            )?);
        }
        Ok(jobs)
    }
}

/// What a finished run produced.
#[derive(Debug)]
pub struct ReportOutcome {
    pub rows_loaded: usize,
    pub rows_retained: usize,
    pub files: Vec<PathBuf>,
}

pub struct ReportGenerator {
    config: ReportConfig,
}

impl ReportGenerator {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Run the whole report, writing console text to `out`.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<ReportOutcome> {
        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

        let mut loader = DataLoader::new();
        let records = loader
            .load_csv(&self.config.input)
            .with_context(|| format!("Failed to load dataset: {:?}", self.config.input))?
            .clone();
        info!(
            "loaded {} rows from {:?}",
            loader.get_row_count(),
            self.config.input
        );

        let analysis = Analysis::from_records(&records)?;
        info!(
            "{} rows retained, {} dropped for unparseable metrics",
            analysis.retained_rows(),
            analysis.dropped_rows()
        );
        info!("{} industries found", analysis.industries.len());

        analysis.write_console(out)?;
        out.flush()?;

        let jobs = analysis.chart_jobs()?;
        let files = self.render_jobs(&jobs)?;

        if self.config.open_output {
            if let Err(e) = open::that_detached(output_dir) {
                warn!("could not open {:?}: {}", output_dir, e);
            }
        }

        Ok(ReportOutcome {
            rows_loaded: analysis.raw_rows,
            rows_retained: analysis.retained_rows(),
            files,
        })
    }

    /// Render every job into the output directory.
    ///
    /// Each failure is logged; the first one in job order fails the run.
    pub fn render_jobs(&self, jobs: &[ChartJob]) -> Result<Vec<PathBuf>> {
        let output_dir = &self.config.output_dir;
        let render = |job: &ChartJob| -> Result<PathBuf> {
            let path = output_dir.join(&job.file_name);
            StaticChartRenderer::render_to_file(&job.chart, &path)
                .with_context(|| format!("Failed to render {}", job.file_name))?;
            debug!("wrote {:?}", path);
            Ok(path)
        };

        let results: Vec<Result<PathBuf>> = if self.config.parallel_render {
            jobs.par_iter().map(render).collect()
        } else {
            jobs.iter().map(render).collect()
        };

        let mut files = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(path) => files.push(path),
                Err(e) => {
                    error!("{:#}", e);
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        info!("rendered {} charts into {:?}", files.len(), output_dir);
        Ok(files)
    }
}
