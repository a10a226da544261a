//! Static Chart Renderer
//! Draws the report charts with plotters into an RGB buffer and encodes PNG.
//!
//! Chart kinds:
//! 1. Line chart: one line per series, circle marker at every point,
//!    optional legend with a heading
//! 2. Stacked bar chart: one bar per year, segments stacked by industry
//! 3. Heatmap: annotated cells (2 decimals) plus a color bar on the right

use crate::charts::palette::{self, MISSING_CELL};
use crate::charts::plotter::{Chart, Heatmap, LineChart, StackedBarChart};
use image::{ImageError, ImageFormat, RgbImage};
use plotters::coord::combinators::WithKeyPoints;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

/// Key-pointed f64 axis that satisfies `configure_mesh`'s `ValueFormatter`
/// bound; every `Ranged` method forwards to the wrapped axis.
struct CategoryAxis(WithKeyPoints<RangedCoordf64>);

impl Ranged for CategoryAxis {
    type ValueType = f64;
    type FormatOption = plotters::coord::ranged1d::DefaultFormatting;

    fn range(&self) -> Range<f64> {
        self.0.range()
    }

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.0.map(value, limit)
    }

    fn key_points<Hint: plotters::coord::ranged1d::KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        self.0.key_points(hint)
    }

    fn axis_pixel_range(&self, limit: (i32, i32)) -> Range<i32> {
        self.0.axis_pixel_range(limit)
    }
}

const FONT: &str = "sans-serif";
const TITLE_SIZE: i32 = 24;
const LEGEND_WIDTH: i32 = 220;
const COLORBAR_WIDTH: u32 = 140;
const BAR_HALF_WIDTH: f64 = 0.25;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] ImageError),
}

fn drawing_err<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Drawing(err.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render a chart into an RGB image of the chart's size.
    pub fn render(chart: &Chart) -> Result<RgbImage, RenderError> {
        let (width, height) = chart.size();
        let mut buffer = vec![0u8; (width * height * 3) as usize];

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(drawing_err)?;

            match chart {
                Chart::Line(c) => Self::draw_line_chart(&root, c)?,
                Chart::StackedBar(c) => Self::draw_stacked_bars(&root, c)?,
                Chart::Heatmap(c) => Self::draw_heatmap(&root, c)?,
            }

            root.present().map_err(drawing_err)?;
        }

        RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| RenderError::Drawing("pixel buffer does not match chart size".into()))
    }

    /// Render a chart and write it as PNG.
    pub fn render_to_file(chart: &Chart, path: &Path) -> Result<(), RenderError> {
        let img = Self::render(chart)?;
        img.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }

    fn draw_line_chart(root: &Area, chart: &LineChart) -> Result<(), RenderError> {
        let x_range = Self::year_range(
            chart
                .series
                .iter()
                .flat_map(|s| s.points.iter().map(|(year, _)| *year)),
        );
        let y_range = Self::value_range(
            chart
                .series
                .iter()
                .flat_map(|s| s.points.iter().map(|(_, v)| *v)),
        );
        let year_labels = ((x_range.end - x_range.start) as usize + 1).min(20);

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, (FONT, TITLE_SIZE))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(x_range, y_range)
            .map_err(drawing_err)?;

        ctx.configure_mesh()
            .x_desc(chart.x_desc.as_str())
            .y_desc(chart.y_desc.as_str())
            .x_labels(year_labels)
            .y_label_formatter(&|v| format_tick(*v))
            .draw()
            .map_err(drawing_err)?;

        for (i, series) in chart.series.iter().enumerate() {
            let color = palette::series_color(i);
            ctx.draw_series(LineSeries::new(
                series.points.iter().copied(),
                color.stroke_width(2),
            ))
            .map_err(drawing_err)?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

            ctx.draw_series(
                series
                    .points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 4, color.filled())),
            )
            .map_err(drawing_err)?;
        }

        if let Some(heading) = &chart.legend_title {
            let (base_x, base_y) = ctx.plotting_area().get_base_pixel();
            let (plot_w, _) = ctx.plotting_area().dim_in_pixel();
            let legend_x = (plot_w as i32 - LEGEND_WIDTH).max(0);

            root.draw(&Text::new(
                heading.clone(),
                (base_x + legend_x + 8, base_y + 8),
                (FONT, 16).into_font(),
            ))
            .map_err(drawing_err)?;

            ctx.configure_series_labels()
                .position(SeriesLabelPosition::Coordinate(legend_x, 30))
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(drawing_err)?;
        }

        Ok(())
    }

    fn draw_stacked_bars(root: &Area, chart: &StackedBarChart) -> Result<(), RenderError> {
        let n = chart.categories.len();

        // Positive values stack upwards, negative ones downwards
        let mut pos_base = vec![0.0f64; n];
        let mut neg_base = vec![0.0f64; n];
        let mut segments = Vec::with_capacity(chart.stacks.len());
        for (_, values) in &chart.stacks {
            let mut bars = Vec::new();
            for (i, &v) in values.iter().enumerate().take(n) {
                if v == 0.0 || !v.is_finite() {
                    continue;
                }
                let base = if v > 0.0 {
                    &mut pos_base[i]
                } else {
                    &mut neg_base[i]
                };
                let (lo, hi) = if v > 0.0 {
                    (*base, *base + v)
                } else {
                    (*base + v, *base)
                };
                *base += v;
                bars.push((i as f64, lo, hi));
            }
            segments.push(bars);
        }

        let y_range = Self::value_range(
            pos_base
                .iter()
                .chain(neg_base.iter())
                .copied()
                .chain(std::iter::once(0.0)),
        );
        let y_range = y_range.start.min(0.0)..y_range.end;

        let categories = &chart.categories;
        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, (FONT, TITLE_SIZE))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(Self::category_axis(n), y_range)
            .map_err(drawing_err)?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_desc(chart.x_desc.as_str())
            .y_desc(chart.y_desc.as_str())
            .x_label_formatter(&|v| {
                category_at(categories, *v)
                    .map(|year| year.to_string())
                    .unwrap_or_default()
            })
            .y_label_formatter(&|v| format_tick(*v))
            .draw()
            .map_err(drawing_err)?;

        let colors = palette::viridis_colors(chart.stacks.len());
        for (((label, _), bars), color) in chart.stacks.iter().zip(segments).zip(colors) {
            ctx.draw_series(bars.into_iter().map(|(x, lo, hi)| {
                Rectangle::new(
                    [(x - BAR_HALF_WIDTH, lo), (x + BAR_HALF_WIDTH, hi)],
                    color.filled(),
                )
            }))
            .map_err(drawing_err)?
            .label(label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(drawing_err)?;

        Ok(())
    }

    fn draw_heatmap(root: &Area, chart: &Heatmap) -> Result<(), RenderError> {
        let n = chart.labels.len();

        let (mut vmin, mut vmax) = Self::finite_bounds(chart.values.iter().flatten().copied())
            .unwrap_or((-1.0, 1.0));
        if vmax <= vmin {
            vmin -= 0.5;
            vmax += 0.5;
        }

        let (width, _) = root.dim_in_pixel();
        let (left, right) = root.split_horizontally(width.saturating_sub(COLORBAR_WIDTH) as i32);

        let labels = &chart.labels;
        let label_at = |v: f64| category_at(labels, v).cloned().unwrap_or_default();
        // Row 0 is drawn at the top
        let row_at = |v: f64| label_at(n as f64 - 1.0 - v);

        let mut ctx = ChartBuilder::on(&left)
            .caption(&chart.title, (FONT, TITLE_SIZE))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(140)
            .build_cartesian_2d(Self::category_axis(n), Self::category_axis(n))
            .map_err(drawing_err)?;

        ctx.configure_mesh()
            .disable_mesh()
            .label_style((FONT, 13))
            .x_label_formatter(&|v| label_at(*v))
            .y_label_formatter(&|v| row_at(*v))
            .draw()
            .map_err(drawing_err)?;

        for (i, row) in chart.values.iter().enumerate() {
            let y = n.saturating_sub(1 + i) as f64;
            for (j, &v) in row.iter().enumerate() {
                let x = j as f64;
                let fill = if v.is_finite() {
                    palette::coolwarm(v, vmin, vmax)
                } else {
                    MISSING_CELL
                };

                ctx.draw_series(std::iter::once(Rectangle::new(
                    [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                    fill.filled(),
                )))
                .map_err(drawing_err)?;

                let annotation = if v.is_nan() {
                    "nan".to_string()
                } else {
                    format!("{:.2}", v)
                };
                let text_color = palette::text_color_for(fill);
                let style = (FONT, 18)
                    .into_font()
                    .color(&text_color)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                ctx.draw_series(std::iter::once(Text::new(annotation, (x, y), style)))
                    .map_err(drawing_err)?;
            }
        }

        Self::draw_colorbar(&right, vmin, vmax)
    }

    fn draw_colorbar(area: &Area, vmin: f64, vmax: f64) -> Result<(), RenderError> {
        const STEPS: usize = 100;

        let mut ctx = ChartBuilder::on(area)
            .margin_top(70)
            .margin_bottom(70)
            .margin_right(50)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..1.0, vmin..vmax)
            .map_err(drawing_err)?;

        ctx.configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_labels(6)
            .y_label_formatter(&|v| format!("{:.2}", v))
            .draw()
            .map_err(drawing_err)?;

        ctx.draw_series((0..STEPS).map(|k| {
            let lo = vmin + (vmax - vmin) * k as f64 / STEPS as f64;
            let hi = vmin + (vmax - vmin) * (k + 1) as f64 / STEPS as f64;
            Rectangle::new(
                [(0.0, lo), (1.0, hi)],
                palette::coolwarm((lo + hi) / 2.0, vmin, vmax).filled(),
            )
        }))
        .map_err(drawing_err)?;

        Ok(())
    }

    /// One unit-wide slot per category, centred on its index, with a tick
    /// at every index. Stays a proper range for a single category.
    fn category_axis(n: usize) -> CategoryAxis {
        let end = n.max(1) as f64 - 0.5;
        CategoryAxis((-0.5..end).with_key_points((0..n).map(|i| i as f64).collect()))
    }

    /// Inclusive year axis; a single year gets one year of room either side.
    fn year_range(years: impl Iterator<Item = i64>) -> Range<i64> {
        let (min, max) = years.fold((i64::MAX, i64::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
        if min > max {
            0..1
        } else if min == max {
            (min - 1)..(max + 1)
        } else {
            min..max
        }
    }

    /// Value axis with 5% padding around the finite values.
    fn value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
        let Some((min, max)) = Self::finite_bounds(values) else {
            return 0.0..1.0;
        };
        let pad = if max > min {
            (max - min) * 0.05
        } else {
            min.abs().max(1.0) * 0.05
        };
        (min - pad)..(max + pad)
    }

    fn finite_bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
        values
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Category under an axis position, if the position rounds to one.
fn category_at<T>(items: &[T], position: f64) -> Option<&T> {
    let index = position.round();
    if index < 0.0 {
        return None;
    }
    items.get(index as usize)
}

/// Axis tick text: integers without decimals, otherwise up to two decimals.
fn format_tick(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        let text = format!("{:.2}", v);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
