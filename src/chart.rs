//! Stacked-area occupancy charts.
//!
//! Renders one SVG per algorithm run showing how the fleet splits across
//! occupancy states over the day. Styling lives in a [`Palette`] value owned
//! by the caller; there is no process-wide plotting state.

use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use crate::error::{AnalysisError, AnalysisResult};
use crate::occupancy::{OccupancyTable, COMPOSITION_STATES};

/// Fixed color assignment per occupancy state.
///
/// `stay` and `0 pax` keep their historical colors (greyish, light olive);
/// the passenger states use a qualitative palette.
pub struct Palette {
    colors: Vec<(&'static str, RGBColor)>,
    fallback: RGBColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![
                ("4 pax", RGBColor(228, 26, 28)),
                ("3 pax", RGBColor(55, 126, 184)),
                ("2 pax", RGBColor(77, 175, 74)),
                ("1 pax", RGBColor(152, 78, 163)),
                ("0 pax", RGBColor(172, 191, 105)),
                ("pickup", RGBColor(255, 127, 0)),
                ("rebalance", RGBColor(255, 255, 51)),
                ("stay", RGBColor(146, 149, 145)),
                ("off-service", RGBColor(166, 86, 40)),
            ],
            fallback: RGBColor(128, 128, 128),
        }
    }
}

impl Palette {
    pub fn color(&self, state: &str) -> RGBColor {
        self.colors
            .iter()
            .find(|(s, _)| *s == state)
            .map(|(_, c)| *c)
            .unwrap_or(self.fallback)
    }
}

fn chart_err<E: std::fmt::Display>(e: E) -> AnalysisError {
    AnalysisError::Chart(e.to_string())
}

fn fmt_time_of_day(secs: f64) -> String {
    let total_minutes = (secs / 60.0) as u64;
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

/// Renders the stacked occupancy series of one run to an SVG file.
pub fn render_occupancy(
    table: &OccupancyTable,
    title: &str,
    palette: &Palette,
    out_path: &Path,
    size: (u32, u32),
) -> AnalysisResult<()> {
    if table.times.is_empty() {
        return Err(AnalysisError::Chart(format!(
            "no occupancy rows to chart for '{title}'"
        )));
    }

    let states: Vec<&str> = COMPOSITION_STATES
        .iter()
        .copied()
        .filter(|s| table.state_index(s).is_some())
        .collect();
    let indices: Vec<usize> = states
        .iter()
        .map(|s| table.state_index(s).unwrap_or(0))
        .collect();

    // Running totals per row, one series per state, bottom of the stack first.
    let cumulative: Vec<Vec<f64>> = table
        .rows
        .iter()
        .map(|row| {
            let mut acc = 0.0;
            indices
                .iter()
                .map(|&idx| {
                    acc += row[idx];
                    acc
                })
                .collect()
        })
        .collect();

    let x_max = table.times.last().copied().unwrap_or(0.0).max(1.0);
    let y_max = cumulative
        .iter()
        .filter_map(|row| row.last().copied())
        .fold(1.0_f64, f64::max)
        * 1.05;

    let root = SVGBackend::new(out_path, size).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("Time of day")
        .y_desc("No. of vehicles")
        .x_label_formatter(&|t| fmt_time_of_day(*t))
        .draw()
        .map_err(chart_err)?;

    // Draw from the top of the stack down so each band paints over the
    // cumulative series beneath it.
    for layer in (0..states.len()).rev() {
        let color = palette.color(states[layer]);
        let points: Vec<(f64, f64)> = table
            .times
            .iter()
            .zip(&cumulative)
            .map(|(t, row)| (*t, row[layer]))
            .collect();

        chart
            .draw_series(AreaSeries::new(points, 0.0, color.mix(0.7)))
            .map_err(chart_err)?
            .label(states[layer])
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
            });
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    info!(path = %out_path.display(), states = states.len(), "Rendered occupancy chart");
    Ok(())
}
