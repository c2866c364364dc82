//! Grouped bar charts, vertical or horizontal.

use super::line::Series;
use crate::renderer::{cartesian_chart, draw_axes, draw_legend, padded_max, AxisSpec, ChartRenderer};
use crate::types::ChartStyle;
use bikeshare_common::{format_count, truncate_string, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

/// Share of a category slot covered by its bars.
const GROUP_WIDTH: f64 = 0.8;

/// Longest category label on a horizontal chart.
const MAX_LABEL_CHARS: usize = 32;

/// Direction of the bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Categories along x, bars grow upwards.
    Vertical,
    /// Categories along y, first category on top, bars grow rightwards.
    Horizontal,
}

/// Bars per category, one bar per series side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    /// Caption.
    pub title: String,
    /// Title of the category axis.
    pub category_desc: String,
    /// Title of the value axis.
    pub value_desc: String,
    /// Category names.
    pub categories: Vec<String>,
    /// One series per bar colour.
    pub series: Vec<Series>,
    /// Bar direction.
    pub orientation: Orientation,
    /// Print each value at the end of its bar.
    pub show_values: bool,
}

impl BarChart {
    /// Position of category `i` on the category axis.
    fn slot(&self, i: usize) -> f64 {
        match self.orientation {
            Orientation::Vertical => i as f64,
            Orientation::Horizontal => (self.categories.len() - 1 - i) as f64,
        }
    }

    fn bar(&self, slot: f64, offset: f64, width: f64, value: f64) -> [(f64, f64); 2] {
        let lo = slot - GROUP_WIDTH / 2.0 + offset;
        let hi = lo + width;
        match self.orientation {
            Orientation::Vertical => [(lo, 0.0), (hi, value)],
            Orientation::Horizontal => [(0.0, lo), (value, hi)],
        }
    }
}

impl ChartRenderer for BarChart {
    fn title(&self) -> &str {
        &self.title
    }

    fn has_data(&self) -> bool {
        !self.categories.is_empty()
            && self
                .series
                .iter()
                .any(|s| s.values.iter().any(|v| *v > 0.0))
    }

    fn draw_chart<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &ChartStyle) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let n = self.categories.len() as f64;
        let value_max = padded_max(self.series.iter().flat_map(|s| s.values.iter().copied()));
        let slots = -0.5..(n - 0.5);

        let labels: Vec<String> = match self.orientation {
            Orientation::Vertical => self.categories.clone(),
            Orientation::Horizontal => self
                .categories
                .iter()
                .rev()
                .map(|c| truncate_string(c, MAX_LABEL_CHARS))
                .collect(),
        };
        let category_axis = AxisSpec::categorical(&self.category_desc, &labels);
        let value_axis = AxisSpec::numeric(&self.value_desc, 8);

        let mut chart = match self.orientation {
            Orientation::Vertical => {
                let mut chart = cartesian_chart(root, style, &self.title, slots, 0.0..value_max, 70)?;
                draw_axes(&mut chart, style, &category_axis, &value_axis)?;
                chart
            }
            Orientation::Horizontal => {
                let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
                let label_area = (longest * style.label_size() * 11 / 20 + 20).clamp(60, 320);
                let mut chart = cartesian_chart(root, style, &self.title, 0.0..value_max, slots, label_area)?;
                draw_axes(&mut chart, style, &value_axis, &category_axis)?;
                chart
            }
        };

        let count = self.series.len().max(1);
        let width = GROUP_WIDTH / count as f64;

        for (j, series) in self.series.iter().enumerate() {
            let color = series.color;
            let offset = j as f64 * width;
            let bars = series.values.iter().enumerate().map(|(i, &v)| {
                Rectangle::new(self.bar(self.slot(i), offset, width * 0.95, v), color.filled())
            });

            if count > 1 {
                chart
                    .draw_series(bars)?
                    .label(series.name.as_str())
                    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
            } else {
                chart.draw_series(bars)?;
            }

            if self.show_values {
                let values = series.values.iter().enumerate().map(|(i, &v)| {
                    let centre = self.slot(i) - GROUP_WIDTH / 2.0 + offset + width / 2.0;
                    let (position, anchor) = match self.orientation {
                        Orientation::Vertical => ((centre, v), Pos::new(HPos::Center, VPos::Bottom)),
                        Orientation::Horizontal => {
                            ((v + value_max * 0.01, centre), Pos::new(HPos::Left, VPos::Center))
                        }
                    };
                    Text::new(
                        format_count(v.round().max(0.0) as usize),
                        position,
                        style.label_font().color(&BLACK).pos(anchor),
                    )
                });
                chart.draw_series(values)?;
            }
        }

        if count > 1 {
            draw_legend(&mut chart, style)?;
        }
        Ok(())
    }
}
