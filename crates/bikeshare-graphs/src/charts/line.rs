//! Line chart over a categorical x axis.

use crate::renderer::{cartesian_chart, draw_axes, draw_legend, padded_max, AxisSpec, ChartRenderer};
use crate::types::ChartStyle;
use bikeshare_common::Result;
use plotters::coord::Shift;
use plotters::prelude::*;

/// One named series of values, aligned with the chart categories.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend entry.
    pub name: String,
    /// Line or bar colour.
    pub color: RGBColor,
    /// One value per category.
    pub values: Vec<f64>,
}

impl Series {
    /// Create a new series.
    pub fn new(name: impl Into<String>, color: RGBColor, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            color,
            values,
        }
    }
}

/// Lines with point markers, one per series.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    /// Caption.
    pub title: String,
    /// X axis title.
    pub x_desc: String,
    /// Y axis title.
    pub y_desc: String,
    /// Category of each x position.
    pub x_labels: Vec<String>,
    /// Plotted series.
    pub series: Vec<Series>,
}

impl ChartRenderer for LineChart {
    fn title(&self) -> &str {
        &self.title
    }

    fn has_data(&self) -> bool {
        !self.x_labels.is_empty() && self.series.iter().any(|s| !s.values.is_empty())
    }

    fn draw_chart<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &ChartStyle) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let n = self.x_labels.len() as f64;
        let y_max = padded_max(self.series.iter().flat_map(|s| s.values.iter().copied()));
        let mut chart = cartesian_chart(root, style, &self.title, -0.5..(n - 0.5), 0.0..y_max, 70)?;

        let mut x_axis = AxisSpec::categorical(&self.x_desc, &self.x_labels);
        x_axis.ticks = x_axis.ticks.min(16);
        draw_axes(&mut chart, style, &x_axis, &AxisSpec::numeric(&self.y_desc, 8))?;

        for series in &self.series {
            let color = series.color;
            let points: Vec<(f64, f64)> = series
                .values
                .iter()
                .enumerate()
                .map(|(i, v)| (i as f64, *v))
                .collect();

            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
                .label(series.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
            chart.draw_series(points.into_iter().map(|p| Circle::new(p, 3, color.filled())))?;
        }

        draw_legend(&mut chart, style)?;
        Ok(())
    }
}
