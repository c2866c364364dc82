//! Annotated heatmap with a colour bar.

use crate::aggregator::Grid;
use crate::renderer::{
    cartesian_chart, contrasting_text, draw_axes, draw_color_bar, split_for_color_bar, AxisSpec, ChartRenderer,
    ColorBar,
};
use crate::types::{ChartStyle, ColorScale};
use bikeshare_common::{format_count, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

/// Cells above this count are left unannotated to keep text legible.
const MAX_ANNOTATED_CELLS: usize = 400;

/// A grid of coloured cells, first row on top.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapChart {
    /// Caption.
    pub title: String,
    /// X axis title.
    pub x_desc: String,
    /// Y axis title.
    pub y_desc: String,
    /// Values and their row and column labels.
    pub grid: Grid,
    /// Colour scale of the cells.
    pub scale: ColorScale,
    /// Colour bar title.
    pub value_desc: String,
    /// Print each count inside its cell.
    pub annotate: bool,
}

impl HeatmapChart {
    fn value_range(&self) -> (f64, f64) {
        let min = self
            .grid
            .values
            .iter()
            .flatten()
            .copied()
            .fold(f64::INFINITY, f64::min);
        (if min.is_finite() { min } else { 0.0 }, self.grid.max())
    }
}

impl ChartRenderer for HeatmapChart {
    fn title(&self) -> &str {
        &self.title
    }

    fn has_data(&self) -> bool {
        self.grid.total() > 0.0
    }

    fn draw_chart<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &ChartStyle) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let rows = self.grid.row_labels.len();
        let cols = self.grid.col_labels.len();
        let (min, max) = self.value_range();
        let (plot_area, bar_area) = split_for_color_bar(root);

        let row_labels: Vec<String> = self.grid.row_labels.iter().rev().cloned().collect();
        let longest = row_labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
        let label_area = (longest * style.label_size() * 11 / 20 + 30).clamp(50, 200);
        let mut chart = cartesian_chart(
            &plot_area,
            style,
            &self.title,
            -0.5..(cols as f64 - 0.5),
            -0.5..(rows as f64 - 0.5),
            label_area,
        )?;
        draw_axes(
            &mut chart,
            style,
            &AxisSpec::categorical(&self.x_desc, &self.grid.col_labels),
            &AxisSpec::categorical(&self.y_desc, &row_labels),
        )?;

        let cells: Vec<(f64, f64, f64)> = self
            .grid
            .values
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                let y = (rows - 1 - r) as f64;
                row.iter().enumerate().map(move |(c, &v)| (c as f64, y, v))
            })
            .collect();

        chart.draw_series(cells.iter().map(|&(x, y, v)| {
            Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                self.scale.map(v, min, max).filled(),
            )
        }))?;

        if self.annotate && cells.len() <= MAX_ANNOTATED_CELLS {
            let size = style.label_size().saturating_sub(2).max(8);
            chart.draw_series(cells.iter().map(|&(x, y, v)| {
                let color = contrasting_text(self.scale.map(v, min, max));
                Text::new(
                    format_count(v.round().max(0.0) as usize),
                    (x, y),
                    style.font(size).color(&color).pos(Pos::new(HPos::Center, VPos::Center)),
                )
            }))?;
        }

        draw_color_bar(
            &bar_area,
            style,
            &ColorBar {
                label: self.value_desc.clone(),
                scale: self.scale,
                min,
                max,
            },
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heatmap(values: Vec<Vec<f64>>) -> HeatmapChart {
        HeatmapChart {
            title: "Ride Frequency: User Type vs Hour of Day".to_string(),
            x_desc: "Hour of Day".to_string(),
            y_desc: "User Type".to_string(),
            grid: Grid {
                row_labels: vec!["member".to_string(), "casual".to_string()],
                col_labels: vec!["0".to_string(), "1".to_string()],
                values,
            },
            scale: ColorScale::Plasma,
            value_desc: "Number of Rides".to_string(),
            annotate: true,
        }
    }

    #[test]
    fn test_value_range() {
        let chart = heatmap(vec![vec![2.0, 9.0], vec![4.0, 1.0]]);
        assert_eq!(chart.value_range(), (1.0, 9.0));
        assert!(chart.has_data());
        assert!(!heatmap(vec![vec![0.0, 0.0], vec![0.0, 0.0]]).has_data());
    }

    #[test]
    fn test_render_to_bytes() {
        let chart = heatmap(vec![vec![2.0, 9.0], vec![4.0, 1.0]]);
        let png = chart.render_to_bytes(&ChartStyle::default()).expect("render");
        assert!(!png.is_empty());
    }
}
