//! Pie chart drawn from polygon sectors.

use crate::renderer::ChartRenderer;
use crate::types::ChartStyle;
use bikeshare_common::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::{FRAC_PI_2, TAU};

/// One sector.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    /// Category name.
    pub label: String,
    /// Sector size.
    pub value: f64,
    /// Fill colour.
    pub color: RGBColor,
}

/// Sectors clockwise from twelve o'clock, labelled with name and share.
#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    /// Caption.
    pub title: String,
    /// Sectors in drawing order.
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value.max(0.0)).sum()
    }

    /// Start and end angle of every slice in radians, measured clockwise in
    /// screen coordinates with zero pointing right.
    pub fn angles(&self) -> Vec<(f64, f64)> {
        let total = self.total();
        let mut start = -FRAC_PI_2;
        self.slices
            .iter()
            .map(|slice| {
                let sweep = if total > 0.0 {
                    slice.value.max(0.0) / total * TAU
                } else {
                    0.0
                };
                let span = (start, start + sweep);
                start += sweep;
                span
            })
            .collect()
    }
}

fn on_circle(centre: (i32, i32), radius: f64, angle: f64) -> (i32, i32) {
    (
        centre.0 + (radius * angle.cos()).round() as i32,
        centre.1 + (radius * angle.sin()).round() as i32,
    )
}

impl ChartRenderer for PieChart {
    fn title(&self) -> &str {
        &self.title
    }

    fn has_data(&self) -> bool {
        self.total() > 0.0
    }

    fn draw_chart<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &ChartStyle) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let area = root.titled(&self.title, style.caption_font())?;
        let (width, height) = area.dim_in_pixel();
        let centre = ((width / 2) as i32, (height / 2) as i32);
        let radius = f64::from(width.min(height)) * 0.38;
        let total = self.total();

        for (slice, (start, end)) in self.slices.iter().zip(self.angles()) {
            if end <= start {
                continue;
            }
            let steps = ((end - start).to_degrees().ceil() as usize).max(2);
            let mut points = vec![centre];
            points.extend((0..=steps).map(|i| {
                let angle = start + (end - start) * i as f64 / steps as f64;
                on_circle(centre, radius, angle)
            }));
            area.draw(&Polygon::new(points, slice.color.filled()))?;

            let middle = (start + end) / 2.0;
            let share = slice.value / total * 100.0;
            area.draw(&Text::new(
                format!("{} {share:.1}%", slice.label),
                on_circle(centre, radius * 1.15, middle),
                style
                    .label_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Center)),
            ))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pie(values: &[f64]) -> PieChart {
        PieChart {
            title: "User Type Distribution".to_string(),
            slices: values
                .iter()
                .map(|&value| PieSlice {
                    label: "x".to_string(),
                    value,
                    color: RGBColor(31, 119, 180),
                })
                .collect(),
        }
    }

    #[test]
    fn test_angles_cover_full_turn() {
        let angles = pie(&[3.0, 1.0]).angles();
        assert_eq!(angles.len(), 2);
        assert!((angles[0].0 + FRAC_PI_2).abs() < 1e-12);
        assert!((angles[0].1 - angles[0].0 - 0.75 * TAU).abs() < 1e-12);
        assert!((angles[1].1 - angles[0].0 - TAU).abs() < 1e-12);
    }

    #[test]
    fn test_empty_pie() {
        let chart = pie(&[0.0, 0.0]);
        assert!(!chart.has_data());
        assert!(chart.angles().iter().all(|(a, b)| a == b));
    }

    #[test]
    fn test_on_circle() {
        assert_eq!(on_circle((100, 100), 50.0, 0.0), (150, 100));
        assert_eq!(on_circle((100, 100), 50.0, -FRAC_PI_2), (100, 50));
    }
}
