//! Box plots of one distribution per group.

use crate::aggregator::BoxSummary;
use crate::renderer::{cartesian_chart, draw_axes, padded_max, AxisSpec, ChartRenderer};
use crate::types::ChartStyle;
use bikeshare_common::{format_count, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

const BOX_HALF_WIDTH: f64 = 0.3;
const CAP_HALF_WIDTH: f64 = 0.15;

/// One box.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxGroup {
    /// Category name.
    pub name: String,
    /// Box colour.
    pub color: RGBColor,
    /// Quartiles and whiskers.
    pub summary: BoxSummary,
}

/// Side-by-side box plots with whiskers at 1.5 IQR.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxPlotChart {
    /// Caption.
    pub title: String,
    /// X axis title.
    pub x_desc: String,
    /// Y axis title.
    pub y_desc: String,
    /// Boxes from left to right.
    pub groups: Vec<BoxGroup>,
}

impl ChartRenderer for BoxPlotChart {
    fn title(&self) -> &str {
        &self.title
    }

    fn has_data(&self) -> bool {
        self.groups.iter().any(|g| g.summary.count > 0)
    }

    fn draw_chart<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &ChartStyle) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let n = self.groups.len() as f64;
        let y_max = padded_max(self.groups.iter().map(|g| g.summary.upper_whisker));
        let labels: Vec<String> = self.groups.iter().map(|g| g.name.clone()).collect();

        let mut chart = cartesian_chart(root, style, &self.title, -0.5..(n - 0.5), 0.0..y_max, 70)?;
        draw_axes(
            &mut chart,
            style,
            &AxisSpec::categorical(&self.x_desc, &labels),
            &AxisSpec::numeric(&self.y_desc, 8),
        )?;

        for (i, group) in self.groups.iter().enumerate() {
            let x = i as f64;
            let s = &group.summary;
            let (left, right) = (x - BOX_HALF_WIDTH, x + BOX_HALF_WIDTH);

            chart.draw_series([
                Rectangle::new([(left, s.q1), (right, s.q3)], group.color.mix(0.35).filled()),
                Rectangle::new([(left, s.q1), (right, s.q3)], group.color.stroke_width(2)),
            ])?;

            chart.draw_series([
                PathElement::new(vec![(left, s.median), (right, s.median)], group.color.stroke_width(3)),
                PathElement::new(vec![(x, s.q3), (x, s.upper_whisker)], group.color.stroke_width(1)),
                PathElement::new(vec![(x, s.q1), (x, s.lower_whisker)], group.color.stroke_width(1)),
                PathElement::new(
                    vec![(x - CAP_HALF_WIDTH, s.upper_whisker), (x + CAP_HALF_WIDTH, s.upper_whisker)],
                    group.color.stroke_width(1),
                ),
                PathElement::new(
                    vec![(x - CAP_HALF_WIDTH, s.lower_whisker), (x + CAP_HALF_WIDTH, s.lower_whisker)],
                    group.color.stroke_width(1),
                ),
            ])?;

            chart.draw_series(std::iter::once(Text::new(
                format!("n = {}, median {:.1}", format_count(s.count), s.median),
                (x, s.upper_whisker),
                style
                    .label_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Bottom)),
            )))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_data() {
        let summary = BoxSummary::from_values([4.0, 6.0, 9.0]).expect("summary");
        let chart = BoxPlotChart {
            title: "Ride Duration Distribution by User Type".to_string(),
            x_desc: "User Type".to_string(),
            y_desc: "Ride Duration (minutes)".to_string(),
            groups: vec![BoxGroup {
                name: "member".to_string(),
                color: RGBColor(31, 119, 180),
                summary,
            }],
        };
        assert!(chart.has_data());

        let empty = BoxPlotChart {
            groups: Vec::new(),
            ..chart
        };
        assert!(!empty.has_data());
    }
}
