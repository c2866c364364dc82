//! Scatter and bubble charts, including plain longitude/latitude maps.

use crate::aggregator::bounds;
use crate::renderer::{
    cartesian_chart, dashed_segments, draw_axes, draw_color_bar, draw_legend, split_for_color_bar, AxisSpec,
    ChartRenderer, ColorBar,
};
use crate::types::ChartStyle;
use bikeshare_common::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;

/// Marker shape of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Filled circle.
    Circle,
    /// Filled triangle.
    Triangle,
    /// Cross.
    Cross,
}

/// One marker.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    /// X value.
    pub x: f64,
    /// Y value.
    pub y: f64,
    /// Radius in pixels.
    pub radius: i32,
    /// Fill colour.
    pub color: RGBColor,
    /// Text printed above the marker.
    pub label: Option<String>,
}

impl ScatterPoint {
    /// An unlabelled marker.
    pub fn new(x: f64, y: f64, radius: i32, color: RGBColor) -> Self {
        Self {
            x,
            y,
            radius,
            color,
            label: None,
        }
    }

    /// Adds a text label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Markers sharing a shape and a legend entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterGroup {
    /// Legend entry; unnamed groups stay out of the legend.
    pub name: Option<String>,
    /// Legend colour.
    pub color: RGBColor,
    /// Marker shape.
    pub marker: Marker,
    /// Markers.
    pub points: Vec<ScatterPoint>,
}

impl ScatterGroup {
    /// A group of circles outside the legend.
    pub fn unnamed(points: Vec<ScatterPoint>) -> Self {
        Self {
            name: None,
            color: BLACK,
            marker: Marker::Circle,
            points,
        }
    }
}

/// Markers on numeric axes, with an optional colour bar and balance line.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    /// Caption.
    pub title: String,
    /// X axis title.
    pub x_desc: String,
    /// Y axis title.
    pub y_desc: String,
    /// Marker groups, drawn in order.
    pub groups: Vec<ScatterGroup>,
    /// Fixed x range; fitted to the markers when `None`.
    pub x_range: Option<Range<f64>>,
    /// Fixed y range; fitted to the markers when `None`.
    pub y_range: Option<Range<f64>>,
    /// Marker opacity.
    pub opacity: f64,
    /// Dashed `y = x` reference line.
    pub balance_line: bool,
    /// Legend of the marker colours.
    pub color_bar: Option<ColorBar>,
}

impl ScatterChart {
    /// A chart with fitted axes, opaque markers and no extras.
    pub fn new(title: impl Into<String>, x_desc: impl Into<String>, y_desc: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_desc: x_desc.into(),
            y_desc: y_desc.into(),
            groups: Vec::new(),
            x_range: None,
            y_range: None,
            opacity: 0.8,
            balance_line: false,
            color_bar: None,
        }
    }

    fn points(&self) -> impl Iterator<Item = &ScatterPoint> {
        self.groups.iter().flat_map(|g| g.points.iter())
    }

    /// Axis ranges: fixed ones as given, fitted ones padded by 5% of the
    /// span on each side.
    pub fn ranges(&self) -> (Range<f64>, Range<f64>) {
        let fit = |(lo, hi): (f64, f64)| {
            let pad = ((hi - lo) * 0.05).max(1e-3);
            (lo - pad)..(hi + pad)
        };
        let x = self
            .x_range
            .clone()
            .unwrap_or_else(|| fit(bounds(self.points().map(|p| p.x))));
        let y = self
            .y_range
            .clone()
            .unwrap_or_else(|| fit(bounds(self.points().map(|p| p.y))));
        (x, y)
    }
}

impl ScatterChart {
    fn draw_plot<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>, style: &ChartStyle) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let (x_range, y_range) = self.ranges();
        let mut chart = cartesian_chart(area, style, &self.title, x_range.clone(), y_range.clone(), 80)?;
        draw_axes(
            &mut chart,
            style,
            &AxisSpec::numeric(&self.x_desc, 10),
            &AxisSpec::numeric(&self.y_desc, 8),
        )?;

        if self.balance_line {
            let from = x_range.start.max(y_range.start);
            let to = x_range.end.min(y_range.end);
            if from < to {
                let grey = RGBColor(127, 127, 127);
                chart.draw_series(
                    dashed_segments((from, from), (to, to), 30)
                        .into_iter()
                        .map(|segment| PathElement::new(segment.to_vec(), grey.stroke_width(2))),
                )?;
            }
        }

        let mut legend = false;
        for group in &self.groups {
            let opacity = self.opacity;
            let fill = |p: &ScatterPoint| p.color.mix(opacity).filled();
            let anno = match group.marker {
                Marker::Circle => chart.draw_series(
                    group
                        .points
                        .iter()
                        .map(|p| Circle::new((p.x, p.y), p.radius, fill(p))),
                )?,
                Marker::Triangle => chart.draw_series(
                    group
                        .points
                        .iter()
                        .map(|p| TriangleMarker::new((p.x, p.y), p.radius, fill(p))),
                )?,
                Marker::Cross => chart.draw_series(
                    group
                        .points
                        .iter()
                        .map(|p| Cross::new((p.x, p.y), p.radius, p.color.stroke_width(2))),
                )?,
            };

            if let Some(name) = &group.name {
                legend = true;
                let color = group.color;
                let anno = anno.label(name.as_str());
                match group.marker {
                    Marker::Circle => {
                        anno.legend(move |(x, y)| Circle::new((x + 6, y), 5, color.filled()));
                    }
                    Marker::Triangle => {
                        anno.legend(move |(x, y)| TriangleMarker::new((x + 6, y), 5, color.filled()));
                    }
                    Marker::Cross => {
                        anno.legend(move |(x, y)| Cross::new((x + 6, y), 5, color.stroke_width(2)));
                    }
                }
            }
        }

        let labelled: Vec<&ScatterPoint> = self.points().filter(|p| p.label.is_some()).collect();
        if !labelled.is_empty() {
            let text_style = style
                .label_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Bottom));
            chart.draw_series(labelled.iter().map(|p| {
                EmptyElement::at((p.x, p.y))
                    + Text::new(
                        p.label.clone().unwrap_or_default(),
                        (0, -(p.radius + 4)),
                        text_style.clone(),
                    )
            }))?;
        }

        if legend {
            draw_legend(&mut chart, style)?;
        }
        Ok(())
    }
}

impl ChartRenderer for ScatterChart {
    fn title(&self) -> &str {
        &self.title
    }

    fn has_data(&self) -> bool {
        self.points().next().is_some()
    }

    fn draw_chart<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &ChartStyle) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        match &self.color_bar {
            Some(bar) => {
                let (plot_area, bar_area) = split_for_color_bar(root);
                self.draw_plot(&plot_area, style)?;
                draw_color_bar(&bar_area, style, bar)
            }
            None => self.draw_plot(root, style),
        }
    }
}
