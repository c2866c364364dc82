//! Overlaid histograms sharing one binning.

use crate::aggregator::Histogram;
use crate::renderer::{cartesian_chart, draw_axes, draw_legend, padded_max, AxisSpec, ChartRenderer};
use crate::types::ChartStyle;
use bikeshare_common::Result;
use plotters::coord::Shift;
use plotters::prelude::*;

/// One histogram layer.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSeries {
    /// Legend entry.
    pub name: String,
    /// Bar colour, drawn translucent.
    pub color: RGBColor,
    /// Binned counts.
    pub histogram: Histogram,
}

/// Translucent histograms drawn on top of each other.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramChart {
    /// Caption.
    pub title: String,
    /// X axis title.
    pub x_desc: String,
    /// Y axis title.
    pub y_desc: String,
    /// Layers, drawn in order.
    pub series: Vec<HistogramSeries>,
}

impl ChartRenderer for HistogramChart {
    fn title(&self) -> &str {
        &self.title
    }

    fn has_data(&self) -> bool {
        self.series.iter().any(|s| s.histogram.total() > 0)
    }

    fn draw_chart<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &ChartStyle) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let lo = self.series.iter().map(|s| s.histogram.lo).fold(f64::INFINITY, f64::min);
        let hi = self.series.iter().map(|s| s.histogram.hi).fold(f64::NEG_INFINITY, f64::max);
        let y_max = padded_max(
            self.series
                .iter()
                .flat_map(|s| s.histogram.counts.iter().map(|&c| c as f64)),
        );

        let mut chart = cartesian_chart(root, style, &self.title, lo..hi, 0.0..y_max, 70)?;
        draw_axes(
            &mut chart,
            style,
            &AxisSpec::numeric(&self.x_desc, 12),
            &AxisSpec::numeric(&self.y_desc, 8),
        )?;

        for series in &self.series {
            let color = series.color;
            let width = series.histogram.bin_width();
            let left = series.histogram.lo;
            let bars = series.histogram.counts.iter().enumerate().map(|(b, &count)| {
                let x0 = left + b as f64 * width;
                Rectangle::new([(x0, 0.0), (x0 + width, count as f64)], color.mix(0.6).filled())
            });
            chart
                .draw_series(bars)?
                .label(series.name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.mix(0.6).filled()));
        }

        draw_legend(&mut chart, style)?;
        Ok(())
    }
}
