//! Chart rendering trait and shared drawing helpers

use crate::types::{ChartStyle, ColorScale};
use bikeshare_common::{format_count, BikeshareError, Result};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info};

/// A chart context with floating point axes, which every chart uses.
pub type Chart2d<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Width of the strip reserved for a colour bar.
pub const COLOR_BAR_WIDTH: u32 = 120;

/// Something that can draw itself onto a plotters drawing area.
///
/// Implementors provide [`ChartRenderer::draw_chart`]; background fill, the
/// empty-input placeholder and the PNG targets are shared.
pub trait ChartRenderer {
    /// Chart caption.
    fn title(&self) -> &str;

    /// Whether there is anything to plot.
    fn has_data(&self) -> bool;

    /// Draws the chart proper. Only called when [`ChartRenderer::has_data`]
    /// holds; the area is already filled with the background.
    fn draw_chart<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &ChartStyle) -> Result<()>
    where
        DB::ErrorType: 'static;

    /// Fills the background and draws the chart, or a "No data" placeholder
    /// when there is nothing to plot.
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &ChartStyle) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        root.fill(&style.background)?;
        if self.has_data() {
            self.draw_chart(root, style)
        } else {
            debug!(title = self.title(), "Rendering empty chart");
            draw_no_data(root, style, self.title())
        }
    }

    /// Render the chart to a PNG file, creating parent directories.
    fn render_to_file(&self, style: &ChartStyle, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
        self.draw(&root, style)?;
        root.present()?;

        info!(title = self.title(), path = %path.display(), "Rendered chart");
        Ok(())
    }

    /// Render the chart to PNG bytes.
    fn render_to_bytes(&self, style: &ChartStyle) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; style.width as usize * style.height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height)).into_drawing_area();
            self.draw(&root, style)?;
            root.present()?;
        }

        let png = encode_png(buffer, style.width, style.height)?;
        debug!(title = self.title(), bytes = png.len(), "Rendered chart to memory");
        Ok(png)
    }
}

/// Encodes an RGB bitmap as PNG.
pub fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>> {
    let image = image::RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| BikeshareError::graph("Bitmap buffer does not match the image size"))?;
    let mut bytes = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageOutputFormat::Png)
        .map_err(|e| BikeshareError::graph_with_source("Failed to encode PNG", e))?;
    Ok(bytes.into_inner())
}

/// Caption plus a centred "No data" notice.
pub fn draw_no_data<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, style: &ChartStyle, title: &str) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let area = root.titled(title, style.caption_font())?;
    let (width, height) = area.dim_in_pixel();
    let notice = style
        .font(style.font_size)
        .color(&RGBColor(127, 127, 127))
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(
        "No data",
        ((width / 2) as i32, (height / 2) as i32),
        notice,
    ))?;
    Ok(())
}

/// Widens a degenerate or inverted range so plotters can map it.
pub fn usable_range(range: Range<f64>) -> Range<f64> {
    if range.start.is_finite() && range.end.is_finite() && range.start < range.end {
        range
    } else if range.start.is_finite() {
        (range.start - 1.0)..(range.start + 1.0)
    } else {
        0.0..1.0
    }
}

/// Upper axis bound leaving headroom above the largest value.
pub fn padded_max(values: impl IntoIterator<Item = f64>) -> f64 {
    let max = values.into_iter().fold(0.0, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// Builds a captioned cartesian chart on `root`.
pub fn cartesian_chart<'a, DB: DrawingBackend>(
    root: &'a DrawingArea<DB, Shift>,
    style: &ChartStyle,
    title: &str,
    x: Range<f64>,
    y: Range<f64>,
    y_label_area: u32,
) -> Result<Chart2d<'a, DB>>
where
    DB::ErrorType: 'static,
{
    let chart = ChartBuilder::on(root)
        .caption(title, style.caption_font())
        .margin(15)
        .x_label_area_size(55)
        .y_label_area_size(y_label_area)
        .build_cartesian_2d(usable_range(x), usable_range(y))?;
    Ok(chart)
}

/// Description and tick labelling of one axis.
#[derive(Debug, Clone, Copy)]
pub struct AxisSpec<'l> {
    /// Axis title.
    pub desc: &'l str,
    /// Category names; the tick at `i` shows `labels[i]`.
    pub labels: Option<&'l [String]>,
    /// Maximum number of ticks.
    pub ticks: usize,
}

impl<'l> AxisSpec<'l> {
    /// Numeric axis.
    pub fn numeric(desc: &'l str, ticks: usize) -> Self {
        Self {
            desc,
            labels: None,
            ticks,
        }
    }

    /// Categorical axis with one slot per label.
    pub fn categorical(desc: &'l str, labels: &'l [String]) -> Self {
        Self {
            desc,
            labels: Some(labels),
            ticks: labels.len().min(24),
        }
    }

    /// Text of the tick at `value`.
    pub fn format(&self, value: f64) -> String {
        match self.labels {
            Some(labels) => category_label(labels, value),
            None => format_tick(value),
        }
    }
}

/// Label of the category slot at `value`; empty between slots.
pub fn category_label(labels: &[String], value: f64) -> String {
    let index = value.round();
    if (value - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

/// Compact numeric tick text: whole numbers with thousands separators,
/// fractions with at most three decimals.
pub fn format_tick(value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() < 1e-9 {
        if rounded >= 0.0 {
            format_count(rounded as usize)
        } else {
            format!("{rounded:.0}")
        }
    } else {
        let text = format!("{value:.3}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Draws grid, ticks and axis titles.
pub fn draw_axes<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    style: &ChartStyle,
    x: &AxisSpec<'_>,
    y: &AxisSpec<'_>,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let x_formatter = |v: &f64| x.format(*v);
    let y_formatter = |v: &f64| y.format(*v);

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(x.desc)
        .y_desc(y.desc)
        .x_labels(x.ticks)
        .y_labels(y.ticks)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .label_style(style.label_font())
        .axis_desc_style(style.label_font());
    if !style.show_grid {
        mesh.disable_mesh();
    }
    mesh.draw()?;
    Ok(())
}

/// Draws the legend of every labelled series.
pub fn draw_legend<'a, DB: DrawingBackend + 'a>(chart: &mut Chart2d<'a, DB>, style: &ChartStyle) -> Result<()>
where
    DB::ErrorType: 'static,
{
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(style.label_font())
        .draw()?;
    Ok(())
}

/// Segments of a dashed line from `from` to `to`.
pub fn dashed_segments(from: (f64, f64), to: (f64, f64), dashes: usize) -> Vec<[(f64, f64); 2]> {
    let steps = dashes.max(1) * 2;
    let at = |i: usize| {
        let t = i as f64 / steps as f64;
        (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
    };
    (0..steps).step_by(2).map(|i| [at(i), at(i + 1)]).collect()
}

/// Scale shown next to a chart whose colour encodes a value.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBar {
    /// What the colour means.
    pub label: String,
    /// Colour scale.
    pub scale: ColorScale,
    /// Value at the bottom.
    pub min: f64,
    /// Value at the top.
    pub max: f64,
}

/// Splits off the right-hand strip for a colour bar.
pub fn split_for_color_bar<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
) -> (DrawingArea<DB, Shift>, DrawingArea<DB, Shift>) {
    let (width, _) = root.dim_in_pixel();
    root.split_horizontally(width.saturating_sub(COLOR_BAR_WIDTH) as i32)
}

/// Draws a vertical colour bar with its end values.
pub fn draw_color_bar<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, style: &ChartStyle, bar: &ColorBar) -> Result<()>
where
    DB::ErrorType: 'static,
{
    const STEPS: i32 = 64;
    let (_, height) = area.dim_in_pixel();
    let top = 70;
    let bottom = (height as i32 - 70).max(top + STEPS);
    let span = (bottom - top) as f64;

    for i in 0..STEPS {
        let y0 = bottom - (span * f64::from(i + 1) / f64::from(STEPS)) as i32;
        let y1 = bottom - (span * f64::from(i) / f64::from(STEPS)) as i32;
        let color = bar.scale.at((f64::from(i) + 0.5) / f64::from(STEPS));
        area.draw(&Rectangle::new([(15, y0), (35, y1)], color.filled()))?;
    }

    let text = |s: String, y: i32| Text::new(s, (42, y), style.label_font().color(&BLACK));
    area.draw(&text(format_tick(bar.max), top))?;
    area.draw(&text(format_tick(bar.min), bottom - style.label_size() as i32))?;
    area.draw(&Text::new(
        bar.label.clone(),
        (10, top - 2 * style.label_size() as i32),
        style.label_font().color(&BLACK),
    ))?;
    Ok(())
}

/// Black or white, whichever reads better on `background`.
pub fn contrasting_text(background: RGBColor) -> RGBColor {
    let luminance = 0.299 * f64::from(background.0) + 0.587 * f64::from(background.1) + 0.114 * f64::from(background.2);
    if luminance < 140.0 {
        WHITE
    } else {
        BLACK
    }
}

/// Marker radius whose area is proportional to `value`.
pub fn bubble_radius(value: f64, max: f64, max_radius: f64) -> i32 {
    if max <= 0.0 || value <= 0.0 {
        return 2;
    }
    ((value / max).sqrt() * max_radius).round().max(2.0) as i32
}
