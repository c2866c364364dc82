//! Chart styling and colour helpers.

use bikeshare_common::UserType;
use bikeshare_config::GraphsConfig;
use plotters::style::{FontDesc, FontFamily, FontStyle, RGBColor};

/// Categorical palette used for series that have no dedicated colour.
pub const PALETTE: [RGBColor; 8] = [
    RGBColor(31, 119, 180),  // Blue
    RGBColor(255, 127, 14),  // Orange
    RGBColor(44, 160, 44),   // Green
    RGBColor(214, 39, 40),   // Red
    RGBColor(148, 103, 189), // Purple
    RGBColor(140, 86, 75),   // Brown
    RGBColor(227, 119, 194), // Pink
    RGBColor(127, 127, 127), // Gray
];

/// Palette colour for the `index`-th series, wrapping around.
pub fn palette_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// Parse a `#rrggbb` colour, falling back to black.
pub fn parse_color(color_str: &str) -> RGBColor {
    if let Some(hex) = color_str.strip_prefix('#') {
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return RGBColor(r, g, b);
            }
        }
    }
    RGBColor(0, 0, 0)
}

/// Visual settings shared by every chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Canvas fill.
    pub background: RGBColor,
    /// Colour of member series.
    pub member_color: RGBColor,
    /// Colour of casual series.
    pub casual_color: RGBColor,
    /// Font family for captions and labels.
    pub font_family: String,
    /// Caption size in points.
    pub font_size: u32,
    /// Whether to draw the background grid.
    pub show_grid: bool,
}

impl ChartStyle {
    /// Series colour of a user type.
    pub fn user_color(&self, user: UserType) -> RGBColor {
        match user {
            UserType::Member => self.member_color,
            UserType::Casual => self.casual_color,
        }
    }

    /// Size used for axis labels and annotations.
    pub fn label_size(&self) -> u32 {
        (self.font_size * 3 / 5).max(10)
    }

    /// Configured font family at `size` points.
    pub fn font(&self, size: u32) -> FontDesc<'_> {
        FontDesc::new(
            FontFamily::Name(&self.font_family),
            f64::from(size),
            FontStyle::Normal,
        )
    }

    /// Caption font.
    pub fn caption_font(&self) -> FontDesc<'_> {
        self.font(self.font_size)
    }

    /// Axis label and annotation font.
    pub fn label_font(&self) -> FontDesc<'_> {
        self.font(self.label_size())
    }
}

impl From<&GraphsConfig> for ChartStyle {
    fn from(config: &GraphsConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            background: parse_color(&config.background_color),
            member_color: parse_color(&config.member_color),
            casual_color: parse_color(&config.casual_color),
            font_family: config.font_family.clone(),
            font_size: config.font_size,
            show_grid: config.show_grid,
        }
    }
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::from(&GraphsConfig::default())
    }
}

/// Continuous colour scales for heatmaps and colour-coded markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScale {
    /// White to dark blue.
    Blues,
    /// Purple through green to yellow.
    Viridis,
    /// Dark blue through magenta to yellow.
    Plasma,
    /// Red through white to blue, for signed values.
    RdBu,
}

impl ColorScale {
    fn stops(self) -> &'static [RGBColor] {
        match self {
            ColorScale::Blues => &[
                RGBColor(247, 251, 255),
                RGBColor(198, 219, 239),
                RGBColor(107, 174, 214),
                RGBColor(33, 113, 181),
                RGBColor(8, 48, 107),
            ],
            ColorScale::Viridis => &[
                RGBColor(68, 1, 84),
                RGBColor(59, 82, 139),
                RGBColor(33, 145, 140),
                RGBColor(94, 201, 98),
                RGBColor(253, 231, 37),
            ],
            ColorScale::Plasma => &[
                RGBColor(13, 8, 135),
                RGBColor(126, 3, 168),
                RGBColor(204, 71, 120),
                RGBColor(248, 149, 64),
                RGBColor(240, 249, 33),
            ],
            ColorScale::RdBu => &[
                RGBColor(178, 24, 43),
                RGBColor(239, 138, 98),
                RGBColor(247, 247, 247),
                RGBColor(103, 169, 207),
                RGBColor(33, 102, 172),
            ],
        }
    }

    /// Colour at position `t`, clamped to `0.0..=1.0`.
    pub fn at(self, t: f64) -> RGBColor {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (stops.len() - 1) as f64;
        let lower = (scaled.floor() as usize).min(stops.len() - 2);
        let weight = scaled - lower as f64;
        let (a, b) = (stops[lower], stops[lower + 1]);
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * weight).round() as u8;
        RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }

    /// Colour of `value` within `min..=max`.
    pub fn map(self, value: f64, min: f64, max: f64) -> RGBColor {
        if max > min {
            self.at((value - min) / (max - min))
        } else {
            self.at(0.5)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#1f77b4"), RGBColor(31, 119, 180));
        assert_eq!(parse_color("#FFFFFF"), RGBColor(255, 255, 255));
        assert_eq!(parse_color("1f77b4"), RGBColor(0, 0, 0));
        assert_eq!(parse_color("#zzzzzz"), RGBColor(0, 0, 0));
    }

    #[test]
    fn test_style_from_config() {
        let style = ChartStyle::default();
        assert_eq!(style.width, 1000);
        assert_eq!(style.height, 600);
        assert_eq!(style.background, RGBColor(255, 255, 255));
        assert_eq!(style.user_color(UserType::Member), RGBColor(31, 119, 180));
        assert_eq!(style.user_color(UserType::Casual), RGBColor(255, 127, 14));
        assert_eq!(style.label_size(), 12);
    }

    #[test]
    fn test_color_scale_endpoints() {
        assert_eq!(ColorScale::Viridis.at(0.0), RGBColor(68, 1, 84));
        assert_eq!(ColorScale::Viridis.at(1.0), RGBColor(253, 231, 37));
        assert_eq!(ColorScale::Blues.at(-3.0), ColorScale::Blues.at(0.0));
        assert_eq!(ColorScale::RdBu.map(0.0, -1.0, 1.0), RGBColor(247, 247, 247));
        assert_eq!(ColorScale::Plasma.map(5.0, 5.0, 5.0), ColorScale::Plasma.at(0.5));
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(palette_color(0), palette_color(PALETTE.len()));
    }
}
