//! Chart renderers, one per chart shape.

pub mod bar;
pub mod boxplot;
pub mod heatmap;
pub mod histogram;
pub mod line;
pub mod pie;
pub mod scatter;

pub use bar::{BarChart, Orientation};
pub use boxplot::{BoxGroup, BoxPlotChart};
pub use heatmap::HeatmapChart;
pub use histogram::{HistogramChart, HistogramSeries};
pub use line::{LineChart, Series};
pub use pie::{PieChart, PieSlice};
pub use scatter::{Marker, ScatterChart, ScatterGroup, ScatterPoint};
