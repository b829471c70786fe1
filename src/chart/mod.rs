//! Trend charts.
//!
//! - declarative chart table (`spec`)
//! - moving-average overlays (`trend`)
//! - backend-free chart data (`plan`)
//! - PNG drawing + the isolated render loop (`render`)

pub mod plan;
pub mod render;
pub mod spec;
pub mod trend;

pub use plan::{ChartPlan, TrendLine};
pub use render::{ChartWriter, PngChartWriter, RenderReport, render_charts};
pub use spec::{CHARTS, ChartSpec, Geometry, TREND_WINDOWS};
pub use trend::moving_average;

/// Physical output size of a chart image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartCanvas {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
}

impl Default for ChartCanvas {
    fn default() -> Self {
        Self {
            width_in: 20.0,
            height_in: 6.0,
            dpi: 1000,
        }
    }
}

impl ChartCanvas {
    pub fn pixel_size(&self) -> (u32, u32) {
        let px = |inches: f64| (inches * f64::from(self.dpi)).round().max(1.0) as u32;
        (px(self.width_in), px(self.height_in))
    }

    /// Convert a typographic size (1/72 in) to pixels at this resolution.
    pub fn points_to_pixels(&self, points: f64) -> f64 {
        (points * f64::from(self.dpi) / 72.0).max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_canvas_is_twenty_by_six_inches_at_1000_dpi() {
        assert_eq!(ChartCanvas::default().pixel_size(), (20_000, 6_000));
    }

    #[test]
    fn point_sizes_scale_with_dpi() {
        let canvas = ChartCanvas { width_in: 1.0, height_in: 1.0, dpi: 144 };
        assert_eq!(canvas.points_to_pixels(12.0), 24.0);
    }
}
