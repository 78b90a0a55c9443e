use plotters::style::RGBAColor;
use serde::{Deserialize, Serialize};

use super::ContributorColor;

/// Color of the global contribution histogram line.
pub const HISTOGRAM_COLOR: ContributorColor = ContributorColor::new(0x82, 0xAF, 0xB8);

/// Chart theme configuration
pub struct ChartTheme {
    pub background_color: RGBAColor,
    pub text_color: RGBAColor,
    pub grid_color: RGBAColor,
    pub axis_color: RGBAColor,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            background_color: RGBAColor(255, 255, 255, 1.0),
            text_color: RGBAColor(51, 51, 51, 0.9),
            grid_color: RGBAColor(0, 0, 0, 0.1),
            axis_color: RGBAColor(0, 0, 0, 0.6),
        }
    }
}

/// Chart style configuration, loadable from the dashboard config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub line_width: u32,
    pub font_size: u32,
    pub margin: u32,
    pub label_area_size: u32,
    /// Series longer than this are downsampled before drawing
    pub max_points: usize,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 640,
            height: 320,
            line_width: 2,
            font_size: 15,
            margin: 10,
            label_area_size: 50,
            max_points: 500,
        }
    }
}
