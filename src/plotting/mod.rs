mod chart;
mod color;
mod styles;


pub use chart::{
    contributor_file_name, format_date_label, render_engagement, ChartDataset, ChartRenderer,
    DatasetCollector, PngChartRenderer, HISTOGRAM_LABEL,
};
pub use color::{name_hash, ContributorColor};
pub use styles::{ChartStyle, ChartTheme, HISTOGRAM_COLOR};
