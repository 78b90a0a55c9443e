use std::error::Error;
use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::debug;

use super::styles::{ChartStyle, ChartTheme, HISTOGRAM_COLOR};
use super::ContributorColor;
use crate::error::{InsightError, Result};
use crate::types::{date_of, EngagementSummary, GlobalHistogram, TimelineSeries};
use crate::utils::downsample_points;

type PlotError = Box<dyn Error + Send + Sync>;

const DAY_SECS: f64 = 86_400.0;

/// Label of the global contribution chart.
pub const HISTOGRAM_LABEL: &str = "Contributors";

/// Axis label format, day/month/two-digit year.
const AXIS_DATE_FORMAT: &str = "%d/%m/%y";

/// Receives the two engagement series types and draws them somewhere.
pub trait ChartRenderer {
    /// Draw one contributor's activity line.
    fn render_contributor(&mut self, series: &TimelineSeries) -> Result<()>;

    /// Draw the global contributions-per-day line.
    fn render_histogram(&mut self, histogram: &GlobalHistogram) -> Result<()>;

    /// Names of everything rendered so far.
    fn outputs(&self) -> Vec<String>;
}

/// Render every chart of an engagement summary: one per contributor, then the
/// global histogram.
pub fn render_engagement<R: ChartRenderer + ?Sized>(
    renderer: &mut R,
    summary: &EngagementSummary,
) -> Result<()> {
    for series in &summary.series {
        renderer.render_contributor(series)?;
    }
    renderer.render_histogram(&summary.histogram)
}

/// Plot-ready data: x in unix seconds, y as counts.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDataset {
    pub label: String,
    pub color: ContributorColor,
    pub points: Vec<(f64, f64)>,
}

impl ChartDataset {
    fn from_points(label: &str, color: ContributorColor, points: &[(i64, u64)], max_points: usize) -> Self {
        Self {
            label: label.to_string(),
            color,
            points: downsample_points(points, max_points)
                .into_iter()
                .map(|(instant, count)| (instant as f64, count as f64))
                .collect(),
        }
    }

    pub fn for_contributor(series: &TimelineSeries, max_points: usize) -> Self {
        Self::from_points(&series.label, series.color, &series.points, max_points)
    }

    pub fn for_histogram(histogram: &GlobalHistogram, max_points: usize) -> Self {
        Self::from_points(HISTOGRAM_LABEL, HISTOGRAM_COLOR, &histogram.points(), max_points)
    }

    /// X axis range, widened by a day on each side when degenerate.
    pub fn x_range(&self) -> Range<f64> {
        let min = self.points.iter().map(|(x, _)| *x).fold(f64::INFINITY, f64::min);
        let max = self.points.iter().map(|(x, _)| *x).fold(f64::NEG_INFINITY, f64::max);
        if !min.is_finite() || !max.is_finite() {
            return 0.0..DAY_SECS;
        }
        if max - min < DAY_SECS {
            return (min - DAY_SECS)..(max + DAY_SECS);
        }
        min..max
    }

    /// Y axis range from zero with a little headroom.
    pub fn y_range(&self) -> Range<f64> {
        let max = self.points.iter().map(|(_, y)| *y).fold(0.0, f64::max);
        0.0..(max * 1.1).max(1.0)
    }
}

/// Format an x axis value (unix seconds) as a date label.
pub fn format_date_label(x: f64) -> String {
    date_of(x.round() as i64)
        .map(|date| date.format(AXIS_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Writes one PNG per chart into an output directory.
pub struct PngChartRenderer {
    output_dir: PathBuf,
    theme: ChartTheme,
    style: ChartStyle,
    written: Vec<PathBuf>,
}

impl PngChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, style: ChartStyle) -> Self {
        Self {
            output_dir: output_dir.into(),
            theme: ChartTheme::default(),
            style,
            written: Vec::new(),
        }
    }

    pub fn with_theme(mut self, theme: ChartTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn draw(&mut self, file_name: String, dataset: &ChartDataset) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(file_name);
        draw_time_series(&path, dataset, &self.theme, &self.style)
            .map_err(|e| InsightError::Plot(e.to_string()))?;
        debug!(path = %path.display(), points = dataset.points.len(), "chart written");
        self.written.push(path);
        Ok(())
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render_contributor(&mut self, series: &TimelineSeries) -> Result<()> {
        let dataset = ChartDataset::for_contributor(series, self.style.max_points);
        self.draw(contributor_file_name(&series.key), &dataset)
    }

    fn render_histogram(&mut self, histogram: &GlobalHistogram) -> Result<()> {
        let dataset = ChartDataset::for_histogram(histogram, self.style.max_points);
        self.draw("contribution-amount.png".to_string(), &dataset)
    }

    fn outputs(&self) -> Vec<String> {
        self.written.iter().map(|p| p.display().to_string()).collect()
    }
}

/// Keeps the datasets in memory instead of drawing them. Used when chart
/// output is disabled.
#[derive(Debug, Default)]
pub struct DatasetCollector {
    max_points: usize,
    pub contributors: Vec<ChartDataset>,
    pub histogram: Option<ChartDataset>,
}

impl DatasetCollector {
    pub fn new(max_points: usize) -> Self {
        Self {
            max_points,
            ..Self::default()
        }
    }
}

impl ChartRenderer for DatasetCollector {
    fn render_contributor(&mut self, series: &TimelineSeries) -> Result<()> {
        self.contributors
            .push(ChartDataset::for_contributor(series, self.max_points));
        Ok(())
    }

    fn render_histogram(&mut self, histogram: &GlobalHistogram) -> Result<()> {
        self.histogram = Some(ChartDataset::for_histogram(histogram, self.max_points));
        Ok(())
    }

    fn outputs(&self) -> Vec<String> {
        self.contributors
            .iter()
            .chain(self.histogram.iter())
            .map(|d| d.label.clone())
            .collect()
    }
}

/// File name of a contributor's chart; anything outside `[A-Za-z0-9_-]` in
/// the key becomes `_`.
pub fn contributor_file_name(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("contribution-frequency-{stem}.png")
}

fn draw_time_series(
    path: &Path,
    dataset: &ChartDataset,
    theme: &ChartTheme,
    style: &ChartStyle,
) -> std::result::Result<(), PlotError> {
    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&theme.background_color)?;

    let font_size = f64::from(style.font_size);
    let mut chart = ChartBuilder::on(&root)
        .caption(
            &dataset.label,
            ("sans-serif", font_size * 1.3).into_font().color(&theme.text_color),
        )
        .margin(style.margin)
        .set_all_label_area_size(style.label_area_size)
        .build_cartesian_2d(dataset.x_range(), dataset.y_range())?;

    let x_label_formatter = |x: &f64| format_date_label(*x);
    let y_label_formatter = |y: &f64| format!("{:.0}", y);

    chart
        .configure_mesh()
        .light_line_style(theme.grid_color)
        .bold_line_style(theme.grid_color)
        .axis_style(theme.axis_color)
        .x_labels(6)
        .x_label_formatter(&x_label_formatter)
        .y_label_formatter(&y_label_formatter)
        .label_style(("sans-serif", font_size).into_font().color(&theme.text_color))
        .draw()?;

    let color = dataset.color.to_rgb();
    chart
        .draw_series(LineSeries::new(
            dataset.points.iter().copied(),
            color.stroke_width(style.line_width),
        ))?
        .label(dataset.label.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

    chart.draw_series(
        dataset
            .points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
    )?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(theme.axis_color)
        .label_font(("sans-serif", font_size).into_font().color(&theme.text_color))
        .draw()?;

    root.present()?;
    Ok(())
}
