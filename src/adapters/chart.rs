//! Chart rendering with plotters.
//!
//! Figures are rendered in memory so the pipeline can hand the bytes to any
//! [`Storage`](crate::core::Storage) backend.

use crate::core::figure::{TrendFigure, MONTHLY_VIEWS_LABEL, TREND_LABEL};
use crate::core::{ChartFormat, ZeroViewMonth};
use crate::utils::error::{Result, TrendError};
use chrono::NaiveDate;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

pub const WIDTH: u32 = 1800;
pub const HEIGHT: u32 = 600;
pub const ZERO_VIEWS_TITLE: &str = "Article-days with 0 Views per Month";

const FIGURE_BACKGROUND: RGBColor = RGBColor(211, 211, 211);
const DARK_GREY: RGBColor = RGBColor(169, 169, 169);
const POINT_COLOR: RGBColor = BLUE;
const SPLIT_COLOR: RGBColor = RED;
const POINT_SIZE: u32 = 5;

type DrawResult<T, DB> = std::result::Result<T, DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Anything that can be drawn onto a root drawing area.
trait ChartSpec {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<(), DB>;
}

/// Render the scatter/regression plot of monthly views.
pub fn render_trend(figure: &TrendFigure, format: ChartFormat) -> Result<Vec<u8>> {
    tracing::debug!(
        "Rendering '{}' with {} segment(s) as {}",
        figure.title,
        figure.segments.len(),
        format
    );
    render(&TrendChart(figure), format)
}

/// Render the bar chart of zero-view article-days.
pub fn render_zero_views(zeros: &[ZeroViewMonth], format: ChartFormat) -> Result<Vec<u8>> {
    if zeros.is_empty() {
        return Err(TrendError::ProcessingError {
            message: "no months to plot zero-view days for".to_string(),
        });
    }
    tracing::debug!("Rendering zero-view bar chart for {} months as {}", zeros.len(), format);
    render(&ZeroViewsChart(zeros), format)
}

fn render<C: ChartSpec>(chart: &C, format: ChartFormat) -> Result<Vec<u8>> {
    match format {
        ChartFormat::Svg => {
            let mut svg = String::new();
            {
                let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
                chart.draw(&root).map_err(render_error)?;
                root.present().map_err(render_error)?;
            }
            Ok(svg.into_bytes())
        }
        ChartFormat::Png => {
            let mut pixels = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
            {
                let root =
                    BitMapBackend::with_buffer(&mut pixels, (WIDTH, HEIGHT)).into_drawing_area();
                chart.draw(&root).map_err(render_error)?;
                root.present().map_err(render_error)?;
            }
            encode_png(&pixels, WIDTH, HEIGHT)
        }
    }
}

fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out).write_image(pixels, width, height, ColorType::Rgb8)?;
    Ok(out)
}

fn render_error<E: std::fmt::Display>(e: E) -> TrendError {
    TrendError::RenderError {
        message: e.to_string(),
    }
}

fn month_label(date: &NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

struct TrendChart<'a>(&'a TrendFigure);

impl ChartSpec for TrendChart<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<(), DB> {
        let figure = self.0;
        let (x_start, x_end) = figure.x_range;
        let (y_lo, y_hi) = figure.y_range();

        root.fill(&FIGURE_BACKGROUND)?;

        let mut chart = ChartBuilder::on(root)
            .caption(&figure.title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d((x_start..x_end).monthly(), y_lo..y_hi)?;

        chart.plotting_area().fill(&WHITE)?;
        chart
            .configure_mesh()
            .x_labels(figure.month_ticks().len().max(2))
            .x_label_formatter(&month_label)
            .y_label_formatter(&|v| format!("{:.0}", v))
            .x_desc("Month / Year")
            .y_desc("Monthly Page Views")
            .label_style(("sans-serif", 14))
            .draw()?;

        // 信賴區間先畫，讓散點與趨勢線疊在上面
        for segment in &figure.segments {
            let line = segment.trend_line();
            if line.is_empty() {
                continue;
            }
            let band: Vec<(NaiveDate, f64)> = line
                .iter()
                .map(|&(date, _, _, hi)| (date, hi))
                .chain(line.iter().rev().map(|&(date, lo, _, _)| (date, lo)))
                .collect();
            chart.draw_series(std::iter::once(Polygon::new(
                band,
                DARK_GREY.mix(0.3).filled(),
            )))?;
        }

        chart
            .draw_series(
                figure
                    .points()
                    .map(|p| Circle::new((p.date, p.views as f64), POINT_SIZE, POINT_COLOR.filled())),
            )?
            .label(MONTHLY_VIEWS_LABEL)
            .legend(|(x, y)| Rectangle::new([(x, y - 6), (x + 20, y + 6)], POINT_COLOR.filled()));

        let mut trend_labelled = false;
        for segment in &figure.segments {
            let line = segment.trend_line();
            if line.is_empty() {
                continue;
            }
            let series = chart.draw_series(LineSeries::new(
                line.iter().map(|&(date, _, y, _)| (date, y)),
                DARK_GREY.stroke_width(3),
            ))?;
            if !trend_labelled {
                series.label(TREND_LABEL).legend(|(x, y)| {
                    Rectangle::new([(x, y - 6), (x + 20, y + 6)], DARK_GREY.filled())
                });
                trend_labelled = true;
            }
        }

        if let Some(split) = &figure.split {
            chart
                .draw_series(LineSeries::new(
                    vec![(split.date, y_lo), (split.date, y_hi)],
                    SPLIT_COLOR.stroke_width(2),
                ))?
                .label(split.label.clone())
                .legend(|(x, y)| Rectangle::new([(x, y - 6), (x + 20, y + 6)], SPLIT_COLOR.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerLeft)
            .label_font(("sans-serif", 18))
            .background_style(WHITE.mix(0.9))
            .border_style(&BLACK)
            .draw()?;

        Ok(())
    }
}

struct ZeroViewsChart<'a>(&'a [ZeroViewMonth]);

impl ChartSpec for ZeroViewsChart<'_> {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult<(), DB> {
        let zeros = self.0;
        let months = zeros.len() as u32;
        let y_max = zeros.iter().map(|z| z.zero_days).max().unwrap_or(0);
        let y_max = y_max + (y_max / 10).max(1);

        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(root)
            .caption(ZERO_VIEWS_TITLE, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d((0u32..months).into_segmented(), 0u64..y_max)?;

        let label = |v: &SegmentValue<u32>| match v {
            SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => zeros
                .get(*i as usize)
                .map(|z| z.month.to_string())
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(zeros.len())
            .x_label_formatter(&label)
            .x_desc("Year - Month")
            .y_desc("Number of Article-days with 0 Views")
            .label_style(("sans-serif", 14))
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(POINT_COLOR.mix(0.7).filled())
                .margin(4)
                .data(zeros.iter().enumerate().map(|(i, z)| (i as u32, z.zero_days))),
        )?;

        Ok(())
    }
}
