//! Backend independent description of a trend plot.

use crate::core::regression::RegressionFit;
use crate::core::{aggregate, MonthlyViews, YearMonth};
use crate::utils::error::{Result, TrendError};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

pub const MONTHLY_VIEWS_LABEL: &str = "Monthly Page Views";
pub const TREND_LABEL: &str = "trend";
/// Padding added on both sides of the x axis.
pub const X_MARGIN_DAYS: i64 = 15;
const TREND_SAMPLES: usize = 100;

pub fn day_ordinal(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

pub fn date_from_ordinal(x: f64) -> NaiveDate {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: YearMonth,
    /// Plotted at the first day of the month.
    pub date: NaiveDate,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSegment {
    pub points: Vec<TrendPoint>,
    /// `None` when the segment holds fewer than two months.
    pub fit: Option<RegressionFit>,
}

/// `(date, lower, fitted, upper)` sample of a trend line.
pub type TrendSample = (NaiveDate, f64, f64, f64);

impl TrendSegment {
    fn from_months(monthly: &[MonthlyViews]) -> Result<Self> {
        let points: Vec<TrendPoint> = monthly
            .iter()
            .map(|m| TrendPoint {
                month: m.month,
                date: m.month.first_day(),
                views: m.views,
            })
            .collect();

        let fit = if points.len() >= 2 {
            let xs: Vec<f64> = points.iter().map(|p| day_ordinal(p.date)).collect();
            let ys: Vec<f64> = points.iter().map(|p| p.views as f64).collect();
            Some(RegressionFit::fit(&xs, &ys)?)
        } else {
            tracing::debug!("Segment with {} month(s) is drawn without a trend", points.len());
            None
        };

        Ok(Self { points, fit })
    }

    /// Trend samples limited to the dates covered by the segment.
    pub fn trend_line(&self) -> Vec<TrendSample> {
        let (Some(fit), Some(first), Some(last)) =
            (&self.fit, self.points.first(), self.points.last())
        else {
            return Vec::new();
        };

        fit.line(day_ordinal(first.date), day_ordinal(last.date), TREND_SAMPLES)
            .into_iter()
            .map(|(x, lo, y, hi)| (date_from_ordinal(x), lo, y, hi))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitMarker {
    pub date: NaiveDate,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendFigure {
    pub title: String,
    pub segments: Vec<TrendSegment>,
    pub split: Option<SplitMarker>,
    pub x_range: (NaiveDate, NaiveDate),
}

impl TrendFigure {
    /// Build a figure from monthly totals.
    ///
    /// Without a split, a single trend is fitted over all months. With a split
    /// the months before and after are fitted independently.
    pub fn build(
        title: &str,
        monthly: &[MonthlyViews],
        split: Option<(NaiveDate, &str)>,
    ) -> Result<Self> {
        let (Some(first), Some(last)) = (monthly.first(), monthly.last()) else {
            return Err(TrendError::ProcessingError {
                message: format!("no monthly data to plot for '{}'", title),
            });
        };

        let segments = match split {
            None => vec![TrendSegment::from_months(monthly)?],
            Some((date, _)) => {
                let (before, after) = aggregate::split_at(monthly, date);
                [before, after]
                    .iter()
                    .filter(|part| !part.is_empty())
                    .map(|part| TrendSegment::from_months(part))
                    .collect::<Result<Vec<_>>>()?
            }
        };

        let x_range = (
            first.month.first_day() - Duration::days(X_MARGIN_DAYS),
            last.month.first_day() + Duration::days(X_MARGIN_DAYS),
        );

        Ok(Self {
            title: title.to_string(),
            segments,
            split: split.map(|(date, label)| SplitMarker {
                date,
                label: label.to_string(),
            }),
            x_range,
        })
    }

    pub fn points(&self) -> impl Iterator<Item = &TrendPoint> {
        self.segments.iter().flat_map(|s| s.points.iter())
    }

    /// Vertical extent covering every point and confidence band, starting at 0
    /// unless a band dips below it.
    pub fn y_range(&self) -> (f64, f64) {
        let mut lo = 0.0_f64;
        let mut hi = self.points().map(|p| p.views as f64).fold(0.0, f64::max);

        for segment in &self.segments {
            for (_, band_lo, _, band_hi) in segment.trend_line() {
                lo = lo.min(band_lo);
                hi = hi.max(band_hi);
            }
        }

        if hi <= lo {
            hi = lo + 1.0;
        }
        let pad = (hi - lo) * 0.05;
        (if lo < 0.0 { lo - pad } else { lo }, hi + pad)
    }

    /// Legend entries in display order.
    pub fn legend_labels(&self) -> Vec<&str> {
        let mut labels = vec![MONTHLY_VIEWS_LABEL, TREND_LABEL];
        if let Some(split) = &self.split {
            labels.push(split.label.as_str());
        }
        labels
    }

    /// Month starts inside the x range, used as tick positions.
    pub fn month_ticks(&self) -> Vec<NaiveDate> {
        let mut month = YearMonth::from_date(self.x_range.0);
        let mut ticks = Vec::new();
        while month.first_day() <= self.x_range.1 {
            if month.first_day() >= self.x_range.0 {
                ticks.push(month.first_day());
            }
            month = month.next();
        }
        ticks
    }
}
