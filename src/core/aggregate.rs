//! Monthly aggregation of daily page views.

use crate::core::{DailyViews, DatasetSummary, MonthlyViews, Result, YearMonth, ZeroViewMonth};
use crate::utils::error::TrendError;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

/// Sum views per calendar month, ordered by month.
pub fn monthly_totals(rows: &[DailyViews]) -> Result<Vec<MonthlyViews>> {
    let mut totals: BTreeMap<YearMonth, u64> = BTreeMap::new();
    for row in rows {
        let month = YearMonth::from_date(row.date);
        let total = totals.entry(month).or_default();
        *total = total
            .checked_add(row.views)
            .ok_or_else(|| TrendError::ProcessingError {
                message: format!("monthly view total for {} overflows u64", month),
            })?;
    }

    Ok(totals
        .into_iter()
        .map(|(month, views)| MonthlyViews { month, views })
        .collect())
}

/// Count article-days with zero views per month.
///
/// Every month present in the input is reported, months without any
/// zero-view day get a count of 0.
pub fn zero_view_days(rows: &[DailyViews]) -> Vec<ZeroViewMonth> {
    let mut counts: BTreeMap<YearMonth, u64> = BTreeMap::new();
    for row in rows {
        let count = counts.entry(YearMonth::from_date(row.date)).or_default();
        if row.views == 0 {
            *count += 1;
        }
    }

    counts
        .into_iter()
        .map(|(month, zero_days)| ZeroViewMonth { month, zero_days })
        .collect()
}

/// Keep the months up to and including the month containing `cutoff`.
pub fn truncate_until(monthly: &[MonthlyViews], cutoff: NaiveDate) -> Vec<MonthlyViews> {
    let last = YearMonth::from_date(cutoff);
    monthly
        .iter()
        .filter(|m| m.month <= last)
        .copied()
        .collect()
}

/// Split months by comparing their first day against `date`.
///
/// A month lands in the first half when its period start is strictly before
/// `date`, so the month containing `date` goes first unless `date` is the 1st.
pub fn split_at(
    monthly: &[MonthlyViews],
    date: NaiveDate,
) -> (Vec<MonthlyViews>, Vec<MonthlyViews>) {
    monthly.iter().partition(|m| m.month.first_day() < date)
}

pub fn describe(rows: &[DailyViews]) -> DatasetSummary {
    let mut views: Vec<u64> = rows.iter().map(|r| r.views).collect();
    views.sort_unstable();

    let count = views.len();
    let articles = rows
        .iter()
        .map(|r| r.article.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mean = (count > 0).then(|| views.iter().map(|&v| v as f64).sum::<f64>() / count as f64);
    let std = mean.filter(|_| count > 1).map(|mean| {
        let ss: f64 = views.iter().map(|&v| (v as f64 - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    });

    DatasetSummary {
        count,
        articles,
        first_date: rows.iter().map(|r| r.date).min(),
        last_date: rows.iter().map(|r| r.date).max(),
        mean,
        std,
        min: views.first().copied(),
        q25: quantile(&views, 0.25),
        median: quantile(&views, 0.5),
        q75: quantile(&views, 0.75),
        max: views.last().copied(),
    }
}

/// Linear interpolation between closest ranks; `sorted` must be ascending.
fn quantile(sorted: &[u64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let (a, b) = (sorted[lo] as f64, sorted[hi] as f64);
    Some(a + (b - a) * (pos - lo as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(article: &str, y: i32, m: u32, d: u32, views: u64) -> DailyViews {
        DailyViews {
            article: article.to_string(),
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            views,
        }
    }

    fn month(y: i32, m: u32, views: u64) -> MonthlyViews {
        MonthlyViews {
            month: YearMonth::new(y, m).unwrap(),
            views,
        }
    }

    #[test]
    fn test_monthly_totals_sums_and_orders() {
        let rows = vec![
            day("b", 2013, 2, 3, 7),
            day("a", 2013, 1, 1, 10),
            day("b", 2013, 1, 31, 5),
            day("a", 2013, 2, 1, 0),
        ];

        let monthly = monthly_totals(&rows).unwrap();

        assert_eq!(monthly, vec![month(2013, 1, 15), month(2013, 2, 7)]);
    }

    #[test]
    fn test_monthly_totals_overflow_is_an_error() {
        let rows = vec![
            day("a", 2013, 1, 1, u64::MAX),
            day("b", 2013, 1, 2, 1),
        ];

        let err = monthly_totals(&rows).unwrap_err();

        assert!(matches!(err, TrendError::ProcessingError { .. }));
        assert!(err.to_string().contains("2013-01"));
        // 不同月份各自加總，不會溢位
        let rows = vec![day("a", 2013, 1, 1, u64::MAX), day("a", 2013, 2, 1, 1)];
        assert_eq!(monthly_totals(&rows).unwrap().len(), 2);
    }

    #[test]
    fn test_zero_view_days_fills_missing_months() {
        let rows = vec![
            day("a", 2013, 1, 1, 0),
            day("b", 2013, 1, 1, 0),
            day("a", 2013, 2, 1, 3),
            day("a", 2013, 3, 1, 0),
        ];

        let zeros = zero_view_days(&rows);

        let counts: Vec<(String, u64)> = zeros
            .iter()
            .map(|z| (z.month.to_string(), z.zero_days))
            .collect();
        assert_eq!(
            counts,
            vec![
                ("2013-01".to_string(), 2),
                ("2013-02".to_string(), 0),
                ("2013-03".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_split_keeps_disclosure_month_before() {
        let monthly = vec![month(2013, 5, 1), month(2013, 6, 2), month(2013, 7, 3)];

        let (before, after) = split_at(&monthly, NaiveDate::from_ymd_opt(2013, 6, 6).unwrap());
        assert_eq!(before, vec![month(2013, 5, 1), month(2013, 6, 2)]);
        assert_eq!(after, vec![month(2013, 7, 3)]);

        let (before, after) = split_at(&monthly, NaiveDate::from_ymd_opt(2013, 6, 1).unwrap());
        assert_eq!(before, vec![month(2013, 5, 1)]);
        assert_eq!(after.len(), 2);
    }

    #[test]
    fn test_truncate_keeps_cutoff_month() {
        let monthly = vec![month(2014, 5, 1), month(2014, 6, 2), month(2014, 7, 3)];

        let kept = truncate_until(&monthly, NaiveDate::from_ymd_opt(2014, 6, 30).unwrap());
        assert_eq!(kept, vec![month(2014, 5, 1), month(2014, 6, 2)]);

        let kept = truncate_until(&monthly, NaiveDate::from_ymd_opt(2014, 6, 1).unwrap());
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_describe() {
        let rows = vec![
            day("a", 2013, 1, 2, 1),
            day("a", 2013, 1, 1, 2),
            day("b", 2013, 1, 3, 3),
            day("b", 2013, 1, 4, 4),
        ];

        let summary = describe(&rows);

        assert_eq!(summary.count, 4);
        assert_eq!(summary.articles, 2);
        assert_eq!(summary.first_date, NaiveDate::from_ymd_opt(2013, 1, 1));
        assert_eq!(summary.last_date, NaiveDate::from_ymd_opt(2013, 1, 4));
        assert_eq!(summary.mean, Some(2.5));
        assert_eq!(summary.min, Some(1));
        assert_eq!(summary.max, Some(4));
        assert_eq!(summary.q25, Some(1.75));
        assert_eq!(summary.median, Some(2.5));
        assert_eq!(summary.q75, Some(3.25));
        let std = summary.std.unwrap();
        assert!((std - 1.2909944).abs() < 1e-6);
    }

    #[test]
    fn test_describe_empty() {
        let summary = describe(&[]);
        assert_eq!(summary.count, 0);
        assert!(summary.mean.is_none());
        assert!(summary.std.is_none());
        assert!(summary.median.is_none());
    }
}
