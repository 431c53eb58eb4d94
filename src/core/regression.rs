//! Ordinary least squares with a single regressor.

use crate::utils::error::{Result, TrendError};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub n: usize,
    /// Residual standard error, sqrt(SSE / (n - 2)). Zero when n == 2.
    pub residual_std_error: f64,
    pub x_mean: f64,
    /// Sum of squared deviations of x from its mean.
    pub sxx: f64,
    /// Two-sided 95% Student-t quantile for n - 2 degrees of freedom.
    pub t_critical: f64,
}

impl RegressionFit {
    pub fn fit(xs: &[f64], ys: &[f64]) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(TrendError::ProcessingError {
                message: format!("dimension mismatch: {} x values, {} y values", xs.len(), ys.len()),
            });
        }
        let n = xs.len();
        if n < 2 {
            return Err(TrendError::ProcessingError {
                message: format!("at least 2 points are needed for a trend line, got {}", n),
            });
        }

        let nf = n as f64;
        let x_mean = xs.iter().sum::<f64>() / nf;
        let y_mean = ys.iter().sum::<f64>() / nf;

        let sxx: f64 = xs.iter().map(|&x| (x - x_mean).powi(2)).sum();
        if sxx <= f64::EPSILON {
            return Err(TrendError::ProcessingError {
                message: "all points share the same date, the trend is undefined".to_string(),
            });
        }
        let sxy: f64 = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| (x - x_mean) * (y - y_mean))
            .sum();

        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;

        let ss_tot: f64 = ys.iter().map(|&y| (y - y_mean).powi(2)).sum();
        let ss_res: f64 = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| (y - (intercept + slope * x)).powi(2))
            .sum();

        // 常數 y 時完全擬合
        let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };
        let residual_std_error = if n > 2 {
            (ss_res / (nf - 2.0)).sqrt()
        } else {
            0.0
        };

        Ok(Self {
            slope,
            intercept,
            r_squared,
            n,
            residual_std_error,
            x_mean,
            sxx,
            t_critical: t_critical(n - 2)?,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// 95% confidence interval of the mean prediction at `x`.
    pub fn confidence_band(&self, x: f64) -> (f64, f64) {
        let y = self.predict(x);
        let se = self.residual_std_error
            * (1.0 / self.n as f64 + (x - self.x_mean).powi(2) / self.sxx).sqrt();
        let half = self.t_critical * se;
        (y - half, y + half)
    }

    /// Evenly spaced `(x, lower, fitted, upper)` samples over `[x_min, x_max]`.
    pub fn line(&self, x_min: f64, x_max: f64, samples: usize) -> Vec<(f64, f64, f64, f64)> {
        let samples = samples.max(2);
        let step = (x_max - x_min) / (samples - 1) as f64;
        (0..samples)
            .map(|i| {
                let x = x_min + step * i as f64;
                let (lo, hi) = self.confidence_band(x);
                (x, lo, self.predict(x), hi)
            })
            .collect()
    }
}

fn t_critical(df: usize) -> Result<f64> {
    // 兩點擬合沒有殘差自由度，信賴帶寬度為零
    if df == 0 {
        return Ok(0.0);
    }
    let dist = StudentsT::new(0.0, 1.0, df as f64).map_err(|e| TrendError::ProcessingError {
        message: format!("invalid Student-t distribution for {} degrees of freedom: {}", df, e),
    })?;
    Ok(dist.inverse_cdf(0.975))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_line_is_recovered() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 * x + 2.0).collect();

        let fit = RegressionFit::fit(&xs, &ys).unwrap();

        assert!((fit.slope - 3.0).abs() < 1e-9);
        assert!((fit.intercept - 2.0).abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        assert!(fit.residual_std_error < 1e-9);
        assert!((fit.predict(10.0) - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_noisy_fit_band_contains_prediction() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 2.0, 4.0];

        let fit = RegressionFit::fit(&xs, &ys).unwrap();

        assert!((fit.slope - 0.8).abs() < 1e-9);
        assert!((fit.intercept - 1.3).abs() < 1e-9);
        assert!(fit.r_squared > 0.0 && fit.r_squared < 1.0);

        let (lo, hi) = fit.confidence_band(1.5);
        let mid = fit.predict(1.5);
        assert!(lo < mid && mid < hi);
        // 離平均越遠信賴帶越寬
        let (far_lo, far_hi) = fit.confidence_band(10.0);
        assert!(far_hi - far_lo > hi - lo);
    }

    #[test]
    fn test_two_points_have_no_band() {
        let fit = RegressionFit::fit(&[0.0, 10.0], &[5.0, 15.0]).unwrap();
        let (lo, hi) = fit.confidence_band(5.0);
        assert_eq!(lo, hi);
    }

    #[test]
    fn test_degenerate_input_rejected() {
        assert!(RegressionFit::fit(&[1.0], &[1.0]).is_err());
        assert!(RegressionFit::fit(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).is_err());
        assert!(RegressionFit::fit(&[1.0, 2.0], &[1.0]).is_err());
    }

    #[test]
    fn test_t_critical_values() {
        assert_eq!(t_critical(0).unwrap(), 0.0);
        assert!((t_critical(1).unwrap() - 12.706).abs() < 1e-3);
        assert!((t_critical(30).unwrap() - 2.0423).abs() < 1e-3);
        // 自由度超過 30 仍隨 df 平滑遞減
        assert!((t_critical(31).unwrap() - 2.0395).abs() < 1e-3);
        assert!((t_critical(60).unwrap() - 2.0003).abs() < 1e-3);
        assert!(t_critical(31).unwrap() < t_critical(30).unwrap());
        assert!(t_critical(60).unwrap() > 1.96);
    }

    #[test]
    fn test_line_samples_span_range() {
        let fit = RegressionFit::fit(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0]).unwrap();
        let line = fit.line(0.0, 2.0, 5);
        assert_eq!(line.len(), 5);
        assert_eq!(line[0].0, 0.0);
        assert!((line[4].0 - 2.0).abs() < 1e-12);
        assert!((line[2].2 - 1.0).abs() < 1e-9);
    }
}
