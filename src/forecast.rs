//! Trend forecasting of daily registration counts and the probability of
//! reaching a budget target.

use std::f64::consts::PI;

use chrono::{Duration, NaiveDate};
use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::models::{DailyPoint, TargetEstimate};
use crate::term::Term;

/// Days of history needed before weekly seasonality is fitted.
const WEEKLY_MIN_SPAN: i64 = 14;
/// Days of history needed before yearly seasonality is fitted.
const YEARLY_MIN_SPAN: i64 = 730;
const YEARLY_ORDER: usize = 3;
const RIDGE: f64 = 1e-6;
/// Extra days forecast beyond the census day.
const HORIZON_PADDING: i64 = 15;
/// Horizons shorter than this look back over recent history instead.
const SHORT_HORIZON: i64 = 30;
const LOOKBACK_DAYS: i64 = 60;

#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    #[error("need at least two observations to fit a trend, got {0}")]
    InsufficientHistory(usize),
    #[error("trend model is singular")]
    Singular,
}

/// Linear trend with optional weekly and yearly Fourier seasonality, fitted by
/// least squares.
#[derive(Debug, Clone)]
pub struct TrendModel {
    origin: NaiveDate,
    span: f64,
    weekly: bool,
    yearly: bool,
    coefficients: Vec<f64>,
}

impl TrendModel {
    pub fn fit(series: &[DailyPoint]) -> Result<Self, ForecastError> {
        if series.len() < 2 {
            return Err(ForecastError::InsufficientHistory(series.len()));
        }
        let origin = series.iter().map(|point| point.ds).min().unwrap_or(series[0].ds);
        let last = series.iter().map(|point| point.ds).max().unwrap_or(series[0].ds);
        let span_days = (last - origin).num_days();
        if span_days == 0 {
            return Err(ForecastError::InsufficientHistory(1));
        }

        let mut model = TrendModel {
            origin,
            span: span_days as f64,
            weekly: span_days >= WEEKLY_MIN_SPAN,
            yearly: span_days >= YEARLY_MIN_SPAN,
            coefficients: Vec::new(),
        };

        let width = model.features(origin).len();
        let rows: Vec<Vec<f64>> = series.iter().map(|point| model.features(point.ds)).collect();
        let design = DMatrix::from_fn(series.len(), width, |row, col| rows[row][col]);
        let observed =
            DVector::from_iterator(series.len(), series.iter().map(|point| point.y as f64));
        let mut normal = design.transpose() * &design;
        for i in 1..width {
            normal[(i, i)] += RIDGE;
        }
        let rhs = design.transpose() * observed;

        let solution = normal.lu().solve(&rhs).ok_or(ForecastError::Singular)?;
        if solution.iter().any(|beta| !beta.is_finite()) {
            return Err(ForecastError::Singular);
        }
        model.coefficients = solution.iter().copied().collect();
        Ok(model)
    }

    fn features(&self, date: NaiveDate) -> Vec<f64> {
        let days = (date - self.origin).num_days() as f64;
        let mut x = vec![1.0, days / self.span];
        if self.weekly {
            let angle = 2.0 * PI * days / 7.0;
            x.push(angle.sin());
            x.push(angle.cos());
        }
        if self.yearly {
            for order in 1..=YEARLY_ORDER {
                let angle = 2.0 * PI * order as f64 * days / 365.25;
                x.push(angle.sin());
                x.push(angle.cos());
            }
        }
        x
    }

    pub fn predict(&self, date: NaiveDate) -> f64 {
        self.features(date)
            .iter()
            .zip(&self.coefficients)
            .map(|(x, beta)| x * beta)
            .sum()
    }

    /// Fitted values over the history followed by `periods` future days.
    pub fn forecast(&self, history: &[DailyPoint], periods: i64) -> Vec<(NaiveDate, f64)> {
        let mut dates: Vec<NaiveDate> = history.iter().map(|point| point.ds).collect();
        dates.sort();
        dates.dedup();
        if let Some(last) = dates.last().copied() {
            dates.extend((1..=periods).map(|offset| last + Duration::days(offset)));
        }
        dates
            .into_iter()
            .map(|date| (date, self.predict(date)))
            .collect()
    }
}

/// Mean and sample standard deviation; the deviation is `None` below two
/// values.
pub fn mean_and_std(values: &[f64]) -> Option<(f64, Option<f64>)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return Some((mean, None));
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some((mean, Some(variance.sqrt())))
}

/// Chance that a normally distributed outcome reaches `target`. A zero
/// deviation collapses the distribution onto its mean.
pub fn probability_of_reaching(target: f64, mean: f64, std: f64) -> Option<f64> {
    if !mean.is_finite() || !std.is_finite() || std < 0.0 {
        return None;
    }
    if std == 0.0 {
        return Some(if mean >= target { 1.0 } else { 0.0 });
    }
    let normal = Normal::new(mean, std).ok()?;
    Some(1.0 - normal.cdf(target))
}

/// Forecasts a program's registrations to the census day and estimates the
/// probability of reaching `target`.
pub fn estimate_target(
    program: &str,
    series: &[DailyPoint],
    target: i64,
    term: &Term,
    today: NaiveDate,
) -> Result<TargetEstimate, ForecastError> {
    let mut history = series.to_vec();
    history.sort_by_key(|point| point.ds);
    let last_observed = history
        .last()
        .map(|point| point.y)
        .ok_or(ForecastError::InsufficientHistory(0))?;

    let model = TrendModel::fit(&history)?;
    let periods = term.days_until_census(today) + HORIZON_PADDING;
    let cutoff = if periods < SHORT_HORIZON {
        today - Duration::days(LOOKBACK_DAYS)
    } else {
        today
    };
    let window: Vec<f64> = model
        .forecast(&history, periods)
        .into_iter()
        .filter(|(date, _)| *date > cutoff)
        .map(|(_, value)| value)
        .collect();

    let probability = if last_observed >= target {
        Some(1.0)
    } else {
        match mean_and_std(&window) {
            Some((mean, Some(std))) => probability_of_reaching(target as f64, mean, std),
            _ => None,
        }
    };

    let projected = window_midpoint(&window).map_or(last_observed, |mid| mid.max(last_observed));

    Ok(TargetEstimate {
        program: program.to_string(),
        probability,
        projected,
    })
}

/// Midpoint of the forecast range, each end truncated toward zero first.
fn window_midpoint(window: &[f64]) -> Option<i64> {
    let max = window.iter().copied().reduce(f64::max)?;
    let min = window.iter().copied().reduce(f64::min)?;
    Some((max.trunc() as i64 + min.trunc() as i64) / 2)
}
