//! Weekly mileage trend using linear regression (linfa)

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::history::Run;

/// Minimum number of weeks required for a trend
const MIN_WEEKS: usize = 2;

/// Total distance for one Monday-to-Sunday week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyMileage {
    /// "2024-03-04/2024-03-10"
    pub week: String,
    #[serde(skip)]
    pub start: NaiveDate,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Increasing => write!(f, "increasing"),
            TrendDirection::Decreasing => write!(f, "decreasing"),
        }
    }
}

/// Fitted trend over weekly totals
#[derive(Debug, Clone, Serialize)]
pub struct MileageTrend {
    pub trend: TrendDirection,
    /// |r|, 0 (no fit) to 1 (perfectly linear)
    pub strength: f64,
    /// Miles per week gained (or lost) each week
    pub slope: f64,
    pub weekly_mileage: Vec<WeeklyMileage>,
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Sum distances per week. Weeks without runs are left out.
pub fn weekly_totals(runs: &[Run]) -> Vec<WeeklyMileage> {
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for run in runs {
        *totals.entry(week_start(run.date)).or_insert(0.0) += run.distance;
    }

    totals
        .into_iter()
        .map(|(start, distance)| WeeklyMileage {
            week: format!(
                "{}/{}",
                start.format("%Y-%m-%d"),
                (start + Duration::days(6)).format("%Y-%m-%d")
            ),
            start,
            distance,
        })
        .collect()
}

impl MileageTrend {
    /// Regress weekly totals against week index
    pub fn fit(runs: &[Run]) -> Option<Self> {
        let weekly_mileage = weekly_totals(runs);
        if weekly_mileage.len() < MIN_WEEKS {
            return None;
        }

        let n_samples = weekly_mileage.len();
        let x_data: Vec<f64> = (0..n_samples).map(|i| i as f64).collect();
        let y_data: Vec<f64> = weekly_mileage.iter().map(|w| w.distance).collect();

        let records = Array2::from_shape_vec((n_samples, 1), x_data).ok()?;
        let targets = Array1::from_vec(y_data);
        let dataset = Dataset::new(records, targets);

        let model = LinearRegression::default().fit(&dataset).ok()?;
        let slope = model.params()[0];

        let predictions = model.predict(&dataset);
        // Flat weekly totals give 0/0 here
        let r2 = predictions.r2(&dataset).unwrap_or(0.0);
        let strength = if r2.is_finite() { r2.max(0.0).sqrt() } else { 0.0 };

        let trend = if slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        };

        Some(Self {
            trend,
            strength,
            slope,
            weekly_mileage,
        })
    }
}
