//! Analysis module - statistics over the run history
//!
//! Features:
//! - Current weekly mileage (the input of the plan generator)
//! - Monthly / yearly aggregates and year-over-year pace comparison
//! - Streaks, pace summary, distance distribution
//! - Weekly mileage trend using linear regression (linfa)

pub mod trend;

pub use trend::{MileageTrend, TrendDirection, WeeklyMileage};

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::history::Run;

/// Trailing window used for current weekly mileage
pub const RECENT_WINDOW_DAYS: i64 = 28;

/// Number of latest runs used for the recent pace average
const RECENT_RUNS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Month,
    Year,
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            _ => Err(format!("Period must be 'month' or 'year', got '{}'", s)),
        }
    }
}

/// Totals for one month or year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodAggregate {
    /// "2024-03" or "2024"
    pub period: String,
    pub total_distance: f64,
    /// Minutes
    pub total_time: f64,
    pub total_elevation: i64,
    /// Minutes per mile
    pub avg_pace: f64,
    pub num_runs: usize,
}

/// Pace statistics for one year of comparable runs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearPerformance {
    pub year: i32,
    pub avg_pace: f64,
    pub median_pace: f64,
    pub best_pace: f64,
    pub num_runs: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Streaks {
    pub longest_streak: usize,
    pub current_streak: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaceSummary {
    pub average_pace: f64,
    pub best_pace: f64,
    pub worst_pace: f64,
    pub recent_average_pace: f64,
    /// Percent; positive means recent runs are faster than average
    pub pace_improvement: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DistanceDistribution {
    #[serde(rename = "Short (0-3 miles)")]
    pub short: usize,
    #[serde(rename = "Medium (3-5 miles)")]
    pub medium: usize,
    #[serde(rename = "Long (5-10 miles)")]
    pub long: usize,
    #[serde(rename = "Very Long (10+ miles)")]
    pub very_long: usize,
}

/// Everything `insights` reports, in one serializable bundle
#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub streak_analysis: Streaks,
    pub weekly_mileage_trend: Option<MileageTrend>,
    pub pace_analysis: Option<PaceSummary>,
    pub distance_distribution: DistanceDistribution,
    pub elevation_pace_correlation: Option<f64>,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Pearson correlation; None with fewer than 2 points or no variance
fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Run history analytics
pub struct Analytics {
    runs: Vec<Run>,
}

impl Analytics {
    pub fn new(runs: Vec<Run>) -> Self {
        Self { runs }
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Average weekly mileage over the 28 days ending `today`
    pub fn current_weekly_mileage(&self, today: NaiveDate) -> f64 {
        let cutoff = today - Duration::days(RECENT_WINDOW_DAYS);
        let total: f64 = self
            .runs
            .iter()
            .filter(|r| r.date > cutoff)
            .map(|r| r.distance)
            .sum();
        total / (RECENT_WINDOW_DAYS / 7) as f64
    }

    /// Totals per month or year, oldest first
    pub fn aggregate_by_period(&self, period: Period) -> Vec<PeriodAggregate> {
        let mut groups: BTreeMap<String, Vec<&Run>> = BTreeMap::new();
        for run in &self.runs {
            let key = match period {
                Period::Month => format!("{}-{:02}", run.date.year(), run.date.month()),
                Period::Year => run.date.year().to_string(),
            };
            groups.entry(key).or_default().push(run);
        }

        groups
            .into_iter()
            .map(|(period, runs)| {
                let total_distance: f64 = runs.iter().map(|r| r.distance).sum();
                let total_time: f64 = runs.iter().filter_map(|r| r.minutes().ok()).sum();
                let avg_pace = if total_distance > 0.0 {
                    total_time / total_distance
                } else {
                    0.0
                };
                PeriodAggregate {
                    period,
                    total_distance,
                    total_time,
                    total_elevation: runs.iter().map(|r| r.elevation).sum(),
                    avg_pace,
                    num_runs: runs.len(),
                }
            })
            .collect()
    }

    /// Year-over-year pace for runs of comparable length
    pub fn compare_performance(
        &self,
        min_distance: f64,
        max_distance: f64,
        title_keyword: Option<&str>,
    ) -> Vec<YearPerformance> {
        let keyword = title_keyword.map(|k| k.to_lowercase());
        let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();

        for run in &self.runs {
            if run.distance < min_distance || run.distance > max_distance {
                continue;
            }
            if let Some(k) = &keyword
                && !run.title.to_lowercase().contains(k)
            {
                continue;
            }
            if let Some(pace) = run.pace() {
                by_year.entry(run.date.year()).or_default().push(pace);
            }
        }

        by_year
            .into_iter()
            .filter_map(|(year, paces)| {
                Some(YearPerformance {
                    year,
                    avg_pace: mean(&paces)?,
                    median_pace: median(&paces)?,
                    best_pace: paces.iter().copied().fold(f64::INFINITY, f64::min),
                    num_runs: paces.len(),
                })
            })
            .collect()
    }

    /// Longest and latest run of consecutive running days
    pub fn streak_analysis(&self) -> Streaks {
        let days: BTreeSet<NaiveDate> = self.runs.iter().map(|r| r.date).collect();

        let mut longest = 0;
        let mut current = 0;
        let mut previous: Option<NaiveDate> = None;

        for day in days {
            current = match previous {
                Some(prev) if day - prev == Duration::days(1) => current + 1,
                _ => 1,
            };
            longest = longest.max(current);
            previous = Some(day);
        }

        Streaks {
            longest_streak: longest,
            current_streak: current,
        }
    }

    pub fn pace_analysis(&self) -> Option<PaceSummary> {
        let mut dated: Vec<(NaiveDate, f64)> = self
            .runs
            .iter()
            .filter_map(|r| r.pace().map(|p| (r.date, p)))
            .collect();
        dated.sort_by_key(|(date, _)| *date);

        let paces: Vec<f64> = dated.iter().map(|(_, p)| *p).collect();
        let average_pace = mean(&paces)?;
        let recent: Vec<f64> = paces.iter().rev().take(RECENT_RUNS).copied().collect();
        let recent_average_pace = mean(&recent)?;

        Some(PaceSummary {
            average_pace,
            best_pace: paces.iter().copied().fold(f64::INFINITY, f64::min),
            worst_pace: paces.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            recent_average_pace,
            pace_improvement: (average_pace - recent_average_pace) / average_pace * 100.0,
        })
    }

    pub fn distance_distribution(&self) -> DistanceDistribution {
        let mut dist = DistanceDistribution::default();
        for run in &self.runs {
            match run.distance {
                d if d < 0.0 => {}
                d if d <= 3.0 => dist.short += 1,
                d if d <= 5.0 => dist.medium += 1,
                d if d <= 10.0 => dist.long += 1,
                _ => dist.very_long += 1,
            }
        }
        dist
    }

    /// Correlation between elevation gain and pace
    pub fn elevation_pace_correlation(&self) -> Option<f64> {
        let pairs: Vec<(f64, f64)> = self
            .runs
            .iter()
            .filter_map(|r| r.pace().map(|p| (r.elevation as f64, p)))
            .collect();
        pearson(&pairs)
    }

    pub fn weekly_mileage_trend(&self) -> Option<MileageTrend> {
        MileageTrend::fit(&self.runs)
    }

    pub fn generate_insights(&self) -> Insights {
        Insights {
            streak_analysis: self.streak_analysis(),
            weekly_mileage_trend: self.weekly_mileage_trend(),
            pace_analysis: self.pace_analysis(),
            distance_distribution: self.distance_distribution(),
            elevation_pace_correlation: self.elevation_pace_correlation(),
        }
    }

    /// Write insights as pretty JSON
    pub fn save_insights<P: AsRef<Path>>(&self, path: P) -> Result<Insights> {
        let insights = self.generate_insights();
        let file = File::create(path.as_ref())
            .with_context(|| format!("creating {}", path.as_ref().display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &insights)?;
        Ok(insights)
    }
}
