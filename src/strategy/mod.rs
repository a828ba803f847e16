//! Strategy module - half-marathon training plan generation
//!
//! Takes the runner's recent average weekly mileage and a race date and
//! builds a week-by-week plan: a linear build, one peak week, a taper week
//! and race week.

pub mod phase;
pub mod week;

pub use phase::{Ramp, WeekPhase};
pub use week::WeekPlan;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Peak is at most 50% above current mileage...
pub const PEAK_GROWTH: f64 = 1.5;
/// ...and never above 50 miles a week
pub const PEAK_CAP: f64 = 50.0;
/// Weeks reserved at the end of the plan for peak, taper and race week
pub const RESERVED_WEEKS: i64 = 3;

/// Errors raised while building a plan
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("unsupported race distance {0} miles: only half marathon (13.1) plans are supported")]
    UnsupportedRaceDistance(f64),

    #[error("race is {weeks} week(s) away: at least 4 weeks are needed to build, peak and taper")]
    InsufficientLeadTime { weeks: i64 },

    #[error("invalid current weekly mileage: {0}")]
    InvalidMileage(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RaceDistance {
    HalfMarathon,
}

impl RaceDistance {
    pub const fn miles(self) -> f64 {
        match self {
            RaceDistance::HalfMarathon => 13.1,
        }
    }

    pub fn from_miles(miles: f64) -> Result<Self, PlanError> {
        if (miles - RaceDistance::HalfMarathon.miles()).abs() < 1e-9 {
            Ok(RaceDistance::HalfMarathon)
        } else {
            Err(PlanError::UnsupportedRaceDistance(miles))
        }
    }
}

/// Validated inputs for a plan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingInputs {
    pub current_weekly_mileage: f64,
    pub weeks_until_race: i64,
    pub race_distance: RaceDistance,
}

/// Summary numbers shown alongside a plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyInsights {
    pub current_weekly_mileage: f64,
    pub weeks_until_race: i64,
    pub target_peak_mileage: f64,
    pub suggested_weekly_increase: f64,
}

/// Round to one decimal place for presentation.
///
/// Goes through `{:.1}` so every output (console, CSV, JSON) agrees on ties:
/// an exact half rounds to even, `20.25` -> `20.2`.
pub fn round1(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// Whole weeks from `today` until `race_date`, floored (negative once the race has passed)
pub fn weeks_between(today: NaiveDate, race_date: NaiveDate) -> i64 {
    (race_date - today).num_days().div_euclid(7)
}

/// Half-marathon plan generator
#[derive(Debug, Clone)]
pub struct TrainingPlanGenerator {
    current_weekly_mileage: f64,
    race_date: NaiveDate,
    race_distance: f64,
    weeks_until_race: i64,
}

impl TrainingPlanGenerator {
    /// Create a generator. Nothing is validated here; `generate_plan` and
    /// `strategy_insights` report bad inputs.
    pub fn new(
        current_weekly_mileage: f64,
        race_date: NaiveDate,
        race_distance: f64,
        today: NaiveDate,
    ) -> Self {
        Self {
            current_weekly_mileage,
            race_date,
            race_distance,
            weeks_until_race: weeks_between(today, race_date),
        }
    }

    pub fn current_weekly_mileage(&self) -> f64 {
        self.current_weekly_mileage
    }

    pub fn race_date(&self) -> NaiveDate {
        self.race_date
    }

    pub fn weeks_until_race(&self) -> i64 {
        self.weeks_until_race
    }

    /// min(current * 1.5, 50)
    pub fn target_peak_mileage(&self) -> f64 {
        (self.current_weekly_mileage * PEAK_GROWTH).min(PEAK_CAP)
    }

    /// Linear build increment spread over every week except the last three
    pub fn weekly_increase(&self) -> Result<f64, PlanError> {
        self.check_mileage()?;
        let build_weeks = self.build_weeks()?;
        Ok((self.target_peak_mileage() - self.current_weekly_mileage) / build_weeks as f64)
    }

    /// Validate everything and return the plan inputs
    pub fn inputs(&self) -> Result<TrainingInputs, PlanError> {
        let race_distance = RaceDistance::from_miles(self.race_distance)?;
        self.check_mileage()?;
        self.build_weeks()?;

        Ok(TrainingInputs {
            current_weekly_mileage: self.current_weekly_mileage,
            weeks_until_race: self.weeks_until_race,
            race_distance,
        })
    }

    /// Generate the full plan, one entry per week until race day
    pub fn generate_plan(&self) -> Result<Vec<WeekPlan>, PlanError> {
        let inputs = self.inputs()?;
        let ramp = Ramp {
            start: inputs.current_weekly_mileage,
            increase: self.weekly_increase()?,
            peak: self.target_peak_mileage(),
        };

        info!(
            weeks = inputs.weeks_until_race,
            current = inputs.current_weekly_mileage,
            peak = ramp.peak,
            "Generating half marathon plan"
        );

        let plan = (1..=inputs.weeks_until_race)
            .map(|week| {
                let phase = WeekPhase::classify(week, inputs.weeks_until_race);
                let mileage = phase.mileage(week, &ramp);
                debug!(week, %phase, mileage, "Planned week");
                self.generate_week_plan(week as u32, mileage)
            })
            .collect();

        Ok(plan)
    }

    /// Lay out a single week with the given total mileage
    pub fn generate_week_plan(&self, week_number: u32, weekly_mileage: f64) -> WeekPlan {
        WeekPlan::build(week_number, weekly_mileage)
    }

    /// Phase of a week in this plan
    pub fn phase_of(&self, week_number: u32) -> WeekPhase {
        WeekPhase::classify(week_number as i64, self.weeks_until_race)
    }

    pub fn strategy_insights(&self) -> Result<StrategyInsights, PlanError> {
        let increase = self.weekly_increase()?;
        Ok(StrategyInsights {
            current_weekly_mileage: round1(self.current_weekly_mileage),
            weeks_until_race: self.weeks_until_race,
            target_peak_mileage: round1(self.target_peak_mileage()),
            suggested_weekly_increase: round1(increase),
        })
    }

    fn check_mileage(&self) -> Result<(), PlanError> {
        if !self.current_weekly_mileage.is_finite() || self.current_weekly_mileage < 0.0 {
            return Err(PlanError::InvalidMileage(self.current_weekly_mileage));
        }
        Ok(())
    }

    fn build_weeks(&self) -> Result<i64, PlanError> {
        if self.weeks_until_race <= RESERVED_WEEKS {
            return Err(PlanError::InsufficientLeadTime {
                weeks: self.weeks_until_race,
            });
        }
        Ok(self.weeks_until_race - RESERVED_WEEKS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    const HALF: f64 = 13.1;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
    }

    fn generator(current: f64, weeks: i64) -> TrainingPlanGenerator {
        let race = today() + chrono::Duration::days(weeks * 7);
        TrainingPlanGenerator::new(current, race, HALF, today())
    }

    #[test]
    fn test_weeks_until_race_floors() {
        let race = NaiveDate::from_ymd_opt(2024, 11, 28).unwrap();
        // 88 days
        let g = TrainingPlanGenerator::new(20.0, race, HALF, today());
        assert_eq!(g.weeks_until_race(), 12);
    }

    #[test]
    fn test_weeks_until_race_in_the_past() {
        let race = today() - chrono::Duration::days(1);
        assert_eq!(weeks_between(today(), race), -1);
        assert_eq!(weeks_between(today(), today()), 0);
    }

    #[test]
    fn test_plan_has_one_entry_per_week() {
        for weeks in [4, 5, 10, 16, 52] {
            for current in [0.0, 12.5, 20.0, 45.0] {
                let plan = generator(current, weeks).generate_plan().unwrap();
                assert_eq!(plan.len() as i64, weeks);
                for (i, week) in plan.iter().enumerate() {
                    assert_eq!(week.week_number as usize, i + 1);
                }
            }
        }
    }

    #[test]
    fn test_peak_week_equals_target_exactly() {
        for current in [0.0, 10.0, 20.0, 33.4, 40.0, 80.0] {
            let g = generator(current, 12);
            let plan = g.generate_plan().unwrap();
            let expected = (current * 1.5).min(50.0);
            assert_eq!(plan[9].total_mileage, expected);
            assert_eq!(g.phase_of(10), WeekPhase::Peak);
        }
    }

    #[test]
    fn test_taper_and_race_week_factors() {
        for current in [5.0, 20.0, 36.0] {
            let plan = generator(current, 8).generate_plan().unwrap();
            let peak = plan[5].total_mileage;
            assert_eq!(plan[6].total_mileage, peak * 0.8);
            assert_eq!(plan[7].total_mileage, peak * 0.6);
        }
    }

    #[test]
    fn test_build_phase_is_monotonic_when_below_target() {
        let plan = generator(18.0, 14).generate_plan().unwrap();
        for pair in plan[..11].windows(2) {
            assert!(pair[1].total_mileage > pair[0].total_mileage);
        }
    }

    #[test]
    fn test_every_week_adds_up() {
        let plan = generator(20.0, 10).generate_plan().unwrap();
        for week in &plan {
            assert!((week.planned_miles() - week.total_mileage).abs() < 1e-9);
        }
    }

    #[test]
    fn test_run_count_depends_on_mileage() {
        let plan = generator(15.0, 10).generate_plan().unwrap();
        for week in &plan {
            let midweek_runs = week
                .days
                .iter()
                .filter(|(day, a)| *day != Weekday::Sun && a.is_run())
                .count();
            if week.total_mileage < 20.0 {
                assert_eq!(midweek_runs, 1, "week {}", week.week_number);
            } else {
                assert_eq!(midweek_runs, 2, "week {}", week.week_number);
            }
        }
    }

    #[test]
    fn test_scenario_twenty_miles_ten_weeks() {
        let g = generator(20.0, 10);
        assert_eq!(g.target_peak_mileage(), 30.0);

        let increase = g.weekly_increase().unwrap();
        assert!((increase - 1.4286).abs() < 1e-4);

        let plan = g.generate_plan().unwrap();
        assert!((plan[0].total_mileage - 21.4286).abs() < 1e-4);
        assert_eq!(plan[7].total_mileage, 30.0);
        assert!((plan[8].total_mileage - 24.0).abs() < 1e-9);
        assert!((plan[9].total_mileage - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_week_one_quirk_starts_one_increment_up() {
        // Build weeks are indexed absolutely, so week 1 never equals current mileage
        let g = generator(20.0, 10);
        let plan = g.generate_plan().unwrap();
        let increase = g.weekly_increase().unwrap();
        assert!((plan[0].total_mileage - (20.0 + increase)).abs() < 1e-9);
        // The last build week lands on the peak value
        assert!((plan[6].total_mileage - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_three_weeks_is_insufficient_lead_time() {
        let g = generator(20.0, 3);
        assert_eq!(
            g.generate_plan().unwrap_err(),
            PlanError::InsufficientLeadTime { weeks: 3 }
        );
        assert_eq!(
            g.weekly_increase().unwrap_err(),
            PlanError::InsufficientLeadTime { weeks: 3 }
        );
        assert!(g.strategy_insights().is_err());
    }

    #[test]
    fn test_past_race_is_insufficient_lead_time() {
        let g = generator(20.0, -2);
        assert_eq!(
            g.generate_plan().unwrap_err(),
            PlanError::InsufficientLeadTime { weeks: -2 }
        );
    }

    #[test]
    fn test_marathon_distance_is_unsupported() {
        let race = today() + chrono::Duration::days(70);
        let g = TrainingPlanGenerator::new(20.0, race, 26.2, today());
        assert_eq!(
            g.generate_plan().unwrap_err(),
            PlanError::UnsupportedRaceDistance(26.2)
        );
    }

    #[test]
    fn test_distance_is_checked_before_lead_time() {
        let race = today() + chrono::Duration::days(7);
        let g = TrainingPlanGenerator::new(20.0, race, 26.2, today());
        assert!(matches!(
            g.generate_plan(),
            Err(PlanError::UnsupportedRaceDistance(_))
        ));
    }

    #[test]
    fn test_negative_mileage_is_rejected() {
        assert_eq!(
            generator(-1.0, 10).generate_plan().unwrap_err(),
            PlanError::InvalidMileage(-1.0)
        );
        assert!(generator(f64::NAN, 10).generate_plan().is_err());
    }

    #[test]
    fn test_empty_history_gives_valid_zero_plan() {
        let plan = generator(0.0, 6).generate_plan().unwrap();
        assert_eq!(plan.len(), 6);
        assert!(plan.iter().all(|w| w.total_mileage == 0.0));
        assert!(plan.iter().all(|w| w.run_count() == 2));
    }

    #[test]
    fn test_peak_is_capped_at_fifty() {
        let g = generator(40.0, 10);
        assert_eq!(g.target_peak_mileage(), 50.0);
        let insights = g.strategy_insights().unwrap();
        assert_eq!(insights.target_peak_mileage, 50.0);
        assert_eq!(insights.suggested_weekly_increase, 1.4);
    }

    #[test]
    fn test_high_mileage_runner_ramps_down_to_cap() {
        let g = generator(80.0, 10);
        let plan = g.generate_plan().unwrap();
        assert!(g.weekly_increase().unwrap() < 0.0);
        assert_eq!(plan[7].total_mileage, 50.0);
    }

    #[test]
    fn test_strategy_insights_rounding() {
        let insights = generator(20.04, 10).strategy_insights().unwrap();
        assert_eq!(insights.current_weekly_mileage, 20.0);
        assert_eq!(insights.weeks_until_race, 10);
        assert_eq!(insights.target_peak_mileage, 30.1);
        assert_eq!(insights.suggested_weekly_increase, 1.4);

        let json = serde_json::to_value(&insights).unwrap();
        assert_eq!(json["weeks_until_race"], 10);
        assert_eq!(json["suggested_weekly_increase"], 1.4);
    }

    #[test]
    fn test_race_distance_from_miles() {
        assert_eq!(RaceDistance::from_miles(13.1), Ok(RaceDistance::HalfMarathon));
        assert!(RaceDistance::from_miles(6.2).is_err());
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(21.428_571), 21.4);
        assert_eq!(round1(8.571_428), 8.6);
        assert_eq!(round1(0.0), 0.0);
        // Exact halves go to even, the same as `{:.1}`
        assert_eq!(round1(20.25), 20.2);
        assert_eq!(round1(0.75), 0.8);
        assert_eq!(round1(-1.25), -1.2);
    }

    #[test]
    fn test_insights_round_ties_like_text() {
        let insights = generator(20.25, 10).strategy_insights().unwrap();
        assert_eq!(insights.current_weekly_mileage, 20.2);
        assert_eq!(
            format!("{:.1}", 20.25),
            insights.current_weekly_mileage.to_string()
        );
        assert_eq!(insights.target_peak_mileage, 30.4);
    }
}
