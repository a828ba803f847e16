//! Periodization: which part of the cycle a week belongs to and how far to run in it

use std::fmt;

use serde::Serialize;

/// Taper week runs at 80% of peak
pub const TAPER_FACTOR: f64 = 0.8;
/// Race week runs at 60% of peak
pub const RACE_WEEK_FACTOR: f64 = 0.6;

/// Linear ramp parameters shared by every week of a plan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    pub start: f64,
    pub increase: f64,
    pub peak: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekPhase {
    Build,
    Peak,
    Taper,
    RaceWeek,
}

impl WeekPhase {
    /// Classify week `week` (1-based) of a plan that is `weeks_until_race` long.
    /// The last three weeks are always peak, taper and race week.
    pub fn classify(week: i64, weeks_until_race: i64) -> Self {
        if week < weeks_until_race - 2 {
            WeekPhase::Build
        } else if week == weeks_until_race - 2 {
            WeekPhase::Peak
        } else if week == weeks_until_race - 1 {
            WeekPhase::Taper
        } else {
            WeekPhase::RaceWeek
        }
    }

    /// Total mileage for the week.
    ///
    /// Build weeks use the absolute week index (`start + increase * week`),
    /// so week 1 is already one increment above the starting mileage.
    pub fn mileage(self, week: i64, ramp: &Ramp) -> f64 {
        match self {
            WeekPhase::Build => ramp.start + ramp.increase * week as f64,
            WeekPhase::Peak => ramp.peak,
            WeekPhase::Taper => ramp.peak * TAPER_FACTOR,
            WeekPhase::RaceWeek => ramp.peak * RACE_WEEK_FACTOR,
        }
    }
}

impl fmt::Display for WeekPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekPhase::Build => write!(f, "build"),
            WeekPhase::Peak => write!(f, "peak"),
            WeekPhase::Taper => write!(f, "taper"),
            WeekPhase::RaceWeek => write!(f, "race week"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Ramp {
        Ramp {
            start: 20.0,
            increase: 10.0 / 7.0,
            peak: 30.0,
        }
    }

    #[test]
    fn test_classify_ten_week_plan() {
        let phases: Vec<_> = (1..=10).map(|w| WeekPhase::classify(w, 10)).collect();

        assert!(phases[..7].iter().all(|p| *p == WeekPhase::Build));
        assert_eq!(phases[7], WeekPhase::Peak);
        assert_eq!(phases[8], WeekPhase::Taper);
        assert_eq!(phases[9], WeekPhase::RaceWeek);
    }

    #[test]
    fn test_classify_shortest_plan() {
        assert_eq!(WeekPhase::classify(1, 4), WeekPhase::Build);
        assert_eq!(WeekPhase::classify(2, 4), WeekPhase::Peak);
        assert_eq!(WeekPhase::classify(3, 4), WeekPhase::Taper);
        assert_eq!(WeekPhase::classify(4, 4), WeekPhase::RaceWeek);
    }

    #[test]
    fn test_build_uses_absolute_week_index() {
        let r = ramp();
        let week1 = WeekPhase::Build.mileage(1, &r);
        let week3 = WeekPhase::Build.mileage(3, &r);

        assert!((week1 - 21.428_571).abs() < 1e-4);
        assert!((week3 - (20.0 + 3.0 * 10.0 / 7.0)).abs() < 1e-9);
    }

    #[test]
    fn test_peak_taper_race_week() {
        let r = ramp();
        assert_eq!(WeekPhase::Peak.mileage(8, &r), 30.0);
        assert_eq!(WeekPhase::Taper.mileage(9, &r), 30.0 * 0.8);
        assert_eq!(WeekPhase::RaceWeek.mileage(10, &r), 30.0 * 0.6);
    }

    #[test]
    fn test_display() {
        assert_eq!(WeekPhase::RaceWeek.to_string(), "race week");
        assert_eq!(WeekPhase::Build.to_string(), "build");
    }
}
