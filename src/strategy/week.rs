//! One week of the plan: total mileage split into a long run and midweek runs

use chrono::Weekday;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::round1;
use crate::workouts::{Activity, WEEK_DAYS, day_name};

/// Share of the weekly mileage that goes to the Sunday long run
pub const LONG_RUN_SHARE: f64 = 0.4;

/// Below this many miles a week only gets one midweek run
pub const THREE_RUN_THRESHOLD: f64 = 20.0;

/// A single planned week
#[derive(Debug, Clone, PartialEq)]
pub struct WeekPlan {
    pub week_number: u32,
    /// Unrounded total mileage
    pub total_mileage: f64,
    pub days: [(Weekday, Activity); 7],
}

impl WeekPlan {
    /// Lay out a week with the given total mileage.
    ///
    /// The long run is always 40% on Sunday. Low-mileage weeks (< 20 miles)
    /// put the rest into a single Wednesday speed session; otherwise it is
    /// split evenly between an easy Tuesday and a Thursday speed session.
    pub fn build(week_number: u32, weekly_mileage: f64) -> Self {
        let long_run = weekly_mileage * LONG_RUN_SHARE;
        let remaining = weekly_mileage - long_run;

        let midweek = if weekly_mileage < THREE_RUN_THRESHOLD {
            [
                Activity::Rest,
                Activity::Rest,
                Activity::SpeedWork { miles: remaining },
                Activity::CrossTrainingOrRest,
            ]
        } else {
            let half = remaining / 2.0;
            [
                Activity::Rest,
                Activity::Easy { miles: half },
                Activity::CrossTrainingOrRest,
                Activity::SpeedWork { miles: half },
            ]
        };

        let activities = [
            midweek[0],
            midweek[1],
            midweek[2],
            midweek[3],
            Activity::Rest,
            Activity::RestOrCrossTraining,
            Activity::LongRun { miles: long_run },
        ];

        let mut days = [(Weekday::Mon, Activity::Rest); 7];
        for (slot, (day, activity)) in days.iter_mut().zip(WEEK_DAYS.into_iter().zip(activities)) {
            *slot = (day, activity);
        }

        Self {
            week_number,
            total_mileage: weekly_mileage,
            days,
        }
    }

    pub fn activity(&self, day: Weekday) -> Activity {
        self.days[day.num_days_from_monday() as usize].1
    }

    /// Sunday long run distance
    pub fn long_run(&self) -> f64 {
        self.activity(Weekday::Sun).miles()
    }

    /// Number of running days, long run included
    pub fn run_count(&self) -> usize {
        self.days.iter().filter(|(_, a)| a.is_run()).count()
    }

    /// Sum of all planned run distances (equals the weekly total)
    pub fn planned_miles(&self) -> f64 {
        self.days.iter().map(|(_, a)| a.miles()).sum()
    }
}

// {"Week": 1, "Total Mileage": 21.4, "Monday": "Rest", ...}
impl Serialize for WeekPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(9))?;
        map.serialize_entry("Week", &self.week_number)?;
        map.serialize_entry("Total Mileage", &round1(self.total_mileage))?;
        for (day, activity) in &self.days {
            map.serialize_entry(day_name(*day), activity)?;
        }
        map.end()
    }
}
