//! Workout vocabulary - what a single day of a training week looks like

use std::fmt;

use chrono::Weekday;
use serde::{Serialize, Serializer};

/// Days of a training week, Monday first. The long run always lands on the last one.
pub const WEEK_DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English day name ("Monday") for table headers and CSV columns
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// What to do on a given day. Distances are kept unrounded and only
/// rounded to one decimal when rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activity {
    Rest,
    CrossTrainingOrRest,
    RestOrCrossTraining,
    Easy { miles: f64 },
    SpeedWork { miles: f64 },
    LongRun { miles: f64 },
}

impl Activity {
    /// Distance run on this day (0 for rest / cross-training days)
    pub fn miles(&self) -> f64 {
        match self {
            Activity::Easy { miles }
            | Activity::SpeedWork { miles }
            | Activity::LongRun { miles } => *miles,
            _ => 0.0,
        }
    }

    pub fn is_run(&self) -> bool {
        matches!(
            self,
            Activity::Easy { .. } | Activity::SpeedWork { .. } | Activity::LongRun { .. }
        )
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activity::Rest => write!(f, "Rest"),
            Activity::CrossTrainingOrRest => write!(f, "Cross-training or rest"),
            Activity::RestOrCrossTraining => write!(f, "Rest or cross-training"),
            Activity::Easy { miles } => write!(f, "{:.1} miles easy", miles),
            Activity::SpeedWork { miles } => write!(f, "{:.1} miles with speed work", miles),
            Activity::LongRun { miles } => write!(f, "{:.1} miles long run", miles),
        }
    }
}

// Serialized as the same text shown in the console and CSV
impl Serialize for Activity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
