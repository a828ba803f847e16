//! Run history - JSON storage and import of raw watch exports

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::Path;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Date part of an export date, after the weekday prefix ("Sat, 03/02/2024")
const EXPORT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Fields per export line: type, date, title, time, distance, elevation
const EXPORT_FIELDS: usize = 6;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid duration '{0}'")]
    InvalidDuration(String),
}

/// A single logged run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    #[serde(rename = "type")]
    pub run_type: String,
    pub date: NaiveDate,
    pub title: String,
    /// Elapsed time as recorded ("25:30", "1:02:30", "90s")
    pub time: String,
    /// Miles
    pub distance: f64,
    /// Feet
    pub elevation: i64,
}

impl Run {
    /// Elapsed time in minutes
    pub fn minutes(&self) -> Result<f64, LogError> {
        parse_duration_minutes(&self.time)
    }

    /// Pace in minutes per mile; None for zero distance or unreadable time
    pub fn pace(&self) -> Option<f64> {
        if self.distance <= 0.0 {
            return None;
        }
        self.minutes().ok().map(|m| m / self.distance)
    }
}

/// Convert a recorded time to minutes.
///
/// Accepts `"90s"`, `"45"` (minutes), `"25:30"` (m:s) and `"1:02:30"` (h:m:s).
pub fn parse_duration_minutes(time: &str) -> Result<f64, LogError> {
    let invalid = || LogError::InvalidDuration(time.to_string());
    let time = time.trim();

    if let Some(secs) = time.strip_suffix('s') {
        let secs: f64 = secs.trim().parse().map_err(|_| invalid())?;
        return Ok(secs / 60.0);
    }

    let parts: Vec<&str> = time.split(':').collect();
    match parts.as_slice() {
        [m] => m.parse::<f64>().map_err(|_| invalid()),
        [m, s] => {
            let m: u32 = m.parse().map_err(|_| invalid())?;
            let s: u32 = s.parse().map_err(|_| invalid())?;
            Ok(m as f64 + s as f64 / 60.0)
        }
        [h, m, s] => {
            let h: u32 = h.parse().map_err(|_| invalid())?;
            let m: u32 = m.parse().map_err(|_| invalid())?;
            let s: u32 = s.parse().map_err(|_| invalid())?;
            Ok(h as f64 * 60.0 + m as f64 + s as f64 / 60.0)
        }
        _ => Err(invalid()),
    }
}

/// "Sat, 03/02/2024". The weekday has to be a weekday name but is not
/// checked against the date; the watch sometimes gets it wrong.
fn parse_export_date(s: &str) -> Result<NaiveDate, String> {
    let (weekday, date) = s
        .split_once(", ")
        .ok_or_else(|| format!("invalid date '{}': missing weekday", s))?;
    weekday
        .parse::<Weekday>()
        .map_err(|_| format!("invalid date '{}': unknown weekday '{}'", s, weekday))?;
    NaiveDate::parse_from_str(date, EXPORT_DATE_FORMAT)
        .map_err(|e| format!("invalid date '{}': {}", s, e))
}

/// Parse one tab-separated export line, or say why it is unusable
fn parse_export_line(line: &str) -> Result<Run, String> {
    let fields: Vec<&str> = line.trim().split('\t').collect();
    if fields.len() != EXPORT_FIELDS {
        return Err(format!("expected {} fields, got {}", EXPORT_FIELDS, fields.len()));
    }

    let date = parse_export_date(fields[1])?;

    let first_token = |s: &str| s.split_whitespace().next().unwrap_or("").to_string();
    let distance: f64 = first_token(fields[4])
        .parse()
        .map_err(|_| format!("invalid distance '{}'", fields[4]))?;
    let elevation: i64 = first_token(fields[5])
        .parse()
        .map_err(|_| format!("invalid elevation '{}'", fields[5]))?;

    Ok(Run {
        run_type: fields[0].to_string(),
        date,
        title: fields[2].to_string(),
        time: fields[3].to_string(),
        distance,
        elevation,
    })
}

/// In-memory run log
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    runs: Vec<Run>,
}

/// Outcome of an export import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

impl RunLog {
    pub fn new(runs: Vec<Run>) -> Self {
        Self { runs }
    }

    /// Load a JSON array of runs
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LogError> {
        let file = File::open(path.as_ref())?;
        let runs: Vec<Run> = serde_json::from_reader(BufReader::new(file))?;
        info!(runs = runs.len(), path = %path.as_ref().display(), "Loaded run log");
        Ok(Self { runs })
    }

    /// Write the log as a pretty-printed JSON array
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), LogError> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.runs)?;
        Ok(())
    }

    /// Import a tab-separated watch export. Bad lines are logged and skipped.
    pub fn from_export<R: BufRead>(reader: R) -> Result<(Self, ImportSummary), LogError> {
        let mut runs = Vec::new();
        let mut skipped = 0;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            if line.trim().is_empty() {
                continue;
            }
            match parse_export_line(&line) {
                Ok(run) => runs.push(run),
                Err(reason) => {
                    warn!(line = line_number, "Skipping export line: {}", reason);
                    skipped += 1;
                }
            }
        }

        let summary = ImportSummary {
            imported: runs.len(),
            skipped,
        };
        Ok((Self { runs }, summary))
    }

    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn into_runs(self) -> Vec<Run> {
        self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
