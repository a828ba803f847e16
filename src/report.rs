//! Console and CSV rendering of plans and statistics

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::analysis::{PeriodAggregate, YearPerformance};
use crate::strategy::{StrategyInsights, WeekPhase, WeekPlan, round1};
use crate::workouts::{WEEK_DAYS, day_name};

/// Format minutes as hh:mm:ss
pub fn minutes_to_hms(minutes: f64) -> String {
    let total_secs = (minutes * 60.0).round() as i64;
    format!(
        "{:02}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    )
}

pub fn format_strategy(insights: &StrategyInsights) -> String {
    [
        "Strategy".to_string(),
        format!("{:-<40}", ""),
        format!("Current weekly mileage: {:.1} mi", insights.current_weekly_mileage),
        format!("Weeks until race:       {}", insights.weeks_until_race),
        format!("Target peak mileage:    {:.1} mi", insights.target_peak_mileage),
        format!("Weekly increase:        {:+.1} mi", insights.suggested_weekly_increase),
    ]
    .iter()
    .map(|line| format!("{}\n", line))
    .collect()
}

/// One block per week, e.g.
///
/// ```text
/// Week 8 (peak) - 30.0 miles
///   Monday     Rest
///   ...
/// ```
pub fn format_plan(plan: &[WeekPlan]) -> String {
    let weeks = plan.len() as i64;
    let mut out = String::new();
    for week in plan {
        let phase = WeekPhase::classify(week.week_number as i64, weeks);
        out.push_str(&format!(
            "Week {} ({}) - {:.1} miles\n",
            week.week_number, phase, week.total_mileage
        ));
        for (day, activity) in &week.days {
            out.push_str(&format!("  {:10} {}\n", day_name(*day), activity));
        }
    }
    out
}

/// Write the plan as CSV: Week, Total Mileage, Monday..Sunday
pub fn write_plan_csv<W: Write>(plan: &[WeekPlan], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec!["Week".to_string(), "Total Mileage".to_string()];
    header.extend(WEEK_DAYS.iter().map(|d| day_name(*d).to_string()));
    writer.write_record(&header)?;

    for week in plan {
        let mut record = vec![
            week.week_number.to_string(),
            format!("{:.1}", round1(week.total_mileage)),
        ];
        record.extend(week.days.iter().map(|(_, a)| a.to_string()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn save_plan_csv<P: AsRef<Path>>(plan: &[WeekPlan], path: P) -> Result<()> {
    let file = File::create(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    write_plan_csv(plan, file)
}

pub fn format_aggregates(aggregates: &[PeriodAggregate]) -> String {
    let mut out = format!(
        "{:10} | {:>9} | {:>10} | {:>9} | {:>8} | {:>5}\n{:-<67}\n",
        "Period", "Distance", "Time", "Elevation", "Pace", "Runs", ""
    );
    for a in aggregates {
        out.push_str(&format!(
            "{:10} | {:>9.1} | {:>10} | {:>9} | {:>8} | {:>5}\n",
            a.period,
            a.total_distance,
            minutes_to_hms(a.total_time),
            a.total_elevation,
            minutes_to_hms(a.avg_pace),
            a.num_runs
        ));
    }
    out
}

pub fn format_performance(performance: &[YearPerformance]) -> String {
    let mut out = format!(
        "{:6} | {:>8} | {:>8} | {:>8} | {:>5}\n{:-<47}\n",
        "Year", "Avg", "Median", "Best", "Runs", ""
    );
    for p in performance {
        out.push_str(&format!(
            "{:6} | {:>8} | {:>8} | {:>8} | {:>5}\n",
            p.year,
            minutes_to_hms(p.avg_pace),
            minutes_to_hms(p.median_pace),
            minutes_to_hms(p.best_pace),
            p.num_runs
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> Vec<WeekPlan> {
        vec![
            WeekPlan::build(1, 15.0),
            WeekPlan::build(2, 21.428_571),
            WeekPlan::build(3, 30.0),
            WeekPlan::build(4, 24.0),
            WeekPlan::build(5, 18.0),
        ]
    }

    #[test]
    fn test_minutes_to_hms() {
        assert_eq!(minutes_to_hms(62.5), "01:02:30");
        assert_eq!(minutes_to_hms(9.0), "00:09:00");
        assert_eq!(minutes_to_hms(0.0), "00:00:00");
    }

    #[test]
    fn test_format_plan_lists_phases() {
        let text = format_plan(&plan());
        assert!(text.contains("Week 1 (build) - 15.0 miles"), "{}", text);
        assert!(text.contains("Week 3 (peak) - 30.0 miles"), "{}", text);
        assert!(text.contains("Week 5 (race week) - 18.0 miles"), "{}", text);
        assert!(text.contains("Sunday     12.0 miles long run"), "{}", text);
    }

    #[test]
    fn test_format_strategy() {
        let insights = StrategyInsights {
            current_weekly_mileage: 20.0,
            weeks_until_race: 10,
            target_peak_mileage: 30.0,
            suggested_weekly_increase: 1.4,
        };
        let text = format_strategy(&insights);
        assert!(text.contains("Weeks until race:       10"));
        assert!(text.contains("+1.4 mi"));
    }

    #[test]
    fn test_plan_csv() {
        let mut buf = Vec::new();
        write_plan_csv(&plan(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Week,Total Mileage,Monday,Tuesday,Wednesday,Thursday,Friday,Saturday,Sunday"
        );
        assert_eq!(lines.len(), 6);
        assert_eq!(
            lines[2],
            "2,21.4,Rest,6.4 miles easy,Cross-training or rest,6.4 miles with speed work,Rest,Rest or cross-training,8.6 miles long run"
        );
    }

    #[test]
    fn test_half_tenth_total_matches_in_every_output() {
        let plan = vec![WeekPlan::build(1, 20.25)];

        let text = format_plan(&plan);
        assert!(text.contains(") - 20.2 miles"), "{}", text);

        let mut buf = Vec::new();
        write_plan_csv(&plan, &mut buf).unwrap();
        let csv = String::from_utf8(buf).unwrap();
        assert!(csv.lines().nth(1).unwrap().starts_with("1,20.2,"), "{}", csv);

        let json = serde_json::to_value(&plan[0]).unwrap();
        assert_eq!(json["Total Mileage"], 20.2);
    }

    #[test]
    fn test_save_plan_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.csv");
        save_plan_csv(&plan(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Week,Total Mileage"));
    }

    #[test]
    fn test_format_aggregates() {
        let aggregates = vec![PeriodAggregate {
            period: "2024-03".to_string(),
            total_distance: 9.0,
            total_time: 90.0,
            total_elevation: 150,
            avg_pace: 10.0,
            num_runs: 2,
        }];
        let text = format_aggregates(&aggregates);
        assert!(text.contains("2024-03"));
        assert!(text.contains("01:30:00"));
        assert!(text.contains("00:10:00"));
    }

    #[test]
    fn test_format_performance() {
        let performance = vec![YearPerformance {
            year: 2024,
            avg_pace: 9.5,
            median_pace: 9.25,
            best_pace: 8.0,
            num_runs: 3,
        }];
        let text = format_performance(&performance);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Year"));
        assert!(lines[2].contains("00:09:30"));
        assert!(lines[2].contains("00:08:00"));
    }
}
