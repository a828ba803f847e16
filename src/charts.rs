//! Charts module - SVG charts of the run log with plotters

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use tracing::info;

use crate::analysis::trend::weekly_totals;
use crate::analysis::{Analytics, Period, YearPerformance};

/// Size of every chart in pixels
pub const CHART_SIZE: (u32, u32) = (1280, 720);

/// Distance band of the runs compared on the pace chart
pub const PACE_COMPARISON_RANGE: (f64, f64) = (3.0, 3.5);

const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);
const AVG_PACE_COLOR: RGBColor = RGBColor(31, 119, 180);
const BEST_PACE_COLOR: RGBColor = RGBColor(255, 127, 14);

/// One bar per label
struct BarData<'a> {
    title: &'a str,
    x_desc: &'a str,
    y_desc: &'a str,
    labels: Vec<String>,
    values: Vec<f64>,
}

/// Write every chart of the log into `dir`, creating it if needed.
/// Returns the written files in drawing order.
pub fn save_charts<P: AsRef<Path>>(analytics: &Analytics, dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let monthly = analytics.aggregate_by_period(Period::Month);
    let yearly = analytics.aggregate_by_period(Period::Year);
    let weekly = weekly_totals(analytics.runs());
    let distribution = analytics.distance_distribution();
    let (min_distance, max_distance) = PACE_COMPARISON_RANGE;
    let performance = analytics.compare_performance(min_distance, max_distance, None);

    let bar_charts = [
        (
            "monthly_distance.svg",
            BarData {
                title: "Total Distance Run per Month",
                x_desc: "Month",
                y_desc: "Distance (miles)",
                labels: monthly.iter().map(|a| a.period.clone()).collect(),
                values: monthly.iter().map(|a| a.total_distance).collect(),
            },
        ),
        (
            "monthly_run_count.svg",
            BarData {
                title: "Number of Runs per Month",
                x_desc: "Month",
                y_desc: "Number of Runs",
                labels: monthly.iter().map(|a| a.period.clone()).collect(),
                values: monthly.iter().map(|a| a.num_runs as f64).collect(),
            },
        ),
        (
            "yearly_distance.svg",
            BarData {
                title: "Yearly Total Distance",
                x_desc: "Year",
                y_desc: "Distance (miles)",
                labels: yearly.iter().map(|a| a.period.clone()).collect(),
                values: yearly.iter().map(|a| a.total_distance).collect(),
            },
        ),
        (
            "weekly_mileage.svg",
            BarData {
                title: "Weekly Mileage",
                x_desc: "Week",
                y_desc: "Distance (miles)",
                labels: weekly
                    .iter()
                    .map(|w| w.start.format("%m/%d").to_string())
                    .collect(),
                values: weekly.iter().map(|w| w.distance).collect(),
            },
        ),
        (
            "distance_distribution.svg",
            BarData {
                title: "Run Distance Distribution",
                x_desc: "Distance Category",
                y_desc: "Number of Runs",
                labels: vec![
                    "0-3 mi".to_string(),
                    "3-5 mi".to_string(),
                    "5-10 mi".to_string(),
                    "10+ mi".to_string(),
                ],
                values: [
                    distribution.short,
                    distribution.medium,
                    distribution.long,
                    distribution.very_long,
                ]
                .iter()
                .map(|n| *n as f64)
                .collect(),
            },
        ),
    ];

    let mut written = Vec::new();
    for (file_name, data) in &bar_charts {
        let path = dir.join(file_name);
        let root = SVGBackend::new(&path, CHART_SIZE).into_drawing_area();
        draw_bar_chart(root, data).with_context(|| format!("drawing {}", path.display()))?;
        info!(path = %path.display(), "Chart saved");
        written.push(path);
    }

    let path = dir.join("pace_comparison.svg");
    let root = SVGBackend::new(&path, CHART_SIZE).into_drawing_area();
    draw_pace_chart(root, &performance)
        .with_context(|| format!("drawing {}", path.display()))?;
    info!(path = %path.display(), "Chart saved");
    written.push(path);

    Ok(written)
}

fn draw_bar_chart<DB>(root: DrawingArea<DB, Shift>, data: &BarData) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let bars = data.values.len().max(1);
    let y_max = data.values.iter().copied().fold(0.0, f64::max).max(1.0) * 1.1;

    let title_font = FontDesc::new(FontFamily::SansSerif, 28.0, FontStyle::Normal);
    let mut chart = ChartBuilder::on(&root)
        .caption(data.title, title_font)
        .margin(25)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .build_cartesian_2d(-0.5..bars as f64 - 0.5, 0.0..y_max)?;

    // Bars sit on whole numbers; other ticks stay blank
    let label_at = |x: &f64| {
        let i = x.round();
        if (x - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        data.labels.get(i as usize).cloned().unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars)
        .x_label_formatter(&label_at)
        .x_desc(data.x_desc)
        .y_desc(data.y_desc)
        .draw()?;

    chart.draw_series(data.values.iter().enumerate().map(|(i, v)| {
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *v)], BAR_COLOR.filled())
    }))?;

    root.present()?;
    Ok(())
}

fn draw_pace_chart<DB>(
    root: DrawingArea<DB, Shift>,
    performance: &[YearPerformance],
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let first_year = performance.first().map(|p| p.year).unwrap_or(0) as f64;
    let last_year = performance.last().map(|p| p.year).unwrap_or(0) as f64;
    let y_max = performance
        .iter()
        .map(|p| p.avg_pace)
        .fold(0.0, f64::max)
        .max(1.0)
        * 1.2;

    let title_font = FontDesc::new(FontFamily::SansSerif, 28.0, FontStyle::Normal);
    let mut chart = ChartBuilder::on(&root)
        .caption("Pace Comparison Across Years", title_font)
        .margin(25)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(first_year - 0.5..last_year + 0.5, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_labels(performance.len().max(1))
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| format!("{:.1}", v))
        .x_desc("Year")
        .y_desc("Pace (minutes/mile)")
        .draw()?;

    let series: [(&str, RGBColor, fn(&YearPerformance) -> f64); 2] = [
        ("Average Pace", AVG_PACE_COLOR, |p| p.avg_pace),
        ("Best Pace", BEST_PACE_COLOR, |p| p.best_pace),
    ];
    for (label, color, pace) in series {
        let points: Vec<(f64, f64)> = performance
            .iter()
            .map(|p| (p.year as f64, pace(p)))
            .collect();
        chart
            .draw_series(LineSeries::new(points.iter().copied(), &color))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], color));
        chart.draw_series(points.iter().map(|p| Circle::new(*p, 4, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.7))
        .border_style(&BLACK.mix(0.3))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(())
}
