//! runlog - Personal running log analysis and half-marathon training planner

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use runlog::analysis::{Analytics, Period};
use runlog::charts;
use runlog::history::RunLog;
use runlog::report;
use runlog::strategy::TrainingPlanGenerator;
use runlog::tui::App;

#[derive(Parser)]
#[command(name = "runlog")]
#[command(author, version, about = "Running log analysis and half-marathon training planner")]
struct Cli {
    /// JSON run log
    #[arg(short, long, global = true, env = "RUNLOG_FILE", default_value = "runs.json")]
    log: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct RaceArgs {
    /// Race day (YYYY-MM-DD)
    #[arg(short, long, env = "RUNLOG_RACE_DATE")]
    race_date: NaiveDate,

    /// Race distance in miles (only 13.1 is supported)
    #[arg(short, long, default_value = "13.1")]
    distance: f64,

    /// Plan as if today were this date (defaults to the local date)
    #[arg(long)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a tab-separated watch export to a JSON run log
    Convert {
        /// Export file
        input: PathBuf,

        /// JSON file to write
        output: PathBuf,
    },

    /// Print streaks, trend, pace and distance insights as JSON
    Insights {
        /// Also save insights to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show period totals and year-over-year pace
    Stats {
        /// Aggregate by "month" or "year"
        #[arg(short, long, default_value = "month")]
        period: Period,

        /// Shortest run to compare (miles)
        #[arg(long, default_value = "0")]
        min_distance: f64,

        /// Longest run to compare (miles)
        #[arg(long, default_value = "5")]
        max_distance: f64,

        /// Only compare runs whose title contains this
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Save SVG charts of distance, run counts and pace
    Charts {
        /// Directory for the chart files
        #[arg(short, long, default_value = "plots")]
        dir: PathBuf,
    },

    /// Generate a training plan for an upcoming race
    Plan {
        #[command(flatten)]
        race: RaceArgs,

        /// Export the plan as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Open TUI dashboard with recent mileage and the plan
    Dashboard {
        #[command(flatten)]
        race: RaceArgs,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_analytics(path: &Path) -> Result<Analytics> {
    let log = RunLog::open(path)
        .with_context(|| format!("reading run log {}", path.display()))?;
    Ok(Analytics::new(log.into_runs()))
}

fn build_generator(analytics: &Analytics, race: &RaceArgs) -> TrainingPlanGenerator {
    let today = race.today.unwrap_or_else(|| Local::now().date_naive());
    let mileage = analytics.current_weekly_mileage(today);
    info!(%today, mileage, "Current weekly mileage");
    TrainingPlanGenerator::new(mileage, race.race_date, race.distance, today)
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert { input, output }) => {
            let file = File::open(&input)
                .with_context(|| format!("opening {}", input.display()))?;
            let (log, summary) = RunLog::from_export(BufReader::new(file))?;
            log.save(&output)?;
            println!("Conversion complete. JSON data written to {}", output.display());
            println!(
                "Total entries processed: {} ({} skipped)",
                summary.imported, summary.skipped
            );
        }

        Some(Commands::Insights { output }) => {
            let analytics = load_analytics(&cli.log)?;
            let insights = match output {
                Some(path) => {
                    let insights = analytics.save_insights(&path)?;
                    info!(path = %path.display(), "Insights saved");
                    insights
                }
                None => analytics.generate_insights(),
            };
            println!("{}", serde_json::to_string_pretty(&insights)?);
        }

        Some(Commands::Stats {
            period,
            min_distance,
            max_distance,
            title,
        }) => {
            let analytics = load_analytics(&cli.log)?;

            println!("Totals");
            print!("{}", report::format_aggregates(&analytics.aggregate_by_period(period)));
            println!();

            println!("Pace comparison ({:.1}-{:.1} mi)", min_distance, max_distance);
            let performance =
                analytics.compare_performance(min_distance, max_distance, title.as_deref());
            print!("{}", report::format_performance(&performance));
        }

        Some(Commands::Charts { dir }) => {
            let analytics = load_analytics(&cli.log)?;
            let written = charts::save_charts(&analytics, &dir)?;
            for path in &written {
                println!("Chart saved as {}", path.display());
            }
            println!("All charts have been saved in {}", dir.display());
        }

        Some(Commands::Plan { race, csv }) => {
            let analytics = load_analytics(&cli.log)?;
            let generator = build_generator(&analytics, &race);

            let plan = generator.generate_plan()?;
            let insights = generator.strategy_insights()?;

            print!("{}", report::format_strategy(&insights));
            println!();
            print!("{}", report::format_plan(&plan));

            if let Some(path) = csv {
                report::save_plan_csv(&plan, &path)?;
                println!("Plan exported to {}", path.display());
            }
        }

        Some(Commands::Dashboard { race }) => {
            let analytics = load_analytics(&cli.log)?;
            let generator = build_generator(&analytics, &race);

            let plan = generator.generate_plan()?;
            let insights = generator.strategy_insights()?;
            let history = runlog::analysis::trend::weekly_totals(analytics.runs());

            let mut app = App::new(history, plan, insights);
            app.run()?;
        }

        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
