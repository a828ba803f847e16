//! runlog - Personal running log analysis and half-marathon training planner

pub mod analysis;
pub mod charts;
pub mod history;
pub mod report;
pub mod strategy;
pub mod tui;
pub mod workouts;

pub use analysis::Analytics;
pub use history::{Run, RunLog};
pub use strategy::{PlanError, StrategyInsights, TrainingPlanGenerator, WeekPlan};
