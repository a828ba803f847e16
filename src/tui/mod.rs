//! TUI module - Terminal dashboard with ratatui

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table},
};
use std::io::{stdout, Stdout};

use crate::analysis::WeeklyMileage;
use crate::strategy::{StrategyInsights, WeekPhase, WeekPlan};
use crate::workouts::{WEEK_DAYS, day_name};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Weeks of history shown in the chart
const CHART_WEEKS: usize = 12;

/// App state for TUI
pub struct App {
    history: Vec<WeeklyMileage>,
    plan: Vec<WeekPlan>,
    insights: StrategyInsights,
    scroll: usize,
    should_quit: bool,
}

impl App {
    pub fn new(
        history: Vec<WeeklyMileage>,
        plan: Vec<WeekPlan>,
        insights: StrategyInsights,
    ) -> Self {
        Self {
            history,
            plan,
            insights,
            scroll: 0,
            should_quit: false,
        }
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }

        restore_terminal()?;
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(10),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let header = Paragraph::new(format!(
            "runlog - {} weeks to race | now {:.1} mi/wk | peak {:.1} mi | {:+.1} mi/wk",
            self.insights.weeks_until_race,
            self.insights.current_weekly_mileage,
            self.insights.target_peak_mileage,
            self.insights.suggested_weekly_increase,
        ))
        .style(Style::default().fg(Color::Cyan).bold())
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        // Recent weekly mileage
        let skip = self.history.len().saturating_sub(CHART_WEEKS);
        let bars: Vec<Bar> = self.history[skip..]
            .iter()
            .map(|w| {
                Bar::default()
                    .value(w.distance.round().max(0.0) as u64)
                    .label(Line::from(w.start.format("%m/%d").to_string()))
            })
            .collect();
        let chart = BarChart::default()
            .block(Block::default().borders(Borders::ALL).title("Weekly mileage"))
            .data(BarGroup::default().bars(&bars))
            .bar_width(5)
            .bar_gap(1);
        frame.render_widget(chart, chunks[1]);

        // Plan table
        let weeks = self.plan.len() as i64;
        let rows: Vec<Row> = self
            .plan
            .iter()
            .skip(self.scroll)
            .map(|w| {
                let phase = WeekPhase::classify(w.week_number as i64, weeks);
                let mut cells = vec![
                    Cell::from(w.week_number.to_string()),
                    Cell::from(phase.to_string()),
                    Cell::from(format!("{:.1}", w.total_mileage)),
                ];
                cells.extend(w.days.iter().map(|(_, a)| Cell::from(a.to_string())));
                Row::new(cells)
            })
            .collect();

        let mut header_cells = vec!["Week", "Phase", "Miles"];
        header_cells.extend(WEEK_DAYS.iter().map(|d| day_name(*d)));

        let mut widths = vec![
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Length(6),
        ];
        widths.extend(std::iter::repeat_n(Constraint::Min(12), WEEK_DAYS.len()));

        let table = Table::new(rows, widths)
            .header(Row::new(header_cells).style(Style::default().bold()))
            .block(Block::default().borders(Borders::ALL).title("Training plan"));

        frame.render_widget(table, chunks[2]);

        // Footer
        let footer = Paragraph::new("q: quit | ↑/↓: scroll")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[3]);
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => {
                if self.scroll + 1 < self.plan.len() {
                    self.scroll += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            self.handle_key(key.code);
        }
        Ok(())
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
