use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::info;
use std::time::Duration;

use rota::clock::SystemClock;
use rota::config::RotaConfig;
use rota::db::{operations, seed};
use rota::logging::init_logger_with_target;
use rota::models::{CompleteSetInput, SessionView, TargetSet, WorkoutSummary};
use rota::WorkoutSessionManager;
use rota::store::{SqliteStore, WorkoutStore};

use crossterm::event::{self, KeyCode, KeyEventKind};
use ratatui::{
    DefaultTerminal,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

type Manager = WorkoutSessionManager<SqliteStore, SqliteStore>;

#[derive(Parser, Debug)]
#[command(version, about = "Rota - Workout Session CLI", long_about = None)]
struct Args {
    /// SQLite database file, overrides DATABASE_URL
    #[arg(long)]
    db: Option<String>,
    #[arg(short, long, default_value = "local")]
    user: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a demo template program with one workout
    Seed {
        /// Delete all existing data first
        #[arg(long)]
        reset: bool,
    },
    /// Print a workout template, or list all workouts
    Show { workout_id: Option<i64> },
    /// Run a live workout session
    Run {
        workout_id: i64,
        #[arg(long)]
        program_id: Option<i64>,
        #[arg(long)]
        template_program_id: Option<i64>,
    },
    /// List finished workouts
    History {
        #[arg(short, long)]
        verbose: bool,
    },
}

const KEY_HELP: &str =
    "j/k: move | space: complete | u: undo | p: pause | r: rest | s: stop rest | f: finish | c: cancel | q: quit";

/// One line of the session screen: a target set and the exercise it belongs to.
struct SetRow {
    exercise_id: i64,
    exercise_name: String,
    target: TargetSet,
}

struct LiveSession {
    manager: Manager,
    rows: Vec<SetRow>,
    selected: usize,
    status_message: String,
}

impl LiveSession {
    async fn start(
        mut manager: Manager,
        workout_id: i64,
        program_id: Option<i64>,
        template_program_id: Option<i64>,
    ) -> Result<Self> {
        let workout = manager
            .load_workout(workout_id, program_id, template_program_id)
            .await?;
        manager.begin_workout().await?;

        let rows = workout
            .exercises
            .into_iter()
            .flat_map(|exercise| {
                let exercise_id = exercise.exercise_id;
                let name = exercise.name;
                exercise.sets.into_iter().map(move |target| SetRow {
                    exercise_id,
                    exercise_name: name.clone(),
                    target,
                })
            })
            .collect();

        Ok(Self {
            manager,
            rows,
            selected: 0,
            status_message: KEY_HELP.to_string(),
        })
    }

    fn scroll_down(&mut self) {
        if !self.rows.is_empty() && self.selected < self.rows.len() - 1 {
            self.selected += 1;
        }
    }

    fn scroll_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    fn selected_row(&self) -> Option<&SetRow> {
        self.rows.get(self.selected)
    }

    async fn complete_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let input = CompleteSetInput::from_target(row.exercise_id, &row.target);
        let name = row.exercise_name.clone();
        self.status_message = match self.manager.complete_set(input).await {
            Ok(set) => {
                self.scroll_down();
                format!("Completed {}: {}", name, set)
            }
            Err(e) => format!("Error: {}", e),
        };
    }

    async fn uncomplete_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let exercise_set_id = row.target.id;
        self.status_message = match self.manager.uncomplete_set(exercise_set_id).await {
            Ok(true) => "Set marked as not done".to_string(),
            Ok(false) => "Set was not completed".to_string(),
            Err(e) => format!("Error: {}", e),
        };
    }

    fn toggle_pause(&mut self) {
        self.status_message = match self.manager.toggle_pause() {
            Ok(true) => "Paused".to_string(),
            Ok(false) => "Resumed".to_string(),
            Err(e) => format!("Error: {}", e),
        };
    }

    fn rest_for_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let exercise_set_id = row.target.id;
        self.status_message = match self.manager.start_rest_for_set(exercise_set_id) {
            Ok(seconds) => format!("Resting for {}s", seconds),
            Err(e) => format!("Error: {}", e),
        };
    }

    fn render_row(&self, idx: usize, row: &SetRow, view: &SessionView) -> ListItem<'static> {
        let done = view
            .completed_sets
            .iter()
            .find(|set| set.exercise_set_id == row.target.id);
        let mark = if done.is_some() { "[x]" } else { "[ ]" };
        let actual = done.map(|set| format!("  ({})", set)).unwrap_or_default();
        let content = format!("{} {} - {}{}", mark, row.exercise_name, row.target, actual);

        let style = if idx == self.selected {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if done.is_some() {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        };
        ListItem::new(content).style(style)
    }
}

fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

async fn run_live_session(
    mut terminal: DefaultTerminal,
    session: &mut LiveSession,
) -> Result<Option<WorkoutSummary>> {
    loop {
        let view = session.manager.view();
        terminal.draw(|frame| {
            let chunks = Layout::vertical([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(frame.area());

            // Header
            let name = view
                .workout
                .as_ref()
                .map(|w| w.name.clone())
                .unwrap_or_default();
            let state = if view.is_paused { "  PAUSED" } else { "" };
            let header = Paragraph::new(format!(
                "{}  {}  {}/{} sets{}",
                name,
                format_elapsed(view.elapsed_seconds),
                view.progress.completed_sets,
                view.progress.total_sets,
                state
            ))
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(header, chunks[0]);

            // Target sets
            let items: Vec<ListItem> = session
                .rows
                .iter()
                .enumerate()
                .map(|(idx, row)| session.render_row(idx, row, &view))
                .collect();
            let list = List::new(items).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Sets ({} total)", session.rows.len())),
            );
            let mut list_state = ListState::default();
            list_state.select(Some(session.selected));
            frame.render_stateful_widget(list, chunks[1], &mut list_state);

            // Rest countdown
            let (rest_text, rest_style) = if view.rest.active {
                (
                    format!("Rest: {}s", view.rest.remaining_seconds),
                    Style::default().fg(Color::Yellow),
                )
            } else {
                ("Not resting".to_string(), Style::default().fg(Color::Gray))
            };
            let rest = Paragraph::new(rest_text)
                .style(rest_style)
                .block(Block::default().borders(Borders::ALL).title("Rest"));
            frame.render_widget(rest, chunks[2]);

            // Footer with status
            let footer = Paragraph::new(session.status_message.as_str())
                .style(Style::default().fg(Color::White))
                .block(Block::default().borders(Borders::ALL).title("Status"));
            frame.render_widget(footer, chunks[3]);
        })?;

        // Poll so the clock and rest countdown keep redrawing without input.
        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let event::Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                if session.manager.is_workout_started() {
                    session.manager.cancel_workout().await;
                }
                return Ok(None);
            }
            KeyCode::Char('j') | KeyCode::Down => session.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => session.scroll_up(),
            KeyCode::Char(' ') | KeyCode::Enter => session.complete_selected().await,
            KeyCode::Char('u') => session.uncomplete_selected().await,
            KeyCode::Char('p') => session.toggle_pause(),
            KeyCode::Char('r') => session.rest_for_selected(),
            KeyCode::Char('s') => {
                session.manager.stop_rest_timer();
                session.status_message = "Rest stopped".to_string();
            }
            KeyCode::Char('f') => match session.manager.finish_workout().await {
                Ok(summary) => return Ok(Some(summary)),
                Err(e) => session.status_message = format!("Error: {}", e),
            },
            KeyCode::Char('c') => {
                session.manager.cancel_workout().await;
                return Ok(None);
            }
            _ => {}
        }
    }
}

/// A screen that dies mid-workout must not leave a started log behind.
async fn cancel_on_error<T>(manager: &mut Manager, result: Result<T>) -> Result<T> {
    if result.is_err() && manager.is_workout_started() {
        manager.cancel_workout().await;
    }
    result
}

async fn show_workout(store: &SqliteStore, workout_id: i64) -> Result<()> {
    let workout = store.fetch_workout(workout_id).await?;
    println!("{}, {}", workout.id, workout.name);
    for exercise in &workout.exercises {
        let kind = if exercise.is_cardio { " (cardio)" } else { "" };
        println!("  {}{}", exercise.name, kind);
        for set in &exercise.sets {
            let rest = set
                .rest_seconds
                .map(|secs| format!(", rest {}s", secs))
                .unwrap_or_default();
            println!("\t{}{}", set, rest);
        }
    }
    Ok(())
}

async fn print_history(store: &SqliteStore, user_id: &str, verbose: bool) -> Result<()> {
    let logs = operations::list_workout_logs(store.pool(), user_id, false).await?;
    if logs.is_empty() {
        println!("No finished workouts for {}", user_id);
    }
    for log in logs {
        let duration = log.duration_seconds.map(format_elapsed).unwrap_or_default();
        println!(
            "{}, workout {}, {} ({})",
            log.id,
            log.workout_id,
            log.started_at.format("%Y-%m-%d %H:%M"),
            duration
        );
        if verbose {
            for set in operations::get_set_logs_for_workout_log(store.pool(), log.id).await? {
                println!("\t{}", set);
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let mut config = RotaConfig::from_env()?;
    if let Some(db) = args.db {
        config.database_path = db;
    }
    init_logger_with_target(config.log_level, env_logger::Target::Stderr);

    let store = SqliteStore::open(&config.database_path).await?;
    info!("Using database {}", config.database_path);

    match args.command {
        Commands::Seed { reset } => {
            if reset {
                rota::db::clear_all_tables(store.pool()).await?;
            }
            let seeded = seed::seed_demo_program(store.pool()).await?;
            println!(
                "Seeded template program {} with workout {}",
                seeded.template_program_id, seeded.workout_id
            );
            println!(
                "Try: rota run {} --template-program-id {}",
                seeded.workout_id, seeded.template_program_id
            );
            Ok(())
        }
        Commands::Show {
            workout_id: Some(workout_id),
        } => show_workout(&store, workout_id).await,
        Commands::Show { workout_id: None } => {
            for workout in operations::list_workouts(store.pool()).await? {
                let program = workout
                    .program_id
                    .map(|id| format!(" (program {})", id))
                    .unwrap_or_default();
                println!("{}, {}{}", workout.id, workout.name, program);
            }
            Ok(())
        }
        Commands::Run {
            workout_id,
            program_id,
            template_program_id,
        } => {
            let manager = WorkoutSessionManager::new(
                store.clone(),
                store,
                SystemClock,
                Some(args.user),
            )
            .with_config(&config);
            let mut session =
                LiveSession::start(manager, workout_id, program_id, template_program_id).await?;

            let terminal = ratatui::init();
            let result = run_live_session(terminal, &mut session).await;
            ratatui::restore();

            match cancel_on_error(&mut session.manager, result).await? {
                Some(summary) => {
                    println!("{}", summary.to_json()?);
                    Ok(())
                }
                None => {
                    println!("Workout cancelled");
                    Ok(())
                }
            }
        }
        Commands::History { verbose } => print_history(&store, &args.user, verbose).await,
    }
}
