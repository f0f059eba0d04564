pub mod ui;

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
    tty::IsTty,
};
use itertools::Itertools;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    cell::RefCell,
    error::Error,
    fs::File,
    io::{self, stdin},
    path::PathBuf,
    rc::Rc,
};
use tracing::{debug, warn};
use unicode_width::UnicodeWidthStr;

use crate::ui::screen::current_screen;

use repline::{
    app_dirs::AppDirs,
    capability::{BrowserShare, Capabilities, SystemClock, TerminalDisplay},
    config::{Config, ConfigStore, FileConfigStore},
    engine::WorkoutEngine,
    error::EngineError,
    history::{export_csv, HistoryDb},
    logging,
    profile::WeightUnit,
    reminders::{due_reminders, ReminderKind, ReminderWatch},
    runtime::{CrosstermEventSource, FixedTicker, Runner, SessionEvent},
    session::Phase,
    summary::{format_time, SessionSummary},
    workout::{bundled_names, WorkoutDefinition},
};

const HISTORY_LIMIT: usize = 20;

/// guided workout timer tui with rest cycling, rep confirmation and calorie estimates
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A guided workout timer for the terminal: counts you through timed exercises, waits for you on rep-based ones, rests between them and estimates the calories burned."
)]
pub struct Cli {
    /// workout plan JSON file, either a bare workout or a plan with a `workoutPlan` key
    #[clap(short = 'p', long, conflicts_with = "workout")]
    plan: Option<PathBuf>,

    /// bundled workout to run
    #[clap(short = 'w', long, value_enum)]
    workout: Option<BundledWorkout>,

    /// body weight used for the calorie estimate
    #[clap(long)]
    weight: Option<f64>,

    /// unit of --weight
    #[clap(short = 'u', long, value_enum)]
    unit: Option<WeightUnit>,

    /// seconds of rest between exercises
    #[clap(short = 'r', long)]
    rest: Option<u32>,

    /// seconds of the get-ready countdown
    #[clap(long)]
    ready: Option<u32>,

    /// list the bundled workouts
    #[clap(short = 'l', long)]
    list: bool,

    /// show recent finished workouts
    #[clap(long)]
    history: bool,

    /// export all finished workouts to a CSV file
    #[clap(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// delete all recorded workouts
    #[clap(long)]
    clear_history: bool,

    /// show the reminder schedule and any reminder due right now
    #[clap(long)]
    reminders: bool,

    /// store the given weight, unit, rest, ready and workout as the new defaults;
    /// a new --weight also counts as the weekly check-in
    #[clap(long)]
    save_config: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BundledWorkout {
    Quickstart,
    Core,
    Fullbody,
}

impl Cli {
    /// Flags win over the stored config
    fn apply(&self, config: &mut Config) {
        if let Some(weight) = self.weight {
            config.profile.weight = weight;
        }
        if let Some(unit) = self.unit {
            config.profile.weight_unit = unit;
        }
        if let Some(rest) = self.rest {
            config.session.rest_secs = rest;
        }
        if let Some(ready) = self.ready {
            config.session.ready_secs = ready;
        }
        if let Some(workout) = self.workout {
            config.default_workout = workout.to_string();
        }
    }

    /// Persist the effective config. Updating the weight completes the weekly check-in.
    fn save_defaults(
        &self,
        store: &impl ConfigStore,
        config: &mut Config,
        today: NaiveDate,
    ) -> io::Result<()> {
        if self.weight.is_some() {
            config.last_checkin = Some(today);
        }
        store.save(config)
    }

    fn load_workout(&self, config: &Config) -> Result<WorkoutDefinition, Box<dyn Error>> {
        let workout = match &self.plan {
            Some(path) => WorkoutDefinition::from_file(path)?,
            None => WorkoutDefinition::bundled(&config.default_workout)?,
        };
        Ok(workout)
    }
}

/// Whether the event loop keeps running after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug)]
pub struct App {
    pub engine: WorkoutEngine,
    /// One-line feedback shown next to the key legend until the next key press
    pub notice: Option<String>,
    pub reminders: ReminderWatch,
}

impl App {
    pub fn new(engine: WorkoutEngine) -> Self {
        Self {
            engine,
            notice: None,
            reminders: ReminderWatch::default(),
        }
    }

    pub fn with_reminders(mut self, reminders: ReminderWatch) -> Self {
        self.reminders = reminders;
        self
    }

    /// One second of wall time: advance the session and surface due reminders
    pub fn on_tick(&mut self, now: NaiveDateTime) {
        self.engine.tick();
        let due = self.reminders.poll(now);
        if let Some(kind) = due.last() {
            debug!(reminder = %kind, "reminder due");
            self.notice = Some(format!("{} {}", kind.title(), kind.body()));
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }
        self.notice = None;

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return self.leave();
        }

        let finished = self.engine.phase() == Some(Phase::Finished);
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return self.leave(),
            KeyCode::Enter if finished => return self.leave(),
            KeyCode::Enter | KeyCode::Char('d') => {
                let result = self.engine.confirm_rep_based_exercise();
                self.ignore_invalid(result);
            }
            KeyCode::Char(' ') => {
                let result = self.engine.toggle_pause().map(|_| ());
                self.ignore_invalid(result);
            }
            KeyCode::Char('v') => self.open_video(),
            KeyCode::Char('s') if finished => {
                self.notice = Some(match self.engine.share() {
                    Ok(_) => "opened share page".to_string(),
                    Err(e) => e.to_string(),
                });
            }
            _ => {}
        }
        Flow::Continue
    }

    /// Dismiss a finished session, cancel a running one
    fn leave(&mut self) -> Flow {
        let result = if self.engine.phase() == Some(Phase::Finished) {
            self.engine.dismiss()
        } else {
            self.engine.cancel()
        };
        if let Err(e) = result {
            warn!(error = %e, "leaving the session");
        }
        Flow::Exit
    }

    fn ignore_invalid(&mut self, result: Result<(), EngineError>) {
        match result {
            Ok(()) => {}
            Err(e @ EngineError::InvalidAction { .. }) => debug!(error = %e, "key ignored"),
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    /// Only the exercise on screen has a video to open
    fn open_video(&mut self) {
        if !matches!(
            self.engine.phase(),
            Some(Phase::Exercising | Phase::RepConfirm)
        ) {
            return;
        }
        let Some(url) = self
            .engine
            .current_exercise()
            .and_then(|e| e.video_url.clone())
        else {
            self.notice = Some("no video for this exercise".to_string());
            return;
        };

        if self.engine.phase() == Some(Phase::Exercising) && !self.engine.is_paused() {
            let result = self.engine.toggle_pause().map(|_| ());
            self.ignore_invalid(result);
        }
        if let Err(e) = webbrowser::open(&url) {
            warn!(url = %url, error = %e, "could not open video");
            self.notice = Some("could not open video".to_string());
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let _log_guard = AppDirs::log_path().and_then(|path| logging::init(&path));

    let store = FileConfigStore::new();
    let mut config = store.load();
    cli.apply(&mut config);

    if cli.save_config {
        cli.save_defaults(&store, &mut config, Local::now().date_naive())?;
        println!("Saved defaults to {}", store.path().display());
        return Ok(());
    }
    if cli.list {
        print_workouts();
        return Ok(());
    }
    if cli.history {
        print_history(&HistoryDb::new()?)?;
        return Ok(());
    }
    if let Some(path) = &cli.export {
        let entries = HistoryDb::new()?.recent(u32::MAX as usize)?;
        export_csv(&entries, File::create(path)?)?;
        println!("Exported {} workouts to {}", entries.len(), path.display());
        return Ok(());
    }
    if cli.clear_history {
        let removed = HistoryDb::new()?.clear_all()?;
        println!("Removed {removed} workouts from history");
        return Ok(());
    }
    if cli.reminders {
        print!("{}", reminder_report(&config, Local::now().naive_local()));
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let workout = cli.load_workout(&config)?;
    let title = workout.title.clone();
    let exercise_count = workout.len();

    let finished: Rc<RefCell<Option<SessionSummary>>> = Rc::new(RefCell::new(None));
    let caps = Capabilities {
        clock: Box::new(SystemClock),
        display: Box::new(TerminalDisplay),
        share: Box::new(BrowserShare),
    };
    let mut engine =
        WorkoutEngine::with_capabilities(workout, config.profile, config.session, caps)?;
    let sink = Rc::clone(&finished);
    engine.on_complete(move |summary| *sink.borrow_mut() = Some(*summary));

    enable_raw_mode()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let reminders = ReminderWatch::new(config.reminders.clone(), config.last_checkin);
    let mut app = App::new(engine).with_reminders(reminders);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    terminal.show_cursor()?;
    drop(app);
    result?;

    let Some(summary) = finished.take() else {
        println!("Workout cancelled.");
        return Ok(());
    };

    match HistoryDb::new().and_then(|db| db.record(&title, exercise_count, &summary)) {
        Ok(_) => {}
        Err(e) => {
            warn!(error = %e, "could not record workout");
            eprintln!("could not save workout history: {e}");
        }
    }
    println!(
        "{title}: {} total, {} active, ~{} kcal",
        format_time(summary.total_duration_secs),
        format_time(summary.active_duration_secs),
        summary.calories_burned
    );

    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| current_screen(app.engine.phase()).render(app, f))?;

        match runner.step() {
            SessionEvent::Tick => app.on_tick(Local::now().naive_local()),
            SessionEvent::Resize => {}
            SessionEvent::Key(key) => {
                if app.handle_key(key) == Flow::Exit {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn print_workouts() {
    let names = bundled_names();
    let width = names.iter().map(|n| n.width()).max().unwrap_or(0);

    for name in &names {
        match WorkoutDefinition::bundled(name) {
            Ok(w) => println!(
                "{name:<width$}  {} ({} exercises): {}",
                w.title,
                w.len(),
                w.exercises.iter().map(|e| e.name.as_str()).join(", ")
            ),
            Err(e) => warn!(name = %name, error = %e, "broken bundled workout"),
        }
    }
}

fn print_history(db: &HistoryDb) -> rusqlite::Result<()> {
    let entries = db.recent(HISTORY_LIMIT)?;
    if entries.is_empty() {
        println!("No finished workouts yet.");
        return Ok(());
    }

    let width = entries.iter().map(|e| e.title.width()).max().unwrap_or(0);
    let now = Local::now();
    for entry in &entries {
        let pad = " ".repeat(width - entry.title.width());
        println!(
            "{}{pad}  {:>8} active  {:>4} kcal  {}",
            entry.title,
            format_time(entry.active_duration_secs),
            entry.calories_burned,
            entry.age(now)
        );
    }

    let totals = db.totals()?;
    println!(
        "\n{} workouts, {} active, {} kcal",
        totals.sessions,
        format_time(totals.active_secs),
        totals.calories
    );
    Ok(())
}

fn reminder_report(config: &Config, now: NaiveDateTime) -> String {
    let reminders = &config.reminders;
    let mut out = String::new();
    for (kind, reminder) in [
        (ReminderKind::Breakfast, &reminders.breakfast),
        (ReminderKind::Lunch, &reminders.lunch),
        (ReminderKind::Dinner, &reminders.dinner),
        (ReminderKind::Workout, &reminders.workout),
    ] {
        let state = if reminder.enabled { "on" } else { "off" };
        out += &format!("{:<10} {} {state}\n", kind.to_string(), reminder.time);
    }
    let checkin = if reminders.checkin.enabled { "on" } else { "off" };
    let last = config
        .last_checkin
        .map_or_else(|| "never".to_string(), |d| d.to_string());
    out += &format!(
        "{:<10} weekly {checkin} (last {last})\n",
        ReminderKind::Checkin.to_string()
    );

    for kind in due_reminders(reminders, config.last_checkin, now) {
        out += &format!("\n{}\n{}\n", kind.title(), kind.body());
    }
    out
}
