//! `calgrid` CLI — manage a local calendar file and view its month grid.
//!
//! ## Usage
//!
//! ```sh
//! # Add a weekly event with a 10-minute reminder
//! calgrid add --title Standup --start 2024-01-01T09:00 --end 2024-01-01T09:15 \
//!     --repeat weekly --remind 10
//!
//! # List everything visible on the January 2024 grid
//! calgrid show --month 2024-01
//!
//! # Print the grid itself, Monday first
//! calgrid grid --month 2024-01 --week-start mon
//!
//! # Delete a whole series through one of its instances, then undo
//! calgrid delete <instance-id> --parent <template-id>
//! calgrid undo
//!
//! # Poll reminders once, or keep polling every minute
//! calgrid reminders --watch
//! ```

use anyhow::{bail, Context, Result};
use calgrid_engine::reminder::DEFAULT_POLL_SECONDS;
use calgrid_engine::timestamp;
use calgrid_engine::{
    due_reminders, load_or_empty, CalendarState, EditScope, Event, EventColor, EventStore,
    JsonFileStore, MonthGrid, RecurrenceKind, RecurrenceRule, Reminder, Selection, ViewOptions,
};
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Weekday};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "calgrid",
    version,
    about = "Month-grid calendar with recurring events"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Calendar file holding the event templates as JSON
    #[arg(long, global = true, default_value = "calendar-events.json")]
    store: PathBuf,

    /// First day of the week on the grid (sun, mon, ...)
    #[arg(long, global = true, default_value = "sun", value_parser = parse_weekday)]
    week_start: Weekday,

    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the events visible on a month grid
    Show {
        /// Month to show, as YYYY-MM or any date inside it (defaults to today)
        #[arg(long, value_parser = parse_anchor)]
        month: Option<NaiveDateTime>,
        /// Print JSON instead of one line per event
        #[arg(long)]
        json: bool,
    },
    /// Print a month grid with up to three events per day
    Grid {
        /// Month to show, as YYYY-MM or any date inside it (defaults to today)
        #[arg(long, value_parser = parse_anchor)]
        month: Option<NaiveDateTime>,
    },
    /// Create an event template
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, value_parser = parse_datetime)]
        start: NaiveDateTime,
        /// Defaults to one hour after start
        #[arg(long, value_parser = parse_datetime)]
        end: Option<NaiveDateTime>,
        #[command(flatten)]
        details: Details,
        #[command(flatten)]
        repeat: Repeat,
    },
    /// Edit an event, or the series behind a recurring instance
    Edit {
        /// Event id as shown by `show`
        id: String,
        /// Template id of a recurring instance
        #[arg(long)]
        parent: Option<String>,
        /// Apply title, description, location, color and reminders to the whole
        /// series. Series timing cannot be changed this way.
        #[arg(long, requires = "parent", conflicts_with_all = ["start", "end"])]
        series: bool,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_parser = parse_datetime)]
        start: Option<NaiveDateTime>,
        #[arg(long, value_parser = parse_datetime)]
        end: Option<NaiveDateTime>,
        #[command(flatten)]
        details: Details,
    },
    /// Soft-delete an event; instances delete their whole series
    Delete {
        /// Event id as shown by `show`
        id: String,
        /// Template id of a recurring instance
        #[arg(long)]
        parent: Option<String>,
    },
    /// Restore the most recently deleted event
    Undo,
    /// Print reminders due within the next poll interval
    Reminders {
        /// Pretend the current time is this instant
        #[arg(long, value_parser = parse_datetime)]
        now: Option<NaiveDateTime>,
        /// Look-ahead and polling cadence in seconds
        #[arg(long, default_value_t = DEFAULT_POLL_SECONDS)]
        interval_secs: i64,
        /// Keep polling until interrupted
        #[arg(long, conflicts_with = "now")]
        watch: bool,
    },
}

#[derive(Args)]
struct Details {
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long, value_parser = parse_color)]
    color: Option<EventColor>,
    /// Reminder lead time in minutes; repeat for several reminders
    #[arg(long = "remind")]
    reminders: Vec<u32>,
}

impl Details {
    fn apply(self, event: &mut Event) {
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(location) = self.location {
            event.location = Some(location);
        }
        if let Some(color) = self.color {
            event.color = color;
        }
        if !self.reminders.is_empty() {
            event.reminders = self.reminders.into_iter().map(Reminder::new).collect();
        }
    }
}

#[derive(Args)]
struct Repeat {
    /// Recurrence cadence
    #[arg(long = "repeat", value_enum, default_value_t = Cadence::None)]
    cadence: Cadence,
    /// Step between occurrences, in units of the cadence
    #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
    interval: i64,
    /// Last instant an occurrence may start
    #[arg(long, value_parser = parse_datetime)]
    until: Option<NaiveDateTime>,
    /// Total number of occurrences
    #[arg(long)]
    count: Option<u32>,
}

impl Repeat {
    fn rule(&self) -> RecurrenceRule {
        let mut rule = RecurrenceRule::every(self.cadence.into(), self.interval);
        rule.end_date = self.until;
        rule.occurrences = self.count;
        rule
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Cadence {
    None,
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl From<Cadence> for RecurrenceKind {
    fn from(c: Cadence) -> Self {
        match c {
            Cadence::None => RecurrenceKind::None,
            Cadence::Daily => RecurrenceKind::Daily,
            Cadence::Weekly => RecurrenceKind::Weekly,
            Cadence::Monthly => RecurrenceKind::Monthly,
            Cadence::Custom => RecurrenceKind::Custom,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = ViewOptions {
        week_start: cli.week_start,
    };

    match cli.command {
        Commands::Show { month, json } => {
            let state = Session::open_lenient(&cli.store).state;
            let mut events = state.visible(month.unwrap_or_else(now), &options);
            events.sort_by_key(|e| e.start);

            if json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else {
                for event in &events {
                    println!("{}", describe(event));
                }
            }
        }
        Commands::Grid { month } => {
            let anchor = month.unwrap_or_else(now);
            let state = Session::open_lenient(&cli.store).state;
            let grid = MonthGrid::build(anchor, &state.visible(anchor, &options), &options);
            print!("{}", render_grid(&grid));
        }
        Commands::Add {
            title,
            start,
            end,
            details,
            repeat,
        } => {
            let end = match end {
                Some(end) => end,
                None => start
                    .checked_add_signed(Duration::hours(1))
                    .context("Start is too close to the end of the calendar")?,
            };
            if end < start {
                bail!("End {} is before start {}", end, start);
            }

            let mut event = Event::new(title, start, end).with_recurrence(repeat.rule());
            details.apply(&mut event);

            let mut session = Session::open(&cli.store)?;
            let id = session.state.create(event);
            session.commit()?;
            println!("{}", id);
        }
        Commands::Edit {
            id,
            parent,
            series,
            title,
            start,
            end,
            details,
        } => {
            let mut session = Session::open(&cli.store)?;
            let (target, scope) = match parent.as_deref() {
                Some(parent_id) if series => (parent_id, EditScope::Series),
                _ => (id.as_str(), EditScope::Single),
            };
            let mut edited = session
                .state
                .get(target)
                .cloned()
                .with_context(|| format!("No stored event with id {}", target))?;

            if scope == EditScope::Series {
                edited.parent_id = parent.clone();
            }
            if let Some(title) = title {
                edited.title = title;
            }
            edited.start = start.unwrap_or(edited.start);
            edited.end = end.unwrap_or(edited.end);
            if edited.end < edited.start {
                bail!("End {} is before start {}", edited.end, edited.start);
            }
            details.apply(&mut edited);

            session.state.update(edited, scope)?;
            session.commit()?;
            println!("Updated {}", target);
        }
        Commands::Delete { id, parent } => {
            let mut session = Session::open(&cli.store)?;
            let deleted = session.state.delete(&Selection {
                id,
                parent_id: parent,
            })?;
            session.commit()?;
            println!("Deleted {} (run `calgrid undo` to restore)", deleted);
        }
        Commands::Undo => {
            let mut session = Session::open(&cli.store)?;
            match session.state.undo() {
                Some(id) => {
                    session.commit()?;
                    println!("Restored {}", id);
                }
                None => println!("Nothing to undo"),
            }
        }
        Commands::Reminders {
            now: at,
            interval_secs,
            watch,
        } => {
            let interval = Duration::try_seconds(interval_secs.max(1))
                .context("Poll interval out of range")?;
            loop {
                let at = at.unwrap_or_else(now);
                let state = Session::open_lenient(&cli.store).state;
                for due in due_reminders(&state.visible(at, &options), at, interval) {
                    println!("{}", due.message());
                }
                if !watch {
                    break;
                }
                std::thread::sleep(interval.to_std().context("Poll interval out of range")?);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("calgrid_engine=debug,calgrid=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// The calendar file plus the sidecar file holding the undo target.
struct Session {
    store: JsonFileStore,
    undo_path: PathBuf,
    state: CalendarState,
}

impl Session {
    /// Open for editing. A store that fails to load is an error here, so a
    /// corrupt file is never overwritten.
    fn open(path: &Path) -> Result<Self> {
        let store = JsonFileStore::new(path);
        let events = store
            .load()
            .with_context(|| format!("Failed to load calendar: {}", path.display()))?;
        Ok(Self::with_events(store, events))
    }

    /// Open for reading. Any load failure shows an empty calendar.
    fn open_lenient(path: &Path) -> Self {
        let store = JsonFileStore::new(path);
        let events = load_or_empty(&store);
        Self::with_events(store, events)
    }

    fn with_events(store: JsonFileStore, events: Vec<Event>) -> Self {
        let undo_path = undo_path(store.path());
        let pending = std::fs::read_to_string(&undo_path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            store,
            undo_path,
            state: CalendarState::new(events).with_pending_restoration(pending),
        }
    }

    fn commit(mut self) -> Result<()> {
        self.store
            .save(self.state.events())
            .with_context(|| format!("Failed to write calendar: {}", self.store.path().display()))?;

        match self.state.pending_restoration() {
            Some(id) => std::fs::write(&self.undo_path, id)
                .with_context(|| format!("Failed to write file: {}", self.undo_path.display()))?,
            None if self.undo_path.exists() => std::fs::remove_file(&self.undo_path)
                .with_context(|| format!("Failed to remove file: {}", self.undo_path.display()))?,
            None => {}
        }
        Ok(())
    }
}

fn undo_path(store: &Path) -> PathBuf {
    let mut name = store.as_os_str().to_owned();
    name.push(".undo");
    PathBuf::from(name)
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn describe(event: &Event) -> String {
    let mut line = format!(
        "{} - {}  {}  id={}",
        event.start.format("%Y-%m-%d %H:%M"),
        event.end.format("%H:%M"),
        event.title,
        event.id
    );
    if let Some(parent) = &event.parent_id {
        line.push_str(&format!(" parent={}", parent));
    }
    line
}

/// A week-per-row calendar followed by the events of each day in the month.
fn render_grid(grid: &MonthGrid) -> String {
    let mut out = String::new();

    if let Some(first_week) = grid.weeks.first() {
        let header: Vec<String> = first_week
            .iter()
            .map(|c| {
                let name = c.date.format("%a").to_string();
                format!("{:>4}", &name[..2])
            })
            .collect();
        out.push_str(&header.join(""));
        out.push('\n');
    }

    for week in &grid.weeks {
        let row: Vec<String> = week
            .iter()
            .map(|cell| {
                let marker = if cell.events.is_empty() { ' ' } else { '*' };
                if cell.in_month {
                    format!("{:>3}{}", cell.date.day(), marker)
                } else {
                    format!("{:>3}{}", ".", marker)
                }
            })
            .collect();
        out.push_str(&row.join(""));
        out.push('\n');
    }

    for cell in grid.days().filter(|c| c.in_month && !c.events.is_empty()) {
        out.push('\n');
        out.push_str(&cell.date.format("%a %Y-%m-%d").to_string());
        out.push('\n');
        for event in cell.visible() {
            out.push_str(&format!("  {}  {}\n", event.start.format("%H:%M"), event.title));
        }
        if cell.overflow() > 0 {
            out.push_str(&format!("  +{} more\n", cell.overflow()));
        }
    }

    out
}

fn parse_datetime(s: &str) -> std::result::Result<NaiveDateTime, String> {
    timestamp::parse(s)
        .map_err(|_| format!("Invalid date/time '{}'. Expected YYYY-MM-DD[THH:MM[:SS]]", s))
}

fn parse_anchor(s: &str) -> std::result::Result<NaiveDateTime, String> {
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
        .or_else(|_| parse_datetime(s))
}

fn parse_weekday(s: &str) -> std::result::Result<Weekday, String> {
    s.parse::<Weekday>()
        .map_err(|_| format!("Unknown weekday '{}'. Expected sun, mon, ...", s))
}

fn parse_color(s: &str) -> std::result::Result<EventColor, String> {
    s.parse::<EventColor>().map_err(|e| e.to_string())
}
