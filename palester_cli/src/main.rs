use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use palester_core::backup;
use palester_core::*;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "palester")]
#[command(about = "Weekly training programs, workout logs and progress calendar", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the initial training program
    Setup {
        #[command(flatten)]
        sessions: SessionArgs,

        #[command(flatten)]
        location: OptionalCoords,
    },

    /// Start a new training program from today (or --date)
    Program {
        #[command(flatten)]
        sessions: SessionArgs,

        /// Keep the current program's sessions and apply changes on top
        #[arg(long)]
        keep: bool,

        /// Remove a day from the kept sessions
        #[arg(long = "drop", value_name = "DAY")]
        drop_days: Vec<DayName>,

        /// Date the new program takes effect
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Log (or update) a workout; you must be at the gym
    Log {
        #[command(flatten)]
        coords: Coords,

        /// Date of the workout (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Weight used for a lift, as LIFT_ID=WEIGHT (e.g. 1=100kg)
        #[arg(long = "weight", value_name = "ID=WEIGHT")]
        weights: Vec<String>,
    },

    /// Show the progress calendar for a month
    Calendar {
        /// Month to show (YYYY-MM, defaults to the current month)
        #[arg(long)]
        month: Option<MonthCursor>,

        /// Print cells as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set the gym location
    Location {
        #[command(flatten)]
        coords: Coords,
    },

    /// Export a backup file into a directory
    Export {
        #[arg(long)]
        dir: PathBuf,
    },

    /// Import a backup file, merging it with existing data
    Import {
        #[arg(long)]
        file: PathBuf,
    },

    /// Show the stored data
    Show {
        /// Print the raw document as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct SessionArgs {
    /// Session as DAY or DAY=LIFT,LIFT with lifts like Squat:5x5@100kg or Plank:3x60s
    #[arg(long = "session", value_name = "SESSION")]
    sessions: Vec<String>,
}

#[derive(Args)]
struct Coords {
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    lng: f64,
}

#[derive(Args)]
struct OptionalCoords {
    /// Gym latitude
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Gym longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,
}

fn main() -> ExitCode {
    // Initialize logging
    palester_core::logging::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    let db_path = config.database_path();
    tracing::debug!("Using database {:?}", db_path);
    let mut store = DataStore::open(&db_path)?;

    match cli.command {
        Commands::Setup { sessions, location } => cmd_setup(&mut store, today, &sessions, &location),
        Commands::Program {
            sessions,
            keep,
            drop_days,
            date,
        } => cmd_program(
            &mut store,
            date.unwrap_or(today),
            &sessions,
            keep,
            &drop_days,
        ),
        Commands::Log {
            coords,
            date,
            weights,
        } => cmd_log(
            &mut store,
            &config,
            date.unwrap_or(today),
            &coords,
            &weights,
        ),
        Commands::Calendar { month, json } => {
            let month = match month {
                Some(month) => month,
                None => MonthCursor::containing(today)?,
            };
            cmd_calendar(&store, &config, month, today, json)
        }
        Commands::Location { coords } => {
            store.set_gym_location(GymLocation {
                lat: coords.lat,
                lng: coords.lng,
            })?;
            println!("✓ Gym location saved");
            Ok(())
        }
        Commands::Export { dir } => {
            let data = store.load_required()?;
            let path = backup::export_to_dir(&data, &dir, Utc::now())?;
            println!("✓ Exported backup to {}", path.display());
            Ok(())
        }
        Commands::Import { file } => {
            let imported = backup::import_file(&mut store, &file)?;
            println!(
                "✓ Imported {} program(s) and {} workout(s)",
                imported.programs.len(),
                imported.workouts.len()
            );
            Ok(())
        }
        Commands::Show { json } => cmd_show(&store, today, json),
    }
}

// --- Commands ---

fn cmd_setup(
    store: &mut DataStore,
    today: NaiveDate,
    sessions: &SessionArgs,
    location: &OptionalCoords,
) -> Result<()> {
    let mut draft = ProgramDraft::new(today);
    for session in parse_sessions(sessions)? {
        draft.save_session(session);
    }
    let program = draft.finish()?;

    let gym_location = match (location.lat, location.lng) {
        (Some(lat), Some(lng)) => Some(GymLocation { lat, lng }),
        _ => None,
    };

    let days = day_list(&program);
    store.initialize(&AppData::new(program, gym_location))?;

    println!("✓ Program saved: {}", days);
    if gym_location.is_none() {
        println!("  Set your gym with `palester location --lat .. --lng ..` before logging.");
    }
    Ok(())
}

fn cmd_program(
    store: &mut DataStore,
    date: NaiveDate,
    sessions: &SessionArgs,
    keep: bool,
    drop_days: &[DayName],
) -> Result<()> {
    let data = store.load_required()?;

    let mut draft = match data.active_program(date) {
        Some(current) if keep => ProgramDraft::based_on(current, date),
        _ => ProgramDraft::new(date),
    };
    for session in parse_sessions(sessions)? {
        draft.save_session(session);
    }
    for day in drop_days {
        draft.delete_session(*day);
    }
    let program = draft.finish()?;

    let days = day_list(&program);
    store.append_program(program)?;

    println!("✓ New program from {}: {}", date, days);
    Ok(())
}

fn cmd_log(
    store: &mut DataStore,
    config: &Config,
    date: NaiveDate,
    coords: &Coords,
    weights: &[String],
) -> Result<()> {
    let data = store.load_required()?;

    let gym = data
        .gym_location
        .ok_or_else(|| Error::Validation("gym location not set, cannot verify you are there".into()))?;
    let device = GymLocation {
        lat: coords.lat,
        lng: coords.lng,
    };
    if !is_at_gym(&device, &gym, config.gym.radius_m) {
        return Err(Error::Validation(format!(
            "you are {:.0} m from the gym; workouts can only be logged there",
            distance_m(&device, &gym)
        )));
    }

    let mut workout = match (data.workout_on(date), data.session_for(date)) {
        (Some(existing), _) => existing.clone(),
        (None, Some(session)) => Workout::from_session(date, session),
        (None, None) => Workout {
            date,
            lifts: Vec::new(),
        },
    };

    for raw in weights {
        let (id, weight) = parse_lift_weight(raw)?;
        if !workout.set_weight(id, weight) {
            return Err(Error::Validation(format!("no lift with id {} in this workout", id)));
        }
    }
    workout.fill_missing_weights(WeightUnit::Kg);
    workout.validate()?;

    let lifts: Vec<String> = workout.lifts.iter().map(ToString::to_string).collect();
    let replaced = store.upsert_workout(workout)?;

    if replaced {
        println!("✓ Workout on {} updated", date);
    } else {
        println!("✓ Workout on {} logged", date);
    }
    for lift in lifts {
        println!("  → {}", lift);
    }
    Ok(())
}

fn cmd_calendar(
    store: &DataStore,
    config: &Config,
    month: MonthCursor,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let data = store.load_required()?;
    let cells = classify_month(
        month,
        today,
        &data.programs,
        &data.workout_dates(),
        config.calendar.today_style,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&cells)?);
        return Ok(());
    }

    println!("{:^35}", month.to_string());
    println!("  Sun  Mon  Tue  Wed  Thu  Fri  Sat");
    for week in cells.chunks(7) {
        let line: String = week.iter().map(render_cell).collect();
        println!("{}", line);
    }
    println!();
    println!("  + done  ! missed  - rest  > upcoming  * today  (lowercase: other month)");
    Ok(())
}

fn cmd_show(store: &DataStore, today: NaiveDate, json: bool) -> Result<()> {
    let Some(data) = store.load()? else {
        println!("Not set up yet. Run `palester setup` or `palester import`.");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    match data.active_program(today) {
        Some(program) => {
            println!("Program since {}: {}", program.date, day_list(program));
            for session in &program.sessions {
                println!("  {}", session.day);
                for lift in &session.lifts {
                    println!("    [{}] {}", lift.id, lift);
                }
            }
        }
        None => println!("No program in effect yet"),
    }

    match data.session_for(today) {
        Some(session) => println!("Today ({}): workout day", session.day),
        None => println!("Today: rest day"),
    }

    println!("Programs stored: {}", data.programs.len());
    println!("Workouts logged: {}", data.workouts.len());
    match data.gym_location {
        Some(gym) => println!("Gym: {}, {}", gym.lat, gym.lng),
        None => println!("Gym: not set"),
    }
    Ok(())
}

// --- Helpers ---

/// Parse `DAY` or `DAY=LIFT,LIFT,...`
fn parse_session(raw: &str) -> Result<Session> {
    let (day, lifts) = match raw.split_once('=') {
        Some((day, lifts)) => (day, Some(lifts)),
        None => (raw, None),
    };
    let day: DayName = day.parse()?;

    let Some(lifts) = lifts else {
        return Ok(Session {
            day,
            lifts: Vec::new(),
        });
    };

    let mut draft = SessionDraft::new(day);
    let mut first = true;
    for text in lifts.split(',').filter(|t| !t.trim().is_empty()) {
        let lift: Lift = text.parse()?;
        if first {
            draft.update_lift(1, |blank| *blank = lift);
            first = false;
        } else {
            draft.push_lift(lift);
        }
    }
    draft.finish()
}

fn parse_sessions(args: &SessionArgs) -> Result<Vec<Session>> {
    args.sessions.iter().map(|s| parse_session(s)).collect()
}

/// Parse `ID=WEIGHT`
fn parse_lift_weight(raw: &str) -> Result<(u32, Weight)> {
    let bad = || Error::Parse(format!("invalid weight {:?}, expected ID=WEIGHT", raw));
    let (id, weight) = raw.split_once('=').ok_or_else(bad)?;
    let id: u32 = id.trim().parse().map_err(|_| bad())?;
    let weight = program::parse_weight(weight).ok_or_else(bad)?;
    Ok((id, weight))
}

fn day_list(program: &TrainingProgram) -> String {
    let days: Vec<&str> = program.workout_days().iter().map(DayName::as_str).collect();
    days.join(", ")
}

fn render_cell(cell: &CalendarCell) -> String {
    use chrono::Datelike;

    let mark = match cell.category {
        DayCategory::Completed => '+',
        DayCategory::Missed => '!',
        DayCategory::Rest => '-',
        DayCategory::Future => '>',
        DayCategory::Regular => ' ',
        DayCategory::Today => '*',
        DayCategory::OldCompleted => 'o',
        DayCategory::OldMissed => 'x',
        DayCategory::OldRest => '.',
    };
    let ring = if cell.is_today && cell.category != DayCategory::Today {
        '*'
    } else {
        ' '
    };
    format!("{:>3}{}{}", cell.date.day(), mark, ring)
}
