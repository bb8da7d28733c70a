use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use eco_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ecolog")]
#[command(about = "Daily carbon footprint tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Args)]
struct ActivityArgs {
    /// Distance travelled today (km)
    #[arg(long, default_value_t = 0.0)]
    travel_km: f64,

    /// Travel mode (car, bus, bike, walk)
    #[arg(long, default_value = "car")]
    travel_mode: String,

    /// Electricity used today (kWh)
    #[arg(long, default_value_t = 0.0)]
    electricity_kwh: f64,

    /// Today's main meal (veg, non-veg)
    #[arg(long, default_value = "veg")]
    diet: String,

    /// Water used today (liters)
    #[arg(long, default_value_t = 0.0)]
    water_liters: f64,

    /// Date to log for (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<String>,
}

impl ActivityArgs {
    fn to_record(&self) -> Result<ActivityRecord> {
        let date = self
            .date
            .as_deref()
            .map(|s| {
                s.parse::<NaiveDate>()
                    .map_err(|e| Error::InvalidInput(format!("bad date {:?}: {}", s, e)))
            })
            .transpose()?;

        let record = ActivityRecord {
            travel_km: self.travel_km,
            travel_mode: TravelMode::from_input(&self.travel_mode),
            electricity_kwh: self.electricity_kwh,
            diet: DietType::from_input(&self.diet),
            water_liters: self.water_liters,
            date,
        };
        record.validate()?;
        Ok(record)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the day's footprint without logging it
    Estimate {
        #[command(flatten)]
        activity: ActivityArgs,

        /// Tip focus area (transport, electricity, food)
        #[arg(long)]
        focus: Option<String>,
    },

    /// Log the day's activity and earn points
    Log {
        /// User to log for
        #[arg(long)]
        name: String,

        #[command(flatten)]
        activity: ActivityArgs,
    },

    /// Show a user's points, streak and recent logs
    Stats {
        /// User to show
        #[arg(long)]
        name: String,
    },

    /// Create a user without logging anything yet
    Register {
        /// Name for the new user
        #[arg(long)]
        name: String,
    },

    /// Roll up journal entries into the CSV archive
    Rollup {
        /// Clean up processed journal files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    eco_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Commands::Estimate { activity, focus } => cmd_estimate(activity, focus, &config),
        Commands::Log { name, activity } => cmd_log(data_dir, &name, activity),
        Commands::Stats { name } => cmd_stats(data_dir, &name),
        Commands::Register { name } => cmd_register(data_dir, &name),
        Commands::Rollup { cleanup } => cmd_rollup(data_dir, cleanup),
    }
}

fn cmd_estimate(activity: ActivityArgs, focus: Option<String>, config: &Config) -> Result<()> {
    let record = activity.to_record()?;
    let footprint = estimate(&record);

    println!("Estimated footprint: {} kg CO2", footprint);

    let focus_area = focus.as_deref().and_then(FocusArea::from_input);
    let req = TipRequest {
        name: String::new(),
        footprint_kg: footprint,
        focus_area,
    };
    if config.tips.external_available() {
        tracing::info!("External tip generation configured but no generator is linked; using fallback tips");
    }
    println!("Tip: {}", tip_for(&req, None));

    Ok(())
}

fn cmd_log(data_dir: PathBuf, name: &str, activity: ActivityArgs) -> Result<()> {
    let record = activity.to_record()?;
    let footprint = estimate(&record);
    let store = FileStore::open(data_dir)?;

    match submit(&store, name, &record, footprint)? {
        SubmitOutcome::Logged(receipt) => {
            println!("Estimated footprint: {} kg CO2", footprint);
            println!(
                "✓ Logged! +{} points (total {}, streak {})",
                receipt.points_gain, receipt.points, receipt.streak
            );
        }
        SubmitOutcome::AlreadyLogged => {
            println!("Already logged for that day; points and streak unchanged.");
        }
    }

    Ok(())
}

fn cmd_stats(data_dir: PathBuf, name: &str) -> Result<()> {
    let store = FileStore::open(data_dir)?;
    let report = fetch_stats(&store, name)?;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", report.name);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Points: {}", report.points);
    println!("  Streak: {} day(s)", report.streak);
    println!();

    if report.logs.is_empty() {
        println!("  No logs yet.");
    } else {
        println!("  Recent logs:");
        for log in &report.logs {
            println!("    {}  {:>7.2} kg", log.date, log.footprint_kg);
        }
    }

    println!();
    Ok(())
}

fn cmd_register(data_dir: PathBuf, name: &str) -> Result<()> {
    let store = FileStore::open(data_dir)?;
    let user = register(&store, name)?;
    println!("✓ User '{}' created.", user.name);
    Ok(())
}

fn cmd_rollup(data_dir: PathBuf, cleanup: bool) -> Result<()> {
    let store = FileStore::open(data_dir)?;
    let journal_path = store.journal_path();
    let csv_path = store.archive_path();

    // A submission appending between the rollup's read and its rename would
    // vanish into the archived file; hold the submission lock for the move.
    let _guard = store.lock_submissions()?;

    if !journal_path.exists() {
        println!("No journal file found - nothing to roll up.");
        return Ok(());
    }

    let count = eco_core::archive::journal_to_csv_and_archive(&journal_path, &csv_path)?;

    println!("✓ Rolled up {} entries to CSV", count);
    println!("  CSV: {}", csv_path.display());

    if cleanup {
        let cleaned = eco_core::archive::cleanup_processed_journals(&store.journal_dir())?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed journal files", cleaned);
        }
    }

    Ok(())
}
