//! Main entry point for the frontdesk command line tool
//!
//! Opens the front desk over the configured data directory, runs one
//! scheduling or waiting-room command, and prints the result as JSON.

use anyhow::{anyhow, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use frontdesk::config::AppConfig;
use frontdesk::slots::UnavailabilityPeriod;
use frontdesk::types::{Appointment, Patient, Priority, Provider, RecurrencePattern, TimeWindow};
use frontdesk::utils::{parse_date, parse_time_of_day};
use frontdesk::FrontDesk;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing::{error, info};

/// Frontdesk - clinic slot scheduling and waiting room management
#[derive(Parser)]
#[command(
    name = "frontdesk",
    version,
    about = "Provider time slots, unavailability and a priority waiting room",
    long_about = "Frontdesk generates provider appointment slots, keeps them consistent with \
                 recorded unavailability, and runs a per-provider waiting room ordered by \
                 priority and arrival with estimated wait times."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Data directory override
    #[arg(long, value_name = "DIR", help = "Override the data directory")]
    data_dir: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without touching data")]
    dry_run: bool,

    /// Print Prometheus metrics after the command
    #[arg(long, help = "Print collected metrics in text exposition format")]
    print_metrics: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate, list, book and remove provider slots
    #[command(subcommand)]
    Slots(SlotsCommand),

    /// Record and remove provider unavailability
    #[command(subcommand)]
    Unavailable(UnavailableCommand),

    /// Run the waiting room
    #[command(subcommand)]
    Queue(QueueCommand),

    /// Print a summary of the front desk
    Status,
}

#[derive(Subcommand)]
enum SlotsCommand {
    /// Generate slots over a date range
    Generate {
        #[arg(long)]
        provider: String,
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// Last date, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: String,
        /// Slot length in minutes
        #[arg(long)]
        minutes: Option<u32>,
        /// Daily start (HH:MM)
        #[arg(long)]
        day_start: Option<String>,
        /// Daily end (HH:MM)
        #[arg(long)]
        day_end: Option<String>,
        /// Include Saturdays and Sundays
        #[arg(long)]
        weekends: bool,
    },
    /// List a provider's slots
    List {
        #[arg(long)]
        provider: String,
        /// Only this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Only bookable slots (requires --date)
        #[arg(long, requires = "date")]
        available: bool,
    },
    /// Book a slot
    Book {
        slot_id: String,
        /// Book even if the slot is unavailable
        #[arg(long)]
        force: bool,
    },
    /// Remove a slot
    Remove { slot_id: String },
}

#[derive(Subcommand)]
enum UnavailableCommand {
    /// Record an unavailability period
    Add {
        #[arg(long)]
        provider: String,
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// Last date, inclusive; defaults to --from
        #[arg(long)]
        to: Option<String>,
        /// Window start (HH:MM); omit with --end for all day
        #[arg(long)]
        start: Option<String>,
        /// Window end (HH:MM)
        #[arg(long)]
        end: Option<String>,
        #[arg(long, default_value = "")]
        reason: String,
        /// daily, weekly or monthly
        #[arg(long)]
        recurring: Option<RecurrencePattern>,
    },
    /// Remove a period by id
    Remove { period_id: String },
    /// List a provider's periods
    List {
        #[arg(long)]
        provider: String,
    },
}

#[derive(ClapArgs)]
struct CheckInArgs {
    #[arg(long)]
    appointment: String,
    #[arg(long)]
    patient_id: String,
    #[arg(long)]
    patient_name: String,
    #[arg(long)]
    provider: String,
    #[arg(long)]
    provider_name: String,
    /// urgent, normal, low or 0-2
    #[arg(long, default_value = "normal")]
    priority: Priority,
}

#[derive(Subcommand)]
enum QueueCommand {
    /// Check a patient in
    CheckIn(CheckInArgs),
    /// Start a waiting patient's appointment
    Start { appointment: String },
    /// Check a patient out
    CheckOut { appointment: String },
    /// Change a live entry's priority
    Priority {
        appointment: String,
        /// urgent, normal, low or 0-2
        level: Priority,
    },
    /// Show a provider's live queue
    Show {
        #[arg(long)]
        provider: String,
    },
    /// Waiting time statistics for a provider
    Stats {
        #[arg(long)]
        provider: String,
    },
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from file, environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(data_dir) = &args.data_dir {
        config.storage.data_dir = data_dir.clone();
    }

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    frontdesk::config::validate_config(&config)?;
    Ok(config)
}

/// Display configuration summary
fn display_banner(config: &AppConfig) {
    info!("Frontdesk {}", frontdesk::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Data dir: {}", config.storage.data_dir.display());
    info!(
        "   Working day: {}-{} ({} min slots, weekends: {})",
        config.scheduling.day_start.format("%H:%M"),
        config.scheduling.day_end.format("%H:%M"),
        config.scheduling.default_slot_minutes,
        config.scheduling.include_weekends
    );
    info!("   Conflict policy: {}", config.scheduling.conflict_policy);
    info!(
        "   Wait estimate: {} min per waiting, {} min per in-progress",
        config.waiting_room.minutes_per_waiting, config.waiting_room.minutes_per_in_progress
    );
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_slots(desk: &mut FrontDesk, command: SlotsCommand) -> Result<()> {
    match command {
        SlotsCommand::Generate {
            provider,
            from,
            to,
            minutes,
            day_start,
            day_end,
            weekends,
        } => {
            let start_date = parse_date("from", &from)?;
            let end_date = parse_date("to", &to)?;
            let mut request = desk.generation_request(provider, start_date, end_date);
            if let Some(minutes) = minutes {
                request.slot_duration_minutes = minutes;
            }
            if let Some(start) = day_start {
                request.daily_start = parse_time_of_day("day_start", &start)?;
            }
            if let Some(end) = day_end {
                request.daily_end = parse_time_of_day("day_end", &end)?;
            }
            request.include_weekends |= weekends;

            let created = desk.resolver_mut().generate_slots(&request)?;
            print_json(&created)
        }
        SlotsCommand::List {
            provider,
            date,
            available,
        } => {
            let slots = match date {
                Some(date) => {
                    let date = parse_date("date", &date)?;
                    if available {
                        desk.resolver().get_available_slots(&provider, date)
                    } else {
                        desk.resolver()
                            .slots_for(&provider)
                            .into_iter()
                            .filter(|slot| slot.date == date)
                            .collect()
                    }
                }
                None => desk.resolver().slots_for(&provider),
            };
            print_json(&slots)
        }
        SlotsCommand::Book { slot_id, force } => {
            let slot = desk.resolver_mut().book_slot(&slot_id, force)?;
            print_json(&slot)
        }
        SlotsCommand::Remove { slot_id } => {
            if !desk.resolver_mut().remove_slot(&slot_id) {
                return Err(anyhow!("No slot with id {}", slot_id));
            }
            print_json(&json!({ "removed": slot_id }))
        }
    }
}

fn run_unavailable(desk: &mut FrontDesk, command: UnavailableCommand) -> Result<()> {
    match command {
        UnavailableCommand::Add {
            provider,
            from,
            to,
            start,
            end,
            reason,
            recurring,
        } => {
            let start_date = parse_date("from", &from)?;
            let end_date = match to {
                Some(to) => parse_date("to", &to)?,
                None => start_date,
            };
            let start = start
                .map(|value| parse_time_of_day("start", &value))
                .transpose()?;
            let end = end
                .map(|value| parse_time_of_day("end", &value))
                .transpose()?;
            let window = TimeWindow::from_bounds(start, end)?;

            let mut period =
                UnavailabilityPeriod::new(provider, start_date, end_date, window, reason);
            if let Some(pattern) = recurring {
                period = period.recurring(pattern);
            }

            let period = desk.resolver_mut().add_unavailability(period)?;
            print_json(&period)
        }
        UnavailableCommand::Remove { period_id } => {
            if !desk.resolver_mut().remove_unavailability(&period_id) {
                return Err(anyhow!("No unavailability period with id {}", period_id));
            }
            print_json(&json!({ "removed": period_id }))
        }
        UnavailableCommand::List { provider } => {
            print_json(&desk.resolver().unavailability_for(&provider))
        }
    }
}

fn run_queue(desk: &mut FrontDesk, command: QueueCommand) -> Result<()> {
    match command {
        QueueCommand::CheckIn(args) => {
            let appointment = Appointment {
                id: args.appointment,
                patient_id: args.patient_id.clone(),
                provider_id: args.provider.clone(),
            };
            let patient = Patient {
                id: args.patient_id,
                name: args.patient_name,
            };
            let provider = Provider {
                id: args.provider,
                name: args.provider_name,
            };

            let entry = desk.scheduler_mut().check_in_at(
                &appointment,
                &patient,
                &provider,
                args.priority,
                frontdesk::utils::current_timestamp(),
            )?;
            print_json(&entry)
        }
        QueueCommand::Start { appointment } => {
            if !desk.scheduler_mut().start_appointment(&appointment) {
                return Err(anyhow!(
                    "Appointment {} is not waiting in any queue",
                    appointment
                ));
            }
            print_json(&desk.scheduler().entry(&appointment))
        }
        QueueCommand::CheckOut { appointment } => {
            let record = desk
                .scheduler_mut()
                .check_out(&appointment)
                .ok_or_else(|| anyhow!("Appointment {} is not in any queue", appointment))?;
            print_json(&record)
        }
        QueueCommand::Priority { appointment, level } => {
            if !desk.scheduler_mut().set_priority(&appointment, level) {
                return Err(anyhow!("Appointment {} is not in any queue", appointment));
            }
            print_json(&desk.scheduler().entry(&appointment))
        }
        QueueCommand::Show { provider } => print_json(&desk.scheduler().queue_for(&provider)),
        QueueCommand::Stats { provider } => {
            let stats = desk.scheduler().wait_time_stats(&provider);
            print_json(&json!({
                "provider_id": provider,
                "completed_visits": stats.sample_count,
                "average_wait_minutes": stats.mean(),
                "min_wait_minutes": stats.min(),
                "max_wait_minutes": stats.max(),
                "std_dev_minutes": stats.standard_deviation(),
                "live_entries": desk.scheduler().queue_for(&provider).len(),
            }))
        }
    }
}

fn run(desk: &mut FrontDesk, command: Command) -> Result<()> {
    match command {
        Command::Slots(command) => run_slots(desk, command),
        Command::Unavailable(command) => run_unavailable(desk, command),
        Command::Queue(command) => run_queue(desk, command),
        Command::Status => print_json(&desk.stats()),
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_banner(&config);
        info!("Dry run completed - exiting without opening data directory");
        return Ok(());
    }

    let mut desk = match FrontDesk::open(&config) {
        Ok(desk) => desk,
        Err(e) => {
            error!("Failed to open front desk: {}", e);
            std::process::exit(1);
        }
    };

    let command = args.command.unwrap_or(Command::Status);
    if let Err(e) = run(&mut desk, command) {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }

    if args.print_metrics {
        print!("{}", desk.metrics().render()?);
    }

    Ok(())
}
