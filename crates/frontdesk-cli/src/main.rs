//! `frontdesk` CLI — check, book and audit appointments in a JSON ledger.
//!
//! A ledger is a JSON document holding the doctor roster and every booked
//! appointment:
//!
//! ```json
//! {
//!   "doctors": [{"id": 1, "first_name": "Amara", "surname": "Okafor"}],
//!   "appointments": [
//!     {"id": 1, "doctor_id": 1, "patient_id": 7, "date": "2024-01-10",
//!      "start_time": "09:00", "end_time": "09:30"}
//!   ]
//! }
//! ```
//!
//! ## Usage
//!
//! ```sh
//! # Would this booking be accepted?
//! frontdesk check -l ledger.json --doctor 1 --patient 7 \
//!     --date 2024-01-10 --start 09:15 --end 09:45
//!
//! # Book it (rewrites the ledger in place)
//! frontdesk book -l ledger.json --doctor 1 --patient 7 \
//!     --date 2024-01-10 --start 09:30 --end 10:00 --diagnosis "Follow-up"
//!
//! # Free time per doctor for a date (default: today)
//! frontdesk availability -l ledger.json --date 2024-01-10 --format json
//!
//! # 30-minute slots on the configured grid for one doctor
//! frontdesk suggest -l ledger.json --doctor 1 --date 2024-01-10 --duration 30
//!
//! # Cancel an appointment, list double-bookings
//! frontdesk cancel -l ledger.json --id 3
//! frontdesk audit -l ledger.json
//! ```
//!
//! Rejected checks/bookings and a non-empty audit print to stdout and exit
//! with status 2.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use frontdesk_engine::availability::suggest_slots;
use frontdesk_engine::conflict::Conflict;
use frontdesk_engine::{
    book, check_conflict_on, daily_availability, find_double_bookings, parse_date, parse_time,
    AppointmentId, AppointmentStore, AvailabilityReport, BookingPath, BookingRequest, DoctorId,
    EngineError, Ledger, PatientId, Rejection, SchedulingConfig,
};
use serde_json::json;
use std::io::{self, Read};
use std::process;
use tracing_subscriber::EnvFilter;

/// Exit status for a refused booking or a dirty audit.
const EXIT_REJECTED: i32 = 2;

#[derive(Parser)]
#[command(
    name = "frontdesk",
    version,
    about = "Hospital front-desk appointment checks and availability"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Scheduling config JSON file (working hours, horizon, weekday policy)
    #[arg(long, global = true, env = "FRONTDESK_CONFIG")]
    config: Option<String>,

    /// Date to treat as today (YYYY-MM-DD); defaults to the local date
    #[arg(long, global = true)]
    today: Option<String>,

    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether an appointment could be booked, without booking it
    Check {
        /// Ledger file (reads from stdin if omitted)
        #[arg(short, long)]
        ledger: Option<String>,
        #[command(flatten)]
        candidate: CandidateArgs,
        #[arg(long, value_enum, default_value_t)]
        format: Format,
    },
    /// Check and book an appointment, writing the updated ledger
    Book {
        /// Ledger file to read
        #[arg(short, long)]
        ledger: String,
        #[command(flatten)]
        candidate: CandidateArgs,
        /// Where to write the updated ledger (defaults to the input file)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Cancel an appointment by id
    Cancel {
        /// Ledger file to read
        #[arg(short, long)]
        ledger: String,
        /// Appointment id
        #[arg(long)]
        id: u64,
        /// Where to write the updated ledger (defaults to the input file)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show free intervals and utilization per doctor for a date
    Availability {
        /// Ledger file (reads from stdin if omitted)
        #[arg(short, long)]
        ledger: Option<String>,
        /// Date to report on (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Only report this doctor
        #[arg(long)]
        doctor: Option<u64>,
        #[arg(long, value_enum, default_value_t)]
        format: Format,
    },
    /// Suggest bookable slots for one doctor on the configured grid
    Suggest {
        /// Ledger file (reads from stdin if omitted)
        #[arg(short, long)]
        ledger: Option<String>,
        #[arg(long)]
        doctor: u64,
        /// Date to search (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Appointment length in minutes (1 to 1440)
        #[arg(
            long,
            default_value_t = 30,
            value_parser = clap::value_parser!(i64).range(1..=1440)
        )]
        duration: i64,
        #[arg(long, value_enum, default_value_t)]
        format: Format,
    },
    /// List overlapping appointments already in the ledger
    Audit {
        /// Ledger file (reads from stdin if omitted)
        #[arg(short, long)]
        ledger: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        format: Format,
    },
}

/// The proposed appointment, as typed at the front desk.
#[derive(Args)]
struct CandidateArgs {
    #[arg(long)]
    doctor: u64,
    #[arg(long)]
    patient: u64,
    /// Appointment date (YYYY-MM-DD)
    #[arg(long)]
    date: String,
    /// Start time (HH:MM)
    #[arg(long)]
    start: String,
    /// End time (HH:MM)
    #[arg(long)]
    end: String,
    #[arg(long)]
    diagnosis: Option<String>,
    /// Book from a doctor's availability view (weekday policy applies)
    #[arg(long)]
    from_availability: bool,
}

impl CandidateArgs {
    fn to_request(&self) -> Result<BookingRequest> {
        Ok(BookingRequest {
            doctor_id: DoctorId(self.doctor),
            patient_id: PatientId(self.patient),
            date: parse_date(&self.date)?,
            start_time: parse_time(&self.start)?,
            end_time: parse_time(&self.end)?,
            diagnosis: self.diagnosis.clone(),
        })
    }

    fn path(&self) -> BookingPath {
        if self.from_availability {
            BookingPath::Availability
        } else {
            BookingPath::Appointments
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum Format {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let today = match cli.today.as_deref() {
        Some(raw) => parse_date(raw).context("Invalid --today")?,
        None => Local::now().date_naive(),
    };

    match cli.command {
        Commands::Check {
            ledger,
            candidate,
            format,
        } => {
            let ledger = read_ledger(ledger.as_deref())?;
            let request = candidate.to_request()?;
            ensure_known_doctor(&ledger, request.doctor_id)?;

            let existing = ledger.appointments_on(request.date)?;
            let result = check_conflict_on(
                &existing,
                &request,
                today,
                &config,
                candidate.path(),
                &ledger,
            );
            print_check(&result, format)?;
            if result.is_err() {
                process::exit(EXIT_REJECTED);
            }
        }
        Commands::Book {
            ledger: path,
            candidate,
            output,
        } => {
            let mut ledger = read_ledger(Some(&path))?;
            let request = candidate.to_request()?;
            ensure_known_doctor(&ledger, request.doctor_id)?;

            match book(&mut ledger, request, today, &config, candidate.path()) {
                Ok(appointment) => {
                    let target = output.as_deref().unwrap_or(&path);
                    write_ledger(target, &ledger)?;
                    println!(
                        "Booked appointment #{} on {} {}",
                        appointment.id.map(|id| id.to_string()).unwrap_or_default(),
                        appointment.date,
                        appointment.interval()
                    );
                }
                Err(EngineError::Rejected(rejection)) => {
                    println!("Rejected ({}): {}", rejection.kind(), rejection);
                    process::exit(EXIT_REJECTED);
                }
                Err(e) => return Err(e).context("Failed to book appointment"),
            }
        }
        Commands::Cancel {
            ledger: path,
            id,
            output,
        } => {
            let mut ledger = read_ledger(Some(&path))?;
            let removed = ledger
                .remove(AppointmentId(id))
                .context("Failed to cancel appointment")?;
            let target = output.as_deref().unwrap_or(&path);
            write_ledger(target, &ledger)?;
            println!(
                "Cancelled appointment #{} on {} {}",
                id,
                removed.date,
                removed.interval()
            );
        }
        Commands::Availability {
            ledger,
            date,
            doctor,
            format,
        } => {
            let ledger = read_ledger(ledger.as_deref())?;
            let date = resolve_date(date.as_deref(), today)?;

            let mut reports =
                daily_availability(&ledger.doctors, &ledger.appointments, date, &config);
            if let Some(doctor) = doctor {
                let doctor = DoctorId(doctor);
                ensure_known_doctor(&ledger, doctor)?;
                reports.retain(|r| r.doctor_id == doctor);
            }
            print_availability(&ledger, &reports, format)?;
        }
        Commands::Suggest {
            ledger,
            doctor,
            date,
            duration,
            format,
        } => {
            let ledger = read_ledger(ledger.as_deref())?;
            let date = resolve_date(date.as_deref(), today)?;
            let doctor = ledger
                .doctor(DoctorId(doctor))
                .with_context(|| format!("Unknown doctor: #{}", doctor))?;

            let report = daily_availability(
                std::slice::from_ref(doctor),
                &ledger.appointments,
                date,
                &config,
            )
            .pop()
            .context("No availability computed")?;
            let slots = suggest_slots(&report, duration, config.slot_granularity_minutes);

            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&slots)?),
                Format::Text if slots.is_empty() => {
                    println!("No {}-minute slots available on {}", duration, date)
                }
                Format::Text => {
                    for slot in &slots {
                        println!("{}", slot);
                    }
                }
            }
        }
        Commands::Audit { ledger, format } => {
            let ledger = read_ledger(ledger.as_deref())?;
            let conflicts = find_double_bookings(&ledger.appointments);
            print_audit(&conflicts, format)?;
            if !conflicts.is_empty() {
                process::exit(EXIT_REJECTED);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("FRONTDESK_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&str>) -> Result<SchedulingConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path))?;
            SchedulingConfig::from_json_str(&raw)
                .with_context(|| format!("Invalid config: {}", path))
        }
        None => Ok(SchedulingConfig::default()),
    }
}

fn resolve_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match raw {
        Some(raw) => Ok(parse_date(raw)?),
        None => Ok(today),
    }
}

fn ensure_known_doctor(ledger: &Ledger, id: DoctorId) -> Result<()> {
    if ledger.doctor(id).is_none() {
        anyhow::bail!("Unknown doctor: #{}", id);
    }
    Ok(())
}

fn doctor_label(ledger: &Ledger, id: DoctorId) -> String {
    match ledger.doctor(id) {
        Some(doctor) => format!("Dr. {} (#{})", doctor.name(), id),
        None => format!("Doctor #{}", id),
    }
}

fn print_check(result: &Result<(), Rejection>, format: Format) -> Result<()> {
    match (format, result) {
        (Format::Text, Ok(())) => println!("Admissible"),
        (Format::Text, Err(rejection)) => {
            println!("Rejected ({}): {}", rejection.kind(), rejection)
        }
        (Format::Json, Ok(())) => {
            println!("{}", serde_json::to_string_pretty(&json!({ "admissible": true }))?)
        }
        (Format::Json, Err(rejection)) => {
            let body = json!({
                "admissible": false,
                "message": rejection.to_string(),
                "rejection": rejection,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }
    Ok(())
}

fn print_availability(
    ledger: &Ledger,
    reports: &[AvailabilityReport],
    format: Format,
) -> Result<()> {
    if let Format::Json = format {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    for report in reports {
        let label = doctor_label(ledger, report.doctor_id);
        if report.closed {
            println!("{}  {}  closed (weekends)", report.date, label);
            continue;
        }
        println!(
            "{}  {}  busy {} min, free {} min, {:.1}% utilized",
            report.date,
            label,
            report.busy_minutes,
            report.free_minutes,
            report.utilization_percentage
        );
        for free in &report.free_intervals {
            println!("  free {} ({} min)", free, free.duration_minutes());
        }
    }
    Ok(())
}

fn print_audit(conflicts: &[Conflict], format: Format) -> Result<()> {
    if let Format::Json = format {
        println!("{}", serde_json::to_string_pretty(conflicts)?);
        return Ok(());
    }

    if conflicts.is_empty() {
        println!("No double bookings");
        return Ok(());
    }
    for conflict in conflicts {
        let a = &conflict.appointment_a;
        let b = &conflict.appointment_b;
        println!(
            "{} {:?} double booking: #{} {} and #{} {} overlap by {} min",
            a.date,
            conflict.kind,
            a.id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
            a.interval(),
            b.id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
            b.interval(),
            conflict.overlap_minutes
        );
    }
    Ok(())
}

fn read_ledger(path: Option<&str>) -> Result<Ledger> {
    let raw = read_input(path)?;
    Ledger::from_json_str(&raw).context("Failed to parse ledger JSON")
}

fn write_ledger(path: &str, ledger: &Ledger) -> Result<()> {
    let json = ledger.to_json_pretty()?;
    std::fs::write(path, json + "\n").with_context(|| format!("Failed to write file: {}", path))?;
    tracing::info!(path, appointments = ledger.appointments.len(), "ledger written");
    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
