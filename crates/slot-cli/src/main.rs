//! `slots` CLI: find free appointment slots and book them from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Free 40-minute slots for one day, against a local calendar file
//! slots find --hours working_hours.json --calendar calendar.json \
//!     --from 2026-07-15T00:00:00+03:00 --to 2026-07-16T00:00:00+03:00
//!
//! # Same, as JSON
//! slots find --hours working_hours.json --from ... --to ... --duration 30 --json
//!
//! # Is this interval inside working hours?
//! slots check --hours working_hours.json \
//!     --start 2026-07-15T13:00:00+03:00 --end 2026-07-15T13:30:00+03:00
//!
//! # Talk to the booking assistant on stdin/stdout
//! slots chat --hours working_hours.json --calendar calendar.json
//! ```

mod calendar;
mod logging;

use std::convert::Infallible;
use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use slot_engine::dialogue::{Answerer, KeywordClassifier};
use slot_engine::hours::within_working_hours;
use slot_engine::{
    find_slots, BookingDialogue, Conversation, DialogueSettings, SlotRequest, WorkingHoursPolicy,
};

use crate::calendar::JsonCalendar;

const DEFAULT_RESOURCE: &str = "laserepilation";

#[derive(Parser)]
#[command(name = "slots", version, about = "Free appointment slot finder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List free slots inside a time window
    Find {
        /// Working-hours JSON file
        #[arg(long)]
        hours: String,
        /// Calendar JSON file with busy intervals (empty calendar if omitted)
        #[arg(long)]
        calendar: Option<String>,
        /// Window start (RFC 3339, e.g. 2026-07-15T09:00:00+03:00)
        #[arg(long, value_parser = parse_instant)]
        from: DateTime<FixedOffset>,
        /// Window end (RFC 3339)
        #[arg(long, value_parser = parse_instant)]
        to: DateTime<FixedOffset>,
        /// Slot length in minutes
        #[arg(long, default_value_t = 40, allow_negative_numbers = true)]
        duration: i64,
        /// Calendar resource to look up
        #[arg(long, default_value = DEFAULT_RESOURCE)]
        resource: String,
        /// Print slots as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Check one interval against working hours
    Check {
        /// Working-hours JSON file
        #[arg(long)]
        hours: String,
        /// Interval start (RFC 3339)
        #[arg(long, value_parser = parse_instant)]
        start: DateTime<FixedOffset>,
        /// Interval end (RFC 3339)
        #[arg(long, value_parser = parse_instant)]
        end: DateTime<FixedOffset>,
    },
    /// Run the booking conversation on stdin/stdout, one message per line
    Chat {
        /// Working-hours JSON file
        #[arg(long)]
        hours: String,
        /// Calendar JSON file; bookings are written back to it
        #[arg(long)]
        calendar: String,
        /// Slot length in minutes
        #[arg(long, default_value_t = 40)]
        duration: i64,
        /// Calendar resource to book
        #[arg(long, default_value = DEFAULT_RESOURCE)]
        resource: String,
        /// Client id recorded on bookings
        #[arg(long, default_value = "cli")]
        client: String,
        /// Date used to complete day.month ranges (defaults to today in the policy timezone)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

fn parse_instant(s: &str) -> std::result::Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(s).map_err(|e| format!("invalid RFC 3339 datetime '{}': {}", s, e))
}

/// Fixed reply for messages that are not booking requests.
struct CannedAnswer;

impl Answerer for CannedAnswer {
    type Error = Infallible;

    fn answer(&self, _text: &str) -> std::result::Result<String, Self::Error> {
        Ok("I can help you book an appointment. Just say \"book\".".to_string())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    match cli.command {
        Commands::Find {
            hours,
            calendar,
            from,
            to,
            duration,
            resource,
            json,
        } => {
            let policy = load_policy(&hours)?;
            let calendar = match calendar.as_deref() {
                Some(path) => JsonCalendar::open(path)?,
                None => JsonCalendar::empty(),
            };
            let request = SlotRequest::new(from, to, duration).context("Invalid slot request")?;
            let slots = find_slots(&calendar, &resource, &request, &policy)
                .context("Failed to compute free slots")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&slots)?);
            } else if slots.is_empty() {
                println!("No free slots.");
            } else {
                for (i, slot) in slots.iter().enumerate() {
                    println!(
                        "{}. {} - {}",
                        i + 1,
                        slot.start.to_rfc3339(),
                        slot.end.to_rfc3339()
                    );
                }
            }
        }
        Commands::Check { hours, start, end } => {
            let policy = load_policy(&hours)?;
            if start >= end {
                anyhow::bail!("Interval start {} is not before end {}", start, end);
            }
            let verdict = if within_working_hours(start, end, &policy) {
                "within working hours"
            } else {
                "outside working hours"
            };
            println!("{} - {}: {}", start.to_rfc3339(), end.to_rfc3339(), verdict);
        }
        Commands::Chat {
            hours,
            calendar,
            duration,
            resource,
            client,
            today,
        } => {
            let policy = load_policy(&hours)?;
            let calendar = JsonCalendar::open(&calendar)?;
            let settings = DialogueSettings {
                resource_id: resource,
                duration_minutes: duration,
                ..DialogueSettings::default()
            };
            let today =
                today.unwrap_or_else(|| Utc::now().with_timezone(&policy.timezone()).date_naive());
            run_chat(&policy, settings, calendar, &client, today)?;
        }
    }

    Ok(())
}

fn load_policy(path: &str) -> Result<WorkingHoursPolicy> {
    WorkingHoursPolicy::from_path(path)
        .with_context(|| format!("Failed to load working hours from {}", path))
}

fn run_chat(
    policy: &WorkingHoursPolicy,
    settings: DialogueSettings,
    calendar: JsonCalendar,
    client: &str,
    today: NaiveDate,
) -> Result<()> {
    if settings.duration_minutes <= 0 {
        anyhow::bail!("Slot length must be positive, got {}", settings.duration_minutes);
    }

    let mut dialogue = BookingDialogue::new(
        policy,
        settings,
        calendar,
        KeywordClassifier::default(),
        CannedAnswer,
    );
    let mut conversation = Conversation::new(client);

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        match dialogue.handle(&mut conversation, &line, today) {
            Ok(replies) => {
                for reply in replies {
                    writeln!(stdout, "{}", reply)?;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "message could not be handled");
                writeln!(stdout, "Sorry, something went wrong. Please try again later.")?;
            }
        }
        stdout.flush()?;
    }

    Ok(())
}
