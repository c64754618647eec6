use std::rc::Rc;

use clap::Subcommand;
use tickdown_core::storage::{Config, Database, SqliteStore, SqliteWakeups};
use tickdown_core::{Event, LaunchReason, SystemClock, TimerService, TimerState, Transition};

use crate::host::HostTicker;
use crate::spoken;

const RECORD_KEY: &str = "countdown";

type Service = TimerService<SqliteStore, SqliteWakeups, HostTicker, SystemClock>;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a countdown
    Start {
        /// Duration in minutes
        minutes: u32,
    },
    /// Stop the running countdown
    Stop,
    /// Print the current timer state as JSON
    Status,
    /// Restart with the previously requested duration
    Restart,
    /// Recover a persisted timer after a process restart
    Resume,
    /// Start (or pick up) a countdown and follow it in the foreground
    Run {
        /// Duration in minutes; picks up the persisted timer when omitted
        minutes: Option<u32>,
    },
    /// Start from a dictated transcript
    Say {
        /// Raw transcript, e.g. "15" or "Fight"
        transcript: String,
    },
}

/// Remaining-time reports land on stderr so stdout stays JSON-only.
fn print_tick(remaining_minutes: i64) {
    if remaining_minutes > 0 {
        eprintln!("{remaining_minutes} minutes remaining");
    } else {
        eprintln!("-- time's up --");
    }
}

fn open() -> Result<(Service, Rc<Database>, Config), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Rc::new(Database::open()?);
    let service = TimerService::load_or_new(
        SqliteStore::new(Rc::clone(&db)),
        SqliteWakeups::new(Rc::clone(&db)),
        HostTicker::default(),
        SystemClock,
        RECORD_KEY,
        Box::new(print_tick),
    )
    .with_retry_cap(config.wakeup_retry_cap);
    Ok((service, db, config))
}

fn report(transition: Transition) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(err) = transition.persist_error {
        eprintln!("warning: timer state not saved: {err}");
    }
    println!("{}", serde_json::to_string_pretty(&transition.event)?);
    Ok(())
}

/// Start a fresh countdown, resetting whatever was running first.
fn start(service: &mut Service, minutes: u32) -> Result<(), Box<dyn std::error::Error>> {
    if minutes == 0 {
        return Err("minutes must be a positive integer".into());
    }
    service.stop();
    report(service.start(minutes)?)
}

/// The process-start recovery path.
///
/// A due row in the wakeups table means the process exists because the
/// external wake-up fired; that is the one case where a deadline that
/// passed during the blackout still owes the caller a completion
/// report.
fn resume(service: &mut Service, db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let now = chrono::Utc::now();
    let launch = match db.due_wakeup(now)? {
        Some(handle) => {
            db.mark_fired(handle)?;
            LaunchReason::Wakeup
        }
        None => LaunchReason::User,
    };
    tracing::info!("launch reason: {launch:?}");

    if service.resume() {
        let deadline = service
            .deadline()
            .ok_or("resumed timer has no deadline")?;
        let remaining_minutes = (deadline.timestamp() - now.timestamp()) / 60;
        println!(
            "{}",
            serde_json::to_string_pretty(&Event::TimerResumed {
                remaining_minutes,
                deadline,
                at: now,
            })?
        );
    } else if launch == LaunchReason::Wakeup && service.state() == TimerState::ExpiredPending {
        let deadline = service
            .deadline()
            .ok_or("expired timer has no deadline")?;
        let remaining_minutes = (deadline.timestamp() - now.timestamp()) / 60;
        print_tick(remaining_minutes);
        println!(
            "{}",
            serde_json::to_string_pretty(&Event::TimerCompleted { deadline, at: now })?
        );
    } else {
        println!("{}", serde_json::to_string_pretty(&service.snapshot())?);
    }
    Ok(())
}

/// Drive the tick cadence until nothing is armed anymore.
fn follow(service: &mut Service) -> Result<(), Box<dyn std::error::Error>> {
    while let Some(delay) = service.ticks().pending() {
        std::thread::sleep(delay);
        let event = service.tick();
        if let Event::TimerCompleted { .. } = event {
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
    }
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let (mut service, db, config) = open()?;

    match action {
        TimerAction::Start { minutes } => start(&mut service, minutes)?,
        TimerAction::Stop => report(service.stop())?,
        TimerAction::Status => {
            println!("{}", serde_json::to_string_pretty(&service.snapshot())?);
        }
        TimerAction::Restart => {
            let minutes = match service.requested_minutes() {
                m if m > 0 => m as u32,
                _ => config.default_minutes,
            };
            start(&mut service, minutes)?;
        }
        TimerAction::Resume => resume(&mut service, &db)?,
        TimerAction::Run { minutes } => {
            match minutes {
                Some(m) => start(&mut service, m)?,
                None => resume(&mut service, &db)?,
            }
            follow(&mut service)?;
        }
        TimerAction::Say { transcript } => {
            let Some(minutes) = spoken::parse_minutes(&transcript) else {
                return Err(format!("can't process: {transcript}").into());
            };
            start(&mut service, minutes)?;
        }
    }
    Ok(())
}
