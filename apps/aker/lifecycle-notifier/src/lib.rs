//! Lifecycle Notifier
//!
//! Reads lifecycle events as JSON Lines and runs each one through a fresh
//! [`RuleEngine`]. Emails go out over SMTP, or are only logged with `--dry-run`.

use clap::Parser;
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FromEnv};
use domain_notifications::{
    Event, LogNotifier, Notifier, NotifierConfig, RuleEngine, SmtpConfig, SmtpNotifier, TemplateEngine,
};
use eyre::{Result, WrapErr};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "lifecycle-notifier")]
#[command(about = "Send email notifications for Aker lifecycle events")]
pub struct Cli {
    /// JSON Lines file with one event per line. Reads stdin when omitted or "-".
    #[arg(short, long)]
    pub events: Option<PathBuf>,

    /// Log notifications instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}

/// Outcome of processing an event stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub processed: usize,
    pub failed: usize,
}

/// Run every event from `reader` through the rule engine, in order.
///
/// Parse and rule errors are logged and counted; only I/O errors on the
/// reader abort the run.
pub fn process_events<R: BufRead>(reader: R, config: &NotifierConfig, notifier: &dyn Notifier) -> Result<Summary> {
    let mut summary = Summary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.wrap_err("Failed to read event stream")?;
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let event: Event = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping malformed event");
                summary.failed += 1;
                continue;
            }
        };

        match RuleEngine::new(config, &event, notifier).check_rules() {
            Ok(()) => summary.processed += 1,
            Err(e) => {
                error!(line = line_no, event_type = %event.event_type, error = %e, "Event rejected");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

fn open_events(path: Option<&PathBuf>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path).wrap_err_with(|| format!("Failed to open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

pub fn run() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let cli = Cli::parse();
    let config = NotifierConfig::from_env().wrap_err("Failed to load notifier configuration")?;

    let notifier: Box<dyn Notifier> = if cli.dry_run {
        Box::new(LogNotifier)
    } else {
        let smtp = SmtpConfig::from_env().wrap_err("Failed to load SMTP configuration")?;
        let smtp = SmtpNotifier::new(smtp, TemplateEngine::new()?)?;
        if !smtp.health_check().wrap_err("SMTP server is not reachable")? {
            eyre::bail!("SMTP server did not accept the connection check");
        }
        Box::new(smtp)
    };

    info!(notifier = notifier.name(), "Processing lifecycle events");

    let reader = open_events(cli.events.as_ref())?;
    let summary = process_events(reader, &config, notifier.as_ref())?;

    info!(processed = summary.processed, failed = summary.failed, "Finished processing events");

    if summary.failed > 0 {
        eyre::bail!("{} event(s) could not be processed", summary.failed);
    }
    Ok(())
}
