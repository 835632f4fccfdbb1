//! Lifecycle Notifier - Entry Point
//!
//! Turns lifecycle events read from a file or stdin into email notifications.

fn main() -> eyre::Result<()> {
    lifecycle_notifier::run()
}
