//! Failure alerting
//!
//! Runs the poll-evaluate-notify cycle on a fixed interval and mails a
//! summary whenever the search backend reports matching failures.

pub mod checker;
pub mod notifier;

pub use checker::{CycleError, CycleOutcome, FailurePolicy, HealthChecker};
pub use notifier::{Notification, Notifier, NotifierError, SmtpNotifier};
