//! Side-effect collaborators for council-rs
//!
//! The deliberation core calls into this crate exactly once per run for
//! each channel: [`ReportWriter`] persists the assembled report to disk,
//! and [`Mailer`] delivers the report (or an unrecoverable-failure alert)
//! through an HTTP mail gateway. Delivery failures are the caller's to log;
//! nothing here aborts a run.

pub mod error;
pub mod mailer;
pub mod report;

pub use error::NotifyError;
pub use mailer::{Mailer, MailerConfig};
pub use report::ReportWriter;
