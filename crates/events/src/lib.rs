//! Event bus and email side channel for the CEU service.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] -- the domain event envelope.
//! - [`delivery`] -- SMTP email delivery behind the [`Mailer`] trait.
//! - [`CertificateNotifier`] -- background task that turns lifecycle events
//!   into emails. Delivery failures are logged and never reach the request
//!   that published the event.

pub mod bus;
pub mod delivery;
pub mod notifier;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError, Mailer};
pub use notifier::{CertificateNotifier, EmailMessage, NotifyError};

/// Published after a new certificate row is committed.
pub const EVENT_CERTIFICATE_ISSUED: &str = "ceu.certificate_issued";

/// Published when a quiz attempt passes; triggers the evaluation reminder.
pub const EVENT_QUIZ_PASSED: &str = "ceu.quiz_passed";
