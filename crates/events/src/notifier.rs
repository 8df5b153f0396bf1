//! Lifecycle email notifications.
//!
//! [`CertificateNotifier`] subscribes to the event bus and sends two kinds of
//! email: the certificate-issued notice (with the public verification link)
//! and the evaluation reminder after a passed quiz. It never blocks or fails
//! the request that published the event.

use std::sync::Arc;

use interpret_core::ceu::verification::verification_url;
use interpret_core::ceu::ISSUER_NAME;
use interpret_core::types::DbId;
use interpret_db::repositories::{CertificateRepo, ProfileRepo};
use interpret_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;
use crate::delivery::email::{EmailError, Mailer};
use crate::{EVENT_CERTIFICATE_ISSUED, EVENT_QUIZ_PASSED};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error("Event {0} is missing {1}")]
    MalformedEvent(String, &'static str),

    #[error("{entity} {id} not found")]
    Missing { entity: &'static str, id: DbId },
}

/// Subject and plain-text body of an outgoing email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
}

pub fn certificate_issued_message(
    holder_name: &str,
    certificate_number: &str,
    title: &str,
    ceu_value: f64,
    verify_url: &str,
) -> EmailMessage {
    EmailMessage {
        subject: format!("Your CEU certificate for \"{title}\""),
        body: format!(
            "Hi {holder_name},\n\n\
             Your certificate {certificate_number} for \"{title}\" ({ceu_value} CEUs) has been issued.\n\n\
             Anyone can verify it at:\n{verify_url}\n\n\
             {ISSUER_NAME}"
        ),
    }
}

pub fn evaluation_reminder_message(holder_name: &str, module_title: &str) -> EmailMessage {
    EmailMessage {
        subject: format!("One step left for \"{module_title}\""),
        body: format!(
            "Hi {holder_name},\n\n\
             You passed the quiz for \"{module_title}\". Complete the short evaluation \
             to receive your CEU certificate.\n\n\
             {ISSUER_NAME}"
        ),
    }
}

/// Background service that turns CEU lifecycle events into emails.
pub struct CertificateNotifier {
    pool: DbPool,
    mailer: Option<Arc<dyn Mailer>>,
    public_base_url: String,
}

impl CertificateNotifier {
    /// `mailer` is `None` when SMTP is not configured; events are then
    /// consumed and dropped.
    pub fn new(
        pool: DbPool,
        mailer: Option<Arc<dyn Mailer>>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            mailer,
            public_base_url: public_base_url.into(),
        }
    }

    /// Run until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.handle(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to send lifecycle email"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Certificate notifier lagged, emails skipped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, certificate notifier shutting down");
                    break;
                }
            }
        }
    }

    async fn handle(&self, event: &PlatformEvent) -> Result<(), NotifyError> {
        let Some(mailer) = &self.mailer else {
            return Ok(());
        };

        match event.event_type.as_str() {
            EVENT_CERTIFICATE_ISSUED => self.certificate_issued(mailer.as_ref(), event).await,
            EVENT_QUIZ_PASSED => self.quiz_passed(mailer.as_ref(), event).await,
            _ => Ok(()),
        }
    }

    async fn certificate_issued(
        &self,
        mailer: &dyn Mailer,
        event: &PlatformEvent,
    ) -> Result<(), NotifyError> {
        let certificate_id = event
            .source_entity_id
            .ok_or_else(|| NotifyError::MalformedEvent(event.event_type.clone(), "certificate id"))?;

        let certificate = CertificateRepo::find_by_id(&self.pool, certificate_id)
            .await?
            .ok_or(NotifyError::Missing {
                entity: "Certificate",
                id: certificate_id,
            })?;
        let profile = ProfileRepo::find_by_id(&self.pool, certificate.user_id)
            .await?
            .ok_or(NotifyError::Missing {
                entity: "Profile",
                id: certificate.user_id,
            })?;

        let message = certificate_issued_message(
            &profile.full_name,
            &certificate.certificate_number,
            &certificate.title,
            certificate.ceu_value,
            &verification_url(&self.public_base_url, certificate.id),
        );
        mailer
            .send(&profile.email, &message.subject, &message.body)
            .await?;

        tracing::info!(
            certificate_id = %certificate.id,
            user_id = %certificate.user_id,
            "Certificate email sent"
        );
        Ok(())
    }

    async fn quiz_passed(&self, mailer: &dyn Mailer, event: &PlatformEvent) -> Result<(), NotifyError> {
        let user_id = event
            .actor_user_id
            .ok_or_else(|| NotifyError::MalformedEvent(event.event_type.clone(), "actor"))?;
        let module_title = event.payload["module_title"]
            .as_str()
            .ok_or_else(|| NotifyError::MalformedEvent(event.event_type.clone(), "module_title"))?;

        let profile = ProfileRepo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or(NotifyError::Missing {
                entity: "Profile",
                id: user_id,
            })?;

        let message = evaluation_reminder_message(&profile.full_name, module_title);
        mailer
            .send(&profile.email, &message.subject, &message.body)
            .await?;
        Ok(())
    }
}
