//! # Mail Relay
//!
//! One plaintext email per stored inquiry, sent from the site owner's address
//! to itself. The submitter's details live in the body, never in the envelope.
//!
//! Best effort: every failure ends up as `false` and a log line.
use std::time::Duration;

use lettre::{
    Message, SmtpTransport, Transport,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;
use tracing::{error, info};

use crate::{config::Config, contact::NewContact};

const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

pub trait Notifier: Send + Sync {
    /// Returns whether the notification was handed to the relay.
    fn notify(&self, contact: &NewContact) -> bool;
}

#[derive(Error, Debug)]
enum MailError {
    #[error("bad mailbox: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP failure: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[derive(Clone)]
struct MailCredentials {
    address: String,
    password: String,
}

pub struct SmtpNotifier {
    credentials: Option<MailCredentials>,
    relay: String,
    port: u16,
}

impl SmtpNotifier {
    pub fn from_config(config: &Config) -> Self {
        let credentials = match (&config.email_address, &config.email_password) {
            (Some(address), Some(password)) => Some(MailCredentials {
                address: address.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        Self {
            credentials,
            relay: config.smtp_host.clone(),
            port: config.smtp_port,
        }
    }

    fn send(&self, credentials: &MailCredentials, contact: &NewContact) -> Result<(), MailError> {
        let mailbox: Mailbox = credentials.address.parse()?;

        let email = Message::builder()
            .from(mailbox.clone())
            .to(mailbox)
            .subject(subject(contact))
            .header(ContentType::TEXT_PLAIN)
            .body(compose_body(contact))?;

        let transport = SmtpTransport::starttls_relay(&self.relay)?
            .port(self.port)
            .credentials(Credentials::new(
                credentials.address.clone(),
                credentials.password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        transport.send(&email)?;
        Ok(())
    }
}

impl Notifier for SmtpNotifier {
    fn notify(&self, contact: &NewContact) -> bool {
        let Some(credentials) = &self.credentials else {
            error!("Missing email credentials, notification skipped");
            return false;
        };

        match self.send(credentials, contact) {
            Ok(()) => {
                info!("Email sent successfully");
                true
            }
            Err(e) => {
                error!("Email sending failed: {e}");
                false
            }
        }
    }
}

fn subject(contact: &NewContact) -> String {
    format!("New Contact Form Submission from {}", contact.name())
}

fn compose_body(contact: &NewContact) -> String {
    format!(
        "New message from your portfolio contact form:\n\nName: {}\nEmail: {}\nMessage: {}\n",
        contact.name(),
        contact.email(),
        contact.message()
    )
}
