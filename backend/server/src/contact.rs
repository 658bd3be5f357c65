//! # Contact Submissions
//!
//! validate → persist → notify
//!
//! - Validation fails fast on the first violation, nothing is stored or sent
//! - A storage failure aborts before any email is attempted
//! - A notification failure is swallowed, the inquiry is already on disk so
//!   the caller still gets a success with a softer message
//! - Nothing is retried
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{
    database::{ContactRecord, Datastore},
    error::AppError,
    mailer::Notifier,
};

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_MESSAGE_CHARS: usize = 1000;
const MAX_EMAIL_CHARS: usize = 254;
const MAX_LOCAL_PART_CHARS: usize = 64;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+(?:[A-Za-z]{2,63}|[Xx][Nn]--[A-Za-z0-9-]{1,59})$",
    )
    .expect("email pattern is valid")
});

/// Raw form body. Absent keys deserialize as empty strings so they fail the
/// required-field check instead of the JSON decoder.
#[derive(Debug, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// A trimmed submission that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewContact {
    name: String,
    email: String,
    message: String,
}

impl NewContact {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ContactForm {
    pub fn new(name: &str, email: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        }
    }

    pub fn validate(self) -> Result<NewContact, AppError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();

        if name.is_empty() || email.is_empty() || message.is_empty() {
            warn!("Missing required fields");
            return Err(AppError::MissingFields);
        }

        if !is_valid_email(email) {
            warn!("Invalid email format");
            return Err(AppError::InvalidEmail);
        }

        if name.chars().count() > MAX_NAME_CHARS || message.chars().count() > MAX_MESSAGE_CHARS {
            warn!("Input too long");
            return Err(AppError::InputTooLong);
        }

        Ok(NewContact {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        })
    }
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, _)) = email.rsplit_once('@') else {
        return false;
    };

    email.chars().count() <= MAX_EMAIL_CHARS
        && local.chars().count() <= MAX_LOCAL_PART_CHARS
        && EMAIL.is_match(email)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Delivered(ContactRecord),
    /// Degraded success, stored but the email did not go out.
    SavedNotEmailed(ContactRecord),
}

impl Outcome {
    pub fn message(&self) -> &'static str {
        match self {
            Outcome::Delivered(_) => "Message received and email sent",
            Outcome::SavedNotEmailed(_) => {
                "Message saved, but failed to send email. I will get back to you soon."
            }
        }
    }

    pub fn record(&self) -> &ContactRecord {
        match self {
            Outcome::Delivered(record) | Outcome::SavedNotEmailed(record) => record,
        }
    }
}

/// Runs one submission to completion. Blocking, call from the blocking pool.
pub fn submit(
    store: &Datastore,
    notifier: &dyn Notifier,
    form: ContactForm,
) -> Result<Outcome, AppError> {
    let contact = form.validate()?;

    let record = store.insert_contact(&contact).map_err(|e| {
        error!("Database error: {e}");
        AppError::Storage(e)
    })?;
    info!(id = record.id, "Message stored in database");

    if notifier.notify(&contact) {
        Ok(Outcome::Delivered(record))
    } else {
        warn!(id = record.id, "Email sending failed, but message saved");
        Ok(Outcome::SavedNotEmailed(record))
    }
}
