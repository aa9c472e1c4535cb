use serde::Serialize;
use std::{future::Future, time::Duration};
use thiserror::Error;

const MIN_MESSAGE_CHARS: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub const ALL: [Self; 3] = [Self::Name, Self::Email, Self::Message];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Message => "Message",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Message => &self.message,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Message => self.message = value,
        }
    }

    /// Checks every field and returns either the trimmed message or one
    /// error per failing field.
    pub fn validate(&self) -> Result<ContactMessage, Vec<FieldError>> {
        let errors: Vec<FieldError> = Field::ALL
            .into_iter()
            .filter_map(|field| {
                check_field(field, self.value(field).trim()).map(|message| FieldError { field, message })
            })
            .collect();

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ContactMessage {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        })
    }
}

fn check_field(field: Field, value: &str) -> Option<&'static str> {
    match field {
        Field::Name if value.is_empty() => Some("Please enter your name"),
        Field::Email if value.is_empty() => Some("Please enter your email"),
        Field::Email if !looks_like_email(value) => Some("Please enter a valid email address"),
        Field::Message if value.is_empty() => Some("Please enter a message"),
        Field::Message if value.chars().count() < MIN_MESSAGE_CHARS => {
            Some("Message should be at least 10 characters")
        }
        _ => None,
    }
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("message could not be delivered: {0}")]
    Delivery(String),
    #[error("you appear to be offline")]
    Offline,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Sending,
    Sent,
    Failed(String),
}

impl SubmitStatus {
    /// How long the status banner stays up, if it clears by itself.
    pub fn auto_dismiss(&self, success_ttl: Duration) -> Option<Duration> {
        matches!(self, Self::Sent).then_some(success_ttl)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContactAction {
    Edit(Field, String),
    Submit,
    Delivered(Result<(), ContactError>),
    Dismiss,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactState {
    pub form: ContactForm,
    pub errors: Vec<FieldError>,
    pub status: SubmitStatus,
    /// Bumped on every accepted submit.
    pub submission: u32,
    pending: Option<ContactMessage>,
}

impl ContactState {
    pub fn pending(&self) -> Option<&ContactMessage> {
        self.pending.as_ref()
    }

    pub fn error_for(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }

    pub fn apply(&mut self, action: ContactAction) {
        match action {
            ContactAction::Edit(field, value) => {
                self.form.set(field, value);
                self.errors.retain(|error| error.field != field);
            }
            ContactAction::Submit => {
                if self.status == SubmitStatus::Sending {
                    return;
                }
                match self.form.validate() {
                    Ok(message) => {
                        self.errors.clear();
                        self.status = SubmitStatus::Sending;
                        self.pending = Some(message);
                        self.submission = self.submission.wrapping_add(1);
                    }
                    Err(errors) => {
                        self.errors = errors;
                        self.status = SubmitStatus::Idle;
                    }
                }
            }
            ContactAction::Delivered(result) => {
                if self.status != SubmitStatus::Sending {
                    return;
                }
                self.pending = None;
                match result {
                    Ok(()) => {
                        self.form = ContactForm::default();
                        self.status = SubmitStatus::Sent;
                    }
                    Err(err) => self.status = SubmitStatus::Failed(err.to_string()),
                }
            }
            ContactAction::Dismiss => {
                if matches!(self.status, SubmitStatus::Sent | SubmitStatus::Failed(_)) {
                    self.status = SubmitStatus::Idle;
                }
            }
        }
    }
}

pub trait ContactTransport {
    fn deliver(&self, message: ContactMessage) -> impl Future<Output = Result<(), ContactError>>;
}

pub async fn submit<T: ContactTransport>(transport: &T, message: ContactMessage) -> ContactAction {
    let result = transport.deliver(message).await;
    match &result {
        Ok(()) => log::info!("contact message delivered"),
        Err(err) => log::warn!("contact message failed: {err}"),
    }
    ContactAction::Delivered(result)
}

/// Waits out the banner lifetime of `status` using `sleep`, then yields the
/// action that clears it. `None` right away for statuses that stay up.
pub async fn dismiss_when_due<S, F>(
    status: &SubmitStatus,
    success_ttl: Duration,
    sleep: S,
) -> Option<ContactAction>
where
    S: FnOnce(Duration) -> F,
    F: Future<Output = ()>,
{
    let after = status.auto_dismiss(success_ttl)?;
    sleep(after).await;
    Some(ContactAction::Dismiss)
}
