//! URL-encoded form bodies and per-field error collection.

use super::WebError;
use crate::organisation::{ports::OrganisationRepositoryError, services::OrganisationError};
use crate::task::{ports::TaskRepositoryError, services::TaskError};
use crate::worker::{ports::WorkerRepositoryError, services::DirectoryError};
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Field key for errors that belong to the whole form.
pub const NON_FIELD: &str = "__all__";

/// A decoded form body. Keys may repeat (multi-select fields).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawForm {
    pairs: Vec<(String, String)>,
}

impl RawForm {
    /// Decodes an `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn parse(body: &[u8]) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(body).into_owned().collect(),
        }
    }

    /// First value of `name`, or `""`.
    #[must_use]
    pub fn get(&self, name: &str) -> &str {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map_or("", |(_, value)| value.as_str())
    }

    /// `true` when a checkbox named `name` was submitted.
    #[must_use]
    pub fn checked(&self, name: &str) -> bool {
        matches!(self.get(name), "on" | "true" | "1")
    }

    /// Every non-blank value of `name`.
    #[must_use]
    pub fn all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// Parses an optional identifier field; blank means `None`.
    pub fn optional_id<T: FromStr>(&self, name: &str, errors: &mut FormErrors) -> Option<T> {
        let raw = self.get(name).trim();
        if raw.is_empty() {
            return None;
        }
        let parsed = raw.parse().ok();
        if parsed.is_none() {
            errors.add(name, "Select a valid choice.");
        }
        parsed
    }

    /// Parses every value of a multi-select identifier field.
    pub fn ids<T: FromStr>(&self, name: &str, errors: &mut FormErrors) -> Vec<T> {
        let mut ids = Vec::new();
        for raw in self.all(name) {
            match raw.parse() {
                Ok(id) => ids.push(id),
                Err(_) => errors.add(name, format!("'{raw}' is not a valid choice.")),
            }
        }
        ids
    }

    /// The submitted values as a template-friendly map (first value wins).
    #[must_use]
    pub fn values(&self) -> BTreeMap<&str, &str> {
        let mut values = BTreeMap::new();
        for (key, value) in &self.pairs {
            values.entry(key.as_str()).or_insert(value.as_str());
        }
        values
    }
}

#[async_trait]
impl<S> FromRequest<S> for RawForm
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(request, state)
            .await
            .map_err(|rejection| WebError::BadRequest(rejection.body_text()))?;
        Ok(Self::parse(&body))
    }
}

/// Error messages keyed by form field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    /// Records a message against `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_owned()).or_default().push(message.into());
    }

    /// A collection holding one message.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    /// `true` when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded against `field`.
    #[must_use]
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }
}

/// Service errors that can be shown next to a form field instead of as an
/// error page.
pub trait FormFailure: Into<WebError> {
    /// The field and message, when the error is the user's to fix.
    fn field_error(&self) -> Option<(&'static str, String)>;

    /// Converts a validation failure into form errors and anything else
    /// into a [`WebError`].
    ///
    /// # Errors
    ///
    /// Returns the [`WebError`] for failures no field can explain.
    fn into_form_errors(self) -> Result<FormErrors, WebError> {
        match self.field_error() {
            Some((field, message)) => Ok(FormErrors::single(field, message)),
            None => Err(self.into()),
        }
    }
}

impl FormFailure for TaskError {
    fn field_error(&self) -> Option<(&'static str, String)> {
        let field = match self {
            Self::Domain(invalid) => invalid.field(),
            Self::Repository(TaskRepositoryError::UnknownWorker(_)) => "assignees",
            Self::Repository(TaskRepositoryError::UnknownTag(_)) => "tags",
            Self::Repository(TaskRepositoryError::UnknownProject(_)) => "project",
            Self::Repository(TaskRepositoryError::UnknownTaskType(_)) => "task_type",
            _ => return None,
        };
        Some((field, capitalised(&self.to_string())))
    }
}

impl FormFailure for OrganisationError {
    fn field_error(&self) -> Option<(&'static str, String)> {
        let field = match self {
            Self::Domain(invalid) => invalid.field(),
            Self::Repository(
                OrganisationRepositoryError::DuplicateTag(_)
                | OrganisationRepositoryError::DuplicateTaskType(_),
            ) => "name",
            Self::Repository(OrganisationRepositoryError::UnknownWorker(_)) => "members",
            _ => return None,
        };
        Some((field, capitalised(&self.to_string())))
    }
}

impl FormFailure for DirectoryError {
    fn field_error(&self) -> Option<(&'static str, String)> {
        let field = match self {
            Self::Domain(invalid) => invalid.field(),
            Self::Repository(WorkerRepositoryError::DuplicateUsername(_)) => "username",
            Self::Repository(WorkerRepositoryError::DuplicateEmail(_)) => "email",
            Self::Repository(WorkerRepositoryError::DuplicatePosition(_)) => "name",
            Self::Repository(WorkerRepositoryError::PositionNotFound(_)) => "position",
            Self::InvalidCredentials => NON_FIELD,
            _ => return None,
        };
        Some((field, capitalised(&self.to_string())))
    }
}

fn capitalised(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Parses a deadline typed in `zone`.
///
/// Accepts `YYYY-MM-DDTHH:MM` (a `datetime-local` input) and `YYYY-MM-DD`,
/// which means the end of that day. Blank input means no deadline.
///
/// # Errors
///
/// Returns the message to show next to the field.
pub fn parse_deadline(raw: &str, zone: Tz) -> Result<Option<DateTime<Utc>>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|day| day.and_time(end_of_day()))
        })
        .map_err(|_| "Enter a valid date.".to_owned())?;
    zone.from_local_datetime(&naive)
        .earliest()
        .map(|local| Some(local.with_timezone(&Utc)))
        .ok_or_else(|| "This time does not exist in the configured time zone.".to_owned())
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
}

/// Formats a deadline for a `datetime-local` input.
#[must_use]
pub fn deadline_input(deadline: Option<DateTime<Utc>>, zone: Tz) -> String {
    deadline.map_or_else(String::new, |at| {
        at.with_timezone(&zone).format("%Y-%m-%dT%H:%M").to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::{FormErrors, FormFailure, RawForm, deadline_input, parse_deadline};
    use crate::organisation::domain::TagId;
    use crate::task::{domain::TaskDomainError, services::TaskError};
    use chrono::{TimeZone, Utc};
    use chrono_tz::Europe::Kyiv;
    use rstest::rstest;

    #[test]
    fn repeated_keys_are_kept() {
        let form = RawForm::parse(b"name=Ship+it&tags=a&tags=b&tags=+&done=on");
        assert_eq!(form.get("name"), "Ship it");
        assert_eq!(form.all("tags"), vec!["a", "b"]);
        assert!(form.checked("done"));
        assert!(!form.checked("missing"));
    }

    #[test]
    fn bad_identifiers_are_reported_per_field() {
        let form = RawForm::parse(b"tags=not-a-uuid&project=");
        let mut errors = FormErrors::default();
        let tags: Vec<TagId> = form.ids("tags", &mut errors);
        let project: Option<TagId> = form.optional_id("project", &mut errors);

        assert!(tags.is_empty());
        assert!(project.is_none());
        assert_eq!(errors.field("tags").len(), 1);
        assert!(errors.field("project").is_empty());
    }

    #[rstest]
    #[case("2030-01-15", Utc.with_ymd_and_hms(2030, 1, 15, 21, 59, 0).single())]
    #[case("2030-01-15T12:30", Utc.with_ymd_and_hms(2030, 1, 15, 10, 30, 0).single())]
    #[case("", None)]
    fn deadlines_are_read_in_the_local_zone(
        #[case] raw: &str,
        #[case] expected: Option<chrono::DateTime<Utc>>,
    ) {
        assert_eq!(parse_deadline(raw, Kyiv), Ok(expected));
    }

    #[test]
    fn malformed_deadline_is_a_field_message() {
        assert!(parse_deadline("15/01/2030", Kyiv).is_err());
    }

    #[test]
    fn deadline_input_round_trips() {
        let at = Utc.with_ymd_and_hms(2030, 1, 15, 10, 30, 0).single();
        let shown = deadline_input(at, Kyiv);
        assert_eq!(shown, "2030-01-15T12:30");
        assert_eq!(parse_deadline(&shown, Kyiv), Ok(at));
    }

    #[test]
    fn validation_errors_become_field_messages() {
        let errors = TaskError::Domain(TaskDomainError::DeadlineInPast)
            .into_form_errors()
            .expect("field error");
        assert_eq!(errors.field("deadline"), ["Deadline cannot be in the past"]);
    }
}
