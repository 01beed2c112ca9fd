//! Identity strings of the form `Name <email> seconds ±HHMM`.

use crate::error::{CommentError, Result};
use chrono::{DateTime, FixedOffset, Local};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static PERSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:(.*)\s)?<(.*@.*)>(?:\s([0-9]+)\s([\-+][0-9]{4}))?")
        .expect("person pattern is valid")
});

/// Author or amender of a comment.
///
/// # Examples
///
/// ```
/// use comment_core::Person;
///
/// let person = Person::parse("Delisa Mason <name@example.com> 1243040974 -0900").unwrap();
/// assert_eq!(person.name, "Delisa Mason");
/// assert_eq!(person.utc_offset(), "-0900");
/// assert_eq!(person.to_string(), "Delisa Mason <name@example.com> 1243040974 -0900");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    /// Display name, possibly empty.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Signature time including its UTC offset.
    pub date: DateTime<FixedOffset>,
}

impl Person {
    /// Creates a person with an explicit date.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        date: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            date,
        }
    }

    /// Parses `Name <email>` or `Name <email> seconds ±HHMM`.
    ///
    /// Without a timestamp the date is the current local time.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPerson` if no `<email>` part containing `@` is present.
    pub fn parse(input: &str) -> Result<Self> {
        let caps = PERSON_RE
            .captures(input)
            .ok_or_else(|| CommentError::InvalidPerson(input.to_string()))?;

        let name = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let email = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

        let date = match (caps.get(3), caps.get(4)) {
            (Some(secs), Some(offset)) => parse_timestamp_parts(secs.as_str(), offset.as_str())
                .ok_or_else(|| CommentError::InvalidPerson(input.to_string()))?,
            _ => Local::now().fixed_offset(),
        };

        Ok(Self::new(name, email, date))
    }

    /// Builds a person from a git signature. A blank name or email counts as
    /// no identity.
    pub fn from_signature(signature: &git2::Signature<'_>) -> Option<Self> {
        let name = signature.name().filter(|n| !n.trim().is_empty())?;
        let email = signature.email().filter(|e| !e.trim().is_empty())?;
        let when = signature.when();
        let offset = FixedOffset::east_opt(when.offset_minutes() * 60)?;
        let date = DateTime::from_timestamp(when.seconds(), 0)?.with_timezone(&offset);
        Some(Self::new(name, email, date))
    }

    /// The `±HHMM` offset of the signature time.
    pub fn utc_offset(&self) -> String {
        format_offset(self.date.offset())
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} <{}> {}",
            self.name,
            self.email,
            format_timestamp(&self.date)
        )
    }
}

/// Formats a date as `unixSeconds ±HHMM`.
pub fn format_timestamp(date: &DateTime<FixedOffset>) -> String {
    format!("{} {}", date.timestamp(), format_offset(date.offset()))
}

/// Parses `unixSeconds ±HHMM`.
///
/// Returns `None` for anything else.
pub fn parse_timestamp(input: &str) -> Option<DateTime<FixedOffset>> {
    let mut parts = input.split_whitespace();
    let secs = parts.next()?;
    let offset = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    parse_timestamp_parts(secs, offset)
}

fn parse_timestamp_parts(secs: &str, offset: &str) -> Option<DateTime<FixedOffset>> {
    let secs: i64 = secs.parse().ok()?;
    let offset = parse_offset(offset)?;
    Some(DateTime::from_timestamp(secs, 0)?.with_timezone(&offset))
}

fn parse_offset(input: &str) -> Option<FixedOffset> {
    if input.len() != 5 || !input.is_ascii() {
        return None;
    }
    let sign = match &input[..1] {
        "+" => 1,
        "-" => -1,
        _ => return None,
    };
    let hours: i32 = input[1..3].parse().ok()?;
    let minutes: i32 = input[3..5].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn format_offset(offset: &FixedOffset) -> String {
    let total = offset.local_minus_utc();
    let sign = if total < 0 { '-' } else { '+' };
    let minutes = total.abs() / 60;
    format!("{}{:02}{:02}", sign, minutes / 60, minutes % 60)
}
