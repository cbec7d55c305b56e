use thiserror::Error;
use time::Duration;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Default, Hash)]
pub struct PositiveDuration(Duration);

impl PositiveDuration {
    #[must_use]
    pub fn new(duration: Duration) -> Option<Self> {
        duration.is_positive().then_some(Self(duration))
    }

    pub fn from_seconds(seconds: i64) -> Result<Self, NonPositiveDurationError> {
        Duration::seconds(seconds).try_into()
    }

    #[must_use]
    pub fn get(&self) -> Duration {
        self.0
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The duration is not positive: {0}")]
pub struct NonPositiveDurationError(Duration);

impl TryFrom<Duration> for PositiveDuration {
    type Error = NonPositiveDurationError;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(NonPositiveDurationError(value))
    }
}

/// Trims surrounding whitespace and checks the character count against `max_len`.
pub(crate) fn trimmed_within(value: &str, max_len: usize) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty() && trimmed.chars().count() <= max_len).then_some(trimmed)
}

/// Accepts `local@domain` shaped addresses with a dot in the domain part.
pub(crate) fn is_email_address(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// Serde adapter for calendar dates in `YYYY-MM-DD` form.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _, ser::Error as _};
    use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

    const FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date.format(FORMAT).map_err(S::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Date::parse(&raw, FORMAT).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use crate::util::{PositiveDuration, is_email_address, trimmed_within};
    use time::Duration;

    #[test]
    fn positive_duration() {
        assert!(PositiveDuration::new(Duration::seconds(1)).is_some());
        assert!(PositiveDuration::new(Duration::ZERO).is_none());
        assert!(PositiveDuration::from_seconds(-5).is_err());
        assert_eq!(
            PositiveDuration::from_seconds(7200).map(|duration| duration.get()),
            Ok(Duration::hours(2))
        );
    }

    #[test]
    fn trimmed_text_bounds() {
        assert_eq!(trimmed_within("  Ana ", 3), Some("Ana"));
        assert_eq!(trimmed_within("   ", 3), None);
        assert_eq!(trimmed_within("Anna", 3), None);
        assert_eq!(trimmed_within("äöü", 3), Some("äöü"));
    }

    #[test]
    fn email_address_shape() {
        assert!(is_email_address("jane@example.com"));
        assert!(is_email_address("j.doe+tag@mail.example.org"));
        assert!(!is_email_address("jane.example.com"));
        assert!(!is_email_address("@example.com"));
        assert!(!is_email_address("jane@localhost"));
        assert!(!is_email_address("jane@@example.com"));
        assert!(!is_email_address("ja ne@example.com"));
    }
}
