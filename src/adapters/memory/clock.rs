//! Clock adapter that always returns the same instant.

use chrono::{DateTime, Utc};

use crate::ports::clock::Clock;

/// Clock pinned to a single timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Parses an RFC 3339 timestamp into a fixed clock.
    ///
    /// # Errors
    ///
    /// Returns the chrono parse error when `timestamp` is not RFC 3339.
    pub fn parse(timestamp: &str) -> Result<Self, chrono::ParseError> {
        Ok(Self(DateTime::parse_from_rfc3339(timestamp)?.with_timezone(&Utc)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_the_pinned_instant() {
        let clock = FixedClock::parse("2025-06-15T10:00:00Z").unwrap();
        assert_eq!(clock.now().to_rfc3339(), "2025-06-15T10:00:00+00:00");
        assert_eq!(clock.now(), clock.now());
    }
}
