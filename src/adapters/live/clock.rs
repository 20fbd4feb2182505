//! Live clock backed by the system time.

use chrono::{DateTime, Utc};

use crate::ports::clock::Clock;

/// System clock used for contract timestamps outside of tests.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
