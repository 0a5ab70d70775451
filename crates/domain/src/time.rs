//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for trigger fire dates and similar.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
