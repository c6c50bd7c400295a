use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::constants::DEFAULT_TIMEZONE;
use crate::errors::{Error, Result};

/// Converts a UTC instant to the institution's calendar date in the given timezone.
///
/// This is the single source of truth for deriving a business date from a
/// timestamp. Campaign windows are compared against this date.
pub fn campaign_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Parses an IANA timezone name such as `America/Sao_Paulo`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| Error::InvalidConfigValue(format!("timezone '{}': {}", name, e)))
}

/// Source of "now" for every date-dependent rule.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;

    /// The current calendar date used for campaign windows.
    fn today(&self) -> NaiveDate;

    /// Timezone in which instants become calendar dates.
    fn timezone(&self) -> Tz;
}

/// Wall clock, with "today" taken in the configured timezone.
#[derive(Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            tz: DEFAULT_TIMEZONE.parse().unwrap_or(chrono_tz::UTC),
        }
    }
}

impl fmt::Debug for SystemClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SystemClock({})", self.tz.name())
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        campaign_date_from_utc(Utc::now(), self.tz)
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}

/// Clock pinned to a single date. Used by tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
    tz: Tz,
}

impl FixedClock {
    /// Pins the clock to `today`, reading instants as UTC.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            tz: chrono_tz::UTC,
        }
    }

    pub fn with_timezone(self, tz: Tz) -> Self {
        Self { tz, ..self }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.today
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now)
    }

    fn today(&self) -> NaiveDate {
        self.today
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}
