pub mod time_utils;

pub use time_utils::{campaign_date_from_utc, parse_timezone, Clock, FixedClock, SystemClock};
