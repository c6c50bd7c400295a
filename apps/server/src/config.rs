use std::{net::SocketAddr, time::Duration};

use anyhow::{bail, Context};
use caritas_core::constants::DEFAULT_TIMEZONE;
use caritas_core::utils::parse_timezone;
use chrono_tz::Tz;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Period of the background status sweep.
    pub sweep_interval: Duration,
    /// Time zone that decides what "today" is for campaign windows.
    pub timezone: Tz,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            db_path: "./db/caritas.db".into(),
            cors_allow: vec!["*".into()],
            request_timeout: Duration::from_millis(30_000),
            sweep_interval: Duration::from_secs(3600),
            timezone: DEFAULT_TIMEZONE.parse().unwrap_or(chrono_tz::UTC),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Config::default();

        let listen_addr = match std::env::var("CARITAS_LISTEN_ADDR") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("Invalid CARITAS_LISTEN_ADDR '{}'", raw))?,
            Err(_) => defaults.listen_addr,
        };
        let db_path = std::env::var("CARITAS_DB_PATH").unwrap_or(defaults.db_path);
        let cors_allow = std::env::var("CARITAS_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms = read_u64("CARITAS_REQUEST_TIMEOUT_MS", 30_000)?;
        let sweep_secs = read_u64("CARITAS_SWEEP_INTERVAL_SECS", 3600)?;
        if sweep_secs == 0 {
            bail!("CARITAS_SWEEP_INTERVAL_SECS must be at least 1");
        }
        let timezone = match std::env::var("CARITAS_TIMEZONE") {
            Ok(raw) => parse_timezone(&raw)?,
            Err(_) => defaults.timezone,
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            sweep_interval: Duration::from_secs(sweep_secs),
            timezone,
        })
    }
}

fn read_u64(key: &str, default: u64) -> anyhow::Result<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {} '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}
