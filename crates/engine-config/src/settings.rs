//! Runtime settings resolved from environment variables.

use crate::{
    env::EnvVars,
    environment::Environment,
    error::ConfigurationError,
    logging::{LogFormat, LogSettings},
};
use engine_core::etl::EtlOptions;
use model::core::table::TableIdent;
use planner::query::impressions::AggregationOptions;
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    str::FromStr,
    time::Duration,
};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIGQUERY_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigQuerySettings {
    /// Project the query jobs run in.
    pub project_id: String,
    pub location: Option<String>,
    /// When absent, tokens come from the instance metadata server.
    pub access_token: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: Environment,
    pub listen_addr: SocketAddr,
    pub log: LogSettings,
    pub bigquery: BigQuerySettings,
    pub destination: TableIdent,
    pub etl: EtlOptions,
}

impl Settings {
    pub fn from_env(env: &EnvVars) -> Result<Self, ConfigurationError> {
        let environment = match env.get("ETL_ENV") {
            Some(name) => name.parse::<Environment>()?,
            None => Environment::default(),
        };
        let profile = environment.profile();

        let port = parse_or("PORT", env, DEFAULT_PORT)?;
        let listen_addr = match env.get("LISTEN_ADDR") {
            Some(addr) => addr.parse::<SocketAddr>().map_err(|e| {
                ConfigurationError::invalid("LISTEN_ADDR", addr, e.to_string())
            })?,
            None => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port),
        };

        let default_level = match environment {
            Environment::Development => "debug",
            _ => "info",
        };
        let default_format = match environment {
            Environment::Production => LogFormat::Json,
            _ => LogFormat::Text,
        };
        let log = LogSettings {
            level: env.get("LOG_LEVEL").unwrap_or(default_level).to_string(),
            format: parse_or("LOG_FORMAT", env, default_format)?,
        };

        let destination = match env.get("ETL_DESTINATION_TABLE") {
            Some(name) => TableIdent::resolve(name, &profile.table_defaults())?,
            None => profile.destination(),
        };

        let timeout_secs = parse_or("BIGQUERY_TIMEOUT_SECS", env, DEFAULT_BIGQUERY_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigurationError::invalid(
                "BIGQUERY_TIMEOUT_SECS",
                "0",
                "must be positive",
            ));
        }
        let bigquery = BigQuerySettings {
            project_id: destination.project.clone(),
            location: env.get("BIGQUERY_LOCATION").map(str::to_string),
            access_token: env.get("BIGQUERY_ACCESS_TOKEN").map(str::to_string),
            timeout: Duration::from_secs(timeout_secs),
        };

        let mut aggregation = AggregationOptions::default();
        if let Some(opening) = env.get("ETL_OPENING_TIME") {
            aggregation.opening_time = parse_clock_time("ETL_OPENING_TIME", opening)?;
        }
        if let Some(closing) = env.get("ETL_CLOSING_TIME") {
            aggregation.closing_time = parse_clock_time("ETL_CLOSING_TIME", closing)?;
        }
        let preclean_partition = match env.get("ETL_PRECLEAN_PARTITION") {
            Some(flag) => parse_bool("ETL_PRECLEAN_PARTITION", flag)?,
            None => false,
        };

        Ok(Settings {
            environment,
            listen_addr,
            log,
            bigquery,
            destination,
            etl: EtlOptions {
                aggregation,
                preclean_partition,
            },
        })
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log.level = level.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.listen_addr.set_port(port);
        self
    }
}

fn parse_or<T>(key: &str, env: &EnvVars, default: T) -> Result<T, ConfigurationError>
where
    T: FromStr,
    T::Err: ToString,
{
    match env.get(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigurationError::invalid(key, raw, e.to_string())),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigurationError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigurationError::invalid(key, raw, "expected a boolean")),
    }
}

/// Accepts `HH:MM` on a 24-hour clock.
fn parse_clock_time(key: &str, raw: &str) -> Result<String, ConfigurationError> {
    let valid = match raw.split_once(':') {
        Some((h, m)) if h.len() == 2 && m.len() == 2 => matches!(
            (h.parse::<u8>(), m.parse::<u8>()),
            (Ok(h), Ok(m)) if h < 24 && m < 60
        ),
        _ => false,
    };

    if valid {
        Ok(raw.to_string())
    } else {
        Err(ConfigurationError::invalid(key, raw, "expected HH:MM"))
    }
}
