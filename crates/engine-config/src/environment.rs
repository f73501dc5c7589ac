use crate::error::ConfigurationError;
use model::core::table::{TableDefaults, TableIdent};
use std::{fmt, str::FromStr};

/// Named deployment profile selected by `ETL_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Where a profile writes its results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentProfile {
    pub project_id: &'static str,
    pub dataset: &'static str,
    pub table_name: &'static str,
}

impl Environment {
    pub fn profile(&self) -> EnvironmentProfile {
        let dataset = match self {
            Environment::Development => "sg_reports_tmp",
            Environment::Staging => "sg_reports_staging",
            Environment::Production => "sg_reports_production",
        };

        EnvironmentProfile {
            project_id: "rfs-proj",
            dataset,
            table_name: "signage_impressions",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl EnvironmentProfile {
    pub fn destination(&self) -> TableIdent {
        TableIdent::new(self.project_id, self.dataset, self.table_name)
    }

    pub fn table_defaults(&self) -> TableDefaults {
        TableDefaults {
            project: self.project_id.to_string(),
            dataset: self.dataset.to_string(),
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigurationError::UnknownEnvironment(s.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
