use serde::{Deserialize, Serialize};
use std::fmt;

/// Column types understood by the warehouse layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DataType {
    Int64,
    Float64,
    Boolean,
    String,
    Date,
    Timestamp,
}

impl DataType {
    /// Maps a warehouse schema type name (legacy or standard SQL spelling)
    /// onto a `DataType`. Unknown names fall back to `String`.
    pub fn from_bigquery_type(type_name: &str) -> Self {
        match type_name.trim().to_ascii_uppercase().as_str() {
            "INTEGER" | "INT64" => DataType::Int64,
            "FLOAT" | "FLOAT64" | "NUMERIC" | "BIGNUMERIC" => DataType::Float64,
            "BOOLEAN" | "BOOL" => DataType::Boolean,
            "DATE" => DataType::Date,
            "TIMESTAMP" | "DATETIME" => DataType::Timestamp,
            _ => DataType::String,
        }
    }

    pub fn bigquery_name(&self) -> &'static str {
        match self {
            DataType::Int64 => "INT64",
            DataType::Float64 => "FLOAT64",
            DataType::Boolean => "BOOL",
            DataType::String => "STRING",
            DataType::Date => "DATE",
            DataType::Timestamp => "TIMESTAMP",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.bigquery_name())
    }
}
