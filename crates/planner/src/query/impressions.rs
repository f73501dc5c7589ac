//! Hourly impression aggregation and the destination table it lands in.
//!
//! Both builders are pure: the same inputs always render the same text.

use crate::query::{
    ast::common::TableRef,
    builder::create_table::CreateTableBuilder,
    dialect::{BigQuery, Dialect},
    generator::QueryGenerator,
};
use model::core::{
    data_type::DataType,
    date::{REFERENCE_TZ, REFERENCE_UTC_OFFSET_HOURS, TargetDate},
    table::TableIdent,
};

const AGGREGATION_TEMPLATE: &str = include_str!("sql/impressions_hourly.sql");

/// Hour-bucket column; the destination is partitioned by its date.
pub const PARTITION_COLUMN: &str = "timestamp_hourly";

pub const CLUSTER_COLUMNS: [&str; 3] = ["mediumId", "storeId", "creativeId"];

/// Destination columns in the order the aggregation query selects them.
pub const IMPRESSION_COLUMNS: [(&str, DataType); 10] = [
    ("timestamp_hourly", DataType::Timestamp),
    ("mediumId", DataType::Int64),
    ("storeId", DataType::Int64),
    ("device_id", DataType::String),
    ("programId", DataType::Int64),
    ("sequence", DataType::Int64),
    ("creativeId", DataType::Int64),
    ("deliveryId", DataType::Int64),
    ("imp", DataType::Int64),
    ("cnt", DataType::Int64),
];

pub const DEFAULT_OPENING_TIME: &str = "09:00";
pub const DEFAULT_CLOSING_TIME: &str = "21:00";

pub fn impression_column_names() -> Vec<&'static str> {
    IMPRESSION_COLUMNS.iter().map(|(name, _)| *name).collect()
}

/// Where the raw logs and the per-device hours live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTables {
    pub requests: String,
    pub signage: String,
    /// Routine extracting one query-string field from a request URL.
    pub url_parse: String,
    pub tracking_path: String,
}

impl Default for SourceTables {
    fn default() -> Self {
        Self {
            requests: "rfs_events.requests".to_string(),
            signage: "rfs_spreadsheet.signage".to_string(),
            url_parse: "rfs_events.url_parse".to_string(),
            tracking_path: "/tracking".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationOptions {
    pub start_hour: u32,
    pub end_hour: u32,
    /// `HH:MM` used when a device has no opening time of its own.
    pub opening_time: String,
    /// `HH:MM` used when a device has no closing time of its own.
    pub closing_time: String,
    pub sources: SourceTables,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            start_hour: 0,
            end_hour: 23,
            opening_time: DEFAULT_OPENING_TIME.to_string(),
            closing_time: DEFAULT_CLOSING_TIME.to_string(),
            sources: SourceTables::default(),
        }
    }
}

impl AggregationOptions {
    pub fn with_hours(mut self, start_hour: u32, end_hour: u32) -> Self {
        self.start_hour = start_hour;
        self.end_hour = end_hour;
        self
    }

    pub fn with_business_hours(mut self, opening: &str, closing: &str) -> Self {
        self.opening_time = opening.to_string();
        self.closing_time = closing.to_string();
        self
    }

    /// Inclusive hour window, clamped to `0..=23` and put in order.
    pub fn hour_window(&self) -> (u32, u32) {
        let start = self.start_hour.min(23);
        let end = self.end_hour.min(23);
        if start <= end { (start, end) } else { (end, start) }
    }
}

/// Renders the hourly aggregation of tracking completions for `date`.
pub fn build_aggregation_query(date: TargetDate, options: &AggregationOptions) -> String {
    let dialect = BigQuery;
    let (start_hour, end_hour) = options.hour_window();
    let window_start = format!("{date} {start_hour:02}:00:00");
    let window_end = format!("{date} {end_hour:02}:59:59");
    let sources = &options.sources;

    AGGREGATION_TEMPLATE
        .replace("{timezone}", &dialect.quote_string(REFERENCE_TZ.name()))
        .replace("{url_parse}", &routine_path(&sources.url_parse))
        .replace("{opening_time}", &dialect.quote_string(&options.opening_time))
        .replace("{closing_time}", &dialect.quote_string(&options.closing_time))
        .replace("{requests_table}", &dialect.quote_identifier(&sources.requests))
        .replace("{signage_table}", &dialect.quote_identifier(&sources.signage))
        .replace("{tracking_path}", &dialect.quote_string(&sources.tracking_path))
        .replace("{utc_offset_hours}", &REFERENCE_UTC_OFFSET_HOURS.to_string())
        .replace("{window_start}", &dialect.quote_string(&window_start))
        .replace("{window_end}", &dialect.quote_string(&window_end))
}

/// Renders the idempotent DDL for the destination table.
pub fn build_create_table_ddl(table: &TableIdent) -> String {
    let builder = IMPRESSION_COLUMNS.iter().fold(
        CreateTableBuilder::new(TableRef::from(table)).if_not_exists(),
        |builder, (name, data_type)| builder.column(name, *data_type),
    );

    let ast = builder
        .partition_by_date(PARTITION_COLUMN)
        .cluster_by(&CLUSTER_COLUMNS)
        .build();

    let (sql, _) = QueryGenerator::new(&BigQuery).render_ast(ast);
    sql
}

fn routine_path(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect()
}
