//! In-memory warehouse that understands the statements the gateway issues.
//!
//! Aggregation output is not computed from raw logs; each date is mapped to
//! the rows the aggregation query would produce via [`SimulatedWarehouse::set_source`].

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use connectors::warehouse::base::{
    adapter::{QueryRequest, QueryResponse, WarehouseAdapter, WarehouseKind},
    error::WarehouseError,
};
use model::{
    core::{
        date::TargetDate,
        value::{FieldValue, Value},
    },
    records::row::RowData,
};
use std::{collections::HashMap, sync::Mutex};

/// One aggregated (hour, medium) bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpressionRow {
    pub timestamp_hourly: NaiveDateTime,
    pub medium_id: String,
    pub imp: u64,
}

impl ImpressionRow {
    pub fn at(date: TargetDate, hour: u32, medium_id: &str, imp: u64) -> Self {
        let timestamp_hourly = date
            .as_naive()
            .and_hms_opt(hour, 0, 0)
            .unwrap_or_else(|| panic!("invalid hour {hour}"));
        Self {
            timestamp_hourly,
            medium_id: medium_id.to_string(),
            imp,
        }
    }

    pub fn partition(&self) -> NaiveDate {
        self.timestamp_hourly.date()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    CreateTable,
    CreateStaging,
    Count,
    Delete,
    Insert,
    Drop,
}

impl Statement {
    fn classify(sql: &str) -> Option<Self> {
        let kind = if sql.starts_with("CREATE TABLE IF NOT EXISTS") {
            Statement::CreateTable
        } else if sql.starts_with("CREATE OR REPLACE TABLE") {
            Statement::CreateStaging
        } else if sql.starts_with("SELECT COUNT(*)") {
            Statement::Count
        } else if sql.starts_with("DELETE FROM") {
            Statement::Delete
        } else if sql.starts_with("INSERT INTO") {
            Statement::Insert
        } else if sql.starts_with("DROP TABLE") {
            Statement::Drop
        } else {
            return None;
        };
        Some(kind)
    }
}

struct Failure {
    statement: Statement,
    /// Only statements for this date fail; `None` fails every date.
    date: Option<TargetDate>,
}

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<ImpressionRow>>,
    sources: HashMap<TargetDate, Vec<ImpressionRow>>,
    log: Vec<(Statement, QueryRequest)>,
    /// Date of the partition operation in flight, taken from its staging table.
    current_date: Option<TargetDate>,
}

#[derive(Default)]
pub struct SimulatedWarehouse {
    state: Mutex<State>,
    failures: Mutex<Vec<Failure>>,
}

impl SimulatedWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows the aggregation query returns for `date` from now on.
    pub fn set_source(&self, date: TargetDate, rows: Vec<ImpressionRow>) {
        self.state.lock().unwrap().sources.insert(date, rows);
    }

    pub fn seed_table(&self, table: &str, rows: Vec<ImpressionRow>) {
        self.state
            .lock()
            .unwrap()
            .tables
            .insert(table.to_string(), rows);
    }

    pub fn fail_on(&self, statement: Statement, date: Option<TargetDate>) {
        self.failures
            .lock()
            .unwrap()
            .push(Failure { statement, date });
    }

    pub fn rows(&self, table: &str) -> Option<Vec<ImpressionRow>> {
        self.state.lock().unwrap().tables.get(table).cloned()
    }

    pub fn partition(&self, table: &str, date: TargetDate) -> Vec<ImpressionRow> {
        self.rows(table)
            .unwrap_or_default()
            .into_iter()
            .filter(|row| row.partition() == date.as_naive())
            .collect()
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names = self
            .state
            .lock()
            .unwrap()
            .tables
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    pub fn staging_tables(&self) -> Vec<String> {
        self.table_names()
            .into_iter()
            .filter(|name| name.contains("_staging_"))
            .collect()
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.state
            .lock()
            .unwrap()
            .log
            .iter()
            .map(|(kind, _)| *kind)
            .collect()
    }

    pub fn requests(&self) -> Vec<QueryRequest> {
        self.state
            .lock()
            .unwrap()
            .log
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    fn should_fail(&self, statement: Statement, date: Option<TargetDate>) -> bool {
        self.failures
            .lock()
            .unwrap()
            .iter()
            .any(|f| f.statement == statement && (f.date.is_none() || f.date == date))
    }

    fn run(&self, statement: Statement, request: &QueryRequest) -> Result<QueryResponse, WarehouseError> {
        let mut state = self.state.lock().unwrap();
        state.log.push((statement, request.clone()));

        let sql = request.sql.as_str();
        let target = target_table(statement, sql)?;

        if statement == Statement::CreateStaging {
            state.current_date = Some(window_date(sql)?);
        }
        let date = state.current_date;
        if self.should_fail(statement, date) {
            return Err(WarehouseError::Query(format!(
                "Simulated failure of {statement:?} on {target}"
            )));
        }

        match statement {
            Statement::CreateTable => {
                state.tables.entry(target).or_default();
                Ok(QueryResponse::default())
            }
            Statement::CreateStaging => {
                let rows = date
                    .and_then(|d| state.sources.get(&d).cloned())
                    .unwrap_or_default();
                state.tables.insert(target, rows);
                Ok(QueryResponse::default())
            }
            Statement::Count => {
                let count = state
                    .tables
                    .get(&target)
                    .map(Vec::len)
                    .ok_or_else(|| not_found(&target))?;
                let row = RowData::new(vec![FieldValue {
                    name: "row_count".to_string(),
                    value: Value::Int(count as i64),
                }]);
                Ok(QueryResponse {
                    rows: vec![row],
                    affected_rows: None,
                })
            }
            Statement::Delete => {
                let day = request
                    .params
                    .iter()
                    .find(|p| p.name == "partition_date")
                    .and_then(|p| match p.value {
                        Value::Date(d) => Some(d),
                        _ => None,
                    })
                    .ok_or_else(|| WarehouseError::Query("partition_date not bound".into()))?;
                let table = state
                    .tables
                    .get_mut(&target)
                    .ok_or_else(|| not_found(&target))?;
                let before = table.len();
                table.retain(|row| row.partition() != day);
                Ok(QueryResponse {
                    rows: Vec::new(),
                    affected_rows: Some((before - table.len()) as u64),
                })
            }
            Statement::Insert => {
                let source = last_identifier(sql)?;
                let rows = state
                    .tables
                    .get(&source)
                    .cloned()
                    .ok_or_else(|| not_found(&source))?;
                let inserted = rows.len() as u64;
                state
                    .tables
                    .get_mut(&target)
                    .ok_or_else(|| not_found(&target))?
                    .extend(rows);
                Ok(QueryResponse {
                    rows: Vec::new(),
                    affected_rows: Some(inserted),
                })
            }
            Statement::Drop => {
                state.tables.remove(&target);
                Ok(QueryResponse::default())
            }
        }
    }
}

#[async_trait]
impl WarehouseAdapter for SimulatedWarehouse {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, WarehouseError> {
        let statement = Statement::classify(&request.sql).ok_or_else(|| {
            WarehouseError::Query(format!("Unsupported statement: {}", request.sql))
        })?;
        self.run(statement, request)
    }

    fn kind(&self) -> WarehouseKind {
        WarehouseKind::Other("simulated")
    }
}

fn not_found(table: &str) -> WarehouseError {
    WarehouseError::Query(format!("Not found: Table {table}"))
}

fn identifiers(sql: &str) -> Vec<&str> {
    sql.split('`').skip(1).step_by(2).collect()
}

fn first_identifier(sql: &str) -> Result<String, WarehouseError> {
    identifiers(sql)
        .first()
        .map(|s| s.to_string())
        .ok_or_else(|| WarehouseError::Query(format!("No table in: {sql}")))
}

fn last_identifier(sql: &str) -> Result<String, WarehouseError> {
    identifiers(sql)
        .last()
        .map(|s| s.to_string())
        .ok_or_else(|| WarehouseError::Query(format!("No table in: {sql}")))
}

/// The table a statement operates on. Counts quote their alias ahead of the
/// table, so they read the last identifier.
fn target_table(statement: Statement, sql: &str) -> Result<String, WarehouseError> {
    match statement {
        Statement::Count => last_identifier(sql),
        _ => first_identifier(sql),
    }
}

/// Reads the day out of the `BETWEEN 'YYYY-MM-DD HH:00:00'` window.
fn window_date(sql: &str) -> Result<TargetDate, WarehouseError> {
    sql.split_once("BETWEEN '")
        .and_then(|(_, rest)| rest.get(..10))
        .and_then(|raw| TargetDate::parse_strict(raw).ok())
        .ok_or_else(|| WarehouseError::Query("No aggregation window in staged query".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::table::TableIdent;
    use planner::query::{dialect::BigQuery, generator::QueryGenerator};

    #[test]
    fn test_count_targets_the_counted_table() {
        let staging = TableIdent::new("p", "d", "imp_hourly_staging_20250322_ab12");
        let sql = QueryGenerator::new(&BigQuery).count_rows(&staging);

        assert_eq!(Statement::classify(&sql), Some(Statement::Count));
        assert_eq!(
            target_table(Statement::Count, &sql).unwrap(),
            "p.d.imp_hourly_staging_20250322_ab12"
        );
    }

    #[test]
    fn test_count_reads_staged_rows() {
        let warehouse = SimulatedWarehouse::new();
        let day = TargetDate::parse_strict("2025-03-22").unwrap();
        let staging = "p.d.imp_hourly_staging_20250322_ab12";
        warehouse.seed_table(staging, vec![ImpressionRow::at(day, 9, "m", 1); 3]);

        let sql = QueryGenerator::new(&BigQuery).count_rows(&TableIdent::new(
            "p",
            "d",
            "imp_hourly_staging_20250322_ab12",
        ));
        let response = warehouse
            .run(Statement::Count, &QueryRequest::new(sql))
            .unwrap();

        assert_eq!(response.rows[0].get_value("row_count"), Value::Int(3));
    }

    #[test]
    fn test_identifier_extraction() {
        let sql = "INSERT INTO `p.d.t` (`a`, `b`) SELECT * FROM `p.d.s`";
        assert_eq!(first_identifier(sql).unwrap(), "p.d.t");
        assert_eq!(last_identifier(sql).unwrap(), "p.d.s");
    }

    #[test]
    fn test_window_date() {
        let sql = "... BETWEEN '2025-03-22 00:00:00' AND '2025-03-22 23:59:59'";
        assert_eq!(
            window_date(sql).unwrap(),
            TargetDate::parse_strict("2025-03-22").unwrap()
        );
        assert!(window_date("SELECT 1").is_err());
    }
}
