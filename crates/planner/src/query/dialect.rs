//! Defines the `Dialect` trait for warehouse-specific SQL syntax.

use model::core::data_type::DataType;

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (a column name or a dotted table path) in the
    /// dialect's quotation marks.
    fn quote_identifier(&self, ident: &str) -> String;

    /// Returns the placeholder for a named parameter.
    fn get_placeholder(&self, name: &str) -> String;

    /// Renders a string as a SQL literal, escaping as needed.
    fn quote_string(&self, value: &str) -> String;

    fn render_data_type(&self, data_type: &DataType) -> String;
}

/// GoogleSQL as accepted by the BigQuery jobs API.
#[derive(Debug, Clone)]
pub struct BigQuery;

impl Dialect for BigQuery {
    fn quote_identifier(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', ""))
    }

    fn get_placeholder(&self, name: &str) -> String {
        format!("@{name}")
    }

    fn quote_string(&self, value: &str) -> String {
        let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
        format!("'{escaped}'")
    }

    fn render_data_type(&self, data_type: &DataType) -> String {
        data_type.bigquery_name().to_string()
    }
}
