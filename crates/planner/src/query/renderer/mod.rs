//! Defines the core rendering trait and context for converting AST to SQL.

use model::core::value::{QueryParam, Value};

use crate::query::{ast::common::TableRef, dialect::Dialect};

pub mod create_table;
pub mod create_table_as;
pub mod delete;
pub mod drop_table;
pub mod insert;
pub mod select;

/// A trait for any AST node that can be rendered into a SQL string.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// A context that holds the state during the rendering process.
///
/// It accumulates the SQL string and the named parameters, and provides
/// access to the dialect for syntax-specific details.
pub struct Renderer<'a> {
    pub sql: String,
    pub params: Vec<QueryParam>,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            dialect,
        }
    }

    /// Consumes the renderer and returns the final SQL string and parameters.
    pub fn finish(self) -> (String, Vec<QueryParam>) {
        (self.sql, self.params)
    }

    pub fn add_param(&mut self, name: &str, value: Value) {
        let placeholder = self.dialect.get_placeholder(name);
        self.params.push(QueryParam::new(name, value));
        self.sql.push_str(&placeholder);
    }

    pub fn render_table_ref(&mut self, table: &TableRef) {
        let quoted = self.dialect.quote_identifier(&table.path());
        self.sql.push_str(&quoted);
    }

    pub fn render_ident(&mut self, ident: &str) {
        let quoted = self.dialect.quote_identifier(ident);
        self.sql.push_str(&quoted);
    }
}
