use crate::query::ast::{common::TableRef, create_table_as::CreateTableAs};

#[derive(Debug, Clone)]
pub struct CreateTableAsBuilder {
    ast: CreateTableAs,
}

impl CreateTableAsBuilder {
    pub fn new(table: TableRef, query: &str) -> Self {
        Self {
            ast: CreateTableAs {
                table,
                or_replace: false,
                expiration_hours: None,
                query: query.to_string(),
            },
        }
    }

    pub fn or_replace(mut self) -> Self {
        self.ast.or_replace = true;
        self
    }

    pub fn expires_after_hours(mut self, hours: u32) -> Self {
        self.ast.expiration_hours = Some(hours);
        self
    }

    pub fn build(self) -> CreateTableAs {
        self.ast
    }
}
