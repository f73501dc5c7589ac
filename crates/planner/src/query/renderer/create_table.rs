use crate::query::{
    ast::create_table::{ColumnDef, CreateTable, PartitionSpec},
    renderer::{Render, Renderer},
};

impl Render for CreateTable {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("CREATE TABLE ");
        if self.if_not_exists {
            r.sql.push_str("IF NOT EXISTS ");
        }
        r.render_table_ref(&self.table);
        r.sql.push_str(" (");

        let num_cols = self.columns.len();
        for (i, col) in self.columns.iter().enumerate() {
            r.sql.push_str("\n\t");
            col.render(r);
            if i < num_cols - 1 {
                r.sql.push(',');
            }
        }
        r.sql.push_str("\n)");

        if let Some(partition) = &self.partition_by {
            r.sql.push('\n');
            partition.render(r);
        }

        if !self.cluster_by.is_empty() {
            r.sql.push_str("\nCLUSTER BY ");
            let quoted = self
                .cluster_by
                .iter()
                .map(|c| r.dialect.quote_identifier(c))
                .collect::<Vec<_>>();
            r.sql.push_str(&quoted.join(", "));
        }
    }
}

impl Render for ColumnDef {
    fn render(&self, r: &mut Renderer) {
        r.render_ident(&self.name);
        r.sql.push(' ');
        r.sql.push_str(&r.dialect.render_data_type(&self.data_type));
    }
}

impl Render for PartitionSpec {
    fn render(&self, r: &mut Renderer) {
        match self {
            PartitionSpec::Date(column) => {
                r.sql.push_str("PARTITION BY DATE(");
                r.render_ident(column);
                r.sql.push(')');
            }
        }
    }
}
