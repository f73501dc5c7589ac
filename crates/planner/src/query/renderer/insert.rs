use crate::query::{
    ast::insert::InsertSelect,
    renderer::{Render, Renderer},
};

impl Render for InsertSelect {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("INSERT INTO ");
        r.render_table_ref(&self.table);

        if !self.columns.is_empty() {
            let quoted = self
                .columns
                .iter()
                .map(|c| r.dialect.quote_identifier(c))
                .collect::<Vec<_>>();
            r.sql.push_str(" (");
            r.sql.push_str(&quoted.join(", "));
            r.sql.push(')');
        }

        r.sql.push_str(" SELECT * FROM ");
        r.render_table_ref(&self.source);
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{
        ast::{common::TableRef, insert::InsertSelect},
        dialect::BigQuery,
        renderer::{Render, Renderer},
    };

    #[test]
    fn test_render_insert_select() {
        let ast = InsertSelect {
            table: TableRef {
                name: "dest".to_string(),
                ..Default::default()
            },
            columns: vec!["a".to_string(), "b".to_string()],
            source: TableRef {
                name: "staging".to_string(),
                ..Default::default()
            },
        };

        let mut renderer = Renderer::new(&BigQuery);
        ast.render(&mut renderer);
        let (sql, _) = renderer.finish();

        assert_eq!(sql, "INSERT INTO `dest` (`a`, `b`) SELECT * FROM `staging`");
    }
}
