use crate::query::{
    ast::create_table_as::CreateTableAs,
    renderer::{Render, Renderer},
};

impl Render for CreateTableAs {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("CREATE ");
        if self.or_replace {
            r.sql.push_str("OR REPLACE ");
        }
        r.sql.push_str("TABLE ");
        r.render_table_ref(&self.table);

        if let Some(hours) = self.expiration_hours {
            r.sql.push_str(&format!(
                "\nOPTIONS(expiration_timestamp = TIMESTAMP_ADD(CURRENT_TIMESTAMP(), INTERVAL {hours} HOUR))"
            ));
        }

        r.sql.push_str(" AS\n");
        r.sql.push_str(self.query.trim_end());
    }
}
