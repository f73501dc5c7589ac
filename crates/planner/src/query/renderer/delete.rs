use crate::query::{
    ast::delete::DeletePartition,
    renderer::{Render, Renderer},
};
use model::core::value::Value;

impl Render for DeletePartition {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("DELETE FROM ");
        r.render_table_ref(&self.table);
        r.sql.push_str(" WHERE DATE(");
        r.render_ident(&self.column);
        r.sql.push_str(") = ");
        r.add_param(&self.param_name, Value::Date(self.date.as_naive()));
    }
}
