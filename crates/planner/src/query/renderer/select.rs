use crate::query::{
    ast::select::CountRows,
    renderer::{Render, Renderer},
};

impl Render for CountRows {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("SELECT COUNT(*) AS ");
        r.render_ident(&self.alias);
        r.sql.push_str(" FROM ");
        r.render_table_ref(&self.table);
    }
}
