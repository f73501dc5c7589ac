use crate::query::{
    ast::drop_table::DropTable,
    renderer::{Render, Renderer},
};

// DROP TABLE [IF EXISTS] `project.dataset.table`
impl Render for DropTable {
    fn render(&self, r: &mut Renderer) {
        let guard = if self.if_exists { " IF EXISTS" } else { "" };
        r.sql.push_str(&format!("DROP TABLE{guard} "));
        r.render_table_ref(&self.table);
    }
}
