//! Defines common, reusable AST nodes.

use model::core::table::TableIdent;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRef {
    pub project: Option<String>,
    pub dataset: Option<String>,
    pub name: String,
}

impl TableRef {
    /// Dotted path with whichever qualifiers are present.
    pub fn path(&self) -> String {
        [self.project.as_deref(), self.dataset.as_deref(), Some(self.name.as_str())]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl From<&TableIdent> for TableRef {
    fn from(ident: &TableIdent) -> Self {
        Self {
            project: Some(ident.project.clone()),
            dataset: Some(ident.dataset.clone()),
            name: ident.table.clone(),
        }
    }
}
