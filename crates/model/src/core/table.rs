use crate::execution::errors::TableIdentError;
use std::fmt;

/// Project and dataset used to complete partially-qualified table names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefaults {
    pub project: String,
    pub dataset: String,
}

/// A fully-qualified `project.dataset.table` name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIdent {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl TableIdent {
    pub fn new(
        project: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
            table: table.into(),
        }
    }

    /// Resolves `table`, `dataset.table` or `project.dataset.table`, filling
    /// the missing leading segments from `defaults`.
    pub fn resolve(name: &str, defaults: &TableDefaults) -> Result<Self, TableIdentError> {
        let name = name.trim().trim_matches('`');
        if name.is_empty() {
            return Err(TableIdentError::Empty);
        }

        let segments = name.split('.').collect::<Vec<_>>();
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(TableIdentError::EmptySegment(name.to_string()));
        }

        match segments.as_slice() {
            [table] => Ok(Self::new(&defaults.project, &defaults.dataset, *table)),
            [dataset, table] => Ok(Self::new(&defaults.project, *dataset, *table)),
            [project, dataset, table] => Ok(Self::new(*project, *dataset, *table)),
            _ => Err(TableIdentError::TooManySegments(name.to_string())),
        }
    }

    /// Another table in the same project and dataset.
    pub fn sibling(&self, table: impl Into<String>) -> Self {
        Self::new(&self.project, &self.dataset, table)
    }
}

impl fmt::Display for TableIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}
