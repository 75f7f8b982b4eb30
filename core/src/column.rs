//! Result-column metadata.
//!
//! A [`ColumnInfo`] describes one output column of a prepared query: its
//! qualified name (`table.column`, or a bare alias) and, optionally, the
//! declared database type. The declared type is carried for diagnostics
//! only; it never influences binding or conversion.

/// Metadata for a single result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    name: String,
    decl_type: Option<String>,
}

impl ColumnInfo {
    /// Creates column metadata from a qualified name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decl_type: None,
        }
    }

    /// Attaches the declared database type (diagnostics only).
    pub fn with_decl_type(mut self, decl_type: impl Into<String>) -> Self {
        self.decl_type = Some(decl_type.into());
        self
    }

    /// The full qualified name, e.g. `"film.film_id"` or `"total"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared database type, if the row source reported one.
    pub fn decl_type(&self) -> Option<&str> {
        self.decl_type.as_deref()
    }

    /// The table qualifier, if the name is in `table.column` form.
    pub fn table(&self) -> Option<&str> {
        self.name.split_once('.').map(|(table, _)| table)
    }

    /// The column part of the name, with any table qualifier stripped.
    pub fn column(&self) -> &str {
        self.name
            .split_once('.')
            .map_or(self.name.as_str(), |(_, column)| column)
    }
}

impl From<&str> for ColumnInfo {
    fn from(name: &str) -> Self {
        ColumnInfo::new(name)
    }
}

impl From<String> for ColumnInfo {
    fn from(name: String) -> Self {
        ColumnInfo::new(name)
    }
}

/// Builds a column list from qualified names.
pub fn columns<I>(names: I) -> Vec<ColumnInfo>
where
    I: IntoIterator,
    I::Item: Into<ColumnInfo>,
{
    names.into_iter().map(Into::into).collect()
}
