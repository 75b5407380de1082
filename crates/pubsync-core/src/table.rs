//! Table identifiers and table sets.

use std::collections::BTreeSet;
use std::fmt;

/// Schema assumed for table references that don't name one.
pub const DEFAULT_SCHEMA: &str = "public";

/// A schema-qualified table identifier.
///
/// Built from either "table" or "schema.table". Bare names live in the
/// `public` schema, so "orders" and "public.orders" compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableId {
    schema: String,
    name: String,
}

impl TableId {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Parse a table reference, defaulting the schema to "public".
    pub fn parse(table_ref: &str) -> Self {
        match table_ref.split_once('.') {
            Some((schema, name)) => Self::new(schema, name),
            None => Self::new(DEFAULT_SCHEMA, table_ref),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

impl From<&str> for TableId {
    fn from(table_ref: &str) -> Self {
        Self::parse(table_ref)
    }
}

impl From<String> for TableId {
    fn from(table_ref: String) -> Self {
        Self::parse(&table_ref)
    }
}

/// An unordered-by-meaning set of tables. Iteration is sorted so SQL and
/// log output are deterministic.
pub type TableSet = BTreeSet<TableId>;

/// Build a table set from table references.
pub fn table_set<I, S>(refs: I) -> TableSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    refs.into_iter().map(|r| TableId::parse(r.as_ref())).collect()
}
