//! Tables that are never published.

use crate::table::{table_set, TableId, TableSet};

/// Replication bookkeeping and schema history tables. Publishing these would
/// replicate the replication metadata itself.
pub const BUILTIN_EXCLUDED_TABLES: &[&str] = &[
    "ar_internal_metadata",
    "schema_migrations",
    "repl_events",
    "repl_monitor",
    "repl_nodes",
];

/// The built-in excludes as a table set, in the default schema.
///
/// Matching during reconciliation uses [`is_builtin_excluded`], which
/// covers every schema.
pub fn builtin_excludes() -> TableSet {
    table_set(BUILTIN_EXCLUDED_TABLES)
}

/// Union the configured excludes with the built-in ones.
pub fn effective_excludes(configured: TableSet) -> TableSet {
    let mut excluded = configured;
    excluded.extend(builtin_excludes());
    excluded
}

/// Whether `table` is a bookkeeping table, whatever schema it lives in.
pub fn is_builtin_excluded(table: &TableId) -> bool {
    BUILTIN_EXCLUDED_TABLES
        .iter()
        .any(|name| *name == table.name())
}

/// Compute the tables that should be published: `catalog - excluded`, minus
/// any bookkeeping table in any schema.
pub fn desired_tables(catalog: &TableSet, excluded: &TableSet) -> TableSet {
    catalog
        .iter()
        .filter(|table| !excluded.contains(*table) && !is_builtin_excluded(table))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableId;

    #[test]
    fn test_builtins_survive_empty_config() {
        let excluded = effective_excludes(TableSet::new());
        assert_eq!(excluded, builtin_excludes());
        assert_eq!(excluded.len(), BUILTIN_EXCLUDED_TABLES.len());
    }

    #[test]
    fn test_configured_excludes_are_unioned() {
        let excluded = effective_excludes(table_set(["orders", "repl_events"]));
        assert!(excluded.contains(&TableId::parse("orders")));
        assert!(excluded.contains(&TableId::parse("schema_migrations")));
        assert_eq!(excluded.len(), BUILTIN_EXCLUDED_TABLES.len() + 1);
    }

    #[test]
    fn test_desired_tables() {
        let catalog = table_set(["users", "orders", "repl_events", "schema_migrations"]);
        let excluded = effective_excludes(table_set(["orders"]));
        assert_eq!(desired_tables(&catalog, &excluded), table_set(["users"]));
    }

    #[test]
    fn test_builtins_are_matched_in_every_schema() {
        assert!(is_builtin_excluded(&TableId::parse("billing.schema_migrations")));
        assert!(is_builtin_excluded(&TableId::parse("repl_events")));
        assert!(!is_builtin_excluded(&TableId::parse("billing.invoices")));
        assert!(!is_builtin_excluded(&TableId::parse("repl_events_archive")));

        let catalog = table_set([
            "users",
            "billing.invoices",
            "billing.schema_migrations",
            "billing.repl_events",
            "audit.ar_internal_metadata",
        ]);
        let excluded = effective_excludes(TableSet::new());
        assert_eq!(
            desired_tables(&catalog, &excluded),
            table_set(["users", "billing.invoices"])
        );
    }

    #[test]
    fn test_excludes_outside_catalog_are_ignored() {
        let catalog = table_set(["users"]);
        let excluded = table_set(["ghosts"]);
        assert_eq!(desired_tables(&catalog, &excluded), catalog);
    }
}
