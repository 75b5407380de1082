//! Reconciliation properties checked across a range of catalogs and
//! exclusion lists.

use pubsync_core::mock::{MockConnector, MockReplicationServer, StaticCatalog, StaticExcludes};
use pubsync_core::{
    builtin_excludes, is_builtin_excluded, table_set, PublicationSynchronizer, TableSet,
    BUILTIN_EXCLUDED_TABLES, PUBLICATION_NAME,
};

struct Case {
    name: &'static str,
    catalog: &'static [&'static str],
    excludes: &'static [&'static str],
}

const CASES: &[Case] = &[
    Case {
        name: "empty catalog",
        catalog: &[],
        excludes: &["orders"],
    },
    Case {
        name: "no configured excludes",
        catalog: &["users", "orders", "repl_nodes"],
        excludes: &[],
    },
    Case {
        name: "everything excluded",
        catalog: &["users", "orders"],
        excludes: &["users", "orders"],
    },
    Case {
        name: "excludes outside the catalog",
        catalog: &["users"],
        excludes: &["ghosts", "audit.trail"],
    },
    Case {
        name: "qualified and bare names",
        catalog: &["public.users", "audit.trail", "schema_migrations"],
        excludes: &["users"],
    },
    Case {
        name: "bookkeeping tables in other schemas",
        catalog: &["billing.invoices", "billing.schema_migrations", "audit.repl_nodes"],
        excludes: &[],
    },
    Case {
        name: "only bookkeeping tables",
        catalog: BUILTIN_EXCLUDED_TABLES,
        excludes: &[],
    },
];

fn expected(case: &Case) -> TableSet {
    let mut excluded = table_set(case.excludes);
    excluded.extend(builtin_excludes());
    table_set(case.catalog)
        .difference(&excluded)
        .filter(|table| !is_builtin_excluded(table))
        .cloned()
        .collect()
}

#[tokio::test]
async fn published_set_is_catalog_minus_excludes() {
    for case in CASES {
        let server = MockReplicationServer::new();
        let mut sync = PublicationSynchronizer::new(
            MockConnector::new(server.clone()),
            StaticCatalog::new(table_set(case.catalog)),
            StaticExcludes::new(table_set(case.excludes)),
        );

        sync.configure_provider().await.unwrap();
        let published = sync.included_tables().await.unwrap();

        assert_eq!(published, expected(case), "case: {}", case.name);
        assert!(
            !published.iter().any(is_builtin_excluded),
            "case: {} published a bookkeeping table",
            case.name
        );
    }
}

#[tokio::test]
async fn refresh_is_independent_of_prior_membership() {
    for case in CASES {
        let server = MockReplicationServer::new();
        server.create_publication_with(
            PUBLICATION_NAME,
            table_set(["leftover", "repl_events", "public.users"]),
        );
        let mut sync = PublicationSynchronizer::new(
            MockConnector::new(server.clone()),
            StaticCatalog::new(table_set(case.catalog)),
            StaticExcludes::new(table_set(case.excludes)),
        );

        sync.refresh_excludes().await.unwrap();
        sync.refresh_excludes().await.unwrap();

        assert_eq!(
            server.publication(PUBLICATION_NAME),
            Some(expected(case)),
            "case: {}",
            case.name
        );
    }
}

#[tokio::test]
async fn recovery_survives_every_operation() {
    let server = MockReplicationServer::new();
    let mut sync = PublicationSynchronizer::new(
        MockConnector::new(server.clone()),
        StaticCatalog::new(table_set(["users", "orders"])),
        StaticExcludes::new(TableSet::new()),
    );

    server.drop_connections(1);
    sync.configure_provider().await.unwrap();
    server.drop_connections(1);
    assert!(sync.is_provider().await.unwrap());
    server.drop_connections(1);
    assert_eq!(sync.included_tables().await.unwrap(), table_set(["users", "orders"]));
    server.drop_connections(1);
    sync.replication_lag().await.unwrap();
    server.drop_connections(1);
    sync.replication_wal_retained().await.unwrap();
    server.drop_connections(1);
    sync.destroy_provider().await.unwrap();

    assert!(server.publication(PUBLICATION_NAME).is_none());
    assert_eq!(sync.connects(), 7);
}
