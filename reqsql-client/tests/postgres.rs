//! PostgreSQL sandbox tests
//!
//! These need a live database and are skipped unless DATABASE_URL is set.

use reqsql_client::{PostgresBackend, QueryBackend};
use reqsql_core::domain::cell::Cell;

async fn backend() -> Option<PostgresBackend> {
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(PostgresBackend::connect(&url).await.expect("connect to DATABASE_URL"))
}

#[tokio::test]
async fn test_large_result_stops_at_row_cap() {
    let Some(backend) = backend().await else {
        return;
    };

    let result = backend
        .execute(
            "SELECT g, repeat('x', 200) AS filler FROM generate_series(1, 3000000) g",
            11,
        )
        .await
        .unwrap();

    assert_eq!(result.columns, vec!["g".to_string(), "filler".to_string()]);
    assert_eq!(result.rows.len(), 11);
    assert_eq!(result.rows[0][0], Cell::Integer(1));

    // The connection is still usable once the abandoned rows are discarded
    let again = backend.execute("SELECT 1 AS one", 5).await.unwrap();
    assert_eq!(again.rows, vec![vec![Cell::Integer(1)]]);
}

#[tokio::test]
async fn test_empty_result_keeps_headers() {
    let Some(backend) = backend().await else {
        return;
    };
    backend.bootstrap_schema().await.unwrap();

    let result = backend
        .execute("SELECT PolicyID, Status FROM Policies WHERE 1 = 0", 10)
        .await
        .unwrap();

    assert_eq!(result.columns, vec!["policyid".to_string(), "status".to_string()]);
    assert!(result.rows.is_empty());
}
