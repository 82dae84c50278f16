use folio_config::Postgres;
use folio_storage::db::Db;
use folio_testkit::TestDatabase;

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set FOLIO_PG_DSN to run."]
async fn db_connects_and_bootstraps() {
	let Some(base_dsn) = folio_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps; set FOLIO_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(8).await.expect("Failed to ensure schema.");

	for table in
		["documents", "document_chunks", "chunk_embeddings", "query_log", "conversation_turns"]
	{
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "Expected table {table} to exist.");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set FOLIO_PG_DSN to run."]
async fn ensure_schema_is_idempotent() {
	let Some(base_dsn) = folio_testkit::env_dsn() else {
		eprintln!("Skipping ensure_schema_is_idempotent; set FOLIO_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema(8).await.expect("Failed to ensure schema.");
	db.ensure_schema(8).await.expect("Failed to re-run ensure_schema.");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
