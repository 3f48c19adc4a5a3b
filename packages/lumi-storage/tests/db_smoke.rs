use lumi_config::Postgres;
use lumi_storage::db::Db;
use lumi_testkit::TestDatabase;

async fn test_db() -> Option<(TestDatabase, Db)> {
	let Some(base_dsn) = lumi_testkit::env_dsn() else {
		eprintln!("Skipping storage tests; set LUMI_PG_DSN to run this test.");

		return None;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	Some((test_db, db))
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set LUMI_PG_DSN to run."]
async fn bootstrap_is_idempotent() {
	let Some((test_db, db)) = test_db().await else {
		return;
	};

	db.ensure_schema().await.expect("Second bootstrap failed.");

	let count: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM information_schema.tables WHERE table_name = 'conversations'",
	)
	.fetch_one(&db.pool)
	.await
	.expect("Failed to query schema tables.");

	assert_eq!(count, 1);

	drop(db);
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set LUMI_PG_DSN to run."]
async fn conversation_round_trip() {
	let Some((test_db, db)) = test_db().await else {
		return;
	};

	let first = db
		.insert_conversation(42, "introduce Namsan Tower", "Namsan Seoul Tower is...")
		.await
		.expect("Insert failed.");
	let second = db
		.insert_conversation(42, "any etiquette tips?", "A few things to know...")
		.await
		.expect("Insert failed.");

	assert!(second > first);

	let turns = db.list_conversations(42, 10).await.expect("List failed.");

	assert_eq!(turns.len(), 2);
	// Most recent first.
	assert_eq!(turns[0].convers_id, second);
	assert_eq!(turns[1].question, "introduce Namsan Tower");
	assert!(turns.iter().all(|turn| turn.fullconverse.is_none()));
	assert_eq!(db.count_conversations(42).await.expect("Count failed."), 2);
	assert_eq!(db.count_conversations(7).await.expect("Count failed."), 0);

	drop(db);
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set LUMI_PG_DSN to run."]
async fn delete_is_owner_checked() {
	let Some((test_db, db)) = test_db().await else {
		return;
	};

	let convers_id =
		db.insert_conversation(1, "question", "answer").await.expect("Insert failed.");

	assert!(!db.delete_conversation(convers_id, 999).await.expect("Delete failed."));
	assert!(db.delete_conversation(convers_id, 1).await.expect("Delete failed."));
	assert!(!db.delete_conversation(convers_id, 1).await.expect("Delete failed."));
	assert_eq!(db.count_conversations(1).await.expect("Count failed."), 0);

	drop(db);
	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
