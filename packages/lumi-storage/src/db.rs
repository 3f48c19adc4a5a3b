use sqlx::{PgPool, Row, postgres::PgPoolOptions};

use crate::{Result, models::ConversationTurn, schema};

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &lumi_config::Postgres) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let lock_id: i64 = 7_121_203;
		// Advisory locks are held per connection. Use a single transaction so the lock is scoped to
		// one connection and automatically released when the transaction ends.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)").bind(lock_id).execute(&mut *tx).await?;

		for statement in schema::SCHEMA_SQL.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		Ok(())
	}

	/// Inserts one conversation turn atomically and returns its surrogate id.
	pub async fn insert_conversation(
		&self,
		user_id: i64,
		question: &str,
		response: &str,
	) -> Result<i64> {
		let row = sqlx::query(
			"\
INSERT INTO conversations (user_id, question, response, fullconverse)
VALUES ($1, $2, $3, NULL)
RETURNING convers_id",
		)
		.bind(user_id)
		.bind(question)
		.bind(response)
		.fetch_one(&self.pool)
		.await?;

		Ok(row.try_get("convers_id")?)
	}

	/// Returns the user's conversation turns, most recent first.
	pub async fn list_conversations(
		&self,
		user_id: i64,
		limit: i64,
	) -> Result<Vec<ConversationTurn>> {
		let turns = sqlx::query_as(
			"\
SELECT convers_id, user_id, question, response, fullconverse, created_at
FROM conversations
WHERE user_id = $1
ORDER BY created_at DESC, convers_id DESC
LIMIT $2",
		)
		.bind(user_id)
		.bind(limit)
		.fetch_all(&self.pool)
		.await?;

		Ok(turns)
	}

	pub async fn count_conversations(&self, user_id: i64) -> Result<i64> {
		let row = sqlx::query("SELECT COUNT(*) AS count FROM conversations WHERE user_id = $1")
			.bind(user_id)
			.fetch_one(&self.pool)
			.await?;

		Ok(row.try_get("count")?)
	}

	/// Deletes one turn, owner-checked. Returns whether a row was removed.
	pub async fn delete_conversation(&self, convers_id: i64, user_id: i64) -> Result<bool> {
		let result =
			sqlx::query("DELETE FROM conversations WHERE convers_id = $1 AND user_id = $2")
				.bind(convers_id)
				.bind(user_id)
				.execute(&self.pool)
				.await?;

		Ok(result.rows_affected() > 0)
	}
}
