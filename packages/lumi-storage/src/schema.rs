pub const SCHEMA_SQL: &str = "\
CREATE TABLE IF NOT EXISTS conversations (
	convers_id   BIGSERIAL PRIMARY KEY,
	user_id      BIGINT NOT NULL,
	question     TEXT NOT NULL,
	response     TEXT NOT NULL,
	fullconverse TEXT,
	created_at   TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS idx_conversations_user_recent
	ON conversations (user_id, created_at DESC)";
