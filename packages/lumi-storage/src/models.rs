use time::OffsetDateTime;

/// One persisted question/response pair. Written exactly once per completed
/// chat turn and never updated.
#[derive(Debug, sqlx::FromRow)]
pub struct ConversationTurn {
	pub convers_id: i64,
	pub user_id: i64,
	pub question: String,
	pub response: String,
	/// Reserved for full-history snapshots. Always NULL today.
	pub fullconverse: Option<String>,
	pub created_at: OffsetDateTime,
}
