use time::format_description::well_known::Rfc3339;

use crate::{ChatService, ServiceError, ServiceResult};
use lumi_storage::models::ConversationTurn;

#[derive(Clone, Debug, serde::Serialize)]
pub struct HistoryItem {
	pub conversation_id: i64,
	pub message: String,
	pub response: String,
	pub created_at: String,
}

impl ChatService {
	/// Returns the user's most recent turns in chronological order (the window
	/// is selected most-recent-first, then reversed for display).
	pub async fn history(&self, user_id: i64, limit: i64) -> ServiceResult<Vec<HistoryItem>> {
		if limit <= 0 {
			return Err(ServiceError::InvalidRequest {
				message: "History limit must be positive.".to_string(),
			});
		}

		let mut turns = self.db.list_conversations(user_id, limit).await?;

		turns.reverse();
		turns.into_iter().map(history_item).collect()
	}

	pub async fn history_count(&self, user_id: i64) -> ServiceResult<i64> {
		Ok(self.db.count_conversations(user_id).await?)
	}

	/// Owner-checked delete. Returns whether the turn existed.
	pub async fn delete_turn(&self, convers_id: i64, user_id: i64) -> ServiceResult<bool> {
		Ok(self.db.delete_conversation(convers_id, user_id).await?)
	}
}

fn history_item(turn: ConversationTurn) -> ServiceResult<HistoryItem> {
	let created_at = turn
		.created_at
		.format(&Rfc3339)
		.map_err(|err| ServiceError::Storage { message: err.to_string() })?;

	Ok(HistoryItem {
		conversation_id: turn.convers_id,
		message: turn.question,
		response: turn.response,
		created_at,
	})
}
