use sqlx::{PgConnection, PgExecutor};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Result, models::ConversationTurn};

/// Append a turn with the next dense index for the session. Callers run
/// this inside a transaction when appending several turns, so indices for
/// one exchange stay adjacent.
pub async fn append_turn(
	conn: &mut PgConnection,
	session_id: Uuid,
	role: &str,
	content: &str,
	provider_id: Option<&str>,
	now: OffsetDateTime,
) -> Result<ConversationTurn> {
	let turn_index: i32 = sqlx::query_scalar(
		"\
SELECT COALESCE(MAX(turn_index) + 1, 0)
FROM conversation_turns
WHERE session_id = $1",
	)
	.bind(session_id)
	.fetch_one(&mut *conn)
	.await?;
	let turn = ConversationTurn {
		turn_id: Uuid::new_v4(),
		session_id,
		turn_index,
		role: role.to_string(),
		content: content.to_string(),
		provider_id: provider_id.map(|provider_id| provider_id.to_string()),
		created_at: now,
	};

	sqlx::query(
		"\
INSERT INTO conversation_turns (
\tturn_id,
\tsession_id,
\tturn_index,
\trole,
\tcontent,
\tprovider_id,
\tcreated_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7)",
	)
	.bind(turn.turn_id)
	.bind(turn.session_id)
	.bind(turn.turn_index)
	.bind(turn.role.as_str())
	.bind(turn.content.as_str())
	.bind(turn.provider_id.as_deref())
	.bind(turn.created_at)
	.execute(&mut *conn)
	.await?;

	Ok(turn)
}

pub async fn list_turns<'e, E>(executor: E, session_id: Uuid) -> Result<Vec<ConversationTurn>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, ConversationTurn>(
		"\
SELECT
\tturn_id,
\tsession_id,
\tturn_index,
\trole,
\tcontent,
\tprovider_id,
\tcreated_at
FROM conversation_turns
WHERE session_id = $1
ORDER BY turn_index ASC",
	)
	.bind(session_id)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}
