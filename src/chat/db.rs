//! Database queries for stored chat turns.
//!
//! Lookups by text match the exact text of the *latest matching*
//! turn, not the latest turn overall. Two exchanges that produced
//! identical bot replies can't be told apart by text alone so
//! callers acting on a reply should prefer ids where they have them.
use anyhow::{Error, Result};
use rusqlite::OptionalExtension;
use tokio_rusqlite::{Connection, params};

use super::models::{Feedback, Role, Turn};

const TURN_COLUMNS: &str = "id, sender, text, feedback, parent_id, created_at";

fn turn_from_row(row: &rusqlite::Row) -> rusqlite::Result<Turn> {
    let sender: String = row.get(1)?;
    let role = sender.parse::<Role>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, e.into())
    })?;
    let feedback: Option<String> = row.get(3)?;

    Ok(Turn {
        id: row.get(0)?,
        role,
        text: row.get(2)?,
        // Unknown values from older rows are treated as unset
        feedback: feedback.and_then(|f| f.parse::<Feedback>().ok()),
        parent_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Append a new turn and return it with its store assigned id.
pub async fn insert_turn(
    db: &Connection,
    role: Role,
    text: &str,
    parent_id: Option<i64>,
) -> Result<Turn, Error> {
    let text = text.to_owned();
    let turn = db
        .call(move |conn| {
            let sql = format!(
                "INSERT INTO message (sender, text, parent_id) VALUES (?, ?, ?) RETURNING {}",
                TURN_COLUMNS
            );
            let turn = conn.query_row(
                &sql,
                params![role.as_str(), text, parent_id],
                turn_from_row,
            )?;
            Ok(turn)
        })
        .await?;

    Ok(turn)
}

/// All turns in creation order.
pub async fn list_turns(db: &Connection) -> Result<Vec<Turn>, Error> {
    let turns = db
        .call(|conn| {
            let sql = format!("SELECT {} FROM message ORDER BY id ASC", TURN_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], turn_from_row)?
                .filter_map(Result::ok)
                .collect::<Vec<Turn>>();
            Ok(rows)
        })
        .await?;

    Ok(turns)
}

/// Delete every turn. Returns the number of turns removed.
pub async fn clear_turns(db: &Connection) -> Result<usize, Error> {
    let count = db
        .call(|conn| {
            let count = conn.execute("DELETE FROM message", [])?;
            Ok(count)
        })
        .await?;

    Ok(count)
}

pub async fn find_turn_by_id(db: &Connection, id: i64) -> Result<Option<Turn>, Error> {
    let turn = db
        .call(move |conn| {
            let sql = format!("SELECT {} FROM message WHERE id = ?", TURN_COLUMNS);
            let turn = conn.query_row(&sql, [id], turn_from_row).optional()?;
            Ok(turn)
        })
        .await?;

    Ok(turn)
}

/// The most recent bot turn whose text is exactly `text`.
pub async fn find_latest_bot_turn_by_text(
    db: &Connection,
    text: &str,
) -> Result<Option<Turn>, Error> {
    let text = text.to_owned();
    let turn = db
        .call(move |conn| {
            let sql = format!(
                "SELECT {} FROM message WHERE sender = ? AND text = ? ORDER BY id DESC LIMIT 1",
                TURN_COLUMNS
            );
            let turn = conn
                .query_row(&sql, params![Role::Bot.as_str(), text], turn_from_row)
                .optional()?;
            Ok(turn)
        })
        .await?;

    Ok(turn)
}

/// The most recent user turn created before the turn with `id`.
pub async fn find_latest_user_turn_before(
    db: &Connection,
    id: i64,
) -> Result<Option<Turn>, Error> {
    let turn = db
        .call(move |conn| {
            let sql = format!(
                "SELECT {} FROM message WHERE sender = ? AND id < ? ORDER BY id DESC LIMIT 1",
                TURN_COLUMNS
            );
            let turn = conn
                .query_row(&sql, params![Role::User.as_str(), id], turn_from_row)
                .optional()?;
            Ok(turn)
        })
        .await?;

    Ok(turn)
}

/// Delete a turn by id. Returns `false` if there was nothing to
/// delete.
pub async fn delete_turn(db: &Connection, id: i64) -> Result<bool, Error> {
    let deleted = db
        .call(move |conn| {
            let count = conn.execute("DELETE FROM message WHERE id = ?", [id])?;
            Ok(count > 0)
        })
        .await?;

    Ok(deleted)
}

/// Overwrite the feedback on a turn. Returns `false` if the turn
/// doesn't exist.
pub async fn set_feedback(db: &Connection, id: i64, feedback: Feedback) -> Result<bool, Error> {
    let updated = db
        .call(move |conn| {
            let count = conn.execute(
                "UPDATE message SET feedback = ? WHERE id = ?",
                params![feedback.as_str(), id],
            )?;
            Ok(count > 0)
        })
        .await?;

    Ok(updated)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::db::initialize_db;

    pub(crate) async fn test_db() -> Connection {
        let db = Connection::open_in_memory().await.unwrap();
        db.call(|conn| {
            initialize_db(conn)?;
            Ok(())
        })
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn it_assigns_increasing_ids() {
        let db = test_db().await;
        let user = insert_turn(&db, Role::User, "hello", None).await.unwrap();
        let bot = insert_turn(&db, Role::Bot, "hi there", Some(user.id))
            .await
            .unwrap();

        assert!(bot.id > user.id);
        assert_eq!(bot.parent_id, Some(user.id));
        assert_eq!(bot.feedback, None);
        assert!(!bot.created_at.is_empty());

        let turns = list_turns(&db).await.unwrap();
        assert_eq!(turns, vec![user, bot]);
    }

    #[tokio::test]
    async fn it_never_reuses_deleted_ids() {
        let db = test_db().await;
        let first = insert_turn(&db, Role::User, "one", None).await.unwrap();
        assert!(delete_turn(&db, first.id).await.unwrap());

        let second = insert_turn(&db, Role::User, "two", None).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn it_finds_latest_bot_turn_by_exact_text() {
        let db = test_db().await;
        insert_turn(&db, Role::Bot, "same", None).await.unwrap();
        insert_turn(&db, Role::User, "same", None).await.unwrap();
        let latest = insert_turn(&db, Role::Bot, "same", None).await.unwrap();
        insert_turn(&db, Role::User, "later", None).await.unwrap();

        let found = find_latest_bot_turn_by_text(&db, "same").await.unwrap();
        assert_eq!(found.map(|t| t.id), Some(latest.id));

        let missing = find_latest_bot_turn_by_text(&db, "Same").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn it_finds_latest_user_turn_before_id() {
        let db = test_db().await;
        let u1 = insert_turn(&db, Role::User, "q1", None).await.unwrap();
        let b1 = insert_turn(&db, Role::Bot, "a1", Some(u1.id)).await.unwrap();
        let u2 = insert_turn(&db, Role::User, "q2", None).await.unwrap();
        let b2 = insert_turn(&db, Role::Bot, "a2", Some(u2.id)).await.unwrap();

        let found = find_latest_user_turn_before(&db, b2.id).await.unwrap();
        assert_eq!(found.map(|t| t.id), Some(u2.id));

        let found = find_latest_user_turn_before(&db, b1.id).await.unwrap();
        assert_eq!(found.map(|t| t.id), Some(u1.id));

        let found = find_latest_user_turn_before(&db, u1.id).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn it_overwrites_feedback() {
        let db = test_db().await;
        let bot = insert_turn(&db, Role::Bot, "answer", None).await.unwrap();

        assert!(set_feedback(&db, bot.id, Feedback::Like).await.unwrap());
        assert!(set_feedback(&db, bot.id, Feedback::Dislike).await.unwrap());

        let turn = find_turn_by_id(&db, bot.id).await.unwrap().unwrap();
        assert_eq!(turn.feedback, Some(Feedback::Dislike));

        assert!(!set_feedback(&db, bot.id + 100, Feedback::Like).await.unwrap());
    }

    #[tokio::test]
    async fn it_clears_all_turns() {
        let db = test_db().await;
        insert_turn(&db, Role::User, "hello", None).await.unwrap();
        insert_turn(&db, Role::Bot, "hi", None).await.unwrap();

        assert_eq!(clear_turns(&db).await.unwrap(), 2);
        assert!(list_turns(&db).await.unwrap().is_empty());
        assert!(!delete_turn(&db, 1).await.unwrap());
    }
}
