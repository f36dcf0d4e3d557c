//! One-shot notifications queued for a user and drained the next time they are shown.

use crate::models::{FlashMessage, NewFlashMessage};
use crate::schema::flash_messages;
use diesel::prelude::*;
use uuid::Uuid;

/// Level attached to messages about completed actions.
pub const SUCCESS: &str = "success";

pub fn push(
    conn: &mut PgConnection,
    user_id: Uuid,
    level: &str,
    message: &str,
) -> Result<(), diesel::result::Error> {
    diesel::insert_into(flash_messages::table)
        .values(NewFlashMessage {
            user_id,
            level,
            message,
        })
        .execute(conn)?;
    Ok(())
}

/// Pending messages for the user, oldest first. Returned messages are removed.
pub fn take(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Vec<FlashMessage>, diesel::result::Error> {
    conn.transaction(|conn| {
        let messages: Vec<FlashMessage> = flash_messages::table
            .filter(flash_messages::user_id.eq(user_id))
            .order((flash_messages::created_at.asc(), flash_messages::id.asc()))
            .select(FlashMessage::as_select())
            .for_update()
            .load(conn)?;

        let ids: Vec<Uuid> = messages.iter().map(|m| m.id).collect();
        diesel::delete(flash_messages::table.filter(flash_messages::id.eq_any(&ids)))
            .execute(conn)?;

        Ok(messages)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{insert_user, test_connection};

    #[test]
    fn test_take_drains_messages() {
        let Some(mut conn) = test_connection() else {
            return;
        };
        let user = insert_user(&mut conn, "@johndoe", false);
        let other = insert_user(&mut conn, "@janedoe", false);

        push(&mut conn, user.id, SUCCESS, "Recipe created!").unwrap();
        push(&mut conn, other.id, "info", "Not yours").unwrap();

        let messages = take(&mut conn, user.id).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].level, "success");
        assert_eq!(messages[0].message, "Recipe created!");

        assert!(take(&mut conn, user.id).unwrap().is_empty());
        assert_eq!(take(&mut conn, other.id).unwrap().len(), 1);
    }
}
