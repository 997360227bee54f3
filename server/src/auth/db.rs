use crate::db::DbPool;
use crate::error::ApiResult;
use crate::models::{NewSession, User};
use crate::schema::{sessions, users};
use chrono::{Duration, Utc};
use diesel::prelude::*;

use super::crypto::{generate_token, hash_token};

pub const SESSION_DAYS: i64 = 30;

/// Stores a fresh session and returns the plaintext token. Only its hash is
/// persisted.
pub fn create_session(conn: &mut PgConnection, user_id: i32) -> QueryResult<String> {
    let token = generate_token();
    let token_hash = hash_token(&token);

    diesel::insert_into(sessions::table)
        .values(NewSession {
            user_id,
            token_hash: &token_hash,
            expires_at: Utc::now() + Duration::days(SESSION_DAYS),
        })
        .execute(conn)?;

    Ok(token)
}

/// Returns the number of sessions removed (0 or 1).
pub fn delete_session(conn: &mut PgConnection, token: &str) -> QueryResult<usize> {
    diesel::delete(sessions::table.filter(sessions::token_hash.eq(hash_token(token)))).execute(conn)
}

/// `Ok(None)` for an unknown or expired token.
pub fn get_user_from_token(pool: &DbPool, token: &str) -> ApiResult<Option<User>> {
    let mut conn = pool.get()?;

    let user = sessions::table
        .inner_join(users::table)
        .filter(sessions::token_hash.eq(hash_token(token)))
        .filter(sessions::expires_at.gt(Utc::now()))
        .select(User::as_select())
        .first(&mut conn)
        .optional()?;

    Ok(user)
}
