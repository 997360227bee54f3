use crate::schema::users;
use anyhow::{anyhow, bail, Context, Result};
use diesel::prelude::*;
use foodgram_core::password::hash_password;
use foodgram_core::validation::{validate_signup, SignupDraft};
use std::fmt;

pub struct AdminRequest<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password: Option<&'a str>,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AdminOutcome {
    Created { id: i32 },
    Promoted { id: i32 },
    AlreadyStaff { id: i32 },
}

impl fmt::Display for AdminOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminOutcome::Created { id } => write!(f, "Created staff user {}", id),
            AdminOutcome::Promoted { id } => write!(f, "Promoted user {} to staff", id),
            AdminOutcome::AlreadyStaff { id } => write!(f, "User {} is already staff", id),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = users)]
struct NewStaffUser<'a> {
    email: &'a str,
    username: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    password_hash: &'a str,
    is_staff: bool,
}

/// Matches an existing account by email or username. A match on both must
/// be the same account.
pub fn create_admin(conn: &mut PgConnection, request: &AdminRequest<'_>) -> Result<AdminOutcome> {
    let existing: Vec<(i32, bool)> = users::table
        .filter(
            users::email
                .eq(request.email)
                .or(users::username.eq(request.username)),
        )
        .select((users::id, users::is_staff))
        .load(conn)
        .context("Failed to look up user")?;

    match existing.as_slice() {
        [(id, true)] => Ok(AdminOutcome::AlreadyStaff { id: *id }),
        [(id, false)] => {
            diesel::update(users::table.find(*id))
                .set(users::is_staff.eq(true))
                .execute(conn)
                .context("Failed to promote user")?;
            tracing::info!(user_id = id, "user promoted to staff");
            Ok(AdminOutcome::Promoted { id: *id })
        }
        [] => {
            let Some(password) = request.password else {
                bail!("A password is required to create a new user");
            };
            validate_signup(&SignupDraft {
                email: request.email,
                username: request.username,
                first_name: request.first_name,
                last_name: request.last_name,
                password,
            })
            .map_err(|errors| anyhow!("Invalid user: {}", errors))?;

            let password_hash =
                hash_password(password).map_err(|e| anyhow!("Failed to hash password: {}", e))?;
            let id: i32 = diesel::insert_into(users::table)
                .values(NewStaffUser {
                    email: request.email,
                    username: request.username,
                    first_name: request.first_name,
                    last_name: request.last_name,
                    password_hash: &password_hash,
                    is_staff: true,
                })
                .returning(users::id)
                .get_result(conn)
                .context("Failed to create user")?;
            tracing::info!(user_id = id, "staff user created");
            Ok(AdminOutcome::Created { id })
        }
        _ => bail!(
            "Email {} and username {} belong to different users",
            request.email,
            request.username
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_messages() {
        assert_eq!(AdminOutcome::Created { id: 3 }.to_string(), "Created staff user 3");
        assert_eq!(
            AdminOutcome::Promoted { id: 4 }.to_string(),
            "Promoted user 4 to staff"
        );
    }
}
