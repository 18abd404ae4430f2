//! Account database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Role, User};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, profile_id, active, created_at";

impl Database {
    /// Insert a new account. A taken email surfaces as `DbError::Duplicate`.
    pub fn insert_user(&self, user: &User) -> DbResult<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO users (
                    id, name, email, password_hash, role, profile_id, active, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    user.id,
                    user.name,
                    user.email,
                    user.password_hash,
                    user.role.as_str(),
                    user.profile_id,
                    user.active,
                    user.created_at,
                ],
            )
            .map_err(DbError::from_write)?;
        Ok(())
    }

    /// Get an account by id.
    pub fn get_user(&self, id: &str) -> DbResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                [id],
                UserRow::from_row,
            )
            .optional()?;
        row.map(User::try_from).transpose()
    }

    /// Get an account by email.
    pub fn get_user_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS),
                [email],
                UserRow::from_row,
            )
            .optional()?;
        row.map(User::try_from).transpose()
    }

    pub fn user_email_exists(&self, email: &str) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?",
            [email],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Whether some account already acts for a profile.
    pub fn profile_has_account(&self, profile_id: &str) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE profile_id = ?",
            [profile_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Deactivate every account acting for a profile.
    pub fn deactivate_users_for_profile(&self, profile_id: &str) -> DbResult<usize> {
        let rows_affected = self.conn.execute(
            "UPDATE users SET active = 0 WHERE profile_id = ?",
            [profile_id],
        )?;
        Ok(rows_affected)
    }
}

/// Raw row from the users table.
struct UserRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    profile_id: Option<String>,
    active: bool,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            role: row.get(4)?,
            profile_id: row.get(5)?,
            active: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(DbError::Constraint)?;
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            profile_id: row.profile_id,
            active: row.active,
            created_at: row.created_at,
        })
    }
}
