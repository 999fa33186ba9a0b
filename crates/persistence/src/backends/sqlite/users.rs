//! UserStorage implementation for SQLite.

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};

use crate::core::UserStorage;
use crate::error::{ConflictError, StorageError, StorageResult};
use crate::tenant::{Role, UserId};
use crate::types::{NewUser, User};

use super::{SqliteBackend, decode, encode, internal_error, is_unique_violation};

/// Inserts an account, mapping an email collision to `conflict`.
pub(super) fn insert_user(
    conn: &Connection,
    user: &User,
    conflict: impl FnOnce(String) -> ConflictError,
) -> StorageResult<()> {
    let data = encode(user)?;
    conn.execute(
        "INSERT INTO users (id, email, role, hospital_id, patient_id, data, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user.id.as_str(),
            user.email,
            user.role.as_str(),
            user.hospital.as_ref().map(|h| h.as_str()),
            user.patient.as_ref().map(|p| p.as_str()),
            data,
            user.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e, "users.email") {
            StorageError::Conflict(conflict(user.email.clone()))
        } else {
            internal_error(format!("Failed to insert user: {}", e))
        }
    })?;
    Ok(())
}

/// Rewrites a stored account document.
pub(super) fn save_user(conn: &Connection, user: &User) -> StorageResult<()> {
    let data = encode(user)?;
    conn.execute(
        "UPDATE users SET data = ?1 WHERE id = ?2",
        params![data, user.id.as_str()],
    )
    .map_err(|e| internal_error(format!("Failed to update user: {}", e)))?;
    Ok(())
}

pub(super) fn email_taken(conn: &Connection, email: &str) -> StorageResult<bool> {
    conn.query_row("SELECT 1 FROM users WHERE email = ?1", [email], |_| Ok(()))
        .optional()
        .map(|row| row.is_some())
        .map_err(|e| internal_error(format!("Failed to check user email: {}", e)))
}

pub(super) fn load_user(conn: &Connection, id: &str) -> StorageResult<Option<User>> {
    let data: Option<String> = conn
        .query_row("SELECT data FROM users WHERE id = ?1", [id], |row| row.get(0))
        .optional()
        .map_err(|e| internal_error(format!("Failed to read user: {}", e)))?;
    data.as_deref().map(decode).transpose()
}

#[async_trait]
impl UserStorage for SqliteBackend {
    async fn find_user_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let conn = self.get_connection()?;
        let email = email.trim().to_lowercase();

        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM users WHERE email = ?1",
                [email.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| internal_error(format!("Failed to read user: {}", e)))?;

        data.as_deref().map(decode).transpose()
    }

    async fn find_user(&self, id: &UserId) -> StorageResult<Option<User>> {
        let conn = self.get_connection()?;
        load_user(&conn, id.as_str())
    }

    async fn ensure_super_admin(&self, owner: NewUser) -> StorageResult<Option<User>> {
        let owner = owner.validated("email")?;

        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| internal_error(format!("Failed to begin transaction: {}", e)))?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM users WHERE role = ?1 LIMIT 1",
                [Role::SuperAdmin.as_str()],
                |_| Ok(()),
            )
            .optional()
            .map_err(|e| internal_error(format!("Failed to look up owner: {}", e)))?
            .is_some();

        if exists {
            return Ok(None);
        }

        let user = owner.into_user(Role::SuperAdmin, None, None, true);
        insert_user(&tx, &user, |email| ConflictError::DuplicateUserEmail {
            email,
        })?;

        tx.commit()
            .map_err(|e| internal_error(format!("Failed to commit transaction: {}", e)))?;

        tracing::info!(user_id = %user.id, email = %user.email, "Created owner account");
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> SqliteBackend {
        let backend = SqliteBackend::in_memory().unwrap();
        backend.init_schema().unwrap();
        backend
    }

    fn owner(email: &str) -> NewUser {
        NewUser {
            name: "System Owner".into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
        }
    }

    #[tokio::test]
    async fn test_ensure_super_admin_is_idempotent() {
        let backend = backend();

        let created = backend
            .ensure_super_admin(owner("Owner@SmartQR.com"))
            .await
            .unwrap()
            .expect("owner created");
        assert_eq!(created.email, "owner@smartqr.com");
        assert!(created.is_active);

        let again = backend
            .ensure_super_admin(owner("other@smartqr.com"))
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_find_user_by_email_normalizes() {
        let backend = backend();
        let created = backend
            .ensure_super_admin(owner("owner@smartqr.com"))
            .await
            .unwrap()
            .unwrap();

        let found = backend
            .find_user_by_email("  OWNER@smartqr.com ")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.password_hash, "$argon2id$stub");

        assert!(backend.find_user(&created.id).await.unwrap().is_some());
        assert!(
            backend
                .find_user_by_email("nobody@x.com")
                .await
                .unwrap()
                .is_none()
        );
    }
}
