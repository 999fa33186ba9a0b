//! HospitalStorage implementation for SQLite.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::core::HospitalStorage;
use crate::error::{ConflictError, StorageError, StorageResult};
use crate::tenant::{HospitalId, Principal, Role};
use crate::types::{
    Hospital, HospitalOverview, HospitalRegistration, HospitalStatus, Transition, User,
};

use super::users::{email_taken, insert_user, load_user, save_user};
use super::{SqliteBackend, decode, encode, internal_error, is_unique_violation};

const OVERVIEW_SELECT: &str = "SELECT h.data, u.data FROM hospitals h
     LEFT JOIN users u ON u.id = h.admin_user_id";

fn overview_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, Option<String>)> {
    Ok((row.get(0)?, row.get(1)?))
}

fn decode_overview((hospital, admin): (String, Option<String>)) -> StorageResult<HospitalOverview> {
    let hospital: Hospital = decode(&hospital)?;
    let admin: Option<User> = admin.as_deref().map(decode).transpose()?;
    Ok(HospitalOverview {
        hospital,
        admin_user: admin.as_ref().map(User::profile),
    })
}

fn load_overview(conn: &Connection, id: &HospitalId) -> StorageResult<HospitalOverview> {
    let row = conn
        .query_row(
            &format!("{OVERVIEW_SELECT} WHERE h.id = ?1"),
            [id.as_str()],
            overview_from_row,
        )
        .optional()
        .map_err(|e| internal_error(format!("Failed to read hospital: {}", e)))?;

    match row {
        Some(row) => decode_overview(row),
        None => Err(StorageError::not_found("Hospital", id.as_str())),
    }
}

pub(super) fn hospital_exists(conn: &Connection, id: &HospitalId) -> StorageResult<bool> {
    conn.query_row("SELECT 1 FROM hospitals WHERE id = ?1", [id.as_str()], |_| {
        Ok(())
    })
    .optional()
    .map(|row| row.is_some())
    .map_err(|e| internal_error(format!("Failed to check hospital: {}", e)))
}

fn save_hospital(conn: &Connection, hospital: &Hospital) -> StorageResult<()> {
    let data = encode(hospital)?;
    conn.execute(
        "UPDATE hospitals SET status = ?1, data = ?2 WHERE id = ?3",
        params![hospital.status.as_str(), data, hospital.id.as_str()],
    )
    .map_err(|e| internal_error(format!("Failed to update hospital: {}", e)))?;
    Ok(())
}

#[async_trait]
impl HospitalStorage for SqliteBackend {
    async fn register_hospital(
        &self,
        registration: HospitalRegistration,
    ) -> StorageResult<HospitalOverview> {
        let registration = registration.validated()?;

        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| internal_error(format!("Failed to begin transaction: {}", e)))?;

        let hospital_email_taken = tx
            .query_row(
                "SELECT 1 FROM hospitals WHERE email = ?1",
                [registration.hospital.email.as_str()],
                |_| Ok(()),
            )
            .optional()
            .map_err(|e| internal_error(format!("Failed to check hospital email: {}", e)))?
            .is_some();
        if hospital_email_taken {
            return Err(StorageError::Conflict(
                ConflictError::DuplicateHospitalEmail {
                    email: registration.hospital.email,
                },
            ));
        }
        if email_taken(&tx, &registration.admin.email)? {
            return Err(StorageError::Conflict(ConflictError::DuplicateAdminEmail {
                email: registration.admin.email,
            }));
        }

        let hospital = registration.hospital.into_hospital();
        let admin = registration.admin.into_user(
            Role::HospitalAdmin,
            Some(hospital.id.clone()),
            None,
            false,
        );

        let data = encode(&hospital)?;
        tx.execute(
            "INSERT INTO hospitals (id, email, status, admin_user_id, data, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                hospital.id.as_str(),
                hospital.email,
                hospital.status.as_str(),
                admin.id.as_str(),
                data,
                hospital.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e, "hospitals.email") {
                StorageError::Conflict(ConflictError::DuplicateHospitalEmail {
                    email: hospital.email.clone(),
                })
            } else {
                internal_error(format!("Failed to insert hospital: {}", e))
            }
        })?;

        insert_user(&tx, &admin, |email| ConflictError::DuplicateAdminEmail {
            email,
        })?;

        tx.commit()
            .map_err(|e| internal_error(format!("Failed to commit transaction: {}", e)))?;

        tracing::info!(hospital_id = %hospital.id, email = %hospital.email, "Registered hospital");

        Ok(HospitalOverview {
            hospital,
            admin_user: Some(admin.profile()),
        })
    }

    async fn list_hospitals(
        &self,
        principal: &Principal,
        status: Option<HospitalStatus>,
    ) -> StorageResult<Vec<HospitalOverview>> {
        principal.require_role(Role::SuperAdmin)?;
        let conn = self.get_connection()?;

        let sql = match status {
            Some(_) => format!(
                "{OVERVIEW_SELECT} WHERE h.status = ?1 ORDER BY h.created_at DESC, h.rowid DESC"
            ),
            None => format!("{OVERVIEW_SELECT} ORDER BY h.created_at DESC, h.rowid DESC"),
        };
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| internal_error(format!("Failed to prepare query: {}", e)))?;

        let rows = match status {
            Some(status) => stmt.query_map([status.as_str()], overview_from_row),
            None => stmt.query_map([], overview_from_row),
        }
        .map_err(|e| internal_error(format!("Failed to list hospitals: {}", e)))?;

        let mut hospitals = Vec::new();
        for row in rows {
            let row = row.map_err(|e| internal_error(format!("Failed to read row: {}", e)))?;
            hospitals.push(decode_overview(row)?);
        }
        Ok(hospitals)
    }

    async fn get_hospital(
        &self,
        principal: &Principal,
        id: &HospitalId,
    ) -> StorageResult<HospitalOverview> {
        principal.require_role(Role::SuperAdmin)?;
        let conn = self.get_connection()?;
        load_overview(&conn, id)
    }

    async fn set_hospital_status(
        &self,
        principal: &Principal,
        id: &HospitalId,
        status: HospitalStatus,
    ) -> StorageResult<HospitalOverview> {
        principal.require_role(Role::SuperAdmin)?;

        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| internal_error(format!("Failed to begin transaction: {}", e)))?;

        let (data, admin_id): (String, Option<String>) = tx
            .query_row(
                "SELECT data, admin_user_id FROM hospitals WHERE id = ?1",
                [id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| internal_error(format!("Failed to read hospital: {}", e)))?
            .ok_or_else(|| StorageError::not_found("Hospital", id.as_str()))?;
        let mut hospital: Hospital = decode(&data)?;

        match hospital.status.transition_to(status)? {
            Transition::Unchanged => {
                tracing::debug!(hospital_id = %id, %status, "Hospital already in requested status");
            }
            Transition::Changed { from, to } => {
                hospital.status = to;
                hospital.updated_at = Utc::now();
                save_hospital(&tx, &hospital)?;

                if let Some(mut admin) = match admin_id.as_deref() {
                    Some(admin_id) => load_user(&tx, admin_id)?,
                    None => None,
                } {
                    admin.is_active = to.admin_active();
                    save_user(&tx, &admin)?;
                }

                tracing::info!(hospital_id = %id, %from, %to, "Hospital status changed");
            }
        }

        let overview = load_overview(&tx, id)?;
        tx.commit()
            .map_err(|e| internal_error(format!("Failed to commit transaction: {}", e)))?;
        Ok(overview)
    }
}
