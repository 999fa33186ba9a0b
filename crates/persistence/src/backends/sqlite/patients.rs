//! PatientStorage implementation for SQLite.
//!
//! Every scoped statement carries the [`PatientScope`] as a WHERE clause, so
//! a record in another tenant is indistinguishable from a missing one.

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};

use crate::core::{PatientQuery, PatientStorage};
use crate::error::{
    ConflictError, ResourceError, StorageError, StorageResult, ValidationError,
};
use crate::tenant::{Operation, PatientId, PatientScope, Principal, Role};
use crate::types::{NewUser, Patient, PatientDraft, PatientEmergencyView, QrToken};

use super::hospitals::hospital_exists;
use super::users::{email_taken, insert_user};
use super::{SqliteBackend, decode, encode, internal_error, is_unique_violation};

/// SQL condition and bound value for a scope.
fn scope_filter(scope: &PatientScope) -> (&'static str, Option<String>) {
    match scope {
        PatientScope::All => ("1 = 1", None),
        PatientScope::Hospital(hospital_id) => ("hospital_id = ?", Some(hospital_id.to_string())),
        PatientScope::Own(patient_id) => ("id = ?", Some(patient_id.to_string())),
    }
}

fn load_scoped(
    conn: &Connection,
    scope: &PatientScope,
    id: &PatientId,
) -> StorageResult<Patient> {
    let (filter, bound) = scope_filter(scope);
    let sql = format!("SELECT data FROM patients WHERE id = ? AND {filter}");

    let mut values = vec![id.to_string()];
    values.extend(bound);

    let data: Option<String> = conn
        .query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))
        .optional()
        .map_err(|e| internal_error(format!("Failed to read patient: {}", e)))?;

    match data {
        Some(data) => decode(&data),
        None => Err(StorageError::not_found("Patient", id.as_str())),
    }
}

fn insert_patient(conn: &Connection, patient: &Patient) -> StorageResult<()> {
    let data = encode(patient)?;
    conn.execute(
        "INSERT INTO patients (id, hospital_id, qr_token, data, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            patient.id.as_str(),
            patient.hospital.as_str(),
            patient.qr_token.as_str(),
            data,
            patient.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e, "patients.qr_token") {
            StorageError::Conflict(ConflictError::DuplicateQrToken)
        } else {
            internal_error(format!("Failed to insert patient: {}", e))
        }
    })?;
    Ok(())
}

#[async_trait]
impl PatientStorage for SqliteBackend {
    async fn create_patient(
        &self,
        principal: &Principal,
        draft: PatientDraft,
        portal: Option<NewUser>,
    ) -> StorageResult<Patient> {
        let scope = principal.authorize(Operation::Create)?;
        let hospital = scope.hospital_for_create(draft.hospital.clone())?;
        let profile = draft.validate()?;
        let portal = portal
            .map(|p| p.validated("portalAccess.email"))
            .transpose()?;

        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| internal_error(format!("Failed to begin transaction: {}", e)))?;

        if !hospital_exists(&tx, &hospital)? {
            return Err(ValidationError::invalid("hospital", "hospital does not exist").into());
        }

        let patient = Patient::new(profile, hospital);
        insert_patient(&tx, &patient)?;

        if let Some(portal) = portal {
            if email_taken(&tx, &portal.email)? {
                return Err(StorageError::Conflict(ConflictError::DuplicateUserEmail {
                    email: portal.email,
                }));
            }
            let user = portal.into_user(
                Role::Patient,
                Some(patient.hospital.clone()),
                Some(patient.id.clone()),
                true,
            );
            insert_user(&tx, &user, |email| ConflictError::DuplicateUserEmail {
                email,
            })?;
        }

        tx.commit()
            .map_err(|e| internal_error(format!("Failed to commit transaction: {}", e)))?;

        tracing::info!(
            patient_id = %patient.id,
            hospital_id = %patient.hospital,
            "Created patient"
        );
        Ok(patient)
    }

    async fn list_patients(
        &self,
        principal: &Principal,
        query: &PatientQuery,
    ) -> StorageResult<Vec<Patient>> {
        let scope = principal.authorize(Operation::List)?;
        let conn = self.get_connection()?;

        let (filter, bound) = scope_filter(&scope);
        let mut sql = format!("SELECT data FROM patients WHERE {filter}");
        let mut values: Vec<String> = bound.into_iter().collect();

        if let Some(hospital) = &query.hospital {
            sql.push_str(" AND hospital_id = ?");
            values.push(hospital.to_string());
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| internal_error(format!("Failed to prepare query: {}", e)))?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), |row| row.get::<_, String>(0))
            .map_err(|e| internal_error(format!("Failed to list patients: {}", e)))?;

        let mut patients = Vec::new();
        for row in rows {
            let data = row.map_err(|e| internal_error(format!("Failed to read row: {}", e)))?;
            patients.push(decode(&data)?);
        }
        Ok(patients)
    }

    async fn get_patient(&self, principal: &Principal, id: &PatientId) -> StorageResult<Patient> {
        let scope = principal.authorize(Operation::Read)?;
        let conn = self.get_connection()?;
        load_scoped(&conn, &scope, id)
    }

    async fn update_patient(
        &self,
        principal: &Principal,
        id: &PatientId,
        patch: PatientDraft,
    ) -> StorageResult<Patient> {
        let scope = principal.authorize(Operation::Update)?;

        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| internal_error(format!("Failed to begin transaction: {}", e)))?;

        let current = load_scoped(&tx, &scope, id)?;
        let updated = current.patched(patch)?;

        let data = encode(&updated)?;
        tx.execute(
            "UPDATE patients SET data = ?1 WHERE id = ?2",
            params![data, updated.id.as_str()],
        )
        .map_err(|e| internal_error(format!("Failed to update patient: {}", e)))?;

        tx.commit()
            .map_err(|e| internal_error(format!("Failed to commit transaction: {}", e)))?;

        tracing::debug!(patient_id = %id, "Updated patient");
        Ok(updated)
    }

    async fn delete_patient(
        &self,
        principal: &Principal,
        id: &PatientId,
    ) -> StorageResult<Patient> {
        let scope = principal.authorize(Operation::Delete)?;

        let mut conn = self.get_connection()?;
        let tx = conn
            .transaction()
            .map_err(|e| internal_error(format!("Failed to begin transaction: {}", e)))?;

        let patient = load_scoped(&tx, &scope, id)?;

        let portal_accounts = tx
            .execute("DELETE FROM users WHERE patient_id = ?1", [id.as_str()])
            .map_err(|e| internal_error(format!("Failed to delete portal account: {}", e)))?;
        tx.execute("DELETE FROM patients WHERE id = ?1", [id.as_str()])
            .map_err(|e| internal_error(format!("Failed to delete patient: {}", e)))?;

        tx.commit()
            .map_err(|e| internal_error(format!("Failed to commit transaction: {}", e)))?;

        tracing::info!(patient_id = %id, portal_accounts, "Deleted patient");
        Ok(patient)
    }

    async fn resolve_qr_token(&self, token: &QrToken) -> StorageResult<PatientEmergencyView> {
        let conn = self.get_connection()?;

        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM patients WHERE qr_token = ?1",
                [token.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| internal_error(format!("Failed to resolve QR token: {}", e)))?;

        let data = data.ok_or(StorageError::Resource(ResourceError::TokenNotFound))?;
        let patient: Patient = decode(&data)?;
        Ok(PatientEmergencyView::from(&patient))
    }
}
