//! Email and password checks for the login routes.

use medqr_persistence::core::UserStorage;
use medqr_persistence::tenant::{Principal, Role};
use medqr_persistence::types::User;

use super::password::{verify_against_unknown_account, verify_password_blocking};
use crate::error::{RestError, RestResult};

/// Which accounts a login route accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginAudience {
    /// Any role (`/auth/login`).
    Any,
    /// Patient portal accounts only (`/auth/patient-login`).
    PatientsOnly,
}

impl LoginAudience {
    fn admits(self, role: Role) -> bool {
        match self {
            LoginAudience::Any => true,
            LoginAudience::PatientsOnly => role == Role::Patient,
        }
    }
}

/// Checks credentials and returns the account with its principal.
///
/// Unknown emails, wrong passwords and accounts outside the audience all
/// fail with [`RestError::InvalidCredentials`]. The active flag is checked
/// only after the password matches, so a pending admin learns their state
/// but a stranger does not. An unknown email still pays for one password
/// verification, so response time does not reveal which emails exist.
pub async fn authenticate<S>(
    storage: &S,
    email: &str,
    password: &str,
    audience: LoginAudience,
) -> RestResult<(User, Principal)>
where
    S: UserStorage + ?Sized,
{
    let email = email.trim().to_lowercase();
    let Some(user) = storage.find_user_by_email(&email).await? else {
        verify_against_unknown_account(password.to_string()).await?;
        return Err(RestError::InvalidCredentials);
    };

    let matches =
        verify_password_blocking(password.to_string(), user.password_hash.clone()).await?;
    if !matches || !audience.admits(user.role) {
        return Err(RestError::InvalidCredentials);
    }

    if !user.is_active {
        return Err(RestError::AccountPending);
    }

    let principal = user.principal().ok_or_else(|| {
        RestError::internal(format!("Account {} has inconsistent references", user.id))
    })?;

    Ok((user, principal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use medqr_persistence::backends::sqlite::SqliteBackend;
    use medqr_persistence::core::HospitalStorage;
    use medqr_persistence::types::{HospitalRegistration, NewHospital, NewUser};

    async fn backend_with_pending_admin() -> SqliteBackend {
        let backend = SqliteBackend::in_memory().unwrap();
        backend.init_schema().unwrap();
        backend
            .register_hospital(HospitalRegistration {
                hospital: NewHospital {
                    name: "City".to_string(),
                    email: "city@hospital.org".to_string(),
                    phone: None,
                    address: None,
                    primary_contact_name: None,
                },
                admin: NewUser {
                    name: "Admin".to_string(),
                    email: "admin@city.org".to_string(),
                    password_hash: hash_password("hunter22").unwrap(),
                },
            })
            .await
            .unwrap();
        backend
            .ensure_super_admin(NewUser {
                name: "Owner".to_string(),
                email: "owner@smartqr.com".to_string(),
                password_hash: hash_password("owner-pass").unwrap(),
            })
            .await
            .unwrap();
        backend
    }

    #[tokio::test]
    async fn test_owner_login() {
        let backend = backend_with_pending_admin().await;
        let (user, principal) =
            authenticate(&backend, " OWNER@smartqr.com ", "owner-pass", LoginAudience::Any)
                .await
                .unwrap();
        assert_eq!(user.role, Role::SuperAdmin);
        assert_eq!(principal.role(), Role::SuperAdmin);
    }

    #[tokio::test]
    async fn test_unknown_and_wrong_password_look_alike() {
        let backend = backend_with_pending_admin().await;
        let unknown = authenticate(&backend, "nobody@x.org", "whatever", LoginAudience::Any)
            .await
            .unwrap_err();
        let wrong = authenticate(&backend, "owner@smartqr.com", "nope", LoginAudience::Any)
            .await
            .unwrap_err();
        assert!(matches!(unknown, RestError::InvalidCredentials));
        assert!(matches!(wrong, RestError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_pending_admin_needs_correct_password_first() {
        let backend = backend_with_pending_admin().await;
        let wrong = authenticate(&backend, "admin@city.org", "nope", LoginAudience::Any)
            .await
            .unwrap_err();
        assert!(matches!(wrong, RestError::InvalidCredentials));

        let pending = authenticate(&backend, "admin@city.org", "hunter22", LoginAudience::Any)
            .await
            .unwrap_err();
        assert!(matches!(pending, RestError::AccountPending));
    }

    #[tokio::test]
    async fn test_patient_login_rejects_staff() {
        let backend = backend_with_pending_admin().await;
        let err = authenticate(
            &backend,
            "owner@smartqr.com",
            "owner-pass",
            LoginAudience::PatientsOnly,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RestError::InvalidCredentials));
    }
}
