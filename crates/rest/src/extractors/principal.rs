//! Principal extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use medqr_persistence::tenant::{Principal, Role};

use crate::error::RestError;

/// The authenticated caller.
///
/// Only usable on routes behind
/// [`require_auth`](crate::middleware::require_auth); elsewhere it rejects
/// with `Unauthenticated`.
///
/// # Example
///
/// ```rust,ignore
/// use medqr_rest::extractors::Authenticated;
///
/// async fn handler(Authenticated(principal): Authenticated) {
///     println!("Caller: {}", principal.user_id());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| RestError::unauthenticated("no token"))
    }
}

/// An authenticated caller holding the `SUPER_ADMIN` role.
///
/// Other roles are rejected with `Forbidden`.
#[derive(Debug, Clone)]
pub struct SuperAdmin(pub Principal);

impl<S> FromRequestParts<S> for SuperAdmin
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(principal) = Authenticated::from_request_parts(parts, state).await?;
        principal.require_role(Role::SuperAdmin)?;
        Ok(SuperAdmin(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use medqr_persistence::tenant::{HospitalId, UserId};

    fn parts_with(principal: Option<Principal>) -> Parts {
        let (mut parts, _) = Request::new(()).into_parts();
        if let Some(p) = principal {
            parts.extensions.insert(p);
        }
        parts
    }

    #[tokio::test]
    async fn test_missing_principal_is_unauthenticated() {
        let mut parts = parts_with(None);
        let err = Authenticated::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "Unauthenticated");
    }

    #[tokio::test]
    async fn test_super_admin_rejects_hospital_admin() {
        let mut parts = parts_with(Some(Principal::HospitalAdmin {
            user_id: UserId::new("u-1"),
            hospital_id: HospitalId::new("h-1"),
        }));
        let err = SuperAdmin::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "Forbidden");
    }

    #[tokio::test]
    async fn test_super_admin_accepts_owner() {
        let owner = Principal::SuperAdmin {
            user_id: UserId::new("u-0"),
        };
        let mut parts = parts_with(Some(owner.clone()));
        let SuperAdmin(principal) = SuperAdmin::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(principal, owner);
    }
}
