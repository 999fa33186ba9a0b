//! Session tokens.
//!
//! Tokens are HS256 JWTs. The claims carry everything needed to rebuild the
//! caller's [`Principal`], so protected routes never touch the database to
//! authenticate.
//!
//! ```json
//! {"sub": "u-1", "role": "HOSPITAL_ADMIN", "hospital": "h-1", "iat": 1700000000, "exp": 1700604800}
//! ```

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use medqr_persistence::tenant::{HospitalId, PatientId, Principal, Role, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{RestError, RestResult};

/// Claims embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: String,
    /// Account role.
    pub role: Role,
    /// Hospital id, for hospital admins and patients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital: Option<String>,
    /// Patient id, for patients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<String>,
    /// Issued at (seconds since the epoch).
    pub iat: i64,
    /// Expiry (seconds since the epoch).
    pub exp: i64,
}

impl Claims {
    /// Builds claims for a principal, valid for `ttl` from `now`.
    pub fn for_principal(principal: &Principal, now: i64, ttl: Duration) -> Self {
        Self {
            sub: principal.user_id().as_str().to_string(),
            role: principal.role(),
            hospital: principal.hospital_id().map(|h| h.as_str().to_string()),
            patient: principal.patient_id().map(|p| p.as_str().to_string()),
            iat: now,
            exp: now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
        }
    }

    /// Rebuilds the principal.
    ///
    /// Returns `None` when a claim the role depends on is missing.
    pub fn principal(&self) -> Option<Principal> {
        let user_id = UserId::new(self.sub.as_str());
        match self.role {
            Role::SuperAdmin => Some(Principal::SuperAdmin { user_id }),
            Role::HospitalAdmin => Some(Principal::HospitalAdmin {
                user_id,
                hospital_id: HospitalId::new(self.hospital.as_deref()?),
            }),
            Role::Patient => Some(Principal::Patient {
                user_id,
                hospital_id: HospitalId::new(self.hospital.as_deref()?),
                patient_id: PatientId::new(self.patient.as_deref()?),
            }),
        }
    }
}

/// Signs and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Creates an issuer for the given secret and token lifetime.
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Issues a token for the principal.
    pub fn issue(&self, principal: &Principal) -> RestResult<String> {
        let claims = Claims::for_principal(principal, Utc::now().timestamp(), self.ttl);
        self.sign(&claims)
    }

    /// Signs arbitrary claims.
    pub fn sign(&self, claims: &Claims) -> RestResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| RestError::internal(format!("Failed to sign token: {}", e)))
    }

    /// Verifies a token and returns the principal it carries.
    pub fn verify(&self, token: &str) -> RestResult<Principal> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => RestError::unauthenticated("token expired"),
                _ => RestError::unauthenticated("token failed"),
            }
        })?;

        data.claims
            .principal()
            .ok_or_else(|| RestError::unauthenticated("token is missing required claims"))
    }
}
