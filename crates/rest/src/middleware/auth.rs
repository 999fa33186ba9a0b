//! Session token middleware.
//!
//! Protected routes run behind [`require_auth`]. It reads the
//! `Authorization: Bearer <token>` header, verifies the token and stores the
//! resulting [`Principal`](medqr_persistence::tenant::Principal) in the
//! request extensions, where the
//! [`Authenticated`](crate::extractors::Authenticated) extractor picks it up.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use medqr_persistence::core::Storage;
use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::state::AppState;

/// Extracts the bearer token from the `Authorization` header.
///
/// The scheme is matched case-insensitively. Returns `None` when the header
/// is absent, not UTF-8, uses another scheme, or carries an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Rejects requests without a valid session token.
///
/// This is used with `axum::middleware::from_fn_with_state`.
pub async fn require_auth<S>(
    State(state): State<AppState<S>>,
    mut request: Request,
    next: Next,
) -> RestResult<Response>
where
    S: Storage + 'static,
{
    let token = bearer_token(request.headers())
        .ok_or_else(|| RestError::unauthenticated("no token"))?;
    let principal = state.tokens().verify(token)?;

    debug!(user_id = %principal.user_id(), role = %principal.role(), "Authenticated request");

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
