//! First-start provisioning of the system owner account.

use medqr_persistence::core::UserStorage;
use medqr_persistence::types::{NewUser, User};
use tracing::{info, warn};

use crate::auth::password::{generate_password, hash_password_blocking, validate_password_strength};
use crate::config::ServerConfig;
use crate::error::RestResult;

/// Display name of the bootstrap owner account.
pub const OWNER_NAME: &str = "System Owner";

/// Creates the `SUPER_ADMIN` account unless one already exists.
///
/// Uses `owner_password` from the configuration when set. Otherwise a random
/// password is generated and logged once at `warn`. Returns the new account,
/// or `None` when an owner was already present.
pub async fn ensure_super_admin<S>(storage: &S, config: &ServerConfig) -> RestResult<Option<User>>
where
    S: UserStorage + ?Sized,
{
    let (password, generated) = match &config.owner_password {
        Some(password) => {
            validate_password_strength("ownerPassword", password)?;
            (password.clone(), false)
        }
        None => (generate_password(), true),
    };

    let owner = NewUser {
        name: OWNER_NAME.to_string(),
        email: config.owner_email.clone(),
        password_hash: hash_password_blocking(password.clone()).await?,
    };

    let created = storage.ensure_super_admin(owner).await?;
    match &created {
        Some(user) if generated => {
            warn!(
                email = %user.email,
                password = %password,
                "Created system owner with a generated password; change it after first login"
            );
        }
        Some(user) => info!(email = %user.email, "Created system owner"),
        None => info!("System owner already exists"),
    }

    Ok(created)
}
