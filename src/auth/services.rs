use tracing::{error, info, warn};

use crate::auth::dto::{LoginRequest, RegisterRequest, ResetPasswordRequest};
use crate::auth::error::CredentialError;
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::store::{NewUser, UserStore};

/// Hash the password and persist a new user row. The profile fields are
/// stored verbatim; a duplicate email surfaces as a generic persistence
/// failure via the schema's unique constraint.
pub async fn register(
    store: &dyn UserStore,
    payload: RegisterRequest,
) -> Result<(), CredentialError> {
    let password_hash = hash_password(&payload.password).map_err(CredentialError::Hashing)?;

    let id = store
        .insert(NewUser {
            username: payload.username,
            email: payload.email,
            password_hash,
            phone_number: payload.phone_number,
            gender: payload.gender,
            dob: payload.dob,
        })
        .await
        .map_err(|e| {
            error!(error = %e, "insert user failed");
            CredentialError::Persistence(e)
        })?;

    info!(user_id = %id, "user registered");
    Ok(())
}

/// Verify the credentials and issue a token for the user id.
///
/// Unknown email, store error, verification error, and wrong password all
/// collapse into `InvalidCredentials` so the caller cannot tell which check
/// failed. Details stay in the logs.
pub async fn login(
    store: &dyn UserStore,
    keys: &JwtKeys,
    payload: LoginRequest,
) -> Result<String, CredentialError> {
    let user = match store.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err(CredentialError::InvalidCredentials);
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(CredentialError::InvalidCredentials);
        }
    };

    let ok = match verify_password(&payload.password, &user.password_hash) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, user_id = %user.id, "verify_password failed");
            return Err(CredentialError::InvalidCredentials);
        }
    };
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(CredentialError::InvalidCredentials);
    }

    let token = keys.sign(user.id).map_err(|e| {
        error!(error = %e, user_id = %user.id, "jwt sign failed");
        CredentialError::TokenIssuance(e)
    })?;

    info!(user_id = %user.id, "user logged in");
    Ok(token)
}

/// Look up the email ahead of a password reset. Success only means the email
/// exists; no token is issued and no ownership is proven. A store failure
/// reads as absence: this route answers exists / not, nothing else.
pub async fn check_reset_eligibility(
    store: &dyn UserStore,
    email: &str,
) -> Result<(), CredentialError> {
    match store.find_by_email(email).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(CredentialError::UserNotFound),
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            Err(CredentialError::UserNotFound)
        }
    }
}

/// Overwrite the stored password hash for an email. The confirmation check
/// runs before any store access; the new password must differ from the
/// current one.
pub async fn reset_password(
    store: &dyn UserStore,
    payload: ResetPasswordRequest,
) -> Result<(), CredentialError> {
    if payload.new_password != payload.confirm_password {
        return Err(CredentialError::PasswordMismatch);
    }

    let user = store
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!(error = %e, "find_by_email failed");
            CredentialError::Persistence(e)
        })?
        .ok_or(CredentialError::UserNotFound)?;

    let unchanged = verify_password(&payload.new_password, &user.password_hash).map_err(|e| {
        error!(error = %e, user_id = %user.id, "verify_password failed");
        CredentialError::Hashing(e)
    })?;
    if unchanged {
        warn!(user_id = %user.id, "reset resubmitted the current password");
        return Err(CredentialError::SamePassword);
    }

    let password_hash =
        hash_password(&payload.new_password).map_err(CredentialError::Hashing)?;

    store
        .update_password(&payload.email, &password_hash)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user.id, "update_password failed");
            CredentialError::Persistence(e)
        })?;

    info!(user_id = %user.id, "password updated");
    Ok(())
}
