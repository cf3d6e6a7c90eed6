//! Signed-in session kept in the OS keyring between runs.

use super::Session;
use crate::error::ApiError;

const SERVICE: &str = "healthtrack";
const SESSION_KEY: &str = "cloud_session";

fn entry() -> Result<keyring::Entry, ApiError> {
    Ok(keyring::Entry::new(SERVICE, SESSION_KEY)?)
}

pub fn load_session() -> Result<Option<Session>, ApiError> {
    match entry()?.get_password() {
        Ok(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| ApiError::Keyring(format!("stored session is invalid: {e}"))),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save_session(session: &Session) -> Result<(), ApiError> {
    let raw = serde_json::to_string(session).map_err(|e| ApiError::Keyring(e.to_string()))?;
    entry()?.set_password(&raw)?;
    Ok(())
}

pub fn delete_session() -> Result<(), ApiError> {
    match entry()?.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
