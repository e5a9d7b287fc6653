use std::path::PathBuf;

use crate::SyncError;

/// Written by siad on first start, relative to $HOME.
const API_PASSWORD_FILE: &str = ".sia/apipassword";

/// Reads the skyd API password, preferring the environment over the
/// password file siad drops next to its data directory.
pub fn get_api_password() -> Result<String, SyncError> {
    if let Ok(password) = std::env::var("SIA_API_PASSWORD") {
        let password = password.trim();
        if !password.is_empty() {
            return Ok(password.to_string());
        }
    }

    let home = std::env::var("HOME").map_err(|_| SyncError::MissingPassword)?;
    let path = PathBuf::from(home).join(API_PASSWORD_FILE);
    let contents = std::fs::read_to_string(&path).map_err(|_| SyncError::MissingPassword)?;

    let password = contents.trim();
    if password.is_empty() {
        return Err(SyncError::MissingPassword);
    }

    Ok(password.to_string())
}
