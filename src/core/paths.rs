use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Base gostamp config directory (~/.config/gostamp/ on Unix-likes)
pub fn gostamp() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("gostamp"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("gostamp"))
    }
}

/// Global gostamp.json config file path
pub fn gostamp_json() -> Result<PathBuf> {
    Ok(gostamp()?.join("gostamp.json"))
}
