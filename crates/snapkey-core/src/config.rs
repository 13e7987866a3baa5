use crate::error::Result;
use std::env;
use std::fs;
use std::path::PathBuf;

pub const PID_FILENAME: &str = "snapkey-daemon.pid";
pub const STORE_FILENAME: &str = "snapkey.json";
pub const SETTINGS_FILENAME: &str = "settings.json";

/// Get the snapkey configuration directory
pub fn get_config_dir() -> PathBuf {
    env::var("HOME")
        .map(|home| PathBuf::from(home).join(".snapkey"))
        .unwrap_or_else(|_| PathBuf::from(".snapkey"))
}

/// Ensure the configuration directory and store file exist
pub fn ensure_config_dir() -> Result<PathBuf> {
    let config_dir = get_config_dir();
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    let store_path = get_store_file_path();
    if !store_path.exists() {
        fs::write(&store_path, "")?;
    }

    Ok(config_dir)
}

/// Get the path to the PID file
pub fn get_pid_file_path() -> PathBuf {
    get_config_dir().join(PID_FILENAME)
}

/// Get the path to the snippet store file
pub fn get_store_file_path() -> PathBuf {
    get_config_dir().join(STORE_FILENAME)
}

/// Get the path to the settings file
pub fn get_settings_file_path() -> PathBuf {
    get_config_dir().join(SETTINGS_FILENAME)
}

/// Check if the snippet store file exists
pub fn store_file_exists() -> bool {
    get_store_file_path().exists()
}

/// Check if the daemon is running according to the PID file
pub fn is_daemon_running() -> Result<Option<u32>> {
    let pid_file = get_pid_file_path();

    if pid_file.exists() {
        match fs::read_to_string(&pid_file) {
            Ok(contents) => match contents.trim().parse::<u32>() {
                Ok(pid) => Ok(Some(pid)),
                Err(_) => {
                    // Invalid PID, treat as not running and clean up
                    let _ = fs::remove_file(&pid_file);
                    Ok(None)
                }
            },
            Err(_) => {
                // Can't read file, treat as not running and clean up
                let _ = fs::remove_file(&pid_file);
                Ok(None)
            }
        }
    } else {
        Ok(None)
    }
}
