//! Default values for realm configuration.
//!
//! Centralized so the library and the command-line front end agree.

use std::path::PathBuf;

/// Backend used when a configuration does not name one.
pub const DEFAULT_STORAGE: &str = "file";

/// Environment variable holding the path of the configuration file.
pub const CONFIG_ENV: &str = "REALM_CONFIG";

/// Returns the default root directory for the file backend.
///
/// Uses the platform data directory:
/// - Linux: `~/.local/share/realm`
/// - macOS: `~/Library/Application Support/realm`
/// - Windows: `{FOLDERID_RoamingAppData}\realm`
///
/// Falls back to `.realm` in the current directory if the platform data
/// directory cannot be determined.
pub fn default_data_root() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("realm"))
        .unwrap_or_else(|| PathBuf::from(".realm"))
}
