//! Configuration file discovery, reading and writing.
//!
//! Files are read as JSON5, which also accepts plain JSON, and written back
//! as pretty-printed JSON.
//!
//! Discovery order:
//!
//! 1. `./sentry-query.json5`, then `./sentry-query.json`
//! 2. `<config dir>/sentry-query/config.json5`, then `config.json`
//!
//! where `<config dir>` is the platform configuration directory
//! (`~/.config` on Linux).

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// File names looked up in the working directory.
const LOCAL_FILE_NAMES: [&str; 2] = ["sentry-query.json5", "sentry-query.json"];

/// Directory under the platform config directory.
const USER_CONFIG_DIR: &str = "sentry-query";

/// File names looked up in the user config directory.
const USER_FILE_NAMES: [&str; 2] = ["config.json5", "config.json"];

/// Lists every configuration file candidate, highest priority first.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use sentry_config::persistence::config_candidates;
///
/// let candidates = config_candidates(Path::new("."), None);
/// assert_eq!(
///     candidates,
///     vec![PathBuf::from("./sentry-query.json5"), PathBuf::from("./sentry-query.json")]
/// );
/// ```
#[must_use]
pub fn config_candidates(local_dir: &Path, user_dir: Option<&Path>) -> Vec<PathBuf> {
    let local = LOCAL_FILE_NAMES.iter().map(|name| local_dir.join(name));
    let user = user_dir
        .into_iter()
        .flat_map(|dir| USER_FILE_NAMES.iter().map(move |name| dir.join(name)));
    local.chain(user).collect()
}

/// Returns the first existing candidate from [`config_candidates`].
#[must_use]
pub fn find_config_file_in(local_dir: &Path, user_dir: Option<&Path>) -> Option<PathBuf> {
    config_candidates(local_dir, user_dir)
        .into_iter()
        .find(|path| path.is_file())
}

/// Finds the configuration file for the current directory and user.
///
/// # Examples
///
/// ```no_run
/// use sentry_config::persistence::find_config_file;
///
/// match find_config_file() {
///     Some(path) => println!("using {}", path.display()),
///     None => println!("using defaults"),
/// }
/// ```
#[must_use]
pub fn find_config_file() -> Option<PathBuf> {
    let user_dir = user_config_dir().ok();
    find_config_file_in(Path::new("."), user_dir.as_deref())
}

/// Returns the user configuration directory, e.g. `~/.config/sentry-query`.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDirectory`] when the platform has no
/// configuration directory for the current user.
pub fn user_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(USER_CONFIG_DIR))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// Returns where a new user configuration file is written by default.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDirectory`], see [`user_config_dir`].
pub fn default_user_config_path() -> Result<PathBuf> {
    Ok(user_config_dir()?.join(USER_FILE_NAMES[0]))
}

/// Reads and deserializes a JSON5 or JSON configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::ReadFile`] when the file cannot be read and
/// [`ConfigError::ParseJson5`] when its content does not deserialize into
/// `T`.
///
/// # Examples
///
/// ```no_run
/// use sentry_config::Config;
/// use sentry_config::persistence::read_config_file;
///
/// # fn main() -> sentry_config::Result<()> {
/// let config: Config = read_config_file("sentry-query.json5")?;
/// println!("{}", config.org_slug);
/// # Ok(())
/// # }
/// ```
pub fn read_config_file<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(serde_json5::from_str(&content)?)
}

/// Serializes `config` as pretty JSON into `path`, creating missing parent
/// directories.
///
/// # Errors
///
/// Returns [`ConfigError::SerializeJson`] if `config` cannot be serialized
/// and [`ConfigError::WriteFile`] if the directory or file cannot be
/// written.
pub fn write_config_file<T: serde::Serialize>(path: impl AsRef<Path>, config: &T) -> Result<()> {
    let path = path.as_ref();
    let write_error = |source| ConfigError::WriteFile {
        path: path.to_path_buf(),
        source,
    };

    let content = serde_json::to_string_pretty(config)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, content + "\n").map_err(write_error)
}
