//! Locating and reading casebook config files.

use super::{CONFIG_FILE_NAME, ConfigLayerSource, schema};
use crate::ConfigError;
use directories::UserDirs;
use log::debug;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Parse JSON5 text into a plain JSON value.
pub(super) fn parse(contents: &str) -> Result<Value, ConfigError> {
    Ok(json5::from_str(contents)?)
}

/// Read one layer file and check it against the schema.
///
/// `Ok(None)` means the file is not there; whether that matters is up to the
/// caller.
pub(super) fn read_layer(
    source: ConfigLayerSource,
    path: &Path,
) -> Result<Option<Value>, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let value = parse(&contents)?;
    schema::validate_layer_schema(&value, &format!("{source} layer {}", path.display()))?;
    debug!(
        "config layer read (source={source}, path={}, bytes={})",
        path.display(),
        contents.len()
    );
    Ok(Some(value))
}

/// Machine-wide layer, where the platform has a conventional location.
pub(super) fn system_layer_path() -> Option<PathBuf> {
    let dir = if cfg!(windows) {
        r"C:\ProgramData\casebook"
    } else if cfg!(unix) {
        "/etc/casebook"
    } else {
        return None;
    };
    Some(Path::new(dir).join(CONFIG_FILE_NAME))
}

/// `~/.casebook/casebook.json5`, when a home directory is known.
pub(super) fn user_layer_path() -> Option<PathBuf> {
    let dirs = UserDirs::new()?;
    Some(dirs.home_dir().join(".casebook").join(CONFIG_FILE_NAME))
}

/// Canonical form of `cwd`; a directory that does not exist yet is kept as given.
pub(super) fn resolve_cwd(cwd: &Path) -> Result<PathBuf, ConfigError> {
    match cwd.canonicalize() {
        Ok(resolved) => Ok(resolved),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(cwd.to_path_buf()),
        Err(err) => Err(err.into()),
    }
}

/// Key used to detect the same file reached through different paths.
pub(super) fn identity(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
