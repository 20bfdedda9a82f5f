//! Loading and storing the saveables preferences file.
//!
//! The default location is `$XDG_CONFIG_HOME/canopy/saveables.toml` (or the
//! platform equivalent). A missing file is not an error; defaults apply.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use canopy_saveables::error::Result;
use canopy_saveables::{ConfigError, SaveablesConfig};
use tracing::debug;

/// File name of the preferences document.
pub const FILE_NAME: &str = "saveables.toml";

/// Default preferences path, if the platform has a config directory.
pub fn default_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("canopy").join(FILE_NAME))
}

/// Reads preferences from `path`, falling back to defaults when it does not exist.
pub fn load(path: &Path) -> Result<SaveablesConfig> {
	match fs::read_to_string(path) {
		Ok(text) => SaveablesConfig::parse(&text),
		Err(error) if error.kind() == ErrorKind::NotFound => {
			debug!(path = %path.display(), "No preferences file, using defaults");
			Ok(SaveablesConfig::default())
		}
		Err(error) => Err(ConfigError::Io {
			path: path.to_path_buf(),
			error,
		}),
	}
}

/// Writes preferences to `path`, creating parent directories.
pub fn store(path: &Path, config: &SaveablesConfig) -> Result<()> {
	let io_error = |error| ConfigError::Io {
		path: path.to_path_buf(),
		error,
	};
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent).map_err(io_error)?;
	}
	fs::write(path, config.to_toml()?).map_err(io_error)?;
	debug!(path = %path.display(), "Stored preferences");
	Ok(())
}
