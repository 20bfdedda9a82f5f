//! Error types for saving and configuration.

use thiserror::Error;

/// Failure reported by a [`Saveable`](crate::Saveable) or
/// [`SaveablePart`](crate::SaveablePart) while saving.
///
/// The registry never interprets these; it stops the batch it was running and
/// hands the error back to whoever started the close or save.
#[derive(Debug, Error)]
pub enum SaveError {
	/// The model refused or failed to persist its content.
	#[error("failed to save '{name}': {reason}")]
	Failed {
		/// Display name of the model that failed.
		name: String,
		/// Human readable cause.
		reason: String,
	},

	/// Underlying I/O failure.
	#[error("I/O error while saving: {0}")]
	Io(#[from] std::io::Error),
}

impl SaveError {
	/// Builds a [`SaveError::Failed`] for the named model.
	pub fn failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::Failed {
			name: name.into(),
			reason: reason.into(),
		}
	}
}

/// Errors that can occur when reading or writing [`SaveablesConfig`](crate::SaveablesConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
	/// The TOML document could not be parsed.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// The configuration could not be serialized.
	#[error("TOML serialize error: {0}")]
	Serialize(#[from] toml::ser::Error),

	/// Error reading or writing a configuration file.
	#[error("I/O error on {path}: {error}")]
	Io {
		/// Path to the file that failed.
		path: std::path::PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
