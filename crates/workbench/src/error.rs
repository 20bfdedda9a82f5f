//! Error types for workbench operations.

use canopy_saveables::{ConfigError, SaveError, SourceId};
use thiserror::Error;

/// Errors raised by [`Workbench`](crate::Workbench) operations.
#[derive(Debug, Error)]
pub enum WorkbenchError {
	/// A model failed to save while closing.
	#[error(transparent)]
	Save(#[from] SaveError),

	/// Preferences could not be read or written.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// The id does not belong to a part hosted on the page.
	#[error("no part with id {} is open", .0.0)]
	UnknownPart(SourceId),
}

/// Result type for workbench operations.
pub type Result<T> = std::result::Result<T, WorkbenchError>;
