//! Registry preferences.
//!
//! Stored as TOML; every field is optional and falls back to its default:
//!
//! ```toml
//! # Ask about dirty models that stay open in another part.
//! prompt-when-still-open = true
//! # What to do when a lifecycle listener returns an error: "isolate" or "stop".
//! listener-failures = "isolate"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How the listener fan-out reacts to a listener returning an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListenerFailurePolicy {
	/// Log the failure and keep notifying the remaining listeners.
	#[default]
	Isolate,
	/// Log the failure and skip every listener registered after it.
	#[serde(alias = "stop")]
	StopPropagation,
}

/// User-facing preferences consulted by the
/// [`SaveablesRegistry`](crate::SaveablesRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SaveablesConfig {
	/// Prompt for dirty models that remain open in a part outside the closing
	/// batch. Cleared when the user picks "don't ask again".
	pub prompt_when_still_open: bool,
	/// Listener failure handling.
	pub listener_failures: ListenerFailurePolicy,
}

impl Default for SaveablesConfig {
	fn default() -> Self {
		Self {
			prompt_when_still_open: true,
			listener_failures: ListenerFailurePolicy::Isolate,
		}
	}
}

impl SaveablesConfig {
	/// Parses a TOML document into a [`SaveablesConfig`].
	pub fn parse(input: &str) -> Result<Self> {
		Ok(toml::from_str(input)?)
	}

	/// Serializes the configuration back into TOML.
	pub fn to_toml(&self) -> Result<String> {
		Ok(toml::to_string(self)?)
	}
}
