//! Saveable lifecycle tracking for the Canopy workbench.
//!
//! A [`Saveable`] is a unit of dirty-trackable content (usually a document
//! model). Any number of [`Source`]s (usually UI parts) may display the same
//! saveable at once. The [`SaveablesRegistry`] keeps the association between
//! sources and the models they display, counts how many sources reference
//! each model, and decides which dirty models the user must be asked about
//! when a batch of parts closes.
//!
//! # Identity
//!
//! - Saveables compare by *value*: two [`SaveableRef`]s are the same model when
//!   their [`SaveableKey`]s are equal, regardless of which instance they wrap.
//! - Sources compare by *reference*: every [`Source`] carries a unique
//!   [`SourceId`] and two sources are never merged.
//!
//! # Closing parts
//!
//! Closing a batch of parts is a two-phase operation:
//!
//! ```ignore
//! let info = match registry.pre_close_parts(&parts, true, Some(page))? {
//! 	PreClose::Proceed(info) => info,
//! 	PreClose::Cancelled => return Ok(false),
//! };
//! // tear the parts down in the UI ...
//! registry.post_close(info);
//! ```
//!
//! The propose phase may prompt and save but never mutates reference counts;
//! the commit phase applies the removals and fires `PostClose`.
//!
//! # Threading
//!
//! Everything here is single-threaded (`Rc`, `Cell`) and must be driven from
//! the UI event loop.

pub mod config;
pub mod error;
pub mod event;
pub mod listener;
pub mod prompt;
pub mod registry;
pub mod saveable;
pub mod source;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{ListenerFailurePolicy, SaveablesConfig};
pub use error::{ConfigError, SaveError};
pub use event::{LifecycleEvent, LifecycleEventKind};
pub use listener::ListenerId;
pub use prompt::{Page, PromptDecision, PromptRequest, PromptResponse, SavePrompter};
pub use registry::{PostCloseInfo, PreClose, RefCounts, SaveablesRegistry};
pub use saveable::{DefaultSaveable, SaveMonitor, Saveable, SaveableKey, SaveableRef};
pub use source::{
	CloseResponse, SaveCapability, SaveablePart, SaveablesSource, Source, SourceId, SourceRole,
};
