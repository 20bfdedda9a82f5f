//! Ordered, synchronous listener fan-out.

use std::rc::Rc;

use tracing::warn;

use crate::config::ListenerFailurePolicy;
use crate::event::LifecycleEvent;

/// Callback notified of lifecycle events.
pub type ListenerFn = dyn Fn(&LifecycleEvent) -> anyhow::Result<()>;

/// Handle returned on subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Subscribers in registration order.
#[derive(Default)]
pub(crate) struct ListenerList {
	next_id: u64,
	entries: Vec<(ListenerId, Rc<ListenerFn>)>,
}

impl ListenerList {
	pub fn add(&mut self, listener: Rc<ListenerFn>) -> ListenerId {
		self.next_id += 1;
		let id = ListenerId(self.next_id);
		self.entries.push((id, listener));
		id
	}

	pub fn remove(&mut self, id: ListenerId) -> bool {
		let before = self.entries.len();
		self.entries.retain(|(entry, _)| *entry != id);
		self.entries.len() != before
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Notifies every listener in order. Errors are logged; whether later
	/// listeners still run depends on `policy`.
	pub fn fire(&self, event: &LifecycleEvent, policy: ListenerFailurePolicy) {
		for (id, listener) in &self.entries {
			let Err(error) = listener(event) else {
				continue;
			};
			warn!(
				listener = ?id,
				kind = ?event.kind(),
				source = event.source().label(),
				error = %error,
				"Lifecycle listener failed"
			);
			if policy == ListenerFailurePolicy::StopPropagation {
				break;
			}
		}
	}
}
