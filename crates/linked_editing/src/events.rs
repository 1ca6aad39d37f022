//! Editor notifications consumed by the controller.

use lockstep_primitives::{ContentChange, DocumentSnapshot, TextPosition};
use tokio::sync::{mpsc, watch};

use crate::config::LinkedEditingConfig;
use crate::registry::ProviderRegistry;

/// An event reported by the host editor.
#[derive(Debug, Clone)]
pub enum EditorEvent {
	/// The primary cursor moved. `None` when the editor has no cursor.
	CursorMoved(Option<TextPosition>),
	/// The document content changed.
	ContentChanged(ContentChange),
	/// The linked editing configuration changed.
	ConfigChanged(LinkedEditingConfig),
	/// The editor switched to another document, or detached from one.
	ModelChanged {
		document: Option<DocumentSnapshot>,
		cursor: Option<TextPosition>,
	},
}

/// Anything that can wake the controller.
#[derive(Debug, Clone)]
pub enum Notification {
	Editor(EditorEvent),
	/// A provider was registered or unregistered.
	ProvidersChanged,
}

/// Cloneable handle the host uses to deliver [`EditorEvent`]s.
///
/// Every send returns `false` once the controller is gone.
#[derive(Debug, Clone)]
pub struct EventSender {
	tx: mpsc::UnboundedSender<EditorEvent>,
}

impl EventSender {
	pub fn send(&self, event: EditorEvent) -> bool {
		self.tx.send(event).is_ok()
	}

	pub fn cursor_moved(&self, position: Option<TextPosition>) -> bool {
		self.send(EditorEvent::CursorMoved(position))
	}

	pub fn content_changed(&self, change: ContentChange) -> bool {
		self.send(EditorEvent::ContentChanged(change))
	}

	pub fn config_changed(&self, config: LinkedEditingConfig) -> bool {
		self.send(EditorEvent::ConfigChanged(config))
	}

	pub fn model_changed(&self, document: Option<DocumentSnapshot>, cursor: Option<TextPosition>) -> bool {
		self.send(EditorEvent::ModelChanged { document, cursor })
	}

	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}
}

/// Merged stream of editor events and provider registry changes.
#[derive(Debug)]
pub struct Subscriptions {
	events: mpsc::UnboundedReceiver<EditorEvent>,
	providers: watch::Receiver<u64>,
	providers_live: bool,
}

impl Subscriptions {
	/// Waits for the next notification.
	///
	/// Returns `None` once every [`EventSender`] is dropped. Registry
	/// changes are coalesced: several registrations between two polls
	/// produce a single [`Notification::ProvidersChanged`].
	pub async fn next(&mut self) -> Option<Notification> {
		loop {
			tokio::select! {
				biased;
				event = self.events.recv() => return event.map(Notification::Editor),
				changed = self.providers.changed(), if self.providers_live => match changed {
					Ok(()) => {
						self.providers.mark_unchanged();
						return Some(Notification::ProvidersChanged);
					}
					Err(_) => self.providers_live = false,
				},
			}
		}
	}

	/// Returns a pending notification without waiting.
	pub fn try_next(&mut self) -> Option<Notification> {
		if let Ok(event) = self.events.try_recv() {
			return Some(Notification::Editor(event));
		}
		if self.providers_live && self.providers.has_changed().unwrap_or(false) {
			self.providers.mark_unchanged();
			return Some(Notification::ProvidersChanged);
		}
		None
	}
}

/// Creates an event channel paired with a subscription to `registry`.
pub fn subscribe(registry: &ProviderRegistry) -> (EventSender, Subscriptions) {
	let (tx, events) = mpsc::unbounded_channel();
	let subscriptions = Subscriptions {
		events,
		providers: registry.subscribe(),
		providers_live: true,
	};
	(EventSender { tx }, subscriptions)
}
