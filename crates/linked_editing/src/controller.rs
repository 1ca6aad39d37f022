//! Linked editing session state machine.
//!
//! # States
//!
//! * [`SyncState::Idle`]: no linked ranges, nothing in flight.
//! * [`SyncState::Resolving`]: a resolution is in flight. Decorations from the
//!   previous session stay rendered until it lands. Edits pass through
//!   unmirrored.
//! * [`SyncState::Synced`]: linked ranges are known and decorated.
//!
//! The state is derived from two slots and never stored on its own: the
//! single pending resolution, and the current ranges.
//!
//! # Single-Slot Resolution
//!
//! Each resolution claims a [`PendingSlot`] under a fresh generation. Starting
//! a new resolution cancels the previous one and overwrites the slot. Completions
//! are delivered over a channel and dropped unless their generation matches
//! the slot, so a late answer from a superseded resolution can never
//! overwrite a newer one.
//!
//! # Mirroring
//!
//! Ranges are kept as char offsets into the controller's current snapshot.
//! A user insertion inside the primary range (index 0) is replayed into every
//! mirror through [`EditorHost::apply_edits`]; any other change ends the
//! session. See [`crate::classify`].

use std::ops::Range as StdRange;
use std::sync::Arc;

use lockstep_primitives::{
	CharIdx, ContentChange, DocumentId, DocumentSnapshot, EditOrigin, LinkedRange, PositionError, TextEdit, TextPosition,
};
use lockstep_worker::{PendingSlot, TaskClass};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::classify::{EditClass, MirrorPlan, classify};
use crate::config::LinkedEditingConfig;
use crate::decorations::DecorationSet;
use crate::error::ResolveError;
use crate::events::{EditorEvent, EventSender, Notification, Subscriptions, subscribe};
use crate::host::{EditorHost, TracingErrorSink, UnexpectedErrorSink};
use crate::registry::ProviderRegistry;
use crate::resolver::RangeResolver;

/// Observable state of a [`LinkedEditingController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
	Idle,
	Resolving,
	Synced,
}

impl SyncState {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Resolving => "resolving",
			Self::Synced => "synced",
		}
	}
}

/// What the slot remembers about the resolution that owns it.
#[derive(Debug)]
struct PendingResolution {
	document: DocumentId,
	version: u64,
}

#[derive(Debug)]
enum ResolutionOutcome {
	Ranges(Vec<LinkedRange>),
	Empty,
	Cancelled,
}

/// Message sent back by a resolution task.
#[derive(Debug)]
struct ResolutionComplete {
	generation: u64,
	outcome: ResolutionOutcome,
}

/// Keeps linked ranges in lockstep for one editor.
///
/// Owns the host and every piece of session state. Drive it either by calling
/// the `on_*` handlers directly and awaiting [`settle`](Self::settle), or by
/// handing it to [`run`](Self::run) and sending events through the
/// [`EventSender`] returned at construction.
pub struct LinkedEditingController<H: EditorHost> {
	host: H,
	resolver: RangeResolver,
	config: LinkedEditingConfig,
	document: Option<DocumentSnapshot>,
	cursor: Option<TextPosition>,
	ranges: Option<Vec<StdRange<CharIdx>>>,
	pending: PendingSlot<PendingResolution>,
	decorations: DecorationSet,
	completions_tx: mpsc::UnboundedSender<ResolutionComplete>,
	completions_rx: mpsc::UnboundedReceiver<ResolutionComplete>,
	subscriptions: Subscriptions,
}

impl<H: EditorHost> LinkedEditingController<H> {
	/// Creates an idle controller that logs unexpected errors.
	pub fn new(host: H, registry: Arc<ProviderRegistry>, config: LinkedEditingConfig) -> (Self, EventSender) {
		Self::with_error_sink(host, registry, config, Arc::new(TracingErrorSink))
	}

	/// Creates an idle controller reporting unexpected errors to `sink`.
	pub fn with_error_sink(
		host: H,
		registry: Arc<ProviderRegistry>,
		config: LinkedEditingConfig,
		sink: Arc<dyn UnexpectedErrorSink>,
	) -> (Self, EventSender) {
		let (events, subscriptions) = subscribe(&registry);
		let (completions_tx, completions_rx) = mpsc::unbounded_channel();
		let controller = Self {
			host,
			resolver: RangeResolver::new(registry, sink),
			config,
			document: None,
			cursor: None,
			ranges: None,
			pending: PendingSlot::new(),
			decorations: DecorationSet::default(),
			completions_tx,
			completions_rx,
			subscriptions,
		};
		(controller, events)
	}

	pub fn state(&self) -> SyncState {
		if self.pending.is_pending() {
			SyncState::Resolving
		} else if self.ranges.is_some() {
			SyncState::Synced
		} else {
			SyncState::Idle
		}
	}

	/// Current linked ranges, primary first.
	pub fn ranges(&self) -> Option<Vec<LinkedRange>> {
		let document = self.document.as_ref()?;
		self.ranges
			.as_ref()?
			.iter()
			.map(|range| document.offsets_to_range(range.clone()).ok())
			.collect()
	}

	pub fn decorations(&self) -> &DecorationSet {
		&self.decorations
	}

	pub fn host(&self) -> &H {
		&self.host
	}

	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	pub fn config(&self) -> &LinkedEditingConfig {
		&self.config
	}

	pub fn document(&self) -> Option<&DocumentSnapshot> {
		self.document.as_ref()
	}

	pub fn cursor(&self) -> Option<TextPosition> {
		self.cursor
	}

	/// Processes notifications and resolution completions until every
	/// [`EventSender`] is dropped, then disposes the session.
	pub async fn run(&mut self) {
		loop {
			tokio::select! {
				biased;
				Some(done) = self.completions_rx.recv() => self.on_resolution_complete(done),
				notification = self.subscriptions.next() => match notification {
					Some(notification) => self.handle(notification),
					None => break,
				},
			}
		}
		self.dispose();
	}

	/// Dispatches one notification to its handler.
	pub fn handle(&mut self, notification: Notification) {
		match notification {
			Notification::Editor(event) => self.handle_event(event),
			Notification::ProvidersChanged => self.on_providers_changed(),
		}
	}

	pub fn handle_event(&mut self, event: EditorEvent) {
		match event {
			EditorEvent::CursorMoved(position) => self.on_cursor_moved(position),
			EditorEvent::ContentChanged(change) => self.on_content_changed(change),
			EditorEvent::ConfigChanged(config) => self.on_config_changed(config),
			EditorEvent::ModelChanged { document, cursor } => self.on_model_changed(document, cursor),
		}
	}

	/// Handles already-queued notifications and completions without waiting.
	///
	/// Returns how many were handled.
	pub fn poll(&mut self) -> usize {
		let mut handled = 0;
		loop {
			if let Ok(done) = self.completions_rx.try_recv() {
				self.on_resolution_complete(done);
			} else if let Some(notification) = self.subscriptions.try_next() {
				self.handle(notification);
			} else {
				return handled;
			}
			handled += 1;
		}
	}

	/// Waits until no resolution is in flight.
	pub async fn settle(&mut self) {
		while self.pending.is_pending() {
			match self.completions_rx.recv().await {
				Some(done) => self.on_resolution_complete(done),
				None => return,
			}
		}
	}

	/// Cancels the session: drops the pending resolution and every decoration.
	pub fn dispose(&mut self) {
		self.clear();
	}

	pub fn on_cursor_moved(&mut self, position: Option<TextPosition>) {
		self.cursor = position;
		if !self.config.enabled {
			return;
		}
		self.resolve();
	}

	pub fn on_content_changed(&mut self, change: ContentChange) {
		if self.document.as_ref().is_some_and(|document| document.id() != change.snapshot.id()) {
			trace!("linked_editing.foreign_change");
			return;
		}

		let ContentChange { changes, snapshot, origin } = change;
		self.document = Some(snapshot);
		if origin == EditOrigin::LinkedEditing {
			return;
		}

		if self.pending.is_pending() {
			// The retained set no longer matches the text; the pending answer replaces it.
			trace!("linked_editing.edit_while_resolving");
			self.ranges = None;
			return;
		}
		let Some(ranges) = self.ranges.as_deref() else {
			return;
		};

		match classify(ranges, &changes) {
			EditClass::Unchanged => {}
			EditClass::Rejected(reason) => {
				debug!(reason = reason.as_str(), "linked_editing.edit_rejected");
				self.clear();
			}
			EditClass::Mirror(plan) => self.mirror(plan),
		}
	}

	pub fn on_config_changed(&mut self, config: LinkedEditingConfig) {
		let was_enabled = self.config.enabled;
		let restyled = self.config.decoration_style != config.decoration_style;
		self.config = config;

		if !self.config.enabled {
			if was_enabled {
				debug!("linked_editing.disabled");
			}
			self.clear();
		} else if !was_enabled {
			self.resolve();
		} else if restyled && self.ranges.is_some() {
			self.render();
		}
	}

	pub fn on_model_changed(&mut self, document: Option<DocumentSnapshot>, cursor: Option<TextPosition>) {
		self.clear();
		self.document = document;
		self.cursor = cursor;
		if self.config.enabled {
			self.resolve();
		}
	}

	pub fn on_providers_changed(&mut self) {
		if self.config.enabled {
			self.resolve();
		}
	}

	fn mirror(&mut self, plan: MirrorPlan) {
		if !plan.targets.is_empty() {
			let edits = match self.mirror_edits(&plan) {
				Ok(edits) => edits,
				Err(err) => {
					self.resolver.sink().report(&ResolveError::Position(err));
					self.clear();
					return;
				}
			};
			let Some(snapshot) = self.host.apply_edits(&edits) else {
				debug!(count = edits.len(), "linked_editing.mirror_refused");
				self.clear();
				return;
			};
			trace!(count = edits.len(), version = snapshot.version(), "linked_editing.mirrored");
			self.document = Some(snapshot);
		}

		self.ranges = Some(plan.ranges);
		self.render();
	}

	fn mirror_edits(&self, plan: &MirrorPlan) -> Result<Vec<TextEdit>, PositionError> {
		let Some(document) = self.document.as_ref() else {
			return Ok(Vec::new());
		};
		plan.targets
			.iter()
			.map(|&target| Ok(TextEdit::insert(document.position_at(target)?, plan.text.as_str())))
			.collect()
	}

	/// Starts a resolution at the cursor, superseding any in flight.
	fn resolve(&mut self) {
		let (Some(document), Some(cursor)) = (self.document.as_ref(), self.cursor) else {
			self.clear();
			return;
		};

		let request = self.resolver.request(document.clone(), cursor);
		if request.provider_count() == 0 {
			trace!(language = document.language(), "linked_editing.no_providers");
			self.clear();
			return;
		}

		let version = document.version();
		let token = self.pending.begin(PendingResolution {
			document: document.id(),
			version,
		});
		let generation = token.generation();
		debug!(generation, version, line = cursor.line, character = cursor.character, "linked_editing.resolve");

		let cancel = token.token().clone();
		let tx = self.completions_tx.clone();
		lockstep_worker::spawn(TaskClass::Interactive, async move {
			let outcome = match request.run(&cancel).await {
				Some(ranges) => ResolutionOutcome::Ranges(ranges),
				None if cancel.is_cancelled() => ResolutionOutcome::Cancelled,
				None => ResolutionOutcome::Empty,
			};
			let _ = tx.send(ResolutionComplete { generation, outcome });
		});
	}

	fn on_resolution_complete(&mut self, done: ResolutionComplete) {
		let Some(pending) = self.pending.settle(done.generation) else {
			trace!(generation = done.generation, "linked_editing.stale_resolution");
			return;
		};

		let current = self.document.as_ref().map(|document| (document.id(), document.version()));
		if current != Some((pending.document, pending.version)) {
			debug!(generation = done.generation, version = pending.version, "linked_editing.outdated_resolution");
			self.clear();
			return;
		}

		match done.outcome {
			ResolutionOutcome::Ranges(ranges) => self.adopt(ranges),
			ResolutionOutcome::Empty | ResolutionOutcome::Cancelled => {
				trace!(generation = done.generation, "linked_editing.no_ranges");
				self.clear();
			}
		}
	}

	fn adopt(&mut self, ranges: Vec<LinkedRange>) {
		let Some(document) = self.document.as_ref() else {
			self.clear();
			return;
		};
		let offsets: Result<Vec<StdRange<CharIdx>>, PositionError> =
			ranges.iter().map(|range| document.range_to_offsets(range)).collect();
		match offsets {
			Ok(offsets) => {
				debug!(count = offsets.len(), "linked_editing.synced");
				self.ranges = Some(offsets);
				self.render();
			}
			Err(err) => {
				self.resolver.sink().report(&ResolveError::Position(err));
				self.clear();
			}
		}
	}

	fn render(&mut self) {
		let Some(ranges) = self.ranges() else {
			self.clear();
			return;
		};
		self.decorations.replace(&mut self.host, &ranges, &self.config.decoration_style);
	}

	/// Back to idle: no ranges, no decorations, nothing in flight.
	fn clear(&mut self) {
		self.pending.cancel();
		if self.ranges.take().is_some() || !self.decorations.is_empty() {
			debug!("linked_editing.cleared");
		}
		self.decorations.clear(&mut self.host);
	}
}

impl<H: EditorHost> Drop for LinkedEditingController<H> {
	fn drop(&mut self) {
		self.clear();
	}
}
