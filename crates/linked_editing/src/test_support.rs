//! Fakes shared by the unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lockstep_primitives::{
	CharIdx, ContentChange, DocumentId, DocumentSnapshot, EditOrigin, LinkedRange, TextEdit, TextPosition,
};
use lockstep_worker::CancellationToken;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::{ProviderError, ResolveError};
use crate::host::{Decoration, DecorationId, EditorHost, UnexpectedErrorSink};
use crate::provider::LinkedRangeProvider;

pub(crate) fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub(crate) fn pos(line: u32, character: u32) -> TextPosition {
	TextPosition::new(line, character)
}

pub(crate) fn range(l0: u32, c0: u32, l1: u32, c1: u32) -> LinkedRange {
	LinkedRange::new(pos(l0, c0), pos(l1, c1))
}

pub(crate) fn html(text: &str) -> DocumentSnapshot {
	DocumentSnapshot::from_text(DocumentId(1), "html", text)
}

/// Returns a fixed answer and counts how often it was asked.
pub(crate) struct StaticProvider {
	name: String,
	score: u32,
	ranges: Option<Vec<LinkedRange>>,
	calls: Arc<AtomicUsize>,
}

impl StaticProvider {
	pub(crate) fn new(name: &str, score: u32, ranges: Option<Vec<LinkedRange>>) -> Self {
		Self {
			name: name.to_string(),
			score,
			ranges,
			calls: Arc::new(AtomicUsize::new(0)),
		}
	}

	pub(crate) fn calls(&self) -> Arc<AtomicUsize> {
		self.calls.clone()
	}
}

#[async_trait]
impl LinkedRangeProvider for StaticProvider {
	fn name(&self) -> &str {
		&self.name
	}

	fn score(&self, _document: &DocumentSnapshot) -> u32 {
		self.score
	}

	async fn provide_linked_ranges(
		&self,
		_document: &DocumentSnapshot,
		_position: TextPosition,
		_cancel: &CancellationToken,
	) -> Result<Option<Vec<LinkedRange>>, ProviderError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Ok(self.ranges.clone())
	}
}

/// Always fails.
pub(crate) struct FailingProvider {
	pub(crate) score: u32,
	pub(crate) calls: Arc<AtomicUsize>,
}

impl FailingProvider {
	pub(crate) fn new(score: u32) -> Self {
		Self {
			score,
			calls: Arc::new(AtomicUsize::new(0)),
		}
	}
}

#[async_trait]
impl LinkedRangeProvider for FailingProvider {
	fn name(&self) -> &str {
		"failing"
	}

	fn score(&self, _document: &DocumentSnapshot) -> u32 {
		self.score
	}

	async fn provide_linked_ranges(
		&self,
		_document: &DocumentSnapshot,
		_position: TextPosition,
		_cancel: &CancellationToken,
	) -> Result<Option<Vec<LinkedRange>>, ProviderError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		Err(ProviderError::failed("tag index unavailable"))
	}
}

/// Panics on every request.
pub(crate) struct PanickingProvider {
	pub(crate) score: u32,
	pub(crate) calls: Arc<AtomicUsize>,
}

impl PanickingProvider {
	pub(crate) fn new(score: u32) -> Self {
		Self {
			score,
			calls: Arc::new(AtomicUsize::new(0)),
		}
	}
}

#[async_trait]
impl LinkedRangeProvider for PanickingProvider {
	fn name(&self) -> &str {
		"panicking"
	}

	fn score(&self, _document: &DocumentSnapshot) -> u32 {
		self.score
	}

	async fn provide_linked_ranges(
		&self,
		_document: &DocumentSnapshot,
		_position: TextPosition,
		_cancel: &CancellationToken,
	) -> Result<Option<Vec<LinkedRange>>, ProviderError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		panic!("tag scanner hit a malformed node")
	}
}

/// Answers with ranges keyed by the requested line, after the gate opens.
///
/// The gate is a [`Notify`]; each `notify_one` releases one request.
pub(crate) struct GatedProvider {
	pub(crate) gate: Arc<Notify>,
	pub(crate) answers: Vec<(u32, Vec<LinkedRange>)>,
	pub(crate) calls: Arc<AtomicUsize>,
}

impl GatedProvider {
	pub(crate) fn new(answers: Vec<(u32, Vec<LinkedRange>)>) -> Self {
		Self {
			gate: Arc::new(Notify::new()),
			answers,
			calls: Arc::new(AtomicUsize::new(0)),
		}
	}
}

#[async_trait]
impl LinkedRangeProvider for GatedProvider {
	fn name(&self) -> &str {
		"gated"
	}

	fn score(&self, _document: &DocumentSnapshot) -> u32 {
		10
	}

	async fn provide_linked_ranges(
		&self,
		_document: &DocumentSnapshot,
		position: TextPosition,
		_cancel: &CancellationToken,
	) -> Result<Option<Vec<LinkedRange>>, ProviderError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.gate.notified().await;
		Ok(self
			.answers
			.iter()
			.find(|(line, _)| *line == position.line)
			.map(|(_, ranges)| ranges.clone()))
	}
}

/// Collects reported errors as strings.
#[derive(Default)]
pub(crate) struct CollectingSink {
	pub(crate) errors: Mutex<Vec<String>>,
}

impl CollectingSink {
	pub(crate) fn messages(&self) -> Vec<String> {
		self.errors.lock().clone()
	}
}

impl UnexpectedErrorSink for CollectingSink {
	fn report(&self, error: &ResolveError) {
		self.errors.lock().push(error.to_string());
	}
}

/// In-memory editor: owns the document, applies edits and records decoration deltas.
pub(crate) struct RecordingHost {
	pub(crate) document: DocumentSnapshot,
	pub(crate) applied: Vec<Vec<TextEdit>>,
	pub(crate) deltas: Vec<(Vec<DecorationId>, Vec<Decoration>)>,
	pub(crate) live: Vec<DecorationId>,
	pub(crate) refuse_edits: bool,
	next_id: u64,
}

impl RecordingHost {
	pub(crate) fn new(document: DocumentSnapshot) -> Self {
		Self {
			document,
			applied: Vec::new(),
			deltas: Vec::new(),
			live: Vec::new(),
			refuse_edits: false,
			next_id: 0,
		}
	}

	/// Simulates the user typing `text` at `offset`; returns the event to deliver.
	pub(crate) fn type_at(&mut self, offset: CharIdx, text: &str) -> ContentChange {
		self.user_edit(offset..offset, text)
	}

	/// Simulates a user edit replacing `range` with `text`.
	pub(crate) fn user_edit(&mut self, range: std::ops::Range<CharIdx>, text: &str) -> ContentChange {
		let change = ContentChange::from_edits(&self.document, &[(range, text)], EditOrigin::User).unwrap();
		self.document = change.snapshot.clone();
		change
	}

	pub(crate) fn text(&self) -> String {
		self.document.text().to_string()
	}
}

impl EditorHost for RecordingHost {
	fn apply_edits(&mut self, edits: &[TextEdit]) -> Option<DocumentSnapshot> {
		if self.refuse_edits {
			return None;
		}
		let mut batch = Vec::with_capacity(edits.len());
		for edit in edits {
			let range = self.document.range_to_offsets(&edit.range).ok()?;
			batch.push((range, edit.new_text.as_str()));
		}
		let next = self.document.apply(&batch).ok()?;
		self.applied.push(edits.to_vec());
		self.document = next.clone();
		Some(next)
	}

	fn delta_decorations(&mut self, old: &[DecorationId], new: &[Decoration]) -> Vec<DecorationId> {
		self.deltas.push((old.to_vec(), new.to_vec()));
		self.live.retain(|id| !old.contains(id));
		let ids: Vec<DecorationId> = new
			.iter()
			.map(|_| {
				self.next_id += 1;
				DecorationId(self.next_id)
			})
			.collect();
		self.live.extend(ids.iter().copied());
		ids
	}
}
