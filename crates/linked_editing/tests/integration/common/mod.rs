//! Common utilities for linked editing integration tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lockstep_linked_editing::{
	Decoration, DecorationId, EditorHost, EventSender, LinkedEditingConfig, LinkedEditingController, LinkedRangeProvider,
	ProviderError, ProviderRegistration, ProviderRegistry,
};
use lockstep_primitives::{
	CharIdx, ContentChange, DocumentId, DocumentSnapshot, EditOrigin, LinkedRange, TextEdit, TextPosition,
};
use lockstep_worker::CancellationToken;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug)]
struct HostState {
	document: DocumentSnapshot,
	applied: usize,
	renders: usize,
	live: Vec<(DecorationId, LinkedRange)>,
	next_id: u64,
}

/// Editor double shared between the test body and the controller task.
#[derive(Debug, Clone)]
pub struct SharedHost {
	state: Arc<Mutex<HostState>>,
}

impl SharedHost {
	pub fn new(text: &str) -> Self {
		Self {
			state: Arc::new(Mutex::new(HostState {
				document: DocumentSnapshot::from_text(DocumentId(1), "html", text),
				applied: 0,
				renders: 0,
				live: Vec::new(),
				next_id: 0,
			})),
		}
	}

	pub fn document(&self) -> DocumentSnapshot {
		self.state.lock().document.clone()
	}

	pub fn text(&self) -> String {
		self.state.lock().document.text().to_string()
	}

	/// Number of mirror batches the controller applied.
	pub fn applied(&self) -> usize {
		self.state.lock().applied
	}

	/// Number of decoration updates that rendered at least one range.
	pub fn renders(&self) -> usize {
		self.state.lock().renders
	}

	/// Ranges currently decorated, in document order.
	pub fn decorated(&self) -> Vec<LinkedRange> {
		let mut ranges: Vec<LinkedRange> = self.state.lock().live.iter().map(|(_, range)| *range).collect();
		ranges.sort_by_key(|range| range.start);
		ranges
	}

	/// Replaces `range` with `text` as the user would, then reports the change
	/// and the new cursor position.
	pub fn user_edit(&self, events: &EventSender, range: std::ops::Range<CharIdx>, text: &str) {
		let (change, cursor) = {
			let mut state = self.state.lock();
			let end = range.start + text.chars().count();
			let change = ContentChange::from_edits(&state.document, &[(range, text)], EditOrigin::User).expect("edit fits the document");
			state.document = change.snapshot.clone();
			let cursor = state.document.position_at(end).expect("cursor fits the document");
			(change, cursor)
		};
		events.content_changed(change);
		events.cursor_moved(Some(cursor));
	}

	pub fn type_at(&self, events: &EventSender, at: TextPosition, text: &str) {
		let offset = self.document().offset_at(at).expect("position fits the document");
		self.user_edit(events, offset..offset, text);
	}
}

impl EditorHost for SharedHost {
	fn apply_edits(&mut self, edits: &[TextEdit]) -> Option<DocumentSnapshot> {
		let mut state = self.state.lock();
		let mut batch = Vec::with_capacity(edits.len());
		for edit in edits {
			batch.push((state.document.range_to_offsets(&edit.range).ok()?, edit.new_text.as_str()));
		}
		state.document = state.document.apply(&batch).ok()?;
		state.applied += 1;
		Some(state.document.clone())
	}

	fn delta_decorations(&mut self, old: &[DecorationId], new: &[Decoration]) -> Vec<DecorationId> {
		let mut state = self.state.lock();
		state.live.retain(|(id, _)| !old.contains(id));
		if !new.is_empty() {
			state.renders += 1;
		}
		let mut ids = Vec::with_capacity(new.len());
		for decoration in new {
			state.next_id += 1;
			let id = DecorationId(state.next_id);
			state.live.push((id, decoration.range));
			ids.push(id);
		}
		ids
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
	Open,
	Close,
	SelfClosing,
}

#[derive(Debug, Clone)]
struct Tag {
	kind: TagKind,
	name: std::ops::Range<CharIdx>,
}

/// Matches HTML opening and closing tag names.
#[derive(Debug, Default)]
pub struct TagPairProvider;

fn is_name_char(ch: char) -> bool {
	ch.is_ascii_alphanumeric() || matches!(ch, '-' | ':' | '_' | '.')
}

fn scan_tags(chars: &[char]) -> Vec<Tag> {
	let mut tags = Vec::new();
	let mut i = 0;
	while i < chars.len() {
		if chars[i] != '<' {
			i += 1;
			continue;
		}
		let (kind, start) = match chars.get(i + 1) {
			Some('/') => (TagKind::Close, i + 2),
			Some(&ch) if is_name_char(ch) || ch == '>' => (TagKind::Open, i + 1),
			_ => {
				i += 1;
				continue;
			}
		};
		let mut end = start;
		while end < chars.len() && is_name_char(chars[end]) {
			end += 1;
		}
		let close = chars[end..].iter().position(|&ch| ch == '>').map(|at| end + at);
		let kind = match close {
			Some(gt) if kind == TagKind::Open && gt > 0 && chars[gt - 1] == '/' => TagKind::SelfClosing,
			_ => kind,
		};
		tags.push(Tag { kind, name: start..end });
		i = close.map_or(end, |gt| gt + 1);
	}
	tags
}

fn matching_pairs(chars: &[char], tags: &[Tag]) -> Vec<(usize, usize)> {
	let name = |tag: &Tag| -> String { chars[tag.name.clone()].iter().collect() };
	let mut stack: Vec<usize> = Vec::new();
	let mut pairs = Vec::new();
	for (index, tag) in tags.iter().enumerate() {
		match tag.kind {
			TagKind::Open => stack.push(index),
			TagKind::SelfClosing => {}
			TagKind::Close => {
				if let Some(depth) = stack.iter().rposition(|&open| name(&tags[open]) == name(tag)) {
					pairs.push((stack[depth], index));
					stack.truncate(depth);
				}
			}
		}
	}
	pairs
}

#[async_trait]
impl LinkedRangeProvider for TagPairProvider {
	fn name(&self) -> &str {
		"html-tag-pairs"
	}

	fn score(&self, document: &DocumentSnapshot) -> u32 {
		if document.language() == "html" { 10 } else { 0 }
	}

	async fn provide_linked_ranges(
		&self,
		document: &DocumentSnapshot,
		position: TextPosition,
		_cancel: &CancellationToken,
	) -> Result<Option<Vec<LinkedRange>>, ProviderError> {
		let offset = document.offset_at(position).map_err(|err| ProviderError::Other(Box::new(err)))?;
		let chars: Vec<char> = document.text().chars().collect();
		let tags = scan_tags(&chars);
		let touches = |name: &std::ops::Range<CharIdx>| name.start <= offset && offset <= name.end;

		for (open, close) in matching_pairs(&chars, &tags) {
			let (primary, mirror) = if touches(&tags[open].name) {
				(&tags[open].name, &tags[close].name)
			} else if touches(&tags[close].name) {
				(&tags[close].name, &tags[open].name)
			} else {
				continue;
			};
			let to_range = |range: &std::ops::Range<CharIdx>| {
				document
					.offsets_to_range(range.clone())
					.map_err(|err| ProviderError::Other(Box::new(err)))
			};
			return Ok(Some(vec![to_range(primary)?, to_range(mirror)?]));
		}
		Ok(None)
	}
}

pub struct Session {
	pub host: SharedHost,
	pub events: EventSender,
	pub registry: Arc<ProviderRegistry>,
	pub tags: ProviderRegistration,
	pub task: JoinHandle<LinkedEditingController<SharedHost>>,
}

/// Starts a controller task over `text` with the tag pair provider registered.
pub fn start(text: &str, config: LinkedEditingConfig) -> Session {
	let _ = tracing_subscriber::fmt::try_init();
	let host = SharedHost::new(text);
	let registry = Arc::new(ProviderRegistry::new());
	let tags = registry.register(Arc::new(TagPairProvider));
	let (mut controller, events) = LinkedEditingController::new(host.clone(), registry.clone(), config);
	let task = tokio::spawn(async move {
		controller.run().await;
		controller
	});
	Session {
		host,
		events,
		registry,
		tags,
		task,
	}
}

/// Polls `condition` until it holds, panicking after about a second.
pub async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
	for _ in 0..200 {
		if condition() {
			return;
		}
		tokio::time::sleep(Duration::from_millis(5)).await;
	}
	panic!("timed out waiting for {what}");
}

pub fn range(l0: u32, c0: u32, l1: u32, c1: u32) -> LinkedRange {
	LinkedRange::new(TextPosition::new(l0, c0), TextPosition::new(l1, c1))
}
