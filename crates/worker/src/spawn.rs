use std::future::Future;
use std::sync::OnceLock;

use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};

/// Execution class of a spawned task, recorded in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Work the user is waiting on, such as resolving ranges under the cursor.
	Interactive,
	/// Work nobody is waiting on.
	Background,
}

impl TaskClass {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
		}
	}
}

/// Why an isolated task produced no output.
#[derive(Debug, Error)]
pub enum TaskFailure {
	#[error("task panicked: {0}")]
	Panicked(String),
	#[error("task was aborted")]
	Aborted,
}

impl From<JoinError> for TaskFailure {
	fn from(err: JoinError) -> Self {
		if !err.is_panic() {
			return Self::Aborted;
		}
		let payload = err.into_panic();
		let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
			(*msg).to_string()
		} else if let Some(msg) = payload.downcast_ref::<String>() {
			msg.clone()
		} else {
			"non-string panic payload".to_string()
		};
		Self::Panicked(message)
	}
}

fn runtime_handle() -> tokio::runtime::Handle {
	if let Ok(handle) = tokio::runtime::Handle::try_current() {
		return handle;
	}

	// Hosts without a runtime of their own still get their tasks driven.
	static FALLBACK: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
	FALLBACK
		.get_or_init(|| {
			tokio::runtime::Builder::new_multi_thread()
				.enable_all()
				.worker_threads(1)
				.thread_name("lockstep-worker")
				.build()
				.expect("failed to build the lockstep-worker fallback runtime")
		})
		.handle()
		.clone()
}

/// Spawns `fut` on the current runtime, or on a shared fallback runtime when
/// called from outside one.
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(worker_class = class.as_str(), "worker.spawn");
	runtime_handle().spawn(fut)
}

/// Runs `fut` on its own task and waits for it.
///
/// A panic inside `fut` is contained to that task and comes back as
/// [`TaskFailure::Panicked`].
pub async fn run_isolated<F>(class: TaskClass, fut: F) -> Result<F::Output, TaskFailure>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	spawn(class, fut).await.map_err(TaskFailure::from)
}
