//! Task plumbing for linked editing: spawning, panic isolation and
//! generation-tagged single-slot cancellation.

mod slot;
mod spawn;
mod token;

pub use slot::PendingSlot;
pub use spawn::{TaskClass, TaskFailure, run_isolated, spawn};
pub use token::{GenerationClock, GenerationToken};
pub use tokio_util::sync::CancellationToken;
