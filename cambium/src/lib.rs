#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]

//! cambium is the deferred-execution layer backing `phloem`.
//!
//! The primitives never schedule anything themselves. Wherever user code
//! wants latency between a callback and its continuation, it hands the
//! continuation to a [`Defer`] implementor. [`DeferQueue`] is the trivial
//! single-threaded implementor: a FIFO of boxed thunks, drained on demand.

use std::{
	cell::{Cell, RefCell},
	collections::VecDeque,
	fmt::{self, Debug, Formatter},
	rc::Rc,
};

use scopeguard::defer;

/// The contract between callback-driven code and an ambient executor.
///
/// Implementors must run tasks on a single thread and must not run two
/// deferred tasks in overlapping call frames. FIFO order is *not* part of
/// the contract; [`DeferQueue`] provides it anyway.
pub trait Defer {
	/// Schedules `task` to run later.
	fn defer(&self, task: impl 'static + FnOnce());
}

type Task = Box<dyn FnOnce()>;

/// A trivial single-threaded deferred-task queue.
///
/// Cloning yields another handle to the same queue. Handles are deliberately
/// `!Send`, so the single-threaded drain discipline holds by type.
#[derive(Clone, Default)]
pub struct DeferQueue(Rc<QueueState>);

#[derive(Default)]
struct QueueState {
	tasks: RefCell<VecDeque<Task>>,
	draining: Cell<bool>,
}

impl Debug for DeferQueue {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("DeferQueue")
			.field("len", &self.len())
			.field("draining", &self.0.draining.get())
			.finish()
	}
}

impl DeferQueue {
	/// Creates an empty queue.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Schedules `task` to run during a (current or future) [`drain`](`DeferQueue::drain`).
	pub fn defer(&self, task: impl 'static + FnOnce()) {
		self.0.tasks.borrow_mut().push_back(Box::new(task));
	}

	/// Number of tasks currently scheduled.
	#[must_use]
	pub fn len(&self) -> usize {
		self.0.tasks.borrow().len()
	}

	/// Whether no tasks are currently scheduled.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.tasks.borrow().is_empty()
	}

	/// Runs scheduled tasks in order until the queue is empty, including
	/// tasks scheduled while draining. Returns the number of tasks run.
	///
	/// A nested `drain` from inside a task is a no-op returning `0`: the
	/// outer drain is already committed to running everything, and running
	/// tasks in overlapping frames would break the executor contract.
	pub fn drain(&self) -> usize {
		if self.0.draining.get() {
			return 0;
		}
		self.0.draining.set(true);
		defer! {
			self.0.draining.set(false);
		}

		let mut count = 0;
		loop {
			let task = self.0.tasks.borrow_mut().pop_front();
			let Some(task) = task else { break };
			task();
			count += 1;
		}
		count
	}
}

impl Defer for DeferQueue {
	fn defer(&self, task: impl 'static + FnOnce()) {
		DeferQueue::defer(self, task);
	}
}
