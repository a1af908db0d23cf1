use std::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
	rc::{Rc, Weak},
};

/// Why a producer's parked [`await_request`](`Producer::await_request`)
/// callback fired.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Wakeup {
	/// A consumer registered a request: compute and
	/// [`deliver`](`Producer::deliver`).
	Requested,
	/// Every consumer handle has been dropped: drop local context and
	/// return. Abandonment is a normal termination signal, not an error.
	Abandoned,
}

impl Wakeup {
	/// Whether this wakeup signals consumer abandonment.
	#[must_use]
	pub fn is_abandoned(self) -> bool {
		matches!(self, Self::Abandoned)
	}
}

type RequestCallback = Box<dyn FnOnce(Wakeup)>;
type DataCallback<T> = Box<dyn FnOnce(T)>;

struct RawSlot<T: 'static> {
	awaits_request: RefCell<Option<RequestCallback>>,
	awaits_data: RefCell<Option<DataCallback<T>>>,
}

impl<T: 'static> Drop for RawSlot<T> {
	fn drop(&mut self) {
		if let Some(awaiting) = self.awaits_request.get_mut().take() {
			awaiting(Wakeup::Abandoned);
		}
	}
}

/// Consumer handle of a single-request rendezvous between one consumer and
/// one producer.
///
/// The consumer's strong reference count drives the slot's liveness: when
/// the last [`Slot`] clone drops, a parked producer callback fires once with
/// [`Wakeup::Abandoned`], and producer handles left behind observe the death
/// from then on. Arrival order of the two sides is arbitrary; see
/// [`request`](`Slot::request`) and the [`Producer`] operations for how each
/// ordering resolves.
pub struct Slot<T: 'static>(Rc<RawSlot<T>>);

/// Producer handle: a weak observer of a [`Slot`].
pub struct Producer<T: 'static>(Weak<RawSlot<T>>);

impl<T: 'static> Clone for Slot<T> {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}

impl<T: 'static> Clone for Producer<T> {
	fn clone(&self) -> Self {
		Self(Weak::clone(&self.0))
	}
}

impl<T: 'static> Debug for Slot<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Slot")
			.field("awaits_request", &self.0.awaits_request.borrow().is_some())
			.field("awaits_data", &self.0.awaits_data.borrow().is_some())
			.finish()
	}
}

impl<T: 'static> Debug for Producer<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Producer")
			.field("live", &(self.0.strong_count() > 0))
			.finish()
	}
}

impl<T: 'static> Default for Slot<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: 'static> Slot<T> {
	/// Creates a slot with neither side waiting.
	#[must_use]
	pub fn new() -> Self {
		Self(Rc::new(RawSlot {
			awaits_request: RefCell::new(None),
			awaits_data: RefCell::new(None),
		}))
	}

	/// Obtains a producer handle.
	#[must_use]
	pub fn producer(&self) -> Producer<T> {
		Producer(Rc::downgrade(&self.0))
	}

	/// Registers `on_data` to receive the next delivered value. If a
	/// producer callback is parked awaiting a request, it is woken with
	/// [`Wakeup::Requested`] before this returns, with `on_data` already
	/// registered, so the producer may deliver synchronously.
	///
	/// # Panics
	///
	/// If a data-waiting callback is already registered.
	pub fn request(&self, on_data: impl 'static + FnOnce(T)) {
		{
			let mut awaits_data = self.0.awaits_data.borrow_mut();
			assert!(
				awaits_data.is_none(),
				"at most one data-waiting callback may be registered on a slot"
			);
			*awaits_data = Some(Box::new(on_data));
		}
		let awaiting = self.0.awaits_request.borrow_mut().take();
		if let Some(awaiting) = awaiting {
			awaiting(Wakeup::Requested);
		}
	}
}

impl<T: 'static> Producer<T> {
	/// Registers `on_request` to be woken by the next consumer request.
	///
	/// Fires immediately instead of parking when there is something to
	/// report already: [`Wakeup::Abandoned`] if the slot is dead,
	/// [`Wakeup::Requested`] if a request is already pending.
	///
	/// # Panics
	///
	/// If a request-waiting callback is already registered.
	pub fn await_request(&self, on_request: impl 'static + FnOnce(Wakeup)) {
		let Some(slot) = self.0.upgrade() else {
			on_request(Wakeup::Abandoned);
			return;
		};
		let request_pending = slot.awaits_data.borrow().is_some();
		if request_pending {
			on_request(Wakeup::Requested);
			return;
		}
		let mut awaits_request = slot.awaits_request.borrow_mut();
		assert!(
			awaits_request.is_none(),
			"at most one request-waiting callback may be registered on a slot"
		);
		*awaits_request = Some(Box::new(on_request));
	}

	/// Delivers `value` to the waiting consumer callback.
	///
	/// The callback is taken out of the slot *before* it is invoked, so it
	/// may immediately register the next request.
	///
	/// # Panics
	///
	/// If the slot has been abandoned, or no request is pending.
	pub fn deliver(&self, value: T) {
		let slot = self.0.upgrade().expect("deliver on an abandoned slot");
		let on_data = slot
			.awaits_data
			.borrow_mut()
			.take()
			.expect("deliver without a pending request");
		on_data(value);
	}
}
