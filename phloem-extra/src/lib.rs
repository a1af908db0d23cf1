#![warn(clippy::pedantic)]
#![warn(unreachable_pub)]

//! Stream-shaped combinators over the `phloem` primitives: slot-backed
//! providers, gathering consumers and a pairwise join.
//!
//! A "stream" here is a [`Slot<Option<T>>`]: `Some` items until the source
//! runs dry, then `None`, and by convention `None` again for every further
//! request until the consumer abandons the slot.

use std::{
	cell::{Cell, RefCell},
	ops::AddAssign,
	rc::Rc,
};

use cambium::Defer;
use num_traits::Zero;
use phloem::{shadow_clone, shadow_ref_to_owned, Cycle, Harvest, Producer, Slot};

/// One-shot token answering a provider's pending request.
///
/// Obtained through [`produced`]; [`send`](`Reply::send`) may be called
/// synchronously from the producing closure, or the token may be stashed in
/// a deferred task for later.
pub struct Reply<T: 'static> {
	producer: Producer<Option<T>>,
	in_flight: Rc<Cell<bool>>,
	cycle: Cycle,
}

impl<T: 'static> Reply<T> {
	/// Delivers `item` downstream, then re-enters the provider loop to
	/// await the next request.
	pub fn send(self, item: Option<T>) {
		self.producer.deliver(item);
		self.in_flight.set(false);
		self.cycle.repeat();
	}
}

/// Builds a provider as a slot driven by a loop.
///
/// Per request, `produce` receives a [`Reply`] it must eventually answer.
/// The parked wakeup callback only flags the request and re-enters the
/// loop, so `produce` always runs from the drive and is never re-entered,
/// no matter how the consumer interleaves its requests. On abandonment the
/// wakeup callback returns without repeating, which releases the loop state
/// and everything `produce` captured.
pub fn produced<T: 'static>(produce: impl 'static + FnMut(Reply<T>)) -> Slot<Option<T>> {
	let slot = Slot::new();
	let producer = slot.producer();
	let produce = Rc::new(RefCell::new(produce));
	let requested = Rc::new(Cell::new(false));
	let in_flight = Rc::new(Cell::new(false));
	Cycle::new(move |cycle| {
		if requested.replace(false) {
			in_flight.set(true);
			let reply = Reply {
				producer: producer.clone(),
				in_flight: Rc::clone(&in_flight),
				cycle: cycle.clone(),
			};
			(&mut *produce.borrow_mut())(reply);
		} else if !in_flight.get() {
			shadow_ref_to_owned!(cycle);
			shadow_clone!(requested);
			producer.await_request(move |wakeup| {
				if wakeup.is_abandoned() {
					return;
				}
				requested.set(true);
				cycle.repeat();
			});
		}
	});
	slot
}

/// A fused synchronous provider: `pull` is called once per request until it
/// returns `None`; afterwards the provider answers `None` without calling
/// it again.
pub fn from_fn<T: 'static>(mut pull: impl 'static + FnMut() -> Option<T>) -> Slot<Option<T>> {
	let mut ended = false;
	produced(move |reply| {
		let item = if ended { None } else { pull() };
		ended = item.is_none();
		reply.send(item);
	})
}

/// A provider over anything iterable.
pub fn from_iter<I>(into_iter: I) -> Slot<Option<I::Item>>
where
	I: IntoIterator,
	I::IntoIter: 'static,
	I::Item: 'static,
{
	let mut iter = into_iter.into_iter();
	from_fn(move || iter.next())
}

/// A fused provider whose replies arrive through `executor` rather than
/// synchronously.
pub fn deferred_from_fn<T, D>(
	executor: D,
	mut pull: impl 'static + FnMut() -> Option<T>,
) -> Slot<Option<T>>
where
	T: 'static,
	D: 'static + Defer,
{
	let mut ended = false;
	produced(move |reply| {
		let item = if ended { None } else { pull() };
		ended = item.is_none();
		executor.defer(move || reply.send(item));
	})
}

/// Drains a provider into a `Vec`, delivering it when the stream ends.
///
/// The aggregate lives in a [`Harvest`] captured by the loop body: once the
/// body sees end-of-stream and returns without repeating, the loop state
/// (and with it the last strong reference to the cell) is released, which
/// fires `deliver`.
pub fn gathered<T: 'static>(slot: Slot<Option<T>>, deliver: impl 'static + FnOnce(Vec<T>)) {
	let gather = Harvest::new(deliver);
	Cycle::new(move |cycle| {
		shadow_ref_to_owned!(cycle);
		shadow_clone!(gather);
		slot.request(move |item| {
			if let Some(item) = item {
				gather.update(|items| items.push(item));
				cycle.repeat();
			}
		});
	});
}

/// Folds a provider's items into a running total, delivering it when the
/// stream ends.
pub fn tallied<V, T>(slot: Slot<Option<V>>, deliver: impl 'static + FnOnce(T))
where
	V: 'static,
	T: 'static + Zero + AddAssign<V>,
{
	let tally = Harvest::with_value(T::zero(), deliver);
	Cycle::new(move |cycle| {
		shadow_ref_to_owned!(cycle);
		shadow_clone!(tally);
		slot.request(move |item| {
			if let Some(item) = item {
				tally.update(|total| *total += item);
				cycle.repeat();
			}
		});
	});
}

/// Joins two providers pairwise: each request fans one request out to each
/// upstream simultaneously and gathers the two arrivals through a result
/// cell. The joined stream ends as soon as either upstream ends.
pub fn paired<A: 'static, B: 'static>(
	left: Slot<Option<A>>,
	right: Slot<Option<B>>,
) -> Slot<Option<(A, B)>> {
	let slot = Slot::new();
	let producer = slot.producer();
	let ended = Rc::new(Cell::new(false));
	Cycle::new(move |cycle| {
		shadow_ref_to_owned!(cycle);
		shadow_clone!(left, right, ended);
		let responder = producer.clone();
		producer.await_request(move |wakeup| {
			if wakeup.is_abandoned() {
				return;
			}
			if ended.get() {
				responder.deliver(None);
				cycle.repeat();
				return;
			}
			let gather = Harvest::with_value((None, None), move |(a, b)| match (a, b) {
				(Some(a), Some(b)) => {
					responder.deliver(Some((a, b)));
					cycle.repeat();
				}
				_ => {
					ended.set(true);
					responder.deliver(None);
					cycle.repeat();
				}
			});
			left.request(gather.setter(|pair, item| pair.0 = item));
			right.request(gather.setter(|pair, item| pair.1 = item));
		});
	});
	slot
}
