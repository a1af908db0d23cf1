//! Adapters between the callback primitives and the [`Future`]/[`Stream`]
//! ecosystem.

use std::{
	cell::RefCell,
	future::Future,
	pin::Pin,
	rc::Rc,
	task::{Context, Poll, Waker},
};

use futures_channel::oneshot;
use futures_lite::Stream;
use pin_project::pin_project;

use crate::{shadow_clone, Harvest, Slot};

/// Creates a [`Harvest`] over `value` whose final payload resolves the
/// returned future, once every clone of the handle (and every setter
/// manufactured from it) has been released.
pub fn harvested<T: 'static>(value: T) -> (Harvest<T>, Harvested<T>) {
	let (deliver, delivered) = oneshot::channel();
	let harvest = Harvest::with_value(value, move |value| {
		deliver.send(value).ok();
	});
	(harvest, Harvested(delivered))
}

/// Future of a [`Harvest`]'s final value. See [`harvested`].
#[pin_project]
#[must_use = "futures do nothing unless polled"]
pub struct Harvested<T>(#[pin] oneshot::Receiver<T>);

impl<T> Future for Harvested<T> {
	type Output = T;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		self.project()
			.0
			.poll(cx)
			.map(|value| value.expect("the finalizer delivers before the sender can drop"))
	}
}

/// Pulls a [`Slot`]-backed provider as a [`Stream`].
///
/// Each poll issues at most one request; a delivered `None` ends the stream.
/// Dropping the stream drops the consumer handle, which signals abandonment
/// to the producer.
pub fn streamed<T: 'static>(slot: Slot<Option<T>>) -> impl Stream<Item = T> {
	struct Inflight<T> {
		delivered: Option<Option<T>>,
		awaiting: bool,
		waker: Option<Waker>,
	}

	let state = Rc::new(RefCell::new(Inflight::<T> {
		delivered: None,
		awaiting: false,
		waker: None,
	}));
	futures_lite::stream::poll_fn(move |cx| {
		{
			let mut inflight = state.borrow_mut();
			if let Some(item) = inflight.delivered.take() {
				inflight.awaiting = false;
				return Poll::Ready(item);
			}
			inflight.waker = Some(cx.waker().clone());
			if inflight.awaiting {
				return Poll::Pending;
			}
			inflight.awaiting = true;
		}
		slot.request({
			shadow_clone!(state);
			move |item| {
				let waker = {
					let mut inflight = state.borrow_mut();
					inflight.delivered = Some(item);
					inflight.waker.take()
				};
				if let Some(waker) = waker {
					waker.wake();
				}
			}
		});
		// The provider may have answered synchronously from inside `request`.
		let mut inflight = state.borrow_mut();
		if let Some(item) = inflight.delivered.take() {
			inflight.awaiting = false;
			return Poll::Ready(item);
		}
		Poll::Pending
	})
}
