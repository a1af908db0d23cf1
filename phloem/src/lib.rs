#![warn(clippy::pedantic)]

//! Primitives for writing callback-driven asynchronous code without an
//! async runtime: a trampolined self-iterating loop ([`Cycle`]), a
//! release-triggered result cell ([`Harvest`]) and a single-request
//! rendezvous slot ([`Slot`]/[`Producer`]).
//!
//! Everything here is single-threaded-cooperative and deliberately `!Send`:
//! shared state is `Rc`-owned, liveness is reference-counted, and an ambient
//! executor (any `cambium::Defer` implementor) may defer callbacks, with
//! arbitrary latency between iterations.
//!
//! ```
//! use phloem::{shadow_clone, Cycle, Harvest};
//! use std::{cell::Cell, rc::Rc};
//!
//! let total = Rc::new(Cell::new(0));
//! let harvest = Harvest::with_value(0, {
//! 	shadow_clone!(total);
//! 	move |sum| total.set(sum)
//! });
//! let mut n = 0;
//! Cycle::new(move |cycle| {
//! 	n += 1;
//! 	harvest.update(|sum| *sum += n);
//! 	if n < 4 {
//! 		cycle.repeat();
//! 	}
//! });
//! // The loop self-terminated, releasing the cell and firing its finalizer.
//! assert_eq!(total.get(), 1 + 2 + 3 + 4);
//! ```

mod cycle;
pub use cycle::Cycle;

mod harvest;
pub use harvest::Harvest;

mod slot;
pub use slot::{Producer, Slot, Wakeup};

pub mod future;

/// Shadows each named binding with a clone of itself, in preparation for a
/// `move` closure that should capture the clone rather than the original.
///
/// ```
/// use phloem::{shadow_clone, Harvest};
///
/// let harvest = Harvest::with_value(0, |_| ());
/// let adapter = {
/// 	shadow_clone!(harvest);
/// 	move |value| harvest.set(value)
/// };
/// adapter(1);
/// assert_eq!(harvest.get(), 1);
/// ```
#[macro_export]
macro_rules! shadow_clone {
	($($name:ident),+$(,)?) => {
		$(let $name = ::core::clone::Clone::clone(&$name);)+
	};
}

/// Shadows each named reference binding with an owned clone, for capture by
/// a following `move` closure. Handy for the `&`[`Cycle`] a loop body
/// receives.
#[macro_export]
macro_rules! shadow_ref_to_owned {
	($($name:ident),+$(,)?) => {
		$(let $name = ::std::borrow::ToOwned::to_owned($name);)+
	};
}
