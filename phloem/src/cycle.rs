use std::{
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter},
	rc::Rc,
};

/// A self-iterating loop: a cloneable strong handle to its own body.
///
/// [`Cycle::new`] runs the body once immediately. The body receives the
/// handle and may call [`repeat`](`Cycle::repeat`), synchronously or much
/// later from wherever a clone of the handle ended up, to schedule exactly
/// one more iteration. Invocations of one body are strictly serialised;
/// a synchronous `repeat` is collapsed into the enclosing drive instead of
/// recursing, so chains of synchronous iterations run at constant stack
/// depth.
///
/// The body closure is constructed exactly once and never cloned; it owns
/// its captures for the whole life of the loop. That life ends when the last
/// handle drops: typically when the body returns without repeating and
/// without having parked a clone of the handle anywhere.
pub struct Cycle(Rc<RawCycle>);

struct RawCycle {
	body: RefCell<Box<dyn FnMut(&Cycle)>>,
	/// Toggled on every drive entry; `true` exactly while the body runs.
	spinning: Cell<bool>,
}

impl Clone for Cycle {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}

impl Debug for Cycle {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Cycle")
			.field("spinning", &self.0.spinning.get())
			.finish_non_exhaustive()
	}
}

impl Cycle {
	/// Runs `body` immediately, handing it the new loop handle.
	pub fn new(body: impl 'static + FnMut(&Cycle)) -> Self {
		let this = Self(Rc::new(RawCycle {
			body: RefCell::new(Box::new(body)),
			spinning: Cell::new(false),
		}));
		this.repeat();
		this
	}

	/// Invokes the continuation: one more iteration of the body.
	///
	/// From inside the body this merely marks the current iteration as
	/// to-be-repeated and returns. From outside (the asynchronous case) it
	/// drives the body directly, on the caller's stack.
	///
	/// # Panics
	///
	/// A body that repeats *more than once* per iteration asks for a nested
	/// invocation of itself, which the two-state drive cannot represent;
	/// the body's `RefCell` turns that into a borrow panic.
	pub fn repeat(&self) {
		loop {
			let spinning = !self.0.spinning.get();
			self.0.spinning.set(spinning);
			if !spinning {
				break;
			}
			(&mut *self.0.body.borrow_mut())(self);
		}
	}
}
