use std::{
	cell::{Cell, Ref, RefCell, RefMut},
	fmt::{self, Debug, Formatter},
	rc::Rc,
};

use tap::Pipe;

/// A release-triggered result cell: shared ownership of a value and of the
/// finalizer that will receive it.
///
/// All clones (and every adapter manufactured by
/// [`setter`](`Harvest::setter`)) share one record. The finalizer runs
/// exactly once, synchronously, at the instant the last owner drops, with
/// the value moved out of the record; that is the sole mechanism by which
/// the cell delivers its result. Owners mutate freely beforehand and the
/// finalizer is the join point after every release.
///
/// This replaces outstanding-result counting for fan-out gathering: issue
/// one setter per source and let the reference count decide when all of
/// them have reported.
pub struct Harvest<T: 'static>(Rc<RawHarvest<T>>);

struct RawHarvest<T: 'static> {
	value: RefCell<Option<T>>,
	finish: Cell<Option<Box<dyn FnOnce(T)>>>,
}

impl<T: 'static> Drop for RawHarvest<T> {
	fn drop(&mut self) {
		if let (Some(value), Some(finish)) = (self.value.get_mut().take(), self.finish.take()) {
			finish(value);
		}
	}
}

impl<T: 'static> Clone for Harvest<T> {
	fn clone(&self) -> Self {
		Self(Rc::clone(&self.0))
	}
}

impl<T: 'static + Debug> Debug for Harvest<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Harvest").field(&self.0.value).finish()
	}
}

impl<T: 'static> Harvest<T> {
	/// As [`with_value`](`Harvest::with_value`), starting from `T::default()`.
	pub fn new(finish: impl 'static + FnOnce(T)) -> Self
	where
		T: Default,
	{
		Self::with_value(T::default(), finish)
	}

	/// Creates a cell owning `value`; `finish` receives it when the last
	/// owner drops.
	pub fn with_value(value: T, finish: impl 'static + FnOnce(T)) -> Self {
		RawHarvest {
			value: RefCell::new(Some(value)),
			finish: Cell::new(Some(Box::new(finish))),
		}
		.pipe(Rc::new)
		.pipe(Self)
	}

	/// Runs `update` on a mutable view of the value.
	pub fn update<R>(&self, update: impl FnOnce(&mut T) -> R) -> R {
		update(&mut self.value_mut())
	}

	/// Replaces the value. The finalizer receives whatever was assigned
	/// last.
	pub fn set(&self, value: T) {
		*self.value_mut() = value;
	}

	#[must_use]
	pub fn get(&self) -> T
	where
		T: Copy,
	{
		*self.value_ref()
	}

	#[must_use]
	pub fn get_clone(&self) -> T
	where
		T: Clone,
	{
		self.value_ref().clone()
	}

	/// Manufactures a one-shot adapter that assigns into the value.
	///
	/// The adapter holds a strong clone of this handle: the finalizer cannot
	/// run until every outstanding adapter has been invoked or dropped.
	pub fn setter<V>(&self, assign: impl 'static + FnOnce(&mut T, V)) -> impl FnOnce(V) {
		let this = self.clone();
		move |value| assign(&mut this.value_mut(), value)
	}

	fn value_ref(&self) -> Ref<'_, T> {
		Ref::map(self.0.value.borrow(), |value| {
			value.as_ref().expect("present until the last owner drops")
		})
	}

	fn value_mut(&self) -> RefMut<'_, T> {
		RefMut::map(self.0.value.borrow_mut(), |value| {
			value.as_mut().expect("present until the last owner drops")
		})
	}
}
