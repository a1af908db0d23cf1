use std::rc::Rc;

use cambium::{Defer, DeferQueue};

mod _validator;
use _validator::Validator;

#[test]
fn drains_in_order() {
	let queue = DeferQueue::new();
	let v = Rc::new(Validator::new());

	for n in 1..=3 {
		let v = Rc::clone(&v);
		queue.defer(move || v.push(n));
	}
	assert_eq!(queue.len(), 3);
	assert!(!queue.is_empty());
	v.expect([]);

	assert_eq!(queue.drain(), 3);
	v.expect([1, 2, 3]);
	assert!(queue.is_empty());
}

#[test]
fn tasks_may_defer_further_tasks() {
	let queue = DeferQueue::new();
	let v = Rc::new(Validator::new());

	queue.defer({
		let queue = queue.clone();
		let v = Rc::clone(&v);
		move || {
			v.push("outer");
			let v = Rc::clone(&v);
			queue.defer(move || v.push("inner"));
		}
	});
	assert_eq!(queue.drain(), 2);
	v.expect(["outer", "inner"]);
}

#[test]
fn a_nested_drain_is_a_no_op() {
	let queue = DeferQueue::new();
	let v = Rc::new(Validator::new());

	queue.defer({
		let queue = queue.clone();
		let v = Rc::clone(&v);
		move || {
			assert_eq!(queue.drain(), 0);
			v.push("first");
		}
	});
	queue.defer({
		let v = Rc::clone(&v);
		move || v.push("second")
	});
	assert_eq!(queue.drain(), 2);
	v.expect(["first", "second"]);
}

#[test]
fn usable_through_the_contract() {
	fn schedule(executor: &impl Defer, task: impl 'static + FnOnce()) {
		executor.defer(task);
	}

	let queue = DeferQueue::new();
	let v = Rc::new(Validator::new());
	schedule(&queue, {
		let v = Rc::clone(&v);
		move || v.push(())
	});
	assert_eq!(queue.drain(), 1);
	v.expect([()]);
}
