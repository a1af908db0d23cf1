use std::rc::Rc;

use phloem::{shadow_clone, Slot, Wakeup};

mod _validator;
use _validator::Validator;

#[derive(Debug, Eq, PartialEq)]
enum Event {
	Woken(Wakeup),
	Data(u32),
}
use Event::{Data, Woken};

#[test]
fn consumer_registers_first() {
	let v = Rc::new(Validator::new());
	let slot = Slot::new();
	let producer = slot.producer();

	slot.request({
		shadow_clone!(v);
		move |value| v.push(Data(value))
	});
	v.expect([]);

	producer.await_request({
		shadow_clone!(v, producer);
		move |wakeup| {
			v.push(Woken(wakeup));
			producer.deliver(5);
		}
	});
	v.expect([Woken(Wakeup::Requested), Data(5)]);
}

#[test]
fn producer_registers_first() {
	let v = Rc::new(Validator::new());
	let slot = Slot::new();
	let producer = slot.producer();

	producer.await_request({
		shadow_clone!(v, producer);
		move |wakeup| {
			v.push(Woken(wakeup));
			producer.deliver(7);
		}
	});
	v.expect([]);

	slot.request({
		shadow_clone!(v);
		move |value| v.push(Data(value))
	});
	v.expect([Woken(Wakeup::Requested), Data(7)]);
}

#[test]
fn abandonment_wakes_a_parked_producer() {
	let v = Rc::new(Validator::new());
	let slot = Slot::<u32>::new();
	let producer = slot.producer();

	producer.await_request({
		shadow_clone!(v);
		move |wakeup| v.push(Woken(wakeup))
	});
	v.expect([]);
	drop(slot);
	v.expect([Woken(Wakeup::Abandoned)]);

	// After the death, awaiting reports it immediately.
	producer.await_request({
		shadow_clone!(v);
		move |wakeup| v.push(Woken(wakeup))
	});
	v.expect([Woken(Wakeup::Abandoned)]);
}

#[test]
fn abandonment_without_a_parked_producer_is_silent() {
	let slot = Slot::<u32>::new();
	let producer = slot.producer();
	drop(slot);
	drop(producer);
}

#[test]
fn consumer_clones_share_liveness() {
	let v = Rc::new(Validator::new());
	let slot = Slot::<u32>::new();
	let second = slot.clone();
	let producer = slot.producer();

	producer.await_request({
		shadow_clone!(v);
		move |wakeup| v.push(Woken(wakeup))
	});
	drop(slot);
	v.expect([]);
	drop(second);
	v.expect([Woken(Wakeup::Abandoned)]);
}

#[test]
fn a_delivered_callback_may_request_again() {
	let v = Rc::new(Validator::new());
	let slot = Slot::new();
	let producer = slot.producer();

	slot.request({
		shadow_clone!(v, slot);
		move |value| {
			v.push(Data(value));
			slot.request({
				shadow_clone!(v);
				move |value| v.push(Data(value))
			});
		}
	});
	producer.await_request({
		shadow_clone!(producer);
		move |_| producer.deliver(1)
	});
	producer.await_request({
		shadow_clone!(producer);
		move |_| producer.deliver(2)
	});
	v.expect([Data(1), Data(2)]);
}

#[test]
#[should_panic(expected = "at most one data-waiting callback")]
fn a_second_request_fails_loudly() {
	let slot = Slot::<u32>::new();
	slot.request(|_| ());
	slot.request(|_| ());
}

#[test]
#[should_panic(expected = "at most one request-waiting callback")]
fn a_second_await_fails_loudly() {
	let slot = Slot::<u32>::new();
	let producer = slot.producer();
	producer.await_request(|_| ());
	producer.await_request(|_| ());
}

#[test]
#[should_panic(expected = "deliver without a pending request")]
fn delivering_without_a_request_fails_loudly() {
	let slot = Slot::<u32>::new();
	let producer = slot.producer();
	producer.deliver(1);
}

#[test]
#[should_panic(expected = "deliver on an abandoned slot")]
fn delivering_after_abandonment_fails_loudly() {
	let slot = Slot::<u32>::new();
	let producer = slot.producer();
	drop(slot);
	producer.deliver(1);
}
