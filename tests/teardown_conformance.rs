//! Teardown conformance tests.
//!
//! Teardown is absorbing: once the owning context is discarded, no
//! settlement may commit, whatever its outcome and whenever it arrives.
//! The in-flight producer still runs to completion; only its result is
//! unobserved.

mod common;

use common::*;
use retrack::{AsyncState, Controller};

#[test]
fn teardown_before_resolution_freezes_the_state() {
    init_test_logging();
    let producer: ManualProducer<&str, &str> = ManualProducer::new();
    let spawner = DeterministicSpawner::new();
    let controller = Controller::new(producer.clone(), spawner.clone());

    controller.on_trigger_changed(key(1));
    controller.teardown();

    producer.resolve(0, "late");
    // The settlement task itself completes; the commit is discarded.
    assert_eq!(spawner.run_until_stalled(), 1);
    assert_eq!(controller.snapshot(), AsyncState::Pending);
    assert_eq!(controller.metrics().results_discarded, 1);
    assert_eq!(controller.metrics().commits_succeeded, 0);
}

#[test]
fn teardown_before_rejection_freezes_the_state() {
    init_test_logging();
    let producer: ManualProducer<&str, &str> = ManualProducer::new();
    let spawner = DeterministicSpawner::new();
    let controller = Controller::new(producer.clone(), spawner.clone());

    controller.on_trigger_changed(key(1));
    controller.teardown();

    producer.reject(0, "late failure");
    spawner.run_until_stalled();
    assert_eq!(controller.snapshot(), AsyncState::Pending);
    assert_eq!(controller.metrics().commits_failed, 0);
    assert_eq!(controller.metrics().results_discarded, 1);
}

#[test]
fn committed_state_survives_teardown_unchanged() {
    init_test_logging();
    let producer: ManualProducer<&str, &str> = ManualProducer::new();
    let spawner = DeterministicSpawner::new();
    let controller = Controller::new(producer.clone(), spawner.clone());

    controller.on_trigger_changed(key(1));
    producer.resolve(0, "kept");
    spawner.run_until_stalled();
    controller.teardown();

    // Later calls are accepted and do nothing observable.
    controller.rerun();
    controller.on_trigger_changed(key(2));
    spawner.run_until_stalled();

    assert_eq!(controller.snapshot(), AsyncState::Succeeded { data: "kept" });
    assert_eq!(producer.call_count(), 1);
}

#[test]
fn teardown_is_idempotent() {
    init_test_logging();
    let producer: ManualProducer<&str, &str> = ManualProducer::new();
    let spawner = DeterministicSpawner::new();
    let controller = Controller::new(producer, spawner);

    controller.teardown();
    controller.teardown();
    controller.teardown();
    assert!(controller.is_torn_down());
}

#[test]
fn dropping_the_controller_tears_the_context_down() {
    init_test_logging();
    let producer: ManualProducer<&str, &str> = ManualProducer::new();
    let spawner = DeterministicSpawner::new();
    {
        let controller = Controller::new(producer.clone(), spawner.clone());
        controller.on_trigger_changed(key(1));
        assert_eq!(producer.call_count(), 1);
    }

    // The settlement task still runs to completion after the drop; its
    // result has nowhere observable to go.
    producer.resolve(0, "orphaned");
    assert_eq!(spawner.run_until_stalled(), 1);
}

#[test]
fn overlapping_invocations_are_all_discarded_after_teardown() {
    init_test_logging();
    let producer: ManualProducer<u32, &str> = ManualProducer::new();
    let spawner = DeterministicSpawner::new();
    let controller = Controller::new(producer.clone(), spawner.clone());

    controller.on_trigger_changed(key(1));
    controller.rerun();
    controller.rerun();
    controller.teardown();

    producer.resolve(0, 0);
    producer.resolve(1, 1);
    producer.resolve(2, 2);
    spawner.run_until_stalled();

    assert_eq!(controller.snapshot(), AsyncState::Pending);
    assert_eq!(controller.metrics().results_discarded, 3);
    assert_eq!(controller.metrics().total_dropped(), 3);
}
