//! End-to-end checks of the settlement guarantees through the public API.

use std::cell::Cell;
use std::rc::Rc;

use eventual_config::EventualConfig;
use eventual_core::{Error, Eventual, JobQueue, SettlementState, adopt, fulfill, reject};

use crate::common::{Ev, collecting_queue, log, run};

#[test]
fn delivery_never_happens_inside_the_settling_call() {
    let queue = JobQueue::new();
    let events = log();
    let (source, resolve, _) = Ev::with_resolvers(&queue);
    let seen = Rc::clone(&events);
    source.and_then(move |value| {
        seen.borrow_mut().push(format!("callback {value}"));
        fulfill(())
    });

    resolve.resolve(1);
    events.borrow_mut().push("after resolve".to_string());
    run(&queue);

    assert_eq!(
        *events.borrow(),
        vec!["after resolve".to_string(), "callback 1".to_string()]
    );
}

#[test]
fn every_attachment_sees_the_same_value() {
    let queue = JobQueue::new();
    let source = Eventual::<String, String>::resolved(&queue, "shared".to_string());
    let upper = source.and_then(|value| fulfill(value.to_uppercase()));
    let length = source.and_then(|value| fulfill(value.len()));

    run(&queue);
    assert_eq!(upper.peek(), Some(Ok("SHARED".to_string())));
    assert_eq!(length.peek(), Some(Ok(6)));
}

#[test]
fn long_chains_thread_values_through_each_step() {
    let queue = JobQueue::new();
    let mut current = Ev::resolved(&queue, 0);
    for _ in 0..100 {
        current = current.and_then(|value| fulfill(value + 1));
    }

    run(&queue);
    assert_eq!(current.peek(), Some(Ok(100)));
}

#[test]
fn recovery_turns_a_rejection_back_into_a_value() {
    let queue = JobQueue::new();
    let steps = log();
    let record = |label: &'static str| {
        let steps = Rc::clone(&steps);
        move || steps.borrow_mut().push(label)
    };

    let after_fetch = record("fetch");
    let after_parse = record("parse");
    let after_recover = record("recover");
    let result = Ev::resolved(&queue, 1)
        .and_then(move |_| {
            after_fetch();
            reject::<i32, String>("parse error".to_string())
        })
        .and_then(move |value| {
            after_parse();
            fulfill(value)
        })
        .catch(move |reason| {
            after_recover();
            assert_eq!(reason, "parse error");
            fulfill(0)
        });

    run(&queue);
    assert_eq!(result.peek(), Some(Ok(0)));
    assert_eq!(*steps.borrow(), vec!["fetch", "recover"]);
}

#[test]
fn flattening_through_two_levels_of_callbacks() {
    let queue = JobQueue::new();
    let outer_queue = queue.clone();
    let inner_queue = queue.clone();
    let nested = Ev::resolved(&queue, 3).and_then(move |value| {
        adopt(Ev::resolved(&outer_queue, value).and_then(move |value| {
            adopt(Ev::resolved(&inner_queue, value * 3))
        }))
    });

    run(&queue);
    assert_eq!(nested.peek(), Some(Ok(9)));
}

#[test]
fn finally_observes_without_changing_either_outcome() {
    let queue = collecting_queue();
    let count = Rc::new(Cell::new(0));
    let on_value = Rc::clone(&count);
    let on_reason = Rc::clone(&count);

    let kept_value = Ev::resolved(&queue, 8).finally(move || {
        on_value.set(on_value.get() + 1);
        Ok(())
    });
    let kept_reason = Ev::rejected(&queue, "gone".to_string()).finally(move || {
        on_reason.set(on_reason.get() + 1);
        Ok(())
    });

    run(&queue);
    assert_eq!(count.get(), 2);
    assert_eq!(kept_value.peek(), Some(Ok(8)));
    assert_eq!(kept_reason.peek(), Some(Err("gone".to_string())));
    assert_eq!(queue.take_unhandled().len(), 1);
}

#[test]
fn settled_state_never_changes() {
    let queue = collecting_queue();
    let (eventual, resolve, reject) = Ev::with_resolvers(&queue);
    reject.reject("first".to_string());
    run(&queue);
    assert_eq!(eventual.state(), SettlementState::Rejected);

    resolve.resolve(1);
    resolve.adopt(Ev::resolved(&queue, 2));
    run(&queue);
    assert_eq!(eventual.state(), SettlementState::Rejected);
    assert_eq!(eventual.peek(), Some(Err("first".to_string())));
}

#[test]
fn configured_queue_applies_policy_and_limit() {
    let config = EventualConfig::from_toml_str(
        r#"
[rejections]
policy = "collect"

[queue]
drain_limit = 3
"#,
    )
    .unwrap();
    let queue = JobQueue::from_config(&config);

    let mut current = Ev::resolved(&queue, 0);
    for _ in 0..5 {
        current = current.and_then(|value| fulfill(value + 1));
    }
    assert_eq!(
        queue.run_until_idle(),
        Err(Error::DrainLimitExceeded { limit: 3 })
    );

    while queue.run_next() {}
    assert_eq!(current.peek(), Some(Ok(5)));
    assert!(queue.take_unhandled().is_empty());
}
