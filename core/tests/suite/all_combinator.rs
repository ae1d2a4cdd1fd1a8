use eventual_core::{Eventual, JobQueue, SettlementState, fulfill};

use crate::common::{Ev, collecting_queue, run};

#[test]
fn empty_input_fulfills_with_empty_vec() {
    let queue = JobQueue::new();
    let all = Ev::all(&queue, Vec::new());
    assert_eq!(all.state(), SettlementState::Pending);

    run(&queue);
    assert_eq!(all.peek(), Some(Ok(Vec::new())));
}

#[test]
fn values_come_back_in_input_order() {
    let queue = JobQueue::new();
    let (first, resolve_first, _) = Ev::with_resolvers(&queue);
    let (second, resolve_second, _) = Ev::with_resolvers(&queue);
    let (third, resolve_third, _) = Ev::with_resolvers(&queue);
    let all = Ev::all(&queue, [first, second, third]);

    resolve_third.resolve(3);
    run(&queue);
    resolve_first.resolve(1);
    run(&queue);
    assert_eq!(all.state(), SettlementState::Pending);

    resolve_second.resolve(2);
    run(&queue);
    assert_eq!(all.peek(), Some(Ok(vec![1, 2, 3])));
}

#[test]
fn first_rejection_wins() {
    let queue = collecting_queue();
    let (f1, resolve_f1, _) = Ev::with_resolvers(&queue);
    let (f2, _, reject_f2) = Ev::with_resolvers(&queue);
    let (f3, _, reject_f3) = Ev::with_resolvers(&queue);
    let all = Ev::all(&queue, vec![f1, f2, f3]);
    let handled = all.catch(|_| fulfill(Vec::new()));

    reject_f2.reject("f2".to_string());
    run(&queue);
    assert_eq!(all.peek(), Some(Err("f2".to_string())));

    resolve_f1.resolve(1);
    reject_f3.reject("f3".to_string());
    run(&queue);
    assert_eq!(all.peek(), Some(Err("f2".to_string())));
    assert_eq!(handled.peek(), Some(Ok(Vec::new())));
    assert!(queue.take_unhandled().is_empty());
}

#[test]
fn rejection_does_not_wait_for_pending_inputs() {
    let queue = JobQueue::new();
    let (never, _, _) = Ev::with_resolvers(&queue);
    let failing = Ev::rejected(&queue, "early".to_string());
    let all = Ev::all(&queue, [never, failing]);
    let handled = all.catch(|reason| {
        assert_eq!(reason, "early");
        fulfill(vec![0])
    });

    run(&queue);
    assert_eq!(handled.peek(), Some(Ok(vec![0])));
}

#[test]
fn inputs_may_be_adopting_eventuals() {
    let queue = JobQueue::new();
    let (inner, resolve_inner, _) = Ev::with_resolvers(&queue);
    let adopting = Ev::adopting(&queue, inner);
    let plain = Ev::resolved(&queue, 10);
    let all = Ev::all(&queue, [adopting, plain]);

    run(&queue);
    assert_eq!(all.state(), SettlementState::Pending);

    resolve_inner.resolve(20);
    run(&queue);
    assert_eq!(all.peek(), Some(Ok(vec![20, 10])));
}

#[test]
fn results_can_be_chained() {
    let queue = JobQueue::new();
    let inputs = (1..=4).map(|n| Eventual::<i32, String>::resolved(&queue, n));
    let sum = Ev::all(&queue, inputs).and_then(|values| fulfill(values.iter().sum::<i32>()));

    run(&queue);
    assert_eq!(sum.peek(), Some(Ok(10)));
}
