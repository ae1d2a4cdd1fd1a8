use serde_json::json;

use eventual_core::{JobQueue, SettledOutcome, SettlementState};

use crate::common::{Ev, collecting_queue, run};

#[test]
fn reports_each_outcome_in_input_order() {
    let queue = JobQueue::new();
    let (f1, resolve_f1, _) = Ev::with_resolvers(&queue);
    let (f2, _, reject_f2) = Ev::with_resolvers(&queue);
    let settled = Ev::all_settled(&queue, [f1, f2]);

    reject_f2.reject("x".to_string());
    run(&queue);
    assert_eq!(settled.state(), SettlementState::Pending);

    resolve_f1.resolve(1);
    run(&queue);
    let outcomes = settled.peek().unwrap().unwrap();
    assert_eq!(
        serde_json::to_value(&outcomes).unwrap(),
        json!([
            {"status": "fulfilled", "value": 1},
            {"status": "rejected", "reason": "x"}
        ])
    );
}

#[test]
fn never_rejects_even_when_every_input_does() {
    let queue = collecting_queue();
    let settled = Ev::all_settled(
        &queue,
        [
            Ev::rejected(&queue, "a".to_string()),
            Ev::rejected(&queue, "b".to_string()),
        ],
    );

    run(&queue);
    assert_eq!(
        settled.peek(),
        Some(Ok(vec![
            SettledOutcome::Rejected {
                reason: "a".to_string()
            },
            SettledOutcome::Rejected {
                reason: "b".to_string()
            },
        ]))
    );
    assert!(queue.take_unhandled().is_empty());
}

#[test]
fn empty_input_fulfills_with_empty_vec() {
    let queue = JobQueue::new();
    let settled = Ev::all_settled(&queue, Vec::new());

    run(&queue);
    assert_eq!(settled.peek(), Some(Ok(Vec::new())));
}

#[test]
fn outcomes_convert_back_into_results() {
    let queue = JobQueue::new();
    let settled = Ev::all_settled(
        &queue,
        [Ev::resolved(&queue, 5), Ev::rejected(&queue, "no".to_string())],
    );

    run(&queue);
    let results: Vec<Result<i32, String>> = settled
        .peek()
        .unwrap()
        .unwrap()
        .into_iter()
        .map(SettledOutcome::into_result)
        .collect();
    assert_eq!(results, vec![Ok(5), Err("no".to_string())]);
}
