//! Property-based tests for running state machines.
//!
//! These tests use proptest to verify the ordering and suppression
//! properties hold across many randomly generated event sequences.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use statebus::core::states;
use statebus::observer::{MachineRef, Observer, ObserverHub, Payload};
use statebus::{Context, StateMachine, StateStream, Transition};
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
enum Op {
    Add(i8),
    Set(i8),
    Repeat,
    Burst(i8, i8),
}

prop_compose! {
    fn arbitrary_op()(variant in 0..4u8, a in -3..3i8, b in -3..3i8) -> Op {
        match variant {
            0 => Op::Add(a),
            1 => Op::Set(a),
            2 => Op::Repeat,
            _ => Op::Burst(a, b),
        }
    }
}

/// Candidate states for an op, mirroring what the mapper yields.
fn candidates(current: i64, op: Op) -> Vec<i64> {
    match op {
        Op::Add(n) => vec![current + n as i64],
        Op::Set(n) => vec![n as i64],
        Op::Repeat => vec![current],
        Op::Burst(a, b) => vec![a as i64, a as i64, b as i64],
    }
}

/// Events carry their submission index so ordering can be checked.
type Tagged = (usize, Op);

fn mapper(ctx: &Context<Tagged, i64>, (_, op): Tagged) -> StateStream<i64> {
    states::iter(candidates(ctx.state(), op))
}

#[derive(Default)]
struct Recorder {
    transitions: Mutex<Vec<Transition<Tagged, i64>>>,
}

impl Observer for Recorder {
    fn on_transition(&self, _machine: &MachineRef, transition: &dyn Payload) {
        if let Some(t) = transition.downcast_ref::<Transition<Tagged, i64>>() {
            self.transitions.lock().unwrap().push(t.clone());
        }
    }
}

/// Run `ops` through a fresh machine and return its transitions and final state.
fn run(ops: &[Op]) -> (Vec<Transition<Tagged, i64>>, i64) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    runtime.block_on(async {
        let recorder = Arc::new(Recorder::default());
        let machine = StateMachine::builder()
            .initial(0i64)
            .mapper(mapper)
            .observer_hub(Arc::new(ObserverHub::with_observer(recorder.clone())))
            .build()
            .unwrap();

        for (seq, op) in ops.iter().enumerate() {
            machine.add((seq, *op)).unwrap();
        }
        machine.dispose().await;

        let transitions = recorder.transitions.lock().unwrap().clone();
        (transitions, machine.current_state())
    })
}

/// Reference model of the suppression rule.
fn expected(ops: &[Op]) -> (Vec<Transition<Tagged, i64>>, i64) {
    let mut current = 0i64;
    let mut transitions = Vec::new();
    for (seq, op) in ops.iter().enumerate() {
        for next in candidates(current, *op) {
            if next != current {
                transitions.push(Transition::new(current, (seq, *op), next));
                current = next;
            }
        }
    }
    (transitions, current)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn transitions_match_reference_model(ops in prop::collection::vec(arbitrary_op(), 0..20)) {
        let (transitions, state) = run(&ops);
        let (expected_transitions, expected_state) = expected(&ops);
        prop_assert_eq!(transitions, expected_transitions);
        prop_assert_eq!(state, expected_state);
    }

    #[test]
    fn no_transition_repeats_its_state(ops in prop::collection::vec(arbitrary_op(), 0..20)) {
        let (transitions, _) = run(&ops);
        for t in &transitions {
            prop_assert_ne!(t.current_state, t.next_state);
        }
    }

    #[test]
    fn current_state_continues_from_last_transition(
        ops in prop::collection::vec(arbitrary_op(), 1..20)
    ) {
        let (transitions, state) = run(&ops);

        let mut previous = 0i64;
        for t in &transitions {
            prop_assert_eq!(t.current_state, previous);
            previous = t.next_state;
        }
        prop_assert_eq!(state, previous);
    }

    #[test]
    fn transitions_follow_submission_order(ops in prop::collection::vec(arbitrary_op(), 1..20)) {
        let (transitions, _) = run(&ops);

        for pair in transitions.windows(2) {
            prop_assert!(pair[0].event.0 <= pair[1].event.0);
        }
    }
}
