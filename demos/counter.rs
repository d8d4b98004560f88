//! Counter State Machine
//!
//! This demo walks through the full lifecycle of a machine.
//!
//! Key concepts:
//! - A mapper yielding one state per event
//! - Duplicate suppression (the `reset` at zero changes nothing)
//! - Local hooks next to a shared logging observer
//! - State subscription, checkpoint and disposal
//!
//! Run with: RUST_LOG=info cargo run --example counter

use serde::{Deserialize, Serialize};
use statebus::core::states;
use statebus::observer::{LoggingObserver, ObserverHub};
use statebus::{Context, StateMachine, StateStream};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum CounterEvent {
    Increment,
    Decrement,
    Reset,
    Divide(i64),
}

fn count(ctx: &Context<CounterEvent, i64>, event: CounterEvent) -> StateStream<i64> {
    let current = ctx.state();
    match event {
        CounterEvent::Increment => states::once(current + 1),
        CounterEvent::Decrement => states::once(current - 1),
        CounterEvent::Reset => states::once(0),
        CounterEvent::Divide(n) => states::from_result(
            current
                .checked_div(n)
                .ok_or_else(|| format!("cannot divide {} by {}", current, n)),
        ),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Counter State Machine ===\n");

    let hub = Arc::new(ObserverHub::new());
    hub.set_observer(Arc::new(LoggingObserver::new()));

    let counter = StateMachine::builder()
        .initial(0i64)
        .mapper(count)
        .on_transition(|t| println!("  {}", t))
        .on_error(|e| println!("  error: {}", e))
        .observer_hub(hub)
        .name("counter")
        .build()
        .expect("demo runs inside a tokio runtime");

    let mut updates = counter.subscribe();

    for event in [
        CounterEvent::Reset,
        CounterEvent::Increment,
        CounterEvent::Increment,
        CounterEvent::Increment,
        CounterEvent::Divide(0),
        CounterEvent::Decrement,
        CounterEvent::Divide(2),
    ] {
        counter.add(event).expect("counter is open");
    }
    counter.flush().await.expect("counter is open");

    println!("\nFinal state: {}", counter.current_state());

    let checkpoint = counter.checkpoint();
    println!(
        "Checkpoint:\n{}",
        checkpoint.to_json().expect("checkpoint serializes")
    );

    counter.dispose().await;

    let mut seen = Vec::new();
    while let Some(state) = updates.next().await {
        seen.push(state);
    }
    println!("\nStates seen by subscriber: {:?}", seen);

    match counter.add(CounterEvent::Increment) {
        Ok(()) => println!("unexpected: disposed counter accepted an event"),
        Err(e) => println!("After dispose: {}", e),
    }

    println!("\n=== Demo Complete ===");
}
