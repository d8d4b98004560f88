//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::checkpoint::{Checkpoint, CheckpointError};
use crate::config::MachineConfig;
use crate::core::{Event, State, StateStream, Transition};
use crate::error::MachineError;
use crate::observer::ObserverHub;
use crate::runtime::{Context, Hooks, Mapper, StateMachine};
use std::sync::Arc;

/// Builder for constructing state machines with a fluent API.
///
/// Machines not given a hub report to [`ObserverHub::global`].
pub struct StateMachineBuilder<E: Event, S: State> {
    initial: Option<S>,
    mapper: Option<Arc<dyn Mapper<E, S>>>,
    hooks: Hooks<E, S>,
    hub: Option<Arc<ObserverHub>>,
    config: MachineConfig,
}

impl<E: Event, S: State> StateMachineBuilder<E, S> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            initial: None,
            mapper: None,
            hooks: Hooks::new(),
            hub: None,
            config: MachineConfig::default(),
        }
    }

    /// Set the initial state (required unless resuming).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Set the mapper from a closure or function (required).
    pub fn mapper<F>(self, mapper: F) -> Self
    where
        F: Fn(&Context<E, S>, E) -> StateStream<S> + Send + Sync + 'static,
    {
        self.mapper_from(mapper)
    }

    /// Set the mapper from any [`Mapper`] implementation.
    pub fn mapper_from<M: Mapper<E, S>>(mut self, mapper: M) -> Self {
        self.mapper = Some(Arc::new(mapper));
        self
    }

    /// Replace all hooks at once.
    pub fn hooks(mut self, hooks: Hooks<E, S>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn on_event<F>(mut self, hook: F) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_event(hook);
        self
    }

    pub fn on_transition<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Transition<E, S>) + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_transition(hook);
        self
    }

    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&MachineError) + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_error(hook);
        self
    }

    /// Attach the machine to a specific hub.
    pub fn observer_hub(mut self, hub: Arc<ObserverHub>) -> Self {
        self.hub = Some(hub);
        self
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Shorthand for setting `config.name`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Start from a checkpoint's state and name.
    ///
    /// The resumed machine gets a fresh id.
    pub fn resume(mut self, checkpoint: Checkpoint<S>) -> Result<Self, CheckpointError> {
        checkpoint.validate()?;
        self.config.name = checkpoint.machine.name;
        self.initial = Some(checkpoint.state);
        Ok(self)
    }

    /// Spawn the machine on the current tokio runtime.
    pub fn build(self) -> Result<StateMachine<E, S>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let mapper = self.mapper.ok_or(BuildError::MissingMapper)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| BuildError::NoRuntime)?;
        let hub = self.hub.unwrap_or_else(ObserverHub::global);

        Ok(StateMachine::spawn(
            &runtime,
            initial,
            mapper,
            self.hooks,
            hub,
            &self.config,
        ))
    }
}

impl<E: Event, S: State> Default for StateMachineBuilder<E, S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::states;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestState {
        Initial,
        Processing,
        Complete,
    }

    fn advance(
        _ctx: &Context<&'static str, TestState>,
        event: &'static str,
    ) -> StateStream<TestState> {
        match event {
            "start" => states::once(TestState::Processing),
            "finish" => states::once(TestState::Complete),
            _ => states::none(),
        }
    }

    #[test]
    fn builder_validates_required_fields() {
        let result = StateMachineBuilder::<&'static str, TestState>::new().build();

        assert!(matches!(result, Err(BuildError::MissingInitialState)));
    }

    #[test]
    fn builder_requires_mapper() {
        let result = StateMachineBuilder::<&'static str, TestState>::new()
            .initial(TestState::Initial)
            .build();

        assert!(matches!(result, Err(BuildError::MissingMapper)));
    }

    #[tokio::test]
    async fn fluent_api_builds_machine() {
        let machine = StateMachineBuilder::new()
            .initial(TestState::Initial)
            .mapper(advance)
            .name("workflow")
            .observer_hub(Arc::new(ObserverHub::new()))
            .build()
            .unwrap();

        assert_eq!(machine.current_state(), TestState::Initial);
        assert_eq!(machine.name(), "workflow");

        machine.add("start").unwrap();
        machine.add("finish").unwrap();
        machine.flush().await.unwrap();
        assert_eq!(machine.current_state(), TestState::Complete);
    }

    #[tokio::test]
    async fn resume_restores_state_and_name() {
        let original = StateMachineBuilder::new()
            .initial(TestState::Initial)
            .mapper(advance)
            .name("workflow")
            .observer_hub(Arc::new(ObserverHub::new()))
            .build()
            .unwrap();
        original.add("start").unwrap();
        original.flush().await.unwrap();
        let checkpoint = original.checkpoint();
        original.dispose().await;

        let resumed = StateMachineBuilder::new()
            .mapper(advance)
            .observer_hub(Arc::new(ObserverHub::new()))
            .resume(checkpoint)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(resumed.current_state(), TestState::Processing);
        assert_eq!(resumed.name(), "workflow");
        assert_ne!(resumed.machine_ref().id, original.machine_ref().id);
    }

    #[tokio::test]
    async fn config_sets_name() {
        let machine = StateMachineBuilder::new()
            .initial(TestState::Initial)
            .mapper(advance)
            .config(MachineConfig::named("configured"))
            .observer_hub(Arc::new(ObserverHub::new()))
            .build()
            .unwrap();

        assert_eq!(machine.name(), "configured");
    }
}
