//! Declarative finite state machine used by map-authored entities.
//!
//! A machine is described by an ordered list of [`StateDefinition`]s. Each
//! definition names a state, optionally flags it as the initial state, and maps
//! event names to target state names. The name -> index table is built once at
//! construction so every transition is a pair of hash lookups.
//!
//! The receiver is borrowed for the duration of each
//! [`StateMachine::consume_event`] call rather than stored. Entities keep the
//! machine in a field separate from the state the callbacks mutate and split
//! the borrow.
//!
//! Misconfiguration is tolerated rather than fatal: a machine without an
//! initial state still constructs (and reports [`NO_STATE`]), and an event that
//! is not valid for the current state is logged and ignored.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Sentinel returned by [`StateMachine::state`] when no initial state exists.
pub const NO_STATE: &str = "";

/// One state: its name, whether it is the initial state, and its transitions.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StateDefinition {
    pub name: String,
    #[serde(default)]
    pub initial: bool,
    #[serde(default)]
    pub events: HashMap<String, String>,
}

impl StateDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            initial: false,
            events: HashMap::new(),
        }
    }

    /// Builder-style helper marking this definition as the initial state.
    pub fn initial(mut self) -> Self {
        self.initial = true;
        self
    }

    /// Builder-style helper adding an `event -> target` transition.
    pub fn on(mut self, event: &str, target: &str) -> Self {
        self.events.insert(event.to_string(), target.to_string());
        self
    }
}

/// Callback sink for state entries.
///
/// `enter_state` is invoked once per successful transition with the name of the
/// state that was just entered. It is never invoked by [`StateMachine::reset`].
pub trait StateReceiver {
    fn enter_state(&mut self, state: &str);
}

#[derive(Debug, Clone)]
pub struct StateMachine {
    states: Vec<StateDefinition>,
    indices: HashMap<String, usize>,
    initial: Option<usize>,
    current: Option<usize>,
}

impl StateMachine {
    pub fn new(states: Vec<StateDefinition>) -> Self {
        let mut indices = HashMap::with_capacity(states.len());
        let mut initial: Option<usize> = None;
        for (i, state) in states.iter().enumerate() {
            if indices.insert(state.name.clone(), i).is_some() {
                log::warn!(
                    "State machine defines state '{}' more than once; the last definition wins",
                    state.name
                );
            }
            if state.initial {
                if let Some(prev) = initial {
                    log::warn!(
                        "State machine has several initial states ('{}' and '{}'); using '{}'",
                        states[prev].name,
                        state.name,
                        state.name
                    );
                }
                initial = Some(i);
            }
        }
        if initial.is_none() {
            log::warn!("State machine has no initial state!");
        }

        for state in &states {
            for (event, target) in &state.events {
                if !indices.contains_key(target) {
                    log::warn!(
                        "State '{}' maps event '{}' to undefined state '{}'",
                        state.name,
                        event,
                        target
                    );
                }
            }
        }

        Self {
            states,
            indices,
            initial,
            current: initial,
        }
    }

    /// Parse a JSON array of state definitions.
    pub fn from_json(raw: &str) -> Result<Self, String> {
        let states: Vec<StateDefinition> = serde_json::from_str(raw)
            .map_err(|e| format!("Failed to parse state definitions: {e}"))?;
        Ok(Self::new(states))
    }

    /// Name of the current state, or [`NO_STATE`] if there is none.
    pub fn state(&self) -> &str {
        self.current
            .map(|i| self.states[i].name.as_str())
            .unwrap_or(NO_STATE)
    }

    pub fn is_in(&self, state: &str) -> bool {
        self.current.is_some() && self.state() == state
    }

    pub fn states(&self) -> &[StateDefinition] {
        &self.states
    }

    /// Apply `event` to the current state without notifying a receiver.
    ///
    /// Returns the name of the entered state, or `None` when the event is not
    /// valid in the current state (a warning is logged and nothing changes).
    pub fn transition(&mut self, event: &str) -> Option<&str> {
        let Some(current) = self.current else {
            log::warn!(
                "State machine called with event '{}' but has no current state.",
                event
            );
            return None;
        };
        let current_def = &self.states[current];
        let next = current_def
            .events
            .get(event)
            .and_then(|target| self.indices.get(target).copied());
        match next {
            Some(next) => {
                self.current = Some(next);
                Some(self.states[next].name.as_str())
            }
            None => {
                log::warn!(
                    "State machine called with invalid event: '{}' for current state: '{}'.",
                    event,
                    current_def.name
                );
                None
            }
        }
    }

    /// Consume an event, entering the mapped state and notifying `receiver`.
    ///
    /// Returns `true` if a transition happened.
    pub fn consume_event<R>(&mut self, event: &str, receiver: &mut R) -> bool
    where
        R: StateReceiver + ?Sized,
    {
        match self.transition(event) {
            Some(entered) => {
                receiver.enter_state(entered);
                true
            }
            None => false,
        }
    }

    /// Return to the initial state. No receiver callback is made.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Load a state definition file (a JSON array of [`StateDefinition`]) from disk.
pub fn load_state_file(path: &Path) -> Result<StateMachine, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read state file {}: {e}", path.display()))?;
    let states: Vec<StateDefinition> = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse state file {}: {e}", path.display()))?;
    validate_states(&states)?;
    Ok(StateMachine::new(states))
}

fn validate_states(states: &[StateDefinition]) -> Result<(), String> {
    if states.is_empty() {
        return Err("State validation failed: no states defined".to_string());
    }
    for (i, state) in states.iter().enumerate() {
        if state.name.is_empty() {
            return Err(format!("State validation failed: state {} has empty name", i));
        }
    }
    Ok(())
}
