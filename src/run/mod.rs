//! Stepwise simulation of input words.
//!
//! A [`Run`] owns a [`Configuration`] (current state, remaining input,
//! and for pushdown automata the stack) plus a trace of configuration
//! snapshots so single steps can be undone. The automaton itself is only
//! ever borrowed read-only; simulating never mutates it.

use std::collections::VecDeque;

use tracing::trace;

use crate::{
    automaton::{Automaton, AutomatonData, AutomatonType},
    edge::Edge,
    EngineError, StateId, Symbol, EPSILON,
};

/// The instantaneous state of a simulation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Configuration {
    /// Position in a finite automaton.
    Finite {
        /// Current state.
        state_id: StateId,
        /// Input symbols not yet consumed.
        remaining_input: VecDeque<Symbol>,
    },
    /// Position in a pushdown automaton.
    Pda {
        /// Current state.
        state_id: StateId,
        /// Input symbols not yet consumed.
        remaining_input: VecDeque<Symbol>,
        /// The stack; the top is the last element.
        stack: Vec<Symbol>,
    },
}

impl Configuration {
    /// The state the run is currently in.
    pub fn state_id(&self) -> &StateId {
        match self {
            Configuration::Finite { state_id, .. } | Configuration::Pda { state_id, .. } => {
                state_id
            }
        }
    }

    /// The input symbols not yet consumed.
    pub fn remaining_input(&self) -> &VecDeque<Symbol> {
        match self {
            Configuration::Finite {
                remaining_input, ..
            }
            | Configuration::Pda {
                remaining_input, ..
            } => remaining_input,
        }
    }

    /// The stack of a pushdown configuration.
    pub fn stack(&self) -> Option<&[Symbol]> {
        match self {
            Configuration::Finite { .. } => None,
            Configuration::Pda { stack, .. } => Some(stack),
        }
    }
}

/// A simulation of one input word on an automaton.
#[derive(Clone, Debug)]
pub struct Run {
    configuration: Configuration,
    trace: Vec<Configuration>,
}

impl Run {
    /// Starts a run of `word` from the automaton's initial state. Pushdown
    /// runs start with an empty stack.
    ///
    /// # Panics
    ///
    /// Panics for the reserved Turing automaton type.
    pub fn start(automaton: &Automaton, word: impl IntoIterator<Item = Symbol>) -> Self {
        let remaining_input = word.into_iter().collect();
        let state_id = automaton.data().initial_state_id().clone();
        let configuration = match automaton.data().automaton_type() {
            AutomatonType::Finite => Configuration::Finite {
                state_id,
                remaining_input,
            },
            AutomatonType::Pda => Configuration::Pda {
                state_id,
                remaining_input,
                stack: Vec::new(),
            },
            AutomatonType::Turing => unimplemented!("turing machine semantics"),
        };
        Self {
            configuration,
            trace: Vec::new(),
        }
    }

    /// The current configuration.
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Takes a single step: consumes the next input symbol over the first
    /// matching edge. When several edges match (nondeterminism), the first
    /// one in delta iteration order wins; that tie-break is deliberate and
    /// stable, since delta preserves insertion order.
    ///
    /// The pre-step configuration is snapshotted so [`Run::undo_step`] can
    /// restore it.
    pub fn step(&mut self, automaton: &Automaton) -> Result<(), EngineError> {
        let next = step_configuration(&self.configuration, automaton.data())?;
        trace!(from = %self.configuration.state_id(), to = %next.state_id(), "simulation step");
        self.trace
            .push(std::mem::replace(&mut self.configuration, next));
        Ok(())
    }

    /// Undoes the most recent step, restoring the snapshotted
    /// configuration.
    pub fn undo_step(&mut self) -> Result<(), EngineError> {
        self.configuration = self.trace.pop().ok_or(EngineError::NothingToUndo)?;
        Ok(())
    }

    /// Drives the run until the input is exhausted or the automaton gets
    /// stuck, and reports acceptance.
    pub fn run_to_end(&mut self, automaton: &Automaton) -> bool {
        loop {
            match self.step(automaton) {
                Ok(()) => {}
                Err(EngineError::EndOfInput) => return self.accepted(automaton),
                Err(_) => return false,
            }
        }
    }

    /// Whether the run is in an accepting position: all input consumed and
    /// the current state final.
    pub fn accepted(&self, automaton: &Automaton) -> bool {
        self.configuration.remaining_input().is_empty()
            && automaton.data().is_final(self.configuration.state_id())
    }
}

/// The step function per automaton kind. Returns the successor
/// configuration without touching the given one.
fn step_configuration(
    configuration: &Configuration,
    data: &AutomatonData,
) -> Result<Configuration, EngineError> {
    match configuration {
        Configuration::Finite {
            state_id,
            remaining_input,
        } => {
            let symbol = remaining_input.front().ok_or(EngineError::EndOfInput)?;
            let (to, _) = first_match(data, state_id, |edge| edge.input_char() == symbol)
                .ok_or_else(|| EngineError::NoTransition {
                    state: state_id.clone(),
                    symbol: symbol.clone(),
                })?;
            let mut remaining_input = remaining_input.clone();
            remaining_input.pop_front();
            Ok(Configuration::Finite {
                state_id: to,
                remaining_input,
            })
        }
        Configuration::Pda {
            state_id,
            remaining_input,
            stack,
        } => {
            let symbol = remaining_input.front().ok_or(EngineError::EndOfInput)?;
            let (to, edge) = first_match(data, state_id, |edge| match edge {
                Edge::Pda {
                    input_char,
                    read_stack_char,
                    ..
                } => {
                    input_char == symbol
                        && (read_stack_char == EPSILON
                            || stack.last() == Some(read_stack_char))
                }
                Edge::Finite { .. } => {
                    panic!("pushdown automaton contains a non-pushdown edge")
                }
            })
            .ok_or_else(|| EngineError::NoTransition {
                state: state_id.clone(),
                symbol: symbol.clone(),
            })?;

            let Edge::Pda {
                read_stack_char,
                write_stack_word,
                ..
            } = &edge
            else {
                unreachable!("matcher only accepts pushdown edges")
            };
            let mut stack = stack.clone();
            if read_stack_char != EPSILON {
                stack.pop();
            }
            // pushed in order, so the first symbol of the word ends up
            // deepest
            stack.extend(write_stack_word.iter().cloned());
            let mut remaining_input = remaining_input.clone();
            remaining_input.pop_front();
            Ok(Configuration::Pda {
                state_id: to,
                remaining_input,
                stack,
            })
        }
    }
}

/// Finds the first edge from `state` satisfying the matcher, in delta
/// iteration order (insertion order of targets, then of parallel edges).
fn first_match(
    data: &AutomatonData,
    state: &StateId,
    matches: impl Fn(&Edge) -> bool,
) -> Option<(StateId, Edge)> {
    let row = data.delta().get(state)?;
    row.iter().find_map(|(to, edges)| {
        edges
            .iter()
            .find(|e| matches(e))
            .map(|e| (to.clone(), e.clone()))
    })
}
