//! Library for building, editing and transforming finite automata, pushdown
//! automata and formal grammars in Rust.
//!
//! The crate is the engine behind an automaton workbench: entities
//! ([`Automaton`], [`Grammar`]) are mutated exclusively through edit commands
//! that snapshot the entity before touching it, giving a strict LIFO undo
//! log. On top of that sit a stepwise [`run`] engine for word simulation and
//! a [`transform`] pipeline that precomputes textbook conversion algorithms
//! (subset construction, ε-elimination, automaton↔grammar translation,
//! normal-form factoring) as ordered, undoable command sequences.
#![warn(missing_docs)]

pub mod automaton;
pub mod edge;
pub mod error;
pub mod grammar;
pub mod run;
pub mod session;
pub mod transform;

pub use automaton::{Automaton, AutomatonData, AutomatonEdit, AutomatonType};
pub use edge::{Edge, EdgeId};
pub use error::EngineError;
pub use grammar::{Grammar, GrammarData, GrammarEdit, GrammarType, ProductionRule};
pub use run::{Configuration, Run};
pub use session::{AlgorithmKind, Session};
pub use transform::{Artifact, TransformStep, Transformation};

/// Identifier of a state. State ids and edge symbols share one namespace so
/// that conversions such as automaton→grammar can reuse state ids as
/// nonterminals.
pub type StateId = String;

/// An input, stack or grammar symbol.
pub type Symbol = String;

/// The empty-input symbol. An edge labeled with it can be traversed without
/// consuming input.
pub const EPSILON: &str = "ε";

/// A hash set for scratch computations where iteration order does not
/// matter (closures, reachability worklists).
pub type Set<S> = ahash::HashSet<S>;

/// A hash map for scratch computations.
pub type Map<K, V> = ahash::HashMap<K, V>;

/// Event emitted to the renderer mirror queue, once per applied (or undone)
/// edit command. Carries the full command payload so a renderer can mirror
/// the change without re-deriving it from the whole entity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EditEvent<E> {
    /// The wrapped edit was executed successfully.
    Applied(E),
    /// The wrapped edit was rolled back through the undo log.
    Undone(E),
}
