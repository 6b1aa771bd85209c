//! Recoverable validation errors.
//!
//! Everything a user-issued edit or simulation step can legitimately run
//! into is an [`EngineError`] value; no failing path mutates state. Contract
//! violations (running an algorithm on an unsupported input, stepping an
//! algorithm before starting one) are panics instead, since they indicate
//! caller-side misuse rather than bad user input.

use thiserror::Error;

use crate::{edge::EdgeId, StateId, Symbol};

/// Structured error value returned by all fallible engine operations.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum EngineError {
    /// A state with this id already exists.
    #[error("a state with id '{0}' already exists")]
    StateExists(StateId),
    /// No state with this id exists.
    #[error("no state with id '{0}' exists")]
    UnknownState(StateId),
    /// The initial state cannot be removed.
    #[error("state '{0}' is the initial state and cannot be removed")]
    RemoveInitialState(StateId),
    /// A state id may not equal an edge symbol (shared namespace).
    #[error("'{0}' is already used as an edge symbol")]
    StateCollidesWithSymbol(Symbol),
    /// An edge symbol may not equal a state id (shared namespace).
    #[error("'{0}' is already used as a state id")]
    SymbolCollidesWithState(Symbol),
    /// An equally labeled edge already connects the two states.
    #[error("an equally labeled edge from '{from}' to '{to}' already exists")]
    DuplicateEdge {
        /// Source state of the offending edge.
        from: StateId,
        /// Target state of the offending edge.
        to: StateId,
    },
    /// No edge with the given id was found.
    #[error("no edge with id {0} was found")]
    UnknownEdge(EdgeId),
    /// The edge variant does not fit the automaton type.
    #[error("the edge kind does not match the automaton type")]
    EdgeKindMismatch,

    /// A grammar symbol with this name already exists.
    #[error("a symbol named '{0}' already exists")]
    SymbolExists(Symbol),
    /// No grammar symbol with this name exists.
    #[error("no symbol named '{0}' is declared")]
    UnknownSymbol(Symbol),
    /// The symbol exists but is not a nonterminal.
    #[error("'{0}' is not a nonterminal")]
    NotANonterminal(Symbol),
    /// A structurally equal production rule already exists.
    #[error("a structurally equal production rule already exists")]
    DuplicateRule,
    /// No production rule with the given id exists.
    #[error("no production rule with id {0} exists")]
    UnknownRule(usize),
    /// The initial nonterminal cannot be removed.
    #[error("'{0}' is the initial nonterminal and cannot be removed")]
    RemoveInitialNonterminal(Symbol),
    /// Regular grammars only allow terminals followed by at most one
    /// trailing nonterminal on the right-hand side.
    #[error("right-hand side is not valid for a regular grammar (terminals followed by at most one trailing nonterminal)")]
    IrregularRule,

    /// The undo history is empty.
    #[error("nothing to undo")]
    NothingToUndo,
    /// A simulation step was requested but the input word is exhausted.
    #[error("end of input reached")]
    EndOfInput,
    /// No edge matches the current configuration.
    #[error("no transition from state '{state}' on symbol '{symbol}'")]
    NoTransition {
        /// State the run is stuck in.
        state: StateId,
        /// Input symbol that could not be consumed.
        symbol: Symbol,
    },
    /// A run operation was issued while no run is active.
    #[error("no run is active")]
    NoActiveRun,
    /// The session holds a grammar, but the operation needs an automaton.
    #[error("the operation requires an automaton")]
    NotAnAutomaton,
    /// The session holds an automaton, but the operation needs a grammar.
    #[error("the operation requires a grammar")]
    NotAGrammar,
}
