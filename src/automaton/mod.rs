//! Finite and pushdown automata with command-based mutation and undo.

mod edit;
pub use edit::AutomatonEdit;

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    edge::{Edge, EdgeId},
    EditEvent, EngineError, Set, StateId, Symbol,
};

/// The kind of an automaton, fixed at construction time.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutomatonType {
    /// Finite automaton, possibly nondeterministic.
    Finite,
    /// Pushdown automaton.
    Pda,
    /// Reserved; Turing-machine semantics are not implemented.
    Turing,
}

/// The transition relation: `delta[from][to]` holds the (possibly parallel)
/// edges from `from` to `to`, in insertion order.
pub type Delta = IndexMap<StateId, IndexMap<StateId, Vec<Edge>>>;

/// The serializable core of an automaton. This is exactly the shape consumed
/// and produced by the import/export collaborator; command history is never
/// part of it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomatonData {
    automaton_type: AutomatonType,
    states: IndexSet<StateId>,
    initial_state_id: StateId,
    final_state_ids: IndexSet<StateId>,
    delta: Delta,
}

impl AutomatonData {
    fn new(automaton_type: AutomatonType, initial: StateId) -> Self {
        Self {
            automaton_type,
            states: IndexSet::from_iter([initial.clone()]),
            initial_state_id: initial,
            final_state_ids: IndexSet::new(),
            delta: Delta::new(),
        }
    }

    /// The kind of this automaton.
    pub fn automaton_type(&self) -> AutomatonType {
        self.automaton_type
    }

    /// The states, in insertion order.
    pub fn states(&self) -> &IndexSet<StateId> {
        &self.states
    }

    /// The initial state.
    pub fn initial_state_id(&self) -> &StateId {
        &self.initial_state_id
    }

    /// The final states, in insertion order.
    pub fn final_state_ids(&self) -> &IndexSet<StateId> {
        &self.final_state_ids
    }

    /// The transition relation.
    pub fn delta(&self) -> &Delta {
        &self.delta
    }

    /// Whether `id` is a final state.
    pub fn is_final(&self, id: &str) -> bool {
        self.final_state_ids.contains(id)
    }

    /// Iterates over all edges as `(from, to, edge)` triples, in delta
    /// iteration order.
    pub fn edges(&self) -> impl Iterator<Item = (&StateId, &StateId, &Edge)> {
        self.delta.iter().flat_map(|(from, row)| {
            row.iter()
                .flat_map(move |(to, edges)| edges.iter().map(move |e| (from, to, e)))
        })
    }

    /// The edges from `from` to `to`, if any were ever inserted.
    pub fn edges_between(&self, from: &str, to: &str) -> &[Edge] {
        self.delta
            .get(from)
            .and_then(|row| row.get(to))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Locates an edge by id anywhere in the delta matrix, returning its
    /// endpoints and position within the parallel-edge list.
    pub fn find_edge(&self, id: EdgeId) -> Option<(&StateId, &StateId, usize)> {
        self.delta.iter().find_map(|(from, row)| {
            row.iter().find_map(|(to, edges)| {
                edges
                    .iter()
                    .position(|e| e.id() == id)
                    .map(|idx| (from, to, idx))
            })
        })
    }

    /// All symbols occurring on edges, including ε. State ids and edge
    /// symbols share a namespace, so this is the collision set for new
    /// state ids.
    pub fn edge_symbols(&self) -> Set<Symbol> {
        self.edges().map(|(_, _, e)| e.input_char().clone()).collect()
    }

    /// The input alphabet derived by scanning all edges: every non-ε edge
    /// symbol, sorted and de-duplicated.
    pub fn alphabet(&self) -> Vec<Symbol> {
        self.edges()
            .filter(|(_, _, e)| !e.is_epsilon())
            .map(|(_, _, e)| e.input_char().clone())
            .sorted()
            .dedup()
            .collect()
    }

    /// Whether any edge is ε-labeled.
    pub fn has_epsilon_edges(&self) -> bool {
        self.edges().any(|(_, _, e)| e.is_epsilon())
    }

    /// The set of states reachable from the initial state over arbitrary
    /// edges.
    pub fn reachable_states(&self) -> Set<StateId> {
        let mut reached = Set::default();
        let mut worklist = vec![self.initial_state_id.clone()];
        reached.insert(self.initial_state_id.clone());
        while let Some(q) = worklist.pop() {
            if let Some(row) = self.delta.get(&q) {
                for (to, edges) in row {
                    if !edges.is_empty() && reached.insert(to.clone()) {
                        worklist.push(to.clone());
                    }
                }
            }
        }
        reached
    }

    /// The largest edge id in use, for allocating fresh ids.
    pub fn max_edge_id(&self) -> Option<EdgeId> {
        self.edges().map(|(_, _, e)| e.id()).max()
    }
}

/// One executed command on the undo stack: the edit payload together with
/// the deep snapshot of the data taken right before mutation.
#[derive(Clone, Debug)]
struct EditCommand {
    edit: AutomatonEdit,
    backup: AutomatonData,
}

/// An automaton entity: the serializable [`AutomatonData`] core, the LIFO
/// command history backing [`Automaton::undo`], and the queue of edit events
/// for a mirroring renderer.
///
/// All mutation goes through [`Automaton::execute`]; a failing edit never
/// changes any state.
#[derive(Clone, Debug)]
pub struct Automaton {
    data: AutomatonData,
    history: Vec<EditCommand>,
    events: VecDeque<EditEvent<AutomatonEdit>>,
}

impl Automaton {
    /// Creates a finite automaton with the given initial state.
    pub fn finite(initial: impl Into<StateId>) -> Self {
        Self::from_data(AutomatonData::new(AutomatonType::Finite, initial.into()))
    }

    /// Creates a pushdown automaton with the given initial state.
    pub fn pda(initial: impl Into<StateId>) -> Self {
        Self::from_data(AutomatonData::new(AutomatonType::Pda, initial.into()))
    }

    /// Wraps imported data in a fresh entity with empty history.
    pub fn from_data(data: AutomatonData) -> Self {
        Self {
            data,
            history: Vec::new(),
            events: VecDeque::new(),
        }
    }

    /// Read access to the data core.
    pub fn data(&self) -> &AutomatonData {
        &self.data
    }

    /// Discards history and events, yielding the bare data core.
    pub fn into_data(self) -> AutomatonData {
        self.data
    }

    /// Validates and executes an edit. On success the command is pushed onto
    /// the undo history (except for silent no-ops) and mirrored to the event
    /// queue; on failure nothing changes.
    pub fn execute(&mut self, edit: AutomatonEdit) -> Result<(), EngineError> {
        edit.validate(&self.data)?;
        if edit.is_noop(&self.data) {
            // Intentionally skips backup and history so undo logs stay free
            // of null edits.
            return Ok(());
        }
        let backup = self.data.clone();
        edit.apply(&mut self.data);
        trace!(edit = ?edit, "applied automaton edit");
        self.events.push_back(EditEvent::Applied(edit.clone()));
        self.history.push(EditCommand { edit, backup });
        Ok(())
    }

    /// Pops the most recent command and restores the snapshot it carries.
    pub fn undo(&mut self) -> Result<(), EngineError> {
        let EditCommand { edit, backup } = self
            .history
            .pop()
            .ok_or(EngineError::NothingToUndo)?;
        self.data = backup;
        trace!(edit = ?edit, "undid automaton edit");
        self.events.push_back(EditEvent::Undone(edit));
        Ok(())
    }

    /// Number of commands on the undo stack.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Drains the pending edit events for the renderer.
    pub fn drain_events(&mut self) -> Vec<EditEvent<AutomatonEdit>> {
        self.events.drain(..).collect()
    }

    /// Runs the word to exhaustion and reports whether it is accepted.
    pub fn contains_word(&self, word: &[Symbol]) -> bool {
        crate::run::Run::start(self, word.to_vec()).run_to_end(self)
    }
}
