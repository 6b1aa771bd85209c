//! The automaton command set.
//!
//! Each variant carries the full payload of one mutation. Validation is
//! complete before any snapshot is taken or any field is touched, so a
//! failing edit is guaranteed to leave the automaton untouched.

use indexmap::IndexMap;

use super::{AutomatonData, AutomatonType};
use crate::{
    edge::{Edge, EdgeId},
    EngineError, StateId,
};

/// A single edit command on an automaton. Doubles as the event payload
/// mirrored to renderers after execution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AutomatonEdit {
    /// Adds a fresh state.
    AddState {
        /// Id of the new state.
        id: StateId,
    },
    /// Removes a state together with its outgoing edges; edge lists
    /// targeting it are emptied but kept.
    RemoveState {
        /// Id of the state to remove.
        id: StateId,
    },
    /// Renames a state, propagating through the initial state, the final
    /// set and the delta matrix.
    RenameState {
        /// Current id.
        from: StateId,
        /// New id.
        to: StateId,
    },
    /// Overwrites the initial state.
    SetInitialState {
        /// Id of the new initial state.
        id: StateId,
    },
    /// Sets or clears the final flag of a state. A flag that already
    /// matches is a silent no-op and does not enter the undo history.
    SetFinal {
        /// Id of the state.
        id: StateId,
        /// Whether the state shall be final.
        is_final: bool,
    },
    /// Inserts an edge between two existing states.
    AddEdge {
        /// Source state.
        from: StateId,
        /// Target state.
        to: StateId,
        /// The edge label, including its fresh id.
        edge: Edge,
    },
    /// Removes the edge with the given id at exactly this endpoint pair.
    RemoveEdge {
        /// Source state.
        from: StateId,
        /// Target state.
        to: StateId,
        /// Id of the edge to remove.
        edge_id: EdgeId,
    },
    /// Replaces the label of the edge with the given id, wherever it sits
    /// in the delta matrix. The edge keeps its id.
    EditEdge {
        /// Id of the edge to relabel.
        edge_id: EdgeId,
        /// The replacement label.
        edge: Edge,
    },
}

impl AutomatonEdit {
    /// Checks all preconditions against the current data without mutating
    /// anything.
    pub(super) fn validate(&self, data: &AutomatonData) -> Result<(), EngineError> {
        match self {
            AutomatonEdit::AddState { id } => {
                if data.states.contains(id) {
                    return Err(EngineError::StateExists(id.clone()));
                }
                if data.edge_symbols().contains(id) {
                    return Err(EngineError::StateCollidesWithSymbol(id.clone()));
                }
                Ok(())
            }
            AutomatonEdit::RemoveState { id } => {
                if !data.states.contains(id) {
                    return Err(EngineError::UnknownState(id.clone()));
                }
                if *id == data.initial_state_id {
                    return Err(EngineError::RemoveInitialState(id.clone()));
                }
                Ok(())
            }
            AutomatonEdit::RenameState { from, to } => {
                if !data.states.contains(from) {
                    return Err(EngineError::UnknownState(from.clone()));
                }
                if to != from && data.states.contains(to) {
                    return Err(EngineError::StateExists(to.clone()));
                }
                if data.edge_symbols().contains(to) {
                    return Err(EngineError::StateCollidesWithSymbol(to.clone()));
                }
                Ok(())
            }
            AutomatonEdit::SetInitialState { id } | AutomatonEdit::SetFinal { id, .. } => {
                if !data.states.contains(id) {
                    return Err(EngineError::UnknownState(id.clone()));
                }
                Ok(())
            }
            AutomatonEdit::AddEdge { from, to, edge } => {
                for endpoint in [from, to] {
                    if !data.states.contains(endpoint) {
                        return Err(EngineError::UnknownState(endpoint.clone()));
                    }
                }
                edge_fits_type(edge, data.automaton_type)?;
                if data.states.contains(edge.input_char()) {
                    return Err(EngineError::SymbolCollidesWithState(
                        edge.input_char().clone(),
                    ));
                }
                if data
                    .edges_between(from, to)
                    .iter()
                    .any(|existing| existing.same_label(edge))
                {
                    return Err(EngineError::DuplicateEdge {
                        from: from.clone(),
                        to: to.clone(),
                    });
                }
                Ok(())
            }
            AutomatonEdit::RemoveEdge { from, to, edge_id } => {
                if data
                    .edges_between(from, to)
                    .iter()
                    .all(|e| e.id() != *edge_id)
                {
                    return Err(EngineError::UnknownEdge(*edge_id));
                }
                Ok(())
            }
            AutomatonEdit::EditEdge { edge_id, edge } => {
                let (from, to, idx) = data
                    .find_edge(*edge_id)
                    .ok_or(EngineError::UnknownEdge(*edge_id))?;
                edge_fits_type(edge, data.automaton_type)?;
                if data.states.contains(edge.input_char()) {
                    return Err(EngineError::SymbolCollidesWithState(
                        edge.input_char().clone(),
                    ));
                }
                let siblings = data.edges_between(from, to);
                if siblings
                    .iter()
                    .enumerate()
                    .any(|(i, existing)| i != idx && existing.same_label(edge))
                {
                    return Err(EngineError::DuplicateEdge {
                        from: from.clone(),
                        to: to.clone(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Whether executing this (already validated) edit would change
    /// nothing. Such edits succeed silently without polluting the history.
    pub(super) fn is_noop(&self, data: &AutomatonData) -> bool {
        match self {
            AutomatonEdit::SetFinal { id, is_final } => {
                data.final_state_ids.contains(id) == *is_final
            }
            _ => false,
        }
    }

    /// Applies the mutation. Must only be called after [`Self::validate`]
    /// succeeded.
    pub(super) fn apply(&self, data: &mut AutomatonData) {
        match self {
            AutomatonEdit::AddState { id } => {
                data.states.insert(id.clone());
            }
            AutomatonEdit::RemoveState { id } => {
                data.states.shift_remove(id);
                data.final_state_ids.shift_remove(id);
                data.delta.shift_remove(id);
                // The reference behavior keeps the emptied lists around
                // rather than dropping the entries.
                for row in data.delta.values_mut() {
                    if let Some(edges) = row.get_mut(id) {
                        edges.clear();
                    }
                }
            }
            AutomatonEdit::RenameState { from, to } => {
                if from == to {
                    return;
                }
                let rn = |id: &StateId| if id == from { to.clone() } else { id.clone() };
                data.states = data.states.iter().map(rn).collect();
                data.final_state_ids = data.final_state_ids.iter().map(rn).collect();
                data.initial_state_id = rn(&data.initial_state_id);
                data.delta = data
                    .delta
                    .iter()
                    .map(|(p, row)| {
                        let row = row
                            .iter()
                            .map(|(q, edges)| (rn(q), edges.clone()))
                            .collect::<IndexMap<_, _>>();
                        (rn(p), row)
                    })
                    .collect();
            }
            AutomatonEdit::SetInitialState { id } => {
                data.initial_state_id = id.clone();
            }
            AutomatonEdit::SetFinal { id, is_final } => {
                if *is_final {
                    data.final_state_ids.insert(id.clone());
                } else {
                    data.final_state_ids.shift_remove(id);
                }
            }
            AutomatonEdit::AddEdge { from, to, edge } => {
                data.delta
                    .entry(from.clone())
                    .or_insert_with(IndexMap::new)
                    .entry(to.clone())
                    .or_insert_with(Vec::new)
                    .push(edge.clone());
            }
            AutomatonEdit::RemoveEdge { from, to, edge_id } => {
                let edges = data
                    .delta
                    .get_mut(from)
                    .and_then(|row| row.get_mut(to))
                    .expect("validated endpoint pair must exist");
                let idx = edges
                    .iter()
                    .position(|e| e.id() == *edge_id)
                    .expect("validated edge must exist");
                edges.remove(idx);
            }
            AutomatonEdit::EditEdge { edge_id, edge } => {
                let (from, to, idx) = data
                    .find_edge(*edge_id)
                    .map(|(f, t, i)| (f.clone(), t.clone(), i))
                    .expect("validated edge must exist");
                data.delta[&from][&to][idx] = edge.clone().with_id(*edge_id);
            }
        }
    }
}

fn edge_fits_type(edge: &Edge, automaton_type: AutomatonType) -> Result<(), EngineError> {
    let fits = match automaton_type {
        AutomatonType::Finite => !edge.is_pda(),
        AutomatonType::Pda => edge.is_pda(),
        AutomatonType::Turing => false,
    };
    if fits {
        Ok(())
    } else {
        Err(EngineError::EdgeKindMismatch)
    }
}
