//! NFA→DFA subset construction.

use std::collections::{BTreeSet, VecDeque};

use itertools::Itertools;
use tracing::debug;

use crate::{
    automaton::{Automaton, AutomatonEdit, AutomatonType},
    edge::Edge,
    Set, StateId,
};

use super::{Artifact, TransformStep, Transformation};

/// Canonical name of a DFA state: the sorted NFA-state-id set in braces,
/// `{}` for the (explicitly modeled) empty set.
fn subset_name(subset: &BTreeSet<StateId>) -> StateId {
    format!("{{{}}}", subset.iter().join(","))
}

/// Precomputes the subset construction turning a nondeterministic finite
/// automaton into an equivalent deterministic one. The derived alphabet is
/// the sorted set of all edge symbols; DFA states are named after the
/// NFA-state sets they represent.
///
/// # Panics
///
/// Panics when the input is not a finite automaton, still carries
/// ε-transitions (eliminate them first), or has states unreachable from the
/// initial state.
pub fn subset_construction(input: &Automaton) -> Transformation {
    let data = input.data();
    assert_eq!(
        data.automaton_type(),
        AutomatonType::Finite,
        "subset construction requires a finite automaton"
    );
    assert!(
        !data.has_epsilon_edges(),
        "subset construction requires an ε-free automaton"
    );
    let reachable = data.reachable_states();
    let unreachable = data
        .states()
        .iter()
        .filter(|q| !reachable.contains(*q))
        .collect_vec();
    assert!(
        unreachable.is_empty(),
        "subset construction requires all states to be reachable, but {} are not",
        unreachable.iter().join(", ")
    );

    let alphabet = data.alphabet();
    let initial: BTreeSet<StateId> = BTreeSet::from_iter([data.initial_state_id().clone()]);
    debug!(alphabet = ?alphabet, initial = %subset_name(&initial), "starting subset construction");

    let output = Automaton::finite(subset_name(&initial));
    let mut steps = Vec::new();
    let mut next_edge_id = 0;

    let mut seen: Set<StateId> = Set::from_iter([subset_name(&initial)]);
    let mut worklist = VecDeque::from([initial.clone()]);
    if initial.iter().any(|q| data.is_final(q)) {
        steps.push(TransformStep::new(
            initial.iter().cloned(),
            AutomatonEdit::SetFinal {
                id: subset_name(&initial),
                is_final: true,
            },
        ));
    }

    while let Some(subset) = worklist.pop_front() {
        for symbol in &alphabet {
            let targets: BTreeSet<StateId> = subset
                .iter()
                .filter_map(|q| data.delta().get(q))
                .flat_map(|row| {
                    row.iter().filter_map(|(to, edges)| {
                        edges
                            .iter()
                            .any(|e| e.input_char() == symbol)
                            .then(|| to.clone())
                    })
                })
                .collect();
            let target_name = subset_name(&targets);

            if seen.insert(target_name.clone()) {
                steps.push(TransformStep::new(
                    targets.iter().cloned(),
                    AutomatonEdit::AddState {
                        id: target_name.clone(),
                    },
                ));
                if targets.iter().any(|q| data.is_final(q)) {
                    steps.push(TransformStep::new(
                        targets.iter().cloned(),
                        AutomatonEdit::SetFinal {
                            id: target_name.clone(),
                            is_final: true,
                        },
                    ));
                }
                worklist.push_back(targets);
            }

            steps.push(TransformStep::new(
                subset.iter().cloned(),
                AutomatonEdit::AddEdge {
                    from: subset_name(&subset),
                    to: target_name,
                    edge: Edge::finite(next_edge_id, symbol.clone()),
                },
            ));
            next_edge_id += 1;
        }
    }

    Transformation::new(Artifact::Automaton(output), steps)
}
