//! ε-closure computation and ε-transition elimination.

use indexmap::IndexSet;
use tracing::debug;

use crate::{
    automaton::{Automaton, AutomatonData, AutomatonEdit, AutomatonType},
    edge::Edge,
    Map, Set, StateId, Symbol,
};

use super::{Artifact, TransformStep, Transformation};

/// The set of states reachable from `state` over ε-edges only, including
/// `state` itself, in breadth-first discovery order.
pub fn epsilon_closure(data: &AutomatonData, state: &StateId) -> IndexSet<StateId> {
    let mut closure = IndexSet::from_iter([state.clone()]);
    let mut cursor = 0;
    while cursor < closure.len() {
        let q = closure[cursor].clone();
        cursor += 1;
        if let Some(row) = data.delta().get(&q) {
            for (to, edges) in row {
                if edges.iter().any(Edge::is_epsilon) {
                    closure.insert(to.clone());
                }
            }
        }
    }
    closure
}

/// Precomputes the elimination of all ε-transitions: for every state `p`, a
/// direct `p --a--> r` edge is added whenever `r` is reachable from `p` via
/// (ε-closure, then `a`, then ε-closure); states whose closure contains a
/// final state become final; afterwards every ε-edge is removed. Running it
/// on an already ε-free automaton produces zero steps.
///
/// The transformation operates on a copy of the input, so stepping through
/// it never touches the caller's automaton.
///
/// # Panics
///
/// Panics when the input is not a finite automaton.
pub fn remove_epsilon_transitions(input: &Automaton) -> Transformation {
    let data = input.data();
    assert_eq!(
        data.automaton_type(),
        AutomatonType::Finite,
        "ε-elimination requires a finite automaton"
    );

    let closures: Map<StateId, IndexSet<StateId>> = data
        .states()
        .iter()
        .map(|q| (q.clone(), epsilon_closure(data, q)))
        .collect();
    debug!(states = data.states().len(), "computed ε-closures");

    let mut steps = Vec::new();

    // final-flag propagation
    for p in data.states() {
        if data.is_final(p) {
            continue;
        }
        let closure = &closures[p];
        if closure.iter().any(|q| data.is_final(q)) {
            steps.push(TransformStep::new(
                closure.iter().cloned(),
                AutomatonEdit::SetFinal {
                    id: p.clone(),
                    is_final: true,
                },
            ));
        }
    }

    // direct edges replacing ε-detours, de-duplicated by (from, to, symbol)
    let mut present: Set<(StateId, StateId, Symbol)> = data
        .edges()
        .filter(|(_, _, e)| !e.is_epsilon())
        .map(|(from, to, e)| (from.clone(), to.clone(), e.input_char().clone()))
        .collect();
    let mut next_edge_id = data.max_edge_id().map_or(0, |id| id + 1);
    for p in data.states() {
        for q in &closures[p] {
            let Some(row) = data.delta().get(q) else {
                continue;
            };
            for (target, edges) in row {
                for edge in edges.iter().filter(|e| !e.is_epsilon()) {
                    for r in &closures[target] {
                        let key = (p.clone(), r.clone(), edge.input_char().clone());
                        if present.contains(&key) {
                            continue;
                        }
                        present.insert(key);
                        steps.push(TransformStep::new(
                            [p.clone(), q.clone(), r.clone()],
                            AutomatonEdit::AddEdge {
                                from: p.clone(),
                                to: r.clone(),
                                edge: Edge::finite(next_edge_id, edge.input_char().clone()),
                            },
                        ));
                        next_edge_id += 1;
                    }
                }
            }
        }
    }

    // drop the ε-edges themselves
    for (from, to, edge) in data.edges() {
        if edge.is_epsilon() {
            steps.push(TransformStep::new(
                [from.clone(), to.clone()],
                AutomatonEdit::RemoveEdge {
                    from: from.clone(),
                    to: to.clone(),
                    edge_id: edge.id(),
                },
            ));
        }
    }

    Transformation::new(
        Artifact::Automaton(Automaton::from_data(data.clone())),
        steps,
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sym_word(w: &str) -> Vec<Symbol> {
        w.chars().map(|c| c.to_string()).collect()
    }

    /// q0 --ε--> q1 --a--> q2, q2 final; plus q0 --b--> q0.
    fn with_epsilon() -> Automaton {
        let mut a = Automaton::finite("q0");
        a.execute(AutomatonEdit::AddState { id: "q1".into() }).unwrap();
        a.execute(AutomatonEdit::AddState { id: "q2".into() }).unwrap();
        a.execute(AutomatonEdit::SetFinal {
            id: "q2".into(),
            is_final: true,
        })
        .unwrap();
        a.execute(AutomatonEdit::AddEdge {
            from: "q0".into(),
            to: "q1".into(),
            edge: Edge::epsilon(0),
        })
        .unwrap();
        a.execute(AutomatonEdit::AddEdge {
            from: "q1".into(),
            to: "q2".into(),
            edge: Edge::finite(1, "a"),
        })
        .unwrap();
        a.execute(AutomatonEdit::AddEdge {
            from: "q0".into(),
            to: "q0".into(),
            edge: Edge::finite(2, "b"),
        })
        .unwrap();
        a
    }

    #[test]
    fn closure_follows_only_epsilon_edges() {
        let a = with_epsilon();
        let closure = epsilon_closure(a.data(), &"q0".to_string());
        assert_eq!(
            closure.iter().cloned().collect::<Vec<_>>(),
            vec!["q0".to_string(), "q1".to_string()]
        );
        let closure = epsilon_closure(a.data(), &"q2".to_string());
        assert_eq!(closure.len(), 1);
    }

    #[test]
    fn elimination_removes_epsilon_and_adds_direct_edges() {
        let a = with_epsilon();
        let mut t = remove_epsilon_transitions(&a);
        t.transform();
        let result = t.output().as_automaton().unwrap();

        assert!(!result.data().has_epsilon_edges());
        // the ε-detour q0 --ε--> q1 --a--> q2 became a direct edge
        assert!(result
            .data()
            .edges_between("q0", "q2")
            .iter()
            .any(|e| e.input_char() == "a"));
        // the original a-edge is still there
        assert!(result
            .data()
            .edges_between("q1", "q2")
            .iter()
            .any(|e| e.input_char() == "a"));
        // q0 is not final: its closure contains no final state
        assert!(!result.data().is_final("q0"));

        // language is preserved
        assert!(result.contains_word(&sym_word("a")));
        assert!(result.contains_word(&sym_word("ba")));
        assert!(!result.contains_word(&sym_word("b")));

        // the input automaton itself is untouched
        assert!(a.data().has_epsilon_edges());
    }

    #[test]
    fn final_flags_propagate_through_closures() {
        let mut a = Automaton::finite("q0");
        a.execute(AutomatonEdit::AddState { id: "q1".into() }).unwrap();
        a.execute(AutomatonEdit::SetFinal {
            id: "q1".into(),
            is_final: true,
        })
        .unwrap();
        a.execute(AutomatonEdit::AddEdge {
            from: "q0".into(),
            to: "q1".into(),
            edge: Edge::epsilon(0),
        })
        .unwrap();
        let mut t = remove_epsilon_transitions(&a);
        t.transform();
        assert!(t.output().as_automaton().unwrap().data().is_final("q0"));
    }

    #[test]
    fn elimination_is_idempotent() {
        let a = with_epsilon();
        let mut first = remove_epsilon_transitions(&a);
        first.transform();
        let Artifact::Automaton(result) = first.into_output(true).unwrap() else {
            unreachable!()
        };
        let second = remove_epsilon_transitions(&result);
        assert_eq!(second.steps().len(), 0);
    }
}
