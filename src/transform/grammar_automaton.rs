//! Translation between finite automata and regular grammars.

use itertools::Itertools;
use tracing::debug;

use crate::{
    automaton::{Automaton, AutomatonEdit, AutomatonType},
    edge::Edge,
    grammar::{Grammar, GrammarEdit, GrammarType, ProductionRule},
    Symbol,
};

use super::{Artifact, TransformStep, Transformation};

/// Precomputes the translation of a finite automaton into a regular
/// grammar: one nonterminal per state (the start symbol is the initial
/// state), one production `p -> a q` per edge (`p -> q` for ε-edges), and
/// one ε-production per final state.
///
/// # Panics
///
/// Panics when the input is not a finite automaton.
pub fn automaton_to_grammar(input: &Automaton) -> Transformation {
    let data = input.data();
    assert_eq!(
        data.automaton_type(),
        AutomatonType::Finite,
        "grammar translation requires a finite automaton"
    );

    let output = Grammar::regular(data.initial_state_id().clone());
    let mut steps = Vec::new();
    let mut next_rule_id = 0;

    let nonterminals = data
        .states()
        .iter()
        .filter(|q| *q != data.initial_state_id())
        .cloned()
        .collect_vec();
    if !nonterminals.is_empty() {
        steps.push(TransformStep::new(
            data.states().iter().cloned(),
            GrammarEdit::AddNonterminals {
                symbols: nonterminals,
            },
        ));
    }
    let terminals = data.alphabet();
    if !terminals.is_empty() {
        steps.push(TransformStep::new(
            Vec::<String>::new(),
            GrammarEdit::AddTerminals { symbols: terminals },
        ));
    }

    for (from, to, edge) in data.edges() {
        let output_symbols = if edge.is_epsilon() {
            vec![to.clone()]
        } else {
            vec![edge.input_char().clone(), to.clone()]
        };
        steps.push(TransformStep::new(
            [from.clone(), to.clone()],
            GrammarEdit::AddProductionRule {
                rule: ProductionRule::new(next_rule_id, from.clone(), output_symbols),
            },
        ));
        next_rule_id += 1;
    }
    for f in data.final_state_ids() {
        steps.push(TransformStep::new(
            [f.clone()],
            GrammarEdit::AddProductionRule {
                rule: ProductionRule::new(next_rule_id, f.clone(), Vec::<Symbol>::new()),
            },
        ));
        next_rule_id += 1;
    }

    debug!(rules = next_rule_id, "translated automaton to grammar");
    Transformation::new(Artifact::Grammar(output), steps)
}

/// Precomputes the translation of a regular grammar in 2-symbol normal form
/// into a finite automaton: one state per nonterminal plus a synthetic
/// accepting state `fin`; `A -> aB` becomes `A --a--> B`, `A -> B` an
/// ε-edge, `A -> a` an edge into `fin`, and an ε-production marks its
/// left-hand side final.
///
/// # Panics
///
/// Panics when the input is not a regular grammar or some rule is not in
/// normal form (run the normal-form factoring first).
pub fn grammar_to_automaton(input: &Grammar) -> Transformation {
    let data = input.data();
    assert_eq!(
        data.grammar_type(),
        GrammarType::Regular,
        "automaton translation requires a regular grammar"
    );
    assert!(
        data.production_rules()
            .iter()
            .all(|rule| data.in_normal_form(rule)),
        "automaton translation requires the grammar to be in normal form"
    );

    let mut fin = String::from("fin");
    while data.knows_symbol(&fin) {
        fin.push('\'');
    }

    let output = Automaton::finite(data.initial_non_terminal_symbol().clone());
    let mut steps = Vec::new();
    let mut next_edge_id = 0;

    for nt in data.non_terminal_symbols() {
        if nt == data.initial_non_terminal_symbol() {
            continue;
        }
        steps.push(TransformStep::new(
            [nt.clone()],
            AutomatonEdit::AddState { id: nt.clone() },
        ));
    }
    steps.push(TransformStep::new(
        [fin.clone()],
        AutomatonEdit::AddState { id: fin.clone() },
    ));
    steps.push(TransformStep::new(
        [fin.clone()],
        AutomatonEdit::SetFinal {
            id: fin.clone(),
            is_final: true,
        },
    ));

    for rule in data.production_rules() {
        let lhs = rule.input_non_terminal().clone();
        let edit = match rule.output_symbols() {
            [] => AutomatonEdit::SetFinal {
                id: lhs.clone(),
                is_final: true,
            },
            [single] if data.is_non_terminal(single) => AutomatonEdit::AddEdge {
                from: lhs.clone(),
                to: single.clone(),
                edge: Edge::epsilon(next_edge_id),
            },
            [single] => AutomatonEdit::AddEdge {
                from: lhs.clone(),
                to: fin.clone(),
                edge: Edge::finite(next_edge_id, single.clone()),
            },
            [a, b] => AutomatonEdit::AddEdge {
                from: lhs.clone(),
                to: b.clone(),
                edge: Edge::finite(next_edge_id, a.clone()),
            },
            _ => unreachable!("normal form admits at most two symbols"),
        };
        if matches!(edit, AutomatonEdit::AddEdge { .. }) {
            next_edge_id += 1;
        }
        steps.push(TransformStep::new([lhs], edit));
    }

    Transformation::new(Artifact::Automaton(output), steps)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::transform::to_normal_form;

    fn word(w: &str) -> Vec<Symbol> {
        w.chars().map(|c| c.to_string()).collect()
    }

    /// Accepts a(b)*.
    fn ab_star() -> Automaton {
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
            edge: Edge::finite(0, "a"),
        })
        .unwrap();
        a.execute(AutomatonEdit::AddEdge {
            from: "q1".into(),
            to: "q1".into(),
            edge: Edge::finite(1, "b"),
        })
        .unwrap();
        a
    }

    #[test]
    fn automaton_becomes_the_expected_grammar() {
        let mut t = automaton_to_grammar(&ab_star());
        t.transform();
        let grammar = t.output().as_grammar().unwrap().data();

        assert_eq!(grammar.grammar_type(), GrammarType::Regular);
        assert_eq!(grammar.initial_non_terminal_symbol(), "q0");
        assert!(grammar.is_non_terminal("q1"));
        assert!(grammar.is_terminal("a") && grammar.is_terminal("b"));

        let rendered = grammar
            .production_rules()
            .iter()
            .map(ToString::to_string)
            .collect_vec();
        assert_eq!(rendered, ["q0 -> a q1", "q1 -> b q1", "q1 -> ε"]);
    }

    #[test]
    fn grammar_becomes_the_expected_automaton() {
        let mut g = Grammar::regular("S");
        g.execute(GrammarEdit::AddNonterminals {
            symbols: vec!["A".into()],
        })
        .unwrap();
        g.execute(GrammarEdit::AddTerminals {
            symbols: vec!["a".into(), "b".into()],
        })
        .unwrap();
        for (id, lhs, rhs) in [
            (0, "S", vec!["a", "A"]),
            (1, "A", vec!["b", "A"]),
            (2, "A", vec![]),
            (3, "S", vec!["b"]),
            (4, "A", vec!["S"]),
        ] {
            g.execute(GrammarEdit::AddProductionRule {
                rule: ProductionRule::new(id, lhs, rhs),
            })
            .unwrap();
        }

        let mut t = grammar_to_automaton(&g);
        t.transform();
        let automaton = t.output().as_automaton().unwrap().data();

        assert_eq!(automaton.initial_state_id(), "S");
        assert!(automaton.states().contains("fin"));
        assert!(automaton.is_final("fin") && automaton.is_final("A"));
        assert!(automaton
            .edges_between("S", "A")
            .iter()
            .any(|e| e.input_char() == "a"));
        assert!(automaton
            .edges_between("S", "fin")
            .iter()
            .any(|e| e.input_char() == "b"));
        assert!(automaton
            .edges_between("A", "S")
            .iter()
            .any(|e| e.is_epsilon()));
    }

    #[test]
    fn synthetic_accepting_state_avoids_collisions() {
        let mut g = Grammar::regular("fin");
        g.execute(GrammarEdit::AddTerminals {
            symbols: vec!["a".into()],
        })
        .unwrap();
        g.execute(GrammarEdit::AddProductionRule {
            rule: ProductionRule::new(0, "fin", ["a"]),
        })
        .unwrap();
        let mut t = grammar_to_automaton(&g);
        t.transform();
        let automaton = t.output().as_automaton().unwrap().data();
        assert!(automaton.states().contains("fin'"));
        assert!(automaton
            .edges_between("fin", "fin'")
            .iter()
            .any(|e| e.input_char() == "a"));
    }

    #[test]
    #[should_panic(expected = "normal form")]
    fn long_rules_are_rejected() {
        let mut g = Grammar::regular("S");
        g.execute(GrammarEdit::AddTerminals {
            symbols: vec!["a".into(), "b".into(), "c".into()],
        })
        .unwrap();
        g.execute(GrammarEdit::AddProductionRule {
            rule: ProductionRule::new(0, "S", ["a", "b", "c", "S"]),
        })
        .unwrap();
        grammar_to_automaton(&g);
    }

    #[test]
    fn round_trip_preserves_the_language() {
        let original = ab_star();

        let mut to_grammar = automaton_to_grammar(&original);
        to_grammar.transform();
        let Artifact::Grammar(grammar) = to_grammar.into_output(true).unwrap() else {
            unreachable!()
        };

        let mut factor = to_normal_form(&grammar);
        factor.transform();
        let Artifact::Grammar(normal) = factor.into_output(true).unwrap() else {
            unreachable!()
        };

        let mut back = grammar_to_automaton(&normal);
        back.transform();
        let Artifact::Automaton(result) = back.into_output(true).unwrap() else {
            unreachable!()
        };

        for w in ["a", "ab", "abbb"] {
            assert!(original.contains_word(&word(w)), "original {w:?}");
            assert!(result.contains_word(&word(w)), "round trip {w:?}");
        }
        for w in ["", "b", "ba", "aab", "aba"] {
            assert!(!original.contains_word(&word(w)), "original {w:?}");
            assert!(!result.contains_word(&word(w)), "round trip {w:?}");
        }
    }
}
