//! Left-factoring of regular grammars into 2-symbol normal form.

use tracing::debug;

use crate::{
    grammar::{Grammar, GrammarData, GrammarEdit, GrammarType, ProductionRule},
    Set, Symbol,
};

use super::{Artifact, TransformStep, Transformation};

/// Whether a right-hand side suffix already fits the normal form, so the
/// factoring chain can stop.
fn fits(data: &GrammarData, suffix: &[Symbol]) -> bool {
    match suffix {
        [] | [_] => true,
        [a, b] => data.is_terminal(a) && data.is_non_terminal(b),
        _ => false,
    }
}

/// Precomputes the factoring of every rule whose right-hand side is longer
/// than two symbols (or exactly two with a terminal in final position) into
/// a chain of normal-form rules, introducing fresh `ψ<ruleIndex>,<position>`
/// nonterminals. Grammars already in normal form produce zero steps.
///
/// The transformation operates on a copy of the input grammar.
///
/// # Panics
///
/// Panics when the input is not a regular grammar.
pub fn to_normal_form(input: &Grammar) -> Transformation {
    let data = input.data();
    assert_eq!(
        data.grammar_type(),
        GrammarType::Regular,
        "normal-form factoring requires a regular grammar"
    );

    let mut steps = Vec::new();
    let mut next_rule_id = data.max_rule_id().map_or(0, |id| id + 1);
    let mut taken: Set<Symbol> = data
        .non_terminal_symbols()
        .iter()
        .chain(data.terminal_symbols())
        .cloned()
        .collect();

    for (index, rule) in data.production_rules().iter().enumerate() {
        if data.in_normal_form(rule) {
            continue;
        }

        let symbols = rule.output_symbols();
        let mut fresh = Vec::new();
        let mut chain: Vec<(Symbol, Vec<Symbol>)> = Vec::new();
        let mut head = rule.input_non_terminal().clone();
        let mut position = 0;
        while !fits(data, &symbols[position..]) {
            let mut name = format!("ψ{index},{}", position + 1);
            while taken.contains(&name) {
                name.push('\'');
            }
            taken.insert(name.clone());
            chain.push((head, vec![symbols[position].clone(), name.clone()]));
            fresh.push(name.clone());
            head = name;
            position += 1;
        }
        chain.push((head, symbols[position..].to_vec()));

        let mut highlights = vec![rule.input_non_terminal().clone()];
        highlights.extend(fresh.iter().cloned());

        steps.push(TransformStep::new(
            highlights.clone(),
            GrammarEdit::AddNonterminals { symbols: fresh },
        ));
        steps.push(TransformStep::new(
            highlights.clone(),
            GrammarEdit::RemoveProductionRule { rule_id: rule.id() },
        ));
        for (lhs, rhs) in chain {
            steps.push(TransformStep::new(
                highlights.clone(),
                GrammarEdit::AddProductionRule {
                    rule: ProductionRule::new(next_rule_id, lhs, rhs),
                },
            ));
            next_rule_id += 1;
        }
    }

    debug!(steps = steps.len(), "precomputed normal-form factoring");
    Transformation::new(
        Artifact::Grammar(Grammar::from_data(data.clone())),
        steps,
    )
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use pretty_assertions::assert_eq;

    use super::*;

    fn wide_grammar() -> Grammar {
        let mut g = Grammar::regular("S");
        g.execute(GrammarEdit::AddNonterminals {
            symbols: vec!["A".into()],
        })
        .unwrap();
        g.execute(GrammarEdit::AddTerminals {
            symbols: vec!["a".into(), "b".into(), "c".into()],
        })
        .unwrap();
        for (id, lhs, rhs) in [
            (0, "S", vec!["a", "b", "c", "A"]),
            (1, "A", vec!["a", "b"]),
            (2, "A", vec!["c", "A"]),
        ] {
            g.execute(GrammarEdit::AddProductionRule {
                rule: ProductionRule::new(id, lhs, rhs),
            })
            .unwrap();
        }
        g
    }

    #[test]
    fn long_rules_are_left_factored() {
        let mut t = to_normal_form(&wide_grammar());
        t.transform();
        let result = t.output().as_grammar().unwrap().data();

        let rendered = result
            .production_rules()
            .iter()
            .map(ToString::to_string)
            .sorted()
            .collect_vec();
        assert_eq!(
            rendered,
            [
                "A -> a ψ1,1",
                "A -> c A",
                "S -> a ψ0,1",
                "ψ0,1 -> b ψ0,2",
                "ψ0,2 -> c A",
                "ψ1,1 -> b",
            ]
        );
        assert!(result
            .production_rules()
            .iter()
            .all(|rule| result.in_normal_form(rule)));
    }

    #[test]
    fn grammars_in_normal_form_are_untouched() {
        let mut g = Grammar::regular("S");
        g.execute(GrammarEdit::AddTerminals {
            symbols: vec!["a".into()],
        })
        .unwrap();
        g.execute(GrammarEdit::AddProductionRule {
            rule: ProductionRule::new(0, "S", ["a", "S"]),
        })
        .unwrap();
        g.execute(GrammarEdit::AddProductionRule {
            rule: ProductionRule::new(1, "S", Vec::<Symbol>::new()),
        })
        .unwrap();
        assert_eq!(to_normal_form(&g).steps().len(), 0);
    }

    #[test]
    fn factoring_twice_is_idempotent() {
        let mut first = to_normal_form(&wide_grammar());
        first.transform();
        let Artifact::Grammar(result) = first.into_output(true).unwrap() else {
            unreachable!()
        };
        assert_eq!(to_normal_form(&result).steps().len(), 0);
    }
}
