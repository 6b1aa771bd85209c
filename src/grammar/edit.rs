//! The grammar command set, following the same validate-snapshot-mutate
//! discipline as the automaton commands.

use super::{GrammarData, GrammarType, ProductionRule};
use crate::{EngineError, Symbol};

/// A single edit command on a grammar. Doubles as the event payload
/// mirrored to renderers after execution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GrammarEdit {
    /// Adds a batch of nonterminals; fails as a whole if any symbol is
    /// already declared.
    AddNonterminals {
        /// The new nonterminals, in order.
        symbols: Vec<Symbol>,
    },
    /// Adds a batch of terminals; fails as a whole if any symbol is
    /// already declared.
    AddTerminals {
        /// The new terminals, in order.
        symbols: Vec<Symbol>,
    },
    /// Removes a nonterminal. The initial nonterminal is protected.
    RemoveNonterminal {
        /// The nonterminal to remove.
        symbol: Symbol,
    },
    /// Removes a terminal.
    RemoveTerminal {
        /// The terminal to remove.
        symbol: Symbol,
    },
    /// Overwrites the start symbol.
    SetInitialNonterminal {
        /// The new start symbol; must be a declared nonterminal.
        symbol: Symbol,
    },
    /// Appends a production rule.
    AddProductionRule {
        /// The rule, including its fresh id.
        rule: ProductionRule,
    },
    /// Replaces the rule with the given id in place. The rule keeps its id.
    EditProductionRule {
        /// Id of the rule to replace.
        rule_id: usize,
        /// The replacement rule.
        rule: ProductionRule,
    },
    /// Removes the rule with the given id.
    RemoveProductionRule {
        /// Id of the rule to remove.
        rule_id: usize,
    },
}

impl GrammarEdit {
    pub(super) fn validate(&self, data: &GrammarData) -> Result<(), EngineError> {
        match self {
            GrammarEdit::AddNonterminals { symbols } | GrammarEdit::AddTerminals { symbols } => {
                for (i, symbol) in symbols.iter().enumerate() {
                    if data.knows_symbol(symbol) || symbols[..i].contains(symbol) {
                        return Err(EngineError::SymbolExists(symbol.clone()));
                    }
                }
                Ok(())
            }
            GrammarEdit::RemoveNonterminal { symbol } => {
                if !data.is_non_terminal(symbol) {
                    return Err(EngineError::UnknownSymbol(symbol.clone()));
                }
                if symbol == &data.initial_non_terminal_symbol {
                    return Err(EngineError::RemoveInitialNonterminal(symbol.clone()));
                }
                Ok(())
            }
            GrammarEdit::RemoveTerminal { symbol } => {
                if !data.is_terminal(symbol) {
                    return Err(EngineError::UnknownSymbol(symbol.clone()));
                }
                Ok(())
            }
            GrammarEdit::SetInitialNonterminal { symbol } => {
                if !data.is_non_terminal(symbol) {
                    return Err(EngineError::NotANonterminal(symbol.clone()));
                }
                Ok(())
            }
            GrammarEdit::AddProductionRule { rule } => {
                validate_rule(data, rule)?;
                if data
                    .production_rules
                    .iter()
                    .any(|existing| existing.same_production(rule))
                {
                    return Err(EngineError::DuplicateRule);
                }
                Ok(())
            }
            GrammarEdit::EditProductionRule { rule_id, rule } => {
                let idx = data
                    .find_rule(*rule_id)
                    .ok_or(EngineError::UnknownRule(*rule_id))?;
                validate_rule(data, rule)?;
                if data
                    .production_rules
                    .iter()
                    .enumerate()
                    .any(|(i, existing)| i != idx && existing.same_production(rule))
                {
                    return Err(EngineError::DuplicateRule);
                }
                Ok(())
            }
            GrammarEdit::RemoveProductionRule { rule_id } => {
                data.find_rule(*rule_id)
                    .map(|_| ())
                    .ok_or(EngineError::UnknownRule(*rule_id))
            }
        }
    }

    pub(super) fn apply(&self, data: &mut GrammarData) {
        match self {
            GrammarEdit::AddNonterminals { symbols } => {
                data.non_terminal_symbols.extend(symbols.iter().cloned());
            }
            GrammarEdit::AddTerminals { symbols } => {
                data.terminal_symbols.extend(symbols.iter().cloned());
            }
            GrammarEdit::RemoveNonterminal { symbol } => {
                data.non_terminal_symbols.shift_remove(symbol);
            }
            GrammarEdit::RemoveTerminal { symbol } => {
                data.terminal_symbols.shift_remove(symbol);
            }
            GrammarEdit::SetInitialNonterminal { symbol } => {
                data.initial_non_terminal_symbol = symbol.clone();
            }
            GrammarEdit::AddProductionRule { rule } => {
                data.production_rules.push(rule.clone());
            }
            GrammarEdit::EditProductionRule { rule_id, rule } => {
                let idx = data
                    .find_rule(*rule_id)
                    .expect("validated rule must exist");
                let mut replacement = rule.clone();
                replacement.id = *rule_id;
                data.production_rules[idx] = replacement;
            }
            GrammarEdit::RemoveProductionRule { rule_id } => {
                let idx = data
                    .find_rule(*rule_id)
                    .expect("validated rule must exist");
                data.production_rules.remove(idx);
            }
        }
    }
}

fn validate_rule(data: &GrammarData, rule: &ProductionRule) -> Result<(), EngineError> {
    if !data.is_non_terminal(rule.input_non_terminal()) {
        return Err(EngineError::NotANonterminal(
            rule.input_non_terminal().clone(),
        ));
    }
    for symbol in rule.output_symbols() {
        if !data.knows_symbol(symbol) {
            return Err(EngineError::UnknownSymbol(symbol.clone()));
        }
    }
    if data.grammar_type() == GrammarType::Regular && !data.regular_shape(rule) {
        return Err(EngineError::IrregularRule);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Grammar;

    fn sample() -> Grammar {
        let mut g = Grammar::regular("S");
        g.execute(GrammarEdit::AddNonterminals {
            symbols: vec!["A".into()],
        })
        .unwrap();
        g.execute(GrammarEdit::AddTerminals {
            symbols: vec!["a".into(), "b".into()],
        })
        .unwrap();
        g.execute(GrammarEdit::AddProductionRule {
            rule: ProductionRule::new(0, "S", ["a", "A"]),
        })
        .unwrap();
        g
    }

    #[test]
    fn batch_alphabet_edit_is_all_or_nothing() {
        let mut g = sample();
        let before = g.data().clone();
        assert_eq!(
            g.execute(GrammarEdit::AddTerminals {
                symbols: vec!["c".into(), "a".into()],
            }),
            Err(EngineError::SymbolExists("a".into()))
        );
        // terminal colliding with a nonterminal is just as bad
        assert_eq!(
            g.execute(GrammarEdit::AddTerminals {
                symbols: vec!["A".into()],
            }),
            Err(EngineError::SymbolExists("A".into()))
        );
        assert_eq!(g.data(), &before);
    }

    #[test]
    fn structurally_duplicate_rule_is_rejected() {
        let mut g = sample();
        assert_eq!(
            g.execute(GrammarEdit::AddProductionRule {
                rule: ProductionRule::new(17, "S", ["a", "A"]),
            }),
            Err(EngineError::DuplicateRule)
        );
        assert_eq!(g.data().production_rules().len(), 1);
    }

    #[test]
    fn irregular_rule_is_rejected_for_regular_grammars() {
        let mut g = sample();
        // nonterminal in non-trailing position
        assert_eq!(
            g.execute(GrammarEdit::AddProductionRule {
                rule: ProductionRule::new(1, "S", ["A", "a"]),
            }),
            Err(EngineError::IrregularRule)
        );
        // long right-hand sides with a trailing nonterminal are fine
        g.execute(GrammarEdit::AddProductionRule {
            rule: ProductionRule::new(1, "S", ["a", "b", "A"]),
        })
        .unwrap();

        let mut cf = Grammar::context_free("S");
        cf.execute(GrammarEdit::AddNonterminals {
            symbols: vec!["A".into()],
        })
        .unwrap();
        cf.execute(GrammarEdit::AddTerminals {
            symbols: vec!["a".into()],
        })
        .unwrap();
        cf.execute(GrammarEdit::AddProductionRule {
            rule: ProductionRule::new(0, "S", ["A", "a"]),
        })
        .unwrap();
    }

    #[test]
    fn rules_must_reference_declared_symbols() {
        let mut g = sample();
        assert_eq!(
            g.execute(GrammarEdit::AddProductionRule {
                rule: ProductionRule::new(1, "S", ["x"]),
            }),
            Err(EngineError::UnknownSymbol("x".into()))
        );
        assert_eq!(
            g.execute(GrammarEdit::AddProductionRule {
                rule: ProductionRule::new(1, "a", ["a"]),
            }),
            Err(EngineError::NotANonterminal("a".into()))
        );
    }

    #[test]
    fn initial_nonterminal_is_protected() {
        let mut g = sample();
        assert_eq!(
            g.execute(GrammarEdit::RemoveNonterminal {
                symbol: "S".into()
            }),
            Err(EngineError::RemoveInitialNonterminal("S".into()))
        );
        g.execute(GrammarEdit::SetInitialNonterminal {
            symbol: "A".into(),
        })
        .unwrap();
        g.execute(GrammarEdit::RemoveNonterminal {
            symbol: "S".into(),
        })
        .unwrap();
        assert!(!g.data().is_non_terminal("S"));
    }

    #[test]
    fn edit_rule_keeps_id_and_position() {
        let mut g = sample();
        g.execute(GrammarEdit::AddProductionRule {
            rule: ProductionRule::new(1, "A", ["b"]),
        })
        .unwrap();
        g.execute(GrammarEdit::EditProductionRule {
            rule_id: 0,
            rule: ProductionRule::new(99, "S", ["b", "A"]),
        })
        .unwrap();
        let rules = g.data().production_rules();
        assert_eq!(rules[0].id(), 0);
        assert_eq!(rules[0].output_symbols(), ["b", "A"]);
        assert_eq!(rules[1].id(), 1);
    }

    #[test]
    fn undo_restores_exact_pre_edit_data() {
        let mut g = sample();
        let before = g.data().clone();
        g.execute(GrammarEdit::RemoveProductionRule { rule_id: 0 }).unwrap();
        g.execute(GrammarEdit::AddNonterminals {
            symbols: vec!["B".into()],
        })
        .unwrap();
        g.undo().unwrap();
        g.undo().unwrap();
        assert_eq!(g.data(), &before);
        assert_eq!(g.undo(), Err(EngineError::NothingToUndo));
    }
}
