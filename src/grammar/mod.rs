//! Regular and context-free grammars with command-based mutation and undo.

mod edit;
pub use edit::GrammarEdit;

use std::collections::VecDeque;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{EditEvent, EngineError, Symbol};

/// The kind of a grammar, fixed at construction time.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrammarType {
    /// Right-hand sides are restricted to terminals followed by at most one
    /// trailing nonterminal.
    Regular,
    /// No restriction on right-hand sides.
    ContextFree,
}

/// A rewrite rule `inputNonTerminal -> outputSymbols`. An empty right-hand
/// side denotes an ε-production.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionRule {
    id: usize,
    input_non_terminal: Symbol,
    output_symbols: Vec<Symbol>,
}

impl ProductionRule {
    /// Creates a rule with the given id, left-hand side and right-hand side.
    pub fn new(
        id: usize,
        input_non_terminal: impl Into<Symbol>,
        output_symbols: impl IntoIterator<Item = impl Into<Symbol>>,
    ) -> Self {
        Self {
            id,
            input_non_terminal: input_non_terminal.into(),
            output_symbols: output_symbols.into_iter().map(Into::into).collect(),
        }
    }

    /// The stable handle of this rule.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The left-hand side nonterminal.
    pub fn input_non_terminal(&self) -> &Symbol {
        &self.input_non_terminal
    }

    /// The right-hand side, in order.
    pub fn output_symbols(&self) -> &[Symbol] {
        &self.output_symbols
    }

    /// Structural rule equality: same left-hand side and same right-hand
    /// side sequence, ignoring ids. This is the de-duplication rule applied
    /// when adding rules.
    pub fn same_production(&self, other: &ProductionRule) -> bool {
        self.input_non_terminal == other.input_non_terminal
            && self.output_symbols == other.output_symbols
    }
}

impl std::fmt::Display for ProductionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.output_symbols.is_empty() {
            write!(f, "{} -> {}", self.input_non_terminal, crate::EPSILON)
        } else {
            write!(
                f,
                "{} -> {}",
                self.input_non_terminal,
                self.output_symbols.join(" ")
            )
        }
    }
}

/// The serializable core of a grammar; command history is never part of it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarData {
    grammar_type: GrammarType,
    non_terminal_symbols: IndexSet<Symbol>,
    terminal_symbols: IndexSet<Symbol>,
    initial_non_terminal_symbol: Symbol,
    production_rules: Vec<ProductionRule>,
}

impl GrammarData {
    fn new(grammar_type: GrammarType, initial: Symbol) -> Self {
        Self {
            grammar_type,
            non_terminal_symbols: IndexSet::from_iter([initial.clone()]),
            terminal_symbols: IndexSet::new(),
            initial_non_terminal_symbol: initial,
            production_rules: Vec::new(),
        }
    }

    /// The kind of this grammar.
    pub fn grammar_type(&self) -> GrammarType {
        self.grammar_type
    }

    /// The nonterminal alphabet, in insertion order.
    pub fn non_terminal_symbols(&self) -> &IndexSet<Symbol> {
        &self.non_terminal_symbols
    }

    /// The terminal alphabet, in insertion order.
    pub fn terminal_symbols(&self) -> &IndexSet<Symbol> {
        &self.terminal_symbols
    }

    /// The start symbol.
    pub fn initial_non_terminal_symbol(&self) -> &Symbol {
        &self.initial_non_terminal_symbol
    }

    /// The production rules, in insertion order.
    pub fn production_rules(&self) -> &[ProductionRule] {
        &self.production_rules
    }

    /// Whether the symbol is a declared nonterminal.
    pub fn is_non_terminal(&self, symbol: &str) -> bool {
        self.non_terminal_symbols.contains(symbol)
    }

    /// Whether the symbol is a declared terminal.
    pub fn is_terminal(&self, symbol: &str) -> bool {
        self.terminal_symbols.contains(symbol)
    }

    /// Whether the symbol is declared at all. Terminals and nonterminals
    /// share one namespace.
    pub fn knows_symbol(&self, symbol: &str) -> bool {
        self.is_non_terminal(symbol) || self.is_terminal(symbol)
    }

    /// Position of the rule with the given id.
    pub fn find_rule(&self, id: usize) -> Option<usize> {
        self.production_rules.iter().position(|r| r.id() == id)
    }

    /// The largest rule id in use, for allocating fresh ids.
    pub fn max_rule_id(&self) -> Option<usize> {
        self.production_rules.iter().map(ProductionRule::id).max()
    }

    /// Whether the rule's right-hand side satisfies the regular-grammar
    /// shape: zero or more terminals followed by at most one trailing
    /// nonterminal.
    pub fn regular_shape(&self, rule: &ProductionRule) -> bool {
        let symbols = rule.output_symbols();
        symbols.iter().enumerate().all(|(i, s)| {
            self.is_terminal(s) || (i == symbols.len() - 1 && self.is_non_terminal(s))
        })
    }

    /// Whether the rule is in the 2-symbol normal form enabling direct
    /// automaton translation: at most two symbols, and a two-symbol side is
    /// a terminal followed by a nonterminal.
    pub fn in_normal_form(&self, rule: &ProductionRule) -> bool {
        match rule.output_symbols() {
            [] => true,
            [_] => true,
            [a, b] => self.is_terminal(a) && self.is_non_terminal(b),
            _ => false,
        }
    }
}

#[derive(Clone, Debug)]
struct GrammarCommand {
    edit: GrammarEdit,
    backup: GrammarData,
}

/// A grammar entity: the serializable [`GrammarData`] core plus the LIFO
/// command history and renderer event queue, with the same execution
/// discipline as [`crate::Automaton`].
#[derive(Clone, Debug)]
pub struct Grammar {
    data: GrammarData,
    history: Vec<GrammarCommand>,
    events: VecDeque<EditEvent<GrammarEdit>>,
}

impl Grammar {
    /// Creates a regular grammar with the given start symbol.
    pub fn regular(initial: impl Into<Symbol>) -> Self {
        Self::from_data(GrammarData::new(GrammarType::Regular, initial.into()))
    }

    /// Creates a context-free grammar with the given start symbol.
    pub fn context_free(initial: impl Into<Symbol>) -> Self {
        Self::from_data(GrammarData::new(GrammarType::ContextFree, initial.into()))
    }

    /// Wraps imported data in a fresh entity with empty history.
    pub fn from_data(data: GrammarData) -> Self {
        Self {
            data,
            history: Vec::new(),
            events: VecDeque::new(),
        }
    }

    /// Read access to the data core.
    pub fn data(&self) -> &GrammarData {
        &self.data
    }

    /// Discards history and events, yielding the bare data core.
    pub fn into_data(self) -> GrammarData {
        self.data
    }

    /// Validates and executes an edit; see [`crate::Automaton::execute`].
    pub fn execute(&mut self, edit: GrammarEdit) -> Result<(), EngineError> {
        edit.validate(&self.data)?;
        let backup = self.data.clone();
        edit.apply(&mut self.data);
        trace!(edit = ?edit, "applied grammar edit");
        self.events.push_back(EditEvent::Applied(edit.clone()));
        self.history.push(GrammarCommand { edit, backup });
        Ok(())
    }

    /// Pops the most recent command and restores the snapshot it carries.
    pub fn undo(&mut self) -> Result<(), EngineError> {
        let GrammarCommand { edit, backup } = self
            .history
            .pop()
            .ok_or(EngineError::NothingToUndo)?;
        self.data = backup;
        trace!(edit = ?edit, "undid grammar edit");
        self.events.push_back(EditEvent::Undone(edit));
        Ok(())
    }

    /// Number of commands on the undo stack.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Drains the pending edit events for the renderer.
    pub fn drain_events(&mut self) -> Vec<EditEvent<GrammarEdit>> {
        self.events.drain(..).collect()
    }
}
