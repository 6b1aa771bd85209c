//! Transition labels.

use serde::{Deserialize, Serialize};

use crate::{Symbol, EPSILON};

/// Identifier of an edge, unique within one automaton. Ids only serve as
/// stable handles for renderers and edit commands; label equality ignores
/// them.
pub type EdgeId = usize;

/// A transition label. Finite-automaton edges carry a single input symbol,
/// pushdown edges additionally read one stack symbol and write a stack word.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Edge {
    /// Label of a finite-automaton transition.
    #[serde(rename_all = "camelCase")]
    Finite {
        /// Stable handle of this edge.
        id: EdgeId,
        /// Input symbol consumed when the edge is taken ([`EPSILON`] for
        /// ε-transitions).
        input_char: Symbol,
    },
    /// Label of a pushdown-automaton transition.
    #[serde(rename_all = "camelCase")]
    Pda {
        /// Stable handle of this edge.
        id: EdgeId,
        /// Input symbol consumed when the edge is taken.
        input_char: Symbol,
        /// Stack symbol that must be on top for the edge to fire; popped on
        /// traversal. [`EPSILON`] matches without popping.
        read_stack_char: Symbol,
        /// Word pushed onto the stack on traversal, first symbol deepest.
        write_stack_word: Vec<Symbol>,
    },
}

impl Edge {
    /// Creates a finite-automaton edge label.
    pub fn finite(id: EdgeId, input_char: impl Into<Symbol>) -> Self {
        Edge::Finite {
            id,
            input_char: input_char.into(),
        }
    }

    /// Creates an ε-labeled finite-automaton edge.
    pub fn epsilon(id: EdgeId) -> Self {
        Edge::finite(id, EPSILON)
    }

    /// Creates a pushdown-automaton edge label.
    pub fn pda(
        id: EdgeId,
        input_char: impl Into<Symbol>,
        read_stack_char: impl Into<Symbol>,
        write_stack_word: impl IntoIterator<Item = impl Into<Symbol>>,
    ) -> Self {
        Edge::Pda {
            id,
            input_char: input_char.into(),
            read_stack_char: read_stack_char.into(),
            write_stack_word: write_stack_word.into_iter().map(Into::into).collect(),
        }
    }

    /// The stable handle of this edge.
    pub fn id(&self) -> EdgeId {
        match self {
            Edge::Finite { id, .. } | Edge::Pda { id, .. } => *id,
        }
    }

    /// The input symbol this edge consumes.
    pub fn input_char(&self) -> &Symbol {
        match self {
            Edge::Finite { input_char, .. } | Edge::Pda { input_char, .. } => input_char,
        }
    }

    /// Whether this edge consumes no input.
    pub fn is_epsilon(&self) -> bool {
        self.input_char() == EPSILON
    }

    /// Whether this is a pushdown edge.
    pub fn is_pda(&self) -> bool {
        matches!(self, Edge::Pda { .. })
    }

    /// Structural label equality, ignoring ids. Two edges with equal labels
    /// denote the same transition even when their ids differ; this is the
    /// de-duplication rule applied when adding edges.
    pub fn same_label(&self, other: &Edge) -> bool {
        match (self, other) {
            (
                Edge::Finite { input_char: a, .. },
                Edge::Finite { input_char: b, .. },
            ) => a == b,
            (
                Edge::Pda {
                    input_char: a,
                    read_stack_char: ra,
                    write_stack_word: wa,
                    ..
                },
                Edge::Pda {
                    input_char: b,
                    read_stack_char: rb,
                    write_stack_word: wb,
                    ..
                },
            ) => a == b && ra == rb && wa == wb,
            _ => false,
        }
    }

    /// Returns this edge with its id replaced. Used when an edge is edited
    /// in place, so the handle stays stable across label changes.
    pub fn with_id(mut self, new_id: EdgeId) -> Self {
        match &mut self {
            Edge::Finite { id, .. } | Edge::Pda { id, .. } => *id = new_id,
        }
        self
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edge::Finite { input_char, .. } => write!(f, "{input_char}"),
            Edge::Pda {
                input_char,
                read_stack_char,
                write_stack_word,
                ..
            } => write!(
                f,
                "{input_char}, {read_stack_char}/{}",
                write_stack_word.join("")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Edge;

    #[test]
    fn label_equality_ignores_ids() {
        assert!(Edge::finite(0, "a").same_label(&Edge::finite(7, "a")));
        assert!(!Edge::finite(0, "a").same_label(&Edge::finite(0, "b")));
        assert!(!Edge::finite(0, "a").same_label(&Edge::pda(0, "a", "#", ["#"])));
        assert!(Edge::pda(1, "a", "#", ["x", "#"]).same_label(&Edge::pda(2, "a", "#", ["x", "#"])));
        assert!(!Edge::pda(1, "a", "#", ["x"]).same_label(&Edge::pda(1, "a", "#", ["y"])));
    }

    #[test]
    fn epsilon_detection() {
        assert!(Edge::epsilon(3).is_epsilon());
        assert!(!Edge::finite(3, "a").is_epsilon());
    }
}
