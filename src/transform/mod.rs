//! Steppable conversion algorithms.
//!
//! Every algorithm follows the same two-phase contract: construction
//! validates the input's applicability (panicking on misuse, since that is
//! a caller-side contract violation) and eagerly precomputes the whole
//! ordered list of steps; the returned [`Transformation`] is then stepped
//! through one command at a time. Stepping forward applies an ordinary edit
//! command to the owned output entity, and stepping backward goes through
//! the output's own undo log, so algorithm playback and manual editing
//! share one history mechanism.

mod epsilon;
mod grammar_automaton;
mod normal_form;
mod subset;

pub use epsilon::{epsilon_closure, remove_epsilon_transitions};
pub use grammar_automaton::{automaton_to_grammar, grammar_to_automaton};
pub use normal_form::to_normal_form;
pub use subset::subset_construction;

use tracing::debug;

use crate::{
    automaton::{Automaton, AutomatonEdit},
    grammar::{Grammar, GrammarEdit},
    EngineError,
};

/// An automaton or a grammar, as produced (and consumed) by algorithms.
#[derive(Clone, Debug)]
pub enum Artifact {
    /// An automaton entity.
    Automaton(Automaton),
    /// A grammar entity.
    Grammar(Grammar),
}

impl Artifact {
    /// The automaton, if this artifact is one.
    pub fn as_automaton(&self) -> Option<&Automaton> {
        match self {
            Artifact::Automaton(a) => Some(a),
            Artifact::Grammar(_) => None,
        }
    }

    /// The grammar, if this artifact is one.
    pub fn as_grammar(&self) -> Option<&Grammar> {
        match self {
            Artifact::Automaton(_) => None,
            Artifact::Grammar(g) => Some(g),
        }
    }

    fn undo(&mut self) -> Result<(), EngineError> {
        match self {
            Artifact::Automaton(a) => a.undo(),
            Artifact::Grammar(g) => g.undo(),
        }
    }
}

/// An edit applicable to whichever entity kind an algorithm produces.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TransformEdit {
    /// An automaton command.
    Automaton(AutomatonEdit),
    /// A grammar command.
    Grammar(GrammarEdit),
}

impl From<AutomatonEdit> for TransformEdit {
    fn from(edit: AutomatonEdit) -> Self {
        TransformEdit::Automaton(edit)
    }
}

impl From<GrammarEdit> for TransformEdit {
    fn from(edit: GrammarEdit) -> Self {
        TransformEdit::Grammar(edit)
    }
}

/// One precomputed algorithm step: the ids to visually emphasize while the
/// step is current, and the command the step applies.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransformStep {
    /// State/symbol ids a renderer should highlight for this step.
    pub highlights: Vec<String>,
    /// The command applied by this step.
    pub edit: TransformEdit,
}

impl TransformStep {
    pub(crate) fn new(
        highlights: impl IntoIterator<Item = impl Into<String>>,
        edit: impl Into<TransformEdit>,
    ) -> Self {
        Self {
            highlights: highlights.into_iter().map(Into::into).collect(),
            edit: edit.into(),
        }
    }
}

/// A precomputed, indexable algorithm playback: an owned output entity and
/// the ordered command sequence that builds it.
#[derive(Clone, Debug)]
pub struct Transformation {
    steps: Vec<TransformStep>,
    cursor: usize,
    output: Artifact,
}

impl Transformation {
    pub(crate) fn new(output: Artifact, steps: Vec<TransformStep>) -> Self {
        debug!(steps = steps.len(), "precomputed transformation");
        Self {
            steps,
            cursor: 0,
            output,
        }
    }

    /// The output entity in its current (partially built) shape.
    pub fn output(&self) -> &Artifact {
        &self.output
    }

    /// All precomputed steps.
    pub fn steps(&self) -> &[TransformStep] {
        &self.steps
    }

    /// How many steps have been applied so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Applies the next precomputed command to the output and returns the
    /// step, or `None` once the sequence is exhausted.
    pub fn next(&mut self) -> Option<&TransformStep> {
        let step = self.steps.get(self.cursor)?;
        match (&mut self.output, &step.edit) {
            (Artifact::Automaton(automaton), TransformEdit::Automaton(edit)) => automaton
                .execute(edit.clone())
                .expect("precomputed automaton edit must apply"),
            (Artifact::Grammar(grammar), TransformEdit::Grammar(edit)) => grammar
                .execute(edit.clone())
                .expect("precomputed grammar edit must apply"),
            _ => unreachable!("step kind never differs from output kind"),
        }
        self.cursor += 1;
        Some(&self.steps[self.cursor - 1])
    }

    /// Steps backward through the precomputed sequence by undoing the
    /// output's most recent command.
    pub fn undo(&mut self) -> Result<(), EngineError> {
        if self.cursor == 0 {
            return Err(EngineError::NothingToUndo);
        }
        self.output.undo()?;
        self.cursor -= 1;
        Ok(())
    }

    /// Skips to the end of the sequence.
    pub fn transform(&mut self) {
        while self.next().is_some() {}
    }

    /// Finishes the playback, handing the output back when it is to be
    /// kept.
    pub fn into_output(self, keep: bool) -> Option<Artifact> {
        keep.then_some(self.output)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{Automaton, EngineError};

    fn small() -> Transformation {
        let output = Automaton::finite("s");
        let steps = vec![
            TransformStep::new(["s"], AutomatonEdit::AddState { id: "t".into() }),
            TransformStep::new(
                ["t"],
                AutomatonEdit::SetFinal {
                    id: "t".into(),
                    is_final: true,
                },
            ),
        ];
        Transformation::new(Artifact::Automaton(output), steps)
    }

    #[test]
    fn next_exhausts_exactly_once() {
        let mut t = small();
        assert!(t.next().is_some());
        assert!(t.next().is_some());
        assert!(t.next().is_none());
        assert!(t.next().is_none());
        assert_eq!(t.cursor(), 2);
    }

    #[test]
    fn undo_beyond_applied_steps_fails() {
        let mut t = small();
        t.next();
        t.undo().unwrap();
        assert_eq!(t.undo(), Err(EngineError::NothingToUndo));
    }

    #[test]
    fn undo_rolls_back_the_output_entity() {
        let mut t = small();
        t.transform();
        assert!(t.output().as_automaton().unwrap().data().is_final("t"));
        t.undo().unwrap();
        assert!(!t.output().as_automaton().unwrap().data().is_final("t"));
        t.undo().unwrap();
        assert!(!t.output().as_automaton().unwrap().data().states().contains("t"));
    }

    #[test]
    fn into_output_respects_keep_flag() {
        let mut t = small();
        t.transform();
        assert!(small().into_output(false).is_none());
        let artifact = t.into_output(true).unwrap();
        assert!(artifact.as_automaton().is_some());
    }
}
