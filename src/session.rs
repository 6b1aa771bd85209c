//! The facade a presentation layer talks to: one owned entity plus the
//! optional run and algorithm playback attached to it.

use crate::{
    automaton::{Automaton, AutomatonEdit},
    grammar::{Grammar, GrammarEdit},
    run::Run,
    transform::{
        automaton_to_grammar, grammar_to_automaton, remove_epsilon_transitions,
        subset_construction, to_normal_form, Artifact, TransformStep, Transformation,
    },
    EditEvent, EngineError, Symbol,
};

/// Selects one of the built-in conversion algorithms.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AlgorithmKind {
    /// NFA→DFA subset construction.
    SubsetConstruction,
    /// ε-transition elimination.
    RemoveEpsilonTransitions,
    /// Finite automaton → regular grammar.
    ToRegularGrammar,
    /// Regular grammar (normal form) → finite automaton.
    ToAutomaton,
    /// Left-factoring into 2-symbol normal form.
    ToNormalForm,
}

/// A workbench session around one automaton or grammar. Starting a run or
/// an algorithm discards any previous one; cancelling either is simply
/// dropping it.
#[derive(Clone, Debug)]
pub struct Session {
    artifact: Artifact,
    run: Option<Run>,
    transformation: Option<Transformation>,
}

impl Session {
    /// Opens a session on an automaton.
    pub fn automaton(automaton: Automaton) -> Self {
        Self::new(Artifact::Automaton(automaton))
    }

    /// Opens a session on a grammar.
    pub fn grammar(grammar: Grammar) -> Self {
        Self::new(Artifact::Grammar(grammar))
    }

    /// Opens a session on an existing artifact, e.g. an algorithm output
    /// kept via [`Session::algorithm_delete`].
    pub fn new(artifact: Artifact) -> Self {
        Self {
            artifact,
            run: None,
            transformation: None,
        }
    }

    /// The entity this session edits.
    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    fn automaton_ref(&self) -> Result<&Automaton, EngineError> {
        self.artifact
            .as_automaton()
            .ok_or(EngineError::NotAnAutomaton)
    }

    /// Executes an automaton edit.
    pub fn edit_automaton(&mut self, edit: AutomatonEdit) -> Result<(), EngineError> {
        match &mut self.artifact {
            Artifact::Automaton(a) => a.execute(edit),
            Artifact::Grammar(_) => Err(EngineError::NotAnAutomaton),
        }
    }

    /// Executes a grammar edit.
    pub fn edit_grammar(&mut self, edit: GrammarEdit) -> Result<(), EngineError> {
        match &mut self.artifact {
            Artifact::Automaton(_) => Err(EngineError::NotAGrammar),
            Artifact::Grammar(g) => g.execute(edit),
        }
    }

    /// Undoes the most recent edit on the entity.
    pub fn undo(&mut self) -> Result<(), EngineError> {
        match &mut self.artifact {
            Artifact::Automaton(a) => a.undo(),
            Artifact::Grammar(g) => g.undo(),
        }
    }

    /// Drains the pending automaton edit events for a mirroring renderer.
    /// Empty when the session holds a grammar.
    pub fn drain_automaton_events(&mut self) -> Vec<EditEvent<AutomatonEdit>> {
        match &mut self.artifact {
            Artifact::Automaton(a) => a.drain_events(),
            Artifact::Grammar(_) => Vec::new(),
        }
    }

    /// Drains the pending grammar edit events for a mirroring renderer.
    /// Empty when the session holds an automaton.
    pub fn drain_grammar_events(&mut self) -> Vec<EditEvent<GrammarEdit>> {
        match &mut self.artifact {
            Artifact::Automaton(_) => Vec::new(),
            Artifact::Grammar(g) => g.drain_events(),
        }
    }

    /// Starts a simulation of `word`, replacing any active run.
    pub fn run_start(&mut self, word: Vec<Symbol>) -> Result<(), EngineError> {
        let automaton = self.automaton_ref()?;
        self.run = Some(Run::start(automaton, word));
        Ok(())
    }

    /// Advances the active run by a single step.
    pub fn run_next(&mut self) -> Result<(), EngineError> {
        let Session { artifact, run, .. } = self;
        let run = run.as_mut().ok_or(EngineError::NoActiveRun)?;
        match artifact {
            Artifact::Automaton(a) => run.step(a),
            Artifact::Grammar(_) => Err(EngineError::NotAnAutomaton),
        }
    }

    /// Undoes the most recent step of the active run.
    pub fn run_undo(&mut self) -> Result<(), EngineError> {
        self.run
            .as_mut()
            .ok_or(EngineError::NoActiveRun)?
            .undo_step()
    }

    /// Whether the active run is in an accepting position.
    pub fn run_accepted(&self) -> Result<bool, EngineError> {
        let automaton = self.automaton_ref()?;
        let run = self.run.as_ref().ok_or(EngineError::NoActiveRun)?;
        Ok(run.accepted(automaton))
    }

    /// Stops and discards the active run.
    pub fn run_stop(&mut self) {
        self.run = None;
    }

    /// Full-run convenience: whether the automaton accepts `word`.
    pub fn contains_word(&self, word: &[Symbol]) -> Result<bool, EngineError> {
        Ok(self.automaton_ref()?.contains_word(word))
    }

    /// Validates preconditions and precomputes the selected algorithm on
    /// the session's entity, replacing any previous playback.
    ///
    /// # Panics
    ///
    /// Panics when the algorithm does not apply to the entity: wrong entity
    /// or automaton/grammar kind, or unmet preconditions such as remaining
    /// ε-transitions, unreachable states, or rules not in normal form.
    pub fn algorithm_start(&mut self, kind: AlgorithmKind) {
        let transformation = match (&self.artifact, kind) {
            (Artifact::Automaton(a), AlgorithmKind::SubsetConstruction) => subset_construction(a),
            (Artifact::Automaton(a), AlgorithmKind::RemoveEpsilonTransitions) => {
                remove_epsilon_transitions(a)
            }
            (Artifact::Automaton(a), AlgorithmKind::ToRegularGrammar) => automaton_to_grammar(a),
            (Artifact::Grammar(g), AlgorithmKind::ToAutomaton) => grammar_to_automaton(g),
            (Artifact::Grammar(g), AlgorithmKind::ToNormalForm) => to_normal_form(g),
            (Artifact::Automaton(_), _) => {
                panic!("algorithm {kind:?} does not apply to an automaton")
            }
            (Artifact::Grammar(_), _) => panic!("algorithm {kind:?} does not apply to a grammar"),
        };
        self.transformation = Some(transformation);
    }

    fn playback(&mut self) -> &mut Transformation {
        self.transformation
            .as_mut()
            .expect("no algorithm was started")
    }

    /// Applies the next algorithm step, or returns `None` at the end.
    ///
    /// # Panics
    ///
    /// Panics when no algorithm was started.
    pub fn algorithm_next(&mut self) -> Option<&TransformStep> {
        self.playback().next()
    }

    /// Steps the algorithm playback backward.
    ///
    /// # Panics
    ///
    /// Panics when no algorithm was started.
    pub fn algorithm_undo(&mut self) -> Result<(), EngineError> {
        self.playback().undo()
    }

    /// Skips the playback to the end.
    ///
    /// # Panics
    ///
    /// Panics when no algorithm was started.
    pub fn algorithm_transform(&mut self) {
        self.playback().transform();
    }

    /// The output entity of the algorithm playback, in its current shape.
    pub fn algorithm_output(&self) -> Option<&Artifact> {
        self.transformation.as_ref().map(Transformation::output)
    }

    /// Ends the algorithm playback, handing its output back when
    /// `keep_output` is set.
    pub fn algorithm_delete(&mut self, keep_output: bool) -> Option<Artifact> {
        self.transformation
            .take()
            .and_then(|t| t.into_output(keep_output))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::edge::Edge;

    fn word(w: &str) -> Vec<Symbol> {
        w.chars().map(|c| c.to_string()).collect()
    }

    fn ab_star_session() -> Session {
        let mut s = Session::automaton(Automaton::finite("q0"));
        s.edit_automaton(AutomatonEdit::AddState { id: "q1".into() }).unwrap();
        s.edit_automaton(AutomatonEdit::SetFinal {
            id: "q1".into(),
            is_final: true,
        })
        .unwrap();
        s.edit_automaton(AutomatonEdit::AddEdge {
            from: "q0".into(),
            to: "q1".into(),
            edge: Edge::finite(0, "a"),
        })
        .unwrap();
        s.edit_automaton(AutomatonEdit::AddEdge {
            from: "q1".into(),
            to: "q1".into(),
            edge: Edge::finite(1, "b"),
        })
        .unwrap();
        s
    }

    #[test]
    fn run_surface() {
        let mut s = ab_star_session();
        assert_eq!(s.run_next(), Err(EngineError::NoActiveRun));

        s.run_start(word("ab")).unwrap();
        s.run_next().unwrap();
        s.run_next().unwrap();
        assert_eq!(s.run_accepted(), Ok(true));
        s.run_undo().unwrap();
        assert_eq!(s.run_accepted(), Ok(false));

        s.run_stop();
        assert_eq!(s.run_undo(), Err(EngineError::NoActiveRun));
        assert_eq!(s.contains_word(&word("abb")), Ok(true));
    }

    #[test]
    fn kind_mismatches_are_recoverable_errors() {
        let mut s = Session::grammar(Grammar::regular("S"));
        assert_eq!(
            s.edit_automaton(AutomatonEdit::AddState { id: "q".into() }),
            Err(EngineError::NotAnAutomaton)
        );
        assert_eq!(s.run_start(vec![]), Err(EngineError::NotAnAutomaton));

        let mut s = ab_star_session();
        assert_eq!(
            s.edit_grammar(GrammarEdit::AddTerminals { symbols: vec![] }),
            Err(EngineError::NotAGrammar)
        );
    }

    #[test]
    fn algorithm_surface_steps_and_keeps_output() {
        let mut s = ab_star_session();
        s.algorithm_start(AlgorithmKind::ToRegularGrammar);

        let first = s.algorithm_next().cloned().unwrap();
        assert!(!first.highlights.is_empty());
        s.algorithm_undo().unwrap();
        assert_eq!(s.algorithm_undo(), Err(EngineError::NothingToUndo));

        s.algorithm_transform();
        assert!(s.algorithm_next().is_none());

        let artifact = s.algorithm_delete(true).unwrap();
        let grammar = artifact.as_grammar().unwrap();
        assert_eq!(grammar.data().production_rules().len(), 3);
        assert!(s.algorithm_delete(true).is_none());
    }

    #[test]
    #[should_panic(expected = "does not apply")]
    fn mismatched_algorithm_selection_is_fatal() {
        let mut s = ab_star_session();
        s.algorithm_start(AlgorithmKind::ToAutomaton);
    }

    #[test]
    #[should_panic(expected = "no algorithm was started")]
    fn stepping_without_an_algorithm_is_fatal() {
        ab_star_session().algorithm_next();
    }
}
