//! Forward-chaining production-rule engine.
//!
//! A small synchronous executor: rules are registered once, facts are
//! asserted into working memory, and [`WorkflowEngine::run`] repeatedly
//! fires the highest-salience matching rule until a terminal state is
//! asserted or nothing matches. Each firing is atomic with respect to the
//! working memory; effects are buffered and committed after the action
//! returns.
//!
//! The engine enforces no iteration cap. Refraction (a fired instantiation
//! never refires) makes well-formed rule sets terminate, but a rule set
//! that keeps declaring fresh matching facts can run forever; avoiding
//! that is a workflow-design responsibility.

mod condition;

use std::collections::HashSet;

use tracing::{debug, error};

use crate::error::{SkycastResult, WorkflowError};
use crate::fact::{Fact, FactKey, WorkingMemory};
use crate::state::SessionState;

pub use condition::{Bindings, Condition, FactPattern, Instantiation, ValueTest};

/// Boxed rule action.
///
/// Actions are functions of the matched bindings; they may declare facts
/// through [`Effects`] and perform blocking collaborator calls through the
/// context. The engine never inspects collaborator failures: an action
/// that wants a fallback declares the fallback state itself.
pub type ActionFn<C> = Box<dyn Fn(&mut C, &Bindings, &mut Effects) -> SkycastResult<()>>;

/// A production rule: condition, salience, action.
pub struct Rule<C> {
    name: String,
    salience: i32,
    condition: Condition,
    action: ActionFn<C>,
}

impl<C> Rule<C> {
    /// Creates a rule.
    ///
    /// Higher salience fires first; ties among rules are broken by
    /// registration order (first registered wins).
    pub fn new(
        name: impl Into<String>,
        salience: i32,
        condition: Condition,
        action: impl Fn(&mut C, &Bindings, &mut Effects) -> SkycastResult<()> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            salience,
            condition,
            action: Box::new(action),
        }
    }

    /// The rule's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rule's priority.
    #[must_use]
    pub fn salience(&self) -> i32 {
        self.salience
    }
}

impl<C> std::fmt::Debug for Rule<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("salience", &self.salience)
            .field("condition", &self.condition)
            .finish_non_exhaustive()
    }
}

/// Buffered assertions produced by one firing.
///
/// The engine commits them after the action returns, enforcing that a
/// single firing declares at most one state-transition (`Action`) fact.
#[derive(Debug, Default)]
pub struct Effects {
    declared: Vec<Fact>,
}

impl Effects {
    /// Buffers a fact for assertion.
    pub fn declare(&mut self, fact: Fact) {
        self.declared.push(fact);
    }

    fn transition_count(&self) -> usize {
        self.declared
            .iter()
            .filter(|f| f.key == FactKey::Action)
            .count()
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A terminal state was asserted; the engine stopped itself.
    Halted(SessionState),
    /// No rule instantiation matched. Whether this is legal depends on the
    /// workflow; callers that expect a terminal state should treat it as a
    /// specification bug.
    Exhausted,
}

/// The forward-chaining engine.
pub struct WorkflowEngine<C> {
    rules: Vec<Rule<C>>,
    memory: WorkingMemory,
    fired: HashSet<(usize, Vec<usize>)>,
}

impl<C> Default for WorkflowEngine<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> WorkflowEngine<C> {
    /// Creates an engine with no rules and empty memory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            memory: WorkingMemory::new(),
            fired: HashSet::new(),
        }
    }

    /// Adds a rule to the static rule set.
    pub fn register_rule(&mut self, rule: Rule<C>) {
        self.rules.push(rule);
    }

    /// Inserts a fact into working memory. Always succeeds; duplicates are
    /// legal and simply grow the agenda.
    pub fn declare(&mut self, fact: Fact) {
        self.memory.assert(fact);
    }

    /// The current working memory.
    #[must_use]
    pub fn memory(&self) -> &WorkingMemory {
        &self.memory
    }

    /// Number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Selects the next activation: highest salience, then registration
    /// order, then pattern traversal order; instantiations that already
    /// fired are skipped.
    fn next_activation(&self) -> Option<(usize, Instantiation)> {
        let mut best: Option<(i32, usize, Instantiation)> = None;
        for (rule_index, rule) in self.rules.iter().enumerate() {
            if let Some(best_ref) = &best {
                // Rules are scanned in registration order, so a later rule
                // only wins with strictly higher salience.
                if rule.salience <= best_ref.0 {
                    continue;
                }
            }
            let inst = rule
                .condition
                .instantiations(&self.memory)
                .into_iter()
                .find(|inst| !self.fired.contains(&(rule_index, inst.identity())));
            if let Some(inst) = inst {
                best = Some((rule.salience, rule_index, inst));
            }
        }
        best.map(|(_, rule_index, inst)| (rule_index, inst))
    }

    /// Runs the engine to completion.
    ///
    /// # Errors
    ///
    /// Propagates action failures, and raises
    /// [`WorkflowError::DivergentTransition`] if a firing declares more
    /// than one `Action` fact — that would create two concurrently
    /// matchable states.
    pub fn run(&mut self, ctx: &mut C) -> SkycastResult<RunOutcome> {
        loop {
            let Some((rule_index, inst)) = self.next_activation() else {
                debug!("no rule matches; run exhausted");
                return Ok(RunOutcome::Exhausted);
            };

            let rule = &self.rules[rule_index];
            debug!(rule = rule.name.as_str(), salience = rule.salience, "firing");

            let mut effects = Effects::default();
            (rule.action)(ctx, &inst.bindings, &mut effects)?;

            if effects.transition_count() > 1 {
                let snapshot = self.memory.snapshot();
                error!(
                    rule = rule.name.as_str(),
                    memory = ?snapshot,
                    "rule declared multiple state transitions"
                );
                return Err(WorkflowError::DivergentTransition {
                    rule: rule.name.clone(),
                    count: effects.transition_count(),
                    memory: snapshot,
                }
                .into());
            }

            self.fired.insert((rule_index, inst.identity()));

            let mut terminal = None;
            for fact in effects.declared {
                if let Some(state) = fact.value.as_state() {
                    if state.is_terminal() {
                        terminal = Some(state);
                    }
                }
                self.memory.assert(fact);
            }

            if let Some(state) = terminal {
                debug!(state = %state, "terminal state asserted; halting");
                return Ok(RunOutcome::Halted(state));
            }
        }
    }
}
