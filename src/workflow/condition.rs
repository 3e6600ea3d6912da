//! Rule conditions: patterns, composition, and variable bindings.
//!
//! A condition is a tree of AND/OR/NOT nodes over fact patterns. Patterns
//! test a fact's key and value; a `Bind` test captures the value under a
//! name visible to the rule's action (and to later patterns of the same
//! conjunction, which must agree with it).

use std::collections::BTreeMap;

use crate::codec::Code;
use crate::fact::{Fact, FactKey, WorkingMemory};
use crate::state::{ActivityKind, ModelKind, SessionState, SkyCondition, TempBand, TimeOfDay};
use crate::value::Value;

/// Value test applied by a pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueTest {
    /// The fact's value must equal this value.
    Equals(Value),
    /// Any value matches and is captured under the given name.
    Bind(&'static str),
    /// Any value matches.
    Any,
}

/// A single fact pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct FactPattern {
    key: FactKey,
    test: ValueTest,
}

impl FactPattern {
    /// Matches any fact with the given key.
    #[must_use]
    pub const fn key(key: FactKey) -> Self {
        Self {
            key,
            test: ValueTest::Any,
        }
    }

    /// Matches a fact with the given key and exact value.
    pub fn equals(key: FactKey, value: impl Into<Value>) -> Self {
        Self {
            key,
            test: ValueTest::Equals(value.into()),
        }
    }

    /// Matches any fact with the given key, capturing its value.
    #[must_use]
    pub const fn bind(key: FactKey, name: &'static str) -> Self {
        Self {
            key,
            test: ValueTest::Bind(name),
        }
    }

    /// Shorthand for the ubiquitous current-state pattern.
    #[must_use]
    pub fn state(state: SessionState) -> Self {
        Self::equals(FactKey::Action, state)
    }

    /// Tests one fact under existing bindings; returns the updated bindings
    /// on a match.
    fn matches(&self, fact: &Fact, bindings: &Bindings) -> Option<Bindings> {
        if fact.key != self.key {
            return None;
        }
        match &self.test {
            ValueTest::Any => Some(bindings.clone()),
            ValueTest::Equals(expected) => (fact.value == *expected).then(|| bindings.clone()),
            ValueTest::Bind(name) => match bindings.get(name) {
                // A name bound earlier in the conjunction must agree.
                Some(existing) => (*existing == fact.value).then(|| bindings.clone()),
                None => {
                    let mut next = bindings.clone();
                    next.insert(name, fact.value.clone());
                    Some(next)
                }
            },
        }
    }
}

/// Captured variable bindings of one rule instantiation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    values: BTreeMap<&'static str, Value>,
}

impl Bindings {
    /// An empty binding set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, name: &'static str, value: Value) {
        self.values.insert(name, value);
    }

    /// The raw value bound under a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// A bound workflow state.
    #[must_use]
    pub fn state(&self, name: &str) -> Option<SessionState> {
        self.get(name).and_then(Value::as_state)
    }

    /// A bound time of day.
    #[must_use]
    pub fn time(&self, name: &str) -> Option<TimeOfDay> {
        self.get(name).and_then(Value::as_time)
    }

    /// A bound sky condition.
    #[must_use]
    pub fn sky(&self, name: &str) -> Option<SkyCondition> {
        self.get(name).and_then(Value::as_sky)
    }

    /// A bound temperature band.
    #[must_use]
    pub fn band(&self, name: &str) -> Option<TempBand> {
        self.get(name).and_then(Value::as_band)
    }

    /// A bound activity kind.
    #[must_use]
    pub fn kind(&self, name: &str) -> Option<ActivityKind> {
        self.get(name).and_then(Value::as_kind)
    }

    /// A bound model choice.
    #[must_use]
    pub fn model(&self, name: &str) -> Option<ModelKind> {
        self.get(name).and_then(Value::as_model)
    }

    /// A bound ordinal code.
    #[must_use]
    pub fn code(&self, name: &str) -> Option<Code> {
        self.get(name).and_then(Value::as_code)
    }

    /// A bound boolean.
    #[must_use]
    pub fn truth(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }
}

/// A rule's condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// A single pattern must match some fact.
    Is(FactPattern),
    /// Every branch must match (bindings are shared left to right).
    All(Vec<Condition>),
    /// At least one branch must match; each match is its own instantiation.
    AnyOf(Vec<Condition>),
    /// No fact may satisfy the pattern.
    Not(FactPattern),
}

impl Condition {
    /// Shorthand for a single-pattern condition.
    #[must_use]
    pub fn is(pattern: FactPattern) -> Self {
        Self::Is(pattern)
    }

    /// Shorthand for the current-state condition.
    #[must_use]
    pub fn state(state: SessionState) -> Self {
        Self::Is(FactPattern::state(state))
    }

    /// All instantiations of this condition against the working memory.
    ///
    /// An instantiation records the indices of the positive facts it
    /// matched plus the captured bindings. Traversal order is
    /// deterministic: memory order within a pattern, left-to-right across
    /// a conjunction.
    #[must_use]
    pub fn instantiations(&self, memory: &WorkingMemory) -> Vec<Instantiation> {
        self.solve(memory, &Instantiation::empty())
    }

    fn solve(&self, memory: &WorkingMemory, partial: &Instantiation) -> Vec<Instantiation> {
        match self {
            Self::Is(pattern) => {
                let mut out = Vec::new();
                for (index, fact) in memory.facts().iter().enumerate() {
                    if let Some(bindings) = pattern.matches(fact, &partial.bindings) {
                        out.push(partial.extended(index, bindings));
                    }
                }
                out
            }
            Self::All(branches) => {
                let mut current = vec![partial.clone()];
                for branch in branches {
                    let mut next = Vec::new();
                    for inst in &current {
                        next.extend(branch.solve(memory, inst));
                    }
                    if next.is_empty() {
                        return Vec::new();
                    }
                    current = next;
                }
                current
            }
            Self::AnyOf(branches) => branches
                .iter()
                .flat_map(|branch| branch.solve(memory, partial))
                .collect(),
            Self::Not(pattern) => {
                let blocked = memory
                    .facts()
                    .iter()
                    .any(|fact| pattern.matches(fact, &partial.bindings).is_some());
                if blocked {
                    Vec::new()
                } else {
                    vec![partial.clone()]
                }
            }
        }
    }
}

/// One concrete match of a rule's condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Instantiation {
    /// Indices of the positive facts this instantiation matched.
    pub fact_indices: Vec<usize>,
    /// The captured bindings.
    pub bindings: Bindings,
}

impl Instantiation {
    fn empty() -> Self {
        Self {
            fact_indices: Vec::new(),
            bindings: Bindings::new(),
        }
    }

    fn extended(&self, index: usize, bindings: Bindings) -> Self {
        let mut fact_indices = self.fact_indices.clone();
        fact_indices.push(index);
        Self {
            fact_indices,
            bindings,
        }
    }

    /// Identity used for refraction: the sorted positive-fact index set.
    #[must_use]
    pub fn identity(&self) -> Vec<usize> {
        let mut indices = self.fact_indices.clone();
        indices.sort_unstable();
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_with(facts: Vec<Fact>) -> WorkingMemory {
        let mut wm = WorkingMemory::new();
        for fact in facts {
            wm.assert(fact);
        }
        wm
    }

    #[test]
    fn test_equals_pattern() {
        let wm = memory_with(vec![
            Fact::action(SessionState::AskSearchMode),
            Fact::indoor(true),
        ]);
        let cond = Condition::state(SessionState::AskSearchMode);
        assert_eq!(cond.instantiations(&wm).len(), 1);

        let cond = Condition::state(SessionState::AskActivity);
        assert!(cond.instantiations(&wm).is_empty());
    }

    #[test]
    fn test_bind_captures_value() {
        let wm = memory_with(vec![Fact::sky(SkyCondition::Clear)]);
        let cond = Condition::is(FactPattern::bind(FactKey::Sky, "sky"));
        let insts = cond.instantiations(&wm);
        assert_eq!(insts.len(), 1);
        assert_eq!(insts[0].bindings.sky("sky"), Some(SkyCondition::Clear));
    }

    #[test]
    fn test_conjunction_joins_bindings() {
        let wm = memory_with(vec![
            Fact::action(SessionState::PrintActivity),
            Fact::sky(SkyCondition::Cloudy),
            Fact::indoor(false),
        ]);
        let cond = Condition::All(vec![
            Condition::state(SessionState::PrintActivity),
            Condition::is(FactPattern::bind(FactKey::Sky, "sky")),
            Condition::is(FactPattern::bind(FactKey::Indoor, "indoor")),
        ]);
        let insts = cond.instantiations(&wm);
        assert_eq!(insts.len(), 1);
        assert_eq!(insts[0].bindings.sky("sky"), Some(SkyCondition::Cloudy));
        assert_eq!(insts[0].bindings.truth("indoor"), Some(false));
        assert_eq!(insts[0].fact_indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_same_name_must_agree() {
        let wm = memory_with(vec![
            Fact::sky(SkyCondition::Clear),
            Fact::sky(SkyCondition::Cloudy),
        ]);
        // Binding "x" twice only matches pairs with equal values; here the
        // only pairs are each fact with itself.
        let cond = Condition::All(vec![
            Condition::is(FactPattern::bind(FactKey::Sky, "x")),
            Condition::is(FactPattern::bind(FactKey::Sky, "x")),
        ]);
        let insts = cond.instantiations(&wm);
        assert_eq!(insts.len(), 2);
        for inst in insts {
            assert_eq!(inst.fact_indices[0], inst.fact_indices[1]);
        }
    }

    #[test]
    fn test_negation() {
        let wm = memory_with(vec![Fact::action(SessionState::FetchOnline)]);
        let cond = Condition::All(vec![
            Condition::state(SessionState::FetchOnline),
            Condition::Not(FactPattern::key(FactKey::Fetch)),
        ]);
        assert_eq!(cond.instantiations(&wm).len(), 1);

        let wm = memory_with(vec![
            Fact::action(SessionState::FetchOnline),
            Fact::fetch(false),
        ]);
        assert!(cond.instantiations(&wm).is_empty());
    }

    #[test]
    fn test_disjunction_yields_separate_instantiations() {
        let wm = memory_with(vec![
            Fact::manual(true),
            Fact::action(SessionState::ManualEntry),
        ]);
        let cond = Condition::AnyOf(vec![
            Condition::is(FactPattern::equals(FactKey::Manual, true)),
            Condition::state(SessionState::ManualEntry),
        ]);
        assert_eq!(cond.instantiations(&wm).len(), 2);
    }

    #[test]
    fn test_duplicate_facts_multiply_instantiations() {
        let wm = memory_with(vec![Fact::indoor(true), Fact::indoor(true)]);
        let cond = Condition::is(FactPattern::key(FactKey::Indoor));
        assert_eq!(cond.instantiations(&wm).len(), 2);
    }

    #[test]
    fn test_identity_is_sorted() {
        let inst = Instantiation {
            fact_indices: vec![3, 1, 2],
            bindings: Bindings::new(),
        };
        assert_eq!(inst.identity(), vec![1, 2, 3]);
    }
}
