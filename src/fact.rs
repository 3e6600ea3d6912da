//! Facts - the atomic unit of session knowledge.
//!
//! A fact is an immutable key/value record asserted into working memory.
//! Memory is assert-only: facts are never removed, and a newer `Action`
//! fact logically supersedes older ones. Rules that would otherwise match
//! stale facts guard with negation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::Code;
use crate::state::{ActivityKind, ModelKind, SessionState, SkyCondition, TempBand, TimeOfDay};
use crate::value::Value;

/// Closed set of fact keys.
///
/// Each key names one category of session knowledge; several facts may
/// share a key (duplicate assertion is legal and simply grows the agenda).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKey {
    /// The current workflow state.
    Action,
    /// Outcome of the online weather fetch (true = success).
    Fetch,
    /// The user's answer to the manual-entry fallback question.
    Manual,
    /// Morning or evening.
    TimeOfDay,
    /// Sky condition.
    Sky,
    /// Rain intensity code.
    Rain,
    /// Wind code.
    Wind,
    /// Temperature band (with its code for cold/hot).
    TempBand,
    /// Preferred activity category.
    Activity,
    /// Whether the user has access to an indoor facility.
    Indoor,
    /// Which risk model the user selected.
    Model,
}

impl fmt::Display for FactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Action => "action",
            Self::Fetch => "fetch",
            Self::Manual => "manual",
            Self::TimeOfDay => "time_of_day",
            Self::Sky => "sky",
            Self::Rain => "rain",
            Self::Wind => "wind",
            Self::TempBand => "temp_band",
            Self::Activity => "activity",
            Self::Indoor => "indoor",
            Self::Model => "model",
        };
        write!(f, "{name}")
    }
}

/// An immutable key/value record in working memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// The fact's category.
    pub key: FactKey,
    /// The carried value.
    pub value: Value,
}

impl Fact {
    /// Creates a fact from a key and anything convertible to a value.
    pub fn new(key: FactKey, value: impl Into<Value>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }

    /// A workflow-state fact.
    #[must_use]
    pub fn action(state: SessionState) -> Self {
        Self::new(FactKey::Action, state)
    }

    /// An online-fetch outcome fact.
    #[must_use]
    pub fn fetch(succeeded: bool) -> Self {
        Self::new(FactKey::Fetch, succeeded)
    }

    /// A manual-entry choice fact.
    #[must_use]
    pub fn manual(accepted: bool) -> Self {
        Self::new(FactKey::Manual, accepted)
    }

    /// A time-of-day fact.
    #[must_use]
    pub fn time_of_day(value: TimeOfDay) -> Self {
        Self::new(FactKey::TimeOfDay, value)
    }

    /// A sky-condition fact.
    #[must_use]
    pub fn sky(value: SkyCondition) -> Self {
        Self::new(FactKey::Sky, value)
    }

    /// A rain-intensity fact.
    #[must_use]
    pub fn rain(code: Code) -> Self {
        Self::new(FactKey::Rain, code)
    }

    /// A wind-code fact.
    #[must_use]
    pub fn wind(code: Code) -> Self {
        Self::new(FactKey::Wind, code)
    }

    /// A temperature-band fact.
    #[must_use]
    pub fn temp_band(band: TempBand) -> Self {
        Self::new(FactKey::TempBand, band)
    }

    /// An activity-preference fact.
    #[must_use]
    pub fn activity(kind: ActivityKind) -> Self {
        Self::new(FactKey::Activity, kind)
    }

    /// An indoor-access fact.
    #[must_use]
    pub fn indoor(has_access: bool) -> Self {
        Self::new(FactKey::Indoor, has_access)
    }

    /// A model-choice fact.
    #[must_use]
    pub fn model(kind: ModelKind) -> Self {
        Self::new(FactKey::Model, kind)
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// The asserted fact set of one session.
///
/// Assert-only by design: the matcher always considers the full set, so the
/// memory doubles as an audit trail of the session.
#[derive(Debug, Default, Clone)]
pub struct WorkingMemory {
    facts: Vec<Fact>,
}

impl WorkingMemory {
    /// Creates an empty working memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fact. Always succeeds; duplicates are not collapsed.
    pub fn assert(&mut self, fact: Fact) {
        self.facts.push(fact);
    }

    /// All facts, in assertion order.
    #[must_use]
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Number of asserted facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// True if nothing has been asserted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// The most recently asserted fact with the given key.
    #[must_use]
    pub fn latest(&self, key: FactKey) -> Option<&Fact> {
        self.facts.iter().rev().find(|f| f.key == key)
    }

    /// The most recently asserted workflow state, if any.
    #[must_use]
    pub fn current_state(&self) -> Option<SessionState> {
        self.latest(FactKey::Action).and_then(|f| f.value.as_state())
    }

    /// A rendered snapshot of the full memory, for integrity diagnostics.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.facts.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_and_query() {
        let mut wm = WorkingMemory::new();
        assert!(wm.is_empty());

        wm.assert(Fact::action(SessionState::AskSearchMode));
        wm.assert(Fact::sky(SkyCondition::Clear));
        assert_eq!(wm.len(), 2);
        assert_eq!(wm.current_state(), Some(SessionState::AskSearchMode));
    }

    #[test]
    fn test_latest_action_supersedes() {
        let mut wm = WorkingMemory::new();
        wm.assert(Fact::action(SessionState::AskSearchMode));
        wm.assert(Fact::action(SessionState::ManualEntry));

        // Both facts coexist; the newer one is the current state.
        assert_eq!(wm.len(), 2);
        assert_eq!(wm.current_state(), Some(SessionState::ManualEntry));
    }

    #[test]
    fn test_duplicates_are_legal() {
        let mut wm = WorkingMemory::new();
        let fact = Fact::indoor(true);
        wm.assert(fact.clone());
        wm.assert(fact);
        assert_eq!(wm.len(), 2);
    }

    #[test]
    fn test_snapshot_renders_facts() {
        let mut wm = WorkingMemory::new();
        wm.assert(Fact::action(SessionState::AskActivity));
        wm.assert(Fact::indoor(false));
        let snapshot = wm.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0], "action=ask_activity");
        assert_eq!(snapshot[1], "indoor=false");
    }

    #[test]
    fn test_fact_serialization() {
        let fact = Fact::rain(Code::new(3).unwrap());
        let json = serde_json::to_string(&fact).unwrap();
        let back: Fact = serde_json::from_str(&json).unwrap();
        assert_eq!(fact, back);
    }
}
