//! Closed vocabularies for the advisory session.
//!
//! The original questionnaire drove itself with free-form strings; here
//! every branch point is a tagged enum so the matcher and the rule actions
//! are exhaustiveness-checked at compile time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::Code;

/// Workflow states of the questionnaire.
///
/// The current `Action` fact carries one of these; asserting a new one
/// logically supersedes the previous state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Ask whether to search weather online or enter it manually.
    AskSearchMode,
    /// Fetch weather from the online source.
    FetchOnline,
    /// Collect weather values from the user.
    ManualEntry,
    /// Ask for the preferred activity and run the risk assessment.
    AskActivity,
    /// Elevated risk: ask which risk model to use.
    ChooseModel,
    /// Look up and print the recommended activities.
    PrintActivity,
    /// Print the closing banner.
    PrintAccessory,
    /// Session finished normally.
    Completed,
    /// User declined to continue after a failed online fetch.
    Aborted,
}

impl SessionState {
    /// Returns true if the engine should stop when this state is asserted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AskSearchMode => "ask_search_mode",
            Self::FetchOnline => "fetch_online",
            Self::ManualEntry => "manual_entry",
            Self::AskActivity => "ask_activity",
            Self::ChooseModel => "choose_model",
            Self::PrintActivity => "print_activity",
            Self::PrintAccessory => "print_accessory",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        };
        write!(f, "{name}")
    }
}

/// Time-of-day band used by the recommendation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Evening,
}

impl TimeOfDay {
    /// Accepted prompt answers.
    pub const OPTIONS: [&'static str; 2] = ["morning", "evening"];

    /// Parses a validated prompt answer.
    #[must_use]
    pub fn from_answer(answer: &str) -> Option<Self> {
        match answer.trim().to_ascii_lowercase().as_str() {
            "morning" => Some(Self::Morning),
            "evening" => Some(Self::Evening),
            _ => None,
        }
    }

    /// Lower-case label used in composite keys.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Evening => "evening",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Sky condition reported by the weather source or the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkyCondition {
    Cloudy,
    Clear,
    Precipitation,
}

impl SkyCondition {
    /// Accepted prompt answers.
    pub const OPTIONS: [&'static str; 3] = ["cloudy", "clear", "precipitation"];

    /// Parses a validated prompt answer.
    #[must_use]
    pub fn from_answer(answer: &str) -> Option<Self> {
        match answer.trim().to_ascii_lowercase().as_str() {
            "cloudy" => Some(Self::Cloudy),
            "clear" => Some(Self::Clear),
            "precipitation" => Some(Self::Precipitation),
            _ => None,
        }
    }

    /// Lower-case label used in composite keys.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cloudy => "cloudy",
            Self::Clear => "clear",
            Self::Precipitation => "precipitation",
        }
    }
}

impl fmt::Display for SkyCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Temperature regime, selected once per session.
///
/// Cold and hot carry the ordinal code fed to the matching network; the
/// normal band never reaches the risk model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempBand {
    Cold(Code),
    Normal,
    Hot(Code),
}

impl TempBand {
    /// Lower-case label used in composite keys.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cold(_) => "cold",
            Self::Normal => "normal",
            Self::Hot(_) => "hot",
        }
    }

    /// The ordinal code for the risk model, if this band has one.
    #[must_use]
    pub const fn code(self) -> Option<Code> {
        match self {
            Self::Cold(code) | Self::Hot(code) => Some(code),
            Self::Normal => None,
        }
    }
}

impl fmt::Display for TempBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cold(code) => write!(f, "cold({code})"),
            Self::Normal => write!(f, "normal"),
            Self::Hot(code) => write!(f, "hot({code})"),
        }
    }
}

/// Activity category the user prefers today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Sport,
    Cultural,
    Recreational,
}

impl ActivityKind {
    /// Accepted prompt answers.
    pub const OPTIONS: [&'static str; 3] = ["sport", "cultural", "recreational"];

    /// Parses a validated prompt answer.
    #[must_use]
    pub fn from_answer(answer: &str) -> Option<Self> {
        match answer.trim().to_ascii_lowercase().as_str() {
            "sport" => Some(Self::Sport),
            "cultural" => Some(Self::Cultural),
            "recreational" => Some(Self::Recreational),
            _ => None,
        }
    }

    /// Lower-case label used in composite keys.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sport => "sport",
            Self::Cultural => "cultural",
            Self::Recreational => "recreational",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Indoor/outdoor placement derived from the indoor-access answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Place {
    Indoor,
    Outdoor,
}

impl Place {
    /// Lower-case label used in composite keys.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Indoor => "indoor",
            Self::Outdoor => "outdoor",
        }
    }

    /// Placement from the indoor-access answer.
    #[must_use]
    pub const fn from_indoor_access(has_access: bool) -> Self {
        if has_access {
            Self::Indoor
        } else {
            Self::Outdoor
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Which risk model parameterization to use once an alert is raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// The analytically synthesized tables.
    Analytic,
    /// Tables re-estimated from the observation dataset.
    Learned,
}

impl ModelKind {
    /// Accepted prompt answers ("1" analytic, "2" learned).
    pub const OPTIONS: [&'static str; 2] = ["1", "2"];

    /// Parses a validated prompt answer.
    #[must_use]
    pub fn from_answer(answer: &str) -> Option<Self> {
        match answer.trim() {
            "1" => Some(Self::Analytic),
            "2" => Some(Self::Learned),
            _ => None,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analytic => write!(f, "analytic"),
            Self::Learned => write!(f, "learned"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(SessionState::Completed.is_terminal());
        assert!(SessionState::Aborted.is_terminal());
        assert!(!SessionState::AskActivity.is_terminal());
        assert!(!SessionState::PrintAccessory.is_terminal());
    }

    #[test]
    fn test_time_of_day_parsing() {
        assert_eq!(TimeOfDay::from_answer("Morning"), Some(TimeOfDay::Morning));
        assert_eq!(TimeOfDay::from_answer(" evening "), Some(TimeOfDay::Evening));
        assert_eq!(TimeOfDay::from_answer("noon"), None);
    }

    #[test]
    fn test_sky_parsing() {
        assert_eq!(SkyCondition::from_answer("clear"), Some(SkyCondition::Clear));
        assert_eq!(
            SkyCondition::from_answer("PRECIPITATION"),
            Some(SkyCondition::Precipitation)
        );
        assert_eq!(SkyCondition::from_answer("sunny"), None);
    }

    #[test]
    fn test_band_labels_and_codes() {
        let cold = TempBand::Cold(Code::new(2).unwrap());
        assert_eq!(cold.label(), "cold");
        assert_eq!(cold.code().map(Code::value), Some(2));
        assert_eq!(TempBand::Normal.label(), "normal");
        assert_eq!(TempBand::Normal.code(), None);
    }

    #[test]
    fn test_place_from_access() {
        assert_eq!(Place::from_indoor_access(true), Place::Indoor);
        assert_eq!(Place::from_indoor_access(false), Place::Outdoor);
    }

    #[test]
    fn test_model_kind_parsing() {
        assert_eq!(ModelKind::from_answer("1"), Some(ModelKind::Analytic));
        assert_eq!(ModelKind::from_answer(" 2"), Some(ModelKind::Learned));
        assert_eq!(ModelKind::from_answer("3"), None);
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&SessionState::AskActivity).unwrap();
        assert_eq!(json, "\"ask_activity\"");
        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SessionState::AskActivity);
    }
}
