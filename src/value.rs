//! Value types that facts can hold.
//!
//! The working memory is heterogeneous; this enum covers every value a
//! questionnaire fact can carry, from primitives to the closed domain
//! vocabularies.

use serde::{Deserialize, Serialize};

use crate::codec::Code;
use crate::state::{ActivityKind, ModelKind, SessionState, SkyCondition, TempBand, TimeOfDay};

/// Possible values a fact can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    State(SessionState),
    Time(TimeOfDay),
    Sky(SkyCondition),
    Band(TempBand),
    Kind(ActivityKind),
    Model(ModelKind),
    Code(Code),
}

impl Value {
    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    pub const fn is_state(&self) -> bool {
        matches!(self, Self::State(_))
    }

    pub const fn is_code(&self) -> bool {
        matches!(self, Self::Code(_))
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub const fn as_state(&self) -> Option<SessionState> {
        match self {
            Self::State(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_time(&self) -> Option<TimeOfDay> {
        match self {
            Self::Time(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_sky(&self) -> Option<SkyCondition> {
        match self {
            Self::Sky(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_band(&self) -> Option<TempBand> {
        match self {
            Self::Band(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_kind(&self) -> Option<ActivityKind> {
        match self {
            Self::Kind(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_model(&self) -> Option<ModelKind> {
        match self {
            Self::Model(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_code(&self) -> Option<Code> {
        match self {
            Self::Code(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::State(_) => "state",
            Self::Time(_) => "time",
            Self::Sky(_) => "sky",
            Self::Band(_) => "band",
            Self::Kind(_) => "kind",
            Self::Model(_) => "model",
            Self::Code(_) => "code",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::State(v) => write!(f, "{v}"),
            Self::Time(v) => write!(f, "{v}"),
            Self::Sky(v) => write!(f, "{v}"),
            Self::Band(v) => write!(f, "{v}"),
            Self::Kind(v) => write!(f, "{v}"),
            Self::Model(v) => write!(f, "{v}"),
            Self::Code(v) => write!(f, "{v}"),
        }
    }
}

// Convenient From implementations
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<SessionState> for Value {
    fn from(v: SessionState) -> Self {
        Self::State(v)
    }
}

impl From<TimeOfDay> for Value {
    fn from(v: TimeOfDay) -> Self {
        Self::Time(v)
    }
}

impl From<SkyCondition> for Value {
    fn from(v: SkyCondition) -> Self {
        Self::Sky(v)
    }
}

impl From<TempBand> for Value {
    fn from(v: TempBand) -> Self {
        Self::Band(v)
    }
}

impl From<ActivityKind> for Value {
    fn from(v: ActivityKind) -> Self {
        Self::Kind(v)
    }
}

impl From<ModelKind> for Value {
    fn from(v: ModelKind) -> Self {
        Self::Model(v)
    }
}

impl From<Code> for Value {
    fn from(v: Code) -> Self {
        Self::Code(v)
    }
}
