//! # Skycast - weather-aware activity advisor
//!
//! Skycast drives an interactive questionnaire with a forward-chaining
//! production-rule engine and estimates a numeric "dissatisfaction risk"
//! from weather extremes with a discrete Bayesian network.
//!
//! ## Core concepts
//!
//! - **Fact**: an immutable key/value record in the session's working memory
//! - **Rule**: a salience-prioritized condition/action pair; the engine
//!   fires the highest-priority match until a terminal state is asserted
//! - **Code**: an ordinal evidence value 0-4 produced by the codec
//! - **BayesianNetwork**: three observed parents feeding one Advice node;
//!   tables synthesized analytically or re-learned from observations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use skycast::advisor::{Advisor, SessionContext};
//! use skycast::sources::{CatalogKnowledgeBase, ConsolePrompt, OpenMeteoSource};
//!
//! let ctx = SessionContext::new(
//!     Box::new(ConsolePrompt::new()),
//!     Box::new(OpenMeteoSource::new()?),
//!     Box::new(CatalogKnowledgeBase::builtin()?),
//! );
//! let outcome = Advisor::new(ctx).run()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod codec;
pub mod error;
pub mod fact;
pub mod state;
pub mod value;

// Engines
pub mod bayes;
pub mod workflow;

// Session assembly and collaborators
pub mod advisor;
pub mod sources;

// Re-export primary types at crate root for convenience
pub use advisor::{Advisor, SessionConfig, SessionContext, SessionOutcome};
pub use bayes::{
    BayesianNetwork, Cpt, Dataset, DiscreteVariable, EvidenceSet, NodeId, Posterior, Topology,
    RISK_ALERT_THRESHOLD,
};
pub use codec::Code;
pub use error::{ModelError, SkycastError, SkycastResult, SourceError, ValidationError, WorkflowError};
pub use fact::{Fact, FactKey, WorkingMemory};
pub use state::{ActivityKind, ModelKind, Place, SessionState, SkyCondition, TempBand, TimeOfDay};
pub use value::Value;
pub use workflow::{
    Bindings, Condition, Effects, FactPattern, Rule, RunOutcome, WorkflowEngine,
};
