//! The advisory session facade.
//!
//! Wires the rule set, the risk model, and the collaborators together and
//! runs the questionnaire to completion.

mod risk;
mod rules;
mod session;

use tracing::{error, info};

use crate::error::{SkycastResult, WorkflowError};
use crate::fact::Fact;
use crate::state::SessionState;
use crate::workflow::{RunOutcome, WorkflowEngine};

pub use risk::{assess, evidence_for, topology_for};
pub use session::{SessionConfig, SessionContext};

/// How the questionnaire ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Recommendations were printed and the session closed normally.
    Completed,
    /// The user declined to continue after a failed online fetch.
    Aborted,
}

/// An interactive advisory session.
pub struct Advisor {
    engine: WorkflowEngine<SessionContext>,
    ctx: SessionContext,
}

impl Advisor {
    /// Builds a session over the given context.
    ///
    /// Registers the full rule set and seeds the initial state.
    #[must_use]
    pub fn new(ctx: SessionContext) -> Self {
        let mut engine = WorkflowEngine::new();
        rules::register_all(&mut engine);
        engine.declare(Fact::action(SessionState::AskSearchMode));
        Self { engine, ctx }
    }

    /// Runs the questionnaire to completion.
    ///
    /// # Errors
    ///
    /// Collaborator errors that a rule cannot absorb (a closed input
    /// stream) propagate. A run that stops without reaching a terminal
    /// state indicates a rule-set bug and is reported as
    /// [`WorkflowError::Stalled`] with the working-memory snapshot.
    pub fn run(mut self) -> SkycastResult<SessionOutcome> {
        info!("advisory session starting");
        match self.engine.run(&mut self.ctx)? {
            RunOutcome::Halted(SessionState::Aborted) => {
                info!("session aborted by the user");
                Ok(SessionOutcome::Aborted)
            }
            RunOutcome::Halted(state) => {
                info!(state = %state, "session complete");
                Ok(SessionOutcome::Completed)
            }
            RunOutcome::Exhausted => {
                let memory = self.engine.memory().snapshot();
                error!(?memory, "rule set stalled before reaching a terminal state");
                Err(WorkflowError::Stalled { memory }.into())
            }
        }
    }
}
