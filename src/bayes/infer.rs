//! Exact inference over the Advice node.
//!
//! The calling pattern always observes every parent, which reduces the
//! query to a single CPT row lookup. The general case (partial evidence)
//! is still supported: unobserved parents are marginalized by summing
//! prior-weighted products over their states.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{BayesianNetwork, NodeId};
use crate::codec::{Code, CARDINALITY};
use crate::error::ModelError;

/// Observed variable assignments conditioning a query.
///
/// A strict subset of the network's variables; Advice is never observed.
pub type EvidenceSet = BTreeMap<NodeId, Code>;

/// Risk-score percentage at or above which the advice is an alert.
pub const RISK_ALERT_THRESHOLD: f64 = 35.0;

/// Posterior distribution over the Advice states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posterior {
    probabilities: [f64; CARDINALITY],
}

impl Posterior {
    pub(crate) fn new(probabilities: [f64; CARDINALITY]) -> Self {
        Self { probabilities }
    }

    /// The per-state probabilities, index = advice code.
    #[must_use]
    pub const fn probabilities(&self) -> &[f64; CARDINALITY] {
        &self.probabilities
    }

    /// Probability of one advice state.
    #[must_use]
    pub fn probability(&self, state: Code) -> f64 {
        self.probabilities[state.index()]
    }

    /// Dissatisfaction risk as a percentage.
    ///
    /// Defined as the mass on the two worst advice states, times 100.
    #[must_use]
    pub fn risk_score(&self) -> f64 {
        (self.probabilities[3] + self.probabilities[4]) * 100.0
    }

    /// True if the risk score reaches the alert threshold.
    #[must_use]
    pub fn is_elevated(&self) -> bool {
        self.risk_score() >= RISK_ALERT_THRESHOLD
    }
}

impl BayesianNetwork {
    /// Computes the exact posterior marginal of Advice given the evidence.
    ///
    /// # Errors
    ///
    /// Fails if the evidence references a variable outside the network or
    /// observes Advice itself. Either failure aborts only this call; the
    /// network is untouched.
    pub fn infer(&self, evidence: &EvidenceSet) -> Result<Posterior, ModelError> {
        if evidence.contains_key(&NodeId::Advice) {
            return Err(ModelError::TargetObserved {
                variable: NodeId::Advice,
            });
        }
        for variable in evidence.keys() {
            if !self.contains(*variable) {
                return Err(ModelError::UnknownVariable {
                    variable: *variable,
                });
            }
        }

        let advice = self
            .cpt(NodeId::Advice)
            .ok_or(ModelError::InvalidNetwork {
                reason: "network has no Advice table".to_string(),
            })?;
        let parents = advice.parents().to_vec();

        // Parents without evidence get marginalized below.
        let hidden: Vec<NodeId> = parents
            .iter()
            .copied()
            .filter(|p| !evidence.contains_key(p))
            .collect();

        let mut accumulated = [0.0; CARDINALITY];
        let mut assignment: BTreeMap<NodeId, Code> = evidence.clone();
        self.enumerate(&parents, &hidden, 0, 1.0, &mut assignment, advice, &mut accumulated)?;

        // Evidence weights are constant across advice states, so the
        // posterior is the accumulated mass renormalized.
        let total: f64 = accumulated.iter().sum();
        if total > 0.0 {
            for p in &mut accumulated {
                *p /= total;
            }
        }
        Ok(Posterior::new(accumulated))
    }

    #[allow(clippy::too_many_arguments)]
    fn enumerate(
        &self,
        parents: &[NodeId],
        hidden: &[NodeId],
        depth: usize,
        weight: f64,
        assignment: &mut BTreeMap<NodeId, Code>,
        advice: &super::Cpt,
        accumulated: &mut [f64; CARDINALITY],
    ) -> Result<(), ModelError> {
        if depth == hidden.len() {
            let codes: Vec<Code> = parents.iter().map(|p| assignment[p]).collect();
            let row = advice.row(&codes);
            for (acc, p) in accumulated.iter_mut().zip(row.iter()) {
                *acc += weight * p;
            }
            return Ok(());
        }

        let node = hidden[depth];
        let prior = self.cpt(node).ok_or(ModelError::InvalidNetwork {
            reason: format!("network has no table for {node}"),
        })?;
        for state in Code::all() {
            let p = prior.rows()[0][state.index()];
            assignment.insert(node, state);
            self.enumerate(
                parents,
                hidden,
                depth + 1,
                weight * p,
                assignment,
                advice,
                accumulated,
            )?;
        }
        assignment.remove(&node);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bayes::Topology;

    fn code(v: u8) -> Code {
        Code::new(v).unwrap()
    }

    fn evidence(pairs: &[(NodeId, u8)]) -> EvidenceSet {
        pairs.iter().map(|&(n, v)| (n, code(v))).collect()
    }

    #[test]
    fn test_full_evidence_is_row_lookup() {
        let net = BayesianNetwork::build(Topology::ColdBranch);
        let posterior = net
            .infer(&evidence(&[
                (NodeId::Wind, 1),
                (NodeId::Cold, 2),
                (NodeId::Rain, 0),
            ]))
            .unwrap();

        // Worst parent 2: risk 0.40, split 0.20/0.20.
        let p = posterior.probabilities();
        assert!((p[3] - 0.20).abs() < 1e-12);
        assert!((p[4] - 0.20).abs() < 1e-12);
        assert!((posterior.risk_score() - 40.0).abs() < 1e-9);
        assert!(posterior.is_elevated());
    }

    #[test]
    fn test_partial_evidence_marginalizes() {
        let net = BayesianNetwork::build(Topology::ColdBranch);
        let posterior = net
            .infer(&evidence(&[(NodeId::Wind, 0), (NodeId::Cold, 0)]))
            .unwrap();

        // Rain marginalized against its prior [0.50,0.20,0.15,0.10,0.05]:
        // risk = 0.5*0 + 0.2*0.25 + 0.15*0.40 + 0.10*0.60 + 0.05*0.80 = 0.21.
        assert!((posterior.risk_score() - 21.0).abs() < 1e-9);
        assert!(!posterior.is_elevated());
    }

    #[test]
    fn test_no_evidence_marginalizes_everything() {
        let net = BayesianNetwork::build(Topology::HotBranch);
        let posterior = net.infer(&EvidenceSet::new()).unwrap();
        let sum: f64 = posterior.probabilities().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        // With all parents free, some risk mass must remain.
        assert!(posterior.risk_score() > 0.0);
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let net = BayesianNetwork::build(Topology::ColdBranch);
        let err = net
            .infer(&evidence(&[(NodeId::Activity, 1)]))
            .unwrap_err();
        assert!(matches!(err, ModelError::UnknownVariable { .. }));
    }

    #[test]
    fn test_advice_evidence_rejected() {
        let net = BayesianNetwork::build(Topology::ColdBranch);
        let err = net.infer(&evidence(&[(NodeId::Advice, 0)])).unwrap_err();
        assert!(matches!(err, ModelError::TargetObserved { .. }));
    }

    #[test]
    fn test_risk_score_definition() {
        let posterior = Posterior::new([0.1, 0.2, 0.3, 0.25, 0.15]);
        assert!((posterior.risk_score() - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_alert_threshold_boundary() {
        let below = Posterior::new([0.4, 0.2, 0.05001, 0.2, 0.14999]);
        assert!((below.risk_score() - 34.999).abs() < 1e-9);
        assert!(!below.is_elevated());

        let at = Posterior::new([0.4, 0.2, 0.05, 0.2, 0.15]);
        assert!((at.risk_score() - 35.0).abs() < 1e-12);
        assert!(at.is_elevated());
    }
}
