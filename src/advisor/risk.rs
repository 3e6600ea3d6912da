//! Risk assessment glue between the questionnaire and the Bayesian model.
//!
//! Selects the topology from the temperature band, assembles the evidence
//! set, and runs the session's current network. The normal band never
//! reaches this module.

use tracing::warn;

use super::session::SessionContext;
use crate::bayes::{Dataset, EvidenceSet, NodeId, Posterior, Topology};
use crate::codec::Code;
use crate::error::ModelError;
use crate::state::TempBand;

/// The network parameterization for a band, if the band is assessed at all.
#[must_use]
pub fn topology_for(band: TempBand) -> Option<Topology> {
    match band {
        TempBand::Cold(_) => Some(Topology::ColdBranch),
        TempBand::Hot(_) => Some(Topology::HotBranch),
        TempBand::Normal => None,
    }
}

/// Assembles the evidence set for one assessment.
///
/// Every parent of the Advice node is observed: the cold branch feeds the
/// temperature code into `Cold`, the hot branch feeds it into `Activity`
/// (the heat-index variable).
#[must_use]
pub fn evidence_for(topology: Topology, temp_code: Code, wind: Code, rain: Code) -> EvidenceSet {
    let mut evidence = EvidenceSet::new();
    match topology {
        Topology::ColdBranch => {
            evidence.insert(NodeId::Cold, temp_code);
        }
        Topology::HotBranch => {
            evidence.insert(NodeId::Activity, temp_code);
        }
    }
    evidence.insert(NodeId::Wind, wind);
    evidence.insert(NodeId::Rain, rain);
    evidence
}

/// Runs the session's network for the given band and observations.
///
/// Builds the network on first use. Returns `None` for the normal band,
/// which is never assessed.
pub fn assess(
    ctx: &mut SessionContext,
    band: TempBand,
    wind: Code,
    rain: Code,
) -> Result<Option<Posterior>, ModelError> {
    let Some(topology) = topology_for(band) else {
        return Ok(None);
    };
    let Some(temp_code) = band.code() else {
        return Ok(None);
    };
    let evidence = evidence_for(topology, temp_code, wind, rain);
    let posterior = ctx.network_for(topology).infer(&evidence)?;
    Ok(Some(posterior))
}

/// Replaces the session network with one learned from the configured
/// dataset.
///
/// On any failure the analytic network stays in place: learning is an
/// optional refinement and a broken dataset must not end the session.
/// Returns whether the replacement happened.
pub fn learn_from_dataset(ctx: &mut SessionContext, topology: Topology) -> bool {
    let path = ctx.config().dataset_for(topology).clone();
    let learned = Dataset::from_path(&path)
        .and_then(|dataset| ctx.network_for(topology).learn(&dataset));
    match learned {
        Ok(network) => {
            ctx.replace_network(network);
            true
        }
        Err(error) => {
            warn!(
                dataset = %path.display(),
                %error,
                "dataset learning failed; keeping the analytic network"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(v: u8) -> Code {
        Code::new(v).unwrap()
    }

    #[test]
    fn test_topology_selection() {
        assert_eq!(
            topology_for(TempBand::Cold(code(1))),
            Some(Topology::ColdBranch)
        );
        assert_eq!(
            topology_for(TempBand::Hot(code(0))),
            Some(Topology::HotBranch)
        );
        assert_eq!(topology_for(TempBand::Normal), None);
    }

    #[test]
    fn test_evidence_shape_cold() {
        let evidence = evidence_for(Topology::ColdBranch, code(2), code(1), code(0));
        assert_eq!(evidence.get(&NodeId::Cold), Some(&code(2)));
        assert_eq!(evidence.get(&NodeId::Wind), Some(&code(1)));
        assert_eq!(evidence.get(&NodeId::Rain), Some(&code(0)));
        assert!(!evidence.contains_key(&NodeId::Activity));
        assert!(!evidence.contains_key(&NodeId::Advice));
    }

    #[test]
    fn test_evidence_shape_hot() {
        let evidence = evidence_for(Topology::HotBranch, code(3), code(0), code(1));
        assert_eq!(evidence.get(&NodeId::Activity), Some(&code(3)));
        assert!(!evidence.contains_key(&NodeId::Cold));
    }
}
