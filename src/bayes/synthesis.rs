//! Analytic table synthesis.
//!
//! Root priors are fixed literal tables; the Advice table is generated from
//! the max-parent step rule. These constants are shared with the historical
//! observation datasets and must not drift.

use std::collections::BTreeMap;

use super::{BayesianNetwork, Cpt, NodeId, Topology};
use crate::codec::CARDINALITY;

/// Cold-branch wind prior: stronger winds dominate the cold season.
const COLD_WIND_PRIOR: [f64; CARDINALITY] = [0.05, 0.10, 0.20, 0.25, 0.40];

/// Cold-branch temperature prior.
const COLD_TEMP_PRIOR: [f64; CARDINALITY] = [0.18, 0.18, 0.18, 0.18, 0.28];

/// Cold-branch rain prior: intense rain is rare.
const COLD_RAIN_PRIOR: [f64; CARDINALITY] = [0.50, 0.20, 0.15, 0.10, 0.05];

/// Hot-branch activity (heat-index) prior: uniform.
const HOT_ACTIVITY_PRIOR: [f64; CARDINALITY] = [0.2, 0.2, 0.2, 0.2, 0.2];

/// Hot-branch wind prior: lighter winds dominate.
const HOT_WIND_PRIOR: [f64; CARDINALITY] = [0.25, 0.30, 0.20, 0.15, 0.10];

/// Hot-branch rain prior.
const HOT_RAIN_PRIOR: [f64; CARDINALITY] = [0.20, 0.40, 0.20, 0.15, 0.05];

/// Risk scalar per worst parent code.
const RISK_STEP: [f64; CARDINALITY] = [0.0, 0.25, 0.40, 0.60, 0.80];

/// The risk scalar for a given worst parent code.
#[must_use]
pub(crate) fn risk_step(max_parent_code: usize) -> f64 {
    RISK_STEP[max_parent_code]
}

/// One synthesized Advice row for a parent combination.
///
/// Half the risk mass goes to each of the two worst advice states; the
/// remainder is split evenly over the three best. The remainder clamp keeps
/// the function total even though risk never exceeds 0.8 here.
fn advice_row(max_parent_code: usize) -> [f64; CARDINALITY] {
    let risk = risk_step(max_parent_code);
    let worst = risk / 2.0;
    let remainder = (1.0 - risk).max(0.0);
    let best = remainder / 3.0;
    [best, best, best, worst, worst]
}

/// Synthesizes the full Advice table for three 5-ary parents.
fn advice_cpt(parents: [NodeId; 3]) -> Cpt {
    let mut rows = Vec::with_capacity(CARDINALITY.pow(3));
    for a in 0..CARDINALITY {
        for b in 0..CARDINALITY {
            for c in 0..CARDINALITY {
                rows.push(advice_row(a.max(b).max(c)));
            }
        }
    }
    Cpt::from_rows_unchecked(NodeId::Advice, parents.to_vec(), rows)
}

fn prior(topology: Topology, node: NodeId) -> [f64; CARDINALITY] {
    match (topology, node) {
        (Topology::ColdBranch, NodeId::Wind) => COLD_WIND_PRIOR,
        (Topology::ColdBranch, NodeId::Cold) => COLD_TEMP_PRIOR,
        (Topology::ColdBranch, NodeId::Rain) => COLD_RAIN_PRIOR,
        (Topology::HotBranch, NodeId::Activity) => HOT_ACTIVITY_PRIOR,
        (Topology::HotBranch, NodeId::Wind) => HOT_WIND_PRIOR,
        (Topology::HotBranch, NodeId::Rain) => HOT_RAIN_PRIOR,
        // The topology's parent list is closed; no other pairing exists.
        _ => unreachable!("no prior for {node} in {topology}"),
    }
}

impl BayesianNetwork {
    /// Builds the analytic network for one topology.
    ///
    /// Root tables come from the fixed priors; the Advice table is
    /// synthesized from the max-parent step rule. The result is immutable;
    /// re-learning produces a replacement network.
    #[must_use]
    pub fn build(topology: Topology) -> Self {
        let parents = topology.parents();
        let mut cpts = BTreeMap::new();
        for node in parents {
            cpts.insert(
                node,
                Cpt::from_rows_unchecked(node, Vec::new(), vec![prior(topology, node)]),
            );
        }
        cpts.insert(NodeId::Advice, advice_cpt(parents));
        Self::from_parts(topology, cpts)
    }
}
