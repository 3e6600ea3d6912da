//! Discrete Bayesian risk model.
//!
//! A small, fixed family of networks over 5-ary ordinal variables: three
//! observed parents feeding one `Advice` node. Tables are synthesized
//! analytically ([`BayesianNetwork::build`]), queried exactly
//! ([`BayesianNetwork::infer`]), and optionally re-estimated from observed
//! data with additive smoothing ([`BayesianNetwork::learn`]).

mod infer;
mod learn;
mod synthesis;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::{Code, CARDINALITY};
use crate::error::{ModelError, ValidationError};

pub use infer::{EvidenceSet, Posterior, RISK_ALERT_THRESHOLD};
pub use learn::{Dataset, SMOOTHING_ALPHA};

/// Floating tolerance for row-sum checks.
pub const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// Identifier of a network variable.
///
/// Serialized names double as dataset column names, so they are spelled
/// exactly as the observation files spell them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeId {
    Wind,
    Cold,
    Rain,
    Activity,
    Advice,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Wind => "Wind",
            Self::Cold => "Cold",
            Self::Rain => "Rain",
            Self::Activity => "Activity",
            Self::Advice => "Advice",
        };
        write!(f, "{name}")
    }
}

/// A network variable: name plus cardinality.
///
/// Every variable here is 5-ary and its state labels are the codes 0-4
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscreteVariable {
    /// The variable's identifier.
    pub name: NodeId,
    /// Number of states (always [`CARDINALITY`]).
    pub cardinality: usize,
}

impl DiscreteVariable {
    /// Creates a 5-ary variable.
    #[must_use]
    pub const fn new(name: NodeId) -> Self {
        Self {
            name,
            cardinality: CARDINALITY,
        }
    }

    /// The ordered state labels (the codes themselves).
    #[must_use]
    pub const fn states(&self) -> [Code; CARDINALITY] {
        Code::all()
    }
}

/// The two fixed network parameterizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// {Wind, Cold, Rain} -> Advice.
    ColdBranch,
    /// {Activity, Wind, Rain} -> Advice.
    HotBranch,
}

impl Topology {
    /// The Advice node's parents, in CPT index order.
    #[must_use]
    pub const fn parents(self) -> [NodeId; 3] {
        match self {
            Self::ColdBranch => [NodeId::Wind, NodeId::Cold, NodeId::Rain],
            Self::HotBranch => [NodeId::Activity, NodeId::Wind, NodeId::Rain],
        }
    }

    /// All variables of the network: the parents plus Advice.
    #[must_use]
    pub const fn variables(self) -> [NodeId; 4] {
        match self {
            Self::ColdBranch => [NodeId::Wind, NodeId::Cold, NodeId::Rain, NodeId::Advice],
            Self::HotBranch => [NodeId::Activity, NodeId::Wind, NodeId::Rain, NodeId::Advice],
        }
    }

    /// Dataset columns required to re-learn this topology.
    #[must_use]
    pub const fn required_columns(self) -> [NodeId; 4] {
        self.variables()
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColdBranch => write!(f, "cold-branch"),
            Self::HotBranch => write!(f, "hot-branch"),
        }
    }
}

/// A conditional probability table.
///
/// One row per combination of parent states (mixed-radix, first parent most
/// significant); a root table has no parents and exactly one row. Invariant:
/// every entry is in `[0, 1]` and every row sums to 1 within
/// [`ROW_SUM_TOLERANCE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cpt {
    child: NodeId,
    parents: Vec<NodeId>,
    rows: Vec<[f64; CARDINALITY]>,
}

impl Cpt {
    /// Creates a validated root table from a single distribution.
    pub fn root(child: NodeId, distribution: [f64; CARDINALITY]) -> Result<Self, ValidationError> {
        let cpt = Self {
            child,
            parents: Vec::new(),
            rows: vec![distribution],
        };
        cpt.validate()?;
        Ok(cpt)
    }

    /// Creates a validated conditional table.
    ///
    /// `rows` must contain `CARDINALITY^parents.len()` distributions in
    /// mixed-radix parent order.
    pub fn new(
        child: NodeId,
        parents: Vec<NodeId>,
        rows: Vec<[f64; CARDINALITY]>,
    ) -> Result<Self, ValidationError> {
        let expected = CARDINALITY.pow(parents.len() as u32);
        if rows.len() != expected {
            return Err(ValidationError::MissingField {
                field: format!("{} CPT rows (got {}, expected {expected})", child, rows.len()),
            });
        }
        let cpt = Self { child, parents, rows };
        cpt.validate()?;
        Ok(cpt)
    }

    /// Internal constructor for tables that are normalized by construction.
    pub(crate) fn from_rows_unchecked(
        child: NodeId,
        parents: Vec<NodeId>,
        rows: Vec<[f64; CARDINALITY]>,
    ) -> Self {
        debug_assert_eq!(rows.len(), CARDINALITY.pow(parents.len() as u32));
        Self { child, parents, rows }
    }

    /// The variable this table describes.
    #[must_use]
    pub fn child(&self) -> NodeId {
        self.child
    }

    /// The parent variables, in index order.
    #[must_use]
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// True if this is a root (prior) table.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// All rows, in mixed-radix parent order.
    #[must_use]
    pub fn rows(&self) -> &[[f64; CARDINALITY]] {
        &self.rows
    }

    /// Mixed-radix index of a parent-state combination.
    pub(crate) fn row_index(&self, parent_codes: &[Code]) -> usize {
        debug_assert_eq!(parent_codes.len(), self.parents.len());
        parent_codes
            .iter()
            .fold(0, |acc, code| acc * CARDINALITY + code.index())
    }

    /// The distribution for one combination of parent states.
    #[must_use]
    pub fn row(&self, parent_codes: &[Code]) -> &[f64; CARDINALITY] {
        &self.rows[self.row_index(parent_codes)]
    }

    /// Checks all table invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for row in &self.rows {
            let mut sum = 0.0;
            for &p in row {
                if !(0.0..=1.0).contains(&p) {
                    return Err(ValidationError::ProbabilityOutOfRange { value: p });
                }
                sum += p;
            }
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(ValidationError::DistributionNotNormalized {
                    sum,
                    tolerance: ROW_SUM_TOLERANCE,
                });
            }
        }
        Ok(())
    }
}

/// A fixed-topology discrete Bayesian network.
///
/// Immutable once built; [`BayesianNetwork::learn`] returns a replacement
/// network rather than mutating in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BayesianNetwork {
    topology: Topology,
    variables: Vec<DiscreteVariable>,
    cpts: BTreeMap<NodeId, Cpt>,
}

impl BayesianNetwork {
    pub(crate) fn from_parts(topology: Topology, cpts: BTreeMap<NodeId, Cpt>) -> Self {
        let variables = topology
            .variables()
            .iter()
            .map(|&name| DiscreteVariable::new(name))
            .collect();
        Self {
            topology,
            variables,
            cpts,
        }
    }

    /// The network's parameterization.
    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// The network's variables.
    #[must_use]
    pub fn variables(&self) -> &[DiscreteVariable] {
        &self.variables
    }

    /// True if `node` is a variable of this network.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.cpts.contains_key(&node)
    }

    /// The table for one variable.
    #[must_use]
    pub fn cpt(&self, node: NodeId) -> Option<&Cpt> {
        self.cpts.get(&node)
    }

    /// Validates every table plus the edge set.
    ///
    /// The edge sets are hand-specified and fixed, so this is a safety net
    /// rather than a load-bearing check.
    pub fn validate(&self) -> Result<(), ModelError> {
        for cpt in self.cpts.values() {
            cpt.validate()
                .map_err(|e| ModelError::InvalidNetwork {
                    reason: format!("{} table: {e}", cpt.child()),
                })?;
            for parent in cpt.parents() {
                if !self.cpts.contains_key(parent) {
                    return Err(ModelError::InvalidNetwork {
                        reason: format!("{} references missing parent {parent}", cpt.child()),
                    });
                }
            }
        }
        self.check_acyclic()
    }

    fn check_acyclic(&self) -> Result<(), ModelError> {
        // Depth-first walk along parent edges; a repeat on the current path
        // is a cycle.
        fn visit(
            net: &BayesianNetwork,
            node: NodeId,
            path: &mut Vec<NodeId>,
            done: &mut Vec<NodeId>,
        ) -> Result<(), ModelError> {
            if done.contains(&node) {
                return Ok(());
            }
            if path.contains(&node) {
                return Err(ModelError::InvalidNetwork {
                    reason: format!("cycle through {node}"),
                });
            }
            path.push(node);
            if let Some(cpt) = net.cpt(node) {
                for &parent in cpt.parents() {
                    visit(net, parent, path, done)?;
                }
            }
            path.pop();
            done.push(node);
            Ok(())
        }

        let mut done = Vec::new();
        for &node in self.cpts.keys() {
            visit(self, node, &mut Vec::new(), &mut done)?;
        }
        Ok(())
    }
}
