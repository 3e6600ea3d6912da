//! Session context: the single owner of per-run state.
//!
//! Everything a rule action touches goes through this object - the
//! collaborators, the learning configuration, and the risk network built
//! once an assessment is needed. Weather values themselves live in the
//! engine's working memory, never here.

use std::path::PathBuf;

use crate::bayes::{BayesianNetwork, Topology};
use crate::sources::{KnowledgeBase, UserPrompt, WeatherSource};

/// Per-session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Observation dataset for the cold-branch network.
    pub cold_dataset: PathBuf,
    /// Observation dataset for the hot-branch network.
    pub hot_dataset: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cold_dataset: PathBuf::from("data/dataset_cold.json"),
            hot_dataset: PathBuf::from("data/dataset_hot.json"),
        }
    }
}

impl SessionConfig {
    /// The dataset path for one topology.
    #[must_use]
    pub fn dataset_for(&self, topology: Topology) -> &PathBuf {
        match topology {
            Topology::ColdBranch => &self.cold_dataset,
            Topology::HotBranch => &self.hot_dataset,
        }
    }
}

/// Mutable state threaded through every rule action.
pub struct SessionContext {
    prompt: Box<dyn UserPrompt>,
    weather: Box<dyn WeatherSource>,
    knowledge: Box<dyn KnowledgeBase>,
    config: SessionConfig,
    network: Option<BayesianNetwork>,
}

impl SessionContext {
    /// Creates a context over the given collaborators.
    #[must_use]
    pub fn new(
        prompt: Box<dyn UserPrompt>,
        weather: Box<dyn WeatherSource>,
        knowledge: Box<dyn KnowledgeBase>,
    ) -> Self {
        Self {
            prompt,
            weather,
            knowledge,
            config: SessionConfig::default(),
            network: None,
        }
    }

    /// Replaces the default configuration.
    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// The interactive prompt.
    pub fn prompt(&mut self) -> &mut dyn UserPrompt {
        self.prompt.as_mut()
    }

    /// The weather source.
    #[must_use]
    pub fn weather(&self) -> &dyn WeatherSource {
        self.weather.as_ref()
    }

    /// The recommendation catalog.
    #[must_use]
    pub fn knowledge(&self) -> &dyn KnowledgeBase {
        self.knowledge.as_ref()
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The risk network built (or learned) for the requested topology.
    ///
    /// Built lazily on first use; a session only ever needs one topology,
    /// so a band flip mid-session replaces the network.
    pub fn network_for(&mut self, topology: Topology) -> &BayesianNetwork {
        if !matches!(&self.network, Some(network) if network.topology() == topology) {
            self.network = None;
        }
        self.network
            .get_or_insert_with(|| BayesianNetwork::build(topology))
    }

    /// Replaces the session's network (learned parameterization).
    pub fn replace_network(&mut self, network: BayesianNetwork) {
        self.network = Some(network);
    }

    /// The current network, if an assessment has happened.
    #[must_use]
    pub fn network(&self) -> Option<&BayesianNetwork> {
        self.network.as_ref()
    }
}
