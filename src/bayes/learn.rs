//! Parameter re-estimation from observed data.
//!
//! Every table is re-learned by counting (parent-combination, own-state)
//! co-occurrences with add-one smoothing, so no cell is ever exactly 0 or 1
//! even under sparse data. Learning is a pure transformation: the source
//! network is untouched and a replacement is returned.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use super::{BayesianNetwork, Cpt, NodeId};
use crate::codec::{Code, CARDINALITY};
use crate::error::ModelError;

/// Laplace smoothing constant added to every count cell.
pub const SMOOTHING_ALPHA: f64 = 1.0;

/// A tabular dataset of discrete-coded observations.
///
/// Columns are variable names; every cell is an ordinal code. Rows are
/// complete (each row has a value for every column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<NodeId>,
    rows: Vec<Vec<Code>>,
}

impl Dataset {
    /// Creates a dataset, checking that every row matches the column list.
    pub fn new(columns: Vec<NodeId>, rows: Vec<Vec<Code>>) -> Result<Self, ModelError> {
        for row in &rows {
            if row.len() != columns.len() {
                return Err(ModelError::DatasetUnreadable {
                    message: format!(
                        "row has {} cells, expected {}",
                        row.len(),
                        columns.len()
                    ),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Parses a dataset from a JSON array of records.
    ///
    /// Every record must carry the same columns; codes outside 0-4 are
    /// rejected by `Code` deserialization.
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let records: Vec<BTreeMap<NodeId, Code>> =
            serde_json::from_str(json).map_err(|e| ModelError::DatasetUnreadable {
                message: e.to_string(),
            })?;
        let Some(first) = records.first() else {
            return Err(ModelError::EmptyDataset);
        };
        let columns: Vec<NodeId> = first.keys().copied().collect();
        let mut rows = Vec::with_capacity(records.len());
        for record in &records {
            let mut row = Vec::with_capacity(columns.len());
            for column in &columns {
                let Some(&code) = record.get(column) else {
                    return Err(ModelError::DatasetUnreadable {
                        message: format!("record is missing column {column}"),
                    });
                };
                row.push(code);
            }
            if record.len() != columns.len() {
                return Err(ModelError::DatasetUnreadable {
                    message: "records carry inconsistent columns".to_string(),
                });
            }
            rows.push(row);
        }
        Self::new(columns, rows)
    }

    /// Reads a dataset from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let json = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ModelError::DatasetUnreadable {
                message: format!("{}: {e}", path.as_ref().display()),
            }
        })?;
        Self::from_json_str(&json)
    }

    /// Column index of a variable, if present.
    #[must_use]
    pub fn column(&self, node: NodeId) -> Option<usize> {
        self.columns.iter().position(|&c| c == node)
    }

    /// The dataset's columns.
    #[must_use]
    pub fn columns(&self) -> &[NodeId] {
        &self.columns
    }

    /// Number of observation rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the dataset has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn cell(&self, row: usize, column: usize) -> Code {
        self.rows[row][column]
    }
}

impl BayesianNetwork {
    /// Re-estimates every table from the dataset.
    ///
    /// Counts co-occurrences of each variable's state with its parents'
    /// states, adds [`SMOOTHING_ALPHA`] to every cell, and normalizes.
    /// Returns a new network with the same topology; `self` is unchanged.
    ///
    /// # Errors
    ///
    /// Fails without side effects if the dataset is empty or lacks a
    /// required column for this topology.
    pub fn learn(&self, dataset: &Dataset) -> Result<BayesianNetwork, ModelError> {
        if dataset.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        let topology = self.topology();
        let mut column_of = BTreeMap::new();
        for node in topology.required_columns() {
            let index = dataset
                .column(node)
                .ok_or(ModelError::MissingColumn { column: node })?;
            column_of.insert(node, index);
        }

        let mut cpts = BTreeMap::new();
        for variable in self.variables() {
            let node = variable.name;
            let parents: Vec<NodeId> = self
                .cpt(node)
                .map(|cpt| cpt.parents().to_vec())
                .unwrap_or_default();

            let row_count = CARDINALITY.pow(parents.len() as u32);
            let mut counts = vec![[SMOOTHING_ALPHA; CARDINALITY]; row_count];

            for row in 0..dataset.len() {
                let combo_index = parents.iter().fold(0, |acc, parent| {
                    acc * CARDINALITY + dataset.cell(row, column_of[parent]).index()
                });
                let state = dataset.cell(row, column_of[&node]);
                counts[combo_index][state.index()] += 1.0;
            }

            let rows: Vec<[f64; CARDINALITY]> = counts
                .into_iter()
                .map(|row| {
                    let total: f64 = row.iter().sum();
                    row.map(|c| c / total)
                })
                .collect();
            cpts.insert(node, Cpt::from_rows_unchecked(node, parents, rows));
        }

        debug!(
            topology = %topology,
            observations = dataset.len(),
            "re-learned network parameters"
        );
        Ok(BayesianNetwork::from_parts(topology, cpts))
    }
}
