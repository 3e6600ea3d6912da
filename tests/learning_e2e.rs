//! Model-level scenarios over the shipped observation datasets.

use skycast::bayes::{BayesianNetwork, Dataset, EvidenceSet, NodeId, Topology};
use skycast::codec::Code;

fn code(v: u8) -> Code {
    Code::new(v).unwrap()
}

fn evidence(pairs: &[(NodeId, u8)]) -> EvidenceSet {
    pairs.iter().map(|&(n, v)| (n, code(v))).collect()
}

#[test]
fn shipped_cold_dataset_learns_a_valid_network() {
    let dataset = Dataset::from_path("data/dataset_cold.json").unwrap();
    assert!(dataset.len() >= 40);

    let analytic = BayesianNetwork::build(Topology::ColdBranch);
    let learned = analytic.learn(&dataset).unwrap();
    learned.validate().unwrap();

    // The analytic network is untouched by learning.
    assert_eq!(analytic, BayesianNetwork::build(Topology::ColdBranch));
    assert_ne!(learned, analytic);
}

#[test]
fn shipped_hot_dataset_learns_a_valid_network() {
    let dataset = Dataset::from_path("data/dataset_hot.json").unwrap();
    let learned = BayesianNetwork::build(Topology::HotBranch)
        .learn(&dataset)
        .unwrap();
    learned.validate().unwrap();
    assert!(dataset.column(NodeId::Activity).is_some());
    assert!(dataset.column(NodeId::Cold).is_none());
}

#[test]
fn learned_network_still_answers_full_evidence_queries() {
    let dataset = Dataset::from_path("data/dataset_cold.json").unwrap();
    let learned = BayesianNetwork::build(Topology::ColdBranch)
        .learn(&dataset)
        .unwrap();

    let posterior = learned
        .infer(&evidence(&[
            (NodeId::Wind, 1),
            (NodeId::Cold, 2),
            (NodeId::Rain, 0),
        ]))
        .unwrap();

    let sum: f64 = posterior.probabilities().iter().sum();
    assert!((sum - 1.0).abs() < 1e-9);
    // Smoothing floor: no state collapses to zero.
    for &p in posterior.probabilities() {
        assert!(p > 0.0);
    }
}

#[test]
fn datasets_reject_the_wrong_branch() {
    let hot = Dataset::from_path("data/dataset_hot.json").unwrap();
    let cold_net = BayesianNetwork::build(Topology::ColdBranch);
    assert!(cold_net.learn(&hot).is_err());

    let cold = Dataset::from_path("data/dataset_cold.json").unwrap();
    let hot_net = BayesianNetwork::build(Topology::HotBranch);
    assert!(hot_net.learn(&cold).is_err());
}

#[test]
fn extreme_observations_dominate_after_learning() {
    // Append many identical extreme rows; the learned row must approach
    // certainty while keeping every cell strictly positive.
    let mut rows = Vec::new();
    for _ in 0..400 {
        rows.push(vec![code(2), code(2), code(2), code(4)]);
    }
    let dataset = Dataset::new(
        vec![NodeId::Wind, NodeId::Cold, NodeId::Rain, NodeId::Advice],
        rows,
    )
    .unwrap();

    let learned = BayesianNetwork::build(Topology::ColdBranch)
        .learn(&dataset)
        .unwrap();
    let posterior = learned
        .infer(&evidence(&[
            (NodeId::Wind, 2),
            (NodeId::Cold, 2),
            (NodeId::Rain, 2),
        ]))
        .unwrap();

    assert!(posterior.probability(code(4)) > 0.98);
    for &p in posterior.probabilities() {
        assert!(p > 0.0);
    }
    assert!(posterior.is_elevated());
}
