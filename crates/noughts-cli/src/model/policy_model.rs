use anyhow::Context;
use chrono::{DateTime, Utc};
use noughts_evaluator::policy_network::{NetworkTopology, PolicyNetwork};
use noughts_training::evolver::RunStatus;
use serde::{Deserialize, Serialize};

/// A trained network as saved by `noughts train`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub status: RunStatus,
    pub generations_completed: usize,
    pub final_fitness: f32,
    pub topology: NetworkTopology,
    pub weights: Vec<f32>,
}

impl PolicyModel {
    pub fn to_network(&self) -> anyhow::Result<PolicyNetwork> {
        PolicyNetwork::from_genome(self.topology, &self.weights)
            .with_context(|| format!("Model {} has malformed weights", self.name))
    }
}
