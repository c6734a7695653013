//! Feed-forward policy network: board in, cell out.
//!
//! The network has one hidden layer and is fully described by a flat
//! parameter vector (the *genome* evolved by `noughts-training`).
//!
//! # Genome Layout
//!
//! ```text
//! [ hidden row 0 | hidden row 1 | ... | output row 0 | ... | output row 8 ]
//!
//! hidden row j = w[j][0..inputs],  bias_j
//! output row k = v[k][0..hidden],  bias_k
//!
//! len = hidden * (inputs + 1) + outputs * (hidden + 1)
//! ```
//!
//! With the default 9-9-9 topology that is `9 * 10 + 9 * 10 = 180` genes.
//!
//! # Forward Pass
//!
//! Both layers apply a logistic sigmoid to the weighted sum plus bias. The
//! move is the argmax of the nine outputs; the first index wins ties. With
//! masking, occupied cells are excluded before the argmax.

use noughts_engine::Cell;
use serde::{Deserialize, Serialize};

use crate::NetworkError;

/// Layer sizes of a [`PolicyNetwork`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTopology {
    pub inputs: usize,
    pub hidden: usize,
    pub outputs: usize,
}

impl Default for NetworkTopology {
    fn default() -> Self {
        Self::with_hidden(Cell::COUNT)
    }
}

impl NetworkTopology {
    #[must_use]
    pub const fn with_hidden(hidden: usize) -> Self {
        Self {
            inputs: Cell::COUNT,
            hidden,
            outputs: Cell::COUNT,
        }
    }

    /// Number of genes a genome for this topology must have.
    #[must_use]
    pub const fn parameter_count(&self) -> usize {
        self.hidden * (self.inputs + 1) + self.outputs * (self.hidden + 1)
    }

    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.inputs != Cell::COUNT || self.outputs != Cell::COUNT || self.hidden == 0 {
            return Err(NetworkError::UnsupportedTopology {
                inputs: self.inputs,
                hidden: self.hidden,
                outputs: self.outputs,
            });
        }
        Ok(())
    }
}

/// A network built from a genome.
///
/// Inputs use the relative encoding: `+1` for the network's own marks, `-1`
/// for the opponent's, `0` for empty.
#[derive(Debug, Clone)]
pub struct PolicyNetwork {
    topology: NetworkTopology,
    hidden_layer: Vec<f32>,
    output_layer: Vec<f32>,
}

impl PolicyNetwork {
    pub fn from_genome(topology: NetworkTopology, genome: &[f32]) -> Result<Self, NetworkError> {
        topology.validate()?;
        let expected = topology.parameter_count();
        if genome.len() != expected {
            return Err(NetworkError::ShapeMismatch {
                expected,
                actual: genome.len(),
            });
        }
        let (hidden_layer, output_layer) = genome.split_at(topology.hidden * (topology.inputs + 1));
        Ok(Self {
            topology,
            hidden_layer: hidden_layer.to_vec(),
            output_layer: output_layer.to_vec(),
        })
    }

    #[must_use]
    pub fn topology(&self) -> NetworkTopology {
        self.topology
    }

    /// Picks an empty cell, or `None` if the board is full.
    #[must_use]
    pub fn predict(&self, board: &[i8; Cell::COUNT]) -> Option<Cell> {
        self.predict_with(board, true)
    }

    /// Picks a cell with masking switched on or off.
    ///
    /// Without masking the network may choose an occupied cell; callers are
    /// expected to treat that as an illegal move. A full board yields `None`
    /// either way.
    #[must_use]
    pub fn predict_with(&self, board: &[i8; Cell::COUNT], masked: bool) -> Option<Cell> {
        if board.iter().all(|v| *v != 0) {
            return None;
        }
        let outputs = self.forward(board);
        let mut best: Option<(usize, f32)> = None;
        for (index, output) in outputs.into_iter().enumerate() {
            if masked && board[index] != 0 {
                continue;
            }
            if best.is_none_or(|(_, value)| output > value) {
                best = Some((index, output));
            }
        }
        best.and_then(|(index, _)| Cell::from_index(index))
    }

    /// Raw output activations, one per cell.
    #[must_use]
    pub fn forward(&self, board: &[i8; Cell::COUNT]) -> [f32; Cell::COUNT] {
        let inputs = board.map(f32::from);
        let hidden = layer(&self.hidden_layer, &inputs);
        let output = layer(&self.output_layer, &hidden);
        let mut result = [0.0; Cell::COUNT];
        result.copy_from_slice(&output);
        result
    }
}

/// Applies one dense layer whose rows are `inputs.len()` weights plus a bias.
fn layer(parameters: &[f32], inputs: &[f32]) -> Vec<f32> {
    parameters
        .chunks_exact(inputs.len() + 1)
        .map(|row| {
            let (weights, bias) = row.split_at(inputs.len());
            let sum = weights.iter().zip(inputs).map(|(w, x)| w * x).sum::<f32>() + bias[0];
            sigmoid(sum)
        })
        .collect()
}

/// Logistic function, evaluated so that `exp` never overflows.
fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A network whose output `k` is driven only by the bias `biases[k]`.
    fn bias_only(biases: [f32; Cell::COUNT]) -> PolicyNetwork {
        let topology = NetworkTopology::default();
        let mut genome = vec![0.0; topology.parameter_count()];
        let hidden_len = topology.hidden * (topology.inputs + 1);
        for (k, bias) in biases.into_iter().enumerate() {
            genome[hidden_len + k * (topology.hidden + 1) + topology.hidden] = bias;
        }
        PolicyNetwork::from_genome(topology, &genome).unwrap()
    }

    #[test]
    fn test_parameter_count() {
        assert_eq!(NetworkTopology::default().parameter_count(), 180);
        assert_eq!(NetworkTopology::with_hidden(4).parameter_count(), 4 * 10 + 9 * 5);
    }

    #[test]
    fn test_wrong_genome_length_is_shape_mismatch() {
        let topology = NetworkTopology::default();
        let err = PolicyNetwork::from_genome(topology, &[0.0; 179]).unwrap_err();
        assert_eq!(
            err,
            NetworkError::ShapeMismatch {
                expected: 180,
                actual: 179
            }
        );
        assert!(PolicyNetwork::from_genome(topology, &[0.0; 181]).is_err());
    }

    #[test]
    fn test_unsupported_topology() {
        let topology = NetworkTopology {
            inputs: 9,
            hidden: 0,
            outputs: 9,
        };
        assert!(matches!(
            PolicyNetwork::from_genome(topology, &[0.0; 9]),
            Err(NetworkError::UnsupportedTopology { .. })
        ));
        let topology = NetworkTopology {
            inputs: 16,
            hidden: 4,
            outputs: 16,
        };
        assert!(topology.validate().is_err());
    }

    #[test]
    fn test_masking_skips_occupied_cells() {
        let network = bias_only([9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
        let board = [1, -1, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(network.predict(&board), Cell::from_index(2));
        assert_eq!(network.predict_with(&board, false), Cell::from_index(0));
    }

    #[test]
    fn test_full_board_predicts_nothing() {
        let network = bias_only([0.0; Cell::COUNT]);
        let board = [1, -1, 1, 1, -1, -1, -1, 1, 1];
        assert_eq!(network.predict(&board), None);
        assert_eq!(network.predict_with(&board, false), None);
    }

    #[test]
    fn test_ties_pick_the_first_index() {
        let network = bias_only([0.0; Cell::COUNT]);
        assert_eq!(network.predict(&[0; Cell::COUNT]), Cell::from_index(0));
        assert_eq!(network.predict(&[1, 1, 0, 0, 0, 0, 0, 0, 0]), Cell::from_index(2));
    }

    #[test]
    fn test_never_picks_occupied_cell_while_one_is_empty() {
        let topology = NetworkTopology::default();
        let genome = (0..topology.parameter_count())
            .map(|i| ((i * 37 % 101) as f32 / 50.0) - 1.0)
            .collect::<Vec<_>>();
        let network = PolicyNetwork::from_genome(topology, &genome).unwrap();
        for pattern in 0..3u32.pow(9) {
            let mut board = [0i8; Cell::COUNT];
            let mut rest = pattern;
            for value in &mut board {
                *value = (rest % 3) as i8 - 1;
                rest /= 3;
            }
            match network.predict(&board) {
                Some(cell) => assert_eq!(board[cell.index()], 0),
                None => assert!(board.iter().all(|v| *v != 0)),
            }
        }
    }

    #[test]
    fn test_sigmoid_is_stable() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(1000.0) <= 1.0);
        assert!(sigmoid(-1000.0) >= 0.0);
        assert!(!sigmoid(-1000.0).is_nan());
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-6);
    }
}
