//! A [Feedforward neural network]
//! (https://en.wikipedia.org/wiki/Feedforward_neural_network).
//!
//! # Example
//!
//! Let's train a simple neural network to compute the XOR function:
//!
//! ```
//! # use nnet::{Activator, Dataset, Matrix, NetworkConfig};
//! // Create examples of the XOR function
//! let examples = Dataset::from_pairs(&[([0.0, 0.0], [0.0]),
//!                                      ([0.0, 1.0], [1.0]),
//!                                      ([1.0, 0.0], [1.0]),
//!                                      ([1.0, 1.0], [0.0])]).unwrap();
//!
//! // Train a network using those examples
//! let mut network = NetworkConfig::new(2, 1)
//!     .hidden_layers(&[4])
//!     .activator(Activator::Sigmoid)
//!     .learning_rate(0.5)
//!     .batch_size(1)
//!     .softmax_output(false)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//! network.train(&examples, 3000, false).unwrap();
//!
//! // And verify the network correctly computes XOR!
//! let mut classify = |a: f64, b: f64| {
//!     let out = network.predict(&Matrix::row_vector(&[a, b])).unwrap();
//!     out.get(0, 0).unwrap() > 0.5
//! };
//! assert_eq!(classify(0.0, 0.0), false);
//! assert_eq!(classify(0.0, 1.0), true);
//! assert_eq!(classify(1.0, 0.0), true);
//! assert_eq!(classify(1.0, 1.0), false);
//! ```

use crate::activator::Activator;
use crate::config::NetworkConfig;
use crate::error::{Error, Result};
use crate::gradient::GradientArena;
use crate::layer::{Layer, LayerInfo};
use crate::matrix::Matrix;
use crate::utils::Back;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// A Feedforward neural network
///
/// `layers[0]` is a linear pass-through of the inputs and carries no weights.
/// Every other layer holds a `size × (previous size + 1)` weight matrix, the
/// last column being the bias.
#[derive(Clone, Debug)]
pub struct Network {
    pub(crate) config: NetworkConfig,
    pub(crate) layers: Vec<Layer>,
    /// Mean loss of each completed epoch, one row per epoch.
    pub(crate) training_error: Matrix,
    pub(crate) gradient: GradientArena,
    pub(crate) rng: StdRng,
    pub(crate) back_propagations: usize,
}

impl Network {
    /// Creates a new, untrained neural network.
    ///
    /// The layers are `[input, hidden..., output]`; the input layer is linear
    /// and every other layer uses `config.activator`.
    pub fn new(config: NetworkConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut layers = Vec::with_capacity(config.hidden_layers.len() + 2);
        layers.push(Layer::new(config.input_size, Activator::Linear)?);
        for &size in &config.hidden_layers {
            layers.push(Layer::new(size, config.activator)?);
        }
        layers.push(Layer::new(config.output_size, config.activator)?);

        let gradient = GradientArena::new(layers.len(), config.batch_size);
        let mut network = Network {
            config,
            layers,
            training_error: Matrix::zeros(0, 1),
            gradient,
            rng,
            back_propagations: 0,
        };
        network.init_weights()?;
        network.reset_gradient();

        let sizes: Vec<usize> = network.layers.iter().map(Layer::size).collect();
        debug!(
            sizes = ?sizes,
            activation = %network.config.activator,
            softmax = network.config.softmax_output,
            "created network"
        );
        Ok(network)
    }

    /// Sizes every non-input layer's weights to `size × (previous size + 1)`
    /// and randomizes them.
    fn init_weights(&mut self) -> Result<()> {
        for i in 1..self.layers.len() {
            let rows = self.layers[i].size();
            let cols = self.layers[i - 1].size() + 1;
            self.layers[i].init_weights(rows, cols, &mut self.rng)?;
        }
        Ok(())
    }

    /// Returns the size of the input layer to the network.
    pub fn input_size(&self) -> usize {
        self.config.input_size
    }

    /// Returns the size of the output layer from the network.
    pub fn output_size(&self) -> usize {
        self.config.output_size
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Read-only access to the layers.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns a snapshot of every layer's size and activation.
    pub fn layer_infos(&self) -> Vec<LayerInfo> {
        self.layers.iter().map(Layer::info).collect()
    }

    /// Mean loss per epoch trained so far, as an `epochs × 1` matrix.
    pub fn training_error(&self) -> &Matrix {
        &self.training_error
    }

    /// Feeds `inputs` to the input layer. A `1 × n` row vector is accepted
    /// and transposed.
    pub fn set_input(&mut self, inputs: &Matrix) -> Result<()> {
        let column = as_column(inputs);
        self.layers[0].set_inputs(&column)
    }

    /// Propagates the current input through every layer.
    pub fn feed_forward(&mut self) -> Result<()> {
        self.layers[0].activate();
        for i in 1..self.layers.len() {
            let inputs = self.biased_output(i - 1)?;
            let weighted = self.weights_of(i)?.matmul(&inputs)?;
            self.layers[i].set_inputs(&weighted)?;
            self.layers[i].activate();
        }
        Ok(())
    }

    /// Returns the output of the last layer, softmax-normalized when the
    /// network was configured with `softmax_output`.
    pub fn output(&self) -> Matrix {
        let last = self.layers.back();
        if self.config.softmax_output {
            last.softmax_output()
        } else {
            last.output()
        }
    }

    /// Returns the loss of the current output against `expected`.
    ///
    /// With softmax output this is the categorical cross-entropy
    /// `-Σ e·ln(p)`, otherwise half the summed squared error `Σ (e - p)² / 2`.
    pub fn loss(&self, expected: &Matrix) -> Result<f64> {
        let expected = self.expected_column(expected)?;
        let predicted = self.output();
        if self.config.softmax_output {
            Ok(-expected.hadamard(&predicted.log())?.sum())
        } else {
            let diff = expected.checked_sub(&predicted)?;
            Ok(diff.hadamard(&diff)?.sum() / 2.0)
        }
    }

    /// Computes the gradient of every layer for the current sample and adds
    /// it to the batch being accumulated.
    ///
    /// The error signal is `expected - predicted`. It is multiplied by the
    /// output layer's activation derivative, except with softmax output where
    /// the cross-entropy derivative reduces to the raw difference.
    pub fn back_propagation(&mut self, expected: &Matrix) -> Result<()> {
        let expected = self.expected_column(expected)?;
        let mut delta = expected.checked_sub(&self.output())?;
        if !self.config.softmax_output {
            delta = delta.hadamard(&self.layers.back().derivative_output())?;
        }

        for i in (1..self.layers.len()).rev() {
            let previous = self.biased_output(i - 1)?;
            let gradient = delta.matmul(&previous.transpose())?;
            if i > 1 {
                let mut weights = self.weights_of(i)?.clone();
                let bias = weights.cols() - 1;
                weights.remove_col(bias)?;
                delta = weights
                    .transpose()
                    .matmul(&delta)?
                    .hadamard(&self.layers[i - 1].derivative_output())?;
            }
            self.gradient.record(i, gradient)?;
        }
        self.back_propagations += 1;
        Ok(())
    }

    /// Moves every layer's weights by the mean of the accumulated gradients,
    /// `w + learning_rate · mean(gradient)`, then starts a new batch.
    pub fn update_weights(&mut self) -> Result<()> {
        let rate = self.config.learning_rate;
        for i in 1..self.layers.len() {
            if let Some(average) = self.gradient.average(i) {
                let updated = self.weights_of(i)?.checked_add(&(average * rate))?;
                self.layers[i].set_weights(updated)?;
            }
        }
        self.reset_gradient();
        Ok(())
    }

    /// Discards all gradients accumulated since the last update.
    pub fn reset_gradient(&mut self) {
        self.gradient.clear();
    }

    /// Runs `inputs` through the network and returns the output.
    pub fn predict(&mut self, inputs: &Matrix) -> Result<Matrix> {
        self.set_input(inputs)?;
        self.feed_forward()?;
        Ok(self.output())
    }

    /// The number of samples back-propagated over the network's lifetime.
    pub fn back_propagations(&self) -> usize {
        self.back_propagations
    }

    /// Output of layer `i` with the constant bias input appended.
    fn biased_output(&self, i: usize) -> Result<Matrix> {
        let mut output = self.layers[i].output();
        output.add_row(&[1.0])?;
        Ok(output)
    }

    fn weights_of(&self, i: usize) -> Result<&Matrix> {
        let layer = self.layers.get(i).ok_or(Error::IndexOutOfRange {
            what: "layer",
            index: i,
            len: self.layers.len(),
        })?;
        layer
            .weights()
            .ok_or_else(|| Error::config(format!("layer {} has no weights", i)))
    }

    fn expected_column(&self, expected: &Matrix) -> Result<Matrix> {
        let column = as_column(expected);
        if column.dims() != (self.output_size(), 1) {
            return Err(Error::mismatch(
                "expected output",
                (self.output_size(), 1),
                expected.dims(),
            ));
        }
        Ok(column)
    }
}

/// Turns a `1 × n` row vector into an `n × 1` column; anything else is
/// returned as is.
fn as_column(m: &Matrix) -> Matrix {
    if m.rows() == 1 && m.cols() != 1 {
        m.transpose()
    } else {
        m.clone()
    }
}
