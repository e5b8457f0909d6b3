//! Network configuration.

use crate::activator::Activator;
use crate::error::{Error, Result};
use crate::network::Network;

/// Describes the architecture and training parameters of a `Network`.
///
/// Can be built with the chained setters below or deserialized, for example
/// from JSON; missing fields take their defaults.
///
/// ```
/// # use nnet::{Activator, NetworkConfig};
/// let network = NetworkConfig::new(2, 1)
///     .hidden_layers(&[4])
///     .activator(Activator::Sigmoid)
///     .learning_rate(0.1)
///     .batch_size(1)
///     .softmax_output(false)
///     .seed(7)
///     .build()
///     .unwrap();
/// assert_eq!(network.layers().len(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub input_size: usize,
    pub output_size: usize,
    /// The number of neurons in each hidden layer, in order.
    pub hidden_layers: Vec<usize>,
    /// Activation used by every hidden layer and the output layer.
    pub activator: Activator,
    pub learning_rate: f64,
    pub batch_size: usize,
    /// Normalize the output layer with softmax and train on cross-entropy.
    pub softmax_output: bool,
    /// Seed for weight initialization and shuffling. Without one the network
    /// is seeded from the operating system.
    pub seed: Option<u64>,
    /// Loss below which training could stop. Currently not consulted.
    pub min_loss: Option<f64>,
    /// Loss improvement below which training could stop. Currently not
    /// consulted.
    pub delta_loss: Option<f64>,
}

impl Default for NetworkConfig {
    /// The defaults are:
    ///
    /// * Two inputs and two outputs.
    /// * One hidden layer of 8 neurons.
    /// * A ReLU activation function.
    /// * A learning rate of 0.01.
    /// * Batches of 10 samples.
    /// * Softmax output with cross-entropy loss.
    fn default() -> Self {
        NetworkConfig {
            input_size: 2,
            output_size: 2,
            hidden_layers: vec![8],
            activator: Activator::ReLU,
            learning_rate: 0.01,
            batch_size: 10,
            softmax_output: true,
            seed: None,
            min_loss: None,
            delta_loss: None,
        }
    }
}

impl NetworkConfig {
    /// Creates a configuration with the given input and output sizes and
    /// default values for everything else.
    pub fn new(input_size: usize, output_size: usize) -> Self {
        NetworkConfig {
            input_size,
            output_size,
            ..NetworkConfig::default()
        }
    }

    /// Sets the hidden layer sizes.
    pub fn hidden_layers(mut self, sizes: &[usize]) -> Self {
        self.hidden_layers = sizes.to_vec();
        self
    }

    /// Sets the activation function to use in the network.
    pub fn activator(mut self, activator: Activator) -> Self {
        self.activator = activator;
        self
    }

    /// Sets the learning rate to use during gradient descent.
    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }

    /// Sets the number of samples per weight update.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn softmax_output(mut self, enabled: bool) -> Self {
        self.softmax_output = enabled;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn min_loss(mut self, loss: f64) -> Self {
        self.min_loss = Some(loss);
        self
    }

    pub fn delta_loss(mut self, delta: f64) -> Self {
        self.delta_loss = Some(delta);
        self
    }

    /// Builds an untrained network from this configuration.
    pub fn build(self) -> Result<Network> {
        Network::new(self)
    }

    /// Verifies that the configuration describes a usable network, returning
    /// an error if something is wrong.
    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(Error::config("input size must be positive"));
        }
        if self.output_size == 0 {
            return Err(Error::config("output size must be positive"));
        }
        if let Some(i) = self.hidden_layers.iter().position(|&s| s == 0) {
            return Err(Error::config(format!("hidden layer {} is empty", i)));
        }
        if self.batch_size == 0 {
            return Err(Error::config("batch size must be positive"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(Error::config(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = NetworkConfig::new(3, 4);
        assert_eq!(config.input_size, 3);
        assert_eq!(config.output_size, 4);
        assert_eq!(config.hidden_layers, vec![8]);
        assert_eq!(config.activator, Activator::ReLU);
        assert!(config.softmax_output);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_empty_layers() {
        assert!(NetworkConfig::new(0, 1).validate().is_err());
        assert!(NetworkConfig::new(1, 0).validate().is_err());
        assert!(NetworkConfig::new(1, 1)
            .hidden_layers(&[3, 0])
            .validate()
            .is_err());
    }

    #[test]
    fn rejects_bad_training_parameters() {
        let config = NetworkConfig::new(1, 1);
        assert!(config.clone().batch_size(0).validate().is_err());
        assert!(config.clone().learning_rate(0.0).validate().is_err());
        assert!(config.learning_rate(f64::NAN).validate().is_err());
    }

    #[test]
    fn no_hidden_layers_is_allowed() {
        assert!(NetworkConfig::new(2, 2).hidden_layers(&[]).validate().is_ok());
    }
}
