use crate::activator::Activator;
use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::neuron::Neuron;

use rand::Rng;

/// A single layer of the neural network
///
/// The weights for every neuron are stored as a single Matrix, one row per
/// neuron and one column per input, with the bias in the last column.
#[derive(Clone, Debug)]
pub struct Layer {
    /// The activation function to be used for every neuron in the layer.
    activator: Activator,
    neurons: Vec<Neuron>,
    /// `None` for the input layer, which only passes its inputs through.
    weights: Option<Matrix>,
}

/// A read-only description of a layer, for display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayerInfo {
    pub size: usize,
    pub activation: String,
    pub has_weights: bool,
}

impl Layer {
    /// Initializes a layer of `size` neurons without weights.
    ///
    /// Arguments:
    ///
    ///  * `size` - the number of neurons; must be positive.
    ///  * `activator` - the activation function to be used for this layer's
    ///                  output.
    pub fn new(size: usize, activator: Activator) -> Result<Self> {
        if size == 0 {
            return Err(Error::config("layers must have at least one neuron"));
        }
        Ok(Layer {
            activator,
            neurons: vec![Neuron::new(); size],
            weights: None,
        })
    }

    /// Returns the number of neurons in this layer.
    pub fn size(&self) -> usize {
        self.neurons.len()
    }

    pub fn activator(&self) -> Activator {
        self.activator
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// Replaces the weights with a `rows × cols` matrix drawn uniformly from
    /// `[-1, 1]`. `rows` must equal the layer size.
    pub fn init_weights<R>(
        &mut self,
        rows: usize,
        cols: usize,
        rng: &mut R,
    ) -> Result<()>
    where
        R: Rng + ?Sized,
    {
        if rows != self.size() || cols == 0 {
            return Err(Error::mismatch(
                "init_weights",
                (self.size(), cols),
                (rows, cols),
            ));
        }
        self.weights = Some(Matrix::random(rows, cols, rng));
        Ok(())
    }

    /// Returns the weight matrix, or `None` for an input layer.
    pub fn weights(&self) -> Option<&Matrix> {
        self.weights.as_ref()
    }

    /// Replaces the whole weight matrix.
    ///
    /// The new matrix must have the same shape as the current weights. A
    /// layer without weights only gets them through `init_weights`.
    pub fn set_weights(&mut self, weights: Matrix) -> Result<()> {
        let expected = match self.weights {
            Some(ref current) => current.dims(),
            None => return Err(Error::config("layer has no weights to replace")),
        };
        if weights.dims() != expected {
            return Err(Error::mismatch("set_weights", expected, weights.dims()));
        }
        self.weights = Some(weights);
        Ok(())
    }

    /// Assigns each neuron's input from a `size × 1` column vector.
    pub fn set_inputs(&mut self, inputs: &Matrix) -> Result<()> {
        if inputs.dims() != (self.size(), 1) {
            return Err(Error::mismatch(
                "set_inputs",
                (self.size(), 1),
                inputs.dims(),
            ));
        }
        for (neuron, &x) in self.neurons.iter_mut().zip(inputs.as_slice()) {
            neuron.set_input(x);
        }
        Ok(())
    }

    /// Activates every neuron with this layer's activation function.
    pub fn activate(&mut self) {
        let activator = self.activator;
        for neuron in &mut self.neurons {
            neuron.activate(&activator);
        }
    }

    /// The pre-activation inputs as a `size × 1` column.
    pub fn inputs(&self) -> Matrix {
        self.collect(Neuron::input)
    }

    /// The activated outputs as a `size × 1` column.
    pub fn output(&self) -> Matrix {
        self.collect(Neuron::output)
    }

    /// The activation derivatives as a `size × 1` column.
    pub fn derivative_output(&self) -> Matrix {
        self.collect(Neuron::derivative_output)
    }

    /// Softmax over the pre-activation inputs, bypassing the activation
    /// function.
    ///
    /// Inputs are shifted by their maximum before exponentiation, which leaves
    /// the result unchanged but keeps `exp` from overflowing.
    pub fn softmax_output(&self) -> Matrix {
        let max = self
            .neurons
            .iter()
            .map(Neuron::input)
            .fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> =
            self.neurons.iter().map(|n| (n.input() - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        let probabilities: Vec<f64> = exps.iter().map(|e| e / total).collect();
        Matrix::column(&probabilities)
    }

    /// Returns a snapshot of this layer's shape and activation.
    pub fn info(&self) -> LayerInfo {
        LayerInfo {
            size: self.size(),
            activation: self.activator.name().to_string(),
            has_weights: self.weights.is_some(),
        }
    }

    fn collect<F>(&self, field: F) -> Matrix
    where
        F: Fn(&Neuron) -> f64,
    {
        let values: Vec<f64> = self.neurons.iter().map(field).collect();
        Matrix::column(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_layer_is_rejected() {
        assert!(matches!(
            Layer::new(0, Activator::ReLU),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn forward_through_neurons() {
        let mut layer = Layer::new(3, Activator::ReLU).unwrap();
        layer.set_inputs(&Matrix::column(&[-1.0, 0.5, 2.0])).unwrap();
        layer.activate();
        assert_eq!(layer.inputs().as_slice(), &[-1.0, 0.5, 2.0]);
        assert_eq!(layer.output().as_slice(), &[0.0, 0.5, 2.0]);
        assert_eq!(layer.derivative_output().as_slice(), &[0.0, 1.0, 1.0]);
        assert_eq!(layer.output().dims(), (3, 1));
    }

    #[test]
    fn set_inputs_checks_shape() {
        let mut layer = Layer::new(2, Activator::Linear).unwrap();
        assert!(layer.set_inputs(&Matrix::column(&[1.0])).is_err());
        assert!(layer.set_inputs(&Matrix::row_vector(&[1.0, 2.0])).is_err());
    }

    #[test]
    fn softmax_sums_to_one() {
        let mut layer = Layer::new(4, Activator::Sigmoid).unwrap();
        for inputs in &[[0.0, 0.0, 0.0, 0.0], [1.0, -2.0, 3.5, 0.1], [800.0, 1.0, -800.0, 2.0]] {
            layer.set_inputs(&Matrix::column(inputs)).unwrap();
            layer.activate();
            let softmax = layer.softmax_output();
            assert!((softmax.sum() - 1.0).abs() < 1e-9);
            assert!(softmax.as_slice().iter().all(|p| p.is_finite()));
        }
    }

    #[test]
    fn softmax_uses_raw_inputs() {
        let mut layer = Layer::new(2, Activator::Step).unwrap();
        layer.set_inputs(&Matrix::column(&[0.0, 2f64.ln()])).unwrap();
        layer.activate();
        let softmax = layer.softmax_output();
        assert!((softmax.get(0, 0).unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert!((softmax.get(1, 0).unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn weights_are_replaced_whole() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut layer = Layer::new(3, Activator::TanH).unwrap();
        assert!(layer.weights().is_none());
        assert!(!layer.info().has_weights);
        assert!(matches!(
            layer.set_weights(Matrix::zeros(3, 5)),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(layer.weights().is_none());

        layer.init_weights(3, 5, &mut rng).unwrap();
        assert_eq!(layer.weights().unwrap().dims(), (3, 5));

        layer.set_weights(Matrix::zeros(3, 5)).unwrap();
        assert!(layer.weights().unwrap().as_slice().iter().all(|&w| w == 0.0));
        assert!(layer.set_weights(Matrix::zeros(3, 4)).is_err());
        assert!(layer.init_weights(2, 5, &mut rng).is_err());
    }

    #[test]
    fn info_snapshot() {
        let layer = Layer::new(8, Activator::Sigmoid).unwrap();
        assert_eq!(
            layer.info(),
            LayerInfo {
                size: 8,
                activation: "sigmoid".to_string(),
                has_weights: false,
            }
        );
    }
}
