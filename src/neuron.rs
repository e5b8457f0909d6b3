use crate::activator::Activator;

/// The transient state of a single neuron.
///
/// Every field is overwritten on each forward pass.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Neuron {
    input: f64,
    output: f64,
    derivative_output: f64,
}

impl Neuron {
    pub fn new() -> Self {
        Neuron::default()
    }

    /// Sets the (already weighted) input.
    pub fn set_input(&mut self, input: f64) {
        self.input = input;
    }

    /// Stores `f(input)` and `f'(input)`.
    pub fn activate(&mut self, activator: &Activator) {
        self.output = activator.f(self.input);
        self.derivative_output = activator.fprime(self.input);
    }

    pub fn input(&self) -> f64 {
        self.input
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn derivative_output(&self) -> f64 {
        self.derivative_output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_stores_output_and_derivative() {
        let mut neuron = Neuron::new();
        neuron.set_input(0.0);
        neuron.activate(&Activator::Sigmoid);
        assert_eq!(neuron.output(), 0.5);
        assert_eq!(neuron.derivative_output(), 0.25);

        neuron.set_input(-2.0);
        neuron.activate(&Activator::ReLU);
        assert_eq!(neuron.input(), -2.0);
        assert_eq!(neuron.output(), 0.0);
        assert_eq!(neuron.derivative_output(), 0.0);
    }
}
