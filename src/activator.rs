//! Activation function types.

use crate::error::{Error, Result};

use std::fmt;
use std::str::FromStr;

/// A user-supplied activation function and its derivative.
#[derive(Copy, Clone, Debug)]
pub struct CustomActivator {
    /// Display name, also used for equality.
    pub name: &'static str,
    /// Evaluates `f(x)`.
    pub f: fn(f64) -> f64,
    /// Evaluates `f'(x)`.
    pub fprime: fn(f64) -> f64,
}

/// [Activation function](https://en.wikipedia.org/wiki/Activation_function)
/// types.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activator {
    /// Identity function
    Linear,
    /// Rectified Linear Unit
    ReLU,
    /// Sigmoid function
    Sigmoid,
    /// Heaviside step, `1` for positive inputs and `0` otherwise
    Step,
    /// `1` for positive inputs and `-1` otherwise
    Sign,
    /// Hyperbolic tan function
    TanH,
    /// Any other function, carrying its own derivative.
    #[serde(skip)]
    Custom(CustomActivator),
}

impl Activator {
    /// Every built-in activation, in selection-index order.
    pub const ALL: [Activator; 6] = [
        Activator::Linear,
        Activator::ReLU,
        Activator::Sigmoid,
        Activator::Step,
        Activator::Sign,
        Activator::TanH,
    ];

    /// Looks up a built-in activation by its position in `ALL`.
    pub fn from_index(index: usize) -> Result<Self> {
        Activator::ALL.get(index).copied().ok_or_else(|| {
            Error::config(format!("no activation function with index {}", index))
        })
    }

    /// Evaluates `f(x)` for the selected activation function.
    pub fn f(&self, x: f64) -> f64 {
        match *self {
            Activator::Linear => x,
            Activator::ReLU => x.max(0.0),
            Activator::Sigmoid => sigmoid(x),
            Activator::Step => if x > 0.0 { 1.0 } else { 0.0 },
            Activator::Sign => if x > 0.0 { 1.0 } else { -1.0 },
            Activator::TanH => x.tanh(),
            Activator::Custom(custom) => (custom.f)(x),
        }
    }

    /// Evaluates the derivative `f'(x)`.
    ///
    /// Unlike some formulations this takes the *input* of the activation, the
    /// same `x` given to `f`.
    pub fn fprime(&self, x: f64) -> f64 {
        match *self {
            Activator::Linear => 1.0,
            Activator::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            Activator::Sigmoid => {
                let y = sigmoid(x);
                y * (1.0 - y)
            }
            Activator::Step | Activator::Sign => 0.0,
            Activator::TanH => {
                let y = x.tanh();
                1.0 - y * y
            }
            Activator::Custom(custom) => (custom.fprime)(x),
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Activator::Linear => "linear",
            Activator::ReLU => "relu",
            Activator::Sigmoid => "sigmoid",
            Activator::Step => "step",
            Activator::Sign => "sign",
            Activator::TanH => "tanh",
            Activator::Custom(custom) => custom.name,
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl PartialEq for Activator {
    fn eq(&self, other: &Activator) -> bool {
        match (self, other) {
            (Activator::Custom(a), Activator::Custom(b)) => a.name == b.name,
            (Activator::Custom(_), _) | (_, Activator::Custom(_)) => false,
            _ => self.name() == other.name(),
        }
    }
}

impl Default for Activator {
    fn default() -> Self {
        Activator::ReLU
    }
}

impl fmt::Display for Activator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Activator::ALL
            .iter()
            .copied()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| {
                Error::config(format!("unknown activation function {:?}", s))
            })
    }
}
