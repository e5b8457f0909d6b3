//! A dense feedforward neural network engine.
//!
//! Networks are built from a [`NetworkConfig`], trained one epoch at a time
//! with mini-batch gradient descent, and queried with `predict`. See the
//! [`network`] module for an example.

#[macro_use]
extern crate serde_derive;

pub mod activator;
pub mod config;
pub mod data;
pub mod error;
pub mod layer;
pub mod matrix;
pub mod network;
pub mod neuron;
pub mod trainer;

mod gradient;
mod utils;

pub use crate::activator::{Activator, CustomActivator};
pub use crate::config::NetworkConfig;
pub use crate::data::Dataset;
pub use crate::error::{Error, Result};
pub use crate::layer::{Layer, LayerInfo};
pub use crate::matrix::Matrix;
pub use crate::network::Network;
pub use crate::trainer::EpochReport;
