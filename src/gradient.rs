//! Per-sample gradient storage for one batch.

use crate::error::{Error, Result};
use crate::matrix::Matrix;

/// Holds the gradient of every sample in the current batch, per layer.
///
/// Slots are allocated once with room for a full batch and overwritten on the
/// next batch, so `clear` only forgets how many are in use.
#[derive(Clone, Debug)]
pub struct GradientArena {
    slots: Vec<Vec<Matrix>>,
    filled: Vec<usize>,
}

impl GradientArena {
    /// Creates an arena for `layers` layers with room for `batch_size`
    /// gradients each.
    pub fn new(layers: usize, batch_size: usize) -> Self {
        GradientArena {
            slots: (0..layers).map(|_| Vec::with_capacity(batch_size)).collect(),
            filled: vec![0; layers],
        }
    }

    /// Stores one sample's gradient for `layer`.
    pub fn record(&mut self, layer: usize, gradient: Matrix) -> Result<()> {
        let len = self.slots.len();
        let (slots, filled) = match (self.slots.get_mut(layer), self.filled.get_mut(layer)) {
            (Some(slots), Some(filled)) => (slots, filled),
            _ => {
                return Err(Error::IndexOutOfRange {
                    what: "layer",
                    index: layer,
                    len,
                })
            }
        };
        if let Some(first) = slots.first() {
            if first.dims() != gradient.dims() {
                return Err(Error::mismatch(
                    "record_gradient",
                    first.dims(),
                    gradient.dims(),
                ));
            }
        }
        if *filled < slots.len() {
            slots[*filled] = gradient;
        } else {
            slots.push(gradient);
        }
        *filled += 1;
        Ok(())
    }

    /// Returns the number of gradients recorded for `layer` since the last
    /// `clear`.
    pub fn len(&self, layer: usize) -> usize {
        self.filled.get(layer).copied().unwrap_or(0)
    }

    /// Returns the mean of the gradients recorded for `layer`, or `None` if
    /// nothing was recorded.
    pub fn average(&self, layer: usize) -> Option<Matrix> {
        let count = self.len(layer);
        if count == 0 {
            return None;
        }
        let used = &self.slots[layer][..count];
        let mut sum = used[0].clone();
        for gradient in &used[1..] {
            sum += gradient;
        }
        Some(sum * (1.0 / count as f64))
    }

    /// Forgets every recorded gradient, keeping the allocations.
    pub fn clear(&mut self) {
        for filled in &mut self.filled {
            *filled = 0;
        }
    }
}
