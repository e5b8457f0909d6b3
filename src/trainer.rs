//! Utilities for training neural networks.

use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::network::Network;

use rand::seq::SliceRandom;
use std::time::Instant;
use tracing::{debug, info, trace};

/// A summary of one training epoch.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct EpochReport {
    pub epoch: usize,
    /// Number of weight updates applied.
    pub batches: usize,
    /// Number of samples trained on. Samples past the last full batch are
    /// skipped.
    pub samples: usize,
    /// Total loss over the epoch divided by the dataset size.
    pub loss: f64,
}

impl Network {
    /// Trains for a single epoch.
    ///
    /// The samples are shuffled and cut into `⌊N / batch_size⌋` batches; the
    /// remainder is dropped for this epoch. Each batch accumulates one
    /// gradient per sample and applies their mean once. The epoch's mean loss
    /// is appended to `training_error`.
    pub fn train_one_step(
        &mut self,
        data: &Dataset,
        epoch: usize,
        verbose: bool,
    ) -> Result<EpochReport> {
        self.check_dataset(data)?;
        let batch_size = self.config.batch_size;
        if batch_size > data.len() {
            return Err(Error::config(format!(
                "batch size {} is larger than the dataset ({} samples)",
                batch_size,
                data.len()
            )));
        }

        let mut order: Vec<usize> = (0..data.len()).collect();
        order.shuffle(&mut self.rng);

        let mut total_loss = 0.0;
        let mut batches = 0;
        let mut samples = 0;
        for batch in order.chunks_exact(batch_size) {
            self.reset_gradient();
            for &i in batch {
                let (input, expected) = data.sample(i)?;
                self.set_input(&input)?;
                self.feed_forward()?;
                total_loss += self.loss(&expected)?;
                self.back_propagation(&expected)?;
            }
            self.update_weights()?;
            trace!(epoch, batch = batches, "applied batch update");
            batches += 1;
            samples += batch.len();
        }

        let loss = total_loss / data.len() as f64;
        self.training_error.add_row(&[loss])?;
        if verbose {
            info!(epoch, batches, loss, "epoch complete");
        }
        Ok(EpochReport {
            epoch,
            batches,
            samples,
            loss,
        })
    }

    /// Trains for `epochs` epochs, numbering them after any already trained.
    ///
    /// Returns the report of the last epoch, or `None` if `epochs` is zero.
    pub fn train(
        &mut self,
        data: &Dataset,
        epochs: usize,
        verbose: bool,
    ) -> Result<Option<EpochReport>> {
        let start_time = Instant::now();
        let mut last = None;
        for _ in 0..epochs {
            let epoch = self.training_error.rows() + 1;
            last = Some(self.train_one_step(data, epoch, verbose)?);
        }
        if let Some(report) = last {
            if verbose {
                info!(
                    epochs,
                    elapsed = ?start_time.elapsed(),
                    loss = report.loss,
                    "training complete"
                );
            } else {
                debug!(epochs, loss = report.loss, "training complete");
            }
        }
        Ok(last)
    }

    /// Returns the fraction of samples whose largest predicted output is at
    /// the same index as the largest expected output.
    pub fn test(&mut self, data: &Dataset) -> Result<f64> {
        if data.is_empty() {
            return Err(Error::config("accuracy is undefined on an empty dataset"));
        }
        self.check_dataset(data)?;
        let mut correct = 0;
        for i in 0..data.len() {
            let (input, expected) = data.sample(i)?;
            let predicted = self.predict(&input)?;
            if predicted.argmax() == expected.argmax() {
                correct += 1;
            }
        }
        Ok(correct as f64 / data.len() as f64)
    }

    /// Verifies that `data` has the network's input and output widths.
    fn check_dataset(&self, data: &Dataset) -> Result<()> {
        if data.is_empty() {
            return Err(Error::config("dataset has no samples"));
        }
        if data.input_size() != self.input_size() {
            return Err(Error::mismatch(
                "dataset inputs",
                (data.len(), self.input_size()),
                data.inputs().dims(),
            ));
        }
        if data.output_size() != self.output_size() {
            return Err(Error::mismatch(
                "dataset outputs",
                (data.len(), self.output_size()),
                data.outputs().dims(),
            ));
        }
        Ok(())
    }
}
