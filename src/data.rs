//! Labelled training data.

use crate::error::{Error, Result};
use crate::matrix::Matrix;

use rand::seq::SliceRandom;
use rand::Rng;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Paired input and target matrices, one sample per row.
///
/// Row `i` of `inputs` is labelled by row `i` of `outputs`.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    inputs: Matrix,
    outputs: Matrix,
}

impl Dataset {
    /// Pairs `inputs` (`N × input_size`) with `outputs` (`N × output_size`).
    pub fn new(inputs: Matrix, outputs: Matrix) -> Result<Self> {
        if inputs.rows() != outputs.rows() {
            return Err(Error::mismatch(
                "dataset",
                inputs.dims(),
                outputs.dims(),
            ));
        }
        Ok(Dataset { inputs, outputs })
    }

    /// Builds a dataset from a list of `(input, expected output)` pairs.
    pub fn from_pairs<I, O>(examples: &[(I, O)]) -> Result<Self>
    where
        I: AsRef<[f64]>,
        O: AsRef<[f64]>,
    {
        let inputs: Vec<&[f64]> = examples.iter().map(|(i, _)| i.as_ref()).collect();
        let outputs: Vec<&[f64]> = examples.iter().map(|(_, o)| o.as_ref()).collect();
        Dataset::new(Matrix::from_rows(&inputs)?, Matrix::from_rows(&outputs)?)
    }

    pub fn len(&self) -> usize {
        self.inputs.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn input_size(&self) -> usize {
        self.inputs.cols()
    }

    pub fn output_size(&self) -> usize {
        self.outputs.cols()
    }

    pub fn inputs(&self) -> &Matrix {
        &self.inputs
    }

    pub fn outputs(&self) -> &Matrix {
        &self.outputs
    }

    /// Returns sample `i` as a pair of `1 × n` row vectors.
    pub fn sample(&self, i: usize) -> Result<(Matrix, Matrix)> {
        Ok((self.inputs.row(i)?, self.outputs.row(i)?))
    }

    /// Replaces the first target column with a one-hot encoding.
    ///
    /// Each distinct target value becomes a class; classes are ordered by
    /// value. Returns the encoded dataset and the class values.
    pub fn one_hot(&self) -> Result<(Dataset, Vec<f64>)> {
        let labels = self.outputs.col(0)?;
        let mut classes: Vec<f64> = labels.as_slice().to_vec();
        classes.sort_by(|a, b| a.total_cmp(b));
        classes.dedup();

        let mut outputs = Matrix::zeros(self.len(), classes.len());
        for (row, label) in labels.as_slice().iter().enumerate() {
            // Every label is in `classes`, so the search always succeeds.
            if let Ok(class) = classes.binary_search_by(|c| c.total_cmp(label)) {
                outputs.set(row, class, 1.0)?;
            }
        }
        Ok((Dataset::new(self.inputs.clone(), outputs)?, classes))
    }

    /// Shuffles the samples and splits them into a training set holding
    /// `ratio` of the data and a test set holding the rest.
    pub fn split<R>(&self, ratio: f64, rng: &mut R) -> Result<(Dataset, Dataset)>
    where
        R: Rng + ?Sized,
    {
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(Error::config(format!(
                "split ratio must be between 0 and 1, got {}",
                ratio
            )));
        }
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);
        let cut = (self.len() as f64 * ratio).round() as usize;
        let (train, test) = order.split_at(cut);
        Ok((self.select(train)?, self.select(test)?))
    }

    fn select(&self, rows: &[usize]) -> Result<Dataset> {
        let mut inputs = Matrix::zeros(0, self.input_size());
        let mut outputs = Matrix::zeros(0, self.output_size());
        for &row in rows {
            inputs.add_row(self.inputs.row_slice(row)?)?;
            outputs.add_row(self.outputs.row_slice(row)?)?;
        }
        Dataset::new(inputs, outputs)
    }
}

/// Reads delimited text, one sample per line.
///
/// The first `input_size` values of a line are the inputs and the next
/// `output_size` values the targets; any further values are ignored. Runs of
/// the delimiter count as one, and blank lines are skipped.
pub fn parse_delimited<R>(
    reader: R,
    input_size: usize,
    output_size: usize,
    delimiter: char,
) -> Result<Dataset>
where
    R: BufRead,
{
    let width = input_size + output_size;
    let mut inputs = Matrix::zeros(0, input_size);
    let mut outputs = Matrix::zeros(0, output_size);
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = n + 1;
        let values = line
            .split(delimiter)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .take(width)
            .map(|token| {
                token.parse::<f64>().map_err(|e| Error::Parse {
                    line: line_no,
                    message: format!("{:?}: {}", token, e),
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        if values.is_empty() {
            continue;
        }
        if values.len() < width {
            return Err(Error::Parse {
                line: line_no,
                message: format!(
                    "expected {} values, found {}",
                    width,
                    values.len()
                ),
            });
        }
        inputs.add_row(&values[..input_size])?;
        outputs.add_row(&values[input_size..])?;
    }
    Dataset::new(inputs, outputs)
}

/// Opens `path` and reads it with `parse_delimited`.
pub fn load_delimited<P>(
    path: P,
    input_size: usize,
    output_size: usize,
    delimiter: char,
) -> Result<Dataset>
where
    P: AsRef<Path>,
{
    let file = File::open(path)?;
    parse_delimited(BufReader::new(file), input_size, output_size, delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn from_pairs_builds_parallel_matrices() {
        let data =
            Dataset::from_pairs(&[([1.0, 2.0], [0.0]), ([3.0, 4.0], [1.0])]).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.input_size(), 2);
        assert_eq!(data.output_size(), 1);
        let (input, output) = data.sample(1).unwrap();
        assert_eq!(input.as_slice(), &[3.0, 4.0]);
        assert_eq!(output.as_slice(), &[1.0]);
        assert!(data.sample(2).is_err());
    }

    #[test]
    fn new_requires_equal_row_counts() {
        assert!(matches!(
            Dataset::new(Matrix::zeros(3, 2), Matrix::zeros(2, 1)),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn parses_delimited_text() {
        let text = "0.5  1.5 2\n\n-1 3 1\n";
        let data = parse_delimited(text.as_bytes(), 2, 1, ' ').unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.inputs().as_slice(), &[0.5, 1.5, -1.0, 3.0]);
        assert_eq!(data.outputs().as_slice(), &[2.0, 1.0]);

        let csv = parse_delimited("1,2,3\n".as_bytes(), 1, 2, ',').unwrap();
        assert_eq!(csv.outputs().as_slice(), &[2.0, 3.0]);
    }

    #[test]
    fn reports_bad_lines() {
        let err = parse_delimited("1 2 3\n1 x 3\n".as_bytes(), 2, 1, ' ').unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
        let err = parse_delimited("1 2\n".as_bytes(), 2, 1, ' ').unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_delimited("/nonexistent/data.txt", 2, 1, ' ').unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn one_hot_orders_classes_by_value() {
        let data = Dataset::from_pairs(&[
            ([0.0], [3.0]),
            ([1.0], [1.0]),
            ([2.0], [3.0]),
            ([3.0], [2.0]),
        ])
        .unwrap();
        let (encoded, classes) = data.one_hot().unwrap();
        assert_eq!(classes, vec![1.0, 2.0, 3.0]);
        assert_eq!(encoded.output_size(), 3);
        assert_eq!(
            encoded.outputs().to_rows(),
            vec![
                vec![0.0, 0.0, 1.0],
                vec![1.0, 0.0, 0.0],
                vec![0.0, 0.0, 1.0],
                vec![0.0, 1.0, 0.0],
            ]
        );
        assert_eq!(encoded.inputs(), data.inputs());
    }

    #[test]
    fn split_partitions_samples() {
        let pairs: Vec<([f64; 1], [f64; 1])> =
            (0..10).map(|i| ([i as f64], [i as f64 * 2.0])).collect();
        let data = Dataset::from_pairs(&pairs).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let (train, test) = data.split(0.8, &mut rng).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);

        let mut seen: Vec<f64> = train
            .inputs()
            .as_slice()
            .iter()
            .chain(test.inputs().as_slice())
            .copied()
            .collect();
        seen.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(seen, (0..10).map(|i| i as f64).collect::<Vec<_>>());
        for i in 0..train.len() {
            let (x, y) = train.sample(i).unwrap();
            assert_eq!(y.as_slice()[0], x.as_slice()[0] * 2.0);
        }

        assert!(data.split(1.0, &mut rng).is_err());
        assert!(data.split(0.0, &mut rng).is_err());
    }
}
