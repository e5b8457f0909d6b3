//! A small dense matrix of `f64` values.

use crate::error::{Error, Result};

use itertools::Itertools;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use std::fmt;
use std::ops::{AddAssign, Index, Mul};

/// A dense, row-major matrix.
///
/// Dimensions only change through `add_row`, `add_col`, `remove_row` and
/// `remove_col`. Cloning performs a deep copy.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>, // row-major array
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Returns the `n × n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Matrix::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Returns a matrix with every cell drawn uniformly from `[-1, 1]`.
    pub fn random<R>(rows: usize, cols: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut m = Matrix::zeros(rows, cols);
        m.randomize(rng);
        m
    }

    /// Like `random`, but draws from a fresh thread-local generator, so the
    /// result is not reproducible.
    pub fn randomized(rows: usize, cols: usize) -> Self {
        Matrix::random(rows, cols, &mut rand::thread_rng())
    }

    /// Overwrites every cell with a value drawn uniformly from `[-1, 1]`.
    pub fn randomize<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let distribution = Uniform::new_inclusive(-1.0, 1.0);
        for x in &mut self.data {
            *x = distribution.sample(rng);
        }
    }

    /// Builds a matrix from a row-major flat vector.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::mismatch(
                "from_vec",
                (rows, cols),
                (data.len(), 1),
            ));
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Deep-copies a list of rows. Every row must have the same length.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self>
    where
        R: AsRef<[f64]>,
    {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(Error::mismatch(
                    "from_rows",
                    (rows.len(), cols),
                    (1, row.len()),
                ));
            }
            data.extend_from_slice(row);
        }
        Ok(Matrix {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Returns an `n × 1` column vector.
    pub fn column(values: &[f64]) -> Self {
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    /// Returns a `1 × n` row vector.
    pub fn row_vector(values: &[f64]) -> Self {
        Matrix {
            rows: 1,
            cols: values.len(),
            data: values.to_vec(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `(rows, cols)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The underlying row-major storage.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Returns every row as its own vector.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.data.chunks(self.cols).map(<[f64]>::to_vec).collect()
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.rows {
            return Err(Error::IndexOutOfRange {
                what: "row",
                index: row,
                len: self.rows,
            });
        }
        Ok(())
    }

    fn check_col(&self, col: usize) -> Result<()> {
        if col >= self.cols {
            return Err(Error::IndexOutOfRange {
                what: "column",
                index: col,
                len: self.cols,
            });
        }
        Ok(())
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.check_row(row)?;
        self.check_col(col)?;
        Ok(self.data[row * self.cols + col])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.check_row(row)?;
        self.check_col(col)?;
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    /// Borrows a single row.
    pub fn row_slice(&self, row: usize) -> Result<&[f64]> {
        self.check_row(row)?;
        let start = row * self.cols;
        Ok(&self.data[start..start + self.cols])
    }

    /// Returns a copy of `row` as a `1 × cols` matrix.
    pub fn row(&self, row: usize) -> Result<Matrix> {
        Ok(Matrix::row_vector(self.row_slice(row)?))
    }

    /// Returns a copy of `col` as a `rows × 1` matrix.
    pub fn col(&self, col: usize) -> Result<Matrix> {
        self.check_col(col)?;
        let values: Vec<f64> =
            (0..self.rows).map(|r| self.data[r * self.cols + col]).collect();
        Ok(Matrix::column(&values))
    }

    pub fn set_row(&mut self, row: usize, values: &[f64]) -> Result<()> {
        self.check_row(row)?;
        if values.len() != self.cols {
            return Err(Error::mismatch(
                "set_row",
                self.dims(),
                (1, values.len()),
            ));
        }
        let start = row * self.cols;
        self.data[start..start + self.cols].copy_from_slice(values);
        Ok(())
    }

    pub fn set_col(&mut self, col: usize, values: &[f64]) -> Result<()> {
        self.check_col(col)?;
        if values.len() != self.rows {
            return Err(Error::mismatch(
                "set_col",
                self.dims(),
                (values.len(), 1),
            ));
        }
        for (r, &v) in values.iter().enumerate() {
            self.data[r * self.cols + col] = v;
        }
        Ok(())
    }

    /// Appends a row. An empty `0 × 0` matrix takes its width from `values`.
    pub fn add_row(&mut self, values: &[f64]) -> Result<()> {
        if self.rows == 0 && self.cols == 0 {
            self.cols = values.len();
        }
        if values.len() != self.cols {
            return Err(Error::mismatch(
                "add_row",
                self.dims(),
                (1, values.len()),
            ));
        }
        self.data.extend_from_slice(values);
        self.rows += 1;
        Ok(())
    }

    /// Appends a column. An empty `0 × 0` matrix takes its height from
    /// `values`.
    pub fn add_col(&mut self, values: &[f64]) -> Result<()> {
        if self.rows == 0 && self.cols == 0 {
            self.rows = values.len();
        }
        if values.len() != self.rows {
            return Err(Error::mismatch(
                "add_col",
                self.dims(),
                (values.len(), 1),
            ));
        }
        let cols = self.cols + 1;
        let mut data = Vec::with_capacity(self.rows * cols);
        for (r, &v) in values.iter().enumerate() {
            data.extend_from_slice(&self.data[r * self.cols..(r + 1) * self.cols]);
            data.push(v);
        }
        self.data = data;
        self.cols = cols;
        Ok(())
    }

    pub fn remove_row(&mut self, row: usize) -> Result<()> {
        self.check_row(row)?;
        let start = row * self.cols;
        self.data.drain(start..start + self.cols);
        self.rows -= 1;
        Ok(())
    }

    pub fn remove_col(&mut self, col: usize) -> Result<()> {
        self.check_col(col)?;
        let cols = self.cols;
        let mut i = 0;
        self.data.retain(|_| {
            let keep = i % cols != col;
            i += 1;
            keep
        });
        self.cols -= 1;
        Ok(())
    }

    /// Returns a new `cols × rows` matrix; the receiver is untouched.
    pub fn transpose(&self) -> Matrix {
        let mut result = Matrix::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                result.data[c * self.rows + r] = self.data[r * self.cols + c];
            }
        }
        result
    }

    /// Applies `f` to every element.
    pub fn map<F>(&self, f: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    /// Element-wise natural logarithm. Non-positive values give NaN or -inf.
    pub fn log(&self) -> Matrix {
        self.map(f64::ln)
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Returns the flat row-major index of the largest element. Ties go to the
    /// first occurrence.
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &x) in self.data.iter().enumerate() {
            match best {
                Some((_, max)) if x <= max => {}
                _ => best = Some((i, x)),
            }
        }
        best.map(|(i, _)| i)
    }

    fn zip_with<F>(&self, other: &Matrix, op: &'static str, f: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.dims() != other.dims() {
            return Err(Error::mismatch(op, self.dims(), other.dims()));
        }
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Element-wise sum.
    pub fn checked_add(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    /// Element-wise difference.
    pub fn checked_sub(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "sub", |a, b| a - b)
    }

    /// Element-wise product.
    pub fn hadamard(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with(other, "hadamard", |a, b| a * b)
    }

    /// Standard matrix product `self · other`.
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(Error::mismatch("matmul", self.dims(), other.dims()));
        }
        let mut result = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.data[i * self.cols + k];
                let row = &other.data[k * other.cols..(k + 1) * other.cols];
                let out =
                    &mut result.data[i * other.cols..(i + 1) * other.cols];
                for (o, &b) in out.iter_mut().zip(row) {
                    *o += a * b;
                }
            }
        }
        Ok(result)
    }

    /// Multiplies every element by `scalar`.
    pub fn scale(&self, scalar: f64) -> Matrix {
        self.map(|x| x * scalar)
    }
}

impl<'a> AddAssign<&'a Matrix> for Matrix {
    fn add_assign(&mut self, other: &Matrix) {
        assert_eq!(self.dims(), other.dims());
        for (l, r) in self.data.iter_mut().zip(other.data.iter()) {
            *l += *r;
        }
    }
}

impl Mul<f64> for Matrix {
    type Output = Matrix;

    fn mul(mut self, scalar: f64) -> Matrix {
        for x in &mut self.data {
            *x *= scalar;
        }
        self
    }
}

impl<'a> Mul<f64> for &'a Matrix {
    type Output = Matrix;

    fn mul(self, scalar: f64) -> Matrix {
        self.scale(scalar)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(row < self.rows && col < self.cols);
        &self.data[row * self.cols + col]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.cols == 0 {
            return Ok(());
        }
        for row in self.data.chunks(self.cols) {
            writeln!(f, "{}", row.iter().join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn approx_eq(a: &Matrix, b: &Matrix) -> bool {
        a.dims() == b.dims()
            && a.as_slice()
                .iter()
                .zip(b.as_slice())
                .all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn zeros_and_random_range() {
        let m = Matrix::zeros(2, 3);
        assert_eq!(m.dims(), (2, 3));
        assert!(m.as_slice().iter().all(|&x| x == 0.0));

        let mut rng = StdRng::seed_from_u64(7);
        let r = Matrix::random(10, 10, &mut rng);
        assert!(r.as_slice().iter().all(|&x| x >= -1.0 && x <= 1.0));
        assert!(r.as_slice().iter().any(|&x| x != 0.0));
    }

    #[test]
    fn seeded_random_is_reproducible() {
        let a = Matrix::random(3, 3, &mut StdRng::seed_from_u64(1));
        let b = Matrix::random(3, 3, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
        assert!(Matrix::from_vec(2, 2, vec![1.0; 3]).is_err());
    }

    #[test]
    fn transpose_is_an_involution() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = Matrix::random(3, 5, &mut rng);
        let t = a.transpose();
        assert_eq!(t.dims(), (5, 3));
        assert_eq!(t.get(4, 2).unwrap(), a.get(2, 4).unwrap());
        assert_eq!(t.transpose(), a);
    }

    #[test]
    fn matmul_dimension_contract() {
        let a = Matrix::zeros(2, 3);
        let err = a.matmul(&Matrix::zeros(4, 2)).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch { left: (2, 3), right: (4, 2), .. }
        ));
        assert_eq!(a.matmul(&Matrix::zeros(3, 4)).unwrap().dims(), (2, 4));
    }

    #[test]
    fn matmul_values() {
        let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let b = Matrix::from_rows(&[[5.0, 6.0], [7.0, 8.0]]).unwrap();
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn matmul_identity_and_associativity() {
        let mut rng = StdRng::seed_from_u64(11);
        let a = Matrix::random(3, 4, &mut rng);
        let b = Matrix::random(4, 2, &mut rng);
        let c = Matrix::random(2, 5, &mut rng);

        assert!(approx_eq(&a.matmul(&Matrix::identity(4)).unwrap(), &a));
        assert!(approx_eq(&Matrix::identity(3).matmul(&a).unwrap(), &a));

        let left = a.matmul(&b).unwrap().matmul(&c).unwrap();
        let right = a.matmul(&b.matmul(&c).unwrap()).unwrap();
        assert!(approx_eq(&left, &right));
    }

    #[test]
    fn elementwise_ops_require_equal_shapes() {
        let a = Matrix::from_rows(&[[1.0, 2.0]]).unwrap();
        let b = Matrix::from_rows(&[[3.0, 5.0]]).unwrap();
        assert_eq!(a.checked_add(&b).unwrap().as_slice(), &[4.0, 7.0]);
        assert_eq!(b.checked_sub(&a).unwrap().as_slice(), &[2.0, 3.0]);
        assert_eq!(a.hadamard(&b).unwrap().as_slice(), &[3.0, 10.0]);
        assert!(a.checked_add(&a.transpose()).is_err());
        assert!(a.checked_sub(&Matrix::zeros(1, 3)).is_err());
        assert_eq!((&a * 2.0).as_slice(), &[2.0, 4.0]);
        assert_eq!((b * 0.5).as_slice(), &[1.5, 2.5]);
    }

    #[test]
    fn accessors_are_bounds_checked() {
        let mut m = Matrix::zeros(2, 2);
        m.set(1, 0, 4.0).unwrap();
        assert_eq!(m.get(1, 0).unwrap(), 4.0);
        assert_eq!(m[(1, 0)], 4.0);
        assert!(matches!(
            m.get(2, 0),
            Err(Error::IndexOutOfRange { what: "row", index: 2, len: 2 })
        ));
        assert!(matches!(
            m.set(0, 5, 1.0),
            Err(Error::IndexOutOfRange { what: "column", .. })
        ));
        assert!(m.row(3).is_err());
        assert!(m.col(3).is_err());
        assert!(m.set_row(0, &[1.0]).is_err());
    }

    #[test]
    fn rows_and_columns() {
        let mut m = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.row(1).unwrap().as_slice(), &[4.0, 5.0, 6.0]);
        assert_eq!(m.col(2).unwrap().as_slice(), &[3.0, 6.0]);

        m.set_col(0, &[9.0, 8.0]).unwrap();
        m.set_row(1, &[0.0, 0.0, 1.0]).unwrap();
        assert_eq!(m.as_slice(), &[9.0, 2.0, 3.0, 0.0, 0.0, 1.0]);

        m.add_row(&[7.0, 7.0, 7.0]).unwrap();
        assert_eq!(m.dims(), (3, 3));
        m.add_col(&[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(m.dims(), (3, 4));
        assert_eq!(m.row_slice(2).unwrap(), &[7.0, 7.0, 7.0, 1.0]);
        assert!(m.add_row(&[1.0]).is_err());

        m.remove_col(1).unwrap();
        assert_eq!(m.row_slice(0).unwrap(), &[9.0, 3.0, 1.0]);
        m.remove_row(0).unwrap();
        assert_eq!(m.dims(), (2, 3));
        assert_eq!(m.as_slice(), &[0.0, 1.0, 1.0, 7.0, 7.0, 1.0]);
        assert!(m.remove_row(2).is_err());
    }

    #[test]
    fn empty_matrix_adopts_first_row() {
        let mut m = Matrix::zeros(0, 0);
        m.add_row(&[1.0, 2.0]).unwrap();
        assert_eq!(m.dims(), (1, 2));

        let mut errors = Matrix::zeros(0, 1);
        errors.add_row(&[0.5]).unwrap();
        errors.add_row(&[0.25]).unwrap();
        assert_eq!(errors.dims(), (2, 1));
    }

    #[test]
    fn argmax_prefers_first_occurrence() {
        let m = Matrix::from_rows(&[[1.0, 3.0], [3.0, 2.0]]).unwrap();
        assert_eq!(m.argmax(), Some(1));
        assert_eq!(Matrix::zeros(0, 0).argmax(), None);
    }

    #[test]
    fn log_does_not_trap() {
        let m = Matrix::row_vector(&[1.0, 0.0, -1.0]).log();
        assert_eq!(m.get(0, 0).unwrap(), 0.0);
        assert_eq!(m.get(0, 1).unwrap(), f64::NEG_INFINITY);
        assert!(m.get(0, 2).unwrap().is_nan());
    }

    #[test]
    fn display_prints_rows() {
        let m = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert_eq!(m.to_string(), "1 2\n3 4\n");
    }
}
