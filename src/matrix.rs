//! Dense `f64` matrices parsed from `matrix(row(...), ...)` / `vector(...)`
//! calls, plus the numeric linear-algebra kernels over them.

use crate::ast::Node;
use crate::error::EvaluationError;
use crate::evaluator::{evaluate, Env};

const PIVOT_TOLERANCE: f64 = 1e-9;
const QR_MAX_ITERATIONS: usize = 200;
const QR_CONVERGENCE_FACTOR: f64 = 1e-8;

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.data[r * self.cols + c]
    }

    pub fn set(&mut self, r: usize, c: usize, v: f64) {
        self.data[r * self.cols + c] = v;
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Matrix::new(n, n, vec![0.0; n * n]);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::new(self.cols, self.rows, vec![0.0; self.rows * self.cols]);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.set(c, r, self.get(r, c));
            }
        }
        out
    }

    pub fn frobenius_norm(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix, EvaluationError> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(EvaluationError::new("matrix addition requires equal dimensions", 0));
        }
        let data = self.data.iter().zip(&other.data).map(|(a, b)| a + b).collect();
        Ok(Matrix::new(self.rows, self.cols, data))
    }

    pub fn scalar_mul(&self, k: f64) -> Matrix {
        Matrix::new(self.rows, self.cols, self.data.iter().map(|v| v * k).collect())
    }

    pub fn mul(&self, other: &Matrix) -> Result<Matrix, EvaluationError> {
        if self.cols != other.rows {
            return Err(EvaluationError::new("matrix multiplication requires inner dimensions to match", 0));
        }
        let mut out = Matrix::new(self.rows, other.cols, vec![0.0; self.rows * other.cols]);
        for r in 0..self.rows {
            for c in 0..other.cols {
                let mut acc = 0.0;
                for k in 0..self.cols {
                    acc += self.get(r, k) * other.get(k, c);
                }
                out.set(r, c, acc);
            }
        }
        Ok(out)
    }

    /// Partial-pivot Gaussian elimination to row-echelon form; returns the
    /// number of sign flips performed (for determinant) and the eliminated matrix.
    fn row_echelon(&self) -> (Matrix, i32, usize) {
        let mut m = self.clone();
        let mut sign_flips = 0i32;
        let mut pivot_row = 0usize;
        let mut rank = 0usize;
        for col in 0..m.cols {
            if pivot_row >= m.rows {
                break;
            }
            let mut max_row = pivot_row;
            let mut max_val = m.get(pivot_row, col).abs();
            for r in (pivot_row + 1)..m.rows {
                let v = m.get(r, col).abs();
                if v > max_val {
                    max_val = v;
                    max_row = r;
                }
            }
            if max_val < PIVOT_TOLERANCE {
                continue;
            }
            if max_row != pivot_row {
                m.swap_rows(pivot_row, max_row);
                sign_flips += 1;
            }
            for r in (pivot_row + 1)..m.rows {
                let factor = m.get(r, col) / m.get(pivot_row, col);
                for c in col..m.cols {
                    let v = m.get(pivot_row, c);
                    m.set(r, c, m.get(r, c) - factor * v);
                }
            }
            pivot_row += 1;
            rank += 1;
        }
        (m, sign_flips, rank)
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for c in 0..self.cols {
            let tmp = self.get(a, c);
            self.set(a, c, self.get(b, c));
            self.set(b, c, tmp);
        }
    }

    pub fn rank(&self) -> usize {
        self.row_echelon().2
    }

    pub fn determinant(&self) -> Result<f64, EvaluationError> {
        if !self.is_square() {
            return Err(EvaluationError::new("determinant requires a square matrix", 0));
        }
        let (echelon, sign_flips, rank) = self.row_echelon();
        if rank < self.rows {
            return Ok(0.0);
        }
        let mut det = if sign_flips % 2 == 0 { 1.0 } else { -1.0 };
        for i in 0..self.rows {
            det *= echelon.get(i, i);
        }
        Ok(det)
    }

    /// Gauss-Jordan inverse; fails with `EvaluationError` on a singular matrix.
    pub fn inverse(&self) -> Result<Matrix, EvaluationError> {
        if !self.is_square() {
            return Err(EvaluationError::new("inverse requires a square matrix", 0));
        }
        let n = self.rows;
        let mut aug = Matrix::new(n, 2 * n, vec![0.0; n * 2 * n]);
        for r in 0..n {
            for c in 0..n {
                aug.set(r, c, self.get(r, c));
            }
            aug.set(r, n + r, 1.0);
        }
        for col in 0..n {
            let mut pivot = col;
            let mut max_val = aug.get(col, col).abs();
            for r in (col + 1)..n {
                let v = aug.get(r, col).abs();
                if v > max_val {
                    max_val = v;
                    pivot = r;
                }
            }
            if max_val < PIVOT_TOLERANCE {
                return Err(EvaluationError::new("matrix is singular", 0));
            }
            aug.swap_rows(col, pivot);
            let pivot_val = aug.get(col, col);
            for c in 0..2 * n {
                aug.set(col, c, aug.get(col, c) / pivot_val);
            }
            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = aug.get(r, col);
                if factor == 0.0 {
                    continue;
                }
                for c in 0..2 * n {
                    let v = aug.get(col, c);
                    aug.set(r, c, aug.get(r, c) - factor * v);
                }
            }
        }
        let mut out = Matrix::new(n, n, vec![0.0; n * n]);
        for r in 0..n {
            for c in 0..n {
                out.set(r, c, aug.get(r, n + c));
            }
        }
        Ok(out)
    }

    /// Solves `A x = b` by the same pivoted reduction as `inverse`.
    pub fn solve_linear_system(&self, b: &[f64]) -> Result<Vec<f64>, EvaluationError> {
        let inv = self.inverse()?;
        let rhs = Matrix::new(b.len(), 1, b.to_vec());
        let x = inv.mul(&rhs)?;
        Ok((0..x.rows).map(|r| x.get(r, 0)).collect())
    }

    /// Eigenvalues via unshifted-then-Wilkinson-shifted QR iteration on a
    /// square matrix; `max_iterations = 200`, convergence when the
    /// sub-diagonal drops below `1e-8 * ||A||_F`.
    pub fn eigenvalues(&self) -> Result<Vec<f64>, EvaluationError> {
        if !self.is_square() {
            return Err(EvaluationError::new("eigenvalues require a square matrix", 0));
        }
        let n = self.rows;
        let mut a = self.clone();
        let threshold = QR_CONVERGENCE_FACTOR * self.frobenius_norm().max(1.0);
        for _ in 0..QR_MAX_ITERATIONS {
            let mut off_diag_norm = 0.0;
            for i in 1..n {
                off_diag_norm += a.get(i, i - 1).abs();
            }
            if off_diag_norm < threshold {
                break;
            }
            let shift = wilkinson_shift(&a);
            for i in 0..n {
                a.set(i, i, a.get(i, i) - shift);
            }
            let (q, r) = qr_decompose(&a);
            a = r.mul(&q)?;
            for i in 0..n {
                a.set(i, i, a.get(i, i) + shift);
            }
        }
        let mut eigenvalues: Vec<f64> = (0..n).map(|i| a.get(i, i)).collect();
        eigenvalues.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
        Ok(eigenvalues)
    }

    /// Singular values via the eigendecomposition of `AᵀA`, sorted descending.
    pub fn singular_values(&self) -> Result<Vec<f64>, EvaluationError> {
        let ata = self.transpose().mul(self)?;
        let mut eigenvalues = ata.eigenvalues()?;
        eigenvalues.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        Ok(eigenvalues.into_iter().map(|v| v.max(0.0).sqrt()).collect())
    }
}

fn wilkinson_shift(a: &Matrix) -> f64 {
    let n = a.rows;
    if n < 2 {
        return a.get(0, 0);
    }
    let d = (a.get(n - 2, n - 2) - a.get(n - 1, n - 1)) / 2.0;
    let b = a.get(n - 1, n - 2);
    let c = a.get(n - 2, n - 1);
    let denom = d.abs() + (d * d + b * c).sqrt();
    if denom.abs() < f64::EPSILON {
        a.get(n - 1, n - 1)
    } else {
        a.get(n - 1, n - 1) - (b * c).signum() * (b * c).abs() / denom
    }
}

/// Gram-Schmidt QR decomposition; adequate at the sizes this engine handles.
fn qr_decompose(a: &Matrix) -> (Matrix, Matrix) {
    let n = a.rows;
    let mut q = Matrix::new(n, n, vec![0.0; n * n]);
    let mut r = Matrix::new(n, n, vec![0.0; n * n]);
    let mut columns: Vec<Vec<f64>> = (0..n).map(|c| (0..n).map(|row| a.get(row, c)).collect()).collect();
    for j in 0..n {
        let mut v = columns[j].clone();
        for i in 0..j {
            let qi: Vec<f64> = (0..n).map(|row| q.get(row, i)).collect();
            let dot: f64 = qi.iter().zip(&columns[j]).map(|(x, y)| x * y).sum();
            r.set(i, j, dot);
            for k in 0..n {
                v[k] -= dot * qi[k];
            }
        }
        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        r.set(j, j, norm);
        if norm > PIVOT_TOLERANCE {
            for k in 0..n {
                q.set(k, j, v[k] / norm);
            }
        }
        columns[j] = v;
    }
    (q, r)
}

/// Interprets `Call{matrix, [List{...}, ...]}` (one `List` per `row(...)`)
/// into a dense matrix, or a bare `List` (from `vector(...)`) into a column
/// vector. Rejects ragged matrices with a structured error.
pub fn matrix_from_node(node: &Node) -> Result<Matrix, EvaluationError> {
    let env = Env::new();
    if let Node::Call { name, args } = node {
        if name == "matrix" {
            let mut rows: Vec<Vec<f64>> = Vec::new();
            for arg in args {
                rows.push(row_values(arg, &env)?);
            }
            let cols = rows.first().map(|r| r.len()).unwrap_or(0);
            if rows.iter().any(|r| r.len() != cols) {
                return Err(EvaluationError::new("ragged matrix: rows have differing lengths", 0));
            }
            let data: Vec<f64> = rows.into_iter().flatten().collect();
            let row_count = if cols == 0 { 0 } else { data.len() / cols };
            return Ok(Matrix::new(row_count, cols, data));
        }
    }
    if let Node::List { .. } = node {
        let values = row_values(node, &env)?;
        let n = values.len();
        return Ok(Matrix::new(n, 1, values));
    }
    Err(EvaluationError::new("expected a matrix(...) or vector(...) call", 0))
}

fn row_values(node: &Node, env: &Env) -> Result<Vec<f64>, EvaluationError> {
    match node {
        Node::List { items } => items
            .iter()
            .map(|item| {
                evaluate(item, env)?
                    .as_real()
                    .ok_or_else(|| EvaluationError::new("matrix entries must be real numbers", 0))
            })
            .collect(),
        _ => Err(EvaluationError::new("expected row(...) or vector(...)", 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn matrix(src: &str) -> Matrix {
        matrix_from_node(&parse_str(src).unwrap()).unwrap()
    }

    #[test]
    fn parses_a_2x2_matrix() {
        let m = matrix("matrix(row(1,2),row(3,4))");
        assert_eq!(m.rows, 2);
        assert_eq!(m.cols, 2);
        assert_eq!(m.get(1, 0), 3.0);
    }

    #[test]
    fn rejects_ragged_matrices() {
        let err = matrix_from_node(&parse_str("matrix(row(1,2),row(3))").unwrap()).unwrap_err();
        assert!(err.message.contains("ragged"));
    }

    #[test]
    fn determinant_of_2x2() {
        let m = matrix("matrix(row(2,1),row(5,3))");
        assert!((m.determinant().unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn inverse_of_identity_is_identity() {
        let id = Matrix::identity(3);
        assert_eq!(id.inverse().unwrap(), id);
    }

    #[test]
    fn singular_matrix_inverse_fails() {
        let m = matrix("matrix(row(1,2),row(2,4))");
        assert!(m.inverse().is_err());
    }

    #[test]
    fn eigenvalues_of_diagonal_matrix() {
        let m = matrix("matrix(row(2,0),row(0,3))");
        let mut eig = m.eigenvalues().unwrap();
        eig.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((eig[0] - 2.0).abs() < 1e-6);
        assert!((eig[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn rank_of_rank_deficient_matrix() {
        let m = matrix("matrix(row(1,2),row(2,4))");
        assert_eq!(m.rank(), 1);
    }
}
