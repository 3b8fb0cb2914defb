use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::utils::math::vector::{all_finite, l2_norm};

/// Column-compressed sparse matrix.
///
/// Each column is a sparse vector of `(row, value)` pairs whose row indices are
/// strictly ascending, in the same way a document's TF vector only stores its
/// non-zero terms. Column `j` lives in `indices[indptr[j]..indptr[j + 1]]` /
/// `values[indptr[j]..indptr[j + 1]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseMatrix {
    /// Build from one sparse column per entry of `columns`.
    /// Entries of a column may come in any order; exact zeros are dropped.
    ///
    /// # Panics
    /// When a row index is out of range or repeated within a column.
    pub fn from_columns(rows: usize, columns: Vec<Vec<(usize, f64)>>) -> Self {
        let cols = columns.len();
        let nnz: usize = columns.iter().map(|c| c.len()).sum();
        let mut indptr = Vec::with_capacity(cols + 1);
        let mut indices = Vec::with_capacity(nnz);
        let mut values = Vec::with_capacity(nnz);
        indptr.push(0);
        for mut column in columns {
            column.sort_by_key(|&(row, _)| row);
            let mut last: Option<usize> = None;
            for (row, value) in column {
                assert!(row < rows, "row index {row} out of range for {rows} rows");
                assert!(last != Some(row), "row index {row} repeated within a column");
                last = Some(row);
                if value != 0.0 {
                    indices.push(row);
                    values.push(value);
                }
            }
            indptr.push(indices.len());
        }
        Self { rows, cols, indptr, indices, values }
    }

    /// Sparse copy of a dense matrix
    pub fn from_dense(dense: &Array2<f64>) -> Self {
        let columns = dense
            .columns()
            .into_iter()
            .map(|col| {
                col.iter()
                    .enumerate()
                    .filter(|(_, v)| **v != 0.0)
                    .map(|(i, v)| (i, *v))
                    .collect()
            })
            .collect();
        Self::from_columns(dense.nrows(), columns)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// number of stored (non-zero) entries
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Row indices and values of column `j`
    #[inline]
    pub fn column(&self, j: usize) -> (&[usize], &[f64]) {
        let range = self.indptr[j]..self.indptr[j + 1];
        (&self.indices[range.clone()], &self.values[range])
    }

    /// Value at (row, col), zero when not stored
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let (inds, vals) = self.column(col);
        match inds.binary_search(&row) {
            Ok(pos) => vals[pos],
            Err(_) => 0.0,
        }
    }

    /// L2 norm of column `j`
    pub fn column_norm(&self, j: usize) -> f64 {
        l2_norm(self.column(j).1)
    }

    /// Iterate `(row, col, value)` over stored entries, column by column
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.cols).flat_map(move |j| {
            let (inds, vals) = self.column(j);
            inds.iter().zip(vals.iter()).map(move |(&i, &v)| (i, j, v))
        })
    }

    pub fn all_finite(&self) -> bool {
        all_finite(&self.values)
    }

    pub fn min_value(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Mean over all `rows * cols` cells, implicit zeros included
    pub fn mean(&self) -> f64 {
        let cells = (self.rows * self.cols) as f64;
        if cells == 0.0 {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / cells
    }

    /// Frobenius norm
    pub fn frobenius_norm(&self) -> f64 {
        l2_norm(&self.values)
    }

    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.rows, self.cols));
        for (i, j, v) in self.iter() {
            dense[[i, j]] = v;
        }
        dense
    }

    /// `self * rhs` where `rhs` is (cols × k); result is (rows × k)
    pub fn mul_dense(&self, rhs: &Array2<f64>) -> Array2<f64> {
        assert_eq!(self.cols, rhs.nrows(), "inner dimensions must agree");
        let k = rhs.ncols();
        let mut out = Array2::zeros((self.rows, k));
        for j in 0..self.cols {
            let (inds, vals) = self.column(j);
            let rhs_row = rhs.row(j);
            for (&i, &a) in inds.iter().zip(vals.iter()) {
                let mut out_row = out.row_mut(i);
                out_row.scaled_add(a, &rhs_row);
            }
        }
        out
    }

    /// `selfᵀ * rhs` where `rhs` is (rows × k); result is (cols × k)
    pub fn t_mul_dense(&self, rhs: &Array2<f64>) -> Array2<f64> {
        assert_eq!(self.rows, rhs.nrows(), "inner dimensions must agree");
        let k = rhs.ncols();
        let mut out = Array2::zeros((self.cols, k));
        for j in 0..self.cols {
            let (inds, vals) = self.column(j);
            let mut out_row = out.row_mut(j);
            for (&i, &a) in inds.iter().zip(vals.iter()) {
                out_row.scaled_add(a, &rhs.row(i));
            }
        }
        out
    }

    /// Check structural invariants, e.g. after deserializing untrusted bytes.
    pub fn validate(&self) -> Result<(), String> {
        if self.indptr.len() != self.cols + 1 {
            return Err(format!(
                "indptr has {} entries for {} columns",
                self.indptr.len(),
                self.cols
            ));
        }
        if self.indices.len() != self.values.len() {
            return Err("indices and values length mismatch".to_string());
        }
        if self.indptr[0] != 0 || self.indptr[self.cols] != self.indices.len() {
            return Err("indptr does not span the stored entries".to_string());
        }
        for j in 0..self.cols {
            if self.indptr[j] > self.indptr[j + 1] {
                return Err(format!("indptr decreases at column {j}"));
            }
            let (inds, _) = self.column(j);
            if inds.windows(2).any(|w| w[0] >= w[1]) {
                return Err(format!("row indices of column {j} are not strictly ascending"));
            }
            if inds.last().is_some_and(|&i| i >= self.rows) {
                return Err(format!("row index out of range in column {j}"));
            }
        }
        Ok(())
    }
}
